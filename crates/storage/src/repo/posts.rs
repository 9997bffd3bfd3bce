use crate::{models::SqlPost, Db};
use domain::Post;

impl Db {
    pub async fn list_posts(&self) -> anyhow::Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, SqlPost>(
            r#"
            SELECT id, title, author, content, date, published
            FROM posts
            ORDER BY rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_post(&self, id: &str) -> anyhow::Result<Option<Post>> {
        let row = sqlx::query_as::<_, SqlPost>(
            "SELECT id, title, author, content, date, published FROM posts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    // 重复投递时整行覆盖，保留原 rowid 以维持列表顺序
    pub async fn upsert_post(&self, p: &Post) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, title, author, content, date, published)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                author = excluded.author,
                content = excluded.content,
                date = excluded.date,
                published = excluded.published
            "#,
        )
        .bind(&p.id)
        .bind(&p.title)
        .bind(&p.author)
        .bind(&p.content)
        .bind(&p.date)
        .bind(p.published)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_post(&self, p: &Post) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = ?, author = ?, content = ?, date = ?, published = ?
            WHERE id = ?
            "#,
        )
        .bind(&p.title)
        .bind(&p.author)
        .bind(&p.content)
        .bind(&p.date)
        .bind(p.published)
        .bind(&p.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_post(&self, id: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::temp_db;
    use domain::Post;

    fn post(id: &str, title: &str) -> Post {
        Post {
            id: id.into(),
            title: title.into(),
            author: "Ada".into(),
            content: "body".into(),
            date: "2024-05-01T10:00:00Z".into(),
            published: None,
        }
    }

    #[tokio::test]
    async fn redelivered_post_keeps_its_position() {
        let (db, _dir) = temp_db().await;
        db.upsert_post(&post("a", "first")).await.unwrap();
        db.upsert_post(&post("b", "second")).await.unwrap();
        db.upsert_post(&post("a", "first, again")).await.unwrap();

        let posts = db.list_posts().await.unwrap();
        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["first, again", "second"]);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let (db, _dir) = temp_db().await;
        assert!(!db.update_post(&post("ghost", "x")).await.unwrap());
        assert!(!db.delete_post("ghost").await.unwrap());

        let mut p = post("a", "draft");
        db.upsert_post(&p).await.unwrap();
        p.published = Some(false);
        assert!(db.update_post(&p).await.unwrap());
        assert_eq!(db.get_post("a").await.unwrap(), Some(p));

        assert!(db.delete_post("a").await.unwrap());
        assert_eq!(db.get_post("a").await.unwrap(), None);
    }
}
