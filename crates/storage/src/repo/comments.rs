use crate::{models::SqlComment, Db};
use domain::Comment;

impl Db {
    pub async fn list_comments(&self, post_id: Option<&str>) -> anyhow::Result<Vec<Comment>> {
        let rows = match post_id {
            Some(post_id) => {
                sqlx::query_as::<_, SqlComment>(
                    r#"
                    SELECT id, post_id, text, author, approved
                    FROM comments
                    WHERE post_id = ?
                    ORDER BY rowid ASC
                    "#,
                )
                .bind(post_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, SqlComment>(
                    r#"
                    SELECT id, post_id, text, author, approved
                    FROM comments
                    ORDER BY rowid ASC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_comment(&self, id: &str) -> anyhow::Result<Option<Comment>> {
        let row = sqlx::query_as::<_, SqlComment>(
            "SELECT id, post_id, text, author, approved FROM comments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    // 不校验 post_id 是否存在：离线创建的评论可能先于其文章到达
    pub async fn upsert_comment(&self, c: &Comment) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, post_id, text, author, approved)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                post_id = excluded.post_id,
                text = excluded.text,
                author = excluded.author,
                approved = excluded.approved
            "#,
        )
        .bind(&c.id)
        .bind(&c.post_id)
        .bind(&c.text)
        .bind(&c.author)
        .bind(c.approved)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_comment(&self, c: &Comment) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE comments SET post_id = ?, text = ?, author = ?, approved = ? WHERE id = ?",
        )
        .bind(&c.post_id)
        .bind(&c.text)
        .bind(&c.author)
        .bind(c.approved)
        .bind(&c.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_comment(&self, id: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
