use domain::{Comment, Post};
use sqlx::FromRow;

#[derive(FromRow)]
pub struct SqlPost {
    pub id: String,
    pub title: String,
    pub author: String,
    pub content: String,
    pub date: String,
    pub published: Option<bool>,
}

impl From<SqlPost> for Post {
    fn from(sql: SqlPost) -> Self {
        Post {
            id: sql.id,
            title: sql.title,
            author: sql.author,
            content: sql.content,
            date: sql.date,
            published: sql.published,
        }
    }
}

#[derive(FromRow)]
pub struct SqlComment {
    pub id: String,
    pub post_id: String,
    pub text: String,
    pub author: String,
    pub approved: Option<bool>,
}

impl From<SqlComment> for Comment {
    fn from(sql: SqlComment) -> Self {
        Comment {
            id: sql.id,
            post_id: sql.post_id,
            text: sql.text,
            author: sql.author,
            approved: sql.approved,
        }
    }
}
