use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;

use crate::protocol::QueuedEntity;

const API_PREFIX: &str = "/api";
const ANONYMOUS_AUTHOR: &str = "Anonym";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Posts,
    Comments,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Posts => "posts",
            Collection::Comments => "comments",
        }
    }

    pub fn path(&self) -> String {
        format!("{}/{}", API_PREFIX, self.as_str())
    }

    pub fn create_path(&self) -> String {
        format!("{}/{}/", API_PREFIX, self.as_str())
    }

    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{}/{}", API_PREFIX, self.as_str(), id)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> &str;

    fn into_queued(self) -> QueuedEntity;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub author: String,
    pub content: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

impl Post {
    pub fn draft(
        title: impl Into<String>,
        author: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: format!("local-{}", now.timestamp_millis()),
            title: title.into(),
            author: author_or_anonymous(author.into()),
            content: content.into(),
            date: now.to_rfc3339(),
            published: Some(true),
        }
    }
}

impl Entity for Post {
    const COLLECTION: Collection = Collection::Posts;

    fn id(&self) -> &str {
        &self.id
    }

    fn into_queued(self) -> QueuedEntity {
        QueuedEntity::Post(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(rename = "postid")]
    pub post_id: String,
    pub text: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
}

impl Comment {
    pub fn draft(
        post_id: impl Into<String>,
        author: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("local-comment-{}", Utc::now().timestamp_millis()),
            post_id: post_id.into(),
            text: text.into(),
            author: author_or_anonymous(author.into()),
            approved: None,
        }
    }
}

impl Entity for Comment {
    const COLLECTION: Collection = Collection::Comments;

    fn id(&self) -> &str {
        &self.id
    }

    fn into_queued(self) -> QueuedEntity {
        QueuedEntity::Comment(self)
    }
}

fn author_or_anonymous(author: String) -> String {
    if author.trim().is_empty() {
        ANONYMOUS_AUTHOR.to_string()
    } else {
        author
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_collection_paths() {
        assert_eq!(Collection::Posts.path(), "/api/posts");
        assert_eq!(Collection::Comments.create_path(), "/api/comments/");
        assert_eq!(Collection::Posts.item_path("42"), "/api/posts/42");
    }

    #[test]
    fn comment_uses_postid_on_the_wire() {
        let comment = Comment::draft("p1", "Ada", "Nice post");
        let json = serde_json::to_value(&comment).unwrap();
        assert_eq!(json["postid"], "p1");
        assert!(json.get("post_id").is_none());
        assert!(json.get("approved").is_none());
    }

    #[test]
    fn post_without_flag_deserializes() {
        let post: Post = serde_json::from_str(
            r#"{"id":"1","title":"t","author":"a","content":"c","date":"2024-01-01"}"#,
        )
        .unwrap();
        assert_eq!(post.published, None);
    }

    #[test]
    fn draft_falls_back_to_anonymous_author() {
        let post = Post::draft("Title", "  ", "Body");
        assert_eq!(post.author, "Anonym");
        assert!(post.id.starts_with("local-"));
        assert_eq!(post.published, Some(true));
    }
}
