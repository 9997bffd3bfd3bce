use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Collection, Comment, Entity, Post};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entity", rename_all = "lowercase")]
pub enum QueuedEntity {
    Post(Post),
    Comment(Comment),
}

impl QueuedEntity {
    pub fn collection(&self) -> Collection {
        match self {
            QueuedEntity::Post(_) => Post::COLLECTION,
            QueuedEntity::Comment(_) => Comment::COLLECTION,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            QueuedEntity::Post(p) => p.id(),
            QueuedEntity::Comment(c) => c.id(),
        }
    }

    /// The request body sent to the API: the bare entity, without the tag.
    pub fn to_body(&self) -> serde_json::Result<Value> {
        match self {
            QueuedEntity::Post(p) => serde_json::to_value(p),
            QueuedEntity::Comment(c) => serde_json::to_value(c),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedOperation {
    pub url: String,
    pub payload: QueuedEntity,
}

impl QueuedOperation {
    pub fn create<E: Entity>(entity: E) -> Self {
        Self {
            url: E::COLLECTION.create_path(),
            payload: entity.into_queued(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_targets_collection_endpoint() {
        let op = QueuedOperation::create(Comment::draft("p1", "Ada", "hi"));
        assert_eq!(op.url, "/api/comments/");
        assert_eq!(op.payload.collection(), Collection::Comments);
    }

    #[test]
    fn payload_is_tagged_on_disk_but_bare_on_the_wire() {
        let post = Post::draft("T", "A", "C");
        let op = QueuedOperation::create(post.clone());

        let stored = serde_json::to_value(&op).unwrap();
        assert_eq!(stored["payload"]["kind"], "post");
        assert_eq!(stored["payload"]["entity"]["id"], post.id.as_str());

        let body = op.payload.to_body().unwrap();
        assert_eq!(body["title"], "T");
        assert!(body.get("kind").is_none());
    }
}
