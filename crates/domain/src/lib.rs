mod error;
mod models;
pub mod protocol;

pub use error::ApiError;
pub use models::{Collection, Comment, Entity, Post};
pub use protocol::{QueuedEntity, QueuedOperation};
