mod comments;
mod kv;
mod posts;
