use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::Comment;
use serde::Deserialize;
use storage::Db;

type ApiResult<T> = Result<T, (StatusCode, String)>;

#[derive(Deserialize)]
pub struct CommentFilter {
    pub postid: Option<String>,
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    tracing::error!("Database error: {:?}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn not_found(id: &str) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("Comment {} not found", id))
}

pub async fn list_comments(
    State(db): State<Db>,
    Query(filter): Query<CommentFilter>,
) -> ApiResult<Json<Vec<Comment>>> {
    let comments = db
        .list_comments(filter.postid.as_deref())
        .await
        .map_err(internal)?;
    Ok(Json(comments))
}

pub async fn get_comment(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> ApiResult<Json<Comment>> {
    match db.get_comment(&id).await.map_err(internal)? {
        Some(comment) => Ok(Json(comment)),
        None => Err(not_found(&id)),
    }
}

pub async fn create_comment(
    State(db): State<Db>,
    Json(comment): Json<Comment>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    if comment.id.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Comment id is required".to_string()));
    }
    db.upsert_comment(&comment).await.map_err(internal)?;
    tracing::info!("Stored comment {} on post {}", comment.id, comment.post_id);
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn update_comment(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(mut comment): Json<Comment>,
) -> ApiResult<Json<Comment>> {
    comment.id = id;
    if db.update_comment(&comment).await.map_err(internal)? {
        Ok(Json(comment))
    } else {
        Err(not_found(&comment.id))
    }
}

pub async fn delete_comment(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    if db.delete_comment(&id).await.map_err(internal)? {
        Ok(Json(serde_json::json!({})))
    } else {
        Err(not_found(&id))
    }
}
