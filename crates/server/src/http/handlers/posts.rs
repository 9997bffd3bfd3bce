use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::Post;
use storage::Db;

type ApiResult<T> = Result<T, (StatusCode, String)>;

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    tracing::error!("Database error: {:?}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn not_found(id: &str) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("Post {} not found", id))
}

pub async fn list_posts(State(db): State<Db>) -> ApiResult<Json<Vec<Post>>> {
    let posts = db.list_posts().await.map_err(internal)?;
    Ok(Json(posts))
}

pub async fn get_post(State(db): State<Db>, Path(id): Path<String>) -> ApiResult<Json<Post>> {
    match db.get_post(&id).await.map_err(internal)? {
        Some(post) => Ok(Json(post)),
        None => Err(not_found(&id)),
    }
}

// 同一 id 重复提交时覆盖，离线队列的重放因此是幂等的
pub async fn create_post(
    State(db): State<Db>,
    Json(post): Json<Post>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    if post.id.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Post id is required".to_string()));
    }
    db.upsert_post(&post).await.map_err(internal)?;
    tracing::info!("Stored post {}", post.id);
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update_post(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(mut post): Json<Post>,
) -> ApiResult<Json<Post>> {
    post.id = id;
    if db.update_post(&post).await.map_err(internal)? {
        Ok(Json(post))
    } else {
        Err(not_found(&post.id))
    }
}

pub async fn delete_post(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    if db.delete_post(&id).await.map_err(internal)? {
        Ok(Json(serde_json::json!({})))
    } else {
        Err(not_found(&id))
    }
}
