/// Post handlers - HTTP endpoints for the post mutation API
use crate::error::Result;
use crate::models::{NewComment, NewPost, PostChanges};
use crate::state::AppState;
use actix_middleware::UserId;
use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

pub async fn list_posts(state: web::Data<AppState>) -> Result<HttpResponse> {
    let posts = state.posts().list().await?;
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn get_post(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    let post = state.posts().get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn create_post(
    state: web::Data<AppState>,
    user_id: UserId,
    body: web::Json<NewPost>,
) -> Result<HttpResponse> {
    let post = state.posts().create(user_id.0, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(post))
}

pub async fn update_post(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<Uuid>,
    body: web::Json<PostChanges>,
) -> Result<HttpResponse> {
    let post = state
        .posts()
        .update(user_id.0, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn delete_post(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state.posts().delete(user_id.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Post removed" })))
}

pub async fn toggle_like(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let likes = state
        .posts()
        .toggle_like(user_id.0, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(likes))
}

pub async fn add_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<Uuid>,
    body: web::Json<NewComment>,
) -> Result<HttpResponse> {
    let comments = state
        .posts()
        .add_comment(user_id.0, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(comments))
}

pub async fn delete_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    state
        .posts()
        .delete_comment(user_id.0, post_id, comment_id)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Comment removed" })))
}
