/// Account handlers - registration, login and profile
use crate::error::Result;
use crate::models::{LoginRequest, ProfileChanges, RegisterRequest};
use crate::state::AppState;
use actix_middleware::UserId;
use actix_web::{web, HttpResponse};

pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let resp = state.accounts().register(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(resp))
}

pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let resp = state.accounts().login(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(resp))
}

pub async fn get_profile(state: web::Data<AppState>, user_id: UserId) -> Result<HttpResponse> {
    let profile = state.accounts().profile(user_id.0).await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn update_profile(
    state: web::Data<AppState>,
    user_id: UserId,
    body: web::Json<ProfileChanges>,
) -> Result<HttpResponse> {
    let resp = state
        .accounts()
        .update_profile(user_id.0, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(resp))
}
