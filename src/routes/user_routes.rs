use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::user_controller::{AdminController, UserController};
use crate::dto::api_response::ApiResponse;
use crate::dto::user_dto::{AdminStats, UpdateProfileRequest, UserFilters, UserResponse};
use crate::middleware::auth::Session;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::Paginated;

pub fn create_user_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/me", put(update_me))
        .route(
            "/me/selfie",
            post(upload_selfie).layer(DefaultBodyLimit::max(state.uploads.max_bytes() + 64 * 1024)),
        )
        .route("/:id", get(get_user).delete(delete_user))
}

pub fn create_admin_router() -> Router<AppState> {
    Router::new().route("/stats", get(admin_stats))
}

fn controller(state: &AppState) -> UserController {
    UserController::new(state.pool.clone(), state.config.bcrypt_cost)
}

async fn list_users(
    State(state): State<AppState>,
    session: Session,
    Query(filters): Query<UserFilters>,
) -> Result<Json<Paginated<UserResponse>>, AppError> {
    let response = controller(&state).list(&session, filters).await?;
    Ok(Json(response))
}

async fn get_user(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let response = controller(&state).get_by_id(&session, id).await?;
    Ok(Json(response))
}

async fn update_me(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let response = controller(&state).update_me(&session, request).await?;
    Ok(Json(response))
}

async fn upload_selfie(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let response = controller(&state).upload_selfie(&session, &state.uploads, multipart).await?;
    Ok(Json(response))
}

async fn delete_user(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    controller(&state).delete(&session, id).await?;
    Ok(Json(ApiResponse::message("Usuario eliminado exitosamente")))
}

async fn admin_stats(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<AdminStats>, AppError> {
    let controller = AdminController::new(state.pool.clone());
    let response = controller.stats(&session).await?;
    Ok(Json(response))
}
