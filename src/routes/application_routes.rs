use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    routing::{get, patch},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::application_controller::ApplicationController;
use crate::dto::api_response::ApiResponse;
use crate::dto::application_dto::{
    ApplicationFilters, ApplicationResponse, UpdateApplicationStatusRequest,
};
use crate::middleware::auth::Session;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::Paginated;

pub fn create_application_router(state: &AppState) -> Router<AppState> {
    // Dos archivos más los campos de texto
    let body_limit = state.uploads.max_bytes() * 2 + 64 * 1024;

    Router::new()
        .route(
            "/",
            get(list_applications)
                .post(submit_application)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/mine", get(my_applications))
        .route("/:id/status", patch(update_application_status))
}

async fn submit_application(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ApplicationResponse>>, AppError> {
    let controller = ApplicationController::new(state.pool.clone());
    let response = controller.submit(&session, &state.uploads, multipart).await?;
    Ok(Json(response))
}

async fn list_applications(
    State(state): State<AppState>,
    session: Session,
    Query(filters): Query<ApplicationFilters>,
) -> Result<Json<Paginated<ApplicationResponse>>, AppError> {
    let controller = ApplicationController::new(state.pool.clone());
    let response = controller.list(&session, filters).await?;
    Ok(Json(response))
}

async fn my_applications(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<ApplicationResponse>>, AppError> {
    let controller = ApplicationController::new(state.pool.clone());
    let response = controller.list_mine(&session).await?;
    Ok(Json(response))
}

async fn update_application_status(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateApplicationStatusRequest>,
) -> Result<Json<ApiResponse<ApplicationResponse>>, AppError> {
    let controller = ApplicationController::new(state.pool.clone());
    let response = controller.update_status(&session, id, request).await?;
    Ok(Json(response))
}
