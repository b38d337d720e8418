use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::car_controller::CarController;
use crate::dto::api_response::ApiResponse;
use crate::dto::car_dto::{
    AvailabilityQuery, CarFilters, CarResponse, CreateCarRequest, UpdateCarRequest,
    UpdateCarStatusRequest,
};
use crate::middleware::auth::Session;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::Paginated;

pub fn create_car_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_cars).post(create_car))
        .route("/available", get(available_cars))
        .route("/mine", get(my_cars))
        .route("/:id", get(get_car).put(update_car).delete(delete_car))
        .route("/:id/status", patch(update_car_status))
        .route(
            "/:id/image",
            post(upload_car_image).layer(DefaultBodyLimit::max(state.uploads.max_bytes() + 64 * 1024)),
        )
}

async fn list_cars(
    State(state): State<AppState>,
    Query(filters): Query<CarFilters>,
) -> Result<Json<Paginated<CarResponse>>, AppError> {
    let controller = CarController::new(state.pool.clone());
    let response = controller.list(filters).await?;
    Ok(Json(response))
}

async fn available_cars(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<CarResponse>>, AppError> {
    let controller = CarController::new(state.pool.clone());
    let response = controller.available(query).await?;
    Ok(Json(response))
}

async fn my_cars(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<CarResponse>>, AppError> {
    let controller = CarController::new(state.pool.clone());
    let response = controller.list_mine(&session).await?;
    Ok(Json(response))
}

async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CarResponse>, AppError> {
    let controller = CarController::new(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn create_car(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CreateCarRequest>,
) -> Result<Json<ApiResponse<CarResponse>>, AppError> {
    let controller = CarController::new(state.pool.clone());
    let response = controller.create(&session, request).await?;
    Ok(Json(response))
}

async fn update_car(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCarRequest>,
) -> Result<Json<ApiResponse<CarResponse>>, AppError> {
    let controller = CarController::new(state.pool.clone());
    let response = controller.update(&session, id, request).await?;
    Ok(Json(response))
}

async fn update_car_status(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCarStatusRequest>,
) -> Result<Json<ApiResponse<CarResponse>>, AppError> {
    let controller = CarController::new(state.pool.clone());
    let response = controller.update_status(&session, id, request).await?;
    Ok(Json(response))
}

async fn upload_car_image(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<CarResponse>>, AppError> {
    let controller = CarController::new(state.pool.clone());
    let response = controller.upload_image(&session, id, &state.uploads, multipart).await?;
    Ok(Json(response))
}

async fn delete_car(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = CarController::new(state.pool.clone());
    controller.delete(&session, id, &state.uploads).await?;
    Ok(Json(ApiResponse::message("Auto eliminado exitosamente")))
}
