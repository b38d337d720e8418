use axum::{
    extract::{Path, Query, State},
    routing::{get, patch},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::booking_controller::BookingController;
use crate::dto::api_response::ApiResponse;
use crate::dto::booking_dto::{
    BookingFilters, BookingResponse, CreateBookingRequest, UpdateBookingStatusRequest,
};
use crate::middleware::auth::Session;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::Paginated;

pub fn create_booking_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bookings).post(create_booking))
        .route("/mine", get(my_bookings))
        .route("/owner", get(owner_bookings))
        .route("/:id", get(get_booking))
        .route("/:id/status", patch(update_booking_status))
}

async fn create_booking(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let controller = BookingController::new(state.pool.clone());
    let response = controller.create(&session, request).await?;
    Ok(Json(response))
}

async fn list_bookings(
    State(state): State<AppState>,
    session: Session,
    Query(filters): Query<BookingFilters>,
) -> Result<Json<Paginated<BookingResponse>>, AppError> {
    let controller = BookingController::new(state.pool.clone());
    let response = controller.list(&session, filters).await?;
    Ok(Json(response))
}

async fn my_bookings(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let controller = BookingController::new(state.pool.clone());
    let response = controller.list_mine(&session).await?;
    Ok(Json(response))
}

async fn owner_bookings(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let controller = BookingController::new(state.pool.clone());
    let response = controller.list_for_owner(&session).await?;
    Ok(Json(response))
}

async fn get_booking(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let controller = BookingController::new(state.pool.clone());
    let response = controller.get_by_id(&session, id).await?;
    Ok(Json(response))
}

async fn update_booking_status(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBookingStatusRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let controller = BookingController::new(state.pool.clone());
    let response = controller.update_status(&session, id, request).await?;
    Ok(Json(response))
}
