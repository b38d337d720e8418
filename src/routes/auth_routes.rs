use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};

use crate::controllers::auth_controller::AuthController;
use crate::dto::auth_dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::dto::user_dto::UserResponse;
use crate::middleware::auth::{Session, SessionView};
use crate::middleware::rate_limit::rate_limit_middleware;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas de autenticación. Login y registro pasan por el rate limiting.
pub fn create_auth_router(state: &AppState) -> Router<AppState> {
    let limited = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route_layer(from_fn_with_state(state.rate_limit.clone(), rate_limit_middleware));

    Router::new()
        .merge(limited)
        .route("/session", get(session))
        .route("/me", get(me))
        .route("/refresh", post(refresh))
}

fn controller(state: &AppState) -> AuthController {
    AuthController::new(state.pool.clone(), state.jwt.clone(), state.config.bcrypt_cost)
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = controller(&state).register(request).await?;
    Ok(Json(response))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = controller(&state).login(request).await?;
    Ok(Json(response))
}

// Solo decodifica el token, sin acceso a la base de datos
async fn session(session: Session) -> Json<SessionView> {
    Json(session.view())
}

async fn me(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<UserResponse>, AppError> {
    let response = controller(&state).me(&session).await?;
    Ok(Json(response))
}

async fn refresh(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<AuthResponse>, AppError> {
    let response = controller(&state).refresh(&session).await?;
    Ok(Json(response))
}
