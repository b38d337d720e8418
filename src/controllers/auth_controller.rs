use sqlx::PgPool;
use tracing::info;
use validator::Validate;

use crate::dto::auth_dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::dto::user_dto::UserResponse;
use crate::middleware::auth::Session;
use crate::models::user::User;
use crate::repositories::user_repository::UserRepository;
use crate::utils::errors::AppError;
use crate::utils::jwt::{generate_token, JwtConfig};

const INVALID_CREDENTIALS: &str = "Email o contraseña incorrectos";

pub struct AuthController {
    repository: UserRepository,
    jwt: JwtConfig,
    bcrypt_cost: u32,
}

impl AuthController {
    pub fn new(pool: PgPool, jwt: JwtConfig, bcrypt_cost: u32) -> Self {
        Self {
            repository: UserRepository::new(pool),
            jwt,
            bcrypt_cost,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AppError> {
        request.validate()?;

        let email = request.email.trim().to_lowercase();
        if self.repository.email_exists(&email).await? {
            return Err(AppError::Conflict("El email ya está registrado".to_string()));
        }

        let password_hash = bcrypt::hash(&request.password, self.bcrypt_cost)?;
        let user = User::new(
            request.full_name.trim().to_string(),
            email,
            password_hash,
            request.phone,
        );
        let user = self.repository.create(&user).await?;

        info!("👤 Usuario registrado: {} ({})", user.email, user.id);
        self.open_session(user)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AppError> {
        request.validate()?;

        // Mismo mensaje para email desconocido y contraseña incorrecta
        let user = self
            .repository
            .find_by_email(request.email.trim())
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !bcrypt::verify(&request.password, &user.password_hash)? {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        info!("🔐 Login exitoso: {} como {}", user.email, user.role.as_str());
        self.open_session(user)
    }

    pub async fn me(&self, session: &Session) -> Result<UserResponse, AppError> {
        let user = self.current_user(session).await?;
        Ok(UserResponse::from(user))
    }

    /// Nuevo token con el rol que tiene hoy la cuenta (p. ej. tras ser
    /// aprobada como propietario)
    pub async fn refresh(&self, session: &Session) -> Result<AuthResponse, AppError> {
        let user = self.current_user(session).await?;
        if user.role != session.role() {
            info!("🔄 Rol actualizado para {}: {} -> {}", user.email, session.role().as_str(), user.role.as_str());
        }
        self.open_session(user)
    }

    async fn current_user(&self, session: &Session) -> Result<User, AppError> {
        self.repository
            .find_by_id(session.user_id())
            .await?
            .ok_or_else(|| AppError::Unauthorized("La cuenta ya no existe".to_string()))
    }

    fn open_session(&self, user: User) -> Result<AuthResponse, AppError> {
        let issued = generate_token(user.id, &user.email, user.role, &self.jwt)?;
        let session = Session::new(user.id, user.email.clone(), user.role);

        Ok(AuthResponse {
            token: issued.token,
            expires_at: issued.expires_at,
            session: session.view(),
            user: UserResponse::from(user),
        })
    }
}
