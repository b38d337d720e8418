use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::user_dto::UserFilters;
use crate::models::{role::Role, user::User};
use crate::utils::errors::AppError;

const USER_FILTERS: &str = r#"
    WHERE ($1::user_role IS NULL OR role = $1)
      AND ($2::text IS NULL OR full_name ILIKE '%' || $2 || '%' OR email ILIKE '%' || $2 || '%')
"#;

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user: &User) -> Result<User, AppError> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, full_name, email, password_hash, phone, role, profile_image, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(user.role)
        .bind(&user.profile_image)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Rol actual en la base de datos; `None` si la cuenta ya no existe
    pub async fn current_role(&self, id: Uuid) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, (Role,)>("SELECT role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(role.map(|(role,)| role))
    }

    /// Comprobar que la cuenta existe y bloquearla contra un borrado
    /// hasta que termine la transacción
    pub async fn exists_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<bool, AppError> {
        let row = sqlx::query_as::<_, (Uuid,)>("SELECT id FROM users WHERE id = $1 FOR KEY SHARE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(row.is_some())
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }

    pub async fn list(&self, filters: &UserFilters) -> Result<(Vec<User>, i64), AppError> {
        let params = filters.page_params();
        let search = filters.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT * FROM users {} ORDER BY created_at DESC LIMIT $3 OFFSET $4",
            USER_FILTERS
        ))
        .bind(filters.role)
        .bind(search)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM users {}", USER_FILTERS))
            .bind(filters.role)
            .bind(search)
            .fetch_one(&self.pool)
            .await?;

        Ok((users, total.0))
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        full_name: Option<String>,
        phone: Option<String>,
        password_hash: Option<String>,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET full_name = COALESCE($2, full_name),
                phone = COALESCE($3, phone),
                password_hash = COALESCE($4, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(full_name)
        .bind(phone)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

        Ok(user)
    }

    pub async fn update_profile_image(&self, id: Uuid, url: &str) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET profile_image = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

        Ok(user)
    }

    /// Cambiar el rol dentro de una transacción existente
    pub async fn set_role(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        role: Role,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(role)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_by_role(&self) -> Result<Vec<(Role, i64)>, AppError> {
        let rows = sqlx::query_as::<_, (Role, i64)>("SELECT role, COUNT(*) FROM users GROUP BY role")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}
