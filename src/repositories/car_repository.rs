use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::car_dto::CarFilters;
use crate::models::car::{Car, CarStatus};
use crate::utils::errors::AppError;

const CAR_FILTERS: &str = r#"
    WHERE ($1::car_status IS NULL OR status = $1)
      AND ($2::text IS NULL OR transmission ILIKE $2)
      AND ($3::text IS NULL OR fuel_type ILIKE $3)
      AND ($4::numeric IS NULL OR price >= $4)
      AND ($5::numeric IS NULL OR price <= $5)
      AND ($6::int IS NULL OR seats >= $6)
      AND ($7::text IS NULL OR name ILIKE '%' || $7 || '%' OR plate_number ILIKE '%' || $7 || '%')
"#;

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// Los parámetros $1..$7 son comunes al listado y al conteo
fn bind_filters<'q, O>(
    query: QueryAs<'q, Postgres, O, PgArguments>,
    filters: &'q CarFilters,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    query
        .bind(filters.status)
        .bind(non_empty(&filters.transmission))
        .bind(non_empty(&filters.fuel_type))
        .bind(filters.min_price)
        .bind(filters.max_price)
        .bind(filters.min_seats)
        .bind(non_empty(&filters.search))
}

pub struct CarRepository {
    pool: PgPool,
}

impl CarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, car: &Car) -> Result<Car, AppError> {
        let created = sqlx::query_as::<_, Car>(
            r#"
            INSERT INTO cars (
                id, owner_id, name, price, seats, transmission, fuel_type,
                plate_number, rating, image, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(car.id)
        .bind(car.owner_id)
        .bind(&car.name)
        .bind(car.price)
        .bind(car.seats)
        .bind(&car.transmission)
        .bind(&car.fuel_type)
        .bind(&car.plate_number)
        .bind(car.rating)
        .bind(&car.image)
        .bind(car.status)
        .bind(car.created_at)
        .bind(car.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Car>, AppError> {
        let car = sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(car)
    }

    /// Bloquear la fila del auto hasta el final de la transacción
    pub async fn find_by_id_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Car>, AppError> {
        let car = sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(car)
    }

    pub async fn plate_exists(&self, plate_number: &str, exclude_id: Option<Uuid>) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM cars WHERE UPPER(plate_number) = UPPER($1) AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(plate_number)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    pub async fn list(&self, filters: &CarFilters) -> Result<(Vec<Car>, i64), AppError> {
        let params = filters.page_params();

        let list_sql = format!(
            "SELECT * FROM cars {} ORDER BY created_at DESC LIMIT $8 OFFSET $9",
            CAR_FILTERS
        );
        let cars = bind_filters(sqlx::query_as::<_, Car>(&list_sql), filters)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM cars {}", CAR_FILTERS);
        let total = bind_filters(sqlx::query_as::<_, (i64,)>(&count_sql), filters)
            .fetch_one(&self.pool)
            .await?;

        Ok((cars, total.0))
    }

    pub async fn list_by_status(&self, status: CarStatus) -> Result<Vec<Car>, AppError> {
        let cars = sqlx::query_as::<_, Car>(
            "SELECT * FROM cars WHERE status = $1 ORDER BY created_at DESC",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(cars)
    }

    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Car>, AppError> {
        let cars = sqlx::query_as::<_, Car>(
            "SELECT * FROM cars WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(cars)
    }

    /// Guardar los cambios de un auto leído antes.
    ///
    /// Solo escribe si la fila no cambió desde esa lectura (`updated_at`);
    /// si otro request la modificó devuelve `None`.
    pub async fn update(&self, car: &Car) -> Result<Option<Car>, AppError> {
        let updated = sqlx::query_as::<_, Car>(
            r#"
            UPDATE cars
            SET name = $2, price = $3, seats = $4, transmission = $5, fuel_type = $6,
                plate_number = $7, rating = $8, status = $9, updated_at = NOW()
            WHERE id = $1 AND updated_at = $10
            RETURNING *
            "#,
        )
        .bind(car.id)
        .bind(&car.name)
        .bind(car.price)
        .bind(car.seats)
        .bind(&car.transmission)
        .bind(&car.fuel_type)
        .bind(&car.plate_number)
        .bind(car.rating)
        .bind(car.status)
        .bind(car.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    pub async fn update_status(&self, id: Uuid, status: CarStatus) -> Result<Car, AppError> {
        let car = sqlx::query_as::<_, Car>(
            "UPDATE cars SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Auto no encontrado".to_string()))?;

        Ok(car)
    }

    pub async fn update_image(&self, id: Uuid, url: &str) -> Result<Car, AppError> {
        let car = sqlx::query_as::<_, Car>(
            "UPDATE cars SET image = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Auto no encontrado".to_string()))?;

        Ok(car)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn count_by_status(&self) -> Result<Vec<(CarStatus, i64)>, AppError> {
        let rows = sqlx::query_as::<_, (CarStatus, i64)>(
            "SELECT status, COUNT(*) FROM cars GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
