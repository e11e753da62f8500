use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{Film, Hall, Screening, ScreeningCreate, ScreeningPublic, ScreeningUpdate};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/screening", post(create_screening))
        .route(
            "/screening/{screening_id}",
            get(get_screening)
                .post(update_screening)
                .delete(delete_screening),
        )
}

async fn film_by_id(pool: &sqlx::PgPool, film_id: i64) -> Result<Film, ApiError> {
    sqlx::query_as::<_, Film>("SELECT id, name FROM films WHERE id = $1")
        .bind(film_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::NotFound("Film"))
}

async fn hall_by_id(pool: &sqlx::PgPool, hall_id: i64) -> Result<Hall, ApiError> {
    sqlx::query_as::<_, Hall>(
        "SELECT id, cinema_id, name, capacity, is_vip FROM halls WHERE id = $1",
    )
    .bind(hall_id)
    .fetch_optional(pool)
    .await?
    .ok_or(ApiError::NotFound("Hall"))
}

async fn resolve_screening(
    pool: &sqlx::PgPool,
    screening: Screening,
) -> Result<ScreeningPublic, ApiError> {
    let film = film_by_id(pool, screening.film_id).await?;
    let hall = hall_by_id(pool, screening.hall_id).await?;

    Ok(ScreeningPublic {
        id: screening.id,
        starts_at: screening.starts_at,
        film,
        hall,
    })
}

async fn create_screening(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ScreeningCreate>,
) -> Result<impl IntoResponse, ApiError> {
    let film = film_by_id(&state.db.pool, payload.film_id).await?;
    let hall = hall_by_id(&state.db.pool, payload.hall_id).await?;

    let screening = sqlx::query_as::<_, Screening>(
        "INSERT INTO screenings (film_id, hall_id, starts_at)
         VALUES ($1, $2, $3)
         RETURNING id, film_id, hall_id, starts_at",
    )
    .bind(film.id)
    .bind(hall.id)
    .bind(payload.starts_at)
    .fetch_one(&state.db.pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ScreeningPublic {
            id: screening.id,
            starts_at: screening.starts_at,
            film,
            hall,
        }),
    ))
}

async fn get_screening(
    State(state): State<Arc<AppState>>,
    Path(screening_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let screening = sqlx::query_as::<_, Screening>(
        "SELECT id, film_id, hall_id, starts_at FROM screenings WHERE id = $1",
    )
    .bind(screening_id)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or(ApiError::NotFound("Screening"))?;

    let public = resolve_screening(&state.db.pool, screening).await?;
    Ok(Json(public))
}

async fn update_screening(
    State(state): State<Arc<AppState>>,
    Path(screening_id): Path<i64>,
    Json(payload): Json<ScreeningUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    // Validate targets before touching the row.
    if let Some(film_id) = payload.film_id {
        film_by_id(&state.db.pool, film_id).await?;
    }
    if let Some(hall_id) = payload.hall_id {
        hall_by_id(&state.db.pool, hall_id).await?;
    }

    let screening = sqlx::query_as::<_, Screening>(
        "UPDATE screenings
         SET film_id = COALESCE($2, film_id),
             hall_id = COALESCE($3, hall_id),
             starts_at = COALESCE($4, starts_at)
         WHERE id = $1
         RETURNING id, film_id, hall_id, starts_at",
    )
    .bind(screening_id)
    .bind(payload.film_id)
    .bind(payload.hall_id)
    .bind(payload.starts_at)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or(ApiError::NotFound("Screening"))?;

    let public = resolve_screening(&state.db.pool, screening).await?;
    Ok(Json(public))
}

async fn delete_screening(
    State(state): State<Arc<AppState>>,
    Path(screening_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = sqlx::query("DELETE FROM screenings WHERE id = $1")
        .bind(screening_id)
        .execute(&state.db.pool)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound("Screening"));
    }

    Ok(Json(json!({
        "message": format!("Successfully deleted screening with id {screening_id}")
    })))
}
