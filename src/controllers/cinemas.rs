use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{Cinema, CinemaCreate, CinemaUpdate};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cinema", get(list_cinemas).post(create_cinema))
        .route(
            "/cinema/{cinema_id}",
            get(get_cinema).patch(update_cinema).delete(delete_cinema),
        )
}

pub(crate) async fn fetch_cinema(pool: &sqlx::PgPool, cinema_id: i64) -> Result<Cinema, ApiError> {
    sqlx::query_as::<_, Cinema>(
        "SELECT id, name, address, latitude, longitude FROM cinemas WHERE id = $1",
    )
    .bind(cinema_id)
    .fetch_optional(pool)
    .await?
    .ok_or(ApiError::NotFound("Cinema"))
}

async fn create_cinema(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CinemaCreate>,
) -> Result<impl IntoResponse, ApiError> {
    let cinema = sqlx::query_as::<_, Cinema>(
        "INSERT INTO cinemas (name, address, latitude, longitude)
         VALUES ($1, $2, $3, $4)
         RETURNING id, name, address, latitude, longitude",
    )
    .bind(&payload.name)
    .bind(&payload.address)
    .bind(payload.latitude)
    .bind(payload.longitude)
    .fetch_one(&state.db.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(cinema)))
}

async fn list_cinemas(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let cinemas = sqlx::query_as::<_, Cinema>(
        "SELECT id, name, address, latitude, longitude FROM cinemas ORDER BY id",
    )
    .fetch_all(&state.db.pool)
    .await?;

    Ok(Json(cinemas))
}

async fn get_cinema(
    State(state): State<Arc<AppState>>,
    Path(cinema_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let cinema = fetch_cinema(&state.db.pool, cinema_id).await?;
    Ok(Json(cinema))
}

async fn update_cinema(
    State(state): State<Arc<AppState>>,
    Path(cinema_id): Path<i64>,
    Json(payload): Json<CinemaUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let cinema = sqlx::query_as::<_, Cinema>(
        "UPDATE cinemas
         SET name = COALESCE($2, name),
             address = COALESCE($3, address),
             latitude = COALESCE($4, latitude),
             longitude = COALESCE($5, longitude)
         WHERE id = $1
         RETURNING id, name, address, latitude, longitude",
    )
    .bind(cinema_id)
    .bind(payload.name)
    .bind(payload.address)
    .bind(payload.latitude)
    .bind(payload.longitude)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or(ApiError::NotFound("Cinema"))?;

    Ok(Json(cinema))
}

async fn delete_cinema(
    State(state): State<Arc<AppState>>,
    Path(cinema_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = sqlx::query("DELETE FROM cinemas WHERE id = $1")
        .bind(cinema_id)
        .execute(&state.db.pool)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound("Cinema"));
    }

    Ok(Json(json!({
        "message": format!("Successfully deleted cinema with id {cinema_id}")
    })))
}
