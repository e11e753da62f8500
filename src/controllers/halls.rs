use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::controllers::cinemas::fetch_cinema;
use crate::error::ApiError;
use crate::models::{Hall, HallCreate, HallUpdate, Seat};
use crate::services::layout;
use crate::storage::SchemeStorage;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cinema/{cinema_id}/hall", get(list_halls).post(create_hall))
        .route(
            "/cinema/{cinema_id}/hall/{hall_id}",
            get(get_hall).patch(update_hall).delete(delete_hall),
        )
        .route(
            "/cinema/{cinema_id}/hall/{hall_id}/scheme",
            post(upload_scheme).get(get_scheme),
        )
        .route("/cinema/{cinema_id}/hall/{hall_id}/seat", get(list_seats))
}

pub(crate) async fn fetch_hall(
    pool: &sqlx::PgPool,
    cinema_id: i64,
    hall_id: i64,
) -> Result<Hall, ApiError> {
    sqlx::query_as::<_, Hall>(
        "SELECT id, cinema_id, name, capacity, is_vip
         FROM halls WHERE cinema_id = $1 AND id = $2",
    )
    .bind(cinema_id)
    .bind(hall_id)
    .fetch_optional(pool)
    .await?
    .ok_or(ApiError::NotFound("Hall"))
}

async fn create_hall(
    State(state): State<Arc<AppState>>,
    Path(cinema_id): Path<i64>,
    Json(payload): Json<HallCreate>,
) -> Result<impl IntoResponse, ApiError> {
    fetch_cinema(&state.db.pool, cinema_id).await?;

    let hall = sqlx::query_as::<_, Hall>(
        "INSERT INTO halls (cinema_id, name, capacity, is_vip)
         VALUES ($1, $2, $3, $4)
         RETURNING id, cinema_id, name, capacity, is_vip",
    )
    .bind(cinema_id)
    .bind(&payload.name)
    .bind(payload.capacity)
    .bind(payload.is_vip)
    .fetch_one(&state.db.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(hall)))
}

async fn list_halls(
    State(state): State<Arc<AppState>>,
    Path(cinema_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    fetch_cinema(&state.db.pool, cinema_id).await?;

    let halls = sqlx::query_as::<_, Hall>(
        "SELECT id, cinema_id, name, capacity, is_vip
         FROM halls WHERE cinema_id = $1 ORDER BY id",
    )
    .bind(cinema_id)
    .fetch_all(&state.db.pool)
    .await?;

    Ok(Json(halls))
}

async fn get_hall(
    State(state): State<Arc<AppState>>,
    Path((cinema_id, hall_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    let hall = fetch_hall(&state.db.pool, cinema_id, hall_id).await?;
    Ok(Json(hall))
}

async fn update_hall(
    State(state): State<Arc<AppState>>,
    Path((cinema_id, hall_id)): Path<(i64, i64)>,
    Json(payload): Json<HallUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let hall = sqlx::query_as::<_, Hall>(
        "UPDATE halls
         SET name = COALESCE($3, name),
             capacity = COALESCE($4, capacity),
             is_vip = COALESCE($5, is_vip)
         WHERE cinema_id = $1 AND id = $2
         RETURNING id, cinema_id, name, capacity, is_vip",
    )
    .bind(cinema_id)
    .bind(hall_id)
    .bind(payload.name)
    .bind(payload.capacity)
    .bind(payload.is_vip)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or(ApiError::NotFound("Hall"))?;

    Ok(Json(hall))
}

async fn delete_hall(
    State(state): State<Arc<AppState>>,
    Path((cinema_id, hall_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = sqlx::query("DELETE FROM halls WHERE cinema_id = $1 AND id = $2")
        .bind(cinema_id)
        .bind(hall_id)
        .execute(&state.db.pool)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound("Hall"));
    }

    Ok(Json(json!({
        "message": format!("Successfully deleted hall with id {hall_id}")
    })))
}

async fn list_seats(
    State(state): State<Arc<AppState>>,
    Path((cinema_id, hall_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    let hall = fetch_hall(&state.db.pool, cinema_id, hall_id).await?;

    let seats = sqlx::query_as::<_, Seat>(
        r#"SELECT id, hall_id, "row", "column"
           FROM seats WHERE hall_id = $1 ORDER BY "row", "column""#,
    )
    .bind(hall.id)
    .fetch_all(&state.db.pool)
    .await?;

    Ok(Json(seats))
}

// POST /cinema/{cinema_id}/hall/{hall_id}/scheme
//
// Takes an SVG floor plan as a multipart file, extracts its seat markers,
// stores the sanitized document, and replaces the hall's seats. Extraction
// runs before any seats are touched, so a malformed upload never wipes an
// existing layout.
async fn upload_scheme(
    State(state): State<Arc<AppState>>,
    Path((cinema_id, hall_id)): Path<(i64, i64)>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let hall = fetch_hall(&state.db.pool, cinema_id, hall_id).await?;

    let data = scheme_field_bytes(&mut multipart).await?;

    let (sanitized, markers) = layout::extract_seats(data.as_ref(), &layout::DEFAULT_SEAT_TAGS)?;

    let key = SchemeStorage::scheme_key(cinema_id, hall.id);
    state.storage.put(&key, sanitized).await?;

    let mut tx = state.db.pool.begin().await?;
    sqlx::query("DELETE FROM seats WHERE hall_id = $1")
        .bind(hall.id)
        .execute(&mut *tx)
        .await?;
    for marker in &markers {
        sqlx::query(r#"INSERT INTO seats (id, hall_id, "row", "column") VALUES ($1, $2, $3, $4)"#)
            .bind(marker.id)
            .bind(hall.id)
            .bind(marker.row)
            .bind(marker.column)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    info!(
        "Replaced seats for hall {}: {} markers from uploaded scheme",
        hall.id,
        markers.len()
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "key": key,
            "url": state.storage.url(&key),
            "seats": markers.len(),
        })),
    ))
}

async fn get_scheme(
    State(state): State<Arc<AppState>>,
    Path((cinema_id, hall_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    let hall = fetch_hall(&state.db.pool, cinema_id, hall_id).await?;

    let key = SchemeStorage::scheme_key(cinema_id, hall.id);
    state
        .storage
        .get(&key)
        .await
        .map_err(scheme_lookup_error)?;

    Ok(Json(json!({
        "key": key,
        "url": state.storage.url(&key),
    })))
}

// A missing object is a 404; anything else (outage, auth) stays a storage error.
fn scheme_lookup_error(err: object_store::Error) -> ApiError {
    match err {
        object_store::Error::NotFound { .. } => ApiError::NotFound("Scheme"),
        other => ApiError::Storage(other),
    }
}

// The scheme arrives as the multipart field named "file" (or any field
// carrying a filename); text parts are skipped.
async fn scheme_field_bytes(multipart: &mut Multipart) -> Result<bytes::Bytes, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") || field.file_name().is_some() {
            return Ok(field.bytes().await?);
        }
    }
    Err(ApiError::BadRequest(
        "multipart upload must contain a scheme file".into(),
    ))
}
