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
use crate::models::film::FilmScreeningSummary;
use crate::models::{Film, FilmCreate, FilmPublic, FilmUpdate, Genre, GenreCreate, GenreUpdate};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/film/genre", get(list_genres).post(create_genre))
        .route(
            "/film/genre/{genre_id}",
            get(get_genre).post(update_genre).delete(delete_genre),
        )
        .route("/film", get(list_films).post(create_film))
        .route(
            "/film/{film_id}",
            get(get_film).post(update_film).delete(delete_film),
        )
}

/* ---------- genres ---------- */

async fn create_genre(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GenreCreate>,
) -> Result<impl IntoResponse, ApiError> {
    let genre =
        sqlx::query_as::<_, Genre>("INSERT INTO genres (name) VALUES ($1) RETURNING id, name")
            .bind(&payload.name)
            .fetch_one(&state.db.pool)
            .await?;

    Ok((StatusCode::CREATED, Json(genre)))
}

async fn list_genres(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY id")
        .fetch_all(&state.db.pool)
        .await?;

    Ok(Json(genres))
}

async fn get_genre(
    State(state): State<Arc<AppState>>,
    Path(genre_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let genre = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
        .bind(genre_id)
        .fetch_optional(&state.db.pool)
        .await?
        .ok_or(ApiError::NotFound("Genre"))?;

    Ok(Json(genre))
}

async fn update_genre(
    State(state): State<Arc<AppState>>,
    Path(genre_id): Path<i64>,
    Json(payload): Json<GenreUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let genre = sqlx::query_as::<_, Genre>(
        "UPDATE genres SET name = $2 WHERE id = $1 RETURNING id, name",
    )
    .bind(genre_id)
    .bind(&payload.name)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or(ApiError::NotFound("Genre"))?;

    Ok(Json(genre))
}

async fn delete_genre(
    State(state): State<Arc<AppState>>,
    Path(genre_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = sqlx::query("DELETE FROM genres WHERE id = $1")
        .bind(genre_id)
        .execute(&state.db.pool)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound("Genre"));
    }

    Ok(Json(json!({
        "message": format!("Successfully deleted genre with id {genre_id}")
    })))
}

/* ---------- films ---------- */

async fn resolve_film(pool: &sqlx::PgPool, film: Film) -> Result<FilmPublic, ApiError> {
    let genres = sqlx::query_as::<_, Genre>(
        "SELECT g.id, g.name
         FROM genres g
         JOIN film_genres fg ON fg.genre_id = g.id
         WHERE fg.film_id = $1
         ORDER BY g.id",
    )
    .bind(film.id)
    .fetch_all(pool)
    .await?;

    let screenings = sqlx::query_as::<_, FilmScreeningSummary>(
        "SELECT id, hall_id, starts_at FROM screenings WHERE film_id = $1 ORDER BY starts_at",
    )
    .bind(film.id)
    .fetch_all(pool)
    .await?;

    Ok(FilmPublic {
        id: film.id,
        name: film.name,
        genres,
        screenings,
    })
}

async fn link_genres(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    film_id: i64,
    genre_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM film_genres WHERE film_id = $1")
        .bind(film_id)
        .execute(&mut **tx)
        .await?;

    // Unknown genre ids are dropped rather than rejected.
    sqlx::query(
        "INSERT INTO film_genres (film_id, genre_id)
         SELECT $1, id FROM genres WHERE id = ANY($2)",
    )
    .bind(film_id)
    .bind(genre_ids)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn create_film(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FilmCreate>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = state.db.pool.begin().await?;

    let film = sqlx::query_as::<_, Film>("INSERT INTO films (name) VALUES ($1) RETURNING id, name")
        .bind(&payload.name)
        .fetch_one(&mut *tx)
        .await?;

    link_genres(&mut tx, film.id, &payload.genres).await?;
    tx.commit().await?;

    let public = resolve_film(&state.db.pool, film).await?;
    Ok((StatusCode::CREATED, Json(public)))
}

async fn list_films(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let films = sqlx::query_as::<_, Film>("SELECT id, name FROM films ORDER BY id")
        .fetch_all(&state.db.pool)
        .await?;

    let mut resolved = Vec::with_capacity(films.len());
    for film in films {
        resolved.push(resolve_film(&state.db.pool, film).await?);
    }

    Ok(Json(resolved))
}

async fn get_film(
    State(state): State<Arc<AppState>>,
    Path(film_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let film = sqlx::query_as::<_, Film>("SELECT id, name FROM films WHERE id = $1")
        .bind(film_id)
        .fetch_optional(&state.db.pool)
        .await?
        .ok_or(ApiError::NotFound("Film"))?;

    let public = resolve_film(&state.db.pool, film).await?;
    Ok(Json(public))
}

async fn update_film(
    State(state): State<Arc<AppState>>,
    Path(film_id): Path<i64>,
    Json(payload): Json<FilmUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = state.db.pool.begin().await?;

    let film = sqlx::query_as::<_, Film>(
        "UPDATE films SET name = COALESCE($2, name) WHERE id = $1 RETURNING id, name",
    )
    .bind(film_id)
    .bind(payload.name)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(ApiError::NotFound("Film"))?;

    if let Some(genre_ids) = &payload.genres {
        link_genres(&mut tx, film.id, genre_ids).await?;
    }
    tx.commit().await?;

    let public = resolve_film(&state.db.pool, film).await?;
    Ok(Json(public))
}

async fn delete_film(
    State(state): State<Arc<AppState>>,
    Path(film_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = sqlx::query("DELETE FROM films WHERE id = $1")
        .bind(film_id)
        .execute(&state.db.pool)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound("Film"));
    }

    Ok(Json(json!({
        "message": format!("Successfully deleted film with id {film_id}")
    })))
}
