use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct GenreCreate {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct GenreUpdate {
    pub name: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Film {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct FilmCreate {
    pub name: String,
    /// Genre ids to link; unknown ids are silently dropped.
    #[serde(default)]
    pub genres: Vec<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FilmUpdate {
    pub name: Option<String>,
    /// When present, replaces the film's genre links wholesale.
    pub genres: Option<Vec<i64>>,
}

/// Film with its genre links and screening summaries resolved.
#[derive(Debug, Serialize)]
pub struct FilmPublic {
    pub id: i64,
    pub name: String,
    pub genres: Vec<Genre>,
    pub screenings: Vec<FilmScreeningSummary>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct FilmScreeningSummary {
    pub id: i64,
    pub hall_id: i64,
    pub starts_at: NaiveDateTime,
}
