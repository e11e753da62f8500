use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Film, Hall};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Screening {
    pub id: i64,
    pub film_id: i64,
    pub hall_id: i64,
    pub starts_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct ScreeningCreate {
    pub film_id: i64,
    pub hall_id: i64,
    pub starts_at: NaiveDateTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScreeningUpdate {
    pub film_id: Option<i64>,
    pub hall_id: Option<i64>,
    pub starts_at: Option<NaiveDateTime>,
}

/// Screening with its film and hall resolved.
#[derive(Debug, Serialize)]
pub struct ScreeningPublic {
    pub id: i64,
    pub starts_at: NaiveDateTime,
    pub film: Film,
    pub hall: Hall,
}
