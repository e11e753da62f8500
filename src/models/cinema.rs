use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Cinema {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
pub struct CinemaCreate {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

// PATCH payload: absent fields keep their current value.
#[derive(Debug, Default, Deserialize)]
pub struct CinemaUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}
