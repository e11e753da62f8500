use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Hall {
    pub id: i64,
    pub cinema_id: i64,
    pub name: String,
    pub capacity: i32,
    pub is_vip: bool,
}

#[derive(Debug, Deserialize)]
pub struct HallCreate {
    pub name: String,
    pub capacity: i32,
    pub is_vip: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct HallUpdate {
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub is_vip: Option<bool>,
}
