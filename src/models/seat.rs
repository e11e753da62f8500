use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted seat. The id is the UUID minted during scheme extraction, so it
/// matches the element id in the stored SVG.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Seat {
    pub id: Uuid,
    pub hall_id: i64,
    pub row: i32,
    pub column: i32,
}
