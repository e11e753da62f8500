pub mod cinemas;
pub mod films;
pub mod halls;
pub mod screenings;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(cinemas::routes())
        .merge(halls::routes())
        .merge(films::routes())
        .merge(screenings::routes())
}
