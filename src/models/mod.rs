pub mod cinema;
pub mod film;
pub mod hall;
pub mod screening;
pub mod seat;

pub use cinema::{Cinema, CinemaCreate, CinemaUpdate};
pub use film::{Film, FilmCreate, FilmPublic, FilmUpdate, Genre, GenreCreate, GenreUpdate};
pub use hall::{Hall, HallCreate, HallUpdate};
pub use screening::{Screening, ScreeningCreate, ScreeningPublic, ScreeningUpdate};
pub use seat::Seat;
