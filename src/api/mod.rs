pub mod handlers;
pub mod routes;
pub mod snapshot;

pub use routes::{router, AppState};
