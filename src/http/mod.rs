pub mod errors;
pub mod input;
pub mod models;
pub mod routes;
pub mod state;

pub use errors::{ApiError, RequestError};
pub use input::parse_request_data;
pub use models::*;
pub use routes::create_router;
pub use state::AppState;
