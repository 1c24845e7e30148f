//! HTTP API module.
//!
//! Public health and login endpoints plus authenticated identity and
//! user-management routes.

mod error;
mod extract;
mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use extract::ApiJson;
pub use handlers::{HealthResponse, LoginRequest, MeResponse};
pub use routes::create_router;
pub use state::AppState;
