//! HTTP feed server.
//!
//! Serves cached broadcast collections as RSS documents under
//! `/feeds/:channel/:programme`.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
