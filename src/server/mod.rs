//! HTTP server: shared state, routes and the builder that ties them together

pub mod builder;
pub mod router;
pub mod state;

pub use builder::ServerBuilder;
pub use router::build_router;
pub use state::AppState;
