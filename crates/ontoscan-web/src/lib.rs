//! ontoscan-web — JSON API over the annotator and recommender.
//!   - POST /api/annotator
//!   - POST /api/recommender
//!   - GET  /api/health

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::{build_router, serve};
pub use state::{AppState, SharedState};
