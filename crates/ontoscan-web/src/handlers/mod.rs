//! HTTP handlers for all API routes.

pub mod annotator;
pub mod health;
pub mod recommender;
