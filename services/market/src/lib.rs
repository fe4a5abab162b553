//! Market service library
//!
//! The service's modules live here so the binary and the integration tests
//! share one crate.

pub mod error;
pub mod geocode;
pub mod listings;
pub mod middleware;
pub mod models;
pub mod payments;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod uploads;
