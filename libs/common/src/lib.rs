//! Common library for the Soko marketplace
//!
//! This crate provides shared infrastructure used across the marketplace
//! services: PostgreSQL connection pooling, health checks, and the database
//! error taxonomy.

pub mod database;
pub mod error;
