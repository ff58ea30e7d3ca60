//! QuickDesk: a help-desk ticketing service.
//!
//! In-memory record store with simulated latency, a dashboard query
//! layer (search/filter/sort/paginate), voting, token-based auth, and an
//! Axum REST surface. This lib exposes the store and query engine; the
//! binaries wire them to HTTP and the CLI.

pub mod auth;
pub mod config;
pub mod models;
pub mod query;
pub mod rest;
pub mod seed;
pub mod storage;
