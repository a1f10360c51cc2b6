//! Investing Coach lead API library
//!
//! This library provides the lead-capture HTTP API: request handlers, the lead
//! entity model, and the document store gateway the handlers persist through.
//!
//! # Modules
//!
//! - `app`: Router, middleware and OpenAPI document.
//! - `config`: Configuration management.
//! - `db`: Postgres connection pool.
//! - `db_storage`: Postgres-backed document store.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `memory_storage`: In-process document store.
//! - `models`: Lead model and API bodies.
//! - `mongo_storage`: MongoDB-backed document store.
//! - `store`: Document store trait and backend selection.

pub mod app;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod handlers;
pub mod memory_storage;
pub mod models;
pub mod mongo_storage;
pub mod store;
