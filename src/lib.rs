//! Listings API Library
//!
//! HTTP create/list/delete over a single collection of property listings kept
//! in a remote record store (Firestore by default, Postgres or in-memory as
//! alternatives).
//!
//! # Modules
//!
//! - `api`: Route table, middleware, and OpenAPI document.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and shared state.
//! - `models`: Listing documents and creation validation.
//! - `store`: Record store trait and its backends.

pub mod api;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod store;
