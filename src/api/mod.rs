//! API Module
//!
//! HTTP handlers and routing for the resource cache REST API.
//!
//! # Endpoints
//! - `PUT /set` - Store a value
//! - `GET /get/*key` - Retrieve a value by key
//! - `GET /has/*key` - Check whether a live entry exists
//! - `DELETE /del/*key` - Delete a key
//! - `POST /invalidate` - Remove entries by pattern or tags
//! - `GET /keys` - List keys, optionally filtered by `?pattern=`
//! - `POST /clear` - Remove everything and reset statistics
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
