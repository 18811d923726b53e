//! Rentora HTTP API: router, handlers and the glue around them.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod router;
pub mod routes;
pub mod state;
pub mod storage;
pub mod upload;
pub mod weather;
