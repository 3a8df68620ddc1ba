pub mod config;
pub mod context;
pub mod error;
pub mod export;
pub mod extract;
pub mod handlers;
pub mod observability;
pub mod openapi;
pub mod routes;
pub mod types;
pub mod usecase;
