pub mod api;
pub mod auth;
pub mod cache;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod network;
pub mod policy;
pub mod routes;
pub mod state;

pub use routes::app;
pub use state::{AppState, DefaultNetworkSettings};
