//! Core Module
//!
//! Configuration, shared server state and the HTTP server runner.

mod config;
mod server;
mod state;

pub use config::Config;
pub use server::Server;
pub use state::ServerState;
