pub mod ai;
pub mod auth;
pub mod cli;
pub mod cnp;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod server;
pub mod services;
pub mod state;
pub mod types;
