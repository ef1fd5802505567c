pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod view;
