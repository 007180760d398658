pub mod client;
pub mod config;
pub mod models;
pub mod render;
pub mod state;
pub mod ui;
pub mod upload;
