pub mod api;
pub mod chart;
pub mod config;
pub mod error;
pub mod handlers;
pub mod market;
pub mod models;
pub mod synthetic;
pub mod timescale;
pub mod view;
