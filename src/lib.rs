pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod fetch;
pub mod model;
pub mod present;
pub mod quote;
pub mod render;
pub mod show;
