pub mod config;
pub mod logo;
pub mod pipeline;
pub mod server;
pub mod web;
