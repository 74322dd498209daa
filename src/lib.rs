pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod llm;
pub mod panels;
pub mod proxy;
pub mod search;
pub mod vision;
