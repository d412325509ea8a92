pub mod auth;
pub mod cache;
pub mod config;
pub mod dates;
pub mod export;
pub mod fetch;
pub mod filter;
pub mod records;
pub mod render;
pub mod table;
