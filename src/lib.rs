pub mod config;
pub mod cryptic;
pub mod errors;
pub mod registry;
pub mod render;
pub mod resolution;
pub mod search;
pub mod store;
pub mod types;
