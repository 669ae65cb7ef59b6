pub mod api;
pub mod error;
pub mod export;
pub mod server;
