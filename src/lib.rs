pub mod config;
pub mod simulation;
pub mod ticker;
pub mod util;
pub mod vehicle;
pub mod web;
