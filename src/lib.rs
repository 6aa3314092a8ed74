// src/lib.rs
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;

pub use config::Config;
pub use error::FrothError;
