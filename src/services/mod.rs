// src/services/mod.rs
pub mod calculations;
pub mod collector;
pub mod fed;
pub mod history;
pub mod http;
pub mod insider;
pub mod multpl;
pub mod placeholders;
pub mod publisher;
pub mod store;
pub mod tables;
pub mod trends;
