pub mod error;
pub mod matcher;
pub mod models;
pub mod repository;
pub mod user;
