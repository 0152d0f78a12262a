// teamcal-service/src/lib.rs
pub mod config;
pub mod db;
pub mod models;
pub mod policy;
pub mod routes;
pub mod services;
pub mod utils;
