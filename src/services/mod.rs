// teamcal-service/src/services/mod.rs
pub mod schedule_service;
