// teamcal-service/src/policy/mod.rs
// Pure decision functions over already-loaded schedules
pub mod authorization;
pub mod visibility;

pub use authorization::{authorize, Action, Decision, Denial};
pub use visibility::{project, PRIVATE_SENTINEL};
