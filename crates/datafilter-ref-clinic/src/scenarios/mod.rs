//! Clinic demo scenarios.
//!
//! Each scenario builds its own `ClinicRuntime` so scenarios can run in any
//! order without seeing each other's grants.

pub mod location_assignment;
pub mod patient_visibility;
