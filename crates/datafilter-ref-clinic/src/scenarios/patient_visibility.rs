//! Scenario 1: Patient Visibility
//!
//! Lists the patient table as each clinic user and shows how the location
//! filter narrows it:
//!
//! - admin     super user, sees every patient
//! - dyorke    granted Baraka Clinic, sees that clinic only
//! - dbeckham  no grants, sees nothing
//! - auditor   holds the bypass privilege, sees every patient
//!
//! It then switches patient filtering off at runtime and lists as dbeckham
//! again.

use datafilter_contracts::{error::DataFilterResult, filter::EntityType, principal::Principal};

use crate::{
    mock_data::{admin, auditor, dbeckham, dyorke, ClinicRow},
    runtime::ClinicRuntime,
};

fn print_rows(principal: &Principal, rows: &[ClinicRow]) {
    let who = principal.username.as_deref().unwrap_or(principal.id.as_str());
    println!("  {:<10} {} patient(s)", who, rows.len());
    for r in rows {
        println!("    - {} {} (location {})", r.id, r.label, r.location_id);
    }
}

/// Run Scenario 1: Patient Visibility.
pub fn run_scenario() -> DataFilterResult<()> {
    println!("=== Scenario 1: Patient Visibility ===");
    println!();

    let runtime = ClinicRuntime::new()?;
    runtime.seed_grants()?;
    let patient = EntityType::new("patient");

    println!("  Filtering enabled for '{}'", patient);
    for user in [admin(), dyorke(), dbeckham(), auditor()] {
        let rows = runtime.engine.list(&runtime.evaluator, &user, &patient)?;
        print_rows(&user, &rows);
    }
    println!();

    runtime.toggles.disable(&patient);
    println!("  Filtering disabled for '{}'", patient);
    let rows = runtime.engine.list(&runtime.evaluator, &dbeckham(), &patient)?;
    print_rows(&dbeckham(), &rows);
    runtime.toggles.enable(&patient);
    println!();

    println!("  Grant audit chain intact: {}", runtime.audit.verify_integrity());
    println!();
    Ok(())
}
