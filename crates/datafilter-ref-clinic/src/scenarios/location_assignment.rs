//! Scenario 2: Location Assignment
//!
//! An administrator edits dbeckham's user form three times:
//!
//! 1. Submits Amani Ward and Delta Maternity. Both are granted.
//! 2. Submits Delta Maternity and a misspelt location. Amani Ward is revoked,
//!    the unknown name is dropped.
//! 3. Reloads the form with GET. Nothing changes.
//!
//! Patient visibility is listed after each step.

use http::Method;

use datafilter_contracts::{
    error::{DataFilterError, DataFilterResult},
    filter::EntityType,
};
use datafilter_reconcile::{PrincipalRef, ReconcileRequest};

use crate::{
    mock_data::{admin, dbeckham},
    runtime::ClinicRuntime,
};

fn submit(runtime: &ClinicRuntime, request: &ReconcileRequest) -> DataFilterResult<()> {
    let names = request.basis_names.join(", ");
    println!("  {} user form [{}]", request.method, names);

    let outcome = runtime.reconciler.reconcile(request)?;
    let rendered = serde_json::to_string(&outcome).map_err(|e| DataFilterError::Configuration {
        reason: format!("failed to render outcome: {}", e),
    })?;
    println!("    outcome: {}", rendered);

    let patient = EntityType::new("patient");
    let rows = runtime.engine.list(&runtime.evaluator, &dbeckham(), &patient)?;
    let ids: Vec<String> = rows.iter().map(|r| r.id.to_string()).collect();
    println!("    dbeckham now sees patients [{}]", ids.join(", "));
    Ok(())
}

/// Run Scenario 2: Location Assignment.
pub fn run_scenario() -> DataFilterResult<()> {
    println!("=== Scenario 2: Location Assignment ===");
    println!();

    let runtime = ClinicRuntime::new()?;
    let target = PrincipalRef::by_username("dbeckham");

    let mut first = ReconcileRequest::submission(
        target.clone(),
        vec!["Amani Ward".to_string(), "Delta Maternity".to_string()],
    );
    first.performed_by = Some(admin().id);
    submit(&runtime, &first)?;

    let mut second = ReconcileRequest::submission(
        target.clone(),
        vec!["Delta Maternity".to_string(), "Delta Maternty".to_string()],
    );
    second.performed_by = Some(admin().id);
    submit(&runtime, &second)?;

    let mut reload = ReconcileRequest::submission(target, Vec::new());
    reload.method = Method::GET;
    submit(&runtime, &reload)?;

    println!();
    println!("  Grant changes recorded: {}", runtime.audit.len());
    println!("  Grant audit chain intact: {}", runtime.audit.verify_integrity());
    println!();
    Ok(())
}
