//! # datafilter-ref-clinic
//!
//! Clinic reference runtime for row-level location filtering.
//!
//! Demonstrates two scenarios over mock clinic data:
//!
//! 1. **Patient Visibility**: the same patient query returns different rows
//!    for a super user, a granted clerk, an ungranted nurse and a user holding
//!    the bypass privilege, and the filter can be switched off at runtime.
//! 2. **Location Assignment**: user-form submissions are reconciled into
//!    location grants, and the next query reflects them.
//!
//! All data is hardcoded and fictional. No external services are called.

pub mod mock_data;
pub mod query;
pub mod runtime;
pub mod scenarios;

pub use query::ClinicQueryEngine;
pub use runtime::ClinicRuntime;

#[cfg(test)]
mod tests {
    use http::Method;

    use datafilter_contracts::{
        error::DataFilterError,
        filter::{EntityType, FilterDefinition, FilterParameter, ParameterSource},
        principal::Principal,
    };
    use datafilter_core::traits::{FilterRegistrations, QueryEngine};
    use datafilter_reconcile::{PrincipalRef, ReconcileOutcome, ReconcileRequest};

    use super::mock_data::{admin, auditor, dbeckham, dyorke, location_type};
    use super::*;

    fn patient() -> EntityType {
        EntityType::new("patient")
    }

    fn seeded() -> ClinicRuntime {
        let runtime = ClinicRuntime::new().unwrap();
        runtime.seed_grants().unwrap();
        runtime
    }

    fn visible(runtime: &ClinicRuntime, principal: &Principal, entity_type: &EntityType) -> Vec<u32> {
        runtime
            .engine
            .list(&runtime.evaluator, principal, entity_type)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect()
    }

    fn submission(names: &[&str]) -> ReconcileRequest {
        let mut request = ReconcileRequest::submission(
            PrincipalRef::by_username("dbeckham"),
            names.iter().map(|n| n.to_string()).collect(),
        );
        request.performed_by = Some(admin().id);
        request
    }

    // ── Wiring ───────────────────────────────────────────────────────────────

    #[test]
    fn test_bundled_registrations_are_declared_at_startup() {
        let runtime = ClinicRuntime::new().unwrap();
        assert_eq!(runtime.registry.all_registrations().len(), 3);
        assert_eq!(
            runtime.engine.declared_filters(),
            vec![
                "datafilter_encounterLocation",
                "datafilter_patientLocation",
                "datafilter_visitLocation",
            ]
        );
        assert!(runtime.audit.is_empty());
    }

    #[test]
    fn test_seeding_records_one_audited_grant() {
        let runtime = seeded();
        assert_eq!(runtime.store.len().unwrap(), 1);
        assert_eq!(runtime.audit.len(), 1);
        assert!(runtime.audit.verify_integrity());
    }

    // ── Patient visibility ───────────────────────────────────────────────────

    #[test]
    fn test_super_user_sees_every_patient() {
        let runtime = seeded();
        assert_eq!(visible(&runtime, &admin(), &patient()).len(), 6);
    }

    #[test]
    fn test_granted_user_sees_only_their_location() {
        let runtime = seeded();
        assert_eq!(visible(&runtime, &dyorke(), &patient()), vec![1501, 1503]);
        assert_eq!(visible(&runtime, &dyorke(), &EntityType::new("visit")), vec![2002]);
    }

    #[test]
    fn test_user_without_grants_sees_nothing() {
        let runtime = seeded();
        assert!(visible(&runtime, &dbeckham(), &patient()).is_empty());
    }

    #[test]
    fn test_bypass_privilege_sees_every_patient() {
        let runtime = seeded();
        assert_eq!(visible(&runtime, &auditor(), &patient()).len(), 6);
    }

    #[test]
    fn test_disabled_filter_returns_all_rows_until_reenabled() {
        let runtime = seeded();
        runtime.toggles.disable(&patient());
        assert_eq!(visible(&runtime, &dbeckham(), &patient()).len(), 6);
        // Visits stay filtered.
        assert!(visible(&runtime, &dbeckham(), &EntityType::new("visit")).is_empty());

        runtime.toggles.enable(&patient());
        assert!(visible(&runtime, &dbeckham(), &patient()).is_empty());
    }

    #[test]
    fn test_unknown_table_is_invalid_reference() {
        let runtime = seeded();
        let err = runtime
            .engine
            .list(&runtime.evaluator, &admin(), &EntityType::new("obs"))
            .unwrap_err();
        assert!(matches!(err, DataFilterError::InvalidReference { .. }));
    }

    // ── Location assignment ──────────────────────────────────────────────────

    #[test]
    fn test_reconciled_grants_are_visible_to_the_next_query() {
        let runtime = seeded();

        let outcome = runtime
            .reconciler
            .reconcile(&submission(&["Amani Ward", "Delta Maternity"]))
            .unwrap();
        assert_eq!(
            outcome,
            ReconcileOutcome::Reconciled {
                granted: vec!["4001".to_string(), "4004".to_string()],
                revoked: vec![],
            }
        );
        assert_eq!(visible(&runtime, &dbeckham(), &patient()), vec![1001, 1002, 1601]);

        let outcome = runtime
            .reconciler
            .reconcile(&submission(&["Delta Maternity", "Delta Maternty"]))
            .unwrap();
        assert_eq!(
            outcome,
            ReconcileOutcome::Reconciled {
                granted: vec![],
                revoked: vec!["4001".to_string()],
            }
        );
        assert_eq!(visible(&runtime, &dbeckham(), &patient()), vec![1601]);

        // seed + two grants + one revoke
        assert_eq!(runtime.audit.len(), 4);
        assert!(runtime.audit.verify_integrity());
    }

    #[test]
    fn test_reconciliation_leaves_other_users_alone() {
        let runtime = seeded();
        runtime
            .reconciler
            .reconcile(&submission(&["Coastal Outpatient"]))
            .unwrap();
        assert_eq!(visible(&runtime, &dyorke(), &patient()), vec![1501, 1503]);
        assert_eq!(visible(&runtime, &dbeckham(), &patient()), vec![1502]);
    }

    #[test]
    fn test_form_reload_changes_nothing() {
        let runtime = seeded();
        let mut reload = submission(&["Amani Ward"]);
        reload.method = Method::GET;
        let outcome = runtime.reconciler.reconcile(&reload).unwrap();
        assert!(matches!(outcome, ReconcileOutcome::Aborted(_)));
        assert!(visible(&runtime, &dbeckham(), &patient()).is_empty());
        assert_eq!(runtime.audit.len(), 1);
    }

    #[test]
    fn test_grants_are_recorded_with_their_creator() {
        let runtime = seeded();
        runtime.reconciler.reconcile(&submission(&["Amani Ward"])).unwrap();
        let log = runtime.audit.export_log().unwrap();
        let last = log.entries.last().unwrap();
        assert_eq!(last.change.grant.creator, Some(admin().id));
        assert_eq!(last.change.grant.basis.basis_type, location_type());
    }

    // ── Query engine ─────────────────────────────────────────────────────────

    fn definition(name: &str, source: ParameterSource) -> FilterDefinition {
        FilterDefinition {
            name: name.to_string(),
            entity_type: EntityType::new("obs"),
            basis_type: location_type(),
            condition: "location_id IN (:ids)".to_string(),
            parameters: vec![FilterParameter {
                name: "ids".to_string(),
                source,
            }],
            bypass_privilege: None,
        }
    }

    #[test]
    fn test_engine_rejects_unsupported_parameter_source() {
        let mut engine = ClinicQueryEngine::new();
        let err = engine
            .declare_filter(&definition("obs_by_user", ParameterSource::PrincipalId))
            .unwrap_err();
        assert!(matches!(err, DataFilterError::Configuration { .. }));
        assert!(engine.declared_filters().is_empty());
    }

    #[test]
    fn test_engine_rejects_second_declaration_of_a_name() {
        let mut engine = ClinicQueryEngine::new();
        let def = definition("obs_location", ParameterSource::BasisIds);
        engine.declare_filter(&def).unwrap();
        let err = engine.declare_filter(&def).unwrap_err();
        assert!(err.to_string().contains("already declared"));
    }

    // ── Scenarios ────────────────────────────────────────────────────────────

    #[test]
    fn test_scenarios_run_to_completion() {
        scenarios::patient_visibility::run_scenario().unwrap();
        scenarios::location_assignment::run_scenario().unwrap();
    }
}
