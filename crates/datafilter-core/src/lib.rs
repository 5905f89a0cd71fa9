//! # datafilter-core
//!
//! Query-time access evaluation for the datafilter row-level access engine.
//!
//! This crate provides:
//! - The collaborator traits (`GrantStore`, `FilterRegistrations`,
//!   `IdentityProvider`, `BasisDirectory`, `QueryEngine`, `GrantAuditWriter`)
//! - The `AccessEvaluator`, which computes effective access sets and filter
//!   bindings
//! - `FilterToggles`, the administrative per-entity-type switchboard
//! - `bootstrap`, which declares every registered filter to the query engine
//!
//! ## Usage
//!
//! ```rust,ignore
//! use datafilter_core::{AccessEvaluator, FilterToggles};
//!
//! let evaluator = AccessEvaluator::new(registry, store, identity, Arc::new(FilterToggles::from_env()));
//! let binding = evaluator.binding_for(&principal, &EntityType::new("patient"), FailurePolicy::FailClosed)?;
//! ```

pub mod bootstrap;
pub mod evaluator;
pub mod toggles;
pub mod traits;

pub use bootstrap::bootstrap;
pub use evaluator::AccessEvaluator;
pub use toggles::FilterToggles;

#[cfg(test)]
mod tests {
    use std::{
        collections::BTreeSet,
        sync::{Arc, Mutex},
    };

    use datafilter_contracts::{
        access::{EffectiveAccess, FailurePolicy, FilterBinding},
        basis::{BasisEntity, BasisRef, BasisType},
        error::{DataFilterError, DataFilterResult},
        filter::{EntityType, FilterDefinition, FilterParameter, ParameterSource},
        grant::{EntityBasisMap, GrantOutcome},
        principal::{Principal, PrincipalId},
    };

    use crate::{
        bootstrap,
        traits::{FilterRegistrations, GrantStore, IdentityProvider, QueryEngine},
        AccessEvaluator, FilterToggles,
    };

    const BYPASS: &str = "Bypass Location Filter";

    // ── Mock helpers ─────────────────────────────────────────────────────────

    fn patient() -> EntityType {
        EntityType::new("patient")
    }

    fn location() -> BasisType {
        BasisType::new("location")
    }

    fn patient_filter() -> FilterDefinition {
        FilterDefinition {
            name: "patient_location".to_string(),
            entity_type: patient(),
            basis_type: location(),
            condition: "location_id in (:basisIds)".to_string(),
            parameters: vec![FilterParameter {
                name: "basisIds".to_string(),
                source: ParameterSource::BasisIds,
            }],
            bypass_privilege: Some(BYPASS.to_string()),
        }
    }

    /// A fixed registration table.
    struct StaticRegistry(Vec<FilterDefinition>);

    impl FilterRegistrations for StaticRegistry {
        fn registration_for(&self, entity_type: &EntityType) -> Option<&FilterDefinition> {
            self.0.iter().find(|d| &d.entity_type == entity_type)
        }

        fn all_registrations(&self) -> &[FilterDefinition] {
            &self.0
        }
    }

    /// A grant store returning preset identifiers and counting reads.
    struct MockStore {
        identifiers: Vec<&'static str>,
        fail: bool,
        reads: Arc<Mutex<u32>>,
    }

    impl MockStore {
        fn with(identifiers: Vec<&'static str>) -> Self {
            Self { identifiers, fail: false, reads: Arc::new(Mutex::new(0)) }
        }

        fn failing() -> Self {
            Self { identifiers: vec![], fail: true, reads: Arc::new(Mutex::new(0)) }
        }
    }

    impl GrantStore for MockStore {
        fn grant(
            &self,
            _principal: &PrincipalId,
            _basis: &BasisEntity,
            _creator: Option<&PrincipalId>,
        ) -> DataFilterResult<GrantOutcome> {
            panic!("evaluation must never write to the grant store");
        }

        fn revoke(&self, _principal: &PrincipalId, _bases: &BTreeSet<BasisRef>) -> DataFilterResult<usize> {
            panic!("evaluation must never write to the grant store");
        }

        fn list_grants(
            &self,
            principal: &PrincipalId,
            basis_type: &BasisType,
        ) -> DataFilterResult<Vec<EntityBasisMap>> {
            *self.reads.lock().unwrap() += 1;
            if self.fail {
                return Err(DataFilterError::Persistence {
                    reason: "connection refused".to_string(),
                });
            }
            Ok(self
                .identifiers
                .iter()
                .map(|id| EntityBasisMap::new(principal.clone(), BasisRef::new(basis_type.clone(), *id), None))
                .collect())
        }
    }

    /// Identity provider relying on the default privilege checks.
    struct FlagIdentity;

    impl IdentityProvider for FlagIdentity {
        fn find_by_id(&self, _id: &str) -> DataFilterResult<Option<Principal>> {
            Ok(None)
        }
        fn find_by_alternate_id(&self, _alternate_id: &str) -> DataFilterResult<Option<Principal>> {
            Ok(None)
        }
        fn find_by_username(&self, _username: &str) -> DataFilterResult<Option<Principal>> {
            Ok(None)
        }
    }

    fn evaluator(store: MockStore) -> (AccessEvaluator, Arc<Mutex<u32>>) {
        let reads = store.reads.clone();
        let evaluator = AccessEvaluator::new(
            Arc::new(StaticRegistry(vec![patient_filter()])),
            Arc::new(store),
            Arc::new(FlagIdentity),
            Arc::new(FilterToggles::new()),
        );
        (evaluator, reads)
    }

    fn ids(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    // ── Effective access ─────────────────────────────────────────────────────

    #[test]
    fn test_no_grants_means_no_access() {
        let (evaluator, _) = evaluator(MockStore::with(vec![]));
        let access = evaluator.effective_access(&Principal::new("7"), &patient()).unwrap();
        assert_eq!(access, EffectiveAccess::NoAccess);
    }

    #[test]
    fn test_grants_become_restricted_identifier_set() {
        let (evaluator, _) = evaluator(MockStore::with(vec!["1", "3", "3"]));
        let access = evaluator.effective_access(&Principal::new("7"), &patient()).unwrap();
        assert_eq!(access, EffectiveAccess::Restricted(ids(&["1", "3"])));
    }

    /// Grants on entities the directory no longer knows are still counted.
    #[test]
    fn test_unresolvable_grant_identifiers_are_kept() {
        let (evaluator, _) = evaluator(MockStore::with(vec!["deleted-location-99"]));
        let access = evaluator.effective_access(&Principal::new("7"), &patient()).unwrap();
        assert!(access.permits("deleted-location-99"));
    }

    #[test]
    fn test_super_user_short_circuits_before_store_read() {
        let (evaluator, reads) = evaluator(MockStore::failing());
        let access = evaluator
            .effective_access(&Principal::new("1").as_super_user(), &patient())
            .unwrap();
        assert_eq!(access, EffectiveAccess::Unrestricted);
        assert_eq!(*reads.lock().unwrap(), 0, "privileged principals must not hit the store");
    }

    #[test]
    fn test_bypass_privilege_short_circuits_before_store_read() {
        let (evaluator, reads) = evaluator(MockStore::with(vec![]));
        let auditor = Principal::new("9").with_privilege(BYPASS);
        assert!(evaluator.effective_access(&auditor, &patient()).unwrap().is_unrestricted());
        assert_eq!(*reads.lock().unwrap(), 0);
    }

    #[test]
    fn test_unrelated_privilege_does_not_bypass() {
        let (evaluator, _) = evaluator(MockStore::with(vec![]));
        let clerk = Principal::new("9").with_privilege("View Patients");
        assert_eq!(
            evaluator.effective_access(&clerk, &patient()).unwrap(),
            EffectiveAccess::NoAccess
        );
    }

    #[test]
    fn test_disabled_filtering_is_unrestricted_until_reenabled() {
        let (evaluator, reads) = evaluator(MockStore::with(vec![]));
        let clerk = Principal::new("7");

        evaluator.toggles().disable(&patient());
        assert!(evaluator.effective_access(&clerk, &patient()).unwrap().is_unrestricted());
        assert_eq!(*reads.lock().unwrap(), 0);

        evaluator.toggles().enable(&patient());
        assert_eq!(
            evaluator.effective_access(&clerk, &patient()).unwrap(),
            EffectiveAccess::NoAccess
        );
    }

    #[test]
    fn test_unregistered_entity_type_is_invalid_reference() {
        let (evaluator, _) = evaluator(MockStore::with(vec!["1"]));
        match evaluator.effective_access(&Principal::new("7"), &EntityType::new("concept")) {
            Err(DataFilterError::InvalidReference { reason }) => assert!(reason.contains("concept")),
            other => panic!("expected InvalidReference, got {:?}", other),
        }
    }

    #[test]
    fn test_store_failure_propagates_from_effective_access() {
        let (evaluator, _) = evaluator(MockStore::failing());
        let result = evaluator.effective_access(&Principal::new("7"), &patient());
        assert!(matches!(result, Err(DataFilterError::Persistence { .. })));
    }

    // ── Filter bindings ──────────────────────────────────────────────────────

    #[test]
    fn test_store_failure_binds_no_access_when_failing_closed() {
        let (evaluator, _) = evaluator(MockStore::failing());
        let binding = evaluator
            .binding_for(&Principal::new("7"), &patient(), FailurePolicy::FailClosed)
            .unwrap();
        assert_eq!(binding.parameter("basisIds"), Some(&[][..]));
    }

    #[test]
    fn test_store_failure_leaves_filter_off_when_failing_open() {
        let (evaluator, _) = evaluator(MockStore::failing());
        let binding = evaluator
            .binding_for(&Principal::new("7"), &patient(), FailurePolicy::FailOpen)
            .unwrap();
        assert_eq!(binding, FilterBinding::Unfiltered);
    }

    #[test]
    fn test_binding_carries_granted_identifiers() {
        let (evaluator, _) = evaluator(MockStore::with(vec!["2", "1"]));
        let binding = evaluator
            .binding_for(&Principal::new("7"), &patient(), FailurePolicy::FailClosed)
            .unwrap();
        assert_eq!(
            binding.parameter("basisIds").unwrap(),
            &["1".to_string(), "2".to_string()]
        );
    }

    // ── Toggles ──────────────────────────────────────────────────────────────

    #[test]
    fn test_toggles_default_enabled_and_parse_disabled_list() {
        let toggles = FilterToggles::new();
        assert!(toggles.is_enabled(&patient()));

        let toggles = FilterToggles::from_disabled_list(" patient, ,visit ");
        assert!(!toggles.is_enabled(&patient()));
        assert!(!toggles.is_enabled(&EntityType::new("visit")));
        assert!(toggles.is_enabled(&EntityType::new("encounter")));
    }

    // ── Bootstrap ────────────────────────────────────────────────────────────

    struct RecordingEngine {
        declared: Vec<String>,
        reject: Option<&'static str>,
    }

    impl QueryEngine for RecordingEngine {
        fn declare_filter(&mut self, definition: &FilterDefinition) -> DataFilterResult<()> {
            if self.reject == Some(definition.name.as_str()) {
                return Err(DataFilterError::Configuration {
                    reason: format!("cannot declare '{}'", definition.name),
                });
            }
            self.declared.push(definition.name.clone());
            Ok(())
        }
    }

    fn two_filters() -> StaticRegistry {
        let mut visit = patient_filter();
        visit.name = "visit_location".to_string();
        visit.entity_type = EntityType::new("visit");
        StaticRegistry(vec![patient_filter(), visit])
    }

    #[test]
    fn test_bootstrap_declares_in_registration_order() {
        let mut engine = RecordingEngine { declared: vec![], reject: None };
        let count = bootstrap(&two_filters(), &mut engine).unwrap();
        assert_eq!(count, 2);
        assert_eq!(engine.declared, vec!["patient_location", "visit_location"]);
    }

    #[test]
    fn test_bootstrap_aborts_on_first_failure() {
        let mut engine = RecordingEngine { declared: vec![], reject: Some("patient_location") };
        let result = bootstrap(&two_filters(), &mut engine);
        assert!(matches!(result, Err(DataFilterError::Configuration { .. })));
        assert!(engine.declared.is_empty());
    }
}
