//! # datafilter-registry
//!
//! The startup-built table of filter registrations.
//!
//! ## Overview
//!
//! This crate provides [`FilterRegistry`], which implements the
//! [`FilterRegistrations`](datafilter_core::traits::FilterRegistrations)
//! trait. Registrations are declared in TOML, validated and checked for
//! conflicts when the registry is built, and never change afterwards. A bad
//! registration fails startup; it can never fail a request.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use datafilter_registry::FilterRegistry;
//!
//! let registry = FilterRegistry::from_file(Path::new("registrations/clinic.toml"))?;
//! datafilter_core::bootstrap(&registry, &mut query_engine)?;
//! ```

pub mod config;
pub mod registry;

pub use config::RegistrationConfig;
pub use registry::FilterRegistry;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use datafilter_contracts::{
        error::DataFilterError,
        filter::{EntityType, ParameterSource},
    };
    use datafilter_core::traits::FilterRegistrations;

    use crate::FilterRegistry;

    const PATIENT_AND_VISIT: &str = r#"
        [[filters]]
        name = "patient_location"
        entity_type = "patient"
        basis_type = "location"
        condition = "patient_id in (select patient_id from patient_location where location_id in (:basisIds))"
        bypass_privilege = "Bypass Location Filter"

        [[filters.parameters]]
        name = "basisIds"
        source = "basis-ids"

        [[filters]]
        name = "visit_location"
        entity_type = "visit"
        basis_type = "location"
        condition = "location_id in (:basisIds) or creator = :userId"

        [[filters.parameters]]
        name = "basisIds"
        source = "basis-ids"

        [[filters.parameters]]
        name = "userId"
        source = "principal-id"
    "#;

    fn expect_config_error(toml: &str, fragment: &str) {
        match FilterRegistry::from_toml_str(toml) {
            Err(DataFilterError::Configuration { reason }) => {
                assert!(reason.contains(fragment), "unexpected reason: {reason}");
            }
            other => panic!("expected Configuration error, got {:?}", other),
        }
    }

    // ── 1. loading ────────────────────────────────────────────────────────────

    #[test]
    fn test_loads_registrations_in_declaration_order() {
        let registry = FilterRegistry::from_toml_str(PATIENT_AND_VISIT).unwrap();

        let names: Vec<&str> = registry
            .all_registrations()
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["patient_location", "visit_location"]);

        let visit = registry.registration_for(&EntityType::new("visit")).unwrap();
        assert_eq!(visit.parameters[1].source, ParameterSource::PrincipalId);
        assert!(visit.bypass_privilege.is_none());
    }

    #[test]
    fn test_unregistered_entity_type_is_absent() {
        let registry = FilterRegistry::from_toml_str(PATIENT_AND_VISIT).unwrap();
        assert!(registry.registration_for(&EntityType::new("concept")).is_none());
    }

    #[test]
    fn test_empty_file_builds_empty_registry() {
        let registry = FilterRegistry::from_toml_str("").unwrap();
        assert!(registry.is_empty());
    }

    // ── 2. duplicates and conflicts ───────────────────────────────────────────

    #[test]
    fn test_identical_duplicate_is_collapsed() {
        let doubled = format!("{PATIENT_AND_VISIT}\n{PATIENT_AND_VISIT}");
        let registry = FilterRegistry::from_toml_str(&doubled).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_conflicting_predicates_for_same_entity_type_fail() {
        let conflicting = format!(
            "{PATIENT_AND_VISIT}\n{}",
            r#"
            [[filters]]
            name = "patient_clinic"
            entity_type = "patient"
            basis_type = "location"
            condition = "clinic_id in (:basisIds)"

            [[filters.parameters]]
            name = "basisIds"
            source = "basis-ids"
            "#
        );
        expect_config_error(&conflicting, "both claim entity type 'patient'");
    }

    #[test]
    fn test_filter_name_reused_across_entity_types_fails() {
        let reused = format!(
            "{PATIENT_AND_VISIT}\n{}",
            r#"
            [[filters]]
            name = "patient_location"
            entity_type = "encounter"
            basis_type = "location"
            condition = "location_id in (:basisIds)"

            [[filters.parameters]]
            name = "basisIds"
            source = "basis-ids"
            "#
        );
        expect_config_error(&reused, "is used for both");
    }

    // ── 3. validation ─────────────────────────────────────────────────────────

    #[test]
    fn test_unreferenced_parameter_fails() {
        let toml = r#"
            [[filters]]
            name = "obs_location"
            entity_type = "obs"
            basis_type = "location"
            condition = "location_id in (:locationIds)"

            [[filters.parameters]]
            name = "basisIds"
            source = "basis-ids"
        "#;
        expect_config_error(toml, "never references");
    }

    #[test]
    fn test_registration_without_parameters_fails() {
        let toml = r#"
            [[filters]]
            name = "obs_location"
            entity_type = "obs"
            basis_type = "location"
            condition = "1 = 1"
            parameters = []
        "#;
        expect_config_error(toml, "declares no parameters");
    }

    #[test]
    fn test_toml_parse_error() {
        expect_config_error("this is not valid toml ][[[", "failed to parse registration TOML");
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let result = FilterRegistry::from_file(std::path::Path::new("/nonexistent/filters.toml"));
        assert!(matches!(result, Err(DataFilterError::Configuration { .. })));
    }
}
