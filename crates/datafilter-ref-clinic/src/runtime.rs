//! Wiring for the clinic reference runtime.
//!
//! Builds every component once, the way a hosting application would at
//! startup, and shares them through `Arc`s.

use std::{path::Path, sync::Arc};

use tracing::info;

use datafilter_audit::InMemoryGrantAuditLog;
use datafilter_contracts::{error::DataFilterResult, principal::PrincipalId};
use datafilter_core::{bootstrap, traits::GrantStore, AccessEvaluator, FilterToggles};
use datafilter_reconcile::GrantReconciler;
use datafilter_registry::FilterRegistry;
use datafilter_store::InMemoryGrantStore;

use crate::{
    mock_data::{admin, dyorke, location_type, locations, ClinicDirectory},
    query::ClinicQueryEngine,
};

/// The registrations shipped with the clinic runtime.
pub const CLINIC_REGISTRATIONS: &str = include_str!("../registrations/clinic.toml");

/// Parse and validate the bundled registrations.
pub fn bundled_registry() -> DataFilterResult<FilterRegistry> {
    FilterRegistry::from_toml_str(CLINIC_REGISTRATIONS)
}

pub struct ClinicRuntime {
    pub registry: Arc<FilterRegistry>,
    pub store: Arc<InMemoryGrantStore>,
    pub audit: Arc<InMemoryGrantAuditLog>,
    pub toggles: Arc<FilterToggles>,
    pub directory: Arc<ClinicDirectory>,
    pub evaluator: AccessEvaluator,
    pub reconciler: GrantReconciler,
    pub engine: ClinicQueryEngine,
}

impl ClinicRuntime {
    /// Build with the bundled registrations and all filtering enabled.
    pub fn new() -> DataFilterResult<Self> {
        Self::with_registry(bundled_registry()?, FilterToggles::new())
    }

    /// Build with registrations read from `path`.
    pub fn from_registration_file(path: &Path, toggles: FilterToggles) -> DataFilterResult<Self> {
        Self::with_registry(FilterRegistry::from_file(path)?, toggles)
    }

    pub fn with_registry(registry: FilterRegistry, toggles: FilterToggles) -> DataFilterResult<Self> {
        let registry = Arc::new(registry);
        let audit = Arc::new(InMemoryGrantAuditLog::new());
        let store = Arc::new(InMemoryGrantStore::with_audit(audit.clone()));
        let toggles = Arc::new(toggles);
        let directory = Arc::new(ClinicDirectory::new());

        let mut engine = ClinicQueryEngine::new();
        let declared = bootstrap(registry.as_ref(), &mut engine)?;
        info!(declared, "clinic query engine bootstrapped");

        let evaluator = AccessEvaluator::new(
            registry.clone(),
            store.clone(),
            directory.clone(),
            toggles.clone(),
        );
        let reconciler = GrantReconciler::new(
            store.clone(),
            directory.clone(),
            directory.clone(),
            location_type(),
        );

        Ok(Self {
            registry,
            store,
            audit,
            toggles,
            directory,
            evaluator,
            reconciler,
            engine,
        })
    }

    /// Give dyorke access to Baraka Clinic, as an administrator would have.
    pub fn seed_grants(&self) -> DataFilterResult<()> {
        let baraka = locations()
            .into_iter()
            .filter(|l| l.name == "Baraka Clinic")
            .collect::<Vec<_>>();
        let by: PrincipalId = admin().id;
        self.store.grant_all(&dyorke().id, &baraka, Some(&by))?;
        Ok(())
    }
}
