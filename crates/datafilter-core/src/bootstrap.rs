//! Startup wiring between the filter registry and the query engine.

use tracing::info;

use datafilter_contracts::error::DataFilterResult;

use crate::traits::{FilterRegistrations, QueryEngine};

/// Declare every registered filter to `engine`, in registration order.
///
/// Returns the number of filters declared. The first failure aborts
/// bootstrap; filters declared before it are left declared.
pub fn bootstrap(
    registry: &dyn FilterRegistrations,
    engine: &mut dyn QueryEngine,
) -> DataFilterResult<usize> {
    let registrations = registry.all_registrations();

    for definition in registrations {
        engine.declare_filter(definition)?;
        info!(
            filter = %definition.name,
            entity_type = %definition.entity_type,
            basis_type = %definition.basis_type,
            "filter declared"
        );
    }

    Ok(registrations.len())
}
