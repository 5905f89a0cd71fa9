//! Simulated clinic data for the reference runtime.
//!
//! All data in this module is hardcoded and fictional. `ClinicDirectory`
//! stands in for the identity and location services of a real deployment.

use datafilter_contracts::{
    basis::{BasisEntity, BasisType},
    error::DataFilterResult,
    principal::Principal,
};
use datafilter_core::traits::{BasisDirectory, IdentityProvider};

/// Privilege that switches location filtering off for its holder.
pub const BYPASS_LOCATION_FILTER: &str = "Bypass Location Filter";

pub fn location_type() -> BasisType {
    BasisType::new("location")
}

// ── Locations ─────────────────────────────────────────────────────────────────

/// (identifier, name)
const LOCATIONS: [(&str, &str); 4] = [
    ("4001", "Amani Ward"),
    ("4002", "Baraka Clinic"),
    ("4003", "Coastal Outpatient"),
    ("4004", "Delta Maternity"),
];

pub fn locations() -> Vec<BasisEntity> {
    LOCATIONS
        .iter()
        .map(|(id, name)| BasisEntity::new(location_type(), *id, *name))
        .collect()
}

// ── Users ─────────────────────────────────────────────────────────────────────

/// System administrator. Super user.
pub fn admin() -> Principal {
    Principal::new("1")
        .with_username("admin")
        .with_alternate_id("a3f1c2d4-0001-4c1e-9a55-000000000001")
        .as_super_user()
}

/// Registration clerk, granted Baraka Clinic at seed time.
pub fn dyorke() -> Principal {
    Principal::new("501")
        .with_username("dyorke")
        .with_alternate_id("a3f1c2d4-0501-4c1e-9a55-000000000501")
        .with_privilege("View Patients")
}

/// Newly hired nurse with no location assignments.
pub fn dbeckham() -> Principal {
    Principal::new("502")
        .with_username("dbeckham")
        .with_privilege("View Patients")
}

/// Data quality auditor holding the bypass privilege.
pub fn auditor() -> Principal {
    Principal::new("503")
        .with_username("auditor")
        .with_privilege("View Patients")
        .with_privilege(BYPASS_LOCATION_FILTER)
}

pub fn users() -> Vec<Principal> {
    vec![admin(), dyorke(), dbeckham(), auditor()]
}

// ── Clinical rows ─────────────────────────────────────────────────────────────

/// A row the query engine may return, tagged with the location it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ClinicRow {
    pub id: u32,
    pub label: String,
    pub location_id: String,
}

fn row(id: u32, label: &str, location_id: &str) -> ClinicRow {
    ClinicRow {
        id,
        label: label.to_string(),
        location_id: location_id.to_string(),
    }
}

pub fn patients() -> Vec<ClinicRow> {
    vec![
        row(1001, "Achieng Otieno", "4001"),
        row(1002, "Baraka Mwangi", "4001"),
        row(1501, "Chausiku Magidu", "4002"),
        row(1502, "Daudi Magidu", "4003"),
        row(1503, "Eshe Magidu", "4002"),
        row(1601, "Faraji Njoroge", "4004"),
    ]
}

pub fn visits() -> Vec<ClinicRow> {
    vec![
        row(2001, "Achieng Otieno / outpatient", "4001"),
        row(2002, "Chausiku Magidu / follow-up", "4002"),
        row(2003, "Faraji Njoroge / antenatal", "4004"),
    ]
}

// ── Directory ─────────────────────────────────────────────────────────────────

/// Mock identity and location service.
pub struct ClinicDirectory {
    users: Vec<Principal>,
    locations: Vec<BasisEntity>,
}

impl Default for ClinicDirectory {
    fn default() -> Self {
        Self {
            users: users(),
            locations: locations(),
        }
    }
}

impl ClinicDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_user(&self, pred: impl Fn(&Principal) -> bool) -> Option<Principal> {
        self.users.iter().find(|u| pred(u)).cloned()
    }
}

impl IdentityProvider for ClinicDirectory {
    fn find_by_id(&self, id: &str) -> DataFilterResult<Option<Principal>> {
        Ok(self.find_user(|u| u.id.as_str() == id))
    }

    fn find_by_alternate_id(&self, alternate_id: &str) -> DataFilterResult<Option<Principal>> {
        Ok(self.find_user(|u| u.alternate_id.as_deref() == Some(alternate_id)))
    }

    fn find_by_username(&self, username: &str) -> DataFilterResult<Option<Principal>> {
        Ok(self.find_user(|u| u.username.as_deref() == Some(username)))
    }
}

impl BasisDirectory for ClinicDirectory {
    fn resolve_by_name(&self, basis_type: &BasisType, name: &str) -> DataFilterResult<Option<BasisEntity>> {
        Ok(self
            .locations
            .iter()
            .find(|l| &l.basis_type == basis_type && l.name == name)
            .cloned())
    }

    fn list_all(&self, basis_type: &BasisType) -> DataFilterResult<Vec<BasisEntity>> {
        Ok(self
            .locations
            .iter()
            .filter(|l| &l.basis_type == basis_type)
            .cloned()
            .collect())
    }
}
