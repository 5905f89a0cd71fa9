//! Datafilter Clinic Reference Runtime: Demo CLI
//!
//! Runs one or all of the clinic scenarios, or prints the filter
//! registrations a runtime would bootstrap with.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- patient-visibility
//!   cargo run -p demo -- location-assignment
//!   cargo run -p demo -- registrations --registry path/to/filters.toml
//!
//! Set DATAFILTER_DISABLED_TYPES=patient,visit to switch filtering off for
//! the listed entity types in `registrations`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use datafilter_contracts::error::DataFilterResult;
use datafilter_core::{traits::FilterRegistrations, FilterToggles};
use datafilter_ref_clinic::{
    runtime::ClinicRuntime,
    scenarios::{location_assignment, patient_visibility},
};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Row-level data filtering clinic demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "Row-level data filtering clinic demo",
    long_about = "Runs clinic scenarios showing location-based row filtering,\n\
                  grant reconciliation from user forms, and grant audit integrity."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run both clinic scenarios in sequence.
    RunAll,
    /// Scenario 1: Patient Visibility (super user / granted / ungranted / bypass).
    PatientVisibility,
    /// Scenario 2: Location Assignment (user form reconciliation).
    LocationAssignment,
    /// Load and validate filter registrations, then print them.
    Registrations {
        /// Registration TOML file. Defaults to the bundled clinic registrations.
        #[arg(long)]
        registry: Option<PathBuf>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = match cli.command {
        Command::RunAll => run_all(),
        Command::PatientVisibility => patient_visibility::run_scenario(),
        Command::LocationAssignment => location_assignment::run_scenario(),
        Command::Registrations { registry } => show_registrations(registry),
    };

    match result {
        Ok(()) => {
            println!("Done.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

fn run_all() -> DataFilterResult<()> {
    patient_visibility::run_scenario()?;
    location_assignment::run_scenario()?;
    Ok(())
}

fn show_registrations(path: Option<PathBuf>) -> DataFilterResult<()> {
    let toggles = FilterToggles::from_env();
    let runtime = match path {
        Some(path) => {
            info!(path = %path.display(), "loading registrations");
            ClinicRuntime::from_registration_file(&path, toggles)?
        }
        None => ClinicRuntime::with_registry(
            datafilter_ref_clinic::runtime::bundled_registry()?,
            toggles,
        )?,
    };

    println!("=== Filter Registrations ===");
    println!();
    for def in runtime.registry.all_registrations() {
        let state = if runtime.toggles.is_enabled(&def.entity_type) {
            "enabled"
        } else {
            "disabled"
        };
        println!("  {} [{}]", def.name, state);
        println!("    entity type : {}", def.entity_type);
        println!("    basis type  : {}", def.basis_type);
        println!("    condition   : {}", def.condition);
        if let Some(privilege) = &def.bypass_privilege {
            println!("    bypass      : {}", privilege);
        }
    }
    println!();
    println!("  Declared to query engine: {}", runtime.engine.declared_filters().join(", "));
    println!();
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("Datafilter: Row-level Data Access Control");
    println!("Clinic Reference Demo");
    println!("=========================================");
    println!();
    println!("Per query:");
    println!("  [1] Filtering disabled for the entity type?  → all rows");
    println!("  [2] Super user or bypass privilege?          → all rows");
    println!("  [3] Otherwise bind the principal's granted basis ids; none → no rows");
    println!();
    println!("Per user form submission:");
    println!("  [1] Resolve principal and submitted basis names");
    println!("  [2] Revoke grants not submitted, grant the new ones (hash-chained audit)");
    println!();
}
