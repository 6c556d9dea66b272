//! Integration tests: reference tables loaded from disk feeding the engine.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clinic_core::calculations::{CashflowBoard, OutreachCalculator, WellnessCalculator};
use clinic_core::{
    OutreachParameters, PopulationSegment, ProgramKind, TreatmentSelection, WellnessParameters,
};
use clinic_data::{ReferenceLoadError, ReferenceStore};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Copies the fixtures into a scratch directory the test may modify.
fn scratch_copy() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for entry in fs::read_dir(fixtures()).unwrap() {
        let entry = entry.unwrap();
        fs::copy(entry.path(), dir.path().join(entry.file_name())).unwrap();
    }
    dir
}

// =============================================================================
// Wellness
// =============================================================================

#[test]
fn wellness_tables_load_from_fixtures() {
    let store = ReferenceStore::new(fixtures());
    let reference = store.wellness().unwrap();

    assert_eq!(
        reference.package_prices.names().collect::<Vec<_>>(),
        vec!["Scaling", "Consultation", "Fluoride"]
    );
    assert_eq!(
        reference.package_costs.amount_of("Member Card (monthly)").unwrap(),
        dec!(5000)
    );
    assert_eq!(reference.dsp.get("Whitening").unwrap().discount_rate, dec!(10));
}

#[test]
fn wellness_projection_from_loaded_tables() {
    let store = ReferenceStore::new(fixtures());
    let reference = store.wellness().unwrap();

    let params = WellnessParameters {
        total_potential_employee: 466,
        conversion_rate: dec!(20),
        discount_package: dec!(20),
        subscription_length_years: 1,
        selected_treatments: vec!["Scaling".to_string()],
        dsp_selections: vec![TreatmentSelection::named("Whitening")],
    };

    let projection = WellnessCalculator::new(&reference).calculate(&params).unwrap();

    assert_eq!(projection.total_joining_employee, 94);
    assert_eq!(projection.package.total_revenue, dec!(90240000));
    // dentist fee 8.000 + card 5.000 + scaling 30.000, for 94 members over 12 months
    assert_eq!(projection.package.total_cost, dec!(48504000));

    let whitening = &projection.dsp_rows[0];
    assert_eq!(whitening.joining_count, 5);
    assert_eq!(whitening.adjusted_price, dec!(1800000));
    assert_eq!(whitening.revenue, dec!(9000000));
    assert_eq!(whitening.cost, dec!(3000000));

    assert_eq!(projection.grand.total_revenue, dec!(99240000));
}

// =============================================================================
// Outreach
// =============================================================================

#[test]
fn school_projection_from_loaded_tables() {
    let store = ReferenceStore::new(fixtures());
    let reference = store.outreach(ProgramKind::SchoolOutreach).unwrap();

    assert_eq!(
        reference
            .event_costs
            .iter()
            .map(|item| item.total())
            .sum::<rust_decimal::Decimal>(),
        dec!(2500000)
    );

    let params = OutreachParameters {
        program: ProgramKind::SchoolOutreach,
        segments: vec![
            PopulationSegment::new("Students", 80),
            PopulationSegment::new("Teachers & Parents", 20),
        ],
        conversion_rate: dec!(20),
        discount_rate: dec!(10),
        event_frequency: 4,
        selections: vec![
            TreatmentSelection::named("Filling"),
            TreatmentSelection::named("Check-up"),
        ],
    };

    let projection = OutreachCalculator::new(&reference).calculate(&params).unwrap();

    assert_eq!(projection.total_joined, dec!(20));

    let filling = &projection.rows[0];
    assert_eq!(filling.joining_count, 10);
    assert_eq!(filling.revenue, dec!(2700000));
    assert_eq!(filling.cost, dec!(1100000));

    let check_up = &projection.rows[1];
    assert_eq!(check_up.joining_count, 20);
    assert_eq!(check_up.cost, dec!(400000));

    assert_eq!(projection.totals.total_revenue, dec!(4500000));
    assert_eq!(projection.totals.total_cost, dec!(11500000));
    assert_eq!(projection.totals.total_profit, dec!(-7000000));
}

#[test]
fn special_needs_table_carries_sedation_cost() {
    let store = ReferenceStore::new(fixtures());
    let reference = store.outreach(ProgramKind::SpecialNeedsOutreach).unwrap();

    let filling = reference.treatments.get("Filling").unwrap();
    assert_eq!(filling.sedation_cost, Some(dec!(250000)));
    assert_eq!(filling.dentist_fee, Some(dec!(60000)));
}

#[test]
fn every_outreach_program_has_fixture_tables() {
    let store = ReferenceStore::new(fixtures());
    for kind in ProgramKind::all().iter().filter(|k| k.is_outreach()) {
        let reference = store.outreach(*kind).unwrap();
        assert!(!reference.treatments.records().is_empty(), "{kind}");
        assert!(!reference.event_costs.is_empty(), "{kind}");
    }
}

// =============================================================================
// Cashflow
// =============================================================================

#[test]
fn cashflow_average_across_programs() {
    let store = ReferenceStore::new(fixtures());
    let mut board = CashflowBoard::new();

    for kind in [ProgramKind::CorporateWellness, ProgramKind::SchoolOutreach] {
        let series = store.program_cashflow(kind).unwrap();
        board.add((*series).clone());
    }

    let summary = board.average();
    assert_eq!(summary.avg_total_revenue, dec!(15000000));
    assert_eq!(summary.avg_total_expense, dec!(9000000));

    board.remove(ProgramKind::SchoolOutreach.label());
    assert_eq!(board.average().avg_total_revenue, dec!(12000000));
}

// =============================================================================
// Caching and failures
// =============================================================================

#[test]
fn tables_are_cached_until_invalidated() {
    let dir = scratch_copy();
    let store = ReferenceStore::new(dir.path());

    let first = store.wellness().unwrap();
    let again = store.wellness().unwrap();
    assert!(Arc::ptr_eq(&first, &again));

    fs::write(
        dir.path().join("treatment_prices.csv"),
        "Treatment,Price\nScaling,Rp120.000\n",
    )
    .unwrap();
    assert_eq!(
        store.wellness().unwrap().package_prices.amount_of("Scaling").unwrap(),
        dec!(100000)
    );

    assert!(store.invalidate(&dir.path().join("treatment_prices.csv")));
    let reloaded = store.wellness().unwrap();
    assert_eq!(reloaded.package_prices.amount_of("Scaling").unwrap(), dec!(120000));
    // Snapshots handed out earlier are unaffected.
    assert_eq!(first.package_prices.amount_of("Scaling").unwrap(), dec!(100000));
}

#[test]
fn missing_table_names_the_file() {
    let dir = scratch_copy();
    fs::remove_file(dir.path().join("dsp.csv")).unwrap();
    let store = ReferenceStore::new(dir.path());

    let err = store.wellness().unwrap_err();

    assert!(matches!(err, ReferenceLoadError::Io { .. }));
    assert!(err.to_string().contains("dsp.csv"));
}

#[test]
fn malformed_currency_fails_at_load_time() {
    let dir = scratch_copy();
    fs::write(
        dir.path().join("school_event_cost.csv"),
        "Component,Unit,Cost per Unit\nVenue,1,Rp1.000.000\nTransport,2,\"Rp250,000\"\n",
    )
    .unwrap();
    let store = ReferenceStore::new(dir.path());

    let err = store.outreach(ProgramKind::SchoolOutreach).unwrap_err();

    match err {
        ReferenceLoadError::MalformedCurrency {
            row, column, value, ..
        } => {
            assert_eq!(row, 2);
            assert_eq!(column, "Cost per Unit");
            assert_eq!(value, "Rp250,000");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn failed_load_is_retried_after_fix() {
    let dir = scratch_copy();
    let path = dir.path().join("agecare_treatments.csv");
    let good = fs::read_to_string(&path).unwrap();
    fs::write(&path, "Treatment,Price\nCheck-up,100\n").unwrap();
    let store = ReferenceStore::new(dir.path());

    assert!(store.outreach(ProgramKind::AgeCareOutreach).is_err());

    fs::write(&path, good).unwrap();
    assert!(store.outreach(ProgramKind::AgeCareOutreach).is_ok());
}
