use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use clinic_core::ProgramKind;
use clinic_data::ReferenceStore;

/// Check that every reference table in a data directory loads cleanly.
///
/// Reads the wellness tables (package prices, package costs, Dental Saving
/// Plan), the treatment and event-cost tables of each outreach program, and
/// every program cashflow file that exists, reporting row counts.
#[derive(Parser, Debug)]
#[command(name = "clinic-data-check")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding the reference CSV files
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Skip programs whose tables are missing instead of failing
    #[arg(short, long, default_value_t = false)]
    lenient: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let store = ReferenceStore::new(&args.data_dir);

    println!("Checking reference data in: {}", args.data_dir.display());

    let wellness = store
        .wellness()
        .context("Failed to load wellness reference tables")?;
    println!(
        "wellness: {} package prices, {} package costs, {} DSP treatments",
        wellness.package_prices.entries().len(),
        wellness.package_costs.entries().len(),
        wellness.dsp.records().len()
    );

    for kind in ProgramKind::all().iter().filter(|k| k.is_outreach()) {
        match store.outreach(*kind) {
            Ok(reference) => println!(
                "{}: {} treatments, {} event cost items",
                kind.as_str(),
                reference.treatments.records().len(),
                reference.event_costs.len()
            ),
            Err(err) if args.lenient => println!("{}: skipped ({err})", kind.as_str()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to load {} reference tables", kind.label()));
            }
        }
    }

    for kind in ProgramKind::all() {
        let path = store.cashflow_path(*kind);
        if !path.exists() {
            continue;
        }
        let series = store
            .program_cashflow(*kind)
            .with_context(|| format!("Failed to parse cashflow: {}", path.display()))?;
        println!("{} cashflow: {} months", kind.as_str(), series.entries.len());
    }

    println!("All reference tables loaded successfully.");
    Ok(())
}
