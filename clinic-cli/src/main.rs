use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use clinic_core::{
    OutreachParameters, PersistenceStatus, PopulationSegment, ProgramKind, ScenarioLedger,
    ScenarioMetrics, TreatmentSelection, WellnessParameters,
};
use clinic_data::{HiringPriceList, HiringTier, format_rupiah};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use clinic_cli::app::App;
use clinic_cli::config::{Config, ConfigOverrides};
use clinic_cli::{args, logging, render};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Revenue, cost and profit projections for the clinic's wellness and
/// outreach programs.
///
/// Reads reference tables from the data directory, projects the requested
/// program, and keeps saved scenarios for side-by-side comparison.
#[derive(Debug, Parser)]
#[command(name = "clinic-projections", version, about)]
struct Cli {
    /// Configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Reference data directory (overrides `[data] dir`).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Scenario ledger backend: `csv` or `memory`.
    #[arg(long, global = true)]
    ledger_backend: Option<String>,

    /// Scenario ledger location; a file path for `csv`.
    #[arg(long, global = true)]
    ledger: Option<String>,

    /// Log level or filter directive (`RUST_LOG` still wins).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Project the corporate wellness subscription and its Dental Saving Plan.
    Wellness(WellnessArgs),
    /// Project a school, age-care or special-needs outreach program.
    Outreach(OutreachArgs),
    /// Show adjusted prices and demand of an outreach program.
    Preview(OutreachInputs),
    /// Average the monthly cashflow of one or more programs.
    Cashflow(CashflowArgs),
    /// Inspect or change the saved scenarios.
    #[command(subcommand)]
    Scenario(ScenarioCommand),
    /// Dentist hiring price list offered to client clinics.
    #[command(subcommand)]
    Talent(TalentCommand),
    /// Show or create the configuration file.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Args)]
struct WellnessArgs {
    /// Employees who could join.
    #[arg(long, default_value_t = 466)]
    employees: u64,

    /// Share of employees expected to join (%).
    #[arg(long, default_value = "20", value_parser = args::percentage)]
    conversion: Decimal,

    /// Discount on the package price (%).
    #[arg(long, default_value = "20", value_parser = args::percentage)]
    discount: Decimal,

    /// Subscription length in years.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=5))]
    years: u32,

    /// Package treatment; repeat for more. Defaults to every treatment.
    #[arg(long = "treatment")]
    treatments: Vec<String>,

    /// Dental Saving Plan treatment as NAME[:CONVERSION[:DISCOUNT]]; repeat for more.
    #[arg(long = "dsp", value_parser = args::treatment_selection)]
    dsp: Vec<TreatmentSelection>,

    /// Save the grand totals as a scenario.
    #[arg(long)]
    save: bool,
}

#[derive(Debug, Args)]
struct OutreachInputs {
    /// `school`, `agecare` or `special-needs`.
    #[arg(value_parser = args::outreach_program)]
    program: ProgramKind,

    /// Population segment as LABEL=COUNT; repeat for more.
    #[arg(long = "segment", value_parser = args::population_segment)]
    segments: Vec<PopulationSegment>,

    /// Total potential customers, when not given as segments.
    #[arg(long, default_value_t = 100, conflicts_with = "segments")]
    population: u64,

    /// Share of the population expected to join (%).
    #[arg(long, default_value = "20", value_parser = args::percentage)]
    conversion: Decimal,

    /// Discount on treatment prices (%), unless a treatment overrides it.
    #[arg(long, default_value = "10", value_parser = args::percentage)]
    discount: Decimal,

    /// Events needed to reach the conversion rate.
    #[arg(long, default_value_t = 4)]
    events: u32,

    /// Treatment as NAME[:CONVERSION[:DISCOUNT]]; repeat for more.
    /// Defaults to every treatment in the program's table.
    #[arg(long = "treatment", value_parser = args::treatment_selection)]
    treatments: Vec<TreatmentSelection>,
}

impl OutreachInputs {
    fn into_parameters(self) -> OutreachParameters {
        let segments = if self.segments.is_empty() {
            vec![PopulationSegment::new("Total Potential Customer", self.population)]
        } else {
            self.segments
        };
        OutreachParameters {
            program: self.program,
            segments,
            conversion_rate: self.conversion,
            discount_rate: self.discount,
            event_frequency: self.events,
            selections: self.treatments,
        }
    }
}

#[derive(Debug, Args)]
struct OutreachArgs {
    #[command(flatten)]
    inputs: OutreachInputs,

    /// Save the totals as a scenario.
    #[arg(long)]
    save: bool,
}

#[derive(Debug, Args)]
struct CashflowArgs {
    /// Program to include; repeat for more.
    #[arg(
        long = "program",
        value_parser = args::program,
        default_values = ["wellness", "school"]
    )]
    programs: Vec<ProgramKind>,

    /// Save the averages as a scenario.
    #[arg(long)]
    save: bool,
}

#[derive(Debug, Subcommand)]
enum ScenarioCommand {
    /// Saved scenarios in the order they were saved.
    List,
    /// Saved scenarios from most to least profitable.
    Rank,
    /// Save average monthly revenue and expense as a scenario.
    Save {
        #[arg(long)]
        revenue: Decimal,
        #[arg(long)]
        expense: Decimal,
    },
    /// Delete every saved scenario.
    Reset,
}

#[derive(Debug, Subcommand)]
enum TalentCommand {
    /// Show the current price list.
    Show,
    /// Hourly fee and weekly charge for a weekly hour commitment.
    Quote {
        /// Cumulative dentist hours per week.
        hours: u32,
    },
    /// Publish a price list; the standard tiers when none are given.
    Save {
        /// Tier as MINIMUM_HOURS=FEE; repeat for more.
        #[arg(long = "tier", value_parser = args::hiring_tier)]
        tiers: Vec<HiringTier>,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration.
    Show,
    /// Write a commented configuration template.
    Init {
        #[arg(default_value = "clinic.toml")]
        path: PathBuf,
        #[arg(long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn report_save(
    ledger: &mut ScenarioLedger,
    metrics: impl Into<ScenarioMetrics>,
) -> Result<()> {
    let receipt = ledger.save(metrics).context("failed to save scenario")?;
    println!("{}", render::render_saved(&receipt.snapshot));
    if let PersistenceStatus::Failed(reason) = &receipt.persistence {
        warn!(%reason, "Scenario kept for this session only");
        println!("Warning: scenario not written to storage ({reason})");
    }
    Ok(())
}

fn run_scenario(
    app: &App,
    command: ScenarioCommand,
) -> Result<()> {
    let mut ledger = app.open_ledger()?;
    match command {
        ScenarioCommand::List => println!("{}", render::render_scenarios(&ledger.compare())),
        ScenarioCommand::Rank => {
            println!("{}", render::render_scenarios(&ledger.ranked_by_profit()))
        }
        ScenarioCommand::Save { revenue, expense } => {
            if revenue < Decimal::ZERO || expense < Decimal::ZERO {
                bail!("revenue and expense must not be negative");
            }
            report_save(
                &mut ledger,
                ScenarioMetrics {
                    avg_total_revenue: revenue,
                    avg_total_expense: expense,
                },
            )?;
        }
        ScenarioCommand::Reset => match ledger.reset() {
            PersistenceStatus::Failed(reason) => {
                bail!("saved scenarios could not be deleted: {reason}")
            }
            _ => println!("All scenarios deleted."),
        },
    }
    Ok(())
}

fn run_talent(
    app: &App,
    command: TalentCommand,
) -> Result<()> {
    match command {
        TalentCommand::Show => println!("{}", render::render_price_list(&app.price_list()?)),
        TalentCommand::Quote { hours } => {
            let list = app.price_list()?;
            match (list.fee_for(hours), list.weekly_quote(hours)) {
                (Some(fee), Some(weekly)) => println!(
                    "{hours} hours a week: {} per hour per dentist, {} per week",
                    format_rupiah(fee),
                    format_rupiah(weekly)
                ),
                _ => bail!("no tier applies to {hours} hours a week"),
            }
        }
        TalentCommand::Save { tiers } => {
            let list = if tiers.is_empty() {
                HiringPriceList::default()
            } else {
                HiringPriceList::new(tiers)?
            };
            app.publish_price_list(&list)?;
            println!("Price list updated.\n{}", render::render_price_list(&list));
        }
    }
    Ok(())
}

fn run(
    app: &App,
    command: Command,
) -> Result<()> {
    match command {
        Command::Wellness(wellness) => {
            let projection = app.wellness(WellnessParameters {
                total_potential_employee: wellness.employees,
                conversion_rate: wellness.conversion,
                discount_package: wellness.discount,
                subscription_length_years: wellness.years,
                selected_treatments: wellness.treatments,
                dsp_selections: wellness.dsp,
            })?;
            println!("{}", render::render_wellness(&projection));
            if wellness.save {
                report_save(&mut app.open_ledger()?, projection.grand)?;
            }
        }
        Command::Outreach(outreach) => {
            let projection = app.outreach(outreach.inputs.into_parameters())?;
            println!("{}", render::render_outreach(&projection));
            if outreach.save {
                report_save(&mut app.open_ledger()?, projection.totals)?;
            }
        }
        Command::Preview(inputs) => {
            let rows = app.preview(inputs.into_parameters())?;
            println!("{}", render::render_preview(&rows));
        }
        Command::Cashflow(cashflow) => {
            let board = app.cashflow(&cashflow.programs)?;
            let programs: Vec<&str> = board.programs().collect();
            let summary = board.average();
            println!(
                "{}",
                render::render_cashflow(&programs, &board.combine(), &summary)
            );
            if cashflow.save {
                report_save(&mut app.open_ledger()?, summary)?;
            }
        }
        Command::Scenario(command) => run_scenario(app, command)?,
        Command::Talent(command) => run_talent(app, command)?,
        Command::Config(ConfigCommand::Show) => print!("{}", app.config().to_toml()?),
        Command::Config(ConfigCommand::Init { path, force }) => {
            Config::write_template(&path, force)?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_overrides(ConfigOverrides {
        data_dir: cli.data_dir,
        ledger_backend: cli.ledger_backend,
        ledger_location: cli.ledger,
        log_level: cli.log_level,
    });
    logging::init_logging(&config.logging)?;
    debug!(data_dir = %config.data.dir.display(), ledger = %config.ledger.backend, "Configuration loaded");

    let app = App::new(config);
    run(&app, cli.command)
}
