//! Text tables for the terminal.

use clinic_core::calculations::{OutreachProjection, WellnessProjection};
use clinic_core::{
    CashflowEntry, CashflowSummary, FinancialResult, ProgramTotals, ScenarioComparison,
    ScenarioSnapshot,
};
use clinic_data::{HiringPriceList, format_rupiah};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Row, Table};
use rust_decimal::Decimal;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

fn money(amount: Decimal) -> Cell {
    Cell::new(format_rupiah(amount)).set_alignment(CellAlignment::Right)
}

fn count(value: impl ToString) -> Cell {
    Cell::new(value.to_string()).set_alignment(CellAlignment::Right)
}

fn profit(amount: Decimal) -> Cell {
    let cell = money(amount);
    if amount < Decimal::ZERO {
        cell.fg(Color::Red)
    } else {
        cell.fg(Color::Green)
    }
}

fn totals_row(
    label: &str,
    totals: &ProgramTotals,
) -> Row {
    Row::from(vec![
        Cell::new(label),
        money(totals.total_revenue),
        money(totals.total_cost),
        profit(totals.total_profit),
    ])
}

/// Per-treatment rows followed by their totals.
pub fn render_financials(
    rows: &[FinancialResult],
    totals: &ProgramTotals,
) -> String {
    let mut table = new_table(vec![
        "Treatment",
        "Demand",
        "Adjusted Price",
        "Revenue",
        "Cost",
        "Profit",
    ]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.treatment),
            count(row.joining_count),
            money(row.adjusted_price),
            money(row.revenue),
            money(row.cost),
            profit(row.profit),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(""),
        Cell::new(""),
        money(totals.total_revenue),
        money(totals.total_cost),
        profit(totals.total_profit),
    ]);
    table.to_string()
}

pub fn render_wellness(projection: &WellnessProjection) -> String {
    let mut summary = new_table(vec!["Figure", "Value"]);
    summary.add_row(vec![
        Cell::new("Joining employees"),
        count(projection.total_joining_employee),
    ]);
    summary.add_row(vec![
        Cell::new("Subscription months"),
        count(projection.subscription_months),
    ]);
    summary.add_row(vec![
        Cell::new("Package price (monthly)"),
        money(projection.package_price),
    ]);
    summary.add_row(vec![
        Cell::new("Discounted package price"),
        money(projection.discounted_package_price),
    ]);
    summary.add_row(vec![
        Cell::new("Dentist fee per member"),
        money(projection.dentist_fee_per_member),
    ]);
    summary.add_row(vec![Cell::new("Member card fee"), money(projection.card_fee)]);
    summary.add_row(vec![
        Cell::new("Cost per member (monthly)"),
        money(projection.cost_per_member),
    ]);
    if let Some(price) = projection.monthly_package_price_per_member() {
        summary.add_row(vec![
            Cell::new("Package revenue per member per month"),
            money(price),
        ]);
    }

    let mut totals = new_table(vec!["", "Revenue", "Cost", "Profit"]);
    totals.add_row(totals_row("Package", &projection.package));
    totals.add_row(totals_row("Dental Saving Plan", &projection.dsp));
    totals.add_row(totals_row("Total", &projection.grand));

    let mut out = summary.to_string();
    if !projection.dsp_rows.is_empty() {
        out.push_str("\n\nDental Saving Plan\n");
        out.push_str(&render_financials(&projection.dsp_rows, &projection.dsp));
    }
    out.push_str("\n\n");
    out.push_str(&totals.to_string());
    out
}

pub fn render_outreach(projection: &OutreachProjection) -> String {
    let mut summary = new_table(vec!["Figure", "Value"]);
    summary.add_row(vec![Cell::new("Program"), Cell::new(projection.program.label())]);
    summary.add_row(vec![
        Cell::new("Total population"),
        count(projection.total_population),
    ]);
    summary.add_row(vec![
        Cell::new("Total joined"),
        count(projection.total_joined.round_dp(0)),
    ]);
    summary.add_row(vec![
        Cell::new("Event cost (per event)"),
        money(projection.event_cost_per_event),
    ]);
    summary.add_row(vec![
        Cell::new("Event frequency"),
        count(projection.event_frequency),
    ]);
    summary.add_row(vec![
        Cell::new("Event cost (total)"),
        money(projection.total_event_cost()),
    ]);

    format!(
        "{}\n\n{}",
        summary,
        render_financials(&projection.rows, &projection.totals)
    )
}

/// Adjusted prices and demand, before any cost is considered.
pub fn render_preview(rows: &[FinancialResult]) -> String {
    let mut table = new_table(vec!["Treatment", "Adjusted Price", "Demand"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.treatment),
            money(row.adjusted_price),
            count(row.joining_count),
        ]);
    }
    table.to_string()
}

pub fn render_cashflow(
    programs: &[&str],
    combined: &[CashflowEntry],
    summary: &CashflowSummary,
) -> String {
    let mut table = new_table(vec!["Month", "Revenue", "Expense", "Net"]);
    for entry in combined {
        table.add_row(vec![
            Cell::new(&entry.month),
            money(entry.revenue),
            money(entry.expense),
            profit(entry.revenue - entry.expense),
        ]);
    }
    table.add_row(vec![
        Cell::new("Average"),
        money(summary.avg_total_revenue),
        money(summary.avg_total_expense),
        profit(summary.avg_total_revenue - summary.avg_total_expense),
    ]);

    format!("Programs: {}\n{}", programs.join(", "), table)
}

pub fn render_scenarios(rows: &[ScenarioComparison]) -> String {
    if rows.is_empty() {
        return "No saved scenarios.".to_string();
    }

    let mut table = new_table(vec![
        "Scenario",
        "Avg Total Revenue",
        "Avg Total Expense",
        "Profit",
    ]);
    for row in rows {
        table.add_row(vec![
            count(row.id),
            money(row.avg_total_revenue),
            money(row.avg_total_expense),
            profit(row.profit),
        ]);
    }
    table.to_string()
}

pub fn render_saved(snapshot: &ScenarioSnapshot) -> String {
    format!(
        "Saved scenario {}: revenue {}, expense {}, profit {}",
        snapshot.id,
        format_rupiah(snapshot.avg_total_revenue),
        format_rupiah(snapshot.avg_total_expense),
        format_rupiah(snapshot.profit())
    )
}

pub fn render_price_list(list: &HiringPriceList) -> String {
    let mut table = new_table(vec!["Hiring Minimum Hour a Week", "Fee per Hour per Dentist"]);
    for tier in list.tiers() {
        table.add_row(vec![count(tier.minimum_hours), money(tier.fee_per_hour)]);
    }
    table.to_string()
}
