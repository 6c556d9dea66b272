//! CSV loaders for the reference tables.
//!
//! Every loader reads a headered CSV (headers are matched by name, values are
//! trimmed) and converts it into the immutable tables the engine consumes.
//! Row numbers in errors are 1-based and exclude the header row.
//!
//! | Table               | Columns |
//! |---------------------|---------|
//! | package prices      | `Treatment`, `Price` |
//! | package costs       | `Component`, `Cost` |
//! | dental saving plan  | `Treatment`, `Price`, `Cost Material`, `Conversion Rate`, `Discount Price` |
//! | outreach treatments | `Treatment`, `Price`, `Cost Material`, `Dentist Fee`?, `Sedation Cost`?, `Conversion Rate` |
//! | event cost          | `Component`, `Unit`, `Cost per Unit` |
//! | cashflow            | `Month`, `Revenue`, `Expense` |
//!
//! Money cells accept `Rp150.000` or a plain number; percentage cells accept
//! `5%` or `5`.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use clinic_core::{
    CashflowEntry, CashflowSeries, EventCostItem, PriceEntry, PriceTable, TreatmentRecord,
    TreatmentTable,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::currency::{CurrencyError, parse_money, parse_optional_money, parse_percent};

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

/// Errors raised while reading a reference table.
#[derive(Debug, Error)]
pub enum ReferenceLoadError {
    #[error("could not open {table} table at {}: {source}", .path.display())]
    Io {
        table: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Structural CSV problem: missing column, wrong field count, bad UTF-8.
    #[error("{table} table is not valid CSV: {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },

    #[error("{table} table row {row}: '{value}' in column '{column}' is not a valid amount")]
    MalformedCurrency {
        table: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("{table} table row {row}: '{value}' in column '{column}' is not a percentage between 0 and 100")]
    InvalidPercentage {
        table: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("{table} table row {row}: '{name}' already appears on row {first_row}")]
    DuplicateName {
        table: String,
        name: String,
        row: usize,
        first_row: usize,
    },
}

// ---------------------------------------------------------------------------
// Serde rows mirroring the CSV layouts
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PriceRow {
    #[serde(rename = "Treatment")]
    treatment: String,
    #[serde(rename = "Price")]
    price: String,
}

#[derive(Debug, Deserialize)]
struct CostRow {
    #[serde(rename = "Component")]
    component: String,
    #[serde(rename = "Cost")]
    cost: String,
}

#[derive(Debug, Deserialize)]
struct DspRow {
    #[serde(rename = "Treatment")]
    treatment: String,
    #[serde(rename = "Price")]
    price: String,
    #[serde(rename = "Cost Material")]
    cost_material: String,
    #[serde(rename = "Conversion Rate", alias = "Conversion Rate (%)")]
    conversion_rate: String,
    #[serde(rename = "Discount Price", alias = "Discount Price (%)")]
    discount_price: String,
}

#[derive(Debug, Deserialize)]
struct OutreachTreatmentRow {
    #[serde(rename = "Treatment")]
    treatment: String,
    #[serde(rename = "Price", alias = "Original Price (Rp.)")]
    price: String,
    #[serde(rename = "Cost Material", alias = "Cost Material (Rp.)")]
    cost_material: String,
    #[serde(rename = "Dentist Fee", alias = "Dentist Fee (Rp.)", default)]
    dentist_fee: Option<String>,
    #[serde(rename = "Sedation Cost", alias = "Sedation Cost (Rp.)", default)]
    sedation_cost: Option<String>,
    #[serde(rename = "Conversion Rate", alias = "Conversion Rate (%)")]
    conversion_rate: String,
}

#[derive(Debug, Deserialize)]
struct EventCostRow {
    #[serde(rename = "Component")]
    component: String,
    #[serde(rename = "Unit")]
    unit: String,
    #[serde(rename = "Cost per Unit", alias = "Cost per Unit (Rp.)")]
    cost_per_unit: String,
}

#[derive(Debug, Deserialize)]
struct CashflowRow {
    #[serde(rename = "Month")]
    month: String,
    #[serde(rename = "Revenue")]
    revenue: String,
    #[serde(rename = "Expense")]
    expense: String,
}

// ---------------------------------------------------------------------------
// Cell conversion with row context
// ---------------------------------------------------------------------------

struct RowContext<'t> {
    table: &'t str,
    row: usize,
}

impl RowContext<'_> {
    fn money(
        &self,
        column: &str,
        value: &str,
    ) -> Result<Decimal, ReferenceLoadError> {
        parse_money(value).map_err(|_| self.malformed(column, value))
    }

    fn optional_money(
        &self,
        column: &str,
        value: Option<&str>,
    ) -> Result<Option<Decimal>, ReferenceLoadError> {
        parse_optional_money(value).map_err(|_| self.malformed(column, value.unwrap_or_default()))
    }

    /// Quantities are plain non-negative numbers; the money rules cover them.
    fn quantity(
        &self,
        column: &str,
        value: &str,
    ) -> Result<Decimal, ReferenceLoadError> {
        self.money(column, value)
    }

    fn percent(
        &self,
        column: &str,
        value: &str,
    ) -> Result<Decimal, ReferenceLoadError> {
        parse_percent(value).map_err(|err| match err {
            CurrencyError::InvalidPercentage(_) => ReferenceLoadError::InvalidPercentage {
                table: self.table.to_string(),
                row: self.row,
                column: column.to_string(),
                value: value.to_string(),
            },
            _ => self.malformed(column, value),
        })
    }

    fn malformed(
        &self,
        column: &str,
        value: &str,
    ) -> ReferenceLoadError {
        ReferenceLoadError::MalformedCurrency {
            table: self.table.to_string(),
            row: self.row,
            column: column.to_string(),
            value: value.to_string(),
        }
    }
}

fn read_rows<R: Read, T: DeserializeOwned>(
    reader: R,
    table: &str,
) -> Result<Vec<(usize, T)>, ReferenceLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(reader);

    csv_reader
        .deserialize::<T>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result.map_err(|source| ReferenceLoadError::Csv {
                table: table.to_string(),
                source,
            })?;
            Ok((idx + 1, row))
        })
        .collect()
}

fn ensure_unique<'a>(
    table: &str,
    names: impl IntoIterator<Item = (usize, &'a str)>,
) -> Result<(), ReferenceLoadError> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (row, name) in names {
        if let Some(&first_row) = seen.get(name) {
            return Err(ReferenceLoadError::DuplicateName {
                table: table.to_string(),
                name: name.to_string(),
                row,
                first_row,
            });
        }
        seen.insert(name, row);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

/// Opens a table file, attaching the table label and path to failures.
pub fn open_table(
    path: &Path,
    table: &str,
) -> Result<File, ReferenceLoadError> {
    File::open(path).map_err(|source| ReferenceLoadError::Io {
        table: table.to_string(),
        path: path.to_path_buf(),
        source,
    })
}

fn into_price_table(
    table: &str,
    rows: Vec<(usize, String, String)>,
    amount_column: &str,
) -> Result<PriceTable, ReferenceLoadError> {
    ensure_unique(table, rows.iter().map(|(row, name, _)| (*row, name.as_str())))?;

    let entries = rows
        .into_iter()
        .map(|(row, name, amount)| {
            let ctx = RowContext { table, row };
            Ok(PriceEntry {
                amount: ctx.money(amount_column, &amount)?,
                name,
            })
        })
        .collect::<Result<Vec<_>, ReferenceLoadError>>()?;

    debug!(table, rows = entries.len(), "Loaded price table");
    Ok(PriceTable::new(table, entries))
}

/// Parses the monthly package price table (`Treatment`, `Price`).
pub fn parse_package_prices<R: Read>(
    reader: R,
    table: &str,
) -> Result<PriceTable, ReferenceLoadError> {
    let rows = read_rows::<_, PriceRow>(reader, table)?
        .into_iter()
        .map(|(row, r)| (row, r.treatment, r.price))
        .collect();
    into_price_table(table, rows, "Price")
}

/// Parses the monthly package cost table (`Component`, `Cost`), including
/// the member card row.
pub fn parse_package_costs<R: Read>(
    reader: R,
    table: &str,
) -> Result<PriceTable, ReferenceLoadError> {
    let rows = read_rows::<_, CostRow>(reader, table)?
        .into_iter()
        .map(|(row, r)| (row, r.component, r.cost))
        .collect();
    into_price_table(table, rows, "Cost")
}

/// Parses the Dental Saving Plan table.
pub fn parse_dsp<R: Read>(
    reader: R,
    table: &str,
) -> Result<TreatmentTable, ReferenceLoadError> {
    let rows = read_rows::<_, DspRow>(reader, table)?;
    ensure_unique(table, rows.iter().map(|(row, r)| (*row, r.treatment.as_str())))?;

    let records = rows
        .into_iter()
        .map(|(row, r)| {
            let ctx = RowContext { table, row };
            Ok(TreatmentRecord {
                original_price: ctx.money("Price", &r.price)?,
                cost_material: ctx.money("Cost Material", &r.cost_material)?,
                dentist_fee: None,
                conversion_rate: ctx.percent("Conversion Rate", &r.conversion_rate)?,
                discount_rate: ctx.percent("Discount Price", &r.discount_price)?,
                sedation_cost: None,
                name: r.treatment,
            })
        })
        .collect::<Result<Vec<_>, ReferenceLoadError>>()?;

    debug!(table, rows = records.len(), "Loaded dental saving plan table");
    Ok(TreatmentTable::new(table, records))
}

/// Parses an outreach treatment table. `Dentist Fee` and `Sedation Cost`
/// are optional columns; blank cells are absent values.
pub fn parse_outreach_treatments<R: Read>(
    reader: R,
    table: &str,
) -> Result<TreatmentTable, ReferenceLoadError> {
    let rows = read_rows::<_, OutreachTreatmentRow>(reader, table)?;
    ensure_unique(table, rows.iter().map(|(row, r)| (*row, r.treatment.as_str())))?;

    let records = rows
        .into_iter()
        .map(|(row, r)| {
            let ctx = RowContext { table, row };
            Ok(TreatmentRecord {
                original_price: ctx.money("Price", &r.price)?,
                cost_material: ctx.money("Cost Material", &r.cost_material)?,
                dentist_fee: ctx.optional_money("Dentist Fee", r.dentist_fee.as_deref())?,
                conversion_rate: ctx.percent("Conversion Rate", &r.conversion_rate)?,
                discount_rate: Decimal::ZERO,
                sedation_cost: ctx.optional_money("Sedation Cost", r.sedation_cost.as_deref())?,
                name: r.treatment,
            })
        })
        .collect::<Result<Vec<_>, ReferenceLoadError>>()?;

    debug!(table, rows = records.len(), "Loaded outreach treatment table");
    Ok(TreatmentTable::new(table, records))
}

/// Parses a per-event cost table (`Component`, `Unit`, `Cost per Unit`).
pub fn parse_event_costs<R: Read>(
    reader: R,
    table: &str,
) -> Result<Vec<EventCostItem>, ReferenceLoadError> {
    let rows = read_rows::<_, EventCostRow>(reader, table)?;
    ensure_unique(table, rows.iter().map(|(row, r)| (*row, r.component.as_str())))?;

    let items = rows
        .into_iter()
        .map(|(row, r)| {
            let ctx = RowContext { table, row };
            Ok(EventCostItem {
                unit_quantity: ctx.quantity("Unit", &r.unit)?,
                cost_per_unit: ctx.money("Cost per Unit", &r.cost_per_unit)?,
                component: r.component,
            })
        })
        .collect::<Result<Vec<_>, ReferenceLoadError>>()?;

    debug!(table, rows = items.len(), "Loaded event cost table");
    Ok(items)
}

/// Parses a monthly cashflow (`Month`, `Revenue`, `Expense`) for `program`.
pub fn parse_cashflow<R: Read>(
    reader: R,
    program: &str,
) -> Result<CashflowSeries, ReferenceLoadError> {
    let rows = read_rows::<_, CashflowRow>(reader, program)?;
    ensure_unique(program, rows.iter().map(|(row, r)| (*row, r.month.as_str())))?;

    let entries = rows
        .into_iter()
        .map(|(row, r)| {
            let ctx = RowContext {
                table: program,
                row,
            };
            Ok(CashflowEntry {
                revenue: ctx.money("Revenue", &r.revenue)?,
                expense: ctx.money("Expense", &r.expense)?,
                month: r.month,
            })
        })
        .collect::<Result<Vec<_>, ReferenceLoadError>>()?;

    debug!(program, months = entries.len(), "Loaded cashflow");
    Ok(CashflowSeries {
        program: program.to_string(),
        entries,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const PRICES_CSV: &str = "\
Treatment,Price
Scaling,Rp150.000
Consultation, 50000
";

    const DSP_CSV: &str = "\
Treatment,Price,Cost Material,Conversion Rate,Discount Price
Whitening,Rp2.000.000,Rp400.000,5%,10%
Crown,3500000,900000,2,0
";

    const OUTREACH_CSV: &str = "\
Treatment,Price,Cost Material,Dentist Fee,Sedation Cost,Conversion Rate
Filling,Rp300.000,Rp60.000,,Rp500.000,50
Extraction,200000,40000,Rp35.000,,30%
";

    // =========================================================================
    // Price tables
    // =========================================================================

    #[test]
    fn package_prices_accept_rupiah_and_numbers() {
        let table = parse_package_prices(PRICES_CSV.as_bytes(), "package prices").unwrap();

        assert_eq!(table.label(), "package prices");
        assert_eq!(table.amount_of("Scaling").unwrap(), dec!(150000));
        assert_eq!(table.amount_of("Consultation").unwrap(), dec!(50000));
    }

    #[test]
    fn package_costs_use_component_column() {
        let csv = "Component,Cost\nScaling,Rp40.000\nMember Card (monthly),Rp5.000\n";
        let table = parse_package_costs(csv.as_bytes(), "package costs").unwrap();

        assert_eq!(
            table.names().collect::<Vec<_>>(),
            vec!["Scaling", "Member Card (monthly)"]
        );
        assert_eq!(table.amount_of("Member Card (monthly)").unwrap(), dec!(5000));
    }

    #[test]
    fn malformed_currency_reports_row_and_column() {
        let csv = "Treatment,Price\nScaling,Rp150.000\nFilling,\"Rp150,000\"\n";
        let err = parse_package_prices(csv.as_bytes(), "package prices").unwrap_err();

        match err {
            ReferenceLoadError::MalformedCurrency {
                row, column, value, ..
            } => {
                assert_eq!(row, 2);
                assert_eq!(column, "Price");
                assert_eq!(value, "Rp150,000");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_amount_is_rejected() {
        let csv = "Treatment,Price\nScaling,-10\n";
        let err = parse_package_prices(csv.as_bytes(), "package prices").unwrap_err();
        assert!(matches!(err, ReferenceLoadError::MalformedCurrency { row: 1, .. }));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let csv = "Treatment,Price\nScaling,1\nFilling,2\nScaling,3\n";
        let err = parse_package_prices(csv.as_bytes(), "package prices").unwrap_err();

        match err {
            ReferenceLoadError::DuplicateName {
                name, row, first_row, ..
            } => {
                assert_eq!(name, "Scaling");
                assert_eq!(row, 3);
                assert_eq!(first_row, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_column_is_a_csv_error() {
        let csv = "Treatment\nScaling\n";
        let err = parse_package_prices(csv.as_bytes(), "package prices").unwrap_err();
        assert!(matches!(err, ReferenceLoadError::Csv { .. }));
    }

    #[test]
    fn empty_table_has_no_rows() {
        let table = parse_package_prices("Treatment,Price\n".as_bytes(), "prices").unwrap();
        assert!(table.entries().is_empty());
    }

    // =========================================================================
    // Treatment tables
    // =========================================================================

    #[test]
    fn dsp_parses_percentages_in_both_forms() {
        let table = parse_dsp(DSP_CSV.as_bytes(), "dental saving plan").unwrap();

        let whitening = table.get("Whitening").unwrap();
        assert_eq!(whitening.original_price, dec!(2000000));
        assert_eq!(whitening.cost_material, dec!(400000));
        assert_eq!(whitening.conversion_rate, dec!(5));
        assert_eq!(whitening.discount_rate, dec!(10));
        assert_eq!(whitening.dentist_fee, None);

        let crown = table.get("Crown").unwrap();
        assert_eq!(crown.conversion_rate, dec!(2));
        assert_eq!(crown.discount_rate, dec!(0));
    }

    #[test]
    fn dsp_rejects_out_of_range_percentage() {
        let csv = "Treatment,Price,Cost Material,Conversion Rate,Discount Price\nCrown,1,1,120%,0\n";
        let err = parse_dsp(csv.as_bytes(), "dsp").unwrap_err();

        match err {
            ReferenceLoadError::InvalidPercentage {
                row, column, value, ..
            } => {
                assert_eq!(row, 1);
                assert_eq!(column, "Conversion Rate");
                assert_eq!(value, "120%");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn outreach_optional_columns_may_be_blank() {
        let table = parse_outreach_treatments(OUTREACH_CSV.as_bytes(), "school").unwrap();

        let filling = table.get("Filling").unwrap();
        assert_eq!(filling.dentist_fee, None);
        assert_eq!(filling.sedation_cost, Some(dec!(500000)));
        assert_eq!(filling.conversion_rate, dec!(50));

        let extraction = table.get("Extraction").unwrap();
        assert_eq!(extraction.dentist_fee, Some(dec!(35000)));
        assert_eq!(extraction.sedation_cost, None);
        assert_eq!(extraction.conversion_rate, dec!(30));
    }

    #[test]
    fn outreach_optional_columns_may_be_missing() {
        let csv = "Treatment,Price,Cost Material,Conversion Rate\nFilling,300000,60000,50\n";
        let table = parse_outreach_treatments(csv.as_bytes(), "school").unwrap();

        let filling = table.get("Filling").unwrap();
        assert_eq!(filling.dentist_fee, None);
        assert_eq!(filling.sedation_cost, None);
    }

    #[test]
    fn outreach_accepts_annotated_headers() {
        let csv = "\
Treatment,Original Price (Rp.),Cost Material (Rp.),Conversion Rate (%)
Filling,300000,60000,50
";
        let table = parse_outreach_treatments(csv.as_bytes(), "school").unwrap();
        assert_eq!(table.get("Filling").unwrap().original_price, dec!(300000));
    }

    // =========================================================================
    // Event cost and cashflow
    // =========================================================================

    #[test]
    fn event_costs_keep_file_order() {
        let csv = "\
Component,Unit,Cost per Unit
Venue,1,Rp1.000.000
Goodie Bag,50,Rp20.000
";
        let items = parse_event_costs(csv.as_bytes(), "event cost").unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].component, "Venue");
        assert_eq!(items[1].unit_quantity, dec!(50));
        assert_eq!(items.iter().map(EventCostItem::total).sum::<Decimal>(), dec!(2000000));
    }

    #[test]
    fn cashflow_rejects_repeated_month() {
        let csv = "Month,Revenue,Expense\nJan,100,50\nJan,100,50\n";
        let err = parse_cashflow(csv.as_bytes(), "Corporate Wellness").unwrap_err();
        assert!(matches!(err, ReferenceLoadError::DuplicateName { row: 2, .. }));
    }

    #[test]
    fn cashflow_labels_series_with_program() {
        let csv = "Month,Revenue,Expense\nJan,Rp1.000,500\nFeb,2000,Rp1.500\n";
        let series = parse_cashflow(csv.as_bytes(), "School Outreach").unwrap();

        assert_eq!(series.program, "School Outreach");
        assert_eq!(series.entries[1].month, "Feb");
        assert_eq!(series.entries[1].expense, dec!(1500));
    }

    #[test]
    fn open_table_reports_path() {
        let err = open_table(Path::new("/definitely/not/here.csv"), "dsp").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.csv"));
    }
}
