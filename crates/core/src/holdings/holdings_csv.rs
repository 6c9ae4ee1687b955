//! CSV interchange for holdings.
//!
//! One fixed format, shared by the local store export/import and by the sync
//! service when it exports the currently observed collection. Export quotes
//! every field; import is tolerant and skips rows it cannot use instead of
//! failing the whole file.

use std::str::FromStr;

use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use log::warn;
use rust_decimal::Decimal;

use super::holdings_constants::{
    CSV_HEADER, CSV_MIN_FIELDS, CSV_MONEY_DECIMALS, CSV_WEIGHT_DECIMALS,
};
use super::holdings_model::{Holding, HoldingInput, Metal, WeightUnit};
use crate::errors::{Error, Result};

/// Outcome of a tolerant CSV parse.
#[derive(Debug, Clone)]
pub struct CsvParseOutcome {
    /// Importable, validated rows in file order.
    pub inputs: Vec<HoldingInput>,
    /// Number of rows skipped (too short, unparseable, or invalid).
    pub skipped: usize,
}

/// Serializes holdings into the CSV interchange format.
///
/// Column order is fixed: Metal, Type, Weight (oz), Quantity, Total Oz,
/// Purchase Price, Purchase Date, Notes, Created At. Every field is double
/// quoted; weights use 4 decimals, money 2.
pub fn holdings_to_csv(holdings: &[Holding]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER.split(','))
        .map_err(|e| Error::Unexpected(format!("CSV header write failed: {}", e)))?;

    for holding in holdings {
        writer
            .write_record(&[
                holding.metal.as_str().to_string(),
                holding.product_type.clone(),
                format!("{:.*}", CSV_WEIGHT_DECIMALS, holding.weight),
                holding.quantity.to_string(),
                format!("{:.*}", CSV_WEIGHT_DECIMALS, holding.total_oz()),
                format!("{:.*}", CSV_MONEY_DECIMALS, holding.purchase_price),
                holding.purchase_date.format("%Y-%m-%d").to_string(),
                holding.notes.clone().unwrap_or_default(),
                holding.created_at.to_rfc3339(),
            ])
            .map_err(|e| Error::Unexpected(format!("CSV row write failed: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Unexpected(format!("CSV flush failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::Unexpected(format!("CSV is not UTF-8: {}", e)))
}

/// Parses CSV text into importable holding inputs.
///
/// Tolerant by design: quoted commas are honored, a UTF-8 BOM and the header
/// row are skipped, and any row with fewer than [`CSV_MIN_FIELDS`] fields or
/// with unusable metal/number values is skipped with a warning. The weight
/// column is already canonical troy ounces, so imported rows always carry
/// `weight_unit = oz`. The derived Total Oz and Created At columns are
/// ignored; a missing or unparseable date falls back to today.
pub fn parse_holdings_csv(text: &str) -> Result<CsvParseOutcome> {
    let content = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut inputs = Vec::new();
    let mut skipped = 0usize;

    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping unreadable CSV row {}: {}", index + 1, e);
                skipped += 1;
                continue;
            }
        };

        let fields: Vec<&str> = record.iter().map(str::trim).collect();
        if fields.iter().all(|f| f.is_empty()) {
            continue;
        }
        if is_header_row(&fields) {
            continue;
        }
        if fields.len() < CSV_MIN_FIELDS {
            warn!(
                "Skipping CSV row {}: expected at least {} fields, got {}",
                index + 1,
                CSV_MIN_FIELDS,
                fields.len()
            );
            skipped += 1;
            continue;
        }

        match parse_row(&fields) {
            Ok(input) => inputs.push(input),
            Err(e) => {
                warn!("Skipping CSV row {}: {}", index + 1, e);
                skipped += 1;
            }
        }
    }

    Ok(CsvParseOutcome { inputs, skipped })
}

fn is_header_row(fields: &[&str]) -> bool {
    fields
        .first()
        .is_some_and(|f| f.eq_ignore_ascii_case("metal"))
}

fn parse_row(fields: &[&str]) -> Result<HoldingInput> {
    let metal = Metal::from_str(fields[0])?;
    let weight = parse_decimal_field(fields[2], "weight")?;
    let quantity = fields[3]
        .parse::<i32>()
        .map_err(|_| invalid_field("quantity", fields[3]))?;
    // fields[4] is the derived Total Oz column
    let purchase_price = parse_decimal_field(fields[5], "purchase price")?;
    let purchase_date = fields
        .get(6)
        .and_then(|f| chrono::NaiveDate::parse_from_str(f, "%Y-%m-%d").ok())
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    let notes = fields
        .get(7)
        .filter(|f| !f.is_empty())
        .map(|f| f.to_string());

    let input = HoldingInput {
        metal,
        product_type: fields[1].to_string(),
        weight,
        weight_unit: WeightUnit::Oz,
        quantity,
        purchase_price,
        purchase_date,
        notes,
    };
    input.validate()?;
    Ok(input)
}

/// Parses a decimal cell, tolerating currency symbols and thousands commas.
fn parse_decimal_field(raw: &str, field_name: &str) -> Result<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    Decimal::from_str(&cleaned).map_err(|_| invalid_field(field_name, raw))
}

fn invalid_field(field_name: &str, raw: &str) -> Error {
    Error::Validation(crate::errors::ValidationError::InvalidInput(format!(
        "Unusable {} value '{}'",
        field_name, raw
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn sample_holding() -> Holding {
        let input = HoldingInput {
            metal: Metal::Gold,
            product_type: "1oz Eagle".to_string(),
            weight: dec!(1),
            weight_unit: WeightUnit::Oz,
            quantity: 2,
            purchase_price: dec!(1999.5),
            purchase_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            notes: Some("bought at show, slight scuff".to_string()),
        };
        Holding::from_input("local-1".to_string(), &input)
    }

    #[test]
    fn test_export_writes_fixed_header() {
        let csv = holdings_to_csv(&[]).unwrap();
        let header = csv.lines().next().unwrap();
        assert_eq!(
            header,
            "\"Metal\",\"Type\",\"Weight (oz)\",\"Quantity\",\"Total Oz\",\"Purchase Price\",\"Purchase Date\",\"Notes\",\"Created At\""
        );
    }

    #[test]
    fn test_export_quotes_every_field_and_fixes_decimals() {
        let csv = holdings_to_csv(&[sample_holding()]).unwrap();
        let row = csv.lines().nth(1).unwrap();

        assert!(row.starts_with("\"gold\",\"1oz Eagle\",\"1.0000\",\"2\",\"2.0000\",\"1999.50\",\"2024-01-15\","));
        // Every field is wrapped in double quotes
        assert!(row.split(',').count() >= 9);
    }

    #[test]
    fn test_export_decimals_follow_the_declared_precision() {
        let csv = holdings_to_csv(&[sample_holding()]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        let fields: Vec<&str> = row.trim_matches('"').split("\",\"").collect();

        let fraction_len = |cell: &str| cell.split('.').nth(1).map_or(0, str::len);
        assert_eq!(fraction_len(fields[2]), CSV_WEIGHT_DECIMALS);
        assert_eq!(fraction_len(fields[4]), CSV_WEIGHT_DECIMALS);
        assert_eq!(fraction_len(fields[5]), CSV_MONEY_DECIMALS);
    }

    #[test]
    fn test_export_quotes_commas_inside_notes() {
        let csv = holdings_to_csv(&[sample_holding()]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("\"bought at show, slight scuff\""));
    }

    #[test]
    fn test_import_round_trips_export() {
        let holding = sample_holding();
        let csv = holdings_to_csv(std::slice::from_ref(&holding)).unwrap();
        let outcome = parse_holdings_csv(&csv).unwrap();

        assert_eq!(outcome.skipped, 0);
        assert_eq!(outcome.inputs.len(), 1);
        let row = &outcome.inputs[0];
        assert_eq!(row.metal, Metal::Gold);
        assert_eq!(row.product_type, "1oz Eagle");
        assert_eq!(row.weight, dec!(1.0000));
        assert_eq!(row.weight_unit, WeightUnit::Oz);
        assert_eq!(row.quantity, 2);
        assert_eq!(row.purchase_price, dec!(1999.50));
        assert_eq!(row.purchase_date, holding.purchase_date);
        assert_eq!(row.notes.as_deref(), Some("bought at show, slight scuff"));
    }

    #[test]
    fn test_import_skips_short_rows_without_failing() {
        let csv = "\"gold\",\"Coin\",\"1.0000\"\n\"silver\",\"Bar\",\"10.0000\",\"1\",\"10.0000\",\"250.00\",\"2024-02-01\",\"\",\"\"\n";
        let outcome = parse_holdings_csv(csv).unwrap();

        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.inputs.len(), 1);
        assert_eq!(outcome.inputs[0].metal, Metal::Silver);
    }

    #[test]
    fn test_import_skips_unknown_metal_and_bad_numbers() {
        let csv = concat!(
            "\"copper\",\"Coin\",\"1.0000\",\"1\",\"1.0000\",\"10.00\"\n",
            "\"gold\",\"Coin\",\"not-a-number\",\"1\",\"1.0000\",\"10.00\"\n",
            "\"gold\",\"Coin\",\"1.0000\",\"one\",\"1.0000\",\"10.00\"\n",
            "\"gold\",\"Coin\",\"1.0000\",\"1\",\"1.0000\",\"10.00\"\n",
        );
        let outcome = parse_holdings_csv(csv).unwrap();

        assert_eq!(outcome.skipped, 3);
        assert_eq!(outcome.inputs.len(), 1);
    }

    #[test]
    fn test_import_tolerates_currency_symbols_in_money() {
        let csv = "\"gold\",\"Coin\",\"1.0000\",\"1\",\"1.0000\",\"$2,000.00\",\"2024-01-01\"\n";
        let outcome = parse_holdings_csv(csv).unwrap();
        assert_eq!(outcome.inputs[0].purchase_price, dec!(2000.00));
    }

    #[test]
    fn test_import_defaults_missing_date_to_today() {
        let csv = "\"gold\",\"Coin\",\"1.0000\",\"1\",\"1.0000\",\"100.00\"\n";
        let outcome = parse_holdings_csv(csv).unwrap();
        assert_eq!(
            outcome.inputs[0].purchase_date,
            chrono::Utc::now().date_naive()
        );
    }

    #[test]
    fn test_import_strips_bom_and_skips_header() {
        let csv = format!("\u{feff}{}\n\"gold\",\"Coin\",\"1.0000\",\"1\",\"1.0000\",\"100.00\"\n", CSV_HEADER);
        let outcome = parse_holdings_csv(&csv).unwrap();
        assert_eq!(outcome.skipped, 0);
        assert_eq!(outcome.inputs.len(), 1);
    }

    #[test]
    fn test_import_of_empty_text_yields_nothing() {
        let outcome = parse_holdings_csv("").unwrap();
        assert!(outcome.inputs.is_empty());
        assert_eq!(outcome.skipped, 0);
    }
}
