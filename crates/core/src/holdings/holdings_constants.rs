//! Holdings module constants.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Conversion factor from grams to troy ounces.
pub const GRAM_TO_OZ: Decimal = dec!(0.0321507);

/// Conversion factor from kilograms to troy ounces.
pub const KILOGRAM_TO_OZ: Decimal = dec!(32.1507);

/// CSV header row written by the exporter and recognized by the importer.
pub const CSV_HEADER: &str =
    "Metal,Type,Weight (oz),Quantity,Total Oz,Purchase Price,Purchase Date,Notes,Created At";

/// Minimum number of fields a CSV row needs to be importable.
pub const CSV_MIN_FIELDS: usize = 6;

/// Decimal places used for weights in CSV output.
pub const CSV_WEIGHT_DECIMALS: usize = 4;

/// Decimal places used for money in CSV output.
pub const CSV_MONEY_DECIMALS: usize = 2;
