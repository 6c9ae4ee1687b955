//! Holdings module - domain models, canonical conversion, CSV interchange,
//! and store traits.

mod holdings_constants;
mod holdings_csv;
mod holdings_model;
mod holdings_traits;


pub use holdings_constants::*;
pub use holdings_csv::{holdings_to_csv, parse_holdings_csv, CsvParseOutcome};
pub use holdings_model::{
    generate_local_id, totals_by_metal, Holding, HoldingInput, Metal, MetalTotal, WeightUnit,
};
pub use holdings_traits::{LocalHoldingsRepositoryTrait, RemoteHoldingsRepositoryTrait};
