//! Price data seams: the source trait and polars bar schema.

pub mod provider;
pub mod schema;

pub use provider::{DataSource, PriceSource, SourceError, SourcedBars};
pub use schema::{bars_from_dataframe, bars_to_dataframe, BarSchema, BAR_COLUMNS};
