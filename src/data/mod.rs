/// Data layer: sale records, loading, filtering, aggregation, presentation.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (quarter derived per row)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Record>, dropdown options, shared via Arc
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSelection → FilteredView (indices)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  quarterly medians, comparison tiles, count
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  format   │  tiles, chart series, table rows / CSV
///   └──────────┘
/// ```
///
/// `Dashboard` ties the stages together for the UI.

pub mod aggregate;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod format;
pub mod loader;
pub mod model;
