/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  sites.csv          sites/<CODE>.csv
///      │                    │
///      ▼                    ▼
///  ┌──────────┐        ┌──────────┐
///  │  loader   │ probe  │  loader   │  parse file → SiteTimeSeries
///  └──────────┘───────▶└──────────┘
///      │                    │
///      ▼                    ▼
///  ┌──────────┐        ┌──────────┐
///  │  Marker   │        │  filter   │  rows + year → chart points
///  └──────────┘        └──────────┘
/// ```
pub mod filter;
pub mod loader;
pub mod model;
