/// Data layer: core types, loading, filtering, and export.
///
/// Architecture:
/// ```text
///  .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + validate → EventTable
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ EventTable  │  Vec<DisasterEvent>, categorical indices
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply criteria → FilteredView (indices)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  FilteredView → CSV mirroring the input schema
///   └──────────┘
/// ```
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
