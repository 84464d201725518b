/// Data layer: result-file types, loading, and selection.
///
/// Architecture:
/// ```text
///  <field>results_<variant>_*.txt
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  discover + parse fixed line offsets → ResultSet
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │  ResultSet    │  Vec<RunResult>, requested fields
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  select measurements per field / variant
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod sample;
