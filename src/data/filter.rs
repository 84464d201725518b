use super::model::{Measurement, ResultSet, Variant};

// ---------------------------------------------------------------------------
// Selection of runs per field / variant
// ---------------------------------------------------------------------------

/// Measurements of `field`, restricted to `variant` when given.
///
/// `None` selects both variants, uv-subtracted runs first, which is what the
/// combined totals are computed from.
pub fn measurements_for(set: &ResultSet, field: &str, variant: Option<Variant>) -> Vec<Measurement> {
    set.runs
        .iter()
        .filter(|run| run.field == field)
        .filter(|run| variant.map_or(true, |v| run.variant == v))
        .map(|run| run.measurement)
        .collect()
}

/// Requested fields for which not a single result file was found.
pub fn fields_without_results(set: &ResultSet) -> Vec<&str> {
    set.fields
        .iter()
        .filter(|field| !set.runs.iter().any(|run| &run.field == *field))
        .map(String::as_str)
        .collect()
}
