use std::fmt;

use serde::Serialize;

use super::{summarize_total, summarize_variant, FieldSummary};
use crate::data::filter::measurements_for;
use crate::data::model::{field_label, ResultSet, Variant};

// ---------------------------------------------------------------------------
// Report structure
// ---------------------------------------------------------------------------

/// Summary for one field; `None` when no result file was found.
#[derive(Debug, Clone, Serialize)]
pub struct FieldEntry {
    pub field: String,
    pub summary: Option<FieldSummary>,
}

/// All fields for one variant.
#[derive(Debug, Clone, Serialize)]
pub struct VariantSection {
    pub variant: Variant,
    pub fields: Vec<FieldEntry>,
}

/// The full aggregation: each variant on its own, then both combined.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub variants: Vec<VariantSection>,
    pub total: Vec<FieldEntry>,
}

impl Report {
    /// Aggregate every requested field of `set`.
    pub fn build(set: &ResultSet) -> Self {
        let variants = Variant::ALL
            .iter()
            .map(|&variant| VariantSection {
                variant,
                fields: set
                    .fields
                    .iter()
                    .map(|field| FieldEntry {
                        field: field.clone(),
                        summary: summarize_variant(&measurements_for(set, field, Some(variant))),
                    })
                    .collect(),
            })
            .collect();

        let total = set
            .fields
            .iter()
            .map(|field| FieldEntry {
                field: field.clone(),
                summary: summarize_total(&measurements_for(set, field, None)),
            })
            .collect();

        Report { variants, total }
    }
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

fn write_entries(f: &mut fmt::Formatter<'_>, entries: &[FieldEntry]) -> fmt::Result {
    for entry in entries {
        let label = field_label(&entry.field);
        match &entry.summary {
            Some(s) => {
                writeln!(f, "Slope {label}: {}", s.slope)?;
                writeln!(f, "Pearson R {label}: {}", s.pearson)?;
                writeln!(f, "Spearman R {label}: {}", s.spearman)?;
            }
            None => writeln!(f, "{label}: no result files")?,
        }
    }
    Ok(())
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, section) in self.variants.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}:", section.variant.heading())?;
            write_entries(f, &section.fields)?;
        }
        writeln!(f)?;
        writeln!(f, "Total:")?;
        write_entries(f, &self.total)
    }
}
