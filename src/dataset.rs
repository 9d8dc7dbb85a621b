use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use anyhow::Context;

use crate::features::{tenure_bucket, TENURE_BUCKETS};
use crate::models::{DatasetSummary, ReferenceRow, CATEGORY_COLUMNS};

/// Historical customers the categorical encoding is derived from.
///
/// Levels are collected once at load; the table itself is never modified.
#[derive(Debug, Clone)]
pub struct ReferenceDataset {
    rows: Vec<ReferenceRow>,
    levels: Vec<BTreeSet<String>>,
}

impl ReferenceDataset {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open reference dataset {}", path.display()))?;
        Self::from_reader(file)
            .with_context(|| format!("failed to read reference dataset {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut rows = Vec::new();

        for (line, result) in reader.deserialize::<ReferenceRow>().enumerate() {
            let row = result.with_context(|| format!("bad record at row {}", line + 1))?;
            rows.push(row);
        }

        Ok(Self::from_rows(rows))
    }

    pub fn from_rows(rows: Vec<ReferenceRow>) -> Self {
        let mut levels = vec![BTreeSet::new(); CATEGORY_COLUMNS.len()];
        for row in rows.iter() {
            for (set, value) in levels.iter_mut().zip(row.categories.values()) {
                if !value.is_empty() {
                    set.insert(value.to_string());
                }
            }
        }

        Self { rows, levels }
    }

    pub fn rows(&self) -> &[ReferenceRow] {
        &self.rows
    }

    pub fn summary(&self) -> DatasetSummary {
        let mut buckets: Vec<(&'static str, usize)> =
            TENURE_BUCKETS.iter().map(|label| (*label, 0)).collect();
        let mut unbucketed = 0;
        for row in self.rows.iter() {
            match row.tenure.and_then(tenure_bucket) {
                Some(label) => {
                    if let Some(entry) = buckets.iter_mut().find(|(name, _)| *name == label) {
                        entry.1 += 1;
                    }
                }
                None => unbucketed += 1,
            }
        }

        DatasetSummary {
            rows: self.rows.len(),
            unbucketed,
            buckets,
            mean_monthly_charges: mean(self.rows.iter().filter_map(|row| row.monthly_charges)),
            mean_total_charges: mean(self.rows.iter().filter_map(|row| row.total_charges)),
        }
    }

    /// Sorted levels seen for the categorical column at `index` in
    /// [`CATEGORY_COLUMNS`] order.
    pub fn levels(&self, index: usize) -> &BTreeSet<String> {
        &self.levels[index]
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
