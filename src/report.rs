//! Summary CSV emitter.

use std::path::Path;

use crate::models::YearlyCounts;

/// Write the aggregated counts as `Year,Keyword,Count` rows.
///
/// One row per (year, keyword), keyword-sorted within each year. Zero
/// counts are included so every vocabulary entry appears for every year.
pub fn write_counts_csv(path: &Path, results: &YearlyCounts) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Year", "Keyword", "Count"])?;

    for (year, counter) in results {
        for (keyword, count) in counter.iter() {
            writer.write_record([year.to_string().as_str(), keyword, count.to_string().as_str()])?;
        }
    }

    writer.flush()?;
    Ok(())
}
