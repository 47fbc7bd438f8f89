//! The results table: one row per measured feature, summarised per
//! shapefile and per C-COAST class.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use shoreline_core::units::round_to;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::EtlResult;
use crate::export::{self, ExportFormat};

/// Decimal places summary lengths are rounded to.
pub const LENGTH_DECIMALS: u32 = 2;

/// Prefix of exported table names.
pub const TABLE_PREFIX: &str = "ShorelineMileages";

/// One measured feature, or one explanatory row for a shapefile that
/// could not be measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LengthRow {
    pub shp_name: String,
    pub shp_path: String,
    /// Name of the shapefile's own spatial reference.
    pub shp_sr: String,
    /// Name of the UTM system lengths were calculated in.
    pub calc_sr: String,
    pub utm_zone: Option<u8>,
    pub ccoast_class: String,
    pub length_sm: Option<f64>,
    pub length_nm: Option<f64>,
    pub notes: String,
}

/// Aggregated lengths for a shapefile, or a shapefile and class.
///
/// Descriptive columns take the first row's value; lengths are summed and
/// rounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub shp_name: String,
    pub shp_path: String,
    pub shp_sr: String,
    pub calc_sr: String,
    pub utm_zone: Option<u8>,
    /// `None` in the per-shapefile totals.
    pub ccoast_class: Option<String>,
    pub length_sm: Option<f64>,
    pub length_nm: Option<f64>,
    pub notes: String,
    /// Number of rows folded into this one.
    pub rows: usize,
}

impl SummaryRow {
    fn start(row: &LengthRow, by_class: bool) -> Self {
        Self {
            shp_name: row.shp_name.clone(),
            shp_path: row.shp_path.clone(),
            shp_sr: row.shp_sr.clone(),
            calc_sr: row.calc_sr.clone(),
            utm_zone: row.utm_zone,
            ccoast_class: by_class.then(|| row.ccoast_class.clone()),
            length_sm: None,
            length_nm: None,
            notes: row.notes.clone(),
            rows: 0,
        }
    }

    fn fold(&mut self, row: &LengthRow) {
        self.length_sm = add(self.length_sm, row.length_sm);
        self.length_nm = add(self.length_nm, row.length_nm);
        self.rows += 1;
    }

    fn round(mut self) -> Self {
        self.length_sm = self.length_sm.map(|v| round_to(v, LENGTH_DECIMALS));
        self.length_nm = self.length_nm.map(|v| round_to(v, LENGTH_DECIMALS));
        self
    }
}

/// Sum where a missing value counts as nothing, and two missing values
/// stay missing.
fn add(total: Option<f64>, value: Option<f64>) -> Option<f64> {
    match (total, value) {
        (Some(a), Some(b)) => Some(a + b),
        (Some(a), None) => Some(a),
        (None, b) => b,
    }
}

/// All rows produced by a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultsTable {
    rows: Vec<LengthRow>,
}

impl ResultsTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one shapefile's rows.
    pub fn add_shp_results(&mut self, rows: impl IntoIterator<Item = LengthRow>) {
        self.rows.extend(rows);
    }

    #[must_use]
    pub fn rows(&self) -> &[LengthRow] {
        &self.rows
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether any row carries a real classification value.
    #[must_use]
    pub fn has_classes(&self) -> bool {
        self.rows
            .iter()
            .any(|r| r.ccoast_class != crate::shoreline::NO_CLASS)
    }

    fn summarise(&self, by_class: bool) -> Vec<SummaryRow> {
        let mut index: HashMap<(&str, Option<&str>), usize> = HashMap::new();
        let mut summary: Vec<SummaryRow> = Vec::new();

        for row in &self.rows {
            let key = (
                row.shp_path.as_str(),
                by_class.then_some(row.ccoast_class.as_str()),
            );
            let slot = *index.entry(key).or_insert_with(|| {
                summary.push(SummaryRow::start(row, by_class));
                summary.len() - 1
            });
            summary[slot].fold(row);
        }

        summary.into_iter().map(SummaryRow::round).collect()
    }

    /// Lengths per class per shapefile, in order of first appearance.
    #[must_use]
    pub fn class_summary(&self) -> Vec<SummaryRow> {
        self.summarise(true)
    }

    /// Total lengths per shapefile, in order of first appearance.
    #[must_use]
    pub fn total_summary(&self) -> Vec<SummaryRow> {
        self.summarise(false)
    }

    /// Write the per-class summary to `dir` as a table named for `now`.
    pub fn export<Tz: TimeZone>(
        &self,
        dir: &Path,
        format: ExportFormat,
        now: &DateTime<Tz>,
    ) -> EtlResult<PathBuf>
    where
        Tz::Offset: std::fmt::Display,
    {
        std::fs::create_dir_all(dir)?;
        let path = dir
            .join(table_name(now))
            .with_extension(format.extension());
        log::info!("Exporting results to {}...", path.display());
        export::write(&path, format, &self.class_summary())?;
        Ok(path)
    }
}

/// Table name for a run started at `now`, e.g.
/// `ShorelineMileages_2024_03_05_14_07_09`.
pub fn table_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}_{}", TABLE_PREFIX, now.format("%Y_%m_%d_%H_%M_%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(path: &str, class: &str, sm: Option<f64>) -> LengthRow {
        LengthRow {
            shp_name: path.rsplit('/').next().unwrap().to_string(),
            shp_path: path.to_string(),
            shp_sr: "GCS_North_American_1983".to_string(),
            calc_sr: "NAD_1983_2011_UTM_Zone_18N".to_string(),
            utm_zone: Some(18),
            ccoast_class: class.to_string(),
            length_sm: sm,
            length_nm: sm.map(|v| v * 0.868_976),
            notes: String::new(),
        }
    }

    fn table() -> ResultsTable {
        let mut table = ResultsTable::new();
        table.add_shp_results(vec![
            row("/data/a.shp", "1", Some(1.111)),
            row("/data/a.shp", "2", Some(2.0)),
            row("/data/a.shp", "1", Some(1.111)),
        ]);
        table.add_shp_results(vec![row("/data/b.shp", "none", Some(0.5))]);
        table
    }

    #[test]
    fn test_class_summary_groups_by_path_and_class() {
        let summary = table().class_summary();
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0].ccoast_class.as_deref(), Some("1"));
        assert_eq!(summary[0].length_sm, Some(2.22));
        assert_eq!(summary[0].rows, 2);
        assert_eq!(summary[1].ccoast_class.as_deref(), Some("2"));
        assert_eq!(summary[2].shp_name, "b.shp");
    }

    #[test]
    fn test_total_summary_groups_by_path() {
        let summary = table().total_summary();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].length_sm, Some(4.22));
        assert_eq!(summary[0].ccoast_class, None);
        assert_eq!(summary[0].rows, 3);
        assert_eq!(summary[1].length_sm, Some(0.5));
    }

    #[test]
    fn test_missing_lengths_stay_missing_unless_mixed() {
        let mut table = ResultsTable::new();
        table.add_shp_results(vec![row("/data/u.shp", "none", None)]);
        table.add_shp_results(vec![
            row("/data/m.shp", "none", None),
            row("/data/m.shp", "none", Some(1.0)),
        ]);
        let summary = table.total_summary();
        assert_eq!(summary[0].length_sm, None);
        assert_eq!(summary[1].length_sm, Some(1.0));
    }

    #[test]
    fn test_same_name_different_paths_are_separate() {
        let mut table = ResultsTable::new();
        table.add_shp_results(vec![
            row("/one/coast.shp", "none", Some(1.0)),
            row("/two/coast.shp", "none", Some(2.0)),
        ]);
        assert_eq!(table.total_summary().len(), 2);
    }

    #[test]
    fn test_has_classes() {
        assert!(table().has_classes());
        let mut plain = ResultsTable::new();
        plain.add_shp_results(vec![row("/data/b.shp", "none", Some(0.5))]);
        assert!(!plain.has_classes());
        assert!(ResultsTable::new().is_empty());
    }

    #[test]
    fn test_table_name() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        assert_eq!(table_name(&now), "ShorelineMileages_2024_03_05_14_07_09");
    }
}
