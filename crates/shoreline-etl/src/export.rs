//! Writing the results table to disk.
//!
//! `.dbf` is the attribute-table format every GIS opens natively; JSON is
//! there for scripts.

use serde::{Deserialize, Serialize};
use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::str::FromStr;

use crate::error::{EtlError, EtlResult};
use crate::results::SummaryRow;

/// Longest text, in bytes, a dBase character field can hold.
const MAX_CHARACTER_LEN: u8 = 254;

/// Output format of an exported results table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Dbf,
    Json,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Dbf => "dbf",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dbf" => Ok(Self::Dbf),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown export format '{other}' (expected dbf or json)")),
        }
    }
}

/// Write `rows` to `path` in `format`.
pub fn write(path: &Path, format: ExportFormat, rows: &[SummaryRow]) -> EtlResult<()> {
    match format {
        ExportFormat::Dbf => write_dbf(path, rows),
        ExportFormat::Json => write_json(path, rows),
    }
}

fn write_json(path: &Path, rows: &[SummaryRow]) -> EtlResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), rows)?;
    Ok(())
}

// dBase field names are limited to 10 characters.
const DBF_FIELDS: [&str; 9] = [
    "shp_name",
    "shp_path",
    "shp_sr",
    "calc_sr",
    "utm_zone",
    "ccoast_cls",
    "length_sm",
    "length_nm",
    "notes",
];

fn field_name(path: &Path, name: &str) -> EtlResult<FieldName> {
    FieldName::try_from(name).map_err(|e| EtlError::export(path, format!("{e:?}")))
}

/// Cut `value` to the field width in bytes without splitting a character.
fn truncate_to_field(value: &str) -> &str {
    let max = usize::from(MAX_CHARACTER_LEN);
    let end = value
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|&end| end <= max)
        .last()
        .unwrap_or(0);
    &value[..end]
}

fn text(value: &str) -> FieldValue {
    FieldValue::Character(Some(truncate_to_field(value).to_string()))
}

fn to_record(row: &SummaryRow) -> Record {
    let values = [
        text(&row.shp_name),
        text(&row.shp_path),
        text(&row.shp_sr),
        text(&row.calc_sr),
        FieldValue::Numeric(row.utm_zone.map(f64::from)),
        text(row.ccoast_class.as_deref().unwrap_or("")),
        FieldValue::Numeric(row.length_sm),
        FieldValue::Numeric(row.length_nm),
        text(&row.notes),
    ];

    let mut record = Record::default();
    for (name, value) in DBF_FIELDS.iter().zip(values) {
        record.insert((*name).to_string(), value);
    }
    record
}

fn write_dbf(path: &Path, rows: &[SummaryRow]) -> EtlResult<()> {
    let [shp_name, shp_path, shp_sr, calc_sr, utm_zone, ccoast, length_sm, length_nm, notes] =
        DBF_FIELDS;

    let builder = TableWriterBuilder::new()
        .add_character_field(field_name(path, shp_name)?, MAX_CHARACTER_LEN)
        .add_character_field(field_name(path, shp_path)?, MAX_CHARACTER_LEN)
        .add_character_field(field_name(path, shp_sr)?, MAX_CHARACTER_LEN)
        .add_character_field(field_name(path, calc_sr)?, MAX_CHARACTER_LEN)
        .add_numeric_field(field_name(path, utm_zone)?, 3, 0)
        .add_character_field(field_name(path, ccoast)?, MAX_CHARACTER_LEN)
        .add_numeric_field(field_name(path, length_sm)?, 18, 2)
        .add_numeric_field(field_name(path, length_nm)?, 18, 2)
        .add_character_field(field_name(path, notes)?, MAX_CHARACTER_LEN);

    let writer = builder
        .build_with_file_dest(path)
        .map_err(|e| EtlError::export(path, e))?;

    let records: Vec<Record> = rows.iter().map(to_record).collect();
    if let Err(e) = writer.write_records(&records) {
        if let Err(remove_err) = std::fs::remove_file(path) {
            log::warn!("Could not remove partial table {}: {}", path.display(), remove_err);
        }
        return Err(EtlError::export(path, e));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn summary() -> Vec<SummaryRow> {
        vec![SummaryRow {
            shp_name: "coast.shp".to_string(),
            shp_path: "/data/coast.shp".to_string(),
            shp_sr: "GCS_North_American_1983".to_string(),
            calc_sr: "NAD_1983_2011_UTM_Zone_18N".to_string(),
            utm_zone: Some(18),
            ccoast_class: Some("6A".to_string()),
            length_sm: Some(12.34),
            length_nm: Some(10.72),
            notes: String::new(),
            rows: 4,
        }]
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("DBF".parse::<ExportFormat>().unwrap(), ExportFormat::Dbf);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("gdb".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Json.extension(), "json");
    }

    #[test]
    fn test_dbf_field_names_fit() {
        for name in DBF_FIELDS {
            assert!(name.len() <= 10, "{name} is too long for dBase");
        }
    }

    #[test]
    fn test_write_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.json");
        write(&path, ExportFormat::Json, &summary()).unwrap();

        let parsed: Vec<SummaryRow> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, summary());
    }

    #[test]
    fn test_truncate_to_field_counts_bytes() {
        assert_eq!(truncate_to_field("short"), "short");

        let ascii = "a".repeat(300);
        assert_eq!(truncate_to_field(&ascii).len(), 254);

        // 2-byte characters: 127 fit exactly, the 128th would not.
        let accented = "é".repeat(200);
        let cut = truncate_to_field(&accented);
        assert_eq!(cut.len(), 254);
        assert_eq!(cut.chars().count(), 127);

        // A 3-byte character straddling the limit is dropped whole.
        let mixed = format!("{}€", "a".repeat(252));
        assert_eq!(truncate_to_field(&mixed), "a".repeat(252));
    }

    #[test]
    fn test_write_dbf_with_long_multibyte_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.dbf");
        let mut rows = summary();
        rows[0].shp_path = format!("/data/{}.shp", "é".repeat(200));

        write(&path, ExportFormat::Dbf, &rows).unwrap();

        let records = shapefile::dbase::read(&path).unwrap();
        assert_eq!(records.len(), 1);
        match records[0].get("shp_path") {
            Some(FieldValue::Character(Some(stored))) => {
                assert!(stored.starts_with("/data/é"));
                assert!(stored.len() <= 254);
            }
            other => panic!("unexpected path value {other:?}"),
        }
    }

    #[test]
    fn test_write_dbf_readable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.dbf");
        write(&path, ExportFormat::Dbf, &summary()).unwrap();

        let records = shapefile::dbase::read(&path).unwrap();
        assert_eq!(records.len(), 1);
        match records[0].get("ccoast_cls") {
            Some(FieldValue::Character(Some(class))) => assert_eq!(class, "6A"),
            other => panic!("unexpected class value {other:?}"),
        }
        match records[0].get("length_sm") {
            Some(FieldValue::Numeric(Some(v))) => assert!((v - 12.34).abs() < 1e-9),
            other => panic!("unexpected length value {other:?}"),
        }
    }
}
