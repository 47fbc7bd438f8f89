use anyhow::{Context, Result};
use shoreline_etl::{run, Config, MeasureRequest, SummaryRow};

const CLASS_HEADING: &str = "----- C-COAST CLASS LENGTHS -----";
const TOTAL_HEADING: &str = "--------- TOTAL LENGTHS ---------";
const RULE: &str = "---------------------------------";

/// How `measure` presents its results.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeasureOutput {
    /// Print the per-class table even when no shapefile has classes.
    pub by_class: bool,
    /// Print the per-feature rows as JSON instead of tables.
    pub json: bool,
}

pub fn run_measure(request: &MeasureRequest, config: &Config, output: MeasureOutput) -> Result<()> {
    log::debug!("Files: {:?}", request.files);
    log::debug!("Directories: {:?}", request.dirs);

    let report = match run(request, config) {
        Ok(report) => report,
        Err(shoreline_etl::EtlError::NoShapefiles) => {
            log::warn!("No shapefiles were specified and/or contained in the specified directory(ies).");
            return Ok(());
        }
        Err(e) => return Err(e).context("Measurement failed"),
    };

    if output.json {
        let json = serde_json::to_string_pretty(report.results.rows())
            .context("Failed to serialise results")?;
        println!("{}", json);
    } else {
        if output.by_class || report.results.has_classes() {
            println!("{}", CLASS_HEADING);
            print!("{}", render_table(&report.results.class_summary(), true));
            println!("{}", RULE);
        }

        println!("{}", TOTAL_HEADING);
        print!("{}", render_table(&report.results.total_summary(), false));
        println!("{}", RULE);
    }

    if let Some(path) = report.exported {
        println!("\n✓ Exported results to {}", path.display());
    }

    Ok(())
}

fn format_length(length: Option<f64>) -> String {
    length.map_or_else(|| "-".to_string(), |l| format!("{:.2}", l))
}

/// Lay summary rows out as fixed-width text columns.
fn render_table(rows: &[SummaryRow], with_class: bool) -> String {
    let mut header = vec!["shp_name"];
    if with_class {
        header.push("ccoast_class");
    }
    header.extend(["utm_zone", "length_sm", "length_nm", "notes"]);

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut line = vec![row.shp_name.clone()];
            if with_class {
                line.push(row.ccoast_class.clone().unwrap_or_default());
            }
            line.push(row.utm_zone.map_or_else(|| "-".to_string(), |z| z.to_string()));
            line.push(format_length(row.length_sm));
            line.push(format_length(row.length_nm));
            line.push(row.notes.clone());
            line
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&render_line(header.iter().copied(), &widths));
    for line in &cells {
        out.push_str(&render_line(line.iter().map(String::as_str), &widths));
    }
    out
}

fn render_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    let mut line = padded.join("  ").trim_end().to_string();
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, class: Option<&str>, sm: Option<f64>) -> SummaryRow {
        SummaryRow {
            shp_name: name.to_string(),
            shp_path: format!("/data/{name}"),
            shp_sr: "GCS_North_American_1983".to_string(),
            calc_sr: "NAD_1983_2011_UTM_Zone_18N".to_string(),
            utm_zone: Some(18),
            ccoast_class: class.map(str::to_string),
            length_sm: sm,
            length_nm: sm.map(|l| l * 0.87),
            notes: String::new(),
            rows: 1,
        }
    }

    #[test]
    fn test_render_totals() {
        let table = render_table(&[summary("coast.shp", None, Some(1.234))], false);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("shp_name"));
        assert!(!lines[0].contains("ccoast_class"));
        assert!(lines[1].contains("coast.shp"));
        assert!(lines[1].contains("1.23"));
    }

    #[test]
    fn test_render_class_column_and_missing_lengths() {
        let table = render_table(&[summary("coast.shp", Some("7"), None)], true);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].contains("ccoast_class"));
        assert!(lines[1].contains(" 7 "));
        assert!(lines[1].contains('-'));
    }

    #[test]
    fn test_columns_align() {
        let rows = [
            summary("a.shp", None, Some(1.0)),
            summary("a_much_longer_name.shp", None, Some(10.0)),
        ];
        let table = render_table(&rows, false);
        let offsets: Vec<usize> = table.lines().map(|l| l.find("18").unwrap_or(0)).skip(1).collect();
        assert_eq!(offsets[0], offsets[1]);
    }
}
