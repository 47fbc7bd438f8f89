use std::path::PathBuf;

use crate::config::Config;
use crate::error::{EtlError, EtlResult};
use crate::export::ExportFormat;
use crate::results::ResultsTable;
use crate::scan::gather_shapefiles;
use crate::shoreline::{unreadable_row, MeasureOptions, ShorelineFile};

/// What to measure and whether to export the results.
#[derive(Debug, Clone, Default)]
pub struct MeasureRequest {
    /// Individual shapefiles.
    pub files: Vec<String>,
    /// Directories to search for shapefiles.
    pub dirs: Vec<String>,
    pub include_subdirs: bool,
    /// Export format, if a results table should be written.
    pub export: Option<ExportFormat>,
    /// Overrides the configured export directory.
    pub export_dir: Option<PathBuf>,
}

/// The outcome of a measurement run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Shapefiles that were processed, in order.
    pub shapefiles: Vec<PathBuf>,
    pub results: ResultsTable,
    /// Path of the exported table, when one was written.
    pub exported: Option<PathBuf>,
}

/// Gather, measure and (optionally) export.
///
/// Problems with individual shapefiles become explanatory rows; only an
/// empty input set or a failed export stop the run.
///
/// # Errors
/// Returns [`EtlError::NoShapefiles`] when nothing was found to measure.
pub fn run(request: &MeasureRequest, config: &Config) -> EtlResult<RunReport> {
    let shapefiles = gather_shapefiles(&request.files, &request.dirs, request.include_subdirs);
    if shapefiles.is_empty() {
        return Err(EtlError::NoShapefiles);
    }
    log::info!("{} shapefile(s) to process", shapefiles.len());

    let options = MeasureOptions::from_config(config);
    let mut results = ResultsTable::new();

    for path in &shapefiles {
        match ShorelineFile::open(path) {
            Ok(shp) => results.add_shp_results(shp.measure(&options)),
            Err(e) if e.is_per_file() => {
                log::warn!("{}", e);
                results.add_shp_results([unreadable_row(path, &e)]);
            }
            Err(e) => return Err(e),
        }
    }

    let exported = match request.export {
        Some(format) => {
            let dir = request
                .export_dir
                .clone()
                .unwrap_or_else(|| config.export_dir.clone());
            Some(results.export(&dir, format, &chrono::Local::now())?)
        }
        None => None,
    };

    Ok(RunReport {
        shapefiles,
        results,
        exported,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_without_inputs() {
        let result = run(&MeasureRequest::default(), &Config::default());
        assert!(matches!(result, Err(EtlError::NoShapefiles)));
    }

    #[test]
    fn test_run_with_missing_file_reports_row() {
        let request = MeasureRequest {
            files: vec!["/definitely/not/here.shp".to_string()],
            ..MeasureRequest::default()
        };
        let report = run(&request, &Config::default()).unwrap();
        assert_eq!(report.results.rows().len(), 1);
        assert!(report.results.rows()[0].notes.starts_with("unreadable"));
        assert!(report.exported.is_none());
    }
}
