//! Batch measurement for shoreline-ruler.
//!
//! Gathers shapefiles, measures every polyline in the UTM zone picked for
//! its shapefile, and aggregates the lengths into a results table that can
//! be printed or exported.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod reader;
pub mod results;
pub mod scan;
pub mod shoreline;

pub use config::Config;
pub use error::{EtlError, EtlResult};
pub use export::ExportFormat;
pub use pipeline::{run, MeasureRequest, RunReport};
pub use results::{LengthRow, ResultsTable, SummaryRow};
pub use scan::gather_shapefiles;
pub use shoreline::{MeasureOptions, ShorelineFile};
