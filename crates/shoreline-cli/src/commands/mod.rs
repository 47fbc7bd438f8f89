pub mod config;
pub mod measure;
pub mod zone;

pub use measure::{run_measure, MeasureOutput};
pub use zone::show_zone;
