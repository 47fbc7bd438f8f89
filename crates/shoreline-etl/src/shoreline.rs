//! Per-shapefile measurement.

use shoreline_core::{LengthUnit, MeasureMethod, Projector, SpatialReference, UtmZone};
use std::path::Path;

use crate::config::Config;
use crate::error::EtlResult;
use crate::reader::{FeatureRead, ShapefileSource};
use crate::results::LengthRow;

/// Class recorded for features without a classification value.
pub const NO_CLASS: &str = "none";

pub const NOTE_UNKNOWN_SR: &str = "unknown spatial reference";
pub const NOTE_NOT_POLYLINE: &str = "doesn't contain polylines";

/// Settings that shape how a shapefile is measured.
#[derive(Debug, Clone)]
pub struct MeasureOptions {
    pub class_field: String,
    pub method: MeasureMethod,
    pub statute_mile: LengthUnit,
}

impl MeasureOptions {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            class_field: config.class_field.clone(),
            method: config.method,
            statute_mile: config.statute_mile.unit(),
        }
    }
}

impl Default for MeasureOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// A shapefile the user asked to measure, with its UTM zone resolved.
#[derive(Debug)]
pub struct ShorelineFile {
    source: ShapefileSource,
    zone: Option<UtmZone>,
}

impl ShorelineFile {
    /// Open `path` and pick its UTM zone.
    ///
    /// A zone that cannot be determined is not an error here; it shows up
    /// as an `unknown spatial reference` row when measured.
    pub fn open(path: &Path) -> EtlResult<Self> {
        let source = ShapefileSource::open(path)?;
        log::info!("Reading spatial reference of {}...", source.name());

        let zone = source
            .spatial_reference()
            .reference_longitude(source.extent())
            .and_then(|lon| match UtmZone::from_longitude(lon) {
                Ok(zone) => Some(zone),
                Err(e) => {
                    log::warn!("{}: {}", source.name(), e);
                    None
                }
            });

        if zone.is_none() {
            log::warn!("Unable to calculate UTM zone for {}", source.name());
            log::warn!("(The shp probably has an unknown spatial reference.)");
        }

        Ok(Self { source, zone })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.source.name()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.source.path()
    }

    #[must_use]
    pub const fn zone(&self) -> Option<UtmZone> {
        self.zone
    }

    #[must_use]
    pub const fn spatial_reference(&self) -> &SpatialReference {
        self.source.spatial_reference()
    }

    fn base_row(&self) -> LengthRow {
        LengthRow {
            shp_name: self.name().to_string(),
            shp_path: self.path().display().to_string(),
            shp_sr: self.spatial_reference().name().to_string(),
            calc_sr: self.zone.map_or_else(|| "unknown".to_string(), UtmZone::name),
            utm_zone: self.zone.map(UtmZone::number),
            ccoast_class: NO_CLASS.to_string(),
            length_sm: None,
            length_nm: None,
            notes: String::new(),
        }
    }

    fn note_row(&self, note: impl Into<String>, length: Option<f64>) -> LengthRow {
        LengthRow {
            length_sm: length,
            length_nm: length,
            notes: note.into(),
            ..self.base_row()
        }
    }

    /// Measure every feature, producing one row per feature.
    ///
    /// Shapefiles that cannot be measured produce a single explanatory row
    /// instead: lengths are `None` when the spatial reference is unusable
    /// and zero when there are no polylines to measure.
    pub fn measure(&self, options: &MeasureOptions) -> Vec<LengthRow> {
        let Some(zone) = self.zone else {
            log::warn!("{} spatial reference unknown", self.path().display());
            return vec![LengthRow {
                shp_sr: "unknown".to_string(),
                ..self.note_row(NOTE_UNKNOWN_SR, None)
            }];
        };

        if !self.source.is_polyline() {
            log::warn!("{} doesn't contain polylines", self.path().display());
            return vec![self.note_row(NOTE_NOT_POLYLINE, Some(0.0))];
        }

        let projector = match Projector::new(self.spatial_reference(), zone) {
            Ok(projector) => projector,
            Err(e) => {
                log::warn!("{}: {}", self.path().display(), e);
                return vec![self.note_row(e.to_string(), None)];
            }
        };

        log::info!("Processing {}...", self.path().display());

        let features = match self.source.features(&options.class_field) {
            Ok(features) => features,
            Err(e) => {
                log::warn!("{}", e);
                return vec![self.note_row(format!("unreadable: {e}"), None)];
            }
        };
        if !features.has_class_field {
            log::debug!("{} has no {} field", self.name(), options.class_field);
        }

        let mut rows = Vec::with_capacity(features.reads.len());
        for read in features.reads {
            let feature = match read {
                FeatureRead::Feature(feature) => feature,
                FeatureRead::Unreadable { index, reason } => {
                    log::warn!(
                        "Unknown geometry error OID# {} ({}): {}",
                        index,
                        self.name(),
                        reason
                    );
                    continue;
                }
            };

            let length = feature
                .geometry
                .as_ref()
                .ok_or_else(|| "null geometry".to_string())
                .and_then(|lines| {
                    options
                        .method
                        .measure(&projector, lines)
                        .map_err(|e| e.to_string())
                });

            match length {
                Ok(meters) => rows.push(LengthRow {
                    ccoast_class: feature.class.unwrap_or_else(|| NO_CLASS.to_string()),
                    length_sm: Some(options.statute_mile.from_meters(meters)),
                    length_nm: Some(LengthUnit::NauticalMiles.from_meters(meters)),
                    ..self.base_row()
                }),
                Err(reason) => log::warn!(
                    "Unknown geometry error OID# {} ({}): {}",
                    feature.index,
                    self.name(),
                    reason
                ),
            }
        }

        rows
    }
}

/// The row recorded for a shapefile that could not be opened at all.
pub fn unreadable_row(path: &Path, reason: impl std::fmt::Display) -> LengthRow {
    LengthRow {
        shp_name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string()),
        shp_path: path.display().to_string(),
        shp_sr: "unknown".to_string(),
        calc_sr: "unknown".to_string(),
        utm_zone: None,
        ccoast_class: NO_CLASS.to_string(),
        length_sm: None,
        length_nm: None,
        notes: format!("unreadable: {reason}"),
    }
}
