//! Reading polyline features out of shapefiles.

use geo::{LineString, MultiLineString};
use shapefile::dbase::{FieldValue, Record};
use shapefile::{Shape, ShapeType};
use shoreline_core::{Extent, SpatialReference};
use std::path::{Path, PathBuf};

use crate::error::{EtlError, EtlResult};

/// One polyline feature with the attributes the ruler needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Record number within the shapefile, starting at 0.
    pub index: usize,
    /// `None` for null or non-polyline shapes.
    pub geometry: Option<MultiLineString<f64>>,
    /// Value of the classification field, if present and not blank.
    pub class: Option<String>,
}

/// The outcome of reading one record.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureRead {
    Feature(Feature),
    Unreadable { index: usize, reason: String },
}

/// Everything read from one shapefile's records.
#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    pub reads: Vec<FeatureRead>,
    /// Whether any record carried the classification field.
    pub has_class_field: bool,
}

/// A shapefile on disk with its header and spatial reference read.
#[derive(Debug, Clone)]
pub struct ShapefileSource {
    path: PathBuf,
    name: String,
    shape_type: ShapeType,
    extent: Extent,
    spatial_reference: SpatialReference,
}

impl ShapefileSource {
    /// Open the shapefile at `path`, reading its header and `.prj`.
    pub fn open(path: &Path) -> EtlResult<Self> {
        let reader =
            shapefile::Reader::from_path(path).map_err(|e| EtlError::shapefile(path, e))?;
        let header = reader.header();
        let extent = Extent::new(
            header.bbox.min.x,
            header.bbox.min.y,
            header.bbox.max.x,
            header.bbox.max.y,
        );

        Ok(Self {
            path: path.to_path_buf(),
            name: file_name(path),
            shape_type: header.shape_type,
            extent,
            spatial_reference: read_prj(path),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    #[must_use]
    pub const fn extent(&self) -> &Extent {
        &self.extent
    }

    #[must_use]
    pub const fn spatial_reference(&self) -> &SpatialReference {
        &self.spatial_reference
    }

    /// Whether the shapefile stores polylines (with or without M/Z).
    #[must_use]
    pub fn is_polyline(&self) -> bool {
        matches!(
            self.shape_type,
            ShapeType::Polyline | ShapeType::PolylineM | ShapeType::PolylineZ
        )
    }

    /// Read every record, taking the class from `class_field`.
    ///
    /// A record that fails to parse ends the read: the shapefile's record
    /// stream cannot be resynchronised after a bad record.
    pub fn features(&self, class_field: &str) -> EtlResult<FeatureSet> {
        let mut reader =
            shapefile::Reader::from_path(&self.path).map_err(|e| EtlError::shapefile(&self.path, e))?;

        let mut set = FeatureSet::default();
        for (index, result) in reader.iter_shapes_and_records().enumerate() {
            match result {
                Ok((shape, record)) => {
                    let class = match field_value(&record, class_field) {
                        Some(value) => {
                            set.has_class_field = true;
                            class_value(value)
                        }
                        None => None,
                    };
                    set.reads.push(FeatureRead::Feature(Feature {
                        index,
                        geometry: polyline_geometry(shape),
                        class,
                    }));
                }
                Err(e) => {
                    set.reads.push(FeatureRead::Unreadable {
                        index,
                        reason: e.to_string(),
                    });
                    break;
                }
            }
        }

        Ok(set)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read the `.prj` sidecar, falling back to [`SpatialReference::Unknown`].
pub fn read_prj(shp_path: &Path) -> SpatialReference {
    let prj_path = shp_path.with_extension("prj");
    let wkt = match std::fs::read_to_string(&prj_path) {
        Ok(wkt) => wkt,
        Err(e) => {
            log::debug!("No readable .prj for {}: {}", shp_path.display(), e);
            return SpatialReference::Unknown;
        }
    };

    match SpatialReference::from_wkt(&wkt) {
        Ok(sr) => sr,
        Err(e) => {
            log::warn!("Could not parse {}: {}", prj_path.display(), e);
            SpatialReference::Unknown
        }
    }
}

/// Look a field up by name, falling back to its upper-case spelling since
/// dBase field names are conventionally upper case.
fn field_value<'a>(record: &'a Record, field: &str) -> Option<&'a FieldValue> {
    record
        .get(field)
        .or_else(|| record.get(&field.to_ascii_uppercase()))
}

/// Render a classification value as text. Blank and null values are `None`.
pub fn class_value(value: &FieldValue) -> Option<String> {
    let text = match value {
        FieldValue::Character(Some(s)) => s.trim().to_string(),
        FieldValue::Numeric(Some(n)) => format_number(*n),
        FieldValue::Float(Some(n)) => format_number(f64::from(*n)),
        FieldValue::Integer(n) => n.to_string(),
        FieldValue::Logical(Some(b)) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

fn to_lines<P>(parts: &[Vec<P>], xy: impl Fn(&P) -> (f64, f64)) -> MultiLineString<f64> {
    MultiLineString::new(
        parts
            .iter()
            .map(|part| LineString::from(part.iter().map(&xy).collect::<Vec<_>>()))
            .collect(),
    )
}

/// Polyline parts as a multi line string; other shapes have no length.
pub fn polyline_geometry(shape: Shape) -> Option<MultiLineString<f64>> {
    match shape {
        Shape::Polyline(line) => Some(to_lines(line.parts(), |p| (p.x, p.y))),
        Shape::PolylineM(line) => Some(to_lines(line.parts(), |p| (p.x, p.y))),
        Shape::PolylineZ(line) => Some(to_lines(line.parts(), |p| (p.x, p.y))),
        _ => None,
    }
}
