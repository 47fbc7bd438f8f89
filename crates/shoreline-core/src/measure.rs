//! Polyline length measurement.
//!
//! Vertices are projected into the chosen UTM zone and the planar length
//! of each part is summed, which is what a GIS reports as the shape length
//! of a polyline read through a projected spatial reference.

use geo::{Coord, Euclidean, Geodesic, Length, LineString, MultiLineString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::crs::{Projection, SpatialReference};
use crate::error::{Error, Result};
use crate::utm::{TransverseMercator, UtmZone};

/// How feature lengths are measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureMethod {
    /// Planar length in the UTM zone picked for the shapefile.
    #[default]
    Utm,
    /// Length along the WGS84 ellipsoid.
    Geodesic,
}

impl MeasureMethod {
    pub fn measure(self, projector: &Projector, lines: &MultiLineString<f64>) -> Result<f64> {
        match self {
            Self::Utm => measure_polyline(projector, lines),
            Self::Geodesic => geodesic_length(projector, lines),
        }
    }
}

impl fmt::Display for MeasureMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utm => write!(f, "utm"),
            Self::Geodesic => write!(f, "geodesic"),
        }
    }
}

impl FromStr for MeasureMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utm" => Ok(Self::Utm),
            "geodesic" => Ok(Self::Geodesic),
            other => Err(format!("unknown measure method '{other}' (expected utm or geodesic)")),
        }
    }
}

/// Maps a shapefile's native coordinates into a target UTM zone.
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    /// Source projection and metres per source unit, for projected input.
    source: Option<(TransverseMercator, f64)>,
    target: TransverseMercator,
    zone: UtmZone,
}

impl Projector {
    /// Build a projector from `sr` into `zone`.
    ///
    /// The zone is projected on the source ellipsoid: no datum shift is
    /// applied between NAD83 realisations and WGS84.
    pub fn new(sr: &SpatialReference, zone: UtmZone) -> Result<Self> {
        match sr {
            SpatialReference::Geographic { ellipsoid, .. } => Ok(Self {
                source: None,
                target: TransverseMercator::for_zone(zone, *ellipsoid),
                zone,
            }),
            SpatialReference::Projected {
                name,
                ellipsoid,
                projection,
                ..
            } => match projection {
                Projection::TransverseMercator(params) => Ok(Self {
                    source: Some((
                        TransverseMercator::from_params(params, *ellipsoid),
                        params.linear_unit,
                    )),
                    target: TransverseMercator::for_zone(zone, *ellipsoid),
                    zone,
                }),
                Projection::Unsupported { name: proj, .. } => Err(Error::UnsupportedProjection(
                    format!("{name} ({proj})"),
                )),
            },
            SpatialReference::Unknown => Err(Error::UnsupportedProjection(
                "unknown spatial reference".to_string(),
            )),
        }
    }

    #[must_use]
    pub const fn zone(&self) -> UtmZone {
        self.zone
    }

    /// Native coordinate to geographic (lon, lat) in degrees.
    #[must_use]
    pub fn to_geographic(&self, c: Coord<f64>) -> Coord<f64> {
        match &self.source {
            None => c,
            Some((source, unit)) => {
                let (lon, lat) = source.inverse(c.x * unit, c.y * unit);
                Coord { x: lon, y: lat }
            }
        }
    }

    /// Native coordinate to target zone easting/northing in metres.
    #[must_use]
    pub fn project(&self, c: Coord<f64>) -> Coord<f64> {
        let lonlat = self.to_geographic(c);
        let (x, y) = self.target.forward(lonlat.x, lonlat.y);
        Coord { x, y }
    }
}

fn check_finite(lines: &MultiLineString<f64>) -> Result<()> {
    for line in &lines.0 {
        if let Some(c) = line.0.iter().find(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(Error::CorruptGeometry(format!(
                "non-finite vertex ({}, {})",
                c.x, c.y
            )));
        }
    }
    Ok(())
}

fn finite_length(length: f64) -> Result<f64> {
    if length.is_finite() {
        Ok(length)
    } else {
        Err(Error::CorruptGeometry(format!("length evaluated to {length}")))
    }
}

/// Euclidean length of all parts, in coordinate units.
#[must_use]
pub fn planar_length(lines: &MultiLineString<f64>) -> f64 {
    lines.0.iter().map(|ls| ls.length::<Euclidean>()).sum()
}

/// Length in metres of `lines` once projected into the projector's zone.
pub fn measure_polyline(projector: &Projector, lines: &MultiLineString<f64>) -> Result<f64> {
    check_finite(lines)?;
    let projected = MultiLineString::new(
        lines
            .0
            .iter()
            .map(|ls| LineString::new(ls.0.iter().map(|&c| projector.project(c)).collect()))
            .collect(),
    );
    finite_length(planar_length(&projected))
}

/// Length in metres of `lines` along the WGS84 ellipsoid.
pub fn geodesic_length(projector: &Projector, lines: &MultiLineString<f64>) -> Result<f64> {
    check_finite(lines)?;
    let length = lines
        .0
        .iter()
        .map(|ls| {
            LineString::new(ls.0.iter().map(|&c| projector.to_geographic(c)).collect())
                .length::<Geodesic>()
        })
        .sum();
    finite_length(length)
}
