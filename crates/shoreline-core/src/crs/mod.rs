//! Spatial reference handling.
//!
//! A shapefile's coordinate system lives in its `.prj` sidecar as WKT. Only
//! the parts needed to pick a UTM zone and to unproject transverse Mercator
//! input are kept: the name, the datum and ellipsoid, and the projection
//! parameters.

mod wkt;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// A reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    /// Semi-major axis in metres.
    pub semi_major: f64,
    pub flattening: f64,
}

impl Ellipsoid {
    /// GRS 1980, used by every NAD83 realisation.
    pub const GRS80: Self = Self {
        semi_major: 6_378_137.0,
        flattening: 1.0 / 298.257_222_101,
    };

    /// WGS 1984.
    pub const WGS84: Self = Self {
        semi_major: 6_378_137.0,
        flattening: 1.0 / 298.257_223_563,
    };

    #[must_use]
    pub fn from_inverse_flattening(semi_major: f64, inverse_flattening: f64) -> Self {
        Self {
            semi_major,
            flattening: 1.0 / inverse_flattening,
        }
    }

    /// First eccentricity squared.
    #[must_use]
    pub fn e2(&self) -> f64 {
        2.0 * self.flattening - self.flattening * self.flattening
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::GRS80
    }
}

/// The horizontal datum named by a spatial reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Datum {
    Nad83,
    Nad83_2011,
    Wgs84,
    Other(String),
}

impl Datum {
    /// Classify a WKT datum name such as `D_North_American_1983`.
    #[must_use]
    pub fn from_wkt_name(name: &str) -> Self {
        let normalized = name.to_ascii_uppercase().replace(['(', ')', ' '], "_");
        if normalized.contains("2011")
            && (normalized.contains("1983") || normalized.contains("NAD83"))
        {
            Self::Nad83_2011
        } else if normalized.contains("NORTH_AMERICAN_1983") || normalized.contains("NAD83") {
            Self::Nad83
        } else if normalized.contains("WGS_1984") || normalized.contains("WGS84") {
            Self::Wgs84
        } else {
            Self::Other(name.to_string())
        }
    }

    /// The ellipsoid conventionally paired with this datum.
    #[must_use]
    pub const fn ellipsoid(&self) -> Ellipsoid {
        match self {
            Self::Wgs84 => Ellipsoid::WGS84,
            Self::Nad83 | Self::Nad83_2011 | Self::Other(_) => Ellipsoid::GRS80,
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nad83 => write!(f, "NAD83"),
            Self::Nad83_2011 => write!(f, "NAD83(2011)"),
            Self::Wgs84 => write!(f, "WGS84"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Parameters of a transverse Mercator projected coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TmParams {
    pub central_meridian: f64,
    pub latitude_of_origin: f64,
    pub scale_factor: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    /// Metres per linear unit of the projected coordinates.
    pub linear_unit: f64,
}

/// The projection of a projected spatial reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    TransverseMercator(TmParams),
    /// Any other projection, kept by name. Its central meridian is still
    /// usable for zone selection when present.
    Unsupported {
        name: String,
        central_meridian: Option<f64>,
    },
}

/// Whether a spatial reference is geographic or projected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SrKind {
    Geographic,
    Projected,
    Unknown,
}

/// A shapefile's coordinate system as described by its `.prj` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpatialReference {
    Geographic {
        name: String,
        datum: Datum,
        ellipsoid: Ellipsoid,
    },
    Projected {
        name: String,
        datum: Datum,
        ellipsoid: Ellipsoid,
        projection: Projection,
    },
    /// No `.prj` file, or one that could not be read.
    Unknown,
}

impl SpatialReference {
    /// Parse a WKT1 (OGC or ESRI flavoured) coordinate system string.
    pub fn from_wkt(text: &str) -> Result<Self> {
        wkt::parse(text)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Geographic { name, .. } | Self::Projected { name, .. } => name,
            Self::Unknown => "unknown",
        }
    }

    #[must_use]
    pub const fn kind(&self) -> SrKind {
        match self {
            Self::Geographic { .. } => SrKind::Geographic,
            Self::Projected { .. } => SrKind::Projected,
            Self::Unknown => SrKind::Unknown,
        }
    }

    #[must_use]
    pub const fn datum(&self) -> Option<&Datum> {
        match self {
            Self::Geographic { datum, .. } | Self::Projected { datum, .. } => Some(datum),
            Self::Unknown => None,
        }
    }

    #[must_use]
    pub const fn ellipsoid(&self) -> Option<Ellipsoid> {
        match self {
            Self::Geographic { ellipsoid, .. } | Self::Projected { ellipsoid, .. } => {
                Some(*ellipsoid)
            }
            Self::Unknown => None,
        }
    }

    /// The longitude used to pick a UTM zone.
    ///
    /// Geographic data uses the midpoint of the extent's longitudes;
    /// projected data uses the projection's central meridian.
    #[must_use]
    pub fn reference_longitude(&self, extent: &Extent) -> Option<f64> {
        match self {
            Self::Geographic { .. } => Some(extent.mid_x()),
            Self::Projected { projection, .. } => match projection {
                Projection::TransverseMercator(params) => Some(params.central_meridian),
                Projection::Unsupported {
                    central_meridian, ..
                } => *central_meridian,
            },
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for SpatialReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A bounding box in a shapefile's native coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Extent {
    #[must_use]
    pub const fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Midpoint of the x range.
    #[must_use]
    pub fn mid_x(&self) -> f64 {
        self.x_min + (self.x_max - self.x_min) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geographic() -> SpatialReference {
        SpatialReference::Geographic {
            name: "GCS_North_American_1983".to_string(),
            datum: Datum::Nad83,
            ellipsoid: Ellipsoid::GRS80,
        }
    }

    #[test]
    fn test_ellipsoid_e2() {
        assert!((Ellipsoid::WGS84.e2() - 0.006_694_379_990_14).abs() < 1e-12);
        assert!((Ellipsoid::GRS80.e2() - 0.006_694_380_022_9).abs() < 1e-12);
    }

    #[test]
    fn test_datum_from_wkt_name() {
        assert_eq!(Datum::from_wkt_name("D_North_American_1983"), Datum::Nad83);
        assert_eq!(
            Datum::from_wkt_name("NAD83_National_Spatial_Reference_System_2011"),
            Datum::Nad83_2011
        );
        assert_eq!(
            Datum::from_wkt_name("D_NAD_1983_2011"),
            Datum::Nad83_2011
        );
        assert_eq!(Datum::from_wkt_name("D_WGS_1984"), Datum::Wgs84);
        assert_eq!(Datum::from_wkt_name("WGS84"), Datum::Wgs84);
        assert_eq!(
            Datum::from_wkt_name("D_European_1950"),
            Datum::Other("D_European_1950".to_string())
        );
    }

    #[test]
    fn test_extent_mid_x() {
        let extent = Extent::new(-76.0, 35.0, -74.0, 36.0);
        assert!((extent.mid_x() - -75.0).abs() < 1e-12);
    }

    #[test]
    fn test_reference_longitude_geographic_uses_midpoint() {
        let extent = Extent::new(-76.0, 35.0, -74.0, 36.0);
        assert_eq!(geographic().reference_longitude(&extent), Some(-75.0));
    }

    #[test]
    fn test_reference_longitude_projected_uses_central_meridian() {
        let sr = SpatialReference::Projected {
            name: "NAD_1983_UTM_Zone_16N".to_string(),
            datum: Datum::Nad83,
            ellipsoid: Ellipsoid::GRS80,
            projection: Projection::TransverseMercator(TmParams {
                central_meridian: -87.0,
                latitude_of_origin: 0.0,
                scale_factor: 0.9996,
                false_easting: 500_000.0,
                false_northing: 0.0,
                linear_unit: 1.0,
            }),
        };
        let extent = Extent::new(400_000.0, 3_300_000.0, 410_000.0, 3_310_000.0);
        assert_eq!(sr.reference_longitude(&extent), Some(-87.0));
    }

    #[test]
    fn test_unknown_has_no_reference_longitude() {
        let extent = Extent::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(SpatialReference::Unknown.reference_longitude(&extent), None);
        assert_eq!(SpatialReference::Unknown.name(), "unknown");
        assert_eq!(SpatialReference::Unknown.kind(), SrKind::Unknown);
    }
}
