//! UTM zone selection and transverse Mercator projection.
//!
//! Formulas follow Snyder 1987 (USGS Professional Paper 1395, pp. 61-64),
//! generalised over the ellipsoid so NAD83 data is projected on GRS80.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crs::{Ellipsoid, TmParams};
use crate::error::{Error, Result};

/// UTM scale factor on the central meridian.
pub const UTM_SCALE_FACTOR: f64 = 0.9996;

/// UTM false easting in metres.
pub const UTM_FALSE_EASTING: f64 = 500_000.0;

/// A northern-hemisphere UTM zone, 1 through 60.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtmZone(u8);

impl UtmZone {
    /// Build a zone from its number.
    pub fn new(number: u8) -> Result<Self> {
        if (1..=60).contains(&number) {
            Ok(Self(number))
        } else {
            Err(Error::InvalidZone(number))
        }
    }

    /// The zone containing `lon` (decimal degrees).
    ///
    /// 180° belongs to zone 60 rather than a 61st zone.
    pub fn from_longitude(lon: f64) -> Result<Self> {
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(Error::InvalidLongitude(lon));
        }
        let zone = ((lon + 180.0) / 6.0).floor() as u8 + 1;
        Ok(Self(zone.min(60)))
    }

    /// The zone for the midpoint of a longitude range.
    pub fn from_longitude_range(lon_min: f64, lon_max: f64) -> Result<Self> {
        Self::from_longitude(lon_min + (lon_max - lon_min) / 2.0)
    }

    #[must_use]
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Longitude of the zone's central meridian in degrees.
    #[must_use]
    pub fn central_meridian(self) -> f64 {
        -183.0 + 6.0 * f64::from(self.0)
    }

    /// Whether a NAD83(2011) code exists for this zone.
    #[must_use]
    pub const fn has_nad83_2011(self) -> bool {
        matches!(self.0, 1..=20 | 59 | 60)
    }

    /// EPSG (or ESRI, for zone 20) code of the projected system.
    ///
    /// NAD83(2011) zones covering US waters come first; everywhere else
    /// falls back to WGS 84 / UTM.
    #[must_use]
    pub const fn epsg(self) -> u32 {
        match self.0 {
            n @ 1..=19 => 6329 + n as u32,
            20 => 102_045,
            59 => 6328,
            60 => 6329,
            n => 32_600 + n as u32,
        }
    }

    /// Display name of the projected system, ESRI style.
    #[must_use]
    pub fn name(self) -> String {
        if self.has_nad83_2011() {
            format!("NAD_1983_2011_UTM_Zone_{}N", self.0)
        } else {
            format!("WGS_1984_UTM_Zone_{}N", self.0)
        }
    }
}

impl fmt::Display for UtmZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A transverse Mercator projection on a given ellipsoid.
///
/// Projected coordinates are always metres; callers scale other linear
/// units before calling [`TransverseMercator::inverse`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransverseMercator {
    ellipsoid: Ellipsoid,
    lon0: f64,
    lat0: f64,
    k0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl TransverseMercator {
    /// Projection for a northern UTM zone.
    #[must_use]
    pub fn for_zone(zone: UtmZone, ellipsoid: Ellipsoid) -> Self {
        Self {
            ellipsoid,
            lon0: zone.central_meridian(),
            lat0: 0.0,
            k0: UTM_SCALE_FACTOR,
            false_easting: UTM_FALSE_EASTING,
            false_northing: 0.0,
        }
    }

    /// Projection described by `.prj` parameters.
    #[must_use]
    pub fn from_params(params: &TmParams, ellipsoid: Ellipsoid) -> Self {
        Self {
            ellipsoid,
            lon0: params.central_meridian,
            lat0: params.latitude_of_origin,
            k0: params.scale_factor,
            false_easting: params.false_easting * params.linear_unit,
            false_northing: params.false_northing * params.linear_unit,
        }
    }

    fn ep2(&self) -> f64 {
        let e2 = self.ellipsoid.e2();
        e2 / (1.0 - e2)
    }

    /// Meridional arc from the equator to `lat` (radians). Snyder eq. 3-21.
    fn meridional_arc(&self, lat: f64) -> f64 {
        let a = self.ellipsoid.semi_major;
        let e2 = self.ellipsoid.e2();
        let e4 = e2 * e2;
        let e6 = e4 * e2;

        a * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * lat).sin())
    }

    /// Geographic (lon, lat) in degrees to projected (x, y) in metres.
    /// Snyder eqs. 8-9 and 8-10.
    #[must_use]
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let a_axis = self.ellipsoid.semi_major;
        let e2 = self.ellipsoid.e2();
        let ep2 = self.ep2();

        let lat = lat_deg.to_radians();
        let lon = lon_deg.to_radians();
        let lon0 = self.lon0.to_radians();

        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let tan_lat = lat.tan();

        let n = a_axis / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let t = tan_lat * tan_lat;
        let c = ep2 * cos_lat * cos_lat;
        let a = cos_lat * (lon - lon0);

        let m = self.meridional_arc(lat);
        let m0 = self.meridional_arc(self.lat0.to_radians());

        let a2 = a * a;
        let a4 = a2 * a2;
        let a6 = a4 * a2;

        let x = self.k0
            * n
            * (a + (1.0 - t + c) * a2 * a / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a4 * a / 120.0)
            + self.false_easting;

        let y = self.k0
            * (m - m0
                + n * tan_lat
                    * (a2 / 2.0
                        + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                        + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a6 / 720.0))
            + self.false_northing;

        (x, y)
    }

    /// Projected (x, y) in metres to geographic (lon, lat) in degrees.
    /// Snyder eqs. 8-12 through 8-25.
    #[must_use]
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let a_axis = self.ellipsoid.semi_major;
        let e2 = self.ellipsoid.e2();
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let ep2 = self.ep2();

        let m0 = self.meridional_arc(self.lat0.to_radians());
        let m = m0 + (y - self.false_northing) / self.k0;
        let mu = m / (a_axis * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));

        let root = (1.0 - e2).sqrt();
        let e1 = (1.0 - root) / (1.0 + root);
        let e1_2 = e1 * e1;
        let e1_3 = e1_2 * e1;
        let e1_4 = e1_3 * e1;

        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1_3 / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1_2 / 16.0 - 55.0 * e1_4 / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1_3 / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1_4 / 512.0) * (8.0 * mu).sin();

        let sin_phi1 = phi1.sin();
        let cos_phi1 = phi1.cos();
        let tan_phi1 = phi1.tan();

        let c1 = ep2 * cos_phi1 * cos_phi1;
        let t1 = tan_phi1 * tan_phi1;
        let w = 1.0 - e2 * sin_phi1 * sin_phi1;
        let n1 = a_axis / w.sqrt();
        let r1 = a_axis * (1.0 - e2) / w.powf(1.5);
        let d = (x - self.false_easting) / (n1 * self.k0);

        let d2 = d * d;
        let d4 = d2 * d2;
        let d6 = d4 * d2;

        let lat = phi1
            - (n1 * tan_phi1 / r1)
                * (d2 / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d4 / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                        - 252.0 * ep2
                        - 3.0 * c1 * c1)
                        * d6
                        / 720.0);

        let lon = self.lon0.to_radians()
            + (d - (1.0 + 2.0 * t1 + c1) * d2 * d / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
                    * d4
                    * d
                    / 120.0)
                / cos_phi1;

        (lon.to_degrees(), lat.to_degrees())
    }
}
