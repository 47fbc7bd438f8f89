//! Core measurement model for shoreline-ruler.
//!
//! This crate defines spatial references (parsed from `.prj` WKT), UTM
//! zone selection, a transverse Mercator projection, length units, and
//! the per-polyline measurement that the batch tool builds on.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod crs;
pub mod error;
pub mod measure;
pub mod units;
pub mod utm;

pub use crs::{Datum, Ellipsoid, Extent, Projection, SpatialReference, SrKind, TmParams};
pub use error::{Error, Result};
pub use measure::{geodesic_length, measure_polyline, planar_length, MeasureMethod, Projector};
pub use units::LengthUnit;
pub use utm::{TransverseMercator, UtmZone};
