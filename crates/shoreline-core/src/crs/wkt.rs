//! A small WKT1 reader covering what `.prj` files carry.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use super::{Datum, Ellipsoid, Projection, SpatialReference, TmParams};
use crate::error::{Error, Result};

#[allow(clippy::expect_used)]
fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("WKT pattern is a valid regex")
}

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"(?i)^\s*(PROJCS|GEOGCS)\s*\[\s*"([^"]*)""#));
static DATUM: LazyLock<Regex> = LazyLock::new(|| pattern(r#"(?i)DATUM\s*\[\s*"([^"]*)""#));
static SPHEROID: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r#"(?i)SPHEROID\s*\[\s*"[^"]*"\s*,\s*([-+0-9.eE]+)\s*,\s*([-+0-9.eE]+)"#)
});
static PROJECTION: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"(?i)PROJECTION\s*\[\s*"([^"]*)""#));
static PARAMETER: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"(?i)PARAMETER\s*\[\s*"([^"]*)"\s*,\s*([-+0-9.eE]+)"#));
static UNIT: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"(?i)UNIT\s*\[\s*"([^"]*)"\s*,\s*([-+0-9.eE]+)"#));

fn number(raw: &str, what: &str) -> Result<f64> {
    raw.parse::<f64>()
        .map_err(|_| Error::UnsupportedWkt(format!("bad {what} value '{raw}'")))
}

/// Projection and parameter names vary in case and spacing between
/// writers, e.g. `Central_Meridian` vs `central meridian`.
fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace(' ', "_")
}

fn excerpt(text: &str) -> String {
    text.trim().chars().take(40).collect()
}

pub(super) fn parse(text: &str) -> Result<SpatialReference> {
    let header = HEADER
        .captures(text)
        .ok_or_else(|| Error::UnsupportedWkt(excerpt(text)))?;
    let keyword = header[1].to_ascii_uppercase();
    let name = header[2].to_string();

    let datum = DATUM
        .captures(text)
        .map(|c| Datum::from_wkt_name(&c[1]))
        .unwrap_or_else(|| Datum::Other("unknown".to_string()));

    let ellipsoid = match SPHEROID.captures(text) {
        Some(c) => {
            let semi_major = number(&c[1], "semi-major axis")?;
            let inverse_flattening = number(&c[2], "inverse flattening")?;
            if inverse_flattening == 0.0 {
                Ellipsoid {
                    semi_major,
                    flattening: 0.0,
                }
            } else {
                Ellipsoid::from_inverse_flattening(semi_major, inverse_flattening)
            }
        }
        None => datum.ellipsoid(),
    };

    if keyword == "GEOGCS" {
        return Ok(SpatialReference::Geographic {
            name,
            datum,
            ellipsoid,
        });
    }

    let projection_match = PROJECTION
        .captures(text)
        .ok_or_else(|| Error::UnsupportedWkt(format!("{name}: PROJCS without PROJECTION")))?;
    let projection_name = projection_match[1].to_string();
    let after_projection = projection_match.get(0).map_or(text.len(), |m| m.end());

    let mut params = HashMap::new();
    for c in PARAMETER.captures_iter(text) {
        params.insert(normalize(&c[1]), number(&c[2], &c[1])?);
    }

    // Only a UNIT after PROJECTION is linear; earlier ones belong to the
    // nested GEOGCS and are angular.
    let linear_unit = match UNIT.captures_iter(&text[after_projection..]).last() {
        Some(c) => number(&c[2], "unit")?,
        None => 1.0,
    };

    let projection = match normalize(&projection_name).as_str() {
        "transverse_mercator" | "gauss_kruger" => {
            let central_meridian = params.get("central_meridian").copied().ok_or_else(|| {
                Error::UnsupportedProjection(format!("{name}: missing Central_Meridian"))
            })?;
            Projection::TransverseMercator(TmParams {
                central_meridian,
                latitude_of_origin: params.get("latitude_of_origin").copied().unwrap_or(0.0),
                scale_factor: params.get("scale_factor").copied().unwrap_or(1.0),
                false_easting: params.get("false_easting").copied().unwrap_or(0.0),
                false_northing: params.get("false_northing").copied().unwrap_or(0.0),
                linear_unit,
            })
        }
        _ => {
            log::debug!("{name} uses {projection_name}, which cannot be unprojected");
            Projection::Unsupported {
                name: projection_name,
                central_meridian: params.get("central_meridian").copied(),
            }
        }
    };

    Ok(SpatialReference::Projected {
        name,
        datum,
        ellipsoid,
        projection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::SrKind;

    const NAD83: &str = r#"GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137.0,298.257222101]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

    const UTM_16N: &str = r#"PROJCS["NAD_1983_UTM_Zone_16N",GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137.0,298.257222101]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],PARAMETER["False_Easting",500000.0],PARAMETER["False_Northing",0.0],PARAMETER["Central_Meridian",-87.0],PARAMETER["Scale_Factor",0.9996],PARAMETER["Latitude_Of_Origin",0.0],UNIT["Meter",1.0]]"#;

    const NC_STATE_PLANE: &str = r#"PROJCS["NAD_1983_StatePlane_North_Carolina_FIPS_3200_Feet",GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137.0,298.257222101]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Lambert_Conformal_Conic"],PARAMETER["False_Easting",2000000.002616666],PARAMETER["False_Northing",0.0],PARAMETER["Central_Meridian",-79.0],PARAMETER["Standard_Parallel_1",34.33333333333334],PARAMETER["Standard_Parallel_2",36.16666666666666],PARAMETER["Latitude_Of_Origin",33.75],UNIT["Foot_US",0.3048006096012192]]"#;

    const WGS84_OGC: &str = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433],AUTHORITY["EPSG","4326"]]"#;

    #[test]
    fn test_parse_geographic_nad83() {
        let sr = parse(NAD83).unwrap();
        assert_eq!(sr.kind(), SrKind::Geographic);
        assert_eq!(sr.name(), "GCS_North_American_1983");
        assert_eq!(sr.datum(), Some(&Datum::Nad83));
        let ellipsoid = sr.ellipsoid().unwrap();
        assert!((ellipsoid.flattening - Ellipsoid::GRS80.flattening).abs() < 1e-15);
    }

    #[test]
    fn test_parse_geographic_wgs84_ogc_flavour() {
        let sr = parse(WGS84_OGC).unwrap();
        assert_eq!(sr.name(), "WGS 84");
        assert_eq!(sr.datum(), Some(&Datum::Wgs84));
    }

    #[test]
    fn test_parse_utm_projection() {
        let sr = parse(UTM_16N).unwrap();
        assert_eq!(sr.kind(), SrKind::Projected);
        let SpatialReference::Projected { projection, .. } = sr else {
            panic!("expected projected");
        };
        let Projection::TransverseMercator(params) = projection else {
            panic!("expected transverse mercator");
        };
        assert_eq!(params.central_meridian, -87.0);
        assert_eq!(params.scale_factor, 0.9996);
        assert_eq!(params.false_easting, 500_000.0);
        assert_eq!(params.linear_unit, 1.0);
    }

    #[test]
    fn test_parse_lambert_keeps_central_meridian() {
        let sr = parse(NC_STATE_PLANE).unwrap();
        let SpatialReference::Projected { projection, .. } = sr else {
            panic!("expected projected");
        };
        assert_eq!(
            projection,
            Projection::Unsupported {
                name: "Lambert_Conformal_Conic".to_string(),
                central_meridian: Some(-79.0),
            }
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse(""), Err(Error::UnsupportedWkt(_))));
        assert!(matches!(
            parse(r#"COMPD_CS["x"]"#),
            Err(Error::UnsupportedWkt(_))
        ));
    }

    #[test]
    fn test_parse_projcs_without_projection() {
        let wkt = r#"PROJCS["odd",GEOGCS["g",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]]]]"#;
        assert!(matches!(parse(wkt), Err(Error::UnsupportedWkt(_))));
    }

    #[test]
    fn test_parse_tm_without_linear_unit_defaults_to_metres() {
        let wkt = UTM_16N.replace(r#",UNIT["Meter",1.0]"#, "");
        assert!(wkt.contains("UNIT"), "geographic unit should remain");
        let SpatialReference::Projected {
            projection: Projection::TransverseMercator(params),
            ..
        } = parse(&wkt).unwrap()
        else {
            panic!("expected transverse mercator");
        };
        assert_eq!(params.linear_unit, 1.0);
    }

    #[test]
    fn test_parse_tm_in_us_feet() {
        let wkt = UTM_16N.replace(r#"UNIT["Meter",1.0]"#, r#"UNIT["Foot_US",0.3048006096012192]"#);
        let SpatialReference::Projected {
            projection: Projection::TransverseMercator(params),
            ..
        } = parse(&wkt).unwrap()
        else {
            panic!("expected transverse mercator");
        };
        assert!((params.linear_unit - 0.304_800_609_601_219_2).abs() < 1e-15);
    }
}
