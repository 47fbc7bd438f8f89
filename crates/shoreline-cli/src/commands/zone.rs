use anyhow::{Context, Result};
use shoreline_core::UtmZone;

/// Print the UTM zone for a longitude, or for the midpoint of a range.
pub fn show_zone(lon: f64, lon_max: Option<f64>) -> Result<()> {
    let zone = match lon_max {
        Some(lon_max) => UtmZone::from_longitude_range(lon, lon_max)
            .with_context(|| format!("No UTM zone for longitudes {} to {}", lon, lon_max))?,
        None => UtmZone::from_longitude(lon)
            .with_context(|| format!("No UTM zone for longitude {}", lon))?,
    };

    println!("UTM zone: {}", zone.number());
    println!("  central meridian: {}", zone.central_meridian());
    println!("  EPSG: {}", zone.epsg());
    println!("  name: {}", zone.name());

    if !zone.has_nad83_2011() {
        println!("\n  (No NAD 1983 (2011) realisation for this zone; using WGS 1984.)");
    }

    Ok(())
}
