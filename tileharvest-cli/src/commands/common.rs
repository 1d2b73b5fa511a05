//! Common argument types and resolution helpers shared across CLI commands.

use clap::Args;
use tileharvest::config::ConfigFile;
use tileharvest::coord::{BoundingBox, GeoPoint, MAX_ZOOM};
use tileharvest::region::Region;
use tileharvest::sources::resolve_source;

use crate::error::CliError;

/// Region selection: a bounding box or a polygon of points.
#[derive(Debug, Clone, Args)]
pub struct RegionArgs {
    /// Bounding box as west,south,east,north in degrees
    #[arg(
        long,
        value_parser = parse_bbox,
        allow_hyphen_values = true,
        required_unless_present = "point",
        conflicts_with = "point"
    )]
    pub bbox: Option<BoundingBox>,

    /// Polygon vertex as lat,lon (repeat at least three times)
    #[arg(long = "point", value_parser = parse_point, allow_hyphen_values = true)]
    pub point: Vec<GeoPoint>,
}

impl RegionArgs {
    pub fn to_region(&self) -> Result<Region, CliError> {
        match &self.bbox {
            Some(bounds) => Ok(Region::from_bounds(bounds)),
            None => Ok(Region::from_points(&self.point)?),
        }
    }
}

fn parse_numbers<const N: usize>(s: &str, what: &str) -> Result<[f64; N], String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid {}: {}", what, e))?;

    values
        .try_into()
        .map_err(|_| format!("{} needs exactly {} comma-separated numbers", what, N))
}

/// Parse `west,south,east,north`.
pub fn parse_bbox(s: &str) -> Result<BoundingBox, String> {
    let [west, south, east, north] = parse_numbers::<4>(s, "bounding box")?;
    Ok(BoundingBox::new(west, south, east, north))
}

/// Parse `lat,lon`.
pub fn parse_point(s: &str) -> Result<GeoPoint, String> {
    let [lat, lon] = parse_numbers::<2>(s, "point")?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(format!("point {},{} is outside the world", lat, lon));
    }
    Ok(GeoPoint::new(lat, lon))
}

/// Zoom level: CLI takes precedence, then config.
pub fn resolve_zoom(cli_zoom: Option<u8>, config: &ConfigFile) -> Result<u8, CliError> {
    let zoom = cli_zoom.or(config.output.zoom).ok_or_else(|| {
        CliError::Config("No zoom level. Use --zoom or set zoom in [output] of config.ini".into())
    })?;
    if zoom > MAX_ZOOM {
        return Err(CliError::Config(format!(
            "Zoom level {} is above the maximum of {}",
            zoom, MAX_ZOOM
        )));
    }
    Ok(zoom)
}

/// Source URL template: CLI takes precedence, then config. Preset names are expanded.
pub fn resolve_source_template(cli_source: Option<String>, config: &ConfigFile) -> String {
    let source = cli_source.unwrap_or_else(|| config.output.source.clone());
    resolve_source(&source)
}
