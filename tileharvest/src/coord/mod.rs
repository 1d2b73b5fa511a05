//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator tile indices, in both directions.
//!
//! The forward conversions (`lon_to_tile_x`, `lat_to_tile_y`) return the index
//! of the tile *edge* at or west/north of the coordinate, in `0..=2^zoom`.
//! That upper value is a valid corner index even though no tile starts there,
//! which is what region snapping relies on.

mod types;

pub use types::{
    BoundingBox, CoordError, GeoPoint, TileCoord, TileRect, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT,
    MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Fractional distance to a tile edge below which a value counts as on the edge.
///
/// Without it `lon_to_tile_x(tile_x_to_lon(x))` can land on `x - 1` through
/// floating point error.
const EDGE_EPSILON: f64 = 1e-6;

/// Number of tiles along one axis at this zoom level.
#[inline]
fn tiles_per_axis(zoom: u8) -> f64 {
    2.0_f64.powi(zoom as i32)
}

#[inline]
fn floor_to_edge(value: f64, zoom: u8) -> u32 {
    let nearest = value.round();
    let floored = if (value - nearest).abs() < EDGE_EPSILON {
        nearest
    } else {
        value.floor()
    };
    floored.clamp(0.0, tiles_per_axis(zoom)) as u32
}

/// Longitude to tile column: `floor((lon + 180) / 360 * 2^zoom)`.
#[inline]
pub fn lon_to_tile_x(longitude: f64, zoom: u8) -> u32 {
    let lon = longitude.clamp(MIN_LON, MAX_LON);
    floor_to_edge((lon + 180.0) / 360.0 * tiles_per_axis(zoom), zoom)
}

/// Latitude to tile row using the Web Mercator projection.
///
/// Latitudes beyond ±85.05112878° are clamped to the projection limit.
#[inline]
pub fn lat_to_tile_y(latitude: f64, zoom: u8) -> u32 {
    let lat_rad = latitude.clamp(MIN_LAT, MAX_LAT).to_radians();
    let mercator = (lat_rad.tan() + 1.0 / lat_rad.cos()).ln();
    floor_to_edge((1.0 - mercator / PI) / 2.0 * tiles_per_axis(zoom), zoom)
}

/// Longitude of the western edge of tile column `x`.
#[inline]
pub fn tile_x_to_lon(x: u32, zoom: u8) -> f64 {
    x as f64 / tiles_per_axis(zoom) * 360.0 - 180.0
}

/// Latitude of the northern edge of tile row `y` (inverse Web Mercator).
#[inline]
pub fn tile_y_to_lat(y: u32, zoom: u8) -> f64 {
    let n = PI - 2.0 * PI * y as f64 / tiles_per_axis(zoom);
    n.sinh().atan().to_degrees()
}

/// Geographic footprint of a tile: its north-west and south-east corners.
#[inline]
pub fn tile_footprint(coord: &TileCoord) -> TileRect {
    TileRect {
        northwest: GeoPoint::new(
            tile_y_to_lat(coord.y, coord.z),
            tile_x_to_lon(coord.x, coord.z),
        ),
        southeast: GeoPoint::new(
            tile_y_to_lat(coord.y + 1, coord.z),
            tile_x_to_lon(coord.x + 1, coord.z),
        ),
    }
}

/// Converts geographic coordinates to the tile containing them.
///
/// Unlike the raw conversions this validates its input, and a coordinate on
/// the far east or south edge of the world resolves to the last tile rather
/// than to the (non-existent) tile beyond it.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 22)
pub fn to_tile_coords(lat: f64, lon: f64, zoom: u8) -> Result<TileCoord, CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let last = (1u32 << zoom) - 1;
    Ok(TileCoord {
        x: lon_to_tile_x(lon, zoom).min(last),
        y: lat_to_tile_y(lat, zoom).min(last),
        z: zoom,
    })
}
