//! Coordinate type definitions

use std::fmt;

use serde::Serialize;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Zoom levels accepted by the tile sources we talk to
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 22;

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Axis-aligned geographic bounding box.
///
/// Always normalized: `west <= east` and `south <= north`, whatever order
/// the edges were supplied in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    west: f64,
    south: f64,
    east: f64,
    north: f64,
}

impl BoundingBox {
    /// Creates a bounding box, swapping edges that arrive out of order.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west: west.min(east),
            south: south.min(north),
            east: west.max(east),
            north: south.max(north),
        }
    }

    /// Smallest box containing every point, or `None` for an empty input.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a GeoPoint>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let init = (
            first.longitude,
            first.latitude,
            first.longitude,
            first.latitude,
        );
        let (west, south, east, north) = iter.fold(init, |(w, s, e, n), p| {
            (
                w.min(p.longitude),
                s.min(p.latitude),
                e.max(p.longitude),
                n.max(p.latitude),
            )
        });
        Some(Self {
            west,
            south,
            east,
            north,
        })
    }

    pub fn west(&self) -> f64 {
        self.west
    }

    pub fn south(&self) -> f64 {
        self.south
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    pub fn northwest(&self) -> GeoPoint {
        GeoPoint::new(self.north, self.west)
    }

    pub fn northeast(&self) -> GeoPoint {
        GeoPoint::new(self.north, self.east)
    }

    pub fn southwest(&self) -> GeoPoint {
        GeoPoint::new(self.south, self.west)
    }

    pub fn southeast(&self) -> GeoPoint {
        GeoPoint::new(self.south, self.east)
    }

    /// Midpoint of the box in degrees.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.west..=self.east).contains(&point.longitude)
            && (self.south..=self.north).contains(&point.latitude)
    }

    /// Moves a point onto the nearest position inside the box.
    pub fn clamp(&self, point: &GeoPoint) -> GeoPoint {
        GeoPoint::new(
            point.latitude.clamp(self.south, self.north),
            point.longitude.clamp(self.west, self.east),
        )
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "W {:.6} S {:.6} E {:.6} N {:.6}",
            self.west, self.south, self.east, self.north
        )
    }
}

/// Tile coordinates in the Web Mercator quad-tree ("slippy map") scheme.
///
/// At zoom `z` the world is a `2^z × 2^z` grid; `x` grows eastwards and `y`
/// grows southwards from the north-west corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileCoord {
    pub const fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Geographic footprint of this tile.
    #[inline]
    pub fn footprint(&self) -> TileRect {
        super::tile_footprint(self)
    }

    /// Bing-style quadkey: one base-4 digit per zoom level, most significant first.
    pub fn quadkey(&self) -> String {
        (1..=self.z)
            .rev()
            .map(|level| {
                let mask = 1u32 << (level - 1);
                let mut digit = b'0';
                if self.x & mask != 0 {
                    digit += 1;
                }
                if self.y & mask != 0 {
                    digit += 2;
                }
                digit as char
            })
            .collect()
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

/// Corner pair bounding a tile footprint.
///
/// Only ever produced from a [`TileCoord`], see [`TileCoord::footprint`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRect {
    pub northwest: GeoPoint,
    pub southeast: GeoPoint,
}

impl TileRect {
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(
            self.northwest.longitude,
            self.southeast.latitude,
            self.southeast.longitude,
            self.northwest.latitude,
        )
    }

    /// Closed ring suitable for geometric predicates (x = longitude, y = latitude).
    pub fn to_polygon(&self) -> geo::Polygon<f64> {
        let (w, n) = (self.northwest.longitude, self.northwest.latitude);
        let (e, s) = (self.southeast.longitude, self.southeast.latitude);
        geo::Polygon::new(
            geo::LineString::from(vec![(w, n), (e, n), (e, s), (w, s), (w, n)]),
            vec![],
        )
    }
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Latitude is outside valid range (-85.05112878 to 85.05112878)
    InvalidLatitude(f64),
    /// Longitude is outside valid range (-180.0 to 180.0)
    InvalidLongitude(f64),
    /// Zoom level is outside valid range (0 to 22)
    InvalidZoom(u8),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => {
                write!(
                    f,
                    "Invalid latitude: {} (must be between {} and {})",
                    lat, MIN_LAT, MAX_LAT
                )
            }
            CoordError::InvalidLongitude(lon) => {
                write!(
                    f,
                    "Invalid longitude: {} (must be between {} and {})",
                    lon, MIN_LON, MAX_LON
                )
            }
            CoordError::InvalidZoom(zoom) => {
                write!(
                    f,
                    "Invalid zoom level: {} (must be between {} and {})",
                    zoom, MIN_ZOOM, MAX_ZOOM
                )
            }
        }
    }
}

impl std::error::Error for CoordError {}
