//! Snapping a bounding box onto the tile grid.
//!
//! The four corners of the box are converted to tile edges at the requested
//! zoom. If the resulting tile rectangle is not square it is cut down to the
//! shorter side, keeping the north-west corner fixed. The tile corners are
//! then converted back to geographic coordinates, so the snapped box lies
//! exactly on tile boundaries.

use thiserror::Error;
use tracing::debug;

use super::Region;
use crate::coord::{
    lat_to_tile_y, lon_to_tile_x, tile_x_to_lon, tile_y_to_lat, BoundingBox, CoordError, GeoPoint,
    MAX_ZOOM,
};

/// Errors raised while turning a selection into a downloadable region.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// No usable polygon was supplied.
    #[error("no region selected (a region needs at least three distinct points)")]
    EmptyRegion,

    /// The selection collapses to zero tiles along one axis.
    #[error("selection is smaller than one tile at zoom {zoom}; zoom in or draw a larger region")]
    Degenerate { zoom: u8 },

    #[error(transparent)]
    Coord(#[from] CoordError),
}

/// A tile-edge index pair. `x` and `y` may equal `2^zoom` on the far edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCorner {
    pub x: u32,
    pub y: u32,
}

impl TileCorner {
    fn offset(self, dx: u32, dy: u32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    fn to_geo(self, zoom: u8) -> GeoPoint {
        GeoPoint::new(tile_y_to_lat(self.y, zoom), tile_x_to_lon(self.x, zoom))
    }
}

/// Corners of a tile-aligned rectangle, in tile-edge indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCorners {
    pub northwest: TileCorner,
    pub northeast: TileCorner,
    pub southwest: TileCorner,
    pub southeast: TileCorner,
}

impl TileCorners {
    fn of(bounds: &BoundingBox, zoom: u8) -> Self {
        let corner = |p: GeoPoint| TileCorner {
            x: lon_to_tile_x(p.longitude, zoom),
            y: lat_to_tile_y(p.latitude, zoom),
        };
        Self {
            northwest: corner(bounds.northwest()),
            northeast: corner(bounds.northeast()),
            southwest: corner(bounds.southwest()),
            southeast: corner(bounds.southeast()),
        }
    }

    pub fn width(&self) -> u32 {
        self.northeast.x.abs_diff(self.northwest.x)
    }

    pub fn height(&self) -> u32 {
        self.southwest.y.abs_diff(self.northwest.y)
    }
}

/// Result of snapping a selection to the tile grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SnappedRegion {
    zoom: u8,
    tiles: TileCorners,
    northwest: GeoPoint,
    northeast: GeoPoint,
    southwest: GeoPoint,
    southeast: GeoPoint,
    bounds: BoundingBox,
    size: u32,
}

impl SnappedRegion {
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn tile_corners(&self) -> &TileCorners {
        &self.tiles
    }

    pub fn northwest(&self) -> GeoPoint {
        self.northwest
    }

    pub fn northeast(&self) -> GeoPoint {
        self.northeast
    }

    pub fn southwest(&self) -> GeoPoint {
        self.southwest
    }

    pub fn southeast(&self) -> GeoPoint {
        self.southeast
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Side length of the square, in tiles.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of whole tiles enclosed by the square.
    pub fn tile_count(&self) -> u64 {
        u64::from(self.size) * u64::from(self.size)
    }

    /// The snapped square as a region polygon.
    pub fn to_region(&self) -> Region {
        Region::from_bounds(&self.bounds)
    }
}

/// Snaps `bounds` to a tile-aligned square at `zoom`.
///
/// A box that is already square in tile space keeps its corners. Otherwise
/// the square is anchored at the north-west corner with a side of
/// `min(width, height)` tiles.
pub fn snap(bounds: &BoundingBox, zoom: u8) -> Result<SnappedRegion, SelectionError> {
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom).into());
    }

    let original = TileCorners::of(bounds, zoom);
    let (width, height) = (original.width(), original.height());

    let (tiles, size) = if width != height {
        let size = width.min(height);
        let nw = original.northwest;
        let square = TileCorners {
            northwest: nw,
            northeast: nw.offset(size, 0),
            southwest: nw.offset(0, size),
            southeast: nw.offset(size, size),
        };
        (square, size)
    } else {
        (original, width)
    };

    if size == 0 {
        return Err(SelectionError::Degenerate { zoom });
    }

    let northwest = tiles.northwest.to_geo(zoom);
    let northeast = tiles.northeast.to_geo(zoom);
    let southwest = tiles.southwest.to_geo(zoom);
    let southeast = tiles.southeast.to_geo(zoom);

    let snapped = BoundingBox::new(
        northwest.longitude.min(southwest.longitude),
        southwest.latitude.min(southeast.latitude),
        northeast.longitude.max(southeast.longitude),
        northwest.latitude.max(northeast.latitude),
    );

    debug!(
        zoom,
        width,
        height,
        size,
        bounds = %snapped,
        "Snapped selection to tile square"
    );

    Ok(SnappedRegion {
        zoom,
        tiles,
        northwest,
        northeast,
        southwest,
        southeast,
        bounds: snapped,
        size,
    })
}
