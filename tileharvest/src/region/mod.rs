//! Region selection
//!
//! A [`Region`] is the closed polygon an operator selected, together with its
//! bounding box. [`snap`] turns an arbitrary box into a tile-aligned square,
//! which is what the rest of the pipeline downloads.

mod snap;

pub use snap::{snap, SelectionError, SnappedRegion, TileCorner, TileCorners};

use geo::{ChamberlainDuquetteArea, Coord, LineString, Polygon};

use crate::coord::{BoundingBox, GeoPoint};

/// A selected area on the map.
///
/// The exterior ring is always closed (first vertex == last vertex) and the
/// bounding box is computed once on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    polygon: Polygon<f64>,
    bounds: BoundingBox,
}

impl Region {
    /// Builds a region from polygon vertices, closing the ring if needed.
    ///
    /// Fails with [`SelectionError::EmptyRegion`] when fewer than three
    /// distinct vertices are supplied.
    pub fn from_points(points: &[GeoPoint]) -> Result<Self, SelectionError> {
        let mut coords: Vec<Coord<f64>> = points
            .iter()
            .map(|p| Coord {
                x: p.longitude,
                y: p.latitude,
            })
            .collect();
        coords.dedup();
        if coords.len() > 1 && coords.first() == coords.last() {
            coords.pop();
        }
        if coords.len() < 3 {
            return Err(SelectionError::EmptyRegion);
        }

        let bounds = BoundingBox::from_points(points).ok_or(SelectionError::EmptyRegion)?;
        // Polygon::new closes the ring
        let polygon = Polygon::new(LineString::from(coords), vec![]);
        Ok(Self { polygon, bounds })
    }

    /// Rectangle covering exactly `bounds`.
    pub fn from_bounds(bounds: &BoundingBox) -> Self {
        let (w, s, e, n) = (bounds.west(), bounds.south(), bounds.east(), bounds.north());
        let polygon = Polygon::new(
            LineString::from(vec![(w, n), (e, n), (e, s), (w, s), (w, n)]),
            vec![],
        );
        Self {
            polygon,
            bounds: *bounds,
        }
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Vertices of the closed exterior ring.
    pub fn vertices(&self) -> Vec<GeoPoint> {
        self.polygon
            .exterior()
            .coords()
            .map(|c| GeoPoint::new(c.y, c.x))
            .collect()
    }

    /// Geodesic area in square metres.
    pub fn area_m2(&self) -> f64 {
        self.polygon.chamberlain_duquette_unsigned_area()
    }
}

/// Point announced to the backend as the launch location.
///
/// Defaults to the centre of `bounds`; an operator-chosen point is pulled back
/// inside the bounds.
pub fn launch_location(bounds: &BoundingBox, requested: Option<GeoPoint>) -> GeoPoint {
    match requested {
        Some(point) => bounds.clamp(&point),
        None => bounds.center(),
    }
}
