//! Tile grid enumeration
//!
//! Lists the tiles at one zoom level that touch a [`Region`]. Candidates are
//! taken from the region's bounding box and filtered by a polygon
//! intersection test, so a non-rectangular selection drops the corner tiles
//! it does not reach. Edge or corner contact counts as touching.

use geo::Intersects;

use crate::coord::{lat_to_tile_y, lon_to_tile_x, CoordError, TileCoord, TileRect, MAX_ZOOM};
use crate::region::Region;

/// One tile of the grid with its geographic footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub coord: TileCoord,
    pub rect: TileRect,
}

impl GridCell {
    fn new(coord: TileCoord) -> Self {
        Self {
            coord,
            rect: coord.footprint(),
        }
    }
}

/// Enumerates grid cells for regions at a fixed zoom level.
#[derive(Debug, Clone, Copy)]
pub struct GridBuilder {
    zoom: u8,
}

impl GridBuilder {
    pub fn new(zoom: u8) -> Result<Self, CoordError> {
        if zoom > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(zoom));
        }
        Ok(Self { zoom })
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Inclusive tile ranges `(x_min, x_max, y_min, y_max)` covering the region's bounds.
    fn candidate_range(&self, region: &Region) -> (u32, u32, u32, u32) {
        let bounds = region.bounds();
        let last = (1u32 << self.zoom) - 1;
        (
            lon_to_tile_x(bounds.west(), self.zoom).min(last),
            lon_to_tile_x(bounds.east(), self.zoom).min(last),
            lat_to_tile_y(bounds.north(), self.zoom).min(last),
            lat_to_tile_y(bounds.south(), self.zoom).min(last),
        )
    }

    /// Number of tiles examined for `region`, kept or not.
    pub fn candidate_count(&self, region: &Region) -> u64 {
        let (x0, x1, y0, y1) = self.candidate_range(region);
        u64::from(x1 - x0 + 1) * u64::from(y1 - y0 + 1)
    }

    /// Tiles touching `region`, row-major from the north-west corner.
    pub fn build(&self, region: &Region) -> Vec<GridCell> {
        let (x0, x1, y0, y1) = self.candidate_range(region);
        let polygon = region.polygon();

        (y0..=y1)
            .flat_map(|y| (x0..=x1).map(move |x| TileCoord::new(x, y, self.zoom)))
            .map(GridCell::new)
            .filter(|cell| cell.rect.to_polygon().intersects(polygon))
            .collect()
    }
}

/// Convenience wrapper around [`GridBuilder`].
pub fn build_grid(region: &Region, zoom: u8) -> Result<Vec<GridCell>, CoordError> {
    Ok(GridBuilder::new(zoom)?.build(region))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{tile_x_to_lon, tile_y_to_lat, BoundingBox, GeoPoint};
    use crate::region::snap;

    fn tile_aligned_box(x0: u32, y0: u32, x1: u32, y1: u32, zoom: u8) -> BoundingBox {
        BoundingBox::new(
            tile_x_to_lon(x0, zoom),
            tile_y_to_lat(y1, zoom),
            tile_x_to_lon(x1, zoom),
            tile_y_to_lat(y0, zoom),
        )
    }

    #[test]
    fn test_row_major_order() {
        let region = Region::from_bounds(&tile_aligned_box(10, 20, 12, 22, 6));
        let cells = build_grid(&region, 6).unwrap();

        let coords: Vec<(u32, u32)> = cells.iter().map(|c| (c.coord.x, c.coord.y)).collect();
        let mut sorted = coords.clone();
        sorted.sort_by_key(|&(x, y)| (y, x));
        assert_eq!(coords, sorted);
        assert_eq!(coords.first(), Some(&(10, 20)));
    }

    #[test]
    fn test_snapped_square_includes_edge_touching_tiles() {
        // A 2x2 tile square touches one extra column and row on its east and
        // south edges.
        let region = Region::from_bounds(&tile_aligned_box(10, 20, 12, 22, 6));
        let cells = build_grid(&region, 6).unwrap();
        assert_eq!(cells.len(), 9);
        assert!(cells.iter().all(|c| c.coord.z == 6));
    }

    #[test]
    fn test_interior_box_covers_spanned_tiles() {
        // Strictly inside tiles 10..=11 by 20..=21
        let zoom = 6;
        let west = tile_x_to_lon(10, zoom) + 0.1;
        let east = tile_x_to_lon(12, zoom) - 0.1;
        let north = tile_y_to_lat(20, zoom) - 0.1;
        let south = tile_y_to_lat(22, zoom) + 0.1;
        let region = Region::from_bounds(&BoundingBox::new(west, south, east, north));

        let cells = build_grid(&region, zoom).unwrap();
        assert_eq!(cells.len(), 4);
    }

    #[test]
    fn test_triangle_skips_unreached_corner() {
        let zoom = 4;
        let b = tile_aligned_box(4, 4, 8, 8, zoom);
        // Triangle over the north-west half, slightly inset from the far corners
        let region = Region::from_points(&[
            b.northwest(),
            GeoPoint::new(b.north(), b.east() - 0.5),
            GeoPoint::new(b.south() + 0.5, b.west()),
        ])
        .unwrap();

        let builder = GridBuilder::new(zoom).unwrap();
        let cells = builder.build(&region);

        assert!((cells.len() as u64) < builder.candidate_count(&region));
        assert!(cells.iter().any(|c| c.coord.x == 4 && c.coord.y == 4));
        assert!(!cells.iter().any(|c| c.coord.x == 7 && c.coord.y == 7));
    }

    #[test]
    fn test_east_edge_of_world_is_clamped() {
        let region = Region::from_bounds(&BoundingBox::new(170.0, 0.0, 180.0, 10.0));
        let cells = build_grid(&region, 3).unwrap();
        assert!(cells.iter().all(|c| c.coord.x < 8));
    }

    #[test]
    fn test_invalid_zoom() {
        let region = Region::from_bounds(&BoundingBox::new(0.0, 0.0, 1.0, 1.0));
        assert!(matches!(
            build_grid(&region, 23),
            Err(CoordError::InvalidZoom(23))
        ));
    }

    #[test]
    fn test_grid_from_snapped_region() {
        let zoom = 10;
        let bounds = BoundingBox::new(
            tile_x_to_lon(300, zoom) + 0.01,
            tile_y_to_lat(383, zoom) + 0.01,
            tile_x_to_lon(302, zoom) + 0.01,
            tile_y_to_lat(380, zoom) - 0.01,
        );
        let snapped = snap(&bounds, zoom).unwrap();
        let cells = build_grid(&snapped.to_region(), zoom).unwrap();

        let side = snapped.size() as usize + 1;
        assert_eq!(cells.len(), side * side);
        assert_eq!(cells[0].coord, TileCoord::new(300, 380, zoom));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashSet;

        proptest! {
            #[test]
            fn test_grid_completeness(
                west in -170.0..160.0_f64,
                width in 0.1..8.0_f64,
                south in -60.0..60.0_f64,
                height in 0.1..8.0_f64,
                zoom in 3u8..=8
            ) {
                let region = Region::from_bounds(
                    &BoundingBox::new(west, south, west + width, south + height),
                );
                let builder = GridBuilder::new(zoom)?;
                let cells = builder.build(&region);

                let kept: HashSet<TileCoord> = cells.iter().map(|c| c.coord).collect();
                prop_assert_eq!(kept.len(), cells.len(), "duplicate cells");

                for cell in &cells {
                    prop_assert!(cell.rect.to_polygon().intersects(region.polygon()));
                }

                let (x0, x1, y0, y1) = builder.candidate_range(&region);
                for y in y0..=y1 {
                    for x in x0..=x1 {
                        let coord = TileCoord::new(x, y, zoom);
                        if coord.footprint().to_polygon().intersects(region.polygon()) {
                            prop_assert!(kept.contains(&coord), "missing {}", coord);
                        }
                    }
                }
            }
        }
    }
}
