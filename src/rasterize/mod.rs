//! Polygon rasterization
//!
//! Burns polygons into a boolean grid. A pixel is set when its centre lies
//! inside a polygon under the even-odd rule, so holes stay unset. Rings are
//! mapped into pixel space through the inverse geotransform first, which
//! keeps rotated grids exact since affine maps preserve straight edges.

use geo_types::{LineString, MultiPolygon, Polygon};
use log::{debug, info};
use ndarray::Array2;

use crate::coordinate::{BoundingBox, GeoTransform};
use crate::errors::{MaskError, MaskResult};

/// One polygon edge in pixel space (col, row)
#[derive(Debug, Clone, Copy)]
struct Edge {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

impl Edge {
    /// Column where the edge crosses the horizontal line at `y`, if it does
    ///
    /// Half-open in y so a vertex shared by two edges is counted once.
    fn crossing(&self, y: f64) -> Option<f64> {
        let crosses = (self.y0 <= y && y < self.y1) || (self.y1 <= y && y < self.y0);
        crosses.then(|| self.x0 + (y - self.y0) * (self.x1 - self.x0) / (self.y1 - self.y0))
    }
}

/// Edges of every ring of a polygon, converted to pixel space
fn pixel_edges(polygon: &Polygon<f64>, transform: &GeoTransform) -> MaskResult<Vec<Edge>> {
    let mut edges = Vec::new();

    let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors());
    for ring in rings {
        let points = ring_to_pixels(ring, transform)?;
        if points.len() < 3 {
            continue;
        }

        // Rings are closed implicitly when the last point differs from the first
        for i in 0..points.len() {
            let (x0, y0) = points[i];
            let (x1, y1) = points[(i + 1) % points.len()];
            if y0 != y1 {
                edges.push(Edge { x0, y0, x1, y1 });
            }
        }
    }

    Ok(edges)
}

fn ring_to_pixels(ring: &LineString<f64>, transform: &GeoTransform) -> MaskResult<Vec<(f64, f64)>> {
    ring.0.iter()
        .map(|c| transform.geo_to_pixel(c.x, c.y))
        .collect()
}

/// Fills one polygon's interior into `mask`
fn burn_polygon(mask: &mut Array2<bool>, edges: &[Edge]) {
    let (rows, cols) = mask.dim();
    if edges.is_empty() {
        return;
    }

    let (min_y, max_y) = edges.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), e| {
        (lo.min(e.y0).min(e.y1), hi.max(e.y0).max(e.y1))
    });

    // Rows whose centre (row + 0.5) can fall inside [min_y, max_y)
    let first_row = (min_y - 0.5).ceil().max(0.0) as usize;
    let last_row = ((max_y - 0.5).ceil().max(0.0) as usize).min(rows);

    let mut crossings = Vec::new();
    for row in first_row..last_row {
        let y = row as f64 + 0.5;
        crossings.clear();
        crossings.extend(edges.iter().filter_map(|e| e.crossing(y)));
        crossings.sort_by(f64::total_cmp);

        for span in crossings.chunks_exact(2) {
            // Columns whose centre (col + 0.5) lies in [span[0], span[1])
            let start = (span[0] - 0.5).ceil().clamp(0.0, cols as f64) as usize;
            let end = (span[1] - 0.5).ceil().clamp(0.0, cols as f64) as usize;
            for col in start..end {
                mask[[row, col]] = true;
            }
        }
    }
}

/// Rasterizes polygons onto a `(rows, cols)` grid
///
/// # Arguments
/// * `multipolygon` - Polygons in world coordinates
/// * `shape` - Output grid size as `(rows, cols)`
/// * `transform` - Pixel to world mapping of the grid
///
/// # Returns
/// A mask that is `true` inside any polygon
pub fn rasterize_polygons(
    multipolygon: &MultiPolygon<f64>,
    shape: (usize, usize),
    transform: &GeoTransform
) -> MaskResult<Array2<bool>> {
    let (rows, cols) = shape;
    if rows == 0 || cols == 0 {
        return Err(MaskError::Geometry(format!("Cannot rasterize onto an empty {}x{} grid", rows, cols)));
    }
    if !transform.is_invertible() {
        return Err(MaskError::Geometry(format!("Geotransform is not invertible: {}", transform)));
    }

    info!("Rasterizing {} polygons onto {}x{} grid", multipolygon.0.len(), rows, cols);

    let grid_bounds = BoundingBox::from_grid(transform, rows, cols);
    let mut mask = Array2::from_elem((rows, cols), false);

    for polygon in &multipolygon.0 {
        if !polygon_bounds(polygon).intersects(&grid_bounds) {
            debug!("Polygon outside grid extent, skipped");
            continue;
        }

        let edges = pixel_edges(polygon, transform)?;
        burn_polygon(&mut mask, &edges);
    }

    Ok(mask)
}

fn polygon_bounds(polygon: &Polygon<f64>) -> BoundingBox {
    let mut bbox = BoundingBox::empty();
    for c in &polygon.exterior().0 {
        bbox.expand(c.x, c.y);
    }
    bbox
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{Coord, LineString};

    fn polygon(exterior: &[(f64, f64)], holes: &[&[(f64, f64)]]) -> Polygon<f64> {
        let ring = |points: &[(f64, f64)]| {
            LineString::from(points.iter().map(|&(x, y)| Coord { x, y }).collect::<Vec<_>>())
        };
        Polygon::new(ring(exterior), holes.iter().map(|h| ring(h)).collect())
    }

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<(f64, f64)> {
        vec![(x0, y0), (x0, y1), (x1, y1), (x1, y0), (x0, y0)]
    }

    /// 10x10 unit grid with the origin at the top-left corner (0, 10)
    fn grid() -> GeoTransform {
        GeoTransform::new(0.0, 10.0, 1.0, -1.0)
    }

    #[test]
    fn test_covering_polygon_sets_every_pixel() {
        let mp = MultiPolygon(vec![polygon(&square(-1.0, -1.0, 11.0, 11.0), &[])]);
        let mask = rasterize_polygons(&mp, (10, 10), &grid()).unwrap();
        assert!(mask.iter().all(|&v| v));
    }

    #[test]
    fn test_disjoint_polygon_sets_nothing() {
        let mp = MultiPolygon(vec![polygon(&square(20.0, 20.0, 30.0, 30.0), &[])]);
        let mask = rasterize_polygons(&mp, (10, 10), &grid()).unwrap();
        assert_eq!(mask.dim(), (10, 10));
        assert!(mask.iter().all(|&v| !v));
    }

    #[test]
    fn test_square_covers_expected_cells() {
        // World x 2..5, y 6..9 => cols 2..5, rows 1..4
        let mp = MultiPolygon(vec![polygon(&square(2.0, 6.0, 5.0, 9.0), &[])]);
        let mask = rasterize_polygons(&mp, (10, 10), &grid()).unwrap();

        assert_eq!(mask.iter().filter(|&&v| v).count(), 9);
        for row in 1..4 {
            for col in 2..5 {
                assert!(mask[[row, col]], "({}, {})", row, col);
            }
        }
        assert!(!mask[[0, 2]]);
        assert!(!mask[[1, 5]]);
    }

    #[test]
    fn test_hole_stays_unset() {
        let hole = square(4.0, 4.0, 6.0, 6.0);
        let mp = MultiPolygon(vec![polygon(&square(0.0, 0.0, 10.0, 10.0), &[&hole])]);
        let mask = rasterize_polygons(&mp, (10, 10), &grid()).unwrap();

        assert_eq!(mask.iter().filter(|&&v| v).count(), 96);
        assert!(!mask[[4, 4]]);
        assert!(!mask[[5, 5]]);
        assert!(mask[[0, 0]]);
    }

    #[test]
    fn test_overlapping_polygons_union() {
        let mp = MultiPolygon(vec![
            polygon(&square(0.0, 0.0, 6.0, 10.0), &[]),
            polygon(&square(4.0, 0.0, 10.0, 10.0), &[]),
        ]);
        let mask = rasterize_polygons(&mp, (10, 10), &grid()).unwrap();
        assert!(mask.iter().all(|&v| v));
    }

    #[test]
    fn test_non_square_grid() {
        let transform = GeoTransform::new(0.0, 4.0, 1.0, -1.0);
        let mp = MultiPolygon(vec![polygon(&square(0.0, 2.0, 7.0, 4.0), &[])]);
        let mask = rasterize_polygons(&mp, (4, 7), &transform).unwrap();

        assert_eq!(mask.dim(), (4, 7));
        assert!(mask.row(0).iter().all(|&v| v));
        assert!(mask.row(1).iter().all(|&v| v));
        assert!(mask.row(2).iter().all(|&v| !v));
    }

    #[test]
    fn test_fine_geographic_grid() {
        let step = 2e-7;
        let transform = GeoTransform::new(5.0, 52.0, step, -step);

        let cover = MultiPolygon(vec![polygon(&square(4.9, 51.9, 5.1, 52.1), &[])]);
        let mask = rasterize_polygons(&cover, (4, 4), &transform).unwrap();
        assert!(mask.iter().all(|&v| v));

        // Columns 1..3 and rows 1..3 of the grid
        let inner = MultiPolygon(vec![polygon(
            &square(5.0 + step, 52.0 - 3.0 * step, 5.0 + 3.0 * step, 52.0 - step), &[])]);
        let mask = rasterize_polygons(&inner, (4, 4), &transform).unwrap();
        assert_eq!(mask.iter().filter(|&&v| v).count(), 4);
        assert!(mask[[1, 1]] && mask[[1, 2]] && mask[[2, 1]] && mask[[2, 2]]);
    }

    #[test]
    fn test_rejects_empty_grid_and_degenerate_transform() {
        let mp = MultiPolygon(vec![polygon(&square(0.0, 0.0, 1.0, 1.0), &[])]);
        assert!(matches!(rasterize_polygons(&mp, (0, 5), &grid()), Err(MaskError::Geometry(_))));

        let flat = GeoTransform::new(0.0, 0.0, 1.0, 0.0);
        assert!(matches!(rasterize_polygons(&mp, (5, 5), &flat), Err(MaskError::Geometry(_))));
    }
}
