//! Affine georeferencing of raster grids

use std::fmt;

use crate::errors::{MaskError, MaskResult};

/// Affine mapping from pixel space (col, row) to world space (x, y)
///
/// ```text
/// x = origin_x + col * pixel_width + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
///
/// North-up grids have zero rotation terms and a negative `pixel_height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Cell size along X
    pub pixel_width: f64,
    /// Cell size along Y, usually negative
    pub pixel_height: f64,
    /// X shift per row
    pub row_rotation: f64,
    /// Y shift per column
    pub col_rotation: f64,
}

impl GeoTransform {
    /// North-up transform without rotation
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
            row_rotation: 0.0,
            col_rotation: 0.0,
        }
    }

    /// From GDAL order `[c, a, b, f, d, e]`
    /// (origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height)
    pub fn from_gdal(coeffs: [f64; 6]) -> Self {
        Self {
            origin_x: coeffs[0],
            pixel_width: coeffs[1],
            row_rotation: coeffs[2],
            origin_y: coeffs[3],
            col_rotation: coeffs[4],
            pixel_height: coeffs[5],
        }
    }

    /// From affine matrix order `[a, b, c, d, e, f]`
    pub fn from_affine(coeffs: [f64; 6]) -> Self {
        Self {
            pixel_width: coeffs[0],
            row_rotation: coeffs[1],
            origin_x: coeffs[2],
            col_rotation: coeffs[3],
            pixel_height: coeffs[4],
            origin_y: coeffs[5],
        }
    }

    /// Parses six comma separated numbers in GDAL order
    pub fn parse_gdal(text: &str) -> MaskResult<Self> {
        let values = text.split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|e| MaskError::Geometry(format!("Invalid geotransform '{}': {}", text, e)))?;

        let coeffs: [f64; 6] = values.try_into()
            .map_err(|v: Vec<f64>| MaskError::Geometry(format!(
                "Geotransform needs 6 values, got {}", v.len())))?;

        Ok(Self::from_gdal(coeffs))
    }

    /// GDAL order `[c, a, b, f, d, e]`
    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.row_rotation,
            self.origin_y,
            self.col_rotation,
            self.pixel_height,
        ]
    }

    /// World coordinates of a fractional pixel position
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        let x = self.origin_x + col * self.pixel_width + row * self.row_rotation;
        let y = self.origin_y + col * self.col_rotation + row * self.pixel_height;
        (x, y)
    }

    /// World coordinates of a pixel centre
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        self.apply(col as f64 + 0.5, row as f64 + 0.5)
    }

    fn determinant(&self) -> f64 {
        self.pixel_width * self.pixel_height - self.row_rotation * self.col_rotation
    }

    /// Whether the transform can be inverted
    ///
    /// The determinant is compared against the magnitude of its own terms,
    /// so fine grids in degrees are accepted.
    pub fn is_invertible(&self) -> bool {
        let det = self.determinant();
        let scale = (self.pixel_width * self.pixel_height).abs()
            + (self.row_rotation * self.col_rotation).abs();
        det.is_finite() && det.abs() > f64::EPSILON * scale
    }

    /// Fractional pixel coordinates (col, row) of a world position
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> MaskResult<(f64, f64)> {
        if !self.is_invertible() {
            return Err(MaskError::Geometry(format!("Geotransform is not invertible: {}", self)));
        }

        let det = self.determinant();
        let dx = x - self.origin_x;
        let dy = y - self.origin_y;

        let col = (self.pixel_height * dx - self.row_rotation * dy) / det;
        let row = (-self.col_rotation * dx + self.pixel_width * dy) / det;

        Ok((col, row))
    }

    /// No rotation terms
    pub fn is_north_up(&self) -> bool {
        self.row_rotation == 0.0 && self.col_rotation == 0.0
    }

    /// World bounds `(min_x, min_y, max_x, max_y)` of a `rows x cols` grid
    pub fn bounds(&self, rows: usize, cols: usize) -> (f64, f64, f64, f64) {
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(cols as f64, 0.0),
            self.apply(0.0, rows as f64),
            self.apply(cols as f64, rows as f64),
        ];

        corners.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(min_x, min_y, max_x, max_y), &(x, y)| {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            },
        )
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}

impl fmt::Display for GeoTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let g = self.to_gdal();
        write!(f, "[{}, {}, {}, {}, {}, {}]", g[0], g[1], g[2], g[3], g[4], g[5])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pixel_to_geo_roundtrip() {
        let gt = GeoTransform::new(100.0, 200.0, 10.0, -10.0);

        let (x, y) = gt.pixel_to_geo(5, 10);
        assert_relative_eq!(x, 155.0);
        assert_relative_eq!(y, 95.0);

        let (col, row) = gt.geo_to_pixel(x, y).unwrap();
        assert_relative_eq!(col, 5.5, epsilon = 1e-10);
        assert_relative_eq!(row, 10.5, epsilon = 1e-10);
    }

    #[test]
    fn test_rotated_inverse() {
        let gt = GeoTransform::from_gdal([10.0, 2.0, 0.5, 50.0, 0.25, -2.0]);
        let (x, y) = gt.apply(3.25, 7.5);
        let (col, row) = gt.geo_to_pixel(x, y).unwrap();

        assert_relative_eq!(col, 3.25, epsilon = 1e-9);
        assert_relative_eq!(row, 7.5, epsilon = 1e-9);
        assert!(!gt.is_north_up());
    }

    #[test]
    fn test_affine_and_gdal_orders_agree() {
        let from_affine = GeoTransform::from_affine([1.0, 0.0, 500.0, 0.0, -1.0, 900.0]);
        let from_gdal = GeoTransform::from_gdal([500.0, 1.0, 0.0, 900.0, 0.0, -1.0]);
        assert_eq!(from_affine, from_gdal);
    }

    #[test]
    fn test_degenerate_transform_is_rejected() {
        let gt = GeoTransform::new(0.0, 0.0, 0.0, -1.0);
        assert!(!gt.is_invertible());
        assert!(matches!(gt.geo_to_pixel(1.0, 1.0), Err(MaskError::Geometry(_))));
    }

    #[test]
    fn test_sub_centimetre_geographic_grid_is_invertible() {
        // About 2 cm per pixel in degrees
        let gt = GeoTransform::new(5.0, 52.0, 2e-7, -2e-7);
        assert!(gt.is_invertible());

        let (x, y) = gt.pixel_to_geo(3, 1);
        let (col, row) = gt.geo_to_pixel(x, y).unwrap();
        assert_relative_eq!(col, 3.5, epsilon = 1e-6);
        assert_relative_eq!(row, 1.5, epsilon = 1e-6);

        let collapsed = GeoTransform::from_gdal([0.0, 1.0, 2.0, 0.0, 0.5, 1.0]);
        assert!(!collapsed.is_invertible());
    }

    #[test]
    fn test_parse_gdal() {
        let gt = GeoTransform::parse_gdal("0, 1, 0, 10, 0, -1").unwrap();
        assert_eq!(gt, GeoTransform::new(0.0, 10.0, 1.0, -1.0));

        assert!(GeoTransform::parse_gdal("0,1,0").is_err());
        assert!(GeoTransform::parse_gdal("a,b,c,d,e,f").is_err());
    }

    #[test]
    fn test_bounds() {
        let gt = GeoTransform::new(0.0, 100.0, 1.0, -1.0);
        let (min_x, min_y, max_x, max_y) = gt.bounds(40, 100);

        assert_relative_eq!(min_x, 0.0);
        assert_relative_eq!(min_y, 60.0);
        assert_relative_eq!(max_x, 100.0);
        assert_relative_eq!(max_y, 100.0);
    }
}
