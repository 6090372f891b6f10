//! Axis-aligned bounding boxes in world coordinates

use std::fmt;

use super::geotransform::GeoTransform;

/// A bounding box in a coordinate system
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum X coordinate
    pub min_x: f64,
    /// Minimum Y coordinate
    pub min_y: f64,
    /// Maximum X coordinate
    pub max_x: f64,
    /// Maximum Y coordinate
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox { min_x, min_y, max_x, max_y }
    }

    /// World extent covered by a `rows x cols` grid
    pub fn from_grid(transform: &GeoTransform, rows: usize, cols: usize) -> Self {
        let (min_x, min_y, max_x, max_y) = transform.bounds(rows, cols);
        BoundingBox::new(min_x, min_y, max_x, max_y)
    }

    /// Width of the bounding box
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Whether the two boxes overlap (touching edges count)
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x && other.min_x <= self.max_x
            && self.min_y <= other.max_y && other.min_y <= self.max_y
    }

    /// Grows this box to include a point
    pub fn expand(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// An inverted box that any `expand` call replaces
    pub fn empty() -> Self {
        BoundingBox::new(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) - ({}, {})", self.min_x, self.min_y, self.max_x, self.max_y)
    }
}
