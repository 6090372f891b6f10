//! Generator covering a whole image

use log::debug;

use crate::errors::{MaskError, MaskResult};
use crate::image::Image;

use super::{Window, WindowGenerator, WindowShape};

/// Cells every `step_size` pixels over the full image extent
#[derive(Debug, Clone)]
pub struct FullGenerator {
    image: Image,
    step_size: (usize, usize),
    x_size: usize,
    y_size: usize,
}

impl FullGenerator {
    /// Lays a grid with the given `(row, col)` step over `image`
    pub fn new(image: Image, step_size: (usize, usize)) -> MaskResult<Self> {
        if step_size.0 == 0 || step_size.1 == 0 {
            return Err(MaskError::Config(format!("Step size must be positive, got {:?}", step_size)));
        }

        let (rows, cols) = image.shape();
        let x_size = rows.div_ceil(step_size.0);
        let y_size = cols.div_ceil(step_size.1);
        debug!("FullGenerator over {}x{} image: {}x{} cells", rows, cols, x_size, y_size);

        Ok(FullGenerator { image, step_size, x_size, y_size })
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn step_size(&self) -> (usize, usize) {
        self.step_size
    }
}

/// Range of `length` centred on `centre`, clipped to `[0, limit)`
fn centred_range(centre: usize, length: usize, limit: usize) -> std::ops::Range<usize> {
    let start = centre.saturating_sub(length / 2);
    let end = (centre + length - length / 2).min(limit);
    start.min(end)..end
}

impl WindowGenerator for FullGenerator {
    fn x_size(&self) -> usize {
        self.x_size
    }

    fn y_size(&self) -> usize {
        self.y_size
    }

    fn window(&self, x: usize, y: usize, shape: WindowShape) -> MaskResult<Window<'_>> {
        if x >= self.x_size || y >= self.y_size {
            return Err(MaskError::Extraction(format!(
                "Cell ({}, {}) outside {}x{} generator", x, y, self.x_size, self.y_size)));
        }

        let (rows, cols) = self.image.shape();
        let centre_row = (x * self.step_size.0 + self.step_size.0 / 2).min(rows.saturating_sub(1));
        let centre_col = (y * self.step_size.1 + self.step_size.1 / 2).min(cols.saturating_sub(1));

        Ok(Window::new(
            &self.image,
            centred_range(centre_row, shape.0, rows),
            centred_range(centre_col, shape.1, cols),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{Band, Satellite};
    use ndarray::Array2;

    fn image(rows: usize, cols: usize) -> Image {
        let bands = (0..3)
            .map(|_| Array2::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) as f64))
            .collect();
        Image::from_bands(bands, Satellite::Rgb.band_order()).unwrap()
    }

    #[test]
    fn test_grid_size_rounds_up() {
        let generator = FullGenerator::new(image(10, 7), (3, 2)).unwrap();
        assert_eq!(generator.x_size(), 4);
        assert_eq!(generator.y_size(), 4);
    }

    #[test]
    fn test_window_is_centred_and_clipped() {
        let generator = FullGenerator::new(image(10, 10), (2, 2)).unwrap();

        // Cell (2, 3) is centred on pixel (5, 7)
        let window = generator.window(2, 3, (3, 3)).unwrap();
        assert_eq!(window.shape(), (3, 3));
        assert_eq!(window.band(Band::Red).unwrap()[[1, 1]], 57.0);

        // Corner windows are clipped to the image
        let corner = generator.window(0, 0, (5, 5)).unwrap();
        assert_eq!(corner.shape(), (4, 4));
    }

    #[test]
    fn test_large_window_covers_image() {
        let generator = FullGenerator::new(image(6, 4), (1, 1)).unwrap();
        let window = generator.window(3, 2, (6, 4)).unwrap();
        assert_eq!(window.shape(), (6, 4));
    }

    #[test]
    fn test_rejects_zero_step_and_bad_cell() {
        assert!(FullGenerator::new(image(4, 4), (0, 1)).is_err());
        let generator = FullGenerator::new(image(4, 4), (2, 2)).unwrap();
        assert!(generator.window(2, 0, (1, 1)).is_err());
    }
}
