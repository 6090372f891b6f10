//! End-to-end tests of the mask operations

use std::fs;
use std::io::Cursor;
use std::path::Path;

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use ndarray::{array, Array2};

use maskkit::commands::{CommandFactory, MaskkitCommandFactory};
use maskkit::coordinate::GeoTransform;
use maskkit::errors::{MaskError, MaskResult};
use maskkit::features::NdxiKind;
use maskkit::generator::{FullGenerator, Window, WindowGenerator, WindowShape};
use maskkit::image::{Image, Satellite};
use maskkit::mask::{
    get_ndxi_mask, load_mask_from_file, load_mask_from_shapefile, read_mask_geotiff, save_mask_to_file,
};
use maskkit::tiff::TiffReader;
use maskkit::utils::logger::Logger;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

type Ring = Vec<(f64, f64)>;

/// Clockwise ring around the rectangle
fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Ring {
    vec![(x0, y0), (x0, y1), (x1, y1), (x1, y0), (x0, y0)]
}

/// Polygon shapefile with one record per entry of `records`
fn write_shapefile(path: &Path, records: &[Vec<Ring>]) {
    let mut body = Vec::new();
    for (index, rings) in records.iter().enumerate() {
        let points: Vec<&(f64, f64)> = rings.iter().flatten().collect();

        let mut content = Vec::new();
        content.write_i32::<LittleEndian>(5).unwrap();
        for _ in 0..4 {
            content.write_f64::<LittleEndian>(0.0).unwrap();
        }
        content.write_i32::<LittleEndian>(rings.len() as i32).unwrap();
        content.write_i32::<LittleEndian>(points.len() as i32).unwrap();
        let mut start = 0;
        for ring in rings {
            content.write_i32::<LittleEndian>(start).unwrap();
            start += ring.len() as i32;
        }
        for (x, y) in points {
            content.write_f64::<LittleEndian>(*x).unwrap();
            content.write_f64::<LittleEndian>(*y).unwrap();
        }

        body.write_i32::<BigEndian>(index as i32 + 1).unwrap();
        body.write_i32::<BigEndian>((content.len() / 2) as i32).unwrap();
        body.extend_from_slice(&content);
    }

    let mut file = Vec::new();
    file.write_i32::<BigEndian>(9994).unwrap();
    for _ in 0..5 {
        file.write_i32::<BigEndian>(0).unwrap();
    }
    file.write_i32::<BigEndian>(((100 + body.len()) / 2) as i32).unwrap();
    file.write_i32::<LittleEndian>(1000).unwrap();
    file.write_i32::<LittleEndian>(5).unwrap();
    for _ in 0..8 {
        file.write_f64::<LittleEndian>(0.0).unwrap();
    }
    file.extend_from_slice(&body);

    fs::write(path, file).unwrap();
}

#[test]
fn test_raw_tiff_header_is_read() {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&[0x49, 0x49, 42, 0, 8, 0, 0, 0]);
    buffer.extend_from_slice(&[2, 0]);
    buffer.extend_from_slice(&[0, 1, 4, 0, 1, 0, 0, 0, 200, 0, 0, 0]);
    buffer.extend_from_slice(&[1, 1, 4, 0, 1, 0, 0, 0, 100, 0, 0, 0]);
    buffer.extend_from_slice(&[0, 0, 0, 0]);

    let tiff = TiffReader::new().read(&mut Cursor::new(buffer)).unwrap();
    assert!(!tiff.is_big_tiff);
    assert_eq!(tiff.ifds.len(), 1);
    assert_eq!(tiff.ifds[0].get_dimensions(), Some((200, 100)));
}

#[test]
fn test_save_and_reload_any_shape() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();

    for &(rows, cols) in &[(1, 1), (1, 7), (5, 1), (4, 9), (9, 4)] {
        let mask = Array2::from_shape_fn((rows, cols), |(r, c)| (r * 3 + c) % 4 == 0);
        let path = dir.path().join(format!("mask_{}x{}.tif", rows, cols));
        save_mask_to_file(&mask, &path).unwrap();

        let decoded = load_mask_from_file(&path).unwrap();
        assert_eq!(decoded, mask.mapv(|p| p as u16), "image decoder, shape {:?}", (rows, cols));

        let read = read_mask_geotiff(&path).unwrap();
        assert_eq!(read.pixels.mapv(u16::from), decoded);
        assert!(read.geotransform.is_none());
        assert!(read.epsg.is_none());
    }
}

#[test]
fn test_failed_write_reports_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mask = array![[true]];

    let missing_dir = dir.path().join("missing").join("mask.tif");
    assert!(matches!(save_mask_to_file(&mask, &missing_dir), Err(MaskError::Io(_))));

    // The same destination can be written and removed afterwards
    let path = dir.path().join("mask.tif");
    save_mask_to_file(&mask, &path).unwrap();
    save_mask_to_file(&mask, &path).unwrap();
    fs::remove_file(&path).unwrap();
}

#[test]
fn test_shapefile_cover_disjoint_and_hole() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    // 10 rows x 20 cols of unit pixels spanning x 100..120, y 40..50
    let transform = GeoTransform::from_gdal([100.0, 1.0, 0.0, 50.0, 0.0, -1.0]);

    let cover = dir.path().join("cover.shp");
    write_shapefile(&cover, &[vec![rect(90.0, 30.0, 130.0, 60.0)]]);
    let mask = load_mask_from_shapefile(&cover, (10, 20), &transform).unwrap();
    assert_eq!(mask.dim(), (10, 20));
    assert!(mask.iter().all(|p| *p));

    let disjoint = dir.path().join("disjoint.shp");
    write_shapefile(&disjoint, &[vec![rect(0.0, 0.0, 10.0, 10.0)], vec![rect(200.0, 40.0, 210.0, 50.0)]]);
    let mask = load_mask_from_shapefile(&disjoint, (10, 20), &transform).unwrap();
    assert_eq!(mask.dim(), (10, 20));
    assert!(mask.iter().all(|p| !*p));

    let holed = dir.path().join("holed.shp");
    let mut hole = rect(105.0, 42.0, 110.0, 47.0);
    hole.reverse();
    write_shapefile(&holed, &[vec![rect(100.0, 40.0, 120.0, 50.0), hole]]);
    let mask = load_mask_from_shapefile(&holed, (10, 20), &transform).unwrap();
    assert_eq!(mask.iter().filter(|p| **p).count(), 200 - 25);
    assert!(!mask[[5, 7]]);
}

#[test]
fn test_missing_shapefile() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_mask_from_shapefile(dir.path().join("none.shp"), (2, 2), &GeoTransform::default());
    assert!(matches!(result, Err(MaskError::Io(_))));
}

/// Generator whose cells are single pixels, ignoring the requested shape
struct PixelGenerator {
    image: Image,
}

impl WindowGenerator for PixelGenerator {
    fn x_size(&self) -> usize {
        self.image.shape().0
    }

    fn y_size(&self) -> usize {
        self.image.shape().1
    }

    fn window(&self, x: usize, y: usize, _shape: WindowShape) -> MaskResult<Window<'_>> {
        Ok(Window::new(&self.image, x..x + 1, y..y + 1))
    }
}

/// Quickbird image whose per-pixel NDVI is `ndvi`
fn ndvi_image(ndvi: &Array2<f64>) -> Image {
    let red = Array2::from_elem(ndvi.dim(), 1.0);
    let nir = ndvi.mapv(|v| (1.0 + v) / (1.0 - v));
    let zeros = Array2::zeros(ndvi.dim());
    Image::from_bands(vec![zeros.clone(), zeros, red, nir], Satellite::Quickbird.band_order()).unwrap()
}

#[test]
fn test_ndxi_mask_partitions_clusters() {
    init_logging();
    let ndvi = Array2::from_shape_fn((6, 8), |(r, c)| if r < 2 || c > 5 { 0.9 } else { 0.1 });
    let generator = PixelGenerator { image: ndvi_image(&ndvi) };

    let mask = get_ndxi_mask(&generator, NdxiKind::NirNdvi).unwrap();
    assert_eq!(mask.dim(), (6, 8));
    assert_eq!(mask, ndvi.mapv(|v| v < 0.5));
}

#[test]
fn test_ndxi_mask_constant_is_all_false() {
    let generator = PixelGenerator { image: ndvi_image(&Array2::from_elem((3, 4), 0.2)) };
    let mask = get_ndxi_mask(&generator, NdxiKind::default()).unwrap();
    assert_eq!(mask.dim(), (3, 4));
    assert!(mask.iter().all(|p| !*p));
}

#[test]
fn test_ndxi_over_decoded_image() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.png");

    // Pleiades layout: red, green, blue, NIR; NIR is high on the left half
    let scene = image::RgbaImage::from_fn(8, 6, |x, _| {
        if x < 4 { image::Rgba([40, 60, 50, 220]) } else { image::Rgba([120, 90, 80, 100]) }
    });
    scene.save(&path).unwrap();

    let image = Image::open(&path, Satellite::Pleiades).unwrap();
    let generator = FullGenerator::new(image, (3, 4)).unwrap();
    let mask = get_ndxi_mask(&generator, NdxiKind::NirNdvi).unwrap();
    assert_eq!(mask.dim(), (2, 2));
}

#[test]
fn test_convert_command_end_to_end() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("mask.png");
    let output = dir.path().join("mask.tif");
    image::GrayImage::from_raw(2, 2, vec![0, 1, 1, 0]).unwrap().save(&input).unwrap();

    let args = maskkit::cli::build_cli().get_matches_from([
        "maskkit",
        input.to_str().unwrap(),
        "--convert",
        "-o",
        output.to_str().unwrap(),
        "--compression-name",
        "deflate",
        "--epsg",
        "4326",
    ]);
    let logger = Logger::new(dir.path().join("run.log")).unwrap();
    MaskkitCommandFactory::new().create_command(&args, &logger).unwrap().execute().unwrap();

    let read = read_mask_geotiff(&output).unwrap();
    assert_eq!(read.pixels, array![[0u8, 1], [1, 0]]);
    assert_eq!(read.compression, 8);
    assert_eq!(read.epsg, Some(4326));
    assert!(fs::read_to_string(dir.path().join("run.log")).unwrap().contains("Converted"));
}
