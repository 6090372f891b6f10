//! `.shp` binary reader
//!
//! The file header and record headers are big-endian, record contents are
//! little-endian. Lengths are counted in 16-bit words.

use std::fmt;
use std::io::{Cursor, SeekFrom};
use std::path::Path;

use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use log::{debug, info, warn};

use crate::coordinate::BoundingBox;
use crate::errors::{MaskError, MaskResult};
use crate::io::byte_order::{BigEndianHandler, ByteOrderHandler, LittleEndianHandler};
use crate::io::seekable::SeekableReader;

use super::{FILE_CODE, HEADER_SIZE, RECORD_HEADER_SIZE, VERSION};

/// Geometry type of a shapefile or one of its records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
    Null,
    Point,
    PolyLine,
    Polygon,
    MultiPoint,
    PointZ,
    PolyLineZ,
    PolygonZ,
    MultiPointZ,
    PointM,
    PolyLineM,
    PolygonM,
    MultiPointM,
    MultiPatch,
    Unknown(i32),
}

impl ShapeType {
    /// Maps a shape type code to its variant
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ShapeType::Null,
            1 => ShapeType::Point,
            3 => ShapeType::PolyLine,
            5 => ShapeType::Polygon,
            8 => ShapeType::MultiPoint,
            11 => ShapeType::PointZ,
            13 => ShapeType::PolyLineZ,
            15 => ShapeType::PolygonZ,
            18 => ShapeType::MultiPointZ,
            21 => ShapeType::PointM,
            23 => ShapeType::PolyLineM,
            25 => ShapeType::PolygonM,
            28 => ShapeType::MultiPointM,
            31 => ShapeType::MultiPatch,
            other => ShapeType::Unknown(other),
        }
    }

    /// Polygon records of any dimensionality
    pub fn is_polygon(&self) -> bool {
        matches!(self, ShapeType::Polygon | ShapeType::PolygonZ | ShapeType::PolygonM)
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeType::Unknown(code) => write!(f, "Unknown({})", code),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Fixed `.shp` header
#[derive(Debug, Clone, PartialEq)]
pub struct ShapefileHeader {
    /// Declared file length in bytes
    pub file_length: u64,
    /// Shape type shared by all non-null records
    pub shape_type: ShapeType,
    /// Extent of all shapes
    pub bbox: BoundingBox,
}

/// Reader over the bytes of a `.shp` file
pub struct ShapefileReader<R: SeekableReader> {
    reader: R,
    big_endian: BigEndianHandler,
    little_endian: LittleEndianHandler,
    header: ShapefileHeader,
    data_len: u64,
}

impl ShapefileReader<Cursor<Vec<u8>>> {
    /// Reads the whole file into memory and parses its header
    pub fn open<P: AsRef<Path>>(path: P) -> MaskResult<Self> {
        let path = path.as_ref();
        info!("Opening shapefile {}", path.display());

        let bytes = std::fs::read(path)?;
        Self::new(Cursor::new(bytes))
    }
}

impl<R: SeekableReader> ShapefileReader<R> {
    /// Parses the header of an already opened `.shp` stream
    pub fn new(mut reader: R) -> MaskResult<Self> {
        let data_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        if data_len < HEADER_SIZE {
            return Err(MaskError::Shapefile(format!(
                "File is {} bytes, shorter than the {} byte header", data_len, HEADER_SIZE)));
        }

        let header = Self::read_header(&mut reader)?;
        debug!("Shapefile header: {:?}", header);

        Ok(ShapefileReader {
            reader,
            big_endian: BigEndianHandler,
            little_endian: LittleEndianHandler,
            header,
            data_len,
        })
    }

    fn read_header(reader: &mut R) -> MaskResult<ShapefileHeader> {
        let be = BigEndianHandler;
        let le = LittleEndianHandler;

        let file_code = be.read_i32(reader)?;
        if file_code != FILE_CODE {
            return Err(MaskError::Shapefile(format!(
                "Invalid file code {}, expected {}", file_code, FILE_CODE)));
        }

        reader.seek(SeekFrom::Start(24))?;
        let file_length = be.read_i32(reader)?.max(0) as u64 * 2;

        let version = le.read_i32(reader)?;
        if version != VERSION {
            warn!("Unexpected shapefile version {}", version);
        }

        let shape_type = ShapeType::from_code(le.read_i32(reader)?);
        let bbox = BoundingBox::new(
            le.read_f64(reader)?,
            le.read_f64(reader)?,
            le.read_f64(reader)?,
            le.read_f64(reader)?,
        );

        Ok(ShapefileHeader { file_length, shape_type, bbox })
    }

    /// Header parsed on open
    pub fn header(&self) -> &ShapefileHeader {
        &self.header
    }

    /// Reads every record, merging all polygons into one multipolygon
    ///
    /// Null records are skipped; any other non-polygon record is an error.
    pub fn read_polygons(&mut self) -> MaskResult<MultiPolygon<f64>> {
        // Trust the declared length only when the file actually holds it
        let end = if self.header.file_length >= HEADER_SIZE {
            self.header.file_length.min(self.data_len)
        } else {
            self.data_len
        };

        let mut polygons = Vec::new();
        let mut position = HEADER_SIZE;
        let mut record_count = 0usize;

        while position + RECORD_HEADER_SIZE <= end {
            self.reader.seek(SeekFrom::Start(position))?;
            let record_number = self.big_endian.read_i32(&mut self.reader)?;
            let content_length = self.big_endian.read_i32(&mut self.reader)?;
            if content_length < 2 {
                return Err(MaskError::Shapefile(format!(
                    "Record {} has invalid content length {}", record_number, content_length)));
            }

            let content_start = position + RECORD_HEADER_SIZE;
            let content_end = content_start + content_length as u64 * 2;
            if content_end > self.data_len {
                return Err(MaskError::Shapefile(format!(
                    "Record {} is truncated: needs {} bytes, file has {}",
                    record_number, content_end, self.data_len)));
            }

            let shape_type = ShapeType::from_code(self.little_endian.read_i32(&mut self.reader)?);
            match shape_type {
                ShapeType::Null => debug!("Skipping null record {}", record_number),
                t if t.is_polygon() => {
                    let record_polygons = self.read_polygon_content(record_number, content_end)?;
                    polygons.extend(record_polygons);
                }
                other => {
                    return Err(MaskError::Shapefile(format!(
                        "Record {} has shape type {}, only polygons can be rasterized",
                        record_number, other)));
                }
            }

            record_count += 1;
            position = content_end;
        }

        info!("Read {} records, {} polygons", record_count, polygons.len());
        Ok(MultiPolygon(polygons))
    }

    /// Parses one polygon record body (after its shape type)
    ///
    /// Z and M ranges that follow the points are skipped.
    fn read_polygon_content(&mut self, record_number: i32, content_end: u64) -> MaskResult<Vec<Polygon<f64>>> {
        let le = &self.little_endian;

        // Record bounding box
        for _ in 0..4 {
            le.read_f64(&mut self.reader)?;
        }

        let num_parts = le.read_i32(&mut self.reader)?;
        let num_points = le.read_i32(&mut self.reader)?;
        if num_parts < 0 || num_points < 0 {
            return Err(MaskError::Shapefile(format!(
                "Record {} has negative part or point count", record_number)));
        }
        let (num_parts, num_points) = (num_parts as usize, num_points as usize);

        let payload = 44 + 4 * num_parts as u64 + 16 * num_points as u64;
        let position = self.reader.stream_position()?;
        if position - 44 + payload > content_end {
            return Err(MaskError::Shapefile(format!(
                "Record {} declares {} parts and {} points, more than its content holds",
                record_number, num_parts, num_points)));
        }

        let mut part_starts = Vec::with_capacity(num_parts);
        for _ in 0..num_parts {
            part_starts.push(le.read_i32(&mut self.reader)?.max(0) as usize);
        }

        let mut points = Vec::with_capacity(num_points);
        for _ in 0..num_points {
            let x = le.read_f64(&mut self.reader)?;
            let y = le.read_f64(&mut self.reader)?;
            points.push(Coord { x, y });
        }

        let mut rings = Vec::with_capacity(num_parts);
        for (i, &start) in part_starts.iter().enumerate() {
            let stop = part_starts.get(i + 1).copied().unwrap_or(num_points);
            if start >= stop || stop > num_points {
                return Err(MaskError::Shapefile(format!(
                    "Record {} has invalid part range {}..{}", record_number, start, stop)));
            }
            rings.push(points[start..stop].to_vec());
        }

        Ok(group_rings(rings))
    }
}

/// Twice the signed area of a ring; negative for clockwise rings
fn signed_area(ring: &[Coord<f64>]) -> f64 {
    ring.iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum()
}

/// Even-odd test of a point against a closed ring
fn ring_contains(ring: &[Coord<f64>], point: Coord<f64>) -> bool {
    let mut inside = false;
    for (a, b) in ring.iter().zip(ring.iter().cycle().skip(1)) {
        if (a.y > point.y) != (b.y > point.y) {
            let x = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if point.x < x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Groups rings into polygons
///
/// Clockwise rings are exteriors. A counter-clockwise ring is a hole of the
/// last exterior that contains its first vertex, or of the exterior listed
/// before it when none does. A hole with no exterior at all stands alone.
fn group_rings(rings: Vec<Vec<Coord<f64>>>) -> Vec<Polygon<f64>> {
    let mut exteriors: Vec<Vec<Coord<f64>>> = Vec::new();
    let mut holes: Vec<(Vec<Coord<f64>>, Option<usize>)> = Vec::new();

    for ring in rings {
        if signed_area(&ring) > 0.0 {
            holes.push((ring, exteriors.len().checked_sub(1)));
        } else {
            exteriors.push(ring);
        }
    }

    let mut interiors: Vec<Vec<LineString<f64>>> = vec![Vec::new(); exteriors.len()];
    let mut standalone = Vec::new();

    for (hole, preceding) in holes {
        let owner = hole.first()
            .and_then(|&first| exteriors.iter().rposition(|exterior| ring_contains(exterior, first)))
            .or(preceding);

        match owner {
            Some(index) => interiors[index].push(LineString::from(hole)),
            None => standalone.push(Polygon::new(LineString::from(hole), Vec::new())),
        }
    }

    exteriors.into_iter()
        .zip(interiors)
        .map(|(exterior, holes)| Polygon::new(LineString::from(exterior), holes))
        .chain(standalone)
        .collect()
}

/// Loads all polygons of a `.shp` file
///
/// # Returns
/// The merged multipolygon and the file header
pub fn load_shapefile_to_multipolygon<P: AsRef<Path>>(path: P) -> MaskResult<(MultiPolygon<f64>, ShapefileHeader)> {
    let mut reader = ShapefileReader::open(path)?;
    let multipolygon = reader.read_polygons()?;
    Ok((multipolygon, reader.header().clone()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

    /// One record's rings; each ring is a closed list of points
    pub(crate) type Record = Vec<Vec<(f64, f64)>>;

    /// Builds a polygon shapefile in memory
    pub(crate) fn build_polygon_shapefile(shape_type: i32, records: &[Record]) -> Vec<u8> {
        let mut body = Vec::new();
        for (i, rings) in records.iter().enumerate() {
            let mut content = Vec::new();
            content.write_i32::<LittleEndian>(shape_type).unwrap();
            if shape_type == 0 {
                write_record(&mut body, i as i32 + 1, &content);
                continue;
            }

            let points: Vec<(f64, f64)> = rings.iter().flatten().copied().collect();
            for v in [0.0f64; 4] {
                content.write_f64::<LittleEndian>(v).unwrap();
            }
            content.write_i32::<LittleEndian>(rings.len() as i32).unwrap();
            content.write_i32::<LittleEndian>(points.len() as i32).unwrap();
            let mut start = 0;
            for ring in rings {
                content.write_i32::<LittleEndian>(start).unwrap();
                start += ring.len() as i32;
            }
            for (x, y) in &points {
                content.write_f64::<LittleEndian>(*x).unwrap();
                content.write_f64::<LittleEndian>(*y).unwrap();
            }
            if shape_type == 15 {
                // Z range and values
                for _ in 0..(2 + points.len()) {
                    content.write_f64::<LittleEndian>(0.0).unwrap();
                }
            }
            write_record(&mut body, i as i32 + 1, &content);
        }

        let mut file = Vec::new();
        file.write_i32::<BigEndian>(FILE_CODE).unwrap();
        for _ in 0..5 {
            file.write_i32::<BigEndian>(0).unwrap();
        }
        file.write_i32::<BigEndian>(((HEADER_SIZE as usize + body.len()) / 2) as i32).unwrap();
        file.write_i32::<LittleEndian>(VERSION).unwrap();
        file.write_i32::<LittleEndian>(shape_type).unwrap();
        for v in [0.0, 0.0, 10.0, 10.0, 0.0, 0.0, 0.0, 0.0] {
            file.write_f64::<LittleEndian>(v).unwrap();
        }
        file.extend_from_slice(&body);
        file
    }

    fn write_record(body: &mut Vec<u8>, number: i32, content: &[u8]) {
        body.write_i32::<BigEndian>(number).unwrap();
        body.write_i32::<BigEndian>((content.len() / 2) as i32).unwrap();
        body.extend_from_slice(content);
    }

    /// Clockwise square
    pub(crate) fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<(f64, f64)> {
        vec![(x0, y0), (x0, y1), (x1, y1), (x1, y0), (x0, y0)]
    }

    /// Counter-clockwise square
    pub(crate) fn square_ccw(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<(f64, f64)> {
        let mut ring = square(x0, y0, x1, y1);
        ring.reverse();
        ring
    }

    fn read(bytes: Vec<u8>) -> MaskResult<(MultiPolygon<f64>, ShapefileHeader)> {
        let mut reader = ShapefileReader::new(Cursor::new(bytes))?;
        let polygons = reader.read_polygons()?;
        Ok((polygons, reader.header().clone()))
    }

    #[test]
    fn test_reads_header_and_polygons() {
        let bytes = build_polygon_shapefile(5, &[
            vec![square(0.0, 0.0, 4.0, 4.0)],
            vec![square(6.0, 6.0, 8.0, 8.0)],
        ]);
        let (multipolygon, header) = read(bytes.clone()).unwrap();

        assert_eq!(header.shape_type, ShapeType::Polygon);
        assert_eq!(header.file_length, bytes.len() as u64);
        assert_eq!(header.bbox, BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(multipolygon.0.len(), 2);
        assert_eq!(multipolygon.0[0].exterior().0.len(), 5);
    }

    #[test]
    fn test_counter_clockwise_ring_becomes_hole() {
        let bytes = build_polygon_shapefile(5, &[
            vec![square(0.0, 0.0, 10.0, 10.0), square_ccw(2.0, 2.0, 8.0, 8.0)],
        ]);
        let (multipolygon, _) = read(bytes).unwrap();

        assert_eq!(multipolygon.0.len(), 1);
        assert_eq!(multipolygon.0[0].interiors().len(), 1);
    }

    #[test]
    fn test_hole_joins_the_exterior_containing_it() {
        let bytes = build_polygon_shapefile(5, &[vec![
            square(0.0, 0.0, 4.0, 4.0),
            square(6.0, 6.0, 8.0, 8.0),
            square_ccw(1.0, 1.0, 3.0, 3.0),
        ]]);
        let (multipolygon, _) = read(bytes).unwrap();

        assert_eq!(multipolygon.0.len(), 2);
        assert_eq!(multipolygon.0[0].interiors().len(), 1);
        assert!(multipolygon.0[1].interiors().is_empty());
    }

    #[test]
    fn test_polygon_z_and_null_records() {
        let bytes = build_polygon_shapefile(15, &[vec![square(0.0, 0.0, 1.0, 1.0)]]);
        let (multipolygon, header) = read(bytes).unwrap();
        assert_eq!(header.shape_type, ShapeType::PolygonZ);
        assert_eq!(multipolygon.0.len(), 1);

        let nulls = build_polygon_shapefile(0, &[vec![], vec![]]);
        let (multipolygon, _) = read(nulls).unwrap();
        assert!(multipolygon.0.is_empty());
    }

    #[test]
    fn test_rejects_bad_file_code() {
        let mut bytes = build_polygon_shapefile(5, &[vec![square(0.0, 0.0, 1.0, 1.0)]]);
        bytes[3] = 0;
        assert!(matches!(read(bytes), Err(MaskError::Shapefile(_))));
    }

    #[test]
    fn test_rejects_truncated_record() {
        let mut bytes = build_polygon_shapefile(5, &[vec![square(0.0, 0.0, 1.0, 1.0)]]);
        bytes.truncate(bytes.len() - 10);
        assert!(matches!(read(bytes), Err(MaskError::Shapefile(_))));
    }

    #[test]
    fn test_rejects_point_records() {
        let mut bytes = build_polygon_shapefile(5, &[vec![square(0.0, 0.0, 1.0, 1.0)]]);
        // Shape type of the first record content
        bytes[108] = 1;
        assert!(matches!(read(bytes), Err(MaskError::Shapefile(_))));
    }

    #[test]
    fn test_rejects_short_file() {
        assert!(matches!(read(vec![0u8; 20]), Err(MaskError::Shapefile(_))));
    }
}
