//! Command-line definition

use clap::{Arg, ArgAction, Command};

/// Builds the `maskkit` argument parser
pub fn build_cli() -> Command {
    Command::new("maskkit")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Maurice Schilpp")
        .about("Create, convert and inspect binary raster masks")
        .arg(
            Arg::new("input")
                .help("Input mask, image or shapefile")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output mask GeoTIFF")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("convert")
                .short('c')
                .long("convert")
                .help("Load an image as a mask and save it as GeoTIFF")
                .action(ArgAction::SetTrue)
                .conflicts_with_all(["shapefile", "ndxi"]),
        )
        .arg(
            Arg::new("shapefile")
                .long("shapefile")
                .help("Rasterize the polygons of the input shapefile")
                .action(ArgAction::SetTrue)
                .conflicts_with("ndxi"),
        )
        .arg(
            Arg::new("ndxi")
                .long("ndxi")
                .help("Threshold a normalized difference index of the input image")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("shape")
                .long("shape")
                .help("Output grid size for --shapefile")
                .value_name("ROWS,COLS")
                .requires("shapefile"),
        )
        .arg(
            Arg::new("transform")
                .long("transform")
                .help("GDAL-ordered geotransform of the grid for --shapefile")
                .value_name("C,A,B,F,D,E")
                .allow_hyphen_values(true)
                .requires("shapefile"),
        )
        .arg(
            Arg::new("satellite")
                .long("satellite")
                .help("Band layout of the input image (quickbird, pleiades, rgb)")
                .value_name("NAME"),
        )
        .arg(
            Arg::new("feature")
                .long("feature")
                .help("Index for --ndxi (nir_ndvi, rg_ndvi, rb_ndvi, ndwi)")
                .value_name("NAME"),
        )
        .arg(
            Arg::new("step")
                .long("step")
                .help("Generator step for --ndxi")
                .value_name("ROWS,COLS"),
        )
        .arg(
            Arg::new("compression-name")
                .long("compression-name")
                .help("Output compression by name (none, deflate, zstd)")
                .value_name("NAME"),
        )
        .arg(
            Arg::new("epsg")
                .long("epsg")
                .help("EPSG code written to the output mask")
                .value_name("CODE"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML file overriding the built-in settings")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Run summary log")
                .value_name("FILE")
                .default_value("maskkit.log"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_modes_conflict() {
        let result = build_cli().try_get_matches_from(["maskkit", "in.tif", "--convert", "--ndxi"]);
        assert!(result.is_err());

        let matches = build_cli()
            .try_get_matches_from(["maskkit", "a.shp", "--shapefile", "--shape", "10,20",
                                   "--transform", "0,1,0,10,0,-1", "-o", "out.tif"])
            .unwrap();
        assert_eq!(matches.get_one::<String>("transform").map(String::as_str), Some("0,1,0,10,0,-1"));
    }
}
