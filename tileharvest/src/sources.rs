//! Tile source presets and URL templates.
//!
//! A source is a URL template forwarded to the backend, which fills in the
//! placeholders per tile:
//!
//! | Placeholder  | Value                                  |
//! |--------------|----------------------------------------|
//! | `{x}`        | tile column                            |
//! | `{y}`        | tile row                               |
//! | `{z}`        | zoom level                             |
//! | `{quad}`     | Bing quadkey                           |
//! | `{scale:22}` | `23 - 2 * zoom` (legacy scale servers) |

use crate::coord::TileCoord;

/// A named tile source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSource {
    pub name: &'static str,
    pub template: &'static str,
}

/// Built-in sources, in menu order.
pub const PRESETS: &[TileSource] = &[
    TileSource {
        name: "Bing Maps",
        template: "http://ecn.t0.tiles.virtualearth.net/tiles/r{quad}.jpeg?g=129&mkt=en&stl=H",
    },
    TileSource {
        name: "Bing Maps Satellite",
        template: "http://ecn.t0.tiles.virtualearth.net/tiles/a{quad}.jpeg?g=129&mkt=en&stl=H",
    },
    TileSource {
        name: "Bing Maps Hybrid",
        template: "http://ecn.t0.tiles.virtualearth.net/tiles/h{quad}.jpeg?g=129&mkt=en&stl=H",
    },
    TileSource {
        name: "Google Maps",
        template: "https://mt0.google.com/vt?lyrs=m&x={x}&s=&y={y}&z={z}",
    },
    TileSource {
        name: "Google Maps Satellite",
        template: "https://mt0.google.com/vt?lyrs=s&x={x}&s=&y={y}&z={z}",
    },
    TileSource {
        name: "Google Maps Hybrid",
        template: "https://mt0.google.com/vt?lyrs=h&x={x}&s=&y={y}&z={z}",
    },
    TileSource {
        name: "Google Maps Terrain",
        template: "https://mt0.google.com/vt?lyrs=p&x={x}&s=&y={y}&z={z}",
    },
    TileSource {
        name: "Open Street Maps",
        template: "https://a.tile.openstreetmap.org/{z}/{x}/{y}.png",
    },
    TileSource {
        name: "Open Cycle Maps",
        template: "http://a.tile.opencyclemap.org/cycle/{z}/{x}/{y}.png",
    },
    TileSource {
        name: "Open PT Transport",
        template: "http://openptmap.org/tiles/{z}/{x}/{y}.png",
    },
    TileSource {
        name: "ESRI World Imagery",
        template: "http://services.arcgisonline.com/arcgis/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
    },
    TileSource {
        name: "Wikimedia Maps",
        template: "https://maps.wikimedia.org/osm-intl/{z}/{x}/{y}.png",
    },
    TileSource {
        name: "NASA GIBS",
        template: "https://map1.vis.earthdata.nasa.gov/wmts-webmerc/MODIS_Terra_CorrectedReflectance_TrueColor/default/GoogleMapsCompatible_Level9/{z}/{y}/{x}.jpg",
    },
    TileSource {
        name: "Carto Light",
        template: "http://cartodb-basemaps-c.global.ssl.fastly.net/light_all/{z}/{x}/{y}.png",
    },
    TileSource {
        name: "Stamen Toner B&W",
        template: "http://a.tile.stamen.com/toner/{z}/{x}/{y}.png",
    },
];

/// Looks a preset up by name, ignoring ASCII case.
pub fn find_preset(name: &str) -> Option<&'static TileSource> {
    PRESETS.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

/// Resolves a user-supplied source: a preset name, or a template taken as is.
pub fn resolve_source(name_or_template: &str) -> String {
    find_preset(name_or_template)
        .map(|s| s.template.to_string())
        .unwrap_or_else(|| name_or_template.to_string())
}

/// Fills a template's placeholders for one tile.
pub fn qualify_url(template: &str, coord: &TileCoord) -> String {
    let scale22 = 23 - 2 * i32::from(coord.z);
    template
        .replace("{x}", &coord.x.to_string())
        .replace("{y}", &coord.y.to_string())
        .replace("{z}", &coord.z.to_string())
        .replace("{scale:22}", &scale22.to_string())
        .replace("{quad}", &coord.quadkey())
}
