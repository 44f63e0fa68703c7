//! Spherical Web Mercator (EPSG:3857) and its geographic counterpart (EPSG:4326).
//!
//! The editor works in EPSG:3857 metres; GeoJSON at the import/export
//! boundary is always longitude/latitude degrees.

use super::Vec2;
use crate::bounds::Aabb2;

/// WGS84 semi-major axis (meters), used as the sphere radius.
pub const WGS84_A: f64 = 6_378_137.0;
/// Half the width of the projected world (meters).
pub const MERCATOR_HALF_SIZE: f64 = std::f64::consts::PI * WGS84_A;
/// Latitude at which the square Mercator world is clipped.
pub const MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_6;

/// A coordinate reference system the editor can convert between.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Crs {
    /// EPSG:4326, `[lon_deg, lat_deg]`.
    Geographic,
    /// EPSG:3857, `[x_m, y_m]`.
    WebMercator,
}

impl Crs {
    pub fn code(self) -> &'static str {
        match self {
            Crs::Geographic => "EPSG:4326",
            Crs::WebMercator => "EPSG:3857",
        }
    }
}

/// Full EPSG:3857 extent.
pub fn mercator_extent() -> Aabb2 {
    Aabb2::new(
        [-MERCATOR_HALF_SIZE, -MERCATOR_HALF_SIZE],
        [MERCATOR_HALF_SIZE, MERCATOR_HALF_SIZE],
    )
}

/// Geographic degrees to Web Mercator metres. Y is clamped to the square world.
pub fn lon_lat_to_mercator(lon_deg: f64, lat_deg: f64) -> Vec2 {
    let x = WGS84_A * lon_deg.to_radians();
    let mut y = WGS84_A * (std::f64::consts::PI * (lat_deg + 90.0) / 360.0).tan().ln();
    if y > MERCATOR_HALF_SIZE {
        y = MERCATOR_HALF_SIZE;
    } else if y < -MERCATOR_HALF_SIZE || y.is_nan() {
        y = -MERCATOR_HALF_SIZE;
    }
    Vec2::new(x, y)
}

/// Web Mercator metres to geographic degrees `(lon, lat)`.
pub fn mercator_to_lon_lat(p: Vec2) -> (f64, f64) {
    let lon = 180.0 * p.x / MERCATOR_HALF_SIZE;
    let lat = 360.0 * (p.y / WGS84_A).exp().atan() / std::f64::consts::PI - 90.0;
    (lon, lat)
}

/// Converts one coordinate between reference systems.
pub fn transform(p: Vec2, from: Crs, to: Crs) -> Vec2 {
    match (from, to) {
        (Crs::Geographic, Crs::WebMercator) => lon_lat_to_mercator(p.x, p.y),
        (Crs::WebMercator, Crs::Geographic) => {
            let (lon, lat) = mercator_to_lon_lat(p);
            Vec2::new(lon, lat)
        }
        (Crs::Geographic, Crs::Geographic) | (Crs::WebMercator, Crs::WebMercator) => p,
    }
}

/// Ground resolution (metres per pixel) of a 256px tile pyramid at `zoom`.
pub fn resolution_for_zoom(zoom: f64) -> f64 {
    2.0 * MERCATOR_HALF_SIZE / 256.0 / 2f64.powf(zoom)
}
