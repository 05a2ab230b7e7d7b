// Impact-zone geometry around a monitoring station
//
// The radius is a presentation scale (300 m floor, 10 m per 0.001 mg/m³,
// 2 km cap). It is not derived from any dispersion model.
use serde::Serialize;
use std::f64::consts::PI;

pub const MIN_ZONE_RADIUS_M: f64 = 300.0;
pub const MAX_ZONE_RADIUS_M: f64 = 2000.0;
const METERS_PER_MG_M3: f64 = 10_000.0;
/// Approximate length of one degree of latitude
const METERS_PER_DEGREE: f64 = 111_000.0;
const INNER_RING_RATIO: f64 = 0.4;
pub const DEFAULT_RING_POINTS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactZone {
    pub radius_m: f64,
    pub outer: Vec<GeoPoint>,
    pub inner: Vec<GeoPoint>,
    /// Set when some point is not finite (e.g. a station at a pole)
    pub degenerate: bool,
}

pub fn zone_radius_m(concentration: f64) -> f64 {
    (MIN_ZONE_RADIUS_M + concentration * METERS_PER_MG_M3).min(MAX_ZONE_RADIUS_M)
}

/// Closed ring of `points + 1` coordinates approximating a circle of
/// `radius_m` around (`lat`, `lon`). The first point is repeated at the end.
pub fn circle_ring(lat: f64, lon: f64, radius_m: f64, points: usize) -> Vec<GeoPoint> {
    let delta = radius_m / METERS_PER_DEGREE;
    let lon_scale = lat.to_radians().cos();

    let mut ring: Vec<GeoPoint> = (0..points)
        .map(|i| {
            let t = 2.0 * PI * i as f64 / points as f64;
            GeoPoint {
                lat: lat + delta * t.sin(),
                lon: lon + delta * t.cos() / lon_scale,
            }
        })
        .collect();

    if let Some(first) = ring.first().copied() {
        ring.push(first);
    }
    ring
}

impl ImpactZone {
    pub fn around(lat: f64, lon: f64, concentration: f64, points: usize) -> Self {
        let radius_m = zone_radius_m(concentration);
        let outer = circle_ring(lat, lon, radius_m, points);
        let inner = circle_ring(lat, lon, radius_m * INNER_RING_RATIO, points);

        let degenerate = outer
            .iter()
            .chain(inner.iter())
            .any(|p| !p.lat.is_finite() || !p.lon.is_finite())
            || lat.abs() >= 90.0;

        if degenerate {
            tracing::warn!(lat, lon, "Degenerate impact zone geometry");
        }

        Self {
            radius_m,
            outer,
            inner,
            degenerate,
        }
    }
}
