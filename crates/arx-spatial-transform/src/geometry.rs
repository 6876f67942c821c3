//! Distance, bearing and nearby-equipment ranking.

use arx_spatial_types::{LocalCoordinate, Wgs84Coordinate};

use crate::transform::EARTH_RADIUS_M;

/// Straight-line distance between two local points, millimetres.
pub fn euclidean_distance(a: &LocalCoordinate, b: &LocalCoordinate) -> f64 {
    a.distance_to(b)
}

/// Horizontal bearing from `from` to `to` in degrees, clockwise from the
/// local +y axis, normalised to `[0, 360)`.
pub fn bearing_degrees(from: &LocalCoordinate, to: &LocalCoordinate) -> f64 {
    let deg = (to.x - from.x).atan2(to.y - from.y).to_degrees();
    let deg = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
    if deg >= 360.0 { 0.0 } else { deg }
}

/// Approximate ground distance between two WGS84 points, metres, using the
/// same equirectangular model as the transform engine.  Altitude is ignored.
pub fn equirectangular_distance_m(a: &Wgs84Coordinate, b: &Wgs84Coordinate) -> f64 {
    let mid_lat = ((a.latitude + b.latitude) * 0.5).to_radians();
    let x = (b.longitude - a.longitude).to_radians() * mid_lat.cos();
    let y = (b.latitude - a.latitude).to_radians();
    (x * x + y * y).sqrt() * EARTH_RADIUS_M
}

/// A candidate found by [`rank_nearby`].
#[derive(Debug, Clone, PartialEq)]
pub struct Nearby<T> {
    pub item: T,
    pub distance_mm: f64,
    pub bearing_deg: f64,
}

/// Keep the candidates within `radius_mm` of `center` and order them by
/// ascending distance.  Equal distances keep their input order.  At most
/// `limit` results are returned when a limit is given.
pub fn rank_nearby<T, I>(
    center: &LocalCoordinate,
    candidates: I,
    radius_mm: f64,
    limit: Option<usize>,
) -> Vec<Nearby<T>>
where
    I: IntoIterator<Item = (T, LocalCoordinate)>,
{
    let mut found: Vec<Nearby<T>> = candidates
        .into_iter()
        .filter_map(|(item, pos)| {
            let distance_mm = euclidean_distance(center, &pos);
            (distance_mm <= radius_mm).then(|| Nearby {
                item,
                distance_mm,
                bearing_deg: bearing_degrees(center, &pos),
            })
        })
        .collect();

    found.sort_by(|a, b| a.distance_mm.total_cmp(&b.distance_mm));
    if let Some(n) = limit {
        found.truncate(n);
    }
    found
}
