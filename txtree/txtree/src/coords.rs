//! Geographic coordinates.
//!
//! Tiles are addressed in an internal frame where longitude runs from 0 to
//! 360 degrees eastwards starting at the antimeridian, and latitude runs from
//! 0 at the north pole to 180 at the south pole. [`Coordinate`] is the
//! traditional frame; conversions go through `From`.

use std::fmt;

use glam::DVec2;

/// Equatorial radius of the WGS84 ellipsoid, in metres.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Length of one degree of arc along a great circle, in metres.
pub const METERS_PER_DEGREE: f64 = EARTH_RADIUS * std::f64::consts::PI / 180.0;

/// Internal longitude of the boundary between the west and east hemispheres.
pub const SEAM_LON: f64 = 180.0;

/// Internal longitude span.
pub const LON_RANGE: f64 = 360.0;

/// Internal latitude span.
pub const LAT_RANGE: f64 = 180.0;

const DEFAULT_PRECISION: usize = 5;

/// Largest internal latitude that still lies inside the domain.
const MAX_LAT: f64 = LAT_RANGE - 1e-9;

/// A point in the internal frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GeoPoint {
    /// Degrees east of the antimeridian, in `[0, 360)`.
    pub lon: f64,
    /// Degrees south of the north pole, in `[0, 180)`.
    pub lat: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    #[must_use]
    pub fn to_dvec2(self) -> DVec2 {
        DVec2::new(self.lon, self.lat)
    }

    /// Whether the point lies inside `[0, 360) × [0, 180)`.
    #[must_use]
    pub fn is_in_domain(self) -> bool {
        (0.0..LON_RANGE).contains(&self.lon) && (0.0..LAT_RANGE).contains(&self.lat)
    }
}

impl From<DVec2> for GeoPoint {
    fn from(v: DVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<GeoPoint> for DVec2 {
    fn from(p: GeoPoint) -> Self {
        p.to_dvec2()
    }
}

impl From<Coordinate> for GeoPoint {
    /// Longitudes wrap into the domain; latitudes are clamped so both poles
    /// stay addressable.
    fn from(c: Coordinate) -> Self {
        Self {
            lon: (c.longitude + SEAM_LON).rem_euclid(LON_RANGE),
            lat: (90.0 - c.latitude).clamp(0.0, MAX_LAT),
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(DEFAULT_PRECISION);
        write!(
            f,
            "{:.precision$}° {:.precision$}°",
            self.lon, self.lat
        )
    }
}

/// A point in the traditional frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Coordinate {
    /// Degrees east of Greenwich, in `(-180, 180]`.
    pub longitude: f64,
    /// Degrees north of the equator, in `[-90, 90]`.
    pub latitude: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

impl From<GeoPoint> for Coordinate {
    fn from(p: GeoPoint) -> Self {
        Self {
            longitude: p.lon - SEAM_LON,
            latitude: 90.0 - p.lat,
        }
    }
}

impl fmt::Display for Coordinate {
    /// Formats as `12.34560°E 45.00000°N`. Zero is written as west and south.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(DEFAULT_PRECISION);
        let east_west = if self.longitude > 0.0 { 'E' } else { 'W' };
        let north_south = if self.latitude > 0.0 { 'N' } else { 'S' };
        write!(
            f,
            "{:.precision$}°{east_west} {:.precision$}°{north_south}",
            self.longitude.abs(),
            self.latitude.abs()
        )
    }
}

/// Convert an arc in degrees to metres on the Earth's surface.
#[must_use]
pub fn degrees_to_meters(degrees: f64) -> f64 {
    degrees * METERS_PER_DEGREE
}

/// Convert a surface distance in metres to degrees of arc.
#[must_use]
pub fn meters_to_degrees(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_to_internal() {
        let p = GeoPoint::from(Coordinate::new(-122.5, 37.75));
        assert!((p.lon - 57.5).abs() < 1e-12);
        assert!((p.lat - 52.25).abs() < 1e-12);

        let greenwich = GeoPoint::from(Coordinate::new(0.0, 0.0));
        assert_eq!(greenwich, GeoPoint::new(180.0, 90.0));
    }

    #[test]
    fn test_internal_to_coordinate() {
        let c = Coordinate::from(GeoPoint::new(270.0, 45.0));
        assert_eq!(c, Coordinate::new(90.0, 45.0));
    }

    #[test]
    fn test_edges_stay_in_domain() {
        let antimeridian = GeoPoint::from(Coordinate::new(180.0, 0.0));
        assert_eq!(antimeridian.lon, 0.0);
        assert!(antimeridian.is_in_domain());

        let south_pole = GeoPoint::from(Coordinate::new(10.0, -90.0));
        assert!(south_pole.lat < 180.0);
        assert!(south_pole.is_in_domain());

        let north_pole = GeoPoint::from(Coordinate::new(10.0, 90.0));
        assert_eq!(north_pole.lat, 0.0);

        assert!(!GeoPoint::new(360.0, 10.0).is_in_domain());
        assert!(!GeoPoint::new(10.0, -0.5).is_in_domain());
        assert!(!GeoPoint::new(f64::NAN, 10.0).is_in_domain());
    }

    #[test]
    fn test_display() {
        let c = Coordinate::new(12.3456, 45.0);
        assert_eq!(c.to_string(), "12.34560°E 45.00000°N");
        assert_eq!(format!("{c:.1}"), "12.3°E 45.0°N");

        let c = Coordinate::new(-74.0, -33.5);
        assert_eq!(c.to_string(), "74.00000°W 33.50000°S");

        assert_eq!(format!("{:.2}", GeoPoint::new(1.0, 2.5)), "1.00° 2.50°");
    }

    #[test]
    fn test_dvec2_conversion() {
        let p = GeoPoint::new(12.0, 34.0);
        let v: DVec2 = p.into();
        assert_eq!(v, DVec2::new(12.0, 34.0));
        assert_eq!(GeoPoint::from(v), p);
    }

    #[test]
    fn test_distance_conversion() {
        assert!((METERS_PER_DEGREE - 111_319.490_793).abs() < 1e-3);
        assert!((degrees_to_meters(2.0) - 2.0 * METERS_PER_DEGREE).abs() < 1e-9);
        assert!((meters_to_degrees(degrees_to_meters(0.125)) - 0.125).abs() < 1e-12);
    }
}
