//! Axis-aligned bounds in the internal frame, and the quadrant and side
//! names used to navigate between them.

use std::fmt;

use glam::DVec2;

use crate::coords::{GeoPoint, LAT_RANGE, LON_RANGE, SEAM_LON};

/// One edge of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    West,
    East,
    North,
    South,
}

impl Side {
    /// All sides in storage order.
    pub const ALL: [Side; 4] = [Side::West, Side::East, Side::North, Side::South];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The side facing this one across a shared edge.
    #[must_use]
    pub fn opposite(self) -> Side {
        match self {
            Side::West => Side::East,
            Side::East => Side::West,
            Side::North => Side::South,
            Side::South => Side::North,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Side::West => "west",
            Side::East => "east",
            Side::North => "north",
            Side::South => "south",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One quarter of a subdivided bound, in the order children are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Quadrant {
    /// All quadrants in storage order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The quadrant sharing the given edge of this one, if the edge is
    /// interior to the parent.
    ///
    /// Returns `None` for the two sides that lie on the parent's boundary.
    #[must_use]
    pub fn sibling(self, side: Side) -> Option<Quadrant> {
        match (self, side) {
            (Quadrant::NorthWest, Side::East) | (Quadrant::SouthEast, Side::North) => {
                Some(Quadrant::NorthEast)
            }
            (Quadrant::NorthWest, Side::South) | (Quadrant::SouthEast, Side::West) => {
                Some(Quadrant::SouthWest)
            }
            (Quadrant::NorthEast, Side::West) | (Quadrant::SouthWest, Side::North) => {
                Some(Quadrant::NorthWest)
            }
            (Quadrant::NorthEast, Side::South) | (Quadrant::SouthWest, Side::East) => {
                Some(Quadrant::SouthEast)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Quadrant::NorthWest => "NW",
            Quadrant::NorthEast => "NE",
            Quadrant::SouthWest => "SW",
            Quadrant::SouthEast => "SE",
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A rectangle in the internal frame.
///
/// Containment is half-open: the west and north edges belong to the bound,
/// the east and south edges to its neighbours. The four quadrants of a bound
/// therefore partition it exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GeoBound {
    west: f64,
    east: f64,
    north: f64,
    south: f64,
}

impl GeoBound {
    /// Create a bound, or `None` unless `west < east` and `north < south`.
    #[must_use]
    pub fn new(west: f64, east: f64, north: f64, south: f64) -> Option<Self> {
        (west < east && north < south).then_some(Self {
            west,
            east,
            north,
            south,
        })
    }

    /// The whole domain.
    #[must_use]
    pub const fn global() -> Self {
        Self {
            west: 0.0,
            east: LON_RANGE,
            north: 0.0,
            south: LAT_RANGE,
        }
    }

    #[must_use]
    pub const fn west_hemisphere() -> Self {
        Self {
            west: 0.0,
            east: SEAM_LON,
            north: 0.0,
            south: LAT_RANGE,
        }
    }

    #[must_use]
    pub const fn east_hemisphere() -> Self {
        Self {
            west: SEAM_LON,
            east: LON_RANGE,
            north: 0.0,
            south: LAT_RANGE,
        }
    }

    #[must_use]
    pub fn west(&self) -> f64 {
        self.west
    }

    #[must_use]
    pub fn east(&self) -> f64 {
        self.east
    }

    #[must_use]
    pub fn north(&self) -> f64 {
        self.north
    }

    #[must_use]
    pub fn south(&self) -> f64 {
        self.south
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.south - self.north
    }

    #[must_use]
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.west + self.east) / 2.0,
            (self.north + self.south) / 2.0,
        )
    }

    /// Split into NW, NE, SW and SE quarters.
    ///
    /// Adjacent quarters share the same midpoint value, so no point falls
    /// between them or into two of them.
    #[must_use]
    pub fn subdivide(&self) -> [GeoBound; 4] {
        let GeoPoint { lon: mid_lon, lat: mid_lat } = self.center();
        [
            Self {
                west: self.west,
                east: mid_lon,
                north: self.north,
                south: mid_lat,
            },
            Self {
                west: mid_lon,
                east: self.east,
                north: self.north,
                south: mid_lat,
            },
            Self {
                west: self.west,
                east: mid_lon,
                north: mid_lat,
                south: self.south,
            },
            Self {
                west: mid_lon,
                east: self.east,
                north: mid_lat,
                south: self.south,
            },
        ]
    }

    /// One quarter of the bound.
    #[must_use]
    pub fn quadrant(&self, quadrant: Quadrant) -> GeoBound {
        self.subdivide()[quadrant.index()]
    }

    /// Half-open containment test.
    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        self.west <= point.lon
            && point.lon < self.east
            && self.north <= point.lat
            && point.lat < self.south
    }

    /// A point half a tile beyond the given edge, on the centre line.
    ///
    /// For a regular grid this lands in the middle of the same-sized cell
    /// across that edge. The point may fall outside the domain.
    #[must_use]
    pub fn probe(&self, side: Side) -> GeoPoint {
        let step = match side {
            Side::West => DVec2::new(-self.width(), 0.0),
            Side::East => DVec2::new(self.width(), 0.0),
            Side::North => DVec2::new(0.0, -self.height()),
            Side::South => DVec2::new(0.0, self.height()),
        };
        GeoPoint::from(self.center().to_dvec2() + step)
    }
}

impl fmt::Display for GeoBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}..{}, {}..{}]",
            self.west, self.east, self.north, self.south
        )
    }
}
