//! Canonical directions, slice names and compass tables.
//!
//! World axes: +X points right, +Y points up and +Z points toward the viewer
//! (the front face). Cubelet centers start on the integer grid `{-1, 0, 1}^3`
//! and drift off it only by floating-point error, so every comparison against
//! rotated geometry goes through [`approx_eq`] or [`approx_eq_vec`].

use std::fmt;

use glam::{DVec3, IVec3};

/// Tolerance for every position, normal and angle comparison.
pub const EPSILON: f64 = 0.001;

/// Compares two scalars within [`EPSILON`].
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Compares two vectors component-wise within [`EPSILON`].
#[inline]
pub fn approx_eq_vec(a: DVec3, b: DVec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

/// One of the six outer faces, named by where it sits in world space.
///
/// The same names double as local face names of a cubelet: a cubelet's
/// `Front` local face is the one pointing along +Z before any rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Face {
    Up,
    Down,
    Front,
    Back,
    Left,
    Right,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Up,
        Face::Down,
        Face::Front,
        Face::Back,
        Face::Left,
        Face::Right,
    ];

    /// The four faces around the vertical axis, in clockwise order seen from above.
    pub const SIDES: [Face; 4] = [Face::Front, Face::Right, Face::Back, Face::Left];

    /// Position of this face in [`Face::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Outward unit normal.
    pub const fn normal(self) -> IVec3 {
        match self {
            Face::Up => IVec3::new(0, 1, 0),
            Face::Down => IVec3::new(0, -1, 0),
            Face::Front => IVec3::new(0, 0, 1),
            Face::Back => IVec3::new(0, 0, -1),
            Face::Left => IVec3::new(-1, 0, 0),
            Face::Right => IVec3::new(1, 0, 0),
        }
    }

    pub const fn opposite(self) -> Face {
        match self {
            Face::Up => Face::Down,
            Face::Down => Face::Up,
            Face::Front => Face::Back,
            Face::Back => Face::Front,
            Face::Left => Face::Right,
            Face::Right => Face::Left,
        }
    }

    /// The side face on the right when looking at this face with up on top.
    ///
    /// Returns `None` for `Up` and `Down`, which have no horizontal neighbour.
    pub const fn right_neighbor(self) -> Option<Face> {
        match self {
            Face::Front => Some(Face::Right),
            Face::Right => Some(Face::Back),
            Face::Back => Some(Face::Left),
            Face::Left => Some(Face::Front),
            Face::Up | Face::Down => None,
        }
    }

    /// The side face on the left when looking at this face with up on top.
    pub const fn left_neighbor(self) -> Option<Face> {
        match self {
            Face::Front => Some(Face::Left),
            Face::Left => Some(Face::Back),
            Face::Back => Some(Face::Right),
            Face::Right => Some(Face::Front),
            Face::Up | Face::Down => None,
        }
    }

    /// Finds the face whose outward normal matches `normal` within [`EPSILON`].
    pub fn from_normal(normal: DVec3) -> Option<Face> {
        Face::ALL
            .into_iter()
            .find(|face| approx_eq_vec(face.normal().as_dvec3(), normal))
    }

    /// Which neighbouring face lies in each compass direction when this face
    /// is viewed from outside.
    ///
    /// Side faces are viewed with `Up` to the north. `Up` is viewed from above
    /// with `Front` to the south, `Down` from below with `Front` to the north.
    #[rustfmt::skip]
    pub const fn compass_neighbors(self) -> [(Compass, Face); 4] {
        use Compass::*;
        match self {
            Face::Front => [(North, Face::Up), (South, Face::Down), (West, Face::Left), (East, Face::Right)],
            Face::Back => [(North, Face::Up), (South, Face::Down), (West, Face::Right), (East, Face::Left)],
            Face::Left => [(North, Face::Up), (South, Face::Down), (West, Face::Back), (East, Face::Front)],
            Face::Right => [(North, Face::Up), (South, Face::Down), (West, Face::Front), (East, Face::Back)],
            Face::Up => [(North, Face::Back), (South, Face::Front), (West, Face::Left), (East, Face::Right)],
            Face::Down => [(North, Face::Front), (South, Face::Back), (West, Face::Left), (East, Face::Right)],
        }
    }

    /// Neighbouring face in the given compass direction.
    pub const fn neighbor(self, direction: Compass) -> Face {
        // every table lists north, south, west, east in that order
        let index = match direction {
            Compass::North => 0,
            Compass::South => 1,
            Compass::West => 2,
            Compass::East => 3,
        };
        self.compass_neighbors()[index].1
    }

    /// Short notation code (`U`, `D`, `F`, `B`, `L`, `R`).
    pub const fn code(self) -> &'static str {
        match self {
            Face::Up => "U",
            Face::Down => "D",
            Face::Front => "F",
            Face::Back => "B",
            Face::Left => "L",
            Face::Right => "R",
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Face::Up => "up",
            Face::Down => "down",
            Face::Front => "front",
            Face::Back => "back",
            Face::Left => "left",
            Face::Right => "right",
        };
        f.write_str(name)
    }
}

/// A rotatable layer: one of the six faces or one of the three mid-layers.
///
/// Each slice is the plane through [`SliceName::reference`] perpendicular to
/// [`SliceName::axis`]. Clockwise is judged looking down the axis from its
/// positive end, so a mid-layer turns like the face named first in its code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SliceName {
    Face(Face),
    /// `MUD`, between up and down, turning like `U`.
    Horizontal,
    /// `MFB`, between front and back, turning like `F`.
    Depth,
    /// `MRL`, between right and left, turning like `R`.
    Vertical,
}

impl SliceName {
    pub const ALL: [SliceName; 9] = [
        SliceName::Face(Face::Up),
        SliceName::Face(Face::Down),
        SliceName::Face(Face::Front),
        SliceName::Face(Face::Back),
        SliceName::Face(Face::Left),
        SliceName::Face(Face::Right),
        SliceName::Horizontal,
        SliceName::Depth,
        SliceName::Vertical,
    ];

    /// Unit axis the slice turns around.
    pub const fn axis(self) -> IVec3 {
        match self {
            SliceName::Face(face) => face.normal(),
            SliceName::Horizontal => Face::Up.normal(),
            SliceName::Depth => Face::Front.normal(),
            SliceName::Vertical => Face::Right.normal(),
        }
    }

    /// Fixed point of the slice plane, which is also where its center cubelet sits.
    pub const fn reference(self) -> IVec3 {
        match self {
            SliceName::Face(face) => face.normal(),
            SliceName::Horizontal | SliceName::Depth | SliceName::Vertical => IVec3::ZERO,
        }
    }

    pub const fn face(self) -> Option<Face> {
        match self {
            SliceName::Face(face) => Some(face),
            _ => None,
        }
    }

    /// The mid-layer parallel to `face`, and whether turning it the way
    /// `face` turns means reversing the layer's own clockwise.
    pub const fn middle_parallel_to(face: Face) -> (SliceName, bool) {
        match face {
            Face::Up => (SliceName::Horizontal, false),
            Face::Down => (SliceName::Horizontal, true),
            Face::Front => (SliceName::Depth, false),
            Face::Back => (SliceName::Depth, true),
            Face::Right => (SliceName::Vertical, false),
            Face::Left => (SliceName::Vertical, true),
        }
    }

    /// Short notation code (`U`, ..., `MUD`, `MFB`, `MRL`).
    pub const fn code(self) -> &'static str {
        match self {
            SliceName::Face(face) => face.code(),
            SliceName::Horizontal => "MUD",
            SliceName::Depth => "MFB",
            SliceName::Vertical => "MRL",
        }
    }

    /// Inverse of [`SliceName::code`].
    pub fn from_code(code: &str) -> Option<SliceName> {
        SliceName::ALL.into_iter().find(|slice| slice.code() == code)
    }
}

impl From<Face> for SliceName {
    fn from(face: Face) -> Self {
        SliceName::Face(face)
    }
}

impl fmt::Display for SliceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A direction on a face's 3x3 grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Compass {
    North,
    South,
    East,
    West,
}

impl Compass {
    const fn is_vertical(self) -> bool {
        matches!(self, Compass::North | Compass::South)
    }
}

/// Where a cubelet sits on a face's 3x3 grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Location {
    Center,
    N,
    S,
    E,
    W,
    NW,
    NE,
    SW,
    SE,
}

impl Location {
    /// Builds a location from the compass directions of the neighbouring faces
    /// a cubelet also lies on. Order does not matter: north/south always leads.
    pub fn from_compass(directions: &[Compass]) -> Option<Location> {
        use Compass::*;
        let vertical = directions.iter().copied().filter(|d| d.is_vertical());
        let horizontal = directions.iter().copied().filter(|d| !d.is_vertical());
        let (vertical, horizontal): (Vec<_>, Vec<_>) = (vertical.collect(), horizontal.collect());

        let location = match (vertical.as_slice(), horizontal.as_slice()) {
            ([], []) => Location::Center,
            ([North], []) => Location::N,
            ([South], []) => Location::S,
            ([], [East]) => Location::E,
            ([], [West]) => Location::W,
            ([North], [West]) => Location::NW,
            ([North], [East]) => Location::NE,
            ([South], [West]) => Location::SW,
            ([South], [East]) => Location::SE,
            _ => return None,
        };
        Some(location)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Location::Center => "center",
            Location::N => "N",
            Location::S => "S",
            Location::E => "E",
            Location::W => "W",
            Location::NW => "NW",
            Location::NE => "NE",
            Location::SW => "SW",
            Location::SE => "SE",
        };
        f.write_str(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_faces_have_opposite_normals() {
        for face in Face::ALL {
            assert_eq!(face.normal(), -face.opposite().normal(), "{face}");
        }
    }

    #[test]
    fn test_side_neighbors_are_inverse() {
        for face in Face::SIDES {
            let right = face.right_neighbor().unwrap();
            assert_eq!(right.left_neighbor(), Some(face));
        }
        assert_eq!(Face::Up.right_neighbor(), None);
    }

    #[test]
    fn test_compass_neighbors_are_adjacent() {
        for face in Face::ALL {
            for (_, neighbor) in face.compass_neighbors() {
                assert_eq!(
                    face.normal().dot(neighbor.normal()),
                    0,
                    "{neighbor} is not adjacent to {face}"
                );
            }
            // north/south and east/west pairs are opposite faces
            assert_eq!(
                face.neighbor(Compass::North).opposite(),
                face.neighbor(Compass::South)
            );
            assert_eq!(
                face.neighbor(Compass::East).opposite(),
                face.neighbor(Compass::West)
            );
        }
    }

    #[test]
    fn test_compass_is_viewed_from_outside() {
        // north x east must point out of the face for a view from outside
        for face in Face::ALL {
            let north = face.neighbor(Compass::North).normal();
            let east = face.neighbor(Compass::East).normal();
            assert_eq!(east.cross(north), face.normal(), "{face}");
        }
    }

    #[test]
    fn test_from_normal_tolerates_drift() {
        let drifted = DVec3::new(0.0004, 0.9996, -0.0002);
        assert_eq!(Face::from_normal(drifted), Some(Face::Up));
        assert_eq!(Face::from_normal(DVec3::new(0.7, 0.7, 0.0)), None);
    }

    #[test]
    fn test_slice_codes_roundtrip() {
        for slice in SliceName::ALL {
            assert_eq!(SliceName::from_code(slice.code()), Some(slice));
        }
        assert_eq!(SliceName::from_code("M"), None);
    }

    #[test]
    fn test_location_orders_north_south_first() {
        use Compass::*;
        assert_eq!(Location::from_compass(&[East, North]), Some(Location::NE));
        assert_eq!(Location::from_compass(&[South, West]), Some(Location::SW));
        assert_eq!(Location::from_compass(&[]), Some(Location::Center));
        assert_eq!(Location::from_compass(&[North, South]), None);
    }
}
