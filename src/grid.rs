//! Slice and face queries over the 3x3x3 grid.
//!
//! Nothing here is cached: every query re-derives slice membership from the
//! current cubelet transforms by comparing transformed centers against the
//! fixed, axis-aligned slice planes. Results are therefore always consistent
//! with the last completed increment of the last move.

use glam::{DVec3, IVec3};
use rustc_hash::FxHashSet;

use crate::error::CubeError;
use crate::geometry::{approx_eq, approx_eq_vec, Compass, Face, Location, SliceName};
use crate::pieces::{Color, Cube, Cubelet, CubeletIndex, CubeletKind};

/// A snapshot of which cubelets currently occupy a slice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slice {
    pub name: SliceName,
    /// Member indices in assembly order.
    pub members: Vec<CubeletIndex>,
    /// The cubelet sitting on the slice's fixed reference point.
    pub center: CubeletIndex,
}

impl Slice {
    pub fn face(&self) -> Option<Face> {
        self.name.face()
    }

    pub fn contains(&self, index: CubeletIndex) -> bool {
        self.members.contains(&index)
    }
}

impl Cube {
    /// Whether the cubelet's transformed center lies in the slice plane.
    pub fn is_on_slice(&self, cubelet: &Cubelet, slice: SliceName) -> bool {
        let offset = cubelet.world_center() - slice.reference().as_dvec3();
        approx_eq(slice.axis().as_dvec3().dot(offset), 0.0)
    }

    #[inline]
    pub fn is_on_face(&self, cubelet: &Cubelet, face: Face) -> bool {
        self.is_on_slice(cubelet, SliceName::Face(face))
    }

    /// Cubelets currently on a slice plus its center cubelet.
    pub fn slice(&self, name: SliceName) -> Result<Slice, CubeError> {
        let members = self.indices_where(|cubelet| self.is_on_slice(cubelet, name));
        let reference = name.reference().as_dvec3();
        let center = members
            .iter()
            .copied()
            .find(|&index| approx_eq_vec(self.cubelet(index).world_center(), reference))
            .ok_or(CubeError::MissingSliceCenter(name))?;

        Ok(Slice {
            name,
            members,
            center,
        })
    }

    /// Outer faces the cubelet currently lies on (none for the core).
    pub fn faces_of(&self, cubelet: &Cubelet) -> Vec<Face> {
        Face::ALL
            .into_iter()
            .filter(|&face| self.is_on_face(cubelet, face))
            .collect()
    }

    /// Side faces (front, right, back, left) the cubelet lies on.
    pub fn side_faces_of(&self, cubelet: &Cubelet) -> Vec<Face> {
        Face::SIDES
            .into_iter()
            .filter(|&face| self.is_on_face(cubelet, face))
            .collect()
    }

    /// The cubelet whose transformed center is at `position`.
    pub fn cubelet_at(&self, position: IVec3) -> Option<CubeletIndex> {
        let target = position.as_dvec3();
        self.cubelets()
            .iter()
            .position(|cubelet| approx_eq_vec(cubelet.world_center(), target))
    }

    /// Face currently occupied by the center cubelet showing `color`.
    pub fn face_of_color(&self, color: Color) -> Result<Face, CubeError> {
        let center = self
            .cubelets()
            .iter()
            .find(|cubelet| cubelet.kind() == CubeletKind::Center && cubelet.has_color(color))
            .ok_or(CubeError::MissingColorCenter(color))?;

        Face::ALL
            .into_iter()
            .find(|&face| self.is_on_face(center, face))
            .ok_or(CubeError::MissingColorCenter(color))
    }

    /// The face slice whose center shows `color`.
    pub fn face_by_color(&self, color: Color) -> Result<Slice, CubeError> {
        self.slice(SliceName::Face(self.face_of_color(color)?))
    }

    /// Which canonical face direction matches a world-space normal.
    pub fn face_by_normal(&self, normal: DVec3) -> Result<Face, CubeError> {
        Face::from_normal(normal).ok_or(CubeError::MissingFaceForNormal(normal.to_array()))
    }

    /// Color shown by the face's center cubelet.
    pub fn color_at_face(&self, face: Face) -> Result<Color, CubeError> {
        let name = SliceName::Face(face);
        let slice = self.slice(name)?;
        self.cubelet(slice.center)
            .colors()
            .next()
            .ok_or(CubeError::MissingSliceCenter(name))
    }

    /// Compass location of a cubelet on a face's 3x3 grid.
    ///
    /// Derived from which neighbouring faces the cubelet also lies on: none for
    /// the center, one for an edge, two for a corner.
    pub fn location_on_face(&self, cubelet: &Cubelet, face: Face) -> Result<Location, CubeError> {
        let position = cubelet.origin();
        if !self.is_on_face(cubelet, face) {
            return Err(CubeError::NotOnFace { position, face });
        }

        let directions: Vec<Compass> = face
            .compass_neighbors()
            .into_iter()
            .filter(|&(_, neighbor)| self.is_on_face(cubelet, neighbor))
            .map(|(direction, _)| direction)
            .collect();

        Location::from_compass(&directions).ok_or(CubeError::MissingLocation { position, face })
    }

    /// Whether the sticker of `color` points the way the `color` face points.
    ///
    /// Stickers always face outward, so a matching normal also means the
    /// cubelet sits on that face. A cubelet without the color never matches.
    pub fn is_sticker_facing_correct(&self, cubelet: &Cubelet, color: Color) -> Result<bool, CubeError> {
        let Some(normal) = cubelet.sticker_normal(color) else {
            return Ok(false);
        };
        let face = self.face_of_color(color)?;
        Ok(approx_eq_vec(normal, face.normal().as_dvec3()))
    }

    /// Every sticker on the cubelet faces its own color's face.
    pub fn is_fully_correct(&self, cubelet: &Cubelet) -> Result<bool, CubeError> {
        for color in cubelet.colors() {
            if !self.is_sticker_facing_correct(cubelet, color)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// The cubelet sits between the faces of its own colors, in any orientation.
    pub fn is_at_correct_position(&self, cubelet: &Cubelet) -> Result<bool, CubeError> {
        let own: FxHashSet<Color> = cubelet.colors().collect();
        let around = self
            .faces_of(cubelet)
            .into_iter()
            .map(|face| self.color_at_face(face))
            .collect::<Result<FxHashSet<Color>, CubeError>>()?;
        Ok(own == around)
    }

    pub fn is_solved(&self) -> Result<bool, CubeError> {
        for cubelet in self.cubelets() {
            if !self.is_fully_correct(cubelet)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Sticker colors on a face, row by row from north to south, west to east.
    pub fn face_stickers(&self, face: Face) -> Result<[[Color; 3]; 3], CubeError> {
        let normal = face.normal();
        let north = face.neighbor(Compass::North).normal();
        let east = face.neighbor(Compass::East).normal();

        let mut grid = [[Color::White; 3]; 3];
        for (row, cells) in grid.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                let position = normal + north * (1 - row as i32) + east * (col as i32 - 1);
                let not_found = CubeError::NotOnFace { position, face };
                let cubelet = self.cubelet(self.cubelet_at(position).ok_or(not_found.clone())?);
                *cell = cubelet
                    .stickers()
                    .find(|&(local, _)| approx_eq_vec(cubelet.world_normal(local), normal.as_dvec3()))
                    .map(|(_, color)| color)
                    .ok_or(not_found)?;
            }
        }
        Ok(grid)
    }

    /// Formats the cube as a cross-shaped net of color letters.
    ///
    /// ```text
    ///     U
    /// L F R B
    ///     D
    /// ```
    pub fn format_net(&self) -> Result<String, CubeError> {
        let row_string = |grid: &[[Color; 3]; 3], row: usize| -> String {
            grid[row].iter().map(|color| color.letter()).collect()
        };

        let up = self.face_stickers(Face::Up)?;
        let mut belt = Vec::with_capacity(4);
        for face in [Face::Left, Face::Front, Face::Right, Face::Back] {
            belt.push(self.face_stickers(face)?);
        }
        let down = self.face_stickers(Face::Down)?;

        let mut output = String::new();
        for row in 0..3 {
            output.push_str(&format!("    {}\n", row_string(&up, row)));
        }
        for row in 0..3 {
            let line: Vec<String> = belt.iter().map(|grid| row_string(grid, row)).collect();
            output.push_str(&line.join(" "));
            output.push('\n');
        }
        for row in 0..3 {
            output.push_str(&format!("    {}\n", row_string(&down, row)));
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{AnimationConfig, MoveExecutor};
    use crate::Headless;

    fn executor() -> MoveExecutor<Headless> {
        MoveExecutor::new(Cube::solved(), Headless, AnimationConfig::instant())
    }

    #[test]
    fn test_face_slices_hold_nine_and_center() {
        let cube = Cube::solved();
        for slice_name in SliceName::ALL {
            let slice = cube.slice(slice_name).unwrap();
            assert_eq!(slice.members.len(), 9, "{slice_name}");
            let center = cube.cubelet(slice.center);
            assert!(approx_eq_vec(center.world_center(), slice_name.reference().as_dvec3()));
        }
        let middle = cube.slice(SliceName::Horizontal).unwrap();
        assert_eq!(cube.cubelet(middle.center).kind(), CubeletKind::Core);
    }

    #[test]
    fn test_slice_is_idempotent() {
        let mut executor = executor();
        executor.perform("R U F' MUD").unwrap();
        let cube = executor.cube();
        for slice_name in SliceName::ALL {
            assert_eq!(cube.slice(slice_name).unwrap(), cube.slice(slice_name).unwrap());
        }
    }

    #[test]
    fn test_white_face_is_up_when_solved() {
        let cube = Cube::solved();
        let slice = cube.face_by_color(Color::White).unwrap();
        assert_eq!(slice.face(), Some(Face::Up));
        assert_eq!(cube.color_at_face(Face::Front).unwrap(), Color::Red);
    }

    #[test]
    fn test_face_by_color_follows_whole_cube_turns() {
        let mut executor = executor();
        // whole cube turn about the right axis: front comes up
        executor.perform("L' MRL R").unwrap();
        let cube = executor.cube();
        assert_eq!(cube.face_of_color(Color::Red).unwrap(), Face::Up);
        assert_eq!(cube.face_of_color(Color::White).unwrap(), Face::Back);
        assert!(cube.is_solved().unwrap());
    }

    #[test]
    fn test_face_by_normal() {
        let cube = Cube::solved();
        assert_eq!(cube.face_by_normal(DVec3::NEG_Z).unwrap(), Face::Back);
        assert!(matches!(
            cube.face_by_normal(DVec3::new(1.0, 1.0, 0.0)),
            Err(CubeError::MissingFaceForNormal(_))
        ));
    }

    #[test]
    fn test_location_on_face() {
        let cube = Cube::solved();
        let at = |x, y, z| cube.cubelet(cube.cubelet_at(IVec3::new(x, y, z)).unwrap());

        assert_eq!(cube.location_on_face(at(0, 0, 1), Face::Front).unwrap(), Location::Center);
        assert_eq!(cube.location_on_face(at(0, 1, 1), Face::Front).unwrap(), Location::N);
        assert_eq!(cube.location_on_face(at(1, 1, 1), Face::Front).unwrap(), Location::NE);
        assert_eq!(cube.location_on_face(at(1, 1, 1), Face::Up).unwrap(), Location::SE);
        assert_eq!(cube.location_on_face(at(1, 1, 1), Face::Right).unwrap(), Location::NW);
        assert_eq!(cube.location_on_face(at(-1, -1, -1), Face::Back).unwrap(), Location::SE);
        assert_eq!(cube.location_on_face(at(0, -1, 1), Face::Down).unwrap(), Location::N);
        assert_eq!(cube.location_on_face(at(-1, 0, 1), Face::Left).unwrap(), Location::E);
        assert!(matches!(
            cube.location_on_face(at(0, 1, 1), Face::Down),
            Err(CubeError::NotOnFace { .. })
        ));
    }

    #[test]
    fn test_solved_cube_is_fully_correct() {
        let cube = Cube::solved();
        for cubelet in cube.cubelets() {
            assert!(cube.is_fully_correct(cubelet).unwrap());
            assert!(cube.is_at_correct_position(cubelet).unwrap());
        }
    }

    #[test]
    fn test_single_turn_breaks_only_its_face() {
        let mut executor = executor();
        executor.perform("R").unwrap();
        let cube = executor.cube();
        let right = cube.slice(SliceName::Face(Face::Right)).unwrap();

        for (index, cubelet) in cube.cubelets().iter().enumerate() {
            let correct = cube.is_fully_correct(cubelet).unwrap();
            if !right.contains(index) || index == right.center {
                assert!(correct, "cubelet from {} should be correct", cubelet.origin());
            } else {
                assert!(!correct, "cubelet from {} should be displaced", cubelet.origin());
            }
        }
    }

    #[test]
    fn test_correct_position_ignores_orientation() {
        let mut executor = executor();
        // two sexy moves leave four corners twisted in their own slots
        executor.perform("R U R' U' R U R' U'").unwrap();
        let cube = executor.cube();
        let twisted: Vec<&Cubelet> = cube
            .cubelets()
            .iter()
            .filter(|cubelet| cubelet.kind() == CubeletKind::Corner)
            .filter(|cubelet| !cube.is_fully_correct(cubelet).unwrap())
            .collect();
        assert_eq!(twisted.len(), 4);
        for cubelet in twisted {
            assert!(cube.is_at_correct_position(cubelet).unwrap());
        }
    }

    #[test]
    fn test_solved_net_snapshot() {
        let cube = Cube::solved();
        insta::assert_snapshot!(cube.format_net().unwrap(), @r"
            WWW
            WWW
            WWW
        GGG RRR BBB OOO
        GGG RRR BBB OOO
        GGG RRR BBB OOO
            YYY
            YYY
            YYY
        ");
    }

    #[test]
    fn test_net_after_right_turn() {
        let mut executor = executor();
        executor.perform("R").unwrap();
        insta::assert_snapshot!(executor.cube().format_net().unwrap(), @r"
            WWR
            WWR
            WWR
        GGG RRY BBB WOO
        GGG RRY BBB WOO
        GGG RRY BBB WOO
            YYO
            YYO
            YYO
        ");
    }
}
