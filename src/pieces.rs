//! Cubelet definitions and the canonical 27-piece assembly.
//!
//! Each cubelet keeps its canonical grid position as identity and carries one
//! optional sticker per local face. Stickers are fixed at construction; turns
//! only change the cubelet's [`Transform`].

use std::fmt;

use glam::{DMat4, DVec3, IVec3};

use crate::geometry::Face;
use crate::transform::Transform;

/// Index of a cubelet within [`Cube::cubelets`]. Stable for the cube's lifetime.
pub type CubeletIndex = usize;

/// Sticker colors. An uncolored (black) local face has no sticker at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    White,
    Red,
    Green,
    Yellow,
    Orange,
    Blue,
}

impl Color {
    pub const ALL: [Color; 6] = [
        Color::White,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Orange,
        Color::Blue,
    ];

    /// Single-letter code used by the text net.
    pub const fn letter(self) -> char {
        match self {
            Color::White => 'W',
            Color::Red => 'R',
            Color::Green => 'G',
            Color::Yellow => 'Y',
            Color::Orange => 'O',
            Color::Blue => 'B',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::White => "white",
            Color::Red => "red",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Orange => "orange",
            Color::Blue => "blue",
        };
        f.write_str(name)
    }
}

/// Sticker color of each face in the solved reference state.
pub const fn canonical_color(face: Face) -> Color {
    match face {
        Face::Up => Color::White,
        Face::Front => Color::Red,
        Face::Left => Color::Green,
        Face::Down => Color::Yellow,
        Face::Back => Color::Orange,
        Face::Right => Color::Blue,
    }
}

/// What role a cubelet plays, derived from its sticker count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CubeletKind {
    /// The hidden `(0, 0, 0)` piece with no stickers.
    Core,
    Center,
    Edge,
    Corner,
}

/// One of the 27 small cubes.
#[derive(Clone, Debug)]
pub struct Cubelet {
    origin: IVec3,
    /// Sticker per local face, indexed by [`Face::index`].
    stickers: [Option<Color>; 6],
    transform: Transform,
}

impl Cubelet {
    pub fn new(origin: IVec3, stickers: [Option<Color>; 6]) -> Self {
        Self {
            origin,
            stickers,
            transform: Transform::IDENTITY,
        }
    }

    /// Canonical grid position at creation. Never changes.
    #[inline]
    pub fn origin(&self) -> IVec3 {
        self.origin
    }

    pub fn kind(&self) -> CubeletKind {
        match self.colors().count() {
            0 => CubeletKind::Core,
            1 => CubeletKind::Center,
            2 => CubeletKind::Edge,
            _ => CubeletKind::Corner,
        }
    }

    /// Sticker on the given local face, if any.
    #[inline]
    pub fn sticker(&self, local_face: Face) -> Option<Color> {
        self.stickers[local_face.index()]
    }

    /// Colored local faces with their sticker colors.
    pub fn stickers(&self) -> impl Iterator<Item = (Face, Color)> + '_ {
        Face::ALL
            .into_iter()
            .filter_map(|face| self.sticker(face).map(|color| (face, color)))
    }

    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        self.stickers.iter().flatten().copied()
    }

    pub fn has_color(&self, color: Color) -> bool {
        self.colors().any(|c| c == color)
    }

    #[inline]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Only the move executor turns cubelets.
    #[inline]
    pub(crate) fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Current center in world space.
    pub fn world_center(&self) -> DVec3 {
        self.transform.to_world(self.origin.as_dvec3())
    }

    /// Current world-space normal of a local face.
    pub fn world_normal(&self, local_face: Face) -> DVec3 {
        self.transform.to_world(local_face.normal().as_dvec3())
    }

    /// World-space normal of the sticker with the given color.
    pub fn sticker_normal(&self, color: Color) -> Option<DVec3> {
        self.stickers()
            .find(|&(_, c)| c == color)
            .map(|(face, _)| self.world_normal(face))
    }

    /// Model matrix for a renderer: unit cube at the origin moved to the
    /// canonical position, then carried by the accumulated rotation.
    pub fn model_matrix(&self) -> DMat4 {
        self.transform.local_to_world() * DMat4::from_translation(self.origin.as_dvec3())
    }
}

/// The assembled puzzle: exactly 27 cubelets, built once in the solved state.
#[derive(Clone, Debug)]
pub struct Cube {
    cubelets: Vec<Cubelet>,
}

impl Default for Cube {
    fn default() -> Self {
        Self::solved()
    }
}

impl Cube {
    pub const CUBELET_COUNT: usize = 27;

    /// Builds the reference solved cube.
    ///
    /// Cubelets are ordered by layer from bottom to top, then back to front,
    /// then left to right. Every outward-facing local face gets its face's
    /// canonical color, inward faces stay black.
    pub fn solved() -> Self {
        let mut cubelets = Vec::with_capacity(Self::CUBELET_COUNT);
        for y in -1..=1 {
            for z in -1..=1 {
                for x in -1..=1 {
                    let origin = IVec3::new(x, y, z);
                    let mut stickers = [None; 6];
                    for face in Face::ALL {
                        // outward when the position reaches the face's plane
                        if origin.dot(face.normal()) == 1 {
                            stickers[face.index()] = Some(canonical_color(face));
                        }
                    }
                    cubelets.push(Cubelet::new(origin, stickers));
                }
            }
        }
        Self { cubelets }
    }

    #[inline]
    pub fn cubelets(&self) -> &[Cubelet] {
        &self.cubelets
    }

    #[inline]
    pub(crate) fn cubelets_mut(&mut self) -> &mut [Cubelet] {
        &mut self.cubelets
    }

    /// Cubelet at an index obtained from this cube's own queries.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`Cube::CUBELET_COUNT`].
    #[inline]
    pub fn cubelet(&self, index: CubeletIndex) -> &Cubelet {
        &self.cubelets[index]
    }

    /// Indices of all cubelets matching a predicate.
    pub fn indices_where(&self, mut predicate: impl FnMut(&Cubelet) -> bool) -> Vec<CubeletIndex> {
        self.cubelets
            .iter()
            .enumerate()
            .filter(|(_, cubelet)| predicate(cubelet))
            .map(|(index, _)| index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashSet;

    use super::*;

    #[test]
    fn test_assembly_kind_counts() {
        let cube = Cube::solved();
        assert_eq!(cube.cubelets().len(), Cube::CUBELET_COUNT);

        let count = |kind| {
            cube.cubelets()
                .iter()
                .filter(|cubelet| cubelet.kind() == kind)
                .count()
        };
        assert_eq!(count(CubeletKind::Core), 1);
        assert_eq!(count(CubeletKind::Center), 6);
        assert_eq!(count(CubeletKind::Edge), 12);
        assert_eq!(count(CubeletKind::Corner), 8);
    }

    #[test]
    fn test_origins_are_unique_grid_positions() {
        let cube = Cube::solved();
        let origins: FxHashSet<IVec3> = cube.cubelets().iter().map(Cubelet::origin).collect();
        assert_eq!(origins.len(), 27);
        assert!(origins
            .iter()
            .all(|o| o.abs().max_element() <= 1));
    }

    #[test]
    fn test_core_is_colorless() {
        let cube = Cube::solved();
        let core = cube
            .cubelets()
            .iter()
            .find(|cubelet| cubelet.origin() == IVec3::ZERO)
            .unwrap();
        assert_eq!(core.kind(), CubeletKind::Core);
        assert_eq!(core.colors().count(), 0);
    }

    #[test]
    fn test_each_color_has_one_center() {
        let cube = Cube::solved();
        for color in Color::ALL {
            let centers = cube.indices_where(|cubelet| {
                cubelet.kind() == CubeletKind::Center && cubelet.has_color(color)
            });
            assert_eq!(centers.len(), 1, "{color}");
        }
    }

    #[test]
    fn test_stickers_point_outward() {
        let cube = Cube::solved();
        for cubelet in cube.cubelets() {
            for (face, color) in cubelet.stickers() {
                assert_eq!(color, canonical_color(face));
                let normal = cubelet.sticker_normal(color).unwrap();
                assert_eq!(normal, face.normal().as_dvec3());
                assert_eq!(cubelet.world_center().dot(normal), 1.0);
            }
        }
    }

    #[test]
    #[should_panic]
    fn test_cubelet_index_out_of_range_panics() {
        let cube = Cube::solved();
        cube.cubelet(Cube::CUBELET_COUNT);
    }

    #[test]
    fn test_model_matrix_places_cubelet() {
        let cube = Cube::solved();
        let corner = cube.cubelet(cube.cubelets().len() - 1);
        assert_eq!(corner.origin(), IVec3::ONE);
        let center = corner.model_matrix().transform_point3(DVec3::ZERO);
        assert_eq!(center, DVec3::ONE);
    }
}
