//! Layer-by-layer solver.
//!
//! The solver never touches transforms itself. Every phase is a bounded loop
//! that reads the cube through the query engine, picks one batch of moves and
//! hands it to the [`MoveExecutor`]. Running past a loop's cap means detection
//! and cube state disagree, which is reported as [`CubeError::IterationLimit`].
//!
//! Phases, in order:
//! - normalize the light color up and the primary color front
//! - first-layer cross
//! - first-layer corners
//! - flip the cube so the last layer is on top
//! - middle layer
//! - last-layer cross, edge permutation, corner permutation and corner orientation

use std::fmt;

use rand::Rng;

use crate::error::CubeError;
use crate::executor::MoveExecutor;
use crate::geometry::{approx_eq_vec, Face, Location, SliceName};
use crate::notation::{self, format_sequence, Directive};
use crate::pieces::{Color, Cube, Cubelet, CubeletIndex, CubeletKind};
use crate::Renderer;

/// Number of random face turns in a scramble.
pub const SCRAMBLE_LENGTH: usize = 20;

const CROSS_LIMIT: usize = 12;
const CORNERS_LIMIT: usize = 16;
const SECOND_LAYER_LIMIT: usize = 12;
const LAST_LAYER_CROSS_LIMIT: usize = 8;
const LAST_LAYER_EDGES_LIMIT: usize = 6;
const LAST_LAYER_CORNERS_LIMIT: usize = 6;
/// Quarter turns needed to bring any layer position around once.
const ALIGN_LIMIT: usize = 4;
/// `R' D' R D` has order six.
const CORNER_TWIST_LIMIT: usize = 6;

const CORNER_INSERT: &str = "R' D' R D";
const EDGE_INSERT_RIGHT: &str = "U R U' R' U' F' U F";
const EDGE_INSERT_LEFT: &str = "U' L' U L U F U' F'";
const LAST_LAYER_CROSS: &str = "F R U R' U' F'";
const LAST_LAYER_EDGE_SWAP: &str = "R U R' U R U U R' U";
const LAST_LAYER_CORNER_CYCLE: &str = "U R U' L' U R' U' L";

/// Solver phases, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Normalize,
    Cross,
    FirstLayerCorners,
    /// Turns the last-layer color up for the remaining phases.
    Flip,
    SecondLayer,
    LastLayerCross,
    LastLayerEdges,
    LastLayerCorners,
    LastLayerCornerOrientation,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Normalize => "normalize",
            Phase::Cross => "cross",
            Phase::FirstLayerCorners => "first-layer corners",
            Phase::Flip => "flip",
            Phase::SecondLayer => "second layer",
            Phase::LastLayerCross => "last-layer cross",
            Phase::LastLayerEdges => "last-layer edges",
            Phase::LastLayerCorners => "last-layer corners",
            Phase::LastLayerCornerOrientation => "last-layer corner orientation",
        };
        f.pad(name)
    }
}

/// Reference colors the solver orients the cube by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    /// Solved first, kept on the up face during the first layer.
    pub light: Color,
    /// Faces front while the first layer is built.
    pub primary: Color,
    /// Turned up for the remaining layers. Must be opposite `light`.
    pub last_layer: Color,
    /// Faces front while the last layers are built.
    pub last_layer_front: Color,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            light: Color::White,
            primary: Color::Red,
            last_layer: Color::Yellow,
            last_layer_front: Color::Orange,
        }
    }
}

/// Work done by one phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseStats {
    pub phase: Phase,
    /// Loop iterations that issued moves.
    pub iterations: usize,
    pub moves: usize,
}

/// Outcome of a successful [`Solver::solve`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SolveReport {
    pub phases: Vec<PhaseStats>,
    /// Every directive the solve executed, in order.
    pub moves: Vec<Directive>,
}

impl SolveReport {
    pub fn move_count(&self) -> usize {
        self.moves.len()
    }
}

impl fmt::Display for SolveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stats in &self.phases {
            writeln!(
                f,
                "{:<30} {:>3} moves in {} iterations",
                stats.phase, stats.moves, stats.iterations
            )?;
        }
        writeln!(f, "{} moves total", self.moves.len())?;
        write!(f, "{}", format_sequence(&self.moves))
    }
}

/// Outcome of a single phase step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Done,
    Moved,
}

/// Shape of the last-layer color on the up face, edges only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CrossPattern {
    Dot,
    Line { horizontal: bool },
    Triangle { back_left: bool },
    Cross,
}

impl CrossPattern {
    fn classify(locations: &[Location]) -> Self {
        let has = |location| locations.contains(&location);
        match locations.len() {
            4 => CrossPattern::Cross,
            0 => CrossPattern::Dot,
            2 if has(Location::W) && has(Location::E) => CrossPattern::Line { horizontal: true },
            2 if has(Location::N) && has(Location::S) => CrossPattern::Line { horizontal: false },
            _ => CrossPattern::Triangle {
                back_left: locations.len() == 2 && has(Location::N) && has(Location::W),
            },
        }
    }
}

/// Solves the cube owned by a [`MoveExecutor`].
pub struct Solver<'a, R> {
    executor: &'a mut MoveExecutor<R>,
    config: SolverConfig,
    phases: Vec<PhaseStats>,
}

impl<'a, R: Renderer> Solver<'a, R> {
    pub fn new(executor: &'a mut MoveExecutor<R>) -> Self {
        Self::with_config(executor, SolverConfig::default())
    }

    pub fn with_config(executor: &'a mut MoveExecutor<R>, config: SolverConfig) -> Self {
        Self {
            executor,
            config,
            phases: Vec::new(),
        }
    }

    fn cube(&self) -> &Cube {
        self.executor.cube()
    }

    /// Runs every phase until the cube is solved.
    pub fn solve(&mut self) -> Result<SolveReport, CubeError> {
        log::info!("solving");
        self.phases.clear();
        let start = self.executor.history().len();

        let (light, primary) = (self.config.light, self.config.primary);
        self.run_phase(Phase::Normalize, 1, |solver| {
            solver.normalize(light, primary)?;
            Ok(Step::Done)
        })?;
        self.run_phase(Phase::Cross, CROSS_LIMIT, Self::cross_step)?;
        self.run_phase(Phase::FirstLayerCorners, CORNERS_LIMIT, Self::first_layer_corner_step)?;

        let (last_layer, front) = (self.config.last_layer, self.config.last_layer_front);
        self.run_phase(Phase::Flip, 1, |solver| {
            solver.normalize(last_layer, front)?;
            Ok(Step::Done)
        })?;
        self.run_phase(Phase::SecondLayer, SECOND_LAYER_LIMIT, Self::second_layer_step)?;
        self.run_phase(Phase::LastLayerCross, LAST_LAYER_CROSS_LIMIT, Self::last_layer_cross_step)?;
        self.run_phase(Phase::LastLayerEdges, LAST_LAYER_EDGES_LIMIT, Self::last_layer_edges_step)?;
        self.run_phase(
            Phase::LastLayerCorners,
            LAST_LAYER_CORNERS_LIMIT,
            Self::last_layer_corners_step,
        )?;
        self.run_phase(Phase::LastLayerCornerOrientation, 1, |solver| {
            solver.orient_last_layer_corners()?;
            Ok(Step::Done)
        })?;

        let report = SolveReport {
            phases: std::mem::take(&mut self.phases),
            moves: self.executor.history()[start..].to_vec(),
        };
        log::info!("solved in {} moves", report.move_count());
        Ok(report)
    }

    /// Repeats `step` until it reports [`Step::Done`], failing after `limit`
    /// iterations that moved.
    fn run_phase(
        &mut self,
        phase: Phase,
        limit: usize,
        mut step: impl FnMut(&mut Self) -> Result<Step, CubeError>,
    ) -> Result<(), CubeError> {
        log::debug!("entering {phase}");
        let start = self.executor.history().len();
        let mut iterations = 0;
        while step(self)? == Step::Moved {
            iterations += 1;
            if iterations > limit {
                return Err(CubeError::IterationLimit { phase, limit });
            }
        }
        let moves = self.executor.history().len() - start;
        log::debug!("{phase} done: {iterations} iterations, {moves} moves");
        self.phases.push(PhaseStats {
            phase,
            iterations,
            moves,
        });
        Ok(())
    }

    /// Applies `moves` until `done` holds, at most `limit` times.
    fn repeat_until(
        &mut self,
        phase: Phase,
        moves: &[Directive],
        limit: usize,
        mut done: impl FnMut(&Cube) -> Result<bool, CubeError>,
    ) -> Result<(), CubeError> {
        for _ in 0..limit {
            if done(self.cube())? {
                return Ok(());
            }
            self.executor.perform_all(moves)?;
        }
        if done(self.cube())? {
            Ok(())
        } else {
            Err(CubeError::IterationLimit { phase, limit })
        }
    }

    fn perform_relative(&mut self, algorithm: &str, front: Face) -> Result<(), CubeError> {
        let moves = notation::relative_sequence(algorithm, front)?;
        log::trace!("{algorithm} from {front}: {}", format_sequence(&moves));
        self.executor.perform_all(&moves)
    }

    fn turn(&mut self, face: Face) -> Result<(), CubeError> {
        self.executor.perform_all(&[Directive::clockwise(SliceName::Face(face))])
    }

    /// Turns the whole cube so `up` faces up and `front` faces front.
    pub fn normalize(&mut self, up: Color, front: Color) -> Result<(), CubeError> {
        let face = self.cube().face_of_color(up)?;
        log::debug!("turning {face} up");
        self.executor.rotate_face_to_up(face)?;

        let face = self.cube().face_of_color(front)?;
        if matches!(face, Face::Up | Face::Down) {
            return Err(CubeError::MissingRecipe {
                table: "face-to-front",
                face,
            });
        }
        log::debug!("turning {face} front");
        self.executor.rotate_face_to_front(face)
    }

    /// First unsolved cubelet of `kind` matching `filter`.
    fn first_unsolved(
        &self,
        kind: CubeletKind,
        mut filter: impl FnMut(&Cube, CubeletIndex) -> bool,
    ) -> Result<Option<CubeletIndex>, CubeError> {
        let cube = self.cube();
        for (index, cubelet) in cube.cubelets().iter().enumerate() {
            if cubelet.kind() == kind && filter(cube, index) && !cube.is_fully_correct(cubelet)? {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    fn cross_step(&mut self) -> Result<Step, CubeError> {
        let light = self.config.light;
        let Some(index) = self.first_unsolved(CubeletKind::Edge, |cube, index| {
            cube.cubelet(index).has_color(light)
        })?
        else {
            return Ok(Step::Done);
        };

        let cube = self.cube();
        let edge = cube.cubelet(index);
        let position = edge.origin();
        let side = first_side_face(cube, edge)?;

        if cube.is_on_face(edge, Face::Up) {
            // drop it to the bottom layer
            self.turn(side)?;
            self.turn(side)?;
            return Ok(Step::Moved);
        }

        if !cube.is_on_face(edge, Face::Down) {
            let algorithm = match cube.location_on_face(edge, side)? {
                Location::E => "F D F'",
                Location::W => "F' D F",
                _ => return Err(CubeError::MissingLocation { position, face: side }),
            };
            self.perform_relative(algorithm, side)?;
            return Ok(Step::Moved);
        }

        let other = other_color(edge, light)?;
        let target = cube.face_of_color(other)?;
        let down = [Directive::clockwise(SliceName::Face(Face::Down))];
        self.repeat_until(Phase::Cross, &down, ALIGN_LIMIT, |cube| {
            Ok(cube.is_on_face(cube.cubelet(index), target))
        })?;

        let edge = self.cube().cubelet(index);
        let facing_down = edge
            .sticker_normal(light)
            .is_some_and(|normal| approx_eq_vec(normal, Face::Down.normal().as_dvec3()));
        let algorithm = if facing_down { "F F" } else { "D R F' R'" };
        self.perform_relative(algorithm, target)?;
        Ok(Step::Moved)
    }

    fn first_layer_corner_step(&mut self) -> Result<Step, CubeError> {
        let light = self.config.light;
        let Some(index) = self.first_unsolved(CubeletKind::Corner, |cube, index| {
            cube.cubelet(index).has_color(light)
        })?
        else {
            return Ok(Step::Done);
        };

        let cube = self.cube();
        let corner = cube.cubelet(index);
        if cube.is_on_face(corner, Face::Up) {
            // wrong slot or twisted: push it down first
            let front = corner_front(corner.origin(), &cube.side_faces_of(corner))?;
            self.perform_relative(CORNER_INSERT, front)?;
            return Ok(Step::Moved);
        }

        let targets = corner
            .colors()
            .filter(|&color| color != light)
            .map(|color| cube.face_of_color(color))
            .collect::<Result<Vec<Face>, CubeError>>()?;
        let down = [Directive::clockwise(SliceName::Face(Face::Down))];
        self.repeat_until(Phase::FirstLayerCorners, &down, ALIGN_LIMIT, |cube| {
            let corner = cube.cubelet(index);
            Ok(targets.iter().all(|&face| cube.is_on_face(corner, face)))
        })?;

        let front = corner_front(self.cube().cubelet(index).origin(), &targets)?;
        let moves = notation::relative_sequence(CORNER_INSERT, front)?;
        self.repeat_until(Phase::FirstLayerCorners, &moves, CORNER_TWIST_LIMIT, |cube| {
            cube.is_fully_correct(cube.cubelet(index))
        })?;
        Ok(Step::Moved)
    }

    fn second_layer_step(&mut self) -> Result<Step, CubeError> {
        let cube = self.cube();
        let up_color = cube.color_at_face(Face::Up)?;
        let down_color = cube.color_at_face(Face::Down)?;
        let middle = |cube: &Cube, index| {
            let edge = cube.cubelet(index);
            !edge.has_color(up_color) && !edge.has_color(down_color)
        };

        let mut unsolved = Vec::new();
        for (index, cubelet) in cube.cubelets().iter().enumerate() {
            if cubelet.kind() == CubeletKind::Edge && middle(cube, index) && !cube.is_fully_correct(cubelet)? {
                unsolved.push(index);
            }
        }
        let Some(&first) = unsolved.first() else {
            return Ok(Step::Done);
        };

        let on_top = unsolved
            .iter()
            .copied()
            .find(|&index| cube.is_on_face(cube.cubelet(index), Face::Up));

        let Some(index) = on_top else {
            // every unsolved middle edge is stuck in the middle layer
            let edge = cube.cubelet(first);
            let position = edge.origin();
            let side = first_side_face(cube, edge)?;
            let algorithm = match cube.location_on_face(edge, side)? {
                Location::E => EDGE_INSERT_RIGHT,
                Location::W => EDGE_INSERT_LEFT,
                _ => return Err(CubeError::MissingLocation { position, face: side }),
            };
            self.perform_relative(algorithm, side)?;
            return Ok(Step::Moved);
        };

        let edge = cube.cubelet(index);
        let up_normal = Face::Up.normal().as_dvec3();
        let (mut top, mut side) = (None, None);
        for (local, color) in edge.stickers() {
            if approx_eq_vec(edge.world_normal(local), up_normal) {
                top = Some(color);
            } else {
                side = Some(color);
            }
        }
        let position = edge.origin();
        let (Some(top), Some(side)) = (top, side) else {
            return Err(CubeError::MissingLocation {
                position,
                face: Face::Up,
            });
        };

        let target = cube.face_of_color(side)?;
        let destination = cube.face_of_color(top)?;
        let up = [Directive::clockwise(SliceName::Face(Face::Up))];
        self.repeat_until(Phase::SecondLayer, &up, ALIGN_LIMIT, |cube| {
            Ok(cube.is_on_face(cube.cubelet(index), target))
        })?;

        let algorithm = if target.right_neighbor() == Some(destination) {
            EDGE_INSERT_RIGHT
        } else if target.left_neighbor() == Some(destination) {
            EDGE_INSERT_LEFT
        } else {
            return Err(CubeError::MissingRecipe {
                table: "second-layer",
                face: target,
            });
        };
        self.perform_relative(algorithm, target)?;
        Ok(Step::Moved)
    }

    /// Indices of edges currently in the up layer.
    fn top_edges(&self) -> Vec<CubeletIndex> {
        let cube = self.cube();
        cube.indices_where(|cubelet| {
            cubelet.kind() == CubeletKind::Edge && cube.is_on_face(cubelet, Face::Up)
        })
    }

    fn last_layer_cross_step(&mut self) -> Result<Step, CubeError> {
        let cube = self.cube();
        let up_color = cube.color_at_face(Face::Up)?;
        let mut locations = Vec::with_capacity(4);
        for index in self.top_edges() {
            let edge = cube.cubelet(index);
            if cube.is_sticker_facing_correct(edge, up_color)? {
                locations.push(cube.location_on_face(edge, Face::Up)?);
            }
        }

        let pattern = CrossPattern::classify(&locations);
        log::trace!("last-layer pattern {pattern:?}");
        match pattern {
            CrossPattern::Cross => return Ok(Step::Done),
            CrossPattern::Line { horizontal: false } | CrossPattern::Triangle { back_left: false } => {
                self.turn(Face::Up)?
            }
            CrossPattern::Dot
            | CrossPattern::Line { horizontal: true }
            | CrossPattern::Triangle { back_left: true } => {
                self.perform_relative(LAST_LAYER_CROSS, Face::Front)?
            }
        }
        Ok(Step::Moved)
    }

    /// Side faces whose up-layer edge shows that face's color on the side.
    fn matching_top_edges(&self) -> Result<Vec<Face>, CubeError> {
        let cube = self.cube();
        let up_color = cube.color_at_face(Face::Up)?;
        let mut matched = Vec::with_capacity(4);
        for index in self.top_edges() {
            let edge = cube.cubelet(index);
            let Some(side) = edge.colors().find(|&color| color != up_color) else {
                continue;
            };
            if cube.is_sticker_facing_correct(edge, side)? {
                matched.extend(cube.side_faces_of(edge));
            }
        }
        Ok(matched)
    }

    fn last_layer_edges_step(&mut self) -> Result<Step, CubeError> {
        // at least two edges line up in some rotation of the layer
        let mut matched = self.matching_top_edges()?;
        for _ in 0..ALIGN_LIMIT {
            if matched.len() >= 2 {
                break;
            }
            self.turn(Face::Up)?;
            matched = self.matching_top_edges()?;
        }
        if matched.len() < 2 {
            return Err(CubeError::IterationLimit {
                phase: Phase::LastLayerEdges,
                limit: ALIGN_LIMIT,
            });
        }
        if matched.len() == 4 {
            return Ok(Step::Done);
        }

        let adjacent = matched
            .iter()
            .copied()
            .find(|&face| face.right_neighbor().is_some_and(|right| matched.contains(&right)));
        let front = match adjacent {
            Some(first) => first.left_neighbor().unwrap_or(Face::Front),
            None => Face::Front,
        };
        self.perform_relative(LAST_LAYER_EDGE_SWAP, front)?;
        Ok(Step::Moved)
    }

    fn last_layer_corners_step(&mut self) -> Result<Step, CubeError> {
        let cube = self.cube();
        let corners = cube.indices_where(|cubelet| {
            cubelet.kind() == CubeletKind::Corner && cube.is_on_face(cubelet, Face::Up)
        });
        let mut placed = Vec::with_capacity(4);
        for index in corners {
            let corner = cube.cubelet(index);
            if cube.is_at_correct_position(corner)? {
                placed.push(cube.location_on_face(corner, Face::Up)?);
            }
        }

        if placed.len() == 4 {
            return Ok(Step::Done);
        }
        // the cycle keeps the up-front-right slot fixed
        let front = match placed.first() {
            None | Some(Location::SE) => Face::Front,
            Some(Location::SW) => Face::Left,
            Some(Location::NW) => Face::Back,
            Some(Location::NE) => Face::Right,
            Some(_) => {
                return Err(CubeError::MissingRecipe {
                    table: "corner-cycle",
                    face: Face::Up,
                })
            }
        };
        self.perform_relative(LAST_LAYER_CORNER_CYCLE, front)?;
        Ok(Step::Moved)
    }

    /// Twists each up-layer corner in place, one slot at a time.
    ///
    /// The lower layers are scrambled between twists and restored once all
    /// four corners are done.
    fn orient_last_layer_corners(&mut self) -> Result<(), CubeError> {
        if self.cube().is_solved()? {
            return Ok(());
        }
        let phase = Phase::LastLayerCornerOrientation;
        let up_color = self.cube().color_at_face(Face::Up)?;
        let slot = Face::Up.normal() + Face::Front.normal() + Face::Right.normal();
        let twist = notation::parse_sequence(CORNER_INSERT)?;

        for _ in 0..4 {
            let index = self.cube().cubelet_at(slot).ok_or(CubeError::NotOnFace {
                position: slot,
                face: Face::Up,
            })?;
            self.repeat_until(phase, &twist, CORNER_TWIST_LIMIT, |cube| {
                cube.is_sticker_facing_correct(cube.cubelet(index), up_color)
            })?;
            self.turn(Face::Up)?;
        }

        let up = [Directive::clockwise(SliceName::Face(Face::Up))];
        self.repeat_until(phase, &up, ALIGN_LIMIT, Cube::is_solved)
    }
}

/// First of the front/right/back/left faces the cubelet lies on.
fn first_side_face(cube: &Cube, cubelet: &Cubelet) -> Result<Face, CubeError> {
    cube.side_faces_of(cubelet)
        .first()
        .copied()
        .ok_or(CubeError::MissingSideFace {
            position: cubelet.origin(),
        })
}

/// The edge sticker that is not `color`.
fn other_color(edge: &Cubelet, color: Color) -> Result<Color, CubeError> {
    edge.colors()
        .find(|&other| other != color)
        .ok_or(CubeError::MissingSecondColor {
            position: edge.origin(),
            color,
        })
}

/// The side of a corner to treat as front so the corner sits front-right.
fn corner_front(position: glam::IVec3, sides: &[Face]) -> Result<Face, CubeError> {
    match *sides {
        [a, b] if a.right_neighbor() == Some(b) => Ok(a),
        [a, b] if b.right_neighbor() == Some(a) => Ok(b),
        _ => Err(CubeError::MissingLocation {
            position,
            face: Face::Up,
        }),
    }
}

/// Applies [`SCRAMBLE_LENGTH`] random face turns, each reversed half the time.
pub fn scramble<R: Renderer>(
    executor: &mut MoveExecutor<R>,
    rng: &mut impl Rng,
) -> Result<Vec<Directive>, CubeError> {
    let moves: Vec<Directive> = (0..SCRAMBLE_LENGTH)
        .map(|_| {
            let face = Face::ALL[rng.random_range(0..Face::ALL.len())];
            let directive = Directive::clockwise(SliceName::Face(face));
            if rng.random_bool(0.5) {
                directive.inverse()
            } else {
                directive
            }
        })
        .collect();
    log::info!("scrambling: {}", format_sequence(&moves));
    executor.perform_all(&moves)?;
    Ok(moves)
}
