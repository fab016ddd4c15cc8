//! Rubik's Cube Model and Solver Library
//!
//! Models a 3x3x3 cube as 27 rigid cubelets, answers geometric questions about
//! where each one sits, executes animated slice turns and solves the cube
//! layer by layer.

pub mod error;
pub mod executor;
pub mod geometry;
pub mod grid;
pub mod notation;
pub mod pieces;
pub mod solver;
pub mod transform;

pub use error::{CubeError, ParseDirectiveError};
pub use executor::{AnimationConfig, MoveExecutor};
pub use notation::{Direction, Directive};
pub use pieces::{Color, Cube, Cubelet};
pub use solver::{scramble, SolveReport, Solver, SolverConfig};

/// Something that draws the cube after each animation increment.
///
/// The executor calls this with the full cubelet list; implementations read
/// each cubelet's transform and never mutate it.
pub trait Renderer {
    fn render(&mut self, cubelets: &[Cubelet]);
}

impl<F: FnMut(&[Cubelet])> Renderer for F {
    fn render(&mut self, cubelets: &[Cubelet]) {
        self(cubelets)
    }
}

/// Renderer that draws nothing, for tests and batch solving.
#[derive(Clone, Copy, Debug, Default)]
pub struct Headless;

impl Renderer for Headless {
    fn render(&mut self, _cubelets: &[Cubelet]) {}
}
