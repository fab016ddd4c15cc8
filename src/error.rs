//! Error types.
//!
//! Apart from parsing, every variant reports a broken invariant: corrupted
//! geometry or a solver defect. Callers propagate them and never retry.

use glam::IVec3;
use thiserror::Error;

use crate::geometry::{Face, SliceName};
use crate::pieces::Color;
use crate::solver::Phase;

/// Error produced when parsing move notation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseDirectiveError {
    /// Empty move token
    #[error("empty move token")]
    Empty,
    /// Token is not a known slice code with an optional `'`
    #[error("unknown move token `{0}`")]
    UnknownToken(String),
}

/// Error produced by cube queries, moves and the solver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CubeError {
    #[error(transparent)]
    Parse(#[from] ParseDirectiveError),
    #[error("no cubelet sits at the center of slice {0}")]
    MissingSliceCenter(SliceName),
    #[error("no center cubelet shows {0}")]
    MissingColorCenter(Color),
    #[error("no face points along {0:?}")]
    MissingFaceForNormal([f64; 3]),
    #[error("cubelet from {position} has no compass location on the {face} face")]
    MissingLocation { position: IVec3, face: Face },
    #[error("cubelet from {position} is not on the {face} face")]
    NotOnFace { position: IVec3, face: Face },
    #[error("cubelet from {position} lies on no side face")]
    MissingSideFace { position: IVec3 },
    #[error("cubelet from {position} has no sticker besides {color}")]
    MissingSecondColor { position: IVec3, color: Color },
    #[error("no entry for the {face} face in the {table} table")]
    MissingRecipe { table: &'static str, face: Face },
    #[error("{phase} did not converge within {limit} iterations")]
    IterationLimit { phase: Phase, limit: usize },
}
