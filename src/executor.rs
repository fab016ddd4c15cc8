//! Serialized, animated slice rotations.
//!
//! The executor is the only owner allowed to mutate cubelet transforms. A
//! rotation is applied as a series of fractional increments spread over
//! [`AnimationConfig::duration`], with the renderer invoked after each one.
//! Exactly one rotation may be in flight: requests arriving while a rotation
//! animates are dropped, not queued.

use std::time::Duration;

use glam::DVec3;

use crate::error::CubeError;
use crate::geometry::{Face, SliceName};
use crate::notation::{self, Direction, Directive};
use crate::pieces::{Cube, CubeletIndex};
use crate::Renderer;

/// Time slicing of a single quarter turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationConfig {
    /// Wall time a quarter turn takes.
    pub duration: Duration,
    /// Time step the blocking API advances by between renders.
    pub frame_interval: Duration,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(300),
            frame_interval: Duration::from_millis(16),
        }
    }
}

impl AnimationConfig {
    /// Applies each quarter turn in a single increment.
    pub const fn instant() -> Self {
        Self {
            duration: Duration::ZERO,
            frame_interval: Duration::from_millis(16),
        }
    }

    /// Number of increments the blocking API applies per quarter turn.
    pub fn increments(&self) -> u32 {
        if self.duration.is_zero() || self.frame_interval.is_zero() {
            return 1;
        }
        let frames = self.duration.as_nanos().div_ceil(self.frame_interval.as_nanos());
        u32::try_from(frames).unwrap_or(u32::MAX).max(1)
    }
}

/// A rotation currently being applied.
#[derive(Clone, Debug)]
struct ActiveRotation {
    directive: Directive,
    members: Vec<CubeletIndex>,
    axis: DVec3,
    /// Signed quarter-turn angle.
    target: f64,
    /// Angle applied so far.
    applied: f64,
    elapsed: Duration,
}

#[derive(Clone, Debug)]
enum AnimationState {
    Idle,
    Animating(ActiveRotation),
}

/// Whole-cube turns that bring a face to the front.
///
/// Each entry turns both outer layers and the mid-layer between them the
/// same way, so relative cube state is untouched.
pub const fn face_to_front_recipe(face: Face) -> &'static str {
    match face {
        Face::Front => "",
        Face::Back => "U MUD D' U MUD D'",
        Face::Right => "U MUD D'",
        Face::Left => "U' MUD' D",
        Face::Up => "R' MRL' L",
        Face::Down => "R MRL L'",
    }
}

/// Whole-cube turns that bring a face to the top.
pub const fn face_to_up_recipe(face: Face) -> &'static str {
    match face {
        Face::Up => "",
        Face::Down => "L' MRL R L' MRL R",
        Face::Front => "L' MRL R",
        Face::Back => "L MRL' R'",
        Face::Right => "F' MFB' B",
        Face::Left => "F MFB B'",
    }
}

/// Parses notation and drives slice rotations against an owned [`Cube`].
pub struct MoveExecutor<R> {
    cube: Cube,
    renderer: R,
    config: AnimationConfig,
    state: AnimationState,
    history: Vec<Directive>,
}

impl<R: Renderer> MoveExecutor<R> {
    pub fn new(cube: Cube, renderer: R, config: AnimationConfig) -> Self {
        Self {
            cube,
            renderer,
            config,
            state: AnimationState::Idle,
            history: Vec::new(),
        }
    }

    /// Read-only view for queries. Mid-animation it reflects the last increment.
    #[inline]
    pub fn cube(&self) -> &Cube {
        &self.cube
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn config(&self) -> AnimationConfig {
        self.config
    }

    pub fn set_config(&mut self, config: AnimationConfig) {
        self.config = config;
    }

    /// Every completed directive, oldest first.
    pub fn history(&self) -> &[Directive] {
        &self.history
    }

    pub fn into_parts(self) -> (Cube, R) {
        (self.cube, self.renderer)
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        matches!(self.state, AnimationState::Animating(_))
    }

    /// Renders the current state without moving anything.
    pub fn render(&mut self) {
        self.renderer.render(self.cube.cubelets());
    }

    /// Executes a space-separated sequence, one directive at a time.
    ///
    /// The whole sequence is parsed before the first turn, so a bad token
    /// leaves the cube untouched.
    pub fn perform(&mut self, notation: &str) -> Result<(), CubeError> {
        let directives = notation::parse_sequence(notation)?;
        self.perform_all(&directives)
    }

    /// Executes an explicit token list.
    pub fn perform_tokens<'a>(&mut self, tokens: impl IntoIterator<Item = &'a str>) -> Result<(), CubeError> {
        let directives = notation::parse_tokens(tokens)?;
        self.perform_all(&directives)
    }

    pub fn perform_all(&mut self, directives: &[Directive]) -> Result<(), CubeError> {
        for &directive in directives {
            self.rotate_slice(directive.slice, directive.direction)?;
        }
        Ok(())
    }

    /// Rotates one slice a quarter turn and returns once it has fully landed.
    ///
    /// Returns `Ok(false)` without touching the cube if another rotation is
    /// still animating.
    pub fn rotate_slice(&mut self, slice: SliceName, direction: Direction) -> Result<bool, CubeError> {
        if !self.begin_rotation(Directive::new(slice, direction))? {
            return Ok(false);
        }
        let increments = self.config.increments();
        let step = self.config.duration / increments;
        for _ in 1..increments {
            self.advance(step);
        }
        // the last increment absorbs whatever the step division rounded off
        while self.is_animating() {
            self.advance(self.config.duration);
        }
        Ok(true)
    }

    /// Starts a rotation without waiting for it.
    ///
    /// Slice membership is resolved now and held until the rotation lands.
    /// Returns `Ok(false)` if a rotation is already in flight; the request is
    /// dropped.
    pub fn begin_rotation(&mut self, directive: Directive) -> Result<bool, CubeError> {
        if let AnimationState::Animating(active) = &self.state {
            log::debug!(
                "dropping {directive} while {} is still animating",
                active.directive
            );
            return Ok(false);
        }

        let slice = self.cube.slice(directive.slice)?;
        log::trace!("rotating {directive} ({} cubelets)", slice.members.len());
        self.state = AnimationState::Animating(ActiveRotation {
            directive,
            members: slice.members,
            axis: directive.slice.axis().as_dvec3(),
            target: directive.direction.quarter_turn(),
            applied: 0.0,
            elapsed: Duration::ZERO,
        });
        Ok(true)
    }

    /// Advances the in-flight rotation by `dt` and renders.
    ///
    /// Returns `true` when this call landed the rotation. Does nothing while
    /// idle.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let AnimationState::Animating(active) = &mut self.state else {
            return false;
        };

        active.elapsed += dt;
        let progress = if self.config.duration.is_zero() {
            1.0
        } else {
            (active.elapsed.as_secs_f64() / self.config.duration.as_secs_f64()).min(1.0)
        };
        let finished = progress >= 1.0;
        // the final increment lands exactly on the target angle
        let wanted = if finished {
            active.target
        } else {
            active.target * progress
        };
        let increment = wanted - active.applied;
        active.applied = wanted;

        let cubelets = self.cube.cubelets_mut();
        for &index in &active.members {
            cubelets[index].transform_mut().rotate(active.axis, increment);
        }

        if finished {
            self.history.push(active.directive);
            self.state = AnimationState::Idle;
        }
        self.renderer.render(self.cube.cubelets());
        finished
    }

    /// Turns the whole cube so `face` ends up in front.
    pub fn rotate_face_to_front(&mut self, face: Face) -> Result<(), CubeError> {
        self.perform(face_to_front_recipe(face))
    }

    /// Turns the whole cube so `face` ends up on top.
    pub fn rotate_face_to_up(&mut self, face: Face) -> Result<(), CubeError> {
        self.perform(face_to_up_recipe(face))
    }
}
