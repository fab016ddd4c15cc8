//! Move notation.
//!
//! A directive is a slice code (`U`, `D`, `F`, `B`, `L`, `R`, `MUD`, `MFB`,
//! `MRL`) with an optional trailing `'` for counterclockwise. Sequences are
//! space-separated.

use std::f64::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

use crate::error::{CubeError, ParseDirectiveError};
use crate::geometry::{Face, SliceName};

/// Turning direction, judged looking at the slice from the positive end of its axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Clockwise,
    Counterclockwise,
}

impl Direction {
    pub const fn reversed(self) -> Direction {
        match self {
            Direction::Clockwise => Direction::Counterclockwise,
            Direction::Counterclockwise => Direction::Clockwise,
        }
    }

    /// Signed quarter-turn angle about the slice axis (right-hand rule).
    pub const fn quarter_turn(self) -> f64 {
        match self {
            Direction::Clockwise => -FRAC_PI_2,
            Direction::Counterclockwise => FRAC_PI_2,
        }
    }
}

/// A single parsed move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Directive {
    pub slice: SliceName,
    pub direction: Direction,
}

impl Directive {
    pub const fn new(slice: SliceName, direction: Direction) -> Self {
        Self { slice, direction }
    }

    pub const fn clockwise(slice: SliceName) -> Self {
        Self::new(slice, Direction::Clockwise)
    }

    /// The directive that undoes this one.
    pub const fn inverse(self) -> Self {
        Self::new(self.slice, self.direction.reversed())
    }

    /// Reinterprets a directive written for the standard front face as if
    /// `front` were the front, keeping up on top.
    ///
    /// `F R B L` are carried around the vertical axis, `U D` are unchanged,
    /// and mid-layers follow the face they turn like.
    pub fn relative_to(self, front: Face) -> Result<Self, CubeError> {
        let missing = CubeError::MissingRecipe {
            table: "front-relative",
            face: front,
        };
        let map_face = |face: Face| -> Option<Face> {
            match face {
                Face::Front => Some(front),
                Face::Right => front.right_neighbor(),
                Face::Back => Some(front.opposite()),
                Face::Left => front.left_neighbor(),
                Face::Up | Face::Down => Some(face),
            }
        };

        // Up and Down have no horizontal neighbours to carry the belt onto
        if front.right_neighbor().is_none() {
            return Err(missing);
        }

        let directive = match self.slice {
            SliceName::Face(face) => {
                let face = map_face(face).ok_or(missing)?;
                Directive::new(SliceName::Face(face), self.direction)
            }
            middle => {
                // turning a mid-layer clockwise turns it like its leading face
                let leading = middle_leading_face(middle);
                let mapped = map_face(leading).ok_or(missing)?;
                let (slice, reversed) = SliceName::middle_parallel_to(mapped);
                let direction = if reversed {
                    self.direction.reversed()
                } else {
                    self.direction
                };
                Directive::new(slice, direction)
            }
        };
        Ok(directive)
    }
}

/// Face a mid-layer turns like when turned clockwise.
const fn middle_leading_face(middle: SliceName) -> Face {
    match middle {
        SliceName::Face(face) => face,
        SliceName::Horizontal => Face::Up,
        SliceName::Depth => Face::Front,
        SliceName::Vertical => Face::Right,
    }
}

impl FromStr for Directive {
    type Err = ParseDirectiveError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        if token.is_empty() {
            return Err(ParseDirectiveError::Empty);
        }
        let (code, direction) = match token.strip_suffix('\'') {
            Some(code) => (code, Direction::Counterclockwise),
            None => (token, Direction::Clockwise),
        };
        let slice = SliceName::from_code(code)
            .ok_or_else(|| ParseDirectiveError::UnknownToken(token.to_owned()))?;
        Ok(Directive::new(slice, direction))
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slice.code())?;
        if self.direction == Direction::Counterclockwise {
            f.write_str("'")?;
        }
        Ok(())
    }
}

/// Parses a space-separated sequence. Blank input is an empty sequence.
pub fn parse_sequence(notation: &str) -> Result<Vec<Directive>, ParseDirectiveError> {
    notation
        .split_whitespace()
        .map(str::parse::<Directive>)
        .collect()
}

/// Parses an explicit token list. Unlike [`parse_sequence`], an empty token
/// is an error rather than a separator.
pub fn parse_tokens<'a>(
    tokens: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<Directive>, ParseDirectiveError> {
    tokens
        .into_iter()
        .map(|token| token.trim().parse::<Directive>())
        .collect()
}

/// Parses an algorithm written for the standard front and re-targets it.
pub fn relative_sequence(notation: &str, front: Face) -> Result<Vec<Directive>, CubeError> {
    parse_sequence(notation)?
        .into_iter()
        .map(|directive| directive.relative_to(front))
        .collect()
}

pub fn format_sequence(directives: &[Directive]) -> String {
    directives
        .iter()
        .map(Directive::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_tokens() {
        assert_eq!(
            "U".parse::<Directive>().unwrap(),
            Directive::clockwise(SliceName::Face(Face::Up))
        );
        assert_eq!(
            "D'".parse::<Directive>().unwrap(),
            Directive::new(SliceName::Face(Face::Down), Direction::Counterclockwise)
        );
        assert_eq!(
            "MUD".parse::<Directive>().unwrap(),
            Directive::clockwise(SliceName::Horizontal)
        );
        assert_eq!(
            "MRL'".parse::<Directive>().unwrap(),
            Directive::new(SliceName::Vertical, Direction::Counterclockwise)
        );
    }

    #[test]
    fn test_unknown_tokens_are_rejected() {
        for token in ["X", "u", "U2", "''", "M", "U''", "'"] {
            assert_eq!(
                token.parse::<Directive>(),
                Err(ParseDirectiveError::UnknownToken(token.to_owned())),
                "{token}"
            );
        }
        assert_eq!(parse_tokens(["U", ""]), Err(ParseDirectiveError::Empty));
    }

    #[test]
    fn test_sequence_roundtrip() {
        let notation = "L' MRL R U MUD D' F MFB B'";
        let directives = parse_sequence(notation).unwrap();
        assert_eq!(directives.len(), 9);
        assert_eq!(format_sequence(&directives), notation);
        assert_eq!(parse_sequence("  U   R' ").unwrap().len(), 2);
        assert!(parse_sequence("").unwrap().is_empty());
    }

    #[test]
    fn test_token_list_matches_string() {
        assert_eq!(
            parse_tokens(["R", "U", "R'", "U'"]).unwrap(),
            parse_sequence("R U R' U'").unwrap()
        );
    }

    #[test]
    fn test_relative_to_front_is_identity() {
        let directives = parse_sequence("F R U B' L D' MUD MFB' MRL").unwrap();
        for directive in directives {
            assert_eq!(directive.relative_to(Face::Front).unwrap(), directive);
        }
    }

    #[test]
    fn test_relative_to_right() {
        assert_eq!(
            format_sequence(&relative_sequence("R' D' R D", Face::Right).unwrap()),
            "B' D' B D"
        );
        assert_eq!(
            format_sequence(&relative_sequence("F R U R' U' F'", Face::Left).unwrap()),
            "L F U F' U' L'"
        );
        // MFB turns like F, seen from the right that is MRL
        assert_eq!(
            format_sequence(&relative_sequence("MFB MRL", Face::Right).unwrap()),
            "MRL MFB'"
        );
        assert_eq!(
            format_sequence(&relative_sequence("MFB", Face::Back).unwrap()),
            "MFB'"
        );
    }

    #[test]
    fn test_relative_to_up_is_rejected() {
        assert!(matches!(
            relative_sequence("R", Face::Up),
            Err(CubeError::MissingRecipe { .. })
        ));
    }

    #[test]
    fn test_quarter_turn_signs() {
        assert_eq!(Direction::Clockwise.quarter_turn(), -FRAC_PI_2);
        assert_eq!(
            Direction::Counterclockwise.quarter_turn(),
            -Direction::Clockwise.quarter_turn()
        );
    }
}
