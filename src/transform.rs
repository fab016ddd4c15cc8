//! Accumulated orientation of a single cubelet.
//!
//! Cubelets never translate or scale: the puzzle only turns layers about the
//! cube's center, so a cubelet's world center is its canonical grid position
//! carried by the same rotation as its faces. The orientation is kept as a
//! unit quaternion and re-normalized after every increment so hundreds of
//! moves stay well inside [`EPSILON`](crate::geometry::EPSILON).

use glam::{DMat4, DQuat, DVec3};

use crate::geometry::approx_eq_vec;

/// Local-to-world rotation of a cubelet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    rotation: DQuat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        rotation: DQuat::IDENTITY,
    };

    #[inline]
    pub fn rotation(&self) -> DQuat {
        self.rotation
    }

    /// Rotates by `radians` about the world-space `axis`.
    ///
    /// The axis is first brought into the cubelet's local frame with the
    /// inverse of the current rotation, then the local rotation is composed on
    /// the right. That is the same as applying the world rotation on the left.
    pub fn rotate(&mut self, axis: DVec3, radians: f64) {
        let local_axis = (self.rotation.inverse() * axis).normalize();
        let local_turn = DQuat::from_axis_angle(local_axis, radians);
        self.rotation = (self.rotation * local_turn).normalize();
    }

    /// Rotation-only local-to-world matrix.
    pub fn local_to_world(&self) -> DMat4 {
        DMat4::from_quat(self.rotation)
    }

    /// Carries a local direction or position into world space.
    #[inline]
    pub fn to_world(&self, local: DVec3) -> DVec3 {
        self.rotation * local
    }

    /// Whether both transforms map every basis axis to the same place.
    ///
    /// Quaternions `q` and `-q` encode one rotation, so the comparison goes
    /// through transformed axes rather than raw components.
    pub fn approx_eq(&self, other: &Transform) -> bool {
        [DVec3::X, DVec3::Y, DVec3::Z]
            .into_iter()
            .all(|axis| approx_eq_vec(self.to_world(axis), other.to_world(axis)))
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use super::*;

    #[test]
    fn test_quarter_turn_about_up() {
        let mut transform = Transform::IDENTITY;
        // clockwise seen from above
        transform.rotate(DVec3::Y, -FRAC_PI_2);
        assert!(approx_eq_vec(transform.to_world(DVec3::Z), DVec3::NEG_X));
        assert!(approx_eq_vec(transform.to_world(DVec3::X), DVec3::Z));
        assert!(approx_eq_vec(transform.to_world(DVec3::Y), DVec3::Y));
    }

    #[test]
    fn test_rotation_axis_is_world_space() {
        let mut transform = Transform::IDENTITY;
        transform.rotate(DVec3::X, FRAC_PI_2);
        // a second turn about world Y must not follow the already-turned local frame
        transform.rotate(DVec3::Y, FRAC_PI_2);

        let mut expected = DQuat::from_axis_angle(DVec3::X, FRAC_PI_2);
        expected = DQuat::from_axis_angle(DVec3::Y, FRAC_PI_2) * expected;
        let mut reference = Transform::IDENTITY;
        reference.rotation = expected;
        assert!(transform.approx_eq(&reference));
    }

    #[test]
    fn test_fractional_increments_sum_to_quarter_turn() {
        let mut stepped = Transform::IDENTITY;
        for _ in 0..19 {
            stepped.rotate(DVec3::Z, -FRAC_PI_2 / 19.0);
        }
        let mut whole = Transform::IDENTITY;
        whole.rotate(DVec3::Z, -FRAC_PI_2);
        assert!(stepped.approx_eq(&whole));
    }

    #[test]
    fn test_long_sequences_do_not_drift() {
        let axes = [DVec3::X, DVec3::Y, DVec3::Z, DVec3::NEG_Y];
        let turns: Vec<DVec3> = axes.iter().copied().cycle().take(400).collect();
        let mut transform = Transform::IDENTITY;
        // 400 quarter turns in 10 increments each, then undone in reverse
        for &axis in &turns {
            for _ in 0..10 {
                transform.rotate(axis, PI / 20.0);
            }
        }
        for &axis in turns.iter().rev() {
            for _ in 0..10 {
                transform.rotate(axis, -PI / 20.0);
            }
        }
        assert!(transform.approx_eq(&Transform::IDENTITY));
        assert!((transform.rotation().length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_local_to_world_has_no_translation() {
        let mut transform = Transform::IDENTITY;
        transform.rotate(DVec3::X, 0.3);
        let matrix = transform.local_to_world();
        assert!(approx_eq_vec(matrix.w_axis.truncate(), DVec3::ZERO));
        assert!(approx_eq_vec(
            matrix.transform_vector3(DVec3::Y),
            transform.to_world(DVec3::Y)
        ));
    }
}
