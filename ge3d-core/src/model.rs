//! Transform state shared by every object placed in the scene.
//!
//! A [`Model`] keeps position, orientation and scale as independent pieces of state and
//! composes them on demand. The orientation is an orthonormal basis whose columns are,
//! in order, the look direction (X), the side axis (Y) and the normal (Z).
//!
//! All mutators return `&mut Self` so that calls can be chained:
//!
//! ```
//! use ge3d_core::model::Model;
//! use glam::Vec3;
//!
//! let mut model = Model::default();
//! model
//!     .set_scale(Vec3::splat(2.0))
//!     .rotate(90f32.to_radians(), Vec3::Z)
//!     .set_position(Vec3::new(1.0, 2.0, 3.0));
//! ```

use glam::{Mat3, Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Vectors shorter than this are treated as zero.
const EPSILON: f32 = 1e-6;

/// Position, orientation and scale of an object.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Model {
    position: Vec3,
    orientation: Mat3,
    scale: Vec3,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Mat3::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Model {
    /// Creates an identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn orientation(&self) -> Mat3 {
        self.orientation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Direction the object is facing (first basis column).
    pub fn look_at_direction(&self) -> Vec3 {
        self.orientation.x_axis
    }

    /// Second basis column.
    pub fn side_direction(&self) -> Vec3 {
        self.orientation.y_axis
    }

    /// Direction the object considers "up" (third basis column).
    pub fn normal_direction(&self) -> Vec3 {
        self.orientation.z_axis
    }

    pub fn set_position(&mut self, position: Vec3) -> &mut Self {
        self.position = position;
        self
    }

    /// Moves the object by `offset` given in world coordinates.
    pub fn translate(&mut self, offset: Vec3) -> &mut Self {
        self.position += offset;
        self
    }

    /// Moves the object by `offset` given in its own basis.
    pub fn translate_in_local_frame(&mut self, offset: Vec3) -> &mut Self {
        self.position += self.orientation * offset;
        self
    }

    /// Rotates the current orientation by `angle` radians around the world-space `axis`.
    ///
    /// A zero axis leaves the orientation untouched.
    pub fn rotate(&mut self, angle: f32, axis: Vec3) -> &mut Self {
        if axis.length_squared() < EPSILON {
            log::warn!("Ignoring rotation around a zero-length axis");
            return self;
        }
        self.orientation = Mat3::from_axis_angle(axis.normalize(), angle) * self.orientation;
        self
    }

    /// Replaces the orientation basis.
    ///
    /// The basis is orthonormalized: the look axis keeps its direction, the side axis
    /// loses its look component and the normal is rebuilt as `look x side`. Singular
    /// matrices are rejected and leave the orientation untouched.
    pub fn set_orientation(&mut self, orientation: Mat3) -> &mut Self {
        if orientation.determinant().abs() < EPSILON {
            log::warn!("Ignoring singular orientation {orientation:?}");
            return self;
        }
        let look = orientation.x_axis.normalize();
        let side = orientation.y_axis - look * orientation.y_axis.dot(look);
        let side = side.normalize();
        self.orientation = Mat3::from_cols(look, side, look.cross(side));
        self
    }

    /// Replaces the orientation basis from its three axes.
    pub fn set_orientation_axes(&mut self, look: Vec3, side: Vec3, normal: Vec3) -> &mut Self {
        self.set_orientation(Mat3::from_cols(look, side, normal))
    }

    /// Points the look axis along `direction`, keeping the normal as close to its
    /// current value as the new look axis allows.
    pub fn set_look_at_direction(&mut self, direction: Vec3) -> &mut Self {
        let look = direction.normalize_or_zero();
        let side = self.orientation.z_axis.cross(look);
        if look == Vec3::ZERO || side.length_squared() < EPSILON {
            log::warn!(
                "Look direction {direction} is zero or parallel to the normal {}",
                self.orientation.z_axis
            );
            return self;
        }
        let side = side.normalize();
        self.orientation = Mat3::from_cols(look, side, look.cross(side));
        self
    }

    /// Points the look axis at a world-space point.
    pub fn set_look_at_point(&mut self, point: Vec3) -> &mut Self {
        self.set_look_at_direction(point - self.position)
    }

    /// Sets the normal axis, keeping the look axis as close to its current value as the
    /// new normal allows.
    pub fn set_normal_direction(&mut self, direction: Vec3) -> &mut Self {
        let normal = direction.normalize_or_zero();
        let side = normal.cross(self.orientation.x_axis);
        if normal == Vec3::ZERO || side.length_squared() < EPSILON {
            log::warn!(
                "Normal direction {direction} is zero or parallel to the look direction {}",
                self.orientation.x_axis
            );
            return self;
        }
        let side = side.normalize();
        self.orientation = Mat3::from_cols(side.cross(normal), side, normal);
        self
    }

    pub fn set_scale(&mut self, scale: Vec3) -> &mut Self {
        self.scale = scale;
        self
    }

    /// Local-to-world matrix: translation * rotation * scale.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_mat3(self.orientation)
            * Mat4::from_scale(self.scale)
    }

    /// Inverse-transpose of the linear part of the model matrix.
    pub fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(self.model_matrix()).inverse().transpose()
    }

    /// World-to-view matrix looking along the look axis with the normal as up.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(
            self.position,
            self.orientation.x_axis,
            self.orientation.z_axis,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn assert_basis_orthonormal(m: &Model) {
        let o = m.orientation();
        for axis in [o.x_axis, o.y_axis, o.z_axis] {
            assert!((axis.length() - 1.0).abs() < 1e-5);
        }
        assert!(o.x_axis.dot(o.y_axis).abs() < 1e-5);
        assert!(o.y_axis.dot(o.z_axis).abs() < 1e-5);
        assert!(o.z_axis.dot(o.x_axis).abs() < 1e-5);
    }

    #[test]
    fn identity_model_has_identity_matrices() {
        let model = Model::new();
        assert_eq!(model.model_matrix(), Mat4::IDENTITY);
        assert_eq!(model.normal_matrix(), Mat3::IDENTITY);
    }

    #[test]
    fn model_matrix_is_trs_regardless_of_call_order() {
        let mut a = Model::new();
        a.translate(Vec3::new(1.0, 0.0, 0.0))
            .rotate(0.3, Vec3::Y)
            .set_scale(Vec3::new(2.0, 3.0, 4.0))
            .translate(Vec3::new(0.0, 5.0, 0.0));

        let mut b = Model::new();
        b.set_scale(Vec3::new(2.0, 3.0, 4.0))
            .translate(Vec3::new(1.0, 5.0, 0.0))
            .rotate(0.3, Vec3::Y);

        let expected = Mat4::from_translation(Vec3::new(1.0, 5.0, 0.0))
            * Mat4::from_mat3(Mat3::from_axis_angle(Vec3::Y, 0.3))
            * Mat4::from_scale(Vec3::new(2.0, 3.0, 4.0));

        assert!(a.model_matrix().abs_diff_eq(expected, 1e-5));
        assert!(b.model_matrix().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn rotations_compose_in_world_frame() {
        let mut model = Model::new();
        model.rotate(FRAC_PI_2, Vec3::Z).rotate(FRAC_PI_2, Vec3::X);
        // Z then X: look axis goes +X -> +Y -> +Z.
        assert!(model.look_at_direction().abs_diff_eq(Vec3::Z, 1e-5));
    }

    #[test]
    fn translate_in_local_frame_follows_orientation() {
        let mut model = Model::new();
        model
            .rotate(FRAC_PI_2, Vec3::Z)
            .translate_in_local_frame(Vec3::new(2.0, 0.0, 0.0));
        assert!(model.position().abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5));
    }

    #[test]
    fn look_at_point_keeps_basis_orthonormal() {
        let mut model = Model::new();
        model
            .set_position(Vec3::new(-10.0, 10.0, 10.0))
            .set_look_at_point(Vec3::ZERO);
        let expected = Vec3::new(1.0, -1.0, -1.0).normalize();
        assert!(model.look_at_direction().abs_diff_eq(expected, 1e-5));
        assert_basis_orthonormal(&model);
        assert!(model.normal_direction().z > 0.0);
    }

    #[test]
    fn normal_direction_keeps_basis_orthonormal() {
        let mut model = Model::new();
        model.set_normal_direction(Vec3::new(0.0, 1.0, 1.0));
        assert!(
            model
                .normal_direction()
                .abs_diff_eq(Vec3::new(0.0, 1.0, 1.0).normalize(), 1e-5)
        );
        assert!(model.look_at_direction().abs_diff_eq(Vec3::X, 1e-5));
        assert_basis_orthonormal(&model);
    }

    #[test]
    fn degenerate_inputs_leave_orientation_unchanged() {
        let mut model = Model::new();
        model.rotate(0.4, Vec3::X);
        let before = model.orientation();
        let look = model.look_at_direction();
        let normal = model.normal_direction();

        model
            .rotate(1.0, Vec3::ZERO)
            .set_look_at_direction(Vec3::ZERO)
            .set_look_at_direction(normal * 3.0)
            .set_normal_direction(look)
            .set_orientation(Mat3::ZERO);

        assert_eq!(model.orientation(), before);
    }

    #[test]
    fn scaled_and_sheared_orientations_are_orthonormalized() {
        let mut model = Model::new();
        model.set_orientation(Mat3::from_cols(
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(1.0, 2.0, 0.0),
            Vec3::new(0.0, 0.5, 4.0),
        ));

        assert_basis_orthonormal(&model);
        assert!(model.look_at_direction().abs_diff_eq(Vec3::X, 1e-5));
        assert!(model.side_direction().abs_diff_eq(Vec3::Y, 1e-5));
        assert!(model.normal_direction().abs_diff_eq(Vec3::Z, 1e-5));
        assert!(model.normal_matrix().abs_diff_eq(Mat3::IDENTITY, 1e-5));
    }

    #[test]
    fn normal_matrix_corrects_non_uniform_scale() {
        let mut model = Model::new();
        model.set_scale(Vec3::new(2.0, 1.0, 1.0));
        let normal = model.normal_matrix() * Vec3::X;
        assert!(normal.abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn view_matrix_maps_look_direction_to_negative_z() {
        let mut model = Model::new();
        model.set_position(Vec3::new(0.0, 0.0, 5.0));
        let view = model.view_matrix();
        let ahead = view.transform_point3(Vec3::new(3.0, 0.0, 5.0));
        assert!(ahead.abs_diff_eq(Vec3::new(0.0, 0.0, -3.0), 1e-5));
    }
}
