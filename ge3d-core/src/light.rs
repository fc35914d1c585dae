//! Light sources.
//!
//! Both light kinds compose a [`Model`] for placement with a [`LightColor`] and the
//! frustum used to render their shadow maps.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::model::Model;

/// Phong colour terms of a light.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightColor {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl LightColor {
    pub fn new(ambient: Vec3, diffuse: Vec3, specular: Vec3) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
        }
    }
}

impl Default for LightColor {
    fn default() -> Self {
        Self::new(Vec3::splat(0.3), Vec3::splat(0.75), Vec3::ONE)
    }
}

/// Box bounds of an orthographic projection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrthographicFrustum {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for OrthographicFrustum {
    fn default() -> Self {
        Self {
            left: -10.0,
            right: 10.0,
            bottom: -10.0,
            top: 10.0,
            near: 0.1,
            far: 500.0,
        }
    }
}

/// Parameters of a perspective projection, `fov` in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveFrustum {
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveFrustum {
    fn default() -> Self {
        Self {
            fov: 90.0,
            aspect_ratio: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Sun-like light shining along its look direction.
#[derive(Clone, Debug, Default)]
pub struct DirectionalLight {
    pub model: Model,
    pub color: LightColor,
    pub frustum: OrthographicFrustum,
}

impl DirectionalLight {
    pub fn new(color: LightColor, frustum: OrthographicFrustum) -> Self {
        Self {
            model: Model::default(),
            color,
            frustum,
        }
    }

    pub fn direction(&self) -> Vec3 {
        self.model.look_at_direction()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let f = &self.frustum;
        Mat4::orthographic_rh_gl(f.left, f.right, f.bottom, f.top, f.near, f.far)
    }

    /// World to light clip space.
    pub fn light_space_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.model.view_matrix()
    }
}

/// Cube face directions and up vectors, in GL cubemap face order.
const CUBE_FACES: [(Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Y),
    (Vec3::NEG_X, Vec3::NEG_Y),
    (Vec3::Y, Vec3::Z),
    (Vec3::NEG_Y, Vec3::NEG_Z),
    (Vec3::Z, Vec3::NEG_Y),
    (Vec3::NEG_Z, Vec3::NEG_Y),
];

/// Omnidirectional light at a position.
#[derive(Clone, Debug, Default)]
pub struct PointLight {
    pub model: Model,
    pub color: LightColor,
    pub frustum: PerspectiveFrustum,
}

impl PointLight {
    pub fn new(color: LightColor, frustum: PerspectiveFrustum) -> Self {
        Self {
            model: Model::default(),
            color,
            frustum,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.model.position()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let f = &self.frustum;
        Mat4::perspective_rh_gl(f.fov.to_radians(), f.aspect_ratio, f.near, f.far)
    }

    /// View-projection matrices for the six faces of a shadow cubemap.
    pub fn shadow_transforms(&self) -> [Mat4; 6] {
        let projection = self.projection_matrix();
        let position = self.position();
        CUBE_FACES.map(|(direction, up)| {
            projection * Mat4::look_at_rh(position, position + direction, up)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn cube_faces_look_outward_from_the_light() {
        let mut light = PointLight::default();
        light.model.set_position(Vec3::new(1.0, 2.0, 3.0));
        let transforms = light.shadow_transforms();

        for (transform, (direction, _)) in transforms.iter().zip(CUBE_FACES) {
            let clip = *transform * (light.position() + direction * 5.0).extend(1.0);
            let ndc = clip / clip.w;
            // A point straight ahead projects to the centre of its face.
            assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
            assert!(ndc.z > -1.0 && ndc.z < 1.0);
        }
    }

    #[test]
    fn positive_x_face_matches_explicit_matrix() {
        let light = PointLight::default();
        let expected = Mat4::perspective_rh_gl(90f32.to_radians(), 1.0, 0.1, 100.0)
            * Mat4::look_at_rh(Vec3::ZERO, Vec3::X, Vec3::NEG_Y);
        assert!(light.shadow_transforms()[0].abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn directional_light_projects_origin_into_view() {
        let mut light =
            DirectionalLight::new(LightColor::default(), OrthographicFrustum::default());
        light
            .model
            .set_position(Vec3::new(-10.0, 10.0, 10.0))
            .set_look_at_point(Vec3::ZERO);

        assert!(
            light
                .direction()
                .abs_diff_eq(Vec3::new(1.0, -1.0, -1.0).normalize(), 1e-5)
        );
        let clip = light.light_space_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(clip.x.abs() < 1e-4 && clip.y.abs() < 1e-4);
        assert!(clip.z > -1.0 && clip.z < 1.0);
    }
}
