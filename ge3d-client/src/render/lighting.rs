//! Upload of light parameters to shader uniforms.

use ge3d_core::light::{DirectionalLight, LightColor};

use crate::abs::ShaderProgram;

/// Name of the directional light uniform in the lit shaders.
const DIRECTIONAL_LIGHT: &str = "directionalLight";

fn apply_color(shader: &ShaderProgram, prefix: &str, color: &LightColor) {
    shader
        .set_uniform(&format!("{prefix}.lighting.ambient"), color.ambient)
        .set_uniform(&format!("{prefix}.lighting.diffuse"), color.diffuse)
        .set_uniform(&format!("{prefix}.lighting.specular"), color.specular);
}

/// Sets the `directionalLight` uniforms of the program in use.
pub fn apply_directional_light(shader: &ShaderProgram, light: &DirectionalLight) {
    shader.set_uniform(&format!("{DIRECTIONAL_LIGHT}.direction"), light.direction());
    apply_color(shader, DIRECTIONAL_LIGHT, &light.color);
}
