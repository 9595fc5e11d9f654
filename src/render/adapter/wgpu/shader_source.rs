// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! # WGPU WGSL Shader Source Module
//!
//! WGSL source of the text pipeline. The font texture holds coverage in its
//! red channel, the fragment shader turns it into alpha.

/// Text shader: view-projection at binding 0, font texture at 1, sampler at 2
pub const TEXT_SHADER: &str = r#"
struct Uniforms {
    view_projection: mat4x4<f32>,
}

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(0) @binding(1)
var font_texture: texture_2d<f32>;

@group(0) @binding(2)
var font_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
    @location(2) tex_coords: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) tex_coords: vec2<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;
    output.clip_position = uniforms.view_projection * vec4<f32>(input.position, 1.0);
    output.color = input.color;
    output.tex_coords = input.tex_coords;
    return output;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let coverage = textureSample(font_texture, font_sampler, input.tex_coords).r;
    return vec4<f32>(input.color.rgb, input.color.a * coverage);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_shader_entry_points_and_bindings() {
        assert!(TEXT_SHADER.contains("fn vs_main"));
        assert!(TEXT_SHADER.contains("fn fs_main"));
        for binding in ["@binding(0)", "@binding(1)", "@binding(2)"] {
            assert!(TEXT_SHADER.contains(binding), "{}", binding);
        }
        // vertex locations follow Vertex::desc
        assert!(TEXT_SHADER.contains("@location(0) position: vec3<f32>"));
        assert!(TEXT_SHADER.contains("@location(1) color: vec4<f32>"));
        assert!(TEXT_SHADER.contains("@location(2) tex_coords: vec2<f32>"));
    }
}
