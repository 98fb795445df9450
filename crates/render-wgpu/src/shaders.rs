/// Bindings and quad generation shared by both frame shaders.
const COMMON: &str = r#"
struct Params {
    // band v0, band v1, shader time, unused
    band: vec4<f32>,
};

@group(0) @binding(0)
var frame_tex: texture_2d<f32>;
@group(0) @binding(1)
var frame_sampler: sampler;
@group(0) @binding(2)
var<uniform> params: Params;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

// Quad covering frame rows [v0, v1] across the full width.
fn quad_vertex(index: u32, v0: f32, v1: f32) -> VertexOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(0.0, 0.0),
        vec2<f32>(1.0, 0.0),
        vec2<f32>(0.0, 1.0),
        vec2<f32>(0.0, 1.0),
        vec2<f32>(1.0, 0.0),
        vec2<f32>(1.0, 1.0),
    );
    let c = corners[index];
    let uv = vec2<f32>(c.x, mix(v0, v1, c.y));
    var out: VertexOutput;
    out.clip_position = vec4<f32>(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0, 0.0, 1.0);
    out.uv = uv;
    return out;
}
"#;

const BLIT: &str = r#"
@vertex
fn vs_blit(@builtin(vertex_index) index: u32) -> VertexOutput {
    return quad_vertex(index, 0.0, 1.0);
}

@fragment
fn fs_blit(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(frame_tex, frame_sampler, in.uv);
}
"#;

const CRT: &str = r#"
// Sample at band-local coordinates.
fn band_sample(local: vec2<f32>) -> vec4<f32> {
    let uv = vec2<f32>(local.x, mix(params.band.x, params.band.y, local.y));
    return textureSampleLevel(frame_tex, frame_sampler, uv, 0.0);
}

@vertex
fn vs_crt(@builtin(vertex_index) index: u32) -> VertexOutput {
    return quad_vertex(index, params.band.x, params.band.y);
}

@fragment
fn fs_crt(in: VertexOutput) -> @location(0) vec4<f32> {
    let v0 = params.band.x;
    let v1 = params.band.y;
    let t = params.band.z;
    let local = vec2<f32>(in.uv.x, (in.uv.y - v0) / max(v1 - v0, 0.000001));

    var dc = local - vec2<f32>(0.5, 0.5);
    dc = dc * (1.0 + dot(dc, dc) * 0.25);
    let uv = dc + vec2<f32>(0.5, 0.5);
    if (uv.x < 0.0 || uv.x > 1.0 || uv.y < 0.0 || uv.y > 1.0) {
        return vec4<f32>(0.0, 0.0, 0.0, 1.0);
    }

    var col = band_sample(uv);
    let scanline = sin(uv.y * 800.0 + t * 2.0) * 0.04;
    col = vec4<f32>(col.rgb - vec3<f32>(scanline), col.a);
    col.r = band_sample(uv + vec2<f32>(0.003, 0.0)).r;
    col.b = band_sample(uv - vec2<f32>(0.003, 0.0)).b;
    col.g = col.g + band_sample(uv + vec2<f32>(0.001, 0.001)).g * 0.1;

    let vignette = 1.0 - dot(dc, dc) * 0.7;
    let flicker = 0.95 + sin(t * 120.0) * 0.05;
    return vec4<f32>(col.rgb * vignette * flicker, col.a);
}
"#;

/// Letterboxed full-frame blit.
pub fn blit_shader() -> String {
    format!("{COMMON}{BLIT}")
}

/// CRT post-process over the marked band.
pub fn crt_shader() -> String {
    format!("{COMMON}{CRT}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(source: &str) {
        let module = match naga::front::wgsl::parse_str(source) {
            Ok(m) => m,
            Err(e) => panic!("WGSL parse error: {}", e.emit_to_string(source)),
        };
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        if let Err(e) = validator.validate(&module) {
            panic!("WGSL validation error: {e:?}");
        }
    }

    #[test]
    fn blit_shader_validates() {
        validate(&blit_shader());
    }

    #[test]
    fn crt_shader_validates() {
        validate(&crt_shader());
    }

    #[test]
    fn entry_points_present() {
        let blit = blit_shader();
        assert!(blit.contains("fn vs_blit") && blit.contains("fn fs_blit"));
        let crt = crt_shader();
        assert!(crt.contains("fn vs_crt") && crt.contains("fn fs_crt"));
    }
}
