use glam::DVec3;
use oldskool_common::{Canvas, TexturedVertex};

/// 3D point; base vertices are immutable, transformed copies are rebuilt
/// from them every frame.
pub type Vector3 = DVec3;

/// A textured quad: four vertex indices and their UVs in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub indices: [usize; 4],
    pub uvs: [[f32; 2]; 4],
}

const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Faces in declaration order; the order is the depth-sort tie-break.
pub const CUBE_FACES: [Face; 6] = [
    // front
    Face { indices: [4, 5, 6, 7], uvs: QUAD_UVS },
    // back
    Face { indices: [1, 0, 3, 2], uvs: QUAD_UVS },
    // right
    Face { indices: [5, 1, 2, 6], uvs: QUAD_UVS },
    // left
    Face { indices: [0, 4, 7, 3], uvs: QUAD_UVS },
    // top
    Face { indices: [7, 6, 2, 3], uvs: QUAD_UVS },
    // bottom
    Face { indices: [0, 1, 5, 4], uvs: QUAD_UVS },
];

pub const CUBE_HALF_SIZE: f64 = 100.0;

/// Axis-aligned cube vertices of the given half size.
pub fn cube_vertices(size: f64) -> [Vector3; 8] {
    [
        DVec3::new(-size, -size, -size),
        DVec3::new(size, -size, -size),
        DVec3::new(size, size, -size),
        DVec3::new(-size, size, -size),
        DVec3::new(-size, -size, size),
        DVec3::new(size, -size, size),
        DVec3::new(size, size, size),
        DVec3::new(-size, size, size),
    ]
}

/// Euler angles in radians. Grows without bound; no wraparound needed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RotationState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl RotationState {
    pub fn advance(&mut self, rates: [f64; 3]) {
        self.x += rates[0];
        self.y += rates[1];
        self.z += rates[2];
    }
}

/// Rotate about X, then Y, then Z.
pub fn rotate(v: Vector3, rot: &RotationState) -> Vector3 {
    let (sx, cx) = rot.x.sin_cos();
    let (sy, cy) = rot.y.sin_cos();
    let (sz, cz) = rot.z.sin_cos();

    let (x, y, z) = (v.x, v.y, v.z);
    let (y, z) = (y * cx - z * sx, y * sx + z * cx);
    let (x, z) = (x * cy + z * sy, -x * sy + z * cy);
    let (x, y) = (x * cz - y * sz, x * sz + y * cz);
    DVec3::new(x, y, z)
}

/// Perspective parameters: `scale = fov / (fov + z + camera_distance)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov: f64,
    pub camera_distance: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl Projection {
    pub fn centered(width: u32, height: u32) -> Self {
        Self {
            fov: 300.0,
            camera_distance: 300.0,
            center_x: (width / 2) as f64,
            center_y: (height / 2) as f64,
        }
    }

    pub fn project(&self, v: Vector3) -> [f32; 2] {
        let scale = self.fov / (self.fov + v.z + self.camera_distance);
        [
            self.center_x as f32 + (v.x * scale) as f32,
            self.center_y as f32 + (v.y * scale) as f32,
        ]
    }
}

/// 2D cross product of the screen-space edges `(p1 - p0)` and `(p2 - p0)`.
pub fn winding(p: &[[f32; 2]; 4]) -> f32 {
    let (v1x, v1y) = (p[1][0] - p[0][0], p[1][1] - p[0][1]);
    let (v2x, v2y) = (p[2][0] - p[0][0], p[2][1] - p[0][1]);
    v1x * v2y - v1y * v2x
}

/// A face that survived culling, in draw order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleFace {
    /// Index into [`CUBE_FACES`].
    pub face: usize,
    pub depth: f64,
    pub screen: [[f32; 2]; 4],
}

/// Rotating textured cube: transform, depth-sort, project, cull, rasterize.
///
/// Occlusion is purely painter's order on face centroid depth; there is no
/// depth buffer.
#[derive(Debug, Clone)]
pub struct CubeRenderer {
    base: [Vector3; 8],
    rotation: RotationState,
    projection: Projection,
    canvas: Canvas,
}

impl CubeRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            base: cube_vertices(CUBE_HALF_SIZE),
            rotation: RotationState::default(),
            projection: Projection::centered(width, height),
            canvas: Canvas::new(width, height),
        }
    }

    pub fn rotation(&self) -> RotationState {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: RotationState) {
        self.rotation = rotation;
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Step the rotation by one tick.
    pub fn advance(&mut self, rates: [f64; 3]) {
        self.rotation.advance(rates);
    }

    /// All eight vertices rotated from the base data.
    pub fn transformed_vertices(&self) -> [Vector3; 8] {
        self.base.map(|v| rotate(v, &self.rotation))
    }

    /// Faces sorted ascending by mean Z, paired with that depth.
    pub fn sorted_faces(transformed: &[Vector3; 8]) -> Vec<(usize, f64)> {
        let mut faces: Vec<(usize, f64)> = CUBE_FACES
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let z: f64 = f.indices.iter().map(|&p| transformed[p].z).sum();
                (i, z / 4.0)
            })
            .collect();
        // sort_by is stable, so equal depths keep declaration order
        faces.sort_by(|a, b| a.1.total_cmp(&b.1));
        faces
    }

    /// Project, cull and return the faces to draw, in draw order.
    ///
    /// A face is kept when the [`winding`] of its first three projected
    /// corners is zero or positive (screen y grows downward) and culled when
    /// it is negative. Edge-on faces with zero winding are kept. At zero
    /// rotation this keeps five faces, with only the near face culled.
    pub fn visible_faces(&self) -> Vec<VisibleFace> {
        let transformed = self.transformed_vertices();
        Self::sorted_faces(&transformed)
            .into_iter()
            .filter_map(|(face, depth)| {
                let screen = CUBE_FACES[face]
                    .indices
                    .map(|p| self.projection.project(transformed[p]));
                (winding(&screen) >= 0.0).then_some(VisibleFace {
                    face,
                    depth,
                    screen,
                })
            })
            .collect()
    }

    /// Redraw the cube onto its cleared canvas.
    pub fn render(&mut self, texture: &Canvas) -> &Canvas {
        self.canvas.clear();
        let (tw, th) = (texture.width() as f32, texture.height() as f32);
        let faces = self.visible_faces();
        tracing::trace!(visible = faces.len(), "cube faces");

        for vf in faces {
            let uvs = CUBE_FACES[vf.face].uvs;
            let vert = |i: usize| TexturedVertex {
                x: vf.screen[i][0],
                y: vf.screen[i][1],
                u: uvs[i][0] * tw,
                v: uvs[i][1] * th,
            };
            self.canvas
                .draw_textured_triangle(texture, [vert(0), vert(1), vert(2)]);
            self.canvas
                .draw_textured_triangle(texture, [vert(0), vert(2), vert(3)]);
        }
        &self.canvas
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oldskool_common::Rgba;

    fn approx(a: f32, b: f64) -> bool {
        (a as f64 - b).abs() < 1e-3
    }

    #[test]
    fn golden_projection() {
        let proj = Projection::centered(640, 400);
        let [x, y] = proj.project(DVec3::new(100.0, 100.0, 100.0));
        let scale = 300.0 / 700.0;
        assert!(approx(x, 320.0 + 100.0 * scale));
        assert!(approx(y, 200.0 + 100.0 * scale));
        assert!(approx(x, 362.857_142));
        assert!(approx(y, 242.857_142));
    }

    #[test]
    fn golden_projection_through_renderer() {
        let cube = CubeRenderer::new(640, 400);
        let transformed = cube.transformed_vertices();
        assert_eq!(transformed[6], DVec3::new(100.0, 100.0, 100.0));
        let [x, y] = cube.projection().project(transformed[6]);
        assert!(approx(x, 362.857_142));
        assert!(approx(y, 242.857_142));
    }

    #[test]
    fn rotation_is_recomputed_from_base() {
        let mut cube = CubeRenderer::new(640, 400);
        for _ in 0..1000 {
            cube.advance([0.02, 0.03, 0.01]);
        }
        let rot = cube.rotation();
        assert!((rot.x - 20.0).abs() < 1e-9);
        let expected = rotate(DVec3::new(100.0, -100.0, 100.0), &rot);
        assert_eq!(cube.transformed_vertices()[5], expected);
        // rigid rotation preserves the half-diagonal
        for v in cube.transformed_vertices() {
            assert!((v.length() - 100.0 * 3f64.sqrt()).abs() < 1e-9);
        }
    }

    #[test]
    fn rotate_axis_order() {
        // X then Y: +Y rotated 90° about X becomes +Z, then 90° about Y becomes +X.
        let rot = RotationState {
            x: std::f64::consts::FRAC_PI_2,
            y: std::f64::consts::FRAC_PI_2,
            z: 0.0,
        };
        let v = rotate(DVec3::new(0.0, 1.0, 0.0), &rot);
        assert!((v - DVec3::new(1.0, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let flat = [DVec3::ZERO; 8];
        let order: Vec<usize> = CubeRenderer::sorted_faces(&flat)
            .into_iter()
            .map(|(i, _)| i)
            .collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn sort_ascending_by_depth() {
        let cube = CubeRenderer::new(640, 400);
        let sorted = CubeRenderer::sorted_faces(&cube.transformed_vertices());
        assert_eq!(sorted.len(), 6);
        assert!(sorted.windows(2).all(|w| w[0].1 <= w[1].1));
        // back face (z = -100) first, front face (z = +100) last
        assert_eq!(sorted[0].0, 1);
        assert_eq!(sorted[5].0, 0);
    }

    #[test]
    fn corner_on_view_keeps_three_faces() {
        let mut cube = CubeRenderer::new(640, 400);
        // Points vertex 0 straight down the view axis.
        cube.set_rotation(RotationState {
            x: std::f64::consts::FRAC_PI_4,
            y: -(1.0 / 2f64.sqrt()).atan(),
            z: 0.0,
        });
        let v0 = cube.transformed_vertices()[0];
        assert!(v0.x.abs() < 1e-9 && v0.y.abs() < 1e-9);
        assert_eq!(cube.visible_faces().len(), 3);
    }

    #[test]
    fn zero_rotation_winding_convention() {
        let cube = CubeRenderer::new(640, 400);
        let visible: Vec<usize> = cube.visible_faces().iter().map(|f| f.face).collect();
        // The face nearest the camera (back, z = -100) is the one culled.
        assert!(!visible.contains(&1));
        assert!(visible.contains(&0));
        assert_eq!(visible.len(), 5);

        let transformed = cube.transformed_vertices();
        for (face, quad) in CUBE_FACES.iter().enumerate() {
            let screen = quad.indices.map(|p| cube.projection().project(transformed[p]));
            assert_eq!(winding(&screen) >= 0.0, visible.contains(&face));
        }
    }

    #[test]
    fn visible_faces_never_exceed_six() {
        let mut cube = CubeRenderer::new(640, 400);
        for _ in 0..200 {
            cube.advance([0.02, 0.03, 0.01]);
            let n = cube.visible_faces().len();
            assert!(n <= 6);
            assert!(n >= 1);
        }
    }

    #[test]
    fn render_clears_and_draws_texture() {
        let texture = Canvas::filled(16, 16, Rgba::MAGENTA);
        let mut cube = CubeRenderer::new(640, 400);
        let canvas = cube.render(&texture);
        assert_eq!(canvas.get(320, 200), Some(Rgba::MAGENTA));
        assert_eq!(canvas.get(0, 0), Some(Rgba::TRANSPARENT));

        // a second frame starts from a cleared canvas
        cube.advance([0.5, 0.0, 0.0]);
        let canvas = cube.render(&texture);
        assert_eq!(canvas.get(5, 5), Some(Rgba::TRANSPARENT));
    }
}
