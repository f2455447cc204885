use crate::color::Color;
use crate::depth::DepthBuffer;
use crate::screen::Framebuffer;
use crate::texture::Texture;
use crate::triangle::{Triangle, is_inside};
use crate::vector3::Vector3;

/// How a triangle's covered pixels are enumerated.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum Strategy {
    /// Test every pixel of the clamped bounding box with barycentric weights.
    #[default]
    BoundingBox,
    /// Sweep y-sorted edges; `step` is the sample spacing in pixels on both axes.
    Scanline { step: f64 },
}

/// What a triangle carries besides its screen positions.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VertexAttributes {
    /// Color used when there are neither vertex colors nor a texture.
    pub base: Color,
    pub intensity: [f64; 3],
    pub uvs: Option<[Vector3; 3]>,
    pub colors: Option<[Color; 3]>,
}

impl VertexAttributes {
    /// One light intensity for the whole face.
    pub fn flat(base: Color, intensity: f64) -> Self {
        Self { base, intensity: [intensity; 3], uvs: None, colors: None }
    }

    /// Already-lit per-vertex colors, blended with the barycentric weights.
    pub fn gouraud(colors: [Color; 3]) -> Self {
        Self { base: Color::WHITE, intensity: [1.0; 3], uvs: None, colors: Some(colors) }
    }

    pub fn with_intensities(mut self, intensity: [f64; 3]) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn with_uvs(mut self, uvs: [Vector3; 3]) -> Self {
        self.uvs = Some(uvs);
        self
    }
}

#[derive(Debug, Copy, Clone)]
struct Fragment {
    depth: f64,
    intensity: f64,
    uv: Vector3,
    weights: Vector3,
}

/// Fills the pixels covered by `tri` (screen space, `z` is depth).
///
/// Every sample goes through the depth test: color and depth are written
/// only if the interpolated depth is strictly greater than the stored one.
/// Degenerate triangles and samples draw nothing. Returns the number of
/// pixels written.
pub fn rasterize_triangle(
    tri: &Triangle,
    attrs: &VertexAttributes,
    fb: &mut Framebuffer,
    depth: &mut DepthBuffer,
    texture: Option<&Texture>,
    strategy: Strategy,
) -> usize {
    assert!(
        fb.width == depth.width && fb.height == depth.height,
        "framebuffer {}x{} and depth buffer {}x{} differ",
        fb.width,
        fb.height,
        depth.width,
        depth.height
    );
    if fb.width == 0 || fb.height == 0 {
        return 0;
    }
    if tri.vertices().iter().any(|v| !(v.x.is_finite() && v.y.is_finite() && v.z.is_finite())) {
        return 0;
    }

    let mut target = Target { fb, depth, texture, attrs };
    match strategy {
        Strategy::BoundingBox => bounding_box(tri, &mut target),
        Strategy::Scanline { step } => {
            assert!(step > 0.0 && step.is_finite(), "scanline step must be positive, got {step}");
            scanline(tri, &mut target, step)
        }
    }
}

struct Target<'a> {
    fb: &'a mut Framebuffer,
    depth: &'a mut DepthBuffer,
    texture: Option<&'a Texture>,
    attrs: &'a VertexAttributes,
}

impl Target<'_> {
    fn plot(&mut self, x: usize, y: usize, frag: &Fragment) -> bool {
        if !self.depth.test_and_set(x, y, frag.depth) {
            return false;
        }
        let color = self.shade(frag);
        self.fb.set(x, y, color);
        true
    }

    fn shade(&self, frag: &Fragment) -> Color {
        let attrs = self.attrs;
        if let Some([c0, c1, c2]) = attrs.colors {
            let w = frag.weights;
            return c0.scale(w.x).add(c1.scale(w.y)).add(c2.scale(w.z));
        }
        let surface = match (attrs.uvs, self.texture) {
            (Some(_), Some(texture)) => texture.sample(frag.uv.x, frag.uv.y),
            _ => attrs.base,
        };
        surface.scale(frag.intensity).with_alpha(255)
    }
}

fn bounding_box(tri: &Triangle, target: &mut Target<'_>) -> usize {
    let flat = tri.flatten();
    let [v0, v1, v2] = tri.vertices();
    let max_x = (target.fb.width - 1) as f64;
    let max_y = (target.fb.height - 1) as f64;

    let x_start = v0.x.min(v1.x).min(v2.x).floor().max(0.0);
    let y_start = v0.y.min(v1.y).min(v2.y).floor().max(0.0);
    let x_end = v0.x.max(v1.x).max(v2.x).ceil().min(max_x);
    let y_end = v0.y.max(v1.y).max(v2.y).ceil().min(max_y);
    if x_start > x_end || y_start > y_end {
        return 0;
    }

    let attrs = *target.attrs;
    let mut written = 0;
    for y in y_start as usize..=y_end as usize {
        for x in x_start as usize..=x_end as usize {
            let Some(w) = flat.barycentric(Vector3::new(x as f64, y as f64, 0.0)) else {
                continue;
            };
            if !is_inside(w) {
                continue;
            }
            let [i0, i1, i2] = attrs.intensity;
            let frag = Fragment {
                depth: blend(v0.z, v1.z, v2.z, w),
                intensity: blend(i0, i1, i2, w),
                uv: attrs.uvs.map_or(Vector3::ZERO, |[a, b, c]| a + (b - a) * w.y + (c - a) * w.z),
                weights: w,
            };
            if target.plot(x, y, &frag) {
                written += 1;
            }
        }
    }
    written
}

/// `u*a + v*b + w*c`, anchored on `a` so equal inputs come back unchanged.
#[inline(always)]
fn blend(a: f64, b: f64, c: f64, w: Vector3) -> f64 {
    a + (b - a) * w.y + (c - a) * w.z
}

/// Vertex state carried down the edges of a scanline sweep.
#[derive(Debug, Copy, Clone)]
struct Corner {
    pos: Vector3,
    intensity: f64,
    uv: Vector3,
}

impl Corner {
    fn lerp(self, other: Corner, t: f64) -> Corner {
        Corner {
            pos: self.pos + (other.pos - self.pos) * t,
            intensity: self.intensity + (other.intensity - self.intensity) * t,
            uv: self.uv + (other.uv - self.uv) * t,
        }
    }
}

fn scanline(tri: &Triangle, target: &mut Target<'_>, step: f64) -> usize {
    let flat = tri.flatten();
    let attrs = *target.attrs;
    let uvs = attrs.uvs.unwrap_or([Vector3::ZERO; 3]);
    let mut c: [Corner; 3] = std::array::from_fn(|i| Corner {
        pos: tri.vertices()[i],
        intensity: attrs.intensity[i],
        uv: uvs[i],
    });

    // Stable: equal y keeps input order
    if c[0].pos.y > c[1].pos.y {
        c.swap(0, 1);
    }
    if c[1].pos.y > c[2].pos.y {
        c.swap(1, 2);
    }
    if c[0].pos.y > c[1].pos.y {
        c.swap(0, 1);
    }
    let [c0, c1, c2] = c;
    if c0.pos.y == c2.pos.y {
        return 0;
    }

    let width = target.fb.width as f64;
    let height = target.fb.height as f64;
    let total = c2.pos.y - c0.pos.y;
    let mut written = 0;

    for y in samples(c0.pos.y, c2.pos.y, height, step) {
        let row = y.floor();
        if row < height {
            let second_half = y > c1.pos.y || c1.pos.y == c0.pos.y;
            let mut a = c0.lerp(c2, (y - c0.pos.y) / total);
            let mut b = if second_half {
                let segment = c2.pos.y - c1.pos.y;
                c1.lerp(c2, if segment == 0.0 { 0.0 } else { (y - c1.pos.y) / segment })
            } else {
                c0.lerp(c1, (y - c0.pos.y) / (c1.pos.y - c0.pos.y))
            };
            if a.pos.x > b.pos.x {
                std::mem::swap(&mut a, &mut b);
            }

            let span = b.pos.x - a.pos.x;
            for x in samples(a.pos.x, b.pos.x, width, step) {
                let col = x.floor();
                if col < width {
                    let t = if span == 0.0 { 0.0 } else { (x - a.pos.x) / span };
                    let p = a.lerp(b, t);
                    if let Some(weights) = flat.barycentric(Vector3::new(x, y, 0.0)) {
                        let frag = Fragment { depth: p.pos.z, intensity: p.intensity, uv: p.uv, weights };
                        if target.plot(col as usize, row as usize, &frag) {
                            written += 1;
                        }
                    }
                }
            }
        }
    }
    written
}

/// Points `start + k*step` inside `[start, end]` that also land in `[0, limit]`.
///
/// Indexing by `k` keeps the walk finite when `step` is below the float
/// spacing at `start`, and skipping straight to the visible range keeps
/// huge off-canvas spans cheap.
fn samples(start: f64, end: f64, limit: f64, step: f64) -> impl Iterator<Item = f64> {
    let first = if start < 0.0 { (-start / step).ceil() } else { 0.0 };
    let last = ((end.min(limit) - start) / step).floor();
    let (first, last) = (first as i64, last as i64);
    (first..=last).map(move |k| start + k as f64 * step).filter(move |&v| v >= 0.0 && v <= end)
}
