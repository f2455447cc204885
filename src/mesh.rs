use std::time::Instant;

use anyhow::{Context, Result, ensure};

use crate::color::Color;
use crate::depth::DepthBuffer;
use crate::line::draw_line;
use crate::raster::{Strategy, VertexAttributes, rasterize_triangle};
use crate::screen::Framebuffer;
use crate::texture::Texture;
use crate::triangle::Triangle;
use crate::vector3::Vector3;

/// Parsed mesh data. Face index triples are 1-based, as in the source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vector3>,
    pub tex_coords: Vec<Vector3>,
    pub face_vertices: Vec<[usize; 3]>,
    /// Empty when the mesh has no texture coordinates, else one per face.
    pub face_tex_coords: Vec<[usize; 3]>,
}

impl Mesh {
    pub fn face_count(&self) -> usize {
        self.face_vertices.len()
    }

    fn world_vertices(&self, face: usize) -> Result<[Vector3; 3]> {
        let indices = self.face_vertices.get(face).with_context(|| format!("face {face} does not exist"))?;
        let mut out = [Vector3::ZERO; 3];
        for (slot, &index) in out.iter_mut().zip(indices) {
            *slot = lookup(&self.vertices, index, "vertex", face)?;
        }
        Ok(out)
    }

    fn face_uvs(&self, face: usize) -> Result<Option<[Vector3; 3]>> {
        if self.face_tex_coords.is_empty() {
            return Ok(None);
        }
        let indices = self
            .face_tex_coords
            .get(face)
            .with_context(|| format!("face {face} has no texture coordinate indices"))?;
        let mut out = [Vector3::ZERO; 3];
        for (slot, &index) in out.iter_mut().zip(indices) {
            *slot = lookup(&self.tex_coords, index, "texture coordinate", face)?;
        }
        Ok(Some(out))
    }

    /// Per-vertex normals: area-weighted average of the normals of every face
    /// touching the vertex. Vertices no face touches get a zero normal.
    pub fn vertex_normals(&self) -> Result<Vec<Vector3>> {
        let mut sums = vec![Vector3::ZERO; self.vertices.len()];
        for (face, indices) in self.face_vertices.iter().enumerate() {
            let [w0, w1, w2] = self.world_vertices(face)?;
            let n = (w2 - w0).cross(w1 - w0);
            for &index in indices {
                sums[index - 1] = sums[index - 1] + n;
            }
        }
        Ok(sums.into_iter().map(|n| n.normalized().unwrap_or(Vector3::ZERO)).collect())
    }
}

fn lookup(items: &[Vector3], index: usize, what: &str, face: usize) -> Result<Vector3> {
    index
        .checked_sub(1)
        .and_then(|i| items.get(i))
        .copied()
        .with_context(|| format!("face {face}: {what} index {index} out of range 1..={}", items.len()))
}

/// World coordinates in [-1, 1] to screen space. No perspective divide.
pub fn project(v: Vector3, width: usize, height: usize) -> Vector3 {
    let half_w = (width as f64 - 1.0) / 2.0;
    let half_h = (height as f64 - 1.0) / 2.0;
    Vector3::new((v.x + 1.0) * half_w, (v.y + 1.0) * half_h, (v.z + 1.0) * half_h)
}

/// Unit normal of a world-space triangle, `None` when it has no area.
pub fn face_normal(world: &[Vector3; 3]) -> Option<Vector3> {
    (world[2] - world[0]).cross(world[1] - world[0]).normalized()
}

/// One triangle ready for rasterization.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Face {
    pub vertices: [Vector3; 3],
    pub world: [Vector3; 3],
    pub normals: [Vector3; 3],
    pub tex_coords: Option<[Vector3; 3]>,
    pub colors: Option<[Color; 3]>,
}

impl Face {
    /// Builds face `index` of `mesh` projected onto a `width`x`height` canvas.
    ///
    /// Errors on an out-of-range vertex or texture index. `Ok(None)` means the
    /// face has zero area and no normal.
    pub fn from_mesh(mesh: &Mesh, index: usize, width: usize, height: usize) -> Result<Option<Face>> {
        let world = mesh.world_vertices(index)?;
        let tex_coords = mesh.face_uvs(index)?;
        let Some(normal) = face_normal(&world) else {
            return Ok(None);
        };
        Ok(Some(Face {
            vertices: world.map(|v| project(v, width, height)),
            world,
            normals: [normal; 3],
            tex_coords,
            colors: None,
        }))
    }

    pub fn triangle(&self) -> Triangle {
        Triangle::new(self.vertices[0], self.vertices[1], self.vertices[2])
    }

    /// Exchanges every per-vertex attribute of corners `a` and `b`.
    pub fn swap(&mut self, a: usize, b: usize) {
        self.vertices.swap(a, b);
        self.world.swap(a, b);
        self.normals.swap(a, b);
        if let Some(uvs) = self.tex_coords.as_mut() {
            uvs.swap(a, b);
        }
        if let Some(colors) = self.colors.as_mut() {
            colors.swap(a, b);
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Shading {
    /// One intensity per face.
    #[default]
    Flat,
    /// Per-vertex intensities from averaged vertex normals.
    Gouraud,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    /// Faces whose normal has a non-positive dot product with this are culled.
    pub light_dir: Vector3,
    pub shading: Shading,
    pub strategy: Strategy,
    pub background: Color,
    /// Surface color of untextured meshes.
    pub base_color: Color,
    /// Draw the edges of every visible face in this color.
    pub wireframe: Option<Color>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1000,
            light_dir: Vector3::new(0.0, 0.0, -1.0),
            shading: Shading::Flat,
            strategy: Strategy::BoundingBox,
            background: Color::BLACK,
            base_color: Color::WHITE,
            wireframe: None,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.width > 0 && self.height > 0, "canvas must not be empty, got {}x{}", self.width, self.height);
        ensure!(self.light_dir.normalized().is_some(), "light direction must be non-zero, got {}", self.light_dir);
        if let Strategy::Scanline { step } = self.strategy {
            ensure!(step > 0.0 && step.is_finite(), "scanline step must be positive, got {step}");
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub faces: usize,
    pub drawn: usize,
    pub culled: usize,
    pub degenerate: usize,
    pub pixels: usize,
}

/// Owns the color and depth buffers for one render pass.
pub struct Renderer {
    config: RenderConfig,
    light: Vector3,
    framebuffer: Framebuffer,
    depth: DepthBuffer,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Result<Self> {
        config.validate()?;
        let light = config.light_dir.normalized().context("light direction must be non-zero")?;
        let mut framebuffer = Framebuffer::new(config.width, config.height);
        framebuffer.fill(config.background);
        Ok(Self { config, light, framebuffer, depth: DepthBuffer::new(config.width, config.height) })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn depth_buffer(&self) -> &DepthBuffer {
        &self.depth
    }

    pub fn into_framebuffer(self) -> Framebuffer {
        self.framebuffer
    }

    pub fn clear(&mut self) {
        self.framebuffer.fill(self.config.background);
        self.depth.clear();
    }

    /// Rasterizes every face of `mesh` in order. Out-of-range indices abort
    /// the pass with an error; zero-area and back-facing faces are skipped.
    pub fn render(&mut self, mesh: &Mesh, texture: Option<&Texture>) -> Result<RenderStats> {
        let start = Instant::now();
        let RenderConfig { width, height, .. } = self.config;
        let vertex_normals = match self.config.shading {
            Shading::Gouraud => Some(mesh.vertex_normals()?),
            Shading::Flat => None,
        };

        let mut stats = RenderStats { faces: mesh.face_count(), ..RenderStats::default() };
        let mut outlines = Vec::new();
        for index in 0..mesh.face_count() {
            let Some(mut face) = Face::from_mesh(mesh, index, width, height)? else {
                log::trace!("face {index}: zero area, skipped");
                stats.degenerate += 1;
                continue;
            };

            let intensity = face.normals[0].dot(self.light);
            if intensity <= 0.0 {
                log::trace!("face {index}: back-facing ({intensity:.3}), culled");
                stats.culled += 1;
                continue;
            }

            let attrs = match &vertex_normals {
                None => VertexAttributes::flat(self.config.base_color, intensity),
                Some(normals) => {
                    face.normals = mesh.face_vertices[index].map(|i| normals[i - 1]);
                    self.gouraud_attributes(&mut face, texture.is_some())
                }
            };
            let attrs = match face.tex_coords {
                Some(uvs) => attrs.with_uvs(uvs),
                None => attrs,
            };

            stats.pixels += rasterize_triangle(
                &face.triangle(),
                &attrs,
                &mut self.framebuffer,
                &mut self.depth,
                texture,
                self.config.strategy,
            );
            stats.drawn += 1;

            if self.config.wireframe.is_some() {
                outlines.push((index, face));
            }
        }

        // edges go on top of every fill
        if let Some(color) = self.config.wireframe {
            for (index, face) in &outlines {
                self.draw_edges(face, *index, color)?;
            }
        }

        log::info!(
            "rendered {} faces ({} drawn, {} culled, {} degenerate), {} pixels in {:.2?}",
            stats.faces,
            stats.drawn,
            stats.culled,
            stats.degenerate,
            stats.pixels,
            start.elapsed()
        );
        Ok(stats)
    }

    fn gouraud_attributes(&self, face: &mut Face, textured: bool) -> VertexAttributes {
        let intensity = face.normals.map(|n| n.dot(self.light).max(0.0));
        if textured && face.tex_coords.is_some() {
            return VertexAttributes::flat(self.config.base_color, 1.0).with_intensities(intensity);
        }
        let colors = intensity.map(|i| self.config.base_color.scale(i).with_alpha(255));
        face.colors = Some(colors);
        VertexAttributes::gouraud(colors)
    }

    fn draw_edges(&mut self, face: &Face, index: usize, color: Color) -> Result<()> {
        let mut corners = [(0, 0); 3];
        for (corner, v) in corners.iter_mut().zip(face.vertices) {
            *corner = self.to_pixel(v).with_context(|| format!("face {index}: wireframe edge leaves the canvas"))?;
        }
        for (a, b) in [(0, 1), (1, 2), (2, 0)] {
            let ((x0, y0), (x1, y1)) = (corners[a], corners[b]);
            draw_line(&mut self.framebuffer, x0, y0, x1, y1, color);
        }
        Ok(())
    }

    fn to_pixel(&self, v: Vector3) -> Option<(usize, usize)> {
        let (x, y) = (v.x.floor(), v.y.floor());
        let inside = x >= 0.0 && y >= 0.0 && x < self.framebuffer.width as f64 && y < self.framebuffer.height as f64;
        inside.then_some((x as usize, y as usize))
    }
}
