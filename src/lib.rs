//! CPU triangle rasterizer: orthographic projection, back-face culling,
//! flat and Gouraud shading, nearest-texel texturing and a max-wins depth
//! buffer.

pub mod color;
pub mod depth;
pub mod line;
pub mod mesh;
pub mod obj;
pub mod raster;
pub mod screen;
pub mod texture;
pub mod triangle;
pub mod vector3;

pub use color::Color;
pub use depth::DepthBuffer;
pub use line::draw_line;
pub use mesh::{Face, Mesh, RenderConfig, RenderStats, Renderer, Shading};
pub use raster::{Strategy, VertexAttributes, rasterize_triangle};
pub use screen::Framebuffer;
pub use texture::Texture;
pub use triangle::Triangle;
pub use vector3::Vector3;
