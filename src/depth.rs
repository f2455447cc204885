/// Per-pixel depth, paired with a [`Framebuffer`](crate::screen::Framebuffer)
/// of the same size. Larger values are nearer.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthBuffer {
    pub width: usize,
    pub height: usize,
    depth: Vec<f64>,
}

impl DepthBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, depth: vec![f64::NEG_INFINITY; width * height] }
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "depth sample ({x}, {y}) outside {}x{} buffer",
            self.width,
            self.height
        );
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.depth[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, z: f64) {
        let i = self.index(x, y);
        self.depth[i] = z;
    }

    /// Stores `z` if it is strictly nearer than what is there. Returns whether it did.
    pub fn test_and_set(&mut self, x: usize, y: usize, z: f64) -> bool {
        let i = self.index(x, y);
        if z > self.depth[i] {
            self.depth[i] = z;
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.depth.fill(f64::NEG_INFINITY);
    }
}
