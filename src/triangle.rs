use crate::vector3::Vector3;

/// Weights whose sum drifts further than this from 1 are treated as degenerate.
const SUM_LOW: f64 = 0.99;
const SUM_HIGH: f64 = 1.001;
const DENOM_EPSILON: f64 = 1e-12;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Triangle {
    pub v0: Vector3,
    pub v1: Vector3,
    pub v2: Vector3,
}

impl Triangle {
    pub fn new(v0: Vector3, v1: Vector3, v2: Vector3) -> Self {
        Triangle { v0, v1, v2 }
    }

    /// Barycentric weights `(u, v, w)` of `p`, with `p = u*v0 + v*v1 + w*v2`.
    ///
    /// Returns `None` when the triangle is degenerate (zero or near-zero area)
    /// or the weights do not sum to 1. A `Some` with a negative weight means
    /// `p` lies outside the triangle.
    pub fn barycentric(&self, p: Vector3) -> Option<Vector3> {
        let e0 = self.v1 - self.v0;
        let e1 = self.v2 - self.v0;
        let ep = p - self.v0;

        let d00 = e0.dot(e0);
        let d01 = e0.dot(e1);
        let d11 = e1.dot(e1);
        let d20 = ep.dot(e0);
        let d21 = ep.dot(e1);

        let denom = d00 * d11 - d01 * d01;
        if !(denom.abs() > DENOM_EPSILON * (d00 * d11).max(1.0)) {
            return None;
        }

        let v = (d11 * d20 - d01 * d21) / denom;
        let w = (d00 * d21 - d01 * d20) / denom;
        let u = 1.0 - v - w;

        // Also catches NaN/Inf leaking out of the division
        let sum = u + v + w;
        if !(sum >= SUM_LOW && sum <= SUM_HIGH) {
            return None;
        }
        Some(Vector3::new(u, v, w))
    }

    /// Same triangle projected onto the XY plane.
    pub fn flatten(&self) -> Triangle {
        Triangle::new(self.v0.flatten(), self.v1.flatten(), self.v2.flatten())
    }

    pub fn vertices(&self) -> [Vector3; 3] {
        [self.v0, self.v1, self.v2]
    }
}

#[inline(always)]
pub fn is_inside(weights: Vector3) -> bool {
    weights.x >= 0.0 && weights.y >= 0.0 && weights.z >= 0.0
}
