use crate::color::Color;
use crate::screen::Framebuffer;

/// Bresenham line from `(x0, y0)` to `(x1, y1)`, both ends inclusive.
///
/// Endpoints must lie inside `fb`; the framebuffer faults otherwise.
/// Steep lines are walked along y so there are no gaps.
pub fn draw_line(fb: &mut Framebuffer, x0: usize, y0: usize, x1: usize, y1: usize, color: Color) {
    let (mut x0, mut y0, mut x1, mut y1) = (x0 as i64, y0 as i64, x1 as i64, y1 as i64);

    let steep = (x1 - x0).abs() < (y1 - y0).abs();
    if steep {
        std::mem::swap(&mut x0, &mut y0);
        std::mem::swap(&mut x1, &mut y1);
    }
    if x0 > x1 {
        std::mem::swap(&mut x0, &mut x1);
        std::mem::swap(&mut y0, &mut y1);
    }

    let dx = x1 - x0;
    let derr = 2 * (y1 - y0).abs();
    let ystep = if y1 > y0 { 1 } else { -1 };
    let mut err = 0;
    let mut y = y0;

    for x in x0..=x1 {
        if steep {
            fb.set(y as usize, x as usize, color);
        } else {
            fb.set(x as usize, y as usize, color);
        }
        err += derr;
        if err > dx {
            y += ystep;
            err -= 2 * dx;
        }
    }
}
