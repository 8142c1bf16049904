use crate::braille::BrailleCanvas;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Draw a thicker line (used to highlight the selected county)
pub fn draw_thick_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    draw_line(canvas, x0, y0, x1, y1);
    draw_line(canvas, x0 + 1, y0, x1 + 1, y1);
    draw_line(canvas, x0, y0 + 1, x1, y1 + 1);
}

/// Stroke a pixel-space path, skipping segments that lie entirely off the canvas.
/// Segments longer than `max_jump` are treated as breaks in the path.
pub fn stroke_path(
    canvas: &mut BrailleCanvas,
    points: &[(f64, f64)],
    max_jump: i32,
    thick: bool,
) {
    let (w, h) = ((canvas.width() * 2) as i32, (canvas.height() * 4) as i32);
    let mut prev: Option<(i32, i32)> = None;

    for &(x, y) in points {
        let p = (x.round() as i32, y.round() as i32);

        if let Some(q) = prev {
            let jump = (p.0 - q.0).abs() + (p.1 - q.1).abs();
            let visible = p.0.max(q.0) >= 0 && p.0.min(q.0) < w && p.1.max(q.1) >= 0 && p.1.min(q.1) < h;
            if jump < max_jump && visible {
                if thick {
                    draw_thick_line(canvas, q.0, q.1, p.0, p.1);
                } else {
                    draw_line(canvas, q.0, q.1, p.0, p.1);
                }
            }
        }

        prev = Some(p);
    }
}
