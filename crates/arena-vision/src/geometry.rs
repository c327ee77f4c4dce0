//! Polygon primitives backing the exclusion-mask filter: boundary tracing
//! of a binary mask bitmap and a strict point-in-polygon test.

use image::GrayImage;

/// Integer pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Closed polygon given as an ordered boundary pixel chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// True iff `p` lies strictly inside the polygon. Points on the
    /// boundary count as outside.
    pub fn contains_strict(&self, p: Point) -> bool {
        if self.points.len() < 3 {
            return false;
        }
        if self.on_boundary(p) {
            return false;
        }
        // even-odd ray cast along +x
        let mut inside = false;
        let n = self.points.len();
        let mut j = n - 1;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[j];
            if (a.y > p.y) != (b.y > p.y) {
                let cross_x =
                    a.x as f64 + (p.y - a.y) as f64 * (b.x - a.x) as f64 / (b.y - a.y) as f64;
                if (p.x as f64) < cross_x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    fn on_boundary(&self, p: Point) -> bool {
        let n = self.points.len();
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            let cross = (b.x - a.x) as i64 * (p.y - a.y) as i64
                - (b.y - a.y) as i64 * (p.x - a.x) as i64;
            if cross != 0 {
                continue;
            }
            if p.x >= a.x.min(b.x)
                && p.x <= a.x.max(b.x)
                && p.y >= a.y.min(b.y)
                && p.y <= a.y.max(b.y)
            {
                return true;
            }
        }
        false
    }
}

/// Moore neighborhood, clockwise starting west.
const NEIGHBORS: [(i32, i32); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

fn neighbor_index(dx: i32, dy: i32) -> usize {
    match (dx, dy) {
        (-1, 0) => 0,
        (-1, -1) => 1,
        (0, -1) => 2,
        (1, -1) => 3,
        (1, 0) => 4,
        (1, 1) => 5,
        (0, 1) => 6,
        (-1, 1) => 7,
        // the backtrack pixel is always 8-adjacent to the current one
        _ => unreachable!("backtrack not in the Moore neighborhood"),
    }
}

/// Trace the boundary of every foreground component in a binary bitmap as
/// an ordered pixel chain (Moore-neighbor tracing, clockwise, with
/// Jacob's stopping criterion).
pub fn trace_boundaries(mask: &GrayImage) -> Vec<Polygon> {
    let (w, h) = mask.dimensions();
    let fg = |x: i32, y: i32| -> bool {
        x >= 0 && y >= 0 && (x as u32) < w && (y as u32) < h && mask.get_pixel(x as u32, y as u32)[0] > 0
    };
    let mut traced = vec![false; (w as usize) * (h as usize)];
    let mut polygons = Vec::new();

    for y in 0..h as i32 {
        for x in 0..w as i32 {
            if !fg(x, y) || fg(x - 1, y) || traced[(y as u32 * w + x as u32) as usize] {
                continue;
            }
            let contour = trace_from(Point::new(x, y), &fg, (w as usize) * (h as usize));
            for p in &contour {
                traced[(p.y as u32 * w + p.x as u32) as usize] = true;
            }
            polygons.push(Polygon::new(contour));
        }
    }
    polygons
}

fn trace_from(start: Point, fg: &dyn Fn(i32, i32) -> bool, limit: usize) -> Vec<Point> {
    // entered from the left edge scan, so the west neighbor is background
    let initial_back = Point::new(start.x - 1, start.y);
    let mut cur = start;
    let mut back = initial_back;
    let mut contour = vec![start];

    loop {
        let start_dir = neighbor_index(back.x - cur.x, back.y - cur.y);
        let mut found = None;
        let mut last_bg = back;
        for step in 1..=8 {
            let d = (start_dir + step) % 8;
            let (dx, dy) = NEIGHBORS[d];
            let cand = Point::new(cur.x + dx, cur.y + dy);
            if fg(cand.x, cand.y) {
                found = Some((cand, last_bg));
                break;
            }
            last_bg = cand;
        }
        let Some((next, bg)) = found else {
            // isolated pixel
            break;
        };
        cur = next;
        back = bg;
        if cur == start && back == initial_back {
            break;
        }
        contour.push(cur);
        if contour.len() > limit {
            break;
        }
    }
    contour
}
