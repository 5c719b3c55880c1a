//! Plane geometry for checkbox candidates: bounding rectangles, polygon
//! simplification and the squareness tests applied to contours.

use imageproc::point::Point;
use serde::Serialize;

/// Axis-aligned box in page pixel coordinates, inclusive of its edge pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoxRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl BoxRect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        BoxRect { x, y, w, h }
    }

    /// Tight box around a set of contour points.
    pub fn enclosing(points: &[Point<u32>]) -> Option<BoxRect> {
        let first = points.first()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in points {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Some(BoxRect::new(x0, y0, x1 - x0 + 1, y1 - y0 + 1))
    }

    pub fn area(&self) -> u64 {
        u64::from(self.w) * u64::from(self.h)
    }

    pub fn aspect_ratio(&self) -> f64 {
        if self.h == 0 {
            return 0.0;
        }
        f64::from(self.w) / f64::from(self.h)
    }

    /// Integer center, rounding toward the top-left.
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    pub fn offset(self, dx: u32, dy: u32) -> BoxRect {
        BoxRect::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Intersection over union.
    pub fn iou(&self, other: &BoxRect) -> f64 {
        let ix0 = self.x.max(other.x);
        let iy0 = self.y.max(other.y);
        let ix1 = (self.x + self.w).min(other.x + other.w);
        let iy1 = (self.y + self.h).min(other.y + other.h);
        if ix1 <= ix0 || iy1 <= iy0 {
            return 0.0;
        }
        let inter = u64::from(ix1 - ix0) * u64::from(iy1 - iy0);
        let union = self.area() + other.area() - inter;
        if union == 0 {
            return 0.0;
        }
        inter as f64 / union as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    fn sub(self, o: Vertex) -> Vertex {
        Vertex {
            x: self.x - o.x,
            y: self.y - o.y,
        }
    }

    fn dist2(self, o: Vertex) -> f64 {
        let d = self.sub(o);
        d.x * d.x + d.y * d.y
    }
}

impl From<&Point<u32>> for Vertex {
    fn from(p: &Point<u32>) -> Self {
        Vertex {
            x: f64::from(p.x),
            y: f64::from(p.y),
        }
    }
}

/// Length of the closed polyline through `points`.
pub fn closed_perimeter(points: &[Vertex]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| points[i].dist2(points[(i + 1) % n]).sqrt())
        .sum()
}

/// Douglas-Peucker simplification of a closed contour.
///
/// The ring is split at the point farthest from the first one and each
/// half is simplified as an open chain.
pub fn approximate_closed(points: &[Vertex], epsilon: f64) -> Vec<Vertex> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }
    let first = points[0];
    let far = (1..n)
        .max_by(|&a, &b| {
            points[a]
                .dist2(first)
                .total_cmp(&points[b].dist2(first))
        })
        .unwrap_or(0);
    if points[far].dist2(first) == 0.0 {
        return vec![first];
    }

    let mut ring_back: Vec<Vertex> = points[far..].to_vec();
    ring_back.push(first);

    let mut out = simplify_chain(&points[..=far], epsilon);
    out.pop();
    out.extend(simplify_chain(&ring_back, epsilon));
    out.pop();
    out
}

/// Iterative Douglas-Peucker on an open chain; keeps both endpoints.
fn simplify_chain(points: &[Vertex], epsilon: f64) -> Vec<Vertex> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut stack = vec![(0, last)];
    while let Some((start, end)) = stack.pop() {
        if end - start <= 1 {
            continue;
        }
        let mut max_dist = 0.0;
        let mut max_index = start;
        for i in (start + 1)..end {
            let d = distance_to_segment_line(points[i], points[start], points[end]);
            if d > max_dist {
                max_dist = d;
                max_index = i;
            }
        }
        if max_dist > epsilon {
            keep[max_index] = true;
            stack.push((start, max_index));
            stack.push((max_index, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

fn distance_to_segment_line(p: Vertex, a: Vertex, b: Vertex) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return p.dist2(a).sqrt();
    }
    ((p.x - a.x) * dy - (p.y - a.y) * dx).abs() / len
}

/// True when every turn of the closed polygon goes the same way.
pub fn is_convex(poly: &[Vertex]) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0.0f64;
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        let c = poly[(i + 2) % n];
        let ab = b.sub(a);
        let bc = c.sub(b);
        let cross = ab.x * bc.y - ab.y * bc.x;
        if cross == 0.0 {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    sign != 0.0
}

/// Largest |cos| over the corners of the first four vertices, after
/// ordering all vertices by angle around their centroid. Zero for a
/// perfect rectangle.
pub fn max_corner_cosine(poly: &[Vertex]) -> f64 {
    if poly.len() < 4 {
        return 1.0;
    }
    let n = poly.len() as f64;
    let cx = poly.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = poly.iter().map(|p| p.y).sum::<f64>() / n;
    let mut ordered = poly.to_vec();
    ordered.sort_by(|a, b| {
        (a.y - cy)
            .atan2(a.x - cx)
            .total_cmp(&(b.y - cy).atan2(b.x - cx))
    });

    (0..4)
        .map(|i| {
            let prev = ordered[(i + 3) % 4];
            let here = ordered[i];
            let next = ordered[(i + 1) % 4];
            corner_cosine(prev, here, next)
        })
        .fold(0.0, f64::max)
}

fn corner_cosine(p0: Vertex, p1: Vertex, p2: Vertex) -> f64 {
    let v1 = p0.sub(p1);
    let v2 = p2.sub(p1);
    let num = v1.x * v2.x + v1.y * v2.y;
    let mut den = (v1.x * v1.x + v1.y * v1.y).sqrt() * (v2.x * v2.x + v2.y * v2.y).sqrt();
    if den == 0.0 {
        den = 1.0;
    }
    (num / den).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> Vertex {
        Vertex { x, y }
    }

    /// Outline of an axis-aligned square, one vertex per pixel step.
    fn square_outline(x0: f64, y0: f64, side: f64) -> Vec<Vertex> {
        let mut pts = Vec::new();
        let s = side as i64;
        for i in 0..s {
            pts.push(v(x0 + i as f64, y0));
        }
        for i in 0..s {
            pts.push(v(x0 + side, y0 + i as f64));
        }
        for i in 0..s {
            pts.push(v(x0 + side - i as f64, y0 + side));
        }
        for i in 0..s {
            pts.push(v(x0, y0 + side - i as f64));
        }
        pts
    }

    #[test]
    fn test_iou_identical_and_disjoint() {
        let a = BoxRect::new(10, 10, 30, 30);
        assert!((a.iou(&a) - 1.0).abs() < 1e-9);
        let far = BoxRect::new(100, 100, 30, 30);
        assert_eq!(a.iou(&far), 0.0);
        let touching = BoxRect::new(40, 10, 30, 30);
        assert_eq!(a.iou(&touching), 0.0);
    }

    #[test]
    fn test_iou_partial_overlap() {
        let a = BoxRect::new(0, 0, 10, 10);
        let b = BoxRect::new(5, 0, 10, 10);
        // 50 / (100 + 100 - 50)
        assert!((a.iou(&b) - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_enclosing_rect_is_inclusive() {
        let pts = [Point::new(3u32, 4u32), Point::new(7, 4), Point::new(7, 9), Point::new(3, 9)];
        assert_eq!(BoxRect::enclosing(&pts), Some(BoxRect::new(3, 4, 5, 6)));
        assert_eq!(BoxRect::enclosing(&[]), None);
    }

    #[test]
    fn test_center_rounds_down() {
        assert_eq!(BoxRect::new(10, 20, 25, 25).center(), (22, 32));
    }

    #[test]
    fn test_square_outline_simplifies_to_four_corners() {
        let outline = square_outline(10.0, 10.0, 30.0);
        let eps = 0.03 * closed_perimeter(&outline);
        let poly = approximate_closed(&outline, eps);
        assert_eq!(poly.len(), 4);
        assert!(is_convex(&poly));
        assert!(max_corner_cosine(&poly) < 0.01);
    }

    #[test]
    fn test_skewed_quad_fails_cosine_check() {
        let rhombus = [v(0.0, 0.0), v(30.0, 0.0), v(45.0, 30.0), v(15.0, 30.0)];
        assert!(is_convex(&rhombus));
        assert!(max_corner_cosine(&rhombus) > 0.35);
    }

    #[test]
    fn test_concave_polygon() {
        let arrow = [v(0.0, 0.0), v(20.0, 10.0), v(0.0, 20.0), v(8.0, 10.0)];
        assert!(!is_convex(&arrow));
    }

    #[test]
    fn test_perimeter() {
        let sq = [v(0.0, 0.0), v(10.0, 0.0), v(10.0, 10.0), v(0.0, 10.0)];
        assert!((closed_perimeter(&sq) - 40.0).abs() < 1e-9);
    }
}
