//! Delaunay triangulation of scattered sample positions.
//!
//! Incremental Bowyer-Watson insertion inside an enclosing super-triangle.
//! Triangles keep their neighbours, so each insertion walks from the most
//! recently created triangle to the one containing the new point and
//! grows the cavity of invalidated triangles through adjacency alone.
//! Triangles touching a super-triangle vertex are dropped at the end; the
//! remaining ones tile the convex hull of the samples.

use std::collections::HashMap;
use tracing::debug;

use super::common::{barycentric, dist_sq, orient2d, Bounds, BucketGrid};
use crate::error::{IsmipError, Result};

const NO_NEIGHBOR: usize = usize::MAX;

/// Super-triangle size relative to the sample extent.
const SUPER_TRIANGLE_SCALE: f64 = 64.0;

/// Relative margin below which a point counts as on, not in, a circumcircle.
const IN_CIRCLE_MARGIN: f64 = 1e-10;

/// Relative distance under which two samples are the same point.
const DUPLICATE_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone)]
struct Triangle {
    /// Counter-clockwise vertex ids
    v: [usize; 3],
    /// `n[k]` is across the edge opposite `v[k]`
    n: [usize; 3],
    center: [f64; 2],
    radius_sq: f64,
    alive: bool,
}

impl Triangle {
    fn new(v: [usize; 3], n: [usize; 3], vertices: &[[f64; 2]]) -> Self {
        let (center, radius_sq) = circumcircle(vertices[v[0]], vertices[v[1]], vertices[v[2]]);
        Self {
            v,
            n,
            center,
            radius_sq,
            alive: true,
        }
    }

    fn edge(&self, k: usize) -> (usize, usize) {
        (self.v[(k + 1) % 3], self.v[(k + 2) % 3])
    }

    fn circumcircle_contains(&self, p: [f64; 2]) -> bool {
        if !self.radius_sq.is_finite() {
            return true;
        }
        dist_sq(p, self.center) < self.radius_sq * (1.0 - IN_CIRCLE_MARGIN)
    }
}

/// Circumcentre and squared circumradius. Degenerate triangles get an
/// infinite radius so the next insertion that reaches them replaces them.
fn circumcircle(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> ([f64; 2], f64) {
    let (bx, by) = (b[0] - a[0], b[1] - a[1]);
    let (cx, cy) = (c[0] - a[0], c[1] - a[1]);
    let d = 2.0 * (bx * cy - by * cx);
    if d == 0.0 {
        return (a, f64::INFINITY);
    }
    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;
    let ux = (cy * b2 - by * c2) / d;
    let uy = (bx * c2 - cx * b2) / d;
    ([a[0] + ux, a[1] + uy], ux * ux + uy * uy)
}

/// A Delaunay triangulation of a point set.
#[derive(Debug, Clone)]
pub struct Triangulation {
    points: Vec<[f64; 2]>,
    triangles: Vec<[usize; 3]>,
    skipped: usize,
}

impl Triangulation {
    /// Triangulate `points`. Vertex ids in the result index into `points`.
    ///
    /// Points with non-finite coordinates and repeated points are left out.
    /// Fails if fewer than three usable points remain or all are collinear.
    pub fn new(points: &[[f64; 2]]) -> Result<Self> {
        let bounds = Bounds::from_points(points.iter()).ok_or_else(|| IsmipError::Interpolation {
            message: "no finite sample positions".to_string(),
        })?;
        let extent = bounds.extent();
        if extent <= 0.0 {
            return Err(IsmipError::Interpolation {
                message: "all sample positions coincide".to_string(),
            });
        }

        let mut builder = Builder::new(points, bounds);
        let mut skipped = 0;
        for (i, p) in points.iter().enumerate() {
            if !(p[0].is_finite() && p[1].is_finite()) || !builder.insert(i) {
                skipped += 1;
            }
        }

        let n = points.len();
        let triangles: Vec<[usize; 3]> = builder
            .triangles
            .iter()
            .filter(|t| t.alive && t.v.iter().all(|&v| v < n))
            .map(|t| t.v)
            .collect();

        if triangles.is_empty() {
            return Err(IsmipError::Interpolation {
                message: format!(
                    "cannot triangulate {} sample positions (fewer than three distinct or all collinear)",
                    n
                ),
            });
        }

        debug!(
            points = n,
            skipped = skipped,
            triangles = triangles.len(),
            "Triangulated sample positions"
        );

        Ok(Self {
            points: points.to_vec(),
            triangles,
            skipped,
        })
    }

    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    /// Counter-clockwise triangles as vertex ids.
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Number of input points left out as non-finite or repeated.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn corners(&self, t: usize) -> [[f64; 2]; 3] {
        let [a, b, c] = self.triangles[t];
        [self.points[a], self.points[b], self.points[c]]
    }
}

/// Working state of the incremental insertion.
struct Builder {
    vertices: Vec<[f64; 2]>,
    triangles: Vec<Triangle>,
    last: usize,
    area_eps: f64,
    duplicate_sq: f64,
    stamp: Vec<usize>,
    generation: usize,
}

impl Builder {
    fn new(points: &[[f64; 2]], bounds: Bounds) -> Self {
        let extent = bounds.extent();
        let mid = [
            0.5 * (bounds.min[0] + bounds.max[0]),
            0.5 * (bounds.min[1] + bounds.max[1]),
        ];
        let s = SUPER_TRIANGLE_SCALE * extent;

        let mut vertices = points.to_vec();
        let n = vertices.len();
        vertices.push([mid[0] - s, mid[1] - s]);
        vertices.push([mid[0] + s, mid[1] - s]);
        vertices.push([mid[0], mid[1] + s]);

        let root = Triangle::new([n, n + 1, n + 2], [NO_NEIGHBOR; 3], &vertices);
        Self {
            vertices,
            triangles: vec![root],
            last: 0,
            area_eps: 1e-14 * extent * extent,
            duplicate_sq: (DUPLICATE_TOLERANCE * extent).powi(2),
            stamp: vec![0],
            generation: 0,
        }
    }

    /// Walk towards `p`, stepping across any edge that has `p` on its outside.
    fn locate(&self, p: [f64; 2]) -> usize {
        let mut t = self.last;
        let limit = self.triangles.len();
        for _ in 0..limit {
            let tri = &self.triangles[t];
            let mut next = None;
            for k in 0..3 {
                let (a, b) = tri.edge(k);
                if orient2d(self.vertices[a], self.vertices[b], p) < -self.area_eps
                    && tri.n[k] != NO_NEIGHBOR
                {
                    next = Some(tri.n[k]);
                    break;
                }
            }
            match next {
                Some(nb) => t = nb,
                None => return t,
            }
        }
        // The walk can cycle on badly shaped meshes; fall back to a scan.
        self.triangles
            .iter()
            .enumerate()
            .filter(|(_, tri)| tri.alive)
            .find(|(_, tri)| {
                (0..3).all(|k| {
                    let (a, b) = tri.edge(k);
                    orient2d(self.vertices[a], self.vertices[b], p) >= -self.area_eps
                })
            })
            .map(|(i, _)| i)
            .unwrap_or(t)
    }

    /// Insert vertex `i`. Returns false if it repeats an existing vertex.
    fn insert(&mut self, i: usize) -> bool {
        let p = self.vertices[i];
        let seed = self.locate(p);

        let seed_tri = &self.triangles[seed];
        if seed_tri
            .v
            .iter()
            .any(|&v| dist_sq(self.vertices[v], p) <= self.duplicate_sq)
        {
            return false;
        }

        self.generation += 1;
        let generation = self.generation;

        // Cavity: the seed, neighbours across edges `p` lies on, and every
        // connected triangle whose circumcircle holds `p`.
        let mut cavity = vec![seed];
        self.stamp[seed] = generation;
        for k in 0..3 {
            let (a, b) = seed_tri.edge(k);
            let nb = seed_tri.n[k];
            if nb != NO_NEIGHBOR
                && orient2d(self.vertices[a], self.vertices[b], p).abs() <= self.area_eps
                && self.stamp[nb] != generation
            {
                self.stamp[nb] = generation;
                cavity.push(nb);
            }
        }

        let mut cursor = 0;
        while cursor < cavity.len() {
            let t = cavity[cursor];
            cursor += 1;
            for k in 0..3 {
                let nb = self.triangles[t].n[k];
                if nb == NO_NEIGHBOR || self.stamp[nb] == generation {
                    continue;
                }
                if self.triangles[nb].circumcircle_contains(p) {
                    self.stamp[nb] = generation;
                    cavity.push(nb);
                }
            }
        }

        // Boundary edges of the cavity, each with the triangle outside it.
        let mut boundary = Vec::new();
        for &t in &cavity {
            let tri = &self.triangles[t];
            for k in 0..3 {
                let nb = tri.n[k];
                if nb == NO_NEIGHBOR || self.stamp[nb] != generation {
                    let (a, b) = tri.edge(k);
                    boundary.push((a, b, nb));
                }
            }
        }

        for &t in &cavity {
            self.triangles[t].alive = false;
        }

        // Fan the boundary to `p`. Each new triangle is (a, b, p).
        let first_new = self.triangles.len();
        for &(a, b, outer) in &boundary {
            let id = self.triangles.len();
            let tri = Triangle::new([a, b, i], [NO_NEIGHBOR, NO_NEIGHBOR, outer], &self.vertices);
            self.triangles.push(tri);
            self.stamp.push(0);

            if outer != NO_NEIGHBOR {
                let outer_tri = &mut self.triangles[outer];
                for k in 0..3 {
                    let (oa, ob) = outer_tri.edge(k);
                    if oa == b && ob == a {
                        outer_tri.n[k] = id;
                        break;
                    }
                }
            }
        }

        // Stitch the fan: (a, b, p) meets the fan triangle starting at b
        // across edge (b, p) and the one ending at a across edge (p, a).
        let created = first_new..self.triangles.len();
        let mut by_start = HashMap::with_capacity(boundary.len());
        let mut by_end = HashMap::with_capacity(boundary.len());
        for id in created.clone() {
            let v = self.triangles[id].v;
            by_start.insert(v[0], id);
            by_end.insert(v[1], id);
        }
        for id in created {
            let v = self.triangles[id].v;
            if let Some(&next) = by_start.get(&v[1]) {
                self.triangles[id].n[0] = next;
            }
            if let Some(&prev) = by_end.get(&v[0]) {
                self.triangles[id].n[1] = prev;
            }
        }

        self.last = self.triangles.len() - 1;
        true
    }
}

/// Finds the triangle containing a query point through a bucket grid.
#[derive(Debug, Clone)]
pub struct TriangleLocator<'a> {
    triangulation: &'a Triangulation,
    grid: BucketGrid,
    slack: f64,
}

impl<'a> TriangleLocator<'a> {
    pub fn new(triangulation: &'a Triangulation) -> Self {
        let points = &triangulation.points;
        let used = triangulation
            .triangles
            .iter()
            .flat_map(move |t| t.iter().map(move |&v| &points[v]));
        let bounds = Bounds::from_points(used).unwrap_or(Bounds {
            min: [0.0, 0.0],
            max: [0.0, 0.0],
        });
        let slack = 1e-9 * bounds.extent();

        let mut grid = BucketGrid::new(bounds, triangulation.triangles.len());
        for t in 0..triangulation.triangles.len() {
            let [a, b, c] = triangulation.corners(t);
            let lo = [a[0].min(b[0]).min(c[0]), a[1].min(b[1]).min(c[1])];
            let hi = [a[0].max(b[0]).max(c[0]), a[1].max(b[1]).max(c[1])];
            grid.insert_box(t, lo, hi);
        }

        Self {
            triangulation,
            grid,
            slack,
        }
    }

    /// Triangle id and barycentric weights of `p`, or `None` outside the
    /// convex hull.
    pub fn locate(&self, p: [f64; 2]) -> Option<(usize, [f64; 3])> {
        if !self.grid.bounds().contains(p, self.slack) {
            return None;
        }
        self.grid.bucket_at(p).iter().find_map(|&t| {
            let [a, b, c] = self.triangulation.corners(t);
            barycentric(p, a, b, c).map(|w| (t, w))
        })
    }
}
