//! Common utilities for interpolation algorithms.
//!
//! Geometry predicates, bounding boxes, the uniform bucket grid used to
//! find triangles and samples near a query point, and the [`Stencil`]
//! type shared by every method.

/// Barycentric weights below `-BARYCENTRIC_TOLERANCE` put a point outside a triangle.
pub const BARYCENTRIC_TOLERANCE: f64 = 1e-10;

/// Twice the signed area of `(a, b, c)`; positive when counter-clockwise.
#[inline]
pub fn orient2d(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Squared Euclidean distance
#[inline]
pub fn dist_sq(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

/// Barycentric coordinates of `p` in triangle `(a, b, c)`, or `None` if
/// the triangle is degenerate or `p` lies outside it.
pub fn barycentric(p: [f64; 2], a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> Option<[f64; 3]> {
    let area = orient2d(a, b, c);
    if area == 0.0 || !area.is_finite() {
        return None;
    }
    let wa = orient2d(p, b, c) / area;
    let wb = orient2d(a, p, c) / area;
    let wc = 1.0 - wa - wb;
    let inside = wa >= -BARYCENTRIC_TOLERANCE
        && wb >= -BARYCENTRIC_TOLERANCE
        && wc >= -BARYCENTRIC_TOLERANCE;
    inside.then_some([wa, wb, wc])
}

/// Weights of up to three samples that make up one interpolated value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stencil {
    pub vertices: [usize; 3],
    pub weights: [f64; 3],
}

impl Stencil {
    /// A stencil copying a single sample.
    pub fn single(vertex: usize) -> Self {
        Self {
            vertices: [vertex; 3],
            weights: [1.0, 0.0, 0.0],
        }
    }

    /// Weighted sum of `values`. Non-finite contributions give `None`.
    pub fn apply(&self, values: &[f64]) -> Option<f64> {
        let mut sum = 0.0;
        for (&v, &w) in self.vertices.iter().zip(self.weights.iter()) {
            if w == 0.0 {
                continue;
            }
            sum += w * values.get(v).copied()?;
        }
        sum.is_finite().then_some(sum)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Bounds {
    /// Bounds of the finite points, or `None` if there are none.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a [f64; 2]>,
    {
        let mut bounds: Option<Bounds> = None;
        for p in points.into_iter().filter(|p| is_finite_point(**p)) {
            let b = bounds.get_or_insert(Bounds { min: *p, max: *p });
            b.min[0] = b.min[0].min(p[0]);
            b.min[1] = b.min[1].min(p[1]);
            b.max[0] = b.max[0].max(p[0]);
            b.max[1] = b.max[1].max(p[1]);
        }
        bounds
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    /// Larger of width and height.
    pub fn extent(&self) -> f64 {
        self.width().max(self.height())
    }

    /// Containment with an absolute slack.
    pub fn contains(&self, p: [f64; 2], slack: f64) -> bool {
        p[0] >= self.min[0] - slack
            && p[0] <= self.max[0] + slack
            && p[1] >= self.min[1] - slack
            && p[1] <= self.max[1] + slack
    }
}

#[inline]
pub fn is_finite_point(p: [f64; 2]) -> bool {
    p[0].is_finite() && p[1].is_finite()
}

/// Uniform grid of buckets over a bounding box, each holding item ids.
#[derive(Debug, Clone)]
pub struct BucketGrid {
    bounds: Bounds,
    nx: usize,
    ny: usize,
    cell_w: f64,
    cell_h: f64,
    cells: Vec<Vec<usize>>,
}

impl BucketGrid {
    /// About one bucket per expected item, capped to keep memory bounded.
    pub fn new(bounds: Bounds, expected_items: usize) -> Self {
        let side = ((expected_items as f64).sqrt().ceil() as usize).clamp(1, 1024);
        let nx = side;
        let ny = side;
        let cell_w = (bounds.width() / nx as f64).max(f64::MIN_POSITIVE);
        let cell_h = (bounds.height() / ny as f64).max(f64::MIN_POSITIVE);
        Self {
            bounds,
            nx,
            ny,
            cell_w,
            cell_h,
            cells: vec![Vec::new(); nx * ny],
        }
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Bucket column/row holding `p`, clamped to the grid.
    pub fn cell_of(&self, p: [f64; 2]) -> (usize, usize) {
        let clamp = |v: f64, n: usize| -> usize {
            if v.is_nan() || v < 0.0 {
                0
            } else {
                (v as usize).min(n - 1)
            }
        };
        let i = clamp((p[0] - self.bounds.min[0]) / self.cell_w, self.nx);
        let j = clamp((p[1] - self.bounds.min[1]) / self.cell_h, self.ny);
        (i, j)
    }

    /// Register `id` in every bucket overlapped by the box `[lo, hi]`.
    pub fn insert_box(&mut self, id: usize, lo: [f64; 2], hi: [f64; 2]) {
        let (i0, j0) = self.cell_of(lo);
        let (i1, j1) = self.cell_of(hi);
        for j in j0..=j1 {
            for i in i0..=i1 {
                self.cells[j * self.nx + i].push(id);
            }
        }
    }

    /// Items registered in bucket `(i, j)`.
    pub fn bucket(&self, i: usize, j: usize) -> &[usize] {
        &self.cells[j * self.nx + i]
    }

    /// Items registered in the bucket containing `p`.
    pub fn bucket_at(&self, p: [f64; 2]) -> &[usize] {
        let (i, j) = self.cell_of(p);
        self.bucket(i, j)
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    /// Smaller bucket side length.
    pub fn cell_size(&self) -> f64 {
        self.cell_w.min(self.cell_h)
    }
}
