//! Sampled curves and curve intersection.
//!
//! A [`Curve`] is a piecewise-linear function given by strictly increasing
//! x samples. [`intersect`] reports every point where two curves cross
//! inside their shared domain.

use crate::error::{PecError, Result};

/// Piecewise-linear curve with strictly increasing x samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

/// A point where two curves meet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    pub x: f64,
    pub y: f64,
}

impl Curve {
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(PecError::Computation(format!(
                "curve has {} x samples but {} y samples",
                xs.len(),
                ys.len()
            )));
        }
        if xs.len() < 2 {
            return Err(PecError::Computation("curve needs at least two samples".into()));
        }
        if xs.windows(2).any(|w| w[1] <= w[0]) {
            return Err(PecError::Computation("curve x samples must be strictly increasing".into()));
        }
        if xs.iter().chain(&ys).any(|v| !v.is_finite()) {
            return Err(PecError::Computation("curve contains non-finite samples".into()));
        }
        Ok(Self { xs, ys })
    }

    /// Sample `f` at each x.
    pub fn from_fn<F>(xs: Vec<f64>, mut f: F) -> Result<Self>
    where
        F: FnMut(f64) -> Result<f64>,
    {
        let ys = xs.iter().map(|&x| f(x)).collect::<Result<Vec<_>>>()?;
        Self::new(xs, ys)
    }

    /// Horizontal line at `y` over `[x_min, x_max]`.
    pub fn constant(x_min: f64, x_max: f64, y: f64) -> Result<Self> {
        Self::new(vec![x_min, x_max], vec![y, y])
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Inclusive x range.
    pub fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }

    /// Interpolated y at `x`, or `None` outside the domain.
    pub fn y_at(&self, x: f64) -> Option<f64> {
        interpolate(&self.xs, &self.ys, x)
    }
}

/// Linear interpolation on strictly increasing `xs`. Exact at sample
/// points; `None` outside `[xs[0], xs[n-1]]`.
pub fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> Option<f64> {
    let n = xs.len();
    if n == 0 || x.is_nan() || x < xs[0] || x > xs[n - 1] {
        return None;
    }
    let k = xs.partition_point(|v| *v < x);
    if xs[k] == x {
        return Some(ys[k]);
    }
    let (x0, x1) = (xs[k - 1], xs[k]);
    let (y0, y1) = (ys[k - 1], ys[k]);
    Some(y0 + (y1 - y0) * (x - x0) / (x1 - x0))
}

/// `n` evenly spaced values from `start` to `stop` inclusive.
pub fn linear_grid(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// All crossings of `a` and `b` within their overlapping domain, in
/// ascending x.
///
/// Both curves are evaluated on the union of their breakpoints inside the
/// overlap. Between two breakpoints both are linear, so a sign change of
/// the difference locates the crossing exactly. A breakpoint where the
/// curves touch is reported once.
pub fn intersect(a: &Curve, b: &Curve) -> Vec<Crossing> {
    let (a_min, a_max) = a.domain();
    let (b_min, b_max) = b.domain();
    let lo = a_min.max(b_min);
    let hi = a_max.min(b_max);
    if lo > hi {
        return Vec::new();
    }

    let mut xs: Vec<f64> = a
        .xs
        .iter()
        .chain(&b.xs)
        .copied()
        .filter(|x| *x > lo && *x < hi)
        .collect();
    xs.push(lo);
    xs.push(hi);
    xs.sort_by(f64::total_cmp);
    xs.dedup();

    let mut diffs = Vec::with_capacity(xs.len());
    for &x in &xs {
        match (a.y_at(x), b.y_at(x)) {
            (Some(ya), Some(yb)) => diffs.push((x, ya, ya - yb)),
            _ => return Vec::new(),
        }
    }

    let mut crossings = Vec::new();
    for (i, &(x, ya, d)) in diffs.iter().enumerate() {
        if d == 0.0 {
            crossings.push(Crossing { x, y: ya });
            continue;
        }
        if let Some(&(x_next, _, d_next)) = diffs.get(i + 1) {
            if d * d_next < 0.0 {
                let t = d / (d - d_next);
                let xc = x + t * (x_next - x);
                let yc = a.y_at(xc).unwrap_or(ya);
                crossings.push(Crossing { x: xc, y: yc });
            }
        }
    }
    crossings
}

/// The lowest-x crossing of `a` and `b`.
pub fn first_crossing(a: &Curve, b: &Curve) -> Option<Crossing> {
    intersect(a, b).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_opposite_lines_cross_once_at_midpoint() {
        let a = Curve::new(vec![0.0, 10.0], vec![0.0, 10.0]).unwrap();
        let b = Curve::new(vec![0.0, 10.0], vec![10.0, 0.0]).unwrap();
        let crossings = intersect(&a, &b);
        assert_eq!(crossings, vec![Crossing { x: 5.0, y: 5.0 }]);
    }

    #[test]
    fn test_parallel_lines_never_cross() {
        let a = Curve::new(vec![0.0, 10.0], vec![0.0, 10.0]).unwrap();
        let b = Curve::new(vec![0.0, 10.0], vec![1.0, 11.0]).unwrap();
        assert!(intersect(&a, &b).is_empty());
        assert!(first_crossing(&a, &b).is_none());
    }

    #[test]
    fn test_disjoint_domains() {
        let a = Curve::new(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap();
        let b = Curve::new(vec![2.0, 3.0], vec![1.0, 0.0]).unwrap();
        assert!(intersect(&a, &b).is_empty());
    }

    #[test]
    fn test_touching_breakpoint_reported_once() {
        let a = Curve::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 0.0]).unwrap();
        let b = Curve::constant(0.0, 2.0, 1.0).unwrap();
        assert_eq!(intersect(&a, &b), vec![Crossing { x: 1.0, y: 1.0 }]);
    }

    #[test]
    fn test_multiple_crossings_sorted() {
        // Sawtooth against y = 0.5
        let a = Curve::new(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 1.0, 0.0, 1.0]).unwrap();
        let b = Curve::constant(0.0, 3.0, 0.5).unwrap();
        let xs: Vec<f64> = intersect(&a, &b).iter().map(|c| c.x).collect();
        assert_eq!(xs.len(), 3);
        assert_abs_diff_eq!(xs[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(xs[1], 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(xs[2], 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(first_crossing(&a, &b).unwrap().x, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_crossing_between_unaligned_samples() {
        let a = Curve::new(vec![0.0, 3.0, 10.0], vec![0.0, 3.0, 10.0]).unwrap();
        let b = Curve::new(vec![1.0, 7.0, 9.0], vec![9.0, 3.0, 1.0]).unwrap();
        let c = intersect(&a, &b);
        assert_eq!(c.len(), 1);
        assert_abs_diff_eq!(c[0].x, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c[0].y, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_interpolate_exact_and_outside() {
        let xs = [1.0, 2.0, 4.0];
        let ys = [10.0, 20.0, 0.0];
        assert_eq!(interpolate(&xs, &ys, 2.0), Some(20.0));
        assert_eq!(interpolate(&xs, &ys, 1.0), Some(10.0));
        assert_eq!(interpolate(&xs, &ys, 4.0), Some(0.0));
        assert_abs_diff_eq!(interpolate(&xs, &ys, 3.0).unwrap(), 10.0, epsilon = 1e-12);
        assert_eq!(interpolate(&xs, &ys, 0.5), None);
        assert_eq!(interpolate(&xs, &ys, 4.5), None);
    }

    #[test]
    fn test_invalid_curves_rejected() {
        assert!(Curve::new(vec![0.0], vec![0.0]).is_err());
        assert!(Curve::new(vec![0.0, 0.0], vec![0.0, 1.0]).is_err());
        assert!(Curve::new(vec![0.0, 1.0], vec![0.0, f64::NEG_INFINITY]).is_err());
    }

    #[test]
    fn test_linear_grid_endpoints() {
        let g = linear_grid(0.1, 25.0, 11);
        assert_eq!(g.len(), 11);
        assert_eq!(g[0], 0.1);
        assert_eq!(g[10], 25.0);
        assert!(g.windows(2).all(|w| w[1] > w[0]));
    }
}
