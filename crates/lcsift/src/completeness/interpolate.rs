//! Piecewise-linear interpolation over sorted sample points.

/// Value returned when evaluating outside the sampled range.
pub const OUT_OF_DOMAIN: f64 = 0.0;

/// Linear interpolant through `(x, y)` points.
///
/// Points with a non-finite coordinate are dropped. The remaining points are
/// sorted by `x`; for repeated `x` the first point in input order is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolant {
    xs: Vec<f64>,
    ys: Vec<f64>,
    monotonic: bool,
}

impl Interpolant {
    pub fn new(points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let input: Vec<(f64, f64)> = points.into_iter().collect();
        let mut points: Vec<(f64, f64)> = input
            .iter()
            .copied()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        points.dedup_by(|later, earlier| later.0 == earlier.0);

        let monotonic = sorted_either_way(&input);
        let (xs, ys) = points.into_iter().unzip();
        Self { xs, ys, monotonic }
    }

    /// Number of usable points.
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Whether at least two points remain to interpolate between.
    pub fn is_defined(&self) -> bool {
        self.len() >= 2
    }

    /// Lower and upper `x` bounds, if any point survived.
    pub fn domain(&self) -> Option<(f64, f64)> {
        Some((*self.xs.first()?, *self.xs.last()?))
    }

    /// Whether `x` moves in a single direction in input order.
    ///
    /// For binned statistics the input order is ascending redshift, so
    /// this tells whether the statistic is monotonic in redshift.
    pub fn is_monotonic(&self) -> bool {
        self.monotonic
    }

    /// Interpolated `y` at `x`. Exact sample hits return the sample `y`;
    /// anything outside the domain returns [`OUT_OF_DOMAIN`].
    pub fn eval(&self, x: f64) -> f64 {
        let (low, high) = match self.domain() {
            Some(bounds) => bounds,
            None => return OUT_OF_DOMAIN,
        };
        if !x.is_finite() || x < low || x > high {
            return OUT_OF_DOMAIN;
        }

        match self.xs.binary_search_by(|probe| probe.total_cmp(&x)) {
            Ok(index) => self.ys[index],
            Err(index) => {
                // low < x < high, so 0 < index < len
                let (x0, x1) = (self.xs[index - 1], self.xs[index]);
                let (y0, y1) = (self.ys[index - 1], self.ys[index]);
                y0 + (y1 - y0) * (x - x0) / (x1 - x0)
            }
        }
    }
}

/// Finite `x` values are all non-decreasing or all non-increasing.
fn sorted_either_way(points: &[(f64, f64)]) -> bool {
    let xs: Vec<f64> = points
        .iter()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, _)| *x)
        .collect();
    xs.windows(2).all(|w| w[0] <= w[1]) || xs.windows(2).all(|w| w[0] >= w[1])
}
