// Gaussian-approximation distributions and their closed-form algebra.

use std::iter::Sum;

// ---------------------------------------------------------------------------
// Value types
// ---------------------------------------------------------------------------

/// Parameters of a non-empty normal approximation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gaussian {
    /// Number of raw observations behind this distribution.
    pub samples: usize,
    pub mean: f64,
    pub variance: f64,
}

impl Gaussian {
    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }
}

/// Projected performance in one category for one player or team.
///
/// `Empty` carries no data and is the identity for every combinator: adding,
/// blending, or subtracting it leaves the other operand unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Distribution {
    #[default]
    Empty,
    Gaussian(Gaussian),
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl Distribution {
    /// Build from raw observations using the sample mean and the unbiased
    /// (n - 1) sample variance.
    ///
    /// An empty slice yields [`Distribution::Empty`]. A single observation has
    /// variance 0.
    pub fn from_samples(values: &[f64]) -> Self {
        if values.is_empty() {
            return Distribution::Empty;
        }
        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        Distribution::Gaussian(Gaussian {
            samples: n,
            mean,
            variance,
        })
    }

    /// Build from explicit parameters, e.g. when restoring a snapshot.
    ///
    /// Without a mean there is nothing to describe and the result is empty.
    /// A missing variance is derived from `std_dev` when one is supplied and
    /// is 0 otherwise.
    pub fn from_parameters(
        samples: Option<usize>,
        mean: Option<f64>,
        variance: Option<f64>,
        std_dev: Option<f64>,
    ) -> Self {
        let Some(mean) = mean else {
            return Distribution::Empty;
        };
        let variance = variance
            .or_else(|| std_dev.map(|sd| sd * sd))
            .unwrap_or(0.0);
        Distribution::Gaussian(Gaussian {
            samples: samples.unwrap_or(0),
            mean,
            variance,
        })
    }
}

// ---------------------------------------------------------------------------
// Accessors
// ---------------------------------------------------------------------------

impl Distribution {
    pub fn is_empty(&self) -> bool {
        matches!(self, Distribution::Empty)
    }

    pub fn gaussian(&self) -> Option<&Gaussian> {
        match self {
            Distribution::Empty => None,
            Distribution::Gaussian(g) => Some(g),
        }
    }

    pub fn sample_count(&self) -> Option<usize> {
        self.gaussian().map(|g| g.samples)
    }

    pub fn mean(&self) -> Option<f64> {
        self.gaussian().map(|g| g.mean)
    }

    pub fn variance(&self) -> Option<f64> {
        self.gaussian().map(|g| g.variance)
    }

    pub fn std_dev(&self) -> Option<f64> {
        self.gaussian().map(Gaussian::std_dev)
    }
}

// ---------------------------------------------------------------------------
// Algebra
// ---------------------------------------------------------------------------

impl Distribution {
    /// Mixture-style blend of two distributions:
    ///
    /// `mean = wa*a.mean + wb*b.mean`
    /// `variance = wa*a.var + wb*b.var + wa*wb*(a.mean - b.mean)^2`
    ///
    /// Rankings downstream depend on this exact shape, including the cross
    /// term, so it is not a pooled-variance estimator.
    pub fn weighted_combine(a: &Self, b: &Self, weight_a: f64, weight_b: f64) -> Self {
        match (a, b) {
            (Distribution::Empty, _) => *b,
            (_, Distribution::Empty) => *a,
            (Distribution::Gaussian(a), Distribution::Gaussian(b)) => {
                Distribution::Gaussian(Gaussian {
                    samples: a.samples + b.samples,
                    mean: weight_a * a.mean + weight_b * b.mean,
                    variance: weight_a * a.variance
                        + weight_b * b.variance
                        + weight_a * weight_b * (a.mean - b.mean).powi(2),
                })
            }
        }
    }

    /// Sum of two independent quantities: means and variances both add.
    pub fn add(&self, other: &Self) -> Self {
        match (self, other) {
            (Distribution::Empty, _) => *other,
            (_, Distribution::Empty) => *self,
            (Distribution::Gaussian(a), Distribution::Gaussian(b)) => {
                Distribution::Gaussian(Gaussian {
                    samples: a.samples + b.samples,
                    mean: a.mean + b.mean,
                    variance: a.variance + b.variance,
                })
            }
        }
    }

    /// Difference of two independent quantities. Means subtract; variances
    /// still add, so `(a + b) - b` recovers `a.mean` but not `a.variance`.
    pub fn subtract(&self, other: &Self) -> Self {
        match (self, other) {
            (_, Distribution::Empty) => *self,
            (Distribution::Empty, Distribution::Gaussian(b)) => Distribution::Gaussian(Gaussian {
                samples: b.samples,
                mean: -b.mean,
                variance: b.variance,
            }),
            (Distribution::Gaussian(a), Distribution::Gaussian(b)) => {
                Distribution::Gaussian(Gaussian {
                    samples: a.samples + b.samples,
                    mean: a.mean - b.mean,
                    variance: a.variance + b.variance,
                })
            }
        }
    }

    /// Distribution of the sum of `k` independent draws from `self`.
    ///
    /// Variance scales by `k`, not `k^2`: a week of 3.5 games is 3.5 draws,
    /// not one game multiplied by 3.5.
    pub fn scale(&self, k: f64) -> Self {
        match self {
            Distribution::Empty => Distribution::Empty,
            Distribution::Gaussian(g) => Distribution::Gaussian(Gaussian {
                samples: g.samples,
                mean: g.mean * k,
                variance: g.variance * k,
            }),
        }
    }
}

impl std::ops::Add for Distribution {
    type Output = Distribution;

    fn add(self, other: Distribution) -> Self::Output {
        Distribution::add(&self, &other)
    }
}

impl std::ops::Sub for Distribution {
    type Output = Distribution;

    fn sub(self, other: Distribution) -> Self::Output {
        self.subtract(&other)
    }
}

impl Sum for Distribution {
    fn sum<I>(iter: I) -> Self
    where
        I: Iterator<Item = Self>,
    {
        iter.fold(Distribution::Empty, |acc, d| acc + d)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
