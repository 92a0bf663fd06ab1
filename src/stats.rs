use std::ops::Range;

use serde::Serialize;

/// Fixed-width histogram over an explicit range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    /// Inclusive start, exclusive end; the last bin also holds its end.
    pub range: Range<f64>,
    pub count: u64,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.range.start + self.range.end) / 2.0
    }
}

impl Histogram {
    /// Counts `values` into `num_bins` equal-width bins spanning `range`.
    ///
    /// Values outside the range are ignored. An empty, inverted or unbounded
    /// range yields a histogram with no bins.
    #[must_use]
    pub fn new<I>(values: I, num_bins: usize, range: Range<f64>) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        if num_bins == 0 || !(range.end > range.start) || !(range.end - range.start).is_finite() {
            return Self { bins: Vec::new() };
        }

        let width = (range.end - range.start) / num_bins as f64;
        let mut bins = (0..num_bins)
            .map(|i| HistogramBin {
                range: range.start + width * i as f64..range.start + width * (i + 1) as f64,
                count: 0,
            })
            .collect::<Vec<_>>();

        for value in values {
            if value < range.start || value > range.end {
                continue;
            }
            let index = (((value - range.start) / width) as usize).min(num_bins - 1);
            bins[index].count += 1;
        }

        Self { bins }
    }

    pub fn total(&self) -> u64 {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn max_count(&self) -> u64 {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

/// Min, quartiles and max of a sample; what a box plot draws.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FiveNumberSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl FiveNumberSummary {
    /// Returns `None` for an empty slice.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.windows(2).all(|w| w[0] <= w[1]),
            "values must be sorted in ascending order"
        );

        Some(Self {
            count: sorted_values.len(),
            min: *sorted_values.first()?,
            q1: quantile(sorted_values, 0.25)?,
            median: quantile(sorted_values, 0.5)?,
            q3: quantile(sorted_values, 0.75)?,
            max: *sorted_values.last()?,
        })
    }
}

/// Linear-interpolated quantile of sorted values, `q` in `[0, 1]`.
pub fn quantile(sorted_values: &[f64], q: f64) -> Option<f64> {
    let last = sorted_values.len().checked_sub(1)?;
    let position = q.clamp(0.0, 1.0) * last as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted_values[lower] + (sorted_values[upper] - sorted_values[lower]) * fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_counts_each_value_once() {
        let histogram = Histogram::new([0.0, 1.0, 2.5, 5.0, 7.5, 10.0, 11.0], 4, 0.0..10.0);
        let counts = histogram.bins.iter().map(|b| b.count).collect::<Vec<_>>();
        assert_eq!(counts, vec![2, 1, 1, 2]);
        assert_eq!(histogram.total(), 6);
        assert_eq!(histogram.max_count(), 2);
        assert_eq!(histogram.bins[0].center(), 1.25);
    }

    #[test]
    fn histogram_last_bin_includes_range_end() {
        let histogram = Histogram::new([1.0, 2.0, 9.5, 10.0], 2, 0.0..10.0);
        assert_eq!(histogram.bins[0].count, 2);
        assert_eq!(histogram.bins[1].count, 2);
        assert_eq!(histogram.total(), 4);
    }

    #[test]
    fn histogram_with_empty_range_has_no_bins() {
        assert!(Histogram::new([1.0], 5, 3.0..3.0).bins.is_empty());
        assert!(Histogram::new([1.0], 0, 0.0..3.0).bins.is_empty());
        assert!(Histogram::new([1.0], 5, 0.0..f64::INFINITY).bins.is_empty());
    }

    #[test]
    fn five_number_summary_interpolates() {
        let summary = FiveNumberSummary::from_sorted(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(summary.count, 5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.q1, 2.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.q3, 4.0);
        assert_eq!(summary.max, 5.0);

        let even = FiveNumberSummary::from_sorted(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(even.median, 2.5);
        assert_eq!(even.q1, 1.75);
    }

    #[test]
    fn five_number_summary_of_nothing() {
        assert_eq!(FiveNumberSummary::from_sorted(&[]), None);
        assert_eq!(quantile(&[], 0.5), None);
    }
}
