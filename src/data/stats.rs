use serde::Serialize;

// ---------------------------------------------------------------------------
// Descriptive statistics shared by charts and the profiling report
// ---------------------------------------------------------------------------

/// Linear-interpolated quantile over an ascending slice (pandas' default).
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = p * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let w = rank - lo as f64;
        sorted[lo] * (1.0 - w) + sorted[hi] * w
    }
}

pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    v
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (ddof = 1).
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Pearson correlation of paired samples; `None` when either side is constant.
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx).powi(2);
        syy += (y - my).powi(2);
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

// ---------------------------------------------------------------------------
// Binning
// ---------------------------------------------------------------------------

/// One histogram bin, half-open `[start, end)` except the last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Bin layout chosen by [`nice_bins`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinLayout {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl BinLayout {
    pub fn n_bins(&self) -> usize {
        (((self.stop - self.start) / self.step).round() as usize).max(1)
    }
}

/// Choose human-friendly bin boundaries for `[min, max]` with at most
/// `max_bins` bins: steps are powers of ten, optionally divided by 5 or 2.
pub fn nice_bins(min: f64, max: f64, max_bins: usize) -> BinLayout {
    const BASE: f64 = 10.0;
    const DIVIDES: [f64; 2] = [5.0, 2.0];

    let max_bins = max_bins.max(1) as f64;
    let mut span = max - min;
    if span <= 0.0 {
        span = if min != 0.0 { min.abs() } else { 1.0 };
    }

    let mut step = BASE.powf((span.log10()).round() - 1.0);
    while (span / step).ceil() > max_bins {
        step *= BASE;
    }
    for div in DIVIDES {
        let v = step / div;
        if span / v <= max_bins {
            step = v;
        }
    }

    let precision = if step.log10() >= 0.0 {
        0
    } else {
        (-step.log10()).floor() as i32 + 1
    };
    let eps = BASE.powi(-precision - 1);

    let v = (min / step + eps).floor() * step;
    let start = if min < v { v - step } else { v };
    let mut stop = (max / step).ceil() * step;
    if stop <= start {
        stop = start + step;
    }
    BinLayout { start, stop, step }
}

/// Count values into the bins of `layout`. Values at the upper edge land in
/// the last bin.
pub fn histogram(values: &[f64], layout: BinLayout) -> Vec<Bin> {
    let n = layout.n_bins();
    let mut bins: Vec<Bin> = (0..n)
        .map(|i| Bin {
            start: layout.start + layout.step * i as f64,
            end: layout.start + layout.step * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for &v in values {
        if !v.is_finite() {
            continue;
        }
        let idx = ((v - layout.start) / layout.step + 1e-12).floor();
        let idx = (idx.max(0.0) as usize).min(n - 1);
        bins[idx].count += 1;
    }
    bins
}

/// Histogram with exactly `n` equal-width bins over the data range.
pub fn equal_width_histogram(values: &[f64], n: usize) -> Vec<Bin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (Some(min), Some(max)) = (
        finite.iter().copied().reduce(f64::min),
        finite.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };
    let step = if max > min { (max - min) / n as f64 } else { 1.0 };
    histogram(&finite, BinLayout { start: min, stop: min + step * n as f64, step })
}

// ---------------------------------------------------------------------------
// Box-and-whisker summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
    pub count: usize,
}

/// Tukey box: whiskers reach the most extreme values within 1.5·IQR.
pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
    if values.is_empty() {
        return None;
    }
    let ys = sorted(values);
    let q1 = percentile(&ys, 0.25);
    let median = percentile(&ys, 0.5);
    let q3 = percentile(&ys, 0.75);
    let iqr = q3 - q1;
    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;

    let lower_whisker = ys.iter().copied().find(|&v| v >= lower_fence).unwrap_or(q1);
    let upper_whisker = ys.iter().rev().copied().find(|&v| v <= upper_fence).unwrap_or(q3);
    let outliers = ys
        .iter()
        .copied()
        .filter(|&v| v < lower_fence || v > upper_fence)
        .collect();

    Some(BoxSummary {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        outliers,
        count: ys.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&v, 0.0), 1.0);
        assert_eq!(percentile(&v, 0.5), 2.5);
        assert_eq!(percentile(&v, 1.0), 4.0);
        assert!(percentile(&[], 0.5).is_nan());
    }

    #[test]
    fn std_dev_is_sample_std() {
        let s = std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap_or_default();
        assert!((s - 2.138_089_935).abs() < 1e-6);
        assert_eq!(std_dev(&[1.0]), None);
    }

    #[test]
    fn pearson_detects_perfect_correlation() {
        let pairs: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, 2.0 * i as f64 + 1.0)).collect();
        let r = pearson(&pairs).unwrap_or_default();
        assert!((r - 1.0).abs() < 1e-12);
        assert_eq!(pearson(&[(1.0, 1.0), (1.0, 2.0)]), None);
    }

    #[test]
    fn nice_bins_never_exceed_max() {
        for (lo, hi) in [(0.0, 1.0), (1.0, 3.0), (-50.0, 1234.5), (0.001, 0.0042), (7.0, 7.0)] {
            let layout = nice_bins(lo, hi, 30);
            assert!(layout.n_bins() <= 30, "{lo}..{hi} gave {}", layout.n_bins());
            assert!(layout.start <= lo && layout.stop >= hi);
        }
    }

    #[test]
    fn nice_bins_uses_round_steps() {
        let layout = nice_bins(0.0, 100.0, 30);
        assert!((layout.step - 5.0).abs() < 1e-9);
        assert_eq!(layout.n_bins(), 20);
    }

    #[test]
    fn histogram_counts_every_value() {
        let values = [1.0, 2.0, 2.0, 3.0, 10.0];
        let bins = histogram(&values, nice_bins(1.0, 10.0, 30));
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert_eq!(bins.last().map(|b| b.count), Some(1));
    }

    #[test]
    fn equal_width_histogram_handles_constant_data() {
        let bins = equal_width_histogram(&[4.0, 4.0], 10);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins[0].count, 2);
        assert!(equal_width_histogram(&[], 10).is_empty());
    }

    #[test]
    fn box_summary_flags_outliers() {
        let b = box_summary(&[1.0, 2.0, 3.0, 4.0, 100.0]).expect("non-empty");
        assert_eq!(b.median, 3.0);
        assert_eq!(b.outliers, vec![100.0]);
        assert_eq!(b.upper_whisker, 4.0);
        assert_eq!(b.lower_whisker, 1.0);
        assert!(box_summary(&[]).is_none());
    }
}
