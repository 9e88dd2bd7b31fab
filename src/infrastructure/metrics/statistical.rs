//! Statistical helpers for score aggregation
//!
//! Confidence intervals use a normal approximation; effect sizes use Cohen's
//! d with pooled standard deviation.

/// 95% two-tailed critical value of the standard normal distribution
const Z_95: f64 = 1.96;

/// Mean of a sample; 0 for an empty sample
pub fn mean(sample: &[f64]) -> f64 {
    if sample.is_empty() {
        return 0.0;
    }
    sample.iter().sum::<f64>() / sample.len() as f64
}

/// Sample variance (n-1 denominator); 0 when n < 2
pub fn variance(sample: &[f64]) -> f64 {
    if sample.len() < 2 {
        return 0.0;
    }

    let m = mean(sample);
    let n = sample.len() as f64;
    sample.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1.0)
}

pub fn std_dev(sample: &[f64]) -> f64 {
    variance(sample).sqrt()
}

/// Normal-approximation 95% confidence interval around the sample mean.
///
/// Degenerates to a zero-width interval when n <= 1.
pub fn confidence_interval_95(sample: &[f64]) -> (f64, f64) {
    let m = mean(sample);
    if sample.len() <= 1 {
        return (m, m);
    }

    let standard_error = std_dev(sample) / (sample.len() as f64).sqrt();
    let margin = Z_95 * standard_error;

    (m - margin, m + margin)
}

/// Cohen's d standardized mean difference with pooled standard deviation.
///
/// Returns 0 when either group has fewer than 2 samples or when the pooled
/// deviation is 0 (no spread means no standardized difference).
pub fn cohens_d(group_a: &[f64], group_b: &[f64]) -> f64 {
    if group_a.len() < 2 || group_b.len() < 2 {
        return 0.0;
    }

    let n_a = group_a.len() as f64;
    let n_b = group_b.len() as f64;

    let pooled_variance =
        ((n_a - 1.0) * variance(group_a) + (n_b - 1.0) * variance(group_b)) / (n_a + n_b - 2.0);
    let pooled_std = pooled_variance.sqrt();

    if pooled_std == 0.0 {
        return 0.0;
    }

    (mean(group_a) - mean(group_b)) / pooled_std
}

/// Qualitative magnitude of a Cohen's d value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectSizeInterpretation {
    Negligible,
    Small,
    Medium,
    Large,
}

impl EffectSizeInterpretation {
    pub fn from_cohens_d(d: f64) -> Self {
        let magnitude = d.abs();
        if magnitude < 0.2 {
            Self::Negligible
        } else if magnitude < 0.5 {
            Self::Small
        } else if magnitude < 0.8 {
            Self::Medium
        } else {
            Self::Large
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negligible => "negligible",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl std::fmt::Display for EffectSizeInterpretation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[42.0]), 42.0);
    }

    #[test]
    fn test_variance() {
        let var = variance(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((var - 2.5).abs() < 0.001);

        assert_eq!(variance(&[]), 0.0);
        assert_eq!(variance(&[42.0]), 0.0);
    }

    #[test]
    fn test_std_dev() {
        let sd = std_dev(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((sd - 1.5811).abs() < 0.001);
    }

    #[test]
    fn test_confidence_interval_zero_width_for_tiny_samples() {
        assert_eq!(confidence_interval_95(&[]), (0.0, 0.0));
        assert_eq!(confidence_interval_95(&[0.8]), (0.8, 0.8));
    }

    #[test]
    fn test_confidence_interval_contains_mean() {
        let sample = vec![0.5, 0.6, 0.7, 0.8, 0.9];
        let (low, high) = confidence_interval_95(&sample);
        let m = mean(&sample);

        assert!(low < m && m < high);
        assert!(((low + high) / 2.0 - m).abs() < 1e-12);
    }

    #[test]
    fn test_confidence_interval_shrinks_with_sample_size() {
        // Same spread repeated: the standard error falls as n grows.
        let small: Vec<f64> = [0.2, 0.8].repeat(5);
        let large: Vec<f64> = [0.2, 0.8].repeat(50);

        let (small_low, small_high) = confidence_interval_95(&small);
        let (large_low, large_high) = confidence_interval_95(&large);

        assert!((large_high - large_low) < (small_high - small_low));
    }

    #[test]
    fn test_cohens_d_detects_separation() {
        let strong = cohens_d(&[0.9, 0.95, 0.92, 0.88], &[0.1, 0.15, 0.12, 0.08]);
        assert!(strong > 0.8);

        let none = cohens_d(&[0.5, 0.6, 0.5, 0.6], &[0.5, 0.6, 0.5, 0.6]);
        assert!(none.abs() < 1e-12);
    }

    #[test]
    fn test_cohens_d_small_samples_are_zero() {
        assert_eq!(cohens_d(&[1.0], &[0.0, 0.5]), 0.0);
        assert_eq!(cohens_d(&[1.0, 0.5], &[]), 0.0);
    }

    #[test]
    fn test_effect_size_interpretation_bands() {
        use EffectSizeInterpretation::*;
        assert_eq!(EffectSizeInterpretation::from_cohens_d(0.1), Negligible);
        assert_eq!(EffectSizeInterpretation::from_cohens_d(-0.3), Small);
        assert_eq!(EffectSizeInterpretation::from_cohens_d(0.6), Medium);
        assert_eq!(EffectSizeInterpretation::from_cohens_d(-1.4), Large);
    }
}
