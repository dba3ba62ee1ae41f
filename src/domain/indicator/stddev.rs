//! Rolling volatility (standard deviation of closes).
//!
//! Sample standard deviation over n closing prices:
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n-1) / (n - 1))
//! Warmup: first (n-1) bars are undefined. A window of 1 is undefined everywhere.

pub fn calculate_stddev(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut values = Vec::with_capacity(closes.len());

    for i in 0..closes.len() {
        if period < 2 || i + 1 < period {
            values.push(None);
            continue;
        }

        let window = &closes[i + 1 - period..=i];
        let mean: f64 = window.iter().sum::<f64>() / period as f64;
        let variance: f64 = window
            .iter()
            .map(|c| {
                let diff = c - mean;
                diff * diff
            })
            .sum::<f64>()
            / (period - 1) as f64;

        values.push(Some(variance.sqrt()));
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stddev_warmup() {
        let series = calculate_stddev(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        assert!(series[0].is_none());
        assert!(series[1].is_none());
        assert!(series[2].is_some());
        assert!(series[4].is_some());
    }

    #[test]
    fn stddev_constant_values() {
        let series = calculate_stddev(&[100.0; 5], 3);
        assert_eq!(series[2], Some(0.0));
    }

    #[test]
    fn stddev_sample_denominator() {
        let series = calculate_stddev(&[10.0, 20.0, 30.0], 3);
        // mean 20, squared deviations 100 + 0 + 100, / (3 - 1)
        let expected = 100.0_f64.sqrt();
        assert!((series[2].unwrap() - expected).abs() < 1e-10);
    }

    #[test]
    fn stddev_known_values() {
        let closes = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let series = calculate_stddev(&closes, 8);
        let expected = (32.0_f64 / 7.0).sqrt();
        assert!((series[7].unwrap() - expected).abs() < 1e-10);
    }

    #[test]
    fn stddev_window_of_one_is_undefined() {
        let series = calculate_stddev(&[1.0, 2.0, 3.0], 1);
        assert!(series.iter().all(Option::is_none));
    }

    #[test]
    fn stddev_window_longer_than_series() {
        let series = calculate_stddev(&[1.0, 2.0], 5);
        assert_eq!(series, vec![None, None]);
    }
}
