//! Numeric value providers.

use rand::Rng;

/// Range used for numeric fields with neither a configured range nor an example.
pub const DEFAULT_RANGE: i64 = 10;

/// Largest power of ten an example can widen the default range to.
const MAX_EXAMPLE_DIGITS: usize = 18;

/// Generate a random integer in `[0, max)`.
///
/// `max` must be positive; the binder rejects non-positive ranges.
pub fn random_int<R: Rng>(rng: &mut R, max: i64) -> i64 {
    rng.random_range(0..max)
}

/// Generate a random integer in `[0, max)` divided by a uniform float in `(0, 1]`.
///
/// The division spreads values into a long tail and gives them a fractional part.
pub fn random_jittered_float<R: Rng>(rng: &mut R, max: i64) -> f64 {
    let divisor = 1.0 - rng.random::<f64>();
    random_int(rng, max) as f64 / divisor
}

/// Default exclusive range for a numeric field: one order of magnitude per
/// character of the example, or [`DEFAULT_RANGE`] without one.
pub fn default_range(example: Option<&str>) -> i64 {
    match example {
        Some(example) => {
            let digits = example.len().min(MAX_EXAMPLE_DIGITS) as u32;
            10i64.pow(digits)
        }
        None => DEFAULT_RANGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_int() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let value = random_int(&mut rng, 20);
            assert!((0..20).contains(&value));
        }
    }

    #[test]
    fn test_random_jittered_float() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let value = random_jittered_float(&mut rng, 100);
            assert!(value.is_finite());
            assert!(value >= 0.0);
        }
    }

    #[test]
    fn test_default_range() {
        assert_eq!(default_range(None), DEFAULT_RANGE);
        assert_eq!(default_range(Some("123")), 1000);
        assert_eq!(
            default_range(Some("123456789012345678901234")),
            1_000_000_000_000_000_000
        );
    }
}
