//! Exit codes returned by a prepared invocation

/// Successful termination (silent)
pub const OK: i32 = 0;

/// Reported user-level failure
pub const FAILURE: i32 = 1;

/// Uncaught command error, or command line usage error
pub const ERROR: i32 = 2;

/// Largest code a numeric return value may produce
pub const MAX: i32 = 127;

/// Round a numeric return value half-to-even and clamp it into `FAILURE..=MAX`.
pub fn clamp(value: f64) -> i32 {
    if value.is_nan() {
        return FAILURE;
    }
    value
        .round_ties_even()
        .clamp(f64::from(FAILURE), f64::from(MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(3.0, 3)]
    #[case(2.5, 2)]
    #[case(3.5, 4)]
    #[case(0.4, 1)]
    #[case(-20.0, 1)]
    #[case(500.0, 127)]
    #[case(f64::INFINITY, 127)]
    #[case(f64::NAN, 1)]
    fn test_clamp(#[case] value: f64, #[case] expected: i32) {
        assert_eq!(clamp(value), expected);
    }
}
