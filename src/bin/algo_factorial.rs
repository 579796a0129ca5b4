//! Algorithm: factorial of a non-negative integer.
//!
//! Run with: cargo run --bin algo_factorial

use colored::Colorize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FactorialError {
    #[error("Factorial is not defined for negative numbers (got {0})")]
    Negative(i64),

    #[error("{0}! does not fit in 128 bits")]
    Overflow(i64),
}

// =============================================================================
// Milestone 1: Iterative factorial with checked arithmetic
// =============================================================================

/// Computes `num!`. `0! = 1` by definition; multiplication starts at 2.
pub fn factorial(num: i64) -> Result<u128, FactorialError> {
    if num < 0 {
        return Err(FactorialError::Negative(num));
    }

    let mut total: u128 = 1;
    for i in 2..=num as u128 {
        total = total
            .checked_mul(i)
            .ok_or(FactorialError::Overflow(num))?;
    }
    Ok(total)
}

// =============================================================================
// Milestone 2: Iterator version
// =============================================================================

pub fn factorial_fold(num: i64) -> Result<u128, FactorialError> {
    if num < 0 {
        return Err(FactorialError::Negative(num));
    }
    (2..=num as u128).try_fold(1u128, |acc, i| {
        acc.checked_mul(i).ok_or(FactorialError::Overflow(num))
    })
}

fn main() {
    println!("{}", "=== Factorial ===".bold());

    for n in [5, 6, 0, 20, 34, 35, -3] {
        match factorial(n) {
            Ok(value) => println!("  {:>3}! = {}", n, value),
            Err(err) => println!("  {:>3}! -> {}", n, err.to_string().red()),
        }
    }

    println!("\n{}", "=== try_fold version ===".bold());
    println!("  10! = {:?}", factorial_fold(10));
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_values() {
        assert_eq!(factorial(0), Ok(1));
        assert_eq!(factorial(1), Ok(1));
        assert_eq!(factorial(5), Ok(120));
        assert_eq!(factorial(6), Ok(720));
        assert_eq!(factorial(20), Ok(2_432_902_008_176_640_000));
    }

    #[test]
    fn test_negative_is_invalid_argument() {
        assert_eq!(factorial(-1), Err(FactorialError::Negative(-1)));
        assert!(factorial(-1)
            .unwrap_err()
            .to_string()
            .contains("not defined for negative"));
    }

    #[test]
    fn test_overflow_boundary() {
        assert!(factorial(34).is_ok());
        assert_eq!(factorial(35), Err(FactorialError::Overflow(35)));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<FactorialError>();
        assert_sync::<FactorialError>();
    }

    proptest! {
        #[test]
        fn test_fold_matches_loop(n in -10i64..40) {
            prop_assert_eq!(factorial(n), factorial_fold(n));
        }

        #[test]
        fn test_recurrence(n in 1i64..=34) {
            let prev = factorial(n - 1).unwrap();
            prop_assert_eq!(factorial(n).unwrap(), prev * n as u128);
        }
    }
}
