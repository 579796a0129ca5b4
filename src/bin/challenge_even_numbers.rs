//! Challenge: keep only the even numbers of an array.
//!
//! Run with: cargo run --bin challenge_even_numbers

use colored::Colorize;
use serde_json::Value;

// =============================================================================
// Milestone 1: Iterator solution
// =============================================================================

/// Returns a new vector holding the even entries of `arr`, in input order.
pub fn even_numbers(arr: &[i64]) -> Vec<i64> {
    arr.iter().copied().filter(|n| n % 2 == 0).collect()
}

// =============================================================================
// Milestone 2: Explicit loop solution
// =============================================================================

pub fn even_numbers_loop(arr: &[i64]) -> Vec<i64> {
    if arr.is_empty() {
        return Vec::new();
    }

    let mut evens = Vec::with_capacity(arr.len() / 2 + 1);
    for &num in arr {
        if num % 2 == 0 {
            evens.push(num);
        }
    }
    evens
}

// =============================================================================
// Milestone 3: Loosely typed input
// =============================================================================

/// Same filter over JSON values. Anything that is not an integer
/// (floats, strings, booleans, null, nested values) is skipped.
pub fn even_numbers_mixed(arr: &[Value]) -> Vec<i64> {
    arr.iter()
        .filter_map(Value::as_i64)
        .filter(|n| n % 2 == 0)
        .collect()
}

fn main() {
    println!("{}", "=== Even Numbers ===".bold());

    let arr: Vec<i64> = (1..=10).collect();
    println!("Input:  {:?}", arr);
    println!("Output: {:?}", even_numbers(&arr));
    println!("Loop:   {:?}", even_numbers_loop(&arr));

    let mixed: Vec<Value> = serde_json::from_str(r#"[1, 2, "4", 6.0, null, 8, true, 10]"#)
        .unwrap_or_default();
    println!("\n{}", "=== Mixed Input ===".bold());
    println!("Input:  {}", Value::Array(mixed.clone()));
    println!("Output: {:?}", even_numbers_mixed(&mixed));
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_one_to_ten() {
        let arr: Vec<i64> = (1..=10).collect();
        assert_eq!(even_numbers(&arr), vec![2, 4, 6, 8, 10]);
        assert_eq!(even_numbers_loop(&arr), vec![2, 4, 6, 8, 10]);
    }

    #[test]
    fn test_empty_input() {
        assert!(even_numbers(&[]).is_empty());
        assert!(even_numbers_loop(&[]).is_empty());
        assert!(even_numbers_mixed(&[]).is_empty());
    }

    #[test]
    fn test_negative_and_zero() {
        assert_eq!(even_numbers(&[-4, -3, 0, 7]), vec![-4, 0]);
    }

    #[test]
    fn test_mixed_excludes_non_integers() {
        let arr = vec![
            json!(1),
            json!(2),
            json!("4"),
            json!(6.0),
            json!(null),
            json!(8),
            json!(true),
            json!([10]),
        ];
        assert_eq!(even_numbers_mixed(&arr), vec![2, 8]);
    }

    proptest! {
        #[test]
        fn test_loop_matches_iterator(arr in prop::collection::vec(any::<i64>(), 0..64)) {
            prop_assert_eq!(even_numbers(&arr), even_numbers_loop(&arr));
        }

        #[test]
        fn test_output_is_even_subsequence(arr in prop::collection::vec(-1000i64..1000, 0..64)) {
            let evens = even_numbers(&arr);
            prop_assert!(evens.iter().all(|n| n % 2 == 0));
            prop_assert_eq!(evens.len(), arr.iter().filter(|n| *n % 2 == 0).count());
        }
    }
}
