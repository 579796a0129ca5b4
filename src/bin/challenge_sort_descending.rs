//! Challenge: sort `[5, 2, 8, 1, 9, 7, 3, 6, 4]` in descending order.
//!
//! Run with: cargo run --bin challenge_sort_descending

use colored::Colorize;
use std::cmp::Reverse;

// =============================================================================
// Milestone 1: In-place sort (mutates the caller's data)
// =============================================================================

pub fn sort_descending(numbers: &mut [i32]) {
    numbers.sort_unstable_by(|a, b| b.cmp(a));
}

// =============================================================================
// Milestone 2: Non-mutating sort (returns a new vector)
// =============================================================================

pub fn sorted_descending(numbers: &[i32]) -> Vec<i32> {
    let mut sorted = numbers.to_vec();
    sorted.sort_by_key(|&n| Reverse(n));
    sorted
}

fn main() {
    println!("{}", "=== sort in place ===".bold());
    let mut numbers = vec![5, 2, 8, 1, 9, 7, 3, 6, 4];
    sort_descending(&mut numbers);
    println!("  numbers after sort: {:?}", numbers);

    println!("\n{}", "=== sorted copy ===".bold());
    let numbers = vec![5, 2, 8, 1, 9, 7, 3, 6, 4];
    let sorted = sorted_descending(&numbers);
    println!("  sorted:   {:?}", sorted);
    println!("  original: {:?}", numbers);

    println!("\n=== Key Points ===");
    println!("1. sort_descending takes &mut [i32] and reorders the caller's data");
    println!("2. sorted_descending borrows immutably and returns a new Vec");
}

// =============================================================================
// Tests
// =============================================================================
