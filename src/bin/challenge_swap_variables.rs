//! Challenge: swap two variables without a named temporary.
//!
//! Run with: cargo run --bin challenge_swap_variables

use colored::Colorize;
use std::mem;

/// Tuple destructuring: the values move into a new tuple in swapped order.
pub fn swap_tuple<T>(a: T, b: T) -> (T, T) {
    (b, a)
}

pub fn swap_in_place<T>(a: &mut T, b: &mut T) {
    mem::swap(a, b);
}

/// Three XORs. Integers only; `a` and `b` can never alias here.
pub fn xor_swap(a: &mut u64, b: &mut u64) {
    *a ^= *b;
    *b ^= *a;
    *a ^= *b;
}

fn main() {
    println!("{}", "=== tuple ===".bold());
    let (a, b) = (5, 10);
    let (a, b) = swap_tuple(a, b);
    println!("  a = {}", a);
    println!("  b = {}", b);

    println!("\n{}", "=== mem::swap ===".bold());
    let mut first = String::from("left");
    let mut second = String::from("right");
    swap_in_place(&mut first, &mut second);
    println!("  first = {}, second = {}", first, second);

    println!("\n{}", "=== XOR ===".bold());
    let (mut x, mut y) = (5u64, 10u64);
    xor_swap(&mut x, &mut y);
    println!("  x = {}", x);
    println!("  y = {}", y);
}
