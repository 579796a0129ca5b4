//! Loop reference: `for`, `while`, `loop`, and the iterator adaptors that
//! replace comprehensions.
//!
//! Run with: cargo run --bin reference_loops

use colored::Colorize;
use itertools::Itertools;
use std::collections::{BTreeMap, HashSet};

// =============================================================================
// Milestone 1: for
// =============================================================================

pub fn indexed<T: Clone>(items: &[T], start: usize) -> Vec<(usize, T)> {
    items
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, item)| (i + start, item))
        .collect()
}

pub fn describe_pairs(pairs: &[(u32, char)]) -> Vec<String> {
    pairs
        .iter()
        .map(|(num, letter)| format!("{} -> {}", num, letter))
        .collect()
}

pub fn nested_rows(matrix: &[Vec<i32>]) -> Vec<String> {
    let mut rows = Vec::new();
    for row in matrix {
        let mut line = String::new();
        for val in row {
            line.push_str(&format!("{} ", val));
        }
        rows.push(line.trim_end().to_string());
    }
    rows
}

pub fn map_lines(person: &BTreeMap<&str, String>) -> Vec<String> {
    person.iter().map(|(k, v)| format!("{}: {}", k, v)).collect()
}

// =============================================================================
// Milestone 2: while / loop
// =============================================================================

pub fn odd_numbers_up_to(limit: u32) -> Vec<u32> {
    let mut seen = Vec::new();
    let mut i = 0;
    while i < limit {
        i += 1;
        if i % 2 == 0 {
            continue;
        }
        seen.push(i);
    }
    seen
}

/// The body runs at least once, like a do-while.
pub fn do_while(start: u32, stop: u32) -> Vec<u32> {
    let mut out = Vec::new();
    let mut x = start;
    loop {
        out.push(x);
        x += 1;
        if x >= stop {
            break;
        }
    }
    out
}

// =============================================================================
// Milestone 3: Comprehension equivalents
// =============================================================================

pub fn squares(nums: &[i32]) -> Vec<i32> {
    nums.iter().map(|n| n * n).collect()
}

pub fn evens(nums: &[i32]) -> Vec<i32> {
    nums.iter().copied().filter(|n| n % 2 == 0).collect()
}

pub fn flatten(matrix: &[Vec<i32>]) -> Vec<i32> {
    matrix.iter().flatten().copied().collect()
}

pub fn zip_to_map<'a>(keys: &[&'a str], values: &[i32]) -> BTreeMap<&'a str, i32> {
    keys.iter().copied().zip(values.iter().copied()).collect()
}

pub fn unique_squares(nums: &[i32]) -> HashSet<i32> {
    nums.iter().map(|n| n * n).collect()
}

/// Lazy: nothing is computed until the caller pulls values.
pub fn lazy_squares(nums: &[i32]) -> impl Iterator<Item = i32> + '_ {
    nums.iter().map(|n| n * n)
}

// =============================================================================
// Milestone 4: Control flow
// =============================================================================

pub fn take_until(limit: u32, stop_at: u32) -> Vec<u32> {
    let mut out = Vec::new();
    for num in 0..limit {
        if num == stop_at {
            break;
        }
        out.push(num);
    }
    out
}

/// `for ... else` has no direct equivalent; `position` returns `None` when the
/// loop would have run to completion.
pub fn completed_without_break(items: &[u32], needle: u32) -> bool {
    items.iter().position(|&x| x == needle).is_none()
}

/// Labelled break leaves both loops at once.
pub fn first_diagonal_match(size: usize) -> Option<(usize, usize)> {
    let mut found = None;
    'outer: for i in 0..size {
        for j in 0..size {
            if i == j {
                found = Some((i, j));
                break 'outer;
            }
        }
    }
    found
}

// =============================================================================
// Milestone 5: itertools
// =============================================================================

pub fn cycle_take<'a>(items: &[&'a str], count: usize) -> Vec<&'a str> {
    items.iter().copied().cycle().take(count).collect()
}

pub fn chunked(items: &[i32], size: usize) -> Vec<Vec<i32>> {
    items
        .iter()
        .copied()
        .chunks(size)
        .into_iter()
        .map(|chunk| chunk.collect())
        .collect()
}

pub fn joined_chars(word: &str) -> String {
    word.chars().join(", ")
}

fn main() {
    println!("{}", "=== for ===".bold());
    println!("  {:?}", indexed(&["apple", "banana", "cherry"], 0));
    println!("  {:?}", describe_pairs(&[(1, 'a'), (2, 'b'), (3, 'c')]));
    println!("  {:?}", nested_rows(&[vec![1, 2], vec![3, 4], vec![5, 6]]));
    let person = BTreeMap::from([
        ("name", "Alice".to_string()),
        ("age", "25".to_string()),
        ("city", "London".to_string()),
    ]);
    println!("  {:?}", map_lines(&person));

    println!("\n{}", "=== while / loop ===".bold());
    println!("  odd: {:?}", odd_numbers_up_to(10));
    println!("  do-while: {:?}", do_while(0, 5));

    println!("\n{}", "=== comprehensions ===".bold());
    let nums = [1, 2, 3, 4, 5];
    println!("  squares: {:?}", squares(&nums));
    println!("  evens: {:?}", evens(&nums));
    println!("  flatten: {:?}", flatten(&[vec![1, 2], vec![3, 4], vec![5, 6]]));
    println!("  zip: {:?}", zip_to_map(&["a", "b", "c"], &[1, 2, 3]));
    println!("  set: {:?}", unique_squares(&[1, 2, 2, 3, 3, 4]).iter().sorted().collect_vec());
    println!("  lazy: {:?}", lazy_squares(&nums).collect_vec());

    println!("\n{}", "=== control flow ===".bold());
    println!("  break at 5: {:?}", take_until(10, 5));
    println!("  completed: {}", completed_without_break(&[0, 1, 2], 7));
    println!("  diagonal: {:?}", first_diagonal_match(3));

    println!("\n{}", "=== itertools ===".bold());
    println!("  cycle: {:?}", cycle_take(&["red", "green", "blue"], 10));
    println!("  chunks: {:?}", chunked(&[1, 2, 3, 4, 5], 2));
    println!("  chars: {}", joined_chars("hello"));
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexed_with_offset() {
        assert_eq!(indexed(&['x', 'y'], 1), vec![(1, 'x'), (2, 'y')]);
    }

    #[test]
    fn test_nested_rows() {
        assert_eq!(nested_rows(&[vec![1, 2], vec![3]]), vec!["1 2", "3"]);
    }

    #[test]
    fn test_map_lines_sorted_by_key() {
        let person = BTreeMap::from([("name", "Alice".to_string()), ("age", "25".to_string())]);
        assert_eq!(map_lines(&person), vec!["age: 25", "name: Alice"]);
    }

    #[test]
    fn test_while_with_continue() {
        assert_eq!(odd_numbers_up_to(10), vec![1, 3, 5, 7, 9]);
    }

    #[test]
    fn test_do_while_runs_once() {
        assert_eq!(do_while(0, 5), vec![0, 1, 2, 3, 4]);
        assert_eq!(do_while(9, 5), vec![9]);
    }

    #[test]
    fn test_comprehensions() {
        assert_eq!(squares(&[1, 2, 3, 4, 5]), vec![1, 4, 9, 16, 25]);
        assert_eq!(evens(&[1, 2, 3, 4, 5]), vec![2, 4]);
        assert_eq!(flatten(&[vec![1, 2], vec![3, 4], vec![5, 6]]), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(zip_to_map(&["a", "b", "c"], &[1, 2, 3])["b"], 2);
        assert_eq!(unique_squares(&[1, 2, 2, 3, 3, 4]), HashSet::from([1, 4, 9, 16]));
    }

    #[test]
    fn test_lazy_iterator() {
        let mut iter = lazy_squares(&[3, 4]);
        assert_eq!(iter.next(), Some(9));
        assert_eq!(iter.next(), Some(16));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_break_and_else() {
        assert_eq!(take_until(10, 5), vec![0, 1, 2, 3, 4]);
        assert!(completed_without_break(&[0, 1, 2], 7));
        assert!(!completed_without_break(&[0, 1, 2], 1));
    }

    #[test]
    fn test_labelled_break() {
        assert_eq!(first_diagonal_match(3), Some((0, 0)));
        assert_eq!(first_diagonal_match(0), None);
    }

    #[test]
    fn test_itertools_helpers() {
        assert_eq!(
            cycle_take(&["red", "green", "blue"], 5),
            vec!["red", "green", "blue", "red", "green"]
        );
        assert_eq!(chunked(&[1, 2, 3, 4, 5], 2), vec![vec![1, 2], vec![3, 4], vec![5]]);
        assert_eq!(joined_chars("hey"), "h, e, y");
    }
}
