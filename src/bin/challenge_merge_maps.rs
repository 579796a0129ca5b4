//! Challenge: merge two name -> age maps into one.
//!
//! Run with: cargo run --bin challenge_merge_maps

use colored::Colorize;
use std::collections::HashMap;

// =============================================================================
// Milestone 1: extend (right-hand side wins on duplicates)
// =============================================================================

pub fn merge_extend(
    mut left: HashMap<String, u32>,
    right: HashMap<String, u32>,
) -> HashMap<String, u32> {
    left.extend(right);
    left
}

// =============================================================================
// Milestone 2: build a fresh map from chained iterators
// =============================================================================

pub fn merge_chain(
    left: &HashMap<String, u32>,
    right: &HashMap<String, u32>,
) -> HashMap<String, u32> {
    left.iter()
        .chain(right.iter())
        .map(|(name, age)| (name.clone(), *age))
        .collect()
}

// =============================================================================
// Milestone 3: order-preserving merge over pair lists
// =============================================================================

/// Keeps the first-seen position of every key; later values overwrite.
pub fn merge_ordered<'a>(left: &[(&'a str, u32)], right: &[(&'a str, u32)]) -> Vec<(&'a str, u32)> {
    let mut merged: Vec<(&'a str, u32)> = Vec::with_capacity(left.len() + right.len());
    for &(name, age) in left.iter().chain(right) {
        match merged.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = age,
            None => merged.push((name, age)),
        }
    }
    merged
}

fn to_map(pairs: &[(&str, u32)]) -> HashMap<String, u32> {
    pairs.iter().map(|&(k, v)| (k.to_string(), v)).collect()
}

fn main() {
    let name1 = [("Kelly", 23), ("Derick", 14), ("John", 7), ("Panjeet", 37)];
    let name2 = [("Ravi", 45), ("Eric", 67)];

    println!("{}", "=== extend ===".bold());
    let merged = merge_extend(to_map(&name1), to_map(&name2));
    let mut entries: Vec<_> = merged.iter().collect();
    entries.sort();
    println!("  {:?}", entries);

    println!("\n{}", "=== chain + collect ===".bold());
    let merged = merge_chain(&to_map(&name1), &to_map(&name2));
    println!("  {} entries", merged.len());

    println!("\n{}", "=== order preserving ===".bold());
    println!("  {:?}", merge_ordered(&name1, &name2));
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_contains_all_keys() {
        let merged = merge_extend(to_map(&[("Kelly", 23)]), to_map(&[("Ravi", 45)]));
        assert_eq!(merged.len(), 2);
        assert_eq!(merged["Kelly"], 23);
        assert_eq!(merged["Ravi"], 45);
    }

    #[test]
    fn test_right_side_wins() {
        let left = to_map(&[("Kelly", 23), ("John", 7)]);
        let right = to_map(&[("John", 8)]);
        assert_eq!(merge_extend(left.clone(), right.clone())["John"], 8);
        assert_eq!(merge_chain(&left, &right)["John"], 8);
    }

    #[test]
    fn test_ordered_keeps_first_position() {
        let merged = merge_ordered(&[("a", 1), ("b", 2)], &[("c", 3), ("a", 9)]);
        assert_eq!(merged, vec![("a", 9), ("b", 2), ("c", 3)]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(merge_extend(HashMap::new(), HashMap::new()).is_empty());
        assert!(merge_ordered(&[], &[]).is_empty());
    }
}
