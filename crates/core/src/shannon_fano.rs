//! Shannon-Fano code table construction.
//!
//! Symbols are sorted by descending frequency and split recursively into two
//! groups whose total frequencies are as close as possible. The left group of
//! every split gets a `0` bit, the right group a `1`, and a symbol's code is
//! the sequence of bits collected on the way down to its own group.
//!
//! The recursion works on sub-slices of one sorted array, so no tree nodes
//! are allocated. Every split hands disjoint sub-slices to the next level,
//! which is what makes the resulting codes prefix-free.
//!
//! # Example
//! ```
//! use sfpack_core::shannon_fano::build;
//!
//! let table = build("abbbcc").unwrap();
//! let b = table.get('b').unwrap();
//! assert_eq!((b.bits, b.len), (0b0, 1));
//! let a = table.get('a').unwrap();
//! assert_eq!((a.bits, a.len), (0b11, 2));
//! ```

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::table::{CodeEntry, EncodingTable, TableGenerator, MAX_CODE_LEN};

/// A symbol and how many times it occurs in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyRecord {
    pub symbol: char,
    pub quantity: u64,
}

impl From<FrequencyRecord> for CodeEntry {
    fn from(record: FrequencyRecord) -> Self {
        CodeEntry::new(record.symbol, record.quantity)
    }
}

/// The Shannon-Fano table generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShannonFano;

impl ShannonFano {
    pub fn new() -> Self {
        ShannonFano
    }
}

impl TableGenerator for ShannonFano {
    fn generate(&self, text: &str) -> Result<EncodingTable> {
        build(text)
    }
}

/// Count symbol occurrences, in order of first appearance.
pub fn count_frequencies(text: &str) -> Vec<FrequencyRecord> {
    let mut records: Vec<FrequencyRecord> = Vec::new();
    let mut index: HashMap<char, usize> = HashMap::new();

    for symbol in text.chars() {
        match index.get(&symbol) {
            Some(&i) => records[i].quantity += 1,
            None => {
                index.insert(symbol, records.len());
                records.push(FrequencyRecord {
                    symbol,
                    quantity: 1,
                });
            }
        }
    }

    records
}

/// Build a code table for `text`.
///
/// Ties in frequency keep their first-seen order, so the same text always
/// produces the same table.
///
/// # Errors
/// `CodeTooLong` if a code would not fit in 64 bits.
pub fn build(text: &str) -> Result<EncodingTable> {
    let mut entries: Vec<CodeEntry> = count_frequencies(text)
        .into_iter()
        .map(CodeEntry::from)
        .collect();

    // Stable, so equal quantities stay in first-seen order
    entries.sort_by(|a, b| b.quantity.cmp(&a.quantity));

    assign_codes(&mut entries);

    if let Some(entry) = entries.iter().find(|e| e.len > MAX_CODE_LEN) {
        return Err(Error::CodeTooLong {
            symbol: entry.symbol,
            length: usize::from(entry.len),
        });
    }

    log::trace!(
        "built table with {} symbols for {} bytes of text",
        entries.len(),
        text.len()
    );

    EncodingTable::from_entries(entries)
}

/// Assign prefix codes to `records`, which must be sorted by descending
/// quantity.
///
/// Any code already present is discarded. A single record gets the one-bit
/// code `0`; an empty slice is left alone.
pub fn assign_codes(records: &mut [CodeEntry]) {
    for record in records.iter_mut() {
        record.bits = 0;
        record.len = 0;
    }

    if let [only] = records {
        only.len = 1;
        return;
    }

    split(records);
}

/// One level of the bipartition: append a bit to every record, then recurse
/// into both halves.
fn split(records: &mut [CodeEntry]) {
    if records.len() < 2 {
        return;
    }

    let divider = best_divider_position(records);

    for (i, record) in records.iter_mut().enumerate() {
        record.bits = (record.bits << 1) | u64::from(i >= divider);
        record.len = record.len.saturating_add(1);
    }

    let (left, right) = records.split_at_mut(divider);
    split(left);
    split(right);
}

/// Index that splits `records` into two groups of nearly equal total
/// quantity.
///
/// Returns `0` for fewer than two records. Otherwise the result is in
/// `1..len`; when two splits are equally good the smaller index wins.
///
/// The left sum only grows as the split moves right, so the difference
/// between the halves falls and then rises. The scan stops at the first
/// split that does not improve on the previous one.
pub fn best_divider_position(records: &[CodeEntry]) -> usize {
    if records.len() < 2 {
        return 0;
    }

    let total: u64 = records.iter().map(|r| r.quantity).sum();
    let mut left = 0u64;
    let mut best = 0;
    let mut best_diff = u64::MAX;

    for (i, record) in records[..records.len() - 1].iter().enumerate() {
        left += record.quantity;
        let diff = left.abs_diff(total - left);
        if diff >= best_diff {
            break;
        }
        best = i + 1;
        best_diff = diff;
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(quantities: &[u64]) -> Vec<CodeEntry> {
        quantities
            .iter()
            .enumerate()
            .map(|(i, &q)| CodeEntry::new(char::from(b'a' + i as u8), q))
            .collect()
    }

    fn codes(records: &[CodeEntry]) -> Vec<(u64, u8)> {
        records.iter().map(|r| (r.bits, r.len)).collect()
    }

    #[test]
    fn test_best_divider_position() {
        assert_eq!(best_divider_position(&records(&[2])), 0);
        assert_eq!(best_divider_position(&records(&[2, 2])), 1);
        assert_eq!(best_divider_position(&records(&[2, 1, 1])), 1);
        assert_eq!(best_divider_position(&records(&[2, 2, 1, 1, 1, 1])), 2);
    }

    #[test]
    fn test_best_divider_position_empty() {
        assert_eq!(best_divider_position(&[]), 0);
    }

    #[test]
    fn test_best_divider_prefers_smaller_left_on_tie() {
        // Splits at 1 and 2 both differ by 1
        assert_eq!(best_divider_position(&records(&[1, 1, 1])), 1);
        // 5 against 3+1+1 balances exactly
        assert_eq!(best_divider_position(&records(&[5, 3, 1, 1])), 1);
    }

    #[test]
    fn test_assign_codes_two_equal() {
        let mut r = records(&[2, 2]);
        assign_codes(&mut r);
        assert_eq!(codes(&r), vec![(0, 1), (1, 1)]);
    }

    #[test]
    fn test_assign_codes_uneven() {
        let mut r = records(&[2, 1, 1]);
        assign_codes(&mut r);
        assert_eq!(codes(&r), vec![(0, 1), (2, 2), (3, 2)]);
    }

    #[test]
    fn test_assign_codes_all_equal() {
        let mut r = records(&[1, 1, 1]);
        assign_codes(&mut r);
        assert_eq!(codes(&r), vec![(0, 1), (2, 2), (3, 2)]);
    }

    #[test]
    fn test_assign_codes_single_record() {
        let mut r = records(&[7]);
        assign_codes(&mut r);
        assert_eq!(codes(&r), vec![(0, 1)]);
    }

    #[test]
    fn test_assign_codes_resets_previous_codes() {
        let mut r = records(&[2, 2]);
        assign_codes(&mut r);
        assign_codes(&mut r);
        assert_eq!(codes(&r), vec![(0, 1), (1, 1)]);
    }

    #[test]
    fn test_count_frequencies_first_seen_order() {
        let freqs = count_frequencies("abbbcc");
        assert_eq!(
            freqs,
            vec![
                FrequencyRecord { symbol: 'a', quantity: 1 },
                FrequencyRecord { symbol: 'b', quantity: 3 },
                FrequencyRecord { symbol: 'c', quantity: 2 },
            ]
        );
    }

    #[test]
    fn test_count_frequencies_multibyte() {
        let freqs = count_frequencies("héé😀");
        assert_eq!(freqs.len(), 3);
        assert_eq!(freqs[1], FrequencyRecord { symbol: 'é', quantity: 2 });
    }

    #[test]
    fn test_build() {
        let table = build("abbbcc").unwrap();
        assert_eq!(table.len(), 3);

        let expected = [('a', 1, 3, 2), ('b', 3, 0, 1), ('c', 2, 2, 2)];
        for (symbol, quantity, bits, len) in expected {
            let entry = table.get(symbol).unwrap();
            assert_eq!(
                *entry,
                CodeEntry {
                    symbol,
                    quantity,
                    bits,
                    len
                }
            );
        }
    }

    #[test]
    fn test_build_table_order() {
        let table = build("abbbcc").unwrap();
        let order: Vec<char> = table.iter().map(|e| e.symbol).collect();
        assert_eq!(order, vec!['b', 'c', 'a']);
    }

    #[test]
    fn test_build_single_symbol() {
        let table = build("zzzz").unwrap();
        let z = table.get('z').unwrap();
        assert_eq!((z.bits, z.len, z.quantity), (0, 1, 4));
    }

    #[test]
    fn test_build_empty() {
        assert!(build("").unwrap().is_empty());
    }

    #[test]
    fn test_build_is_deterministic() {
        let text = "the quick brown fox jumps over the lazy dog";
        assert_eq!(build(text).unwrap(), build(text).unwrap());
    }

    #[test]
    fn test_build_prefix_free() {
        let table = build("she sells sea shells by the sea shore").unwrap();
        let entries: Vec<_> = table.iter().collect();
        for (i, a) in entries.iter().enumerate() {
            for (j, b) in entries.iter().enumerate() {
                if i != j {
                    assert!(!a.is_prefix_of(b), "{:?} is a prefix of {:?}", a, b);
                }
            }
        }
    }

    #[test]
    fn test_generator() {
        let table = ShannonFano::new().generate("abbbcc").unwrap();
        assert_eq!(table, build("abbbcc").unwrap());
    }
}
