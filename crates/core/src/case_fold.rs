//! Optional case folding before encoding.
//!
//! Mostly-lowercase text can drop its uppercase letters from the alphabet by
//! writing each one as an escape marker followed by its lowercase form:
//! `My name is Ted` becomes `!my name is !ted`. A literal marker is written
//! twice. This is a separate stage; [`crate::encode`] never applies it.
//!
//! ```
//! use sfpack_core::case_fold::{fold_case, unfold_case};
//!
//! let folded = fold_case("My name is Ted!");
//! assert_eq!(folded, "!my name is !ted!!");
//! assert_eq!(unfold_case(&folded), "My name is Ted!");
//! ```

/// Marker written before a folded uppercase letter.
pub const ESCAPE: char = '!';

/// Replace uppercase letters with [`ESCAPE`] + lowercase.
///
/// Letters whose case mapping is not a single char in both directions are
/// left alone, so [`unfold_case`] always restores the input exactly.
pub fn fold_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for ch in text.chars() {
        if ch == ESCAPE {
            out.push(ESCAPE);
            out.push(ESCAPE);
        } else if let Some(lower) = foldable(ch) {
            out.push(ESCAPE);
            out.push(lower);
        } else {
            out.push(ch);
        }
    }

    out
}

/// Reverse [`fold_case`]: [`ESCAPE`] followed by a char yields that char
/// uppercased.
///
/// A lone trailing marker is kept as is.
pub fn unfold_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        if ch != ESCAPE {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some(next) => out.extend(next.to_uppercase()),
            None => out.push(ESCAPE),
        }
    }

    out
}

/// Lowercase form of `ch` if folding it round-trips.
fn foldable(ch: char) -> Option<char> {
    if !ch.is_uppercase() {
        return None;
    }
    let lower = single(ch.to_lowercase())?;
    (single(lower.to_uppercase())? == ch).then_some(lower)
}

fn single(mut chars: impl Iterator<Item = char>) -> Option<char> {
    let first = chars.next()?;
    chars.next().is_none().then_some(first)
}
