//! LIKE pattern helpers for store-side substring filters.

/// Escape character used with `LIKE ... ESCAPE '\'`.
pub(crate) const LIKE_ESCAPE: char = '\\';

/// Turn operator text into a `LIKE` pattern matching it literally anywhere.
///
/// Blank input means "no filter" and yields `None`.
pub(crate) fn contains_pattern(needle: Option<&str>) -> Option<String> {
    let needle = needle?;
    if needle.is_empty() {
        return None;
    }
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(ch);
    }
    pattern.push('%');
    Some(pattern)
}
