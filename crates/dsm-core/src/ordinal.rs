//! Ordinal prefixes: a leading run of decimal digits followed by one space,
//! e.g. the `03` in `"03 Boss Fight"`.

/// Split `name` into its ordinal token and the rest, if the part before the
/// first space is purely decimal.
pub fn split(name: &str) -> Option<(&str, &str)> {
    let (token, rest) = name.split_once(' ')?;
    if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
        Some((token, rest))
    } else {
        None
    }
}

/// Numeric value of the ordinal token, if any.
pub fn parse(name: &str) -> Option<u32> {
    split(name).and_then(|(token, _)| token.parse().ok())
}

/// The name without its ordinal token.
pub fn label(name: &str) -> &str {
    split(name).map_or(name, |(_, rest)| rest)
}

/// Digit count of `count`, the zero-padding width for a sequence `1..=count`.
pub fn width(count: usize) -> usize {
    count.to_string().len()
}

pub fn format(ordinal: usize, width: usize, rest: &str) -> String {
    format!("{ordinal:0>width$} {rest}")
}
