//! Synthesis of the derived report sections. Each section is built from fixed
//! tables plus a case-insensitive substring scan of the report's free text.
//! Labels are assigned cyclically by match index so the same input always
//! produces the same section.

pub mod competitors;
pub mod consumer;
pub mod regulatory;
pub mod technology;

/// Returns up to `cap` entries, in order, that contain any of `keywords`
/// (matched case-insensitively as plain substrings).
pub(crate) fn keyword_matches<'a, I>(texts: I, keywords: &[&str], cap: usize) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a String>,
{
    texts
        .into_iter()
        .filter(|text| {
            let lower = text.to_lowercase();
            keywords.iter().any(|k| lower.contains(k))
        })
        .take(cap)
        .map(String::as_str)
        .collect()
}

/// Cycles through a fixed label table.
pub(crate) fn cycle<'a>(table: &[&'a str], index: usize) -> &'a str {
    table[index % table.len()]
}
