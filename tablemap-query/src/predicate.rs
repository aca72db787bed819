//! # Predicate
//!
//! Caller supplied WHERE fragments are kept as text. Two rewrites are applied
//! before the builders prepend their own `WHERE`:
//!
//! - a redundant leading `WHERE` keyword is removed
//! - `true` / `false` outside quoted literals become `1` / `0`, some MySQL
//!   positions reject boolean literals
use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_WHERE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*where\b").unwrap());
static BOOL_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(true|false)\b").unwrap());

/// Normalize predicate, `None` means there is no predicate at all
///
/// # Examples
///
/// ```
/// use tablemap_query::normalize_predicate;
///
/// assert_eq!(normalize_predicate(" WHERE Active = TRUE").as_deref(), Some("Active = 1"));
/// assert_eq!(normalize_predicate("name = 'false'").as_deref(), Some("name = 'false'"));
/// assert_eq!(normalize_predicate("  where  "), None);
/// ```
pub fn normalize_predicate(predicate: &str) -> Option<String> {
    let stripped = LEADING_WHERE.replace(predicate, "");
    let stripped = stripped.trim();
    if stripped.is_empty() {
        return None;
    }

    // Even segments are outside single quotes, a doubled '' toggles twice
    let rewritten = stripped
        .split('\'')
        .enumerate()
        .map(|(index, segment)| {
            if index % 2 == 0 {
                BOOL_LITERAL
                    .replace_all(segment, |caps: &regex::Captures| {
                        if caps[1].eq_ignore_ascii_case("true") {
                            "1"
                        } else {
                            "0"
                        }
                    })
                    .into_owned()
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("'");

    Some(rewritten)
}
