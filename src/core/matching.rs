//! Free-text reference matching between prerequisite lines and item names.
//!
//! Catalog prerequisites carry no structured ids, only prose such as
//! `"Fighter Dedication"` or `"trained in Athletics; Basic Maneuver"`. Every
//! caller goes through these helpers so the matching rule lives in one place.

/// Whether `text` mentions `name`, ignoring case. Empty names never match.
pub fn mentions(text: &str, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    text.to_lowercase().contains(&name.to_lowercase())
}

/// Same as [`mentions`] with both sides already lower-cased.
pub fn mentions_lowered(text_lower: &str, name_lower: &str) -> bool {
    !name_lower.is_empty() && text_lower.contains(name_lower)
}

/// Pick the candidate whose name `text` mentions.
///
/// When several names match, the longest one wins and equal lengths fall back
/// to name order, so the result never depends on iteration order.
pub fn best_mention<'a, T, I>(text: &str, candidates: I) -> Option<T>
where
    I: IntoIterator<Item = (&'a str, T)>,
{
    let text_lower = text.to_lowercase();
    let mut best: Option<(&'a str, T)> = None;
    for (name, value) in candidates {
        if !mentions_lowered(&text_lower, &name.to_lowercase()) {
            continue;
        }
        let better = match &best {
            None => true,
            Some((current, _)) => {
                name.len() > current.len() || (name.len() == current.len() && name < *current)
            }
        };
        if better {
            best = Some((name, value));
        }
    }
    best.map(|(_, value)| value)
}
