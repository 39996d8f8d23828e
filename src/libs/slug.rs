/// Maximum slug length accepted by slug columns.
pub const SLUG_MAX_LENGTH: usize = 50;

/// Normalizes free text into a URL slug.
///
/// Letters are lowercased, every run of characters that are not ASCII
/// letters or digits becomes a single hyphen, and hyphens are trimmed from
/// both ends. The result may be empty.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_hyphen = false;

    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// True when `value` only contains lowercase ASCII letters, digits, `-` and `_`.
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_single_word() {
        assert_eq!(slugify("Renaissance"), "renaissance");
    }

    #[test]
    fn collapses_separators() {
        assert_eq!(slugify("  The   Middle Ages!! "), "the-middle-ages");
        assert_eq!(slugify("Post-War / Cold War"), "post-war-cold-war");
        assert_eq!(slugify("Qin (221–206 BC)"), "qin-221-206-bc");
    }

    #[test]
    fn empty_when_nothing_alphanumeric() {
        assert_eq!(slugify("¿!?"), "");
    }

    #[test]
    fn slug_shape() {
        assert!(is_valid_slug("bronze-age_2"));
        assert!(!is_valid_slug("Bronze Age"));
        assert!(!is_valid_slug(""));
    }
}
