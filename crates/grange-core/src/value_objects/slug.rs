//! Slug normalization for group names

/// Normalize a group name into a URL-safe slug base.
///
/// Lowercases, strips everything that is not alphanumeric, whitespace,
/// hyphen or underscore, then collapses runs of separators into single
/// hyphens. Suffix probing for uniqueness happens at the registry level.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;

    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_sep = true;
        }
        // Everything else (punctuation, emoji) is dropped outright.
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        assert_eq!(slugify("Dairy Farmers"), "dairy-farmers");
    }

    #[test]
    fn test_collapses_separators() {
        assert_eq!(slugify("  Corn   &  Soy __ Growers "), "corn-soy-growers");
    }

    #[test]
    fn test_strips_punctuation() {
        assert_eq!(slugify("John's Orchard!"), "johns-orchard");
    }

    #[test]
    fn test_keeps_digits() {
        assert_eq!(slugify("Route 66 Ranchers"), "route-66-ranchers");
    }

    #[test]
    fn test_no_leading_or_trailing_hyphen() {
        assert_eq!(slugify("--hello--"), "hello");
        assert_eq!(slugify("!!!"), "");
    }
}
