//! Slug helpers shared by content items, content types and social links.

use regex::Regex;

lazy_static::lazy_static! {
    /// Valid slug pattern: lowercase letters, numbers, and single hyphens
    static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    static ref NON_ALNUM_RUN: Regex = Regex::new(r"[^a-z0-9]+").unwrap();

    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_REGEX.is_match(slug)
}

/// Lossy slug derivation: lowercase, every run of non-alphanumerics becomes
/// one `-`, leading and trailing `-` stripped.
///
/// May return an empty string when the input has no ASCII letters or digits.
pub fn slugify(input: &str) -> String {
    let lower = input.to_lowercase();
    NON_ALNUM_RUN
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

/// Social link id from a platform name ("Stack Overflow" -> "stack-overflow").
pub fn platform_id(platform: &str) -> String {
    WHITESPACE_RUN
        .replace_all(&platform.trim().to_lowercase(), "-")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_examples() {
        assert_eq!(slugify("My Work!!"), "my-work");
        assert_eq!(slugify("  Leading/Trailing--"), "leading-trailing");
        assert_eq!(slugify("About Me"), "about-me");
        assert_eq!(slugify("Sports & Events"), "sports-events");
    }

    #[test]
    fn test_slugify_is_deterministic_and_valid() {
        for title in ["Project", "project!", "  PROJECT  ", "Rust 2024: what's new?"] {
            let slug = slugify(title);
            assert_eq!(slug, slugify(title));
            assert!(is_valid_slug(&slug), "{slug:?} should be a valid slug");
        }
        assert_eq!(slugify("Project"), slugify("project!"));
    }

    #[test]
    fn test_slugify_drops_non_ascii() {
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("about-me"));
        assert!(is_valid_slug("a1"));
        assert!(!is_valid_slug("About"));
        assert!(!is_valid_slug("-about"));
        assert!(!is_valid_slug("about--me"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn test_platform_id() {
        assert_eq!(platform_id("GitHub"), "github");
        assert_eq!(platform_id("Stack  Overflow"), "stack-overflow");
    }
}
