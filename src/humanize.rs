//! Display name generation for raw column names.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CatalogError, CatalogResult};
use crate::log_naming_error;

/// Turns a raw column name into a human readable label.
///
/// Implementations must be pure and total: any string, including the empty
/// string, yields a label without failing.
pub trait Humanize: Send + Sync {
    fn humanize(&self, raw_name: &str) -> String;
}

/// Default humanizer: drops a trailing `_id`/`-id`, splits on `_`, `-`,
/// whitespace and camelCase boundaries, and capitalizes each word.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHumanizer;

struct NamePatterns {
    id_suffix: Regex,
    camel_boundary: Regex,
    separators: Regex,
}

impl NamePatterns {
    fn compile() -> CatalogResult<Self> {
        Ok(Self {
            id_suffix: compile_with_context(r"(?i)[-_]id$", "id suffix")?,
            camel_boundary: compile_with_context(r"([a-z0-9])([A-Z])", "camelCase boundary")?,
            separators: compile_with_context(r"[-_\s]+", "word separators")?,
        })
    }
}

static PATTERNS: Lazy<CatalogResult<NamePatterns>> = Lazy::new(NamePatterns::compile);

fn compile_with_context(pattern: &str, context: &str) -> CatalogResult<Regex> {
    Regex::new(pattern).map_err(|e| {
        CatalogError::validation(format!(
            "Regex compilation failed for {}: {} - Pattern: {}",
            context, e, pattern
        ))
    })
}

/// Startup self-check of the name patterns used by [`DefaultHumanizer`].
pub fn verify_name_patterns() -> CatalogResult<()> {
    match (*PATTERNS).as_ref() {
        Ok(_) => Ok(()),
        Err(CatalogError::Validation(msg)) => Err(CatalogError::validation(msg.clone())),
        Err(other) => Err(CatalogError::validation(other.to_string())),
    }
}

impl Humanize for DefaultHumanizer {
    fn humanize(&self, raw_name: &str) -> String {
        humanize(raw_name)
    }
}

/// See [`DefaultHumanizer`]. If the name patterns failed to compile (reported
/// by [`verify_name_patterns`]) the trimmed name is returned unchanged.
pub fn humanize(raw_name: &str) -> String {
    let name = raw_name.trim();
    let patterns = match (*PATTERNS).as_ref() {
        Ok(patterns) => patterns,
        Err(e) => {
            log_naming_error!("Name patterns unavailable: {}", e);
            return name.to_string();
        }
    };

    let stripped = patterns.id_suffix.replace(name, "");
    let name = if stripped.trim_matches(|c| c == '_' || c == '-').is_empty() {
        name.to_string()
    } else {
        stripped.into_owned()
    };
    let name = patterns.camel_boundary.replace_all(&name, "$1 $2");

    patterns
        .separators
        .split(&name)
        .map(capitalize)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_patterns_compile() {
        verify_name_patterns().unwrap();
        assert!((*PATTERNS).is_ok());
    }

    #[test]
    fn test_compile_error_is_reported() {
        let err = compile_with_context("(", "test pattern").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("test pattern"));
    }

    #[test]
    fn test_humanize_snake_case() {
        assert_eq!(humanize("first_name"), "First Name");
        assert_eq!(humanize("user_lat"), "User Lat");
        assert_eq!(humanize("age"), "Age");
    }

    #[test]
    fn test_humanize_strips_id_suffix() {
        assert_eq!(humanize("venue_id"), "Venue");
        assert_eq!(humanize("OWNER-ID"), "Owner");
        assert_eq!(humanize("id"), "Id");
        assert_eq!(humanize("_id"), "Id");
    }

    #[test]
    fn test_humanize_camel_case() {
        assert_eq!(humanize("postalCode"), "Postal Code");
        assert_eq!(humanize("countryCode"), "Country Code");
    }

    #[test]
    fn test_humanize_is_total() {
        assert_eq!(humanize(""), "");
        assert_eq!(humanize("___"), "");
        assert_eq!(humanize("  spaced   out "), "Spaced Out");
        assert_eq!(DefaultHumanizer.humanize("ünïcode_näme"), "Ünïcode Näme");
    }
}
