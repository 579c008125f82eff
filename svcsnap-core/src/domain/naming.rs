//! Service name normalization
//!
//! Some services are instantiated per user session and get a random suffix
//! appended to their name (e.g. `CDPUserSvc_4a1b2`). The suffix changes on
//! every logon, so comparing raw names across snapshots reports the same
//! logical service as both deleted and new. Stripping the suffix collapses
//! every instance onto one identity.

use std::sync::LazyLock;

use regex::Regex;

/// Trailing `_` followed by at most 10 lowercase alphanumerics
static INSTANCE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_[a-z0-9]{0,10}$").unwrap());

/// Strip a per-instance suffix from a service name
pub fn normalize(name: &str) -> String {
    INSTANCE_SUFFIX.replace(name, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_short_suffix() {
        assert_eq!(normalize("Foo_ab12"), "Foo");
        assert_eq!(normalize("MyService_ab12x"), "MyService");
    }

    #[test]
    fn test_keeps_suffix_longer_than_ten() {
        assert_eq!(normalize("Foo_abcdefghijk"), "Foo_abcdefghijk");
    }

    #[test]
    fn test_no_suffix() {
        assert_eq!(normalize("Foo"), "Foo");
    }

    #[test]
    fn test_bare_trailing_underscore_is_stripped() {
        assert_eq!(normalize("Foo_"), "Foo");
    }

    #[test]
    fn test_uppercase_suffix_is_kept() {
        assert_eq!(normalize("Foo_AB12"), "Foo_AB12");
    }

    #[test]
    fn test_only_last_segment_is_stripped() {
        assert_eq!(normalize("Bar_svc_1a2b"), "Bar_svc");
    }
}
