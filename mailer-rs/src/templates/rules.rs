//! Entry filtering shared by every template source

/// Extension a file must carry to be treated as a template
pub const TEMPLATE_EXTENSION: &str = ".html";

/// Dependency cache directory skipped without descending
pub const DEPENDENCY_CACHE_DIR: &str = "node_modules";

/// True for hidden entries and dependency caches
pub fn is_skipped(name: &str) -> bool {
    name.starts_with('.') || name == DEPENDENCY_CACHE_DIR
}

/// True when `name` carries [`TEMPLATE_EXTENSION`], compared case-sensitively
///
/// `page.HTML` is not a template, so every record name ends with `.html`.
pub fn is_template(name: &str) -> bool {
    name.ends_with(TEMPLATE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_rules() {
        assert!(is_skipped(".git"));
        assert!(is_skipped(".hidden.html"));
        assert!(is_skipped("node_modules"));
        assert!(!is_skipped("node_modules_backup"));
        assert!(!is_skipped("emails"));
    }

    #[test]
    fn test_template_extension_is_case_sensitive() {
        assert!(is_template("welcome.html"));
        assert!(!is_template("welcome.HTML"));
        assert!(!is_template("Welcome.Html"));
        assert!(!is_template("welcome.htm"));
        assert!(!is_template("welcome.html.bak"));
    }
}
