use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Default, Deserialize)]
pub struct BuiltinIgnores {
    #[serde(default)]
    pub hardcoded: Vec<String>,
    #[serde(default)]
    pub binary_extensions: Vec<String>,
}

static BUILTIN_IGNORE_PATTERNS: Lazy<BuiltinIgnores> = Lazy::new(|| {
    let yaml_content = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../data/builtin_ignores.yaml"
    ));
    serde_yml::from_str(yaml_content).expect("Failed to parse embedded data/builtin_ignores.yaml")
});

static BINARY_EXTENSIONS: Lazy<HashSet<String>> = Lazy::new(|| {
    BUILTIN_IGNORE_PATTERNS
        .binary_extensions
        .iter()
        .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
        .collect()
});

pub fn get_builtin_ignore_patterns() -> &'static BuiltinIgnores {
    &BUILTIN_IGNORE_PATTERNS
}

/// Case-insensitive lookup against the binary-extension denylist.
/// Accepts the extension with or without its leading dot.
pub fn is_binary_extension(extension: &str) -> bool {
    let normalized = extension.trim_start_matches('.').to_ascii_lowercase();
    !normalized.is_empty() && BINARY_EXTENSIONS.contains(&normalized)
}
