//! Whisper model metadata catalog.
//!
//! Static catalog of the ggml Whisper models this tool can download from the
//! `ggerganov/whisper.cpp` repository, with sizes and SHA-1 checksums.

/// Metadata for a Whisper model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    /// Model identifier (e.g., "tiny.en", "base", "large-v3-turbo")
    pub name: &'static str,
    /// Model size in megabytes
    pub size_mb: u32,
    /// SHA-1 checksum for integrity verification
    pub sha1: &'static str,
    /// Whether this model supports English only
    pub english_only: bool,
}

impl ModelInfo {
    /// Download URL on HuggingFace.
    pub fn url(&self) -> String {
        format!(
            "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-{}.bin",
            self.name
        )
    }
}

/// Catalog of available Whisper models.
///
/// Models range from tiny (75 MB, fast, lower accuracy) to large (slower,
/// highest accuracy). The `.en` suffix indicates English-only variants.
pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        name: "tiny",
        size_mb: 75,
        sha1: "bd577a113a864445d4c299885e0cb97d4ba92b5f",
        english_only: false,
    },
    ModelInfo {
        name: "tiny.en",
        size_mb: 75,
        sha1: "c78c86eb1a8faa21b369bcd33207cc90d64ae9df",
        english_only: true,
    },
    ModelInfo {
        name: "base",
        size_mb: 142,
        sha1: "465707469ff3a37a2b9b8d8f89f2f99de7299dac",
        english_only: false,
    },
    ModelInfo {
        name: "base.en",
        size_mb: 142,
        sha1: "137c40403d78fd54d454da0f9bd998f78703390c",
        english_only: true,
    },
    ModelInfo {
        name: "small",
        size_mb: 466,
        sha1: "55356645c2b361a969dfd0ef2c5a50d530afd8d5",
        english_only: false,
    },
    ModelInfo {
        name: "small.en",
        size_mb: 466,
        sha1: "db8a495a91d927739e50b3fc1cc4c6b8f6c2d022",
        english_only: true,
    },
    ModelInfo {
        name: "medium",
        size_mb: 1533,
        sha1: "fd9727b6e1217c2f614f9b698455c4ffd82463b4",
        english_only: false,
    },
    ModelInfo {
        name: "medium.en",
        size_mb: 1533,
        sha1: "8c30f0e44ce9560643ebd10bbe50cd20eafd3723",
        english_only: true,
    },
    ModelInfo {
        name: "large-v3",
        size_mb: 2951,
        sha1: "ad82bf6a9043ceed055076d0fd39f5f186ff8062",
        english_only: false,
    },
    ModelInfo {
        name: "large-v3-turbo",
        size_mb: 1620,
        sha1: "4af2b29d7ec73d781377bfd1758ca957a807e941",
        english_only: false,
    },
];

/// Resolve convenience aliases to catalog names.
///
/// "large" maps to the current best large variant.
pub fn resolve_name(name: &str) -> &str {
    match name {
        "large" => "large-v3-turbo",
        other => other,
    }
}

/// Find a model by name (after alias resolution).
pub fn get_model(name: &str) -> Option<&'static ModelInfo> {
    let resolved = resolve_name(name);
    MODELS.iter().find(|m| m.name == resolved)
}

/// Get all available models.
pub fn list_models() -> &'static [ModelInfo] {
    MODELS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_model_exists() {
        let model = get_model("tiny.en").unwrap();
        assert_eq!(model.name, "tiny.en");
        assert_eq!(model.size_mb, 75);
        assert!(model.english_only);
    }

    #[test]
    fn test_get_model_not_found() {
        assert!(get_model("nonexistent").is_none());
    }

    #[test]
    fn test_get_model_resolves_alias() {
        let model = get_model("large").unwrap();
        assert_eq!(model.name, "large-v3-turbo");
    }

    #[test]
    fn test_resolve_name_passthrough() {
        assert_eq!(resolve_name("base"), "base");
        assert_eq!(resolve_name("large"), "large-v3-turbo");
    }

    #[test]
    fn test_default_model_is_in_catalog() {
        assert!(get_model(crate::defaults::DEFAULT_MODEL).is_some());
    }

    #[test]
    fn test_catalog_names_are_unique() {
        let mut names: Vec<&str> = MODELS.iter().map(|m| m.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), MODELS.len());
    }

    #[test]
    fn test_urls_point_at_whisper_cpp_repo() {
        for model in MODELS {
            let url = model.url();
            assert!(url.starts_with("https://huggingface.co/ggerganov/whisper.cpp/"));
            assert!(url.ends_with(&format!("ggml-{}.bin", model.name)));
        }
    }

    #[test]
    fn test_english_only_matches_en_suffix() {
        for model in MODELS {
            assert_eq!(model.english_only, model.name.ends_with(".en"));
        }
    }
}
