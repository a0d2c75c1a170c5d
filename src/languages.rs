use std::collections::HashSet;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::error::RunError;

/// Execution parameters of one language on the remote sandbox
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LanguageSpec {
    pub id: String,
    /// Judge0 `language_id`, identifies one compiler/runtime version
    pub execution_engine_id: u32,
    pub display_name: String,
    pub file_extension: String,
}

impl LanguageSpec {
    pub fn new(
        id: &str,
        execution_engine_id: u32,
        display_name: &str,
        file_extension: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            execution_engine_id,
            display_name: display_name.to_string(),
            file_extension: file_extension.to_string(),
        }
    }
}

// (id, Judge0 CE language id, display name, extension)
const BUILTIN_LANGUAGES: &[(&str, u32, &str, &str)] = &[
    ("python", 71, "Python", "py"),
    ("cpp", 54, "C++", "cpp"),
    ("c", 50, "C", "c"),
    ("java", 62, "Java", "java"),
    ("javascript", 63, "JavaScript", "js"),
    ("typescript", 74, "TypeScript", "ts"),
    ("go", 60, "Go", "go"),
    ("rust", 73, "Rust", "rs"),
    ("ruby", 72, "Ruby", "rb"),
    ("php", 68, "PHP", "php"),
    ("csharp", 51, "C#", "cs"),
    ("kotlin", 78, "Kotlin", "kt"),
    ("swift", 83, "Swift", "swift"),
    ("bash", 46, "Bash", "sh"),
    ("sql", 82, "SQL", "sql"),
];

/// Lookup table from language id to [`LanguageSpec`]
///
/// The table is fixed once built. Both the language id and the execution
/// engine id are unique within a registry, so every id resolves to exactly
/// one remote runtime.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: Vec<LanguageSpec>,
}

impl LanguageRegistry {
    /// The built-in Judge0 CE language table
    pub fn builtin() -> Self {
        let languages = BUILTIN_LANGUAGES
            .iter()
            .map(|&(id, engine_id, name, ext)| LanguageSpec::new(id, engine_id, name, ext))
            .collect();
        Self { languages }
    }

    /// Appends configured languages to the built-in table
    ///
    /// Fails if an entry reuses an existing language id or engine id.
    pub fn with_extra(extra: Vec<LanguageSpec>) -> Result<Self> {
        let mut registry = Self::builtin();
        let mut ids: HashSet<String> = registry.languages.iter().map(|l| l.id.clone()).collect();
        let mut engine_ids: HashSet<u32> = registry
            .languages
            .iter()
            .map(|l| l.execution_engine_id)
            .collect();

        for language in extra {
            if language.id.is_empty() {
                bail!("Language id must not be empty");
            }
            if !ids.insert(language.id.clone()) {
                bail!("Duplicate language id: {}", language.id);
            }
            if !engine_ids.insert(language.execution_engine_id) {
                bail!(
                    "Execution engine id {} of language {} is already taken",
                    language.execution_engine_id,
                    language.id
                );
            }
            log::debug!(
                "Registered language {} (engine {})",
                language.id,
                language.execution_engine_id
            );
            registry.languages.push(language);
        }

        Ok(registry)
    }

    pub fn resolve(&self, language_id: &str) -> Result<&LanguageSpec, RunError> {
        self.languages
            .iter()
            .find(|l| l.id == language_id)
            .ok_or_else(|| RunError::UnknownLanguage(language_id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &LanguageSpec> {
        self.languages.iter()
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
