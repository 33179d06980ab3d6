//! Editor settings.
//!
//! Deserialized from the client's JSON settings object. Unknown keys are
//! ignored and absent keys fall back to the defaults below.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::Dialect;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// All recognised settings.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub workspace: WorkspaceSettings,
    pub scss: DialectSettings,
    pub sass: DialectSettings,
    pub editor: EditorSettings,
}

impl Settings {
    /// Parse settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse settings from an already-decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Settings that apply to documents of the given dialect.
    pub fn for_dialect(&self, dialect: Dialect) -> &DialectSettings {
        match dialect {
            Dialect::Sass => &self.sass,
            _ => &self.scss,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkspaceSettings {
    /// Maximum directory depth of the workspace scan.
    pub scan_depth: usize,
    /// Glob patterns excluded from the workspace scan.
    pub exclude: Vec<String>,
    /// Extra directories, relative to the workspace root, searched for
    /// module URLs.
    pub load_paths: Vec<String>,
    /// Alias table: `"@styles/*": "src/styles/*"` or `"~ui": "packages/ui"`.
    pub path_aliases: IndexMap<String, String>,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            scan_depth: 30,
            exclude: vec!["**/.git".to_string(), "**/node_modules".to_string()],
            load_paths: Vec::new(),
            path_aliases: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DialectSettings {
    pub completion: CompletionSettings,
    pub diagnostics: DiagnosticSettings,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompletionSettings {
    /// Only suggest members of modules brought in with `@use`.
    pub suggest_from_use_only: bool,
    /// Suggest every symbol of the current document, locals included.
    pub suggest_all_from_open_document: bool,
    pub mixin_style: MixinStyle,
}

/// How mixin completions are inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MixinStyle {
    /// Offer both the bare and the bracketed form for mixins with parameters.
    #[default]
    All,
    /// Only the bare form.
    NoBracket,
    /// Only the bracketed form.
    Bracket,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiagnosticSettings {
    pub lint: LintSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LintSettings {
    pub unknown_at_rules: LintLevel,
}

impl Default for LintSettings {
    fn default() -> Self {
        Self {
            unknown_at_rules: LintLevel::Warning,
        }
    }
}

/// Severity configured for a lint rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintLevel {
    Ignore,
    #[default]
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorSettings {
    pub insert_spaces: bool,
    pub indent_size: u32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            insert_spaces: true,
            indent_size: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.workspace.scan_depth, 30);
        assert_eq!(
            settings.workspace.exclude,
            vec!["**/.git".to_string(), "**/node_modules".to_string()]
        );
        assert_eq!(settings.scss.completion.mixin_style, MixinStyle::All);
        assert_eq!(
            settings.scss.diagnostics.lint.unknown_at_rules,
            LintLevel::Warning
        );
        assert!(settings.editor.insert_spaces);
        assert_eq!(settings.editor.indent_size, 2);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(
            r#"{
                "workspace": { "pathAliases": { "@styles/*": "src/styles/*" }, "unknownKey": 1 },
                "scss": { "completion": { "suggestFromUseOnly": true, "mixinStyle": "nobracket" } },
                "somethingElse": true
            }"#,
        )
        .unwrap();

        assert_eq!(settings.workspace.scan_depth, 30);
        assert_eq!(
            settings.workspace.path_aliases.get("@styles/*").map(String::as_str),
            Some("src/styles/*")
        );
        assert!(settings.scss.completion.suggest_from_use_only);
        assert_eq!(settings.scss.completion.mixin_style, MixinStyle::NoBracket);
        assert!(!settings.sass.completion.suggest_from_use_only);
    }

    #[test]
    fn test_for_dialect() {
        let mut settings = Settings::default();
        settings.sass.completion.suggest_all_from_open_document = true;
        assert!(
            settings
                .for_dialect(Dialect::Sass)
                .completion
                .suggest_all_from_open_document
        );
        assert!(
            !settings
                .for_dialect(Dialect::Vue)
                .completion
                .suggest_all_from_open_document
        );
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Settings::from_json("{ nope"),
            Err(ConfigError::Json(_))
        ));
    }
}
