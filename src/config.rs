//! Link rules loaded from `link.json`.
//!
//! ```json
//! {
//!   "constants": { "Base": "https://docs.example.com" },
//!   "rules": {
//!     "mermaid": { "anchor": "#{{.SectionName}}", "file": "{{.Base}}/{{.Path}}" }
//!   }
//! }
//! ```
//!
//! Without a `mermaid` rule diagrams are left exactly as they are.

use crate::error::LinkError;
use crate::render::LinkRenderer;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// What to do with a configuration file that is not valid JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParsePolicy {
    /// Fall back to the default configuration.
    #[default]
    Lenient,
    Strict,
}

#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    constants: BTreeMap<String, String>,
    #[serde(default)]
    rules: RawRules,
}

#[derive(Deserialize, Default)]
struct RawRules {
    mermaid: Option<RawTemplates>,
}

#[derive(Deserialize)]
struct RawTemplates {
    #[serde(default)]
    anchor: String,
    #[serde(default)]
    file: String,
}

#[derive(Debug, Default)]
pub struct RuleConfig {
    pub constants: BTreeMap<String, String>,
    /// `None` disables diagram rewriting.
    pub mermaid: Option<LinkRenderer>,
    /// Set when the file was unreadable JSON and the defaults were used instead.
    pub parse_error: Option<String>,
}

impl RuleConfig {
    /// Load `path`. A missing file yields the default configuration.
    pub fn load(path: &Path, policy: ParsePolicy) -> Result<Self, LinkError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text, policy, path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(LinkError::io(path, e)),
        }
    }

    pub fn from_json(text: &str, policy: ParsePolicy) -> Result<Self, LinkError> {
        Self::parse(text, policy, Path::new("link.json"))
    }

    fn parse(text: &str, policy: ParsePolicy, origin: &Path) -> Result<Self, LinkError> {
        let (raw, parse_error) = match serde_json::from_str::<RawConfig>(text) {
            Ok(raw) => (raw, None),
            Err(source) if policy == ParsePolicy::Strict => {
                return Err(LinkError::ConfigParse {
                    path: origin.to_path_buf(),
                    source,
                })
            }
            Err(source) => (RawConfig::default(), Some(source.to_string())),
        };

        let mermaid = match raw.rules.mermaid {
            Some(rule) => {
                if rule.anchor.is_empty() || rule.file.is_empty() {
                    return Err(LinkError::InvalidRule(
                        "invalid mermaid rule: missing anchor and/or file",
                    ));
                }
                Some(LinkRenderer::compile(&rule.anchor, &rule.file, raw.constants.clone())?)
            }
            None => None,
        };

        Ok(Self {
            constants: raw.constants,
            mermaid,
            parse_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_full_config() {
        let config = RuleConfig::from_json(
            r##"{
                "constants": { "Base": "/site" },
                "rules": { "mermaid": { "anchor": "#{{.SectionName}}", "file": "{{.Base}}/{{.Path}}" } }
            }"##,
            ParsePolicy::Lenient,
        )
        .unwrap();

        assert_eq!(config.constants.get("Base").map(String::as_str), Some("/site"));
        assert!(config.mermaid.is_some());
        assert!(config.parse_error.is_none());
    }

    #[test]
    fn test_no_rule_disables_rewriting() {
        let config = RuleConfig::from_json(r#"{ "constants": {} }"#, ParsePolicy::Lenient).unwrap();
        assert!(config.mermaid.is_none());
    }

    #[test]
    fn test_rule_needs_both_templates() {
        let err = RuleConfig::from_json(
            r#"{ "rules": { "mermaid": { "file": "{{.Path}}" } } }"#,
            ParsePolicy::Lenient,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "invalid mermaid rule: missing anchor and/or file");
    }

    #[test]
    fn test_bad_template_is_fatal() {
        let err = RuleConfig::from_json(
            r#"{ "rules": { "mermaid": { "anchor": "{{ SectionName", "file": "{{.Path}}" } } }"#,
            ParsePolicy::Lenient,
        )
        .unwrap_err();
        assert!(matches!(err, LinkError::Template { .. }));
    }

    #[test]
    fn test_malformed_json_policy() {
        let lenient = RuleConfig::from_json("{ not json", ParsePolicy::Lenient).unwrap();
        assert!(lenient.mermaid.is_none());
        assert!(lenient.constants.is_empty());
        assert!(lenient.parse_error.is_some());

        let strict = RuleConfig::from_json("{ not json", ParsePolicy::Strict).unwrap_err();
        assert!(matches!(strict, LinkError::ConfigParse { .. }));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = RuleConfig::load(&dir.path().join("link.json"), ParsePolicy::Strict).unwrap();
        assert!(config.mermaid.is_none());
    }

    #[test]
    fn test_load_reports_real_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("link.json");
        fs::write(&path, "[").unwrap();

        match RuleConfig::load(&path, ParsePolicy::Strict).unwrap_err() {
            LinkError::ConfigParse { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
