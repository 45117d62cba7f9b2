//! Translation quality validation.
//!
//! Checks a single translated string against a configurable rule set
//! (length, HTML, per-key regex patterns, placeholders, quoting and
//! whitespace), and checks two whole locale trees against each other for
//! missing keys and placeholder drift.

use crate::locale::{LocaleNode, LocaleTree};
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::OnceLock;

/// How serious a validation finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Makes the result invalid
    Error,
    /// Reported, but the value is still usable
    Warning,
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub key: String,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl ValidationIssue {
    pub fn new(key: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
            severity,
            context: None,
        }
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

/// Outcome of a validation call. Built fresh per call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationResult {
    /// Findings in the order the checks ran
    pub errors: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.errors.push(issue);
    }

    /// True when no `Error`-severity finding was recorded.
    pub fn is_valid(&self) -> bool {
        !self.errors.iter().any(|e| e.severity == Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.errors.iter().any(|e| e.severity == Severity::Warning)
    }

    /// Error-severity findings only.
    pub fn failures(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().filter(|e| e.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().filter(|e| e.severity == Severity::Warning)
    }

    /// All findings joined on one line, for log and error messages.
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Named regex a value must match when its key contains the name.
#[derive(Debug, Clone)]
pub struct NamedPattern {
    pub name: String,
    pub regex: Regex,
}

/// Rule set applied to every translated value. Fixed for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct ValidationRules {
    pub max_length: usize,
    pub allow_html: bool,
    /// Keys (full dotted path or last segment) that must not be empty
    pub required: Vec<String>,
    pub patterns: Vec<NamedPattern>,
}

pub const DEFAULT_MAX_LENGTH: usize = 1000;
pub const DEFAULT_REQUIRED_KEYS: &[&str] = &["title", "description"];
pub const DEFAULT_PATTERNS: &[(&str, &str)] = &[
    ("email", r"^[^\s@]+@[^\s@]+\.[^\s@]+$"),
    ("phone", r"^\+?[0-9\s\-().]{7,20}$"),
    ("url", r"^https?://\S+$"),
];

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            allow_html: false,
            required: DEFAULT_REQUIRED_KEYS.iter().map(|k| k.to_string()).collect(),
            patterns: DEFAULT_PATTERNS
                .iter()
                .map(|(name, pattern)| NamedPattern {
                    name: name.to_string(),
                    regex: Regex::new(pattern).expect("default pattern is a valid regex"),
                })
                .collect(),
        }
    }
}

/// Partial rule set, usually read from a JSON file, merged onto the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationRulesOverrides {
    pub max_length: Option<usize>,
    pub allow_html: Option<bool>,
    pub required: Option<Vec<String>>,
    /// Pattern name to regex source; replaces a default of the same name
    pub patterns: Option<BTreeMap<String, String>>,
}

impl ValidationRules {
    /// Merge `overrides` onto these rules.
    pub fn with_overrides(mut self, overrides: ValidationRulesOverrides) -> Result<Self> {
        if let Some(max_length) = overrides.max_length {
            self.max_length = max_length;
        }
        if let Some(allow_html) = overrides.allow_html {
            self.allow_html = allow_html;
        }
        if let Some(required) = overrides.required {
            self.required = required;
        }
        if let Some(patterns) = overrides.patterns {
            for (name, source) in patterns {
                let regex = Regex::new(&source)
                    .with_context(|| format!("Invalid regex for pattern '{}'", name))?;
                match self.patterns.iter_mut().find(|p| p.name == name) {
                    Some(existing) => existing.regex = regex,
                    None => self.patterns.push(NamedPattern { name, regex }),
                }
            }
        }
        Ok(self)
    }

    fn is_required(&self, key: &str) -> bool {
        let last_segment = key.rsplit('.').next().unwrap_or(key);
        self.required.iter().any(|r| r == key || r == last_segment)
    }
}

static HTML_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static VARIABLE_REGEX: OnceLock<Regex> = OnceLock::new();

fn html_tag_regex() -> &'static Regex {
    HTML_TAG_REGEX.get_or_init(|| Regex::new(r"<[^>]+>").expect("static regex"))
}

fn variable_regex() -> &'static Regex {
    // {name} and {{name}}
    VARIABLE_REGEX
        .get_or_init(|| Regex::new(r"\{\{?\s*([A-Za-z0-9_.\-]+)\s*\}?\}").expect("static regex"))
}

/// Unique placeholder names in order of first appearance.
pub fn extract_variables(value: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    variable_regex()
        .captures_iter(value)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

fn duplicated_variables(value: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicated = Vec::new();
    for cap in variable_regex().captures_iter(value) {
        if let Some(name) = cap.get(1).map(|m| m.as_str()) {
            if !seen.insert(name) && !duplicated.iter().any(|d| d == name) {
                duplicated.push(name.to_string());
            }
        }
    }
    duplicated
}

/// Validator for translated strings.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    rules: ValidationRules,
}

impl Validator {
    pub fn new(rules: ValidationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Run every check against `value`; findings accumulate, nothing short-circuits.
    pub fn validate(&self, key: &str, value: &str) -> ValidationResult {
        let mut result = ValidationResult::new();
        let rules = &self.rules;

        if rules.is_required(key) && value.is_empty() {
            result.push(ValidationIssue::new(key, "Required value is empty", Severity::Error));
        }

        if value.chars().count() > rules.max_length {
            result.push(ValidationIssue::new(
                key,
                format!("Value exceeds maximum length of {} characters", rules.max_length),
                Severity::Error,
            ));
        }

        if !rules.allow_html && html_tag_regex().is_match(value) {
            result.push(ValidationIssue::new(
                key,
                "HTML tags are not allowed",
                Severity::Error,
            ));
        }

        let lower_key = key.to_lowercase();
        for pattern in &rules.patterns {
            if lower_key.contains(&pattern.name.to_lowercase()) && !pattern.regex.is_match(value) {
                result.push(ValidationIssue::new(
                    key,
                    format!("Value does not match the '{}' pattern", pattern.name),
                    Severity::Error,
                ));
            }
        }

        for name in duplicated_variables(value) {
            result.push(ValidationIssue::new(
                key,
                format!("Placeholder {{{}}} appears more than once", name),
                Severity::Warning,
            ));
        }

        if value.contains('\'') && value.contains('"') {
            result.push(ValidationIssue::new(
                key,
                "Mixed single and double quotes",
                Severity::Warning,
            ));
        }

        if value.trim() != value {
            result.push(ValidationIssue::new(
                key,
                "Leading or trailing whitespace",
                Severity::Error,
            ));
        }

        if value.trim().contains("  ") {
            result.push(ValidationIssue::new(
                key,
                "Multiple consecutive spaces",
                Severity::Error,
            ));
        }

        result
    }

    /// Validate a translation, ignoring findings its source text already has.
    ///
    /// A translation that faithfully keeps a property of the source (markup,
    /// a label under an `email` key, a long paragraph) is not rejected for it.
    pub fn validate_translation(&self, key: &str, source: &str, translated: &str) -> ValidationResult {
        let inherited: HashSet<String> = self
            .validate(key, source)
            .errors
            .into_iter()
            .map(|issue| issue.message)
            .collect();

        let mut result = self.validate(key, translated);
        result.errors.retain(|issue| !inherited.contains(&issue.message));

        let source_vars = extract_variables(source);
        let translated_vars = extract_variables(translated);
        for name in source_vars.iter().filter(|v| !translated_vars.contains(v)) {
            result.push(ValidationIssue::new(
                key,
                format!("Missing variable {{{}}}", name),
                Severity::Error,
            ));
        }
        for name in translated_vars.iter().filter(|v| !source_vars.contains(v)) {
            result.push(ValidationIssue::new(
                key,
                format!("Unexpected variable {{{}}}", name),
                Severity::Error,
            ));
        }

        result
    }
}

fn display_leaves(tree: &LocaleTree) -> Vec<(String, &LocaleNode)> {
    tree.flatten()
        .into_iter()
        .map(|(path, node)| (path.to_string(), node))
        .collect()
}

/// Compare two locale trees key by key.
///
/// Reports keys missing from the target, keys only the target has, and for
/// every shared string leaf, placeholders the target lost or invented.
pub fn validate_locale_consistency(base: &LocaleTree, target: &LocaleTree) -> ValidationResult {
    let mut result = ValidationResult::new();
    let base_leaves = display_leaves(base);
    let target_leaves = display_leaves(target);

    let target_map: BTreeMap<&str, &LocaleNode> =
        target_leaves.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    let base_keys: HashSet<&str> = base_leaves.iter().map(|(k, _)| k.as_str()).collect();

    for (key, _) in &base_leaves {
        if !target_map.contains_key(key.as_str()) {
            result.push(ValidationIssue::new(
                key.as_str(),
                "Missing in target locale",
                Severity::Error,
            ));
        }
    }

    for (key, _) in &target_leaves {
        if !base_keys.contains(key.as_str()) {
            result.push(ValidationIssue::new(
                key.as_str(),
                "Not present in base locale",
                Severity::Error,
            ));
        }
    }

    for (key, base_node) in &base_leaves {
        let (Some(base_value), Some(target_value)) = (
            base_node.as_str(),
            target_map.get(key.as_str()).and_then(|n| n.as_str()),
        ) else {
            continue;
        };

        let expected = extract_variables(base_value);
        let found = extract_variables(target_value);
        let context = serde_json::json!({ "expected": expected, "found": found });

        for name in expected.iter().filter(|v| !found.contains(v)) {
            result.push(
                ValidationIssue::new(
                    key.as_str(),
                    format!("Missing variable {{{}}}", name),
                    Severity::Error,
                )
                .with_context(context.clone()),
            );
        }
        for name in found.iter().filter(|v| !expected.contains(v)) {
            result.push(
                ValidationIssue::new(
                    key.as_str(),
                    format!("Unexpected variable {{{}}}", name),
                    Severity::Error,
                )
                .with_context(context.clone()),
            );
        }
    }

    result
}
