use serde::Deserialize;
use std::fmt;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RulesConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub sets: Vec<RuleSet>,
}

impl RulesConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.sets.is_empty() {
            issues.push(ValidationIssue::EmptySetList);
        }

        for ext in &self.meta.extensions {
            if !ext.starts_with('.') {
                issues.push(ValidationIssue::InvalidExtension { value: ext.clone() });
            }
        }

        for set in &self.sets {
            if set.name.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    set_name: None,
                    field: "name",
                });
            }
            if set.rules.is_empty() {
                issues.push(ValidationIssue::EmptyRuleSet {
                    set_name: set.name.clone(),
                });
            }
            if let Some(file) = &set.file {
                if file.trim().is_empty() {
                    issues.push(ValidationIssue::MissingField {
                        set_name: Some(set.name.clone()),
                        field: "file",
                    });
                }
            }
            for rule in &set.rules {
                if rule.pattern.is_empty() {
                    issues.push(ValidationIssue::MissingField {
                        set_name: Some(set.name.clone()),
                        field: "rules.pattern",
                    });
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// File name suffixes eligible for patching.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            extensions: default_extensions(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec![".ts".to_string(), ".tsx".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct RuleSet {
    pub name: String,
    /// Disabled sets stay in the file but are never compiled or applied.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Restrict this set to a single file, given relative to the root.
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// One substitution: a regex pattern and a replacement template.
///
/// The replacement may reference capture groups as `$1` or `${name}`;
/// a literal dollar sign is written `$$`.
#[derive(Debug, Deserialize, Clone)]
pub struct Rule {
    pub pattern: String,
    pub replacement: String,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    EmptySetList,
    EmptyRuleSet {
        set_name: String,
    },
    MissingField {
        set_name: Option<String>,
        field: &'static str,
    },
    InvalidExtension {
        value: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptySetList => write!(f, "rules file contains no rule sets"),
            ValidationIssue::EmptyRuleSet { set_name } => {
                write!(f, "rule set '{set_name}' contains no rules")
            }
            ValidationIssue::MissingField { set_name, field } => match set_name {
                Some(name) => write!(f, "rule set '{name}' missing required field '{field}'"),
                None => write!(f, "rule set missing required field '{field}'"),
            },
            ValidationIssue::InvalidExtension { value } => {
                write!(f, "extension '{value}' must start with a dot")
            }
        }
    }
}
