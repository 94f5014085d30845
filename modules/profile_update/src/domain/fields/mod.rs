//! Additional-field schema: definitions, the registry that holds them and the
//! validator that checks raw input against them.
//!
//! Definitions are data. They are built at startup (from code or from
//! [`FieldSpec`] entries in the module config), registered once and never
//! mutated afterwards.

pub mod registry;
pub mod validator;

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use registry::{FieldRegistry, RegistryError};
pub use validator::{validate, validate_complete, validate_email};

/// Value kind of an additional field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    /// One of a closed set of string variants.
    Enum(Vec<String>),
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Number => f.write_str("number"),
            Self::Boolean => f.write_str("boolean"),
            Self::Enum(values) => write!(f, "enum({})", values.join("|")),
        }
    }
}

/// A constraint applied after the value has been coerced to its kind.
#[derive(Debug, Clone)]
pub enum FieldRule {
    /// Character count of the trimmed string, inclusive bounds.
    Length {
        min: Option<usize>,
        max: Option<usize>,
    },
    /// Inclusive numeric bounds.
    Range { min: Option<f64>, max: Option<f64> },
    /// The whole string must match.
    Pattern(Regex),
    /// The string must be an email address.
    Email,
}

impl FieldRule {
    /// Build a [`FieldRule::Pattern`] anchored at both ends.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(&format!("^(?:{pattern})$")).map(Self::Pattern)
    }

    fn applies_to(&self, kind: &FieldKind) -> bool {
        match self {
            Self::Length { .. } => matches!(kind, FieldKind::String | FieldKind::Enum(_)),
            Self::Range { .. } => matches!(kind, FieldKind::Number),
            Self::Pattern(_) | Self::Email => matches!(kind, FieldKind::String),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Length { .. } => "length",
            Self::Range { .. } => "range",
            Self::Pattern(_) => "pattern",
            Self::Email => "email",
        }
    }
}

/// Schema of one additional profile field.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    name: String,
    kind: FieldKind,
    required: bool,
    rules: Vec<FieldRule>,
}

impl FieldDefinition {
    /// An optional field with no rules.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            rules: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Structural sanity of the definition itself.
    fn check(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("field name must not be blank".to_string());
        }
        if RESERVED_NAMES.contains(&self.name.as_str()) {
            return Err(format!("'{}' is a built-in profile attribute", self.name));
        }
        if let FieldKind::Enum(values) = &self.kind {
            if values.is_empty() {
                return Err("enum field needs at least one value".to_string());
            }
        }
        for rule in &self.rules {
            if !rule.applies_to(&self.kind) {
                return Err(format!(
                    "rule '{}' does not apply to {} fields",
                    rule.name(),
                    self.kind
                ));
            }
            match rule {
                FieldRule::Length {
                    min: Some(min),
                    max: Some(max),
                } if min > max => {
                    return Err(format!("length min {min} exceeds max {max}"));
                }
                FieldRule::Range {
                    min: Some(min),
                    max: Some(max),
                } if min > max => {
                    return Err(format!("range min {min} exceeds max {max}"));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Keys used by built-in profile attributes in validation error maps.
pub const RESERVED_NAMES: &[&str] = &["email", "additional_fields"];

/// Config-file form of a [`FieldDefinition`].
///
/// ```yaml
/// - name: nickname
///   kind: string
///   max_length: 32
///   pattern: "[a-z0-9_]+"
/// - name: plan
///   kind: enum
///   values: [free, pro]
///   required: true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKindSpec,
    #[serde(default)]
    pub required: bool,
    /// Allowed variants, only for `kind: enum`.
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub email: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKindSpec {
    String,
    Number,
    Boolean,
    Enum,
}

impl TryFrom<FieldSpec> for FieldDefinition {
    type Error = RegistryError;

    fn try_from(spec: FieldSpec) -> Result<Self, Self::Error> {
        let kind = match spec.kind {
            FieldKindSpec::String => FieldKind::String,
            FieldKindSpec::Number => FieldKind::Number,
            FieldKindSpec::Boolean => FieldKind::Boolean,
            FieldKindSpec::Enum => FieldKind::Enum(spec.values),
        };
        let mut def = FieldDefinition::new(spec.name, kind);
        if spec.required {
            def = def.required();
        }
        if spec.min_length.is_some() || spec.max_length.is_some() {
            def = def.with_rule(FieldRule::Length {
                min: spec.min_length,
                max: spec.max_length,
            });
        }
        if spec.min.is_some() || spec.max.is_some() {
            def = def.with_rule(FieldRule::Range {
                min: spec.min,
                max: spec.max,
            });
        }
        if let Some(pattern) = spec.pattern.as_deref() {
            let rule =
                FieldRule::pattern(pattern).map_err(|source| RegistryError::InvalidPattern {
                    name: def.name.clone(),
                    source,
                })?;
            def = def.with_rule(rule);
        }
        if spec.email {
            def = def.with_rule(FieldRule::Email);
        }
        Ok(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(yaml: &str) -> FieldSpec {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn spec_converts_rules() {
        let def = FieldDefinition::try_from(spec(
            r#"
name: nickname
kind: string
required: true
min_length: 2
max_length: 16
pattern: "[a-z]+"
"#,
        ))
        .unwrap();

        assert_eq!(def.name(), "nickname");
        assert_eq!(def.kind(), &FieldKind::String);
        assert!(def.is_required());
        assert_eq!(def.rules().len(), 2);
        match &def.rules()[1] {
            FieldRule::Pattern(re) => {
                assert!(re.is_match("abc"));
                assert!(!re.is_match("abc1"));
            }
            other => panic!("expected pattern rule, got {other:?}"),
        }
    }

    #[test]
    fn enum_spec_carries_values() {
        let def = FieldDefinition::try_from(spec(
            r#"
name: plan
kind: enum
values: [free, pro]
"#,
        ))
        .unwrap();
        assert_eq!(
            def.kind(),
            &FieldKind::Enum(vec!["free".to_string(), "pro".to_string()])
        );
        assert!(!def.is_required());
    }

    #[test]
    fn bad_pattern_is_rejected() {
        let err = FieldDefinition::try_from(spec(
            r#"
name: code
kind: string
pattern: "[unclosed"
"#,
        ))
        .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidPattern { ref name, .. } if name == "code"));
    }

    #[test]
    fn unknown_spec_keys_are_rejected() {
        let res: Result<FieldSpec, _> = serde_yaml::from_str("name: x\nkind: string\nsize: 3\n");
        assert!(res.is_err());
    }

    #[test]
    fn rule_must_fit_kind() {
        let def = FieldDefinition::new("verified", FieldKind::Boolean).with_rule(FieldRule::Range {
            min: Some(0.0),
            max: None,
        });
        assert!(def.check().is_err());

        let def = FieldDefinition::new("age", FieldKind::Number).with_rule(FieldRule::Range {
            min: Some(10.0),
            max: Some(1.0),
        });
        assert!(def.check().is_err());
    }
}
