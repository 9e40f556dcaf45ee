//! Field definitions.
//!
//! A field is a name and the rule values for it must satisfy.  Declaring a field on a store adds a column, and every
//! insert is checked against the rules of all declared fields.
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::errors::*;

type Check = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// What a field accepts.
#[derive(Clone)]
pub enum Rule {
    /// Anything, including null.
    Any,
    /// A JSON number.  Strings which happen to parse as numbers don't count.
    Numeric,
    /// A number which is representable as an i64 or u64.
    Integer,
    /// Any string, including the empty one.
    Text,
    NonEmptyText,
    Boolean,
    /// A caller-supplied check.  The description shows up in errors.
    Predicate { description: String, check: Check },
}

impl Rule {
    pub fn predicate(
        description: impl Into<String>,
        check: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Rule {
        Rule::Predicate {
            description: description.into(),
            check: Arc::new(check),
        }
    }

    pub fn check(&self, value: &Value) -> bool {
        match self {
            Rule::Any => true,
            Rule::Numeric => value.is_number(),
            Rule::Integer => value.is_i64() || value.is_u64(),
            Rule::Text => value.is_string(),
            Rule::NonEmptyText => value.as_str().map(|x| !x.is_empty()).unwrap_or(false),
            Rule::Boolean => value.is_boolean(),
            Rule::Predicate { check, .. } => check(value),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rule::Any => write!(f, "any"),
            Rule::Numeric => write!(f, "numeric"),
            Rule::Integer => write!(f, "integer"),
            Rule::Text => write!(f, "text"),
            Rule::NonEmptyText => write!(f, "non-empty text"),
            Rule::Boolean => write!(f, "boolean"),
            Rule::Predicate { description, .. } => write!(f, "{}", description),
        }
    }
}

// Closures aren't Debug.
impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Rule({})", self)
    }
}

#[derive(Clone, Debug)]
pub struct FieldDefinition {
    name: String,
    rule: Rule,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, rule: Rule) -> Self {
        Self {
            name: name.into(),
            rule,
        }
    }

    pub fn any(name: impl Into<String>) -> Self {
        Self::new(name, Rule::Any)
    }

    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, Rule::Numeric)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, Rule::Integer)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, Rule::Text)
    }

    pub fn nonempty_text(name: impl Into<String>) -> Self {
        Self::new(name, Rule::NonEmptyText)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, Rule::Boolean)
    }

    pub fn with_predicate(
        name: impl Into<String>,
        description: impl Into<String>,
        check: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::new(name, Rule::predicate(description, check))
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_rule(&self) -> &Rule {
        &self.rule
    }

    /// Check `value` against this field's rule.
    pub fn validate(&self, value: &Value) -> Result<()> {
        if !self.rule.check(value) {
            return Err(Error::RuleRejected {
                field: self.name.clone(),
                rule: self.rule.to_string(),
                value: value.clone(),
            });
        }
        Ok(())
    }
}
