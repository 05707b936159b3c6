//! errors
//!
//! Two families of errors exist:
//! - [Error] is returned immediately by construction calls. The failed call has no effect and the
//!   tree stays usable.
//! - [AggregateValidationError] is returned by synthesis and collects a [Diagnostic] for every
//!   problem found in the whole tree.
use crate::schema::{ElementKind, SchemaError};
use crate::shape::ShapeMismatch;
use crate::token::AttributePath;
use serde::ser::SerializeStruct;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("{scope} already has a child with id `{id}`")]
    DuplicateId { scope: String, id: String },

    #[error("`{0}` is not a valid identifier")]
    InvalidId(String),

    #[error("{element}: {mismatch}")]
    InvalidAttributeType {
        element: String,
        mismatch: ShapeMismatch,
    },

    #[error("{element}: `{type_name}` has no attribute `{name}`")]
    UnknownAttribute {
        element: String,
        type_name: String,
        name: String,
    },

    #[error("{element}: `{name}` is computed by the provider and cannot be set")]
    ReadOnlyAttribute { element: String, name: String },

    #[error("{element}: {kind} elements do not support the `{name}` meta-argument")]
    UnsupportedMetaArgument {
        element: String,
        kind: ElementKind,
        name: &'static str,
    },

    #[error("{element}: `{target}` is not part of the same construct tree")]
    ForeignElement { element: String, target: String },

    #[error("{element}: cannot depend on provider `{target}`")]
    InvalidDependency { element: String, target: String },

    #[error("{element}: `{target}` is not a provider")]
    NotAProvider { element: String, target: String },

    #[error("the construct tree was synthesized and can no longer be changed")]
    Frozen,

    #[error("`{0}` is not a valid attribute path")]
    InvalidAttributePath(String),

    #[error("invalid schema")]
    Schema(#[from] SchemaError),
}

/// Problem found during synthesis
#[derive(Debug, Clone, PartialEq)]
pub enum Issue {
    /// Two elements resolve to the same address
    DuplicateId { first: String, second: String },
    /// A value does not fit the declared shape
    InvalidAttributeType {
        attribute: AttributePath,
        expected: String,
        found: String,
    },
    /// A required attribute was never set
    MissingRequired { attribute: String },
    /// A reference points to an element outside of the synthesized tree
    DanglingReference { attribute: AttributePath },
    /// Dependencies form a loop, the first address is repeated at the end
    CircularDependency { cycle: Vec<String> },
    /// Providers of one type that cannot be told apart
    AmbiguousProvider {
        provider_type: String,
        alias: Option<String>,
    },
    /// A provider reference that is not visible from the element
    UnknownProvider { reference: String, reason: String },
}

impl Issue {
    /// Name of the violated rule
    pub fn kind(&self) -> &'static str {
        match self {
            Issue::DuplicateId { .. } => "DuplicateId",
            Issue::InvalidAttributeType { .. } => "InvalidAttributeType",
            Issue::MissingRequired { .. } => "MissingRequired",
            Issue::DanglingReference { .. } => "DanglingReference",
            Issue::CircularDependency { .. } => "CircularDependency",
            Issue::AmbiguousProvider { .. } => "AmbiguousProvider",
            Issue::UnknownProvider { .. } => "UnknownProvider",
        }
    }

    /// Attribute the issue is about, if any
    pub fn attribute(&self) -> Option<String> {
        match self {
            Issue::InvalidAttributeType { attribute, .. }
            | Issue::DanglingReference { attribute } => Some(attribute.to_string()),
            Issue::MissingRequired { attribute } => Some(attribute.clone()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Issue::DuplicateId { first, second } => write!(
                f,
                "`{first}` and `{second}` resolve to the same address"
            ),
            Issue::InvalidAttributeType {
                attribute,
                expected,
                found,
            } => write!(f, "`{attribute}` expects {expected}, found {found}"),
            Issue::MissingRequired { attribute } => {
                write!(f, "required attribute `{attribute}` is not set")
            }
            Issue::DanglingReference { attribute } => write!(
                f,
                "`{attribute}` refers to an element that is not part of this construct tree"
            ),
            Issue::CircularDependency { cycle } => {
                write!(f, "circular dependency: {}", cycle.join(" -> "))
            }
            Issue::AmbiguousProvider {
                provider_type,
                alias: Some(alias),
            } => write!(
                f,
                "more than one `{provider_type}` provider uses the alias `{alias}`"
            ),
            Issue::AmbiguousProvider {
                provider_type,
                alias: None,
            } => write!(
                f,
                "more than one `{provider_type}` provider exists, each of them needs a distinct alias"
            ),
            Issue::UnknownProvider { reference, reason } => {
                write!(f, "provider `{reference}` cannot be used: {reason}")
            }
        }
    }
}

/// An [Issue] and the address of the element it was found on
#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct Diagnostic {
    pub address: String,
    pub issue: Issue,
}

impl Diagnostic {
    pub fn kind(&self) -> &'static str {
        self.issue.kind()
    }

    pub fn message(&self) -> String {
        self.issue.to_string()
    }

    /// Fully qualified attribute, such as `github_repository.main.name`
    pub fn attribute_address(&self) -> Option<String> {
        self.issue
            .attribute()
            .map(|attribute| format!("{}.{attribute}", self.address))
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.address, self.kind(), self.issue)
    }
}

impl serde::Serialize for Diagnostic {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut ser = serializer.serialize_struct("Diagnostic", 3)?;
        ser.serialize_field("address", &self.address)?;
        ser.serialize_field("kind", self.kind())?;
        ser.serialize_field("message", &self.message())?;
        ser.end()
    }
}

/// Every problem found while synthesizing a tree
#[derive(derive_new::new, Debug, Clone, PartialEq)]
pub struct AggregateValidationError {
    #[new(default)]
    diagnostics: Vec<Diagnostic>,
}

impl AggregateValidationError {
    pub fn log(&mut self, address: impl Into<String>, issue: Issue) {
        let diagnostic = Diagnostic::new(address.into(), issue);
        tracing::debug!(%diagnostic, "issue found");
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Diagnostics of one kind, see [Issue::kind]
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |diagnostic| diagnostic.kind() == kind)
    }
}

impl std::error::Error for AggregateValidationError {}

impl std::fmt::Display for AggregateValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "synthesis failed with {} problem(s)", self.diagnostics.len())?;
        for diagnostic in &self.diagnostics {
            write!(f, "\n  {diagnostic}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn diagnostic_serializes_as_address_kind_message() {
        let diagnostic = Diagnostic::new(
            "Repo.x".to_string(),
            Issue::MissingRequired {
                attribute: "repo".to_string(),
            },
        );

        assert_eq!(diagnostic.attribute_address().as_deref(), Some("Repo.x.repo"));
        assert_eq!(
            serde_json::to_value(&diagnostic).unwrap(),
            serde_json::json!({
                "address": "Repo.x",
                "kind": "MissingRequired",
                "message": "required attribute `repo` is not set",
            })
        );
    }

    #[test]
    fn display_lists_every_diagnostic() {
        let mut errors = AggregateValidationError::new();
        errors.log(
            "a.b",
            Issue::CircularDependency {
                cycle: vec!["a.b".into(), "c.d".into(), "a.b".into()],
            },
        );
        errors.log(
            "gh",
            Issue::AmbiguousProvider {
                provider_type: "gh".into(),
                alias: None,
            },
        );

        let rendered = errors.to_string();
        assert!(rendered.starts_with("synthesis failed with 2 problem(s)"));
        assert!(rendered.contains("a.b [CircularDependency]: circular dependency: a.b -> c.d -> a.b"));
        assert_eq!(errors.of_kind("AmbiguousProvider").count(), 1);
    }
}
