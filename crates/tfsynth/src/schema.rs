//! resource type definitions
//!
//! A [ResourceSchema] is the static description every element of one type shares: its kind, the
//! provider it belongs to and the declared attributes in declaration order. The order is the order
//! attributes are emitted in.
use crate::shape::Shape;
use crate::token::PathSegment;

/// Names that are meta-arguments and can never be declared as attributes
pub const META_ARGUMENTS: &[&str] = &["count", "depends_on", "for_each", "lifecycle", "provider"];

/// Kind of element, decides which section of the document it is emitted into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Provider,
    DataSource,
    Resource,
}

impl ElementKind {
    /// Keyword used for this kind in the emitted document
    pub fn keyword(self) -> &'static str {
        match self {
            ElementKind::Provider => "provider",
            ElementKind::DataSource => "data",
            ElementKind::Resource => "resource",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

impl std::str::FromStr for ElementKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "provider" => Ok(ElementKind::Provider),
            "data" => Ok(ElementKind::DataSource),
            "resource" => Ok(ElementKind::Resource),
            other => Err(SchemaError::UnknownKind(other.to_string())),
        }
    }
}

/// How an attribute may be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Input that must be set before synthesis
    Required,
    /// Input that may be left unset
    Optional,
    /// Output only, set by the target system
    Computed,
    /// Input that the target system computes when left unset
    OptionalComputed,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Required => f.write_str("required"),
            Mode::Optional => f.write_str("optional"),
            Mode::Computed => f.write_str("computed"),
            Mode::OptionalComputed => f.write_str("optional, computed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSpec {
    pub name: String,
    pub shape: Shape,
    pub mode: Mode,
    pub sensitive: bool,
}

impl AttributeSpec {
    pub fn is_required(&self) -> bool {
        self.mode == Mode::Required
    }

    /// Whether the attribute can be assigned
    pub fn is_input(&self) -> bool {
        self.mode != Mode::Computed
    }

    /// Whether the target system may provide the value
    pub fn is_computed(&self) -> bool {
        matches!(self.mode, Mode::Computed | Mode::OptionalComputed)
    }
}

/// Provider a resource type belongs to, listed in `terraform.required_providers`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSource {
    pub name: String,
    pub source: String,
    pub version: Option<String>,
}

impl ProviderSource {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSchema {
    type_name: String,
    kind: ElementKind,
    provider: Option<ProviderSource>,
    attributes: Vec<AttributeSpec>,
}

impl ResourceSchema {
    pub fn builder(kind: ElementKind, type_name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            schema: ResourceSchema {
                type_name: type_name.into(),
                kind,
                provider: None,
                attributes: vec![],
            },
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn provider(&self) -> Option<&ProviderSource> {
        self.provider.as_ref()
    }

    pub fn attributes(&self) -> &[AttributeSpec] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }

    /// Shape of the value at `segments`, starting with a top level attribute
    pub fn shape_at(&self, segments: &[PathSegment]) -> Option<Shape> {
        let (PathSegment::Attribute(name), rest) = segments.split_first()? else {
            return None;
        };

        self.attribute(name)?.shape.descend(rest)
    }
}

pub struct SchemaBuilder {
    schema: ResourceSchema,
}

impl SchemaBuilder {
    pub fn provider(mut self, provider: ProviderSource) -> Self {
        self.schema.provider = Some(provider);
        self
    }

    pub fn required(self, name: impl Into<String>, shape: Shape) -> Self {
        self.attribute(name, shape, Mode::Required)
    }

    pub fn optional(self, name: impl Into<String>, shape: Shape) -> Self {
        self.attribute(name, shape, Mode::Optional)
    }

    pub fn computed(self, name: impl Into<String>, shape: Shape) -> Self {
        self.attribute(name, shape, Mode::Computed)
    }

    pub fn optional_computed(self, name: impl Into<String>, shape: Shape) -> Self {
        self.attribute(name, shape, Mode::OptionalComputed)
    }

    /// Marks the most recently declared attribute as sensitive
    pub fn sensitive(mut self) -> Self {
        if let Some(last) = self.schema.attributes.last_mut() {
            last.sensitive = true;
        }
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, shape: Shape, mode: Mode) -> Self {
        self.schema.attributes.push(AttributeSpec {
            name: name.into(),
            shape,
            mode,
            sensitive: false,
        });
        self
    }

    pub fn build(self) -> Result<ResourceSchema, SchemaError> {
        let schema = self.schema;

        if !is_identifier(&schema.type_name) {
            return Err(SchemaError::InvalidTypeName(schema.type_name));
        }

        for (index, attribute) in schema.attributes.iter().enumerate() {
            let reserved = META_ARGUMENTS.contains(&attribute.name.as_str())
                || (schema.kind == ElementKind::Provider && attribute.name == "alias");
            if reserved {
                return Err(SchemaError::ReservedName {
                    type_name: schema.type_name.clone(),
                    name: attribute.name.clone(),
                });
            }

            if !is_identifier(&attribute.name) {
                return Err(SchemaError::InvalidAttributeName {
                    type_name: schema.type_name.clone(),
                    name: attribute.name.clone(),
                });
            }

            if schema.attributes[..index]
                .iter()
                .any(|existing| existing.name == attribute.name)
            {
                return Err(SchemaError::DuplicateAttribute {
                    type_name: schema.type_name.clone(),
                    name: attribute.name.clone(),
                });
            }
        }

        tracing::trace!(type_name = %schema.type_name, kind = %schema.kind, "schema built");
        Ok(schema)
    }
}

pub(crate) fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SchemaError {
    #[error("`{0}` is not a valid type name")]
    InvalidTypeName(String),
    #[error("`{type_name}` declares `{name}`, which is not a valid attribute name")]
    InvalidAttributeName { type_name: String, name: String },
    #[error("`{type_name}` declares `{name}`, which is reserved for a meta-argument")]
    ReservedName { type_name: String, name: String },
    #[error("`{type_name}` declares `{name}` more than once")]
    DuplicateAttribute { type_name: String, name: String },
    #[error("unknown element kind `{0}` (expected provider, data or resource)")]
    UnknownKind(String),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shape::{RecordShape, Scalar};
    use crate::token::AttributePath;
    use pretty_assertions::assert_eq;

    #[test]
    fn attributes_keep_declaration_order() {
        let schema = ResourceSchema::builder(ElementKind::Resource, "github_team")
            .required("name", Shape::STRING)
            .optional("description", Shape::STRING)
            .computed("slug", Shape::STRING)
            .build()
            .unwrap();

        let names: Vec<_> = schema.attributes().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["name", "description", "slug"]);
        assert!(schema.attribute("name").unwrap().is_required());
        assert!(!schema.attribute("slug").unwrap().is_input());
    }

    #[test]
    fn meta_argument_names_are_reserved() {
        let err = ResourceSchema::builder(ElementKind::Resource, "widget")
            .optional("count", Shape::NUMBER)
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            SchemaError::ReservedName {
                type_name: "widget".into(),
                name: "count".into()
            }
        );
    }

    #[test]
    fn alias_is_reserved_for_providers_only() {
        let provider = ResourceSchema::builder(ElementKind::Provider, "gh")
            .optional("alias", Shape::STRING)
            .build();
        assert!(provider.is_err());

        let resource = ResourceSchema::builder(ElementKind::Resource, "gh_alias")
            .optional("alias", Shape::STRING)
            .build();
        assert!(resource.is_ok());
    }

    #[test]
    fn duplicate_attribute() {
        let err = ResourceSchema::builder(ElementKind::DataSource, "widget")
            .optional("name", Shape::STRING)
            .computed("name", Shape::STRING)
            .build()
            .unwrap_err();

        assert!(matches!(err, SchemaError::DuplicateAttribute { .. }));
    }

    #[test]
    fn shape_at_nested_path() {
        let schema = ResourceSchema::builder(ElementKind::Resource, "widget")
            .optional(
                "checks",
                Shape::record_list(RecordShape::new().optional("contexts", Shape::List(Scalar::String))),
            )
            .build()
            .unwrap();

        let path: AttributePath = "checks[0].contexts[2]".parse().unwrap();
        assert_eq!(schema.shape_at(path.segments()), Some(Shape::STRING));

        let path: AttributePath = "missing".parse().unwrap();
        assert_eq!(schema.shape_at(path.segments()), None);
    }
}
