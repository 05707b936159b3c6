//! declarative stacks
//!
//! A [Manifest] describes scopes and elements as plain data and is turned into a construct tree
//! with the types of the [crate::catalog]. Manifests are written in yaml, json or hcl:
//!
//! ```yaml
//! scopes:
//!   - path: platform
//!     prefix: platform
//! elements:
//!   - id: api
//!     type: github_repository
//!     scope: platform
//!     attributes:
//!       name: api
//!   - id: core
//!     type: github_team_repository
//!     attributes:
//!       team_id: "1234"
//!       repository:
//!         $ref: platform/api
//!         attribute: name
//! ```
//!
//! `{ $ref, attribute }` is a reference to an attribute of another element, addressed by its node
//! path. Elements may reference elements declared after them. Counted elements are referenced with
//! an additional `instance`, either an index or `"*"` for all instances.
use crate::catalog;
use crate::expr::Expr;
use crate::meta::{Lifecycle, MetaArguments, ProviderRef};
use crate::resource::{Config, Resource};
use crate::schema::{ElementKind, SchemaError};
use crate::token::AttributePath;
use crate::tree::{Construct, Scope};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// Extensions recognized by [Manifest::load_file] and [Manifest::load_directory]
pub const EXTENSIONS: &[&str] = &["yaml", "yml", "json", "hcl"];

const REFERENCE_KEY: &str = "$ref";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub scopes: Vec<ScopeSpec>,
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
}

/// Grouping scope, created along with any missing parent scopes
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopeSpec {
    /// `/` separated, relative to the root
    pub path: String,
    #[serde(default)]
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementSpec {
    pub id: String,
    /// `resource` (default), `data` or `provider`
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(rename = "type")]
    pub type_name: String,
    /// Path of the enclosing scope, the root if absent
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub count: Option<u32>,
    /// Node paths of other elements
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// `type` or `type.alias`
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub lifecycle: Option<LifecycleSpec>,
    #[serde(default)]
    pub attributes: IndexMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LifecycleSpec {
    #[serde(default)]
    pub create_before_destroy: Option<bool>,
    #[serde(default)]
    pub prevent_destroy: Option<bool>,
    #[serde(default)]
    pub ignore_changes: Vec<String>,
}

impl From<&LifecycleSpec> for Lifecycle {
    fn from(value: &LifecycleSpec) -> Self {
        Lifecycle {
            create_before_destroy: value.create_before_destroy,
            prevent_destroy: value.prevent_destroy,
            ignore_changes: value.ignore_changes.clone(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ManifestError {
    #[error("No manifest files found in directory")]
    NoFilesFound,
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("Unable to parse yaml manifest")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Unable to parse json manifest")]
    Json(#[from] serde_json::Error),
    #[error("Unable to parse hcl manifest")]
    Hcl(#[from] hcl::Error),
    #[error("Unsupported manifest file `{0}`")]
    UnsupportedFile(String),
    #[error("{0}")]
    Kind(#[from] SchemaError),
    #[error("`{type_name}` is not a known {kind} type")]
    UnknownType { kind: ElementKind, type_name: String },
    #[error("`{0}` is not a scope")]
    UnknownScope(String),
    #[error("`{0}` does not exist")]
    UnknownElement(String),
    #[error("`{0}` is a scope, not an element")]
    NotAnElement(String),
    #[error("`{0}` is not an instance, expected an index or \"*\"")]
    InvalidInstance(String),
    #[error("Scope `{path}` already exists with prefix {existing:?}, not {requested:?}")]
    ConflictingPrefix {
        path: String,
        existing: Option<String>,
        requested: String,
    },
    #[error(transparent)]
    Construct(#[from] crate::Error),
}

impl Manifest {
    pub fn from_yaml_str(source: &str) -> Result<Self, ManifestError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn from_hcl_str(source: &str) -> Result<Self, ManifestError> {
        Ok(hcl::from_str(source)?)
    }

    /// Load a single file, the format is chosen by its extension
    pub fn load_file(file_path: &Path) -> Result<Self, ManifestError> {
        let file_path = file_path.canonicalize()?;
        tracing::info!(path=%file_path.display(), "loading file");

        let contents = std::fs::read_to_string(&file_path)?;
        match extension(&file_path) {
            Some("yaml" | "yml") => Self::from_yaml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            Some("hcl") => Self::from_hcl_str(&contents),
            _ => Err(ManifestError::UnsupportedFile(
                file_path.display().to_string(),
            )),
        }
    }

    /// Load and merge every manifest file of a directory, in file name order
    pub fn load_directory(dir_path: &Path) -> Result<Self, ManifestError> {
        let mut file_paths = vec![];
        for dir_entry in std::fs::read_dir(dir_path)? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }

            let file_path = dir_entry.path();
            if extension(&file_path).is_some_and(|extension| EXTENSIONS.contains(&extension)) {
                file_paths.push(file_path);
            }
        }

        if file_paths.is_empty() {
            return Err(ManifestError::NoFilesFound);
        }
        file_paths.sort();

        let mut manifest = Manifest::default();
        for file_path in file_paths {
            manifest.merge(Self::load_file(&file_path)?);
        }
        Ok(manifest)
    }

    /// Append the scopes and elements of `other`
    pub fn merge(&mut self, other: Manifest) {
        self.scopes.extend(other.scopes);
        self.elements.extend(other.elements);
    }

    /// Build a new construct tree
    pub fn build(&self) -> Result<Scope, ManifestError> {
        let root = Scope::root();
        self.build_into(&root)?;
        Ok(root)
    }

    /// Add the scopes and elements of this manifest below `root`
    ///
    /// Elements are created first and wired up afterwards, so references, dependencies and
    /// providers may point at elements declared later in the manifest.
    #[tracing::instrument(level = "debug", skip_all, fields(root = %root.path()))]
    pub fn build_into(&self, root: &Scope) -> Result<(), ManifestError> {
        for spec in &self.scopes {
            create_scope(root, spec)?;
        }

        let mut created = Vec::with_capacity(self.elements.len());
        for spec in &self.elements {
            created.push(create_element(root, spec)?);
        }

        for (resource, spec) in created.iter().zip(&self.elements) {
            for (name, value) in &spec.attributes {
                resource.set(name, expr(root, value)?)?;
            }
            for path in &spec.depends_on {
                resource.add_dependency(&element(root, path)?)?;
            }
        }

        tracing::debug!(elements = created.len(), "manifest built");
        Ok(())
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|extension| extension.to_str())
}

fn create_scope(root: &Scope, spec: &ScopeSpec) -> Result<Scope, ManifestError> {
    let mut scope = root.clone();
    let ids: Vec<&str> = spec.path.split('/').filter(|id| !id.is_empty()).collect();

    for (index, id) in ids.iter().enumerate() {
        let is_last = index + 1 == ids.len();
        scope = match scope.child(id) {
            Some(Construct::Scope(existing)) => match (&spec.prefix, is_last) {
                (Some(requested), true) if existing.prefix().as_ref() != Some(requested) => {
                    return Err(ManifestError::ConflictingPrefix {
                        path: spec.path.clone(),
                        existing: existing.prefix(),
                        requested: requested.clone(),
                    });
                }
                _ => existing,
            },
            Some(Construct::Element(_)) => return Err(ManifestError::UnknownScope(spec.path.clone())),
            None => match (&spec.prefix, is_last) {
                (Some(prefix), true) => Scope::with_prefix(&scope, id, prefix)?,
                _ => Scope::new(&scope, id)?,
            },
        };
    }

    Ok(scope)
}

fn create_element(root: &Scope, spec: &ElementSpec) -> Result<Resource, ManifestError> {
    let kind = match &spec.kind {
        Some(kind) => kind.parse()?,
        None => ElementKind::Resource,
    };
    let schema = catalog::lookup(kind, &spec.type_name).ok_or_else(|| ManifestError::UnknownType {
        kind,
        type_name: spec.type_name.clone(),
    })?;

    let scope = match &spec.scope {
        Some(path) => root
            .find(path)
            .and_then(|construct| construct.as_scope().cloned())
            .ok_or_else(|| ManifestError::UnknownScope(path.clone()))?,
        None => root.clone(),
    };

    let meta = MetaArguments {
        count: spec.count,
        depends_on: vec![],
        lifecycle: spec.lifecycle.as_ref().map(Lifecycle::from),
        provider: spec.provider.as_deref().map(ProviderRef::from),
        alias: spec.alias.clone(),
    };

    Ok(Resource::new(&scope, &spec.id, schema, Config::new().meta(meta))?)
}

fn element(root: &Scope, path: &str) -> Result<Resource, ManifestError> {
    match root.find(path) {
        Some(Construct::Element(resource)) => Ok(resource),
        Some(Construct::Scope(_)) => Err(ManifestError::NotAnElement(path.to_string())),
        None => Err(ManifestError::UnknownElement(path.to_string())),
    }
}

/// Plain data to [Expr], replacing `{ $ref, attribute }` objects with tokens
fn expr(root: &Scope, value: &serde_json::Value) -> Result<Expr, ManifestError> {
    use serde_json::Value as Json;

    match value {
        Json::Object(object) => {
            if let Some(Json::String(path)) = object.get(REFERENCE_KEY) {
                let attribute = match object.get("attribute") {
                    Some(Json::String(attribute)) => attribute.parse::<AttributePath>()?,
                    _ => AttributePath::from("id"),
                };
                let token = element(root, path)?.reference(attribute);
                let token = match object.get("instance") {
                    None => token,
                    Some(Json::String(all)) if all == "*" => token.all_instances(),
                    Some(Json::Number(number)) => {
                        let index = number.as_u64().and_then(|index| usize::try_from(index).ok());
                        match index {
                            Some(index) => token.instance(index),
                            None => return Err(ManifestError::InvalidInstance(number.to_string())),
                        }
                    }
                    Some(other) => return Err(ManifestError::InvalidInstance(other.to_string())),
                };
                return Ok(Expr::Reference(token));
            }

            let mut fields = IndexMap::with_capacity(object.len());
            for (key, value) in object {
                fields.insert(key.clone(), expr(root, value)?);
            }
            Ok(Expr::Record(fields))
        }
        Json::Array(values) => values
            .iter()
            .map(|value| expr(root, value))
            .collect::<Result<Vec<_>, _>>()
            .map(Expr::List),
        other => Ok(Expr::from(other.clone())),
    }
}
