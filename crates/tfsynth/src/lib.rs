//! # tfsynth - typed terraform constructs
//!
//! Build a tree of typed resources in Rust, wire them together with references and synthesize the
//! tree into a configuration document for terraform (json, yaml or native hcl syntax).
//!
//! ## Introduction for developers
//!
//! Read this to understand how `tfsynth` works internally.
//!
//! ### Terms
//!
//! - an **element** is a resource, a data source or a provider. Each element has a type
//!   (`github_repository`) described by a [ResourceSchema]: the declared attributes with their
//!   [Shape] and [Mode], and the provider serving the type.
//! - a **scope** groups elements and other scopes. Scopes and elements form the construct tree,
//!   every node has an id that is unique among its siblings.
//! - a **token** ([Token]) stands for an attribute of an element whose value is only known once the
//!   configuration is applied, `github_repository.api.node_id` for example.
//!
//! ```
//! use tfsynth::catalog::{Repository, RepositoryConfig, Team, TeamConfig, TeamRepository, TeamRepositoryConfig};
//! use tfsynth::{Scope, Value};
//!
//! let root = Scope::root();
//! let repo = Repository::new(&root, "api", RepositoryConfig {
//!     name: Some("api".into()),
//!     ..Default::default()
//! })?;
//! let team = Team::new(&root, "core", TeamConfig {
//!     name: Some("core".into()),
//!     ..Default::default()
//! })?;
//! TeamRepository::new(&root, "core_api", TeamRepositoryConfig {
//!     team_id: Some(team.id().into()),
//!     repository: Some(repo.name().into()),
//!     ..Default::default()
//! })?;
//!
//! let document = root.synthesize()?;
//! assert_eq!(
//!     document.pointer(&["resource", "github_team_repository", "core_api", "team_id"]),
//!     Some(&Value::from("${github_team.core.id}")),
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Construction
//!
//! All nodes of a tree live in one arena, handles ([Scope], [Resource]) share it. Every element
//! holds one attribute cell per declared attribute. Assigning a value checks it against the
//! declared shape right away. Tokens and templates are accepted as they are, their shape can only
//! be checked once the whole tree is known.
//!
//! Errors during construction ([Error]) are returned immediately and leave the tree unchanged.
//!
//! ### Synthesis
//!
//! see [synth]
//!
//! Synthesis freezes the tree, assigns every element an [Address], validates the tree as a whole
//! and emits the [Document]. All problems found are returned together as
//! [AggregateValidationError].
//!
//! ### Output
//!
//! The document is a [value::Value] tree which in turn gets serialized via [serde]. Native hcl
//! output is built with [hcl].
//!
pub mod catalog;
mod cell;
mod error;
mod expr;
pub mod manifest;
mod meta;
mod resource;
pub mod schema;
mod shape;
pub mod synth;
mod token;
mod tree;
pub mod value;
mod visit;

pub use error::{AggregateValidationError, Diagnostic, Error, Issue, Result};
pub use expr::{Expr, Input, ToExpr};
pub use meta::{Lifecycle, MetaArguments, ProviderRef};
pub use resource::{Config, Resource};
pub use schema::{ElementKind, Mode, ProviderSource, ResourceSchema};
pub use shape::{Field, RecordShape, Scalar, Shape, ShapeMismatch};
pub use synth::{Address, Document};
pub use token::{AttributePath, ElementId, Instance, PathSegment, Segment, Template, Token};
pub use tree::{Construct, Scope};
pub use value::Value;
