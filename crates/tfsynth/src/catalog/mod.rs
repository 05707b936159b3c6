//! built-in resource types
//!
//! Typed classes for a subset of the `integrations/github` provider. Each class wraps a
//! [Resource] and dereferences to it, so the untyped API stays available. Every input attribute
//! gets a setter, a reset and an accessor for the stored value. Every attribute, input or computed,
//! gets a getter returning a [crate::Token].
//!
//! ```
//! # use tfsynth::{Scope, catalog::{Repository, RepositoryConfig}};
//! let root = Scope::root();
//! let repo = Repository::new(&root, "api", RepositoryConfig {
//!     name: Some("api".into()),
//!     ..Default::default()
//! })?;
//! repo.set_has_issues(true)?;
//! let document = root.synthesize()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
use crate::schema::{ElementKind, ProviderSource, ResourceSchema};
use std::sync::Arc;

/// Glue every typed class shares: cached schema, [std::ops::Deref] to [crate::Resource] and
/// conversions
macro_rules! element_class {
    ($class:ident, $schema:expr) => {
        impl $class {
            /// Schema of this element type
            pub fn type_schema() -> std::sync::Arc<$crate::schema::ResourceSchema> {
                static SCHEMA: std::sync::OnceLock<std::sync::Arc<$crate::schema::ResourceSchema>> =
                    std::sync::OnceLock::new();
                SCHEMA
                    .get_or_init(|| {
                        std::sync::Arc::new($schema.build().expect("built-in schemas are valid"))
                    })
                    .clone()
            }

            /// Typed view of an untyped element, if it is of this type
            pub fn from_resource(resource: $crate::Resource) -> Option<Self> {
                let schema = Self::type_schema();
                let matches = resource.kind() == schema.kind()
                    && resource.type_name() == schema.type_name();
                matches.then_some(Self(resource))
            }
        }

        impl std::ops::Deref for $class {
            type Target = $crate::Resource;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl AsRef<$crate::Resource> for $class {
            fn as_ref(&self) -> &$crate::Resource {
                &self.0
            }
        }

        impl From<$class> for $crate::Resource {
            fn from(value: $class) -> Self {
                value.0
            }
        }
    };
}

/// Setter, reset, stored value and token of an input attribute
macro_rules! input_attribute {
    ($name:ident: $ty:ty, $set:ident, $reset:ident, $input:ident) => {
        pub fn $set(&self, value: impl Into<$crate::Input<$ty>>) -> $crate::Result<()> {
            self.0.set(stringify!($name), value.into())
        }

        pub fn $reset(&self) -> $crate::Result<()> {
            self.0.reset(stringify!($name))
        }

        pub fn $input(&self) -> Option<$crate::Expr> {
            self.0.input(stringify!($name)).ok().flatten()
        }

        pub fn $name(&self) -> $crate::Token {
            self.0.reference(stringify!($name))
        }
    };
}

/// Tokens of computed attributes
macro_rules! computed_attributes {
    ($($name:ident),+ $(,)?) => {
        $(
            pub fn $name(&self) -> $crate::Token {
                self.0.reference(stringify!($name))
            }
        )+
    };
}

mod actions_secret;
mod branch_protection;
mod data_repository;
mod data_user;
mod provider;
mod repository;
mod repository_webhook;
mod team;
mod team_repository;

pub use actions_secret::{ActionsSecret, ActionsSecretConfig};
pub use branch_protection::{
    BranchProtection, BranchProtectionConfig, PullRequestReviews, RequiredStatusChecks,
};
pub use data_repository::{DataRepository, DataRepositoryConfig};
pub use data_user::{DataUser, DataUserConfig};
pub use provider::{AppAuth, GithubProvider, GithubProviderConfig};
pub use repository::{Repository, RepositoryConfig};
pub use repository_webhook::{RepositoryWebhook, RepositoryWebhookConfig, WebhookConfiguration};
pub use team::{Team, TeamConfig};
pub use team_repository::{TeamRepository, TeamRepositoryConfig};

/// Provider all built-in types belong to
pub(crate) fn github() -> ProviderSource {
    ProviderSource::new("github", "integrations/github").with_version("~> 6.0")
}

/// All built-in schemas, the provider first
pub fn schemas() -> Vec<Arc<ResourceSchema>> {
    vec![
        GithubProvider::type_schema(),
        Repository::type_schema(),
        RepositoryWebhook::type_schema(),
        BranchProtection::type_schema(),
        Team::type_schema(),
        TeamRepository::type_schema(),
        ActionsSecret::type_schema(),
        DataRepository::type_schema(),
        DataUser::type_schema(),
    ]
}

/// Built-in schema of `kind` named `type_name`
pub fn lookup(kind: ElementKind, type_name: &str) -> Option<Arc<ResourceSchema>> {
    schemas()
        .into_iter()
        .find(|schema| schema.kind() == kind && schema.type_name() == type_name)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lookup_by_kind_and_type() {
        let data = lookup(ElementKind::DataSource, "github_repository").unwrap();
        let resource = lookup(ElementKind::Resource, "github_repository").unwrap();

        assert_eq!(data.kind(), ElementKind::DataSource);
        assert_eq!(resource.kind(), ElementKind::Resource);
        assert!(lookup(ElementKind::Resource, "github_user").is_none());
    }

    #[test]
    fn every_schema_names_the_provider() {
        for schema in schemas() {
            assert_eq!(schema.provider(), Some(&github()), "{}", schema.type_name());
        }
    }
}
