//! meta-arguments
//!
//! Settings understood by the target system itself rather than by the resource type. Which of them
//! an element accepts depends on its [ElementKind]:
//!
//! | meta-argument | provider | data | resource |
//! |---------------|----------|------|----------|
//! | `alias`       | yes      |      |          |
//! | `count`       |          | yes  | yes      |
//! | `depends_on`  |          | yes  | yes      |
//! | `provider`    |          | yes  | yes      |
//! | `lifecycle`   |          |      | yes      |
use crate::resource::Resource;
use crate::schema::ElementKind;
use crate::token::ElementId;

/// `lifecycle` block of a resource
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lifecycle {
    pub create_before_destroy: Option<bool>,
    pub prevent_destroy: Option<bool>,
    pub ignore_changes: Vec<String>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_before_destroy(mut self, value: bool) -> Self {
        self.create_before_destroy = Some(value);
        self
    }

    pub fn prevent_destroy(mut self, value: bool) -> Self {
        self.prevent_destroy = Some(value);
        self
    }

    pub fn ignore_changes<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.ignore_changes.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.create_before_destroy.is_none()
            && self.prevent_destroy.is_none()
            && self.ignore_changes.is_empty()
    }
}

/// Provider an element should use instead of the default one
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderRef {
    /// A provider element of the same tree
    Element(ElementId),
    /// Looked up by type and alias in the scopes above the element, written as `type.alias`
    Alias {
        provider_type: String,
        alias: Option<String>,
    },
}

impl ProviderRef {
    pub fn alias(provider_type: impl Into<String>, alias: impl Into<String>) -> Self {
        ProviderRef::Alias {
            provider_type: provider_type.into(),
            alias: Some(alias.into()),
        }
    }
}

impl From<&str> for ProviderRef {
    /// `github.secondary` or `github`
    fn from(value: &str) -> Self {
        match value.split_once('.') {
            Some((provider_type, alias)) => ProviderRef::alias(provider_type, alias),
            None => ProviderRef::Alias {
                provider_type: value.to_string(),
                alias: None,
            },
        }
    }
}

impl From<&Resource> for ProviderRef {
    fn from(value: &Resource) -> Self {
        ProviderRef::Element(value.element_id())
    }
}

impl std::fmt::Display for ProviderRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderRef::Element(_) => f.write_str("<provider element>"),
            ProviderRef::Alias {
                provider_type,
                alias: Some(alias),
            } => write!(f, "{provider_type}.{alias}"),
            ProviderRef::Alias {
                provider_type,
                alias: None,
            } => f.write_str(provider_type),
        }
    }
}

/// Meta-arguments given when an element is constructed
#[derive(Debug, Clone, Default)]
pub struct MetaArguments {
    pub count: Option<u32>,
    pub depends_on: Vec<ElementId>,
    pub lifecycle: Option<Lifecycle>,
    pub provider: Option<ProviderRef>,
    pub alias: Option<String>,
}

impl MetaArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn depends_on(mut self, other: &Resource) -> Self {
        self.depends_on.push(other.element_id());
        self
    }

    pub fn lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    pub fn provider(mut self, provider: impl Into<ProviderRef>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Name of the first meta-argument that `kind` does not support
    pub(crate) fn unsupported_by(&self, kind: ElementKind) -> Option<&'static str> {
        let present = [
            ("alias", self.alias.is_some()),
            ("count", self.count.is_some()),
            ("depends_on", !self.depends_on.is_empty()),
            ("lifecycle", self.lifecycle.is_some()),
            ("provider", self.provider.is_some()),
        ];

        present
            .into_iter()
            .find(|(name, present)| *present && !supports(kind, name))
            .map(|(name, _)| name)
    }
}

pub(crate) fn supports(kind: ElementKind, meta_argument: &str) -> bool {
    match kind {
        ElementKind::Provider => meta_argument == "alias",
        ElementKind::DataSource => {
            matches!(meta_argument, "count" | "depends_on" | "provider")
        }
        ElementKind::Resource => {
            matches!(meta_argument, "count" | "depends_on" | "lifecycle" | "provider")
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn provider_ref_parses_alias() {
        assert_eq!(ProviderRef::from("gh.b"), ProviderRef::alias("gh", "b"));
        assert_eq!(ProviderRef::from("gh.b").to_string(), "gh.b");
        assert_eq!(ProviderRef::from("gh").to_string(), "gh");
    }

    #[test]
    fn applicability() {
        let meta = MetaArguments::new().alias("b");
        assert_eq!(meta.unsupported_by(ElementKind::Provider), None);
        assert_eq!(meta.unsupported_by(ElementKind::Resource), Some("alias"));

        let meta = MetaArguments::new()
            .count(2)
            .lifecycle(Lifecycle::new().prevent_destroy(true));
        assert_eq!(meta.unsupported_by(ElementKind::Resource), None);
        assert_eq!(meta.unsupported_by(ElementKind::DataSource), Some("lifecycle"));
        assert_eq!(meta.unsupported_by(ElementKind::Provider), Some("count"));
    }

    #[test]
    fn empty_lifecycle() {
        assert!(Lifecycle::new().is_empty());
        assert!(!Lifecycle::new().ignore_changes(["tags"]).is_empty());
    }
}
