//! resources, data sources and providers
//!
//! All three kinds of element share one implementation: a [ResourceCore] stored in the construct
//! tree, holding one [AttributeCell] per declared attribute plus the meta-arguments. [Resource] is
//! a cheap handle to it. Typed catalog classes wrap a [Resource] and dereference to it.
use crate::cell::AttributeCell;
use crate::error::{Error, Issue, Result};
use crate::expr::Expr;
use crate::meta::{supports, Lifecycle, MetaArguments, ProviderRef};
use crate::schema::{is_identifier, ElementKind, ResourceSchema};
use crate::synth::Context;
use crate::token::{AttributePath, ElementId, Token};
use crate::tree::{Content, NodeId, Scope, Tree};
use crate::value::Value;
use crate::visit::VisitTokens;
use indexmap::{IndexMap, IndexSet};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// Initial attribute values and meta-arguments of a new element
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub attributes: IndexMap<String, Expr>,
    pub meta: MetaArguments,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Expr>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn meta(mut self, meta: MetaArguments) -> Self {
        self.meta = meta;
        self
    }
}

/// Element state kept in the construct tree
#[derive(Debug)]
pub(crate) struct ResourceCore {
    id: ElementId,
    path: String,
    schema: Arc<ResourceSchema>,
    cells: IndexMap<String, AttributeCell>,
    count: Option<u32>,
    depends_on: IndexSet<ElementId>,
    lifecycle: Option<Lifecycle>,
    provider: Option<ProviderRef>,
    alias: Option<String>,
}

impl ResourceCore {
    fn new(id: ElementId, path: String, schema: Arc<ResourceSchema>) -> Self {
        let cells = schema
            .attributes()
            .iter()
            .map(|spec| (spec.name.clone(), AttributeCell::new(spec.clone())))
            .collect();

        Self {
            id,
            path,
            schema,
            cells,
            count: None,
            depends_on: Default::default(),
            lifecycle: None,
            provider: None,
            alias: None,
        }
    }

    pub(crate) fn id(&self) -> ElementId {
        self.id
    }

    pub(crate) fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn schema(&self) -> &Arc<ResourceSchema> {
        &self.schema
    }

    pub(crate) fn kind(&self) -> ElementKind {
        self.schema.kind()
    }

    pub(crate) fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub(crate) fn count(&self) -> Option<u32> {
        self.count
    }

    pub(crate) fn depends_on(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.depends_on.iter().copied()
    }

    fn cell(&self, name: &str) -> Result<&AttributeCell> {
        self.cells.get(name).ok_or_else(|| self.unknown_attribute(name))
    }

    fn cell_mut(&mut self, name: &str) -> Result<&mut AttributeCell> {
        if !self.cells.contains_key(name) {
            return Err(self.unknown_attribute(name));
        }
        Ok(&mut self.cells[name])
    }

    fn unknown_attribute(&self, name: &str) -> Error {
        Error::UnknownAttribute {
            element: self.path.clone(),
            type_name: self.schema.type_name().to_string(),
            name: name.to_string(),
        }
    }

    fn set(&mut self, name: &str, value: Expr) -> Result<()> {
        let element = self.path.clone();
        let cell = self.cell_mut(name)?;

        if !cell.spec().is_input() {
            return Err(Error::ReadOnlyAttribute {
                element,
                name: name.to_string(),
            });
        }

        cell.set(value)
            .map_err(|mismatch| Error::InvalidAttributeType { element, mismatch })
    }

    fn check_meta_argument(&self, name: &'static str) -> Result<()> {
        if supports(self.kind(), name) {
            return Ok(());
        }

        Err(Error::UnsupportedMetaArgument {
            element: self.path.clone(),
            kind: self.kind(),
            name,
        })
    }

    /// Every token stored in any attribute, in declaration order
    pub(crate) fn references(&self) -> Vec<Token> {
        let mut tokens = vec![];
        for value in self.cells.values().filter_map(AttributeCell::value) {
            value.visit_tokens(&mut |token: &Token| tokens.push(token.clone()));
        }
        tokens
    }

    /// Produce the body of this element in the output document
    ///
    /// Problems are logged on `ctx`, the returned body is only meaningful if none were found.
    #[tracing::instrument(level = "trace", skip_all, fields(path = %self.path))]
    pub(crate) fn synthesize_self(&self, ctx: &mut Context) -> IndexMap<String, Value> {
        let address = ctx.address(self.id.node).clone();
        let mut body = IndexMap::new();

        if let Some(alias) = &self.alias {
            body.insert("alias".to_string(), Value::from(alias.as_str()));
        }

        for (name, cell) in &self.cells {
            let Some(value) = cell.value() else {
                if cell.is_required() {
                    ctx.log(
                        &address,
                        Issue::MissingRequired {
                            attribute: name.clone(),
                        },
                    );
                }
                continue;
            };

            let mut path = AttributePath::from(name.as_str());
            if let Some(value) = ctx.resolve(&address, value, &cell.spec().shape, &mut path) {
                body.insert(name.clone(), value);
            }
        }

        if !self.depends_on.is_empty() {
            let dependencies = self
                .depends_on
                .iter()
                .map(|dependency| Value::String(ctx.address(dependency.node).to_string()))
                .collect();
            body.insert("depends_on".to_string(), Value::Array(dependencies));
        }

        if let Some(lifecycle) = self.lifecycle.as_ref().filter(|l| !l.is_empty()) {
            for (index, name) in lifecycle.ignore_changes.iter().enumerate() {
                if name == "all" || self.cells.contains_key(name) {
                    continue;
                }
                let issue = Issue::InvalidAttributeType {
                    attribute: AttributePath::from("lifecycle")
                        .attr("ignore_changes")
                        .index(index),
                    expected: "a declared attribute or `all`".to_string(),
                    found: format!("`{name}`"),
                };
                ctx.log(&address, issue);
            }
            body.insert("lifecycle".to_string(), lifecycle_value(lifecycle));
        }

        if let Some(provider) = &self.provider {
            let resolved = ctx
                .resolve_provider(self.id.node, &self.schema, provider)
                .map(ToString::to_string);
            match resolved {
                Ok(provider_address) => {
                    body.insert("provider".to_string(), Value::String(provider_address));
                }
                Err(reason) => ctx.log(
                    &address,
                    Issue::UnknownProvider {
                        reference: provider.to_string(),
                        reason,
                    },
                ),
            }
        }

        if let Some(count) = self.count {
            body.insert("count".to_string(), Value::Integer(count.into()));
        }

        body
    }
}

fn lifecycle_value(lifecycle: &Lifecycle) -> Value {
    let mut object = IndexMap::new();
    if let Some(value) = lifecycle.create_before_destroy {
        object.insert("create_before_destroy".to_string(), Value::Boolean(value));
    }
    if let Some(value) = lifecycle.prevent_destroy {
        object.insert("prevent_destroy".to_string(), Value::Boolean(value));
    }
    if !lifecycle.ignore_changes.is_empty() {
        let names = lifecycle
            .ignore_changes
            .iter()
            .map(|name| Value::from(name.as_str()))
            .collect();
        object.insert("ignore_changes".to_string(), Value::Array(names));
    }
    Value::Object(object)
}

/// Handle to an element of a construct tree
///
/// Cloning creates another handle to the same element.
#[derive(Clone)]
pub struct Resource {
    tree: Rc<RefCell<Tree>>,
    node: NodeId,
}

impl Resource {
    /// Add an element of type `schema` with the id `id` below `scope`
    ///
    /// Fails without changing the tree if the id is taken, a meta-argument does not apply to the
    /// element kind, or an attribute in `config` is unknown, read-only or of the wrong shape.
    pub fn new(
        scope: &Scope,
        id: &str,
        schema: Arc<ResourceSchema>,
        config: Config,
    ) -> Result<Resource> {
        let tree = scope.tree().clone();
        let mut guard = tree.borrow_mut();
        guard.check_insert(scope.node(), id)?;

        let path = guard.child_path(scope.node(), id);
        if let Some(name) = config.meta.unsupported_by(schema.kind()) {
            return Err(Error::UnsupportedMetaArgument {
                element: path,
                kind: schema.kind(),
                name,
            });
        }
        if let Some(alias) = config.meta.alias.as_deref().filter(|alias| !is_identifier(alias)) {
            return Err(Error::InvalidId(alias.to_string()));
        }

        let element_id = ElementId {
            tree: guard.id,
            node: guard.next_node_id(),
        };
        let mut core = ResourceCore::new(element_id, path, schema);

        for dependency in &config.meta.depends_on {
            check_dependency(&guard, &core, *dependency)?;
            core.depends_on.insert(*dependency);
        }
        if let Some(provider) = &config.meta.provider {
            check_provider(&guard, &core, provider)?;
        }
        core.provider = config.meta.provider;
        core.count = config.meta.count;
        core.lifecycle = config.meta.lifecycle;
        core.alias = config.meta.alias;

        for (name, value) in config.attributes {
            core.set(&name, value)?;
        }

        tracing::debug!(path = %core.path, type_name = core.schema.type_name(), kind = %core.kind(), "element added");
        let node = guard.insert(scope.node(), id, Content::Element(core))?;
        drop(guard);

        Ok(Resource { tree, node })
    }

    pub(crate) fn from_parts(tree: Rc<RefCell<Tree>>, node: NodeId) -> Self {
        Self { tree, node }
    }

    fn with_core<T>(&self, f: impl FnOnce(&ResourceCore) -> T) -> T {
        let tree = self.tree.borrow();
        let core = tree
            .element(self.node)
            .unwrap_or_else(|| unreachable!("resource handles always point to elements"));
        f(core)
    }

    fn with_core_mut<T>(&self, f: impl FnOnce(&Tree, &mut ResourceCore) -> Result<T>) -> Result<T> {
        let mut tree = self.tree.borrow_mut();
        if tree.is_frozen() {
            return Err(Error::Frozen);
        }

        // the core is taken out for the duration of the change so the rest of the tree stays readable
        let placeholder = Content::Scope { prefix: None };
        let mut content = std::mem::replace(&mut tree.node_mut(self.node).content, placeholder);
        let Content::Element(core) = &mut content else {
            unreachable!("resource handles always point to elements")
        };
        let result = f(&tree, core);
        tree.node_mut(self.node).content = content;
        result
    }

    pub fn element_id(&self) -> ElementId {
        self.with_core(ResourceCore::id)
    }

    /// Local id within the parent scope
    pub fn local_id(&self) -> String {
        self.tree.borrow().node(self.node).local_id.clone()
    }

    /// Ids from below the root to this element joined with `/`
    pub fn path(&self) -> String {
        self.with_core(|core| core.path.clone())
    }

    pub fn kind(&self) -> ElementKind {
        self.with_core(ResourceCore::kind)
    }

    pub fn type_name(&self) -> String {
        self.with_core(|core| core.schema.type_name().to_string())
    }

    pub fn schema(&self) -> Arc<ResourceSchema> {
        self.with_core(|core| core.schema.clone())
    }

    /// Scope this element was added to
    pub fn scope(&self) -> Scope {
        let parent = self
            .tree
            .borrow()
            .node(self.node)
            .parent
            .unwrap_or(NodeId::ROOT);
        Scope::from_parts(self.tree.clone(), parent)
    }

    /// Assign an attribute, [Expr::Null] clears it
    pub fn set(&self, name: &str, value: impl Into<Expr>) -> Result<()> {
        let value = value.into();
        self.with_core_mut(|_, core| core.set(name, value))
    }

    /// Return an attribute to the unset state
    pub fn reset(&self, name: &str) -> Result<()> {
        self.with_core_mut(|_, core| {
            core.cell_mut(name)?.reset();
            Ok(())
        })
    }

    /// Current value of an attribute
    ///
    /// Unset attributes that the target system computes return a reference to themselves.
    pub fn get(&self, name: &str) -> Result<Option<Expr>> {
        self.with_core(|core| Ok(core.cell(name)?.get(core.id)))
    }

    /// Stored value of an attribute, without the fallback for computed attributes
    pub fn input(&self, name: &str) -> Result<Option<Expr>> {
        self.with_core(|core| Ok(core.cell(name)?.value().cloned()))
    }

    pub fn is_set(&self, name: &str) -> Result<bool> {
        self.with_core(|core| Ok(core.cell(name)?.is_set()))
    }

    pub fn is_required(&self, name: &str) -> Result<bool> {
        self.with_core(|core| Ok(core.cell(name)?.is_required()))
    }

    /// Token for the attribute at `path`
    ///
    /// The path is not checked here, an undeclared path is reported during synthesis.
    pub fn reference(&self, path: impl Into<AttributePath>) -> Token {
        Token::new(self.element_id(), path.into())
    }

    /// Token for a declared top level attribute
    pub fn try_reference(&self, name: &str) -> Result<Token> {
        self.with_core(|core| {
            core.cell(name)?;
            Ok(Token::new(core.id, AttributePath::from(name)))
        })
    }

    /// Tokens stored in this element's attributes
    pub fn references(&self) -> Vec<Token> {
        self.with_core(ResourceCore::references)
    }

    /// Require `other` to be handled by the target system before this element
    pub fn add_dependency(&self, other: &Resource) -> Result<()> {
        let dependency = other.element_id();
        self.with_core_mut(|tree, core| {
            core.check_meta_argument("depends_on")?;
            check_dependency(tree, core, dependency)?;
            core.depends_on.insert(dependency);
            Ok(())
        })
    }

    /// Explicit dependencies, in the order they were added
    pub fn dependencies(&self) -> Vec<ElementId> {
        self.with_core(|core| core.depends_on().collect())
    }

    pub fn count(&self) -> Option<u32> {
        self.with_core(|core| core.count)
    }

    pub fn set_count(&self, count: Option<u32>) -> Result<()> {
        self.with_core_mut(|_, core| {
            core.check_meta_argument("count")?;
            core.count = count;
            Ok(())
        })
    }

    pub fn lifecycle(&self) -> Option<Lifecycle> {
        self.with_core(|core| core.lifecycle.clone())
    }

    pub fn set_lifecycle(&self, lifecycle: Option<Lifecycle>) -> Result<()> {
        self.with_core_mut(|_, core| {
            core.check_meta_argument("lifecycle")?;
            core.lifecycle = lifecycle;
            Ok(())
        })
    }

    pub fn provider(&self) -> Option<ProviderRef> {
        self.with_core(|core| core.provider.clone())
    }

    pub fn set_provider(&self, provider: Option<ProviderRef>) -> Result<()> {
        self.with_core_mut(|tree, core| {
            core.check_meta_argument("provider")?;
            if let Some(provider) = &provider {
                check_provider(tree, core, provider)?;
            }
            core.provider = provider;
            Ok(())
        })
    }

    /// Alias of a provider element
    pub fn alias(&self) -> Option<String> {
        self.with_core(|core| core.alias.clone())
    }
}

impl AsRef<Resource> for Resource {
    fn as_ref(&self) -> &Resource {
        self
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with_core(|core| {
            f.debug_struct("Resource")
                .field("path", &core.path)
                .field("type_name", &core.schema.type_name())
                .finish()
        })
    }
}

fn check_dependency(tree: &Tree, core: &ResourceCore, dependency: ElementId) -> Result<()> {
    let Some(target) = tree.lookup(dependency).or_else(|| {
        // the element being constructed is not in the tree yet
        (dependency == core.id).then_some(core)
    }) else {
        return Err(Error::ForeignElement {
            element: core.path.clone(),
            target: "<element of another construct tree>".to_string(),
        });
    };

    if target.kind() == ElementKind::Provider {
        return Err(Error::InvalidDependency {
            element: core.path.clone(),
            target: target.path.clone(),
        });
    }

    Ok(())
}

fn check_provider(tree: &Tree, core: &ResourceCore, provider: &ProviderRef) -> Result<()> {
    let ProviderRef::Element(id) = provider else {
        return Ok(());
    };

    let Some(target) = tree.lookup(*id) else {
        return Err(Error::ForeignElement {
            element: core.path.clone(),
            target: "<element of another construct tree>".to_string(),
        });
    };

    if target.kind() != ElementKind::Provider {
        return Err(Error::NotAProvider {
            element: core.path.clone(),
            target: target.path.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::schema::ResourceSchema;
    use crate::shape::{Scalar, Shape};
    use pretty_assertions::assert_eq;

    fn widget() -> Arc<ResourceSchema> {
        Arc::new(
            ResourceSchema::builder(ElementKind::Resource, "widget")
                .required("name", Shape::STRING)
                .optional("tags", Shape::List(Scalar::String))
                .computed("id", Shape::STRING)
                .optional_computed("slug", Shape::STRING)
                .build()
                .unwrap(),
        )
    }

    fn provider() -> Arc<ResourceSchema> {
        Arc::new(
            ResourceSchema::builder(ElementKind::Provider, "gh")
                .optional("owner", Shape::STRING)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn set_get_reset() {
        let root = Scope::root();
        let w = Resource::new(&root, "w", widget(), Config::new()).unwrap();

        assert_eq!(w.get("name").unwrap(), None);
        w.set("name", "hello").unwrap();
        assert_eq!(w.get("name").unwrap(), Some(Expr::from("hello")));
        assert!(w.is_set("name").unwrap());

        w.reset("name").unwrap();
        assert!(!w.is_set("name").unwrap());
        assert!(w.is_required("name").unwrap());
    }

    #[test]
    fn construction_errors_leave_tree_unchanged() {
        let root = Scope::root();
        let config = Config::new().attribute("name", 5);

        let err = Resource::new(&root, "w", widget(), config).unwrap_err();
        assert!(matches!(err, Error::InvalidAttributeType { .. }));
        assert!(root.child("w").is_none());

        let err = Resource::new(&root, "w", widget(), Config::new().attribute("nope", "x"))
            .unwrap_err();
        assert_eq!(
            err,
            Error::UnknownAttribute {
                element: "w".into(),
                type_name: "widget".into(),
                name: "nope".into()
            }
        );

        Resource::new(&root, "w", widget(), Config::new()).unwrap();
        let err = Resource::new(&root, "w", widget(), Config::new()).unwrap_err();
        assert!(matches!(err, Error::DuplicateId { .. }));
    }

    #[test]
    fn computed_attributes_are_read_only() {
        let root = Scope::root();
        let w = Resource::new(&root, "w", widget(), Config::new()).unwrap();

        let err = w.set("id", "abc").unwrap_err();
        assert_eq!(
            err,
            Error::ReadOnlyAttribute {
                element: "w".into(),
                name: "id".into()
            }
        );

        let Some(Expr::Reference(token)) = w.get("id").unwrap() else {
            panic!("computed attribute must read as a reference");
        };
        assert_eq!(token, w.reference("id"));

        w.set("slug", "fixed").unwrap();
        assert_eq!(w.get("slug").unwrap(), Some(Expr::from("fixed")));
    }

    #[test]
    fn meta_arguments_are_checked_against_kind() {
        let root = Scope::root();

        let meta = MetaArguments::new().alias("b");
        let config = Config::new().meta(meta);
        let err = Resource::new(&root, "w", widget(), config).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedMetaArgument { name: "alias", .. }
        ));

        let gh = Resource::new(&root, "gh", provider(), Config::new()).unwrap();
        assert!(matches!(
            gh.set_count(Some(2)).unwrap_err(),
            Error::UnsupportedMetaArgument { name: "count", .. }
        ));
    }

    #[test]
    fn aliases_are_identifiers() {
        let root = Scope::root();

        for alias in ["", "has space", "a.b"] {
            let config = Config::new().meta(MetaArguments::new().alias(alias));
            let err = Resource::new(&root, "gh_alt", provider(), config).unwrap_err();
            assert_eq!(err, Error::InvalidId(alias.to_string()));
        }
        assert!(root.child("gh_alt").is_none());

        let config = Config::new().meta(MetaArguments::new().alias("eu_west"));
        let gh = Resource::new(&root, "gh_alt", provider(), config).unwrap();
        assert_eq!(gh.alias().as_deref(), Some("eu_west"));
    }

    #[test]
    fn dependencies() {
        let root = Scope::root();
        let gh = Resource::new(&root, "gh", provider(), Config::new()).unwrap();
        let a = Resource::new(&root, "a", widget(), Config::new()).unwrap();
        let b = Resource::new(
            &root,
            "b",
            widget(),
            Config::new().meta(MetaArguments::new().depends_on(&a).provider(&gh)),
        )
        .unwrap();

        assert_eq!(b.dependencies(), [a.element_id()]);
        b.add_dependency(&a).unwrap();
        assert_eq!(b.dependencies().len(), 1);

        assert!(matches!(
            b.add_dependency(&gh).unwrap_err(),
            Error::InvalidDependency { .. }
        ));

        let other = Scope::root();
        let foreign = Resource::new(&other, "f", widget(), Config::new()).unwrap();
        assert!(matches!(
            b.add_dependency(&foreign).unwrap_err(),
            Error::ForeignElement { .. }
        ));
        assert!(matches!(
            b.set_provider(Some(ProviderRef::from(&a))).unwrap_err(),
            Error::NotAProvider { .. }
        ));
    }

    #[test]
    fn frozen_elements_reject_changes() {
        let root = Scope::root();
        let w = Resource::new(&root, "w", widget(), Config::new().attribute("name", "x")).unwrap();
        root.tree().borrow_mut().freeze();

        assert_eq!(w.set("name", "y").unwrap_err(), Error::Frozen);
        assert_eq!(w.reset("name").unwrap_err(), Error::Frozen);
        assert_eq!(w.get("name").unwrap(), Some(Expr::from("x")));
    }

    #[test]
    fn references_are_collected() {
        let root = Scope::root();
        let a = Resource::new(&root, "a", widget(), Config::new()).unwrap();
        let b = Resource::new(&root, "b", widget(), Config::new()).unwrap();
        b.set("name", a.reference("id")).unwrap();

        assert_eq!(b.references(), [a.reference("id")]);
        assert_eq!(a.try_reference("slug").unwrap(), a.reference("slug"));
        assert!(a.try_reference("missing").is_err());
    }
}
