//! synthesis
//!
//! Turns a construct tree into a [Document]. Synthesis freezes the tree and always starts at its
//! root, no matter which scope it was called on.
//!
//! ### Phases
//!
//! 1. **Addresses**: every element gets an [Address], walking the tree in pre-order. Two
//!    resources or data sources with the same address are reported as `DuplicateId`.
//! 2. **Providers**: providers of one type need distinct aliases (`AmbiguousProvider`).
//! 3. **Elements**: each element produces its body. Required attributes must be set, tokens must
//!    point into this tree, at a declared attribute whose shape fits the consuming attribute. Tokens
//!    are rendered as `${address.path}`.
//! 4. **Cycles**: explicit dependencies and references form a graph that must be acyclic.
//! 5. **Emission**: only if no phase found a problem. Otherwise every problem is returned at once as
//!    [AggregateValidationError].
//!
//! Synthesizing the same tree twice yields byte-identical documents.
mod address;
mod document;
mod graph;
mod hcl;
mod resolve;

pub use address::Address;
pub use document::Document;

use crate::error::{AggregateValidationError, Issue};
use crate::meta::ProviderRef;
use crate::resource::ResourceCore;
use crate::schema::{ElementKind, ResourceSchema};
use crate::token::ElementId;
use crate::tree::{NodeId, Scope, Tree};
use crate::value::Value;
use indexmap::IndexMap;
use std::collections::HashMap;

/// State shared by all elements during one synthesis
pub(crate) struct Context<'t> {
    tree: &'t Tree,
    addresses: HashMap<NodeId, Address>,
    errors: AggregateValidationError,
}

impl<'t> Context<'t> {
    fn new(tree: &'t Tree) -> Self {
        Self {
            tree,
            addresses: HashMap::new(),
            errors: AggregateValidationError::new(),
        }
    }

    /// Address of an element of the synthesized tree
    pub(crate) fn address(&self, node: NodeId) -> &Address {
        &self.addresses[&node]
    }

    /// Element `id`, if it is part of the synthesized tree
    pub(crate) fn lookup(&self, id: ElementId) -> Option<&'t ResourceCore> {
        self.tree.lookup(id)
    }

    pub(crate) fn log(&mut self, address: &Address, issue: Issue) {
        self.errors.log(address.to_string(), issue);
    }

    fn assign_addresses(&mut self, elements: &[&ResourceCore]) {
        let mut taken: HashMap<String, &ResourceCore> = HashMap::new();

        for core in elements {
            let node = core.id().node;
            let Some(address) = Address::assign(self.tree, node) else {
                continue;
            };

            if address.kind() != ElementKind::Provider {
                let key = address.to_string();
                if let Some(first) = taken.get(&key) {
                    let issue = Issue::DuplicateId {
                        first: first.path().to_string(),
                        second: core.path().to_string(),
                    };
                    self.log(&address, issue);
                } else {
                    taken.insert(key, *core);
                }
            }

            tracing::trace!(path = core.path(), %address, "address assigned");
            self.addresses.insert(node, address);
        }
    }

    fn check_providers(&mut self, elements: &[&ResourceCore]) {
        let mut providers: IndexMap<(&str, Option<&str>), Vec<NodeId>> = IndexMap::new();
        for core in elements.iter().filter(|core| core.kind() == ElementKind::Provider) {
            providers
                .entry((core.schema().type_name(), core.alias()))
                .or_default()
                .push(core.id().node);
        }

        for ((provider_type, alias), nodes) in providers {
            if nodes.len() < 2 {
                continue;
            }

            let address = self.address(nodes[1]).clone();
            let issue = Issue::AmbiguousProvider {
                provider_type: provider_type.to_string(),
                alias: alias.map(str::to_string),
            };
            self.log(&address, issue);
        }
    }

    /// Provider `reference` as seen from `consumer`
    ///
    /// Aliases are looked up in the scopes enclosing the consumer, innermost first.
    pub(crate) fn resolve_provider(
        &self,
        consumer: NodeId,
        schema: &ResourceSchema,
        reference: &ProviderRef,
    ) -> Result<&Address, String> {
        let provider = match reference {
            ProviderRef::Element(id) => {
                let provider = self
                    .lookup(*id)
                    .ok_or_else(|| "it is not part of this construct tree".to_string())?;

                let visible = self.tree.node(id.node).parent.is_some_and(|parent| {
                    self.tree
                        .ancestors(consumer)
                        .any(|ancestor| ancestor == parent)
                });
                if !visible {
                    return Err(format!(
                        "`{}` is not declared in an enclosing scope",
                        provider.path()
                    ));
                }
                provider
            }
            ProviderRef::Alias {
                provider_type,
                alias,
            } => self
                .tree
                .ancestors(consumer)
                .flat_map(|scope| self.tree.node(scope).children.values())
                .filter_map(|child| self.tree.element(*child))
                .find(|core| {
                    core.kind() == ElementKind::Provider
                        && core.schema().type_name() == provider_type.as_str()
                        && core.alias() == alias.as_deref()
                })
                .ok_or_else(|| "no such provider is declared in an enclosing scope".to_string())?,
        };

        if let Some(source) = schema.provider() {
            if source.name != provider.schema().type_name() {
                return Err(format!(
                    "`{}` is served by the `{}` provider",
                    schema.type_name(),
                    source.name
                ));
            }
        }

        Ok(self.address(provider.id().node))
    }
}

#[tracing::instrument(level = "debug", skip_all)]
pub(crate) fn synthesize(scope: &Scope) -> Result<Document, AggregateValidationError> {
    scope.tree().borrow_mut().freeze();
    let tree = scope.tree().borrow();

    let elements: Vec<&ResourceCore> = tree
        .pre_order()
        .into_iter()
        .filter_map(|node| tree.element(node))
        .collect();
    tracing::debug!(elements = elements.len(), "synthesizing");

    let mut ctx = Context::new(&tree);
    ctx.assign_addresses(&elements);
    ctx.check_providers(&elements);

    let bodies: Vec<(&ResourceCore, IndexMap<String, Value>)> = elements
        .iter()
        .map(|core| (*core, core.synthesize_self(&mut ctx)))
        .collect();

    let dependencies = graph::dependency_graph(&tree, &elements);
    for cycle in graph::find_cycles(&dependencies) {
        let address = ctx.address(cycle[0]).clone();
        let cycle = cycle
            .into_iter()
            .map(|node| ctx.address(node).to_string())
            .collect();
        ctx.log(&address, Issue::CircularDependency { cycle });
    }

    if !ctx.errors.is_empty() {
        tracing::debug!(problems = ctx.errors.diagnostics().len(), "synthesis failed");
        return Err(ctx.errors);
    }

    Ok(emit(&ctx, bodies))
}

fn emit(ctx: &Context, bodies: Vec<(&ResourceCore, IndexMap<String, Value>)>) -> Document {
    let mut required_providers: IndexMap<String, Value> = IndexMap::new();
    let mut providers: IndexMap<String, Vec<Value>> = IndexMap::new();
    let mut data: IndexMap<String, IndexMap<String, Value>> = IndexMap::new();
    let mut resources: IndexMap<String, IndexMap<String, Value>> = IndexMap::new();

    for (core, body) in bodies {
        if let Some(source) = core.schema().provider() {
            required_providers
                .entry(source.name.clone())
                .or_insert_with(|| {
                    let mut requirement = IndexMap::new();
                    requirement.insert("source".to_string(), Value::from(source.source.as_str()));
                    if let Some(version) = &source.version {
                        requirement.insert("version".to_string(), Value::from(version.as_str()));
                    }
                    Value::Object(requirement)
                });
        }

        let address = ctx.address(core.id().node);
        let type_name = address.type_name().to_string();
        let name = address.name().unwrap_or_default().to_string();
        match address.kind() {
            ElementKind::Provider => {
                providers
                    .entry(type_name)
                    .or_default()
                    .push(Value::Object(body));
            }
            ElementKind::DataSource => {
                data.entry(type_name)
                    .or_default()
                    .insert(name, Value::Object(body));
            }
            ElementKind::Resource => {
                resources
                    .entry(type_name)
                    .or_default()
                    .insert(name, Value::Object(body));
            }
        }
    }

    let mut root = IndexMap::new();
    if !required_providers.is_empty() {
        let mut terraform = IndexMap::new();
        terraform.insert(
            "required_providers".to_string(),
            Value::Object(required_providers),
        );
        root.insert("terraform".to_string(), Value::Object(terraform));
    }
    if !providers.is_empty() {
        root.insert("provider".to_string(), Value::from(providers));
    }
    if !data.is_empty() {
        root.insert("data".to_string(), Value::from(data));
    }
    if !resources.is_empty() {
        root.insert("resource".to_string(), Value::from(resources));
    }

    Document::new(root)
}
