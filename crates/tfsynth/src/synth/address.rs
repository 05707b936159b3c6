use crate::schema::ElementKind;
use crate::tree::{NodeId, Tree};

/// Address of an element in the output document
///
/// | kind     | address                         |
/// |----------|---------------------------------|
/// | resource | `type.name`                     |
/// | data     | `data.type.name`                |
/// | provider | `type`, or `type.alias`         |
///
/// The name of resources and data sources is made of the prefixes of the enclosing scopes
/// (outermost first) and the local id, joined with `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    kind: ElementKind,
    type_name: String,
    name: Option<String>,
}

impl Address {
    pub(crate) fn assign(tree: &Tree, node: NodeId) -> Option<Address> {
        let core = tree.element(node)?;
        let kind = core.kind();
        let type_name = core.schema().type_name().to_string();

        let name = match kind {
            ElementKind::Provider => core.alias().map(str::to_string),
            ElementKind::DataSource | ElementKind::Resource => {
                let mut parts = tree.prefixes(node);
                parts.push(tree.node(node).local_id.as_str());
                Some(parts.join("."))
            }
        };

        Some(Address {
            kind,
            type_name,
            name,
        })
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Element name, or the alias of a provider
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.kind == ElementKind::DataSource {
            f.write_str("data.")?;
        }
        f.write_str(&self.type_name)?;
        if let Some(name) = &self.name {
            write!(f, ".{name}")?;
        }
        Ok(())
    }
}
