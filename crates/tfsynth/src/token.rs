//! deferred references to attributes of other elements
//!
//! A [Token] stands for "the value of attribute `path` of element `owner`", which is only known once the
//! target system applied the synthesized document. Tokens are weak: they name their owner by
//! [ElementId] and never keep it alive. Whether the owner is part of the tree being synthesized is
//! decided during synthesis.
use crate::tree::NodeId;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one construct tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TreeId(u64);

impl TreeId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Identifies one element (resource, data source or provider) across all trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId {
    pub(crate) tree: TreeId,
    pub(crate) node: NodeId,
}

/// One step of an [AttributePath]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Attribute(String),
    Index(usize),
}

/// Path to a (possibly nested) attribute, rendered as `name.field[0].other`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AttributePath(Vec<PathSegment>);

impl AttributePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: impl Into<String>) -> Self {
        self.push_attr(name);
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.push_index(index);
        self
    }

    pub fn push_attr(&mut self, name: impl Into<String>) {
        self.0.push(PathSegment::Attribute(name.into()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.0.push(PathSegment::Index(index));
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Name of the top level attribute this path starts with
    pub fn root_attribute(&self) -> Option<&str> {
        match self.0.first() {
            Some(PathSegment::Attribute(name)) => Some(name),
            _ => None,
        }
    }
}

impl From<&str> for AttributePath {
    fn from(value: &str) -> Self {
        Self::new().attr(value)
    }
}

impl std::fmt::Display for AttributePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (position, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Attribute(name) if position == 0 => f.write_str(name)?,
                PathSegment::Attribute(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for AttributePath {
    type Err = crate::Error;

    /// Parses `name.field[0].other`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || crate::Error::InvalidAttributePath(s.to_string());

        let mut path = AttributePath::new();
        for part in s.split('.') {
            let (name, mut rest) = match part.find('[') {
                Some(bracket) => part.split_at(bracket),
                None => (part, ""),
            };

            let valid_name = !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
            if !valid_name {
                return Err(invalid());
            }
            path.push_attr(name);

            while !rest.is_empty() {
                let Some(inner) = rest.strip_prefix('[') else {
                    return Err(invalid());
                };
                let Some((index, tail)) = inner.split_once(']') else {
                    return Err(invalid());
                };
                path.push_index(index.parse().map_err(|_| invalid())?);
                rest = tail;
            }
        }

        Ok(path)
    }
}

/// Instances of a counted element a [Token] refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instance {
    /// `type.name[index].path`
    Index(usize),
    /// `type.name[*].path`, a list with one value per instance
    All,
}

impl std::fmt::Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instance::Index(index) => write!(f, "[{index}]"),
            Instance::All => f.write_str("[*]"),
        }
    }
}

/// Deferred value of an attribute of another element
///
/// Elements with `count` set have to be referenced through one of their instances:
///
/// ```
/// # use std::sync::Arc;
/// # use tfsynth::{Config, ElementKind, MetaArguments, Resource, ResourceSchema, Scope, Shape};
/// # let schema = Arc::new(ResourceSchema::builder(ElementKind::Resource, "widget")
/// #     .computed("id", Shape::STRING).build()?);
/// let root = Scope::root();
/// let widget = Resource::new(&root, "a", schema, Config::new().meta(MetaArguments::new().count(2)))?;
///
/// let first = widget.reference("id").instance(0);
/// let all = widget.reference("id").all_instances();
/// assert_eq!(first.path().to_string(), "id");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    owner: ElementId,
    instance: Option<Instance>,
    path: AttributePath,
}

impl Token {
    pub(crate) fn new(owner: ElementId, path: AttributePath) -> Self {
        Self {
            owner,
            instance: None,
            path,
        }
    }

    /// Refer to a field of a record valued attribute
    pub fn attr(&self, name: impl Into<String>) -> Token {
        Token {
            path: self.path.clone().attr(name),
            ..self.clone()
        }
    }

    /// Refer to an element of a list valued attribute
    pub fn index(&self, index: usize) -> Token {
        Token {
            path: self.path.clone().index(index),
            ..self.clone()
        }
    }

    /// Refer to the attribute of one instance of a counted owner
    pub fn instance(&self, index: usize) -> Token {
        Token {
            instance: Some(Instance::Index(index)),
            ..self.clone()
        }
    }

    /// Refer to the attribute of every instance of a counted owner
    pub fn all_instances(&self) -> Token {
        Token {
            instance: Some(Instance::All),
            ..self.clone()
        }
    }

    pub fn owner(&self) -> ElementId {
        self.owner
    }

    pub fn selected_instance(&self) -> Option<Instance> {
        self.instance
    }

    pub fn path(&self) -> &AttributePath {
        &self.path
    }
}

/// One piece of a [Template]
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    Reference(Token),
    /// `count.index` of the element the template is assigned to
    CountIndex,
}

/// String made of fixed text interleaved with references
///
/// ```
/// # use tfsynth::Template;
/// let template = Template::new().text("prefix-").count_index();
/// assert_eq!(template.segments().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return self;
        }

        // adjacent text is merged so rendering never depends on how the template was built
        if let Some(Segment::Text(last)) = self.segments.last_mut() {
            last.push_str(&text);
        } else {
            self.segments.push(Segment::Text(text));
        }
        self
    }

    pub fn reference(mut self, token: Token) -> Self {
        self.segments.push(Segment::Reference(token));
        self
    }

    pub fn count_index(mut self) -> Self {
        self.segments.push(Segment::CountIndex);
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Reference(token) => Some(token),
            _ => None,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn path_display() {
        let path = AttributePath::new()
            .attr("required_status_checks")
            .index(0)
            .attr("contexts");

        assert_eq!(path.to_string(), "required_status_checks[0].contexts");
    }

    #[test]
    fn path_parse() {
        let path: AttributePath = "configuration[1][2].url".parse().unwrap();

        let expected = AttributePath::new()
            .attr("configuration")
            .index(1)
            .index(2)
            .attr("url");
        assert_eq!(path, expected);
        assert_eq!(path.root_attribute(), Some("configuration"));
    }

    #[test]
    fn path_parse_rejects_garbage() {
        for garbage in ["", "a..b", "a[", "a[x]", "a]b", ".a"] {
            assert!(garbage.parse::<AttributePath>().is_err(), "{garbage}");
        }
    }

    #[test]
    fn instance_selection_keeps_the_path() {
        let owner = ElementId {
            tree: TreeId::next(),
            node: NodeId::ROOT,
        };
        let token = Token::new(owner, AttributePath::from("configuration"))
            .instance(1)
            .index(0)
            .attr("url");

        assert_eq!(token.selected_instance(), Some(Instance::Index(1)));
        assert_eq!(token.path().to_string(), "configuration[0].url");
        assert_eq!(token.all_instances().selected_instance(), Some(Instance::All));
        assert_eq!(Instance::All.to_string(), "[*]");
    }

    #[test]
    fn template_merges_text() {
        let template = Template::new().text("a").text("").text("b").count_index();

        assert_eq!(
            template.segments(),
            &[Segment::Text("ab".to_string()), Segment::CountIndex]
        );
    }
}
