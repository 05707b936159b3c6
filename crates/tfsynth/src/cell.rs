//! attribute cells
use crate::expr::Expr;
use crate::schema::AttributeSpec;
use crate::shape::ShapeMismatch;
use crate::token::{AttributePath, ElementId, Token};

/// One declared attribute of an element and its current value
#[derive(Debug, Clone)]
pub struct AttributeCell {
    spec: AttributeSpec,
    value: Option<Expr>,
}

impl AttributeCell {
    pub fn new(spec: AttributeSpec) -> Self {
        Self { spec, value: None }
    }

    /// Assign a value, [Expr::Null] clears the cell
    ///
    /// Literals are checked against the declared shape, references and templates are accepted and
    /// checked during synthesis. The last assignment wins.
    pub fn set(&mut self, value: Expr) -> Result<(), ShapeMismatch> {
        if value.is_null() {
            self.reset();
            return Ok(());
        }

        let mut path = AttributePath::from(self.spec.name.as_str());
        self.spec.shape.check(&value, &mut path)?;
        self.value = Some(value);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.value = None;
    }

    /// The stored value, or a reference to the attribute when the target system computes it
    pub fn get(&self, owner: ElementId) -> Option<Expr> {
        match &self.value {
            Some(value) => Some(value.clone()),
            None if self.spec.is_computed() => Some(Expr::Reference(Token::new(
                owner,
                AttributePath::from(self.spec.name.as_str()),
            ))),
            None => None,
        }
    }

    pub fn value(&self) -> Option<&Expr> {
        self.value.as_ref()
    }

    pub fn spec(&self) -> &AttributeSpec {
        &self.spec
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    pub fn is_required(&self) -> bool {
        self.spec.is_required()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::schema::Mode;
    use crate::shape::{Scalar, Shape};
    use crate::token::TreeId;
    use crate::tree::NodeId;
    use pretty_assertions::assert_eq;

    fn cell(mode: Mode, shape: Shape) -> AttributeCell {
        AttributeCell::new(AttributeSpec {
            name: "topics".to_string(),
            shape,
            mode,
            sensitive: false,
        })
    }

    fn owner() -> ElementId {
        ElementId {
            tree: TreeId::next(),
            node: NodeId(1),
        }
    }

    #[test]
    fn last_write_wins() {
        let mut cell = cell(Mode::Optional, Shape::STRING);
        cell.set("one".into()).unwrap();
        cell.set("two".into()).unwrap();

        assert_eq!(cell.value(), Some(&Expr::from("two")));
    }

    #[test]
    fn rejected_literal_keeps_previous_value() {
        let mut cell = cell(Mode::Required, Shape::List(Scalar::String));
        cell.set(Expr::list(["a"])).unwrap();

        let err = cell.set(Expr::Bool(true)).unwrap_err();
        assert_eq!(err.path.to_string(), "topics");
        assert_eq!(cell.value(), Some(&Expr::list(["a"])));
        assert!(cell.is_required());
    }

    #[test]
    fn null_clears() {
        let mut cell = cell(Mode::Optional, Shape::STRING);
        cell.set("x".into()).unwrap();
        cell.set(Expr::Null).unwrap();

        assert!(!cell.is_set());
        assert_eq!(cell.get(owner()), None);
    }

    #[test]
    fn computed_get_returns_reference() {
        let cell = cell(Mode::OptionalComputed, Shape::STRING);
        let owner = owner();

        let Some(Expr::Reference(token)) = cell.get(owner) else {
            panic!("expected a reference");
        };
        assert_eq!(token.owner(), owner);
        assert_eq!(token.path().to_string(), "topics");
    }
}
