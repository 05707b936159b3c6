use super::Visit;
use crate::expr::Expr;
use crate::token::{Segment, Template, Token};

/// Recursively visit all [Token]s
pub trait VisitTokens {
    fn visit_tokens(&self, visitor: &mut dyn Visit<Token>);
}

impl VisitTokens for Expr {
    fn visit_tokens(&self, visitor: &mut dyn Visit<Token>) {
        match self {
            Expr::Reference(token) => visitor.visit(token),
            Expr::Template(template) => template.visit_tokens(visitor),
            Expr::List(elements) => {
                for element in elements {
                    element.visit_tokens(visitor);
                }
            }
            Expr::Record(fields) => {
                for value in fields.values() {
                    value.visit_tokens(visitor);
                }
            }
            Expr::Null | Expr::Bool(_) | Expr::Integer(_) | Expr::Decimal(_) | Expr::String(_) => {}
        }
    }
}

impl VisitTokens for Template {
    fn visit_tokens(&self, visitor: &mut dyn Visit<Token>) {
        for segment in self.segments() {
            if let Segment::Reference(token) = segment {
                visitor.visit(token);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::token::{AttributePath, ElementId, TreeId};
    use crate::tree::NodeId;
    use pretty_assertions::assert_eq;

    #[test]
    fn finds_nested_tokens_in_order() {
        let owner = ElementId {
            tree: TreeId::next(),
            node: NodeId(3),
        };
        let name = Token::new(owner, AttributePath::from("name"));
        let id = Token::new(owner, AttributePath::from("id"));

        let expr = Expr::record([
            ("a", Expr::list([Expr::from(name.clone()), 1.into()])),
            (
                "b",
                Template::new().text("x-").reference(id.clone()).into(),
            ),
        ]);

        let mut found = vec![];
        expr.visit_tokens(&mut |token: &Token| found.push(token.path().to_string()));
        assert_eq!(found, ["name", "id"]);
    }
}
