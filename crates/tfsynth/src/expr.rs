//! attribute input values
//!
//! [Expr] is what an attribute cell stores: a literal, a [Token] or a [Template], possibly nested in
//! lists and records. [Input] is the typed view used by catalog classes: either a literal of the
//! declared Rust type or something that is only resolved during synthesis.
use crate::token::{Template, Token};
use indexmap::IndexMap;

/// Value assigned to an attribute
///
/// [Expr::Null] is the explicit "unset" marker. Assigning it to an attribute clears the cell, inside a
/// record it means the field is absent.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Bool(bool),
    Integer(i64),
    Decimal(f64),
    String(String),
    Template(Template),
    Reference(Token),
    List(Vec<Expr>),
    Record(IndexMap<String, Expr>),
}

impl Expr {
    /// Build a record from `(field, value)` pairs
    pub fn record<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Expr>,
    {
        Expr::Record(
            fields
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Build a list from values
    pub fn list<V: Into<Expr>>(values: impl IntoIterator<Item = V>) -> Self {
        Expr::List(values.into_iter().map(Into::into).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Expr::Null)
    }

    /// Short name of the variant, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Null => "null",
            Expr::Bool(_) => "boolean",
            Expr::Integer(_) | Expr::Decimal(_) => "number",
            Expr::String(_) => "string",
            Expr::Template(_) => "template",
            Expr::Reference(_) => "reference",
            Expr::List(_) => "list",
            Expr::Record(_) => "record",
        }
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Expr::Bool(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::Integer(value)
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Expr::Integer(value.into())
    }
}

impl From<u32> for Expr {
    fn from(value: u32) -> Self {
        Expr::Integer(value.into())
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Decimal(value)
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Expr::String(value)
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::String(value.to_string())
    }
}

impl From<Token> for Expr {
    fn from(value: Token) -> Self {
        Expr::Reference(value)
    }
}

impl From<Template> for Expr {
    fn from(value: Template) -> Self {
        Expr::Template(value)
    }
}

impl<T: Into<Expr>> From<Vec<T>> for Expr {
    fn from(value: Vec<T>) -> Self {
        Expr::list(value)
    }
}

impl<T: Into<Expr>> From<Option<T>> for Expr {
    fn from(value: Option<T>) -> Self {
        value.map_or(Expr::Null, Into::into)
    }
}

impl From<IndexMap<String, Expr>> for Expr {
    fn from(value: IndexMap<String, Expr>) -> Self {
        Expr::Record(value)
    }
}

/// Arbitrary json, used for opaque attributes
impl From<serde_json::Value> for Expr {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match value {
            Json::Null => Expr::Null,
            Json::Bool(b) => Expr::Bool(b),
            Json::Number(number) => match number.as_i64() {
                Some(int) => Expr::Integer(int),
                None => match number.as_f64() {
                    Some(decimal) => Expr::Decimal(decimal),
                    None => Expr::String(number.to_string()),
                },
            },
            Json::String(s) => Expr::String(s),
            Json::Array(array) => Expr::list(array),
            Json::Object(object) => Expr::record(object),
        }
    }
}

/// Conversion of typed literals into [Expr]
pub trait ToExpr {
    fn to_expr(&self) -> Expr;
}

impl ToExpr for String {
    fn to_expr(&self) -> Expr {
        Expr::String(self.clone())
    }
}

impl ToExpr for bool {
    fn to_expr(&self) -> Expr {
        Expr::Bool(*self)
    }
}

impl ToExpr for i64 {
    fn to_expr(&self) -> Expr {
        Expr::Integer(*self)
    }
}

impl ToExpr for f64 {
    fn to_expr(&self) -> Expr {
        Expr::Decimal(*self)
    }
}

impl<T: ToExpr> ToExpr for Vec<T> {
    fn to_expr(&self) -> Expr {
        Expr::List(self.iter().map(ToExpr::to_expr).collect())
    }
}

impl<T: ToExpr> ToExpr for Option<T> {
    fn to_expr(&self) -> Expr {
        self.as_ref().map_or(Expr::Null, ToExpr::to_expr)
    }
}

/// Typed attribute input: a literal of type `T` or a value resolved during synthesis
#[derive(Debug, Clone, PartialEq)]
pub enum Input<T> {
    Literal(T),
    Reference(Token),
    Template(Template),
}

impl<T: ToExpr> ToExpr for Input<T> {
    fn to_expr(&self) -> Expr {
        match self {
            Input::Literal(literal) => literal.to_expr(),
            Input::Reference(token) => Expr::Reference(token.clone()),
            Input::Template(template) => Expr::Template(template.clone()),
        }
    }
}

impl<T: ToExpr> From<Input<T>> for Expr {
    fn from(value: Input<T>) -> Self {
        value.to_expr()
    }
}

impl<T> From<Token> for Input<T> {
    fn from(value: Token) -> Self {
        Input::Reference(value)
    }
}

impl<T> From<Template> for Input<T> {
    fn from(value: Template) -> Self {
        Input::Template(value)
    }
}

impl From<&str> for Input<String> {
    fn from(value: &str) -> Self {
        Input::Literal(value.to_string())
    }
}

impl From<String> for Input<String> {
    fn from(value: String) -> Self {
        Input::Literal(value)
    }
}

impl From<bool> for Input<bool> {
    fn from(value: bool) -> Self {
        Input::Literal(value)
    }
}

impl From<i64> for Input<i64> {
    fn from(value: i64) -> Self {
        Input::Literal(value)
    }
}

impl From<i32> for Input<i64> {
    fn from(value: i32) -> Self {
        Input::Literal(value.into())
    }
}

impl From<f64> for Input<f64> {
    fn from(value: f64) -> Self {
        Input::Literal(value)
    }
}

impl<T: ToExpr> From<Vec<T>> for Input<Vec<T>> {
    fn from(value: Vec<T>) -> Self {
        Input::Literal(value)
    }
}

impl From<Vec<&str>> for Input<Vec<String>> {
    fn from(value: Vec<&str>) -> Self {
        Input::Literal(value.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Input<Vec<String>> {
    fn from(value: [&str; N]) -> Self {
        Input::Literal(value.into_iter().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn json_becomes_expr() {
        let json = serde_json::json!({"b": [1, 2.5, "x"], "a": null, "c": true});

        let expected = Expr::record([
            ("b", Expr::list([Expr::Integer(1), Expr::Decimal(2.5), "x".into()])),
            ("a", Expr::Null),
            ("c", Expr::Bool(true)),
        ]);
        assert_eq!(Expr::from(json), expected);
    }

    #[test]
    fn typed_input_to_expr() {
        let input: Input<Vec<String>> = ["push", "pull_request"].into();
        assert_eq!(Expr::from(input), Expr::list(["push", "pull_request"]));

        let absent: Option<Input<String>> = None;
        assert_eq!(absent.to_expr(), Expr::Null);
    }
}
