//! declared attribute shapes
//!
//! Every attribute declares one of
//! - a scalar (string, number, bool)
//! - a homogeneous list of scalars
//! - a record with named fields, each with its own shape
//! - a list of records
//! - opaque: arbitrary data, not checked
//!
//! Literals are checked against the declared shape when they are assigned ([Shape::check]).
//! References are accepted everywhere and checked once the referenced attribute is known
//! ([Shape::accepts]).
use crate::expr::Expr;
use crate::token::{AttributePath, PathSegment};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    String,
    Number,
    Bool,
}

impl Scalar {
    fn matches(self, value: &Expr) -> bool {
        match (self, value) {
            (Scalar::String, Expr::String(_))
            | (Scalar::Number, Expr::Integer(_))
            | (Scalar::Bool, Expr::Bool(_)) => true,
            (Scalar::Number, Expr::Decimal(value)) => value.is_finite(),
            _ => false,
        }
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::String => f.write_str("string"),
            Scalar::Number => f.write_str("number"),
            Scalar::Bool => f.write_str("bool"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Scalar(Scalar),
    List(Scalar),
    Record(Arc<RecordShape>),
    RecordList(Arc<RecordShape>),
    Opaque,
}

impl Shape {
    pub const STRING: Shape = Shape::Scalar(Scalar::String);
    pub const NUMBER: Shape = Shape::Scalar(Scalar::Number);
    pub const BOOL: Shape = Shape::Scalar(Scalar::Bool);

    pub fn record(record: RecordShape) -> Self {
        Shape::Record(Arc::new(record))
    }

    pub fn record_list(record: RecordShape) -> Self {
        Shape::RecordList(Arc::new(record))
    }

    /// Check a literal against this shape
    ///
    /// References and templates are accepted as-is. `path` points at `value` and is used to report
    /// the exact position of a mismatch.
    pub fn check(&self, value: &Expr, path: &mut AttributePath) -> Result<(), ShapeMismatch> {
        if matches!(value, Expr::Reference(_) | Expr::Template(_)) {
            return Ok(());
        }

        match (self, value) {
            (Shape::Opaque, value) => check_opaque(value, path),
            (Shape::Scalar(scalar), value) if scalar.matches(value) => Ok(()),
            (Shape::List(scalar), Expr::List(elements)) => {
                let element_shape = Shape::Scalar(*scalar);
                for (index, element) in elements.iter().enumerate() {
                    path.push_index(index);
                    element_shape.check(element, path)?;
                    path.pop();
                }
                Ok(())
            }
            (Shape::Record(record), Expr::Record(fields)) => record.check(fields, path),
            (Shape::RecordList(record), Expr::List(elements)) => {
                for (index, element) in elements.iter().enumerate() {
                    path.push_index(index);
                    match element {
                        Expr::Record(fields) => record.check(fields, path)?,
                        Expr::Reference(_) => {}
                        other => return Err(ShapeMismatch::new(path, "object", other)),
                    }
                    path.pop();
                }
                Ok(())
            }
            (expected, found) => Err(ShapeMismatch::new(path, expected, found)),
        }
    }

    /// Whether a value of shape `produced` may be used where this shape is declared
    pub fn accepts(&self, produced: &Shape) -> bool {
        match (self, produced) {
            (Shape::Opaque, _) | (_, Shape::Opaque) => true,
            (Shape::Scalar(expected), Shape::Scalar(found))
            | (Shape::List(expected), Shape::List(found)) => {
                expected == found || *expected == Scalar::String
            }
            (Shape::Record(expected), Shape::Record(found))
            | (Shape::RecordList(expected), Shape::RecordList(found)) => expected.accepts(found),
            _ => false,
        }
    }

    /// Shape of the value found by following `segments` into a value of this shape
    pub fn descend(&self, segments: &[PathSegment]) -> Option<Shape> {
        let Some((first, rest)) = segments.split_first() else {
            return Some(self.clone());
        };

        match (self, first) {
            (Shape::Opaque, _) => Some(Shape::Opaque),
            (Shape::Record(record), PathSegment::Attribute(name)) => {
                record.get(name)?.shape.descend(rest)
            }
            (Shape::List(scalar), PathSegment::Index(_)) => Shape::Scalar(*scalar).descend(rest),
            (Shape::RecordList(record), PathSegment::Index(_)) => {
                Shape::Record(record.clone()).descend(rest)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::Scalar(scalar) => write!(f, "{scalar}"),
            Shape::List(scalar) => write!(f, "list({scalar})"),
            Shape::Record(_) => f.write_str("object"),
            Shape::RecordList(_) => f.write_str("list(object)"),
            Shape::Opaque => f.write_str("any"),
        }
    }
}

// opaque values are not checked, but the emitted model has no null inside lists and no
// non-finite numbers
fn check_opaque(value: &Expr, path: &mut AttributePath) -> Result<(), ShapeMismatch> {
    match value {
        Expr::Decimal(number) if !number.is_finite() => {
            Err(ShapeMismatch::new(path, "a finite number", value))
        }
        Expr::List(elements) => {
            for (index, element) in elements.iter().enumerate() {
                path.push_index(index);
                if element.is_null() {
                    return Err(ShapeMismatch::new(path, "any non-null value", element));
                }
                check_opaque(element, path)?;
                path.pop();
            }
            Ok(())
        }
        Expr::Record(fields) => {
            for (name, field) in fields {
                path.push_attr(name.as_str());
                check_opaque(field, path)?;
                path.pop();
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Field of a [RecordShape]
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub shape: Shape,
    pub required: bool,
}

/// Named fields of a record, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordShape {
    fields: Vec<Field>,
}

impl RecordShape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(self, name: impl Into<String>, shape: Shape) -> Self {
        self.field(name, shape, true)
    }

    pub fn optional(self, name: impl Into<String>, shape: Shape) -> Self {
        self.field(name, shape, false)
    }

    fn field(mut self, name: impl Into<String>, shape: Shape, required: bool) -> Self {
        self.fields.push(Field {
            name: name.into(),
            shape,
            required,
        });
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    fn check(
        &self,
        fields: &indexmap::IndexMap<String, Expr>,
        path: &mut AttributePath,
    ) -> Result<(), ShapeMismatch> {
        for (name, value) in fields {
            path.push_attr(name.as_str());
            let Some(field) = self.get(name) else {
                return Err(ShapeMismatch {
                    path: path.clone(),
                    expected: "a declared field".to_string(),
                    found: format!("unknown field `{name}`"),
                });
            };

            if !value.is_null() {
                field.shape.check(value, path)?;
            }
            path.pop();
        }

        for field in self.fields.iter().filter(|field| field.required) {
            let present = fields.get(&field.name).is_some_and(|value| !value.is_null());
            if !present {
                path.push_attr(field.name.as_str());
                let mismatch = ShapeMismatch {
                    path: path.clone(),
                    expected: field.shape.to_string(),
                    found: "nothing (field is required)".to_string(),
                };
                path.pop();
                return Err(mismatch);
            }
        }

        Ok(())
    }

    fn accepts(&self, produced: &RecordShape) -> bool {
        self.fields
            .iter()
            .filter(|field| field.required)
            .all(|field| {
                produced
                    .get(&field.name)
                    .is_some_and(|found| field.shape.accepts(&found.shape))
            })
    }
}

/// A literal that does not fit its declared shape
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeMismatch {
    pub path: AttributePath,
    pub expected: String,
    pub found: String,
}

impl ShapeMismatch {
    fn new(path: &AttributePath, expected: impl ToString, found: &Expr) -> Self {
        Self {
            path: path.clone(),
            expected: expected.to_string(),
            found: found.kind_name().to_string(),
        }
    }
}

impl std::fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "`{}` expects {}, found {}",
            self.path, self.expected, self.found
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn webhook_configuration() -> Shape {
        Shape::record_list(
            RecordShape::new()
                .required("url", Shape::STRING)
                .optional("insecure_ssl", Shape::BOOL),
        )
    }

    fn check(shape: &Shape, value: &Expr) -> Result<(), ShapeMismatch> {
        shape.check(value, &mut AttributePath::from("configuration"))
    }

    #[test]
    fn scalars() {
        assert!(check(&Shape::STRING, &"x".into()).is_ok());
        assert!(check(&Shape::NUMBER, &Expr::Integer(3)).is_ok());
        assert!(check(&Shape::NUMBER, &Expr::Decimal(0.5)).is_ok());
        assert!(check(&Shape::BOOL, &"true".into()).is_err());
    }

    #[test]
    fn numbers_must_be_finite() {
        for number in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = check(&Shape::NUMBER, &Expr::Decimal(number)).unwrap_err();
            assert_eq!(err.expected, "number");

            let list = Expr::list([Expr::Decimal(1.5), Expr::Decimal(number)]);
            let err = check(&Shape::List(Scalar::Number), &list).unwrap_err();
            assert_eq!(err.path.to_string(), "configuration[1]");

            let nested = Expr::record([("limits", Expr::list([Expr::Decimal(number)]))]);
            let err = check(&Shape::Opaque, &nested).unwrap_err();
            assert_eq!(err.path.to_string(), "configuration.limits[0]");
            assert_eq!(err.expected, "a finite number");
        }
    }

    #[test]
    fn list_reports_index() {
        let err = check(&Shape::List(Scalar::String), &Expr::list([Expr::from("a"), 1.into()]))
            .unwrap_err();

        assert_eq!(err.path.to_string(), "configuration[1]");
        assert_eq!(err.expected, "string");
        assert_eq!(err.found, "number");
    }

    #[test]
    fn record_list_missing_required_field() {
        let value = Expr::list([
            Expr::record([("url", "https://one")]),
            Expr::record([("insecure_ssl", true)]),
        ]);

        let err = check(&webhook_configuration(), &value).unwrap_err();
        assert_eq!(err.path.to_string(), "configuration[1].url");
    }

    #[test]
    fn record_unknown_field() {
        let value = Expr::list([Expr::record([("uri", "https://one")])]);

        let err = check(&webhook_configuration(), &value).unwrap_err();
        assert_eq!(err.path.to_string(), "configuration[0].uri");
    }

    #[test]
    fn null_field_counts_as_absent() {
        let value = Expr::list([Expr::record([
            ("url", Expr::from("https://one")),
            ("insecure_ssl", Expr::Null),
        ])]);

        assert!(check(&webhook_configuration(), &value).is_ok());
    }

    #[test]
    fn opaque_takes_anything_but_null_elements() {
        let value = Expr::from(serde_json::json!({"a": [1, {"b": "c"}], "d": null}));
        assert!(check(&Shape::Opaque, &value).is_ok());

        let value = Expr::from(serde_json::json!([1, null]));
        assert!(check(&Shape::Opaque, &value).is_err());
    }

    #[test]
    fn descend_and_accept() {
        let shape = webhook_configuration();
        let path = AttributePath::new().index(0).attr("url");

        let produced = shape.descend(path.segments()).unwrap();
        assert_eq!(produced, Shape::STRING);
        assert!(Shape::STRING.accepts(&Shape::NUMBER));
        assert!(!Shape::NUMBER.accepts(&Shape::STRING));
        assert!(!Shape::STRING.accepts(&shape));
        assert!(shape.descend(&[PathSegment::Attribute("url".into())]).is_none());
    }
}
