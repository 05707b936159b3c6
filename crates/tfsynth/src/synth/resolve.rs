//! token resolution
use super::{Address, Context};
use crate::error::Issue;
use crate::expr::Expr;
use crate::shape::Shape;
use crate::token::{AttributePath, Instance, Segment, Token};
use crate::value::Value;
use indexmap::IndexMap;

impl Context<'_> {
    /// Turn an attribute value into its output form
    ///
    /// `shape` is the declared shape at `path`. [Expr::Null] resolves to nothing, tokens and
    /// templates become interpolation strings. Problems are logged against `consumer`.
    pub(crate) fn resolve(
        &mut self,
        consumer: &Address,
        expr: &Expr,
        shape: &Shape,
        path: &mut AttributePath,
    ) -> Option<Value> {
        match expr {
            Expr::Null => None,
            Expr::Bool(value) => Some(Value::Boolean(*value)),
            Expr::Integer(value) => Some(Value::Integer(*value)),
            Expr::Decimal(value) => Some(Value::Decimal(*value)),
            Expr::String(value) => Some(Value::String(value.clone())),
            Expr::Reference(token) => {
                let produced = self.reference_shape(consumer, token, path)?;
                if !shape.accepts(&produced) {
                    let issue = Issue::InvalidAttributeType {
                        attribute: path.clone(),
                        expected: shape.to_string(),
                        found: format!("a reference to {produced}"),
                    };
                    self.log(consumer, issue);
                    return None;
                }

                Some(Value::String(format!("${{{}}}", self.interpolation(token))))
            }
            Expr::Template(template) => {
                if !shape.accepts(&Shape::STRING) {
                    let issue = Issue::InvalidAttributeType {
                        attribute: path.clone(),
                        expected: shape.to_string(),
                        found: "string template".to_string(),
                    };
                    self.log(consumer, issue);
                    return None;
                }

                let mut rendered = String::new();
                let mut valid = true;
                for segment in template.segments() {
                    match segment {
                        Segment::Text(text) => rendered.push_str(text),
                        Segment::CountIndex => rendered.push_str("${count.index}"),
                        Segment::Reference(token) => {
                            match self.reference_shape(consumer, token, path) {
                                Some(Shape::Scalar(_) | Shape::Opaque) => {
                                    rendered.push_str(&format!("${{{}}}", self.interpolation(token)));
                                }
                                Some(other) => {
                                    let issue = Issue::InvalidAttributeType {
                                        attribute: path.clone(),
                                        expected: "a value that can be interpolated into a string"
                                            .to_string(),
                                        found: format!("a reference to {other}"),
                                    };
                                    self.log(consumer, issue);
                                    valid = false;
                                }
                                None => valid = false,
                            }
                        }
                    }
                }

                valid.then_some(Value::String(rendered))
            }
            Expr::List(elements) => {
                let element_shape = match shape {
                    Shape::List(scalar) => Shape::Scalar(*scalar),
                    Shape::RecordList(record) => Shape::Record(record.clone()),
                    _ => Shape::Opaque,
                };

                let mut array = Vec::with_capacity(elements.len());
                for (index, element) in elements.iter().enumerate() {
                    path.push_index(index);
                    if let Some(value) = self.resolve(consumer, element, &element_shape, path) {
                        array.push(value);
                    }
                    path.pop();
                }
                Some(Value::Array(array))
            }
            Expr::Record(fields) => {
                let mut object = IndexMap::with_capacity(fields.len());
                for (name, value) in fields {
                    let field_shape = match shape {
                        Shape::Record(record) => record
                            .get(name)
                            .map_or(Shape::Opaque, |field| field.shape.clone()),
                        _ => Shape::Opaque,
                    };

                    path.push_attr(name.as_str());
                    if let Some(value) = self.resolve(consumer, value, &field_shape, path) {
                        object.insert(name.clone(), value);
                    }
                    path.pop();
                }
                Some(Value::Object(object))
            }
        }
    }

    /// Shape of the value `token` produces, logs dangling, undeclared and instance mismatched
    /// references
    fn reference_shape(
        &mut self,
        consumer: &Address,
        token: &Token,
        path: &AttributePath,
    ) -> Option<Shape> {
        let Some(owner) = self.lookup(token.owner()) else {
            let issue = Issue::DanglingReference {
                attribute: path.clone(),
            };
            self.log(consumer, issue);
            return None;
        };

        let Some(shape) = owner.schema().shape_at(token.path().segments()) else {
            let issue = Issue::InvalidAttributeType {
                attribute: path.clone(),
                expected: format!("a declared attribute of `{}`", owner.schema().type_name()),
                found: format!("a reference to `{}`", token.path()),
            };
            self.log(consumer, issue);
            return None;
        };

        let target = self.address(owner.id().node).clone();
        let (expected, found) = match (owner.count(), token.selected_instance()) {
            (None, None) => return Some(shape),
            (Some(_), Some(Instance::All)) => {
                return Some(match shape {
                    Shape::Scalar(scalar) => Shape::List(scalar),
                    Shape::Record(record) => Shape::RecordList(record),
                    _ => Shape::Opaque,
                });
            }
            (Some(count), Some(Instance::Index(index))) if index < count as usize => {
                return Some(shape)
            }
            (Some(count), Some(instance)) => (
                format!("an instance of `{target}` below {count}"),
                format!("a reference to `{target}{instance}`"),
            ),
            (Some(_), None) => (
                format!("a reference to one instance (`{target}[index]`) or all instances (`{target}[*]`)"),
                format!("a reference to `{target}.{}`", token.path()),
            ),
            (None, Some(instance)) => (
                format!("a reference to `{target}.{}`", token.path()),
                format!("instance `{target}{instance}` of an element without count"),
            ),
        };

        let issue = Issue::InvalidAttributeType {
            attribute: path.clone(),
            expected,
            found,
        };
        self.log(consumer, issue);
        None
    }

    // only called for tokens whose owner is part of the tree
    fn interpolation(&self, token: &Token) -> String {
        let address = self.address(token.owner().node);
        match token.selected_instance() {
            Some(instance) => format!("{address}{instance}.{}", token.path()),
            None => format!("{address}.{}", token.path()),
        }
    }
}
