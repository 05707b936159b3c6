//! native configuration syntax
//!
//! The document model does not tell attributes and nested blocks apart, so HCL output follows a
//! fixed rule:
//! - an object whose keys are all identifiers is written as a nested block
//! - a non-empty array of such objects is written as repeated nested blocks
//! - `lifecycle` is a block, `depends_on`, `provider` and `lifecycle.ignore_changes` are written as
//!   bare references
//! - strings containing `${` are written as templates
//!
//! Everything else is an attribute.
use super::Document;
use crate::schema::is_identifier;
use crate::value::Value;
use hcl::{
    Attribute, Block, Body, Expression, Identifier, ObjectKey, Structure, TemplateExpr, Traversal,
    Variable,
};
use indexmap::IndexMap;

pub(crate) fn body(document: &Document) -> Body {
    let mut structures: Vec<Structure> = vec![];

    for (section, value) in document.sections() {
        let Some(content) = value.as_object() else {
            continue;
        };

        match section {
            "terraform" => structures.push(terraform_block(content).into()),
            "provider" => {
                for (provider_type, configurations) in content {
                    for configuration in configurations.as_array().unwrap_or_default() {
                        structures.push(element_block("provider", &[provider_type], configuration).into());
                    }
                }
            }
            "data" | "resource" => {
                for (type_name, elements) in content {
                    for (name, element) in elements.as_object().into_iter().flatten() {
                        structures.push(element_block(section, &[type_name, name], element).into());
                    }
                }
            }
            _ => structures.extend(object_structures(content)),
        }
    }

    structures.into_iter().collect()
}

fn terraform_block(content: &IndexMap<String, Value>) -> Block {
    let mut builder = Block::builder("terraform");
    for (key, value) in content {
        match (key.as_str(), value) {
            // providers are attributes of `required_providers`, never blocks
            ("required_providers", Value::Object(providers)) => {
                let attributes = providers
                    .iter()
                    .map(|(name, requirement)| Attribute::new(identifier(name), expression(requirement)));
                builder = builder.add_block(
                    Block::builder("required_providers")
                        .add_attributes(attributes)
                        .build(),
                );
            }
            _ => builder = builder.add_structures(structures(key, value)),
        }
    }
    builder.build()
}

fn element_block(keyword: &str, labels: &[&String], body: &Value) -> Block {
    let mut builder = Block::builder(keyword).add_labels(labels.iter().map(|label| label.as_str()));

    for (key, value) in body.as_object().into_iter().flatten() {
        builder = match (key.as_str(), value) {
            ("depends_on", Value::Array(addresses)) => {
                let references = addresses.iter().filter_map(Value::as_str).map(reference);
                builder.add_attribute(Attribute::new(
                    identifier(key),
                    Expression::Array(references.collect()),
                ))
            }
            ("provider", Value::String(address)) => {
                builder.add_attribute(Attribute::new(identifier(key), reference(address)))
            }
            ("lifecycle", Value::Object(lifecycle)) => builder.add_block(lifecycle_block(lifecycle)),
            _ => builder.add_structures(structures(key, value)),
        };
    }

    builder.build()
}

fn lifecycle_block(lifecycle: &IndexMap<String, Value>) -> Block {
    let attributes = lifecycle.iter().map(|(key, value)| match (key.as_str(), value) {
        ("ignore_changes", Value::Array(names)) => Attribute::new(
            identifier(key),
            Expression::Array(names.iter().filter_map(Value::as_str).map(reference).collect()),
        ),
        _ => Attribute::new(identifier(key), expression(value)),
    });

    Block::builder("lifecycle").add_attributes(attributes).build()
}

/// Structures for one key of a body
fn structures(key: &str, value: &Value) -> Vec<Structure> {
    match value {
        Value::Object(object) if is_block(object) => vec![nested_block(key, object).into()],
        Value::Array(elements) if !elements.is_empty() && elements.iter().all(is_block_value) => {
            elements
                .iter()
                .filter_map(Value::as_object)
                .map(|object| nested_block(key, object).into())
                .collect()
        }
        _ => vec![Attribute::new(identifier(key), expression(value)).into()],
    }
}

fn object_structures(object: &IndexMap<String, Value>) -> Vec<Structure> {
    object
        .iter()
        .flat_map(|(key, value)| structures(key, value))
        .collect()
}

fn nested_block(key: &str, object: &IndexMap<String, Value>) -> Block {
    Block::builder(identifier(key))
        .add_structures(object_structures(object))
        .build()
}

fn is_block(object: &IndexMap<String, Value>) -> bool {
    object.keys().all(|key| is_identifier(key))
}

fn is_block_value(value: &Value) -> bool {
    value.as_object().is_some_and(is_block)
}

fn identifier(name: &str) -> Identifier {
    Identifier::sanitized(name)
}

/// `data.github_user.me` as a traversal
fn reference(address: &str) -> Expression {
    let mut parts = address.split('.');
    let root = Variable::unchecked(parts.next().unwrap_or_default());

    let mut traversal = Traversal::builder(root);
    for part in parts {
        traversal = traversal.attr(part);
    }
    traversal.build().into()
}

fn expression(value: &Value) -> Expression {
    match value {
        Value::Boolean(value) => Expression::Bool(*value),
        Value::Integer(value) => Expression::Number((*value).into()),
        Value::Decimal(value) => hcl::Number::from_f64(*value).map_or(Expression::Null, Expression::Number),
        Value::String(value) if value.contains("${") => {
            Expression::TemplateExpr(Box::new(TemplateExpr::QuotedString(value.clone())))
        }
        Value::String(value) => Expression::String(value.clone()),
        Value::Array(elements) => Expression::Array(elements.iter().map(expression).collect()),
        Value::Object(object) => Expression::Object(
            object
                .iter()
                .map(|(key, value)| (object_key(key), expression(value)))
                .collect(),
        ),
    }
}

fn object_key(key: &str) -> ObjectKey {
    if is_identifier(key) {
        ObjectKey::Identifier(Identifier::unchecked(key))
    } else {
        ObjectKey::Expression(Expression::String(key.to_string()))
    }
}
