use crate::meta::MetaArguments;
use crate::resource::{Config, Resource};
use crate::schema::{ElementKind, ResourceSchema};
use crate::shape::{Scalar, Shape};
use crate::tree::Scope;
use crate::{Input, Result};

/// `data "github_repository"`, looks up an existing repository by `full_name` or `name`
#[derive(Debug, Clone)]
pub struct DataRepository(Resource);

#[derive(Debug, Clone, Default)]
pub struct DataRepositoryConfig {
    pub full_name: Option<Input<String>>,
    pub name: Option<Input<String>>,
    pub meta: MetaArguments,
}

element_class!(
    DataRepository,
    ResourceSchema::builder(ElementKind::DataSource, "github_repository")
        .provider(super::github())
        .optional_computed("full_name", Shape::STRING)
        .optional_computed("name", Shape::STRING)
        .computed("id", Shape::STRING)
        .computed("description", Shape::STRING)
        .computed("html_url", Shape::STRING)
        .computed("node_id", Shape::STRING)
        .computed("repo_id", Shape::NUMBER)
        .computed("visibility", Shape::STRING)
        .computed("topics", Shape::List(Scalar::String))
);

impl DataRepository {
    pub fn new(scope: &Scope, id: &str, config: DataRepositoryConfig) -> Result<Self> {
        let config = Config::new()
            .attribute("full_name", config.full_name)
            .attribute("name", config.name)
            .meta(config.meta);

        Resource::new(scope, id, Self::type_schema(), config).map(Self)
    }

    input_attribute!(full_name: String, set_full_name, reset_full_name, full_name_input);
    input_attribute!(name: String, set_name, reset_name, name_input);

    computed_attributes!(id, description, html_url, node_id, repo_id, visibility, topics);
}
