use crate::meta::MetaArguments;
use crate::resource::{Config, Resource};
use crate::schema::{ElementKind, ResourceSchema};
use crate::shape::Shape;
use crate::tree::Scope;
use crate::{Input, Result};

/// `resource "github_team"`
#[derive(Debug, Clone)]
pub struct Team(Resource);

#[derive(Debug, Clone, Default)]
pub struct TeamConfig {
    pub name: Option<Input<String>>,
    pub description: Option<Input<String>>,
    /// `secret` or `closed`
    pub privacy: Option<Input<String>>,
    pub parent_team_id: Option<Input<String>>,
    pub meta: MetaArguments,
}

element_class!(
    Team,
    ResourceSchema::builder(ElementKind::Resource, "github_team")
        .provider(super::github())
        .required("name", Shape::STRING)
        .optional("description", Shape::STRING)
        .optional_computed("privacy", Shape::STRING)
        .optional("parent_team_id", Shape::STRING)
        .computed("id", Shape::STRING)
        .computed("slug", Shape::STRING)
        .computed("node_id", Shape::STRING)
);

impl Team {
    pub fn new(scope: &Scope, id: &str, config: TeamConfig) -> Result<Self> {
        let config = Config::new()
            .attribute("name", config.name)
            .attribute("description", config.description)
            .attribute("privacy", config.privacy)
            .attribute("parent_team_id", config.parent_team_id)
            .meta(config.meta);

        Resource::new(scope, id, Self::type_schema(), config).map(Self)
    }

    input_attribute!(name: String, set_name, reset_name, name_input);
    input_attribute!(description: String, set_description, reset_description, description_input);
    input_attribute!(privacy: String, set_privacy, reset_privacy, privacy_input);
    input_attribute!(parent_team_id: String, set_parent_team_id, reset_parent_team_id, parent_team_id_input);

    computed_attributes!(id, slug, node_id);
}
