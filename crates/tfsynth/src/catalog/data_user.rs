use crate::meta::MetaArguments;
use crate::resource::{Config, Resource};
use crate::schema::{ElementKind, ResourceSchema};
use crate::shape::Shape;
use crate::tree::Scope;
use crate::{Input, Result};

/// `data "github_user"`
#[derive(Debug, Clone)]
pub struct DataUser(Resource);

#[derive(Debug, Clone, Default)]
pub struct DataUserConfig {
    /// Empty string selects the authenticated user
    pub username: Option<Input<String>>,
    pub meta: MetaArguments,
}

element_class!(
    DataUser,
    ResourceSchema::builder(ElementKind::DataSource, "github_user")
        .provider(super::github())
        .required("username", Shape::STRING)
        .computed("id", Shape::STRING)
        .computed("login", Shape::STRING)
        .computed("name", Shape::STRING)
        .computed("email", Shape::STRING)
        .computed("node_id", Shape::STRING)
        .computed("avatar_url", Shape::STRING)
);

impl DataUser {
    pub fn new(scope: &Scope, id: &str, config: DataUserConfig) -> Result<Self> {
        let config = Config::new()
            .attribute("username", config.username)
            .meta(config.meta);

        Resource::new(scope, id, Self::type_schema(), config).map(Self)
    }

    input_attribute!(username: String, set_username, reset_username, username_input);

    computed_attributes!(id, login, name, email, node_id, avatar_url);
}
