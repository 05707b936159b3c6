use crate::meta::MetaArguments;
use crate::resource::{Config, Resource};
use crate::schema::{ElementKind, ResourceSchema};
use crate::shape::Shape;
use crate::tree::Scope;
use crate::{Input, Result};

/// `resource "github_actions_secret"`
#[derive(Debug, Clone)]
pub struct ActionsSecret(Resource);

#[derive(Debug, Clone, Default)]
pub struct ActionsSecretConfig {
    pub repository: Option<Input<String>>,
    pub secret_name: Option<Input<String>>,
    pub plaintext_value: Option<Input<String>>,
    pub encrypted_value: Option<Input<String>>,
    pub meta: MetaArguments,
}

element_class!(
    ActionsSecret,
    ResourceSchema::builder(ElementKind::Resource, "github_actions_secret")
        .provider(super::github())
        .required("repository", Shape::STRING)
        .required("secret_name", Shape::STRING)
        .optional("plaintext_value", Shape::STRING)
        .sensitive()
        .optional("encrypted_value", Shape::STRING)
        .sensitive()
        .computed("id", Shape::STRING)
        .computed("created_at", Shape::STRING)
        .computed("updated_at", Shape::STRING)
);

impl ActionsSecret {
    pub fn new(scope: &Scope, id: &str, config: ActionsSecretConfig) -> Result<Self> {
        let config = Config::new()
            .attribute("repository", config.repository)
            .attribute("secret_name", config.secret_name)
            .attribute("plaintext_value", config.plaintext_value)
            .attribute("encrypted_value", config.encrypted_value)
            .meta(config.meta);

        Resource::new(scope, id, Self::type_schema(), config).map(Self)
    }

    input_attribute!(repository: String, set_repository, reset_repository, repository_input);
    input_attribute!(secret_name: String, set_secret_name, reset_secret_name, secret_name_input);
    input_attribute!(plaintext_value: String, set_plaintext_value, reset_plaintext_value, plaintext_value_input);
    input_attribute!(encrypted_value: String, set_encrypted_value, reset_encrypted_value, encrypted_value_input);

    computed_attributes!(id, created_at, updated_at);
}
