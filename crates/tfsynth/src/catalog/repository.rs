use crate::meta::MetaArguments;
use crate::resource::{Config, Resource};
use crate::schema::{ElementKind, ResourceSchema};
use crate::shape::{Scalar, Shape};
use crate::tree::Scope;
use crate::{Input, Result};

/// `resource "github_repository"`
#[derive(Debug, Clone)]
pub struct Repository(Resource);

#[derive(Debug, Clone, Default)]
pub struct RepositoryConfig {
    pub name: Option<Input<String>>,
    pub description: Option<Input<String>>,
    pub homepage_url: Option<Input<String>>,
    /// `public`, `private` or `internal`
    pub visibility: Option<Input<String>>,
    pub has_issues: Option<Input<bool>>,
    pub has_wiki: Option<Input<bool>>,
    pub auto_init: Option<Input<bool>>,
    pub archived: Option<Input<bool>>,
    pub topics: Option<Input<Vec<String>>>,
    pub meta: MetaArguments,
}

element_class!(
    Repository,
    ResourceSchema::builder(ElementKind::Resource, "github_repository")
        .provider(super::github())
        .required("name", Shape::STRING)
        .optional("description", Shape::STRING)
        .optional("homepage_url", Shape::STRING)
        .optional_computed("visibility", Shape::STRING)
        .optional("has_issues", Shape::BOOL)
        .optional("has_wiki", Shape::BOOL)
        .optional("auto_init", Shape::BOOL)
        .optional("archived", Shape::BOOL)
        .optional("topics", Shape::List(Scalar::String))
        .computed("id", Shape::STRING)
        .computed("full_name", Shape::STRING)
        .computed("html_url", Shape::STRING)
        .computed("ssh_clone_url", Shape::STRING)
        .computed("node_id", Shape::STRING)
        .computed("repo_id", Shape::NUMBER)
);

impl Repository {
    pub fn new(scope: &Scope, id: &str, config: RepositoryConfig) -> Result<Self> {
        let config = Config::new()
            .attribute("name", config.name)
            .attribute("description", config.description)
            .attribute("homepage_url", config.homepage_url)
            .attribute("visibility", config.visibility)
            .attribute("has_issues", config.has_issues)
            .attribute("has_wiki", config.has_wiki)
            .attribute("auto_init", config.auto_init)
            .attribute("archived", config.archived)
            .attribute("topics", config.topics)
            .meta(config.meta);

        Resource::new(scope, id, Self::type_schema(), config).map(Self)
    }

    input_attribute!(name: String, set_name, reset_name, name_input);
    input_attribute!(description: String, set_description, reset_description, description_input);
    input_attribute!(homepage_url: String, set_homepage_url, reset_homepage_url, homepage_url_input);
    input_attribute!(visibility: String, set_visibility, reset_visibility, visibility_input);
    input_attribute!(has_issues: bool, set_has_issues, reset_has_issues, has_issues_input);
    input_attribute!(has_wiki: bool, set_has_wiki, reset_has_wiki, has_wiki_input);
    input_attribute!(auto_init: bool, set_auto_init, reset_auto_init, auto_init_input);
    input_attribute!(archived: bool, set_archived, reset_archived, archived_input);
    input_attribute!(topics: Vec<String>, set_topics, reset_topics, topics_input);

    computed_attributes!(id, full_name, html_url, ssh_clone_url, node_id, repo_id);
}
