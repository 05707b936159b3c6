use crate::meta::MetaArguments;
use crate::resource::{Config, Resource};
use crate::schema::{ElementKind, ResourceSchema};
use crate::shape::Shape;
use crate::tree::Scope;
use crate::{Input, Result};

/// `resource "github_team_repository"`, grants a team access to a repository
#[derive(Debug, Clone)]
pub struct TeamRepository(Resource);

#[derive(Debug, Clone, Default)]
pub struct TeamRepositoryConfig {
    pub team_id: Option<Input<String>>,
    pub repository: Option<Input<String>>,
    /// `pull`, `triage`, `push`, `maintain` or `admin`
    pub permission: Option<Input<String>>,
    pub meta: MetaArguments,
}

element_class!(
    TeamRepository,
    ResourceSchema::builder(ElementKind::Resource, "github_team_repository")
        .provider(super::github())
        .required("team_id", Shape::STRING)
        .required("repository", Shape::STRING)
        .optional_computed("permission", Shape::STRING)
        .computed("id", Shape::STRING)
        .computed("etag", Shape::STRING)
);

impl TeamRepository {
    pub fn new(scope: &Scope, id: &str, config: TeamRepositoryConfig) -> Result<Self> {
        let config = Config::new()
            .attribute("team_id", config.team_id)
            .attribute("repository", config.repository)
            .attribute("permission", config.permission)
            .meta(config.meta);

        Resource::new(scope, id, Self::type_schema(), config).map(Self)
    }

    input_attribute!(team_id: String, set_team_id, reset_team_id, team_id_input);
    input_attribute!(repository: String, set_repository, reset_repository, repository_input);
    input_attribute!(permission: String, set_permission, reset_permission, permission_input);

    computed_attributes!(id, etag);
}
