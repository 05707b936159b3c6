use crate::expr::{Expr, ToExpr};
use crate::meta::{MetaArguments, ProviderRef};
use crate::resource::{Config, Resource};
use crate::schema::{ElementKind, ResourceSchema};
use crate::shape::{RecordShape, Shape};
use crate::tree::Scope;
use crate::{Input, Result};

/// `provider "github"`
#[derive(Debug, Clone)]
pub struct GithubProvider(Resource);

#[derive(Debug, Clone, Default)]
pub struct GithubProviderConfig {
    pub owner: Option<Input<String>>,
    pub token: Option<Input<String>>,
    pub base_url: Option<Input<String>>,
    pub app_auth: Option<Input<Vec<AppAuth>>>,
    /// Needed when more than one github provider is declared
    pub alias: Option<String>,
}

element_class!(
    GithubProvider,
    ResourceSchema::builder(ElementKind::Provider, "github")
        .provider(super::github())
        .optional("owner", Shape::STRING)
        .optional("token", Shape::STRING)
        .sensitive()
        .optional("base_url", Shape::STRING)
        .optional(
            "app_auth",
            Shape::record_list(
                RecordShape::new()
                    .required("id", Shape::STRING)
                    .required("installation_id", Shape::STRING)
                    .required("pem_file", Shape::STRING),
            ),
        )
        .sensitive()
);

/// Authentication as a GitHub App instead of with a token
#[derive(Debug, Clone, PartialEq)]
pub struct AppAuth {
    pub id: String,
    pub installation_id: String,
    pub pem_file: String,
}

impl ToExpr for AppAuth {
    fn to_expr(&self) -> Expr {
        Expr::record([
            ("id", &self.id),
            ("installation_id", &self.installation_id),
            ("pem_file", &self.pem_file),
        ]
        .map(|(field, value)| (field, value.to_expr())))
    }
}

impl GithubProvider {
    pub fn new(scope: &Scope, id: &str, config: GithubProviderConfig) -> Result<Self> {
        let mut meta = MetaArguments::new();
        meta.alias = config.alias;

        let config = Config::new()
            .attribute("owner", config.owner)
            .attribute("token", config.token)
            .attribute("base_url", config.base_url)
            .attribute("app_auth", config.app_auth)
            .meta(meta);

        Resource::new(scope, id, Self::type_schema(), config).map(Self)
    }

    input_attribute!(owner: String, set_owner, reset_owner, owner_input);
    input_attribute!(token: String, set_token, reset_token, token_input);
    input_attribute!(base_url: String, set_base_url, reset_base_url, base_url_input);
    input_attribute!(app_auth: Vec<AppAuth>, set_app_auth, reset_app_auth, app_auth_input);
}

impl From<&GithubProvider> for ProviderRef {
    fn from(value: &GithubProvider) -> Self {
        ProviderRef::Element(value.element_id())
    }
}
