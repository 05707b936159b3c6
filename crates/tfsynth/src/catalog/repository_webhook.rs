use crate::expr::{Expr, ToExpr};
use crate::meta::MetaArguments;
use crate::resource::{Config, Resource};
use crate::schema::{ElementKind, ResourceSchema};
use crate::shape::{RecordShape, Scalar, Shape};
use crate::tree::Scope;
use crate::{Input, Result};

/// `resource "github_repository_webhook"`
#[derive(Debug, Clone)]
pub struct RepositoryWebhook(Resource);

#[derive(Debug, Clone, Default)]
pub struct RepositoryWebhookConfig {
    pub repository: Option<Input<String>>,
    pub events: Option<Input<Vec<String>>>,
    pub active: Option<Input<bool>>,
    pub configuration: Option<Input<Vec<WebhookConfiguration>>>,
    pub meta: MetaArguments,
}

/// `configuration` block of a webhook
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookConfiguration {
    pub url: String,
    pub content_type: Option<String>,
    pub insecure_ssl: Option<bool>,
    pub secret: Option<String>,
}

impl WebhookConfiguration {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content_type: None,
            insecure_ssl: None,
            secret: None,
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn insecure_ssl(mut self, insecure_ssl: bool) -> Self {
        self.insecure_ssl = Some(insecure_ssl);
        self
    }

    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }
}

impl ToExpr for WebhookConfiguration {
    fn to_expr(&self) -> Expr {
        Expr::record([
            ("url", self.url.to_expr()),
            ("content_type", self.content_type.to_expr()),
            ("insecure_ssl", self.insecure_ssl.to_expr()),
            ("secret", self.secret.to_expr()),
        ])
    }
}

element_class!(
    RepositoryWebhook,
    ResourceSchema::builder(ElementKind::Resource, "github_repository_webhook")
        .provider(super::github())
        .required("repository", Shape::STRING)
        .required("events", Shape::List(Scalar::String))
        .optional("active", Shape::BOOL)
        .optional(
            "configuration",
            Shape::record_list(
                RecordShape::new()
                    .required("url", Shape::STRING)
                    .optional("content_type", Shape::STRING)
                    .optional("insecure_ssl", Shape::BOOL)
                    .optional("secret", Shape::STRING),
            ),
        )
        .sensitive()
        .computed("id", Shape::STRING)
        .computed("url", Shape::STRING)
        .computed("etag", Shape::STRING)
);

impl RepositoryWebhook {
    pub fn new(scope: &Scope, id: &str, config: RepositoryWebhookConfig) -> Result<Self> {
        let config = Config::new()
            .attribute("repository", config.repository)
            .attribute("events", config.events)
            .attribute("active", config.active)
            .attribute("configuration", config.configuration)
            .meta(config.meta);

        Resource::new(scope, id, Self::type_schema(), config).map(Self)
    }

    input_attribute!(repository: String, set_repository, reset_repository, repository_input);
    input_attribute!(events: Vec<String>, set_events, reset_events, events_input);
    input_attribute!(active: bool, set_active, reset_active, active_input);
    input_attribute!(
        configuration: Vec<WebhookConfiguration>,
        set_configuration,
        reset_configuration,
        configuration_input
    );

    computed_attributes!(id, url, etag);
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unset_configuration_fields_are_left_out() {
        let root = Scope::root();
        let hook = RepositoryWebhook::new(
            &root,
            "hook",
            RepositoryWebhookConfig {
                repository: Some("api".into()),
                events: Some(["push"].into()),
                configuration: Some(vec![WebhookConfiguration::new("https://ci.example.com")
                    .content_type("json")]
                .into()),
                ..Default::default()
            },
        )
        .unwrap();

        let document = root.synthesize().unwrap();
        let body = document
            .pointer(&["resource", "github_repository_webhook", "hook"])
            .unwrap();
        assert_eq!(
            serde_json::to_string(body.get("configuration").unwrap()).unwrap(),
            r#"[{"url":"https://ci.example.com","content_type":"json"}]"#
        );
        assert_eq!(hook.url().path().to_string(), "url");
    }
}
