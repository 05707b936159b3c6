use crate::expr::{Expr, ToExpr};
use crate::meta::MetaArguments;
use crate::resource::{Config, Resource};
use crate::schema::{ElementKind, ResourceSchema};
use crate::shape::{RecordShape, Scalar, Shape};
use crate::tree::Scope;
use crate::{Input, Result};

/// `resource "github_branch_protection"`
#[derive(Debug, Clone)]
pub struct BranchProtection(Resource);

#[derive(Debug, Clone, Default)]
pub struct BranchProtectionConfig {
    /// Node id of the repository, not its name
    pub repository_id: Option<Input<String>>,
    pub pattern: Option<Input<String>>,
    pub enforce_admins: Option<Input<bool>>,
    pub allows_deletions: Option<Input<bool>>,
    pub required_status_checks: Option<Input<Vec<RequiredStatusChecks>>>,
    pub required_pull_request_reviews: Option<Input<Vec<PullRequestReviews>>>,
    pub meta: MetaArguments,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequiredStatusChecks {
    pub strict: Option<bool>,
    pub contexts: Vec<String>,
}

impl ToExpr for RequiredStatusChecks {
    fn to_expr(&self) -> Expr {
        Expr::record([
            ("strict", self.strict.to_expr()),
            ("contexts", self.contexts.to_expr()),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PullRequestReviews {
    pub dismiss_stale_reviews: Option<bool>,
    pub require_code_owner_reviews: Option<bool>,
    pub required_approving_review_count: Option<i64>,
}

impl ToExpr for PullRequestReviews {
    fn to_expr(&self) -> Expr {
        Expr::record([
            ("dismiss_stale_reviews", self.dismiss_stale_reviews.to_expr()),
            ("require_code_owner_reviews", self.require_code_owner_reviews.to_expr()),
            (
                "required_approving_review_count",
                self.required_approving_review_count.to_expr(),
            ),
        ])
    }
}

element_class!(
    BranchProtection,
    ResourceSchema::builder(ElementKind::Resource, "github_branch_protection")
        .provider(super::github())
        .required("repository_id", Shape::STRING)
        .required("pattern", Shape::STRING)
        .optional("enforce_admins", Shape::BOOL)
        .optional("allows_deletions", Shape::BOOL)
        .optional(
            "required_status_checks",
            Shape::record_list(
                RecordShape::new()
                    .optional("strict", Shape::BOOL)
                    .optional("contexts", Shape::List(Scalar::String)),
            ),
        )
        .optional(
            "required_pull_request_reviews",
            Shape::record_list(
                RecordShape::new()
                    .optional("dismiss_stale_reviews", Shape::BOOL)
                    .optional("require_code_owner_reviews", Shape::BOOL)
                    .optional("required_approving_review_count", Shape::NUMBER),
            ),
        )
        .computed("id", Shape::STRING)
);

impl BranchProtection {
    pub fn new(scope: &Scope, id: &str, config: BranchProtectionConfig) -> Result<Self> {
        let config = Config::new()
            .attribute("repository_id", config.repository_id)
            .attribute("pattern", config.pattern)
            .attribute("enforce_admins", config.enforce_admins)
            .attribute("allows_deletions", config.allows_deletions)
            .attribute("required_status_checks", config.required_status_checks)
            .attribute(
                "required_pull_request_reviews",
                config.required_pull_request_reviews,
            )
            .meta(config.meta);

        Resource::new(scope, id, Self::type_schema(), config).map(Self)
    }

    input_attribute!(repository_id: String, set_repository_id, reset_repository_id, repository_id_input);
    input_attribute!(pattern: String, set_pattern, reset_pattern, pattern_input);
    input_attribute!(enforce_admins: bool, set_enforce_admins, reset_enforce_admins, enforce_admins_input);
    input_attribute!(
        allows_deletions: bool,
        set_allows_deletions,
        reset_allows_deletions,
        allows_deletions_input
    );
    input_attribute!(
        required_status_checks: Vec<RequiredStatusChecks>,
        set_required_status_checks,
        reset_required_status_checks,
        required_status_checks_input
    );
    input_attribute!(
        required_pull_request_reviews: Vec<PullRequestReviews>,
        set_required_pull_request_reviews,
        reset_required_pull_request_reviews,
        required_pull_request_reviews_input
    );

    computed_attributes!(id);
}
