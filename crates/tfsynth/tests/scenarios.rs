//! End-to-end behavior of construction and synthesis with hand-written schemas

use pretty_assertions::assert_eq;
use std::sync::Arc;
use tfsynth::{
    Config, Document, ElementKind, Error, Expr, Issue, Lifecycle, MetaArguments, ProviderSource,
    RecordShape, Resource, ResourceSchema, Scalar, Scope, Shape, Template, Value,
};

fn widget() -> Arc<ResourceSchema> {
    Arc::new(
        ResourceSchema::builder(ElementKind::Resource, "WidgetType")
            .required("name", Shape::STRING)
            .optional("size", Shape::NUMBER)
            .optional("labels", Shape::List(Scalar::String))
            .computed("id", Shape::STRING)
            .build()
            .unwrap(),
    )
}

fn src() -> Arc<ResourceSchema> {
    Arc::new(
        ResourceSchema::builder(ElementKind::Resource, "Src")
            .optional("name", Shape::STRING)
            .computed("id", Shape::STRING)
            .computed("tags", Shape::List(Scalar::String))
            .build()
            .unwrap(),
    )
}

fn dst() -> Arc<ResourceSchema> {
    Arc::new(
        ResourceSchema::builder(ElementKind::Resource, "Dst")
            .optional("target", Shape::STRING)
            .optional("count_of", Shape::NUMBER)
            .build()
            .unwrap(),
    )
}

fn gh() -> ProviderSource {
    ProviderSource::new("gh", "example/gh")
}

fn gh_provider() -> Arc<ResourceSchema> {
    Arc::new(
        ResourceSchema::builder(ElementKind::Provider, "gh")
            .provider(gh())
            .optional("owner", Shape::STRING)
            .build()
            .unwrap(),
    )
}

fn gh_repo() -> Arc<ResourceSchema> {
    Arc::new(
        ResourceSchema::builder(ElementKind::Resource, "gh_repo")
            .provider(gh())
            .required("name", Shape::STRING)
            .build()
            .unwrap(),
    )
}

fn named(name: &str) -> Config {
    Config::new().attribute("name", name)
}

fn provider(root: &Scope, id: &str, alias: Option<&str>) -> Resource {
    let mut meta = MetaArguments::new();
    meta.alias = alias.map(str::to_string);
    Resource::new(root, id, gh_provider(), Config::new().meta(meta)).unwrap()
}

#[test]
fn minimal_resource() {
    let root = Scope::root();
    Resource::new(&root, "w", widget(), named("hello")).unwrap();

    let document = root.synthesize().unwrap();
    assert_eq!(
        document.to_json().unwrap(),
        r#"{"resource":{"WidgetType":{"w":{"name":"hello"}}}}"#
    );
}

#[test]
fn token_reference() {
    let root = Scope::root();
    let a = Resource::new(&root, "a", src(), Config::new()).unwrap();
    Resource::new(
        &root,
        "b",
        dst(),
        Config::new().attribute("target", a.reference("id")),
    )
    .unwrap();

    let document = root.synthesize().unwrap();
    assert_eq!(
        document.pointer(&["resource", "Dst", "b", "target"]),
        Some(&Value::from("${Src.a.id}"))
    );
}

#[test]
fn missing_required() {
    let repo = Arc::new(
        ResourceSchema::builder(ElementKind::Resource, "Repo")
            .required("repo", Shape::STRING)
            .build()
            .unwrap(),
    );
    let root = Scope::root();
    Resource::new(&root, "x", repo, Config::new()).unwrap();

    let error = root.synthesize().unwrap_err();
    assert_eq!(error.diagnostics().len(), 1);

    let diagnostic = &error.diagnostics()[0];
    assert_eq!(diagnostic.kind(), "MissingRequired");
    assert_eq!(diagnostic.attribute_address().as_deref(), Some("Repo.x.repo"));
}

#[test]
fn circular_dependency() {
    let root = Scope::root();
    let r1 = Resource::new(&root, "r1", widget(), named("one")).unwrap();
    let r2 = Resource::new(&root, "r2", widget(), named("two")).unwrap();
    r1.add_dependency(&r2).unwrap();
    r2.add_dependency(&r1).unwrap();

    let error = root.synthesize().unwrap_err();
    let cycles: Vec<&Issue> = error
        .of_kind("CircularDependency")
        .map(|diagnostic| &diagnostic.issue)
        .collect();

    assert_eq!(
        cycles,
        vec![&Issue::CircularDependency {
            cycle: vec![
                "WidgetType.r1".to_string(),
                "WidgetType.r2".to_string(),
                "WidgetType.r1".to_string(),
            ]
        }]
    );
}

#[test]
fn duplicate_id() {
    let root = Scope::root();
    let first = Resource::new(&root, "x", widget(), named("first")).unwrap();
    let second = Resource::new(&root, "x", src(), Config::new());

    assert!(matches!(second, Err(Error::DuplicateId { ref id, .. }) if id == "x"));
    assert_eq!(root.children().len(), 1);
    assert_eq!(first.type_name(), "WidgetType");

    // the tree is still usable
    let document = root.synthesize().unwrap();
    assert!(document.pointer(&["resource", "WidgetType", "x"]).is_some());
}

#[test]
fn provider_alias() {
    let root = Scope::root();
    provider(&root, "gh_a", Some("a"));
    provider(&root, "gh_b", Some("b"));
    Resource::new(
        &root,
        "repo",
        gh_repo(),
        named("api").meta(MetaArguments::new().provider("gh.b")),
    )
    .unwrap();

    let document = root.synthesize().unwrap();
    assert_eq!(
        document.to_json().unwrap(),
        concat!(
            r#"{"terraform":{"required_providers":{"gh":{"source":"example/gh"}}},"#,
            r#""provider":{"gh":[{"alias":"a"},{"alias":"b"}]},"#,
            r#""resource":{"gh_repo":{"repo":{"name":"api","provider":"gh.b"}}}}"#
        )
    );
}

#[test]
fn synthesis_is_repeatable() {
    let root = Scope::root();
    let team = Scope::with_prefix(&root, "team", "team").unwrap();
    let a = Resource::new(&team, "a", src(), Config::new()).unwrap();
    Resource::new(&root, "w", widget(), named("w").attribute("size", 3)).unwrap();
    Resource::new(
        &root,
        "b",
        dst(),
        Config::new()
            .attribute("target", a.reference("id"))
            .meta(MetaArguments::new().depends_on(&a).count(2)),
    )
    .unwrap();

    let first = root.synthesize().unwrap();
    let second = root.synthesize().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    assert_eq!(
        first.pointer(&["resource", "Dst", "b"]).map(|b| serde_json::to_string(b).unwrap()),
        Some(r#"{"target":"${Src.team.a.id}","depends_on":["Src.team.a"],"count":2}"#.to_string())
    );
}

#[test]
fn json_round_trip() {
    let root = Scope::root();
    provider(&root, "gh", None);
    let w = Resource::new(&root, "w", widget(), named("w")).unwrap();
    w.set("size", 2.5).unwrap();
    w.set("labels", Expr::list(["a", "b"])).unwrap();
    w.set_lifecycle(Some(Lifecycle::new().prevent_destroy(true)))
        .unwrap();

    let document = root.synthesize().unwrap();
    let json = document.to_json().unwrap();
    let parsed = Document::from_json(&json).unwrap();

    assert_eq!(parsed, document);
    assert_eq!(parsed.to_json().unwrap(), json);
}

#[test]
fn last_write_wins() {
    let root = Scope::root();
    let w = Resource::new(&root, "w", widget(), named("first")).unwrap();
    w.set("name", "second").unwrap();
    w.set("name", "third").unwrap();

    assert_eq!(w.get("name").unwrap(), Some(Expr::from("third")));
    let document = root.synthesize().unwrap();
    assert_eq!(
        document.pointer(&["resource", "WidgetType", "w", "name"]),
        Some(&Value::from("third"))
    );
}

#[test]
fn unset_attributes_are_absent() {
    let root = Scope::root();
    let w = Resource::new(&root, "w", widget(), named("w").attribute("size", 1)).unwrap();
    w.set("size", Expr::Null).unwrap();
    w.set("labels", Expr::list(["x"])).unwrap();
    w.reset("labels").unwrap();

    assert!(!w.is_set("size").unwrap());
    let json = root.synthesize().unwrap().to_json().unwrap();
    assert!(!json.contains("null"));
    assert_eq!(json, r#"{"resource":{"WidgetType":{"w":{"name":"w"}}}}"#);
}

#[test]
fn interpolation_keeps_segment_order() {
    let root = Scope::root();
    let a = Resource::new(&root, "a", src(), Config::new()).unwrap();
    let template = Template::new()
        .text("https://")
        .reference(a.reference("id"))
        .text("/hooks/")
        .count_index();
    Resource::new(&root, "b", dst(), Config::new().attribute("target", template)).unwrap();

    let document = root.synthesize().unwrap();
    assert_eq!(
        document.pointer(&["resource", "Dst", "b", "target"]),
        Some(&Value::from("https://${Src.a.id}/hooks/${count.index}"))
    );
}

#[test]
fn reference_into_another_tree_dangles() {
    let other = Scope::root();
    let foreign = Resource::new(&other, "a", src(), Config::new()).unwrap();

    let root = Scope::root();
    Resource::new(
        &root,
        "b",
        dst(),
        Config::new().attribute("target", foreign.reference("id")),
    )
    .unwrap();

    let error = root.synthesize().unwrap_err();
    assert_eq!(error.diagnostics().len(), 1);
    assert_eq!(error.diagnostics()[0].kind(), "DanglingReference");
    assert_eq!(error.diagnostics()[0].address, "Dst.b");
}

#[test]
fn reference_shape_is_checked_late() {
    let root = Scope::root();
    let a = Resource::new(&root, "a", src(), Config::new()).unwrap();
    Resource::new(
        &root,
        "b",
        dst(),
        Config::new().attribute("count_of", a.reference("tags")),
    )
    .unwrap();

    let error = root.synthesize().unwrap_err();
    let diagnostic = &error.diagnostics()[0];
    assert_eq!(diagnostic.kind(), "InvalidAttributeType");
    assert_eq!(diagnostic.attribute_address().as_deref(), Some("Dst.b.count_of"));
}

#[test]
fn every_problem_is_reported() {
    let root = Scope::root();
    Resource::new(&root, "w1", widget(), Config::new()).unwrap();
    Resource::new(&root, "w2", widget(), Config::new()).unwrap();
    Resource::new(
        &root,
        "repo",
        gh_repo(),
        named("api").meta(MetaArguments::new().provider("gh.missing")),
    )
    .unwrap();

    let error = root.synthesize().unwrap_err();
    let kinds: Vec<&str> = error.diagnostics().iter().map(|d| d.kind()).collect();
    assert_eq!(kinds, vec!["MissingRequired", "MissingRequired", "UnknownProvider"]);
}

#[test]
fn providers_without_alias_are_ambiguous() {
    let root = Scope::root();
    provider(&root, "first", None);
    provider(&root, "second", None);

    let error = root.synthesize().unwrap_err();
    assert_eq!(error.diagnostics().len(), 1);
    assert_eq!(error.diagnostics()[0].kind(), "AmbiguousProvider");
}

#[test]
fn provider_alias_is_resolved_in_enclosing_scopes() {
    let root = Scope::root();
    let nested = Scope::new(&root, "nested").unwrap();
    let sibling = Scope::new(&root, "sibling").unwrap();
    provider(&nested, "gh", Some("inner"));
    Resource::new(
        &sibling,
        "repo",
        gh_repo(),
        named("api").meta(MetaArguments::new().provider("gh.inner")),
    )
    .unwrap();

    let error = root.synthesize().unwrap_err();
    assert_eq!(error.diagnostics()[0].kind(), "UnknownProvider");
}

#[test]
fn frozen_after_synthesis() {
    let root = Scope::root();
    let w = Resource::new(&root, "w", widget(), named("w")).unwrap();
    root.synthesize().unwrap();

    assert_eq!(w.set("name", "changed"), Err(Error::Frozen));
    assert!(matches!(
        Resource::new(&root, "late", widget(), named("late")),
        Err(Error::Frozen)
    ));
    assert!(matches!(Scope::new(&root, "late"), Err(Error::Frozen)));
}

#[test]
fn nested_records_are_validated_on_assignment() {
    let hooks = Arc::new(
        ResourceSchema::builder(ElementKind::Resource, "Hook")
            .optional(
                "configuration",
                Shape::record_list(
                    RecordShape::new()
                        .required("url", Shape::STRING)
                        .optional("secret", Shape::STRING),
                ),
            )
            .build()
            .unwrap(),
    );
    let root = Scope::root();
    let hook = Resource::new(&root, "h", hooks, Config::new()).unwrap();

    let error = hook
        .set(
            "configuration",
            Expr::list([
                Expr::record([("url", "https://a")]),
                Expr::record([("secret", "s")]),
            ]),
        )
        .unwrap_err();

    let Error::InvalidAttributeType { mismatch, .. } = error else {
        panic!("unexpected error {error:?}");
    };
    assert_eq!(mismatch.path.to_string(), "configuration[1].url");
    assert!(!hook.is_set("configuration").unwrap());
}

#[test]
fn computed_attributes_are_read_only() {
    let root = Scope::root();
    let a = Resource::new(&root, "a", src(), Config::new()).unwrap();

    assert!(matches!(a.set("id", "x"), Err(Error::ReadOnlyAttribute { .. })));
    assert_eq!(a.get("id").unwrap(), Some(Expr::Reference(a.reference("id"))));
}

#[test]
fn meta_arguments_per_kind() {
    let root = Scope::root();
    let result = Resource::new(
        &root,
        "p",
        gh_provider(),
        Config::new().meta(MetaArguments::new().count(2)),
    );

    assert!(matches!(
        result,
        Err(Error::UnsupportedMetaArgument {
            kind: ElementKind::Provider,
            name: "count",
            ..
        })
    ));
}

#[test]
fn non_finite_numbers_are_rejected() {
    let root = Scope::root();
    let w = Resource::new(&root, "w", widget(), named("w")).unwrap();

    for number in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert!(matches!(
            w.set("size", number),
            Err(Error::InvalidAttributeType { .. })
        ));
    }
    assert!(matches!(
        Resource::new(&root, "v", widget(), named("v").attribute("size", f64::NAN)),
        Err(Error::InvalidAttributeType { .. })
    ));
    assert!(!w.is_set("size").unwrap());

    w.set("size", 2.5).unwrap();
    let json = root.synthesize().unwrap().to_json().unwrap();
    assert_eq!(json, r#"{"resource":{"WidgetType":{"w":{"name":"w","size":2.5}}}}"#);
    assert_eq!(Document::from_json(&json).unwrap().to_json().unwrap(), json);
}

fn counted(root: &Scope, id: &str, count: u32) -> Resource {
    Resource::new(
        root,
        id,
        src(),
        Config::new().meta(MetaArguments::new().count(count)),
    )
    .unwrap()
}

#[test]
fn counted_elements_are_referenced_by_instance() {
    let root = Scope::root();
    let a = counted(&root, "a", 2);
    Resource::new(
        &root,
        "one",
        dst(),
        Config::new().attribute("target", a.reference("id").instance(1)),
    )
    .unwrap();
    Resource::new(
        &root,
        "text",
        dst(),
        Config::new().attribute(
            "target",
            Template::new()
                .text("first: ")
                .reference(a.reference("tags").instance(0).index(0)),
        ),
    )
    .unwrap();
    let all = Resource::new(&root, "all", widget(), named("all")).unwrap();
    all.set("labels", a.reference("id").all_instances()).unwrap();

    let document = root.synthesize().unwrap();
    assert_eq!(
        document.pointer(&["resource", "Dst", "one", "target"]),
        Some(&Value::from("${Src.a[1].id}"))
    );
    assert_eq!(
        document.pointer(&["resource", "Dst", "text", "target"]),
        Some(&Value::from("first: ${Src.a[0].tags[0]}"))
    );
    assert_eq!(
        document.pointer(&["resource", "WidgetType", "all", "labels"]),
        Some(&Value::from("${Src.a[*].id}"))
    );
}

#[test]
fn instance_selection_must_fit_the_owner() {
    let root = Scope::root();
    let many = counted(&root, "a", 2);
    let single = Resource::new(&root, "s", src(), Config::new()).unwrap();

    let targets = [
        ("whole", many.reference("id")),
        ("beyond", many.reference("id").instance(2)),
        ("uncounted", single.reference("id").instance(0)),
        ("splat", many.reference("id").all_instances()),
    ];
    for (id, token) in targets {
        Resource::new(&root, id, dst(), Config::new().attribute("target", token)).unwrap();
    }

    let error = root.synthesize().unwrap_err();
    let addresses: Vec<String> = error
        .diagnostics()
        .iter()
        .map(|diagnostic| {
            assert_eq!(diagnostic.kind(), "InvalidAttributeType");
            diagnostic.attribute_address().unwrap_or_default()
        })
        .collect();
    // a splat produces a list, which does not fit a string attribute
    assert_eq!(
        addresses,
        ["Dst.whole.target", "Dst.beyond.target", "Dst.uncounted.target", "Dst.splat.target"]
    );
}
