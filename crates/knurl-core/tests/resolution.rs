//! Resolution properties exercised through the public pipeline API.

use std::sync::Arc;

use knurl_core::resolve::{resolve_request, resolve_template, resolve_variables};
use knurl_core::{
    Context, EngineConfig, EngineRegistry, Environment, Pipeline, Request, RequestBody,
    ResponseData, Variable,
};

const TEMPLATES: &[&str] = &[
    "",
    "plain text",
    "{{a}}",
    "{{a}}{{b}}",
    "prefix-{{a}}-{{missing}}-{{a}}",
    "{{ a }}",
    "{{}}",
    "{{{a}}}",
    "{{a}",
    "unicode {{ünï}} {{a}}",
];

fn env(enabled: bool) -> Environment {
    let a = Variable::new("a", "A-VALUE");
    let b = Variable::new("b", "{{a}}");
    let unicode = Variable::new("ünï", "ü");
    let (a, b, unicode) = if enabled {
        (a, b, unicode)
    } else {
        (a.disabled(), b.disabled(), unicode.disabled())
    };
    Environment::new("env", "Props")
        .with_variable(a)
        .with_variable(b)
        .with_variable(unicode)
}

#[test]
fn test_disabled_or_empty_environment_is_identity() {
    for template in TEMPLATES {
        assert_eq!(&resolve_template(template, &env(false)), template);
        assert_eq!(&resolve_template(template, &Environment::empty()), template);
    }
}

#[test]
fn test_enabled_tokens_fully_replaced() {
    let env = env(true);
    assert_eq!(
        resolve_template("prefix-{{a}}-{{missing}}-{{a}}", &env),
        "prefix-A-VALUE-{{missing}}-A-VALUE"
    );
    // substituted values are inserted verbatim
    assert_eq!(resolve_template("{{a}}{{b}}", &env), "A-VALUE{{a}}");
    assert_eq!(resolve_template("{{{a}}}", &env), "{A-VALUE}");
    assert_eq!(resolve_template("{{a}", &env), "{{a}");
    assert_eq!(resolve_template("unicode {{ünï}} {{a}}", &env), "unicode ü A-VALUE");
}

#[test]
fn test_disabled_variable_tokens_survive_in_every_field() {
    let mut fields = std::collections::BTreeMap::new();
    fields.insert("f".to_string(), "{{a}}".to_string());
    let request = Request::new("col", "POST", "https://x/{{a}}")
        .with_header("H", "{{a}}")
        .with_query_param("q", "{{a}}")
        .with_body(RequestBody::Form { fields });

    assert_eq!(resolve_request(request.clone(), &env(false)), request);

    let resolved = resolve_request(request, &env(true));
    assert_eq!(resolved.url, "https://x/A-VALUE");
    assert_eq!(resolved.headers["H"], "A-VALUE");
    assert_eq!(resolved.query_params["q"], "A-VALUE");
    assert!(matches!(resolved.body, RequestBody::Form { ref fields } if fields["f"] == "A-VALUE"));
}

#[tokio::test]
async fn test_environment_snapshot_is_isolated() {
    let mut environment = Environment::new("env", "Dev").with_variable(Variable::new("host", "one"));
    let context = Context::new(Request::new("col", "WS", "{{host}}"), environment.clone());

    // editing the caller's copy after the context is built has no effect on the run
    environment
        .variables
        .insert("host".to_string(), Variable::new("host", "two"));

    let resolved = resolve_variables(context.clone());
    assert_eq!(resolved.request.url, "one");

    let registry = EngineRegistry::with_defaults(&EngineConfig::default()).unwrap();
    let pipeline = Pipeline::new(Arc::new(registry));
    let response = pipeline.run(context).await.unwrap();
    assert!(matches!(response.data, ResponseData::WebSocket(_)));
}
