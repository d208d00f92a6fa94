//! Configuration flowing into wrapped handlers.

use apigw::config::ConfigLoader;
use apigw::prelude::*;
use apigw_test::{EventBuilder, TestResponse};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn load(toml: &str) -> ToolboxConfig {
    ConfigLoader::new()
        .with_string(toml, "toml")
        .unwrap()
        .load()
        .unwrap()
}

#[test]
fn configured_headers_reach_every_path() {
    let config = load(
        r#"
        [response.default_headers]
        "Access-Control-Allow-Origin" = "https://app.example.com"
        "X-Service" = "orders"
        "#,
    );

    let handler = apigw::middleware_from_config(&config)
        .build()
        .wrap(|event: &Event, _ctx: ()| {
            if event.get("fail").is_some() {
                anyhow::bail!("boom");
            }
            Ok(json!({ "statusCode": 200, "headers": { "X-Request": "1" } }))
        });

    let ok = TestResponse::new(handler.call(&EventBuilder::get("/orders").build(), ()));
    ok.assert_status(200)
        .assert_header("access-control-allow-origin", "https://app.example.com")
        .assert_header("X-Service", "orders")
        .assert_header("X-Request", "1")
        .assert_well_formed();
    assert!(ok.header("Access-Control-Allow-Credentials").is_none());

    let failed = TestResponse::new(
        handler.call(&EventBuilder::get("/orders").field("fail", Value::Bool(true)).build(), ()),
    );
    failed
        .assert_status(500)
        .assert_header("X-Service", "orders")
        .assert_error_contains("boom");
}

#[test]
fn production_preset_hides_handler_errors() {
    let config = ConfigLoader::new().with_production().load().unwrap();

    let handler = apigw::middleware_from_config(&config)
        .build()
        .wrap(|_event: &Event, _ctx: ()| -> anyhow::Result<Value> {
            anyhow::bail!("database password rejected")
        });

    let response = TestResponse::new(handler.call(&Event::empty(), ()));
    response.assert_status(500).assert_default_headers();
    assert_eq!(response.error_messages().unwrap(), vec!["Internal server error"]);
}

#[test]
fn custom_internal_error_message() {
    let config = load(
        r#"
        [response]
        expose_handler_errors = false
        internal_error_message = "Please retry"
        "#,
    );

    let handler = apigw::middleware_from_config(&config)
        .build()
        .wrap(|_event: &Event, _ctx: ()| -> anyhow::Result<Value> { panic!("index out of bounds") });

    let response = TestResponse::new(handler.call(&Event::empty(), ()));
    response.assert_status(500);
    assert_eq!(response.error_messages().unwrap(), vec!["Please retry"]);
}

#[test]
fn seeded_builder_still_accepts_stage_actions() {
    let handler = apigw::middleware_from_config(&ToolboxConfig::default())
        .authorize(|ctx: Option<&Value>| {
            match ctx.and_then(|c| c.get("principalId")) {
                Some(_) => Ok(()),
                None => anyhow::bail!("missing principal"),
            }
        })
        .build()
        .wrap(|event: &Event, _ctx: ()| {
            Ok(json!({ "statusCode": 200, "body": event.authorizer_context() }))
        });

    let denied = TestResponse::new(handler.call(&EventBuilder::get("/me").build(), ()));
    denied.assert_status(401).assert_error_contains("Unauthorized");

    let allowed = TestResponse::new(handler.call(&EventBuilder::get("/me").principal("u-1").build(), ()));
    allowed
        .assert_status(200)
        .assert_json_eq(&json!({ "principalId": "u-1" }));
}
