//! Fixed-order middleware composition.
//!
//! A [`Middleware`] holds the resolved configuration of the three stages and
//! wraps business handlers. The stage order is fixed:
//!
//! ```text
//! Event → Authorize → Parse → Invoke ──→ Normalize → NormalizedResponse
//!            │          │                    ↑
//!            └──────────┴── short-circuit ───┘
//! ```
//!
//! A stage without an action is skipped. Every exit path, including
//! short-circuits, goes through the [`ResponseNormalizer`] exactly once.
//!
//! # Example
//!
//! ```
//! use apigw_core::Event;
//! use apigw_middleware::Middleware;
//! use serde_json::{json, Value};
//!
//! let middleware = Middleware::builder()
//!     .authorize(|ctx: Option<&Value>| match ctx {
//!         Some(_) => Ok(()),
//!         None => anyhow::bail!("no authorizer context"),
//!     })
//!     .parse(|body: Option<&Value>| match body {
//!         Some(Value::String(text)) => Ok(serde_json::from_str(text)?),
//!         _ => anyhow::bail!("body must be a JSON string"),
//!     })
//!     .build();
//!
//! let handler = middleware.wrap(|event: &Event, _ctx: ()| {
//!     Ok(json!({ "statusCode": 200, "body": event.parsed_body() }))
//! });
//!
//! let event = Event::new(json!({
//!     "body": "{\"name\":\"alice\"}",
//!     "requestContext": { "authorizer": { "principalId": "u-1" } }
//! }));
//! let response = handler.call(&event, ());
//! assert_eq!(response.status(), 200);
//! assert_eq!(response.body(), Some(r#"{"name":"alice"}"#));
//!
//! let denied = handler.call(&Event::empty(), ());
//! assert_eq!(denied.status(), 401);
//! ```

use apigw_core::{Event, HeaderSet, NormalizedResponse, RawResult, DEFAULT_INTERNAL_ERROR_MESSAGE};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

use crate::normalizer::ResponseNormalizer;
use crate::stage::{
    AuthorizeAction, ErrorTranslator, ParseAction, PipelineStage, StageKind, StageOutcome,
};
use crate::stages::{AuthorizeStage, InvokeStage, ParseStage};

/// Middleware configuration.
///
/// All actions and translators are optional. A missing action skips its
/// stage; a missing translator falls back to the 401 (authorize) or 400
/// (parse) default.
#[derive(Clone)]
pub struct MiddlewareConfig {
    /// Authorize action, called with `requestContext.authorizer`.
    pub authorize: Option<AuthorizeAction>,
    /// Translator for authorize faults.
    pub on_authorize_error: Option<ErrorTranslator>,
    /// Parse action, called with the raw body.
    pub parse: Option<ParseAction>,
    /// Translator for parse faults.
    pub on_parse_error: Option<ErrorTranslator>,
    /// Headers applied to every response unless overridden.
    pub default_headers: HeaderSet,
    /// Whether handler fault messages reach the response body.
    pub expose_handler_errors: bool,
    /// Message used for handler faults when they are not exposed.
    pub internal_error_message: String,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            authorize: None,
            on_authorize_error: None,
            parse: None,
            on_parse_error: None,
            default_headers: HeaderSet::cors_defaults(),
            expose_handler_errors: true,
            internal_error_message: DEFAULT_INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

impl fmt::Debug for MiddlewareConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareConfig")
            .field("authorize", &self.authorize.is_some())
            .field("on_authorize_error", &self.on_authorize_error.is_some())
            .field("parse", &self.parse.is_some())
            .field("on_parse_error", &self.on_parse_error.is_some())
            .field("default_headers", &self.default_headers)
            .field("expose_handler_errors", &self.expose_handler_errors)
            .field("internal_error_message", &self.internal_error_message)
            .finish()
    }
}

struct Stages {
    authorize: AuthorizeStage,
    parse: ParseStage,
    invoke: InvokeStage,
    normalizer: ResponseNormalizer,
}

/// A composed middleware, ready to wrap handlers.
///
/// Cloning is cheap; clones share the same resolved stages.
#[derive(Clone)]
pub struct Middleware {
    stages: Arc<Stages>,
}

impl Default for Middleware {
    fn default() -> Self {
        Self::from_config(MiddlewareConfig::default())
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware")
            .field("authorize", &self.stages.authorize)
            .field("parse", &self.stages.parse)
            .field("invoke", &self.stages.invoke)
            .field("normalizer", &self.stages.normalizer)
            .finish()
    }
}

impl Middleware {
    /// Resolves a configuration into a middleware.
    #[must_use]
    pub fn from_config(config: MiddlewareConfig) -> Self {
        let stages = Stages {
            authorize: AuthorizeStage::new(config.authorize, config.on_authorize_error),
            parse: ParseStage::new(config.parse, config.on_parse_error),
            invoke: InvokeStage::new(config.expose_handler_errors, config.internal_error_message),
            normalizer: ResponseNormalizer::new(config.default_headers),
        };
        Self {
            stages: Arc::new(stages),
        }
    }

    /// Creates a new middleware builder.
    #[must_use]
    pub fn builder() -> MiddlewareBuilder {
        MiddlewareBuilder::new()
    }

    /// Wraps a handler.
    ///
    /// The handler receives the (possibly augmented) event and the opaque
    /// invocation context, and returns anything convertible to a
    /// [`RawResult`].
    pub fn wrap<H, C, R>(&self, handler: H) -> WrappedHandler<H, C, R>
    where
        H: Fn(&Event, C) -> anyhow::Result<R>,
        R: Into<RawResult>,
    {
        WrappedHandler {
            middleware: self.clone(),
            handler,
            _marker: PhantomData,
        }
    }

    /// Returns the normalizer applied to every response.
    #[must_use]
    pub fn normalizer(&self) -> &ResponseNormalizer {
        &self.stages.normalizer
    }

    /// Returns the names of all stages in order.
    #[must_use]
    pub fn stage_names(&self) -> [&'static str; 3] {
        StageKind::all().map(StageKind::name)
    }

    /// Returns the stages that have an action configured, in order.
    ///
    /// The invoke stage is always enabled.
    #[must_use]
    pub fn enabled_stages(&self) -> Vec<StageKind> {
        self.pre_handler_stages()
            .into_iter()
            .filter(|stage| stage.is_enabled())
            .map(|stage| stage.kind())
            .chain(std::iter::once(StageKind::Invoke))
            .collect()
    }

    fn pre_handler_stages(&self) -> [&dyn PipelineStage; 2] {
        [&self.stages.authorize, &self.stages.parse]
    }

    fn process<H, C, R>(&self, handler: &H, event: &Event, context: C) -> NormalizedResponse
    where
        H: Fn(&Event, C) -> anyhow::Result<R>,
        R: Into<RawResult>,
    {
        let mut augmented: Option<Event> = None;

        for stage in self.pre_handler_stages() {
            let current = augmented.as_ref().unwrap_or(event);
            match stage.run(current) {
                StageOutcome::Continue(Some(next)) => augmented = Some(next),
                StageOutcome::Continue(None) => {}
                StageOutcome::Finish(raw) => {
                    debug!(stage = stage.kind().name(), "Pipeline short-circuited");
                    return self.stages.normalizer.normalize(raw);
                }
            }
        }

        let current = augmented.as_ref().unwrap_or(event);
        let raw = self.stages.invoke.run(handler, current, context);
        self.stages.normalizer.normalize(raw)
    }
}

/// Builder for constructing a [`Middleware`] from plain closures.
///
/// # Example
///
/// ```
/// use apigw_core::RawResponse;
/// use apigw_middleware::Middleware;
/// use serde_json::Value;
///
/// let middleware = Middleware::builder()
///     .authorize(|_ctx: Option<&Value>| anyhow::Ok(()))
///     .on_authorize_error(|fault| Ok(RawResponse::new(403).with_text(fault.to_string())))
///     .header("X-Service", "users")
///     .expose_handler_errors(false)
///     .build();
///
/// assert_eq!(middleware.normalizer().default_headers().len(), 3);
/// ```
#[derive(Debug, Default)]
pub struct MiddlewareBuilder {
    config: MiddlewareConfig,
}

impl MiddlewareBuilder {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder seeded with `config`.
    #[must_use]
    pub fn from_config(config: MiddlewareConfig) -> Self {
        Self { config }
    }

    /// Sets the authorize action. Its return value is discarded.
    #[must_use]
    pub fn authorize<F, T>(mut self, action: F) -> Self
    where
        F: Fn(Option<&Value>) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.config.authorize = Some(Arc::new(move |ctx: Option<&Value>| {
            action(ctx).map(|_| ())
        }));
        self
    }

    /// Sets the translator for authorize faults.
    #[must_use]
    pub fn on_authorize_error<F, R>(mut self, translator: F) -> Self
    where
        F: Fn(anyhow::Error) -> anyhow::Result<R> + Send + Sync + 'static,
        R: Into<RawResult>,
    {
        self.config.on_authorize_error = Some(boxed_translator(translator));
        self
    }

    /// Sets the parse action. Its return value becomes `middleware.body`.
    #[must_use]
    pub fn parse<F>(mut self, action: F) -> Self
    where
        F: Fn(Option<&Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.config.parse = Some(Arc::new(action));
        self
    }

    /// Sets the translator for parse faults.
    #[must_use]
    pub fn on_parse_error<F, R>(mut self, translator: F) -> Self
    where
        F: Fn(anyhow::Error) -> anyhow::Result<R> + Send + Sync + 'static,
        R: Into<RawResult>,
    {
        self.config.on_parse_error = Some(boxed_translator(translator));
        self
    }

    /// Replaces the default headers.
    #[must_use]
    pub fn default_headers(mut self, headers: HeaderSet) -> Self {
        self.config.default_headers = headers;
        self
    }

    /// Adds or overrides a single default header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(name, value);
        self
    }

    /// Sets whether handler fault messages reach the response body.
    ///
    /// **Warning**: exposing errors can leak internal details to clients.
    #[must_use]
    pub fn expose_handler_errors(mut self, expose: bool) -> Self {
        self.config.expose_handler_errors = expose;
        self
    }

    /// Sets the message used for handler faults when they are not exposed.
    #[must_use]
    pub fn internal_error_message(mut self, message: impl Into<String>) -> Self {
        self.config.internal_error_message = message.into();
        self
    }

    /// Returns the configuration built so far.
    #[must_use]
    pub fn config(&self) -> &MiddlewareConfig {
        &self.config
    }

    /// Builds the middleware.
    #[must_use]
    pub fn build(self) -> Middleware {
        Middleware::from_config(self.config)
    }
}

fn boxed_translator<F, R>(translator: F) -> ErrorTranslator
where
    F: Fn(anyhow::Error) -> anyhow::Result<R> + Send + Sync + 'static,
    R: Into<RawResult>,
{
    Arc::new(move |fault: anyhow::Error| translator(fault).map(Into::<RawResult>::into))
}

/// A handler wrapped by a [`Middleware`].
///
/// Holds no mutable state and can be called any number of times.
pub struct WrappedHandler<H, C, R> {
    middleware: Middleware,
    handler: H,
    _marker: PhantomData<fn(C) -> R>,
}

impl<H, C, R> WrappedHandler<H, C, R>
where
    H: Fn(&Event, C) -> anyhow::Result<R>,
    R: Into<RawResult>,
{
    /// Runs the pipeline for one invocation.
    pub fn call(&self, event: &Event, context: C) -> NormalizedResponse {
        self.middleware.process(&self.handler, event, context)
    }

    /// Runs the pipeline on a raw JSON event and returns the response in its
    /// wire shape.
    pub fn call_value(&self, event: Value, context: C) -> Value {
        self.call(&Event::new(event), context).to_json_value()
    }

    /// Returns the names of all stages in order.
    #[must_use]
    pub fn stage_names(&self) -> [&'static str; 3] {
        self.middleware.stage_names()
    }

    /// Returns the middleware this handler is wrapped by.
    #[must_use]
    pub fn middleware(&self) -> &Middleware {
        &self.middleware
    }
}

impl<H: Clone, C, R> Clone for WrappedHandler<H, C, R> {
    fn clone(&self) -> Self {
        Self {
            middleware: self.middleware.clone(),
            handler: self.handler.clone(),
            _marker: PhantomData,
        }
    }
}

impl<H, C, R> fmt::Debug for WrappedHandler<H, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrappedHandler")
            .field("middleware", &self.middleware)
            .finish_non_exhaustive()
    }
}
