//! Behaviour traits — the per-intent code attached to a declarative definition.
//!
//! An intent's rules are plain data; everything that needs code is one of the
//! narrow traits below, injected at registration. The sync traits have blanket
//! impls for closures so small intents can be written inline.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FulfillmentError;
use crate::signal::SignalBundle;

/// Collected parameter values, keyed by parameter name.
pub type Params = serde_json::Map<String, Value>;

/// What a fulfiller produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fulfillment {
    /// Text to present to the user.
    pub text: String,

    /// Optional structured payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Fulfillment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Carries out an intent once all required parameters are collected.
///
/// Fulfillment may await network or storage calls; the orchestrator does not
/// accept the session's next utterance until it returns.
#[async_trait]
pub trait Fulfiller: Send + Sync {
    async fn fulfill(&self, params: &Params) -> Result<Fulfillment, FulfillmentError>;
}

/// A fulfiller backed by a synchronous closure.
pub struct FnFulfiller<F>(F);

impl<F> FnFulfiller<F>
where
    F: Fn(&Params) -> Result<Fulfillment, FulfillmentError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> Fulfiller for FnFulfiller<F>
where
    F: Fn(&Params) -> Result<Fulfillment, FulfillmentError> + Send + Sync,
{
    async fn fulfill(&self, params: &Params) -> Result<Fulfillment, FulfillmentError> {
        (self.0)(params)
    }
}

/// Custom parameter extraction from a bundle.
pub trait Extractor: Send + Sync {
    fn extract(&self, bundle: &SignalBundle) -> Option<Value>;
}

impl<F> Extractor for F
where
    F: Fn(&SignalBundle) -> Option<Value> + Send + Sync,
{
    fn extract(&self, bundle: &SignalBundle) -> Option<Value> {
        self(bundle)
    }
}

/// Checks a parameter value. The error string is shown to the user as a re-prompt.
pub trait Validator: Send + Sync {
    fn validate(&self, value: &Value) -> Result<(), String>;
}

impl<F> Validator for F
where
    F: Fn(&Value) -> Result<(), String> + Send + Sync,
{
    fn validate(&self, value: &Value) -> Result<(), String> {
        self(value)
    }
}

/// Produces a parameter default lazily, at the moment of fallback.
pub trait DefaultProducer: Send + Sync {
    fn produce(&self) -> Value;
}

impl<F> DefaultProducer for F
where
    F: Fn() -> Value + Send + Sync,
{
    fn produce(&self) -> Value {
        self()
    }
}

/// Builds the data stored in an output context after fulfillment.
pub trait ContextDeriver: Send + Sync {
    fn derive(&self, fulfillment: &Fulfillment, params: &Params) -> Value;
}

impl<F> ContextDeriver for F
where
    F: Fn(&Fulfillment, &Params) -> Value + Send + Sync,
{
    fn derive(&self, fulfillment: &Fulfillment, params: &Params) -> Value {
        self(fulfillment, params)
    }
}

/// Turns a context's data plus a follow-up utterance into parameters for the
/// reused intent.
pub trait ParamModifier: Send + Sync {
    fn modify(&self, context_data: &Value, bundle: &SignalBundle) -> Params;
}

impl<F> ParamModifier for F
where
    F: Fn(&Value, &SignalBundle) -> Params + Send + Sync,
{
    fn modify(&self, context_data: &Value, bundle: &SignalBundle) -> Params {
        self(context_data, bundle)
    }
}

/// Truthiness of a parameter value.
///
/// `null`, `false`, `0` and `""` are falsy; a required parameter holding one of
/// these counts as missing. Numeric zero is deliberately included.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_none_or(|x| x == 0.0 || x.is_nan()),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
