//! Parameter Pipeline — extraction, validation and slot-filling bookkeeping.
//!
//! Extraction of one parameter:
//! 1. a custom extractor if present, else by entity type (first entity of the
//!    kind; `any` takes the normalized utterance)
//! 2. the validator, if any; a rejected value is discarded, and its message
//!    becomes the prompt should the parameter be asked for
//! 3. the default, evaluated at this moment, when nothing usable remains
//!
//! A required parameter is missing while its value is absent or falsy.

use colloquy_core::behavior::{Params, is_falsy};
use colloquy_core::intent::{EntityType, Extraction, IntentDefinition, ParameterSpec};
use colloquy_core::signal::SignalBundle;
use serde_json::Value;
use tracing::debug;

/// Why an answer to a prompt was not accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerError {
    /// Nothing usable in the answer; ask again.
    Missing,
    /// The validator rejected the value; the message is the re-prompt.
    Invalid(String),
}

/// Pull the raw value for `spec` out of a bundle, without defaults or validation.
pub fn extract_raw(spec: &ParameterSpec, bundle: &SignalBundle) -> Option<Value> {
    match &spec.extraction {
        Extraction::Custom(extractor) => extractor.extract(bundle),
        Extraction::ByEntityType(EntityType::Any) => {
            let text = bundle.normalized.trim();
            (!text.is_empty()).then(|| Value::String(text.to_string()))
        }
        Extraction::ByEntityType(entity_type) => entity_type
            .entity_kind()
            .and_then(|kind| bundle.first_entity(kind))
            .map(|e| e.resolved()),
    }
}

/// Extract one parameter for a fresh utterance: raw value, validated, with the
/// default as fallback.
pub fn extract(spec: &ParameterSpec, bundle: &SignalBundle) -> Option<Value> {
    let extracted = extract_raw(spec, bundle)
        .filter(|v| !is_falsy(v))
        .filter(|v| match &spec.validator {
            Some(validator) => match validator.validate(v) {
                Ok(()) => true,
                Err(message) => {
                    debug!(param = %spec.name, %message, "Discarding invalid extracted value");
                    false
                }
            },
            None => true,
        });
    extracted.or_else(|| spec.resolve_default())
}

/// The validator's message when the utterance supplies a value for `spec`
/// that the validator rejects.
pub fn rejection(spec: &ParameterSpec, bundle: &SignalBundle) -> Option<String> {
    let validator = spec.validator.as_ref()?;
    let value = extract_raw(spec, bundle).filter(|v| !is_falsy(v))?;
    validator.validate(&value).err()
}

/// Extract every parameter of an intent from a fresh utterance.
pub fn extract_all(intent: &IntentDefinition, bundle: &SignalBundle) -> Params {
    let mut params = Params::new();
    for spec in &intent.parameters {
        if let Some(value) = extract(spec, bundle) {
            params.insert(spec.name.clone(), value);
        }
    }
    params
}

/// Overlay onto `params` whatever the bundle supplies for the intent's
/// parameters. Entity-typed and custom extraction only: an `any` parameter
/// would take the whole utterance.
pub fn overlay(intent: &IntentDefinition, bundle: &SignalBundle, params: &mut Params) {
    for spec in &intent.parameters {
        if matches!(spec.extraction, Extraction::ByEntityType(EntityType::Any)) {
            continue;
        }
        let Some(value) = extract_raw(spec, bundle).filter(|v| !is_falsy(v)) else {
            continue;
        };
        if let Some(validator) = &spec.validator {
            if validator.validate(&value).is_err() {
                continue;
            }
        }
        params.insert(spec.name.clone(), value);
    }
}

/// Fill in defaults for parameters absent from `params`.
pub fn apply_defaults(intent: &IntentDefinition, params: &mut Params) {
    for spec in &intent.parameters {
        let absent = params.get(&spec.name).is_none_or(is_falsy);
        if absent {
            if let Some(value) = spec.resolve_default() {
                params.insert(spec.name.clone(), value);
            }
        }
    }
}

pub fn is_missing(spec: &ParameterSpec, params: &Params) -> bool {
    spec.required && params.get(&spec.name).is_none_or(is_falsy)
}

/// The first required parameter, in declaration order, still missing.
pub fn next_missing<'a>(intent: &'a IntentDefinition, params: &Params) -> Option<&'a ParameterSpec> {
    intent.parameters.iter().find(|spec| is_missing(spec, params))
}

/// Read the answer to a prompt for `spec`.
pub fn answer(spec: &ParameterSpec, bundle: &SignalBundle) -> Result<Value, AnswerError> {
    let value = extract_raw(spec, bundle)
        .filter(|v| !is_falsy(v))
        .ok_or(AnswerError::Missing)?;
    if let Some(validator) = &spec.validator {
        validator.validate(&value).map_err(AnswerError::Invalid)?;
    }
    Ok(value)
}
