use serde_json::{Map, Value};

use crate::error::AppError;

/// Per-request context threaded through a validator chain. The record
/// resolved by the existence guard travels here explicitly rather than
/// through a side channel, so every step sees the same inputs.
pub struct RequestCtx<'a, T> {
    pub data: &'a Value,
    pub path_id: Option<&'a str>,
    pub record: Option<&'a T>,
}

impl<'a, T> RequestCtx<'a, T> {
    pub fn for_create(data: &'a Value) -> Self {
        Self {
            data,
            path_id: None,
            record: None,
        }
    }

    pub fn for_record(data: &'a Value, path_id: &'a str, record: &'a T) -> Self {
        Self {
            data,
            path_id: Some(path_id),
            record: Some(record),
        }
    }
}

type Step<T> = Box<dyn Fn(&RequestCtx<'_, T>) -> Result<(), AppError> + Send + Sync>;

/// An ordered list of validator steps run ahead of a terminal handler.
/// The first failing step short-circuits the rest, so a terminal handler
/// never runs against a payload that failed validation.
pub struct Pipeline<T> {
    steps: Vec<Step<T>>,
}

impl<T> Pipeline<T> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn step<F>(mut self, step: F) -> Self
    where
        F: Fn(&RequestCtx<'_, T>) -> Result<(), AppError> + Send + Sync + 'static,
    {
        self.steps.push(Box::new(step));
        self
    }

    pub fn run(&self, ctx: &RequestCtx<'_, T>) -> Result<(), AppError> {
        self.steps.iter().try_for_each(|step| step(ctx))
    }
}

impl<T> Default for Pipeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Text,
    Integer,
    List,
}

/// A required payload field together with the presence rule its kind
/// implies. Zero numbers and empty strings count as missing; an empty
/// list counts as present (list emptiness is a domain rule, not a
/// presence rule).
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Integer,
        }
    }

    pub const fn list(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::List,
        }
    }

    pub fn is_present_in(self, data: &Value) -> bool {
        match (self.kind, data.get(self.name)) {
            (_, None) => false,
            (FieldKind::Text, Some(value)) => value.as_str().is_some_and(|s| !s.is_empty()),
            (FieldKind::Integer, Some(value)) => value.as_f64().is_some_and(|n| n != 0.0),
            (FieldKind::List, Some(value)) => value.is_array(),
        }
    }
}

/// Presence validator for one required field; resource names the entity
/// in the error message ("Dish must include a name").
pub fn require<T>(
    resource: &'static str,
    field: Field,
) -> impl Fn(&RequestCtx<'_, T>) -> Result<(), AppError> + Send + Sync {
    move |ctx| {
        if field.is_present_in(ctx.data) {
            Ok(())
        } else {
            Err(AppError::BadRequest(format!(
                "{resource} must include a {}",
                field.name
            )))
        }
    }
}

/// Path/body id consistency for updates: a truthy body id must match the
/// route id; a missing or falsy one is accepted.
pub fn id_matches_route<T>(
    resource: &'static str,
) -> impl Fn(&RequestCtx<'_, T>) -> Result<(), AppError> + Send + Sync {
    move |ctx| {
        let route_id = ctx.path_id.unwrap_or_default();
        match ctx.data.get("id") {
            Some(id) if truthy(id) => {
                let body_id = render_id(id);
                if body_id == route_id {
                    Ok(())
                } else {
                    Err(AppError::BadRequest(format!(
                        "{resource} id does not match route id. {resource}: {body_id}, Route: {route_id}"
                    )))
                }
            }
            _ => Ok(()),
        }
    }
}

/// JavaScript-style truthiness over JSON values: `null`, `false`, `0` and
/// `""` are falsy; everything else, including empty arrays and objects,
/// is truthy.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The `data` member of a request body, defaulting to an empty object
/// when the body carries none.
pub fn payload_data(body: &Value) -> Value {
    body.get("data").cloned().unwrap_or(Value::Object(Map::new()))
}

pub fn text_field(data: &Value, name: &str) -> String {
    data.get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

pub fn int_field(data: &Value, name: &str) -> i64 {
    data.get(name).and_then(Value::as_i64).unwrap_or_default()
}

fn render_id(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
