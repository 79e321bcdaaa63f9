//! Example resolution and deterministic schema faking.
//!
//! Fakes never use randomness: the same schema always produces the same
//! value, which keeps regenerated collections byte-identical.

use serde_json::{Map, Number, Value};

use super::{
    ConvertError, Warnings,
    refs::{Resolver, reference},
};
use crate::domain::ParameterResolution;

/// Schemas nested deeper than this are truncated.
const MAX_DEPTH: usize = 12;

/// Which side of the exchange a value is faked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Direction {
    /// Skips `readOnly` properties.
    Request,
    /// Skips `writeOnly` properties.
    Response,
}

#[derive(Debug, Clone, Copy)]
pub(super) struct Faker<'a> {
    resolver: Resolver<'a>,
    resolution: ParameterResolution,
    enabled: bool,
    direction: Direction,
}

impl<'a> Faker<'a> {
    pub(super) const fn new(
        resolver: Resolver<'a>,
        resolution: ParameterResolution,
        enabled: bool,
        direction: Direction,
    ) -> Self {
        Self {
            resolver,
            resolution,
            enabled,
            direction,
        }
    }

    /// The authored example of a parameter, header or media type object:
    /// `example`, then the first entry of `examples`.
    ///
    /// Always `None` under [`ParameterResolution::Schema`].
    pub(super) fn authored(&self, object: &'a Value) -> Result<Option<&'a Value>, ConvertError> {
        if self.resolution == ParameterResolution::Schema {
            return Ok(None);
        }
        if let Some(example) = object.get("example") {
            return Ok(Some(example));
        }
        let Some(Value::Object(examples)) = object.get("examples") else {
            return Ok(None);
        };
        match examples.values().next() {
            Some(first) => Ok(self.resolver.resolve(first)?.get("value")),
            None => Ok(None),
        }
    }

    /// Example value of a parameter object, rendered as text.
    pub(super) fn parameter(
        &self,
        parameter: &'a Value,
        warnings: &mut Warnings,
    ) -> Result<String, ConvertError> {
        if let Some(example) = self.authored(parameter)? {
            return Ok(to_text(example));
        }
        if let Some(schema) = parameter.get("schema") {
            return Ok(to_text(&self.schema(schema, warnings)?));
        }
        if let Some(Value::Object(content)) = parameter.get("content") {
            if let Some(media) = content.values().next() {
                return Ok(to_text(&self.media(media, warnings)?));
            }
        }
        Ok(self.scalar_placeholder("string"))
    }

    /// Example value of a media type object; `Null` when it has neither an
    /// example nor a schema.
    pub(super) fn media(&self, media: &'a Value, warnings: &mut Warnings) -> Result<Value, ConvertError> {
        if let Some(example) = self.authored(media)? {
            return Ok(example.clone());
        }
        match media.get("schema") {
            Some(schema) => self.schema(schema, warnings),
            None => Ok(Value::Null),
        }
    }

    /// Synthesizes a value from a schema.
    pub(super) fn schema(&self, schema: &'a Value, warnings: &mut Warnings) -> Result<Value, ConvertError> {
        let mut stack = Vec::new();
        self.fake(schema, &mut stack, warnings)
    }

    fn fake(
        &self,
        schema: &'a Value,
        stack: &mut Vec<&'a str>,
        warnings: &mut Warnings,
    ) -> Result<Value, ConvertError> {
        if let Some(target) = reference(schema) {
            if stack.contains(&target) {
                warnings.push(format!("circular reference to '{target}' was truncated"));
                return Ok(Value::String(format!("<Circular reference to {target}>")));
            }
            let resolved = self.resolver.lookup(target)?;
            stack.push(target);
            let value = self.fake(resolved, stack, warnings);
            stack.pop();
            return value;
        }

        if stack.len() > MAX_DEPTH {
            warnings.push(format!("schema nesting deeper than {MAX_DEPTH} levels was truncated"));
            return Ok(Value::Null);
        }

        let Value::Object(map) = schema else {
            // `true` / `false` schemas from OpenAPI 3.1
            return Ok(Value::String(self.scalar_placeholder("string")));
        };

        if self.resolution == ParameterResolution::Example {
            if let Some(example) = map.get("example") {
                return Ok(example.clone());
            }
            if let Some(Value::Array(examples)) = map.get("examples") {
                if let Some(first) = examples.first() {
                    return Ok(first.clone());
                }
            }
        }
        if let Some(value) = map.get("const").or_else(|| map.get("default")) {
            return Ok(value.clone());
        }
        if let Some(Value::Array(variants)) = map.get("enum") {
            if let Some(first) = variants.first() {
                return Ok(first.clone());
            }
        }

        if map.contains_key("not") {
            warnings.push("unsupported schema construct 'not' was ignored");
        }

        if let Some(Value::Array(parts)) = map.get("allOf") {
            return self.all_of(map, parts, stack, warnings);
        }
        if let Some(Value::Array(branches)) = map.get("oneOf").or_else(|| map.get("anyOf")) {
            if let Some(first) = branches.first() {
                return self.fake(first, stack, warnings);
            }
        }

        match schema_type(map) {
            Some("object") => self.object(map, stack, warnings),
            Some("array") => self.array(map, stack, warnings),
            Some("string") => Ok(self.string(map)),
            Some("integer") => Ok(self.integer(map)),
            Some("number") => Ok(self.number(map)),
            Some("boolean") => Ok(if self.enabled {
                Value::Bool(true)
            } else {
                Value::String(self.scalar_placeholder("boolean"))
            }),
            Some("null") => Ok(Value::Null),
            Some(other) => {
                warnings.push(format!("unknown schema type '{other}' was faked as a string"));
                Ok(Value::String(self.scalar_placeholder("string")))
            }
            None if map.contains_key("properties") || map.contains_key("additionalProperties") => {
                self.object(map, stack, warnings)
            }
            None if map.contains_key("items") => self.array(map, stack, warnings),
            None => Ok(Value::String(self.scalar_placeholder("string"))),
        }
    }

    fn all_of(
        &self,
        map: &'a Map<String, Value>,
        parts: &'a [Value],
        stack: &mut Vec<&'a str>,
        warnings: &mut Warnings,
    ) -> Result<Value, ConvertError> {
        let mut merged = Map::new();
        for part in parts {
            match self.fake(part, stack, warnings)? {
                Value::Object(fields) => merged.extend(fields),
                other if merged.is_empty() && parts.len() == 1 => return Ok(other),
                _ => warnings.push("non-object 'allOf' member was ignored"),
            }
        }
        if let Value::Object(own) = self.object(map, stack, warnings)? {
            merged.extend(own);
        }
        Ok(Value::Object(merged))
    }

    fn object(
        &self,
        map: &'a Map<String, Value>,
        stack: &mut Vec<&'a str>,
        warnings: &mut Warnings,
    ) -> Result<Value, ConvertError> {
        let mut fields = Map::new();
        if let Some(Value::Object(properties)) = map.get("properties") {
            for (name, property) in properties {
                if self.skipped(self.resolver.resolve(property)?) {
                    continue;
                }
                fields.insert(name.clone(), self.fake(property, stack, warnings)?);
            }
        }
        if fields.is_empty() {
            if let Some(additional @ Value::Object(_)) = map.get("additionalProperties") {
                fields.insert("key".to_string(), self.fake(additional, stack, warnings)?);
            }
        }
        Ok(Value::Object(fields))
    }

    fn skipped(&self, property: &Value) -> bool {
        let flag = match self.direction {
            Direction::Request => "readOnly",
            Direction::Response => "writeOnly",
        };
        property.get(flag).and_then(Value::as_bool).unwrap_or(false)
    }

    fn array(
        &self,
        map: &'a Map<String, Value>,
        stack: &mut Vec<&'a str>,
        warnings: &mut Warnings,
    ) -> Result<Value, ConvertError> {
        let Some(items) = map.get("items") else {
            return Ok(Value::Array(Vec::new()));
        };
        let min = usize_field(map, "minItems").unwrap_or(1).max(1);
        let count = usize_field(map, "maxItems").map_or(min, |max| min.min(max));
        let item = self.fake(items, stack, warnings)?;
        Ok(Value::Array(vec![item; count]))
    }

    fn string(&self, map: &Map<String, Value>) -> Value {
        if !self.enabled {
            return Value::String(self.scalar_placeholder("string"));
        }
        let mut text = match map.get("format").and_then(Value::as_str) {
            Some("date-time") => "2024-01-01T00:00:00Z",
            Some("date") => "2024-01-01",
            Some("time") => "00:00:00",
            Some("email") => "user@example.com",
            Some("uuid") => "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            Some("uri" | "url") => "https://example.com",
            Some("hostname") => "example.com",
            Some("ipv4") => "192.0.2.1",
            Some("ipv6") => "2001:db8::1",
            Some("byte") => "c3RyaW5n",
            Some("binary") => "<binary>",
            Some("password") => "********",
            _ => "string",
        }
        .to_string();

        if let Some(min) = usize_field(map, "minLength") {
            while text.len() < min {
                text.push('x');
            }
        }
        if let Some(max) = usize_field(map, "maxLength") {
            text.truncate(max);
        }
        Value::String(text)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn integer(&self, map: &Map<String, Value>) -> Value {
        if !self.enabled {
            return Value::String(self.scalar_placeholder("integer"));
        }
        let (lower, upper) = bounds(map, 1.0);
        let mut value = 0.0_f64;
        if let Some(lower) = lower {
            value = value.max(lower.ceil());
        }
        if let Some(upper) = upper {
            value = value.min(upper.floor());
        }
        Value::from(value as i64)
    }

    fn number(&self, map: &Map<String, Value>) -> Value {
        if !self.enabled {
            return Value::String(self.scalar_placeholder("number"));
        }
        let (lower, upper) = bounds(map, 1.0);
        let mut value = 0.0_f64;
        if let Some(lower) = lower {
            value = value.max(lower);
        }
        if let Some(upper) = upper {
            value = value.min(upper);
        }
        Number::from_f64(value).map_or_else(|| Value::from(0), Value::Number)
    }

    fn scalar_placeholder(&self, kind: &str) -> String {
        if self.enabled {
            kind.to_string()
        } else {
            format!("<{kind}>")
        }
    }
}

/// The declared type; the first non-null entry of an OpenAPI 3.1 type array.
fn schema_type(map: &Map<String, Value>) -> Option<&str> {
    match map.get("type")? {
        Value::String(kind) => Some(kind),
        Value::Array(kinds) => kinds
            .iter()
            .filter_map(Value::as_str)
            .find(|kind| *kind != "null")
            .or_else(|| kinds.first().and_then(Value::as_str)),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn usize_field(map: &Map<String, Value>, key: &str) -> Option<usize> {
    map.get(key).and_then(Value::as_u64).map(|n| n as usize)
}

/// Inclusive numeric bounds, widening exclusive bounds by `step`.
///
/// Handles both the OpenAPI 3.0 boolean and the 3.1 numeric form of
/// `exclusiveMinimum` / `exclusiveMaximum`.
fn bounds(map: &Map<String, Value>, step: f64) -> (Option<f64>, Option<f64>) {
    let bound = |inclusive: &str, exclusive: &str, direction: f64| match map.get(exclusive) {
        Some(Value::Number(limit)) => limit.as_f64().map(|limit| limit + direction * step),
        Some(Value::Bool(true)) => map
            .get(inclusive)
            .and_then(Value::as_f64)
            .map(|limit| limit + direction * step),
        _ => map.get(inclusive).and_then(Value::as_f64),
    };
    (
        bound("minimum", "exclusiveMinimum", 1.0),
        bound("maximum", "exclusiveMaximum", -1.0),
    )
}

/// Renders a value the way it appears in a URL or header.
pub(super) fn to_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(to_text).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}
