use serde_json::Value;

use super::ConvertError;

/// Longest chain of `$ref` → `$ref` hops followed before giving up.
const MAX_HOPS: usize = 32;

/// Returns the target of a `$ref` object, if `value` is one.
pub(super) fn reference(value: &Value) -> Option<&str> {
    value.get("$ref").and_then(Value::as_str)
}

/// Fails on the first `$ref` that points outside the document.
pub(super) fn ensure_bundled(value: &Value) -> Result<(), ConvertError> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(target)) = map.get("$ref") {
                if !target.starts_with('#') {
                    return Err(ConvertError::ExternalReference(target.clone()));
                }
            }
            map.values().try_for_each(ensure_bundled)
        }
        Value::Array(values) => values.iter().try_for_each(ensure_bundled),
        _ => Ok(()),
    }
}

/// Resolves internal references against the document root.
#[derive(Debug, Clone, Copy)]
pub(super) struct Resolver<'a> {
    root: &'a Value,
}

impl<'a> Resolver<'a> {
    pub(super) const fn new(root: &'a Value) -> Self {
        Self { root }
    }

    /// Looks up a `#/json/pointer` reference.
    pub(super) fn lookup(&self, target: &str) -> Result<&'a Value, ConvertError> {
        let pointer = target
            .strip_prefix('#')
            .ok_or_else(|| ConvertError::ExternalReference(target.to_string()))?;
        self.root
            .pointer(pointer)
            .ok_or_else(|| ConvertError::UnresolvedReference(target.to_string()))
    }

    /// Follows `value` through any chain of references.
    pub(super) fn resolve(&self, value: &'a Value) -> Result<&'a Value, ConvertError> {
        let mut current = value;
        for _ in 0..MAX_HOPS {
            match reference(current) {
                Some(target) => current = self.lookup(target)?,
                None => return Ok(current),
            }
        }
        Err(ConvertError::UnresolvedReference(
            reference(current).unwrap_or_default().to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn resolves_chained_references() {
        let root = json!({
            "components": {
                "schemas": {
                    "Alias": {"$ref": "#/components/schemas/Account"},
                    "Account": {"type": "object"}
                }
            }
        });
        let resolver = Resolver::new(&root);
        let alias = json!({"$ref": "#/components/schemas/Alias"});

        let resolved = resolver.resolve(&alias).unwrap();

        assert_eq!(resolved, &json!({"type": "object"}));
    }

    #[test]
    fn escaped_pointer_segments() {
        let root = json!({"paths": {"/accounts/{id}": {"get": {"summary": "x"}}}});
        let resolver = Resolver::new(&root);

        let operation = resolver.lookup("#/paths/~1accounts~1{id}/get").unwrap();

        assert_eq!(operation["summary"], "x");
    }

    #[test]
    fn missing_target_is_an_error() {
        let root = json!({});
        let error = Resolver::new(&root)
            .resolve(&json!({"$ref": "#/components/schemas/Nope"}))
            .unwrap_err();
        assert!(matches!(error, ConvertError::UnresolvedReference(target) if target == "#/components/schemas/Nope"));
    }

    #[test]
    fn self_reference_does_not_loop_forever() {
        let root = json!({"a": {"$ref": "#/a"}});
        let error = Resolver::new(&root).resolve(&root["a"]).unwrap_err();
        assert!(matches!(error, ConvertError::UnresolvedReference(_)));
    }

    #[test]
    fn external_reference_is_rejected() {
        let document = json!({
            "paths": {
                "/a": {"get": {"responses": {"200": {"$ref": "responses.yaml#/Ok"}}}}
            }
        });
        let error = ensure_bundled(&document).unwrap_err();
        assert!(matches!(error, ConvertError::ExternalReference(target) if target == "responses.yaml#/Ok"));
    }

    #[test]
    fn internal_references_are_bundled() {
        let document = json!({"a": [{"$ref": "#/b"}], "b": 1});
        assert!(ensure_bundled(&document).is_ok());
    }
}
