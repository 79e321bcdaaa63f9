use serde_json::{Map, Value};

use super::{ConvertError, Warnings, refs::Resolver};
use crate::postman::{Auth, AuthAttribute, Variable};

/// Maps OpenAPI security requirements onto Postman auth blocks.
///
/// Every token or credential is a `{{variable}}` reference; the variables are
/// declared on the collection with placeholder values so that imported
/// requests carry ready-to-fill credentials.
#[derive(Debug, Clone, Copy)]
pub(super) struct SecuritySchemes<'a> {
    schemes: Option<&'a Map<String, Value>>,
    resolver: Resolver<'a>,
}

impl<'a> SecuritySchemes<'a> {
    pub(super) fn new(document: &'a Value, resolver: Resolver<'a>) -> Self {
        Self {
            schemes: document
                .pointer("/components/securitySchemes")
                .and_then(Value::as_object),
            resolver,
        }
    }

    /// The auth block for a `security` requirement list.
    ///
    /// An empty list, or a list whose first requirement is `{}`, is an
    /// explicitly unauthenticated operation. Returns `None` when the scheme
    /// cannot be expressed.
    pub(super) fn auth(
        &self,
        requirements: &Value,
        variables: &mut Vec<Variable>,
        warnings: &mut Warnings,
    ) -> Result<Option<Auth>, ConvertError> {
        let Value::Array(requirements) = requirements else {
            return Err(ConvertError::Invalid {
                what: "security requirement list",
                location: "security".to_string(),
            });
        };
        let Some(first) = requirements.first() else {
            return Ok(Some(Auth::Noauth));
        };
        let Some(requirement) = first.as_object() else {
            return Err(ConvertError::Invalid {
                what: "security requirement",
                location: "security".to_string(),
            });
        };
        let Some(name) = requirement.keys().next() else {
            return Ok(Some(Auth::Noauth));
        };
        if requirements.len() > 1 || requirement.len() > 1 {
            warnings.push(format!(
                "only security scheme '{name}' is used where several are allowed or required"
            ));
        }

        let Some(scheme) = self.schemes.and_then(|schemes| schemes.get(name)) else {
            warnings.push(format!("security scheme '{name}' is not defined"));
            return Ok(None);
        };
        let scheme = self.resolver.resolve(scheme)?;
        Ok(map_scheme(name, scheme, variables, warnings))
    }
}

fn map_scheme(
    name: &str,
    scheme: &Value,
    variables: &mut Vec<Variable>,
    warnings: &mut Warnings,
) -> Option<Auth> {
    let field = |key| string_field(scheme, key);

    match field("type") {
        "http" => match field("scheme").to_ascii_lowercase().as_str() {
            "bearer" => {
                declare(variables, "bearerToken", "<Bearer Token>");
                Some(Auth::Bearer {
                    bearer: vec![AuthAttribute::new("token", "{{bearerToken}}")],
                })
            }
            "basic" => {
                declare(variables, "basicAuthUsername", "<Basic Auth Username>");
                declare(variables, "basicAuthPassword", "<Basic Auth Password>");
                Some(Auth::Basic {
                    basic: vec![
                        AuthAttribute::new("username", "{{basicAuthUsername}}"),
                        AuthAttribute::new("password", "{{basicAuthPassword}}"),
                    ],
                })
            }
            other => {
                warnings.push(format!(
                    "HTTP auth scheme '{other}' of security scheme '{name}' is not supported"
                ));
                None
            }
        },
        "apiKey" => match field("in") {
            location @ ("header" | "query") => {
                declare(variables, "apiKey", "<API Key>");
                Some(Auth::Apikey {
                    apikey: vec![
                        AuthAttribute::new("key", field("name")),
                        AuthAttribute::new("value", "{{apiKey}}"),
                        AuthAttribute::new("in", location),
                    ],
                })
            }
            other => {
                warnings.push(format!(
                    "API key location '{other}' of security scheme '{name}' is not supported"
                ));
                None
            }
        },
        "oauth2" | "openIdConnect" => {
            declare(variables, "oauth2AccessToken", "<OAuth2 Access Token>");
            Some(Auth::Oauth2 {
                oauth2: vec![
                    AuthAttribute::new("accessToken", "{{oauth2AccessToken}}"),
                    AuthAttribute::new("addTokenTo", "header"),
                ],
            })
        }
        other => {
            warnings.push(format!(
                "security scheme '{name}' has unsupported type '{other}'"
            ));
            None
        }
    }
}

fn string_field<'v>(object: &'v Value, key: &str) -> &'v str {
    object.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn declare(variables: &mut Vec<Variable>, key: &str, placeholder: &str) {
    if !variables.iter().any(|variable| variable.key == key) {
        variables.push(Variable::new(key, placeholder));
    }
}
