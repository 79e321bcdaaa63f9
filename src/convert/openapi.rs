//! The built-in OpenAPI 3.x converter.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::{
    Conversion, ConvertError, Converter, Warnings,
    auth::SecuritySchemes,
    faker::{Direction, Faker, to_text},
    refs::{self, Resolver},
};
use crate::{
    domain::{ConvertOptions, FolderStrategy, RequestNameSource},
    postman::{
        self, Auth, Body, Collection, Entry, Folder, FormField, Header, Info, Item, PathVariable,
        QueryParam, Request, Response, Url, Variable,
    },
};

/// Path item keys that hold operations.
const METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Header parameters that OpenAPI says must be ignored.
const RESERVED_HEADERS: [&str; 3] = ["accept", "content-type", "authorization"];

static PATH_TEMPLATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("path template pattern is valid"));

/// Converts OpenAPI 3.0 and 3.1 documents (YAML or JSON).
///
/// Conversion is deterministic: the only field that differs between two
/// conversions of the same document is the collection id.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenApiConverter;

impl Converter for OpenApiConverter {
    fn convert(&self, document: &str, options: &ConvertOptions) -> Result<Conversion, ConvertError> {
        let document: Value = serde_yaml::from_str(document)?;
        if !document.is_object() {
            return Err(ConvertError::NotAMapping);
        }

        let version = match document.get("openapi") {
            Some(Value::String(version)) => Some(version.clone()),
            Some(Value::Number(version)) => Some(version.to_string()),
            _ => None,
        };
        match version {
            Some(version) if version.starts_with("3.") => {}
            Some(version) => {
                return Ok(Conversion::rejected(format!(
                    "unsupported OpenAPI version '{version}'"
                )));
            }
            None if document.get("swagger").is_some() => {
                return Ok(Conversion::rejected(
                    "Swagger 2.0 documents are not supported; convert to OpenAPI 3 first",
                ));
            }
            None => {
                return Ok(Conversion::rejected(
                    "document has no 'openapi' version field",
                ));
            }
        }

        refs::ensure_bundled(&document)?;

        let mut warnings = Warnings::default();
        let collection = Builder::new(&document, options).build(&mut warnings)?;
        tracing::debug!(
            requests = collection.items().count(),
            folders = collection.folders().count(),
            "converted API description"
        );

        Ok(Conversion {
            collection: Some(collection),
            reason: None,
            warnings: warnings.into_vec(),
        })
    }
}

/// One operation of the description, with the path item it belongs to.
struct Operation<'a> {
    path: &'a str,
    method: &'a str,
    path_item: &'a Map<String, Value>,
    operation: &'a Map<String, Value>,
}

impl Operation<'_> {
    fn label(&self) -> String {
        format!("{} {}", self.method.to_ascii_uppercase(), self.path)
    }

    fn string(&self, key: &str) -> Option<&str> {
        self.operation
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    fn tags(&self) -> Vec<&str> {
        self.operation
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

struct Builder<'a> {
    document: &'a Value,
    options: &'a ConvertOptions,
    resolver: Resolver<'a>,
    schemes: SecuritySchemes<'a>,
    request_faker: Faker<'a>,
    example_faker: Faker<'a>,
}

impl<'a> Builder<'a> {
    fn new(document: &'a Value, options: &'a ConvertOptions) -> Self {
        let resolver = Resolver::new(document);
        Self {
            document,
            options,
            resolver,
            schemes: SecuritySchemes::new(document, resolver),
            request_faker: Faker::new(
                resolver,
                options.request_parameters,
                options.schema_faker,
                Direction::Request,
            ),
            example_faker: Faker::new(
                resolver,
                options.example_parameters,
                options.schema_faker,
                Direction::Response,
            ),
        }
    }

    fn build(&self, warnings: &mut Warnings) -> Result<Collection, ConvertError> {
        let info = self.document.get("info");
        let title = info
            .and_then(|info| info.get("title"))
            .and_then(Value::as_str)
            .unwrap_or("API");
        let description = info
            .and_then(|info| info.get("description"))
            .and_then(Value::as_str)
            .map(ToString::to_string);

        let mut variables = vec![Variable::new("baseUrl", self.base_url())];
        let collection_auth = match self.document.get("security") {
            Some(requirements) => self.schemes.auth(requirements, &mut variables, warnings)?,
            None => None,
        };

        let mut folders = self.declared_tags();
        let mut ungrouped = Vec::new();

        for operation in self.operations(warnings)? {
            let item = self.item(&operation, collection_auth.as_ref(), &mut variables, warnings)?;
            let tags = operation.tags();

            match (self.options.folder_strategy, tags.first()) {
                (FolderStrategy::Tags, Some(tag)) => {
                    if tags.len() > 1 {
                        warnings.push(format!(
                            "operation '{}' has several tags and is only placed under '{tag}'",
                            operation.label()
                        ));
                    }
                    folder_for(&mut folders, tag).item.push(item);
                }
                _ => ungrouped.push(item),
            }
        }

        let item = folders
            .into_iter()
            .filter(|folder| !folder.item.is_empty())
            .map(Entry::Folder)
            .chain(ungrouped.into_iter().map(Entry::Item))
            .collect();

        Ok(Collection {
            info: Info::new(title.to_string(), description),
            item,
            auth: collection_auth,
            variable: variables,
        })
    }

    /// Folders for the top level `tags`, in declaration order.
    fn declared_tags(&self) -> Vec<Folder> {
        self.document
            .get("tags")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|tag| {
                let name = tag.get("name")?.as_str()?;
                Some(Folder {
                    name: name.to_string(),
                    description: tag
                        .get("description")
                        .and_then(Value::as_str)
                        .map(ToString::to_string),
                    item: Vec::new(),
                })
            })
            .collect()
    }

    /// The first server URL with its variables substituted.
    fn base_url(&self) -> String {
        let Some(server) = self
            .document
            .get("servers")
            .and_then(Value::as_array)
            .and_then(|servers| servers.first())
        else {
            return "/".to_string();
        };

        let mut url = server
            .get("url")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if let Some(Value::Object(variables)) = server.get("variables") {
            for (name, variable) in variables {
                if let Some(default) = variable.get("default") {
                    url = url.replace(&format!("{{{name}}}"), &to_text(default));
                }
            }
        }

        let trimmed = url.trim_end_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Every operation, in description order.
    fn operations(&self, warnings: &mut Warnings) -> Result<Vec<Operation<'a>>, ConvertError> {
        let paths = match self.document.get("paths") {
            None => return Ok(Vec::new()),
            Some(Value::Object(paths)) => paths,
            Some(_) => {
                return Err(ConvertError::Invalid {
                    what: "paths object",
                    location: "paths".to_string(),
                });
            }
        };

        let mut operations = Vec::new();
        for (path, path_item) in paths {
            let path_item =
                self.resolver
                    .resolve(path_item)?
                    .as_object()
                    .ok_or_else(|| ConvertError::Invalid {
                        what: "path item",
                        location: path.clone(),
                    })?;
            if path_item.contains_key("servers") {
                warnings.push(format!(
                    "servers declared on path '{path}' are ignored; requests use {{{{baseUrl}}}}"
                ));
            }

            for (method, operation) in path_item {
                if !METHODS.contains(&method.as_str()) {
                    continue;
                }
                let operation = operation.as_object().ok_or_else(|| ConvertError::Invalid {
                    what: "operation",
                    location: format!("{} {path}", method.to_ascii_uppercase()),
                })?;
                let operation = Operation {
                    path,
                    method,
                    path_item,
                    operation,
                };
                if operation.operation.contains_key("servers") {
                    warnings.push(format!(
                        "servers declared on operation '{}' are ignored; requests use {{{{baseUrl}}}}",
                        operation.label()
                    ));
                }
                operations.push(operation);
            }
        }
        Ok(operations)
    }

    fn item(
        &self,
        operation: &Operation<'a>,
        collection_auth: Option<&Auth>,
        variables: &mut Vec<Variable>,
        warnings: &mut Warnings,
    ) -> Result<Item, ConvertError> {
        let parameters = self.parameters(operation)?;

        let mut query = Vec::new();
        let mut declared_path = Vec::new();
        let mut header = Vec::new();
        let mut cookies = Vec::new();

        for parameter in parameters.iter().copied() {
            let name = string_field(parameter, "name");
            let value = self.request_faker.parameter(parameter, warnings)?;
            let description = describe(parameter);

            match string_field(parameter, "in") {
                "path" => declared_path.push((name, value, description)),
                "query" => query.push(QueryParam {
                    key: name.to_string(),
                    value,
                    description,
                }),
                "header" if RESERVED_HEADERS.contains(&name.to_ascii_lowercase().as_str()) => {}
                "header" => header.push(Header {
                    key: name.to_string(),
                    value,
                    description,
                }),
                "cookie" => cookies.push(format!("{name}={value}")),
                other => {
                    return Err(ConvertError::Invalid {
                        what: "parameter location",
                        location: format!("{} ({other})", operation.label()),
                    });
                }
            }
        }
        if !cookies.is_empty() {
            header.push(Header::new("Cookie", cookies.join("; ")));
        }

        let url = build_url(operation, query, declared_path, warnings);

        let body = match operation.operation.get("requestBody") {
            Some(request_body) => self.body(operation, request_body, &mut header, warnings)?,
            None => None,
        };
        if let Some(accept) = self.accept(operation)? {
            header.push(Header::new("Accept", accept));
        }

        let operation_auth = match operation.operation.get("security") {
            Some(requirements) => self.schemes.auth(requirements, variables, warnings)?,
            None => None,
        };
        let effective_auth = if operation.operation.contains_key("security") {
            operation_auth.clone()
        } else {
            collection_auth.cloned()
        };

        let request = Request {
            auth: operation_auth.filter(|auth| Some(auth) != collection_auth),
            method: operation.method.to_ascii_uppercase(),
            header,
            body,
            url,
            description: operation.string("description").map(ToString::to_string),
        };

        let mut example_request = request.clone();
        example_request.auth = if self.options.include_auth_info_in_example {
            effective_auth
        } else {
            None
        };
        let response = self.responses(operation, &example_request, warnings)?;

        Ok(Item {
            name: self.request_name(operation),
            request,
            response,
        })
    }

    fn request_name(&self, operation: &Operation<'_>) -> String {
        match self.options.request_name_source {
            RequestNameSource::Fallback => operation
                .string("summary")
                .or_else(|| operation.string("operationId"))
                .map_or_else(|| operation.label(), ToString::to_string),
            RequestNameSource::Url => operation.path.to_string(),
        }
    }

    /// Path item parameters merged with operation parameters; the operation
    /// wins when both declare the same name and location.
    fn parameters(&self, operation: &Operation<'a>) -> Result<Vec<&'a Value>, ConvertError> {
        let mut merged: Vec<&'a Value> = Vec::new();
        let lists = [
            operation.path_item.get("parameters"),
            operation.operation.get("parameters"),
        ];

        for list in lists.into_iter().flatten() {
            let Value::Array(list) = list else {
                return Err(ConvertError::Invalid {
                    what: "parameter list",
                    location: operation.label(),
                });
            };
            for parameter in list {
                let parameter = self.resolver.resolve(parameter)?;
                let key = parameter_key(parameter);
                if key.0.is_empty() || key.1.is_empty() {
                    return Err(ConvertError::Invalid {
                        what: "parameter",
                        location: operation.label(),
                    });
                }
                match merged.iter().position(|existing| parameter_key(existing) == key) {
                    Some(index) => merged[index] = parameter,
                    None => merged.push(parameter),
                }
            }
        }
        Ok(merged)
    }

    fn body(
        &self,
        operation: &Operation<'_>,
        request_body: &'a Value,
        header: &mut Vec<Header>,
        warnings: &mut Warnings,
    ) -> Result<Option<Body>, ConvertError> {
        let request_body = self.resolver.resolve(request_body)?;
        let Some((media_type, media)) = request_body
            .get("content")
            .and_then(Value::as_object)
            .and_then(preferred_media)
        else {
            return Ok(None);
        };

        header.push(Header::new("Content-Type", media_type.as_str()));
        let example = self.request_faker.media(media, warnings)?;
        let kind = essence(media_type);

        let body = match kind.as_str() {
            "application/x-www-form-urlencoded" | "multipart/form-data" => {
                let Value::Object(fields) = &example else {
                    warnings.push(format!(
                        "form body of '{}' has no object example and was sent as text",
                        operation.label()
                    ));
                    return Ok(Some(Body::raw(to_text(&example), "text")));
                };
                if kind == "multipart/form-data" {
                    let binary = self.binary_fields(media)?;
                    Body::Formdata {
                        formdata: fields
                            .iter()
                            .map(|(key, value)| form_field(key, value, binary.contains(&key.as_str())))
                            .collect(),
                    }
                } else {
                    Body::Urlencoded {
                        urlencoded: fields
                            .iter()
                            .map(|(key, value)| form_field(key, value, false))
                            .collect(),
                    }
                }
            }
            _ => self.raw_body(operation, &kind, &example, warnings),
        };
        Ok(Some(body))
    }

    fn raw_body(
        &self,
        operation: &Operation<'_>,
        essence: &str,
        example: &Value,
        warnings: &mut Warnings,
    ) -> Body {
        let json = is_json(essence);
        let xml = essence.ends_with("xml");
        match example {
            Value::String(text) => {
                let language = if json {
                    "json"
                } else if xml {
                    "xml"
                } else {
                    "text"
                };
                Body::raw(text.clone(), language)
            }
            _ if json => Body::raw(self.pretty(example), "json"),
            _ => {
                if xml {
                    warnings.push(format!(
                        "XML body of '{}' is rendered as JSON text",
                        operation.label()
                    ));
                }
                Body::raw(self.pretty(example), "text")
            }
        }
    }

    /// Names of `format: binary` properties of a multipart schema.
    fn binary_fields(&self, media: &'a Value) -> Result<Vec<&'a str>, ConvertError> {
        let Some(schema) = media.get("schema") else {
            return Ok(Vec::new());
        };
        let schema = self.resolver.resolve(schema)?;
        let Some(Value::Object(properties)) = schema.get("properties") else {
            return Ok(Vec::new());
        };

        let mut binary = Vec::new();
        for (name, property) in properties {
            let property = self.resolver.resolve(property)?;
            let format = property
                .get("format")
                .or_else(|| property.pointer("/items/format"))
                .and_then(Value::as_str);
            if format == Some("binary") {
                binary.push(name.as_str());
            }
        }
        Ok(binary)
    }

    /// Media type of the first response that declares content.
    fn accept(&self, operation: &Operation<'_>) -> Result<Option<String>, ConvertError> {
        let Some(Value::Object(responses)) = operation.operation.get("responses") else {
            return Ok(None);
        };
        for response in responses.values() {
            let response = self.resolver.resolve(response)?;
            if let Some((media_type, _)) = response
                .get("content")
                .and_then(Value::as_object)
                .and_then(preferred_media)
            {
                return Ok(Some(media_type.clone()));
            }
        }
        Ok(None)
    }

    fn responses(
        &self,
        operation: &Operation<'a>,
        original_request: &Request,
        warnings: &mut Warnings,
    ) -> Result<Vec<Response>, ConvertError> {
        let Some(Value::Object(responses)) = operation.operation.get("responses") else {
            return Ok(Vec::new());
        };

        let mut saved = Vec::new();
        for (code, response) in responses {
            let Some(status) = status_code(code) else {
                warnings.push(format!(
                    "response '{code}' of '{}' has an invalid status code and was skipped",
                    operation.label()
                ));
                continue;
            };
            let response = self.resolver.resolve(response)?;

            let mut header = Vec::new();
            if let Some(Value::Object(headers)) = response.get("headers") {
                for (name, declared) in headers {
                    let declared = self.resolver.resolve(declared)?;
                    header.push(Header::new(
                        name.as_str(),
                        self.example_faker.parameter(declared, warnings)?,
                    ));
                }
            }

            let (body, preview_language) = match response
                .get("content")
                .and_then(Value::as_object)
                .and_then(preferred_media)
            {
                Some((media_type, media)) => {
                    header.insert(0, Header::new("Content-Type", media_type.as_str()));
                    let example = self.example_faker.media(media, warnings)?;
                    let json = is_json(&essence(media_type));
                    let body = match &example {
                        Value::String(text) => text.clone(),
                        Value::Null => String::new(),
                        other => self.pretty(other),
                    };
                    (body, if json { "json" } else { "text" })
                }
                None => (String::new(), "text"),
            };

            saved.push(Response {
                name: response
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|description| !description.is_empty())
                    .unwrap_or_else(|| reason_phrase(status))
                    .to_string(),
                original_request: original_request.clone(),
                status: reason_phrase(status).to_string(),
                code: status,
                preview_language: preview_language.to_string(),
                header,
                cookie: Vec::new(),
                body,
            });
        }
        Ok(saved)
    }

    fn pretty(&self, value: &Value) -> String {
        postman::to_string_indented(value, &self.options.indent).unwrap_or_else(|_| value.to_string())
    }
}

fn folder_for<'f>(folders: &'f mut Vec<Folder>, tag: &str) -> &'f mut Folder {
    let index = match folders.iter().position(|folder| folder.name == tag) {
        Some(index) => index,
        None => {
            folders.push(Folder {
                name: tag.to_string(),
                description: None,
                item: Vec::new(),
            });
            folders.len() - 1
        }
    };
    &mut folders[index]
}

/// Builds the URL, rewriting `{name}` path templates to `:name` variables.
fn build_url(
    operation: &Operation<'_>,
    query: Vec<QueryParam>,
    declared_path: Vec<(&str, String, Option<String>)>,
    warnings: &mut Warnings,
) -> Url {
    let mut variable: Vec<PathVariable> = Vec::new();
    let path: Vec<String> = operation
        .path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            for capture in PATH_TEMPLATE.captures_iter(segment) {
                let name = &capture[1];
                if variable.iter().any(|existing| existing.key == name) {
                    continue;
                }
                let (value, description) = match declared_path
                    .iter()
                    .find(|(declared, _, _)| *declared == name)
                {
                    Some((_, value, description)) => (value.clone(), description.clone()),
                    None => {
                        warnings.push(format!(
                            "path parameter '{name}' of '{}' is not declared",
                            operation.label()
                        ));
                        (format!("<{name}>"), None)
                    }
                };
                variable.push(PathVariable {
                    key: name.to_string(),
                    value,
                    description,
                });
            }
            PATH_TEMPLATE.replace_all(segment, ":$1").into_owned()
        })
        .collect();

    for (name, _, _) in &declared_path {
        if !variable.iter().any(|existing| existing.key == *name) {
            warnings.push(format!(
                "path parameter '{name}' of '{}' does not appear in the path",
                operation.label()
            ));
        }
    }

    let mut raw = format!("{{{{baseUrl}}}}/{}", path.join("/"));
    if !query.is_empty() {
        let pairs: Vec<String> = query
            .iter()
            .map(|param| format!("{}={}", encode_query(&param.key), encode_query(&param.value)))
            .collect();
        raw.push('?');
        raw.push_str(&pairs.join("&"));
    }

    Url {
        raw,
        host: vec!["{{baseUrl}}".to_string()],
        path,
        query,
        variable,
    }
}

/// Percent-encodes a query component for `url.raw`; `{{variable}}` references are kept.
fn encode_query(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        let Some(end) = rest[start..].find("}}") else {
            break;
        };
        let end = start + end + 2;
        encoded.push_str(&urlencoding::encode(&rest[..start]));
        encoded.push_str(&rest[start..end]);
        rest = &rest[end..];
    }
    encoded.push_str(&urlencoding::encode(rest));
    encoded
}

/// Prefers JSON content, otherwise the first declared media type.
fn preferred_media(content: &Map<String, Value>) -> Option<(&String, &Value)> {
    content
        .iter()
        .find(|(media_type, _)| is_json(&essence(media_type)))
        .or_else(|| content.iter().next())
}

/// Lower-cased media type without parameters.
fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn is_json(essence: &str) -> bool {
    essence == "application/json" || essence.ends_with("+json")
}

fn form_field(key: &str, value: &Value, binary: bool) -> FormField {
    if binary {
        FormField {
            key: key.to_string(),
            value: None,
            kind: "file".to_string(),
            description: None,
        }
    } else {
        FormField {
            key: key.to_string(),
            value: Some(to_text(value)),
            kind: "text".to_string(),
            description: None,
        }
    }
}

fn string_field<'v>(object: &'v Value, key: &str) -> &'v str {
    object.get(key).and_then(Value::as_str).unwrap_or_default()
}

/// Parameters are identified by name and location.
fn parameter_key(parameter: &Value) -> (&str, &str) {
    (string_field(parameter, "name"), string_field(parameter, "in"))
}

/// Parameter description, prefixed with `(Required)` for required parameters.
fn describe(parameter: &Value) -> Option<String> {
    let description = parameter
        .get("description")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|description| !description.is_empty());
    let required = string_field(parameter, "in") == "path"
        || parameter
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false);

    match (required, description) {
        (true, Some(description)) => Some(format!("(Required) {description}")),
        (true, None) => Some("(Required)".to_string()),
        (false, description) => description.map(ToString::to_string),
    }
}

/// Maps a response key to a status code: `default` is 500, `2XX` is 200.
fn status_code(code: &str) -> Option<u16> {
    if code == "default" {
        return Some(500);
    }
    if let Some(class) = code
        .strip_suffix("XX")
        .or_else(|| code.strip_suffix("xx"))
    {
        return class
            .parse::<u16>()
            .ok()
            .filter(|class| (1..=5).contains(class))
            .map(|class| class * 100);
    }
    code.parse()
        .ok()
        .filter(|status| (100..=599).contains(status))
}

const fn reason_phrase(code: u16) -> &'static str {
    match code {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        206 => "Partial Content",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        409 => "Conflict",
        410 => "Gone",
        412 => "Precondition Failed",
        413 => "Content Too Large",
        415 => "Unsupported Media Type",
        422 => "Unprocessable Content",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    const BANK: &str = r##"
openapi: 3.0.3
info:
  title: Bank API
  description: Accounts and transfers
servers:
  - url: https://{env}.bank.example/v1/
    variables:
      env:
        default: api
security:
  - bearerAuth: []
tags:
  - name: accounts
    description: Account management
  - name: transfers
  - name: unused
paths:
  /accounts:
    get:
      tags: [accounts]
      summary: List accounts
      operationId: listAccounts
      parameters:
        - name: limit
          in: query
          schema:
            type: integer
            minimum: 1
        - name: currency
          in: query
          required: true
          description: ISO currency code
          schema:
            type: string
            enum: [EUR, USD]
      responses:
        "200":
          description: The accounts
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: "#/components/schemas/Account"
  /accounts/{accountId}:
    parameters:
      - $ref: "#/components/parameters/AccountId"
    get:
      tags: [accounts]
      operationId: getAccount
      parameters:
        - name: X-Request-Id
          in: header
          schema:
            type: string
            format: uuid
        - name: session
          in: cookie
          example: abc
      responses:
        "200":
          description: The account
          headers:
            X-Rate-Limit:
              schema:
                type: integer
                default: 100
          content:
            application/json:
              example:
                id: acc-1
                balance: 12.5
        "404":
          $ref: "#/components/responses/NotFound"
  /transfers:
    post:
      tags: [transfers]
      summary: Create transfer
      security: []
      requestBody:
        required: true
        content:
          application/json:
            schema:
              $ref: "#/components/schemas/Transfer"
      responses:
        "201":
          description: Created
  /health:
    get:
      responses:
        default:
          description: ""
components:
  securitySchemes:
    bearerAuth:
      type: http
      scheme: bearer
  parameters:
    AccountId:
      name: accountId
      in: path
      required: true
      description: Account identifier
      schema:
        type: string
        example: acc-1
  responses:
    NotFound:
      description: Not found
  schemas:
    Account:
      type: object
      properties:
        id:
          type: string
          readOnly: true
        balance:
          type: number
    Transfer:
      type: object
      required: [from, to, amount]
      properties:
        id:
          type: string
          readOnly: true
        from:
          type: string
        to:
          type: string
        amount:
          type: number
          minimum: 0.01
"##;

    fn convert(document: &str) -> Conversion {
        OpenApiConverter
            .convert(document, &ConvertOptions::default())
            .unwrap()
    }

    fn collection(document: &str) -> Collection {
        convert(document).collection.unwrap()
    }

    fn item<'c>(collection: &'c Collection, name: &str) -> &'c Item {
        collection
            .items()
            .find(|item| item.name == name)
            .unwrap_or_else(|| panic!("no item named {name}"))
    }

    #[test]
    fn groups_requests_by_tag_in_description_order() {
        let collection = collection(BANK);

        let folders: Vec<_> = collection
            .folders()
            .map(|folder| (folder.name.as_str(), folder.item.len()))
            .collect();
        assert_eq!(folders, [("accounts", 2), ("transfers", 1)]);
        assert_eq!(
            collection.folders().next().unwrap().description.as_deref(),
            Some("Account management")
        );

        let Some(Entry::Item(untagged)) = collection.item.last() else {
            panic!("untagged operation should sit at the root");
        };
        assert_eq!(untagged.name, "GET /health");
        assert_eq!(collection.items().count(), 4);
    }

    #[test]
    fn names_fall_back_from_summary_to_operation_id() {
        let collection = collection(BANK);
        let names: Vec<_> = collection.items().map(|item| item.name.as_str()).collect();
        assert_eq!(
            names,
            ["List accounts", "getAccount", "Create transfer", "GET /health"]
        );
    }

    #[test]
    fn url_uses_base_url_variable_and_path_variables() {
        let collection = collection(BANK);

        assert_eq!(
            collection.variable[0],
            Variable::new("baseUrl", "https://api.bank.example/v1")
        );

        let url = &item(&collection, "getAccount").request.url;
        assert_eq!(url.raw, "{{baseUrl}}/accounts/:accountId");
        assert_eq!(url.path, ["accounts", ":accountId"]);
        assert_eq!(
            url.variable,
            [PathVariable {
                key: "accountId".to_string(),
                value: "acc-1".to_string(),
                description: Some("(Required) Account identifier".to_string()),
            }]
        );
    }

    #[test]
    fn every_parameter_has_an_example_value() {
        let collection = collection(BANK);

        let list = &item(&collection, "List accounts").request.url;
        assert_eq!(list.raw, "{{baseUrl}}/accounts?limit=1&currency=EUR");
        assert_eq!(
            list.query[1].description.as_deref(),
            Some("(Required) ISO currency code")
        );

        for item in collection.items() {
            for param in &item.request.url.query {
                assert!(!param.value.is_empty(), "{} has an empty query value", item.name);
            }
            for variable in &item.request.url.variable {
                assert!(!variable.value.is_empty(), "{} has an empty path value", item.name);
            }
            for header in &item.request.header {
                assert!(!header.value.is_empty(), "{} has an empty header", item.name);
            }
        }
    }

    #[test]
    fn header_and_cookie_parameters() {
        let collection = collection(BANK);
        let headers: Vec<_> = item(&collection, "getAccount")
            .request
            .header
            .iter()
            .map(|header| (header.key.as_str(), header.value.as_str()))
            .collect();

        assert_eq!(
            headers,
            [
                ("X-Request-Id", "3fa85f64-5717-4562-b3fc-2c963f66afa6"),
                ("Cookie", "session=abc"),
                ("Accept", "application/json"),
            ]
        );
    }

    #[test]
    fn request_body_is_faked_from_schema_without_read_only_fields() {
        let collection = collection(BANK);
        let request = &item(&collection, "Create transfer").request;

        let Some(Body::Raw { raw, options }) = &request.body else {
            panic!("expected a raw body");
        };
        assert_eq!(options.raw.language, "json");
        let body: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"from": "string", "to": "string", "amount": 0.01})
        );
        assert!(raw.contains("\n  \"from\""));
        assert!(
            request
                .header
                .contains(&Header::new("Content-Type", "application/json"))
        );
    }

    #[test]
    fn responses_prefer_authored_examples() {
        let collection = collection(BANK);
        let responses = &item(&collection, "getAccount").response;

        assert_eq!(responses.len(), 2);
        let ok = &responses[0];
        assert_eq!(ok.name, "The account");
        assert_eq!((ok.code, ok.status.as_str()), (200, "OK"));
        assert_eq!(ok.preview_language, "json");
        assert_eq!(
            serde_json::from_str::<Value>(&ok.body).unwrap(),
            serde_json::json!({"id": "acc-1", "balance": 12.5})
        );
        assert_eq!(ok.header[0], Header::new("Content-Type", "application/json"));
        assert_eq!(ok.header[1], Header::new("X-Rate-Limit", "100"));

        let not_found = &responses[1];
        assert_eq!((not_found.code, not_found.name.as_str()), (404, "Not found"));
        assert!(not_found.body.is_empty());
    }

    #[test]
    fn default_response_maps_to_500() {
        let collection = collection(BANK);
        let response = &item(&collection, "GET /health").response[0];
        assert_eq!(response.code, 500);
        assert_eq!(response.name, "Internal Server Error");
    }

    #[test]
    fn auth_is_inherited_overridden_and_embedded_in_examples() {
        let collection = collection(BANK);

        assert!(matches!(collection.auth, Some(Auth::Bearer { .. })));
        assert!(
            collection
                .variable
                .contains(&Variable::new("bearerToken", "<Bearer Token>"))
        );

        let get = item(&collection, "getAccount");
        assert_eq!(get.request.auth, None);
        assert!(matches!(
            get.response[0].original_request.auth,
            Some(Auth::Bearer { .. })
        ));

        let transfer = item(&collection, "Create transfer");
        assert_eq!(transfer.request.auth, Some(Auth::Noauth));
        assert_eq!(transfer.response[0].original_request.auth, Some(Auth::Noauth));
    }

    #[test]
    fn examples_omit_auth_when_disabled() {
        let options = ConvertOptions {
            include_auth_info_in_example: false,
            ..ConvertOptions::default()
        };
        let collection = OpenApiConverter
            .convert(BANK, &options)
            .unwrap()
            .collection
            .unwrap();

        assert_eq!(item(&collection, "getAccount").response[0].original_request.auth, None);
    }

    #[test]
    fn flat_strategy_keeps_requests_at_the_root() {
        let options = ConvertOptions {
            folder_strategy: FolderStrategy::Flat,
            ..ConvertOptions::default()
        };
        let collection = OpenApiConverter
            .convert(BANK, &options)
            .unwrap()
            .collection
            .unwrap();

        assert_eq!(collection.folders().count(), 0);
        assert_eq!(collection.item.len(), 4);
    }

    #[test]
    fn conversion_is_deterministic_apart_from_the_id() {
        let mut first = collection(BANK);
        let second = collection(BANK);
        assert_ne!(first.info.postman_id, second.info.postman_id);

        first.info.postman_id = second.info.postman_id;
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn json_input_is_accepted() {
        let document = r#"{"openapi": "3.1.0", "info": {"title": "T"}, "paths": {"/ping": {"get": {"operationId": "ping", "responses": {"204": {"description": "pong"}}}}}}"#;
        let collection = collection(document);
        assert_eq!(collection.info.name, "T");
        assert_eq!(item(&collection, "ping").response[0].code, 204);
        assert_eq!(collection.variable, [Variable::new("baseUrl", "/")]);
    }

    #[test]
    fn multiple_tags_warn_and_use_the_first() {
        let document = r"
openapi: 3.0.0
info: {title: T}
paths:
  /a:
    get:
      tags: [one, two]
      responses: {}
";
        let conversion = convert(document);
        let collection = conversion.collection.unwrap();

        let folders: Vec<_> = collection.folders().map(|f| f.name.as_str()).collect();
        assert_eq!(folders, ["one"]);
        assert_eq!(
            conversion.warnings[0].message,
            "operation 'GET /a' has several tags and is only placed under 'one'"
        );
    }

    #[test]
    fn form_bodies() {
        let document = r"
openapi: 3.0.0
info: {title: T}
paths:
  /upload:
    post:
      operationId: upload
      requestBody:
        content:
          multipart/form-data:
            schema:
              type: object
              properties:
                name: {type: string}
                file: {type: string, format: binary}
      responses: {}
  /login:
    post:
      operationId: login
      requestBody:
        content:
          application/x-www-form-urlencoded:
            example: {user: alice, remember: true}
      responses: {}
";
        let collection = collection(document);

        let Some(Body::Formdata { formdata }) = &item(&collection, "upload").request.body else {
            panic!("expected form data");
        };
        assert_eq!(formdata[0].value.as_deref(), Some("string"));
        assert_eq!(formdata[1].kind, "file");
        assert_eq!(formdata[1].value, None);

        let Some(Body::Urlencoded { urlencoded }) = &item(&collection, "login").request.body else {
            panic!("expected urlencoded");
        };
        assert_eq!(urlencoded[1].value.as_deref(), Some("true"));
    }

    #[test]
    fn undeclared_path_parameter_warns() {
        let document = r"
openapi: 3.0.0
info: {title: T}
paths:
  /things/{id}:
    get:
      operationId: thing
      responses: {}
";
        let conversion = convert(document);
        let collection = conversion.collection.unwrap();

        assert_eq!(item(&collection, "thing").request.url.variable[0].value, "<id>");
        assert_eq!(
            conversion.warnings[0].message,
            "path parameter 'id' of 'GET /things/{id}' is not declared"
        );
    }

    #[test]
    fn raw_url_encodes_query_examples() {
        let document = r"
openapi: 3.0.0
info: {title: T}
paths:
  /search:
    get:
      operationId: search
      parameters:
        - {name: q, in: query, example: 'a b&c=d#e'}
        - {name: token, in: query, example: '{{searchToken}}'}
      responses: {}
";
        let collection = collection(document);

        let url = &item(&collection, "search").request.url;
        assert_eq!(
            url.raw,
            "{{baseUrl}}/search?q=a%20b%26c%3Dd%23e&token={{searchToken}}"
        );
        assert_eq!(url.query[0].value, "a b&c=d#e");
    }

    #[test_case("plain", "plain"; "unreserved")]
    #[test_case("a b", "a%20b"; "space")]
    #[test_case("x{{id}}y z", "x{{id}}y%20z"; "variable kept")]
    #[test_case("{{open", "%7B%7Bopen"; "unterminated variable")]
    fn query_encoding(text: &str, expected: &str) {
        assert_eq!(encode_query(text), expected);
    }

    #[test]
    fn swagger_documents_produce_no_output() {
        let conversion = convert("swagger: '2.0'\ninfo: {title: T}\npaths: {}\n");
        assert!(conversion.collection.is_none());
        assert!(conversion.reason.unwrap().contains("Swagger 2.0"));
    }

    #[test]
    fn missing_version_produces_no_output() {
        let conversion = convert("info: {title: T}\n");
        assert!(conversion.collection.is_none());
        assert_eq!(
            conversion.reason.as_deref(),
            Some("document has no 'openapi' version field")
        );
    }

    #[test]
    fn malformed_documents_are_errors() {
        let error = OpenApiConverter
            .convert("openapi: [unclosed", &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(error, ConvertError::Parse(_)));

        let error = OpenApiConverter
            .convert("- just\n- a list\n", &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(error, ConvertError::NotAMapping));
    }

    #[test]
    fn unbundled_documents_are_errors() {
        let document = r"
openapi: 3.0.0
info: {title: T}
paths:
  /a:
    $ref: paths/a.yaml
";
        let error = OpenApiConverter
            .convert(document, &ConvertOptions::default())
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "external reference 'paths/a.yaml' found; the description is not bundled"
        );
    }

    #[test_case("200", Some(200); "plain")]
    #[test_case("default", Some(500); "default")]
    #[test_case("4XX", Some(400); "range")]
    #[test_case("2xx", Some(200); "lower case range")]
    #[test_case("9XX", None; "invalid range")]
    #[test_case("abc", None; "not a number")]
    fn status_codes(code: &str, expected: Option<u16>) {
        assert_eq!(status_code(code), expected);
    }
}
