//! Postman Collection v2.1 model.
//!
//! Only the subset of the format that the converter emits is modelled. Field
//! order in these structs is the key order of the serialized document.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Schema URL identifying the collection format version.
pub const SCHEMA_V2_1: &str = "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

/// Serializes `value` as pretty JSON indented with `indent`.
///
/// # Errors
///
/// Returns an error if `value` cannot be represented as JSON.
pub fn to_string_indented<T: Serialize + ?Sized>(value: &T, indent: &str) -> serde_json::Result<String> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    String::from_utf8(buffer).map_err(serde::ser::Error::custom)
}

/// An importable request collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection metadata.
    pub info: Info,
    /// Top level entries: tag folders first, then untagged requests.
    pub item: Vec<Entry>,
    /// Authentication inherited by every request that does not override it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
    /// Collection variables (`baseUrl` and auth placeholders).
    #[serde(default)]
    pub variable: Vec<Variable>,
}

impl Collection {
    /// Iterates over the top level folders.
    pub fn folders(&self) -> impl Iterator<Item = &Folder> {
        self.item.iter().filter_map(|entry| match entry {
            Entry::Folder(folder) => Some(folder),
            Entry::Item(_) => None,
        })
    }

    /// Iterates over every request item, depth first.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.item.iter().flat_map(|entry| match entry {
            Entry::Folder(folder) => folder.item.as_slice(),
            Entry::Item(item) => std::slice::from_ref(item),
        })
    }
}

/// Collection metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    /// Random identifier; the only field that differs between regenerations.
    #[serde(rename = "_postman_id")]
    pub postman_id: Uuid,
    /// Display name.
    pub name: String,
    /// Free text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Format version URL, see [`SCHEMA_V2_1`].
    pub schema: String,
}

impl Info {
    /// Creates metadata with a fresh identifier.
    #[must_use]
    pub fn new(name: String, description: Option<String>) -> Self {
        Self {
            postman_id: Uuid::new_v4(),
            name,
            description,
            schema: SCHEMA_V2_1.to_string(),
        }
    }
}

/// A folder or a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    /// A folder grouping the requests of one tag.
    Folder(Folder),
    /// A single request.
    Item(Item),
}

/// A named group of requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    /// Folder name (the tag name).
    pub name: String,
    /// Tag description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Requests in the folder.
    pub item: Vec<Item>,
}

/// A request with its saved example responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Display name.
    pub name: String,
    /// The request.
    pub request: Request,
    /// Saved example responses.
    #[serde(default)]
    pub response: Vec<Response>,
}

/// An HTTP request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Authentication override; inherited from the collection when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
    /// Upper case HTTP method.
    pub method: String,
    /// Request headers.
    #[serde(default)]
    pub header: Vec<Header>,
    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
    /// Target URL.
    pub url: Url,
    /// Operation description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A header entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Header name.
    pub key: String,
    /// Example value.
    pub value: String,
    /// Parameter description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Header {
    /// Creates a header without a description.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            description: None,
        }
    }
}

/// A resolved URL template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Url {
    /// The full URL as a single string, e.g. `{{baseUrl}}/accounts/:id?limit=10`.
    pub raw: String,
    /// Host segments; always the `{{baseUrl}}` variable.
    pub host: Vec<String>,
    /// Path segments, path parameters written as `:name`.
    pub path: Vec<String>,
    /// Query parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<QueryParam>,
    /// Path variables.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variable: Vec<PathVariable>,
}

/// A query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParam {
    /// Parameter name.
    pub key: String,
    /// Example value.
    pub value: String,
    /// Parameter description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A path variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathVariable {
    /// Variable name, without the leading `:`.
    pub key: String,
    /// Example value.
    pub value: String,
    /// Parameter description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Body {
    /// Verbatim text.
    Raw {
        /// Body text.
        raw: String,
        /// Editor hints.
        options: RawOptions,
    },
    /// `application/x-www-form-urlencoded` fields.
    Urlencoded {
        /// Form fields.
        urlencoded: Vec<FormField>,
    },
    /// `multipart/form-data` fields.
    Formdata {
        /// Form fields.
        formdata: Vec<FormField>,
    },
}

impl Body {
    /// A raw body with the given editor language.
    #[must_use]
    pub fn raw(raw: String, language: &str) -> Self {
        Self::Raw {
            raw,
            options: RawOptions {
                raw: RawLanguage {
                    language: language.to_string(),
                },
            },
        }
    }
}

/// Editor hints for a raw body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOptions {
    /// Raw body options.
    pub raw: RawLanguage,
}

/// Syntax highlighting language of a raw body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLanguage {
    /// `json`, `xml` or `text`.
    pub language: String,
}

/// A form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    /// Field name.
    pub key: String,
    /// Example value; absent for file fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// `text` or `file`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Field description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A saved example response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Example name (the response description).
    pub name: String,
    /// The request that produced this response.
    #[serde(rename = "originalRequest")]
    pub original_request: Request,
    /// Reason phrase.
    pub status: String,
    /// HTTP status code.
    pub code: u16,
    /// Preview language (`json` or `text`).
    #[serde(rename = "_postman_previewlanguage")]
    pub preview_language: String,
    /// Response headers.
    #[serde(default)]
    pub header: Vec<Header>,
    /// Cookies; always empty.
    #[serde(default)]
    pub cookie: Vec<serde_json::Value>,
    /// Example body.
    pub body: String,
}

/// Request authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Auth {
    /// Explicitly unauthenticated.
    Noauth,
    /// Bearer token.
    Bearer {
        /// Token attributes.
        bearer: Vec<AuthAttribute>,
    },
    /// HTTP basic authentication.
    Basic {
        /// Username and password attributes.
        basic: Vec<AuthAttribute>,
    },
    /// API key in a header or query parameter.
    Apikey {
        /// Key, value and location attributes.
        apikey: Vec<AuthAttribute>,
    },
    /// OAuth 2.0 access token.
    Oauth2 {
        /// Token attributes.
        oauth2: Vec<AuthAttribute>,
    },
}

/// One key/value attribute of an [`Auth`] block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthAttribute {
    /// Attribute name.
    pub key: String,
    /// Attribute value.
    pub value: String,
    /// Always `string`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl AuthAttribute {
    /// A string attribute.
    #[must_use]
    pub fn new(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            value: value.into(),
            kind: "string".to_string(),
        }
    }
}

/// A collection variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Variable name.
    pub key: String,
    /// Example value.
    pub value: String,
    /// Always `string`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl Variable {
    /// A string variable.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            kind: "string".to_string(),
        }
    }
}
