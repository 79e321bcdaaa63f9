//! Conversion of an API description into a request collection.
//!
//! The pipeline only depends on the [`Converter`] capability, so the
//! built-in [`OpenApiConverter`] can be replaced without touching the
//! generator.

use std::fmt;

use crate::{domain::ConvertOptions, postman::Collection};

mod auth;
mod faker;
mod openapi;
mod refs;

pub use openapi::OpenApiConverter;

/// Converts a description document into a collection.
pub trait Converter {
    /// Converts `document` (the raw text of the bundled description).
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed.
    fn convert(&self, document: &str, options: &ConvertOptions) -> Result<Conversion, ConvertError>;
}

/// The outcome of a conversion that did not fail outright.
#[derive(Debug, Clone, Default)]
pub struct Conversion {
    /// The collection, absent when the converter could not produce one.
    pub collection: Option<Collection>,
    /// Why no collection was produced.
    pub reason: Option<String>,
    /// Non-fatal notes about ambiguous or lossy conversions.
    pub warnings: Vec<Warning>,
}

impl Conversion {
    /// A conversion that produced no collection.
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            collection: None,
            reason: Some(reason.into()),
            warnings: Vec::new(),
        }
    }
}

/// A non-fatal conversion note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Collects warnings, dropping exact duplicates while keeping first-seen order.
#[derive(Debug, Default)]
pub(crate) struct Warnings(Vec<Warning>);

impl Warnings {
    pub(crate) fn push(&mut self, message: impl Into<String>) {
        let warning = Warning {
            message: message.into(),
        };
        if !self.0.contains(&warning) {
            tracing::debug!("conversion warning: {warning}");
            self.0.push(warning);
        }
    }

    pub(crate) fn into_vec(self) -> Vec<Warning> {
        self.0
    }
}

/// Errors raised when the description cannot be converted.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The document is neither valid YAML nor valid JSON.
    #[error("failed to parse API description: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The document root is not a mapping.
    #[error("API description must be a mapping at the top level")]
    NotAMapping,

    /// The document still references other files.
    #[error("external reference '{0}' found; the description is not bundled")]
    ExternalReference(String),

    /// An internal reference does not point at anything.
    #[error("unresolved reference '{0}'")]
    UnresolvedReference(String),

    /// Part of the document has the wrong shape.
    #[error("invalid {what} at {location}")]
    Invalid {
        /// What was expected.
        what: &'static str,
        /// Where in the document.
        location: String,
    },
}
