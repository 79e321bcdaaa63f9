//! The Collection Generator.
//!
//! Reads the bundled API description, converts it into a request collection,
//! stamps the generated-artifact metadata onto it and writes it atomically.

use std::{
    io,
    path::{Path, PathBuf},
};

use tracing::instrument;
use uuid::Uuid;

use crate::{
    artifact::{self, ReadError, WriteError},
    convert::{ConvertError, Converter, OpenApiConverter, Warning},
    domain::{CollectionConfig, ConvertOptions},
    postman::{self, Collection},
};

/// Generates request collections from a bundled API description.
#[derive(Debug, Clone)]
pub struct CollectionGenerator<C = OpenApiConverter> {
    converter: C,
    options: ConvertOptions,
    name: String,
    description: String,
}

impl CollectionGenerator {
    /// A generator using the built-in OpenAPI converter.
    #[must_use]
    pub fn new(config: &CollectionConfig) -> Self {
        Self::with_converter(OpenApiConverter, config)
    }
}

impl<C: Converter> CollectionGenerator<C> {
    /// A generator delegating the conversion to `converter`.
    #[must_use]
    pub fn with_converter(converter: C, config: &CollectionConfig) -> Self {
        Self {
            converter,
            options: ConvertOptions {
                indent: config.indent.clone(),
                ..ConvertOptions::default()
            },
            name: config.name.clone(),
            description: config.description.clone(),
        }
    }

    /// The conversion options in use.
    #[must_use]
    pub const fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Converts `input` without writing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is missing or unreadable, or if the
    /// conversion fails or produces no collection.
    #[instrument(level = "debug", skip(self))]
    pub fn convert(&self, input: &Path) -> Result<Generated, GenerateError> {
        if !input.exists() {
            return Err(GenerateError::MissingInput(input.to_path_buf()));
        }
        let document = artifact::read(input).map_err(|error| match error {
            ReadError::NotFound(path) => GenerateError::MissingInput(path),
            ReadError::Io { path, source } => GenerateError::Read { path, source },
        })?;

        let conversion = self
            .converter
            .convert(&document, &self.options)
            .map_err(GenerateError::Conversion)?;
        let Some(mut collection) = conversion.collection else {
            return Err(GenerateError::NoOutput {
                reason: conversion.reason,
            });
        };

        collection.info.name.clone_from(&self.name);
        collection.info.description = Some(self.description.clone());

        Ok(Generated {
            collection,
            warnings: conversion.warnings,
        })
    }

    /// Converts `input` and overwrites `output` with the result.
    ///
    /// Nothing is written unless the conversion succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the conversion fails or the output cannot be
    /// written.
    #[instrument(level = "debug", skip(self))]
    pub fn generate(&self, input: &Path, output: &Path) -> Result<Generated, GenerateError> {
        let generated = self.convert(input)?;
        let text = generated.render(&self.options.indent)?;
        artifact::write_atomic(output, &text)?;

        tracing::info!(
            "Generated {} requests into {}",
            generated.collection.items().count(),
            output.display()
        );
        Ok(generated)
    }

    /// Compares a fresh conversion of `input` with the collection at `output`.
    ///
    /// The collection id is the only field allowed to differ.
    ///
    /// # Errors
    ///
    /// Returns an error if the conversion fails or the existing collection
    /// cannot be read.
    #[instrument(level = "debug", skip(self))]
    pub fn check(&self, input: &Path, output: &Path) -> Result<Freshness, GenerateError> {
        let mut generated = self.convert(input)?;

        let existing = match artifact::read(output) {
            Ok(existing) => existing,
            Err(ReadError::NotFound(_)) => return Ok(Freshness::Missing),
            Err(ReadError::Io { path, source }) => {
                return Err(GenerateError::Read { path, source });
            }
        };

        let Some(id) = existing_id(&existing) else {
            tracing::debug!("{} has no readable collection id", output.display());
            return Ok(Freshness::Stale);
        };
        generated.collection.info.postman_id = id;

        if generated.render(&self.options.indent)? == existing {
            Ok(Freshness::UpToDate)
        } else {
            Ok(Freshness::Stale)
        }
    }
}

fn existing_id(text: &str) -> Option<Uuid> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    value.pointer("/info/_postman_id")?.as_str()?.parse().ok()
}

/// A converted collection with the warnings raised while converting it.
#[derive(Debug, Clone)]
pub struct Generated {
    /// The collection, with generated-artifact metadata applied.
    pub collection: Collection,
    /// Non-fatal conversion warnings.
    pub warnings: Vec<Warning>,
}

impl Generated {
    /// Serializes the collection exactly as it is written to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be serialized.
    pub fn render(&self, indent: &str) -> Result<String, GenerateError> {
        let mut text =
            postman::to_string_indented(&self.collection, indent).map_err(GenerateError::Serialize)?;
        text.push('\n');
        Ok(text)
    }
}

/// Whether a committed collection matches its description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Identical apart from the collection id.
    UpToDate,
    /// Differs from a fresh conversion.
    Stale,
    /// No collection has been generated yet.
    Missing,
}

/// Errors raised by the Collection Generator.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The bundled description has not been produced yet.
    #[error(
        "bundled API description not found at {}; run the bundling step first",
        .0.display()
    )]
    MissingInput(PathBuf),

    /// The bundled description exists but could not be read.
    #[error("failed to read {}", path.display())]
    Read {
        /// The file being read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The converter rejected the description.
    #[error("conversion error")]
    Conversion(#[source] ConvertError),

    /// The converter returned without a collection.
    #[error(
        "conversion produced no output{}",
        reason.as_deref().map(|reason| format!(" ({reason})")).unwrap_or_default()
    )]
    NoOutput {
        /// Why the converter produced nothing, if it said.
        reason: Option<String>,
    },

    /// The collection could not be serialized.
    #[error("failed to serialize collection")]
    Serialize(#[source] serde_json::Error),

    /// The collection could not be written.
    #[error(transparent)]
    Write(#[from] WriteError),
}
