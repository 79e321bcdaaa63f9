//! API-contract synchronization
//!
//! Keeps the artifacts derived from an OpenAPI description in step with it:
//! a Postman collection generated from the bundled description, and rendered
//! documentation whose Mermaid diagrams are made viewable in the browser.

pub mod artifact;
pub mod convert;
pub use convert::{Conversion, ConvertError, Converter, OpenApiConverter, Warning};

pub mod docs;
pub use docs::{MermaidConfig, PostprocessError};

pub mod domain;
pub use domain::{CollectionConfig, Config, ConvertOptions, DocsConfig};

pub mod generate;
pub use generate::{CollectionGenerator, Freshness, GenerateError};

pub mod postman;
