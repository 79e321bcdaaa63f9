//! Domain types shared by the pipeline steps.
//!
//! This module contains the project configuration and the fixed options of
//! the description-to-collection conversion.

mod config;
pub use config::{CollectionConfig, Config, DocsConfig, FILE_NAME as CONFIG_FILE_NAME};

mod options;
pub use options::{ConvertOptions, FolderStrategy, ParameterResolution, RequestNameSource};
