/// How requests are grouped into folders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FolderStrategy {
    /// One folder per tag, in description order.
    #[default]
    Tags,
    /// Every request at the collection root.
    Flat,
}

/// Where example values come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParameterResolution {
    /// Authored examples first, schema-derived values as a fallback.
    #[default]
    Example,
    /// Always derive values from the schema.
    Schema,
}

/// Which operation field names a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestNameSource {
    /// `summary`, then `operationId`, then `METHOD /path`.
    #[default]
    Fallback,
    /// The path template.
    Url,
}

/// Options controlling the description-to-collection conversion.
///
/// The defaults are the fixed pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Folder grouping.
    pub folder_strategy: FolderStrategy,
    /// Value source for request parameters and bodies.
    pub request_parameters: ParameterResolution,
    /// Value source for saved example responses.
    pub example_parameters: ParameterResolution,
    /// Whether saved examples embed the effective authentication.
    pub include_auth_info_in_example: bool,
    /// Whether missing examples are synthesized from schemas.
    pub schema_faker: bool,
    /// Request naming.
    pub request_name_source: RequestNameSource,
    /// Indentation of the serialized collection.
    pub indent: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            folder_strategy: FolderStrategy::Tags,
            request_parameters: ParameterResolution::Example,
            example_parameters: ParameterResolution::Example,
            include_auth_info_in_example: true,
            schema_faker: true,
            request_name_source: RequestNameSource::Fallback,
            indent: "  ".to_string(),
        }
    }
}
