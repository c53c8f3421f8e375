//! Version 1 of the configuration format: the table criteria are applied to and
//! the fields that may be filtered on.

use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{ParseConfigurationError, WriteParsedConfigurationError};

pub const CONFIGURATION_FILENAME: &str = "configuration.json";
pub const CONFIGURATION_JSONSCHEMA_FILENAME: &str = "schema.json";

/// The configuration as it is stored on disk.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParsedConfiguration {
    // Which version of the configuration format are we using
    pub version: Version,
    pub table: TableSettings,
    /// Filterable fields, in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDeclaration>,
    /// Prefix of custom rule names. Defaults to `criteria`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_rule_prefix: Option<String>,
}

impl ParsedConfiguration {
    /// A starter configuration, written by `initialize`.
    pub fn initial() -> Self {
        ParsedConfiguration {
            version: Version::This,
            table: TableSettings {
                schema: Some("public".to_string()),
                name: "users".to_string(),
                alias: None,
            },
            fields: vec![
                FieldDeclaration::Name("status".to_string()),
                FieldDeclaration::Detailed {
                    name: "name".to_string(),
                    operator: Some("like".to_string()),
                },
                FieldDeclaration::Name("age".to_string()),
            ],
            custom_rule_prefix: None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize, Serialize, JsonSchema)]
pub enum Version {
    #[serde(rename = "1")]
    This,
}

/// The table predicates refer to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
    /// Alias fields are qualified with. Defaults to the table name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl TableSettings {
    pub fn alias(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A filterable field. A bare name uses the default operator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum FieldDeclaration {
    Name(String),
    Detailed {
        name: String,
        /// One of `exact_or_in` (also `exact`, `in`, `=`), `like` or `custom`.
        /// A `custom` field needs a rule registered in code, so it cannot be
        /// compiled from the command line.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operator: Option<String>,
    },
}

impl FieldDeclaration {
    pub fn name(&self) -> &str {
        match self {
            FieldDeclaration::Name(name) | FieldDeclaration::Detailed { name, .. } => name,
        }
    }

    pub fn operator(&self) -> Option<&str> {
        match self {
            FieldDeclaration::Name(_) => None,
            FieldDeclaration::Detailed { operator, .. } => operator.as_deref(),
        }
    }
}

/// Just enough of a configuration file to tell which format it is in.
#[derive(Deserialize)]
struct VersionTag {
    #[serde(default)]
    version: serde_json::Value,
}

/// Parse the configuration format from a directory.
pub async fn parse_configuration(
    configuration_dir: impl AsRef<Path>,
) -> Result<ParsedConfiguration, ParseConfigurationError> {
    let configuration_file = configuration_dir.as_ref().join(CONFIGURATION_FILENAME);

    let configuration_file_contents =
        fs::read_to_string(&configuration_file)
            .await
            .map_err(|err| {
                ParseConfigurationError::IoErrorButStringified(format!(
                    "{}: {}",
                    &configuration_file.display(),
                    err
                ))
            })?;

    let parse_error = |error: serde_json::Error| ParseConfigurationError::ParseError {
        file_path: configuration_file.clone(),
        line: error.line(),
        column: error.column(),
        message: error.to_string(),
    };

    let tag: VersionTag = serde_json::from_str(&configuration_file_contents).map_err(parse_error)?;
    if tag.version != serde_json::Value::String("1".to_string()) {
        return Err(ParseConfigurationError::UnsupportedVersion {
            file_path: configuration_file.clone(),
            found: tag.version.to_string(),
        });
    }

    let parsed_config: ParsedConfiguration =
        serde_json::from_str(&configuration_file_contents).map_err(parse_error)?;

    tracing::debug!(
        file = %configuration_file.display(),
        fields = parsed_config.fields.len(),
        "parsed configuration"
    );

    Ok(parsed_config)
}

/// Write the parsed configuration into a directory on disk, along with the
/// JSON schema of its format.
pub async fn write_parsed_configuration(
    parsed_config: ParsedConfiguration,
    out_dir: impl AsRef<Path>,
) -> Result<(), WriteParsedConfigurationError> {
    let configuration_file = out_dir.as_ref().to_owned().join(CONFIGURATION_FILENAME);
    fs::create_dir_all(out_dir.as_ref()).await?;

    // create the configuration file
    fs::write(
        configuration_file,
        serde_json::to_string_pretty(&parsed_config)
            .map_err(|e| WriteParsedConfigurationError::IoError(e.into()))?
            + "\n",
    )
    .await?;

    // create the jsonschema file
    let configuration_jsonschema_file_path = out_dir
        .as_ref()
        .to_owned()
        .join(CONFIGURATION_JSONSCHEMA_FILENAME);

    let output = schemars::schema_for!(ParsedConfiguration);
    fs::write(
        &configuration_jsonschema_file_path,
        serde_json::to_string_pretty(&output)
            .map_err(|e| WriteParsedConfigurationError::IoError(e.into()))?
            + "\n",
    )
    .await?;

    Ok(())
}
