//! Convert a parsed configuration into the form used at runtime.

use query_engine_criteria::criteria::rules::DEFAULT_RULE_PREFIX;
use query_engine_criteria::criteria::CriteriaSpec;

use crate::configuration::Configuration;
use crate::error::MakeRuntimeConfigurationError;
use crate::version1::ParsedConfiguration;

/// Validate the field declarations and build the criteria spec they describe.
pub fn make_runtime_configuration(
    parsed_config: ParsedConfiguration,
) -> Result<Configuration, MakeRuntimeConfigurationError> {
    if parsed_config.table.name.trim().is_empty() {
        return Err(MakeRuntimeConfigurationError::EmptyTableName);
    }

    let spec = parsed_config
        .fields
        .iter()
        .fold(CriteriaSpec::builder(), |builder, field| {
            builder.named(field.name(), field.operator())
        })
        .build()?;

    Ok(Configuration {
        table: parsed_config.table,
        spec,
        rule_prefix: parsed_config
            .custom_rule_prefix
            .unwrap_or_else(|| DEFAULT_RULE_PREFIX.to_string()),
    })
}
