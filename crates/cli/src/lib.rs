//! The CLI can do a few things. This provides a central point where those things are routed and
//! then done, making it easier to test this crate deterministically.

pub mod parameters;

use std::path::PathBuf;

use clap::Subcommand;
use query_criteria_configuration as configuration;
use query_engine_criteria::criteria::{CoercionWarning, Operator, ParameterBag};
use query_engine_sql::sql;

/// The various contextual bits and bobs we need to run.
pub struct Context {
    pub context_path: PathBuf,
}

/// The command invoked by the user.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Write a starter configuration into the configuration directory.
    Initialize,
    /// Print the JSON schema of the configuration format.
    PrintSchema,
    /// Compile request parameters into SQL over the configured table.
    Compile {
        /// Parameters as a JSON object.
        #[arg(long, value_name = "JSON", conflicts_with = "query")]
        parameters: Option<String>,
        /// Parameters as a URL query string, e.g. `status[]=1&status[]=3&name=Rei`.
        #[arg(long, value_name = "QUERY_STRING")]
        query: Option<String>,
        /// Pretty-print the generated SQL.
        #[arg(long)]
        pretty: bool,
    },
}

/// Run a command in a given directory.
pub async fn run(command: Command, context: &Context) -> anyhow::Result<()> {
    match command {
        Command::Initialize => initialize(context).await?,
        Command::PrintSchema => println!("{}", print_schema()?),
        Command::Compile {
            parameters,
            query,
            pretty,
        } => {
            let parameters = match (parameters, query) {
                (Some(json), _) => parameters::from_json(&json)?,
                (None, Some(query)) => parameters::from_query_string(&query),
                (None, None) => ParameterBag::new(),
            };
            let compiled = compile(context, &parameters).await?;
            for warning in &compiled.warnings {
                eprintln!("warning: {warning}");
            }
            print!("{}", compiled.render(pretty));
        }
    }
    Ok(())
}

/// Initialize an empty directory with a starter configuration.
///
/// Fails if the directory already holds a configuration.
pub async fn initialize(context: &Context) -> anyhow::Result<()> {
    let configuration_file = context
        .context_path
        .join(configuration::CONFIGURATION_FILENAME);
    if tokio::fs::try_exists(&configuration_file).await? {
        anyhow::bail!(
            "a configuration already exists at {}",
            configuration_file.display()
        );
    }

    configuration::write_parsed_configuration(
        configuration::ParsedConfiguration::initial(),
        &context.context_path,
    )
    .await?;

    tracing::info!(path = %context.context_path.display(), "initialized configuration");
    Ok(())
}

/// The JSON schema of the configuration format.
pub fn print_schema() -> anyhow::Result<String> {
    let schema = schemars::schema_for!(configuration::ParsedConfiguration);
    Ok(serde_json::to_string_pretty(&schema)?)
}

/// A compiled statement and what happened along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub sql: sql::string::SQL,
    pub warnings: Vec<CoercionWarning>,
}

impl Compiled {
    /// The statement followed by its numbered parameters, one per line.
    pub fn render(&self, pretty: bool) -> String {
        let statement = if pretty {
            sqlformat::format(
                &self.sql.sql,
                &sqlformat::QueryParams::None,
                sqlformat::FormatOptions::default(),
            )
        } else {
            self.sql.sql.clone()
        };

        let mut output = statement;
        output.push('\n');
        for (index, sql::string::Param::String(value)) in self.sql.params.iter().enumerate() {
            output.push_str(&format!("${} = {value:?}\n", index + 1));
        }
        output
    }
}

/// Read the configuration and apply `parameters` to a `SELECT *` over its table.
pub async fn compile(context: &Context, parameters: &ParameterBag) -> anyhow::Result<Compiled> {
    let parsed = configuration::parse_configuration(&context.context_path).await?;
    let runtime = configuration::make_runtime_configuration(parsed)?;

    let custom_fields: Vec<&str> = runtime
        .spec
        .fields()
        .filter(|(_, operator)| *operator == Operator::CustomOnly)
        .map(|(field, _)| field)
        .collect();
    if !custom_fields.is_empty() {
        anyhow::bail!(
            "cannot compile fields declared with the 'custom' operator ({}): their rules must be registered in code",
            custom_fields.join(", ")
        );
    }

    let definition = runtime.definition_builder::<sql::ast::Select>().build()?;

    let mut select = runtime.base_select();
    let applied = definition.apply(parameters, &mut select)?;

    let sql = sql::convert::select_to_sql(&select);
    tracing::info!(sql = %sql.sql, params = sql.params.len(), "compiled criteria");

    Ok(Compiled {
        sql,
        warnings: applied.warnings,
    })
}
