//! Runtime configuration for compiling criteria.

use query_engine_criteria::criteria::{
    CriteriaDefinition, CriteriaDefinitionBuilder, CriteriaSpec, QueryBuilder,
};
use query_engine_sql::sql;

use crate::version1::TableSettings;

/// The 'Configuration' type collects all the information necessary to compile
/// criteria at runtime.
///
/// Values of this type are produced from a 'ParsedConfiguration' using
/// 'make_runtime_configuration', which validates every field declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub table: TableSettings,
    pub spec: CriteriaSpec,
    pub rule_prefix: String,
}

impl Configuration {
    /// `SELECT *` over the configured table, ready to receive predicates.
    pub fn base_select(&self) -> sql::ast::Select {
        sql::helpers::star_select(sql::ast::From::Table {
            reference: sql::helpers::db_table(self.table.schema.clone(), self.table.name.clone()),
            alias: sql::helpers::make_table_alias(self.table.alias().to_string()),
        })
    }

    /// A criteria definition over the configured fields. Custom rules are
    /// registered on the returned builder.
    pub fn definition_builder<B: QueryBuilder>(&self) -> CriteriaDefinitionBuilder<B> {
        CriteriaDefinition::builder(self.spec.clone()).rule_prefix(self.rule_prefix.clone())
    }
}
