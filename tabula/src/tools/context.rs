//! Whole-database introspection tools.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{DEFAULT_CONTEXT_SAMPLE_LIMIT, MAX_ROW_LIMIT};
use crate::store::{DataStore, DatabaseContext};
use crate::tool::{ParameterSpec, Tool, ToolError};

/// Arguments for [`GetDatabaseContextTool`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DatabaseContextArgs {
    /// Include the first rows of each table.
    #[serde(default)]
    pub include_samples: bool,
    /// Rows per table when samples are included.
    #[serde(default = "default_sample_limit")]
    pub sample_limit: u32,
}

const fn default_sample_limit() -> u32 {
    DEFAULT_CONTEXT_SAMPLE_LIMIT
}

/// Returns every table with its columns, row count and optional samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetDatabaseContextTool;

#[async_trait]
impl Tool for GetDatabaseContextTool {
    const NAME: &'static str = "get_database_context";
    type Args = DatabaseContextArgs;
    type Output = DatabaseContext;
    type Error = ToolError;

    fn description(&self) -> String {
        "Get complete database context including all tables, their schemas, row counts, \
         and sample data in ONE call. Use this FIRST before any query to understand the \
         entire database structure efficiently."
            .to_owned()
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::boolean(
                "include_samples",
                "Whether to include sample rows from each table (default: false)",
            )
            .with_default(false),
            ParameterSpec::integer(
                "sample_limit",
                "Number of sample rows per table if include_samples is true (default: 3)",
            )
            .with_default(DEFAULT_CONTEXT_SAMPLE_LIMIT)
            .with_range(1, MAX_ROW_LIMIT),
        ]
    }

    async fn call(
        &self,
        store: &DataStore,
        args: DatabaseContextArgs,
    ) -> Result<DatabaseContext, ToolError> {
        Ok(store
            .database_context(args.include_samples, args.sample_limit)
            .await?)
    }
}

/// Arguments for [`ListTablesTool`]; it takes none.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ListTablesArgs {}

/// Output of [`ListTablesTool`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTablesOutput {
    /// Table names, sorted.
    pub tables: Vec<String>,
    /// Number of tables.
    pub count: usize,
}

/// Lists table names.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListTablesTool;

#[async_trait]
impl Tool for ListTablesTool {
    const NAME: &'static str = "list_tables";
    type Args = ListTablesArgs;
    type Output = ListTablesOutput;
    type Error = ToolError;

    fn description(&self) -> String {
        "Get a list of all available tables in the database. \
         PREFER using get_database_context instead for better performance."
            .to_owned()
    }

    async fn call(&self, store: &DataStore, _args: ListTablesArgs) -> Result<ListTablesOutput, ToolError> {
        let tables = store.get_all_tables().await?;
        Ok(ListTablesOutput {
            count: tables.len(),
            tables,
        })
    }
}
