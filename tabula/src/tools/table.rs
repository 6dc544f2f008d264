//! Single-table introspection tools.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{DEFAULT_SAMPLE_LIMIT, MAX_ROW_LIMIT};
use crate::store::{ColumnInfo, DataStore, Row, TableStatistics};
use crate::tool::{ParameterSpec, Tool, ToolError};

/// Arguments naming one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableNameArgs {
    /// Table to inspect.
    pub table_name: String,
}

/// Output of [`GetTableSchemaTool`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name.
    pub table_name: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnInfo>,
}

/// Returns the columns of one table.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetTableSchemaTool;

#[async_trait]
impl Tool for GetTableSchemaTool {
    const NAME: &'static str = "get_table_schema";
    type Args = TableNameArgs;
    type Output = TableSchema;
    type Error = ToolError;

    fn description(&self) -> String {
        "Get the schema (structure) of a specific table including column names and types. \
         PREFER using get_database_context instead for better performance."
            .to_owned()
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![ParameterSpec::string("table_name", "The name of the table to get schema for").required()]
    }

    async fn call(&self, store: &DataStore, args: TableNameArgs) -> Result<TableSchema, ToolError> {
        let columns = store.table_schema(&args.table_name).await?;
        Ok(TableSchema {
            table_name: args.table_name,
            columns,
        })
    }
}

/// Arguments for [`GetTableSampleTool`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSampleArgs {
    /// Table to sample.
    pub table_name: String,
    /// Rows to return.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

const fn default_limit() -> u32 {
    DEFAULT_SAMPLE_LIMIT
}

/// Output of [`GetTableSampleTool`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSample {
    /// Table name.
    pub table_name: String,
    /// Number of rows in `data`.
    pub row_count: usize,
    /// Column names.
    pub columns: Vec<String>,
    /// First rows in storage order.
    pub data: Vec<Row>,
}

/// Returns the first rows of one table.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetTableSampleTool;

#[async_trait]
impl Tool for GetTableSampleTool {
    const NAME: &'static str = "get_table_sample";
    type Args = TableSampleArgs;
    type Output = TableSample;
    type Error = ToolError;

    fn description(&self) -> String {
        "Get a sample of rows from a table (first 5 rows by default). \
         Useful to understand the data structure and content."
            .to_owned()
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::string("table_name", "The name of the table to sample").required(),
            ParameterSpec::integer("limit", "Number of rows to return (default: 5)")
                .with_default(DEFAULT_SAMPLE_LIMIT)
                .with_range(1, MAX_ROW_LIMIT),
        ]
    }

    async fn call(&self, store: &DataStore, args: TableSampleArgs) -> Result<TableSample, ToolError> {
        let sample = store.sample(&args.table_name, args.limit).await?;
        Ok(TableSample {
            table_name: args.table_name,
            row_count: sample.len(),
            columns: sample.columns,
            data: sample.rows,
        })
    }
}

/// Returns row count, column count and column types of one table.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetTableStatisticsTool;

#[async_trait]
impl Tool for GetTableStatisticsTool {
    const NAME: &'static str = "get_table_statistics";
    type Args = TableNameArgs;
    type Output = TableStatistics;
    type Error = ToolError;

    fn description(&self) -> String {
        "Get basic statistics about a table including row count, column count, and column types."
            .to_owned()
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::string("table_name", "The name of the table to get statistics for")
                .required(),
        ]
    }

    async fn call(&self, store: &DataStore, args: TableNameArgs) -> Result<TableStatistics, ToolError> {
        Ok(store.table_statistics(&args.table_name).await?)
    }
}
