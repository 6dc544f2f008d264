//! Model-authored SQL.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::guardrail::check_select_query;
use crate::store::{DataStore, Row};
use crate::tool::{ParameterSpec, Tool, ToolError};

/// Arguments for [`ExecuteSelectQueryTool`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectQueryArgs {
    /// SQL text.
    pub query: String,
}

/// Rows returned by a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOutput {
    /// Number of rows in `data`.
    pub row_count: usize,
    /// Column names in statement order.
    pub columns: Vec<String>,
    /// Result rows.
    pub data: Vec<Row>,
}

/// Runs a read-only `SELECT` after the query-safety gate admits it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecuteSelectQueryTool;

#[async_trait]
impl Tool for ExecuteSelectQueryTool {
    const NAME: &'static str = "execute_select_query";
    type Args = SelectQueryArgs;
    type Output = QueryOutput;
    type Error = ToolError;

    fn description(&self) -> String {
        "Execute a SELECT query on the database to answer the user's question. \
         Only SELECT queries are allowed (read-only). This should typically be your \
         FINAL step after understanding the database structure."
            .to_owned()
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::string(
                "query",
                "The SQL SELECT query to execute. Must be a valid SELECT statement.",
            )
            .required(),
        ]
    }

    async fn call(&self, store: &DataStore, args: SelectQueryArgs) -> Result<QueryOutput, ToolError> {
        check_select_query(&args.query)?;
        let result = store.run(&args.query, Vec::new()).await?;
        Ok(QueryOutput {
            row_count: result.len(),
            columns: result.columns,
            data: result.rows,
        })
    }
}
