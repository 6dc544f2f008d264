//! Built-in database tools.
//!
//! Six read-only functions over the [`DataStore`](crate::store::DataStore),
//! advertised to the model in this order:
//!
//! - [`GetDatabaseContextTool`]: every table, schema and row count in one call
//! - [`ListTablesTool`]
//! - [`GetTableSchemaTool`]
//! - [`ExecuteSelectQueryTool`]: guarded by [`SelectOnly`](crate::guardrail::SelectOnly)
//! - [`GetTableSampleTool`]
//! - [`GetTableStatisticsTool`]

mod context;
mod query;
mod table;

pub use context::{
    DatabaseContextArgs, GetDatabaseContextTool, ListTablesArgs, ListTablesOutput, ListTablesTool,
};
pub use query::{ExecuteSelectQueryTool, QueryOutput, SelectQueryArgs};
pub use table::{
    GetTableSampleTool, GetTableSchemaTool, GetTableStatisticsTool, TableNameArgs, TableSample,
    TableSampleArgs, TableSchema,
};

use crate::tool::{BoxedTool, ToolRegistry};

/// Largest row limit a tool accepts.
pub const MAX_ROW_LIMIT: i64 = 1000;

/// Default rows per table in `get_database_context` samples.
pub const DEFAULT_CONTEXT_SAMPLE_LIMIT: u32 = 3;

/// Default rows returned by `get_table_sample`.
pub const DEFAULT_SAMPLE_LIMIT: u32 = 5;

/// Tool names in catalog order.
pub const DATABASE_TOOL_NAMES: &[&str] = &[
    "get_database_context",
    "list_tables",
    "get_table_schema",
    "execute_select_query",
    "get_table_sample",
    "get_table_statistics",
];

/// All database tools in catalog order.
#[must_use]
pub fn all_tools() -> Vec<BoxedTool> {
    vec![
        Box::new(GetDatabaseContextTool),
        Box::new(ListTablesTool),
        Box::new(GetTableSchemaTool),
        Box::new(ExecuteSelectQueryTool),
        Box::new(GetTableSampleTool),
        Box::new(GetTableStatisticsTool),
    ]
}

/// A registry holding [`all_tools`].
#[must_use]
pub fn database_registry() -> ToolRegistry {
    ToolRegistry::from_tools(all_tools())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order() {
        let registry = database_registry();
        assert_eq!(registry.names(), DATABASE_TOOL_NAMES);
    }

    #[test]
    fn test_context_tool_is_steered_first() {
        let registry = database_registry();
        let specs = registry.list_tools();
        assert!(specs[0].description.contains("FIRST"));
        for name in ["list_tables", "get_table_schema"] {
            let spec = registry.spec(name).unwrap();
            assert!(spec.description.contains("PREFER using get_database_context"), "{name}");
        }
    }

    #[test]
    fn test_limits_are_bounded() {
        let registry = database_registry();
        for (tool, param) in [
            ("get_database_context", "sample_limit"),
            ("get_table_sample", "limit"),
        ] {
            let spec = registry.spec(tool).unwrap().parameter(param).unwrap();
            assert_eq!(spec.minimum, Some(1));
            assert_eq!(spec.maximum, Some(MAX_ROW_LIMIT));
        }
    }
}
