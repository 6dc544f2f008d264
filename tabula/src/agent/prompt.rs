//! Fixed prompt text.

/// System prompt seeded into every transcript that lacks one.
pub const SYSTEM_PROMPT: &str = "You are a helpful data analyst assistant with access to a SQLite database. \
Your job is to help users query and analyze their data efficiently.\n\n\
IMPORTANT GUIDELINES FOR EFFICIENCY:\n\
1. ALWAYS use 'get_database_context' as your FIRST step to understand the entire database structure in one call\n\
2. After getting the context, you should usually be able to construct the SQL query directly\n\
3. Only use other tools (list_tables, get_table_schema, get_table_sample) if you need additional specific information\n\
4. For simple queries, aim to use only 2 function calls total: get_database_context + execute_select_query\n\n\
When constructing queries:\n\
- Use appropriate SQL functions (SUM, COUNT, AVG, etc.) for aggregations\n\
- Use WHERE clauses to filter data efficiently\n\
- Use LIKE with wildcards for pattern matching (e.g., '%sugar%' to find items containing 'sugar')\n\
- Return clear, concise answers and explain the results you find";

/// Answer returned when the iteration budget runs out.
pub const BUDGET_EXHAUSTED_ANSWER: &str = "I apologize, but I reached the maximum number of processing steps. \
Please try rephrasing your question.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_steers_context_first() {
        assert!(SYSTEM_PROMPT.starts_with("You are a helpful data analyst assistant"));
        assert!(SYSTEM_PROMPT.contains("ALWAYS use 'get_database_context' as your FIRST step"));
        assert!(SYSTEM_PROMPT.contains("\n\nWhen constructing queries:\n- Use appropriate"));
    }

    #[test]
    fn test_exhausted_answer_text() {
        assert_eq!(
            BUDGET_EXHAUSTED_ANSWER,
            "I apologize, but I reached the maximum number of processing steps. Please try rephrasing your question."
        );
    }
}
