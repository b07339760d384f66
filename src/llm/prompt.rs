//! Prompt construction for SQL generation.
//!
//! The system turn carries the schema snapshot; the user turn is the question
//! verbatim.

use crate::llm::types::Message;

/// Placeholder replaced with the schema snapshot.
pub const SCHEMA_PLACEHOLDER: &str = "{schema}";

/// System prompt template for SQL generation.
pub const SYSTEM_PROMPT_TEMPLATE: &str = r#"You are a SQL expert. Given a database schema and a user question,
generate a valid SQL query to answer the question.

Database Schema:
{schema}

Rules:
1. Generate ONLY the SQL query, no explanations
2. Use proper SQL syntax
3. Make sure the query is safe (no DROP, DELETE, or UPDATE unless explicitly requested)
4. Return only SELECT queries unless the user explicitly requests modifications
"#;

/// Builds the system prompt with the schema snapshot injected.
pub fn build_system_prompt(schema: &str) -> String {
    SYSTEM_PROMPT_TEMPLATE.replace(SCHEMA_PLACEHOLDER, schema)
}

/// Builds the two-turn message list for one question.
pub fn build_messages(question: &str, schema: &str) -> Vec<Message> {
    vec![
        Message::system(build_system_prompt(schema)),
        Message::user(question),
    ]
}
