//! Prompt templates for SQL generation

/// Rows the generated query may return unless the user asks for more
pub const DEFAULT_TOP_K: usize = 10;

/// Completion is cut here so the model returns only the query
pub const SQL_RESULT_STOP: &str = "\nSQLResult:";

/// Tables the model is allowed to see
pub const BILLING_TABLES: [&str; 11] = [
    "providers_supervisers",
    "patients",
    "facility",
    "provider_facility",
    "patient_visit",
    "patient_visit_cpt",
    "patient_visit_icd",
    "case_notes",
    "claim",
    "users",
    "patient_case",
];

const ANSWER_FORMAT: &str = r#"Given an input question, first create a syntactically correct {dialect} query to run, then look at the results of the query and return the answer. Unless the user specifies in the question a specific number of examples to obtain, always limit your query to at most {top_k} results using the LIMIT clause. You can order the results by a relevant column to return the most interesting examples in the database. Pay attention to use only the column names that you can see in the schema description. Be careful to not query for columns that do not exist. Also, pay attention to which column is in which table.

Use the following format:

Question: "Question here"
SQLQuery: "SQL Query to run"
SQLResult: "Result of the SQLQuery"
Answer: "Final answer here"

Only use the following tables:
{table_info}

Question: {input}"#;

const ASSISTANT_PREAMBLE: &str = "You are a doctor assistant bot of the True Billing company. Your task is to use the database to give accurate answers to user requests. Answer the following questions as best you can.";

const PROVIDER_PREAMBLE: &str = "You are a doctor with attending_provider_id = {provider_id} and provider_id = {provider_id}. Find the rows of the providers_supervisers table where provider_id = {provider_id} and filter the results by their pa_id field. Your task is to use the database to give accurate answers to user requests. All names in the question are names of patients and visitors. If the question names a patient, filter the results by that name. Answer the following questions as best you can.";

/// Which template a request is answered with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTemplate {
    /// Generic billing assistant
    Assistant,
    /// Scoped to one provider and the assistants they supervise
    Provider(i64),
}

/// Values substituted into a template
#[derive(Debug, Clone)]
pub struct PromptInputs<'a> {
    pub dialect: &'a str,
    pub top_k: usize,
    pub table_info: &'a str,
    pub input: &'a str,
}

impl PromptTemplate {
    pub fn for_provider(provider_id: Option<i64>) -> Self {
        match provider_id {
            Some(id) => PromptTemplate::Provider(id),
            None => PromptTemplate::Assistant,
        }
    }

    fn preamble(&self) -> &'static str {
        match self {
            PromptTemplate::Assistant => ASSISTANT_PREAMBLE,
            PromptTemplate::Provider(_) => PROVIDER_PREAMBLE,
        }
    }

    /// Fill in the template.
    ///
    /// Substitution is a single pass over the template text, so placeholders
    /// that appear inside the schema or the question are left untouched.
    pub fn render(&self, inputs: &PromptInputs<'_>) -> String {
        let template = format!("{} {}", self.preamble(), ANSWER_FORMAT);
        let top_k = inputs.top_k.to_string();
        let provider_id = match self {
            PromptTemplate::Provider(id) => id.to_string(),
            PromptTemplate::Assistant => String::new(),
        };

        let mut out = String::with_capacity(template.len() + inputs.table_info.len());
        let mut rest = template.as_str();
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                out.push_str(&rest[open..]);
                rest = "";
                break;
            };
            let value = match &after[..close] {
                "dialect" => Some(inputs.dialect),
                "top_k" => Some(top_k.as_str()),
                "table_info" => Some(inputs.table_info),
                "input" => Some(inputs.input),
                "provider_id" if matches!(self, PromptTemplate::Provider(_)) => {
                    Some(provider_id.as_str())
                }
                _ => None,
            };
            match value {
                Some(value) => out.push_str(value),
                None => out.push_str(&rest[open..open + close + 2]),
            }
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        out
    }
}

/// Pull the SQL statement out of a completion.
///
/// Models sometimes echo the `SQLQuery:` label, wrap the query in a code
/// fence or keep the quotes shown in the prompt format.
pub fn extract_sql(completion: &str) -> String {
    let mut sql = completion.trim();

    if let Some(stripped) = sql.strip_prefix("SQLQuery:") {
        sql = stripped.trim();
    }

    if let Some(start) = sql.find("```") {
        let after = &sql[start + 3..];
        let after = after.strip_prefix("sql").unwrap_or(after);
        sql = match after.find("```") {
            Some(end) => after[..end].trim(),
            None => after.trim(),
        };
    }

    if sql.len() >= 2 && sql.starts_with('"') && sql.ends_with('"') {
        sql = sql[1..sql.len() - 1].trim();
    }

    sql.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs<'a>(input: &'a str, table_info: &'a str) -> PromptInputs<'a> {
        PromptInputs {
            dialect: "postgresql",
            top_k: DEFAULT_TOP_K,
            table_info,
            input,
        }
    }

    #[test]
    fn assistant_template_fills_every_placeholder() {
        let prompt = PromptTemplate::Assistant.render(&inputs(
            "How many claims? \nSQLQuery:",
            "CREATE TABLE claim (id integer)",
        ));
        assert!(prompt.starts_with("You are a doctor assistant bot"));
        assert!(prompt.contains("correct postgresql query"));
        assert!(prompt.contains("at most 10 results"));
        assert!(prompt.contains("CREATE TABLE claim (id integer)"));
        assert!(prompt.ends_with("Question: How many claims? \nSQLQuery:"));
        assert!(!prompt.contains("{dialect}"));
        assert!(!prompt.contains("{top_k}"));
    }

    #[test]
    fn provider_template_embeds_the_id() {
        let prompt = PromptTemplate::for_provider(Some(42)).render(&inputs("q", ""));
        assert!(prompt.contains("attending_provider_id = 42"));
        assert!(prompt.contains("providers_supervisers table where provider_id = 42"));
        assert!(prompt.contains("pa_id"));
        assert!(!prompt.contains("{provider_id}"));
    }

    #[test]
    fn user_text_is_not_expanded() {
        let prompt = PromptTemplate::Assistant.render(&inputs("show {table_info} and {x", "T"));
        assert!(prompt.ends_with("Question: show {table_info} and {x"));
    }

    #[test]
    fn provider_placeholder_only_expands_for_provider_template() {
        let prompt = PromptTemplate::Assistant.render(&inputs("{provider_id}", ""));
        assert!(prompt.ends_with("{provider_id}"));
    }

    #[test]
    fn extracts_plain_and_wrapped_sql() {
        assert_eq!(extract_sql(" SELECT 1;\n"), "SELECT 1;");
        assert_eq!(extract_sql("\"SELECT 1\""), "SELECT 1");
        assert_eq!(extract_sql("SQLQuery: SELECT 1"), "SELECT 1");
        assert_eq!(extract_sql("```sql\nSELECT 1\n```"), "SELECT 1");
        assert_eq!(extract_sql("```\nSELECT 1\n```"), "SELECT 1");
    }
}
