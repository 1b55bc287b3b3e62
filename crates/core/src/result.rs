use serde::{Deserialize, Serialize};

/// Results whose stringified form is longer than this are exported as CSV
pub const INLINE_RESULT_LIMIT: usize = 250;

/// Answer returned when the generated SQL fails to execute
pub const SQL_ERROR_ANSWER: &str = "Error in running SQL command!";

/// How a query result is handed back to the user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResultFormat {
    /// Short result: the LLM phrases a natural-language answer from it
    Inline,
    /// Long result: the rows are returned as a CSV payload, no answer is phrased
    CsvExport,
}

impl ResultFormat {
    /// Pick the format from the stringified SQL result.
    ///
    /// Length is counted in characters, not bytes.
    pub fn for_result(sql_result: &str) -> Self {
        if sql_result.chars().count() > INLINE_RESULT_LIMIT {
            ResultFormat::CsvExport
        } else {
            ResultFormat::Inline
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultFormat::Inline => "inline",
            ResultFormat::CsvExport => "csv",
        }
    }
}

/// Output of one question-answering cycle, also the `/api/ask` response body
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineResult {
    pub input_text: String,
    pub answer: String,
    pub csv_file: String,
    pub sql_result: String,
    pub sql_cmd: String,
}

impl PipelineResult {
    /// Result for a generated query that the database rejected
    pub fn sql_error(
        input_text: impl Into<String>,
        sql_cmd: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            input_text: input_text.into(),
            answer: SQL_ERROR_ANSWER.to_string(),
            csv_file: String::new(),
            sql_result: detail.into(),
            sql_cmd: sql_cmd.into(),
        }
    }

    pub fn is_sql_error(&self) -> bool {
        self.answer == SQL_ERROR_ANSWER && self.csv_file.is_empty()
    }

    /// Format the result as one journal record: five lines and a blank separator
    pub fn to_record(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}\n{}\n\n",
            self.input_text, self.sql_cmd, self.sql_result, self.answer, self.csv_file
        )
    }
}
