//! Question → SQL → answer pipeline

use std::path::PathBuf;

use billing_core::prompt::{DEFAULT_TOP_K, SQL_RESULT_STOP};
use billing_core::{
    PipelineResult, PromptInputs, PromptTemplate, Question, ResultFormat, extract_sql,
    normalize_dates, sanitize_answer,
};

use crate::ai::CompletionService;
use crate::db::SqlDatabase;
use crate::error::{DbError, PipelineError};
use crate::journal::Journal;

/// Tunables for one pipeline instance
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Tables the model may see and query
    pub tables: Vec<String>,
    pub top_k: usize,
    pub log_path: PathBuf,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            tables: billing_core::prompt::BILLING_TABLES
                .iter()
                .map(|t| t.to_string())
                .collect(),
            top_k: DEFAULT_TOP_K,
            log_path: PathBuf::from("logging.txt"),
        }
    }
}

/// Answers billing questions by having the LLM write SQL and then phrase the result
pub struct SqlPipeline<L, D> {
    llm: L,
    db: D,
    tables: Vec<String>,
    top_k: usize,
    journal: Journal,
}

impl<L, D> SqlPipeline<L, D> {
    pub fn database(&self) -> &D {
        &self.db
    }
}

impl<L: CompletionService, D: SqlDatabase> SqlPipeline<L, D> {
    pub fn new(llm: L, db: D, options: PipelineOptions) -> Self {
        Self {
            llm,
            db,
            tables: options.tables,
            top_k: options.top_k,
            journal: Journal::new(options.log_path),
        }
    }

    /// Run one question through the pipeline.
    ///
    /// Only a rejected SQL statement is turned into a result; LLM and
    /// connection failures are returned as errors.
    pub async fn answer(&self, question: &Question) -> Result<PipelineResult, PipelineError> {
        let text = normalize_dates(&question.text);
        let template = PromptTemplate::for_provider(question.provider_id);
        let table_info = self.db.table_info(&self.tables).await?;

        let mut input = format!("{} \nSQLQuery:", text);
        let prompt = template.render(&self.prompt_inputs(&table_info, &input));
        let completion = self.llm.complete(&prompt, &[SQL_RESULT_STOP]).await?;
        let sql_cmd = extract_sql(&completion);

        tracing::info!(
            user_id = question.user_id,
            provider_id = ?question.provider_id,
            sql = %sql_cmd,
            "Generated SQL"
        );

        let table = match self.db.run(&sql_cmd).await {
            Ok(table) => table,
            Err(DbError::Execution(detail)) => {
                tracing::warn!(sql = %sql_cmd, error = %detail, "Generated SQL failed");
                metrics::counter!("pipeline_results_total", "format" => "sql_error").increment(1);
                let result = PipelineResult::sql_error(text, sql_cmd, detail);
                self.record(&result).await;
                return Ok(result);
            }
            Err(e) => return Err(e.into()),
        };

        let sql_result = table.render();
        let format = ResultFormat::for_result(&sql_result);
        tracing::debug!(
            rows = table.rows.len(),
            chars = sql_result.chars().count(),
            format = format.as_str(),
            "SQL result"
        );

        let (answer, csv_file) = match format {
            ResultFormat::Inline => {
                input.push_str(&format!(" {}\nSQLResult: {}\nAnswer:", sql_cmd, sql_result));
                let prompt = template.render(&self.prompt_inputs(&table_info, &input));
                let answer = self.llm.complete(&prompt, &[SQL_RESULT_STOP]).await?;
                (sanitize_answer(answer.trim()), String::new())
            }
            ResultFormat::CsvExport => (String::new(), table.to_csv()?),
        };

        metrics::counter!("pipeline_results_total", "format" => format.as_str()).increment(1);

        let result = PipelineResult {
            input_text: text,
            answer,
            csv_file,
            sql_result,
            sql_cmd,
        };
        self.record(&result).await;
        Ok(result)
    }

    fn prompt_inputs<'a>(&'a self, table_info: &'a str, input: &'a str) -> PromptInputs<'a> {
        PromptInputs {
            dialect: self.db.dialect(),
            top_k: self.top_k,
            table_info,
            input,
        }
    }

    async fn record(&self, result: &PipelineResult) {
        if let Err(e) = self.journal.append(result).await {
            tracing::warn!(
                path = %self.journal.path().display(),
                error = %e,
                "Failed to append journal record"
            );
        }
    }
}
