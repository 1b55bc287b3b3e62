//! In-process fakes for the LLM and the billing database.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use billing_core::ResultTable;
use billing_core::prompt::SQL_RESULT_STOP;
use billing_server::ai::CompletionService;
use billing_server::config::Config;
use billing_server::db::SqlDatabase;
use billing_server::error::{DbError, LlmError};
use billing_server::pipeline::{PipelineOptions, SqlPipeline};
use billing_server::session::SessionStore;
use billing_server::{AppState, build_app};

pub const TABLE_INFO: &str = "CREATE TABLE patient_visit (\n\tid integer NOT NULL,\n\tpatient_name text\n)";

// ---------------------------------------------------------------------------
// Fake LLM
// ---------------------------------------------------------------------------

#[derive(Default)]
struct LlmState {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

/// Replays scripted completions in order and records every prompt
#[derive(Clone, Default)]
pub struct FakeLlm {
    state: Arc<LlmState>,
}

impl FakeLlm {
    pub fn replying(replies: &[&str]) -> Self {
        let llm = Self::default();
        for reply in replies {
            llm.push_reply(reply);
        }
        llm
    }

    pub fn push_reply(&self, reply: &str) {
        self.state
            .replies
            .lock()
            .unwrap()
            .push_back(Ok(reply.to_string()));
    }

    pub fn push_failure(&self, message: &str) {
        self.state
            .replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn prompts(&self) -> Vec<String> {
        self.state.prompts.lock().unwrap().clone()
    }
}

impl CompletionService for FakeLlm {
    async fn complete(&self, prompt: &str, stop: &[&str]) -> Result<String, LlmError> {
        assert_eq!(stop.to_vec(), vec![SQL_RESULT_STOP]);
        self.state.prompts.lock().unwrap().push(prompt.to_string());
        let reply = self.state.replies.lock().unwrap().pop_front();
        match reply {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(LlmError::Api {
                status: 529,
                message,
            }),
            None => Err(LlmError::EmptyCompletion),
        }
    }
}

// ---------------------------------------------------------------------------
// Fake database
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub enum DbOutcome {
    Rows(ResultTable),
    Reject(String),
    Down,
}

struct DbState {
    outcome: Mutex<DbOutcome>,
    executed: Mutex<Vec<String>>,
    introspected: Mutex<Vec<Vec<String>>>,
}

/// Answers every statement with one configured outcome
#[derive(Clone)]
pub struct FakeDb {
    state: Arc<DbState>,
}

impl FakeDb {
    pub fn new(outcome: DbOutcome) -> Self {
        Self {
            state: Arc::new(DbState {
                outcome: Mutex::new(outcome),
                executed: Mutex::new(Vec::new()),
                introspected: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn with_rows(columns: &[&str], rows: Vec<Vec<Option<&str>>>) -> Self {
        Self::new(DbOutcome::Rows(table(columns, rows)))
    }

    pub fn executed(&self) -> Vec<String> {
        self.state.executed.lock().unwrap().clone()
    }

    pub fn introspected(&self) -> Vec<Vec<String>> {
        self.state.introspected.lock().unwrap().clone()
    }

    fn outcome(&self) -> DbOutcome {
        self.state.outcome.lock().unwrap().clone()
    }
}

impl SqlDatabase for FakeDb {
    fn dialect(&self) -> &str {
        "postgresql"
    }

    async fn table_info(&self, tables: &[String]) -> Result<String, DbError> {
        if let DbOutcome::Down = self.outcome() {
            return Err(DbError::Unavailable("connection refused".to_string()));
        }
        self.state.introspected.lock().unwrap().push(tables.to_vec());
        Ok(TABLE_INFO.to_string())
    }

    async fn run(&self, sql: &str) -> Result<ResultTable, DbError> {
        self.state.executed.lock().unwrap().push(sql.to_string());
        match self.outcome() {
            DbOutcome::Rows(table) => Ok(table),
            DbOutcome::Reject(detail) => Err(DbError::Execution(detail)),
            DbOutcome::Down => Err(DbError::Unavailable("connection refused".to_string())),
        }
    }

    async fn ping(&self) -> Result<(), DbError> {
        match self.outcome() {
            DbOutcome::Down => Err(DbError::Unavailable("connection refused".to_string())),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn table(columns: &[&str], rows: Vec<Vec<Option<&str>>>) -> ResultTable {
    ResultTable::new(
        columns.iter().map(|c| c.to_string()).collect(),
        rows.into_iter()
            .map(|row| row.into_iter().map(|cell| cell.map(String::from)).collect())
            .collect(),
    )
}

/// A result whose rendered form is `len` characters long
pub fn rendered_len_table(len: usize) -> ResultTable {
    // "[('" + value + "',)]" adds seven characters
    let value = "x".repeat(len - 7);
    let t = table(&["note"], vec![vec![Some(value.as_str())]]);
    assert_eq!(t.render().chars().count(), len);
    t
}

pub fn pipeline(llm: FakeLlm, db: FakeDb, log_dir: &Path) -> SqlPipeline<FakeLlm, FakeDb> {
    SqlPipeline::new(
        llm,
        db,
        PipelineOptions {
            log_path: log_dir.join("logging.txt"),
            ..PipelineOptions::default()
        },
    )
}

pub fn test_config() -> Config {
    Config {
        bind_address: "0.0.0.0:0".to_string(),
        sql_config_path: "unused.json".into(),
        anthropic_api_key: None,
        llm_model: "fake".to_string(),
        llm_api_url: "http://127.0.0.1:0".to_string(),
        llm_timeout_secs: 1,
        log_path: "unused.txt".into(),
        memory_window: 3,
        top_k: 10,
        tables: vec!["patient_visit".to_string()],
        cors_origins: vec!["*".to_string()],
    }
}

pub fn test_app(llm: FakeLlm, db: FakeDb, log_dir: &Path) -> axum::Router {
    let state = AppState::new(pipeline(llm, db, log_dir), SessionStore::new(3));
    build_app(state, &test_config())
}

/// Journal file contents, `None` if nothing was written
pub fn journal_contents(log_dir: &Path) -> Option<String> {
    std::fs::read_to_string(log_dir.join("logging.txt")).ok()
}
