use std::collections::BTreeMap;

use billing_core::ResultTable;
use deadpool_postgres::Pool;
use tokio_postgres::{SimpleQueryMessage, SimpleQueryRow};

use super::SqlDatabase;
use crate::error::DbError;

/// Sample rows appended to each table description
const SAMPLE_ROWS: usize = 3;

const COLUMNS_QUERY: &str = "SELECT table_name::text, column_name::text, data_type::text, is_nullable::text \
     FROM information_schema.columns \
     WHERE table_schema::text = $1::text AND table_name::text = ANY($2::text[]) \
     ORDER BY table_name, ordinal_position";

/// PostgreSQL-backed billing database
#[derive(Clone)]
pub struct PgDatabase {
    pool: Pool,
    schema: Option<String>,
}

struct ColumnInfo {
    name: String,
    data_type: String,
    nullable: bool,
}

impl PgDatabase {
    pub fn new(pool: Pool, schema: Option<String>) -> Self {
        Self { pool, schema }
    }

    fn schema_name(&self) -> &str {
        self.schema.as_deref().unwrap_or("public")
    }

    async fn sample_rows(
        &self,
        client: &tokio_postgres::Client,
        table: &str,
    ) -> Result<ResultTable, DbError> {
        let sql = format!(
            "SELECT * FROM {}.{} LIMIT {}",
            quote_ident(self.schema_name()),
            quote_ident(table),
            SAMPLE_ROWS
        );
        let messages = client
            .simple_query(&sql)
            .await
            .map_err(|e| DbError::Introspection(format!("sampling {}: {}", table, e)))?;
        Ok(table_from_messages(&messages))
    }
}

impl SqlDatabase for PgDatabase {
    fn dialect(&self) -> &str {
        "postgresql"
    }

    async fn table_info(&self, tables: &[String]) -> Result<String, DbError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(COLUMNS_QUERY, &[&self.schema_name(), &tables])
            .await
            .map_err(|e| DbError::Introspection(e.to_string()))?;

        let mut columns: BTreeMap<String, Vec<ColumnInfo>> = BTreeMap::new();
        for row in rows {
            let table: String = row.get(0);
            let nullable: String = row.get(3);
            columns.entry(table).or_default().push(ColumnInfo {
                name: row.get(1),
                data_type: row.get(2),
                nullable: nullable == "YES",
            });
        }

        let mut sections = Vec::with_capacity(tables.len());
        // Keep allow-list order so the prompt is stable
        for table in tables {
            let Some(table_columns) = columns.get(table) else {
                tracing::warn!(table = %table, "Allow-listed table not found, skipping");
                continue;
            };
            let samples = self.sample_rows(&client, table).await?;
            sections.push(describe_table(table, table_columns, &samples));
        }

        Ok(sections.join("\n\n"))
    }

    async fn run(&self, sql: &str) -> Result<ResultTable, DbError> {
        let mut client = self.pool.get().await?;
        // Generated SQL may only read; writes fail as execution errors
        let tx = client
            .build_transaction()
            .read_only(true)
            .start()
            .await
            .map_err(|e| DbError::Unavailable(e.to_string()))?;

        if let Some(schema) = &self.schema {
            tx.batch_execute(&format!("SET LOCAL search_path TO {}", quote_ident(schema)))
                .await
                .map_err(|e| DbError::Unavailable(e.to_string()))?;
        }

        let messages = tx.simple_query(sql).await.map_err(execution_error)?;
        tx.commit().await.map_err(execution_error)?;

        Ok(table_from_messages(&messages))
    }

    async fn ping(&self) -> Result<(), DbError> {
        let client = self.pool.get().await?;
        client
            .simple_query("SELECT 1")
            .await
            .map_err(|e| DbError::Unavailable(e.to_string()))?;
        Ok(())
    }
}

fn execution_error(err: tokio_postgres::Error) -> DbError {
    match err.as_db_error() {
        Some(db) => DbError::Execution(db.to_string()),
        None if err.is_closed() => DbError::Unavailable(err.to_string()),
        None => DbError::Execution(err.to_string()),
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Rows of the last statement that produced any
fn table_from_messages(messages: &[SimpleQueryMessage]) -> ResultTable {
    let mut current: Vec<&SimpleQueryRow> = Vec::new();
    let mut last: Vec<&SimpleQueryRow> = Vec::new();

    for message in messages {
        match message {
            SimpleQueryMessage::Row(row) => current.push(row),
            SimpleQueryMessage::CommandComplete(_) => {
                if !current.is_empty() {
                    last = std::mem::take(&mut current);
                }
            }
            _ => {}
        }
    }
    if !current.is_empty() {
        last = current;
    }

    let Some(first) = last.first() else {
        return ResultTable::default();
    };
    let columns = first
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    let rows = last
        .iter()
        .map(|row| {
            (0..row.len())
                .map(|i| row.get(i).map(str::to_string))
                .collect()
        })
        .collect();

    ResultTable::new(columns, rows)
}

fn describe_table(table: &str, columns: &[ColumnInfo], samples: &ResultTable) -> String {
    let column_lines: Vec<String> = columns
        .iter()
        .map(|c| {
            let null = if c.nullable { "" } else { " NOT NULL" };
            format!("\t{} {}{}", c.name, c.data_type, null)
        })
        .collect();

    let mut out = format!("CREATE TABLE {} (\n{}\n)", table, column_lines.join(",\n"));

    out.push_str(&format!(
        "\n\n/*\n{} rows from {} table:\n",
        SAMPLE_ROWS, table
    ));
    let header: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    out.push_str(&header.join("\t"));
    for row in &samples.rows {
        let cells: Vec<&str> = row
            .iter()
            .map(|cell| cell.as_deref().unwrap_or("None"))
            .collect();
        out.push('\n');
        out.push_str(&cells.join("\t"));
    }
    out.push_str("\n*/");
    out
}
