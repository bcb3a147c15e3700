//! The execution engine.
//!
//! Every statement, built or raw, reaches the backend through
//! [`Database::run`]: connect, guard, prepare, bind, execute, account.

use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::log::{QueryLogEntry, SLOW_QUERY_THRESHOLD};
use crate::monitor::{QueryContext, QueryResult};
use crate::result::Outcome;
use crate::statement::BuiltStatement;
use dbal_check::validate_quoted;
use std::time::{Duration, Instant};

impl Database {
    /// Execute a serialized statement.
    ///
    /// The validation guard runs before the backend sees the text, skipping
    /// identifiers quoted with the driver's quote character. A refusal
    /// never reaches the backend, the monitors or the counters. Backend
    /// failures carry the failing SQL.
    pub(crate) fn run(&self, built: &BuiltStatement) -> DbResult<Outcome> {
        self.connect()?;

        let quote = self.composer().quote_char();
        validate_quoted(&built.sql, built.safety.strictness(), quote).map_err(|reason| {
            DbError::Rejected {
                reason,
                sql: built.sql.clone(),
            }
        })?;

        let start = Instant::now();
        let result = self.run_on_backend(built);
        let duration = start.elapsed();

        let ctx = QueryContext::new(&built.sql, built.values.len(), built.kind);
        let query_result = match &result {
            Ok(outcome) if outcome.cursor.columns().is_empty() => {
                QueryResult::Affected(outcome.cursor.affected_rows())
            }
            Ok(_) => QueryResult::Rows,
            Err(e) => QueryResult::error(e.to_string()),
        };
        self.report(&ctx, duration, &query_result);

        let outcome = result?;
        self.query_count.set(self.query_count.get() + 1);
        if self.config().query_logging_enabled {
            self.log
                .borrow_mut()
                .record(QueryLogEntry::new(&built.sql, &built.values, duration));
        }
        Ok(outcome)
    }

    fn run_on_backend(&self, built: &BuiltStatement) -> DbResult<Outcome> {
        let sql = built.sql.as_str();
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(sql).map_err(|e| DbError::database(e, Some(sql)))?;
            for (placeholder, value) in built.values.bindings() {
                stmt.bind(&placeholder, value.bind_form())
                    .map_err(|e| DbError::database(e, Some(sql)))?;
            }
            let cursor = stmt.execute().map_err(|e| DbError::database(e, Some(sql)))?;
            drop(stmt);
            Ok(Outcome::new(cursor, conn.last_insert_id()))
        })
    }

    fn report(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "dbal.sql",
            kind = ctx.kind.as_str(),
            params = ctx.param_count,
            duration_us = duration.as_micros() as u64,
            result = %result,
            sql = %crate::monitor::truncate_sql_bytes(&ctx.sql, 500),
            "statement executed"
        );

        for monitor in &self.monitors {
            monitor.on_query_complete(ctx, duration, result);
            if duration > SLOW_QUERY_THRESHOLD {
                monitor.on_slow_query(ctx, duration);
            }
        }
    }
}
