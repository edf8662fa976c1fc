//! Row-write engine.
//!
//! A [`RowWriter`] writes a stream of rows into one table in Insert, Update
//! or InsertOrUpdate mode. Inserts are staged in memory and flushed through
//! the backend's bulk-load facility (or batched INSERT statements where there
//! is none); updates go through one prepared UPDATE re-bound per row.
//!
//! InsertOrUpdate resolves each row in three steps:
//!
//! 1. a staged, not yet flushed row with the same search values is
//!    overwritten in place;
//! 2. otherwise the UPDATE runs and stops if it matched anything;
//! 3. otherwise the row is staged as a new insert.
//!
//! A session is single-threaded state; use one writer per unit of work.

pub mod executor;
pub mod staging;

use serde::{Deserialize, Serialize};

pub use executor::{BulkLoad, Executor};
pub use staging::StagingBuffer;

use crate::ast::Value;
use crate::error::{PolyError, PolyResult};
use crate::schema::ColumnDef;
use crate::transpiler::dml::insert::build_insert;
use crate::transpiler::dml::update::PreparedUpdate;
use crate::transpiler::{ParamMode, SqlDialect};

/// Staged rows that trigger an automatic flush.
pub const DEFAULT_MAX_STAGED: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    Insert,
    Update,
    InsertOrUpdate,
}

/// What happened to one written row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Queued for the next flush.
    Staged,
    /// Merged into a row still waiting in staging.
    MergedInStaging,
    /// The UPDATE matched this many rows.
    Updated(u64),
    /// Update mode: nothing matched. Not an error.
    Unmatched,
}

/// Counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    pub inserted: u64,
    pub updated: u64,
    pub merged: u64,
    pub unmatched: u64,
    pub flushes: u64,
}

pub struct RowWriter<'a> {
    dialect: &'a dyn SqlDialect,
    executor: &'a mut dyn Executor,
    table: String,
    columns: Vec<ColumnDef>,
    mode: WriteMode,
    /// Indices of the search (key) columns.
    search: Vec<usize>,
    /// Indices of every other column, the SET list.
    other: Vec<usize>,
    staging: Option<StagingBuffer>,
    update: Option<PreparedUpdate>,
    batch_size: usize,
    max_staged: usize,
    summary: WriteSummary,
}

impl<'a> RowWriter<'a> {
    /// Open a session. `search` names the key columns; Update and
    /// InsertOrUpdate need at least one, plus at least one other column.
    pub fn new(
        dialect: &'a dyn SqlDialect,
        executor: &'a mut dyn Executor,
        table: &str,
        columns: Vec<ColumnDef>,
        search: &[&str],
        mode: WriteMode,
    ) -> PolyResult<Self> {
        if table.trim().is_empty() {
            return Err(PolyError::invalid("table name", "must not be empty"));
        }
        if columns.is_empty() {
            return Err(PolyError::invalid("columns", format!("nothing to write into '{}'", table)));
        }
        for (i, c) in columns.iter().enumerate() {
            c.validate()?;
            if columns[..i].iter().any(|o| o.name.eq_ignore_ascii_case(&c.name)) {
                return Err(PolyError::invalid(
                    "columns",
                    format!("'{}' listed twice for '{}'", c.name, table),
                ));
            }
        }

        let mut search_idx = Vec::with_capacity(search.len());
        for name in search {
            match columns.iter().position(|c| c.name.eq_ignore_ascii_case(name)) {
                Some(i) if !search_idx.contains(&i) => search_idx.push(i),
                Some(_) => {}
                None => {
                    return Err(PolyError::invalid(
                        "search column",
                        format!("'{}' is not among the columns written to '{}'", name, table),
                    ));
                }
            }
        }
        let other: Vec<usize> = (0..columns.len()).filter(|i| !search_idx.contains(i)).collect();
        if mode != WriteMode::Insert {
            if search_idx.is_empty() {
                return Err(PolyError::invalid(
                    "search columns",
                    format!("{:?} into '{}' needs at least one", mode, table),
                ));
            }
            if other.is_empty() {
                return Err(PolyError::invalid(
                    "columns",
                    format!("{:?} into '{}' has no column to set", mode, table),
                ));
            }
        }

        let batch_size = dialect.features().batch_rows(columns.len());
        tracing::debug!(
            "Opened {:?} session on {} ({} columns, {} search, batch {}) for {}",
            mode,
            table,
            columns.len(),
            search_idx.len(),
            batch_size,
            dialect.name()
        );
        Ok(Self {
            dialect,
            executor,
            table: table.to_string(),
            columns,
            mode,
            search: search_idx,
            other,
            staging: None,
            update: None,
            batch_size,
            max_staged: DEFAULT_MAX_STAGED,
            summary: WriteSummary::default(),
        })
    }

    /// Rows per INSERT statement, capped by what the dialect accepts.
    pub fn with_batch_size(mut self, rows: usize) -> Self {
        let cap = self.dialect.features().batch_rows(self.columns.len());
        self.batch_size = rows.clamp(1, cap);
        self
    }

    /// Staged row count that triggers an automatic flush.
    pub fn with_max_staged(mut self, rows: usize) -> Self {
        self.max_staged = rows.max(1);
        self
    }

    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Rows waiting for the next flush.
    pub fn staged(&self) -> usize {
        self.staging.as_ref().map_or(0, StagingBuffer::len)
    }

    pub fn summary(&self) -> WriteSummary {
        self.summary
    }

    /// Write one row, values in column order.
    pub fn write(&mut self, row: &[Value]) -> PolyResult<WriteOutcome> {
        self.check_row(row)?;
        match self.mode {
            WriteMode::Insert => {
                let prepared = self.prepare_row(row)?;
                self.stage(prepared)?;
                Ok(WriteOutcome::Staged)
            }
            WriteMode::Update => {
                let n = self.run_update(row)?;
                if n == 0 {
                    self.summary.unmatched += 1;
                    Ok(WriteOutcome::Unmatched)
                } else {
                    self.summary.updated += n;
                    Ok(WriteOutcome::Updated(n))
                }
            }
            WriteMode::InsertOrUpdate => {
                let prepared = self.prepare_row(row)?;
                if let Some(staging) = self.staging.as_mut() {
                    if let Some(pos) = staging.find(&prepared) {
                        staging.overwrite(pos, &self.other, &prepared);
                        self.summary.merged += 1;
                        tracing::debug!("Merged row into staged row {} of {}", pos, self.table);
                        return Ok(WriteOutcome::MergedInStaging);
                    }
                }
                let n = self.run_update(row)?;
                if n > 0 {
                    self.summary.updated += n;
                    return Ok(WriteOutcome::Updated(n));
                }
                tracing::debug!("No row of {} matched, staging insert", self.table);
                self.stage(prepared)?;
                Ok(WriteOutcome::Staged)
            }
        }
    }

    /// Write a whole source. Pure Insert sessions skip staging and hand the
    /// rows to the backend directly; other modes write row by row.
    pub fn write_all<I>(&mut self, rows: I) -> PolyResult<u64>
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        if self.mode != WriteMode::Insert {
            let mut count = 0;
            for row in rows {
                self.write(&row)?;
                count += 1;
            }
            return Ok(count);
        }

        self.flush()?;
        let prepared = rows
            .into_iter()
            .map(|row| {
                self.check_row(&row)?;
                self.prepare_row(&row)
            })
            .collect::<PolyResult<Vec<_>>>()?;
        if prepared.is_empty() {
            return Ok(0);
        }
        let count = self.load(&prepared)?;
        self.summary.inserted += count;
        self.summary.flushes += 1;
        tracing::debug!("Loaded {} rows into {} without staging", count, self.table);
        Ok(count)
    }

    /// Write every staged row and clear the staging buffer. Staged rows stay
    /// in place when the load fails, so the flush can be retried.
    pub fn flush(&mut self) -> PolyResult<u64> {
        let mut staging = match self.staging.take() {
            Some(s) if !s.is_empty() => s,
            other => {
                self.staging = other;
                return Ok(0);
            }
        };
        let staged = staging.len();
        let written = match self.load(staging.rows()) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("Flush of {} rows into {} failed, keeping them staged", staged, self.table);
                self.staging = Some(staging);
                return Err(e);
            }
        };
        staging.take();
        self.staging = Some(staging);
        if written != staged as u64 {
            tracing::warn!(
                "Backend reported {} rows written into {}, {} were staged",
                written,
                self.table,
                staged
            );
        }
        self.summary.inserted += written;
        self.summary.flushes += 1;
        tracing::debug!("Flushed {} rows into {}", staged, self.table);
        Ok(written)
    }

    /// Flush, release the prepared UPDATE and return the counters.
    pub fn finish(mut self) -> PolyResult<WriteSummary> {
        self.flush()?;
        self.update = None;
        self.staging = None;
        tracing::debug!("Closed session on {}: {:?}", self.table, self.summary);
        Ok(self.summary)
    }

    fn check_row(&self, row: &[Value]) -> PolyResult<()> {
        if row.len() != self.columns.len() {
            return Err(PolyError::invalid(
                "row",
                format!("{} values for {} columns of '{}'", row.len(), self.columns.len(), self.table),
            ));
        }
        Ok(())
    }

    /// Backend-ready values, e.g. GUIDs as blobs where the dialect wants them.
    fn prepare_row(&self, row: &[Value]) -> PolyResult<Vec<Value>> {
        row.iter()
            .zip(&self.columns)
            .map(|(v, c)| self.dialect.prepare_parameter(v, c.ty))
            .collect()
    }

    fn stage(&mut self, row: Vec<Value>) -> PolyResult<()> {
        let staging = self
            .staging
            .get_or_insert_with(|| StagingBuffer::new(self.search.clone()));
        staging.push(row);
        if staging.len() >= self.max_staged {
            self.flush()?;
        }
        Ok(())
    }

    fn run_update(&mut self, row: &[Value]) -> PolyResult<u64> {
        if self.update.is_none() {
            let set = self.other.iter().map(|&i| self.columns[i].clone()).collect();
            let keys = self.search.iter().map(|&i| self.columns[i].clone()).collect();
            self.update = Some(PreparedUpdate::prepare(self.dialect, &self.table, set, keys)?);
        }
        let update = self
            .update
            .as_ref()
            .ok_or_else(|| PolyError::Invariant(format!("UPDATE on '{}' was not prepared", self.table)))?;

        let set_values: Vec<Value> = self.other.iter().map(|&i| row[i].clone()).collect();
        let key_values: Vec<Value> = self.search.iter().map(|&i| row[i].clone()).collect();
        let stmt = update.bind(self.dialect, &set_values, &key_values)?;
        self.executor.execute(&stmt)?.ok_or_else(|| {
            PolyError::Invariant(format!("backend gave no affected-row count for UPDATE on '{}'", self.table))
        })
    }

    fn load(&mut self, rows: &[Vec<Value>]) -> PolyResult<u64> {
        if self.dialect.features().bulk_load {
            tracing::debug!("Bulk loading {} rows into {}", rows.len(), self.table);
            return self.executor.bulk_load(&BulkLoad {
                table: &self.table,
                columns: &self.columns,
                rows,
                keep_identity: !self.search.is_empty(),
            });
        }
        let mode = ParamMode::preferred(self.dialect);
        let mut total = 0;
        for chunk in rows.chunks(self.batch_size) {
            let stmt = build_insert(&self.table, &self.columns, chunk, self.dialect, mode)?;
            total += self.executor.execute(&stmt)?.ok_or_else(|| {
                PolyError::Invariant(format!("backend gave no affected-row count for INSERT on '{}'", self.table))
            })?;
        }
        Ok(total)
    }
}

impl Drop for RowWriter<'_> {
    fn drop(&mut self) {
        let pending = self.staged();
        if pending > 0 {
            tracing::warn!("Discarding {} unflushed rows for {}", pending, self.table);
        }
    }
}
