//! JSONL batch mode: one `LookupInfo` per input line, one result record per
//! output line. Items are resolved concurrently; a fatal error for one item
//! is recorded and the batch moves on.

use crate::cancel::CancelToken;
use crate::error::ResolveError;
use crate::model::LookupInfo;
use crate::pipeline::{Outcome, Resolver};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, Serialize)]
struct BatchRecord<'a> {
    line: usize,
    name: &'a str,
    year: Option<i32>,
    status: &'static str,
    resolved_id: Option<i64>,
    decided_by: Option<&'static str>,
    error: Option<String>,
    ts: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl BatchSummary {
    fn record<'a>(
        &mut self,
        line: usize,
        info: &'a LookupInfo,
        outcome: &Result<Outcome, ResolveError>,
    ) -> BatchRecord<'a> {
        self.total += 1;
        let (status, resolved_id, decided_by, error) = match outcome {
            Ok(o) if o.result.succeeded => {
                self.matched += 1;
                ("matched", o.result.resolved_id(), o.decided_by, None)
            }
            Ok(_) => {
                self.unmatched += 1;
                ("no-match", None, None, None)
            }
            Err(e) if e.is_cancelled() => {
                self.cancelled += 1;
                ("cancelled", None, None, None)
            }
            Err(e) => {
                self.failed += 1;
                warn!("line {line} ({:?}): {e}", info.name);
                ("error", None, None, Some(error_chain(e)))
            }
        };
        BatchRecord {
            line,
            name: &info.name,
            year: info.year,
            status,
            resolved_id,
            decided_by,
            error,
            ts: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error message followed by its sources, colon separated.
fn error_chain(e: &ResolveError) -> String {
    let mut msg = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(s) = source {
        msg.push_str(": ");
        msg.push_str(&s.to_string());
        source = s.source();
    }
    msg
}

/// Reads one `LookupInfo` per non-blank line. Line numbers are 1-based.
pub fn read_lookups(path: &Path) -> Result<Vec<(usize, LookupInfo)>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading batch input {:?}", path))?;
    let mut items = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let info: LookupInfo = serde_json::from_str(line)
            .with_context(|| format!("{:?}: line {} is not a lookup", path, idx + 1))?;
        items.push((idx + 1, info));
    }
    Ok(items)
}

pub async fn run_batch(
    resolver: &Resolver,
    items: Vec<(usize, LookupInfo)>,
    output: &Path,
    concurrency: usize,
    cancel: &CancelToken,
    show_progress: bool,
) -> Result<BatchSummary> {
    let pb = if show_progress {
        let pb = ProgressBar::new(items.len() as u64);
        pb.set_style(ProgressStyle::with_template(
            "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
        )?);
        pb
    } else {
        ProgressBar::hidden()
    };

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();
    for (line, info) in items {
        let resolver = resolver.clone();
        let cancel = cancel.clone();
        let semaphore = semaphore.clone();
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            let outcome = resolver.resolve_outcome(&info, &cancel).await;
            (line, info, outcome)
        });
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::create(output)
        .with_context(|| format!("creating batch output {:?}", output))?;
    let mut out = BufWriter::new(file);
    let mut summary = BatchSummary::default();
    while let Some(joined) = tasks.join_next().await {
        let (line, info, outcome) = joined.context("resolution task panicked")?;
        let record = summary.record(line, &info, &outcome);
        writeln!(out, "{}", serde_json::to_string(&record)?)?;
        pb.inc(1);
        pb.set_message(format!("line {line} {}", record.status));
    }
    out.flush()?;
    pb.finish_with_message("Done");
    Ok(summary)
}
