//! Batched submission of request objects.
//!
//! Requests built by [`TrackedRecord`](crate::TrackedRecord) are collected
//! and sent in one round trip. Faults on individual requests are reported
//! to a diagnostic sink and do not stop the rest of the batch from being
//! inspected; deciding whether a partial failure is fatal is up to the
//! caller.

use crate::diagnostics::DiagnosticSink;
use crate::error::{Result, TrackerError};
use crate::remote::{BatchItemResult, BatchSettings, RemoteStore, Request};

/// Batch submission configuration.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Max requests per batch call. The remote store rejects larger batches.
    /// Default: 1000
    pub chunk_size: usize,

    /// Keep executing after a request faults.
    pub continue_on_error: bool,

    /// Ask the store for a result per request, not just faults.
    pub return_responses: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            continue_on_error: true,
            return_responses: true,
        }
    }
}

impl BatchConfig {
    pub fn settings(&self) -> BatchSettings {
        BatchSettings {
            continue_on_error: self.continue_on_error,
            return_responses: self.return_responses,
        }
    }
}

/// What a batch submission produced.
#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    /// Number of requests sent.
    pub submitted: usize,

    /// Per-request results, indices relative to the submitted list.
    pub results: Vec<BatchItemResult>,
}

impl BatchReport {
    pub fn fault_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_fault()).count()
    }

    pub fn has_faults(&self) -> bool {
        self.results.iter().any(BatchItemResult::is_fault)
    }

    pub fn faults(&self) -> impl Iterator<Item = &BatchItemResult> {
        self.results.iter().filter(|r| r.is_fault())
    }
}

/// Submit `requests` as one batch call.
///
/// The list is consumed. When a sink is given the "Display errors" header
/// is written to it, then one line per faulted request with its kind and
/// the store's message.
pub fn execute_batch(
    store: &dyn RemoteStore,
    requests: Vec<Request>,
    config: &BatchConfig,
    sink: Option<&dyn DiagnosticSink>,
) -> Result<BatchReport> {
    let results = submit(store, &requests, config, sink)?;
    Ok(BatchReport {
        submitted: requests.len(),
        results,
    })
}

fn submit(
    store: &dyn RemoteStore,
    requests: &[Request],
    config: &BatchConfig,
    sink: Option<&dyn DiagnosticSink>,
) -> Result<Vec<BatchItemResult>> {
    if requests.is_empty() {
        return Ok(Vec::new());
    }

    tracing::debug!(requests = requests.len(), "executing batch");
    let results = store.execute_batch(requests, &config.settings())?;

    if let Some(sink) = sink {
        sink.trace("Display errors");
    }

    for result in &results {
        let BatchItemResult::Fault {
            request_index,
            message,
        } = result
        else {
            continue;
        };

        let kind = requests
            .get(*request_index)
            .map(|r| r.kind().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        tracing::warn!(request_index, %kind, %message, "batch request faulted");

        if let Some(sink) = sink {
            sink.trace(&format!(
                "A fault occurred when processing {} request, with a fault message: {}",
                kind, message
            ));
        }
    }

    Ok(results)
}

/// Submit `requests` in chunks of `config.chunk_size`, one batch call each.
///
/// Result indices are rebased onto the full list. If a batch call fails,
/// the error is [`TrackerError::BatchAborted`] carrying the results of the
/// chunks already committed and every request that was not submitted.
pub fn execute_batches(
    store: &dyn RemoteStore,
    requests: Vec<Request>,
    config: &BatchConfig,
    sink: Option<&dyn DiagnosticSink>,
) -> Result<BatchReport> {
    let mut report = BatchReport::default();
    let mut chunks = chunk(requests, config.chunk_size).into_iter();

    while let Some(current) = chunks.next() {
        let offset = report.submitted;
        let results = match submit(store, &current, config, sink) {
            Ok(results) => results,
            Err(e) => {
                tracing::error!(
                    submitted = report.submitted,
                    error = %e,
                    "batch call failed, remaining requests not sent"
                );
                let unsent = current.into_iter().chain(chunks.flatten()).collect();
                return Err(TrackerError::BatchAborted {
                    submitted: report.submitted,
                    results: report.results,
                    unsent,
                    source: Box::new(e),
                });
            }
        };

        report.submitted += current.len();
        report
            .results
            .extend(results.into_iter().map(|r| rebase(r, offset)));
    }

    Ok(report)
}

fn rebase(result: BatchItemResult, offset: usize) -> BatchItemResult {
    match result {
        BatchItemResult::Success { request_index, id } => BatchItemResult::Success {
            request_index: request_index + offset,
            id,
        },
        BatchItemResult::Fault {
            request_index,
            message,
        } => BatchItemResult::Fault {
            request_index: request_index + offset,
            message,
        },
    }
}

/// Split `items` into lists of at most `size` elements.
///
/// A `size` of zero is treated as one.
pub fn chunk<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut chunks = Vec::with_capacity(items.len().div_ceil(size));
    let mut current = Vec::with_capacity(size.min(items.len()));

    for item in items {
        current.push(item);
        if current.len() == size {
            chunks.push(std::mem::replace(&mut current, Vec::with_capacity(size)));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Reusable request list.
///
/// [`flush`](Self::flush) hands the collected requests to the store and
/// leaves the buffer empty, ready for the next batch.
#[derive(Debug, Default)]
pub struct RequestBuffer {
    requests: Vec<Request>,
}

impl RequestBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: Request) {
        self.requests.push(request);
    }

    /// Push a request if there is one.
    pub fn push_opt(&mut self, request: Option<Request>) {
        if let Some(request) = request {
            self.requests.push(request);
        }
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Submit everything collected so far. The buffer is empty afterwards,
    /// whether the call succeeds or not; requests a failed call left unsent
    /// are returned in [`TrackerError::BatchAborted`].
    pub fn flush(
        &mut self,
        store: &dyn RemoteStore,
        config: &BatchConfig,
        sink: Option<&dyn DiagnosticSink>,
    ) -> Result<BatchReport> {
        let requests = std::mem::take(&mut self.requests);
        execute_batches(store, requests, config, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_sizes() {
        let chunks = chunk((0..7).collect::<Vec<_>>(), 3);
        assert_eq!(chunks, vec![vec![0, 1, 2], vec![3, 4, 5], vec![6]]);

        let exact = chunk(vec![1, 2, 3, 4], 2);
        assert_eq!(exact.len(), 2);

        let empty: Vec<Vec<i32>> = chunk(Vec::new(), 5);
        assert!(empty.is_empty());

        assert_eq!(chunk(vec![1, 2], 0), vec![vec![1], vec![2]]);
    }

    #[test]
    fn test_rebase() {
        let fault = BatchItemResult::Fault {
            request_index: 2,
            message: "x".to_string(),
        };
        assert_eq!(rebase(fault, 10).request_index(), 12);
    }

    #[test]
    fn test_config_settings() {
        let config = BatchConfig {
            continue_on_error: false,
            ..Default::default()
        };
        let settings = config.settings();
        assert!(!settings.continue_on_error);
        assert!(settings.return_responses);
    }
}
