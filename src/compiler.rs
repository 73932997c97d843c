//! Accumulation of extracted rows into per-session citation tables.
//!
//! The [`SessionStore`] keys each accumulated table by an explicit session
//! identifier; operations take the id as a parameter so the core never
//! depends on ambient session state.

use crate::error::CiteError;
use crate::extractor::{extract_fields, GenerationService};
use crate::fields::{FieldSet, PaperInput};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::{info, warn};

/// In-memory store of accumulated tables, keyed by session id.
///
/// Tables are created empty on first append, grow monotonically via
/// [`SessionStore::append`], and are reset only by [`SessionStore::clear`].
/// State lives in the serving process; nothing survives a restart.
#[derive(Default)]
pub struct SessionStore {
    tables: RwLock<HashMap<String, Vec<FieldSet>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the session's accumulated rows (empty if none exist)
    pub fn rows(&self, session: &str) -> Vec<FieldSet> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables.get(session).cloned().unwrap_or_default()
    }

    /// Append rows to the session's table, returning the full updated table
    pub fn append(&self, session: &str, rows: Vec<FieldSet>) -> Vec<FieldSet> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let table = tables.entry(session.to_string()).or_default();
        table.extend(rows);
        table.clone()
    }

    /// Reset the session's table to empty; idempotent
    pub fn clear(&self, session: &str) {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        tables.insert(session.to_string(), Vec::new());
    }
}

/// Compile a batch of paper inputs into the session's accumulated table.
///
/// Pairs blank in both fields are dropped. The remaining pairs are
/// extracted sequentially; a shape mismatch or a failed generation call
/// degrades that one row to link-only blanks so a single bad extraction
/// never aborts the batch. Returns the full updated table, old and new rows.
pub async fn compile_batch(
    service: &dyn GenerationService,
    store: &SessionStore,
    session: &str,
    inputs: &[PaperInput],
) -> Vec<FieldSet> {
    let mut new_rows = Vec::new();

    for input in inputs.iter().filter(|p| !p.is_blank()) {
        let row = match extract_fields(service, input).await {
            Ok(row) => row,
            Err(CiteError::ShapeMismatch { expected, got }) => {
                warn!(
                    link = %input.link,
                    expected = expected,
                    got = got,
                    "Extraction shape mismatch, degrading row"
                );
                FieldSet::degraded(&input.link)
            }
            Err(e) => {
                warn!(link = %input.link, error = %e, "Extraction failed, degrading row");
                FieldSet::degraded(&input.link)
            }
        };
        new_rows.push(row);
    }

    let appended = new_rows.len();
    let table = store.append(session, new_rows);
    info!(
        session = session,
        appended = appended,
        total = table.len(),
        "Compiled batch"
    );

    table
}

/// Parse an urlencoded form body into paired inputs.
///
/// The form submits parallel ordered `link` and `text` lists; pairs are
/// matched by position, and a trailing unmatched value is dropped.
pub fn parse_form_batch(body: &str) -> Vec<PaperInput> {
    let mut links: Vec<String> = Vec::new();
    let mut texts: Vec<String> = Vec::new();

    for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
        match key.as_ref() {
            "link" => links.push(value.into_owned()),
            "text" => texts.push(value.into_owned()),
            _ => {}
        }
    }

    links
        .into_iter()
        .zip(texts)
        .map(|(link, text)| PaperInput::new(link, text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::fields::{DELIMITER, FIELD_COUNT};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stub service returning a fixed response and counting calls
    struct StubService {
        response: String,
        calls: AtomicUsize,
    }

    impl StubService {
        fn new(response: impl Into<String>) -> Self {
            Self {
                response: response.into(),
                calls: AtomicUsize::new(0),
            }
        }

        fn well_formed() -> Self {
            let raw = (1..=FIELD_COUNT)
                .map(|i| format!("v{}", i))
                .collect::<Vec<_>>()
                .join(DELIMITER);
            Self::new(raw)
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl GenerationService for StubService {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(self.response.clone())
        }
    }

    /// Stub service that always fails with an API error
    struct FailingService;

    #[async_trait]
    impl GenerationService for FailingService {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(CiteError::Api {
                code: 503,
                message: "service unavailable".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_blank_pairs_skipped() {
        let service = StubService::well_formed();
        let store = SessionStore::new();

        let batch = vec![
            PaperInput::new("http://a", "Paper about X"),
            PaperInput::new("", ""),
        ];
        let table = compile_batch(&service, &store, "s1", &batch).await;

        assert_eq!(table.len(), 1);
        assert_eq!(service.call_count(), 1);
    }

    #[tokio::test]
    async fn test_rows_accumulate_across_batches() {
        let service = StubService::well_formed();
        let store = SessionStore::new();

        let batch = vec![PaperInput::new("http://a", "first")];
        let table = compile_batch(&service, &store, "s1", &batch).await;
        assert_eq!(table.len(), 1);

        let batch = vec![PaperInput::new("http://b", "second")];
        let table = compile_batch(&service, &store, "s1", &batch).await;
        assert_eq!(table.len(), 2);
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let service = StubService::well_formed();
        let store = SessionStore::new();

        compile_batch(&service, &store, "s1", &[PaperInput::new("http://a", "x")]).await;
        let other = compile_batch(&service, &store, "s2", &[PaperInput::new("http://b", "y")]).await;

        assert_eq!(other.len(), 1);
        assert_eq!(store.rows("s1").len(), 1);
    }

    #[tokio::test]
    async fn test_shape_mismatch_degrades_row() {
        let service = StubService::new("A|||B|||C");
        let store = SessionStore::new();

        let batch = vec![PaperInput::new("http://a", "Paper about X")];
        let table = compile_batch(&service, &store, "s1", &batch).await;

        assert_eq!(table.len(), 1);
        assert_eq!(table[0].link(), "http://a");
        assert!(table[0].values()[1..].iter().all(|v| v.is_empty()));
    }

    #[tokio::test]
    async fn test_transport_failure_degrades_row_and_continues() {
        let service = FailingService;
        let store = SessionStore::new();

        let batch = vec![
            PaperInput::new("http://a", "first"),
            PaperInput::new("http://b", "second"),
        ];
        let table = compile_batch(&service, &store, "s1", &batch).await;

        assert_eq!(table.len(), 2);
        assert_eq!(table[0].link(), "http://a");
        assert_eq!(table[1].link(), "http://b");
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let service = StubService::well_formed();
        let store = SessionStore::new();

        compile_batch(&service, &store, "s1", &[PaperInput::new("http://a", "x")]).await;
        store.clear("s1");
        assert!(store.rows("s1").is_empty());
        store.clear("s1");
        assert!(store.rows("s1").is_empty());
    }

    #[test]
    fn test_clear_unknown_session() {
        let store = SessionStore::new();
        store.clear("missing");
        assert!(store.rows("missing").is_empty());
    }

    #[test]
    fn test_parse_form_batch_pairs_by_position() {
        let body = "link=http%3A%2F%2Fa&text=Paper+about+X&link=&text=";
        let batch = parse_form_batch(body);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], PaperInput::new("http://a", "Paper about X"));
        assert!(batch[1].is_blank());
    }

    #[test]
    fn test_parse_form_batch_ignores_other_keys() {
        let body = "link=http%3A%2F%2Fa&text=x&submit=Compile";
        let batch = parse_form_batch(body);
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_parse_form_batch_unmatched_trailing_link() {
        let body = "link=http%3A%2F%2Fa&text=x&link=http%3A%2F%2Fb";
        let batch = parse_form_batch(body);
        assert_eq!(batch.len(), 1);
    }
}
