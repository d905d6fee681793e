//! End-to-end extraction: election page → tables → records → biographies.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use url::Url;

use ballot_dom::{Node, find_by_class, parse_document};
use ballot_fetch::DocumentSource;
use ballot_shared::{BallotError, CandidateRecord, Candidates, ExtractConfig, Result};

use crate::biography::biography_from_markup;
use crate::fields;
use crate::table::{RowMapping, extract_table};

/// Result of an extraction run.
#[derive(Debug)]
pub struct Extraction {
    /// Records per section label, in table row order.
    pub candidates: Candidates,
    /// Rows skipped and biographies that could not be resolved.
    pub failures: Vec<RecordFailure>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

impl Extraction {
    /// Number of records across all sections.
    pub fn record_count(&self) -> usize {
        self.candidates.values().map(Vec::len).sum()
    }
}

/// A failure confined to one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    /// Section label the row belongs to.
    pub section: String,
    /// 1-based row number below the header.
    pub row: usize,
    /// Candidate id, when the row got far enough to have one.
    pub id: Option<String>,
    pub error: String,
}

/// Progress callback for reporting extraction status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once per section after its table is read.
    fn section_found(&self, label: &str, rows: usize);
    /// Called as each record's biography is settled, in output order.
    fn record_done(&self, name: &str, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self, extraction: &Extraction);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn section_found(&self, _label: &str, _rows: usize) {}
    fn record_done(&self, _name: &str, _current: usize, _total: usize) {}
    fn done(&self, _extraction: &Extraction) {}
}

/// Fetch the election page through `source` and extract every section.
#[instrument(skip_all, fields(url = %config.election_url))]
pub async fn run<S>(
    config: &ExtractConfig,
    source: Arc<S>,
    progress: &dyn ProgressReporter,
) -> Result<Extraction>
where
    S: DocumentSource + 'static,
{
    progress.phase("Fetching election page");
    let markup = source.fetch(&config.election_url).await?;
    extract_page(&markup, source, config, progress).await
}

/// Extract every section from already retrieved election page markup.
///
/// Biographies are still fetched through `source`.
pub async fn extract_page<S>(
    markup: &str,
    source: Arc<S>,
    config: &ExtractConfig,
    progress: &dyn ProgressReporter,
) -> Result<Extraction>
where
    S: DocumentSource + 'static,
{
    let page = parse_document(markup);
    let content = find_by_class(&page, &config.content_class).ok_or_else(|| {
        BallotError::parse(format!(
            "election page has no element with class {:?}",
            config.content_class
        ))
    })?;

    extract_all(content.children(), source, config, progress).await
}

/// Extract every configured section from the election page's content blocks.
///
/// 1. Read each section's table; any structural error aborts the run
/// 2. Map rows to records; rows without a usable name are skipped
/// 3. Fetch biographies concurrently, bounded by `config.concurrency`
/// 4. Collect in row order
#[instrument(skip_all, fields(sections = config.sections.len()))]
pub async fn extract_all<S>(
    content: &[Node],
    source: Arc<S>,
    config: &ExtractConfig,
    progress: &dyn ProgressReporter,
) -> Result<Extraction>
where
    S: DocumentSource + 'static,
{
    let start = Instant::now();

    // --- Phase 1: Tables ---
    progress.phase("Reading candidate tables");
    let mut tables = Vec::with_capacity(config.sections.len());
    for section in &config.sections {
        let rows = extract_table(content, &section.heading)?;
        info!(section = %section.label, rows = rows.len(), "found candidate table");
        progress.section_found(&section.label, rows.len());
        tables.push((section.label.as_str(), rows));
    }

    // --- Phase 2: Records + biography tasks ---
    progress.phase("Resolving biographies");
    let permits = Arc::new(Semaphore::new(config.concurrency.max(1) as usize));
    let mut failures = Vec::new();
    let mut pending = Vec::new();

    for (label, rows) in &tables {
        for (index, row) in rows.iter().enumerate() {
            let row_number = index + 1;
            match build_record(row, config) {
                Ok(record) => {
                    let task = match fields::profile_url(row, &config.base_url)
                        .and_then(|url| parse_url(&url))
                    {
                        Ok(url) => Some(spawn_biography(
                            Arc::clone(&source),
                            Arc::clone(&permits),
                            url,
                            config.content_class.clone(),
                        )),
                        Err(e) => {
                            warn!(id = %record.id, error = %e, "no profile to fetch");
                            let id = Some(record.id.as_str());
                            failures.push(failure(label, row_number, id, &e));
                            None
                        }
                    };
                    pending.push((*label, row_number, record, task));
                }
                Err(e) => {
                    warn!(section = %label, row = row_number, error = %e, "skipping row");
                    failures.push(failure(label, row_number, None, &e));
                }
            }
        }
    }

    // --- Phase 3: Collect in row order ---
    let mut candidates: Candidates = config
        .sections
        .iter()
        .map(|section| (section.label.clone(), Vec::new()))
        .collect();

    let total = pending.len();
    for (current, (label, row_number, mut record, task)) in pending.into_iter().enumerate() {
        if let Some(task) = task {
            let outcome = task
                .await
                .map_err(|e| BallotError::fetch(record.id.as_str(), format!("task failed: {e}")))
                .and_then(|result| result);
            match outcome {
                Ok(biography) => record.biography = Some(biography),
                Err(e) => {
                    warn!(id = %record.id, error = %e, "biography unavailable");
                    let id = Some(record.id.as_str());
                    failures.push(failure(label, row_number, id, &e));
                }
            }
        }
        progress.record_done(&record.name, current + 1, total);
        candidates.entry(label.to_string()).or_default().push(record);
    }

    let extraction = Extraction {
        candidates,
        failures,
        elapsed: start.elapsed(),
    };

    progress.done(&extraction);

    info!(
        records = extraction.record_count(),
        failures = extraction.failures.len(),
        elapsed_ms = extraction.elapsed.as_millis(),
        "extraction complete"
    );

    Ok(extraction)
}

// ---------------------------------------------------------------------------
// Per-row work
// ---------------------------------------------------------------------------

/// Every synchronous field of one row. Only the name is required.
fn build_record(row: &RowMapping, config: &ExtractConfig) -> Result<CandidateRecord> {
    let name = fields::full_name(row)?;
    let id = fields::candidate_id(&name)?;

    let links = optional(&id, fields::campaign_links(row, &config.base_url)).unwrap_or_default();
    let dates = optional(
        &id,
        fields::campaign_dates(row, &config.exploratory_labels, &config.announcement_labels),
    )
    .unwrap_or_default();

    let record = CandidateRecord {
        image: optional(&id, fields::image_url(row)),
        home_state: optional(&id, fields::home_state(row)),
        birthdate: optional(&id, fields::birth_date(row)),
        birthplace: optional(&id, fields::birthplace(row)),
        campaign_url: links.campaign_url,
        wikipedia_bio_url: optional(&id, fields::profile_url(row, &config.base_url)),
        wikipedia_campaign_url: links.wikipedia_campaign_url,
        campaign_logo_url: links.campaign_logo_url,
        legal_filing_url: links.legal_filing_url,
        exploratory_committee_date: dates.exploratory_committee,
        campaign_start_date: dates.campaign_start,
        biography: None,
        id,
        name,
    };

    debug!(id = %record.id, "built record");
    Ok(record)
}

/// Degrade a field error to `None`.
fn optional<T>(id: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(id, error = %e, "field left empty");
            None
        }
    }
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| BallotError::parse(format!("invalid url {url:?}: {e}")))
}

/// Fetch and sanitize one biography on its own task.
fn spawn_biography<S>(
    source: Arc<S>,
    permits: Arc<Semaphore>,
    url: Url,
    content_class: String,
) -> JoinHandle<Result<String>>
where
    S: DocumentSource + 'static,
{
    tokio::spawn(async move {
        let _permit = permits
            .acquire_owned()
            .await
            .map_err(|_| BallotError::fetch(url.as_str(), "fetch pool closed"))?;
        let markup = source.fetch(&url).await?;
        biography_from_markup(&markup, &content_class)
    })
}

fn failure(section: &str, row: usize, id: Option<&str>, error: &BallotError) -> RecordFailure {
    RecordFailure {
        section: section.to_string(),
        row,
        id: id.map(str::to_string),
        error: error.to_string(),
    }
}
