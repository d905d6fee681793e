//! Output record types written to `candidates.json`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Candidate records keyed by section label (e.g. `democratic`), each in table row order.
pub type Candidates = BTreeMap<String, Vec<CandidateRecord>>;

/// City and state split out of the "Born" cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Birthplace {
    pub city: String,
    pub state: String,
}

/// One fully extracted table row.
///
/// Only `id` and `name` are guaranteed; every other field degrades to `null`
/// when its heuristic does not match the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    /// Slug derived from the display name.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Portrait image URL.
    pub image: Option<String>,
    /// Home state as printed in the "State" column.
    pub home_state: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub birthplace: Option<Birthplace>,
    /// Official campaign website.
    pub campaign_url: Option<String>,
    /// Candidate's own encyclopedia article.
    pub wikipedia_bio_url: Option<String>,
    /// Encyclopedia article about the campaign.
    pub wikipedia_campaign_url: Option<String>,
    pub campaign_logo_url: Option<String>,
    /// Statement-of-candidacy filing document.
    pub legal_filing_url: Option<String>,
    pub exploratory_committee_date: Option<NaiveDate>,
    pub campaign_start_date: Option<NaiveDate>,
    /// Sanitized lead paragraphs of the candidate's article, as markup.
    pub biography: Option<String>,
}
