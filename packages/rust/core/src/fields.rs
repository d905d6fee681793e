//! Per-field accessors over a [`RowMapping`].
//!
//! Each accessor reads one column and returns a `FieldExtraction` error when
//! the cell does not have the shape it expects. None of them touch the
//! network.

use std::ops::ControlFlow;

use chrono::NaiveDate;
use url::Url;

use ballot_dom::{Element, Node, find_first, walk};
use ballot_sanitize::CITATION_HREF_PREFIX;
use ballot_shared::{BallotError, Birthplace, Result, slugify};

use crate::dates::{date_after_any_label, parse_calendar_date};
use crate::table::RowMapping;

/// Column holding the portrait and the linked name.
pub const NAME_COLUMN: &str = "Name";
/// Column holding the birth date span and the linked birthplace.
pub const BORN_COLUMN: &str = "Born";
/// Column holding the linked home state.
pub const STATE_COLUMN: &str = "State";
/// Column holding campaign links, logo, and announcement dates.
pub const CAMPAIGN_COLUMN: &str = "Campaign";

/// Links found in the campaign cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignLinks {
    /// First text link: the article about the campaign.
    pub wikipedia_campaign_url: Option<String>,
    /// Second text link: the official campaign site.
    pub campaign_url: Option<String>,
    /// Third text link, when present: the candidacy filing.
    pub legal_filing_url: Option<String>,
    /// Source of the first image link.
    pub campaign_logo_url: Option<String>,
}

/// Dates announced in the campaign cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CampaignDates {
    pub exploratory_committee: Option<NaiveDate>,
    pub campaign_start: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Display name: the first text link in the name cell plus any trailing text.
pub fn full_name(row: &RowMapping) -> Result<String> {
    let cell = column(row, NAME_COLUMN, "name")?;
    let run = text_anchor_run(cell).ok_or_else(|| BallotError::field("name", "no text link"))?;
    non_empty(flatten_run(run), "name")
}

/// Slug identifier derived from the display name.
pub fn candidate_id(name: &str) -> Result<String> {
    let id = slugify(name);
    if id.is_empty() {
        return Err(BallotError::field("id", format!("{name:?} has no slug")));
    }
    Ok(id)
}

/// Absolute URL of the candidate's own article.
pub fn profile_url(row: &RowMapping, base: &Url) -> Result<String> {
    let cell = column(row, NAME_COLUMN, "profile url")?;
    let href = text_anchor_run(cell)
        .and_then(|run| run.first())
        .and_then(Node::as_element)
        .and_then(|anchor| anchor.attr("href"))
        .ok_or_else(|| BallotError::field("profile url", "name link has no href"))?;
    absolutize(base, href, "profile url")
}

// ---------------------------------------------------------------------------
// Name cell
// ---------------------------------------------------------------------------

/// Portrait source: the first image nested in a link, as written.
pub fn image_url(row: &RowMapping) -> Result<String> {
    let cell = column(row, NAME_COLUMN, "image")?;
    let src = walk(std::slice::from_ref(cell), |node, _| {
        if !node.is_tag("a") {
            return ControlFlow::Continue(());
        }
        match find_first(node.children(), |n| n.is_tag("img"))
            .and_then(Node::as_element)
            .and_then(|img| img.attr("src"))
        {
            Some(src) => ControlFlow::Break(src),
            None => ControlFlow::Continue(()),
        }
    })
    .ok_or_else(|| BallotError::field("image", "no linked image"))?;
    non_empty(src.trim().to_string(), "image")
}

// ---------------------------------------------------------------------------
// State and Born cells
// ---------------------------------------------------------------------------

pub fn home_state(row: &RowMapping) -> Result<String> {
    let cell = column(row, STATE_COLUMN, "home state")?;
    let run =
        text_anchor_run(cell).ok_or_else(|| BallotError::field("home state", "no text link"))?;
    non_empty(flatten_run(run), "home state")
}

/// Date from the first `span` of the born cell.
pub fn birth_date(row: &RowMapping) -> Result<NaiveDate> {
    let cell = column(row, BORN_COLUMN, "birth date")?;
    let span = find_first(cell.children(), |n| n.is_tag("span"))
        .ok_or_else(|| BallotError::field("birth date", "no date span"))?;
    let text = span.text_content();
    parse_calendar_date(&text)
        .ok_or_else(|| BallotError::field("birth date", format!("unrecognized date {text:?}")))
}

/// City and state from the linked place in the born cell.
///
/// The flattened place is split on commas: the first segment is the city and
/// the last is the state.
pub fn birthplace(row: &RowMapping) -> Result<Birthplace> {
    let cell = column(row, BORN_COLUMN, "birthplace")?;
    let run =
        text_anchor_run(cell).ok_or_else(|| BallotError::field("birthplace", "no text link"))?;
    let place = non_empty(flatten_run(run), "birthplace")?;

    let mut segments = place.split(',').map(str::trim);
    let city = segments.next().unwrap_or_default().to_string();
    let state = segments
        .next_back()
        .map_or_else(|| city.clone(), str::to_string);
    Ok(Birthplace { city, state })
}

// ---------------------------------------------------------------------------
// Campaign cell
// ---------------------------------------------------------------------------

/// Links of the campaign cell by position.
///
/// Every text link takes one slot, even without an `href`; footnote markers
/// (`#cite_note-...`) take none. Slots the cell does not fill stay `None`,
/// and a cell that is missing altogether is an error.
pub fn campaign_links(row: &RowMapping, base: &Url) -> Result<CampaignLinks> {
    let cell = column(row, CAMPAIGN_COLUMN, "campaign links")?;

    let mut slots: Vec<Option<&str>> = Vec::new();
    let mut logo = None;
    let _: Option<()> = walk(std::slice::from_ref(cell), |node, _| {
        if let Some(anchor) = node.as_element().filter(|el| el.tag == "a") {
            if is_text_anchor(anchor) {
                let href = anchor.attr("href");
                if !href.is_some_and(is_citation_href) {
                    slots.push(href);
                }
            } else if logo.is_none() {
                logo = first_image_src(anchor);
            }
        }
        ControlFlow::Continue(())
    });

    let slot = |index: usize| slots.get(index).copied().flatten();
    Ok(CampaignLinks {
        wikipedia_campaign_url: slot(0)
            .and_then(|href| absolutize(base, href, "campaign article").ok()),
        campaign_url: slot(1).map(str::to_string),
        legal_filing_url: slot(2).map(str::to_string),
        campaign_logo_url: logo.and_then(|src| absolutize(base, src, "campaign logo").ok()),
    })
}

/// Exploratory committee and announcement dates from the campaign cell text.
pub fn campaign_dates<S: AsRef<str>>(
    row: &RowMapping,
    exploratory_labels: &[S],
    announcement_labels: &[S],
) -> Result<CampaignDates> {
    let cell = column(row, CAMPAIGN_COLUMN, "campaign dates")?;
    let text = cell
        .text_content()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    Ok(CampaignDates {
        exploratory_committee: date_after_any_label(&text, exploratory_labels),
        campaign_start: date_after_any_label(&text, announcement_labels),
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn column<'a>(row: &'a RowMapping, label: &str, field: &'static str) -> Result<&'a Node> {
    row.get(label)
        .ok_or_else(|| BallotError::field(field, format!("row has no {label:?} cell")))
}

fn non_empty(text: String, field: &'static str) -> Result<String> {
    if text.is_empty() {
        Err(BallotError::field(field, "text is empty"))
    } else {
        Ok(text)
    }
}

/// Footnote marker such as `#cite_note-3`.
fn is_citation_href(href: &str) -> bool {
    href.starts_with(CITATION_HREF_PREFIX)
}

/// A link whose first child is text, as opposed to an image link.
fn is_text_anchor(anchor: &Element) -> bool {
    matches!(anchor.first_child(), Some(Node::Text(_)))
}

fn first_image_src(anchor: &Element) -> Option<&str> {
    match anchor.first_child() {
        Some(Node::Element(img)) if img.tag == "img" => img.attr("src"),
        _ => None,
    }
}

/// The first text link under `cell` together with the siblings after it.
fn text_anchor_run(cell: &Node) -> Option<&[Node]> {
    walk(std::slice::from_ref(cell), |node, ctx| {
        match (node.as_element(), ctx.parent) {
            (Some(el), Some(parent)) if el.tag == "a" && is_text_anchor(el) => {
                ControlFlow::Break(&parent.children[ctx.index..])
            }
            _ => ControlFlow::Continue(()),
        }
    })
}

/// Flatten a link and its trailing siblings.
///
/// The link contributes all of its text; later elements contribute only
/// their direct text, so links nested in them (footnote markers) drop out.
fn flatten_run(run: &[Node]) -> String {
    let mut out = String::new();
    for (i, node) in run.iter().enumerate() {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) if i == 0 => out.push_str(&node.text_content()),
            Node::Element(el) => out.push_str(&el.own_text()),
        }
    }
    out.trim().to_string()
}

/// Resolve a site-relative or protocol-relative reference against `base`.
///
/// Absolute URLs are returned unchanged.
fn absolutize(base: &Url, href: &str, field: &'static str) -> Result<String> {
    match Url::parse(href) {
        Ok(_) => Ok(href.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => base
            .join(href)
            .map(String::from)
            .map_err(|e| BallotError::field(field, format!("cannot resolve {href:?}: {e}"))),
        Err(e) => Err(BallotError::field(field, format!("invalid url {href:?}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_dom::parse_fragment;

    use crate::table::extract_table;

    fn base() -> Url {
        Url::parse("https://en.wikipedia.org").expect("valid url")
    }

    /// Build a one-row table under heading "T" from the given cells.
    fn row(cells: &[(&str, &str)]) -> RowMapping {
        let header: String = cells.iter().map(|(label, _)| format!("<th>{label}</th>")).collect();
        let body: String = cells.iter().map(|(_, cell)| format!("<td>{cell}</td>")).collect();
        let markup = format!("<h2>T</h2><table><tr>{header}</tr><tr>{body}</tr></table>");
        let nodes = parse_fragment(&markup);
        extract_table(&nodes, "T")
            .expect("table")
            .into_iter()
            .next()
            .expect("one row")
    }

    #[test]
    fn jane_doe_row() {
        let row = row(&[
            (
                "Name",
                r#"<a href="/wiki/File:Jane.jpg"><img src="//upload.wikimedia.org/jane.jpg"></a><br><b><a href="/wiki/Jane_Doe">Jane Doe</a></b>"#,
            ),
            ("Born", "<span>January 1, 1970</span>"),
            ("State", r#"<a href="/wiki/California">California</a>"#),
            (
                "Campaign",
                r#"<a href="/wiki/Jane_Doe_2020_presidential_campaign">Campaign</a><br><a href="https://janedoe.example">Website</a>"#,
            ),
        ]);

        assert_eq!(full_name(&row).expect("name"), "Jane Doe");
        assert_eq!(candidate_id("Jane Doe").expect("id"), "jane-doe");
        assert_eq!(home_state(&row).expect("state"), "California");
        assert_eq!(birth_date(&row).ok(), NaiveDate::from_ymd_opt(1970, 1, 1));
        assert_eq!(
            profile_url(&row, &base()).expect("profile"),
            "https://en.wikipedia.org/wiki/Jane_Doe"
        );
        assert_eq!(
            image_url(&row).expect("image"),
            "//upload.wikimedia.org/jane.jpg"
        );

        let links = campaign_links(&row, &base()).expect("links");
        assert_eq!(links.campaign_url.as_deref(), Some("https://janedoe.example"));
        assert_eq!(
            links.wikipedia_campaign_url.as_deref(),
            Some("https://en.wikipedia.org/wiki/Jane_Doe_2020_presidential_campaign")
        );
        assert_eq!(links.legal_filing_url, None);
        assert_eq!(links.campaign_logo_url, None);
    }

    #[test]
    fn birthplace_splits_city_and_state() {
        let row = row(&[(
            "Born",
            r#"<span>July 4, 1976</span> <a href="/wiki/Springfield,_Illinois">Springfield</a>, <a href="/wiki/Illinois">Illinois</a>"#,
        )]);
        assert_eq!(
            birthplace(&row).expect("birthplace"),
            Birthplace {
                city: "Springfield".into(),
                state: "Illinois".into()
            }
        );
        assert_eq!(birth_date(&row).ok(), NaiveDate::from_ymd_opt(1976, 7, 4));
    }

    #[test]
    fn birthplace_from_single_link() {
        let row = row(&[(
            "Born",
            r##"<span style="display:none">(<span class="bday">1942-11-20</span>)</span>November 20, 1942<br>(age 77)<br><a href="/wiki/Scranton,_Pennsylvania">Scranton, Pennsylvania</a><sup><a href="#cite_note-1">[1]</a></sup>"##,
        )]);
        let place = birthplace(&row).expect("birthplace");
        assert_eq!(place.city, "Scranton");
        assert_eq!(place.state, "Pennsylvania");
        assert_eq!(birth_date(&row).ok(), NaiveDate::from_ymd_opt(1942, 11, 20));
    }

    #[test]
    fn name_trailing_text_is_kept() {
        let row = row(&[(
            "Name",
            r##"<a href="/wiki/Jane_Doe">Jane</a> Q. <i>Doe</i><sup><a href="#cite_note-1">[1]</a></sup>"##,
        )]);
        assert_eq!(full_name(&row).expect("name"), "Jane Q. Doe");
    }

    #[test]
    fn absolute_profile_url_passes_through() {
        let row = row(&[("Name", r#"<a href="https://example.org/jane">Jane</a>"#)]);
        assert_eq!(
            profile_url(&row, &base()).expect("profile"),
            "https://example.org/jane"
        );
    }

    #[test]
    fn campaign_cell_with_filing_logo_and_dates() {
        let row = row(&[(
            "Campaign",
            r#"<a href="/wiki/File:Logo.svg"><img src="//upload.wikimedia.org/logo.svg"></a><br>
               Exploratory committee: December 31, 2018<br>
               Campaign: February 9, 2019<br>
               <a href="/wiki/Doe_campaign">Campaign</a><br>
               <a href="https://doe.example">Website</a><br>
               <a href="https://docquery.fec.gov/doe.pdf">FEC filing</a>"#,
        )]);

        let links = campaign_links(&row, &base()).expect("links");
        assert_eq!(
            links.campaign_logo_url.as_deref(),
            Some("https://upload.wikimedia.org/logo.svg")
        );
        assert_eq!(
            links.legal_filing_url.as_deref(),
            Some("https://docquery.fec.gov/doe.pdf")
        );

        let exploratory = ["Exploratory committee announced: ", "Exploratory committee: "];
        let announced = ["Campaign announced: ", "Announced: ", "Campaign: "];
        let dates = campaign_dates(&row, &exploratory, &announced).expect("dates");
        assert_eq!(dates.exploratory_committee, NaiveDate::from_ymd_opt(2018, 12, 31));
        assert_eq!(dates.campaign_start, NaiveDate::from_ymd_opt(2019, 2, 9));
    }

    #[test]
    fn text_link_without_href_keeps_its_slot() {
        let row = row(&[(
            "Campaign",
            r#"<a>Campaign</a><br><a href="https://w.example">Website</a>"#,
        )]);
        let links = campaign_links(&row, &base()).expect("links");
        assert_eq!(links.wikipedia_campaign_url, None);
        assert_eq!(links.campaign_url.as_deref(), Some("https://w.example"));
        assert_eq!(links.legal_filing_url, None);
    }

    #[test]
    fn only_citation_markers_are_skipped() {
        let row = row(&[(
            "Campaign",
            r##"<a href="/wiki/Doe_campaign">Campaign</a><sup><a href="#cite_note-4">[4]</a></sup><br>
               <a href="https://doe.example">Website</a><br>
               <a href="#Filing">FEC filing</a>"##,
        )]);
        let links = campaign_links(&row, &base()).expect("links");
        assert_eq!(
            links.wikipedia_campaign_url.as_deref(),
            Some("https://en.wikipedia.org/wiki/Doe_campaign")
        );
        assert_eq!(links.campaign_url.as_deref(), Some("https://doe.example"));
        assert_eq!(links.legal_filing_url.as_deref(), Some("#Filing"));
    }

    #[test]
    fn image_src_is_kept_as_written() {
        let row = row(&[(
            "Name",
            r#"<a href="/wiki/File:Sam.jpg"><img src="//upload.wikimedia.org/sam.jpg"></a> <a href="/wiki/Sam">Sam</a>"#,
        )]);
        assert_eq!(image_url(&row).expect("image"), "//upload.wikimedia.org/sam.jpg");
    }

    #[test]
    fn missing_cells_are_field_errors() {
        let row = row(&[("Name", "Plain text, no link")]);
        for err in [
            full_name(&row).unwrap_err(),
            home_state(&row).unwrap_err(),
            birth_date(&row).unwrap_err(),
            campaign_links(&row, &base()).unwrap_err(),
        ] {
            assert!(matches!(err, BallotError::FieldExtraction { .. }), "{err}");
        }
    }

    #[test]
    fn blank_name_has_no_id() {
        assert!(candidate_id("").is_err());
        assert!(candidate_id("…").is_err());
    }
}
