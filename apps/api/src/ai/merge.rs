use crate::ai::job_parser::ParsedJob;
use crate::scrape::ScrapedRecord;

/// Reconciles scraper observations with the LLM's structured record.
///
/// `platform` and `title` are read straight off the markup, so a non-empty scraped value
/// replaces the inferred one. Every other field keeps the LLM value.
pub fn merge_scraped(scraped: &ScrapedRecord, mut parsed: ParsedJob) -> ParsedJob {
    let platform = scraped.platform.as_str();
    if !platform.is_empty() {
        parsed.platform = platform.to_string();
    }
    if let Some(title) = scraped.title.as_deref().filter(|t| !t.is_empty()) {
        parsed.title = title.to_string();
    }
    parsed
}
