pub mod extract;
pub mod inspect;
mod source;

use tracing::{info, warn};

use crate::checklist::ParseOutcome;

pub(crate) fn log_parse_summary(outcome: &ParseOutcome) {
    let counts = outcome.counts();
    info!(
        sections = counts.sections,
        categories = counts.categories,
        activities = counts.activities,
        skipped_lines = outcome.skipped_lines.len(),
        "parsed checklist"
    );

    for section in &outcome.filtered_sections {
        info!(
            section = %section.section_number,
            name = %section.name,
            reason = section.reason.as_str(),
            "section removed by post-filter"
        );
    }

    let orphaned = outcome.orphaned_line_count();
    if orphaned > 0 {
        warn!(orphaned, "structural lines without an open parent were dropped");
    }

    for category_number in outcome.empty_categories() {
        warn!(category = %category_number, "category has no activities");
    }
}
