use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::checklist::ChecklistParser;
use crate::cli::InspectArgs;
use crate::commands::log_parse_summary;
use crate::commands::source::load_source;

pub fn run(args: InspectArgs) -> Result<()> {
    let source = load_source(&args.source)?;
    let parser = ChecklistParser::new()?;
    let outcome = parser.parse_lines(&source.lines);

    log_parse_summary(&outcome);

    for section in &outcome.sections {
        let activities: usize = section
            .categories
            .iter()
            .map(|category| category.activities.len())
            .sum();
        info!(
            section = %section.section_number,
            name = %section.name,
            categories = section.categories.len(),
            activities,
            "section"
        );
    }

    if args.show_skipped {
        for line in &outcome.skipped_lines {
            warn!(
                line = line.line_number,
                reason = line.reason.as_str(),
                text = %line.text,
                "skipped line"
            );
        }
    }

    if args.json {
        let rendered = serde_json::to_string_pretty(&outcome.sections)
            .context("failed to serialize checklist json")?;
        println!("{rendered}");
    }

    Ok(())
}
