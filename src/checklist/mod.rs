mod classify;
mod parser;

pub use parser::{ChecklistParser, FilteredSection, ParseOutcome, SkippedLine, lines_from_pages};
