use anyhow::{Result, bail};
use serde::Serialize;
use tracing::debug;

use super::classify::{LineKind, LinePatterns};
use crate::model::{Activity, Category, ParseCounts, Section};

pub const BOOTSTRAP_TITLE_MARKER: &str = "Trip / Depot Examination";
pub const BOOTSTRAP_SECTION_NUMBER: &str = "1";
pub const BOOTSTRAP_SECTION_NAME: &str = "Bogie";
pub const EXCLUDED_SECTION_NAMES: [&str; 1] = ["Visual Inspection"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Unrecognized,
    OrphanCategory,
    OrphanActivity,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unrecognized => "unrecognized",
            Self::OrphanCategory => "orphan_category",
            Self::OrphanActivity => "orphan_activity",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    pub line_number: usize,
    pub text: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterReason {
    ExcludedName,
    NoCategories,
}

impl FilterReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExcludedName => "excluded_name",
            Self::NoCategories => "no_categories",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilteredSection {
    pub section_number: String,
    pub name: String,
    pub reason: FilterReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub sections: Vec<Section>,
    pub skipped_lines: Vec<SkippedLine>,
    pub filtered_sections: Vec<FilteredSection>,
}

impl ParseOutcome {
    pub fn counts(&self) -> ParseCounts {
        ParseCounts::from_sections(&self.sections)
    }

    pub fn empty_categories(&self) -> Vec<String> {
        self.sections
            .iter()
            .flat_map(|section| section.categories.iter())
            .filter(|category| category.activities.is_empty())
            .map(|category| category.category_number.clone())
            .collect()
    }

    pub fn orphaned_line_count(&self) -> usize {
        self.skipped_lines
            .iter()
            .filter(|line| line.reason != SkipReason::Unrecognized)
            .count()
    }

    pub fn ensure_strict(&self) -> Result<()> {
        let orphaned = self.orphaned_line_count();
        let empty_categories = self.empty_categories();

        if orphaned == 0 && empty_categories.is_empty() {
            return Ok(());
        }

        bail!(
            "strict mode rejected parse: {} orphaned structural lines, {} categories without activities [{}]",
            orphaned,
            empty_categories.len(),
            empty_categories.join(", ")
        );
    }
}

#[derive(Debug)]
pub struct ChecklistParser {
    patterns: LinePatterns,
}

impl ChecklistParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            patterns: LinePatterns::new()?,
        })
    }

    pub fn parse_lines<S: AsRef<str>>(&self, lines: &[S]) -> ParseOutcome {
        let mut state = ParseState::default();

        if let Some(first) = lines.first().map(|line| line.as_ref()) {
            if !self.patterns.has_section_shape(first.trim())
                && first.contains(BOOTSTRAP_TITLE_MARKER)
            {
                debug!(title = %first.trim(), "synthesizing leading section from document title");
                state.open_section(
                    BOOTSTRAP_SECTION_NUMBER.to_string(),
                    BOOTSTRAP_SECTION_NAME.to_string(),
                );
            }
        }

        for (index, raw_line) in lines.iter().enumerate() {
            let line = raw_line.as_ref().trim();
            if line.is_empty() {
                continue;
            }

            match self.patterns.classify(line) {
                LineKind::Section { number, name } => state.open_section(number, name),
                LineKind::Category {
                    number,
                    name,
                    coaches,
                } => {
                    if !state.open_category(number, name, coaches) {
                        state.skip(index, line, SkipReason::OrphanCategory);
                    }
                }
                LineKind::Activity { number, text } => {
                    if !state.has_open_category() {
                        state.skip(index, line, SkipReason::OrphanActivity);
                        continue;
                    }

                    let (continuation, end) = self.collect_continuation(lines, index);
                    state.merged_until = state.merged_until.max(end);

                    let mut activity_text = text;
                    for part in continuation {
                        activity_text.push(' ');
                        activity_text.push_str(part);
                    }
                    state.push_activity(number, activity_text);
                }
                LineKind::Unrecognized => {
                    if index >= state.merged_until {
                        state.skip(index, line, SkipReason::Unrecognized);
                    }
                }
            }
        }

        state.finish()
    }

    fn collect_continuation<'a, S: AsRef<str>>(
        &self,
        lines: &'a [S],
        start: usize,
    ) -> (Vec<&'a str>, usize) {
        let mut parts = Vec::new();
        let mut end = start + 1;

        while let Some(next) = lines.get(end) {
            let next = next.as_ref().trim();
            if next.is_empty() || self.patterns.starts_numbered(next) {
                break;
            }
            parts.push(next);
            end += 1;
        }

        (parts, end)
    }
}

#[derive(Debug, Default)]
struct ParseState {
    sections: Vec<Section>,
    current_section: Option<usize>,
    current_category: Option<(usize, usize)>,
    merged_until: usize,
    skipped_lines: Vec<SkippedLine>,
}

impl ParseState {
    fn open_section(&mut self, section_number: String, name: String) {
        debug!(section = %section_number, name = %name, "section opened");
        self.sections.push(Section {
            section_number,
            name,
            categories: Vec::new(),
        });
        self.current_section = Some(self.sections.len() - 1);
    }

    fn open_category(
        &mut self,
        category_number: String,
        name: String,
        coaches: Vec<String>,
    ) -> bool {
        let Some(section_index) = self.current_section else {
            return false;
        };
        let Some(section) = self.sections.get_mut(section_index) else {
            return false;
        };

        section.categories.push(Category {
            category_number,
            name,
            applicable_coaches: coaches,
            activities: Vec::new(),
        });
        self.current_category = Some((section_index, section.categories.len() - 1));
        true
    }

    fn has_open_category(&self) -> bool {
        self.current_category.is_some()
    }

    fn push_activity(&mut self, activity_number: String, activity_text: String) {
        let Some((section_index, category_index)) = self.current_category else {
            return;
        };
        let Some(category) = self
            .sections
            .get_mut(section_index)
            .and_then(|section| section.categories.get_mut(category_index))
        else {
            return;
        };

        category.activities.push(Activity {
            activity_number,
            activity_text,
            is_compulsory: true,
        });
    }

    fn skip(&mut self, index: usize, line: &str, reason: SkipReason) {
        self.skipped_lines.push(SkippedLine {
            line_number: index + 1,
            text: line.to_string(),
            reason,
        });
    }

    fn finish(self) -> ParseOutcome {
        let mut sections = Vec::with_capacity(self.sections.len());
        let mut filtered_sections = Vec::new();

        for section in self.sections {
            let reason = if EXCLUDED_SECTION_NAMES.contains(&section.name.as_str()) {
                Some(FilterReason::ExcludedName)
            } else if section.categories.is_empty() {
                Some(FilterReason::NoCategories)
            } else {
                None
            };

            match reason {
                Some(reason) => filtered_sections.push(FilteredSection {
                    section_number: section.section_number,
                    name: section.name,
                    reason,
                }),
                None => sections.push(section),
            }
        }

        ParseOutcome {
            sections,
            skipped_lines: self.skipped_lines,
            filtered_sections,
        }
    }
}

pub fn lines_from_pages(pages: &[String]) -> Vec<String> {
    let mut full_text = String::new();
    for page in pages {
        full_text.push_str(page);
        full_text.push('\n');
    }

    full_text.split('\n').map(ToOwned::to_owned).collect()
}
