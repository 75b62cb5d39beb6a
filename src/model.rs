use serde::{Deserialize, Serialize};

use crate::checklist::{FilteredSection, SkippedLine};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub activity_number: String,
    pub activity_text: String,
    pub is_compulsory: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub category_number: String,
    pub name: String,
    pub applicable_coaches: Vec<String>,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub section_number: String,
    pub name: String,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseCounts {
    pub sections: usize,
    pub categories: usize,
    pub activities: usize,
}

impl ParseCounts {
    pub fn from_sections(sections: &[Section]) -> Self {
        let categories = sections
            .iter()
            .map(|section| section.categories.len())
            .sum();
        let activities = sections
            .iter()
            .flat_map(|section| section.categories.iter())
            .map(|category| category.activities.len())
            .sum();

        Self {
            sections: sections.len(),
            categories,
            activities,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceDocument {
    pub path: String,
    pub kind: String,
    pub sha256: String,
    pub page_count: usize,
    pub line_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractPaths {
    pub sql_path: String,
    pub json_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub strict: bool,
    pub source: SourceDocument,
    pub paths: ExtractPaths,
    pub counts: ParseCounts,
    pub skipped_lines: Vec<SkippedLine>,
    pub filtered_sections: Vec<FilteredSection>,
    pub empty_categories: Vec<String>,
    pub warnings: Vec<String>,
}
