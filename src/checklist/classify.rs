use anyhow::{Context, Result};
use regex::Regex;

const SECTION_NUMBERS: [&str; 7] = ["1", "2", "3", "4", "5", "6", "7"];
const MIN_SECTION_NAME_CHARS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Section {
        number: String,
        name: String,
    },
    Category {
        number: String,
        name: String,
        coaches: Vec<String>,
    },
    Activity {
        number: String,
        text: String,
    },
    Unrecognized,
}

#[derive(Debug)]
pub struct LinePatterns {
    section: Regex,
    category: Regex,
    activity: Regex,
    numbered_prefix: Regex,
}

impl LinePatterns {
    pub fn new() -> Result<Self> {
        Ok(Self {
            section: Regex::new(r"^(\d+)\s+([A-Za-z\s-]+)$")
                .context("failed to compile section header regex")?,
            category: Regex::new(r"^(\d+\.\d+[A-Z]?)\s+([A-Za-z\s–-]+?)\s*\(([A-Za-z,\s]+)\)$")
                .context("failed to compile category header regex")?,
            activity: Regex::new(r"^(\d+)\s+(.+)$")
                .context("failed to compile activity line regex")?,
            numbered_prefix: Regex::new(r"^\d+[.\s]")
                .context("failed to compile numbered prefix regex")?,
        })
    }

    pub fn classify(&self, line: &str) -> LineKind {
        if let Some((number, name)) = self.section_header(line) {
            if is_accepted_section(&number, &name) {
                return LineKind::Section { number, name };
            }
        }

        if let Some(captures) = self.category.captures(line) {
            let number = capture_trimmed(&captures, 1);
            let name = capture_trimmed(&captures, 2);
            let coaches = captures
                .get(3)
                .map(|value| parse_coach_list(value.as_str()))
                .unwrap_or_default();
            return LineKind::Category {
                number,
                name,
                coaches,
            };
        }

        if let Some(captures) = self.activity.captures(line) {
            return LineKind::Activity {
                number: capture_trimmed(&captures, 1),
                text: capture_trimmed(&captures, 2),
            };
        }

        LineKind::Unrecognized
    }

    pub fn has_section_shape(&self, line: &str) -> bool {
        self.section.is_match(line)
    }

    pub fn starts_numbered(&self, line: &str) -> bool {
        self.numbered_prefix.is_match(line)
    }

    fn section_header(&self, line: &str) -> Option<(String, String)> {
        let captures = self.section.captures(line)?;
        Some((capture_trimmed(&captures, 1), capture_trimmed(&captures, 2)))
    }
}

fn is_accepted_section(number: &str, name: &str) -> bool {
    SECTION_NUMBERS.contains(&number) && name.chars().count() >= MIN_SECTION_NAME_CHARS
}

fn capture_trimmed(captures: &regex::Captures<'_>, index: usize) -> String {
    captures
        .get(index)
        .map(|value| value.as_str().trim().to_string())
        .unwrap_or_default()
}

pub fn parse_coach_list(raw: &str) -> Vec<String> {
    let mut coaches = Vec::<String>::new();
    for token in raw.split(',') {
        let token = token.trim();
        if token.is_empty() || coaches.iter().any(|existing| existing == token) {
            continue;
        }
        coaches.push(token.to_string());
    }
    coaches
}
