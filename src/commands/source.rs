use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::checklist::lines_from_pages;
use crate::cli::SourceArgs;
use crate::model::SourceDocument;
use crate::util::sha256_file;

#[derive(Debug)]
pub struct LoadedSource {
    pub document: SourceDocument,
    pub lines: Vec<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum SourceKind {
    Pdf,
    Text,
}

impl SourceKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Text => "text",
        }
    }
}

pub fn load_source(args: &SourceArgs) -> Result<LoadedSource> {
    let (path, kind) = match &args.text_input {
        Some(text_path) => (text_path.as_path(), SourceKind::Text),
        None => (args.pdf_path.as_path(), SourceKind::Pdf),
    };

    if !path.exists() {
        bail!("input file not found: {}", path.display());
    }

    let pages = match kind {
        SourceKind::Text => read_text_pages(path)?,
        SourceKind::Pdf => extract_pages_with_pdftotext(path, args.max_pages)?,
    };
    let lines = lines_from_pages(&pages);
    let sha256 = sha256_file(path)?;

    info!(
        path = %path.display(),
        kind = kind.as_str(),
        pages = pages.len(),
        lines = lines.len(),
        "loaded source document"
    );

    Ok(LoadedSource {
        document: SourceDocument {
            path: path.display().to_string(),
            kind: kind.as_str().to_string(),
            sha256,
            page_count: pages.len(),
            line_count: lines.len(),
        },
        lines,
    })
}

fn read_text_pages(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(split_pages(&String::from_utf8_lossy(&raw)))
}

fn extract_pages_with_pdftotext(pdf_path: &Path, max_pages: Option<usize>) -> Result<Vec<String>> {
    let mut command = Command::new("pdftotext");
    command.arg("-enc").arg("UTF-8").arg("-f").arg("1");
    if let Some(max_pages) = max_pages {
        command.arg("-l").arg(max_pages.to_string());
    }
    command.arg(pdf_path).arg("-");

    let output = command
        .output()
        .with_context(|| format!("failed to execute pdftotext for {}", pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftotext returned non-zero exit status for {}: {}",
            pdf_path.display(),
            stderr.trim()
        );
    }

    Ok(split_pages(&String::from_utf8_lossy(&output.stdout)))
}

pub(crate) fn split_pages(raw: &str) -> Vec<String> {
    let mut pages: Vec<String> = raw
        .split('\u{000C}')
        .map(|chunk| chunk.replace('\u{0000}', ""))
        .collect();

    while let Some(last_page) = pages.last() {
        if last_page.trim().is_empty() {
            pages.pop();
            continue;
        }
        break;
    }

    pages
}
