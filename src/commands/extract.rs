use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use crate::checklist::{ChecklistParser, ParseOutcome};
use crate::cli::ExtractArgs;
use crate::commands::log_parse_summary;
use crate::commands::source::load_source;
use crate::model::{ExtractPaths, ExtractRunManifest, SourceDocument};
use crate::sql::{ScriptHeader, render_import_script};
use crate::util::{now_utc_string, utc_compact_string, write_json_pretty, write_text};

pub fn run(args: ExtractArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("extract-{}", utc_compact_string(started_ts));

    info!(run_id = %run_id, strict = args.strict, "starting extract");

    let source = load_source(&args.source)?;
    let parser = ChecklistParser::new()?;
    let outcome = parser.parse_lines(&source.lines);

    log_parse_summary(&outcome);

    if args.strict {
        outcome.ensure_strict()?;
    }

    let header = ScriptHeader {
        source_name: display_file_name(Path::new(&source.document.path)),
        source_sha256: source.document.sha256.clone(),
        generated_at: started_at.clone(),
    };
    let script = render_import_script(&header, &outcome.sections);
    write_text(&args.sql_path, &script)?;
    info!(path = %args.sql_path.display(), "wrote sql script");

    let json_path = if args.no_json {
        None
    } else {
        write_json_pretty(&args.json_path, &outcome.sections)?;
        info!(path = %args.json_path.display(), "wrote structured checklist json");
        Some(args.json_path.display().to_string())
    };

    if let Some(manifest_path) = &args.manifest_path {
        let manifest = build_run_manifest(
            &args,
            run_id,
            started_at,
            source.document,
            json_path,
            &outcome,
        );
        write_json_pretty(manifest_path, &manifest)?;
        info!(path = %manifest_path.display(), "wrote extract run manifest");
    }

    let counts = outcome.counts();
    info!(
        sections = counts.sections,
        categories = counts.categories,
        activities = counts.activities,
        "extract completed"
    );

    Ok(())
}

fn build_run_manifest(
    args: &ExtractArgs,
    run_id: String,
    started_at: String,
    source: SourceDocument,
    json_path: Option<String>,
    outcome: &ParseOutcome,
) -> ExtractRunManifest {
    ExtractRunManifest {
        manifest_version: 1,
        run_id,
        status: "completed".to_string(),
        started_at,
        updated_at: now_utc_string(),
        command: render_extract_command(args),
        strict: args.strict,
        source,
        paths: ExtractPaths {
            sql_path: args.sql_path.display().to_string(),
            json_path,
        },
        counts: outcome.counts(),
        skipped_lines: outcome.skipped_lines.clone(),
        filtered_sections: outcome.filtered_sections.clone(),
        empty_categories: outcome.empty_categories(),
        warnings: collect_warnings(outcome),
    }
}

fn collect_warnings(outcome: &ParseOutcome) -> Vec<String> {
    let mut warnings = Vec::new();

    for section in &outcome.filtered_sections {
        warnings.push(format!(
            "section {} '{}' removed ({})",
            section.section_number,
            section.name,
            section.reason.as_str()
        ));
    }

    let orphaned = outcome.orphaned_line_count();
    if orphaned > 0 {
        warnings.push(format!(
            "{orphaned} structural lines had no open parent and were dropped"
        ));
    }

    for category_number in outcome.empty_categories() {
        warnings.push(format!("category {category_number} has no activities"));
    }

    warnings
}

fn render_extract_command(args: &ExtractArgs) -> String {
    let mut command = vec!["inspection-import".to_string(), "extract".to_string()];

    match &args.source.text_input {
        Some(path) => {
            command.push("--text-input".to_string());
            command.push(path.display().to_string());
        }
        None => command.push(args.source.pdf_path.display().to_string()),
    }
    if let Some(max_pages) = args.source.max_pages {
        command.push("--max-pages".to_string());
        command.push(max_pages.to_string());
    }
    command.push("--sql-path".to_string());
    command.push(args.sql_path.display().to_string());
    if args.no_json {
        command.push("--no-json".to_string());
    } else {
        command.push("--json-path".to_string());
        command.push(args.json_path.display().to_string());
    }
    if let Some(path) = &args.manifest_path {
        command.push("--manifest-path".to_string());
        command.push(path.display().to_string());
    }
    if args.strict {
        command.push("--strict".to_string());
    }

    command.join(" ")
}

fn display_file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;
    use std::path::PathBuf;

    use crate::cli::SourceArgs;

    fn scratch_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "inspection-import-extract-{}-{}",
            label,
            std::process::id()
        ));
        fs::create_dir_all(&dir).expect("scratch dir should be created");
        dir
    }

    fn extract_args(dir: &Path, transcript: &str, strict: bool) -> ExtractArgs {
        let text_path = dir.join("transcript.txt");
        fs::write(&text_path, transcript).expect("transcript should be written");

        ExtractArgs {
            source: SourceArgs {
                pdf_path: PathBuf::from("unused.pdf"),
                text_input: Some(text_path),
                max_pages: None,
            },
            sql_path: dir.join("out").join("import.sql"),
            json_path: dir.join("out").join("inspection_data.json"),
            no_json: false,
            manifest_path: Some(dir.join("out").join("manifest.json")),
            strict,
        }
    }

    const TRANSCRIPT: &str = "Trip / Depot Examination\n\
1.1 Wheel Set (DTC, NDTC)\n\
10 Check wheel profile\n\
and flange thickness\n\
\u{000C}5 Visual Inspection\n\
5.1 Body Panels (MC)\n\
10 Check dents\n";

    #[test]
    fn run_writes_sql_json_and_manifest() {
        let dir = scratch_dir("full");
        let args = extract_args(&dir, TRANSCRIPT, false);

        run(args.clone()).expect("extract should succeed");

        let sql = fs::read_to_string(&args.sql_path).expect("sql should exist");
        assert!(sql.contains("-- Source: transcript.txt"));
        assert!(sql.contains("'Check wheel profile and flange thickness'"));
        assert!(!sql.contains("Visual Inspection"));

        let raw = fs::read(&args.json_path).expect("json should exist");
        let sections: Vec<crate::model::Section> =
            serde_json::from_slice(&raw).expect("json should deserialize");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].name, "Bogie");

        let manifest_path = args.manifest_path.clone().expect("manifest path set");
        let manifest: serde_json::Value = serde_json::from_slice(
            &fs::read(&manifest_path).expect("manifest should exist"),
        )
        .expect("manifest should be json");
        assert_eq!(manifest["counts"]["activities"], 1);
        assert_eq!(manifest["filtered_sections"][0]["reason"], "excluded_name");
        assert_eq!(manifest["source"]["kind"], "text");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn strict_run_fails_before_writing_output() {
        let dir = scratch_dir("strict");
        let transcript =
            "2 Brakes\n2.1 Brake Inspection (DTC)\n2.2 Hoses (MC)\n10 Check couplings\n";
        let args = extract_args(&dir, transcript, true);

        let error = run(args.clone()).expect_err("strict mode should reject empty category");
        assert!(error.to_string().contains("strict mode rejected parse"));
        assert!(!args.sql_path.exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn render_extract_command_reflects_flags() {
        let args = ExtractArgs {
            source: SourceArgs {
                pdf_path: PathBuf::from("checklist.pdf"),
                text_input: None,
                max_pages: Some(4),
            },
            sql_path: PathBuf::from("out.sql"),
            json_path: PathBuf::from("out.json"),
            no_json: true,
            manifest_path: None,
            strict: true,
        };

        assert_eq!(
            render_extract_command(&args),
            "inspection-import extract checklist.pdf --max-pages 4 --sql-path out.sql --no-json --strict"
        );
    }

    #[test]
    fn collect_warnings_lists_filtered_sections_and_empty_categories() {
        let parser = ChecklistParser::new().expect("parser should build");
        let outcome =
            parser.parse_lines(&["2 Brakes", "2.1 Brake Inspection (DTC)", "6 Interior"]);

        let warnings = collect_warnings(&outcome);
        assert!(warnings.contains(&"section 6 'Interior' removed (no_categories)".to_string()));
        assert!(warnings.contains(&"category 2.1 has no activities".to_string()));
    }
}
