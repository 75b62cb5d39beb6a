use std::fmt::Write as _;

use crate::model::Section;

const FALLBACK_CATEGORY_DISPLAY_ORDER: i64 = 100;

#[derive(Debug, Clone)]
pub struct ScriptHeader {
    pub source_name: String,
    pub source_sha256: String,
    pub generated_at: String,
}

pub fn render_import_script(header: &ScriptHeader, sections: &[Section]) -> String {
    let mut sql = String::new();

    push_preamble(&mut sql, header);
    push_sections(&mut sql, sections);
    push_categories(&mut sql, sections);
    push_activities(&mut sql, sections);
    push_epilogue(&mut sql);

    sql
}

pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub fn coach_array_literal(coaches: &[String]) -> String {
    let items = coaches
        .iter()
        .filter(|coach| !coach.is_empty())
        .map(|coach| quote_literal(coach))
        .collect::<Vec<String>>();

    if items.is_empty() {
        return "ARRAY[]::text[]".to_string();
    }

    format!("ARRAY[{}]", items.join(", "))
}

pub fn category_display_order(category_number: &str) -> i64 {
    let digits = category_number
        .replace('.', "")
        .replace('A', "1")
        .replace('B', "2")
        .replace('C', "3");

    digits
        .parse::<i64>()
        .unwrap_or(FALLBACK_CATEGORY_DISPLAY_ORDER)
}

fn section_display_order(section_number: &str) -> i64 {
    section_number.parse::<i64>().unwrap_or(0)
}

fn push_preamble(sql: &mut String, header: &ScriptHeader) {
    let _ = writeln!(sql, "-- SQL script to import all inspection data from PDF");
    let _ = writeln!(sql, "-- Source: {}", header.source_name.replace('\n', " "));
    let _ = writeln!(sql, "-- Source sha256: {}", header.source_sha256);
    let _ = writeln!(sql, "-- Generated at: {}", header.generated_at);
    sql.push_str(
        "
BEGIN;

-- Create temporary tables for mappings
CREATE TEMP TABLE section_mappings (section_number text, section_id uuid);
CREATE TEMP TABLE category_mappings (category_number text, category_id uuid);

-- Store existing section mappings - get IDs of sections that already exist
INSERT INTO section_mappings (section_number, section_id)
SELECT section_number, id FROM inspection_sections;

-- Insert sections that don't exist yet
",
    );
}

fn push_sections(sql: &mut String, sections: &[Section]) {
    for section in sections {
        let number = quote_literal(&section.section_number);
        let name = quote_literal(&section.name);
        let description = quote_literal(&format!("{} inspection", section.name));

        let _ = write!(
            sql,
            "-- Check if section {section_number} exists
DO $$
BEGIN
    IF NOT EXISTS (SELECT 1 FROM inspection_sections WHERE section_number = {number}) THEN
        INSERT INTO inspection_sections (id, section_number, name, description, display_order, active) VALUES
        (uuid_generate_v4(), {number}, {name}, {description}, {display_order}, true);
    END IF;
END $$;

",
            section_number = section.section_number,
            display_order = section_display_order(&section.section_number),
        );
    }

    sql.push_str(
        "
-- Refresh section mappings to include any new sections
TRUNCATE TABLE section_mappings;
INSERT INTO section_mappings (section_number, section_id)
SELECT section_number, id FROM inspection_sections;

-- Insert categories
",
    );
}

fn push_categories(sql: &mut String, sections: &[Section]) {
    for section in sections {
        let section_number = quote_literal(&section.section_number);

        for category in &section.categories {
            let number = quote_literal(&category.category_number);
            let name = quote_literal(&category.name);
            let coaches = coach_array_literal(&category.applicable_coaches);

            let _ = write!(
                sql,
                "-- Check if category {category_number} exists
DO $$
BEGIN
    IF NOT EXISTS (SELECT 1 FROM inspection_categories WHERE category_number = {number}) THEN
        INSERT INTO inspection_categories (id, section_id, category_number, name, applicable_coaches, display_order, active) VALUES
        (uuid_generate_v4(), (SELECT section_id FROM section_mappings WHERE section_number = {section_number}),
        {number}, {name}, {coaches},
        {display_order}, true);
    END IF;
END $$;

",
                category_number = category.category_number,
                display_order = category_display_order(&category.category_number),
            );
        }
    }

    sql.push_str(
        "
-- Store category mappings for newly inserted categories
TRUNCATE TABLE category_mappings;
INSERT INTO category_mappings (category_number, category_id)
SELECT category_number, id FROM inspection_categories;

-- Insert activities
",
    );
}

fn push_activities(sql: &mut String, sections: &[Section]) {
    for category in sections.iter().flat_map(|section| section.categories.iter()) {
        let category_number = quote_literal(&category.category_number);

        for (index, activity) in category.activities.iter().enumerate() {
            let activity_number = quote_literal(&activity.activity_number);
            let activity_text = quote_literal(&activity.activity_text);

            let _ = write!(
                sql,
                "-- Add activity {raw_activity} for category {raw_category}
INSERT INTO inspection_activities (id, category_id, activity_number, activity_text, is_compulsory, display_order, active)
SELECT uuid_generate_v4(), category_id, {activity_number}, {activity_text}, {is_compulsory}, {display_order}, true
FROM category_mappings
WHERE category_number = {category_number}
AND NOT EXISTS (
    SELECT 1 FROM inspection_activities ia
    JOIN inspection_categories ic ON ia.category_id = ic.id
    WHERE ic.category_number = {category_number} AND ia.activity_number = {activity_number}
);

",
                raw_activity = activity.activity_number,
                raw_category = category.category_number,
                is_compulsory = activity.is_compulsory,
                display_order = index + 1,
            );
        }
    }
}

fn push_epilogue(sql: &mut String) {
    sql.push_str(
        "
-- Drop temporary tables
DROP TABLE IF EXISTS section_mappings;
DROP TABLE IF EXISTS category_mappings;

COMMIT;
",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{Activity, Category};

    fn header() -> ScriptHeader {
        ScriptHeader {
            source_name: "checklist.pdf".to_string(),
            source_sha256: "abc123".to_string(),
            generated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    fn sample_sections() -> Vec<Section> {
        vec![Section {
            section_number: "2".to_string(),
            name: "Brakes".to_string(),
            categories: vec![Category {
                category_number: "2.1A".to_string(),
                name: "Brake Inspection".to_string(),
                applicable_coaches: vec!["DTC".to_string(), "NDTC".to_string()],
                activities: vec![
                    Activity {
                        activity_number: "10".to_string(),
                        activity_text: "Check the driver's brake valve".to_string(),
                        is_compulsory: true,
                    },
                    Activity {
                        activity_number: "11".to_string(),
                        activity_text: "Check pads".to_string(),
                        is_compulsory: true,
                    },
                ],
            }],
        }]
    }

    #[test]
    fn category_display_order_maps_letter_suffixes() {
        assert_eq!(category_display_order("2.1A"), 211);
        assert_eq!(category_display_order("3.4C"), 343);
        assert_eq!(category_display_order("1.12"), 112);
        assert_eq!(category_display_order("2.1D"), 100);
    }

    #[test]
    fn quote_literal_doubles_single_quotes() {
        assert_eq!(quote_literal("driver's"), "'driver''s'");
    }

    #[test]
    fn coach_array_literal_skips_empty_tokens() {
        let coaches = vec!["DTC".to_string(), String::new(), "TC".to_string()];
        assert_eq!(coach_array_literal(&coaches), "ARRAY['DTC', 'TC']");
        assert_eq!(coach_array_literal(&[]), "ARRAY[]::text[]");
    }

    #[test]
    fn script_is_wrapped_in_single_transaction() {
        let sql = render_import_script(&header(), &sample_sections());
        assert!(sql.starts_with("-- SQL script to import all inspection data from PDF\n"));
        assert!(sql.contains("-- Source sha256: abc123"));
        assert_eq!(sql.matches("BEGIN;").count(), 1);
        assert!(sql.trim_end().ends_with("COMMIT;"));
    }

    #[test]
    fn script_guards_inserts_by_natural_keys() {
        let sql = render_import_script(&header(), &sample_sections());
        assert!(sql.contains("WHERE section_number = '2')"));
        assert!(sql.contains("WHERE category_number = '2.1A')"));
        assert!(sql.contains("ARRAY['DTC', 'NDTC']"));
        assert!(sql.contains("\n        211, true);"));
        assert!(sql.contains(
            "WHERE ic.category_number = '2.1A' AND ia.activity_number = '10'"
        ));
    }

    #[test]
    fn activities_are_escaped_and_numbered_within_category() {
        let sql = render_import_script(&header(), &sample_sections());
        assert!(sql.contains("'10', 'Check the driver''s brake valve', true, 1, true"));
        assert!(sql.contains("'11', 'Check pads', true, 2, true"));

        let section_at = sql.find("INSERT INTO inspection_sections").expect("section insert");
        let category_at = sql
            .find("INSERT INTO inspection_categories")
            .expect("category insert");
        let activity_at = sql
            .find("INSERT INTO inspection_activities")
            .expect("activity insert");
        assert!(section_at < category_at && category_at < activity_at);
    }

    #[test]
    fn empty_input_still_renders_valid_transaction() {
        let sql = render_import_script(&header(), &[]);
        assert!(!sql.contains("INSERT INTO inspection_categories"));
        assert!(sql.contains("DROP TABLE IF EXISTS category_mappings;"));
        assert!(sql.contains("COMMIT;"));
    }
}
