use anyhow::{Context, Result};
use prodcat::{DetailRow, DetailValue, Product};
use serde_json::Value;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// JSON files under `path` (or `path` itself when it is a file), sorted
pub fn collect_json_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(path).follow_links(true) {
        let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "json") {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Products read from one file, plus the count of entries that were not
/// product records at all
#[derive(Debug, Default)]
pub struct LoadedProducts {
    pub products: Vec<Product>,
    pub skipped: usize,
}

/// A product file holds one product or an array of them. Entries that are
/// not objects are skipped rather than failing the whole file.
pub fn products_from_json(document: Value) -> LoadedProducts {
    let items = match document {
        Value::Array(items) => items,
        other => vec![other],
    };
    let mut loaded = LoadedProducts::default();
    for item in items {
        match serde_json::from_value::<Product>(item) {
            Ok(product) => loaded.products.push(product),
            Err(_) => loaded.skipped += 1,
        }
    }
    loaded
}

/// Parse a `Field=value` pair from the command line
pub fn parse_assignment(raw: &str) -> Result<DetailRow, String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"))?;
    if field.trim().is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    Ok(DetailRow::new(field.trim(), value))
}

/// Shorten a cell to `max` characters
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

pub fn format_examples(examples: &[DetailValue]) -> String {
    examples
        .iter()
        .map(|value| match value {
            DetailValue::String(s) => format!("\"{}\"", truncate(s, 24)),
            other => truncate(&other.to_raw_string(), 24),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_assignments() {
        let row = parse_assignment("Interest Rate=5.5").unwrap();
        assert_eq!(row.field, "Interest Rate");
        assert_eq!(row.raw_value, "5.5");
        assert_eq!(parse_assignment("Meta={\"a\":\"b=c\"}").unwrap().raw_value, "{\"a\":\"b=c\"}");
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=5").is_err());
    }

    #[test]
    fn truncates_long_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 5), "abcd…");
    }

    #[test]
    fn reads_single_and_array_documents() {
        let single = products_from_json(json!({"id": "p1", "details": {"a": 1}}));
        assert_eq!(single.products.len(), 1);
        let many = products_from_json(json!([{"id": "p1"}, {"id": "p2"}]));
        assert_eq!(many.products.len(), 2);
        assert_eq!(many.skipped, 0);
    }

    #[test]
    fn mixed_shape_records_all_load() {
        let loaded = products_from_json(json!([
            {"id": 7, "details": {"apr": 19.9}},
            {"id": "p2", "isActive": null, "details": {"apr": 21.5}},
            {"id": "p3", "createdAt": "2024-01-15 10:00:00", "details": {"annualFee": 95}},
            "not a product",
            42,
        ]));
        assert_eq!(loaded.products.len(), 3);
        assert_eq!(loaded.skipped, 2);
        assert_eq!(loaded.products[0].id, "7");
        assert!(!loaded.products[1].is_active);

        let fields = prodcat::FieldAnalyzer::default().analyze(&loaded.products);
        let apr = fields.iter().find(|field| field.key == "apr").unwrap();
        assert_eq!(apr.frequency.count, 2);
        assert_eq!(apr.frequency.percentage, 67);
    }

    #[test]
    fn collects_json_files_recursively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.json"), "[]").unwrap();
        std::fs::write(dir.path().join("nested").join("a.json"), "[]").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();

        let files = collect_json_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|path| path.extension().unwrap() == "json"));
    }

    #[test]
    fn formats_examples() {
        let examples = [DetailValue::from("Acme"), DetailValue::Number(5.0), DetailValue::Bool(true)];
        assert_eq!(format_examples(&examples), "\"Acme\", 5, true");
    }
}
