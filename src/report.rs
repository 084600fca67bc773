//! Report rendering and persistence.
//!
//! A run over a category yields ordered (query, response) rows for one
//! date; this module renders them as a Markdown document and a CSV table
//! and writes both under the per-category output tree. Files are dated
//! and never rewritten in place.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::history::Turn;

/// "market_trends" -> "Market Trends".
fn title_case(category: &str) -> String {
    category
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Markdown anchor for a heading, matching GitHub-style slugs loosely.
fn anchor(query: &str) -> String {
    query.to_lowercase().replace(' ', "-")
}

/// Quote a CSV field when it contains a comma, quote, or newline.
fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn csv_line(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| escape_csv(f))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn markdown_filename(date: &str, category: &str) -> String {
    format!("{date}_{category}_report.md")
}

pub fn csv_filename(date: &str, category: &str) -> String {
    format!("{date}_{category}_data.csv")
}

/// Create the markdown/ and csv/ subtrees for every category.
pub fn ensure_directories(base_dir: &Path, categories: &[String]) -> std::io::Result<()> {
    for category in categories {
        fs::create_dir_all(base_dir.join(category).join("markdown"))?;
        fs::create_dir_all(base_dir.join(category).join("csv"))?;
    }
    Ok(())
}

/// Render the Markdown report for one category run.
pub fn build_markdown(category: &str, date: &str, rows: &[Turn]) -> String {
    let display = title_case(category);
    let topic = category.replace('_', " ");

    let mut lines = vec![
        format!("# {display} Research Report"),
        format!("Date: {date}"),
        String::new(),
        "## Executive Summary".to_string(),
        String::new(),
        format!(
            "This report provides a comprehensive analysis of current {topic} trends and developments."
        ),
        String::new(),
        "## Table of Contents".to_string(),
    ];

    for row in rows {
        lines.push(format!("- [{}](#{})", row.query, anchor(&row.query)));
    }
    lines.push(String::new());

    for row in rows {
        lines.push(format!("## {}", row.query));
        lines.push(String::new());
        lines.push(row.response.clone());
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Render the CSV table for one category run, header included.
pub fn build_csv(category: &str, date: &str, rows: &[Turn]) -> String {
    let mut out = String::from("Query,Response,Date,Category\n");
    for row in rows {
        out.push_str(&csv_line(&[&row.query, &row.response, date, category]));
        out.push('\n');
    }
    out
}

/// Write both report files for a category run. Returns the paths written.
pub fn save_reports(
    base_dir: &Path,
    category: &str,
    date: &str,
    markdown: &str,
    csv: &str,
) -> std::io::Result<(PathBuf, PathBuf)> {
    let markdown_dir = base_dir.join(category).join("markdown");
    let csv_dir = base_dir.join(category).join("csv");
    fs::create_dir_all(&markdown_dir)?;
    fs::create_dir_all(&csv_dir)?;

    let markdown_path = markdown_dir.join(markdown_filename(date, category));
    fs::write(&markdown_path, markdown)?;
    info!("Markdown report saved to {}", markdown_path.display());

    let csv_path = csv_dir.join(csv_filename(date, category));
    fs::write(&csv_path, csv)?;
    info!("CSV data saved to {}", csv_path.display());

    Ok((markdown_path, csv_path))
}

// --- One-shot topic reports (research-once) ---

/// Render the flat Markdown report for a one-shot topic run.
pub fn build_topic_markdown(topic: &str, rows: &[Turn]) -> String {
    let mut lines = vec![
        format!("# Research Report: {topic}"),
        String::new(),
        "## Table of Contents".to_string(),
    ];
    for row in rows {
        lines.push(format!("- [{}](#{})", row.query, anchor(&row.query)));
    }
    lines.push(String::new());
    for row in rows {
        lines.push(format!("## {}", row.query));
        lines.push(String::new());
        lines.push(row.response.clone());
        lines.push(String::new());
    }
    lines.join("\n")
}

/// Render the two-column CSV for a one-shot topic run.
pub fn build_topic_csv(rows: &[Turn]) -> String {
    let mut out = String::from("Query,Response\n");
    for row in rows {
        out.push_str(&csv_line(&[&row.query, &row.response]));
        out.push('\n');
    }
    out
}

/// Write both one-shot files flat into `dir` as
/// `{date}_{topic_with_underscores}.md/.csv`.
pub fn save_topic_reports(
    dir: &Path,
    topic: &str,
    date: &str,
    markdown: &str,
    csv: &str,
) -> std::io::Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir)?;
    let stem = format!("{date}_{}", topic.replace(' ', "_"));

    let markdown_path = dir.join(format!("{stem}.md"));
    fs::write(&markdown_path, markdown)?;
    info!("Markdown report saved to {}", markdown_path.display());

    let csv_path = dir.join(format!("{stem}.csv"));
    fs::write(&csv_path, csv)?;
    info!("CSV report saved to {}", csv_path.display());

    Ok((markdown_path, csv_path))
}
