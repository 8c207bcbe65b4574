//! Terminal tree printer and structured report writer.
//!
//! The printer renders the result forest with box-drawing glyphs and
//! ANSI colors; the report writer mirrors the same forest as JSON, one
//! node per result with `offset` as a bare lowercase hex string.

use crate::bytes::to_hex;
use crate::result::ScanResult;
use anyhow::Context;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ReportNode {
    offset: String,
    #[serde(rename = "type")]
    type_tag: String,
    size: usize,
    source: String,
    info: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<Vec<ReportNode>>,
}

fn report_node(result: &ScanResult) -> ReportNode {
    ReportNode {
        offset: to_hex(result.offset),
        type_tag: result.type_tag.clone(),
        size: result.length,
        source: result.source.clone(),
        info: result.info.clone(),
        children: if result.children.is_empty() {
            None
        } else {
            Some(result.children.iter().map(report_node).collect())
        },
    }
}

/// Write the result forest as a pretty-printed JSON array.
pub fn write_json_report(results: &[ScanResult], path: &Path) -> anyhow::Result<()> {
    let nodes: Vec<ReportNode> = results.iter().map(report_node).collect();
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create report file {}", path.display()))?;
    serde_json::to_writer_pretty(file, &nodes).context("serializing report")?;
    Ok(())
}

/// Wrap long info text into lines of at most `width` columns, breaking
/// at word boundaries.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + word.len() + 1 > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn print_result(result: &ScanResult, prefix: &str, last: bool) {
    let branch = if last { "└── " } else { "├── " };
    println!(
        "{prefix}{branch}{} {} (length={})",
        format!("[0x{:04x}]", result.offset).cyan(),
        result.type_tag.yellow().bold(),
        result.length.to_string().green()
    );

    let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });

    if !result.source.is_empty() {
        println!(
            "{child_prefix}{}",
            format!("Source: {}", result.source).magenta()
        );
    }
    if !result.info.is_empty() {
        let lines = wrap_text(&result.info, 60);
        if let Some(first) = lines.first() {
            println!("{child_prefix}{}", format!("Info: {first}").dimmed());
            for line in &lines[1..] {
                println!("{child_prefix}{}", format!("      {line}").dimmed());
            }
        }
    }

    for (i, child) in result.children.iter().enumerate() {
        print_result(child, &child_prefix, i == result.children.len() - 1);
    }
}

/// Print the result forest for one input file.
pub fn print_results(results: &[ScanResult], input_file: &str) {
    println!("* {input_file}");
    for (i, result) in results.iter().enumerate() {
        print_result(result, "", i == results.len() - 1);
    }
}
