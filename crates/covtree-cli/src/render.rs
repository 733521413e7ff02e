use colored::*;
use covtree_core::{PathNode, Totals};
use serde::Serialize;
use std::error::Error;
use std::io::Write;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("unknown format '{}' (expected table, json or csv)", s)),
        }
    }
}

/// One listing entry, flattened for output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub kind: &'static str,
    pub name: String,
    pub path: String,
    pub lines: u64,
    pub hits: u64,
    pub partials: u64,
    pub misses: u64,
    pub coverage: f64,
}

impl From<&PathNode> for Row {
    fn from(node: &PathNode) -> Self {
        Row {
            kind: if node.is_dir() { "dir" } else { "file" },
            name: node.name().to_string(),
            path: node.full_path().to_string(),
            lines: node.lines(),
            hits: node.hits(),
            partials: node.partials(),
            misses: node.misses(),
            coverage: round2(node.coverage()),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn render<W: Write>(
    nodes: &[PathNode],
    format: OutputFormat,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    let rows: Vec<Row> = nodes.iter().map(Row::from).collect();
    match format {
        OutputFormat::Table => write_table(&rows, out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &rows)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => write_csv(&rows, out)?,
    }
    Ok(())
}

fn write_csv<W: Write>(rows: &[Row], out: &mut W) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_writer(out);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_table<W: Write>(rows: &[Row], out: &mut W) -> std::io::Result<()> {
    writeln!(
        out,
        "{}",
        format!(
            "{:<40} {:>8} {:>8} {:>8} {:>8} {:>9}",
            "NAME", "LINES", "HITS", "PARTIALS", "MISSES", "COVERAGE"
        )
        .bold()
    )?;

    for row in rows {
        let name = if row.kind == "dir" {
            format!("{:<40}", format!("{}/", row.name)).blue().bold()
        } else {
            format!("{:<40}", row.name).normal()
        };
        writeln!(
            out,
            "{} {:>8} {:>8} {:>8} {:>8} {}",
            name,
            row.lines,
            row.hits,
            row.partials,
            row.misses,
            colored_coverage(row.coverage)
        )?;
    }

    let totals: Totals = rows
        .iter()
        .map(|r| Totals::new(r.lines, r.hits, r.misses, r.partials))
        .sum();
    writeln!(
        out,
        "{} {:>8} {:>8} {:>8} {:>8} {}",
        format!("{:<40}", "TOTAL").bold(),
        totals.lines,
        totals.hits,
        totals.partials,
        totals.misses,
        colored_coverage(round2(totals.coverage()))
    )
}

fn colored_coverage(coverage: f64) -> ColoredString {
    let text = format!("{:>8.2}%", coverage);
    if coverage >= 80.0 {
        text.green()
    } else if coverage >= 50.0 {
        text.yellow()
    } else {
        text.red()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covtree_core::{DirNode, FileNode};

    fn sample_nodes() -> Vec<PathNode> {
        let file = |path: &str, totals| {
            PathNode::File(FileNode {
                full_path: path.to_string(),
                totals,
            })
        };
        vec![
            PathNode::Dir(DirNode::new(
                "src/core",
                vec![file("src/core/a.rs", Totals::new(3, 2, 1, 0))],
            )),
            file("src/main.rs", Totals::new(4, 4, 0, 0)),
        ]
    }

    #[test]
    fn test_row_from_dir() {
        let nodes = sample_nodes();
        let row = Row::from(&nodes[0]);
        assert_eq!(row.kind, "dir");
        assert_eq!(row.name, "core");
        assert_eq!(row.path, "src/core");
        assert_eq!(row.coverage, 66.67);
    }

    #[test]
    fn test_render_json() {
        let mut out = Vec::new();
        render(&sample_nodes(), OutputFormat::Json, &mut out).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed[1]["name"], "main.rs");
        assert_eq!(parsed[1]["kind"], "file");
        assert_eq!(parsed[1]["coverage"], 100.0);
    }

    #[test]
    fn test_render_csv_has_header_and_rows() {
        let mut out = Vec::new();
        render(&sample_nodes(), OutputFormat::Csv, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "kind,name,path,lines,hits,partials,misses,coverage");
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("file,main.rs,src/main.rs,4,4,0,0,"));
    }

    #[test]
    fn test_render_table_lists_names_and_total() {
        let mut out = Vec::new();
        render(&sample_nodes(), OutputFormat::Table, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("core/"));
        assert!(text.contains("main.rs"));
        assert!(text.contains("TOTAL"));
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
