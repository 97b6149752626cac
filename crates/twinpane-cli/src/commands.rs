use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde::Serialize;
use twinpane_chunk::ChunkStore;
use twinpane_merge::MergeController;
use twinpane_types::{validate_chunks, Change, Chunk, Edit, MergeConfig, Side, Text};
use twinpane_view::collapse_unchanged;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Chunks(args) => cmd_chunks(&args, &config, cli.format),
        Command::Collapse(args) => cmd_collapse(&args, &config, cli.format),
        Command::Accept(args) => cmd_resolve(&args, &config, Resolution::Accept),
        Command::Reject(args) => cmd_resolve(&args, &config, Resolution::Reject),
        Command::Check(args) => cmd_check(&args, &config, cli.format),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<MergeConfig> {
    let Some(path) = path else {
        return Ok(MergeConfig::default());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    MergeConfig::from_toml_str(&source).with_context(|| format!("invalid config {}", path.display()))
}

fn read_text(path: &Path) -> anyhow::Result<Text> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(Text::normalized(&content))
}

fn read_pair(pair: &PairArgs) -> anyhow::Result<(Text, Text)> {
    Ok((read_text(&pair.original)?, read_text(&pair.modified)?))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct ChunkReport {
    id: u64,
    from_a: usize,
    to_a: usize,
    from_b: usize,
    to_b: usize,
    /// First line and line count in A.
    lines_a: (usize, usize),
    lines_b: (usize, usize),
    changes: Vec<Change>,
}

fn line_span(doc: &Text, from: usize, to: usize) -> (usize, usize) {
    let first = doc.line_at(from).number;
    if from >= to {
        return (first, 0);
    }
    (first, doc.line_at(to - 1).number - first + 1)
}

fn chunk_report(chunk: &Chunk, a: &Text, b: &Text) -> ChunkReport {
    ChunkReport {
        id: chunk.id().get(),
        from_a: chunk.from_a,
        to_a: chunk.to_a,
        from_b: chunk.from_b,
        to_b: chunk.to_b,
        lines_a: line_span(a, chunk.from_a, chunk.to_a),
        lines_b: line_span(b, chunk.from_b, chunk.to_b),
        changes: chunk.changes.to_vec(),
    }
}

fn cmd_chunks(args: &PairArgs, config: &MergeConfig, format: OutputFormat) -> anyhow::Result<()> {
    let (a, b) = read_pair(args)?;
    let store = ChunkStore::from_config(config, &a, &b);
    let reports: Vec<ChunkReport> = store.chunks().iter().map(|c| chunk_report(c, &a, &b)).collect();

    if format == OutputFormat::Json {
        return print_json(&reports);
    }
    if reports.is_empty() {
        println!("{} No changes.", "✓".green());
        return Ok(());
    }
    for (chunk, report) in store.chunks().iter().zip(&reports) {
        println!(
            "{} A {},{} B {},{}",
            chunk.id().to_string().yellow().bold(),
            report.lines_a.0,
            report.lines_a.1,
            report.lines_b.0,
            report.lines_b.1,
        );
        for line in a.slice(chunk.from_a, chunk.end_a()).lines().take(report.lines_a.1) {
            println!("  {}", format!("-{line}").red());
        }
        for line in b.slice(chunk.from_b, chunk.end_b()).lines().take(report.lines_b.1) {
            println!("  {}", format!("+{line}").green());
        }
    }
    println!("{} chunk(s)", reports.len().to_string().bold());
    Ok(())
}

fn cmd_collapse(args: &CollapseArgs, config: &MergeConfig, format: OutputFormat) -> anyhow::Result<()> {
    let (a, b) = read_pair(&args.pair)?;
    let store = ChunkStore::from_config(config, &a, &b);
    let mut collapse = config.collapse.unwrap_or_default();
    if let Some(margin) = args.margin {
        collapse.margin = margin;
    }
    if let Some(min_size) = args.min_size {
        collapse.min_size = min_size;
    }
    let side: Side = args.side.map_or(config.side, Side::from);
    let doc = match side {
        Side::A => &a,
        Side::B => &b,
    };
    let ranges = collapse_unchanged(doc, store.chunks(), side, collapse.margin, collapse.min_size);

    if format == OutputFormat::Json {
        return print_json(&ranges);
    }
    if ranges.is_empty() {
        println!("Nothing to collapse in document {}.", side.to_string().bold());
        return Ok(());
    }
    for range in &ranges {
        println!(
            "lines {}-{} {}",
            range.from_line.to_string().yellow(),
            range.to_line.to_string().yellow(),
            format!("({} unchanged lines)", range.lines).dimmed()
        );
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Resolution {
    Accept,
    Reject,
}

/// Accept or reject the chunk at `pos`. Returns the side that changed and
/// its new content.
fn resolve(
    a: Text,
    b: Text,
    config: &MergeConfig,
    pos: usize,
    resolution: Resolution,
) -> anyhow::Result<(Side, Text)> {
    let mut controller = MergeController::new(a, b, config.clone())?;
    let (found, side) = match resolution {
        Resolution::Accept => (controller.accept_chunk(pos)?, Side::A),
        Resolution::Reject => (controller.reject_chunk(pos)?, Side::B),
    };
    if !found {
        anyhow::bail!("no chunk covers position {pos} of the modified document");
    }
    Ok((side, controller.state().text(side).clone()))
}

fn cmd_resolve(args: &ResolveArgs, config: &MergeConfig, resolution: Resolution) -> anyhow::Result<()> {
    let (a, b) = read_pair(&args.pair)?;
    let (side, text) = resolve(a, b, config, args.pos, resolution)?;
    if !args.write {
        print!("{text}");
        return Ok(());
    }
    let path = match side {
        Side::A => &args.pair.original,
        Side::B => &args.pair.modified,
    };
    fs::write(path, text.as_str()).with_context(|| format!("failed to write {}", path.display()))?;
    let verb = match resolution {
        Resolution::Accept => "Accepted",
        Resolution::Reject => "Rejected",
    };
    println!("{} {verb} chunk at {}; wrote {}", "✓".green().bold(), args.pos, path.display());
    Ok(())
}

#[derive(Debug, Default, Serialize)]
struct CheckReport {
    chunks: usize,
    edits: usize,
    mismatches: usize,
}

/// Validate the chunk list of `a` and `b`, then edit `b` line by line and
/// compare every incremental update against a full rebuild.
fn check(a: &Text, b: &Text, config: &MergeConfig, edits: usize) -> anyhow::Result<CheckReport> {
    let mut store = ChunkStore::from_config(config, a, b);
    validate_chunks(store.chunks(), a, b).context("initial chunk list is invalid")?;
    let mut report = CheckReport {
        chunks: store.chunks().len(),
        ..Default::default()
    };

    let mut b = b.clone();
    for k in 0..edits {
        let number = (k * 7919) % b.lines() + 1;
        let Some(line) = b.line(number) else {
            continue;
        };
        let (next, description) = Edit::replace(line.from, line.to, format!("edited {k}")).apply(&b)?;
        store.update_b(a, &next, &description);
        validate_chunks(store.chunks(), a, &next)
            .with_context(|| format!("chunk list invalid after edit {k} (line {number})"))?;
        if !store.verify_against_rebuild(a, &next) {
            report.mismatches += 1;
            store.rebuild(a, &next);
        }
        report.edits += 1;
        b = next;
    }
    Ok(report)
}

fn cmd_check(args: &CheckArgs, config: &MergeConfig, format: OutputFormat) -> anyhow::Result<()> {
    let (a, b) = read_pair(&args.pair)?;
    let mut config = config.clone();
    if let Some(margin) = args.margin {
        config.update_margin = margin;
    }
    let report = check(&a, &b, &config, args.edits)?;

    if format == OutputFormat::Json {
        return print_json(&report);
    }
    println!("{} Chunk invariants hold ({} chunks)", "✓".green().bold(), report.chunks);
    let status = if report.mismatches == 0 {
        "all matched".green()
    } else {
        format!("{} mismatched", report.mismatches).yellow()
    };
    println!(
        "  Incremental updates: {} edits, {} (margin {})",
        report.edits, status, config.update_margin
    );
    Ok(())
}
