use anyhow::{Context, Result};
use byte_unit::{Byte, UnitType};
use colored::*;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table, presets::UTF8_FULL};
use gemctx_core::{Assembly, TokenUsage};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

pub fn readable_size(bytes: u64) -> String {
    Byte::from_u64(bytes)
        .get_appropriate_unit(UnitType::Binary)
        .to_string()
}

pub fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

pub fn write_to_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let mut file =
        File::create(path).with_context(|| format!("Failed to create file {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to file {}", path.display()))?;
    Ok(())
}

pub fn print_dry_run_summary(assembly: &Assembly, token_estimate: Option<usize>) {
    let aggregation = &assembly.aggregation;
    eprintln!();
    eprintln!(
        "{}",
        format!(" Included Files Summary ({} files) ", aggregation.files.len())
            .green()
            .bold()
            .underline()
    );
    eprintln!(
        "{:<20} {}",
        "Total Size:".green(),
        format!(
            "{} ({} bytes)",
            readable_size(aggregation.total_bytes),
            aggregation.total_bytes
        )
        .cyan()
    );
    eprintln!(
        "{:<20} {}",
        "Prompt Size:".green(),
        format!("{} bytes", assembly.prompt.len()).cyan()
    );
    if let Some(tokens) = token_estimate {
        print_token_estimate(tokens);
    }

    if !aggregation.files.is_empty() {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("#").fg(Color::Green),
            Cell::new("Path").fg(Color::Green),
            Cell::new("Size").fg(Color::Green),
        ]);
        for (i, file) in aggregation.files.iter().enumerate() {
            table.add_row(vec![
                Cell::new(i + 1).set_alignment(CellAlignment::Right),
                Cell::new(file.candidate.display_path()).fg(Color::Cyan),
                Cell::new(readable_size(file.size))
                    .set_alignment(CellAlignment::Right)
                    .fg(Color::DarkGrey),
            ]);
        }
        eprintln!("{table}");
    }

    print_skip_notices(assembly);
}

pub fn print_skip_notices(assembly: &Assembly) {
    let aggregation = &assembly.aggregation;
    if assembly.missing.is_empty() && aggregation.skipped.is_empty() {
        return;
    }
    eprintln!("{}", "Skipped:".yellow());
    for skipped in assembly.missing.iter().chain(&aggregation.skipped) {
        eprintln!(
            " - {} [{}]",
            skipped.path.display(),
            skipped.reason.as_tag().yellow()
        );
    }
    if let Some(notice) = &aggregation.budget {
        eprintln!(
            "{} {} would bring the total to {} bytes (limit {}); it and all remaining files were left out.",
            "Budget:".yellow().bold(),
            notice.first_rejected.display(),
            notice.would_be_total,
            notice.limit
        );
    }
}

// Shown even with --quiet when --token-usage was asked for.
pub fn print_token_estimate(tokens: usize) {
    eprintln!(
        "{:<20} {}",
        "Est. Tokens:".green(),
        format!("~{} (cl100k estimate)", tokens).cyan()
    );
}

pub fn print_token_usage(usage: Option<&TokenUsage>) {
    let Some(usage) = usage else {
        eprintln!("{}", "Token usage was not reported by the API.".yellow());
        return;
    };
    let show = |n: Option<u64>| n.map_or_else(|| "n/a".to_string(), |v| v.to_string());
    eprintln!();
    eprintln!("{}", " Token Usage ".green().bold().underline());
    eprintln!("{:<20} {}", "Prompt:".green(), show(usage.prompt_tokens).cyan());
    eprintln!("{:<20} {}", "Response:".green(), show(usage.response_tokens).cyan());
    eprintln!("{:<20} {}", "Total:".green(), show(usage.total_tokens).cyan());
}
