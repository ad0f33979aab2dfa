//! Rendering of run results and speedtest reports.
//!
//! Single runs are rendered either as a human-readable summary or as a bare
//! nanosecond count. Speedtests (one run per array size) are rendered as CSV,
//! or as a Links Notation (Lino) report that can later be converted to a
//! Markdown table by the `lino2md` binary.
//!
//! Lino report layout:
//!   ```text
//!   speedtest_report:
//!     timestamp '2026-10-19T12:00:00Z'
//!     description 'Threaded Pseudo-Quantum Bogosort speedtest'
//!
//!   system_info:
//!     os 'linux'
//!     cpu_threads 8
//!     scheduler threads
//!
//!   results:
//!     size_3:
//!       permutations 6
//!       elapsed_ns 184211
//!       winner t4
//!   ```

use std::fmt::{self, Write};
use std::fs;
use std::io;
use std::path::Path;

use chrono::{SecondsFormat, Utc};

use crate::evaluator::Scheduler;
use crate::stats::RunResult;

/// CSV heading emitted before speedtest rows.
pub const CSV_HEADER: &str = "array_size,permutations,speed_nanoseconds";

/// Multi-line summary of a single run.
pub fn render_display<T: fmt::Debug>(result: &RunResult<T>) -> String {
    let stats = &result.stats;
    format!(
        "*** Threaded Pseudo-Quantum Bogosort ***\n\
         Your sorted array is:\n  {:?}\n\
         Statistics:\n\
         \x20 Original array:            {:?}\n\
         \x20 Number of permutations:    {}\n\
         \x20 Successful thread:         t{}\n\
         \x20 Time elapsed:              {} ns\n",
        stats.winner.candidate,
        result.original_array,
        stats.permutation_count,
        stats.winner.task_id,
        stats.elapsed_nanoseconds,
    )
}

/// Just the elapsed time, as printed by `--nanoseconds`.
pub fn render_nanoseconds<T>(result: &RunResult<T>) -> String {
    result.stats.elapsed_nanoseconds.to_string()
}

/// One speedtest measurement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeedtestRow {
    pub array_size: usize,
    pub permutations: u64,
    pub elapsed_nanoseconds: u128,
    /// Task id of the winning thread
    pub winner: usize,
}

impl SpeedtestRow {
    pub fn from_run<T>(result: &RunResult<T>) -> Self {
        SpeedtestRow {
            array_size: result.original_array.len(),
            permutations: result.stats.permutation_count,
            elapsed_nanoseconds: result.stats.elapsed_nanoseconds,
            winner: result.stats.winner.task_id,
        }
    }

    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{}",
            self.array_size, self.permutations, self.elapsed_nanoseconds
        )
    }
}

/// Host details recorded alongside a speedtest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub os: String,
    /// Threads the OS reports as available for parallel work
    pub cpu_threads: usize,
    pub scheduler: String,
}

impl SystemInfo {
    pub fn detect(scheduler: Scheduler) -> Self {
        SystemInfo {
            os: std::env::consts::OS.to_string(),
            cpu_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            scheduler: scheduler.to_string(),
        }
    }
}

/// A full speedtest, sizes 1 through N.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeedtestReport {
    /// ISO 8601, UTC
    pub timestamp: String,
    pub description: String,
    pub system_info: SystemInfo,
    pub rows: Vec<SpeedtestRow>,
}

impl SpeedtestReport {
    pub fn new(description: &str, scheduler: Scheduler, rows: Vec<SpeedtestRow>) -> Self {
        SpeedtestReport {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            description: description.to_string(),
            system_info: SystemInfo::detect(scheduler),
            rows,
        }
    }

    /// CSV with headings, one line per size.
    pub fn to_csv(&self) -> String {
        let mut output = String::from(CSV_HEADER);
        output.push('\n');
        for row in &self.rows {
            output.push_str(&row.to_csv_row());
            output.push('\n');
        }
        output
    }

    pub fn write_lino<W: Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "speedtest_report:")?;
        writeln!(out, "  timestamp '{}'", self.timestamp)?;
        writeln!(out, "  description '{}'", escape_lino_string(&self.description))?;

        writeln!(out)?;
        writeln!(out, "system_info:")?;
        writeln!(out, "  os '{}'", escape_lino_string(&self.system_info.os))?;
        writeln!(out, "  cpu_threads {}", self.system_info.cpu_threads)?;
        writeln!(out, "  scheduler {}", self.system_info.scheduler)?;

        writeln!(out)?;
        writeln!(out, "results:")?;
        for row in &self.rows {
            writeln!(out, "  size_{}:", row.array_size)?;
            writeln!(out, "    permutations {}", row.permutations)?;
            writeln!(out, "    elapsed_ns {}", row.elapsed_nanoseconds)?;
            writeln!(out, "    winner t{}", row.winner)?;
        }
        Ok(())
    }

    /// The report in Links Notation.
    pub fn to_lino(&self) -> String {
        let mut output = String::new();
        // infallible for String
        let _ = self.write_lino(&mut output);
        output
    }

    pub fn save_lino(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.to_lino())
    }

    pub fn write_markdown<W: Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "# Threaded Pseudo-Quantum Bogosort Speedtest")?;
        writeln!(out)?;
        writeln!(out, "**Timestamp:** {}", self.timestamp)?;
        writeln!(out, "**Description:** {}", self.description)?;
        writeln!(out)?;

        writeln!(out, "## System Information")?;
        writeln!(out)?;
        writeln!(out, "| Property | Value |")?;
        writeln!(out, "|----------|-------|")?;
        writeln!(out, "| OS | {} |", self.system_info.os)?;
        writeln!(out, "| CPU threads | {} |", self.system_info.cpu_threads)?;
        writeln!(out, "| Scheduler | {} |", self.system_info.scheduler)?;
        writeln!(out)?;

        writeln!(out, "## Results")?;
        writeln!(out)?;
        writeln!(out, "| Size | Permutations | Time | ns / permutation | Winner |")?;
        writeln!(out, "|------|--------------|------|------------------|--------|")?;

        let mut rows: Vec<&SpeedtestRow> = self.rows.iter().collect();
        rows.sort_by_key(|r| r.array_size);
        for row in rows {
            let per_permutation = row.elapsed_nanoseconds / u128::from(row.permutations.max(1));
            writeln!(
                out,
                "| {} | {} | {} | {} | t{} |",
                row.array_size,
                row.permutations,
                format_nanos(row.elapsed_nanoseconds),
                per_permutation,
                row.winner
            )?;
        }

        writeln!(out)?;
        writeln!(out, "---")?;
        writeln!(out, "*Report generated by tpqbogo*")
    }

    pub fn to_markdown_table(&self) -> String {
        let mut output = String::new();
        // infallible for String
        let _ = self.write_markdown(&mut output);
        output
    }
}

/// Escape a string for use in Links Notation (handle single quotes)
fn escape_lino_string(s: &str) -> String {
    s.replace('\'', "\\'")
}

/// Human-readable duration: `850 ns`, `12.40 µs`, `3.20 ms`, `1.05 s`.
fn format_nanos(nanos: u128) -> String {
    let n = nanos as f64;
    if nanos >= 1_000_000_000 {
        format!("{:.2} s", n / 1e9)
    } else if nanos >= 1_000_000 {
        format!("{:.2} ms", n / 1e6)
    } else if nanos >= 1_000 {
        format!("{:.2} µs", n / 1e3)
    } else {
        format!("{} ns", nanos)
    }
}

fn extract_quoted_value(line: &str, prefix: &str) -> Option<String> {
    let value = line.strip_prefix(prefix)?.trim();
    let inner = value.strip_prefix('\'')?.strip_suffix('\'')?;
    Some(inner.replace("\\'", "'"))
}

/// Parse a report produced by [`SpeedtestReport::to_lino`].
///
/// Returns `None` if the content holds no result rows.
pub fn parse_lino_report(content: &str) -> Option<SpeedtestReport> {
    let mut report = SpeedtestReport {
        timestamp: String::new(),
        description: String::new(),
        system_info: SystemInfo {
            os: String::new(),
            cpu_threads: 0,
            scheduler: String::new(),
        },
        rows: Vec::new(),
    };
    let mut current: Option<SpeedtestRow> = None;
    let mut in_results = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed == "results:" {
            in_results = true;
            continue;
        }

        if !in_results {
            if let Some(ts) = extract_quoted_value(trimmed, "timestamp") {
                report.timestamp = ts;
            } else if let Some(desc) = extract_quoted_value(trimmed, "description") {
                report.description = desc;
            } else if let Some(os) = extract_quoted_value(trimmed, "os") {
                report.system_info.os = os;
            } else if let Some(n) = trimmed.strip_prefix("cpu_threads ") {
                report.system_info.cpu_threads = n.parse().unwrap_or(0);
            } else if let Some(s) = trimmed.strip_prefix("scheduler ") {
                report.system_info.scheduler = s.to_string();
            }
            continue;
        }

        if let Some(size) = trimmed
            .strip_prefix("size_")
            .and_then(|s| s.strip_suffix(':'))
        {
            if let Some(row) = current.take() {
                report.rows.push(row);
            }
            current = size.parse().ok().map(|array_size| SpeedtestRow {
                array_size,
                permutations: 0,
                elapsed_nanoseconds: 0,
                winner: 0,
            });
            continue;
        }

        if let Some(ref mut row) = current {
            if let Some(v) = trimmed.strip_prefix("permutations ") {
                row.permutations = v.parse().unwrap_or(0);
            } else if let Some(v) = trimmed.strip_prefix("elapsed_ns ") {
                row.elapsed_nanoseconds = v.parse().unwrap_or(0);
            } else if let Some(v) = trimmed.strip_prefix("winner t") {
                row.winner = v.parse().unwrap_or(0);
            }
        }
    }

    if let Some(row) = current {
        report.rows.push(row);
    }

    if report.rows.is_empty() {
        None
    } else {
        Some(report)
    }
}
