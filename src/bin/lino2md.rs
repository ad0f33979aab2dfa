//! Render a saved `tpqbogo -S <N> --lino <path>` speedtest as a Markdown table.
//!
//! ```bash
//! lino2md speedtest.lino            # table on stdout
//! lino2md speedtest.lino results.md # table written to results.md
//! ```

use std::env;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use tpqbogo::report::parse_lino_report;

fn usage(program: &str) -> String {
    format!(
        "usage: {program} <SPEEDTEST.lino> [TABLE.md]\n\
         \n\
         Turns the size_<N> rows of a tpqbogo speedtest report into a Markdown\n\
         table of permutations, elapsed time and winning thread per array size.\n\
         \n\
         \x20 SPEEDTEST.lino  report saved with `tpqbogo -S <N> --lino <path>`\n\
         \x20 TABLE.md        where to write the table (default: stdout)\n"
    )
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprint!("{}", usage(&args[0]));
        return ExitCode::FAILURE;
    }

    let input_path = Path::new(&args[1]);
    let content = match fs::read_to_string(input_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("lino2md: cannot read {}: {}", input_path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let Some(report) = parse_lino_report(&content) else {
        eprintln!("lino2md: no size_<N> rows found in {}", input_path.display());
        return ExitCode::FAILURE;
    };

    let markdown = report.to_markdown_table();

    match args.get(2) {
        Some(output) => {
            let output_path = Path::new(output);
            if let Err(e) = fs::write(output_path, &markdown) {
                eprintln!("lino2md: cannot write {}: {}", output_path.display(), e);
                return ExitCode::FAILURE;
            }
            println!("wrote {}", output_path.display());
        }
        None => print!("{}", markdown),
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_describes_speedtest_report() {
        let text = usage("lino2md");
        assert!(text.starts_with("usage: lino2md <SPEEDTEST.lino> [TABLE.md]\n"));
        assert!(text.contains("tpqbogo speedtest report"));
        assert!(text.contains("  SPEEDTEST.lino  report saved with `tpqbogo -S <N> --lino <path>`\n"));
        assert!(!text.contains("Links Notation report file"));
    }
}
