//! Interactive batch conversion driver (§6).
//!
//! Usage:
//!   cargo run --release --bin convert_driver
//!
//! Prompts for a base directory and a rule-set path, then walks the base
//! directory for files named `meta.xml` and drives each one through
//! [`digdoc::pipeline::ConversionDriver`]. A single file's failure is logged
//! and rolled back; it never aborts the batch, and the process always exits
//! zero.

use digdoc::config::DriverConfig;
use digdoc::pipeline::{ConversionDriver, DriveOutcome};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

fn prompt(label: &str) -> String {
    print!("{label}: ");
    io::stdout().flush().ok();
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok();
    line.trim().to_string()
}

fn find_meta_files(root: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(root) else { return };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            find_meta_files(&path, out);
        } else if path.file_name().and_then(|n| n.to_str()) == Some("meta.xml") {
            out.push(path);
        }
    }
}

fn main() {
    env_logger::init();

    let base_path_answer = prompt("Base directory to scan");
    let rule_set_answer = prompt("Rule-set path");
    let config = DriverConfig::from_prompts(&base_path_answer, &rule_set_answer);

    log::info!("scanning {} for meta.xml files", config.base_path.display());

    let mut files = Vec::new();
    find_meta_files(&config.base_path, &mut files);

    if files.is_empty() {
        println!("no meta.xml files found under {}", config.base_path.display());
        return;
    }

    let mut committed = 0usize;
    let mut rolled_back = 0usize;

    for path in &files {
        let mut driver = ConversionDriver::new();
        let mut format =
            digdoc::fileformat::json::JsonFileFormat::new(std::rc::Rc::new(digdoc::ruleset::RuleSet::new()));

        match driver.drive(&mut format, path, |_document| Ok(())) {
            DriveOutcome::Committed => {
                committed += 1;
                println!("ok: {}", path.display());
            },
            DriveOutcome::RolledBack { reason } => {
                rolled_back += 1;
                println!("rolled back: {} ({reason})", path.display());
            },
        }
    }

    println!("{committed} committed, {rolled_back} rolled back, {} total", files.len());
}
