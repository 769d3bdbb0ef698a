//! Batch command - process a directory of bills into a result table.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use boleta_core::classify::classify;
use boleta_core::extract::{rules_for, BillExtractor};
use boleta_core::models::record::{FieldRecord, RecordStatus, COLUMNS};
use boleta_core::models::BoletaConfig;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Directory containing the bill PDFs
    #[arg(required = true)]
    input_dir: PathBuf,

    /// Output directory (default: the input directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let files = list_pdfs(&args.input_dir)?;
    if files.is_empty() {
        anyhow::bail!("No PDF files found in {}", args.input_dir.display());
    }

    println!(
        "{} Found {} bills to process",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut records = Vec::with_capacity(files.len());
    for path in &files {
        records.push(process_one(path, &config));
        pb.inc(1);
    }
    pb.finish_with_message("Complete");

    let output_dir = args
        .output_dir
        .or_else(|| config.output.output_dir.clone())
        .unwrap_or_else(|| args.input_dir.clone());
    fs::create_dir_all(&output_dir)?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let stem = format!("{}_{}", config.output.file_stem, timestamp);

    let csv_path = output_dir.join(format!("{}.csv", stem));
    write_csv(&csv_path, &records)?;
    println!(
        "{} Results written to {}",
        style("✓").green(),
        csv_path.display()
    );

    // The spreadsheet artifact is best effort; its failure never aborts
    // the run.
    let xlsx_path = output_dir.join(format!("{}.xlsx", stem));
    if let Err(e) = write_xlsx(&xlsx_path, &records) {
        warn!("could not write spreadsheet {}: {}", xlsx_path.display(), e);
    }

    print_summary(&records, start.elapsed());
    Ok(())
}

/// Enumerate `*.pdf` files in the directory, sorted case-insensitively by
/// name with a stable tie-break on the original name.
fn list_pdfs(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        })
        .collect();

    files.sort_by(|a, b| {
        let name_a = file_name(a);
        let name_b = file_name(b);
        name_a
            .to_lowercase()
            .cmp(&name_b.to_lowercase())
            .then_with(|| name_a.cmp(&name_b))
    });
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Classify and extract one document. Faults stay local: every input file
/// yields exactly one record.
fn process_one(path: &Path, config: &BoletaConfig) -> FieldRecord {
    let name = file_name(path);
    let provider = classify(&name);

    match rules_for(provider) {
        Some(rules) => {
            let mut extractor = BillExtractor::new(rules);
            if let Some(floor) = config.extraction.total_floor(provider) {
                extractor = extractor.with_total_floor(floor);
            }
            extractor.extract_file(path)
        }
        None => {
            debug!("{}: no provider matched, emitting partial record", name);
            FieldRecord::unclassified(name)
        }
    }
}

fn write_csv(path: &Path, records: &[FieldRecord]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(COLUMNS)?;
    for record in records {
        wtr.write_record(record.csv_row())?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(feature = "xlsx")]
fn write_xlsx(path: &Path, records: &[FieldRecord]) -> anyhow::Result<()> {
    use rust_xlsxwriter::Workbook;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in COLUMNS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }
    for (row, record) in records.iter().enumerate() {
        for (col, value) in record.csv_row().iter().enumerate() {
            worksheet.write_string(row as u32 + 1, col as u16, value)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

#[cfg(not(feature = "xlsx"))]
fn write_xlsx(_path: &Path, _records: &[FieldRecord]) -> anyhow::Result<()> {
    anyhow::bail!("spreadsheet writer not compiled in (enable the `xlsx` feature)")
}

fn print_summary(records: &[FieldRecord], elapsed: std::time::Duration) {
    let ok = records
        .iter()
        .filter(|r| r.status == RecordStatus::Ok)
        .count();
    let partial = records
        .iter()
        .filter(|r| r.status == RecordStatus::Partial)
        .count();
    let failed = records
        .iter()
        .filter(|r| r.status == RecordStatus::ExtractionFailure)
        .count();

    println!();
    println!(
        "{} Processed {} bills in {:?}",
        style("✓").green(),
        records.len(),
        elapsed
    );
    println!(
        "   {} OK, {} parciales, {} fallas",
        style(ok).green(),
        style(partial).yellow(),
        style(failed).red()
    );

    if failed > 0 {
        println!();
        println!("{}", style("Fallas de extracción:").red());
        for record in records
            .iter()
            .filter(|r| r.status == RecordStatus::ExtractionFailure)
        {
            println!("  - {}", record.file_name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boleta_core::classify::Provider;

    #[test]
    fn test_list_pdfs_sorted_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b_enel.pdf", "A_metrogas.PDF", "c_aguas.pdf", "notas.txt"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let files = list_pdfs(dir.path()).unwrap();
        let names: Vec<String> = files.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, ["A_metrogas.PDF", "b_enel.pdf", "c_aguas.pdf"]);
    }

    #[test]
    fn test_process_one_unknown_provider() {
        let record = process_one(
            Path::new("recibo_desconocido.pdf"),
            &BoletaConfig::default(),
        );
        assert_eq!(record.provider, Provider::Unknown);
        assert_eq!(record.status, RecordStatus::Partial);
    }

    #[test]
    fn test_process_one_unreadable_file_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enel_roto.pdf");
        fs::write(&path, b"no es un pdf").unwrap();

        let record = process_one(&path, &BoletaConfig::default());
        assert_eq!(record.status, RecordStatus::ExtractionFailure);
        assert_eq!(record.provider, Provider::Enel);
    }
}
