//! Process command - extract data from a single bill file.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use boleta_core::classify::{classify, Provider};
use boleta_core::extract::{rules_for, BillExtractor};
use boleta_core::models::record::{FieldRecord, COLUMNS};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input bill PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Provider override when the file name gives no hint
    #[arg(short, long, value_enum)]
    provider: Option<ProviderArg>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ProviderArg {
    Metrogas,
    Enel,
    AguasAndinas,
}

impl From<ProviderArg> for Provider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Metrogas => Provider::Metrogas,
            ProviderArg::Enel => Provider::Enel,
            ProviderArg::AguasAndinas => Provider::AguasAndinas,
        }
    }
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let file_name = args
        .input
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    let provider = match args.provider {
        Some(p) => p.into(),
        None => classify(file_name),
    };
    let Some(rules) = rules_for(provider) else {
        anyhow::bail!(
            "Could not classify {} by name; pass --provider explicitly",
            file_name
        );
    };

    info!("processing {} as {}", args.input.display(), provider);

    let mut extractor = BillExtractor::new(rules);
    if let Some(floor) = config.extraction.total_floor(provider) {
        extractor = extractor.with_total_floor(floor);
    }
    let record = extractor.extract_file(&args.input);

    let output = format_record(&record, args.format)?;
    match &args.output {
        Some(path) => {
            fs::write(path, &output)?;
            println!(
                "{} Output written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => println!("{}", output),
    }

    Ok(())
}

fn format_record(record: &FieldRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(COLUMNS)?;
            wtr.write_record(record.csv_row())?;
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => Ok(format_record_text(record)),
    }
}

fn format_record_text(record: &FieldRecord) -> String {
    let mut output = String::new();
    let absent = "-".to_string();

    output.push_str(&format!("Archivo:     {}\n", record.file_name));
    output.push_str(&format!(
        "Empresa:     {}\n",
        record.provider.label().unwrap_or("-")
    ));
    output.push_str(&format!(
        "Documento:   {}\n",
        record.document_number.as_ref().unwrap_or(&absent)
    ));
    output.push_str(&format!(
        "Total:       {}\n",
        record
            .total_due
            .map(|t| format!("$ {}", t))
            .unwrap_or_else(|| absent.clone())
    ));
    output.push_str(&format!(
        "Cliente:     {}\n",
        record.client_id.as_ref().unwrap_or(&absent)
    ));
    output.push_str(&format!(
        "Emisión:     {}\n",
        record.issue_date.as_ref().unwrap_or(&absent)
    ));
    output.push_str(&format!(
        "Vencimiento: {}\n",
        record.due_date.as_ref().unwrap_or(&absent)
    ));
    output.push_str(&format!(
        "Consumo:     {}\n",
        record.consumption.as_ref().unwrap_or(&absent)
    ));
    output.push_str(&format!("Estado:      {}\n", record.status.as_str()));

    output
}
