use anyhow::{bail, Context, Result};
use breastcanai::*;
use clap::Parser;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

/// Screen ligands from the command line.
///
/// Each SMILES argument prints its descriptors and verdict. With `--csv`,
/// a column of SMILES is screened and a CSV report is written.
#[derive(Parser, Debug)]
#[command(name = "screen", version, about, long_about = None)]
struct Args {
    /// SMILES strings to screen
    #[arg(conflicts_with = "csv")]
    smiles: Vec<String>,

    /// CSV file with a column of SMILES
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Name of the SMILES column
    #[arg(long, default_value = "smiles")]
    column: String,

    /// Where to write the CSV report (stdout if omitted)
    #[arg(short, long, requires = "csv")]
    output: Option<PathBuf>,

    /// TOML config file (defaults to ./breastcanai.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model artifact, overriding the config
    #[arg(short, long)]
    model: Option<PathBuf>,

    #[arg(long)]
    log_level: Option<String>,
}

fn print_screening<C: Classifier + ?Sized>(screener: &Screener<C>, smiles: &str, out: &mut impl Write) -> Result<()> {
    match screener.describe(smiles) {
        DescribeOutcome::Empty => {}
        DescribeOutcome::Invalid { input, error } => {
            writeln!(out, "{input}: {INVALID_SMILES_MESSAGE} ({error})")?;
        }
        DescribeOutcome::Described { smiles, descriptors } => {
            writeln!(out, "{smiles}")?;
            write!(out, "{descriptors}")?;
            match screener.predict(&descriptors) {
                Prediction::Scored(verdict) => writeln!(out, "Therapeutic probability: {verdict}")?,
                Prediction::Failed { message } => writeln!(out, "{message}")?,
            }
            writeln!(out, "{DISCLAIMER}")?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::discover(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(model) = args.model {
        config.model_path = model;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    init_logging(&config.log_level);

    if args.csv.is_none() && args.smiles.is_empty() {
        bail!("Nothing to screen: pass SMILES arguments or --csv FILE");
    }

    let model = LoadedModel::load(&config.model_path)
        .with_context(|| format!("Failed to load model from {}", config.model_path.display()))?;
    let screener = Screener::new(&model);

    if let Some(path) = args.csv {
        let file = File::open(&path).with_context(|| format!("Failed to open {}", path.display()))?;
        let inputs = read_smiles_column(file, &args.column)
            .with_context(|| format!("Failed to read SMILES from {}", path.display()))?;
        let rows = screen_batch(&screener, inputs);
        match args.output {
            Some(output) => {
                let file = File::create(&output)
                    .with_context(|| format!("Failed to create {}", output.display()))?;
                write_report(&rows, file)?;
            }
            None => write_report(&rows, io::stdout().lock())?,
        }
        return Ok(());
    }

    let mut out = io::stdout().lock();
    for (i, smiles) in args.smiles.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        print_screening(&screener, smiles, &mut out)?;
    }
    Ok(())
}
