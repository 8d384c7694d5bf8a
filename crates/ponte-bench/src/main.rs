use clap::{Parser, Subcommand, ValueEnum};
use ponte_ampl::write_nl;
use ponte_core::{Model, Sense};
use ponte_tools::MeasurementRecorder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

const DEFAULT_CASES: [usize; 3] = [100, 1_000, 10_000];
const SCHEMA_VERSION: u32 = 1;

#[derive(Parser, Debug)]
#[command(author, version, about = "Ponte NL serialization benchmark runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute benchmark cases and save JSONL artifacts
    Run(RunArgs),
    /// Render benchmark artifact summaries
    Report(ReportArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Comma-separated list of variable counts
    #[arg(long, value_delimiter = ',')]
    cases: Option<Vec<usize>>,

    /// Ratio of constraints per variable
    #[arg(long, default_value_t = 0.01)]
    constraint_ratio: f64,

    /// Number of repetitions per case
    #[arg(long, default_value_t = 1)]
    repetitions: u32,

    /// JSONL output artifact path
    #[arg(long)]
    output: Option<PathBuf>,

    /// Output format for stdout
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Parser, Debug)]
struct ReportArgs {
    /// Input JSONL benchmark artifact
    #[arg(long)]
    input: PathBuf,

    /// Output format for stdout
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StageRecord {
    schema_version: u32,
    case: String,
    variables: usize,
    constraints: usize,
    repetition: u32,
    stage: String,
    duration_ms: f64,
    rss_before_bytes: Option<u64>,
    rss_after_bytes: Option<u64>,
    rss_delta_bytes: Option<i64>,
    nl_bytes: Option<usize>,
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => run(args),
        Command::Report(args) => report(args),
    };
    if let Err(err) = result {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

/// Deterministic LP of the requested size: ring constraints
/// `x_i + x_{i+1} >= 1` and a striped objective.
fn build_case_model(variables: usize, constraints: usize) -> Model {
    let mut a = Vec::with_capacity(constraints);
    for i in 0..constraints {
        let mut row = vec![0.0; variables];
        row[i % variables] = 1.0;
        row[(i + 1) % variables] = 1.0;
        a.push(row);
    }
    let c: Vec<f64> = (0..variables).map(|j| 1.0 + (j % 7) as f64).collect();
    let x_l = vec![0.0; variables];
    let x_u = vec![10.0; variables];
    let g_l = vec![1.0; constraints];
    let g_u = vec![f64::INFINITY; constraints];

    let mut model = Model::new();
    model
        .load_linear_problem(&a, &x_l, &x_u, &c, &g_l, &g_u, Sense::Minimize)
        .expect("benchmark model must load");
    model
}

fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cases = args.cases.unwrap_or_else(|| DEFAULT_CASES.to_vec());
    let mut records = Vec::new();

    for variables in cases {
        let constraints = ((variables as f64 * args.constraint_ratio).ceil() as usize).max(1);
        let case_name = format!("nl-write-{}", variables);

        for repetition in 0..args.repetitions {
            let mut recorder = MeasurementRecorder::new();

            let start = recorder.begin_stage("load");
            let mut model = build_case_model(variables, constraints);
            recorder.end_stage(start);

            let start = recorder.begin_stage("write_nl");
            let mapper = model.finalize().clone();
            let mut out = Vec::new();
            write_nl(&model, &mapper, "bench", &mut out)?;
            recorder.end_stage(start);
            let nl_bytes = out.len();

            for measurement in recorder.stages() {
                records.push(StageRecord {
                    schema_version: SCHEMA_VERSION,
                    case: case_name.clone(),
                    variables,
                    constraints,
                    repetition,
                    stage: measurement.stage.clone(),
                    duration_ms: measurement.duration.as_secs_f64() * 1000.0,
                    rss_before_bytes: measurement.rss_before_bytes,
                    rss_after_bytes: measurement.rss_after_bytes,
                    rss_delta_bytes: measurement.rss_delta_bytes,
                    nl_bytes: (measurement.stage == "write_nl").then_some(nl_bytes),
                });
            }
        }
    }

    if let Some(path) = &args.output {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        for record in &records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
    }

    render(&records, args.format)?;
    Ok(())
}

fn report(args: ReportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(&args.input)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str::<StageRecord>(&line)?);
    }
    render(&records, args.format)?;
    Ok(())
}

fn render(records: &[StageRecord], format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(records)?);
        }
        OutputFormat::Table => {
            println!(
                "{:<18} {:>9} {:>9} {:>4} {:<9} {:>12} {:>12} {:>10}",
                "case", "vars", "cons", "rep", "stage", "duration_ms", "rss_delta", "nl_bytes"
            );
            for record in records {
                println!(
                    "{:<18} {:>9} {:>9} {:>4} {:<9} {:>12.3} {:>12} {:>10}",
                    record.case,
                    record.variables,
                    record.constraints,
                    record.repetition,
                    record.stage,
                    record.duration_ms,
                    record
                        .rss_delta_bytes
                        .map(|delta| delta.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    record
                        .nl_bytes
                        .map(|bytes| bytes.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
        }
    }
    Ok(())
}
