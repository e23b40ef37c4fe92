//! CLI binary for weather-ocr-correct.
//!
//! Reads OCR spans as JSON Lines (`{"text": ..., "name": ..., "height": ...}`)
//! from a file or stdin and writes one JSON object per span.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use weather_ocr_correct::{
    Advice, Correction, Corrector, EngineConfig, LegendDictionary, OcrProfile, ReprocessAdvisor,
    SpanKind, SpanMetadata,
};

#[derive(Parser, Debug)]
#[command(
    name = "wxocr",
    version,
    about = "Correct OCR output from historical weather-station logs"
)]
struct Cli {
    /// JSON engine configuration; missing fields keep their defaults.
    #[arg(short, long, global = true, env = "WXOCR_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Correct each span and report label, body, variable and signature.
    Correct {
        /// JSON Lines input; stdin when omitted.
        input: Option<PathBuf>,

        /// Write results here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also report the reprocess advisory for each span.
        #[arg(long)]
        advise: bool,

        /// Directory holding legend_words.txt and/or en_US.aff/.dic.
        #[arg(long)]
        dictionary: Option<PathBuf>,
    },
    /// Only decide which spans should be OCR'd again.
    Advise {
        input: Option<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the effective configuration as JSON.
    Config,
}

#[derive(Debug, Deserialize)]
struct SpanInput {
    text: String,
    #[serde(default)]
    name: Option<String>,
    /// Image height in pixels, for line images.
    #[serde(default)]
    height: Option<u32>,
}

#[derive(Debug, Serialize)]
struct CorrectOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    kind: SpanKind,
    line: String,
    #[serde(flatten)]
    correction: Option<Correction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    legend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    advice: Option<Advice>,
}

#[derive(Debug, Serialize)]
struct AdviseOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(flatten)]
    advice: Advice,
    /// Engine arguments for the second pass, when the span's origin is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_args: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Command::Correct {
            input,
            output,
            advise,
            dictionary,
        } => {
            let mut corrector = Corrector::new(&config).context("Invalid configuration")?;
            if let Some(dir) = dictionary {
                let legend = LegendDictionary::load(&dir)
                    .with_context(|| format!("Failed to load dictionary {}", dir.display()))?;
                corrector = corrector.with_legend(legend);
            }
            let advisor = if advise {
                Some(ReprocessAdvisor::new(&config.reprocess).context("Invalid configuration")?)
            } else {
                None
            };
            let spans = read_spans(input.as_deref())?;
            let mut writer = open_output(output.as_deref())?;
            run_correct(&corrector, advisor.as_ref(), spans, &mut writer)?;
            writer.flush()?;
        }
        Command::Advise { input, output } => {
            let advisor = ReprocessAdvisor::new(&config.reprocess).context("Invalid configuration")?;
            let spans = read_spans(input.as_deref())?;
            let mut writer = open_output(output.as_deref())?;
            run_advise(&advisor, spans, &mut writer)?;
            writer.flush()?;
        }
        Command::Config => {
            println!("{}", config.to_json_pretty()?);
        }
    }

    Ok(())
}

fn run_correct(
    corrector: &Corrector,
    advisor: Option<&ReprocessAdvisor>,
    spans: Vec<SpanInput>,
    writer: &mut dyn Write,
) -> Result<()> {
    let (data, legend): (Vec<_>, Vec<_>) = spans
        .iter()
        .enumerate()
        .partition(|(_, span)| corrector.span_kind(&span.text) == SpanKind::Data);

    let texts: Vec<&str> = data.iter().map(|(_, span)| span.text.as_str()).collect();
    let corrections = corrector.correct_batch(&texts)?;
    let legend_texts: Vec<&str> = legend.iter().map(|(_, span)| span.text.as_str()).collect();
    let legend_lines = corrector.correct_legend(&legend_texts);

    let mut results: Vec<(usize, CorrectOutput)> = Vec::with_capacity(spans.len());
    for ((index, span), correction) in data.into_iter().zip(corrections) {
        results.push((
            index,
            CorrectOutput {
                name: span.name.clone(),
                kind: SpanKind::Data,
                line: correction.line(),
                correction: Some(correction),
                legend: None,
                advice: advisor.map(|a| a.should_reprocess(&span.text)),
            },
        ));
    }
    for ((index, span), line) in legend.into_iter().zip(legend_lines) {
        results.push((
            index,
            CorrectOutput {
                name: span.name.clone(),
                kind: SpanKind::Legend,
                line: line.clone(),
                correction: None,
                legend: Some(line),
                advice: advisor.map(|a| a.should_reprocess(&span.text)),
            },
        ));
    }
    results.sort_by_key(|(index, _)| *index);

    for (_, result) in results {
        serde_json::to_writer(&mut *writer, &result)?;
        writeln!(writer)?;
    }
    Ok(())
}

fn run_advise(advisor: &ReprocessAdvisor, spans: Vec<SpanInput>, writer: &mut dyn Write) -> Result<()> {
    let texts: Vec<&str> = spans.iter().map(|span| span.text.as_str()).collect();
    let advice = advisor.advise_batch(&texts);
    let profile = OcrProfile::default();

    for (span, advice) in spans.into_iter().zip(advice) {
        let retry_args = span
            .name
            .as_deref()
            .and_then(|name| match SpanMetadata::from_name(name) {
                Ok(metadata) => Some(metadata),
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            })
            .and_then(|metadata| {
                let base = profile.for_span(&metadata, span.height.unwrap_or(0));
                advice.apply_to(base)
            })
            .map(|config| config.to_args());

        let result = AdviseOutput {
            name: span.name,
            advice,
            retry_args,
        };
        serde_json::to_writer(&mut *writer, &result)?;
        writeln!(writer)?;
    }
    Ok(())
}

fn read_spans(input: Option<&Path>) -> Result<Vec<SpanInput>> {
    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut spans = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let span: SpanInput = serde_json::from_str(&line)
            .with_context(|| format!("Invalid JSON on line {}", number + 1))?;
        spans.push(span);
    }
    Ok(spans)
}

fn open_output(output: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    })
}
