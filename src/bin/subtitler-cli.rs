use anyhow::{Context, Result};
use clap::Parser;

use std::fs::File;
use std::io::{self, BufReader, Read};

use subtitler::captions::{build_caption_set, write_captions};
use subtitler::input::read_records;
use subtitler::logging;
use subtitler::output_type::OutputType;
use subtitler::policy::{PolicyOverrides, ReadabilityPolicy};
use subtitler::quality::compute_quality;

fn main() -> Result<()> {
    logging::init();
    let params = get_params()?;
    let policy = build_policy(&params)?;

    let records = match &params.input_path {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("failed to open '{path}'"))?;
            read_input(BufReader::new(file))?
        }
        None => read_input(io::stdin().lock())?,
    };

    let set = build_caption_set(&records, &policy)?;

    let stdout = io::stdout();
    write_captions(&set, stdout.lock(), params.output_type)?;

    if params.report {
        let report = compute_quality(&set.segments, &policy);
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

fn read_input<R: Read>(r: R) -> Result<Vec<subtitler::Record>> {
    Ok(read_records(r).context("failed to read recognizer JSON")?)
}

/// Defaults, then `SUBTITLER_*` variables, then the policy file, then explicit flags.
fn build_policy(params: &Params) -> Result<ReadabilityPolicy> {
    let mut policy = ReadabilityPolicy::from_env()?;

    if let Some(path) = &params.policy_path {
        let file = File::open(path).with_context(|| format!("failed to open policy '{path}'"))?;
        let overrides: PolicyOverrides = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("invalid policy file '{path}'"))?;
        policy = overrides.apply(policy);
    }

    if let Some(max_line_chars) = params.max_line_chars {
        policy = policy.with_max_line_chars(max_line_chars);
    }
    if let Some(seconds) = params.max_duration {
        policy = policy.with_max_segment_duration(seconds);
    }

    policy.validate()?;
    Ok(policy)
}

#[derive(Parser, Debug)]
#[command(name = "subtitler")]
#[command(about = "Turn timestamped recognizer output into readable subtitles")]
struct Params {
    /// Recognizer JSON; reads stdin when omitted.
    #[arg(short = 'i', long = "input")]
    pub input_path: Option<String>,

    #[arg(
        short = 'o',
        long = "output-type",
        value_enum,
        default_value_t = OutputType::Srt
    )]
    pub output_type: OutputType,

    /// JSON file overriding individual readability policy fields.
    #[arg(short = 'p', long = "policy")]
    pub policy_path: Option<String>,

    #[arg(long = "max-line-chars")]
    pub max_line_chars: Option<usize>,

    /// Maximum caption duration, in seconds.
    #[arg(long = "max-duration")]
    pub max_duration: Option<f64>,

    /// Print a JSON quality report to stderr.
    #[arg(long = "report", default_value_t = false)]
    pub report: bool,
}

fn get_params() -> Result<Params> {
    Ok(Params::parse())
}
