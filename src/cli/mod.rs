//! Command-line interface for the training job

use std::process::ExitCode;

use clap::Parser;
use colored::*;
use tracing::error;

use crate::error::{Result, TrainerError};
use crate::training::{
    JobConfig, TrainOutcome, TrainingJob, DEFAULT_DATA_PATH, DEFAULT_MODEL_DIR, MODEL_DIR_ENV,
};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn muted(s: &str) -> ColoredString { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString    { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) {
    println!("  {:<12} {}", muted(key), val.white());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "house-price-trainer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fit the house-price regression model and save it as model.joblib")]
#[command(long_about = None)]
pub struct Cli {
    /// Training CSV: local path, mounted bucket path, or gs:// / s3:// URI [default: data.csv]
    #[arg(long = "data-path", value_name = "PATH|URI")]
    pub data_path: Option<String>,

    /// Output directory for model.joblib [default: $AIP_MODEL_DIR, then ./local_model_output]
    #[arg(long = "model-dir", value_name = "PATH|URI")]
    pub model_dir: Option<String>,

    /// Standardize features before fitting the regression
    #[arg(long)]
    pub scale: bool,

    /// Require --data-path and --model-dir; no defaults, environment ignored
    #[arg(long)]
    pub strict: bool,

    /// Print the full error report on failure
    #[arg(long)]
    pub trace_errors: bool,
}

impl Cli {
    /// Turn parsed flags into a job configuration.
    ///
    /// `env_model_dir` is the value of `AIP_MODEL_DIR`, passed in so resolution
    /// stays independent of the process environment.
    pub fn resolve(&self, env_model_dir: Option<String>) -> Result<JobConfig> {
        let (data_path, model_dir) = if self.strict {
            let mut absent = Vec::new();
            if self.data_path.is_none() {
                absent.push("--data-path");
            }
            if self.model_dir.is_none() {
                absent.push("--model-dir");
            }
            if !absent.is_empty() {
                return Err(TrainerError::ConfigError(format!(
                    "strict mode requires {}",
                    absent.join(" and ")
                )));
            }
            (self.data_path.clone().unwrap_or_default(), self.model_dir.clone().unwrap_or_default())
        } else {
            let data_path = self
                .data_path
                .clone()
                .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());
            let model_dir = self
                .model_dir
                .clone()
                .or(env_model_dir.filter(|dir| !dir.trim().is_empty()))
                .unwrap_or_else(|| DEFAULT_MODEL_DIR.to_string());
            (data_path, model_dir)
        };

        for (flag, value) in [("--data-path", &data_path), ("--model-dir", &model_dir)] {
            if value.trim().is_empty() {
                return Err(TrainerError::ConfigError(format!("{} must not be empty", flag)));
            }
        }

        Ok(JobConfig::new(data_path, model_dir).with_scaling(self.scale))
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(config: JobConfig) -> Result<TrainOutcome> {
    println!("  {} {}", muted("Loading data from:"), config.data_path.white());
    let outcome = TrainingJob::new(config).run()?;

    println!("  {} {}", ok("✓"), "Model trained");
    kv("Estimator", &outcome.estimator.to_string());
    kv("Rows", &outcome.n_samples.to_string());
    kv("R²", &format!("{:.4}", outcome.r2));
    kv("Time", &format!("{:.3}s", outcome.elapsed.as_secs_f64()));
    println!("  {} {} {}", ok("✓"), "Model saved to:", outcome.artifact.white().bold());

    Ok(outcome)
}

fn report_failure(err: TrainerError, trace: bool) -> ExitCode {
    let kind = err.kind();
    error!(?kind, "{}", err);
    eprintln!("  {} {}", "ERROR:".red().bold(), err);

    if trace {
        let report = anyhow::Error::new(err).context(format!("{:?} failure", kind));
        eprintln!("{}", dim("─── error report ───"));
        eprintln!("{:?}", report);
    }

    ExitCode::from(kind.exit_code())
}

/// Resolve configuration, run the job, and map the result to a process exit code.
pub fn run(cli: Cli) -> ExitCode {
    let env_model_dir = std::env::var(MODEL_DIR_ENV).ok();
    let result = cli.resolve(env_model_dir).and_then(cmd_train);

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => report_failure(err, cli.trace_errors),
    }
}
