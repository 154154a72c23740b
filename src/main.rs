//! HeartGuard: heart disease risk assessment client
//!
//! Main entry point for the terminal application.

use std::io::IsTerminal;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use heartguard::adapters::sanitize::SanitizingMakeWriter;
use heartguard::adapters::HttpPredictionClient;
use heartguard::config::LogMode;
use heartguard::domain::ValidationPolicy;
use heartguard::tui::App;
use heartguard::{present, ClinicalField, Config, Outcome, PredictionService, PredictionSession};

#[derive(Parser, Debug)]
#[command(name = "heartguard", version, about = "Heart disease risk assessment client")]
struct Cli {
    /// Prediction service base URL (overrides HEARTGUARD_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Reject out-of-domain values locally instead of forwarding them
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive terminal UI (default)
    Tui,
    /// Submit one patient and print the result
    Predict(PatientArgs),
    /// Probe the service root endpoint
    Health,
}

/// Raw clinical values, passed through exactly as typed.
#[derive(Args, Debug, Default)]
struct PatientArgs {
    #[arg(long, allow_hyphen_values = true)]
    age: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    sex: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    cp: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    trestbps: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    chol: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    fbs: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    restecg: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    thalach: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    exang: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    oldpeak: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    slope: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    ca: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    thal: Option<String>,
}

impl PatientArgs {
    fn into_values(self) -> [(ClinicalField, Option<String>); ClinicalField::COUNT] {
        [
            (ClinicalField::Age, self.age),
            (ClinicalField::Sex, self.sex),
            (ClinicalField::Cp, self.cp),
            (ClinicalField::Trestbps, self.trestbps),
            (ClinicalField::Chol, self.chol),
            (ClinicalField::Fbs, self.fbs),
            (ClinicalField::Restecg, self.restecg),
            (ClinicalField::Thalach, self.thalach),
            (ClinicalField::Exang, self.exang),
            (ClinicalField::Oldpeak, self.oldpeak),
            (ClinicalField::Slope, self.slope),
            (ClinicalField::Ca, self.ca),
            (ClinicalField::Thal, self.thal),
        ]
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env().context("Invalid configuration")?;
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url)?;
    }
    if cli.strict {
        config.validation = ValidationPolicy::Strict;
    }

    let command = cli.command.unwrap_or(Command::Tui);
    let tui = matches!(command, Command::Tui);

    // Writing logs to the terminal would corrupt the TUI alternate screen.
    let use_file = match config.log_mode {
        LogMode::File => true,
        LogMode::Stdout => false,
        LogMode::Auto => tui && std::io::stdout().is_terminal(),
    };
    let _guard = init_logging(use_file, &config.log_file)?;

    tracing::info!(api_url = %config.api_url, validation = ?config.validation, "Starting HeartGuard...");

    match command {
        Command::Tui => {
            let mut app = App::new(&config)?;
            app.run()?;
        }
        Command::Predict(patient) => run_predict(&config, patient)?,
        Command::Health => run_health(&config)?,
    }

    tracing::info!("HeartGuard shutdown complete.");
    Ok(())
}

fn init_logging(use_file: bool, log_file: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let (writer, guard) = if use_file {
        if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            // Best-effort: the open below reports the real error.
            let _ = std::fs::create_dir_all(parent);
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .with_context(|| format!("Cannot open log file {}", log_file.display()))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stderr())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(!use_file)
                .with_writer(SanitizingMakeWriter::new(writer)),
        )
        .init();

    Ok(guard)
}

fn run_predict(config: &Config, patient: PatientArgs) -> Result<()> {
    let client = HttpPredictionClient::new(config)?;
    let mut session = PredictionSession::new(config.validation);
    for (field, value) in patient.into_values() {
        if let Some(value) = value {
            session.set_field(field, value);
        }
    }

    let outcome = session.submit(&client);
    if let Some(card) = present(outcome) {
        println!("{}", card.to_plain_text());
    }

    if let Outcome::Error { kind, .. } = outcome {
        bail!("Prediction failed ({kind:?})");
    }
    Ok(())
}

fn run_health(config: &Config) -> Result<()> {
    let client = HttpPredictionClient::new(config)?;
    let status = client
        .health()
        .with_context(|| format!("Prediction service at {} is unreachable", config.api_url))?;
    println!("{}: {}", config.api_url, status.status);
    Ok(())
}
