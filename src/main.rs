// crisiswatch - Crisis risk scoring and emotional state tracking
// Main entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

use crisiswatch::config::{load_config, load_config_from_path, EngineConfig};
use crisiswatch::engine::{AnalyzeOptions, CrisisAnalysisResult, CrisisSession, InputEvent};
use crisiswatch::errors::UserFriendlyError;
use crisiswatch::scoring::AnalysisContext;
use crisiswatch::screening::{self, Questionnaire};

#[derive(Parser, Debug)]
#[command(name = "crisiswatch")]
#[command(about = "Crisis risk scoring and emotional state tracking", version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: ~/.crisiswatch/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a single message
    Analyze {
        /// Message text
        text: String,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
        /// ISO language code used to localize resources
        #[arg(long)]
        language: Option<String>,
        /// Cultural profile (e.g. east_asian)
        #[arg(long)]
        culture: Option<String>,
    },
    /// Analyze stdin lines as they are typed, debounced
    Watch {
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        culture: Option<String>,
    },
    /// Score a screening questionnaire
    Screen {
        #[arg(value_enum)]
        questionnaire: QuestionnaireArg,
        /// Item scores, 0-3 each
        #[arg(required = true)]
        scores: Vec<u8>,
    },
    /// Print the effective configuration
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum QuestionnaireArg {
    Phq9,
    Gad7,
}

impl From<QuestionnaireArg> for Questionnaire {
    fn from(arg: QuestionnaireArg) -> Self {
        match arg {
            QuestionnaireArg::Phq9 => Questionnaire::Phq9,
            QuestionnaireArg::Gad7 => Questionnaire::Gad7,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config_from_path(path)?,
        None => load_config()?,
    };

    match args.command {
        Command::Analyze {
            text,
            json,
            language,
            culture,
        } => run_analyze(config, &text, json, context(language, culture)).await,
        Command::Watch { language, culture } => {
            run_watch(config, context(language, culture)).await
        }
        Command::Screen {
            questionnaire,
            scores,
        } => run_screen(questionnaire.into(), &scores),
        Command::Config => {
            let rendered =
                toml::to_string_pretty(&config).context("Failed to render configuration")?;
            println!("{}", rendered);
            Ok(())
        }
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing_log::LogTracer::init().ok();
}

fn context(language: Option<String>, culture: Option<String>) -> AnalysisContext {
    let mut context = AnalysisContext::new();
    if let Some(language) = language {
        context = context.with_language(language);
    }
    if let Some(culture) = culture {
        context = context.with_cultural_context(culture);
    }
    context
}

async fn run_analyze(
    config: EngineConfig,
    text: &str,
    json: bool,
    context: AnalysisContext,
) -> Result<()> {
    let session = CrisisSession::from_config(config)?;
    let Some(result) = session
        .analyze_text(text, &context, AnalyzeOptions::immediate())
        .await
    else {
        anyhow::bail!("No analysis produced (text too short or no scoring path available)");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_result(&result);
    let alert = session.crisis_alert();
    if alert.show {
        println!();
        println!("[{}] {}", alert.severity, alert.message);
        for resource in &alert.resources {
            println!("  - {}", resource);
        }
    }
    Ok(())
}

fn print_result(result: &CrisisAnalysisResult) {
    let state = &result.emotional_state;
    println!(
        "risk {:.0}/100 ({}, confidence {:.2})",
        result.risk_level,
        result.source.as_str(),
        result.confidence
    );
    println!(
        "valence {:+.2}  arousal {:.2}  dominance {:.2}",
        state.valence, state.arousal, state.dominance
    );
    if !result.risk_factors.is_empty() {
        println!("factors: {}", result.risk_factors.join(", "));
    }
    for recommendation in &result.intervention_recommendations {
        println!("  * {}", recommendation);
    }
}

async fn run_watch(config: EngineConfig, context: AnalysisContext) -> Result<()> {
    let session = CrisisSession::from_config(config)?;

    session.on_crisis_detected(|analysis| {
        println!("!! crisis detected: risk {:.0}", analysis.risk_level);
    });
    session.on_risk_escalation(|current| {
        println!("!! risk escalated to {:.0}", current);
    });

    let (tx, rx) = futures::channel::mpsc::unbounded();
    let _monitor = session.monitor_text_input(rx, context.clone());

    tracing::info!("Watching stdin, Ctrl-D to stop");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_line = None;
    while let Some(line) = lines.next_line().await? {
        last_line = Some(line.clone());
        if tx.unbounded_send(InputEvent::Input(line)).is_err() {
            break;
        }
    }

    // Flush: the final line supersedes whatever is still debouncing
    if let Some(line) = last_line {
        session
            .analyze_text(&line, &context, AnalyzeOptions::immediate())
            .await;
    }

    if let Some(result) = session.last_analysis() {
        print_result(&result);
    }
    let trend = session.emotional_trend();
    let prediction = session.risk_prediction();
    println!(
        "mood {:?} (confidence {:.2}), predicted risk {:.0} ({:?})",
        trend.trend, trend.confidence, prediction.predicted_risk, prediction.trend
    );
    session.dispose();
    Ok(())
}

fn run_screen(questionnaire: Questionnaire, scores: &[u8]) -> Result<()> {
    let result = screening::score(questionnaire, scores)
        .map_err(anyhow::Error::from)
        .user_context_with_suggestion(
            "Invalid questionnaire answers",
            "PHQ-9 takes 9 scores and GAD-7 takes 7, each between 0 and 3",
        )?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
