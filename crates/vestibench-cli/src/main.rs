//! vestibench CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "vestibench", version, about = "LLM vestibular scoring harness")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score candidate answer sets and evaluate admission per program
    Score {
        /// Exam info JSON (structure + statistics)
        #[arg(long)]
        exam: PathBuf,

        /// Candidate answer sets JSON
        #[arg(long)]
        answers: PathBuf,

        /// Program weight table JSON
        #[arg(long)]
        weights: PathBuf,

        /// Cutoff table JSON
        #[arg(long)]
        cutoffs: PathBuf,

        /// Alias table JSON (defaults to the built-in table)
        #[arg(long)]
        aliases: Option<PathBuf>,

        /// Exam edition key inside the info file
        #[arg(long)]
        edition: Option<String>,

        /// Essay score on the 0-10 scale
        #[arg(long, default_value = "9.98")]
        essay_score: f64,

        /// Evaluate only this candidate
        #[arg(long)]
        candidate: Option<String>,

        /// Output directory
        #[arg(long, default_value = "./vestibench-results")]
        output: PathBuf,

        /// Output format: json, html, markdown, all
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Collect answers from LLM backends for extracted questions
    Answer {
        /// Questions JSON produced by `vestibench extract`
        #[arg(long)]
        questions: PathBuf,

        /// Models to query (e.g. "anthropic/claude-3-5-sonnet-20241022,openai/gpt-4o")
        #[arg(long)]
        models: Option<String>,

        /// Official answer key JSON; grades the run when provided
        #[arg(long)]
        key: Option<PathBuf>,

        /// Max concurrent requests
        #[arg(long, default_value = "4")]
        parallelism: usize,

        /// Sampling temperature
        #[arg(long)]
        temperature: Option<f64>,

        /// Output directory
        #[arg(long, default_value = "./vestibench-results")]
        output: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Extract numbered questions from page text records
    Extract {
        /// Page records JSON
        #[arg(long)]
        pages: PathBuf,

        /// Output questions JSON
        #[arg(long)]
        output: PathBuf,
    },

    /// Validate reference data (structure, statistics, weights, cutoffs)
    Validate {
        /// Exam info JSON
        #[arg(long)]
        exam: PathBuf,

        /// Program weight table JSON
        #[arg(long)]
        weights: PathBuf,

        /// Cutoff table JSON
        #[arg(long)]
        cutoffs: PathBuf,

        /// Alias table JSON (defaults to the built-in table)
        #[arg(long)]
        aliases: Option<PathBuf>,

        /// Exam edition key inside the info file
        #[arg(long)]
        edition: Option<String>,
    },

    /// Compare two evaluation reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Score-point threshold for a shift to count
        #[arg(long, default_value = "5.0")]
        threshold: f64,

        /// Exit code 1 if regressions found
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, markdown, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example reference data
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vestibench=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Score {
            exam,
            answers,
            weights,
            cutoffs,
            aliases,
            edition,
            essay_score,
            candidate,
            output,
            format,
        } => commands::score::execute(
            exam,
            answers,
            weights,
            cutoffs,
            aliases,
            edition,
            essay_score,
            candidate,
            output,
            format,
        ),
        Commands::Answer {
            questions,
            models,
            key,
            parallelism,
            temperature,
            output,
            config,
        } => {
            commands::answer::execute(
                questions,
                models,
                key,
                parallelism,
                temperature,
                output,
                config,
            )
            .await
        }
        Commands::Extract { pages, output } => commands::extract::execute(pages, output),
        Commands::Validate {
            exam,
            weights,
            cutoffs,
            aliases,
            edition,
        } => commands::validate::execute(exam, weights, cutoffs, aliases, edition),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_regression, format),
        Commands::ListModels { provider, config } => {
            commands::list_models::execute(provider, config)
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
