use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use faq_core::DEFAULT_REQUIRED_PASS_RATE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "faq",
    version,
    about = "Answer restaurant questions from a FAQ corpus"
)]
pub struct Cli {
    /// FAQ corpus (.json, .jsonl or .csv). Overrides `faq_path` from the config file.
    #[arg(long, global = true)]
    pub faqs: Option<PathBuf>,

    /// TOML settings file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a single question.
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Answer questions read line by line from stdin.
    Chat {
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// FAQs whose questions resemble the one with the given id.
    Similar {
        id: String,
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
    /// List FAQs, optionally restricted to one category.
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// Look FAQs up by keyword.
    Search {
        #[arg(required = true, num_args = 1..)]
        keywords: Vec<String>,
        #[arg(long, default_value_t = 5)]
        max: usize,
    },
    /// Corpus and model statistics.
    Stats,
    /// Score the matcher against a JSON file of expected outcomes.
    Eval {
        #[arg(long)]
        cases: PathBuf,
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long, default_value_t = DEFAULT_REQUIRED_PASS_RATE)]
        min_pass_rate: f64,
    },
}

impl Cli {
    pub fn threshold(&self) -> Option<f64> {
        match &self.command {
            Commands::Ask { threshold, .. }
            | Commands::Chat { threshold }
            | Commands::Eval { threshold, .. } => *threshold,
            _ => None,
        }
    }
}
