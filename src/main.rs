//! coursegen is a CLI tool that turns a YouTube video, PDF files or free text
//! into course notes, quizzes and flashcards using an LLM model.
//!
//! The tool has two main commands:
//! 1. `generate` - Asks the model for course material and parses the completion
//! 2. `parse` - Parses an already saved completion

use std::fs;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Builder;
use llm::builder::{LLMBackend, LLMBuilder};
use log::{LevelFilter, info};
use serde::Serialize;
use std::str::FromStr;
use url::Url;

use coursegen::{
    CourseRequest, CourseService, RateLimitConfig, RateLimiter, SourceType,
    constants::{
        DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW, MODEL_API_KEY_ENV_NAME, MODEL_MAX_TOKENS,
        MODEL_TEMPERATURE, SYSTEM_PROMPT,
    },
    generate::{GenerateContext, build_pacer},
    parse::parse,
};

/// A CLI tool to generate course material with an LLM
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The command to execute (generate or parse)
    #[command(subcommand)]
    command: Command,

    #[arg(long, short, action = clap::ArgAction::Count, help = "Output v(v...)erbosity: error (0), warn (1), info (2), debug (3), trace (4)", global = true, default_value_t = 2)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Generate notes, quizzes and flashcards from a source using an LLM model
    Generate {
        /// URL of the LLM model to use, e.g. openai://gpt-4o-mini
        model: String,
        /// Source type: "youtube", "pdf" or "text"
        source_type: SourceType,
        /// YouTube URL, comma-separated PDF file names, or free text
        content: String,
        /// Optional course title
        #[arg(long)]
        title: Option<String>,
        /// Identity the rate limit is applied to
        #[arg(long, short, default_value = "cli")]
        identity: String,
        /// Path to the file with a prompt template
        #[arg(long, short = 'p')]
        prompt_file: Option<String>,
        /// Pacing: model requests per minute (default: no limit)
        #[arg(long, short = 'r')]
        rpm: Option<u32>,
        /// Requests admitted per identity within one window
        #[arg(long, default_value_t = DEFAULT_MAX_REQUESTS, value_parser = clap::value_parser!(u32).range(1..))]
        max_requests: u32,
        /// Length of the rate limit window in seconds
        #[arg(long, default_value_t = DEFAULT_WINDOW.as_secs(), value_parser = clap::value_parser!(u64).range(1..))]
        window_secs: u64,
        /// Path to the output JSON file (default: stdout)
        #[arg(long, short)]
        output: Option<String>,
    },
    /// Parse a saved model completion into course content
    Parse {
        /// Path to the file holding the completion
        input_file: String,
        /// Path to the output JSON file (default: stdout)
        #[arg(long, short)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            3 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .init();

    match cli.command {
        Command::Generate {
            model,
            source_type,
            content,
            title,
            identity,
            prompt_file,
            rpm,
            max_requests,
            window_secs,
            output,
        } => {
            let mut request = CourseRequest::new(source_type, content);
            if let Some(title) = title {
                request = request.with_title(title);
            }
            let config = RateLimitConfig {
                max_requests,
                window: Duration::from_secs(window_secs),
            };
            handle_generate_command(
                model,
                request,
                identity,
                prompt_file,
                rpm,
                config,
                output,
            )
            .await
        }
        Command::Parse { input_file, output } => handle_parse_command(input_file, output),
    }
}

async fn handle_generate_command(
    model: String,
    request: CourseRequest,
    identity: String,
    prompt_file: Option<String>,
    rpm: Option<u32>,
    config: RateLimitConfig,
    output: Option<String>,
) -> Result<()> {
    let llm_builder = model_builder(&model)?;
    let model = llm_builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build LLM model: {}", e))?;

    let prompt_template = match prompt_file {
        Some(file) => {
            let content =
                fs::read_to_string(&file).context(format!("Failed to read prompt file: {file}"))?;
            Some(content)
        }
        None => None,
    };

    let pacer = build_pacer(rpm);
    let ctx = GenerateContext {
        model: model.as_ref(),
        prompt_template: prompt_template.as_deref(),
        pacer: pacer.as_ref(),
    };

    let service = CourseService::new(RateLimiter::new(config));
    let outcome = service.handle(&identity, &request, &ctx).await?;

    write_json(&outcome, output.as_deref())
}

fn handle_parse_command(input_file: String, output: Option<String>) -> Result<()> {
    let completion = fs::read_to_string(&input_file)
        .context(format!("Failed to read completion file: {input_file}"))?;
    let course = parse(&completion);

    info!(
        "Parsed {} notes, {} quizzes, {} flashcards from {input_file}",
        course.notes.len(),
        course.quizzes.len(),
        course.flashcards.len()
    );

    write_json(&course, output.as_deref())
}

/// Builds an LLM model builder from a `backend://model` URL.
fn model_builder(model: &str) -> Result<LLMBuilder> {
    let model_url = Url::parse(model).map_err(|e| anyhow::anyhow!("Invalid model URL: {}", e))?;
    let llm_builder = LLMBuilder::new()
        .backend(
            LLMBackend::from_str(model_url.scheme())
                .map_err(|e| anyhow::anyhow!("Invalid LLM backend: {}", e))?,
        )
        .model(
            [
                model_url
                    .host_str()
                    .context("Specify model name as host URL.")?,
                model_url.username(),
            ]
            .iter()
            .filter(|x| !x.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(":"),
        )
        .system(SYSTEM_PROMPT)
        .temperature(MODEL_TEMPERATURE)
        .max_tokens(MODEL_MAX_TOKENS);

    let llm_builder = match std::env::var(MODEL_API_KEY_ENV_NAME) {
        Ok(model_key) => {
            info!("API key is provided by {MODEL_API_KEY_ENV_NAME}");
            llm_builder.api_key(model_key)
        }
        Err(err) => {
            info!("{err} while providing api key");
            llm_builder
        }
    };

    Ok(llm_builder)
}

fn write_json<T: Serialize>(value: &T, output: Option<&str>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, json).context(format!("Failed to write output file: {path}"))?;
            info!("Wrote {path}");
        }
        None => println!("{json}"),
    }

    Ok(())
}
