use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use policy_core::{Category, ErrorResponse, PoliciesResponse, ProcessRequest};
use policy_extractor::{AnthropicClient, ExtractorConfig, PolicyExtractor};
use policy_observability::{init_cli_tracing, AppMetrics};

#[derive(Debug, Parser)]
#[command(name = "policy-desk")]
#[command(about = "Structure raw hotel policy text into classified policy atoms")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract policy atoms from text given inline, from a file, or on stdin.
    Extract {
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        #[arg(long)]
        model: Option<String>,
    },
    /// Print the active system prompt.
    Prompt,
    /// List taxonomy slugs with their sensitivity tier.
    Categories,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_cli_tracing("policy_desk");
    let cli = Cli::parse();

    match cli.command {
        Command::Extract {
            text,
            file,
            api_key,
            model,
        } => {
            let policy_text = read_policy_text(text, file)?;
            let mut config = ExtractorConfig::from_env()?;
            if let Some(model) = model {
                config = config.with_model(model);
            }
            let client = AnthropicClient::new(config.api_base.clone())?;
            let extractor = PolicyExtractor::new(client, config, AppMetrics::shared());

            let result = extractor
                .extract(ProcessRequest {
                    policy_text: Some(policy_text),
                    api_key,
                })
                .await;

            match result {
                Ok(policies) => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&PoliciesResponse { policies })?
                    );
                }
                Err(error) => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&ErrorResponse {
                            error: error.to_string()
                        })?
                    );
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Prompt => {
            let config = ExtractorConfig::from_env()?;
            println!("{}", config.system_prompt);
        }
        Command::Categories => {
            for category in Category::ALL {
                println!(
                    "{:<24} {}",
                    category.as_slug(),
                    category.default_sensitivity().as_str()
                );
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn read_policy_text(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return fs::read_to_string(&path)
            .with_context(|| format!("failed reading policy text from {}", path.display()));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("failed reading policy text from stdin")?;
    Ok(buffer)
}
