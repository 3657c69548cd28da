mod api;
mod config;
mod terminal_output;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use bugscope_assistant::Assistant;
use bugscope_config::BugscopeConfig;
use bugscope_core::{AnalysisMode, AnalysisResult, CodeTemplate, GenerationRequest};
use bugscope_extract::render_markdown;
use logging::{init_logger, LoggerOptions};

use api::AppState;
use terminal_output::{note_error, note_success, render_analysis, render_generation};

#[derive(Parser)]
#[command(name = "bugscope")]
#[command(about = "bugscope: find, explain and fix bugs in source code")]
#[command(version)]
struct Cli {
    /// Path to config.yaml (defaults to $BUGSCOPE_CONFIG or ~/.bugscope/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a source file or screenshot; reads stdin when no file is given
    Analyze {
        file: Option<PathBuf>,
        /// full-audit, quick-fix or security-review
        #[arg(short, long, default_value = "full-audit")]
        mode: AnalysisMode,
        /// Language label; inferred from the file extension when omitted
        #[arg(short, long)]
        language: Option<String>,
        /// Print the result as JSON
        #[arg(long, conflicts_with = "markdown")]
        json: bool,
        /// Print the result as markdown
        #[arg(long)]
        markdown: bool,
    },
    /// Generate new code from a description
    Generate {
        description: String,
        #[arg(short, long, default_value = "Python")]
        language: String,
        /// Custom, Web API, CLI Tool, Data Pipeline, ML Model, GUI Application or Microservice
        #[arg(short, long, default_value = "custom")]
        template: CodeTemplate,
        /// Feedback on a previous generation
        #[arg(short, long)]
        refine: Option<String>,
        /// Write the generated code to this directory using the suggested file name
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Start the HTTP API
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
        #[arg(long)]
        bind: Option<String>,
    },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate the config and report every problem
    Check,
    /// Print the effective config with credentials masked
    Show,
    /// Write a starter config
    Init {
        #[arg(long)]
        force: bool,
    },
}

/// Exit status for failed analyses and generations.
const EXIT_FAILED: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let explicit = cli.config.as_deref();

    match cli.command {
        Commands::Config { action } => {
            let _guard = init_logger(LoggerOptions {
                level: "warn",
                ..Default::default()
            });
            run_config(action, explicit).await
        }
        command => {
            let (path, config) = config::load(explicit).await?;
            let log_dir = config.logging.dir.as_deref().map(Path::new);
            let _guard = init_logger(LoggerOptions {
                level: &config.logging.level,
                log_dir,
                json_console: config.logging.json,
            });
            info!(config = %path.display(), "Configuration loaded");
            run_command(command, config).await
        }
    }
}

async fn run_config(action: ConfigAction, explicit: Option<&Path>) -> Result<ExitCode> {
    match action {
        ConfigAction::Check => {
            if !config::check(explicit).await? {
                return Ok(ExitCode::FAILURE);
            }
        }
        ConfigAction::Show => print!("{}", config::show(explicit).await?),
        ConfigAction::Init { force } => {
            let path = config::init(explicit, force).await?;
            note_success(&format!("Wrote {}", path.display()));
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_command(command: Commands, config: BugscopeConfig) -> Result<ExitCode> {
    let assistant = Arc::new(Assistant::from_config(&config)?);

    match command {
        Commands::Analyze {
            file,
            mode,
            language,
            json,
            markdown,
        } => {
            let result = match &file {
                Some(path) => {
                    let bytes = tokio::fs::read(path)
                        .await
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
                    assistant
                        .analyze_upload(name, bytes, language.as_deref(), mode)
                        .await
                }
                None => {
                    let mut code = String::new();
                    std::io::stdin()
                        .read_to_string(&mut code)
                        .context("Failed to read code from stdin")?;
                    assistant.analyze_text(&code, language.as_deref(), mode).await
                }
            };

            let label = language.as_deref().unwrap_or("auto");
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if markdown {
                print!("{}", render_markdown(&result, label));
            } else {
                print!("{}", render_analysis(&result, label));
            }
            return Ok(analysis_exit_code(&result));
        }
        Commands::Generate {
            description,
            language,
            template,
            refine,
            out_dir,
            json,
        } => {
            let request = GenerationRequest {
                description,
                language,
                template,
                refinement: refine,
            };
            let outcome = match assistant.generate(request).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    note_error(&e.to_string());
                    return Ok(ExitCode::from(EXIT_FAILED));
                }
            };
            if let Some(dir) = out_dir {
                let path = dir.join(&outcome.file_name);
                tokio::fs::write(&path, &outcome.generated.code)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                note_success(&format!("Wrote {}", path.display()));
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print!("{}", render_generation(&outcome));
            }
        }
        Commands::Serve { port, bind } => {
            let bind = bind.unwrap_or(config.server.bind.clone());
            let port = port.unwrap_or(config.server.port);
            run_server(assistant, &bind, port).await?;
        }
        Commands::Config { .. } => unreachable!("handled before config is loaded"),
    }

    Ok(ExitCode::SUCCESS)
}

/// Non-zero when the analysis came back as an error, so scripts can detect it.
fn analysis_exit_code(result: &AnalysisResult) -> ExitCode {
    if result.is_error() {
        ExitCode::from(EXIT_FAILED)
    } else {
        ExitCode::SUCCESS
    }
}

async fn run_server(assistant: Arc<Assistant>, bind: &str, port: u16) -> Result<()> {
    let state = Arc::new(AppState { assistant });
    let app = api::build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());
    let addr = format!("{bind}:{port}");

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %addr, "HTTP API listening");

    axum::serve(listener, app).await?;
    Ok(())
}
