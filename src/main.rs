use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info, LevelFilter};

use expert_qa::config::Settings;
use expert_qa::form::{QaForm, QUESTION_LABEL};
use expert_qa::generator::AnswerGenerator;
use expert_qa::persona::PromptRegistry;
use expert_qa::terminal::TerminalSurface;
use expert_qa::utils::llm::OpenAIChat;

#[derive(Parser)]
#[command(name = "expert-qa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Chat model to ask
    #[arg(long, global = true)]
    model: Option<String>,

    /// JSON file with custom personas
    #[arg(long, global = true)]
    personas: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question. Reads the question from stdin when none is given.
    Ask {
        /// Persona number (1-based) or name; defaults to the first persona
        #[arg(short, long)]
        persona: Option<String>,

        question: Vec<String>,
    },

    /// List the personas
    Personas {
        /// Print the personas as JSON
        #[arg(long)]
        json: bool,
    },
}

fn setup_logging(verbose: bool) {
    let default_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();
}

fn read_question(words: Vec<String>) -> Result<String> {
    if !words.is_empty() {
        return Ok(words.join(" "));
    }
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        eprintln!("{} (Ctrl-D で送信)", QUESTION_LABEL);
    }
    let mut question = String::new();
    stdin.read_to_string(&mut question).context("Failed to read the question from stdin")?;
    Ok(question)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match dotenvy::dotenv() {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => return Err(e).context("Failed to load .env"),
    }

    let registry = match &cli.personas {
        Some(path) => PromptRegistry::from_json_file(path)
            .with_context(|| format!("Failed to load personas from {}", path.display()))?,
        None => PromptRegistry::builtin(),
    };
    if registry.is_empty() {
        bail!("No personas to choose from");
    }
    let registry = Arc::new(registry);

    match cli.command {
        Commands::Personas { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(registry.personas())?);
            } else {
                for (idx, persona) in registry.personas().iter().enumerate() {
                    println!("{}. {}\n   {}", idx + 1, persona.name, persona.instruction);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Ask { persona, question } => {
            let mut settings = Settings::from_env().context("Invalid configuration")?;
            if let Some(model) = cli.model {
                settings = settings.with_model(model);
            }
            let client = OpenAIChat::from_settings(&settings);
            let generator = AnswerGenerator::new(registry.clone(), settings.api_key.clone(), client)
                .with_model(settings.model.as_str());
            debug!("model = {}, credential configured = {}", generator.model(), settings.has_credential());
            let form = QaForm::new(generator);

            let mut surface = TerminalSurface::new();
            surface.print_header(&registry);
            let first = registry.names().next().unwrap_or_default();
            let persona_name = form.select_persona(persona.as_deref().unwrap_or(first));
            eprintln!("> {}\n", persona_name);

            let question = read_question(question)?;
            let outcome = form.submit(&mut surface, persona_name, &question).await;
            Ok(if outcome.is_answered() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
    }
}
