use clap::{Parser, Subcommand};
use formsmith::config::{AppConfig, ConfigOverrides};
use formsmith::error::{AppError, StoreError};
use formsmith::generation::{GenerationClient, GenerationRunner, HttpTransport};
use formsmith::logging::init_tracing;
use formsmith::runtime::{Runtime, Session};
use formsmith::templates::{FileBlobStore, TemplateId, TemplateStore};
use formsmith::terminal::Terminal;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "formsmith")]
#[command(version)]
#[command(about = "Generate fillable forms from a plain-language description", long_about = None)]
struct Cli {
    /// Settings file (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Where templates and logs are kept
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Chat completions endpoint
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Model name sent with each request
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive form builder (default)
    Fill,
    /// Generate a field list and print it
    Generate {
        prompt: String,
        /// Also store the result as a template
        #[arg(long)]
        save: bool,
    },
    /// Manage saved templates
    Templates {
        #[command(subcommand)]
        action: TemplateCommands,
    },
}

#[derive(Subcommand)]
enum TemplateCommands {
    /// List saved templates
    List,
    /// Print a template's field list
    Show { id: TemplateId },
    /// Delete a template
    Delete { id: TemplateId },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply(ConfigOverrides {
        data_dir: cli.data_dir,
        endpoint: cli.endpoint,
        model: cli.model,
    });

    match cli.command.unwrap_or(Commands::Fill) {
        Commands::Fill => fill(&config),
        Commands::Generate { prompt, save } => {
            init_tracing(None);
            generate(&config, &prompt, save)
        }
        Commands::Templates { action } => {
            init_tracing(None);
            templates(&config, action)
        }
    }
}

fn open_store(config: &AppConfig) -> Result<TemplateStore<FileBlobStore>, StoreError> {
    Ok(TemplateStore::open(FileBlobStore::new(config.templates_dir())?))
}

fn client(config: &AppConfig) -> GenerationClient<HttpTransport> {
    GenerationClient::new(config.transport(), config.generation_settings())
}

fn fill(config: &AppConfig) -> Result<(), AppError> {
    init_tracing(Some(&config.log_path()));
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting session");

    let session = Session::new(GenerationRunner::new(client(config)), open_store(config)?);
    let mut runtime = Runtime::new(session, Terminal::new()?);
    runtime.run()?;
    Ok(())
}

fn generate(config: &AppConfig, prompt: &str, save: bool) -> Result<(), AppError> {
    let generated = client(config).generate(prompt)?;
    println!("{}", generated.pretty_raw());

    if save {
        let mut store = open_store(config)?;
        let template = store.save(prompt, generated.fields)?;
        println!(
            "Saved template {} (version {})",
            template.id, template.version
        );
    }
    Ok(())
}

fn templates(config: &AppConfig, action: TemplateCommands) -> Result<(), AppError> {
    let mut store = open_store(config)?;
    match action {
        TemplateCommands::List => {
            if store.is_empty() {
                println!("No saved templates");
            }
            for template in store.templates() {
                println!(
                    "{:<16} v{:<3} {}  {}",
                    template.id,
                    template.version,
                    template.date_created.format("%Y-%m-%d"),
                    template.short_prompt(60)
                );
            }
        }
        TemplateCommands::Show { id } => {
            let fields = store.load(id)?;
            let pretty = serde_json::to_string_pretty(&fields).map_err(StoreError::Encode)?;
            println!("{pretty}");
        }
        TemplateCommands::Delete { id } => {
            store.delete(id)?;
            println!("Deleted template {id}");
        }
    }
    Ok(())
}
