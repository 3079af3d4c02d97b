//! CLI entry point for smart-shell
//!
//! Runs a single request (`run`), manages settings (`setup`), shows
//! history and models, or starts the interactive loop when no subcommand
//! is given.

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use colored::*;
use smart_shell::{
    config::{expand_path, ConfigManager},
    core::{detect_os_context, os_release::OS_RELEASE_PATH, OsContext},
    exec::{
        credential::{self, CredentialCache},
        ShellExecutor,
    },
    history::{HistoryStore, DEFAULT_DISPLAY_LIMIT, HISTORY_FILE},
    interrupt::InterruptFlag,
    llm::{
        explain_command,
        gemini::{normalize_model_name, GeminiClient, FALLBACK_MODELS},
        TextGenerator,
    },
    logging::{self, ERROR_TAIL_LINES},
    orchestrator::{Orchestrator, PipelineOptions, PipelineOutcome},
    plan::PlanGenerator,
    ui::{
        commands::help_text,
        render,
        terminal::{ask_confirm, ask_secret, select_from},
        classify_input, BangCommand, InputKind, LineReader, TerminalInteraction,
        TerminalPasswordPrompt, TerminalSink,
    },
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

type ShellOrchestrator = Orchestrator<GeminiClient, ShellExecutor>;

#[derive(Parser)]
#[command(name = "smart-shell")]
#[command(author, version, about = "Natural-language shell with risk checks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the config file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<String>,

    /// Directory for history and the error log
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<String>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a request into commands and run them
    Run {
        /// What you want to do, in plain language
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,

        /// Show and record the plan without executing it
        #[arg(long)]
        dry_run: bool,

        /// Model to use for this session
        #[arg(short, long)]
        model: Option<String>,

        /// Continue in interactive mode afterwards
        #[arg(short, long)]
        interactive: bool,

        /// Run medium/high-risk plans without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Configure API key, default model and sudo password
    Setup,

    /// Show recent requests
    History {
        /// Number of entries to show
        #[arg(short, long, default_value_t = DEFAULT_DISPLAY_LIMIT)]
        limit: usize,
    },

    /// List available models
    Models,

    /// Print version information
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{} {:#}", "✗".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Paths and settings shared by every subcommand
struct App {
    config: ConfigManager,
    data_dir: PathBuf,
    log_path: Option<PathBuf>,
    os: OsContext,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let data_dir = cli
        .data_dir
        .as_deref()
        .map(expand_path)
        .unwrap_or_else(ConfigManager::default_data_dir);
    let log_path = logging::init_logging(&data_dir, cli.verbose);
    let config_path = cli
        .config
        .as_deref()
        .map(expand_path)
        .unwrap_or_else(ConfigManager::default_path);

    let app = App {
        config: ConfigManager::load(config_path),
        data_dir,
        log_path,
        os: detect_os_context(Path::new(OS_RELEASE_PATH)),
    };
    info!("Starting on {} ({}, {})", app.os.name, app.os.package_manager, app.os.shell);

    match cli.command {
        None => {
            let mut orchestrator = build_orchestrator(&app, None, PipelineOptions::default())?;
            interactive_loop(app, &mut orchestrator)
        }
        Some(Commands::Run {
            prompt,
            dry_run,
            model,
            interactive,
            yes,
        }) => {
            let options = PipelineOptions {
                dry_run,
                auto_confirm: yes,
            };
            let mut orchestrator = build_orchestrator(&app, model.as_deref(), options)?;
            let prompt = prompt.join(" ");

            let mut ui = TerminalInteraction::new(app.os.package_manager);
            let outcome = orchestrator.process(&prompt, &app.os, &mut ui);

            if let (PipelineOutcome::GenerationFailed(e), false) = (&outcome, interactive) {
                return Err(anyhow!(e.clone()).context("Plan generation failed"));
            }
            report_outcome(&outcome);

            if interactive {
                return interactive_loop(app, &mut orchestrator);
            }
            Ok(())
        }
        Some(Commands::Setup) => setup(app),
        Some(Commands::History { limit }) => {
            let store = HistoryStore::open(app.data_dir.join(HISTORY_FILE));
            print_history(&store, limit);
            Ok(())
        }
        Some(Commands::Models) => {
            let client = client_for(&app, None)?;
            print_models(&client);
            Ok(())
        }
        Some(Commands::Version) => {
            println!("smart-shell {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn client_for(app: &App, model: Option<&str>) -> anyhow::Result<GeminiClient> {
    let api_key = app.config.api_key().ok_or_else(|| {
        anyhow!("No API key configured. Run `smart-shell setup` or set SMART_SHELL_API_KEY")
    })?;
    let model = model.unwrap_or(&app.config.config().default_model);
    GeminiClient::new(api_key, model).context("Could not create model client")
}

fn build_orchestrator(
    app: &App,
    model: Option<&str>,
    options: PipelineOptions,
) -> anyhow::Result<ShellOrchestrator> {
    let client = client_for(app, model)?;

    let stored_password = app.config.config().sudo_password().unwrap_or_else(|e| {
        warn!("{}", e);
        None
    });
    let credentials = CredentialCache::new(stored_password, Box::new(TerminalPasswordPrompt));
    let executor = ShellExecutor::new(app.os.shell, credentials, Box::new(TerminalSink));
    let history = HistoryStore::open(app.data_dir.join(HISTORY_FILE));

    let interrupt = InterruptFlag::new();
    if let Err(e) = interrupt.install_handler() {
        warn!("Ctrl-C handler not installed: {}", e);
    }
    let generator = PlanGenerator::new(client).with_interrupt(interrupt);

    Ok(Orchestrator::new(generator, executor, history).with_options(options))
}

fn report_outcome(outcome: &PipelineOutcome) {
    match outcome {
        PipelineOutcome::EmptyPlan => {
            println!("{} No commands were generated for this request.", "⚠".yellow());
        }
        PipelineOutcome::Declined { reason } => {
            println!("{} The model declined: {}", "⚠".yellow(), reason);
        }
        PipelineOutcome::GenerationFailed(e) => {
            println!("{} {}", "✗".red().bold(), e);
        }
        PipelineOutcome::Interrupted => {
            println!("{} Interrupted. Request abandoned.", "→".cyan());
        }
        PipelineOutcome::Blocked { command, verdict } => {
            println!(
                "{} Blocked '{}': {}. Nothing was executed.",
                "✗".red().bold(),
                command,
                verdict.reason
            );
        }
        PipelineOutcome::Cancelled { .. } => {
            println!("{} Cancelled. Nothing was executed.", "→".cyan());
        }
        PipelineOutcome::DryRun { .. } => {
            println!("{} Dry run: plan saved to history, nothing executed.", "→".cyan());
        }
        PipelineOutcome::Executed { success: true, .. } => {
            println!("{} {}", "✓".green().bold(), "All commands completed".bold());
        }
        PipelineOutcome::Executed { success: false, .. } => {
            println!("{} Plan stopped after a failed command.", "✗".red().bold());
        }
    }
}

fn interactive_loop(mut app: App, orchestrator: &mut ShellOrchestrator) -> anyhow::Result<()> {
    println!(
        "{} smart-shell {} · {} · {} · {}",
        "→".cyan(),
        env!("CARGO_PKG_VERSION"),
        orchestrator.generator().backend().model().green(),
        app.os.name,
        app.os.shell
    );
    println!("Type a request, {} for commands, or {} to leave.\n", "!help".cyan(), "exit".cyan());

    let mut reader = LineReader::new();
    let mut ui = TerminalInteraction::new(app.os.package_manager);

    loop {
        let line = match reader.read_line("smart-shell") {
            Ok(line) => line,
            Err(e) => {
                info!("Input closed: {}", e);
                break;
            }
        };

        match classify_input(&line) {
            InputKind::Empty => continue,
            InputKind::Exit => break,
            InputKind::SubcommandHint(sub) => {
                println!(
                    "You are already inside smart-shell. Type your request directly, \
                     or leave and run `smart-shell {}`.",
                    sub
                );
            }
            InputKind::Bang(command) => handle_bang(command, &mut app, orchestrator, &mut ui),
            InputKind::Prompt(prompt) => {
                let outcome = orchestrator.process(&prompt, &app.os, &mut ui);
                report_outcome(&outcome);
            }
        }
    }

    println!("Bye!");
    Ok(())
}

fn handle_bang(
    command: BangCommand,
    app: &mut App,
    orchestrator: &mut ShellOrchestrator,
    ui: &mut TerminalInteraction,
) {
    match command {
        BangCommand::Help => println!("{}", help_text()),
        BangCommand::History => print_history(orchestrator.history(), DEFAULT_DISPLAY_LIMIT),
        BangCommand::Last => match orchestrator.history().last() {
            Some(entry) => print!("{}", render::format_history_entry(entry)),
            None => println!("No history yet."),
        },
        BangCommand::Redo => {
            let Some(entry) = orchestrator.history().last() else {
                println!("No history yet.");
                return;
            };
            let (prompt, plan) = (entry.prompt.clone(), entry.plan());
            println!("{} Re-running: {}", "→".cyan(), prompt);
            let outcome = orchestrator.run_plan(&prompt, plan, ui);
            report_outcome(&outcome);
        }
        BangCommand::Clear => print!("\x1B[2J\x1B[1;1H"),
        BangCommand::Model(name) => {
            let name = match name {
                Some(name) => normalize_model_name(&name),
                None => {
                    let models = available_models(orchestrator.generator().backend());
                    let current = orchestrator.generator().backend().model().to_string();
                    match select_from("Model", &models, Some(&current)) {
                        Some(index) => models[index].clone(),
                        None => return,
                    }
                }
            };
            switch_model(app, orchestrator, &name);
        }
        BangCommand::Models => print_models(orchestrator.generator().backend()),
        BangCommand::ForgetSudo => {
            orchestrator.runner_mut().credentials_mut().forget_session();
            println!("{} Session sudo password forgotten.", "✓".green());
        }
        BangCommand::Errors => print_errors(app.log_path.as_deref()),
        BangCommand::Explain(command) => {
            let verdict = orchestrator.classifier().classify(&command);
            println!("{} {}", render::risk_badge(verdict.status), verdict.reason);
            match explain_command(orchestrator.generator().backend(), &command) {
                Ok(text) => println!("{}", text),
                Err(e) => println!("{} {}", "✗".red().bold(), e),
            }
        }
        BangCommand::Unknown(name) => {
            println!("Unknown command '!{}'. Type {} for the list.", name, "!help".cyan());
        }
    }
}

fn switch_model(app: &mut App, orchestrator: &mut ShellOrchestrator, name: &str) {
    orchestrator.generator_mut().backend_mut().set_model(name);
    app.config.config_mut().default_model = name.to_string();
    if let Err(e) = app.config.save() {
        warn!("Could not save model choice: {}", e);
    }
    println!("{} Using model {}", "✓".green(), name.green());
}

fn available_models(client: &GeminiClient) -> Vec<String> {
    client.list_models().unwrap_or_else(|e| {
        warn!("Could not list models: {}", e);
        FALLBACK_MODELS.iter().map(|m| m.to_string()).collect()
    })
}

fn print_models(client: &GeminiClient) {
    let current = client.model();
    for model in available_models(client) {
        if model == current {
            println!("{} {}", "*".green(), model.green().bold());
        } else {
            println!("  {}", model);
        }
    }
}

fn print_history(store: &HistoryStore, limit: usize) {
    if store.is_empty() {
        println!("No history yet.");
        return;
    }
    for entry in store.recent(limit) {
        print!("{}", render::format_history_entry(entry));
    }
}

fn print_errors(log_path: Option<&Path>) {
    let Some(path) = log_path else {
        println!("Logging to a file is unavailable in this session.");
        return;
    };
    match logging::tail_log(path, ERROR_TAIL_LINES) {
        Ok(lines) if lines.is_empty() => println!("The error log is empty."),
        Ok(lines) => lines.iter().for_each(|line| println!("{}", line)),
        Err(e) => println!("Could not read {}: {}", path.display(), e),
    }
}

fn setup(mut app: App) -> anyhow::Result<()> {
    println!("{} Configuring {}\n", "→".cyan(), app.config.path().display());

    let key = ask_secret("Gemini API key (leave empty to keep the current one)")
        .context("Failed to read API key")?;
    if !key.trim().is_empty() {
        app.config.config_mut().api_key = Some(key.trim().to_string());
    }

    match client_for(&app, None) {
        Ok(client) => {
            let models = available_models(&client);
            let current = app.config.config().default_model.clone();
            if let Some(index) = select_from("Default model", &models, Some(&current)) {
                app.config.config_mut().default_model = models[index].clone();
            }
        }
        Err(e) => println!("{} {:#}", "⚠".yellow(), e),
    }

    if ask_confirm(
        "Store your sudo password? It is saved base64-encoded, not encrypted",
        false,
    ) {
        let password = ask_secret("sudo password").context("Failed to read password")?;
        match credential::validate_sudo_password(&password) {
            Ok(true) => {
                app.config.config_mut().set_sudo_password(Some(&password));
                println!("{} Password verified", "✓".green());
            }
            Ok(false) => println!("{} sudo rejected that password; not stored", "✗".red()),
            Err(e) => println!("{} Could not verify password: {}", "✗".red(), e),
        }
    } else if app.config.config().sudo_password_b64.is_some()
        && ask_confirm("Remove the stored sudo password?", false)
    {
        app.config.config_mut().set_sudo_password(None);
    }

    app.config.save().context("Failed to save configuration")?;
    println!("{} Saved {}", "✓".green(), app.config.path().display());
    Ok(())
}
