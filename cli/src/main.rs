use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use cmdscribe_assist::{
    CommandLlmClient, Config, LlmClient, OutputChannel, build_command_context, emit_output,
    fetch_token_descriptions,
};
use cmdscribe_cache::DescriptionCache;
use cmdscribe_core::{ParsedCommand, ShellName, identify_shell};
use cmdscribe_manpage::{ManPageStore, SystemManSource};

mod scripts;

#[derive(Debug, Parser)]
#[command(name = "cmdscribe")]
#[command(about = "AI-assisted shell command annotation and suggestion")]
#[command(version)]
struct Cli {
    /// Path to a config YAML file (default: ~/.config/cmdscribe/config.yaml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the shell integration script (e.g. "bash").
    Init(InitArgs),
    /// Tokenize, classify, and describe a command line.
    Build(LineWordsArgs),
    /// Tokenize and classify a command line, printing JSON.
    Tokens(LineWordsArgs),
    /// Suggest a completion for the current readline buffer.
    Suggest(LineArgs),
    /// Explain a command line in one sentence.
    Explain(LineArgs),
    /// Generate a command from a natural-language prompt.
    Generate(LineWordsArgs),
    /// Print the assembled man-page context for a command line.
    Context(LineArgs),
    /// Description cache maintenance.
    Cache(CacheArgs),
    /// Print the resolved configuration and related environment values.
    ConfigDebug,
}

#[derive(Debug, Args)]
struct InitArgs {
    /// Shell to emit the integration script for (bash, zsh, sh).
    shell: String,
}

#[derive(Debug, Args)]
struct LineArgs {
    /// The command line to operate on.
    line: String,
    /// Write the result to the clipboard instead of stdout.
    #[arg(long)]
    clipboard: bool,
}

#[derive(Debug, Args)]
struct LineWordsArgs {
    /// Input words; joined with spaces when given as separate arguments.
    input: Vec<String>,
}

#[derive(Debug, Args)]
struct CacheArgs {
    #[command(subcommand)]
    operation: CacheOperation,
}

#[derive(Debug, Subcommand)]
enum CacheOperation {
    /// Delete every cached token description.
    Clear,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => run_init(args),
        Command::Build(args) => run_build(args, &config),
        Command::Tokens(args) => run_tokens(args),
        Command::Suggest(args) => run_suggest(args, &config),
        Command::Explain(args) => run_explain(args, &config),
        Command::Generate(args) => run_generate(args, &config),
        Command::Context(args) => run_context(args, &config),
        Command::Cache(args) => run_cache(args, &config),
        Command::ConfigDebug => run_config_debug(&config),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("CMDSCRIBE_LOG")
                .unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config, String> {
    match path {
        // An explicitly requested config that fails to load is fatal.
        Some(path) => Config::load_from(path).map_err(|err| err.to_string()),
        // A broken default config degrades to defaults with a warning.
        None => Ok(Config::load().unwrap_or_else(|err| {
            eprintln!("warning: failed to load config, using defaults: {err}");
            Config::default()
        })),
    }
}

fn active_shell() -> ShellName {
    identify_shell().unwrap_or(ShellName::Bash)
}

fn open_cache(config: &Config) -> Option<DescriptionCache> {
    let path = config
        .cache_path
        .clone()
        .unwrap_or_else(DescriptionCache::default_path);
    match DescriptionCache::open(&path) {
        Ok(cache) => Some(cache),
        Err(err) => {
            eprintln!("warning: cache unavailable at {}: {err}", path.display());
            None
        }
    }
}

fn require_llm(config: &Config) -> Result<CommandLlmClient, String> {
    CommandLlmClient::from_config(&config.llm).ok_or_else(|| {
        "no llm command configured; set llm.command in the config file".to_string()
    })
}

fn run_init(args: InitArgs) -> Result<(), String> {
    let shell: ShellName = args
        .shell
        .parse()
        .map_err(|()| format!("unsupported shell '{}' (expected bash, zsh, or sh)", args.shell))?;
    print!("{}", scripts::integration_script(shell));
    Ok(())
}

fn run_build(args: LineWordsArgs, config: &Config) -> Result<(), String> {
    let line = args.input.join(" ");
    let parsed = ParsedCommand::from_line(&line);
    let store = ManPageStore::new(SystemManSource);
    let cache = open_cache(config);
    let llm = CommandLlmClient::from_config(&config.llm);

    let (descriptions, _diagnostics) = fetch_token_descriptions(
        &parsed,
        &store,
        cache.as_ref(),
        llm.as_ref().map(|client| client as &dyn LlmClient),
        active_shell(),
        config,
    );

    let tokens = cmdscribe_core::classify_tokens(&parsed.tokens);
    for (index, token) in tokens.iter().enumerate() {
        let description = descriptions
            .get(index)
            .map(String::as_str)
            .unwrap_or(cmdscribe_assist::NO_DESCRIPTION);
        println!("{}\t{}\t{}", token.token_type, token.value, description);
    }
    Ok(())
}

fn run_tokens(args: LineWordsArgs) -> Result<(), String> {
    let line = args.input.join(" ");
    let parsed = ParsedCommand::from_line(&line);
    let tokens = cmdscribe_core::classify_tokens(&parsed.tokens);
    let json = serde_json::to_string_pretty(&tokens).map_err(|err| err.to_string())?;
    println!("{json}");
    Ok(())
}

fn run_suggest(args: LineArgs, config: &Config) -> Result<(), String> {
    let llm = require_llm(config)?;
    let store = ManPageStore::new(SystemManSource);
    let suggestion =
        cmdscribe_assist::suggest(&args.line, &store, &llm, active_shell(), config)
            .map_err(|err| err.to_string())?;
    // The shell integration captures stdout into the edit buffer, so
    // the suggestion is written raw, without a trailing newline.
    let channel = if args.clipboard {
        OutputChannel::Clipboard
    } else {
        OutputChannel::Readline
    };
    emit_output(channel, &suggestion, config);
    Ok(())
}

fn run_explain(args: LineArgs, config: &Config) -> Result<(), String> {
    let llm = require_llm(config)?;
    let store = ManPageStore::new(SystemManSource);
    let explanation =
        cmdscribe_assist::explain(&args.line, &store, &llm, active_shell(), config)
            .map_err(|err| err.to_string())?;
    let channel = if args.clipboard {
        OutputChannel::Clipboard
    } else {
        OutputChannel::Stdout
    };
    emit_output(channel, &explanation, config);
    Ok(())
}

fn run_generate(args: LineWordsArgs, config: &Config) -> Result<(), String> {
    let prompt = args.input.join(" ");
    if prompt.trim().is_empty() {
        return Err("empty prompt".to_string());
    }
    let llm = require_llm(config)?;
    let command =
        cmdscribe_assist::generate(&prompt, &llm, active_shell(), config)
            .map_err(|err| err.to_string())?;
    emit_output(OutputChannel::Stdout, &command, config);
    Ok(())
}

fn run_context(args: LineArgs, config: &Config) -> Result<(), String> {
    let store = ManPageStore::new(SystemManSource);
    let context = build_command_context(&args.line, &store, &config.context_options());
    if context.context.is_empty() {
        eprintln!("no man page context available");
    } else {
        println!("{}", context.context);
    }
    Ok(())
}

fn run_cache(args: CacheArgs, config: &Config) -> Result<(), String> {
    match args.operation {
        CacheOperation::Clear => {
            let cache = open_cache(config).ok_or_else(|| "cache unavailable".to_string())?;
            cache.clear().map_err(|err| err.to_string())?;
            println!("cache cleared");
            Ok(())
        }
    }
}

fn run_config_debug(config: &Config) -> Result<(), String> {
    let yaml = serde_yaml::to_string(config).map_err(|err| err.to_string())?;
    print!("{yaml}");
    println!("shell: {}", active_shell());
    println!(
        "cache_path: {}",
        config
            .cache_path
            .clone()
            .unwrap_or_else(DescriptionCache::default_path)
            .display()
    );
    println!("config_path: {}", Config::default_path().display());
    Ok(())
}
