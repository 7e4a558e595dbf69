use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use qcos_agent::codebase::{starter_files, Codebase};
use qcos_agent::library::{ProtocolLibrary, SavedProtocol};
use qcos_agent::llm::{LlmClient, TextCompletionService};
use qcos_agent::patch::Metaprogrammer;
use qcos_agent::store::{FileStore, KeyValueTextStore};
use qcos_agent::telemetry::{CoreTemps, SystemHealth, Ticker};
use qcos_core::{OutputFormat, QcosConfig};
use qcos_difflens::lcs::LineDiffer;
use qcos_difflens::render;

const CONFIG_FILE: &str = ".qcos.toml";

#[derive(Parser)]
#[command(
    name = "qcos",
    version,
    about = "QCOS metaprogramming toolkit",
    long_about = "QCOS lets an AI model rewrite files in a persisted codebase and shows every\n\
                   proposed change as a line diff before it is applied.\n\n\
                   Examples:\n  \
                     qcos diff old.tsx new.tsx                   Line diff of two files\n  \
                     qcos diff old.tsx new.tsx --unified         Unified patch with hunks\n  \
                     qcos codebase import ./src                  Load a directory into the codebase\n  \
                     qcos patch App.tsx --request 'add a title'  Ask the model for a change\n  \
                     qcos telemetry --metric health --ticks 10   Watch simulated QPU health\n  \
                     qcos doctor                                 Check setup and environment"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .qcos.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable output (default)\n  \
                         json      Machine-readable JSON\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Subcommand)]
enum Command {
    /// Show the line diff between two files
    #[command(long_about = "Show the line diff between two files.\n\n\
        Lines are compared exactly; a changed block lists its removals before\n\
        its additions. With --unified the diff is grouped into hunks with\n\
        N lines of context (default: diff.context_lines from the config).\n\n\
        Examples:\n  qcos diff a.tsx b.tsx\n  qcos diff a.tsx b.tsx --unified 1\n  qcos diff a.tsx b.tsx --format json")]
    Diff {
        /// Original file
        original: PathBuf,

        /// Modified file
        modified: PathBuf,

        /// Print a unified patch with N context lines
        #[arg(long, short = 'u', value_name = "N")]
        unified: Option<Option<usize>>,
    },
    /// Manage the persisted codebase
    Codebase {
        #[command(subcommand)]
        action: CodebaseAction,
    },
    /// Ask the model to rewrite a codebase file
    #[command(long_about = "Ask the model to rewrite a codebase file.\n\n\
        Sends the file and your request to the configured LLM provider and shows\n\
        the proposed change as a unified diff. Nothing is written unless --apply\n\
        is given.\n\n\
        Examples:\n  qcos patch App.tsx --request 'rename the header to QCOS v3.11'\n  qcos patch App.tsx -r 'add a footer' --apply")]
    Patch {
        /// Codebase path of the file to modify
        path: String,

        /// What to change, in plain language
        #[arg(long, short)]
        request: String,

        /// Write the proposed content into the codebase
        #[arg(long)]
        apply: bool,
    },
    /// Manage saved Q-Lang protocols
    Library {
        #[command(subcommand)]
        action: LibraryAction,
    },
    /// Stream simulated telemetry
    #[command(long_about = "Stream simulated telemetry.\n\n\
        Drives a drifting metric on the interval from the [telemetry] config\n\
        section and prints every state. A --seed makes the run reproducible.\n\n\
        Examples:\n  qcos telemetry\n  qcos telemetry --metric health --ticks 20 --seed 7")]
    Telemetry {
        /// Metric to simulate
        #[arg(long, value_enum, default_value = "core-temps")]
        metric: Metric,

        /// Number of updates to print
        #[arg(long, default_value = "5")]
        ticks: u64,

        /// Seed for the random source
        #[arg(long)]
        seed: Option<u64>,

        /// Override the update interval in milliseconds
        #[arg(long, value_name = "MS")]
        interval: Option<u64>,
    },
    /// Create a default .qcos.toml configuration file
    #[command(long_about = "Create a default .qcos.toml configuration file.\n\n\
        Generates a commented template with all available options.\n\
        Fails if .qcos.toml already exists.")]
    Init,
    /// Check your QCOS setup and environment
    #[command(long_about = "Check your QCOS setup and environment.\n\n\
        Reports the config file, LLM provider and API key, and the store.\n\
        Use --format json for machine-readable output.")]
    Doctor,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum CodebaseAction {
    /// List codebase files
    List,
    /// Print a file's content
    Show {
        /// Codebase path
        path: String,
    },
    /// Replace a file's content with a local file
    Set {
        /// Codebase path
        path: String,

        /// Local file to read the content from
        #[arg(long)]
        file: PathBuf,
    },
    /// Remove a file from the codebase
    Remove {
        /// Codebase path
        path: String,
    },
    /// Add every text file under a directory (honors .gitignore)
    Import {
        /// Directory to import
        dir: PathBuf,
    },
}

#[derive(Subcommand)]
enum LibraryAction {
    /// List saved protocols by category
    List,
    /// Save a protocol from a file
    Save {
        /// Protocol name, unique within its category
        #[arg(long)]
        name: String,

        /// Category to file it under
        #[arg(long)]
        category: String,

        /// File holding the Q-Lang code
        #[arg(long)]
        file: PathBuf,
    },
    /// Print a protocol's code
    Show {
        /// Protocol name
        name: String,

        /// Category it is saved under
        #[arg(long)]
        category: String,
    },
    /// Delete a protocol
    Remove {
        /// Protocol name
        name: String,

        /// Category it is saved under
        #[arg(long)]
        category: String,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Metric {
    /// Cryostat core temperatures (mK)
    CoreTemps,
    /// Qubit error rate, system load, and QKD link
    Health,
}

#[derive(Clone, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if use_color {
        println!("\x1b[1m\x1b[35m⚛\x1b[0m \x1b[1mqcos\x1b[0m v{version} · AI metaprogramming with reviewable diffs\n");

        println!("Quick start:");
        println!("  \x1b[36mqcos init\x1b[0m                      Create a .qcos.toml config file");
        println!("  \x1b[36mqcos codebase import .\x1b[0m         Load files into the codebase");
        println!("  \x1b[36mqcos patch <PATH> -r '...'\x1b[0m     Ask the model for a change\n");

        println!("All commands:");
        println!("  \x1b[32mdiff\x1b[0m       Line diff of two files");
        println!("  \x1b[32mcodebase\x1b[0m   List, show, set, remove, or import files");
        println!("  \x1b[32mpatch\x1b[0m      Propose and apply AI rewrites");
        println!("  \x1b[32mlibrary\x1b[0m    Saved Q-Lang protocols");
        println!("  \x1b[32mtelemetry\x1b[0m  Simulated core temperatures and QPU health");
        println!("  \x1b[32mdoctor\x1b[0m     Check your setup and environment");
        println!("  \x1b[32minit\x1b[0m       Create default configuration\n");
    } else {
        println!("qcos v{version} · AI metaprogramming with reviewable diffs\n");

        println!("Quick start:");
        println!("  qcos init                      Create a .qcos.toml config file");
        println!("  qcos codebase import .         Load files into the codebase");
        println!("  qcos patch <PATH> -r '...'     Ask the model for a change\n");

        println!("All commands:");
        println!("  diff       Line diff of two files");
        println!("  codebase   List, show, set, remove, or import files");
        println!("  patch      Propose and apply AI rewrites");
        println!("  library    Saved Q-Lang protocols");
        println!("  telemetry  Simulated core temperatures and QPU health");
        println!("  doctor     Check your setup and environment");
        println!("  init       Create default configuration\n");
    }

    println!("Run 'qcos <command> --help' for details.");
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::util::SubscriberInitExt;

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let _ = tracing_subscriber::fmt::Subscriber::builder()
        .with_target(false)
        .without_time()
        .with_level(true)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish()
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<QcosConfig> {
    let config = match path {
        Some(path) => QcosConfig::from_file(path)
            .wrap_err_with(|| format!("loading {}", path.display()))?,
        None => {
            let default_path = Path::new(CONFIG_FILE);
            if default_path.exists() {
                QcosConfig::from_file(default_path)?
            } else {
                QcosConfig::default()
            }
        }
    };
    Ok(config)
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err(format!("reading {}", path.display()))
}

fn open_store(config: &QcosConfig) -> Result<FileStore> {
    Ok(FileStore::open(&config.store.path)?)
}

/// Fill `llm.api_key` from the provider's environment variable when the
/// config leaves it unset.
fn resolve_api_key(config: &mut QcosConfig) -> Result<()> {
    if config.llm.api_key.is_some() {
        return Ok(());
    }
    let env_var = config.llm.api_key_env();
    match std::env::var(env_var) {
        Ok(key) if !key.trim().is_empty() => {
            config.llm.api_key = Some(key);
            Ok(())
        }
        _ => miette::bail!(miette::miette!(
            help = "Set {env_var} or add api_key in your .qcos.toml under [llm]",
            "No API key configured for LLM provider '{}'",
            config.llm.provider
        )),
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}

fn run_diff(
    config: &QcosConfig,
    original: &Path,
    modified: &Path,
    unified: Option<Option<usize>>,
    format: OutputFormat,
    use_color: bool,
) -> Result<()> {
    let old_text = read_file(original)?;
    let new_text = read_file(modified)?;
    let script = LineDiffer::with_warn_cells(config.diff.warn_cells).diff(&old_text, &new_text);

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "stats": script.stats(),
            "lines": script,
        }))?,
        OutputFormat::Markdown => {
            let title = format!("{} vs {}", original.display(), modified.display());
            print!("{}", render::render_markdown(&script, &title));
        }
        OutputFormat::Text => match unified {
            Some(context) => print!(
                "{}",
                render::render_patch(
                    &script,
                    &original.display().to_string(),
                    &modified.display().to_string(),
                    context.unwrap_or(config.diff.context_lines),
                    use_color,
                )
            ),
            None => print!("{}", render::render_lines(&script, use_color)),
        },
    }
    Ok(())
}

fn run_codebase(config: &QcosConfig, action: CodebaseAction, format: OutputFormat) -> Result<()> {
    let mut codebase = Codebase::load(open_store(config)?, starter_files())?;

    match action {
        CodebaseAction::List => {
            let files: Vec<(&str, usize)> = codebase
                .paths()
                .map(|path| (path, codebase.get(path).map_or(0, |c| c.lines().count())))
                .collect();
            match format {
                OutputFormat::Json => {
                    let entries: Vec<serde_json::Value> = files
                        .iter()
                        .map(|(path, lines)| serde_json::json!({ "path": path, "lines": lines }))
                        .collect();
                    print_json(&entries)?;
                }
                OutputFormat::Markdown => {
                    println!("| File | Lines |\n|------|-------|");
                    for (path, lines) in &files {
                        println!("| `{path}` | {lines} |");
                    }
                }
                OutputFormat::Text => {
                    for (path, lines) in &files {
                        println!("{lines:>6}  {path}");
                    }
                    println!("\n{} files", files.len());
                }
            }
        }
        CodebaseAction::Show { path } => {
            let content = codebase.get(&path).ok_or_else(|| {
                miette::miette!(
                    help = "run 'qcos codebase list' to see available files",
                    "no file '{path}' in the codebase"
                )
            })?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "path": path,
                    "content": content,
                }))?,
                _ => println!("{content}"),
            }
        }
        CodebaseAction::Set { path, file } => {
            let content = read_file(&file)?;
            codebase.write_file(&path, &content)?;
            println!("Saved {path} ({} lines)", content.lines().count());
        }
        CodebaseAction::Remove { path } => {
            if !codebase.remove_file(&path)? {
                miette::bail!("no file '{path}' in the codebase");
            }
            println!("Removed {path}");
        }
        CodebaseAction::Import { dir } => {
            let count = codebase.import_dir(&dir)?;
            println!("Imported {count} files from {}", dir.display());
        }
    }
    Ok(())
}

async fn run_patch(
    mut config: QcosConfig,
    path: &str,
    request: &str,
    apply: bool,
    format: OutputFormat,
    use_color: bool,
) -> Result<()> {
    resolve_api_key(&mut config)?;
    let mut codebase = Codebase::load(open_store(&config)?, starter_files())?;
    if !codebase.contains(path) {
        miette::bail!(miette::miette!(
            help = "run 'qcos codebase list' to see available files",
            "no file '{path}' in the codebase"
        ));
    }

    let client: Arc<dyn TextCompletionService> = Arc::new(LlmClient::new(&config.llm)?);
    let metaprogrammer = Metaprogrammer::new(client);

    let is_tty = std::io::stderr().is_terminal();
    let spinner = if is_tty {
        let pb = indicatif::ProgressBar::new_spinner();
        pb.set_style(
            indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
                .into_diagnostic()?,
        );
        pb.set_message(format!("Asking {} for a patch to {path}...", config.llm.model));
        pb.enable_steady_tick(std::time::Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let proposal = metaprogrammer
        .propose(&codebase, path, request)
        .await
        .inspect_err(|e| {
            if let Some(pb) = &spinner {
                let msg = if e.is_rate_limited() {
                    "Rate limited"
                } else {
                    "Failed"
                };
                pb.finish_with_message(msg);
            }
        })?;

    if let Some(pb) = spinner {
        pb.finish_with_message("Done");
    }

    let context = config.diff.context_lines;
    let stats = proposal.script.stats();
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "filePath": proposal.file_path,
            "stats": stats,
            "lines": proposal.script,
            "applied": apply && proposal.has_changes(),
        }))?,
        OutputFormat::Markdown => {
            print!("{}", render::render_markdown(&proposal.script, path));
        }
        OutputFormat::Text => {
            if proposal.has_changes() {
                print!(
                    "{}",
                    render::render_patch(&proposal.script, path, path, context, use_color)
                );
                println!("\n{stats}");
            } else {
                println!("No changes proposed for {path}");
            }
        }
    }

    if apply && proposal.has_changes() {
        let applied = proposal.apply(&mut codebase)?;
        eprintln!("Applied patch to {} ({})", applied.file_path, applied.stats);
    } else {
        if !apply && proposal.has_changes() {
            eprintln!("Re-run with --apply to write this change");
        }
        proposal.reject();
    }
    Ok(())
}

fn run_library(config: &QcosConfig, action: LibraryAction, format: OutputFormat) -> Result<()> {
    let mut library = ProtocolLibrary::load(open_store(config)?)?;

    match action {
        LibraryAction::List => match format {
            OutputFormat::Json => print_json(&library.iter().collect::<Vec<_>>())?,
            _ => {
                if library.is_empty() {
                    println!("No saved protocols");
                }
                for category in library.categories() {
                    println!("{category}");
                    for p in library.iter().filter(|p| p.category == category) {
                        println!(
                            "  {:<24} {}",
                            p.name,
                            p.saved_at.format("%Y-%m-%d %H:%M UTC")
                        );
                    }
                }
            }
        },
        LibraryAction::Save {
            name,
            category,
            file,
        } => {
            let code = read_file(&file)?;
            if !library.save(SavedProtocol::new(&name, &category, code))? {
                miette::bail!(miette::miette!(
                    help = "choose another name or remove the existing protocol first",
                    "a protocol named '{name}' already exists in '{category}'"
                ));
            }
            println!("Saved '{name}' to {category}");
        }
        LibraryAction::Show { name, category } => {
            let protocol = library.find(&category, &name).ok_or_else(|| {
                miette::miette!("no protocol named '{name}' in '{category}'")
            })?;
            match format {
                OutputFormat::Json => print_json(protocol)?,
                OutputFormat::Markdown => {
                    println!("### {}\n\n```qlang\n{}\n```", protocol.name, protocol.code);
                }
                OutputFormat::Text => println!("{}", protocol.code),
            }
        }
        LibraryAction::Remove { name, category } => {
            if !library.remove(&category, &name)? {
                miette::bail!("no protocol named '{name}' in '{category}'");
            }
            println!("Removed '{name}' from {category}");
        }
    }
    Ok(())
}

fn print_tick(tick: u64, state: &(impl serde::Serialize + std::fmt::Display), json: bool) {
    if json {
        match serde_json::to_string(&serde_json::json!({ "tick": tick, "state": state })) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!("failed to serialize tick {tick}: {e}"),
        }
    } else {
        println!("[{tick:>3}] {state}");
    }
}

async fn run_telemetry(
    config: &QcosConfig,
    metric: Metric,
    ticks: u64,
    seed: Option<u64>,
    interval: Option<u64>,
    format: OutputFormat,
    use_color: bool,
) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let json = format == OutputFormat::Json;

    match metric {
        Metric::CoreTemps => {
            let ticker =
                Ticker::from_millis(interval.unwrap_or(config.telemetry.core_temp_interval_ms));
            let initial = CoreTemps::with_efficiency(config.telemetry.efficiency);
            ticker
                .run(initial, &mut rng, ticks, |tick, temps| {
                    print_tick(tick, temps, json);
                    let critical = temps.critical();
                    if !json && !critical.is_empty() {
                        let warning = format!("      {} reading(s) critical", critical.len());
                        if use_color {
                            println!("\x1b[31m{warning}\x1b[0m");
                        } else {
                            println!("{warning}");
                        }
                    }
                })
                .await;
        }
        Metric::Health => {
            let ticker =
                Ticker::from_millis(interval.unwrap_or(config.telemetry.health_interval_ms));
            ticker
                .run(SystemHealth::default(), &mut rng, ticks, |tick, health| {
                    print_tick(tick, health, json);
                })
                .await;
        }
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct CheckResult {
    name: &'static str,
    status: &'static str,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl CheckResult {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "pass",
            detail: detail.into(),
            hint: None,
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            name,
            status: "fail",
            detail: detail.into(),
            hint: Some(hint.into()),
        }
    }

    fn info(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "info",
            detail: detail.into(),
            hint: None,
        }
    }

    fn symbol(&self) -> &'static str {
        match self.status {
            "pass" => "\u{2713}",
            "fail" => "\u{2717}",
            _ => "~",
        }
    }

    fn colored_symbol(&self) -> String {
        match self.status {
            "pass" => "\x1b[32m\u{2713}\x1b[0m".into(),
            "fail" => "\x1b[31m\u{2717}\x1b[0m".into(),
            _ => "\x1b[33m~\x1b[0m".into(),
        }
    }
}

fn run_doctor(
    config: &QcosConfig,
    config_path: Option<&Path>,
    format: OutputFormat,
    use_color: bool,
) -> Result<()> {
    let mut checks: Vec<CheckResult> = Vec::new();

    // 1. Config file
    let config_path = config_path.unwrap_or(Path::new(CONFIG_FILE));
    if config_path.exists() {
        checks.push(CheckResult::pass(
            "config_file",
            format!("{} found", config_path.display()),
        ));
    } else {
        checks.push(CheckResult::fail(
            "config_file",
            format!("{} not found", config_path.display()),
            "run 'qcos init' to create a default config",
        ));
    }

    // 2. LLM provider + API key
    let env_var = config.llm.api_key_env();
    checks.push(CheckResult::pass(
        "llm_provider",
        format!("{} (model: {})", config.llm.provider, config.llm.model),
    ));
    if config.llm.api_key.is_some() {
        checks.push(CheckResult::pass("llm_api_key", "set in config"));
    } else if std::env::var(env_var).is_ok() {
        checks.push(CheckResult::pass("llm_api_key", format!("{env_var} set")));
    } else {
        checks.push(CheckResult::fail(
            "llm_api_key",
            format!("{env_var} not set"),
            format!("export {env_var}=... or set api_key in .qcos.toml"),
        ));
    }

    // 3. Store
    let store_path = &config.store.path;
    if store_path.exists() {
        match FileStore::open(store_path) {
            Ok(store) => {
                let keys = store.keys().map(|k| k.len()).unwrap_or(0);
                checks.push(CheckResult::pass(
                    "store",
                    format!("{} ({keys} keys)", store_path.display()),
                ));
                match Codebase::load(store, starter_files()) {
                    Ok(codebase) => checks.push(CheckResult::info(
                        "codebase",
                        format!("{} files", codebase.len()),
                    )),
                    Err(e) => checks.push(CheckResult::info("codebase", e.to_string())),
                }
            }
            Err(e) => checks.push(CheckResult::fail(
                "store",
                e.to_string(),
                format!("fix or delete {}", store_path.display()),
            )),
        }
    } else {
        checks.push(CheckResult::info(
            "store",
            format!(
                "{} not found (created on first write)",
                store_path.display()
            ),
        ));
    }

    // Output
    match format {
        OutputFormat::Json => {
            let version = env!("CARGO_PKG_VERSION");
            print_json(&serde_json::json!({
                "version": version,
                "checks": checks,
            }))?;
        }
        _ => {
            let version = env!("CARGO_PKG_VERSION");
            println!("QCOS v{version} · Environment Check\n");

            for check in &checks {
                let sym = if use_color {
                    check.colored_symbol()
                } else {
                    check.symbol().to_string()
                };
                let label = check.name.replace('_', " ");
                println!("  {sym} {label:<14} {}", check.detail);
                if let Some(hint) = &check.hint {
                    println!("    hint: {hint}");
                }
            }

            let passed = checks.iter().filter(|c| c.status == "pass").count();
            let failed = checks.iter().filter(|c| c.status == "fail").count();
            let info = checks.iter().filter(|c| c.status == "info").count();
            println!("\n{passed} checks passed, {failed} failed, {info} info");
        }
    }

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# QCOS Configuration

[llm]
# provider = "openai"        # openai | anthropic | gemini (selects the API key env var)
# model = "gpt-4o-mini"
# api_key = "..."            # defaults to OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
# base_url = "https://api.openai.com"
# timeout_secs = 120
# max_retries = 2            # retries after HTTP 429
# retry_base_ms = 500        # backoff doubles on every retry

[store]
# path = ".qcos/store.json"

[diff]
# context_lines = 3
# warn_cells = 4000000       # log a warning above this many LCS table cells

[telemetry]
# core_temp_interval_ms = 1500
# health_interval_ms = 2000
# efficiency = 1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(format = %cli.format, store = %config.store.path.display(), "configuration loaded");

    let use_color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    };

    match cli.command {
        None => {
            print_welcome(use_color);
        }
        Some(Command::Diff {
            ref original,
            ref modified,
            unified,
        }) => {
            run_diff(&config, original, modified, unified, cli.format, use_color)?;
        }
        Some(Command::Codebase { action }) => {
            run_codebase(&config, action, cli.format)?;
        }
        Some(Command::Patch {
            ref path,
            ref request,
            apply,
        }) => {
            run_patch(config, path, request, apply, cli.format, use_color).await?;
        }
        Some(Command::Library { action }) => {
            run_library(&config, action, cli.format)?;
        }
        Some(Command::Telemetry {
            metric,
            ticks,
            seed,
            interval,
        }) => {
            run_telemetry(&config, metric, ticks, seed, interval, cli.format, use_color).await?;
        }
        Some(Command::Init) => {
            let path = Path::new(CONFIG_FILE);
            if path.exists() {
                miette::bail!(".qcos.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .qcos.toml with default configuration");
        }
        Some(Command::Doctor) => {
            run_doctor(&config, cli.config.as_deref(), cli.format, use_color)?;
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "qcos", &mut std::io::stdout());
        }
    }

    Ok(())
}
