#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use cstack_core::ErrorCode;
use cstack_core::config::{EffectiveConfig, resolve_config};
use output::{CliError, CodedError, OutputMode, render_error};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "cstack: file-based working memory for coding agents",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Workspace root containing `.cstack/` (default: current directory).
    #[arg(short = 'C', long, global = true, value_name = "PATH")]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Create .cstack/ and seed missing files",
        long_about = "Create the .cstack/ directory and write any missing stack file from its template. Existing files are left untouched.",
        after_help = "EXAMPLES:\n    # Initialize the current directory\n    cstack init\n\n    # Initialize another workspace\n    cstack -C ../service init --json"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "State",
        about = "Show the current task, focus and next steps",
        after_help = "EXAMPLES:\n    # Show CURRENT.md\n    cstack current\n\n    # Emit machine-readable output\n    cstack current --json"
    )]
    Current(cmd::current::CurrentArgs),

    #[command(
        next_help_heading = "State",
        about = "Update CURRENT.md",
        long_about = "Read CURRENT.md, apply the given changes and write it back. Fields not mentioned are kept.",
        after_help = "EXAMPLES:\n    # Record what you are doing\n    cstack checkpoint --task \"Implement auth\" --focus \"JWT middleware\"\n\n    # Replace the next steps\n    cstack checkpoint --clear-steps --step \"Write tests\" --step \"Update docs\""
    )]
    Checkpoint(cmd::current::CheckpointArgs),

    #[command(
        next_help_heading = "State",
        about = "Show or edit the task plan",
        after_help = "EXAMPLES:\n    # Numbered task list\n    cstack plan\n\n    # Add a task\n    cstack plan add \"Write parser\"\n\n    # Start task #1\n    cstack plan mark 1 in_progress"
    )]
    Plan(cmd::plan::PlanArgs),

    #[command(
        next_help_heading = "Messages",
        about = "Append a message to INBOX.md or OUTBOX.md",
        after_help = "EXAMPLES:\n    # Report a milestone\n    cstack send outbox --from agent-1 --type milestone \"Parser done\"\n\n    # Address a reply in a thread\n    cstack send inbox --from manager --type directive --to agent-1 --thread t-7 \"Ship it\""
    )]
    Send(cmd::send::SendArgs),

    #[command(
        next_help_heading = "Messages",
        about = "List messages in a mailbox",
        after_help = "EXAMPLES:\n    # Read the inbox\n    cstack read inbox\n\n    # Emit machine-readable output\n    cstack read outbox --json"
    )]
    Read(cmd::read::ReadArgs),

    #[command(
        next_help_heading = "Messages",
        about = "Truncate a mailbox",
        after_help = "EXAMPLES:\n    # Empty the inbox after processing\n    cstack clear inbox"
    )]
    Clear(cmd::clear::ClearArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    cstack completions bash\n\n    # Generate zsh completions\n    cstack completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

/// Per-invocation context handed to every command.
pub struct Ctx {
    pub workspace: PathBuf,
    pub output: OutputMode,
    pub quiet: bool,
    pub config: EffectiveConfig,
}

fn log_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env("CSTACK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "cstack=debug,cstack_core=debug,info"
        } else {
            "cstack=info,warn"
        })
    })
}

fn init_tracing(verbose: bool) {
    let format = env::var("CSTACK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(log_filter(verbose));

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli) -> (OutputMode, anyhow::Result<()>) {
    let fallback = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let workspace = match cli.workspace.clone() {
        Some(path) => path,
        None => match env::current_dir() {
            Ok(dir) => dir,
            Err(e) => return (fallback, Err(e.into())),
        },
    };

    let config = match resolve_config(&workspace, cli.json) {
        Ok(config) => config,
        Err(e) => {
            let coded = CodedError::new(ErrorCode::ConfigParseError, format!("{e:#}"));
            return (fallback, Err(coded.into()));
        }
    };

    let ctx = Ctx {
        output: OutputMode::from_name(&config.resolved_output),
        workspace,
        quiet: cli.quiet,
        config,
    };
    debug!(workspace = %ctx.workspace.display(), output = ?ctx.output, "resolved context");

    let result = match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, &ctx),
        Commands::Current(args) => cmd::current::run_current(args, &ctx),
        Commands::Checkpoint(args) => cmd::current::run_checkpoint(args, &ctx),
        Commands::Plan(args) => cmd::plan::run_plan(args, &ctx),
        Commands::Send(args) => cmd::send::run_send(args, &ctx),
        Commands::Read(args) => cmd::read::run_read(args, &ctx),
        Commands::Clear(args) => cmd::clear::run_clear(args, &ctx),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    };
    (ctx.output, result)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (output, result) = run(&cli);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = render_error(output, &CliError::from(&err));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_parses_before_subcommand() {
        let cli = Cli::parse_from(["cstack", "--json", "current"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Current(_)));
    }

    #[test]
    fn json_flag_after_subcommand() {
        let cli = Cli::parse_from(["cstack", "read", "inbox", "--json"]);
        assert!(cli.json);
    }

    #[test]
    fn workspace_flag_parsed() {
        let cli = Cli::parse_from(["cstack", "-C", "/tmp/ws", "init"]);
        assert_eq!(cli.workspace, Some(PathBuf::from("/tmp/ws")));
        assert!(matches!(cli.command, Commands::Init(_)));
    }

    #[test]
    fn quiet_and_verbose_flags_parsed() {
        let cli = Cli::parse_from(["cstack", "-q", "-v", "current"]);
        assert!(cli.quiet);
        assert!(cli.verbose);
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["cstack", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Commands::Completions(cmd::completions::CompletionsArgs {
                shell: clap_complete::Shell::Bash,
            })
        ));
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["cstack", "init"],
            vec!["cstack", "current"],
            vec!["cstack", "checkpoint", "--task", "t"],
            vec!["cstack", "plan"],
            vec!["cstack", "plan", "add", "x"],
            vec!["cstack", "plan", "mark", "1", "completed"],
            vec!["cstack", "send", "outbox", "--from", "a", "--type", "b", "c"],
            vec!["cstack", "read", "inbox"],
            vec!["cstack", "clear", "outbox"],
            vec!["cstack", "completions", "zsh"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(result.is_ok(), "failed to parse {args:?}: {:?}", result.err());
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
