mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use remerge_core::{ConflictStyle, RevSpec};

#[derive(Parser)]
#[command(
    name = "git-remerge",
    version,
    about = "Restore the three-way conflict for a rename the merge failed to detect"
)]
struct Cli {
    /// Run as if started in this directory
    #[arg(short = 'C', global = true, default_value = ".")]
    dir: PathBuf,

    /// More logging; repeat for debug output. RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Stage BASE/OURS/THEIRS as the unmerged versions of PATH and check it out with conflict markers
    ///
    /// Each version is a revision spec: `:N:path` (index stage N), `rev:path`,
    /// a bare `path` (read from HEAD), or an empty string / `/dev/null` for no content.
    Apply {
        /// Rename destination to record the conflict at
        path: String,
        /// Common ancestor version (stage 1)
        base: RevSpec,
        /// Current-branch version (stage 2)
        ours: RevSpec,
        /// Incoming-branch version (stage 3)
        theirs: RevSpec,
        /// Print the index-info record instead of writing it
        #[arg(long)]
        dry_run: bool,
        /// Update the index but leave the working tree alone
        #[arg(long)]
        no_checkout: bool,
        /// Conflict marker style; defaults to merge.conflictStyle
        #[arg(long, value_enum)]
        conflict: Option<StyleArg>,
        /// Clear the leftover delete/modify conflict at this source path (repeatable)
        #[arg(long = "drop", value_name = "PATH")]
        drop: Vec<String>,
        /// Fail unless a merge, rebase, cherry-pick or revert is in progress
        #[arg(long)]
        require_merge: bool,
    },
    /// List unmerged paths and what each stage holds
    Status {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StyleArg {
    Merge,
    Diff3,
}

impl From<StyleArg> for ConflictStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Merge => ConflictStyle::Merge,
            StyleArg::Diff3 => ConflictStyle::Diff3,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// Usage errors share exit code 1 with every other failure; help and
/// version output still exit 0.
fn usage_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() { 1 } else { 0 }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(usage_exit_code(&err));
        }
    };
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let repo = git2::Repository::discover(&cli.dir)
        .with_context(|| format!("no git repository found at {}", cli.dir.display()))?;
    log::debug!("using repository at {}", repo.path().display());

    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Apply {
            path,
            base,
            ours,
            theirs,
            dry_run,
            no_checkout,
            conflict,
            drop,
            require_merge,
        } => commands::apply(
            &repo,
            commands::ApplyArgs {
                path,
                base,
                ours,
                theirs,
                dry_run,
                no_checkout,
                conflict: conflict.map(ConflictStyle::from),
                drop,
                require_merge,
            },
            &mut stdout,
        ),
        Command::Status { json } => commands::status(&repo, json, &mut stdout),
    }
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    type Result<T = ()> = std::result::Result<T, Box<dyn std::error::Error>>;

    #[test]
    fn empty_argument_is_the_empty_blob() -> Result {
        let cli = Cli::try_parse_from([
            "git-remerge",
            "apply",
            "new.txt",
            "",
            ":2:new.txt",
            ":3:old.txt",
        ])?;
        match cli.command {
            Command::Apply { base, ours, .. } => {
                assert_eq!(base, RevSpec::EmptyBlob);
                assert_eq!(ours, RevSpec::parse(":2:new.txt")?);
            }
            Command::Status { .. } => panic!("parsed as status"),
        }
        Ok(())
    }

    #[test]
    fn bad_spec_exits_with_one() {
        let err = Cli::try_parse_from(["git-remerge", "apply", "new.txt", ":9:a", "b", "c"])
            .err()
            .expect("stage 9 must be rejected");
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(err.to_string().contains(":9:a"), "{err}");
        assert_eq!(usage_exit_code(&err), 1);
    }

    #[test]
    fn missing_argument_exits_with_one() {
        let err = Cli::try_parse_from(["git-remerge", "apply", "new.txt"])
            .err()
            .expect("missing specs must be rejected");
        assert_eq!(usage_exit_code(&err), 1);
    }

    #[test]
    fn help_exits_with_zero() {
        let err = Cli::try_parse_from(["git-remerge", "--help"])
            .err()
            .expect("help short-circuits parsing");
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(usage_exit_code(&err), 0);
    }
}
