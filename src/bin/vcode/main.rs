use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use video_code_rename::code_rename::{CliOptions, CodeRename, CodeRenameConfig};

#[derive(Parser)]
#[command(
    author,
    version,
    name = env!("CARGO_BIN_NAME"),
    about = "Rename video files to the product code in their name"
)]
struct Args {
    /// Optional input directory or file
    #[arg(value_hint = clap::ValueHint::AnyPath)]
    path: Option<PathBuf>,

    /// Auto-confirm without asking
    #[arg(short, long)]
    auto: bool,

    /// Print debug information
    #[arg(short = 'D', long)]
    debug: bool,

    /// Specify file extension(s)
    #[arg(short, long, num_args = 1, action = clap::ArgAction::Append, value_name = "EXTENSION")]
    extension: Vec<String>,

    /// Only print changes without renaming or deleting files
    #[arg(short, long)]
    print: bool,

    /// Move deleted files to trash instead of deleting
    #[arg(short, long)]
    trash: bool,

    /// Print shell completion script
    #[arg(short = 'l', long, name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl From<Args> for CliOptions {
    fn from(args: Args) -> Self {
        Self {
            auto: args.auto,
            debug: args.debug,
            extensions: args.extension,
            print: args.print,
            trash: args.trash,
            verbose: args.verbose,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(shell) = args.completion {
        video_code_rename::print_completion(shell, Args::command());
        return Ok(());
    }

    let path = args.path.clone();
    let config = CodeRenameConfig::from_cli(args.into())?;
    CodeRename::new(path.as_deref(), config)?.run()?;
    Ok(())
}
