use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ugit::areas::repository::Repository;
use ugit::artifacts::core::with_pager;
use ugit::artifacts::objects::object_type::ObjectType;
use ugit::commands::porcelain::log::LogOptions;
use ugit::errors::StorageError;

const LOG_ENV: &str = "UGIT_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Parser)]
#[command(
    name = "ugit",
    version = "0.1.0",
    about = "A tiny content-addressed version control system",
    long_about = "ugit stores snapshots of a directory as blobs, trees and commits \
    in a .ugit directory, and supports branching, diffing and three-way merges. \
    Set UGIT_LOG (e.g. UGIT_LOG=debug) to see what the storage engine is doing.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command creates the .ugit directory in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
    },
    #[command(
        name = "hash-object",
        about = "Store a file as a blob and print its oid"
    )]
    HashObject {
        #[arg(index = 1)]
        file: PathBuf,
    },
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "This command prints the raw content of a stored object. \
        The object can be given as an oid or any name that resolves to one."
    )]
    CatFile {
        #[arg(index = 1, help = "The object to print")]
        object: String,
        #[arg(
            short = 't',
            long = "type",
            value_parser = parse_object_type,
            help = "Fail unless the object has this type"
        )]
        expected: Option<ObjectType>,
    },
    #[command(name = "write-tree", about = "Store the index as a tree and print its oid")]
    WriteTree,
    #[command(name = "read-tree", about = "Load a tree into the index")]
    ReadTree {
        #[arg(index = 1)]
        tree: String,
        #[arg(long, help = "Also rewrite the working directory")]
        checkout: bool,
    },
    #[command(name = "add", about = "Stage files and directories")]
    Add {
        #[arg(index = 1, required = true, num_args = 1..)]
        paths: Vec<PathBuf>,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command records the index as a new commit on top of HEAD. \
        During a merge, the merged commit becomes the second parent."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(name = "log", about = "Show commit history")]
    Log {
        #[arg(index = 1, default_value = "@")]
        start: String,
        #[arg(long, help = "One line per commit")]
        oneline: bool,
    },
    #[command(name = "show", about = "Show a commit and its changes")]
    Show {
        #[arg(index = 1, default_value = "@")]
        commit: String,
    },
    #[command(
        name = "checkout",
        about = "Switch to a branch or commit",
        long_about = "This command rewrites the working directory to match the given commit. \
        A branch name keeps HEAD attached to the branch; anything else detaches it."
    )]
    Checkout {
        #[arg(index = 1)]
        commit: String,
    },
    #[command(name = "branch", about = "List branches or create one")]
    Branch {
        #[arg(index = 1)]
        name: Option<String>,
        #[arg(index = 2, default_value = "@")]
        start: String,
    },
    #[command(name = "tag", about = "Name a commit")]
    Tag {
        #[arg(index = 1)]
        name: String,
        #[arg(index = 2, default_value = "@")]
        commit: String,
    },
    #[command(name = "reset", about = "Move HEAD without touching the working tree")]
    Reset {
        #[arg(index = 1)]
        commit: String,
    },
    #[command(name = "status", about = "Show staged and unstaged changes")]
    Status,
    #[command(
        name = "diff",
        about = "Show changes as a patch",
        long_about = "Without arguments, compares the index with the working tree. \
        With --cached, compares a commit (HEAD by default) with the index."
    )]
    Diff {
        #[arg(index = 1)]
        commit: Option<String>,
        #[arg(long)]
        cached: bool,
    },
    #[command(name = "merge", about = "Merge a commit into HEAD")]
    Merge {
        #[arg(index = 1)]
        commit: String,
    },
    #[command(name = "merge-base", about = "Print the common ancestor of two commits")]
    MergeBase {
        #[arg(index = 1)]
        first: String,
        #[arg(index = 2)]
        second: String,
    },
    #[command(name = "fetch", about = "Copy branches from another local repository")]
    Fetch {
        #[arg(index = 1)]
        remote: PathBuf,
    },
    #[command(name = "push", about = "Send a branch to another local repository")]
    Push {
        #[arg(index = 1)]
        remote: PathBuf,
        #[arg(index = 2)]
        branch: String,
    },
}

fn parse_object_type(value: &str) -> Result<ObjectType, StorageError> {
    ObjectType::try_from(value)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open(pwd: &Path) -> Result<Repository> {
    Repository::open(pwd, Box::new(std::io::stdout()))
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let pwd = std::env::current_dir()?;

    match &cli.command {
        Commands::Init { path } => {
            let path = path.as_deref().unwrap_or(&pwd);
            Repository::new(path, Box::new(std::io::stdout()))?.init()?;
        }
        Commands::HashObject { file } => {
            open(&pwd)?.hash_object(file)?;
        }
        Commands::CatFile { object, expected } => open(&pwd)?.cat_file(object, *expected)?,
        Commands::WriteTree => {
            open(&pwd)?.write_tree()?;
        }
        Commands::ReadTree { tree, checkout } => {
            let repository = open(&pwd)?;
            let tree = repository.resolve_name(tree)?;
            repository.read_tree(&tree, *checkout)?
        }
        Commands::Add { paths } => open(&pwd)?.add(paths.as_slice())?,
        Commands::Commit { message } => {
            open(&pwd)?.commit(message)?;
        }
        Commands::Log { start, oneline } => with_pager(|writer| {
            Repository::open(&pwd, writer)?.log(start, LogOptions { oneline: *oneline })
        })?,
        Commands::Show { commit } => {
            with_pager(|writer| Repository::open(&pwd, writer)?.show(commit))?
        }
        Commands::Checkout { commit } => open(&pwd)?.checkout(commit)?,
        Commands::Branch { name, start } => open(&pwd)?.branch(name.as_deref(), start)?,
        Commands::Tag { name, commit } => open(&pwd)?.tag(name, commit)?,
        Commands::Reset { commit } => open(&pwd)?.reset(commit)?,
        Commands::Status => open(&pwd)?.status()?,
        Commands::Diff { commit, cached } => open(&pwd)?.diff(commit.as_deref(), *cached)?,
        Commands::Merge { commit } => {
            open(&pwd)?.merge(commit)?;
        }
        Commands::MergeBase { first, second } => {
            open(&pwd)?.show_merge_base(first, second)?;
        }
        Commands::Fetch { remote } => open(&pwd)?.fetch(remote)?,
        Commands::Push { remote, branch } => open(&pwd)?.push(remote, branch)?,
    }

    Ok(())
}
