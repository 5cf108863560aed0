use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod display;
mod utils;

#[derive(Parser)]
#[command(name = "concord-cmd")]
#[command(about = "Build and query line-proximity text indexes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LocatorArg {
    MetaIndex,
    PerfectHash,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum MergeArg {
    Heap,
    Linear,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the documents listed in a corpus manifest
    Build {
        /// JSON manifest listing `{ "code", "path" }` for every document
        #[arg(short, long)]
        manifest: String,

        /// JSON file with index builder parameters
        #[arg(long)]
        params: Option<String>,

        /// Memory budget in bytes (overrides the parameter file)
        #[arg(long)]
        budget: Option<usize>,

        /// Disable parallel sorting and merging
        #[arg(long)]
        sequential: bool,

        /// Output index file
        index_path: String,
    },

    /// Print the posting record of one or more keys
    Lookup {
        /// Key location strategy
        #[arg(long, value_enum, default_value = "meta-index")]
        locator: LocatorArg,

        /// Index file
        index_path: String,

        /// Keys to look up
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Find places where several words occur close together
    Search {
        /// JSON manifest of the indexed corpus, used to quote hits
        #[arg(short, long)]
        manifest: String,

        /// Maximum line distance (exclusive) between two words of a hit
        #[arg(short, long, default_value_t = 1)]
        window: u64,

        /// Hits shown per page
        #[arg(long, default_value_t = 5)]
        hits: usize,

        /// Key location strategy
        #[arg(long, value_enum, default_value = "meta-index")]
        locator: LocatorArg,

        /// Merge strategy
        #[arg(long, value_enum, default_value = "heap")]
        merge: MergeArg,

        /// Keep reading stdin for further pages
        #[arg(short, long)]
        interactive: bool,

        /// Index file
        index_path: String,

        /// Search words
        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Build a perfect hash over the index keys and report its statistics
    HashStats {
        /// Target average outer bucket size
        #[arg(long, default_value_t = 5.0)]
        lam: f64,

        /// Load of the final table
        #[arg(long, default_value_t = 0.8)]
        load: f64,

        /// Index file
        index_path: String,
    },
}

fn main() -> Result<()> {
    let env = env_logger::Env::default().filter_or("RUST_LOG", "info");
    env_logger::Builder::from_env(env).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            manifest,
            params,
            budget,
            sequential,
            index_path,
        } => commands::build::run(manifest, params, budget, sequential, index_path),
        Commands::Lookup {
            locator,
            index_path,
            keys,
        } => commands::lookup::run(locator, index_path, keys),
        Commands::Search {
            manifest,
            window,
            hits,
            locator,
            merge,
            interactive,
            index_path,
            words,
        } => commands::search::run(commands::search::SearchArgs {
            manifest,
            window,
            hits,
            locator,
            merge,
            interactive,
            index_path,
            words,
        }),
        Commands::HashStats {
            lam,
            load,
            index_path,
        } => commands::hash_stats::run(lam, load, index_path),
    }
}
