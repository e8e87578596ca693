use clap::{ArgAction, Parser, Subcommand};
use cinevault_core::parse_rating;
use cinevault_models::UserRating;
use commands::{auth, cache, config, lists, movies};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "cinevault")]
#[command(about = "CineVault - Keep track of the movies you've watched and want to watch")]
#[command(version)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write logs to this file (rotated daily) instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the account on this device and sign in
    #[command(long_about = "Create the single local account and sign in. Registering again replaces the existing account. The password is prompted for and must be at least 6 characters.")]
    Register {
        /// Email address (prompted for if omitted)
        #[arg(long)]
        email: Option<String>,
    },
    /// Sign in with the account on this device
    Login {
        /// Email address (prompted for if omitted)
        #[arg(long)]
        email: Option<String>,
    },
    /// Sign out
    Logout,
    /// Show who is signed in
    Whoami,
    /// List currently popular movies
    #[command(long_about = "List currently popular movies. Results are cached for the configured TTL (one hour by default); when the catalog rate-limits requests, the last cached list is shown even if stale.")]
    Popular {
        /// Show at most this many movies
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },
    /// Search the catalog by title
    Search {
        /// Title or part of a title
        query: String,
    },
    /// Show full details for one movie
    Details {
        /// Catalog id, e.g. tt0111161
        id: String,
    },
    /// Manage the movies you've watched
    Watched {
        #[command(subcommand)]
        cmd: WatchedCommands,
    },
    /// Manage the movies you want to watch
    Want {
        #[command(subcommand)]
        cmd: WantCommands,
    },
    /// Manage your favorite movies
    Favorites {
        #[command(subcommand)]
        cmd: FavoritesCommands,
    },
    /// Manage cached catalog data
    Cache {
        #[command(subcommand)]
        cmd: CacheCommands,
    },
    /// View or change configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum WatchedCommands {
    /// List watched movies with your ratings
    List,
    /// Mark a movie as watched
    Add {
        id: String,
        /// Your rating from 0 to 10, e.g. 7.5 or 7,5
        #[arg(short, long, value_parser = parse_rating_arg, allow_hyphen_values = true)]
        rating: UserRating,
    },
    /// Remove a movie from the watched list
    Remove { id: String },
    /// Change your rating of a watched movie
    Rate {
        id: String,
        /// Your rating from 0 to 10
        #[arg(value_parser = parse_rating_arg, allow_hyphen_values = true)]
        rating: UserRating,
    },
}

#[derive(Subcommand)]
pub enum WantCommands {
    /// List movies you want to watch
    List,
    /// Add a movie to the want-to-watch list
    Add { id: String },
    /// Remove a movie from the want-to-watch list
    Remove { id: String },
    /// Move a movie to the watched list with a rating
    #[command(long_about = "Remove a movie from the want-to-watch list and add it to the watched list with your rating. The two lists are saved separately; if the second save fails the movie is only kept as watched until the command exits.")]
    Move {
        id: String,
        /// Your rating from 0 to 10
        #[arg(short, long, value_parser = parse_rating_arg, allow_hyphen_values = true)]
        rating: UserRating,
    },
}

#[derive(Subcommand)]
pub enum FavoritesCommands {
    /// List favorite movies
    List,
    /// Add a movie to favorites
    Add { id: String },
    /// Remove a movie from favorites
    Remove { id: String },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Drop the cached popular movies list
    Clear,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the current configuration (the API key is masked)
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Save the RapidAPI key used for the imdb8 catalog
    #[command(long_about = "Save the RapidAPI key used for the imdb8 catalog to secrets.toml. The CINEVAULT_API_KEY environment variable takes precedence when set.")]
    SetApiKey {
        /// The key (prompted for, hidden, if omitted)
        #[arg(long)]
        key: Option<String>,
    },
    /// Write a config file with default settings
    Init {
        /// Overwrite an existing file without asking
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

fn parse_rating_arg(input: &str) -> Result<UserRating, String> {
    parse_rating(input).map_err(|e| e.to_string())
}

async fn run(command: Commands, output: &output::Output) -> color_eyre::Result<()> {
    match command {
        Commands::Register { email } => auth::run_register(email, output).await,
        Commands::Login { email } => auth::run_login(email, output).await,
        Commands::Logout => auth::run_logout(output).await,
        Commands::Whoami => auth::run_whoami(output).await,
        Commands::Popular { limit } => movies::run_popular(limit, output).await,
        Commands::Search { query } => movies::run_search(query, output).await,
        Commands::Details { id } => movies::run_details(id, output).await,
        Commands::Watched { cmd } => lists::run_watched(cmd, output).await,
        Commands::Want { cmd } => lists::run_want(cmd, output).await,
        Commands::Favorites { cmd } => lists::run_favorites(cmd, output).await,
        Commands::Cache { cmd: CacheCommands::Clear } => cache::run_clear(output).await,
        Commands::Config { cmd } => config::run_config(cmd, output).await,
    }
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    if let Err(e) = run(cli.command, &output).await {
        tracing::debug!(error = ?e, "Command failed");
        output.error(format!("{}", e));
        std::process::exit(1);
    }
    Ok(())
}
