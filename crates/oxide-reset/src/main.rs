//! reset-tokens CLI
//!
//! Maintenance commands for the password reset table. `clean-up` is the
//! entry point for scheduled (cron) cleanup.

use chrono::Duration;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_reset::tokens::{self, ResetTokens};
use oxide_table::ddl::{Dialect, MySqlDialect, SqliteDialect};
use oxide_table::SqliteStore;

/// Password reset token maintenance.
#[derive(Parser)]
#[command(name = "reset-tokens")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (SQLite path or connection string).
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:db.sqlite3")]
    database: String,

    /// Prefix prepended to table names.
    #[arg(short, long, env = "TABLE_PREFIX", default_value = "")]
    prefix: String,

    /// Minutes a reset entry stays valid.
    #[arg(
        long,
        env = "RESET_VALIDITY_MINUTES",
        default_value_t = tokens::DEFAULT_VALIDITY_MINUTES
    )]
    validity_minutes: i64,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the reset table if it does not exist.
    Sync,

    /// Issue a reset token for a user.
    Issue {
        /// User identifier (login or email).
        #[arg(short, long)]
        user: String,
    },

    /// Show the valid entry for a token.
    Lookup {
        /// Token to look up.
        #[arg(short, long)]
        token: String,
    },

    /// Remove expired entries.
    CleanUp,

    /// Print the CREATE statements without touching the database.
    Sql {
        /// Target dialect.
        #[arg(long, value_enum, default_value_t = SqlDialect::Sqlite)]
        dialect: SqlDialect,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SqlDialect {
    Sqlite,
    Mysql,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Sql { dialect } => print_create_statements(&cli.prefix, dialect)?,

        Commands::Sync => {
            let tokens = open(&cli.database, &cli.prefix, cli.validity_minutes).await?;
            info!(table = %tokens.table().table_name(), "Reset table is ready.");
        }

        Commands::Issue { ref user } => {
            let tokens = open(&cli.database, &cli.prefix, cli.validity_minutes).await?;
            let request = tokens.issue(user).await?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }

        Commands::Lookup { ref token } => {
            let tokens = open(&cli.database, &cli.prefix, cli.validity_minutes).await?;
            match tokens.get(token).await? {
                Some(entry) => println!("{}", serde_json::to_string_pretty(&entry)?),
                None => info!("No valid reset entry for this token."),
            }
        }

        Commands::CleanUp => {
            let tokens = open(&cli.database, &cli.prefix, cli.validity_minutes).await?;
            let removed = tokens.clean_up().await?;
            println!("Removed {removed} expired entries.");
        }
    }

    Ok(())
}

/// Connects and opens the reset table, creating it if needed.
async fn open(
    database: &str,
    prefix: &str,
    validity_minutes: i64,
) -> anyhow::Result<ResetTokens<SqliteStore>> {
    let store = SqliteStore::connect(database).await?.with_prefix(prefix);
    Ok(ResetTokens::new(store)
        .await?
        .with_validity(Duration::minutes(validity_minutes)))
}

fn print_create_statements(prefix: &str, dialect: SqlDialect) -> anyhow::Result<()> {
    let schema = tokens::schema()?;
    let table = format!("{prefix}{}", tokens::TABLE_NAME);
    let statements = match dialect {
        SqlDialect::Sqlite => SqliteDialect::new().create_table(&table, &schema)?,
        SqlDialect::Mysql => MySqlDialect::new().create_table(&table, &schema)?,
    };
    for statement in statements {
        println!("{statement};");
    }
    Ok(())
}
