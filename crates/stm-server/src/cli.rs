use clap::{Parser, Subcommand};

/// Top-level CLI parser for the `stm` binary.
#[derive(Debug, Parser)]
#[command(name = "stm", version, about = "Simple task manager API server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Debug logging (overridden by STM_LOG)
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Port to listen on (overrides server.port)
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Database file path (overrides database.path)
    #[arg(long, global = true)]
    pub db: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the HTTP API (default)
    Serve,

    /// Print a signed token for local testing
    Token {
        /// User name carried by the token
        #[arg(short, long)]
        user: String,

        /// Account ID at the login provider (defaults to the user name)
        #[arg(long)]
        uid: Option<String>,
    },

    /// Load the reference projects and tasks into the database
    Seed,
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::try_parse_from(["stm", "--port", "9000", "-d"]).expect("cli should parse");
        assert!(cli.command.is_none());
        assert_eq!(cli.port, Some(9000));
        assert!(cli.debug);
    }

    #[test]
    fn token_requires_user() {
        assert!(Cli::try_parse_from(["stm", "token"]).is_err());
        let cli = Cli::try_parse_from(["stm", "token", "--user", "Peter", "--db", "x.db"])
            .expect("cli should parse");
        assert_eq!(cli.db.as_deref(), Some("x.db"));
        assert!(matches!(
            cli.command,
            Some(Commands::Token { ref user, uid: None }) if user == "Peter"
        ));
    }
}
