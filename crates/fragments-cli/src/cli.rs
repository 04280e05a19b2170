use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "fragments",
    about = "Fragments: a multi-tenant store for small typed content",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Check whether a Content-Type is accepted
    CheckType(CheckTypeArgs),
    /// Show the conversion matrix
    Formats(FormatsArgs),
    /// Print the password hash to put in the users list
    HashPassword(HashPasswordArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long, env = "FRAGMENTS_BIND")]
    pub bind: Option<SocketAddr>,
    /// Public base URL for Location headers
    #[arg(long, env = "API_URL")]
    pub api_url: Option<String>,
    /// Store fragments on disk under this directory
    #[arg(long, env = "FRAGMENTS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CheckTypeArgs {
    pub content_type: String,
}

#[derive(Args)]
pub struct FormatsArgs {
    /// Only show the row for this type
    pub content_type: Option<String>,
}

#[derive(Args)]
pub struct HashPasswordArgs {
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "fragments",
            "serve",
            "--bind",
            "127.0.0.1:9000",
            "--data-dir",
            "/tmp/frags",
        ])
        .unwrap();
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.bind.unwrap().port(), 9000);
                assert_eq!(args.data_dir.unwrap(), PathBuf::from("/tmp/frags"));
                assert!(args.config.is_none());
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn parse_formats_json() {
        let cli = Cli::try_parse_from(["fragments", "formats", "text/markdown", "--format", "json"])
            .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Command::Formats(FormatsArgs { content_type: Some(_) })));
    }
}
