use anyhow::Context;
use colored::Colorize;
use serde_json::json;

use fragments_server::{hash_password, FragmentsServer, ServerConfig};
use fragments_store::StorageConfig;
use fragments_types::{ContentType, Extension, MediaType};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::CheckType(args) => cmd_check_type(args, cli.format),
        Command::Formats(args) => cmd_formats(args, cli.format),
        Command::HashPassword(args) => {
            println!("{}", hash_password(&args.password)?);
            Ok(())
        }
    }
}

/// File values first, then flags and their environment fallbacks.
fn resolve_config(args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(api_url) = &args.api_url {
        config.api_url = api_url.clone();
    }
    if let Some(dir) = &args.data_dir {
        config.storage = StorageConfig::filesystem(dir);
    }
    tracing::debug!(
        bind = %config.bind_addr,
        api_url = %config.api_url,
        storage = config.storage.kind(),
        users = config.auth.users.len(),
        "resolved server configuration"
    );
    Ok(config)
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args)?;
    println!(
        "{} fragments server on {} ({} storage)",
        "▶".green().bold(),
        config.bind_addr.to_string().bold(),
        config.storage.kind().cyan()
    );
    let server = FragmentsServer::new(config).await?;
    server.serve().await?;
    Ok(())
}

fn cmd_check_type(args: CheckTypeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let parsed = ContentType::parse(&args.content_type);
    match format {
        OutputFormat::Json => {
            let value = match &parsed {
                Ok(ct) => json!({ "supported": true, "type": ct.essence() }),
                Err(e) => json!({ "supported": false, "reason": e.to_string() }),
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => match &parsed {
            Ok(ct) => println!("{} {} (base type {})", "✓".green().bold(), args.content_type, ct.essence().cyan()),
            Err(e) => println!("{} {}", "✗".red().bold(), e),
        },
    }
    if parsed.is_err() {
        anyhow::bail!("unsupported content type: {}", args.content_type);
    }
    Ok(())
}

fn cmd_formats(args: FormatsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let rows: Vec<MediaType> = match &args.content_type {
        Some(value) => vec![ContentType::parse(value)?.media_type()],
        None => MediaType::ALL.to_vec(),
    };
    match format {
        OutputFormat::Json => {
            let value: serde_json::Map<String, serde_json::Value> = rows
                .iter()
                .map(|m| {
                    let exts: Vec<&str> = m.conversions().iter().map(Extension::as_str).collect();
                    (m.as_str().to_string(), json!(exts))
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            for m in rows {
                let exts: Vec<&str> = m.conversions().iter().map(Extension::as_str).collect();
                println!("{:<18} {}", m.as_str().bold(), exts.join(" ").yellow());
            }
        }
    }
    Ok(())
}
