use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::domain::{configured_target, Theme};
use shelf_core::{preference::DEFAULT_PREFERENCE_KEY, Catalog};
use storage::{Storage, StoredPreference};
use tracing_subscriber::EnvFilter;

mod compress;

use compress::{compress_file, CompressOptions, DEFAULT_MAX_DIMENSION, DEFAULT_QUALITY};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, env = "APP__DATABASE_URL", default_value = "sqlite://./data/shelf.db")]
    database_url: String,
    #[arg(long, env = "APP__PREFERENCE_KEY", default_value = DEFAULT_PREFERENCE_KEY)]
    preference_key: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Inspect or change the persisted theme preference.
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
    /// Validate a tool catalog and list its cards.
    Catalog { path: PathBuf },
    /// Downscale an image and re-encode it as JPEG.
    Compress {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, default_value_t = DEFAULT_QUALITY)]
        quality: f32,
        #[arg(long, default_value_t = DEFAULT_MAX_DIMENSION)]
        max_width: u32,
        #[arg(long, default_value_t = DEFAULT_MAX_DIMENSION)]
        max_height: u32,
    },
}

#[derive(Subcommand, Debug)]
enum ThemeAction {
    Show,
    Set { theme: String },
    /// Forget the stored choice so the page follows the OS again.
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
    let cli = Cli::parse();

    match cli.command {
        Command::Theme { action } => {
            let storage = Storage::new(&cli.database_url).await?;
            let key = cli.preference_key.as_str();
            match action {
                ThemeAction::Show => {
                    let record = storage.preference_record(key).await?;
                    println!("{}", describe_preference(key, record.as_ref()));
                }
                ThemeAction::Set { theme } => {
                    let theme: Theme = theme.parse()?;
                    storage.set_preference(key, theme.as_str()).await?;
                    println!("{key}: {theme}");
                }
                ThemeAction::Reset => {
                    if storage.clear_preference(key).await? {
                        println!("{key}: cleared");
                    } else {
                        println!("{key}: already unset");
                    }
                }
            }
        }
        Command::Catalog { path } => {
            let catalog = Catalog::load(&path)
                .with_context(|| format!("failed to load catalog {}", path.display()))?;
            for (index, tool) in catalog.tools.iter().enumerate() {
                let target = configured_target(tool.href.as_deref()).unwrap_or("(not implemented)");
                println!("{index:>3}  {:<28} {target}", tool.name);
            }
            println!("{} tools", catalog.len());
        }
        Command::Compress {
            input,
            output,
            quality,
            max_width,
            max_height,
        } => {
            let options = CompressOptions {
                quality,
                max_width,
                max_height,
            };
            let ok = compress_file(
                Some(input.as_path()),
                &output,
                &options,
                |result| {
                    println!(
                        "Image compressed successfully! {}x{} -> {}x{}, {} bytes written to {}",
                        result.original_width,
                        result.original_height,
                        result.width,
                        result.height,
                        result.bytes.len(),
                        output.display()
                    )
                },
                |err| match err {
                    compress::CompressionError::MissingInput => eprintln!("{err}"),
                    _ => eprintln!("Error: {err}"),
                },
            );
            if !ok {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn describe_preference(key: &str, record: Option<&StoredPreference>) -> String {
    let Some(record) = record else {
        return format!("{key}: unset (follows OS)");
    };
    match record.value.parse::<Theme>() {
        Ok(theme) => format!(
            "{key}: {theme} (since {})",
            record.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        Err(_) => format!("{key}: unset (ignoring stored value '{}')", record.value),
    }
}
