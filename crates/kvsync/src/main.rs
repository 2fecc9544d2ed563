use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kvsync::config::{BackendKind, Config};
use kvsync::{Datastore, Fallback, Write};
use kvsync_core::kv::{decode_value, AsyncKvClient, KvClient, RemoteDestination};
use kvsync_core::store::{AsyncDestination, SyncedStore};

#[cfg(any(feature = "toml", feature = "yaml"))]
use kvsync::file::{FileDestination, Format};

/// kvsync - A key-value datastore mirrored to TOML, YAML or Redis
#[derive(Parser, Debug)]
#[command(name = "kvsync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Backend to use [env: KVSYNC_BACKEND]
    #[arg(long, short, value_enum)]
    backend: Option<BackendKind>,

    /// Directory holding the datastore file [env: KVSYNC_STORAGE_DIR]
    #[arg(long)]
    dir: Option<String>,

    /// Datastore file name [env: KVSYNC_FILENAME]
    #[arg(long)]
    file: Option<String>,

    /// Redis connection URL [env: REDIS_URL]
    #[arg(long)]
    redis_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the value stored at a key
    Get {
        key: String,

        /// Value printed when the key is absent (JSON)
        #[arg(long)]
        default: Option<String>,

        /// Serve the cached value if the backend read fails
        #[arg(long)]
        cached_fallback: bool,
    },
    /// Store a value; input that is not valid JSON is stored as a string
    Set {
        key: String,
        value: String,

        /// Only update the in-memory copy
        #[arg(long)]
        no_write: bool,
    },
    /// Print the whole datastore as JSON
    Dump,
    /// Merge a JSON object into the datastore
    Import { json: String },
    /// Check the Redis connection
    Ping,
    /// Restrict permissions on the datastore file
    Harden {
        /// File mode in octal
        #[arg(long, value_parser = parse_octal, default_value = "700")]
        mode: u32,
    },
}

impl Cli {
    fn into_config(self) -> Result<(Config, Command)> {
        let mut config = Config::from_env().context("Failed to load configuration")?;
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(dir) = self.dir {
            config.storage_dir = dir;
        }
        if let Some(file) = self.file {
            config.filename = file;
        }
        if let Some(url) = self.redis_url {
            config.redis_url = url;
        }
        config.validate()?;
        Ok((config, self.command))
    }
}

fn parse_octal(raw: &str) -> std::result::Result<u32, String> {
    let digits = raw.trim_start_matches("0o");
    u32::from_str_radix(digits, 8).map_err(|err| format!("invalid octal mode '{raw}': {err}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    let (config, command) = cli.into_config()?;
    tracing::debug!(backend = %config.backend, "Loaded configuration");

    match config.backend {
        BackendKind::Toml => run_toml(&config, command).await,
        BackendKind::Yaml => run_yaml(&config, command).await,
        BackendKind::Redis => run_redis(&config, command).await,
    }
}

/// Logs go to stderr so stdout only carries command output.
fn init_tracing() -> Result<()> {
    let json = kvsync_core::env::get_bool("KVSYNC_LOG_JSON", false)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kvsync=info,kvsync_core=info".into()),
        )
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
    Ok(())
}

#[cfg(feature = "toml")]
async fn run_toml(config: &Config, command: Command) -> Result<()> {
    let datastore = kvsync::factory::create_toml_datastore(
        config.config_version,
        &config.storage_dir,
        &config.filename,
        config.write_on_update,
    );
    run_file(datastore, command).await
}

#[cfg(not(feature = "toml"))]
async fn run_toml(_config: &Config, _command: Command) -> Result<()> {
    bail!("the toml backend is not enabled in this build")
}

#[cfg(feature = "yaml")]
async fn run_yaml(config: &Config, command: Command) -> Result<()> {
    let datastore = kvsync::factory::create_yaml_datastore(
        config.config_version,
        &config.storage_dir,
        &config.filename,
        config.write_on_update,
    );
    run_file(datastore, command).await
}

#[cfg(not(feature = "yaml"))]
async fn run_yaml(_config: &Config, _command: Command) -> Result<()> {
    bail!("the yaml backend is not enabled in this build")
}

#[cfg(any(feature = "toml", feature = "yaml"))]
async fn run_file<F: Format>(
    mut datastore: Datastore<SyncedStore<FileDestination<F>>>,
    command: Command,
) -> Result<()> {
    if let Command::Harden { mode } = command {
        let destination = datastore.backend().destination();
        destination.ensure_file()?;
        destination.set_permissions(mode, None)?;
        tracing::info!(
            path = %destination.path().display(),
            mode = %format!("{mode:o}"),
            "Hardened datastore file"
        );
        return Ok(());
    }

    // File destinations only serve reads from the cache
    datastore.backend_mut().read_data_async().await?;
    execute(&mut datastore, command).await
}

#[cfg(feature = "redis")]
async fn run_redis(config: &Config, command: Command) -> Result<()> {
    let mut datastore = kvsync::factory::create_redis_datastore(
        config.config_version,
        &config.redis_url,
        config.batch_size,
        config.write_on_update,
    )
    .await?;
    run_remote(&mut datastore, command).await
}

/// Runs `command` and always closes both connections afterwards.
#[cfg(any(feature = "redis", test))]
async fn run_remote<C: KvClient, A: AsyncKvClient>(
    datastore: &mut Datastore<SyncedStore<RemoteDestination<C, A>>>,
    command: Command,
) -> Result<()> {
    let result = match command {
        Command::Ping => ping(datastore.backend_mut().destination_mut()).await,
        command => execute(datastore, command).await,
    };

    let destination = datastore.backend_mut().destination_mut();
    destination.disconnect()?;
    destination.disconnect_async().await?;
    result
}

#[cfg(any(feature = "redis", test))]
async fn ping<C: KvClient, A: AsyncKvClient>(
    destination: &mut RemoteDestination<C, A>,
) -> Result<()> {
    let pong = destination.ping_async().await?;
    println!("{pong}");
    Ok(())
}

#[cfg(not(feature = "redis"))]
async fn run_redis(_config: &Config, _command: Command) -> Result<()> {
    bail!("the redis backend is not enabled in this build")
}

async fn execute<D: AsyncDestination>(
    datastore: &mut Datastore<SyncedStore<D>>,
    command: Command,
) -> Result<()> {
    match command {
        Command::Get {
            key,
            default,
            cached_fallback,
        } => {
            let fallback = if cached_fallback {
                Fallback::Cached
            } else {
                Fallback::Propagate
            };
            let value = match datastore.get_async(&key, fallback).await? {
                Some(value) => value,
                None => match default {
                    Some(raw) => decode_value(raw),
                    None => bail!("key '{key}' not found"),
                },
            };
            print_json(&value)
        }
        Command::Set {
            key,
            value,
            no_write,
        } => {
            let write = if no_write { Write::Never } else { Write::Default };
            datastore.set_async(&key, decode_value(value), write).await?;
            Ok(())
        }
        Command::Dump => {
            let data = datastore.backend_mut().read_data_async().await?;
            print_json(&Value::Object(data))
        }
        Command::Import { json } => {
            let Value::Object(overrides) =
                serde_json::from_str::<Value>(&json).context("Import expects a JSON object")?
            else {
                bail!("Import expects a JSON object");
            };
            let count = overrides.len();
            datastore.update_data_async(overrides).await?;
            tracing::info!(keys = count, "Imported data");
            Ok(())
        }
        Command::Ping => bail!("ping requires the redis backend"),
        Command::Harden { .. } => bail!("harden requires a file backend"),
    }
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
