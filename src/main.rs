use anyhow::{Context, Result};
use cc_status::cache::CacheStore;
use cc_status::clock::{Clock, SystemClock};
use cc_status::config::{self, Config};
use cc_status::display::{self, FormatContext, SessionInfo};
use cc_status::fetch::Orchestrator;
use cc_status::logging::{self, mask_secret};
use cc_status::multiplier;
use cc_status::paths;
use cc_status::platform::{Adapter, NormalizedRecord, UreqTransport};
use cc_status::token;
use clap::Parser;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

/// Grace period for timed-out queries still blocking a worker at exit.
const RUNTIME_SHUTDOWN: Duration = Duration::from_millis(200);

#[derive(Parser)]
#[command(name = "cc-status")]
#[command(about = "Claude Code status line with API platform balances and quotas")]
#[command(version)]
struct Cli {
    /// Write default platforms.json and status.json (existing files are kept)
    #[arg(long)]
    init_config: bool,

    /// Validate configuration and report which platforms have credentials
    #[arg(long)]
    check_config: bool,

    /// Print the cached platform entries and their ages
    #[arg(long)]
    show_cache: bool,

    /// Disable ANSI colors
    #[arg(long)]
    no_color: bool,

    /// Config directory (defaults to ~/.claude/config)
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Only query this platform (id or alias)
    #[arg(short, long)]
    platform: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = paths::log_file_path().and_then(|path| logging::init(&path)) {
        eprintln!("[cc-status] Warning: logging disabled: {:#}", e);
    }
    tracing::debug!(git_sha = env!("CC_STATUS_GIT_SHA"), "cc-status starting");

    let outcome = if cli.init_config {
        init_config(&cli)
    } else if cli.check_config {
        check_config(&cli)
    } else if cli.show_cache {
        show_cache(&cli)
    } else {
        status_line(&cli)
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "cc-status failed");
            eprintln!("cc-status: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn config_dir(cli: &Cli) -> Result<PathBuf> {
    match &cli.config_dir {
        Some(dir) => Ok(dir.clone()),
        None => paths::config_dir(),
    }
}

fn init_config(cli: &Cli) -> Result<ExitCode> {
    let dir = config_dir(cli)?;
    let created = config::init_config(&dir)?;
    if created.is_empty() {
        println!("Configuration already present in {}", dir.display());
    }
    for path in created {
        println!("Created {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}

fn check_config(cli: &Cli) -> Result<ExitCode> {
    let dir = config_dir(cli)?;
    let config = Config::load(&dir)?;
    println!("Configuration OK: {}", dir.display());
    if let Some(default) = config.platforms.default_entry() {
        println!("Default platform: {} ({})", default.id, default.label());
    }

    let mut usable = 0;
    for platform in config.platforms.enabled() {
        let Some(adapter) = Adapter::for_config(platform) else {
            println!("  {:<12} unknown platform type '{}'", platform.id, platform.adapter_key());
            continue;
        };
        match token::usable_credential(platform, adapter.credential_fields()) {
            Some(credential) => {
                usable += 1;
                println!(
                    "  {:<12} {} via {} ({})",
                    platform.id,
                    adapter.key(),
                    credential.field.as_str(),
                    mask_secret(credential.token)
                );
            }
            None => println!("  {:<12} {} missing credential", platform.id, adapter.key()),
        }
    }

    if usable == 0 {
        println!("No enabled platform has a usable credential");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn show_cache(cli: &Cli) -> Result<ExitCode> {
    let config = Config::load(&config_dir(cli)?)?;
    let path = paths::platform_cache_path()?;
    let cache: CacheStore<NormalizedRecord> =
        CacheStore::open(&path, config.status.fetch.lock_timeout());
    let now = SystemClock.now();

    println!("Cache: {}", path.display());
    for (key, entry) in cache.entries() {
        let state = if entry.is_fresh(now) { "fresh" } else { "expired" };
        let value = serde_json::to_string(&entry.value).context("Failed to encode cache entry")?;
        println!(
            "  {:<24} {:>6}s old, ttl {}s, {} {}",
            key,
            entry.age(now).as_secs(),
            entry.ttl_seconds,
            state,
            value
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn status_line(cli: &Cli) -> Result<ExitCode> {
    let session = if std::io::stdin().is_terminal() {
        SessionInfo::default()
    } else {
        SessionInfo::read_from(std::io::stdin().lock())
    };

    let config = match config_dir(cli).and_then(|dir| Config::load(&dir)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "invalid configuration, using defaults");
            Config::default()
        }
    };
    let status = &config.status;
    let zone = status.zone().unwrap_or_default();
    let clock = SystemClock;

    let platforms = config.platforms.select(cli.platform.as_deref());
    let results = if status.show_balance && !platforms.is_empty() {
        let cache = Arc::new(CacheStore::open(
            &paths::platform_cache_path()?,
            status.fetch.lock_timeout(),
        ));
        let orchestrator = Orchestrator::new(
            Arc::new(UreqTransport::new(status.fetch.query_timeout())),
            cache,
            Arc::new(clock),
            status.cache_timeout,
            status.fetch,
        );
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("Failed to start async runtime")?;
        let results = runtime.block_on(orchestrator.aggregate(&platforms));
        runtime.shutdown_timeout(RUNTIME_SHUTDOWN);
        results
    } else {
        Default::default()
    };

    let now = clock.now();
    let active = if status.multiplier_config.enabled {
        multiplier::active_in_zone(now, zone, &status.multiplier_config.periods)
    } else {
        None
    };
    let git = if status.show_git_branch {
        session.current_dir().and_then(|dir| display::git_info(&dir))
    } else {
        None
    };

    let ctx = FormatContext {
        status,
        session: &session,
        git: git.as_ref(),
        multiplier: active,
        now: display::display_time(now, zone),
        color: !cli.no_color,
    };
    let line = display::render(&ctx.segments(&platforms, &results), status.layout);

    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{}", line).context("Failed to write status line")?;
    stdout.flush().context("Failed to flush stdout")?;
    Ok(ExitCode::SUCCESS)
}
