use anyhow::Result;
use std::io::Write;
use std::process::ExitCode;
use tabfile::cli::{parse_args, Cli};
use tabfile::commands::{self, CommandContext};
use tabfile::config::load_config;
use tabfile::FileUtil;

/// Map `-v` count to a default log filter; `RUST_LOG` still wins.
fn default_log_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn init_logging(verbosity: u8) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_log_filter(verbosity)),
    )
    .format_timestamp(None)
    .init();
}

fn main() -> Result<ExitCode> {
    let Cli {
        verbosity,
        quiet,
        config,
        command,
    } = parse_args();
    init_logging(verbosity);

    let config = load_config(config.as_deref());
    let util = FileUtil::new().with_log_every(config.progress.log_every);
    let ctx = CommandContext { config, quiet };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let status = commands::run(command, &util, &ctx, &mut out)?;
    out.flush()?;
    Ok(status.into())
}
