//! Command handlers for the `tabfile` binary.
//!
//! Handlers write their output to the supplied writer and report the exit
//! status to use. The one fail-fast case, `mkdir-or-die` on an existing
//! directory, is decided here rather than inside the library.

use crate::cli::Commands;
use crate::config::TabfileConfig;
use crate::errors::FileUtilError;
use crate::file_util::FileUtil;
use crate::io::FileSystem;
use crate::progress::{counter_callback, ProgressConfig};
use crate::tsv::MapListOptions;
use crate::watch::WatchOutcome;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

/// Exit status for `mkdir-or-die` when the directory already exists.
pub const EXIT_DIR_EXISTS: u8 = 255;

/// How a command finished, before conversion to a process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    /// A queried path was absent (`exists`).
    Missing,
    /// `mkdir-or-die` found its directory already present.
    DirectoryExists,
}

impl From<CommandStatus> for ExitCode {
    fn from(status: CommandStatus) -> Self {
        match status {
            CommandStatus::Success => ExitCode::SUCCESS,
            CommandStatus::Missing => ExitCode::FAILURE,
            CommandStatus::DirectoryExists => ExitCode::from(EXIT_DIR_EXISTS),
        }
    }
}

/// Runtime settings for command handlers, merged from CLI flags and config.
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    pub config: TabfileConfig,
    pub quiet: bool,
}

/// Run `command` against `util`, writing output to `out`.
pub fn run<F: FileSystem>(
    command: Commands,
    util: &FileUtil<F>,
    ctx: &CommandContext,
    out: &mut dyn Write,
) -> Result<CommandStatus> {
    match command {
        Commands::Lines { path, progress } => handle_lines(util, &path, progress, ctx, out),
        Commands::Map { path, skip_errors } => {
            let skip_errors = skip_errors || ctx.config.tsv.skip_errors;
            let map = util
                .read_map_from_tsv_file(&path, skip_errors)
                .with_context(|| format!("Failed to read map from {}", path.display()))?;
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort();
            for (key, value) in entries {
                writeln!(out, "{}\t{}", key, value)?;
            }
            Ok(CommandStatus::Success)
        }
        Commands::MapList {
            path,
            key_index,
            overwrite,
            min_fields,
        } => {
            let mut options = MapListOptions::new().key_index(key_index).overwrite(overwrite);
            if let Some(min) = min_fields {
                options = options.filter(move |fields| fields.len() < min);
            }
            let map = util
                .read_map_list_from_tsv_file(&path, &options)
                .with_context(|| format!("Failed to read map list from {}", path.display()))?;
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort();
            for (key, values) in entries {
                if values.is_empty() {
                    writeln!(out, "{}", key)?;
                } else {
                    writeln!(out, "{}\t{}", key, values.join("\t"))?;
                }
            }
            Ok(CommandStatus::Success)
        }
        Commands::Doubles { path } => {
            let values = util
                .read_double_list_from_file(&path)
                .with_context(|| format!("Failed to read numbers from {}", path.display()))?;
            let sum: f64 = values.iter().sum();
            writeln!(out, "count\t{}", values.len())?;
            writeln!(out, "sum\t{}", sum)?;
            Ok(CommandStatus::Success)
        }
        Commands::Ls { path } => {
            let names = util
                .list_directory_contents(&path)
                .with_context(|| format!("Failed to list {}", path.display()))?;
            for name in names {
                writeln!(out, "{}", name)?;
            }
            Ok(CommandStatus::Success)
        }
        Commands::Exists { path } => Ok(if util.file_exists(&path) {
            CommandStatus::Success
        } else {
            CommandStatus::Missing
        }),
        Commands::Touch { path } => {
            util.touch_file(&path)
                .with_context(|| format!("Failed to touch {}", path.display()))?;
            Ok(CommandStatus::Success)
        }
        Commands::Rm { path } => {
            util.delete_file(&path)
                .with_context(|| format!("Failed to delete {}", path.display()))?;
            Ok(CommandStatus::Success)
        }
        Commands::Cp { from, to } => {
            let bytes = util
                .copy(&from, &to)
                .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))?;
            log::info!("Copied {} bytes", bytes);
            Ok(CommandStatus::Success)
        }
        Commands::Mkdir { path } => {
            util.mkdirs(&path)
                .with_context(|| format!("Failed to create directory {}", path.display()))?;
            Ok(CommandStatus::Success)
        }
        Commands::MkdirOrDie { dir } => handle_mkdir_or_die(util, &dir, out),
        Commands::WaitDelete { path } => {
            let outcome = util
                .block_on_file_deletion(&path)
                .with_context(|| format!("Failed to watch {} for deletion", path.display()))?;
            let label = match outcome {
                WatchOutcome::NotPresent => "not present",
                WatchOutcome::Deleted => "deleted",
                WatchOutcome::OtherEvent => "other deletion",
                WatchOutcome::Interrupted => "interrupted",
            };
            writeln!(out, "{}", label)?;
            Ok(CommandStatus::Success)
        }
    }
}

fn handle_lines<F: FileSystem>(
    util: &FileUtil<F>,
    path: &Path,
    progress: bool,
    ctx: &CommandContext,
    out: &mut dyn Write,
) -> Result<CommandStatus> {
    let lines = if progress {
        let bar = ProgressConfig::from_env(ctx.quiet).create_counter("Reading");
        let lines = util.read_lines_from_file_with_progress(path, counter_callback(&bar));
        bar.finish_and_clear();
        lines
    } else {
        util.read_lines_from_file(path)
    }
    .with_context(|| format!("Failed to read {}", path.display()))?;

    for line in lines {
        writeln!(out, "{}", line)?;
    }
    Ok(CommandStatus::Success)
}

fn handle_mkdir_or_die<F: FileSystem>(
    util: &FileUtil<F>,
    dir: &str,
    out: &mut dyn Write,
) -> Result<CommandStatus> {
    match util.mkdir_or_die_checked(dir) {
        Ok(_) => Ok(CommandStatus::Success),
        Err(FileUtilError::AlreadyExists { .. }) => {
            writeln!(out, "Out directory already exists! Exiting...")?;
            Ok(CommandStatus::DirectoryExists)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::MemoryFileSystem;
    use std::path::PathBuf;

    fn run_with(fs: MemoryFileSystem, command: Commands) -> (CommandStatus, String) {
        let util = FileUtil::with_fs(fs);
        let mut out: Vec<u8> = Vec::new();
        let code = run(command, &util, &CommandContext::default(), &mut out).unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_map_output_sorted() {
        let fs = MemoryFileSystem::new().with_file("m.tsv", "b\t2\na\t1\n");
        let (code, out) = run_with(
            fs,
            Commands::Map {
                path: PathBuf::from("m.tsv"),
                skip_errors: false,
            },
        );
        assert_eq!(code, CommandStatus::Success);
        assert_eq!(out, "a\t1\nb\t2\n");
    }

    #[test]
    fn test_map_uses_config_skip_errors() {
        let fs = MemoryFileSystem::new().with_file("m.tsv", "a\t1\nbroken\n");
        let util = FileUtil::with_fs(fs);
        let mut ctx = CommandContext::default();
        ctx.config.tsv.skip_errors = true;
        let mut out: Vec<u8> = Vec::new();
        run(
            Commands::Map {
                path: PathBuf::from("m.tsv"),
                skip_errors: false,
            },
            &util,
            &ctx,
            &mut out,
        )
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a\t1\n");
    }

    #[test]
    fn test_map_list_min_fields_filter() {
        let fs = MemoryFileSystem::new().with_file("g.tsv", "a\tx\nb\tx\ty\nb\tz\n");
        let (_, out) = run_with(
            fs,
            Commands::MapList {
                path: PathBuf::from("g.tsv"),
                key_index: 0,
                overwrite: false,
                min_fields: Some(3),
            },
        );
        assert_eq!(out, "b\tx\ty\n");
    }

    #[test]
    fn test_doubles_summary() {
        let fs = MemoryFileSystem::new().with_file("d.txt", "1\n2.5\n");
        let (_, out) = run_with(
            fs,
            Commands::Doubles {
                path: PathBuf::from("d.txt"),
            },
        );
        assert_eq!(out, "count\t2\nsum\t3.5\n");
    }

    #[test]
    fn test_exists_exit_codes() {
        let fs = MemoryFileSystem::new().with_file("here", "");
        let (code, _) = run_with(
            fs.clone(),
            Commands::Exists {
                path: PathBuf::from("here"),
            },
        );
        assert_eq!(code, CommandStatus::Success);

        let (code, _) = run_with(
            fs,
            Commands::Exists {
                path: PathBuf::from("gone"),
            },
        );
        assert_eq!(code, CommandStatus::Missing);
    }

    #[test]
    fn test_mkdir_or_die_existing_dir() {
        let fs = MemoryFileSystem::new().with_dir("out");
        let (code, out) = run_with(
            fs,
            Commands::MkdirOrDie {
                dir: "out".to_string(),
            },
        );
        assert_eq!(code, CommandStatus::DirectoryExists);
        assert_eq!(out, "Out directory already exists! Exiting...\n");
    }

    #[test]
    fn test_rm_missing_file_names_path_in_context() {
        let util = FileUtil::with_fs(MemoryFileSystem::new());
        let mut out: Vec<u8> = Vec::new();
        let err = run(
            Commands::Rm {
                path: PathBuf::from("ghost.txt"),
            },
            &util,
            &CommandContext::default(),
            &mut out,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Failed to delete ghost.txt");
        assert!(err.root_cause().to_string().contains("No such file"));
    }

    #[test]
    fn test_mkdir_over_file_names_path_in_context() {
        let util = FileUtil::with_fs(MemoryFileSystem::new().with_file("taken", ""));
        let mut out: Vec<u8> = Vec::new();
        let err = run(
            Commands::Mkdir {
                path: PathBuf::from("taken"),
            },
            &util,
            &CommandContext::default(),
            &mut out,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Failed to create directory taken");
    }

    #[test]
    fn test_wait_delete_missing_file() {
        let (_, out) = run_with(
            MemoryFileSystem::new(),
            Commands::WaitDelete {
                path: PathBuf::from("none"),
            },
        );
        assert_eq!(out, "not present\n");
    }
}
