//! ccdupe - duplicate file finder
//!
//! Finds duplicate files in three stages of increasing cost: files are
//! grouped by exact size, same-size files are hashed with BLAKE3, and every
//! digest match is confirmed by a byte-for-byte comparison. Confirmed pairs
//! can then be resolved interactively, deleting one file of each pair.
//!
//! ```no_run
//! use ccdupe::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (report, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//! for pair in &report.confirmed {
//!     println!("{} == {}", pair.first.display(), pair.second.display());
//! }
//! println!("{} reclaimable", summary.reclaimable_display());
//! ```

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{BufRead, IsTerminal, Write};
use std::sync::Arc;

use anyhow::Context;

use crate::actions::{
    resolve_all, Decision, DecisionSource, DeleteConfig, PromptDecisionSource, ResolutionReport,
};
use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, DuplicatePair, Report};
use crate::error::ExitCode;
use crate::output::{JsonFileList, JsonOutput, TextOutput};
use crate::progress::Progress;

/// Run the application, writing results to stdout.
///
/// # Errors
///
/// Returns an error for an invalid root, bad configuration, an interrupted
/// scan, or a failure writing output.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let color = !cli.no_color && std::io::stdout().is_terminal();
    let mut stdout = std::io::stdout().lock();
    run_app_with(&cli, &mut stdout, color)
}

/// Run the application, writing results to `out`.
///
/// Progress bars and interactive prompts still go to stderr.
///
/// # Errors
///
/// See [`run_app`].
pub fn run_app_with<W: Write>(cli: &Cli, out: &mut W, color: bool) -> anyhow::Result<ExitCode> {
    run(cli, out, color, PromptDecisionSource::stdio)
}

/// Like [`run_app_with`], but `--interactive` answers are read from `input`.
///
/// # Errors
///
/// See [`run_app`].
pub fn run_app_with_input<W: Write, R: BufRead>(
    cli: &Cli,
    out: &mut W,
    input: R,
    color: bool,
) -> anyhow::Result<ExitCode> {
    run(cli, out, color, move || {
        PromptDecisionSource::new(input, std::io::stderr())
    })
}

fn run<W, F, S>(cli: &Cli, out: &mut W, color: bool, prompt: F) -> anyhow::Result<ExitCode>
where
    W: Write,
    F: FnOnce() -> S,
    S: DecisionSource,
{
    let color = color && !cli.no_color;
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply_to(&mut config);
    log::debug!("Effective configuration: {:?}", config);

    let shutdown = signal::install_handler();
    let quiet = cli.quiet || cli.output == OutputFormat::Json;
    let progress = Arc::new(Progress::new(quiet));

    let finder_config = config
        .to_finder_config()
        .with_shutdown_flag(shutdown.flag())
        .with_progress_callback(progress);
    let finder = DuplicateFinder::new(finder_config);

    if cli.list_files {
        let enumeration = finder.enumerate(&cli.path)?;
        match cli.output {
            OutputFormat::Text => TextOutput::new(color).write_file_list(out, &enumeration)?,
            OutputFormat::Json => JsonFileList::new(&enumeration).write_to(out, true)?,
        }
        out.flush()?;
        return Ok(if enumeration.warnings.is_empty() {
            ExitCode::Success
        } else {
            ExitCode::PartialSuccess
        });
    }

    let (report, summary) = finder.find_duplicates(&cli.path)?;
    let exit_code = ExitCode::for_report(&report);

    let review = cli.interactive && report.has_duplicates();

    match cli.output {
        OutputFormat::Text => {
            let text = TextOutput::new(color);
            text.write_report(out, &report, &summary)?;
            out.flush()?;
            if review {
                let resolution = resolve_interactively(&report, &config, &shutdown, prompt());
                text.write_resolution(out, &resolution)?;
            }
        }
        OutputFormat::Json => {
            let resolution =
                review.then(|| resolve_interactively(&report, &config, &shutdown, prompt()));
            let exit_code = interrupted_or(&shutdown, exit_code);
            let mut json = JsonOutput::new(&report, &summary, exit_code);
            if let Some(ref resolution) = resolution {
                json = json.with_resolution(resolution);
            }
            json.write_to(out, true)?;
        }
    }
    out.flush()?;

    Ok(interrupted_or(&shutdown, exit_code))
}

fn interrupted_or(shutdown: &signal::ShutdownHandler, exit_code: ExitCode) -> ExitCode {
    if shutdown.is_shutdown_requested() {
        ExitCode::Interrupted
    } else {
        exit_code
    }
}

fn resolve_interactively<S: DecisionSource>(
    report: &Report,
    config: &Config,
    shutdown: &signal::ShutdownHandler,
    mut prompt: S,
) -> ResolutionReport {
    let delete_config = if config.permanent {
        DeleteConfig::permanent()
    } else {
        DeleteConfig::trash()
    };
    log::info!(
        "Reviewing {} duplicate pairs ({})",
        report.confirmed.len(),
        if config.permanent {
            "permanent delete"
        } else {
            "move to trash"
        }
    );

    let mut source = |pair: &DuplicatePair| {
        if shutdown.is_shutdown_requested() {
            Decision::Skip
        } else {
            prompt.decide(pair)
        }
    };
    let resolution = resolve_all(&report.confirmed, &mut source, &delete_config);
    if shutdown.is_shutdown_requested() {
        log::warn!("Interrupted during review; remaining pairs skipped");
    }
    log::info!("{}", resolution.summary());
    resolution
}
