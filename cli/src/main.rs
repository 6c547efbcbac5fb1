#![deny(missing_docs)]

//! # goctl-permission
//!
//! goctl plugin that injects permission checks into generated handlers.
//!
//! ```text
//! goctl api plugin -p "goctl-permission --handlerdir=internal/handler \
//!     --tpl=permission.tpl --types=demo/internal/types" \
//!     -api demo.api -dir .
//! ```
//!
//! The API spec arrives as JSON on stdin. Every route with a `permission`
//! doc tag gets the rendered template inserted after its `httpx.Parse` block.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use permission_core::{
    Generator, GeneratorConfig, ImportEntry, PermissionTemplate, Plugin, RegexAnchor, RunReport,
    DEFAULT_UTILS_IMPORT,
};
use tracing::{error, info};

use crate::error::{CliError, CliResult};

mod error;
mod logging;

#[derive(Parser, Debug)]
#[clap(
    name = "goctl-permission",
    author,
    version,
    about = "Injects permission checks into goctl generated handlers"
)]
struct Cli {
    /// Directory of the generated handler files, relative to the plugin dir.
    #[clap(long, env = "PERMISSION_HANDLERDIR")]
    handlerdir: PathBuf,

    /// Template file with one `%s` placeholder for the permission.
    #[clap(long, env = "PERMISSION_TPL")]
    tpl: PathBuf,

    /// Import path of the package holding the context keys (aliased `contextkey`).
    #[clap(long, env = "PERMISSION_TYPES")]
    types: String,

    /// Import path of the permission utils package (aliased `utils`).
    #[clap(long, default_value = DEFAULT_UTILS_IMPORT)]
    utils: String,

    /// Additional imports, comma separated. Each is `path` or `alias path`.
    #[clap(long)]
    imports: Option<String>,

    /// Directory to write `permission.json` to. Implies `--dump-only`.
    #[clap(long)]
    dump: Option<PathBuf>,

    /// Only collect permissions; do not modify any handler.
    #[clap(long)]
    dump_only: bool,

    /// Regex locating the block after which the check is inserted.
    #[clap(long)]
    anchor: Option<String>,

    /// Read the plugin payload from a file (JSON or YAML) instead of stdin.
    #[clap(long)]
    input: Option<PathBuf>,

    /// Override the working directory reported by goctl.
    #[clap(long)]
    dir: Option<PathBuf>,

    /// More log output (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn generator_config(&self, dir: PathBuf) -> CliResult<GeneratorConfig> {
        if self.handlerdir.as_os_str().is_empty() {
            return Err(CliError::Config("--handlerdir is required".into()));
        }
        if self.types.trim().is_empty() {
            return Err(CliError::Config("--types is required".into()));
        }
        if self.utils.trim().is_empty() {
            return Err(CliError::Config("--utils must not be empty".into()));
        }

        let mut config = GeneratorConfig::new(dir, &self.handlerdir, self.types.trim());
        config.utils_import.path = self.utils.trim().to_string();
        config.additional_imports = match &self.imports {
            Some(list) => ImportEntry::parse_list(list)?,
            None => Vec::new(),
        };
        config.dump_dir = self.dump.clone();
        config.dump_only = self.dump_only || self.dump.is_some();
        Ok(config)
    }
}

/// Rewrites Go-style `-flag[=value]` into `--flag[=value]` for known long flags,
/// so existing goctl invocations keep working.
fn normalize_go_flags(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let command = Cli::command();
    let mut known: Vec<String> = command
        .get_arguments()
        .filter_map(|a| a.get_long())
        .map(str::to_string)
        .collect();
    known.extend(["help".to_string(), "version".to_string()]);

    let mut passthrough = false;
    args.into_iter()
        .map(|arg| {
            if passthrough {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                passthrough = true;
                return arg;
            }
            match text.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') => {
                    let name = rest.split('=').next().unwrap_or_default();
                    if known.iter().any(|k| k == name) {
                        OsString::from(format!("-{}", text))
                    } else {
                        arg
                    }
                }
                _ => arg,
            }
        })
        .collect()
}

fn run(cli: &Cli) -> CliResult<RunReport> {
    let anchor = cli.anchor.as_deref().map(RegexAnchor::new).transpose()?;

    let plugin = match &cli.input {
        Some(path) => Plugin::from_file(path)?,
        None => Plugin::from_reader(io::stdin().lock())?,
    };

    let dir = cli.dir.clone().unwrap_or_else(|| plugin.dir());
    let config = cli.generator_config(dir)?;
    info!(dir = %config.dir.display(), api = %plugin.api_file_path, "code gen");

    let template = PermissionTemplate::load(&config.dir.join(&cli.tpl))?;

    let mut generator = Generator::new(config, template);
    if let Some(anchor) = anchor {
        generator = generator.with_anchor(anchor);
    }

    let report = generator.run(&plugin.api.service);

    if let Err(e) = generator.dump_ledger(&report) {
        error!(error = %e, "failed to dump permissions");
    }

    Ok(report)
}

fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_go_flags(std::env::args_os()));
    logging::init(cli.verbose);

    match run(&cli) {
        Ok(report) => {
            info!(
                permissions = report.ledger.len(),
                patched = report.patched(),
                failed = report.failed(),
                "done"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "aborted");
            ExitCode::FAILURE
        }
    }
}
