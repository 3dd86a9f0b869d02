use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tldr_core::config::{Settings, load_config};
use tldr_core::index::list_pages;
use tldr_core::render::show_page;
use tldr_core::runtime::{ResolvedPaths, resolve_paths};
use tldr_core::update::update_pages;

const PLATFORMS_HELP: &str = "Platforms:\n  android\n  common\n  linux\n  osx\n  sunos\n  windows\n\nExamples:\n  tldr tar\n  tldr osx/open\n  tldr -u";

#[derive(Debug, Parser)]
#[command(
    name = "tldr",
    version,
    about = "Offline viewer for tldr command pages",
    override_usage = "tldr [options] <[platform/]command>",
    after_help = PLATFORMS_HELP
)]
struct Cli {
    #[arg(short = 'u', long = "update", help = "Fetch latest copies of cached pages", conflicts_with_all = ["list", "page"])]
    update: bool,
    #[arg(short = 'l', long = "list", help = "Show all available pages", conflicts_with = "page")]
    list: bool,
    #[arg(long, help = "Print resolved runtime diagnostics")]
    diagnostics: bool,
    #[arg(value_name = "[PLATFORM/]COMMAND", help = "Show examples for this command")]
    page: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Update,
    List,
    Show(String),
}

impl Cli {
    fn mode(&self) -> Option<Mode> {
        if self.update {
            Some(Mode::Update)
        } else if self.list {
            Some(Mode::List)
        } else {
            self.page.clone().map(Mode::Show)
        }
    }
}

struct Runtime {
    paths: ResolvedPaths,
    settings: Settings,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            let displays_info = matches!(
                error.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            );
            error.print().context("failed to print usage")?;
            return Ok(if displays_info {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }
    };

    let Some(mode) = cli.mode() else {
        Cli::command()
            .print_help()
            .context("failed to print usage")?;
        println!();
        return Ok(ExitCode::FAILURE);
    };

    let runtime = load_runtime()?;
    if cli.diagnostics {
        println!(
            "[diagnostics]\n{}\n{}\n",
            runtime.paths.diagnostics(),
            runtime.settings.diagnostics()
        );
    }

    match mode {
        Mode::Update => run_update(&runtime)?,
        Mode::List => run_list(&runtime)?,
        Mode::Show(name) => run_show(&runtime, &name)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn run_update(runtime: &Runtime) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let report = update_pages(&runtime.paths, &runtime.settings, &mut out)?;
    writeln!(
        out,
        "Extracted {} files; indexed {} pages across {} platforms",
        report.extract.files_written,
        report.index.pages,
        report.index.by_platform.len()
    )?;
    Ok(())
}

fn run_list(runtime: &Runtime) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    list_pages(&runtime.paths.index_path, &mut out)?;
    out.flush()?;
    Ok(())
}

fn run_show(runtime: &Runtime, name: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    show_page(&runtime.paths, &runtime.settings, name, &mut out)?;
    out.flush()?;
    Ok(())
}

fn load_runtime() -> Result<Runtime> {
    dotenvy::dotenv().ok();

    let paths = resolve_paths()?;
    let config = load_config(&paths.config_path)?;
    let settings = Settings::resolve(&config)?;
    Ok(Runtime { paths, settings })
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use clap::error::ErrorKind;

    use super::{Cli, Mode};

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("tldr").chain(args.iter().copied()))
    }

    #[test]
    fn selects_one_mode_per_invocation() {
        assert_eq!(parse(&["-u"]).expect("update").mode(), Some(Mode::Update));
        assert_eq!(parse(&["-l"]).expect("list").mode(), Some(Mode::List));
        assert_eq!(
            parse(&["osx/open"]).expect("show").mode(),
            Some(Mode::Show("osx/open".to_string()))
        );
        assert_eq!(parse(&[]).expect("empty").mode(), None);
    }

    #[test]
    fn help_is_a_display_request() {
        let error = parse(&["-h"]).expect_err("help short-circuits");
        assert_eq!(error.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn extra_arguments_are_rejected() {
        assert!(parse(&["tar", "ls"]).is_err());
        assert!(parse(&["-u", "tar"]).is_err());
        assert!(parse(&["-u", "-l"]).is_err());
    }

    #[test]
    fn flags_are_case_sensitive() {
        assert!(parse(&["-U"]).is_err());
    }
}
