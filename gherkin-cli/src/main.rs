//! Command-line interface for GherkinEase
//! Builds Gherkin scenario documents from scenario description files and queries the
//! keyword vocabulary and signal catalogs.
//!
//! Usage:
//!   gherkinease render `<scenario.yaml>` [-o `<file>`] [--data-uri]  - Render the scenario document
//!   gherkinease tags `<scenario.yaml>`                               - List the placeholder tags
//!   gherkinease keywords [--vocabulary `<file>`] [--where COL=VAL]   - List vocabulary keywords
//!   gherkinease signal `<name>` [--signals `<file>`]                 - Look a signal up in Rx/Tx
//!   gherkinease reformat `<document.txt>` [-o `<file>`]              - Re-align an example table

mod commands;
mod scenario_file;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use commands::Output;
use gherkin_config::{GherkinConfig, Loader, LOCAL_CONFIG_FILE};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn path_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .help(help)
        .required(true)
        .index(1)
        .value_parser(value_parser!(PathBuf))
}

fn output_arg() -> Arg {
    Arg::new("output")
        .long("output")
        .short('o')
        .help("Write to this file instead of stdout")
        .value_parser(value_parser!(PathBuf))
}

fn vocabulary_arg() -> Arg {
    Arg::new("vocabulary")
        .long("vocabulary")
        .help("Keyword vocabulary file (overrides catalog.vocabulary)")
        .value_parser(value_parser!(PathBuf))
}

fn build_cli() -> Command {
    Command::new("gherkinease")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compose Gherkin scenarios with aligned example tables")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Configuration file layered over the defaults and ./gherkinease.toml")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .help("Log debug output to stderr")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-spelling")
                .long("no-spelling")
                .global(true)
                .help("Use statements exactly as written")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("render")
                .about("Render a scenario description into the scenario document")
                .arg(path_arg("scenario", "Scenario description (.yaml, .yml or .json)"))
                .arg(output_arg())
                .arg(vocabulary_arg())
                .arg(
                    Arg::new("data-uri")
                        .long("data-uri")
                        .help("Emit an HTML download link with a base64 data URI")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("tags")
                .about("List the <tags> used by a scenario, one per line")
                .arg(path_arg("scenario", "Scenario description (.yaml, .yml or .json)"))
                .arg(vocabulary_arg()),
        )
        .subcommand(
            Command::new("keywords")
                .about("List the keywords of the vocabulary")
                .arg(vocabulary_arg())
                .arg(
                    Arg::new("where")
                        .long("where")
                        .value_name("COLUMN=VALUE")
                        .help("Only keywords whose COLUMN equals VALUE"),
                ),
        )
        .subcommand(
            Command::new("signal")
                .about("Find a signal in the Rx and Tx catalogs")
                .arg(Arg::new("name").help("Signal name").required(true).index(1))
                .arg(
                    Arg::new("signals")
                        .long("signals")
                        .help("Signal catalog file (overrides catalog.signals)")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("reformat")
                .about("Re-align the example table of a rendered document")
                .arg(path_arg("document", "Rendered scenario document"))
                .arg(output_arg()),
        )
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<GherkinConfig> {
    let mut loader = Loader::new().with_optional_file(LOCAL_CONFIG_FILE);
    if let Some(path) = matches.get_one::<PathBuf>("config") {
        loader = loader.with_file(path);
    }
    if matches.get_flag("no-spelling") {
        loader = loader.set_override("spelling.enabled", false)?;
    }
    Ok(loader.build()?)
}

fn run(name: &str, matches: &ArgMatches) -> anyhow::Result<()> {
    let config = load_config(matches)?;
    let output = Output {
        path: matches
            .try_get_one::<PathBuf>("output")
            .ok()
            .flatten()
            .map(PathBuf::as_path),
        trailing_newline: config.output.trailing_newline,
    };
    let vocabulary = matches
        .try_get_one::<PathBuf>("vocabulary")
        .ok()
        .flatten()
        .map(PathBuf::as_path);

    let content = match name {
        "render" => commands::render_scenario(
            &config,
            required_path(matches, "scenario"),
            vocabulary,
            matches.get_flag("data-uri"),
        )?,
        "tags" => commands::list_tags(&config, required_path(matches, "scenario"), vocabulary)?,
        "keywords" => commands::list_keywords(
            &config,
            vocabulary,
            matches.get_one::<String>("where").map(String::as_str),
        )?,
        "signal" => {
            let signal = matches
                .get_one::<String>("name")
                .expect("signal name is a required argument");
            let signals = matches.get_one::<PathBuf>("signals").map(PathBuf::as_path);
            commands::lookup_signal(&config, signal, signals)?
        }
        "reformat" => commands::reformat_document(required_path(matches, "document"))?,
        other => anyhow::bail!("unknown command '{other}'"),
    };
    output.write(&content)
}

fn required_path<'a>(matches: &'a ArgMatches, name: &str) -> &'a std::path::Path {
    matches
        .get_one::<PathBuf>(name)
        .expect("path is a required argument")
}

fn main() {
    let matches = build_cli().get_matches();
    let Some((name, sub_matches)) = matches.subcommand() else {
        return;
    };

    init_tracing(sub_matches.get_flag("verbose"));

    if let Err(err) = run(name, sub_matches) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn global_flags_reach_subcommands() {
        let matches = build_cli()
            .try_get_matches_from(["gherkinease", "tags", "s.yaml", "-v", "--no-spelling"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "tags");
        assert!(sub.get_flag("verbose"));
        assert!(sub.get_flag("no-spelling"));
    }
}
