//! Subcommand bodies. Each returns the text destined for stdout (or the output file).

use crate::scenario_file::ScenarioFile;
use anyhow::{anyhow, bail, Context};
use gherkin_config::GherkinConfig;
use gherkin_core::catalog::{SignalCatalog, SignalLookup, SignalRow, Vocabulary};
use gherkin_core::correction::corrector_for;
use gherkin_core::render::parse_document;
use gherkin_core::{delivery, render, Session};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a produced document goes.
pub struct Output<'a> {
    pub path: Option<&'a Path>,
    pub trailing_newline: bool,
}

impl Output<'_> {
    pub fn write(&self, content: &str) -> anyhow::Result<()> {
        match self.path {
            Some(path) => {
                let mut content = content.to_string();
                if self.trailing_newline && !content.ends_with('\n') {
                    content.push('\n');
                }
                std::fs::write(path, content)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                tracing::info!(path = %path.display(), "document written");
            }
            None if content.ends_with('\n') => print!("{content}"),
            None => println!("{content}"),
        }
        Ok(())
    }
}

fn vocabulary_for(config: &GherkinConfig, explicit: Option<&Path>) -> anyhow::Result<Vocabulary> {
    match explicit.or_else(|| config.catalog.vocabulary_path()) {
        Some(path) => Vocabulary::load(path)
            .with_context(|| format!("failed to load vocabulary {}", path.display())),
        None => Ok(Vocabulary::default()),
    }
}

fn build_session(
    config: &GherkinConfig,
    scenario: &Path,
    vocabulary: Option<&Path>,
) -> anyhow::Result<Session> {
    let file = ScenarioFile::load(scenario)?;
    let corrector = corrector_for(
        config.spelling.enabled,
        &config.spelling.language,
        &config.spelling.dictionary_dirs,
    );
    let mut session = Session::new(
        config.session_settings(),
        corrector,
        Arc::new(vocabulary_for(config, vocabulary)?),
    );
    file.apply(&mut session)
        .with_context(|| format!("invalid scenario {}", scenario.display()))?;
    Ok(session)
}

/// The rendered document, or its download anchor when `data_uri` is set.
pub fn render_scenario(
    config: &GherkinConfig,
    scenario: &Path,
    vocabulary: Option<&Path>,
    data_uri: bool,
) -> anyhow::Result<String> {
    let document = build_session(config, scenario, vocabulary)?.render();
    if data_uri {
        return Ok(delivery::download_link(
            &document,
            &config.output.filename,
            "Download Gherkin Scenario",
        ));
    }
    Ok(document)
}

pub fn list_tags(
    config: &GherkinConfig,
    scenario: &Path,
    vocabulary: Option<&Path>,
) -> anyhow::Result<String> {
    let session = build_session(config, scenario, vocabulary)?;
    Ok(session.tags().join("\n"))
}

/// Parse a `COLUMN=VALUE` filter.
pub fn parse_filter(filter: &str) -> anyhow::Result<(&str, &str)> {
    filter
        .split_once('=')
        .map(|(column, value)| (column.trim(), value.trim()))
        .filter(|(column, _)| !column.is_empty())
        .ok_or_else(|| anyhow!("filter must look like COLUMN=VALUE, got '{filter}'"))
}

pub fn list_keywords(
    config: &GherkinConfig,
    vocabulary: Option<&Path>,
    filter: Option<&str>,
) -> anyhow::Result<String> {
    if vocabulary.is_none() && config.catalog.vocabulary_path().is_none() {
        bail!("no vocabulary configured; pass --vocabulary or set catalog.vocabulary");
    }
    let vocabulary = vocabulary_for(config, vocabulary)?;
    let keywords: Vec<&str> = match filter {
        Some(filter) => {
            let (column, value) = parse_filter(filter)?;
            if !vocabulary.columns().iter().any(|c| c == column) {
                bail!("vocabulary has no column '{column}'");
            }
            vocabulary
                .rows_where(column, value)
                .into_iter()
                .map(|entry| entry.keyword.as_str())
                .collect()
        }
        None => vocabulary.keywords().collect(),
    };
    Ok(keywords.join("\n"))
}

fn describe_row(row: &SignalRow) -> String {
    let mut line = format!(
        "  Object Content: {} | Associated Network Signal: {}",
        row.object_content, row.associated_network_signal
    );
    for (key, value) in &row.extra {
        let value = value.as_ref().map(ToString::to_string).unwrap_or_default();
        line.push_str(&format!(" | {key}: {value}"));
    }
    line
}

pub fn lookup_signal(
    config: &GherkinConfig,
    name: &str,
    signals: Option<&Path>,
) -> anyhow::Result<String> {
    let path: PathBuf = match signals.or_else(|| config.catalog.signals_path()) {
        Some(path) => path.to_path_buf(),
        None => bail!("no signal catalog configured; pass --signals or set catalog.signals"),
    };
    let catalog = SignalCatalog::load(&path)
        .with_context(|| format!("failed to load signal catalog {}", path.display()))?;

    match catalog.find_signal(name) {
        SignalLookup::Found {
            sheet,
            column,
            rows,
        } => {
            let mut lines = vec![format!(
                "Signal found in {sheet} sheet under '{column}': {name}"
            )];
            lines.extend(rows.into_iter().map(describe_row));
            Ok(lines.join("\n"))
        }
        SignalLookup::NotFound => Ok("Signal not found in either sheet.".to_string()),
    }
}

/// Re-align the example table of an already rendered document.
pub fn reformat_document(document: &Path) -> anyhow::Result<String> {
    let text = std::fs::read_to_string(document)
        .with_context(|| format!("failed to read {}", document.display()))?;
    let (scenario, table) = parse_document(&text);
    if table.is_none() {
        tracing::debug!("document has no examples table");
    }
    Ok(render(&scenario, table.as_ref()))
}
