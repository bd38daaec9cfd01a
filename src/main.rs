//! Rando Widget Configurator - Command-line Entry Point
//!
//! One-shot conversions (snippet, preview URL, share link, query
//! normalization, option lists) and a line-oriented editing session.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use rando_configurator::codec::{QueryMap, decode, encode, share_url};
use rando_configurator::domain::{FilterResource, WidgetConfig, is_valid_api_url};
use rando_configurator::export::{PreviewGenerator, SnippetGenerator, frame_attributes};
use rando_configurator::i18n::{self, Translator, t};
use rando_configurator::logging::init_logging;
use rando_configurator::services::{GeotrekClient, OptionSource, block_on, spawn_named_in_tokio};
use rando_configurator::session::{Session, SessionCommand, SessionEvent, command_channel};
use rando_configurator::settings::ConfiguratorSettings;
use rando_configurator::sync::Location;

#[derive(Parser)]
#[command(name = "rando-configurator")]
#[command(version, about = "Geotrek rando widget configurator")]
struct Cli {
    /// Settings file (default: platform configuration directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Interface language, overriding the settings and system locale
    #[arg(long, global = true)]
    ui_language: Option<String>,

    /// Emit non-default colours even under a named theme
    #[arg(long, global = true)]
    expand_colors: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the embed snippet for a configurator query or link
    Snippet {
        #[arg(default_value = "")]
        query: String,
    },
    /// Print the preview frame URL
    Preview {
        #[arg(default_value = "")]
        query: String,
        /// Print the widget attributes the preview frame would set instead
        #[arg(long)]
        attributes: bool,
    },
    /// Print a shareable link to the configurator page
    Share {
        /// Configurator page URL
        page: String,
        #[arg(default_value = "")]
        query: String,
    },
    /// Decode then re-encode a query, dropping defaults and unknown keys
    Normalize { query: String },
    /// Fetch one filter option list from an API
    Options {
        /// API base URL ending with /api/v2/
        api: String,
        /// Resource name (district, theme, trek_practice, city, ...)
        resource: String,
        /// Language used to resolve localized names
        #[arg(long)]
        language: Option<String>,
    },
    /// Interactive editing session reading commands from stdin
    Edit {
        #[arg(default_value = "")]
        query: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => ConfiguratorSettings::load_from(path),
        None => ConfiguratorSettings::try_load(),
    }
    .context("Failed to load settings")?;
    if cli.ui_language.is_some() {
        settings.ui_language = cli.ui_language;
    }
    if cli.expand_colors {
        settings.export.expand_preset_colors = true;
    }

    let _guard = init_logging(settings.logging.file)?;
    i18n::init(Translator::load(
        settings.ui_language(),
        settings.translations_dir.as_deref(),
    ));
    tracing::debug!(language = settings.ui_language(), "Starting configurator");

    let defaults = WidgetConfig::defaults();
    match cli.command {
        Commands::Snippet { query } => {
            let config = decode(&parse_query(&query), defaults);
            let generator = SnippetGenerator::new(settings.widget_asset_base.clone(), settings.export);
            println!("{}", generator.render(&config, defaults));
        }
        Commands::Preview { query, attributes } => {
            let config = decode(&parse_query(&query), defaults);
            let mut generator = PreviewGenerator::new(settings.preview_base_href.clone(), settings.export);
            if attributes {
                for (name, value) in frame_attributes(&generator.preview_query(&config, defaults)) {
                    println!("{name}=\"{value}\"");
                }
            } else {
                let now_ms = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default();
                println!("{}", generator.generate(&config, defaults, now_ms));
            }
        }
        Commands::Share { page, query } => {
            let config = decode(&parse_query(&query), defaults);
            println!("{}", share_url(&page, &config, defaults));
        }
        Commands::Normalize { query } => {
            let config = decode(&parse_query(&query), defaults);
            println!("{}", encode(&config, defaults));
        }
        Commands::Options {
            api,
            resource,
            language,
        } => {
            let api = api.trim();
            if api.is_empty() {
                bail!(t("ERRORS.URL_REQUIRED"));
            }
            if !is_valid_api_url(api) {
                bail!(t("ERRORS.URL_PATTERN"));
            }
            let resource = parse_resource(&resource)
                .with_context(|| format!("Unknown resource '{resource}'"))?;
            let language = language.unwrap_or_else(|| settings.ui_language().to_string());

            let client = GeotrekClient::new(settings.http.timeout())?;
            let options = block_on(client.fetch(api, resource))??;
            for option in options {
                println!("{}\t{}", option.id, option.display_name(&language));
            }
        }
        Commands::Edit { query } => run_edit(&settings, &query)?,
    }

    Ok(())
}

/// Accept either a bare query or a full link carrying one
fn parse_query(input: &str) -> QueryMap {
    let input = input.trim();
    QueryMap::parse(input.split_once('?').map_or(input, |(_, query)| query))
}

fn parse_resource(name: &str) -> Option<FilterResource> {
    FilterResource::ALL
        .into_iter()
        .find(|r| r.path() == name || r.query_key() == name || r.widget_name() == name)
}

fn run_edit(settings: &ConfiguratorSettings, query: &str) -> anyhow::Result<()> {
    let client = GeotrekClient::new(settings.http.timeout())?;
    let mut session = Session::new(settings, client, parse_query(query));

    let events = session.events();
    let printer = std::thread::spawn(move || {
        for event in events.iter() {
            print_event(&event);
        }
    });

    let (tx, rx) = command_channel();
    let reader = spawn_named_in_tokio("stdin-reader", async move {
        println!("{}", t("SESSION.READY"));
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read stdin");
                    break;
                }
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "help" {
                println!("{}", t("SESSION.HELP"));
                continue;
            }
            match line.parse::<SessionCommand>() {
                Ok(command) => {
                    let quit = command == SessionCommand::Shutdown;
                    if tx.send(command).is_err() || quit {
                        return;
                    }
                }
                Err(e) => eprintln!("{}: {e}", t("SESSION.UNKNOWN_COMMAND")),
            }
        }
        let _ = tx.send(SessionCommand::Shutdown);
    })?;

    block_on(session.run(rx))??;
    reader.abort();

    let store = session.store();
    let snippet = SnippetGenerator::new(settings.widget_asset_base.clone(), settings.export)
        .render(store.get(), store.defaults());
    let final_query = session.location().query();
    drop(session);
    if printer.join().is_err() {
        tracing::warn!("Event printer panicked");
    }

    println!("?{final_query}");
    println!("{snippet}");
    println!("{}", t("SESSION.BYE"));
    Ok(())
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::ConfigChanged(change) => {
            let fields: Vec<String> = change.fields.iter().map(ToString::to_string).collect();
            println!("#{} {:?}: {}", change.revision, change.origin, fields.join(", "));
        }
        SessionEvent::UrlReplaced(query) => println!("{}: ?{query}", t("SESSION.URL_UPDATED")),
        SessionEvent::PreviewCleared => println!("{}", t("PREVIEW.GENERATING")),
        SessionEvent::PreviewLoaded(url) => println!("{}: {url}", t("PREVIEW.TITLE")),
        SessionEvent::OptionsUpdated(resource) => {
            println!("{}: {resource}", t("SESSION.OPTIONS_UPDATED"));
        }
        SessionEvent::ValidationFailed(message) => eprintln!("{message}"),
    }
}
