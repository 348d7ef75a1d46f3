use anyhow::Context as _;
use clap::Parser;
use docsite_search::cli::{Cli, Commands, SiteArgs};
use docsite_search::config::SearchConfig;
use docsite_search::controller::{SearchController, SearchForm, SearchView, UiState};
use docsite_search::error::Result;
use docsite_search::executor::QueryExecutor;
use docsite_search::format::format_results;
use docsite_search::loader::{SiteIndexLoader, parse_allow_list};
use docsite_search::session::SearchSession;
use docsite_search::snippet::SnippetRenderer;
use docsite_search::source::SiteSource;
use std::io::Write as _;
use std::sync::Arc;

/// Collects the HTML list handed over by the controller and logs state changes.
#[derive(Debug, Default)]
struct TerminalView {
    html: String,
}

impl SearchView for TerminalView {
    fn set_state(&mut self, state: UiState) {
        match state {
            UiState::Working => tracing::info!("Searching..."),
            UiState::Idle => tracing::debug!("Search finished"),
            UiState::Failed(message) => tracing::error!("Search failed: {}", message),
        }
    }

    fn show_results(&mut self, html: &str) {
        html.clone_into(&mut self.html);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    docsite_search::tracing::init(docsite_search::tracing::level_for_verbosity(cli.verbose));

    let mut config =
        SearchConfig::discover(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Search {
            query,
            site,
            min_latency_ms,
            html,
        } => {
            if let Some(ms) = min_latency_ms {
                config.min_latency_ms = ms;
            }
            let (location, session) = open_session(&config, &site)?;
            let controller = SearchController::new(
                session,
                QueryExecutor::new(config.min_latency()),
                SnippetRenderer::new(config.snippet),
            );

            let form = SearchForm::new(query).with_sections(allow_list(&config, &site));
            let mut view = TerminalView::default();
            let results = controller
                .submit(&form, &mut view)
                .await
                .with_context(|| format!("Search of {} failed", location))?;

            let output = if html {
                view.html
            } else {
                format_results(&results, &form.query, &location)
            };
            writeln!(std::io::stdout(), "{}", output)?;
        }
        Commands::Documents { site } => {
            let (location, session) = open_session(&config, &site)?;
            let corpus = session
                .get_or_build(allow_list(&config, &site).as_deref())
                .await
                .with_context(|| format!("Failed to load {}", location))?;

            let json = serde_json::to_string_pretty(corpus.documents())?;
            writeln!(std::io::stdout(), "{}", json)?;
        }
    }

    Ok(())
}

/// The command-line allow-list, falling back to the configured default sections.
fn allow_list(config: &SearchConfig, site: &SiteArgs) -> Option<Vec<String>> {
    match site.sections.as_deref() {
        Some(value) => parse_allow_list(value),
        None => config.default_sections.clone(),
    }
}

fn open_session(
    config: &SearchConfig,
    site: &SiteArgs,
) -> Result<(String, Arc<SearchSession<SiteSource>>)> {
    let location = site
        .site
        .clone()
        .or_else(|| config.site.clone())
        .context("No site given; pass --site or set `site` in the config file")?;

    let source = SiteSource::from_location(&location, config.fetch_timeout())
        .with_context(|| format!("Invalid site location {}", location))?;
    let loader = SiteIndexLoader::new(source, config.fetch_timeout());

    Ok((location, Arc::new(SearchSession::new(loader))))
}
