//! Search orchestration: form submission to rendered results.

use crate::error::SearchError;
use crate::executor::QueryExecutor;
use crate::html::escape_html;
use crate::loader::parse_allow_list;
use crate::session::{SearchSession, SiteCorpus};
use crate::snippet::{SnippetRenderer, Summary};
use crate::source::SitemapSource;
use std::sync::Arc;

/// State of the search view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiState {
    /// A query is being processed; the progress indicator is shown.
    Working,
    /// Results (possibly none) are shown.
    Idle,
    /// The last query failed; the message is shown instead of results.
    Failed(String),
}

/// Where the controller reports progress and results.
pub trait SearchView {
    fn set_state(&mut self, state: UiState);

    /// Replaces the result list with `html`.
    fn show_results(&mut self, html: &str);
}

/// A submitted search: the query text and the optional section allow-list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchForm {
    pub query: String,
    pub sections: Option<Vec<String>>,
}

impl SearchForm {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            sections: None,
        }
    }

    #[must_use]
    pub fn with_sections(mut self, sections: Option<Vec<String>>) -> Self {
        self.sections = sections;
        self
    }

    /// Builds a form from a query and the raw comma-separated allow-list attribute.
    /// A missing or empty attribute means every section is searched.
    pub fn from_attributes(query: impl Into<String>, allow_attr: Option<&str>) -> Self {
        Self::new(query).with_sections(allow_attr.and_then(parse_allow_list))
    }
}

/// One ranked result, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedResult {
    /// 1-based position in the result list.
    pub rank: usize,
    pub link: String,
    pub title: String,
    pub score: f32,
    pub summary: Summary,
}

impl RenderedResult {
    /// `<li><a href='LINK'>RANK: TITLE</a><br><p>SUMMARY</p></li>`
    pub fn to_html(&self) -> String {
        format!(
            "<li><a href='{}'>{}: {}</a><br><p>{}</p></li>",
            escape_html(&self.link),
            self.rank,
            escape_html(&self.title),
            self.summary.to_html()
        )
    }
}

/// Concatenates the list items of `results`; no results give an empty string.
pub fn render_list(results: &[RenderedResult]) -> String {
    results.iter().map(RenderedResult::to_html).collect()
}

/// Drives one search round-trip against a session and reports it to a view.
#[derive(Debug)]
pub struct SearchController<S> {
    session: Arc<SearchSession<S>>,
    executor: QueryExecutor,
    renderer: SnippetRenderer,
}

impl<S: SitemapSource + 'static> SearchController<S> {
    pub const fn new(
        session: Arc<SearchSession<S>>,
        executor: QueryExecutor,
        renderer: SnippetRenderer,
    ) -> Self {
        Self {
            session,
            executor,
            renderer,
        }
    }

    pub const fn session(&self) -> &Arc<SearchSession<S>> {
        &self.session
    }

    /// Runs `form` and reports to `view`: `Working`, then the result list and `Idle`, or
    /// `Failed` with the error message.
    pub async fn submit(
        &self,
        form: &SearchForm,
        view: &mut impl SearchView,
    ) -> Result<Vec<RenderedResult>, SearchError> {
        view.set_state(UiState::Working);

        match self.run(form).await {
            Ok(results) => {
                view.show_results(&render_list(&results));
                view.set_state(UiState::Idle);
                Ok(results)
            }
            Err(e) => {
                tracing::warn!("Search for {:?} failed: {}", form.query, e);
                view.set_state(UiState::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    async fn run(&self, form: &SearchForm) -> Result<Vec<RenderedResult>, SearchError> {
        let corpus = self.session.get_or_build(form.sections.as_deref()).await?;
        let results = self.executor.search(&corpus, &form.query).await?;
        Ok(self.render(&corpus, &results))
    }

    fn render(
        &self,
        corpus: &SiteCorpus,
        results: &[crate::search::SearchResult],
    ) -> Vec<RenderedResult> {
        let mut rendered = Vec::with_capacity(results.len());

        for result in results {
            let Some(document) = corpus.document(&result.reference) else {
                tracing::warn!("No document for result '{}'; skipping", result.reference);
                continue;
            };

            rendered.push(RenderedResult {
                rank: rendered.len() + 1,
                link: document.link.clone(),
                title: document.title.clone(),
                score: result.score,
                summary: self.renderer.summarize(result, document),
            });
        }

        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some("  "), Some(vec!["  ".to_string()]))]
    #[case(Some("wiki"), Some(vec!["wiki".to_string()]))]
    #[case(Some("wiki,posts"), Some(vec!["wiki".to_string(), "posts".to_string()]))]
    fn test_form_from_attributes(
        #[case] attr: Option<&str>,
        #[case] expected: Option<Vec<String>>,
    ) {
        let form = SearchForm::from_attributes("kotlin", attr);
        check!(form.query == "kotlin");
        check!(form.sections == expected);
    }

    #[test]
    fn test_result_item_html() {
        let result = RenderedResult {
            rank: 2,
            link: "/wiki/a&b".to_string(),
            title: "Tips <and> tricks".to_string(),
            score: 1.0,
            summary: Summary::default(),
        };
        check!(
            result.to_html()
                == "<li><a href='/wiki/a&amp;b'>2: Tips &lt;and&gt; tricks</a><br><p><b><i>0 matches:</i></b><br></p></li>"
        );
    }

    #[test]
    fn test_empty_list() {
        check!(render_list(&[]).is_empty());
    }
}
