//! Snippet extraction: highlighted, ellipsis-truncated excerpts around matches.
//!
//! For every matched (term, field) pair of a result, the first few match positions are
//! cut out of the field text together with a fixed amount of context on each side. The
//! highlighted span covers the match plus one trailing character.

use crate::config::SnippetConfig;
use crate::html::escape_html;
use crate::search::{Position, SearchResult};
use crate::sitemap::PageDocument;
use std::fmt;

/// One excerpt around a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    /// Context before the match was cut off.
    pub leading_ellipsis: bool,
    pub before: String,
    pub matched: String,
    pub after: String,
    /// Context after the match was cut off.
    pub trailing_ellipsis: bool,
}

/// Match count and excerpts for one result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Summary {
    pub matches: usize,
    pub snippets: Vec<Snippet>,
}

impl Snippet {
    /// `...before<mark>matched</mark>after...` with the text escaped.
    pub fn to_html(&self) -> String {
        format!(
            "{}{}<mark>{}</mark>{}{}",
            if self.leading_ellipsis { "..." } else { "" },
            escape_html(&self.before),
            escape_html(&self.matched),
            escape_html(&self.after),
            if self.trailing_ellipsis { "..." } else { "" },
        )
    }
}

impl fmt::Display for Snippet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}[{}]{}{}",
            if self.leading_ellipsis { "..." } else { "" },
            self.before,
            self.matched,
            self.after,
            if self.trailing_ellipsis { "..." } else { "" },
        )
    }
}

impl Summary {
    /// `<b><i>N matches:</i></b><br>` followed by the snippets, separated by `<br>`.
    pub fn to_html(&self) -> String {
        let snippets: Vec<String> = self.snippets.iter().map(Snippet::to_html).collect();
        format!("<b><i>{} matches:</i></b><br>{}", self.matches, snippets.join("<br>"))
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} matches:", self.matches)?;
        for snippet in &self.snippets {
            write!(f, "\n  {}", snippet)?;
        }
        Ok(())
    }
}

/// Renders result summaries from match positions and document text.
#[derive(Debug, Clone, Copy)]
pub struct SnippetRenderer {
    leading_context: usize,
    trailing_context: usize,
    max_per_field: usize,
}

impl Default for SnippetRenderer {
    fn default() -> Self {
        Self::new(SnippetConfig::default())
    }
}

impl SnippetRenderer {
    pub const fn new(config: SnippetConfig) -> Self {
        Self {
            leading_context: config.leading_context,
            trailing_context: config.trailing_context,
            max_per_field: config.max_per_field,
        }
    }

    /// Renders the HTML summary of `result` over `document`.
    pub fn render(&self, result: &SearchResult, document: &PageDocument) -> String {
        self.summarize(result, document).to_html()
    }

    /// Counts every match position and excerpts the first few of each (term, field) pair.
    pub fn summarize(&self, result: &SearchResult, document: &PageDocument) -> Summary {
        let mut summary = Summary::default();

        // for every matching term, for every field that has it
        for fields in result.match_data.values() {
            for (&field, positions) in fields {
                summary.matches += positions.len();

                let text = document.field(field);
                summary.snippets.extend(
                    positions
                        .iter()
                        .take(self.max_per_field)
                        .map(|&position| self.snippet(text, position)),
                );
            }
        }

        summary
    }

    /// Cuts the excerpt for one match position out of `text`. Offsets are in chars and
    /// every bound is clamped to the text.
    pub fn snippet(&self, text: &str, position: Position) -> Snippet {
        let len = text.chars().count();

        let match_start = position.start.min(len);
        let match_end = (position.start + position.len + 1).min(len);

        let (window_start, leading_ellipsis) = if match_start > self.leading_context {
            (match_start - self.leading_context, true)
        } else {
            (0, false)
        };

        let (window_end, trailing_ellipsis) = if match_end + self.trailing_context < len {
            (match_end + self.trailing_context, true)
        } else {
            (len, false)
        };

        // Trimming the composed excerpt only ever touches the outer context, never the mark
        Snippet {
            leading_ellipsis,
            before: char_slice(text, window_start, match_start)
                .trim_start()
                .to_string(),
            matched: char_slice(text, match_start, match_end).to_string(),
            after: char_slice(text, match_end, window_end).trim_end().to_string(),
            trailing_ellipsis,
        }
    }
}

/// `text[start..end]` by char offsets; `start <= end <= char count` must hold.
fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let byte_offset = |char_idx: usize| {
        text.char_indices()
            .nth(char_idx)
            .map_or(text.len(), |(byte_idx, _)| byte_idx)
    };
    &text[byte_offset(start)..byte_offset(end)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::MatchData;
    use crate::sitemap::Field;
    use assert2::check;
    use rstest::rstest;
    use std::collections::BTreeMap;

    const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWX";

    fn document(content: &str) -> PageDocument {
        PageDocument {
            link: "/page".to_string(),
            title: "Page title".to_string(),
            description: String::new(),
            content: content.to_string(),
        }
    }

    fn result(match_data: MatchData) -> SearchResult {
        SearchResult {
            reference: "/page".to_string(),
            score: 1.0,
            match_data,
        }
    }

    fn positions(term: &str, field: Field, spans: &[(usize, usize)]) -> MatchData {
        let mut fields = BTreeMap::new();
        fields.insert(
            field,
            spans.iter().map(|&(s, l)| Position::new(s, l)).collect(),
        );
        let mut data = BTreeMap::new();
        data.insert(term.to_string(), fields);
        data
    }

    #[test]
    fn test_zero_matches() {
        let renderer = SnippetRenderer::default();
        let html = renderer.render(&result(MatchData::new()), &document("anything"));
        check!(html == "<b><i>0 matches:</i></b><br>");
    }

    #[test]
    fn test_window_in_middle_of_text() {
        check!(ALPHABET.len() == 50);
        let renderer = SnippetRenderer::default();
        let snippet = renderer.snippet(ALPHABET, Position::new(20, 3));

        check!(snippet.leading_ellipsis);
        check!(snippet.trailing_ellipsis);
        check!(snippet.before == ALPHABET[8..20]);
        check!(snippet.matched == ALPHABET[20..24]);
        check!(snippet.after == ALPHABET[24..36]);
        check!(snippet.to_html() == "...ijklmnopqrst<mark>uvwx</mark>yzABCDEFGHIJ...");
    }

    #[rstest]
    // match near the start: no leading context cut
    #[case(Position::new(2, 3), "ab<mark>cdef</mark>ghijklmnopqr...")]
    // start exactly at the context length is not truncated
    #[case(Position::new(12, 1), "abcdefghijkl<mark>mn</mark>opqrstuvwxyz...")]
    // match near the end: no trailing context cut
    #[case(Position::new(44, 2), "...GHIJKLMNOPQR<mark>STU</mark>VWX")]
    // end exactly at the context length is not truncated
    #[case(Position::new(30, 7), "...stuvwxyzABCD<mark>EFGHIJKL</mark>MNOPQRSTUVWX")]
    fn test_window_boundaries(#[case] position: Position, #[case] expected: &str) {
        let renderer = SnippetRenderer::default();
        check!(renderer.snippet(ALPHABET, position).to_html() == expected);
    }

    #[test]
    fn test_bounds_clamp_on_short_text() {
        let renderer = SnippetRenderer::default();
        let snippet = renderer.snippet("tiny", Position::new(2, 10));
        check!(snippet.to_html() == "ti<mark>ny</mark>");

        // A start past the end clamps before the context check
        let snippet = renderer.snippet("tiny", Position::new(40, 2));
        check!(snippet.to_html() == "tiny<mark></mark>");
    }

    #[test]
    fn test_whitespace_trimmed_around_context() {
        let renderer = SnippetRenderer::default();
        let text = "   start  x  end   ";
        let snippet = renderer.snippet(text, Position::new(10, 0));
        check!(snippet.to_html() == "start  <mark>x</mark>  end");
    }

    #[test]
    fn test_at_most_three_snippets_per_pair() {
        let text = "word ".repeat(10);
        let spans: Vec<_> = (0..10).map(|i| (i * 5, 4)).collect();
        let renderer = SnippetRenderer::default();
        let summary = renderer.summarize(&result(positions("word", Field::Content, &spans)), &document(&text));

        check!(summary.matches == 10);
        check!(summary.snippets.len() == 3);
        check!(summary.to_html().starts_with("<b><i>10 matches:</i></b><br>"));
        check!(summary.to_html().matches("<br>").count() == 3);
    }

    #[test]
    fn test_pairs_across_terms_and_fields() {
        let mut data = positions("page", Field::Title, &[(0, 4)]);
        data.extend(positions("kotlin", Field::Content, &[(0, 6), (11, 6)]));

        let renderer = SnippetRenderer::default();
        let summary = renderer.summarize(&result(data), &document("Kotlin and kotlin"));
        check!(summary.matches == 3);
        check!(summary.snippets.len() == 3);
        // Terms are visited in sorted order
        check!(summary.snippets[0].matched == "Kotlin ");
        check!(summary.snippets[2].matched == "Page ");
    }

    #[test]
    fn test_text_is_escaped() {
        let renderer = SnippetRenderer::default();
        let snippet = renderer.snippet("if a<b then", Position::new(7, 3));
        check!(snippet.to_html() == "if a&lt;b <mark>then</mark>");
    }

    #[test]
    fn test_multibyte_text() {
        let renderer = SnippetRenderer::default();
        let snippet = renderer.snippet("Größe über alles", Position::new(6, 4));
        check!(snippet.matched == "über ");
    }

    #[test]
    fn test_plain_display() {
        let renderer = SnippetRenderer::default();
        let summary = renderer.summarize(
            &result(positions("uvwx", Field::Content, &[(20, 3)])),
            &document(ALPHABET),
        );
        check!(summary.to_string() == "1 matches:\n  ...ijklmnopqrst[uvwx]yzABCDEFGHIJ...");
    }

    #[test]
    fn test_custom_context() {
        let renderer = SnippetRenderer::new(SnippetConfig {
            leading_context: 3,
            trailing_context: 3,
            max_per_field: 1,
        });
        let snippet = renderer.snippet(ALPHABET, Position::new(20, 3));
        check!(snippet.to_html() == "...rst<mark>uvwx</mark>yzA...");
    }
}
