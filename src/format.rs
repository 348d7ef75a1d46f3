//! Plain-text rendering of search results for the terminal.

use crate::controller::RenderedResult;
use std::fmt::Write as _;

/// Formats ranked results with a relevance percentage relative to the best hit.
pub fn format_results(results: &[RenderedResult], query: &str, site: &str) -> String {
    if results.is_empty() {
        let mut msg = format!("No results found for '{}' in {}.\n\n", query, site);
        msg.push_str("Search tips:\n");
        msg.push_str("• Try a shorter or more general term\n");
        msg.push_str("• Search uses stemming: 'installing' matches 'install'\n");
        msg.push_str("• Use a trailing '*' for prefixes ('kot*') or '~1' for typos\n");
        msg.push_str("• Restrict to one field with 'title:', 'description:' or 'content:'\n");
        return msg;
    }

    let mut output = format!("Search results for '{}' in {}:\n\n", query, site);
    let max_score = results.first().map_or(1.0, |r| r.score);

    for result in results {
        let relevance = if max_score > 0.0 {
            ((result.score / max_score) * 100.0).round() as u8
        } else {
            100
        };

        let _ = writeln!(
            output,
            "{}. {} ({}) - relevance: {}%",
            result.rank, result.title, result.link, relevance
        );
        for line in result.summary.to_string().lines() {
            let _ = writeln!(output, "   {}", line);
        }
        output.push('\n');
    }

    output
}
