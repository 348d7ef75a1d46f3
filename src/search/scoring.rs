//! TF-IDF scoring for term postings.

use crate::sitemap::Field;

/// Relative importance of a match in each field. Titles weigh double, like item names do
/// in API docs.
pub(crate) const fn field_weight(field: Field) -> f32 {
    match field {
        Field::Title => 2.0,
        Field::Description | Field::Content => 1.0,
    }
}

/// Smoothed inverse document frequency, always positive so that a term present in every
/// document still contributes to ranking.
pub(crate) fn inverse_document_frequency(total_docs: usize, doc_freq: usize) -> f32 {
    let n = total_docs as f32;
    let df = doc_freq as f32;
    (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
}

/// Term-frequency component for `count` occurrences in a field of `field_len` terms.
///
/// TF is normalized by field length relative to the corpus average, then dampened
/// logarithmically.
pub(crate) fn term_frequency(count: usize, field_len: usize, avg_field_len: f32, field: Field) -> f32 {
    let length_norm = (field_len as f32 / avg_field_len.max(1.0)).max(0.5); // Clamp to prevent over-penalization
    let tf = count as f32 * field_weight(field) / length_norm;
    1.0 + tf.ln_1p()
}
