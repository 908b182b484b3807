//! Context block formatting.
//!
//! Turns a ranked set of insight records into a single bounded text block
//! for the system prompt. Formatting is pure and deterministic: the same
//! ranked set always yields byte-identical output.

use crate::config::TruncationLimits;
use crate::insights::InsightRecord;

/// Opening delimiter of the evidence region.
pub const CONTEXT_OPEN: &str = "=== INSIGHTS BEGIN ===";
/// Closing delimiter of the evidence region.
pub const CONTEXT_CLOSE: &str = "=== INSIGHTS END ===";

/// Marker appended to a field value that was cut at its limit.
const TRUNCATION_MARKER: char = '…';

/// Format ranked insights into a context block.
///
/// Returns the empty string for an empty set — no header, no delimiters.
/// Rank order is preserved; each record contributes a bounded number of
/// characters regardless of the match limit.
pub fn format_context(
    records: &[InsightRecord],
    limits: &TruncationLimits,
    instruction: &str,
) -> String {
    if records.is_empty() {
        return String::new();
    }

    let body = records
        .iter()
        .enumerate()
        .map(|(idx, record)| format_record(idx + 1, record, limits))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "{}\n\n{}\n{}\n{}\n\n",
        instruction, CONTEXT_OPEN, body, CONTEXT_CLOSE
    )
}

fn format_record(rank: usize, record: &InsightRecord, limits: &TruncationLimits) -> String {
    let tags: Vec<&str> = [
        record.primary_tag.as_deref(),
        record.secondary_tag.as_deref(),
        record.tertiary_tag.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|t| !t.trim().is_empty())
    .collect();

    // A similarity that arrived malformed was already defaulted to 0.0;
    // guard the formatter against NaN from local adapters all the same.
    let similarity = if record.similarity.is_finite() {
        record.similarity
    } else {
        0.0
    };

    let mut lines = vec![format!(
        "#{} [{}] id={} sim={:.3}",
        rank,
        tags.join(" / "),
        record.id,
        similarity
    )];

    let fields: [(&str, Option<&str>, usize); 6] = [
        ("Problem", Some(record.problem_statement.as_str()), limits.problem),
        ("Solution", record.solution_given.as_deref(), limits.solution),
        ("Steps", record.implementation_steps.as_deref(), limits.steps),
        ("Impact", record.financial_impact.as_deref(), limits.impact),
        ("Quote", record.power_quote.as_deref(), limits.quote),
        ("Context", record.business_context.as_deref(), limits.business_context),
    ];

    for (label, value, limit) in fields {
        if let Some(value) = value {
            let trimmed = truncate_field(value, limit);
            if !trimmed.is_empty() {
                lines.push(format!("{}: {}", label, trimmed));
            }
        }
    }

    if let Some(priority) = record.priority_level.as_deref() {
        if !priority.trim().is_empty() {
            lines.push(format!("Priority: {}", priority.trim()));
        }
    }

    lines.join("\n")
}

/// Truncate a field value to `limit` characters, appending a marker when cut.
///
/// Counts characters, not bytes, so the cut never splits a multi-byte
/// character boundary.
fn truncate_field(value: &str, limit: usize) -> String {
    let trimmed = value.trim();
    if trimmed.chars().count() <= limit {
        trimmed.to_string()
    } else {
        let mut cut: String = trimmed.chars().take(limit).collect();
        cut.push(TRUNCATION_MARKER);
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, similarity: f64, problem: &str) -> InsightRecord {
        InsightRecord {
            id,
            similarity,
            primary_tag: None,
            secondary_tag: None,
            tertiary_tag: None,
            problem_statement: problem.to_string(),
            solution_given: None,
            implementation_steps: None,
            financial_impact: None,
            power_quote: None,
            business_context: None,
            priority_level: None,
        }
    }

    fn limits() -> TruncationLimits {
        TruncationLimits::default()
    }

    const INSTRUCTION: &str = "Use the insights below as primary evidence.";

    #[test]
    fn test_empty_set_yields_empty_string() {
        assert_eq!(format_context(&[], &limits(), INSTRUCTION), "");
    }

    #[test]
    fn test_sales_scenario() {
        let mut r = record(1, 0.91, "Low close rate");
        r.primary_tag = Some("Sales".to_string());
        r.solution_given = Some("Script follow-ups".to_string());

        let block = format_context(&[r], &limits(), INSTRUCTION);
        assert!(block.contains("Sales"));
        assert!(block.contains("id=1"));
        assert!(block.contains("sim=0.910"));
        assert!(block.contains("Problem: Low close rate"));
        assert!(block.contains("Solution: Script follow-ups"));
        assert!(!block.contains("Steps:"));
        assert!(block.contains(CONTEXT_OPEN));
        assert!(block.contains(CONTEXT_CLOSE));
        assert!(block.starts_with(INSTRUCTION));
    }

    #[test]
    fn test_one_header_per_record_in_rank_order() {
        let records = vec![
            record(10, 0.9, "first"),
            record(20, 0.8, "second"),
            record(30, 0.7, "third"),
        ];
        let block = format_context(&records, &limits(), INSTRUCTION);

        let headers: Vec<&str> = block
            .lines()
            .filter(|l| l.starts_with('#'))
            .collect();
        assert_eq!(headers.len(), 3);
        assert!(headers[0].starts_with("#1 ") && headers[0].contains("id=10"));
        assert!(headers[1].starts_with("#2 ") && headers[1].contains("id=20"));
        assert!(headers[2].starts_with("#3 ") && headers[2].contains("id=30"));
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let mut r = record(1, 0.5, "problem");
        r.power_quote = Some("a quote".to_string());
        let records = vec![r];

        let first = format_context(&records, &limits(), INSTRUCTION);
        let second = format_context(&records, &limits(), INSTRUCTION);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_optional_fields_are_omitted() {
        let mut r = record(1, 0.5, "problem");
        r.solution_given = Some(String::new());
        r.implementation_steps = Some("   ".to_string());
        r.priority_level = Some("".to_string());

        let block = format_context(&[r], &limits(), INSTRUCTION);
        assert!(!block.contains("Solution:"));
        assert!(!block.contains("Steps:"));
        assert!(!block.contains("Priority:"));
    }

    #[test]
    fn test_truncation_is_exact_and_marked() {
        let mut custom = limits();
        custom.solution = 10;
        let mut r = record(1, 0.5, "problem");
        r.solution_given = Some("abcdefghijKLMNOP".to_string());

        let block = format_context(&[r], &custom, INSTRUCTION);
        let line = block
            .lines()
            .find(|l| l.starts_with("Solution: "))
            .unwrap();
        let value = line.strip_prefix("Solution: ").unwrap();
        assert_eq!(value, "abcdefghij…");
        assert_eq!(value.chars().count(), 11);
    }

    #[test]
    fn test_truncation_respects_multibyte_boundaries() {
        let mut custom = limits();
        custom.quote = 4;
        let mut r = record(1, 0.5, "problem");
        r.power_quote = Some("æøåæøåæøå".to_string());

        let block = format_context(&[r], &custom, INSTRUCTION);
        let line = block.lines().find(|l| l.starts_with("Quote: ")).unwrap();
        assert_eq!(line.strip_prefix("Quote: ").unwrap(), "æøåæ…");
    }

    #[test]
    fn test_short_value_is_not_marked() {
        let mut r = record(1, 0.5, "short");
        let block = format_context(&[r.clone()], &limits(), INSTRUCTION);
        assert!(block.contains("Problem: short"));
        assert!(!block.contains("short…"));

        // Exactly at the limit: no marker either.
        let mut custom = limits();
        custom.problem = 5;
        r.problem_statement = "exact".to_string();
        let block = format_context(&[r], &custom, INSTRUCTION);
        assert!(block.contains("Problem: exact"));
        assert!(!block.contains('…'));
    }

    #[test]
    fn test_tags_joined_in_header() {
        let mut r = record(4, 0.42, "problem");
        r.primary_tag = Some("Sales".to_string());
        r.tertiary_tag = Some("Pricing".to_string());

        let block = format_context(&[r], &limits(), INSTRUCTION);
        assert!(block.contains("#1 [Sales / Pricing] id=4 sim=0.420"));
    }

    #[test]
    fn test_nan_similarity_formats_as_zero() {
        let r = record(9, f64::NAN, "problem");
        let block = format_context(&[r], &limits(), INSTRUCTION);
        assert!(block.contains("sim=0.000"));
    }

    #[test]
    fn test_priority_is_rendered_untruncated() {
        let mut r = record(1, 0.5, "problem");
        r.priority_level = Some("critical".to_string());
        let block = format_context(&[r], &limits(), INSTRUCTION);
        assert!(block.contains("Priority: critical"));
    }
}
