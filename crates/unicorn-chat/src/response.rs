//! Renders resolved results into user-facing answers.

use std::fmt::Write;

use unicorn_core::{CompanyRecord, Tier};

use crate::types::{Answer, ResultSet};

const NOT_AVAILABLE: &str = "n/a";

#[derive(Debug, Clone)]
pub struct ResponseFormatter {
    /// Companies rendered per answer; the rest are counted.
    pub display_limit: usize,
}

impl ResponseFormatter {
    pub fn new(display_limit: usize) -> Self {
        Self { display_limit }
    }

    /// Compose the answer for a resolved turn.
    ///
    /// `from_context` selects drill-down wording: results that narrow the
    /// previous answer are listed by name only.
    pub fn compose(&self, tier: Tier, from_context: bool, results: ResultSet) -> Answer {
        let text = if results.is_empty() {
            if from_context {
                "None of the previously listed companies match that criterion.".to_string()
            } else {
                "I couldn't find any companies matching that description in the dataset."
                    .to_string()
            }
        } else if from_context {
            self.drill_down(&results)
        } else {
            self.listing(&results)
        };
        let suggestions = self.suggestions(tier, &results);
        Answer {
            text,
            tier,
            results,
            suggestions,
        }
    }

    fn listing(&self, results: &ResultSet) -> String {
        let mut out = String::from("Here is the information I found:\n\nFound the following companies:\n");
        for record in results.iter().take(self.display_limit) {
            write_record(&mut out, record);
        }
        let omitted = results.len().saturating_sub(self.display_limit);
        if omitted > 0 {
            let _ = writeln!(out, "...and {} more.\n", omitted);
        }
        out.push_str("Would you like to know more about any of these?");
        out
    }

    fn drill_down(&self, results: &ResultSet) -> String {
        let names = results.names();
        let shown = names.iter().take(self.display_limit).copied().collect::<Vec<_>>();
        let omitted = names.len() - shown.len();
        let mut out = format!(
            "Based on your previous query, the companies matching your criteria are: {}",
            shown.join(", ")
        );
        if omitted > 0 {
            let _ = write!(out, " (and {} more)", omitted);
        }
        out.push('.');
        out
    }

    fn suggestions(&self, tier: Tier, results: &ResultSet) -> Vec<String> {
        if results.is_empty() {
            return vec![
                "Try a sector such as Fintech, Logistics or E-commerce".to_string(),
                "Ask about a specific company by name".to_string(),
            ];
        }
        let mut out = Vec::new();
        if tier != Tier::Entity || results.len() > 1 {
            out.push("Which of these are based in Bangalore?".to_string());
            out.push("Which of these have a high valuation?".to_string());
        }
        if let Some(first) = results.iter().next() {
            if tier != Tier::Entity {
                out.push(format!("Tell me more about {}", first.name));
            }
        }
        if tier == Tier::Entity {
            out.push("Tell me about fintech companies".to_string());
            out.push("Compare it with another company by name".to_string());
        }
        out.truncate(4);
        out
    }
}

fn write_record(out: &mut String, record: &CompanyRecord) {
    let _ = writeln!(out, "- Name: {}", record.name);
    let _ = writeln!(
        out,
        "  Description: {}",
        record.description.as_deref().unwrap_or(NOT_AVAILABLE)
    );
    let _ = writeln!(
        out,
        "  Sector: {}",
        record.sector.as_deref().unwrap_or(NOT_AVAILABLE)
    );
    let _ = writeln!(
        out,
        "  Location: {}",
        record.location.as_deref().unwrap_or(NOT_AVAILABLE)
    );
    let _ = writeln!(out, "  Valuation: {}\n", valuation_label(record));
}

fn valuation_label(record: &CompanyRecord) -> String {
    match (&record.valuation_text, record.valuation) {
        (Some(text), _) => text.clone(),
        (None, Some(billions)) => format!("${}B", billions),
        (None, None) => NOT_AVAILABLE.to_string(),
    }
}
