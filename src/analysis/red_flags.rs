use regex::{Regex, RegexBuilder};
use std::collections::HashMap;

use crate::analysis::flag_terms::{self, FlagTerm, FLAG_TERMS};
use crate::models::document::{AcceptanceCriterion, DedDocument};
use crate::models::red_flag::{
    LineRedFlags, QuickCheckFlag, QuickCheckReport, RedFlag, RedFlagSummary, Severity,
};

const MOST_COMMON_TERMS: usize = 5;

/// Dictionary matcher for ambiguous requirement language.
pub struct RiskAnalyzer {
    patterns: Vec<(&'static FlagTerm, Regex)>,
}

impl Default for RiskAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskAnalyzer {
    pub fn new() -> Self {
        let patterns = FLAG_TERMS
            .iter()
            .filter_map(|entry| {
                let pattern = format!(r"\b{}\b", regex::escape(entry.term));
                match RegexBuilder::new(&pattern).case_insensitive(true).build() {
                    Ok(regex) => Some((entry, regex)),
                    Err(e) => {
                        log::warn!("Skipping red flag term '{}': {e}", entry.term);
                        None
                    }
                }
            })
            .collect();

        Self { patterns }
    }

    /// Every acceptance criterion in the document, critical findings first.
    pub fn analyze(&self, document: &DedDocument) -> Vec<RedFlag> {
        let mut red_flags: Vec<RedFlag> = document
            .all_acceptance_criteria()
            .flat_map(|ac| self.analyze_criterion(ac))
            .collect();

        // Stable: document order is kept within a severity.
        red_flags.sort_by_key(|rf| rf.severity);
        log::debug!(
            "Red flag scan of '{}' produced {} findings",
            document.filename,
            red_flags.len()
        );
        red_flags
    }

    /// One finding per matching dictionary term; overlapping terms each match.
    pub fn analyze_criterion(&self, ac: &AcceptanceCriterion) -> Vec<RedFlag> {
        self.matching_terms(&ac.text)
            .map(|entry| RedFlag {
                criterion: ac.clone(),
                flagged_term: entry.term.to_string(),
                category: entry.category.to_string(),
                severity: entry.severity,
                suggested_metric: entry.suggestion.to_string(),
                negotiation_script: entry.negotiation.to_string(),
            })
            .collect()
    }

    pub fn analyze_text(&self, text: &str) -> Vec<&'static FlagTerm> {
        self.matching_terms(text).collect()
    }

    /// Line-by-line scan of free text. Line numbers are 1-based.
    pub fn quick_check(&self, text: &str) -> QuickCheckReport {
        let mut report = QuickCheckReport::default();

        for (index, line) in text.lines().enumerate() {
            let flags: Vec<QuickCheckFlag> = self
                .matching_terms(line)
                .map(|entry| QuickCheckFlag {
                    term: entry.term.to_string(),
                    category: entry.category.to_string(),
                    severity: entry.severity,
                    suggested_metric: entry.suggestion.to_string(),
                    negotiation_script: entry.negotiation.to_string(),
                })
                .collect();

            if flags.is_empty() {
                continue;
            }

            for flag in &flags {
                match flag.severity {
                    Severity::Critical => report.critical += 1,
                    Severity::Moderate => report.moderate += 1,
                    Severity::Low => report.low += 1,
                }
            }
            report.total += flags.len();
            report.lines.push(LineRedFlags {
                line_number: index + 1,
                line: truncate_line(line.trim(), 200),
                flags,
            });
        }

        report
    }

    pub fn suggestion(&self, term: &str) -> String {
        match flag_terms::lookup(term) {
            Some(entry) => entry.suggestion.to_string(),
            None => format!("specific measurable criteria for '{term}'"),
        }
    }

    pub fn negotiation_script(&self, term: &str) -> String {
        match flag_terms::lookup(term) {
            Some(entry) => entry.negotiation.to_string(),
            None => format!("Can we define specific, measurable criteria for '{term}'?"),
        }
    }

    pub fn summary(&self, red_flags: &[RedFlag]) -> RedFlagSummary {
        let mut summary = RedFlagSummary {
            total: red_flags.len(),
            ..RedFlagSummary::default()
        };
        let mut term_counts: HashMap<&str, usize> = HashMap::new();

        for rf in red_flags {
            match rf.severity {
                Severity::Critical => summary.critical += 1,
                Severity::Moderate => summary.moderate += 1,
                Severity::Low => summary.low += 1,
            }
            *summary.categories.entry(rf.category.clone()).or_insert(0) += 1;
            *term_counts.entry(rf.flagged_term.as_str()).or_insert(0) += 1;
        }

        let mut terms: Vec<(String, usize)> = term_counts
            .into_iter()
            .map(|(term, count)| (term.to_string(), count))
            .collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        terms.truncate(MOST_COMMON_TERMS);
        summary.most_common_terms = terms;

        summary
    }

    fn matching_terms<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'static FlagTerm> + 'a {
        self.patterns
            .iter()
            .filter(move |(_, regex)| regex.is_match(text))
            .map(|(entry, _)| *entry)
    }
}

fn truncate_line(line: &str, max_chars: usize) -> String {
    line.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{Epic, Story};

    fn criterion(id: &str, text: &str) -> AcceptanceCriterion {
        AcceptanceCriterion {
            id: id.to_string(),
            text: text.to_string(),
            story_id: Some("S1".to_string()),
            epic_id: Some("E1".to_string()),
        }
    }

    fn document(criteria: Vec<AcceptanceCriterion>) -> DedDocument {
        DedDocument {
            filename: "ded.docx".to_string(),
            epics: vec![Epic {
                id: "E1".to_string(),
                name: "Checkout".to_string(),
                description: String::new(),
                stories: vec![Story {
                    id: "S1".to_string(),
                    name: "Pay by card".to_string(),
                    description: String::new(),
                    epic_id: Some("E1".to_string()),
                    acceptance_criteria: criteria,
                    tasks: Vec::new(),
                }],
            }],
            raw_text: String::new(),
        }
    }

    #[test]
    fn matches_whole_words_case_insensitively() {
        let analyzer = RiskAnalyzer::new();
        let flags = analyzer.analyze_criterion(&criterion("AC1", "The page must be FAST."));
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].flagged_term, "fast");
        assert_eq!(flags[0].severity, Severity::Critical);
        assert_eq!(flags[0].criterion.story_id.as_deref(), Some("S1"));
    }

    #[test]
    fn does_not_match_inside_longer_words() {
        let analyzer = RiskAnalyzer::new();
        assert!(analyzer
            .analyze_criterion(&criterion("AC1", "Breakfast menu lists every item"))
            .is_empty());
    }

    #[test]
    fn single_line_yields_several_findings() {
        let analyzer = RiskAnalyzer::new();
        let flags =
            analyzer.analyze_criterion(&criterion("AC1", "Search should be fast and scalable"));
        let terms: Vec<&str> = flags.iter().map(|f| f.flagged_term.as_str()).collect();
        assert_eq!(terms, vec!["fast", "scalable", "should"]);
    }

    #[test]
    fn overlapping_terms_are_not_deduplicated() {
        let analyzer = RiskAnalyzer::new();
        // "fast" is a prefix of "faster" and matches through "fast-loading".
        // Both terms are reported.
        let flags = analyzer.analyze_criterion(&criterion(
            "AC1",
            "Pages must be fast-loading and faster than before",
        ));
        let terms: Vec<&str> = flags.iter().map(|f| f.flagged_term.as_str()).collect();
        assert_eq!(terms, vec!["fast", "faster"]);

        let quick: Vec<&str> = analyzer
            .analyze_text("Quickly answer quick questions")
            .iter()
            .map(|t| t.term)
            .collect();
        assert_eq!(quick, vec!["quick", "quickly"]);
    }

    #[test]
    fn document_findings_are_sorted_critical_first() {
        let analyzer = RiskAnalyzer::new();
        let doc = document(vec![
            criterion("AC1", "Show a few results"),
            criterion("AC2", "Output should look good"),
            criterion("AC3", "Dashboard is intuitive"),
        ]);

        let flags = analyzer.analyze(&doc);
        let severities: Vec<Severity> = flags.iter().map(|f| f.severity).collect();
        let mut sorted = severities.clone();
        sorted.sort();
        assert_eq!(severities, sorted);
        assert_eq!(flags.first().map(|f| f.flagged_term.as_str()), Some("intuitive"));
        assert_eq!(flags.last().map(|f| f.flagged_term.as_str()), Some("few"));
    }

    #[test]
    fn empty_document_yields_no_flags() {
        let analyzer = RiskAnalyzer::new();
        assert!(analyzer.analyze(&DedDocument::default()).is_empty());
    }

    #[test]
    fn quick_check_reports_line_numbers() {
        let analyzer = RiskAnalyzer::new();
        let report = analyzer.quick_check("Exact totals\nResults appear immediately\n\nUI is simple");
        let numbers: Vec<usize> = report.lines.iter().map(|l| l.line_number).collect();
        assert_eq!(numbers, vec![2, 4]);
        assert_eq!(report.total, 2);
        assert_eq!(report.moderate, 2);
    }

    #[test]
    fn summary_counts_severity_and_terms() {
        let analyzer = RiskAnalyzer::new();
        let doc = document(vec![
            criterion("AC1", "It should be fast"),
            criterion("AC2", "It should be secure"),
        ]);
        let flags = analyzer.analyze(&doc);
        let summary = analyzer.summary(&flags);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.critical, 2);
        assert_eq!(summary.moderate, 2);
        assert_eq!(summary.categories.get("Uncertain Requirement"), Some(&2));
        assert_eq!(summary.most_common_terms[0], ("should".to_string(), 2));
    }

    #[test]
    fn fallbacks_for_unknown_terms() {
        let analyzer = RiskAnalyzer::new();
        assert_eq!(analyzer.suggestion("Secure"), "passes OWASP Top 10 scan with 0 critical/high findings");
        assert!(analyzer.suggestion("blazing").contains("'blazing'"));
        assert!(analyzer.negotiation_script("blazing").contains("'blazing'"));
    }
}
