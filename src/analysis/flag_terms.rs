use crate::models::red_flag::Severity;

/// One entry of the ambiguous-language dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagTerm {
    pub term: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    /// Measurable replacement template; `{X}` marks values to agree on.
    pub suggestion: &'static str,
    pub negotiation: &'static str,
}

/// Matched case-insensitively as whole words. Order is the order findings are
/// emitted for a single criterion.
pub const FLAG_TERMS: &[FlagTerm] = &[
    FlagTerm {
        term: "fast",
        category: "Subjective Term",
        severity: Severity::Critical,
        suggestion: "responds in <{X} seconds at 95th percentile",
        negotiation: "To ensure we're aligned on performance expectations, can we define 'fast' as a specific response time? For example, '<2 seconds at 95th percentile'?",
    },
    FlagTerm {
        term: "quick",
        category: "Subjective Term",
        severity: Severity::Critical,
        suggestion: "completes in <{X} seconds",
        negotiation: "What specific time threshold defines 'quick' for this feature?",
    },
    FlagTerm {
        term: "user-friendly",
        category: "Subjective Term",
        severity: Severity::Critical,
        suggestion: "requires <={X} clicks to complete primary action",
        negotiation: "Can we define 'user-friendly' in measurable terms? For example, 'users can complete the action in 3 clicks or fewer'?",
    },
    FlagTerm {
        term: "intuitive",
        category: "Subjective Term",
        severity: Severity::Critical,
        suggestion: "{X}% of users complete task without help on first attempt",
        negotiation: "How should we measure 'intuitive'? Perhaps through usability testing with a success rate threshold?",
    },
    FlagTerm {
        term: "simple",
        category: "Subjective Term",
        severity: Severity::Moderate,
        suggestion: "requires no more than {X} steps",
        negotiation: "What makes something 'simple' in this context? Can we specify the maximum number of steps?",
    },
    FlagTerm {
        term: "easy",
        category: "Subjective Term",
        severity: Severity::Moderate,
        suggestion: "achievable in <{X} minutes by target user",
        negotiation: "Can we quantify 'easy'? For instance, 'new users complete the task in under 5 minutes'?",
    },
    FlagTerm {
        term: "robust",
        category: "Subjective Term",
        severity: Severity::Critical,
        suggestion: "handles {X} error scenarios gracefully without data loss",
        negotiation: "What specific error conditions should the system handle to be considered 'robust'?",
    },
    FlagTerm {
        term: "efficient",
        category: "Subjective Term",
        severity: Severity::Moderate,
        suggestion: "uses <{X}MB memory and <{Y}% CPU",
        negotiation: "What resource constraints define 'efficient' for this feature?",
    },
    FlagTerm {
        term: "responsive",
        category: "Subjective Term",
        severity: Severity::Critical,
        suggestion: "UI responds to input within {X}ms",
        negotiation: "What response time threshold makes the UI 'responsive'? Industry standard is often 100ms.",
    },
    FlagTerm {
        term: "clean",
        category: "Subjective Term",
        severity: Severity::Low,
        suggestion: "follows {coding standard} with 0 linting errors",
        negotiation: "What coding standards or style guides define 'clean' code for this project?",
    },
    FlagTerm {
        term: "elegant",
        category: "Subjective Term",
        severity: Severity::Low,
        suggestion: "implements using {X} or fewer components/functions",
        negotiation: "Can we define measurable criteria for 'elegant' implementation?",
    },
    FlagTerm {
        term: "high quality",
        category: "Vague Metric",
        severity: Severity::Critical,
        suggestion: "passes all unit tests with >={X}% coverage",
        negotiation: "What specific quality metrics should we target? Test coverage, code review approval, etc.?",
    },
    FlagTerm {
        term: "performant",
        category: "Vague Metric",
        severity: Severity::Critical,
        suggestion: "handles {X} requests/second with <{Y}ms latency",
        negotiation: "What performance benchmarks define 'performant'? Let's specify throughput and latency targets.",
    },
    FlagTerm {
        term: "scalable",
        category: "Vague Metric",
        severity: Severity::Critical,
        suggestion: "supports {X} concurrent users with <{Y}% latency degradation",
        negotiation: "To what scale should the system handle? Let's define user counts and acceptable degradation.",
    },
    FlagTerm {
        term: "secure",
        category: "Vague Metric",
        severity: Severity::Critical,
        suggestion: "passes OWASP Top 10 scan with 0 critical/high findings",
        negotiation: "What security standards should we meet? OWASP Top 10, SOC2 compliance, specific penetration test criteria?",
    },
    FlagTerm {
        term: "reliable",
        category: "Vague Metric",
        severity: Severity::Critical,
        suggestion: "achieves {X}% uptime over {Y} period",
        negotiation: "What uptime/availability target defines 'reliable'? 99.9%, 99.99%?",
    },
    FlagTerm {
        term: "stable",
        category: "Vague Metric",
        severity: Severity::Moderate,
        suggestion: "runs for {X} hours without crashes or memory leaks",
        negotiation: "What stability criteria should we test against? Runtime duration, error rates?",
    },
    FlagTerm {
        term: "maintainable",
        category: "Vague Metric",
        severity: Severity::Moderate,
        suggestion: "code complexity score <{X}, documentation coverage >={Y}%",
        negotiation: "How do we measure 'maintainable'? Cyclomatic complexity, documentation requirements?",
    },
    FlagTerm {
        term: "accessible",
        category: "Vague Metric",
        severity: Severity::Critical,
        suggestion: "meets WCAG {X} Level {Y} compliance",
        negotiation: "What accessibility standard should we target? WCAG 2.1 Level AA is common.",
    },
    FlagTerm {
        term: "works well",
        category: "Missing Criteria",
        severity: Severity::Critical,
        suggestion: "passes acceptance test suite with {X}% pass rate",
        negotiation: "What specific functionality defines 'works well'? Let's enumerate the test scenarios.",
    },
    FlagTerm {
        term: "looks good",
        category: "Missing Criteria",
        severity: Severity::Moderate,
        suggestion: "matches approved design mockups with <{X}px deviation",
        negotiation: "Are there design mockups or style guides that define 'looks good'?",
    },
    FlagTerm {
        term: "feels right",
        category: "Missing Criteria",
        severity: Severity::Moderate,
        suggestion: "receives >={X}/5 rating in user testing",
        negotiation: "Can we define 'feels right' through user testing with specific satisfaction metrics?",
    },
    FlagTerm {
        term: "appropriate",
        category: "Missing Criteria",
        severity: Severity::Moderate,
        suggestion: "meets criteria defined in {specification document}",
        negotiation: "What makes something 'appropriate' here? Can we reference specific requirements?",
    },
    FlagTerm {
        term: "reasonable",
        category: "Missing Criteria",
        severity: Severity::Low,
        suggestion: "within {X}% of baseline/benchmark",
        negotiation: "What benchmark or baseline defines 'reasonable'?",
    },
    FlagTerm {
        term: "comprehensive",
        category: "Undefined Scope",
        severity: Severity::Critical,
        suggestion: "covers scenarios {A}, {B}, {C} as defined in test matrix",
        negotiation: "Can we enumerate what 'comprehensive' includes? Let's create a test matrix.",
    },
    FlagTerm {
        term: "complete",
        category: "Undefined Scope",
        severity: Severity::Critical,
        suggestion: "implements all items in {requirements list}",
        negotiation: "What checklist defines 'complete'? Let's document the full scope.",
    },
    FlagTerm {
        term: "all edge cases",
        category: "Undefined Scope",
        severity: Severity::Critical,
        suggestion: "handles edge cases {1}, {2}, {3} as documented",
        negotiation: "Which edge cases should be handled? Let's document them explicitly.",
    },
    FlagTerm {
        term: "all scenarios",
        category: "Undefined Scope",
        severity: Severity::Critical,
        suggestion: "supports scenarios defined in {use case document}",
        negotiation: "Can we enumerate 'all scenarios'? An exhaustive list prevents scope creep.",
    },
    FlagTerm {
        term: "full support",
        category: "Undefined Scope",
        severity: Severity::Critical,
        suggestion: "supports features {X}, {Y}, {Z}",
        negotiation: "What features constitute 'full support'? Let's list them.",
    },
    FlagTerm {
        term: "etc",
        category: "Undefined Scope",
        severity: Severity::Critical,
        suggestion: "specifically: {enumerate remaining items}",
        negotiation: "Can we replace 'etc' with an explicit list of items?",
    },
    FlagTerm {
        term: "and more",
        category: "Undefined Scope",
        severity: Severity::Critical,
        suggestion: "specifically: {enumerate additional items}",
        negotiation: "What does 'and more' include? Let's document it explicitly.",
    },
    FlagTerm {
        term: "better",
        category: "Comparative Term",
        severity: Severity::Moderate,
        suggestion: "{X}% improvement over baseline of {Y}",
        negotiation: "Better than what baseline? By what metric and how much?",
    },
    FlagTerm {
        term: "improved",
        category: "Comparative Term",
        severity: Severity::Moderate,
        suggestion: "achieves {X}% improvement in {metric}",
        negotiation: "What's the baseline for comparison and target improvement percentage?",
    },
    FlagTerm {
        term: "enhanced",
        category: "Comparative Term",
        severity: Severity::Moderate,
        suggestion: "adds capabilities {A}, {B}, {C}",
        negotiation: "What specific enhancements are included? Let's enumerate them.",
    },
    FlagTerm {
        term: "optimized",
        category: "Comparative Term",
        severity: Severity::Moderate,
        suggestion: "reduces {metric} by {X}% from current {Y}",
        negotiation: "Optimized for what metric? What's the current baseline and target?",
    },
    FlagTerm {
        term: "faster",
        category: "Comparative Term",
        severity: Severity::Moderate,
        suggestion: "{X}% faster than current {Y}ms",
        negotiation: "Faster by how much compared to what baseline?",
    },
    FlagTerm {
        term: "newer",
        category: "Comparative Term",
        severity: Severity::Low,
        suggestion: "uses version {X} or later",
        negotiation: "What specific version or date defines 'newer'?",
    },
    FlagTerm {
        term: "soon",
        category: "Time Ambiguity",
        severity: Severity::Moderate,
        suggestion: "within {X} seconds/minutes/days",
        negotiation: "What specific timeframe defines 'soon'?",
    },
    FlagTerm {
        term: "quickly",
        category: "Time Ambiguity",
        severity: Severity::Moderate,
        suggestion: "within {X} seconds",
        negotiation: "How quickly? Let's specify seconds or milliseconds.",
    },
    FlagTerm {
        term: "real-time",
        category: "Time Ambiguity",
        severity: Severity::Critical,
        suggestion: "updates within {X}ms of data change",
        negotiation: "'Real-time' means different things in different contexts. What latency is acceptable?",
    },
    FlagTerm {
        term: "immediately",
        category: "Time Ambiguity",
        severity: Severity::Moderate,
        suggestion: "within {X}ms",
        negotiation: "What response time qualifies as 'immediate'?",
    },
    FlagTerm {
        term: "many",
        category: "Quantity Ambiguity",
        severity: Severity::Moderate,
        suggestion: "at least {X}",
        negotiation: "Can we specify the minimum number instead of 'many'?",
    },
    FlagTerm {
        term: "few",
        category: "Quantity Ambiguity",
        severity: Severity::Low,
        suggestion: "no more than {X}",
        negotiation: "What's the maximum that qualifies as 'few'?",
    },
    FlagTerm {
        term: "several",
        category: "Quantity Ambiguity",
        severity: Severity::Low,
        suggestion: "{X} to {Y}",
        negotiation: "Can we specify the exact range instead of 'several'?",
    },
    FlagTerm {
        term: "most",
        category: "Quantity Ambiguity",
        severity: Severity::Moderate,
        suggestion: ">={X}%",
        negotiation: "What percentage defines 'most'? 51%? 80%? 95%?",
    },
    FlagTerm {
        term: "some",
        category: "Quantity Ambiguity",
        severity: Severity::Low,
        suggestion: "at least {X}",
        negotiation: "How many is 'some'? Let's specify a minimum.",
    },
    FlagTerm {
        term: "should",
        category: "Uncertain Requirement",
        severity: Severity::Moderate,
        suggestion: "must {specific behavior}",
        negotiation: "Is this a firm requirement? Can we change 'should' to 'must' with specific criteria?",
    },
    FlagTerm {
        term: "might",
        category: "Uncertain Requirement",
        severity: Severity::Moderate,
        suggestion: "{will/will not} {specific behavior}",
        negotiation: "Is this in scope? Let's clarify if this is a requirement or not.",
    },
    FlagTerm {
        term: "could",
        category: "Uncertain Requirement",
        severity: Severity::Moderate,
        suggestion: "{must/must not} {specific behavior}",
        negotiation: "Is this optional or required? Let's clarify the scope.",
    },
    FlagTerm {
        term: "may",
        category: "Uncertain Requirement",
        severity: Severity::Moderate,
        suggestion: "{must/must not} {specific behavior}",
        negotiation: "Is this a requirement or a permission? Let's clarify.",
    },
];

pub fn lookup(term: &str) -> Option<&'static FlagTerm> {
    let lowered = term.to_lowercase();
    FLAG_TERMS.iter().find(|t| t.term == lowered)
}
