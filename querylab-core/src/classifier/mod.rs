//! Scenario classifier.
//!
//! A decision list of [`ScenarioRule`]s evaluated in declaration order. The
//! first rule whose patterns all match the query text supplies the result
//! table; no further rules are evaluated. When nothing matches, the fallback
//! table is returned, so classification is total.

mod scenarios;

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::value::ResultSet;

pub use scenarios::FALLBACK_SCENARIO;

/// Builds the literal table a scenario stands for
pub type ResultBuilder = fn() -> ResultSet;

/// One entry of the decision list.
pub struct ScenarioRule {
    name: &'static str,
    patterns: Vec<Regex>,
    build: ResultBuilder,
}

impl ScenarioRule {
    /// Compile a rule. Patterns are matched case-insensitively and must all
    /// match for the rule to apply.
    pub fn new(
        name: &'static str,
        patterns: &[&str],
        build: ResultBuilder,
    ) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(&format!("(?i){}", p)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name,
            patterns,
            build,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn matches(&self, query: &str) -> bool {
        self.patterns.iter().all(|p| p.is_match(query))
    }

    pub fn build(&self) -> ResultSet {
        (self.build)()
    }
}

impl fmt::Debug for ScenarioRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioRule")
            .field("name", &self.name)
            .field(
                "patterns",
                &self.patterns.iter().map(Regex::as_str).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// The scenario chosen for a query and the table it produced
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub scenario: &'static str,
    pub results: ResultSet,
}

#[derive(Debug)]
pub struct Classifier {
    rules: Vec<ScenarioRule>,
    fallback: ResultBuilder,
}

impl Classifier {
    pub fn new(rules: Vec<ScenarioRule>, fallback: ResultBuilder) -> Self {
        Self { rules, fallback }
    }

    /// The built-in playground scenarios, compiled once per process
    pub fn standard() -> &'static Classifier {
        static STANDARD: OnceLock<Classifier> = OnceLock::new();
        STANDARD.get_or_init(|| {
            let rules = scenarios::RULES
                .iter()
                .map(|(name, patterns, build)| {
                    ScenarioRule::new(*name, patterns, *build)
                        .unwrap_or_else(|e| panic!("scenario '{}' has a bad pattern: {}", name, e))
                })
                .collect();
            Classifier::new(rules, scenarios::welcome)
        })
    }

    pub fn rules(&self) -> &[ScenarioRule] {
        &self.rules
    }

    pub fn classify(&self, query: &str) -> ResultSet {
        self.classify_detailed(query).results
    }

    pub fn classify_detailed(&self, query: &str) -> Classification {
        match self.rules.iter().find(|rule| rule.matches(query)) {
            Some(rule) => {
                tracing::trace!(scenario = rule.name, "Scenario matched");
                Classification {
                    scenario: rule.name,
                    results: rule.build(),
                }
            }
            None => {
                tracing::trace!("No scenario matched, using fallback");
                Classification {
                    scenario: FALLBACK_SCENARIO,
                    results: (self.fallback)(),
                }
            }
        }
    }
}

/// Classify with the built-in scenarios
pub fn classify(query: &str) -> ResultSet {
    Classifier::standard().classify(query)
}
