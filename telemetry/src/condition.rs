//! Weather Condition Classification
//!
//! Maps the numeric weather code reported by the condition source to a
//! coarse [`WeatherCondition`]. The code ranges are configuration, not
//! logic: the default table reproduces the deployed mapping verbatim,
//! including its overlapping Rain/Snow ranges. First matching rule wins,
//! so codes 51-67 classify as Rain even though the Snow range also covers
//! them; [`ConditionMap::overlapping_rules`] surfaces the overlap so an
//! operator can see it instead of the table being silently "fixed".

use serde::{Deserialize, Serialize};

/// Coarse weather condition used for icon selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherCondition {
    Sunny,
    Cloudy,
    Rain,
    Snow,
    Other,
}

/// One classification rule: an inclusive code range and its condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionRule {
    pub min: u16,
    pub max: u16,
    pub condition: WeatherCondition,
}

impl ConditionRule {
    fn matches(&self, code: u16) -> bool {
        self.min <= code && code <= self.max
    }

    fn overlaps(&self, other: &ConditionRule) -> bool {
        self.min <= other.max && other.min <= self.max
    }
}

/// Ordered rule table for weather-code classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionMap {
    rules: Vec<ConditionRule>,
}

impl Default for ConditionMap {
    fn default() -> Self {
        Self {
            rules: vec![
                ConditionRule { min: 0, max: 0, condition: WeatherCondition::Sunny },
                ConditionRule { min: 1, max: 3, condition: WeatherCondition::Cloudy },
                ConditionRule { min: 51, max: 67, condition: WeatherCondition::Rain },
                ConditionRule { min: 40, max: 77, condition: WeatherCondition::Snow },
            ],
        }
    }
}

impl ConditionMap {
    pub fn new(rules: Vec<ConditionRule>) -> Self {
        Self { rules }
    }

    /// Classify a weather code; unmatched codes are `Other`.
    pub fn classify(&self, code: u16) -> WeatherCondition {
        self.rules
            .iter()
            .find(|r| r.matches(code))
            .map(|r| r.condition)
            .unwrap_or(WeatherCondition::Other)
    }

    /// Pairs of rule indices whose code ranges intersect.
    ///
    /// The later rule of an overlapping pair is shadowed for the shared
    /// codes because classification is first-match.
    pub fn overlapping_rules(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for i in 0..self.rules.len() {
            for j in (i + 1)..self.rules.len() {
                if self.rules[i].overlaps(&self.rules[j]) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    /// Log every range overlap in the table.
    pub fn warn_overlaps(&self) {
        for (i, j) in self.overlapping_rules() {
            let (a, b) = (&self.rules[i], &self.rules[j]);
            tracing::warn!(
                "condition rule {:?} {}-{} shadows {:?} {}-{} for shared codes",
                a.condition, a.min, a.max, b.condition, b.min, b.max,
            );
        }
    }
}
