//! SLA report for the purchasing workflow.
//!
//! Figures are fixed targets and reference performance, not computed from cards.

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SlaTarget {
    pub target: u32,
    pub unit: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SlaPerformance {
    pub average: f64,
    pub compliance: u32, // percent
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SlaMetrics {
    pub sla_targets: BTreeMap<String, SlaTarget>,
    pub current_performance: BTreeMap<String, SlaPerformance>,
    pub deadlines: BTreeMap<String, String>,
}

impl SlaMetrics {
    pub fn current() -> Self {
        let stages = [
            ("purchase_request", 2, 1.8, 95),
            ("request_approval", 4, 3.2, 88),
            ("invoice_posting", 2, 1.5, 98),
        ];

        let mut sla_targets = BTreeMap::new();
        let mut current_performance = BTreeMap::new();
        for (stage, target, average, compliance) in stages {
            sla_targets.insert(
                stage.to_string(),
                SlaTarget {
                    target,
                    unit: "days".to_string(),
                },
            );
            current_performance.insert(stage.to_string(), SlaPerformance { average, compliance });
        }

        let deadlines = BTreeMap::from([
            (
                "goods_invoice".to_string(),
                "Last business day of the month".to_string(),
            ),
            (
                "service_invoice".to_string(),
                "Day 24 of each month".to_string(),
            ),
        ]);

        Self {
            sla_targets,
            current_performance,
            deadlines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_target_has_performance() {
        let metrics = SlaMetrics::current();
        assert_eq!(metrics.sla_targets.len(), 3);
        for stage in metrics.sla_targets.keys() {
            assert!(metrics.current_performance.contains_key(stage));
        }
        assert_eq!(metrics.sla_targets["request_approval"].target, 4);
        assert_eq!(metrics.deadlines.len(), 2);
    }
}
