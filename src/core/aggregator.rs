use crate::domain::model::{BatchReport, Outcome, OutcomeStatus};
use std::time::Instant;

/// 依到達順序累積 Outcome 並維持成功/失敗計數
#[derive(Debug)]
pub struct ResultAggregator {
    outcomes: Vec<Outcome>,
    successful: usize,
    failed: usize,
    started: Instant,
}

impl ResultAggregator {
    pub fn new(expected_rows: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(expected_rows),
            successful: 0,
            failed: 0,
            started: Instant::now(),
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome.status {
            OutcomeStatus::Success => self.successful += 1,
            OutcomeStatus::Failed => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn finish(self, cancelled: bool) -> BatchReport {
        BatchReport {
            total: self.outcomes.len(),
            successful: self.successful,
            failed: self.failed,
            elapsed: self.started.elapsed(),
            outcomes: self.outcomes,
            cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(row_number: usize, status: OutcomeStatus) -> Outcome {
        Outcome {
            row_number,
            first_name: String::new(),
            last_name: String::new(),
            phone: String::new(),
            target_profile: String::new(),
            lead_id: String::new(),
            status,
            error_message: String::new(),
        }
    }

    #[test]
    fn test_counts_and_order() {
        let mut aggregator = ResultAggregator::new(3);
        aggregator.record(outcome(2, OutcomeStatus::Success));
        aggregator.record(outcome(3, OutcomeStatus::Failed));
        aggregator.record(outcome(4, OutcomeStatus::Success));

        let report = aggregator.finish(false);

        assert_eq!(report.total, 3);
        assert_eq!(report.successful, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.successful + report.failed, report.total);
        let rows: Vec<usize> = report.outcomes.iter().map(|o| o.row_number).collect();
        assert_eq!(rows, vec![2, 3, 4]);
        assert_eq!(report.failed_outcomes().count(), 1);
    }

    #[test]
    fn test_empty_batch() {
        let aggregator = ResultAggregator::new(0);
        let report = aggregator.finish(false);
        assert_eq!(report.total, 0);
        assert_eq!(report.successful + report.failed, 0);
        assert!(report.outcomes.is_empty());
    }
}
