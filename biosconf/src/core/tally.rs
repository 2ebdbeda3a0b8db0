//! Outcome counters for one run.

use crate::core::types::Outcome;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    pub already_set: usize,
    pub applied: usize,
    pub failed: usize,
    pub not_found: usize,
}

impl RunTally {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::AlreadySet => self.already_set += 1,
            Outcome::Applied => self.applied += 1,
            Outcome::Failed(_) => self.failed += 1,
            Outcome::NotFound => self.not_found += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.already_set + self.applied + self.failed + self.not_found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::WriteStatus;

    #[test]
    fn records_each_kind_once() {
        let mut tally = RunTally::default();
        tally.record(&Outcome::AlreadySet);
        tally.record(&Outcome::Applied);
        tally.record(&Outcome::Applied);
        tally.record(&Outcome::Failed(WriteStatus::AccessDenied));
        tally.record(&Outcome::NotFound);

        assert_eq!(
            tally,
            RunTally {
                already_set: 1,
                applied: 2,
                failed: 1,
                not_found: 1,
            }
        );
        assert_eq!(tally.total(), 5);
    }
}
