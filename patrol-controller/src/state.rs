//! Run state machine
//!
//! ```text
//! Submitted --submit ok-->            Polling
//! Submitted --submit failed-->        Failed
//! Polling   --succeeded > 0-->        Succeeded
//! Polling   --failed > 0-->           Failed
//! Polling   --pending, polls left-->  Polling
//! Polling   --polls exhausted-->      TimedOut
//! ```

use patrol_core::domain::job::JobVerdict;
use patrol_core::domain::run::RunState;
use tracing::debug;

use crate::cluster::StatusPoll;

/// Tracks one run's state and poll budget
#[derive(Debug, Clone)]
pub struct RunMachine {
    state: RunState,
    polls: u32,
    max_attempts: u32,
    submitted: bool,
}

impl RunMachine {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            state: RunState::Submitted,
            polls: 0,
            max_attempts,
            submitted: false,
        }
    }

    /// Status polls observed so far
    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Whether the job reached the control plane
    pub fn was_submitted(&self) -> bool {
        self.submitted
    }

    /// The manifest was accepted
    pub fn submitted(&mut self) -> RunState {
        if self.state == RunState::Submitted {
            self.submitted = true;
        }
        self.transition(RunState::Submitted, RunState::Polling)
    }

    /// The manifest was rejected
    pub fn submit_failed(&mut self) -> RunState {
        self.transition(RunState::Submitted, RunState::Failed)
    }

    /// Records one status poll and returns the resulting state
    ///
    /// A `NotReady` reply consumes an attempt like a pending snapshot does.
    pub fn observe(&mut self, poll: &StatusPoll) -> RunState {
        if self.state != RunState::Polling {
            return self.state;
        }
        self.polls += 1;

        let verdict = match poll {
            StatusPoll::Snapshot(snapshot) => snapshot.verdict(),
            StatusPoll::NotReady(_) => JobVerdict::Pending,
        };

        let next = match verdict {
            JobVerdict::Succeeded => RunState::Succeeded,
            JobVerdict::Failed => RunState::Failed,
            JobVerdict::Pending if self.polls >= self.max_attempts => RunState::TimedOut,
            JobVerdict::Pending => RunState::Polling,
        };

        self.transition(RunState::Polling, next)
    }

    fn transition(&mut self, from: RunState, to: RunState) -> RunState {
        if self.state == from {
            if from != to {
                debug!("Run state {} -> {} (poll {})", from, to, self.polls);
            }
            self.state = to;
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::fake::{pending, snapshot};

    fn polling(max_attempts: u32) -> RunMachine {
        let mut machine = RunMachine::new(max_attempts);
        assert_eq!(machine.submitted(), RunState::Polling);
        machine
    }

    #[test]
    fn test_submit_transitions() {
        let mut machine = RunMachine::new(3);
        assert!(!machine.was_submitted());
        assert_eq!(machine.submitted(), RunState::Polling);
        assert!(machine.was_submitted());

        let mut rejected = RunMachine::new(3);
        assert_eq!(rejected.submit_failed(), RunState::Failed);
        assert!(!rejected.was_submitted());
        assert_eq!(rejected.observe(&snapshot(1, 0)), RunState::Failed);
    }

    #[test]
    fn test_success_and_failure() {
        let mut machine = polling(5);
        assert_eq!(machine.observe(&pending()), RunState::Polling);
        assert_eq!(machine.observe(&snapshot(1, 0)), RunState::Succeeded);
        assert_eq!(machine.polls(), 2);

        let mut machine = polling(5);
        assert_eq!(machine.observe(&snapshot(0, 1)), RunState::Failed);
        assert!(machine.was_submitted());
    }

    #[test]
    fn test_success_wins_over_failure() {
        let mut machine = polling(5);
        assert_eq!(machine.observe(&snapshot(1, 1)), RunState::Succeeded);
    }

    #[test]
    fn test_times_out_after_max_attempts() {
        let mut machine = polling(3);
        assert_eq!(machine.observe(&pending()), RunState::Polling);
        assert_eq!(
            machine.observe(&StatusPoll::NotReady("api unavailable".to_string())),
            RunState::Polling
        );
        assert_eq!(machine.observe(&pending()), RunState::TimedOut);
        assert_eq!(machine.polls(), 3);
    }

    #[test]
    fn test_terminal_states_are_sticky() {
        let mut machine = polling(1);
        assert_eq!(machine.observe(&pending()), RunState::TimedOut);
        assert_eq!(machine.observe(&snapshot(1, 0)), RunState::TimedOut);
        assert_eq!(machine.polls(), 1);
        assert_eq!(machine.submitted(), RunState::TimedOut);
    }
}
