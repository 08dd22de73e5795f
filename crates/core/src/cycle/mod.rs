//! The 10-step accounting cycle state machine.
//!
//! Each accounting period tracks the ten textbook cycle steps. Posting
//! activity drives the tracker forward automatically: recording an entry
//! completes the early steps, adjusting entries advance the middle, closing
//! entries and processed reversals advance the end. Manual overrides go
//! through the same planner so cascade behavior stays in one place.

use serde::{Deserialize, Serialize};

use crate::ledger::types::{EntryFlags, EntryStatus};

/// One of the ten steps of the accounting cycle, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CycleStep {
    /// Step 1: analyze source documents.
    AnalyzeTransactions,
    /// Step 2: journalize transactions.
    Journalize,
    /// Step 3: post journal entries to the ledger.
    PostToLedger,
    /// Step 4: prepare the unadjusted trial balance.
    UnadjustedTrialBalance,
    /// Step 5: record adjusting entries.
    AdjustingEntries,
    /// Step 6: prepare the adjusted trial balance.
    AdjustedTrialBalance,
    /// Step 7: prepare financial statements.
    FinancialStatements,
    /// Step 8: record closing entries.
    ClosingEntries,
    /// Step 9: prepare the post-closing trial balance.
    PostClosingTrialBalance,
    /// Step 10: record reversing entries.
    ReversingEntries,
}

impl CycleStep {
    /// All ten steps in cycle order.
    #[must_use]
    pub const fn all() -> [Self; 10] {
        [
            Self::AnalyzeTransactions,
            Self::Journalize,
            Self::PostToLedger,
            Self::UnadjustedTrialBalance,
            Self::AdjustingEntries,
            Self::AdjustedTrialBalance,
            Self::FinancialStatements,
            Self::ClosingEntries,
            Self::PostClosingTrialBalance,
            Self::ReversingEntries,
        ]
    }

    /// One-based position of this step in the cycle.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::AnalyzeTransactions => 1,
            Self::Journalize => 2,
            Self::PostToLedger => 3,
            Self::UnadjustedTrialBalance => 4,
            Self::AdjustingEntries => 5,
            Self::AdjustedTrialBalance => 6,
            Self::FinancialStatements => 7,
            Self::ClosingEntries => 8,
            Self::PostClosingTrialBalance => 9,
            Self::ReversingEntries => 10,
        }
    }

    /// Looks a step up by its one-based position.
    #[must_use]
    pub const fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::AnalyzeTransactions),
            2 => Some(Self::Journalize),
            3 => Some(Self::PostToLedger),
            4 => Some(Self::UnadjustedTrialBalance),
            5 => Some(Self::AdjustingEntries),
            6 => Some(Self::AdjustedTrialBalance),
            7 => Some(Self::FinancialStatements),
            8 => Some(Self::ClosingEntries),
            9 => Some(Self::PostClosingTrialBalance),
            10 => Some(Self::ReversingEntries),
            _ => None,
        }
    }

    /// Human-readable step name, as shown in cycle status listings.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AnalyzeTransactions => "Analyze business transactions",
            Self::Journalize => "Journalize transactions",
            Self::PostToLedger => "Post to ledger accounts",
            Self::UnadjustedTrialBalance => "Prepare unadjusted trial balance",
            Self::AdjustingEntries => "Journalize and post adjusting entries",
            Self::AdjustedTrialBalance => "Prepare adjusted trial balance",
            Self::FinancialStatements => "Prepare financial statements",
            Self::ClosingEntries => "Journalize and post closing entries",
            Self::PostClosingTrialBalance => "Prepare post-closing trial balance",
            Self::ReversingEntries => "Journalize and post reversing entries",
        }
    }
}

impl std::fmt::Display for CycleStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}. {}", self.number(), self.name())
    }
}

/// Progress state of a single cycle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Not started.
    Pending,
    /// Started but not finished.
    InProgress,
    /// Done for this period.
    Completed,
}

impl StepStatus {
    /// Returns the canonical string form used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Parses the canonical string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How marking a step interacts with the steps before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CascadePolicy {
    /// Completing step N also completes any earlier step not yet completed.
    /// Posting implies the preceding paperwork happened.
    #[default]
    CompletePrior,
    /// Touch only the named step, leaving earlier steps as they are.
    Exact,
}

/// Current status of one step, as read from the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepState {
    /// Which step.
    pub step: CycleStep,
    /// Its current status.
    pub status: StepStatus,
}

/// A single status change the planner wants applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepUpdate {
    /// Step to update.
    pub step: CycleStep,
    /// Status to set.
    pub status: StepStatus,
    /// Note to record alongside the change.
    pub note: String,
}

impl StepUpdate {
    fn new(step: CycleStep, status: StepStatus, note: &str) -> Self {
        Self { step, status, note: note.to_string() }
    }
}

/// Plans the updates needed to set `step` to `status`.
///
/// With [`CascadePolicy::CompletePrior`] and a target status of
/// [`StepStatus::Completed`], every earlier step still pending or in
/// progress is completed too. The target step's update always comes last.
#[must_use]
pub fn plan_step_update(
    current: &[StepState],
    step: CycleStep,
    status: StepStatus,
    note: &str,
    policy: CascadePolicy,
) -> Vec<StepUpdate> {
    let mut updates = Vec::new();

    if policy == CascadePolicy::CompletePrior && status == StepStatus::Completed {
        for state in current {
            if state.step < step && state.status != StepStatus::Completed {
                updates.push(StepUpdate::new(
                    state.step,
                    StepStatus::Completed,
                    "Auto-completed: later step finished",
                ));
            }
        }
        updates.sort_by_key(|u| u.step);
    }

    updates.push(StepUpdate::new(step, status, note));
    updates
}

/// Plans the tracker updates implied by recording a journal entry.
///
/// Draft entries leave the tracker untouched. A posted entry completes the
/// analyze and journalize steps; adjusting and closing flags advance the
/// corresponding later steps and open the step after them.
#[must_use]
pub fn steps_after_posting(flags: EntryFlags, status: EntryStatus) -> Vec<StepUpdate> {
    if status != EntryStatus::Posted {
        return Vec::new();
    }

    let mut updates = vec![
        StepUpdate::new(
            CycleStep::AnalyzeTransactions,
            StepStatus::Completed,
            "Source documents analyzed",
        ),
        StepUpdate::new(CycleStep::Journalize, StepStatus::Completed, "Transactions journalized"),
    ];

    if flags.is_adjusting {
        updates.push(StepUpdate::new(
            CycleStep::AdjustingEntries,
            StepStatus::Completed,
            "Adjusting entries posted",
        ));
        updates.push(StepUpdate::new(
            CycleStep::AdjustedTrialBalance,
            StepStatus::InProgress,
            "Adjusted trial balance ready to prepare",
        ));
    }

    if flags.is_closing {
        updates.push(StepUpdate::new(
            CycleStep::ClosingEntries,
            StepStatus::Completed,
            "Closing entries posted",
        ));
        updates.push(StepUpdate::new(
            CycleStep::PostClosingTrialBalance,
            StepStatus::InProgress,
            "Post-closing trial balance ready to prepare",
        ));
    }

    updates
}

/// The tracker update applied when a scheduled reversal completes.
#[must_use]
pub fn step_after_reversal_completion() -> StepUpdate {
    StepUpdate::new(CycleStep::ReversingEntries, StepStatus::Completed, "Reversing entries posted")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_states() -> Vec<StepState> {
        CycleStep::all()
            .into_iter()
            .map(|step| StepState { step, status: StepStatus::Pending })
            .collect()
    }

    #[test]
    fn test_step_numbers_round_trip() {
        for step in CycleStep::all() {
            assert_eq!(CycleStep::from_number(step.number()), Some(step));
        }
        assert_eq!(CycleStep::from_number(0), None);
        assert_eq!(CycleStep::from_number(11), None);
    }

    #[test]
    fn test_cascade_completes_prior_steps() {
        let updates = plan_step_update(
            &fresh_states(),
            CycleStep::AdjustingEntries,
            StepStatus::Completed,
            "Adjusting entries posted",
            CascadePolicy::CompletePrior,
        );
        // Steps 1-4 auto-completed, then the target itself.
        assert_eq!(updates.len(), 5);
        assert_eq!(updates[0].step, CycleStep::AnalyzeTransactions);
        assert_eq!(updates[3].step, CycleStep::UnadjustedTrialBalance);
        let last = updates.last().unwrap();
        assert_eq!(last.step, CycleStep::AdjustingEntries);
        assert_eq!(last.note, "Adjusting entries posted");
    }

    #[test]
    fn test_cascade_skips_already_completed() {
        let mut states = fresh_states();
        states[0].status = StepStatus::Completed;
        states[1].status = StepStatus::Completed;
        let updates = plan_step_update(
            &states,
            CycleStep::UnadjustedTrialBalance,
            StepStatus::Completed,
            "Trial balance prepared",
            CascadePolicy::CompletePrior,
        );
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].step, CycleStep::PostToLedger);
        assert_eq!(updates[1].step, CycleStep::UnadjustedTrialBalance);
    }

    #[test]
    fn test_exact_policy_touches_only_target() {
        let updates = plan_step_update(
            &fresh_states(),
            CycleStep::FinancialStatements,
            StepStatus::Completed,
            "Statements prepared",
            CascadePolicy::Exact,
        );
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].step, CycleStep::FinancialStatements);
    }

    #[test]
    fn test_non_completed_status_never_cascades() {
        let updates = plan_step_update(
            &fresh_states(),
            CycleStep::ClosingEntries,
            StepStatus::InProgress,
            "Closing in progress",
            CascadePolicy::CompletePrior,
        );
        assert_eq!(updates.len(), 1);
    }

    #[test]
    fn test_draft_entry_leaves_tracker_untouched() {
        assert!(steps_after_posting(EntryFlags::adjusting(), EntryStatus::Draft).is_empty());
    }

    #[test]
    fn test_posted_regular_entry_advances_early_steps() {
        let updates = steps_after_posting(EntryFlags::default(), EntryStatus::Posted);
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].step, CycleStep::AnalyzeTransactions);
        assert_eq!(updates[1].step, CycleStep::Journalize);
        assert!(updates.iter().all(|u| u.status == StepStatus::Completed));
    }

    #[test]
    fn test_posted_adjusting_entry_advances_middle_steps() {
        let updates = steps_after_posting(EntryFlags::adjusting(), EntryStatus::Posted);
        assert!(updates
            .iter()
            .any(|u| u.step == CycleStep::AdjustingEntries && u.status == StepStatus::Completed));
        assert!(updates
            .iter()
            .any(|u| u.step == CycleStep::AdjustedTrialBalance
                && u.status == StepStatus::InProgress));
    }

    #[test]
    fn test_posted_closing_entry_advances_late_steps() {
        let updates = steps_after_posting(EntryFlags::closing(), EntryStatus::Posted);
        assert!(updates
            .iter()
            .any(|u| u.step == CycleStep::ClosingEntries && u.status == StepStatus::Completed));
        assert!(updates
            .iter()
            .any(|u| u.step == CycleStep::PostClosingTrialBalance
                && u.status == StepStatus::InProgress));
    }

    #[test]
    fn test_reversal_completion_update() {
        let update = step_after_reversal_completion();
        assert_eq!(update.step, CycleStep::ReversingEntries);
        assert_eq!(update.status, StepStatus::Completed);
    }
}
