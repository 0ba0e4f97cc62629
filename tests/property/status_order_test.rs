//! Property-based tests for the job lifecycle order and unknown statuses.

use proptest::prelude::*;

use videohunter::types::job::{Job, JobStatus};
use videohunter::ui::view::{actions_for, status_style};

const KNOWN: &[&str] = &["pending", "downloading", "completed", "failed", "cancelled"];

fn arb_known() -> impl Strategy<Value = JobStatus> {
    prop::sample::select(KNOWN).prop_map(JobStatus::from)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Nothing leaves a terminal status except staying in it.
    #[test]
    fn terminal_statuses_are_final(from in arb_known(), to in arb_known()) {
        if from.is_terminal() && from != to {
            prop_assert!(!from.can_transition_to(&to));
        }
    }

    /// Allowed moves never decrease the rank.
    #[test]
    fn allowed_moves_go_forward(from in arb_known(), to in arb_known()) {
        if from.can_transition_to(&to) {
            prop_assert!(to.rank() >= from.rank());
        }
    }

    /// Any status string outside the known set decodes to `Unknown`, keeps
    /// its text, and renders with the fallback style and no actions.
    #[test]
    fn unknown_status_strings_are_tolerated(raw in "[a-z_]{1,12}") {
        prop_assume!(!KNOWN.contains(&raw.as_str()));

        let json = format!(r#"{{"id":"x","status":"{}"}}"#, raw);
        let job: Job = serde_json::from_str(&json).unwrap();

        prop_assert_eq!(&job.status, &JobStatus::Unknown(raw.clone()));
        prop_assert_eq!(job.status.as_str(), raw.as_str());
        prop_assert_eq!(status_style(&job.status).label_key, "status.unknown");
        prop_assert!(actions_for(&job.status).is_empty());
    }
}
