//! Modal dialogs: settings, help, confirmation.

use async_trait::async_trait;

use crate::types::settings::SettingsDraft;

/// The dialog currently covering the list, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ModalState {
    #[default]
    Closed,
    Settings(SettingsDraft),
    Help,
    /// A yes/no question waiting for the next typed line.
    Confirm(ConfirmDialog),
}

impl ModalState {
    pub fn is_open(&self) -> bool {
        !matches!(self, ModalState::Closed)
    }
}

/// Text of a yes/no question.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmDialog {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

/// `y`, `yes` or the confirm label itself accepts; anything else declines.
pub fn is_affirmative(answer: &str, confirm_label: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y")
        || answer.eq_ignore_ascii_case("yes")
        || (!answer.is_empty() && answer == confirm_label.trim())
}

/// Asks the user to confirm a destructive action.
#[async_trait]
pub trait ConfirmPrompt: Send + Sync {
    async fn confirm(&self, dialog: &ConfirmDialog) -> bool;
}

/// Answers every dialog the same way (`--yes`, tests).
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

#[async_trait]
impl ConfirmPrompt for FixedAnswer {
    async fn confirm(&self, _dialog: &ConfirmDialog) -> bool {
        self.0
    }
}
