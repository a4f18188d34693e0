use crate::api::{CommentId, ConflictReason, Error, LikeIntent, LikeStatus};

/// The two like fields of a comment, as displayed
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LikeSnapshot {
    pub liked: bool,
    pub count: u64,
}

impl LikeSnapshot {
    /// The state the viewer expects once `intent` went through
    pub fn after(&self, intent: LikeIntent) -> LikeSnapshot {
        LikeSnapshot {
            liked: intent.target(),
            count: match intent {
                LikeIntent::Like => self.count.saturating_add(1),
                LikeIntent::Unlike => self.count.saturating_sub(1),
            },
        }
    }
}

/// A like toggle whose optimistic result is displayed while the board has
/// not answered yet
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LikeReconciler {
    comment: CommentId,
    intent: LikeIntent,
    baseline: LikeSnapshot,
    guess: LikeSnapshot,
}

/// How a like toggle ended
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LikeOutcome {
    /// The board accepted the call
    Committed(LikeSnapshot),

    /// The board refused the call, the state from before the click is back
    RolledBack { state: LikeSnapshot, error: Error },

    /// The board said the call was already applied, which means it holds the
    /// state the viewer asked for
    ForceSynced {
        state: LikeSnapshot,
        reason: ConflictReason,
    },
}

impl LikeOutcome {
    /// The like fields to display from now on
    pub fn state(&self) -> LikeSnapshot {
        match self {
            LikeOutcome::Committed(state)
            | LikeOutcome::RolledBack { state, .. }
            | LikeOutcome::ForceSynced { state, .. } => *state,
        }
    }
}

impl LikeReconciler {
    /// Starts a toggle from the currently displayed `baseline`
    pub fn begin(comment: CommentId, baseline: LikeSnapshot) -> LikeReconciler {
        let intent = LikeIntent::toggling(baseline.liked);
        LikeReconciler {
            comment,
            intent,
            baseline,
            guess: baseline.after(intent),
        }
    }

    pub fn comment(&self) -> CommentId {
        self.comment
    }

    /// The one call to issue to the board
    pub fn intent(&self) -> LikeIntent {
        self.intent
    }

    pub fn baseline(&self) -> LikeSnapshot {
        self.baseline
    }

    /// What to display until the board answers
    pub fn optimistic(&self) -> LikeSnapshot {
        self.guess
    }

    pub fn settle(self, res: Result<LikeStatus, Error>) -> LikeOutcome {
        let outcome = match res {
            Ok(status) => LikeOutcome::Committed(LikeSnapshot {
                liked: status.liked_by_me.unwrap_or(self.guess.liked),
                count: status.like_count.unwrap_or(self.guess.count),
            }),
            Err(Error::Conflict(reason)) if self.is_already_applied(reason) => {
                LikeOutcome::ForceSynced {
                    state: self.baseline.after(self.intent),
                    reason,
                }
            }
            Err(error) => LikeOutcome::RolledBack {
                state: self.baseline,
                error,
            },
        };
        tracing::debug!(
            comment = ?self.comment,
            intent = ?self.intent,
            ?outcome,
            "like toggle settled"
        );
        outcome
    }

    fn is_already_applied(&self, reason: ConflictReason) -> bool {
        matches!(
            (self.intent, reason),
            (LikeIntent::Like, ConflictReason::AlreadyLiked)
                | (LikeIntent::Unlike, ConflictReason::NotLiked)
        )
    }
}
