//! Boundary with the external transition/animation mechanism.

use std::time::Duration;

use async_trait::async_trait;

use super::content::Content;
use crate::domain::LifecycleState;

/// Transition class applied when neither the consumer nor the scope names
/// one.
pub const DEFAULT_TRANSITION_NAME: &str = "fade-blur";

/// Transition duration applied when neither the consumer nor the scope
/// sets one.
pub const DEFAULT_TRANSITION_DURATION: Duration = Duration::from_millis(400);

/// One resolved swap handed to the transition mechanism.
///
/// `state_key` keys successive frames (content swaps when the state
/// changes); `None` is the unset state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionFrame {
    pub state_key: Option<LifecycleState>,
    pub class_name: String,
    pub timeout: Duration,
    pub content: Content,
}

/// External collaborator that visually swaps between successive frames.
///
/// The core only guarantees what each frame contains; curves and mounting
/// mechanics are entirely the implementor's.
#[async_trait]
pub trait Transition: Send + Sync {
    async fn play(&self, frame: TransitionFrame);
}

/// Swap with no animation at all, for tests and headless consumers.
pub struct NoopTransition;

#[async_trait]
impl Transition for NoopTransition {
    async fn play(&self, _frame: TransitionFrame) {}
}
