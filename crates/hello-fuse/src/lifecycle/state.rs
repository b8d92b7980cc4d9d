/// Lifecycle state of a mount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Mounting,
    MountTimedOut,
    MountFailed,
    Mounted,
    Verifying,
    Ready,
    ShuttingDown,
    Terminated,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Mounting => "mounting",
            LifecycleState::MountTimedOut => "mount-timed-out",
            LifecycleState::MountFailed => "mount-failed",
            LifecycleState::Mounted => "mounted",
            LifecycleState::Verifying => "verifying",
            LifecycleState::Ready => "ready",
            LifecycleState::ShuttingDown => "shutting-down",
            LifecycleState::Terminated => "terminated",
        }
    }

    /// No further transitions leave this state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LifecycleState::MountTimedOut | LifecycleState::MountFailed | LifecycleState::Terminated
        )
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
