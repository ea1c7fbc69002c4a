#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Visible,
    Hidden,
    ExitingFullscreen,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosePolicy {
    pub persists_in_dock_when_closed: bool,
    pub tray_enabled: bool,
    pub fast_quit: bool,
    pub clear_cache_on_close: bool,
}

impl ClosePolicy {
    pub fn suppresses_close(&self) -> bool {
        !self.fast_quit && (self.persists_in_dock_when_closed || self.tray_enabled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// Cancel the close and hide the window.
    Hide,
    /// Let the window close; the process follows it.
    Close,
    /// Cancel for now; decide once fullscreen has been left.
    AwaitFullscreenExit,
}

#[derive(Debug, Clone)]
pub struct LifecycleController {
    state: LifecycleState,
    policy: ClosePolicy,
    quitting: bool,
}

impl LifecycleController {
    pub fn new(policy: ClosePolicy, initially_visible: bool) -> Self {
        Self {
            state: if initially_visible {
                LifecycleState::Visible
            } else {
                LifecycleState::Hidden
            },
            policy,
            quitting: false,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn policy(&self) -> &ClosePolicy {
        &self.policy
    }

    pub fn mark_quitting(&mut self) {
        self.quitting = true;
    }

    pub fn on_close_requested(&mut self, fullscreen: bool) -> CloseDecision {
        if self.quitting || self.state == LifecycleState::Closed {
            self.state = LifecycleState::Closed;
            return CloseDecision::Close;
        }
        if self.state == LifecycleState::ExitingFullscreen {
            return CloseDecision::AwaitFullscreenExit;
        }
        if fullscreen {
            self.state = LifecycleState::ExitingFullscreen;
            return CloseDecision::AwaitFullscreenExit;
        }
        self.evaluate()
    }

    /// Resumes a close held for fullscreen exit. `None` when nothing was held.
    pub fn on_fullscreen_exited(&mut self) -> Option<CloseDecision> {
        if self.state != LifecycleState::ExitingFullscreen {
            return None;
        }
        if self.quitting {
            self.state = LifecycleState::Closed;
            return Some(CloseDecision::Close);
        }
        Some(self.evaluate())
    }

    fn evaluate(&mut self) -> CloseDecision {
        if self.policy.suppresses_close() {
            self.state = LifecycleState::Hidden;
            CloseDecision::Hide
        } else {
            self.state = LifecycleState::Closed;
            CloseDecision::Close
        }
    }

    pub fn on_shown(&mut self) {
        if matches!(self.state, LifecycleState::Hidden | LifecycleState::Visible) {
            self.state = LifecycleState::Visible;
        }
    }

    pub fn on_hidden(&mut self) {
        if self.state == LifecycleState::Visible {
            self.state = LifecycleState::Hidden;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(dock: bool, tray: bool, fast_quit: bool) -> ClosePolicy {
        ClosePolicy {
            persists_in_dock_when_closed: dock,
            tray_enabled: tray,
            fast_quit,
            clear_cache_on_close: false,
        }
    }

    #[test]
    fn tray_without_fast_quit_hides_instead_of_closing() {
        let mut controller = LifecycleController::new(policy(false, true, false), false);
        assert_eq!(controller.on_close_requested(false), CloseDecision::Hide);
        assert_eq!(controller.state(), LifecycleState::Hidden);
    }

    #[test]
    fn dock_platform_without_fast_quit_hides() {
        let mut controller = LifecycleController::new(policy(true, false, false), true);
        assert_eq!(controller.on_close_requested(false), CloseDecision::Hide);
    }

    #[test]
    fn fast_quit_always_closes() {
        for (dock, tray) in [(false, false), (true, false), (false, true), (true, true)] {
            let mut controller = LifecycleController::new(policy(dock, tray, true), true);
            assert_eq!(controller.on_close_requested(false), CloseDecision::Close);
            assert_eq!(controller.state(), LifecycleState::Closed);
        }
    }

    #[test]
    fn plain_platform_without_tray_closes() {
        let mut controller = LifecycleController::new(policy(false, false, false), true);
        assert_eq!(controller.on_close_requested(false), CloseDecision::Close);
    }

    #[test]
    fn fullscreen_close_waits_then_evaluates_original_request() {
        let mut controller = LifecycleController::new(policy(true, false, false), true);
        assert_eq!(
            controller.on_close_requested(true),
            CloseDecision::AwaitFullscreenExit
        );
        assert_eq!(controller.state(), LifecycleState::ExitingFullscreen);
        assert_eq!(
            controller.on_close_requested(true),
            CloseDecision::AwaitFullscreenExit
        );

        assert_eq!(controller.on_fullscreen_exited(), Some(CloseDecision::Hide));
        assert_eq!(controller.state(), LifecycleState::Hidden);
        assert_eq!(controller.on_fullscreen_exited(), None);
    }

    #[test]
    fn fullscreen_close_with_fast_quit_ends_closed() {
        let mut controller = LifecycleController::new(policy(true, true, true), true);
        controller.on_close_requested(true);
        assert_eq!(controller.on_fullscreen_exited(), Some(CloseDecision::Close));
        assert_eq!(controller.state(), LifecycleState::Closed);
    }

    #[test]
    fn quitting_overrides_suppression() {
        let mut controller = LifecycleController::new(policy(true, true, false), true);
        controller.mark_quitting();
        assert_eq!(controller.on_close_requested(false), CloseDecision::Close);
    }

    #[test]
    fn show_and_hide_only_move_between_visible_and_hidden() {
        let mut controller = LifecycleController::new(policy(false, true, false), false);
        assert_eq!(controller.state(), LifecycleState::Hidden);
        controller.on_shown();
        assert_eq!(controller.state(), LifecycleState::Visible);
        controller.on_hidden();
        assert_eq!(controller.state(), LifecycleState::Hidden);

        controller.on_shown();
        controller.on_close_requested(true);
        controller.on_shown();
        assert_eq!(controller.state(), LifecycleState::ExitingFullscreen);
    }
}
