//! Enter, exit and slide transition sequencing for content containers.
//!
//! The controller is platform agnostic and owns no timers. It reports
//! the wake it needs through [`TransitionController::pending`] and the
//! host schedules it: `Frames` waits map to committed-paint callbacks,
//! `DelayMs` waits map to timeouts. Completed waits are reported back
//! with the carried token; stale tokens are dropped, so a superseded
//! sequence can never finish and clobber a newer one.

use serde::{Deserialize, Serialize};

/// Settle buffer between a slide exit finishing and the next content
/// entering, in milliseconds.
pub const SLIDE_SETTLE_MS: u32 = 50;

/// Phase of a content container's transition lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransitionPhase {
    /// Nothing on screen
    #[default]
    Idle,
    /// Content painted in its pre-animation state, waiting for the
    /// paint to commit
    EnterStart,
    /// Enter treatments running
    Entering,
    /// Fully shown, at rest
    Visible,
    /// Exit treatments running, container hiding
    Exiting,
    /// Slide exit painted in its start state, waiting for the paint
    /// to commit
    SlideExitStart,
    /// Slide exit treatments running, new content queued
    SlideExiting,
    /// Like `EnterStart`, but entering in place of content that was
    /// mid-exit, so slide-enter treatments apply
    SlideEnterStart,
}

impl TransitionPhase {
    /// Whether the container renders its content at all in this phase.
    #[inline]
    pub fn shows_content(self) -> bool {
        self != TransitionPhase::Idle
    }
}

/// What kind of wake the controller is waiting on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wake {
    /// Wake once per committed paint frame, this many times.
    Frames(u8),
    /// Wake after this many milliseconds.
    DelayMs(u32),
}

/// A scheduled continuation with its cancellation token.
///
/// The host reports completion through
/// [`TransitionController::frame_committed`] or
/// [`TransitionController::delay_elapsed`] with this token; any newer
/// transition invalidates it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingWake {
    pub token: u64,
    pub wake: Wake,
}

/// Transition state machine for one on-screen content container.
///
/// Driven by two inputs: the current content's identity key and
/// whether the container should be shown. All sibling elements of the
/// container read the same phase and frame ids, so they animate in the
/// same frame.
///
/// Entering is guarded by two committed paints: the first paint shows
/// the hidden pre-animation state, and only after the backend has
/// demonstrably committed it do the enter treatments apply. A content
/// change while visible runs the old content's slide exit to
/// completion (exit duration plus [`SLIDE_SETTLE_MS`]) before the new
/// content begins entering, so the two never overlap.
///
/// ## Example
///
/// ```rust
/// use versecast_core_display::{TransitionController, TransitionPhase, Wake};
///
/// let mut ctrl = TransitionController::new(400);
///
/// // Content appears. The first paint shows the hidden state.
/// ctrl.update("song|Amazing grace", true);
/// assert_eq!(ctrl.phase(), TransitionPhase::EnterStart);
/// let pending = ctrl.pending().unwrap();
/// assert_eq!(pending.wake, Wake::Frames(2));
///
/// // The host reports two committed paints, then the enter runs.
/// ctrl.frame_committed(pending.token);
/// ctrl.frame_committed(pending.token);
/// assert_eq!(ctrl.phase(), TransitionPhase::Entering);
///
/// ctrl.enter_finished();
/// assert_eq!(ctrl.phase(), TransitionPhase::Visible);
/// ```
#[derive(Clone, Debug)]
pub struct TransitionController {
    /// Current phase
    phase: TransitionPhase,
    /// Identity of the content this container currently owns
    content_key: Option<String>,
    /// Identity of the content queued behind a running slide exit
    next_key: Option<String>,
    /// Increments on every enter sequence
    enter_frame_id: u64,
    /// Increments on every exit sequence
    exit_frame_id: u64,
    /// Exit treatment duration in milliseconds
    exit_ms: u32,
    /// The one outstanding continuation, if any
    pending: Option<PendingWake>,
    /// Token source; never reused, so stale callbacks stay stale
    next_token: u64,
}

impl TransitionController {
    /// Create a controller with the given exit duration in
    /// milliseconds.
    pub fn new(exit_ms: u32) -> Self {
        Self {
            phase: TransitionPhase::Idle,
            content_key: None,
            next_key: None,
            enter_frame_id: 0,
            exit_frame_id: 0,
            exit_ms,
            pending: None,
            next_token: 0,
        }
    }

    /// Set the exit treatment duration for subsequent transitions.
    pub fn set_exit_ms(&mut self, exit_ms: u32) {
        self.exit_ms = exit_ms;
    }

    /// Get the current phase.
    #[inline]
    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    /// Identity of the content the container currently owns.
    #[inline]
    pub fn content_key(&self) -> Option<&str> {
        self.content_key.as_deref()
    }

    /// Identity of content queued behind a running slide exit.
    #[inline]
    pub fn next_key(&self) -> Option<&str> {
        self.next_key.as_deref()
    }

    /// Id of the current enter sequence; increments on every enter, so
    /// dependents re-trigger even when the same phase repeats.
    #[inline]
    pub fn enter_frame_id(&self) -> u64 {
        self.enter_frame_id
    }

    /// Id of the current exit sequence.
    #[inline]
    pub fn exit_frame_id(&self) -> u64 {
        self.exit_frame_id
    }

    /// The continuation the controller is waiting on, if any.
    ///
    /// The host schedules it (paint callback or timeout) and reports
    /// back with the carried token.
    #[inline]
    pub fn pending(&self) -> Option<PendingWake> {
        self.pending
    }

    /// Feed the current content identity and visibility.
    ///
    /// Call whenever either input may have changed; redundant calls
    /// are no-ops. Any transition this starts supersedes the pending
    /// continuation of the previous one.
    pub fn update(&mut self, key: &str, visible: bool) {
        match self.phase {
            TransitionPhase::Idle => {
                self.content_key = Some(key.to_string());
                if visible {
                    self.begin_enter(false);
                }
            }
            TransitionPhase::EnterStart
            | TransitionPhase::SlideEnterStart
            | TransitionPhase::Entering
            | TransitionPhase::Visible => {
                if !visible {
                    self.begin_exit();
                } else if self.content_key.as_deref() != Some(key) {
                    self.begin_slide_exit(key);
                }
            }
            TransitionPhase::Exiting => {
                if visible {
                    if self.content_key.as_deref() == Some(key) {
                        // shown again before the exit finished
                        self.begin_enter(false);
                    } else {
                        // new content takes over from the half-exited one
                        self.content_key = Some(key.to_string());
                        self.begin_enter(true);
                    }
                }
                // staying hidden changes nothing; the exit keeps running
            }
            TransitionPhase::SlideExitStart | TransitionPhase::SlideExiting => {
                if !visible {
                    self.next_key = None;
                    self.begin_exit();
                } else {
                    let target = self.next_key.as_deref().or(self.content_key.as_deref());
                    if target != Some(key) {
                        // retarget the running slide; its exit animation
                        // and pending wake stay valid
                        self.next_key = Some(key.to_string());
                    }
                }
            }
        }
    }

    /// Report one committed paint frame for the given token.
    ///
    /// Stale tokens are ignored.
    pub fn frame_committed(&mut self, token: u64) {
        let Some(pending) = self.pending else { return };
        if pending.token != token {
            log::debug!("dropping stale frame callback (token {})", token);
            return;
        }
        match (self.phase, pending.wake) {
            (TransitionPhase::EnterStart | TransitionPhase::SlideEnterStart, Wake::Frames(n)) => {
                if n > 1 {
                    // same continuation, one paint closer
                    self.pending = Some(PendingWake { token, wake: Wake::Frames(n - 1) });
                } else {
                    self.pending = None;
                    self.phase = TransitionPhase::Entering;
                }
            }
            (TransitionPhase::SlideExitStart, Wake::Frames(_)) => {
                self.phase = TransitionPhase::SlideExiting;
                self.schedule(Wake::DelayMs(self.exit_ms + SLIDE_SETTLE_MS));
            }
            _ => {}
        }
    }

    /// Report an elapsed delay for the given token.
    ///
    /// Stale tokens are ignored.
    pub fn delay_elapsed(&mut self, token: u64) {
        let Some(pending) = self.pending else { return };
        if pending.token != token || !matches!(pending.wake, Wake::DelayMs(_)) {
            log::debug!("dropping stale timer callback (token {})", token);
            return;
        }
        match self.phase {
            TransitionPhase::Exiting => {
                self.pending = None;
                self.phase = TransitionPhase::Idle;
            }
            TransitionPhase::SlideExiting => {
                if let Some(next) = self.next_key.take() {
                    // exit fully settled; the queued content enters plainly
                    self.content_key = Some(next);
                    self.begin_enter(false);
                } else {
                    self.pending = None;
                    self.phase = TransitionPhase::Idle;
                }
            }
            _ => {}
        }
    }

    /// Report that the enter treatment's duration has elapsed.
    ///
    /// The controller does not track enter timing itself; the caller
    /// owns the enter duration and calls this when it is done.
    pub fn enter_finished(&mut self) {
        if self.phase == TransitionPhase::Entering {
            self.phase = TransitionPhase::Visible;
        }
    }

    /// Reset to idle, dropping the pending continuation and any queued
    /// content.
    ///
    /// Frame ids and the token source keep counting so callbacks from
    /// before the reset remain stale.
    pub fn reset(&mut self) {
        self.phase = TransitionPhase::Idle;
        self.content_key = None;
        self.next_key = None;
        self.pending = None;
    }

    fn begin_enter(&mut self, slide: bool) {
        self.phase = if slide {
            TransitionPhase::SlideEnterStart
        } else {
            TransitionPhase::EnterStart
        };
        self.enter_frame_id += 1;
        self.schedule(Wake::Frames(2));
    }

    fn begin_exit(&mut self) {
        self.phase = TransitionPhase::Exiting;
        self.exit_frame_id += 1;
        self.next_key = None;
        self.schedule(Wake::DelayMs(self.exit_ms));
    }

    fn begin_slide_exit(&mut self, key: &str) {
        self.phase = TransitionPhase::SlideExitStart;
        self.exit_frame_id += 1;
        self.next_key = Some(key.to_string());
        self.schedule(Wake::Frames(1));
    }

    fn schedule(&mut self, wake: Wake) {
        self.next_token += 1;
        self.pending = Some(PendingWake { token: self.next_token, wake });
    }
}

/// Browser frame and timer waits for driving the controller.
#[cfg(feature = "web")]
pub mod web {
    use wasm_bindgen_futures::JsFuture;

    /// Resolve after the next animation frame callback.
    pub async fn next_animation_frame() -> Result<(), String> {
        let window = web_sys::window().ok_or("No window available")?;
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            let _ = window.request_animation_frame(&resolve);
        });
        JsFuture::from(promise)
            .await
            .map_err(|_| "Failed to wait for animation frame")?;
        Ok(())
    }

    /// Resolve once the browser has committed the current paint.
    ///
    /// Two stacked frame callbacks: the first fires before the paint
    /// is committed, the second demonstrably after.
    pub async fn after_paint_commit() -> Result<(), String> {
        next_animation_frame().await?;
        next_animation_frame().await?;
        Ok(())
    }

    /// Resolve after a timeout.
    pub async fn sleep_ms(ms: u32) -> Result<(), String> {
        let window = web_sys::window().ok_or("No window available")?;
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            let _ = window
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms as i32);
        });
        JsFuture::from(promise)
            .await
            .map_err(|_| "Failed to wait for timeout")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Drive a full enter from idle to visible, asserting each phase.
    fn enter(ctrl: &mut TransitionController, key: &str) {
        ctrl.update(key, true);
        let pending = ctrl.pending().unwrap();
        ctrl.frame_committed(pending.token);
        ctrl.frame_committed(pending.token);
        assert_eq!(ctrl.phase(), TransitionPhase::Entering);
        ctrl.enter_finished();
        assert_eq!(ctrl.phase(), TransitionPhase::Visible);
    }

    #[test]
    fn test_enter_sequence() {
        let mut ctrl = TransitionController::new(400);
        assert_eq!(ctrl.phase(), TransitionPhase::Idle);

        ctrl.update("song|Amazing grace", true);
        assert_eq!(ctrl.phase(), TransitionPhase::EnterStart);
        assert_eq!(ctrl.enter_frame_id(), 1);

        let pending = ctrl.pending().unwrap();
        assert_eq!(pending.wake, Wake::Frames(2));

        // first committed paint: still showing the hidden state
        ctrl.frame_committed(pending.token);
        assert_eq!(ctrl.phase(), TransitionPhase::EnterStart);
        assert_eq!(ctrl.pending().unwrap().wake, Wake::Frames(1));
        assert_eq!(ctrl.pending().unwrap().token, pending.token);

        // second committed paint: enter treatments apply
        ctrl.frame_committed(pending.token);
        assert_eq!(ctrl.phase(), TransitionPhase::Entering);
        assert!(ctrl.pending().is_none());

        ctrl.enter_finished();
        assert_eq!(ctrl.phase(), TransitionPhase::Visible);
    }

    #[test]
    fn test_hidden_content_waits_in_idle() {
        let mut ctrl = TransitionController::new(400);
        ctrl.update("song|Amazing grace", false);
        assert_eq!(ctrl.phase(), TransitionPhase::Idle);
        assert!(ctrl.pending().is_none());
        assert_eq!(ctrl.content_key(), Some("song|Amazing grace"));

        ctrl.update("song|Amazing grace", true);
        assert_eq!(ctrl.phase(), TransitionPhase::EnterStart);
    }

    #[test]
    fn test_exit_returns_to_idle() {
        let mut ctrl = TransitionController::new(400);
        enter(&mut ctrl, "a");

        ctrl.update("a", false);
        assert_eq!(ctrl.phase(), TransitionPhase::Exiting);
        assert_eq!(ctrl.exit_frame_id(), 1);
        let pending = ctrl.pending().unwrap();
        assert_eq!(pending.wake, Wake::DelayMs(400));

        ctrl.delay_elapsed(pending.token);
        assert_eq!(ctrl.phase(), TransitionPhase::Idle);
        assert!(ctrl.pending().is_none());
    }

    #[test]
    fn test_content_change_while_visible_slides() {
        let mut ctrl = TransitionController::new(400);
        enter(&mut ctrl, "a");
        let mut phases = vec![ctrl.phase()];

        // old content slides out first
        ctrl.update("b", true);
        phases.push(ctrl.phase());
        assert_eq!(ctrl.content_key(), Some("a"));
        assert_eq!(ctrl.next_key(), Some("b"));
        let pending = ctrl.pending().unwrap();
        assert_eq!(pending.wake, Wake::Frames(1));

        ctrl.frame_committed(pending.token);
        phases.push(ctrl.phase());
        assert_eq!(ctrl.pending().unwrap().wake, Wake::DelayMs(400 + SLIDE_SETTLE_MS));

        // exit settles, then the new content enters
        ctrl.delay_elapsed(ctrl.pending().unwrap().token);
        phases.push(ctrl.phase());
        assert_eq!(ctrl.content_key(), Some("b"));
        assert_eq!(ctrl.next_key(), None);

        let pending = ctrl.pending().unwrap();
        ctrl.frame_committed(pending.token);
        ctrl.frame_committed(pending.token);
        phases.push(ctrl.phase());
        ctrl.enter_finished();
        phases.push(ctrl.phase());

        assert_eq!(
            phases,
            vec![
                TransitionPhase::Visible,
                TransitionPhase::SlideExitStart,
                TransitionPhase::SlideExiting,
                TransitionPhase::EnterStart,
                TransitionPhase::Entering,
                TransitionPhase::Visible,
            ]
        );
    }

    #[test]
    fn test_stale_tokens_are_ignored() {
        let mut ctrl = TransitionController::new(400);
        ctrl.update("a", true);
        let stale = ctrl.pending().unwrap().token;

        // hiding supersedes the enter before its paints arrive
        ctrl.update("a", false);
        assert_eq!(ctrl.phase(), TransitionPhase::Exiting);
        let current = ctrl.pending().unwrap().token;
        assert_ne!(stale, current);

        ctrl.frame_committed(stale);
        assert_eq!(ctrl.phase(), TransitionPhase::Exiting);
        ctrl.delay_elapsed(stale);
        assert_eq!(ctrl.phase(), TransitionPhase::Exiting);

        ctrl.delay_elapsed(current);
        assert_eq!(ctrl.phase(), TransitionPhase::Idle);
    }

    #[test]
    fn test_rapid_changes_retarget_the_running_slide() {
        let mut ctrl = TransitionController::new(400);
        enter(&mut ctrl, "a");

        ctrl.update("b", true);
        let pending = ctrl.pending().unwrap();
        let exit_id = ctrl.exit_frame_id();

        // a second change mid-slide redirects the destination only
        ctrl.update("c", true);
        assert_eq!(ctrl.phase(), TransitionPhase::SlideExitStart);
        assert_eq!(ctrl.next_key(), Some("c"));
        assert_eq!(ctrl.pending().unwrap(), pending);
        assert_eq!(ctrl.exit_frame_id(), exit_id);

        ctrl.frame_committed(pending.token);
        ctrl.delay_elapsed(ctrl.pending().unwrap().token);
        assert_eq!(ctrl.phase(), TransitionPhase::EnterStart);
        assert_eq!(ctrl.content_key(), Some("c"));
    }

    #[test]
    fn test_hiding_mid_slide_becomes_a_plain_exit() {
        let mut ctrl = TransitionController::new(400);
        enter(&mut ctrl, "a");

        ctrl.update("b", true);
        assert_eq!(ctrl.phase(), TransitionPhase::SlideExitStart);

        ctrl.update("b", false);
        assert_eq!(ctrl.phase(), TransitionPhase::Exiting);
        assert_eq!(ctrl.next_key(), None);
        let pending = ctrl.pending().unwrap();
        assert_eq!(pending.wake, Wake::DelayMs(400));

        ctrl.delay_elapsed(pending.token);
        assert_eq!(ctrl.phase(), TransitionPhase::Idle);
    }

    #[test]
    fn test_reshowing_cancels_the_exit() {
        let mut ctrl = TransitionController::new(400);
        enter(&mut ctrl, "a");

        ctrl.update("a", false);
        let stale = ctrl.pending().unwrap().token;

        ctrl.update("a", true);
        assert_eq!(ctrl.phase(), TransitionPhase::EnterStart);

        // the abandoned exit must not blank the re-entered content
        ctrl.delay_elapsed(stale);
        assert_eq!(ctrl.phase(), TransitionPhase::EnterStart);
    }

    #[test]
    fn test_new_content_during_exit_slides_in() {
        let mut ctrl = TransitionController::new(400);
        enter(&mut ctrl, "a");
        let enter_id = ctrl.enter_frame_id();

        ctrl.update("a", false);
        assert_eq!(ctrl.phase(), TransitionPhase::Exiting);

        ctrl.update("b", true);
        assert_eq!(ctrl.phase(), TransitionPhase::SlideEnterStart);
        assert_eq!(ctrl.content_key(), Some("b"));
        assert_eq!(ctrl.enter_frame_id(), enter_id + 1);
        let pending = ctrl.pending().unwrap();
        assert_eq!(pending.wake, Wake::Frames(2));

        ctrl.frame_committed(pending.token);
        ctrl.frame_committed(pending.token);
        assert_eq!(ctrl.phase(), TransitionPhase::Entering);
    }

    #[test]
    fn test_redundant_updates_are_no_ops() {
        let mut ctrl = TransitionController::new(400);
        enter(&mut ctrl, "a");
        let ids = (ctrl.enter_frame_id(), ctrl.exit_frame_id());

        ctrl.update("a", true);
        assert_eq!(ctrl.phase(), TransitionPhase::Visible);
        assert!(ctrl.pending().is_none());
        assert_eq!((ctrl.enter_frame_id(), ctrl.exit_frame_id()), ids);
    }

    #[test]
    fn test_frame_callbacks_do_not_satisfy_delay_waits() {
        let mut ctrl = TransitionController::new(400);
        enter(&mut ctrl, "a");
        ctrl.update("a", false);

        let pending = ctrl.pending().unwrap();
        ctrl.frame_committed(pending.token);
        assert_eq!(ctrl.phase(), TransitionPhase::Exiting);
        assert_eq!(ctrl.pending(), Some(pending));
    }

    #[test]
    fn test_exit_duration_is_configurable() {
        let mut ctrl = TransitionController::new(250);
        enter(&mut ctrl, "a");

        ctrl.update("b", true);
        ctrl.frame_committed(ctrl.pending().unwrap().token);
        assert_eq!(ctrl.pending().unwrap().wake, Wake::DelayMs(250 + SLIDE_SETTLE_MS));

        ctrl.set_exit_ms(100);
        ctrl.update("b", false);
        assert_eq!(ctrl.pending().unwrap().wake, Wake::DelayMs(100));
    }

    #[test]
    fn test_reset_clears_state_but_keeps_ids_monotonic() {
        let mut ctrl = TransitionController::new(400);
        enter(&mut ctrl, "a");
        ctrl.update("b", true);
        let ids = (ctrl.enter_frame_id(), ctrl.exit_frame_id());

        ctrl.reset();
        assert_eq!(ctrl.phase(), TransitionPhase::Idle);
        assert_eq!(ctrl.content_key(), None);
        assert_eq!(ctrl.next_key(), None);
        assert!(ctrl.pending().is_none());
        assert_eq!((ctrl.enter_frame_id(), ctrl.exit_frame_id()), ids);

        // the machine starts cleanly after a reset
        ctrl.update("c", true);
        assert_eq!(ctrl.phase(), TransitionPhase::EnterStart);
        assert_eq!(ctrl.enter_frame_id(), ids.0 + 1);
    }

    #[test]
    fn test_phase_serde_names() {
        assert_eq!(
            serde_json::to_string(&TransitionPhase::SlideExitStart).unwrap(),
            "\"slideExitStart\""
        );
        assert_eq!(
            serde_json::from_str::<TransitionPhase>("\"enterStart\"").unwrap(),
            TransitionPhase::EnterStart
        );
    }

    proptest! {
        /// Whatever the event order, the machine holds a wake exactly
        /// in the phases that wait on one, and stale callbacks never
        /// change observable state.
        #[test]
        fn wake_bookkeeping_follows_phase(ops in proptest::collection::vec(0u8..6, 1..40)) {
            let keys = ["a", "b", "c"];
            let mut ctrl = TransitionController::new(100);

            for (i, op) in ops.iter().enumerate() {
                match op {
                    0 => ctrl.update(keys[i % keys.len()], true),
                    1 => ctrl.update(keys[i % keys.len()], false),
                    2 => {
                        if let Some(pending) = ctrl.pending() {
                            ctrl.frame_committed(pending.token);
                        }
                    }
                    3 => {
                        if let Some(pending) = ctrl.pending() {
                            ctrl.delay_elapsed(pending.token);
                        }
                    }
                    4 => ctrl.enter_finished(),
                    _ => {
                        let before = (ctrl.phase(), ctrl.pending());
                        ctrl.frame_committed(u64::MAX);
                        ctrl.delay_elapsed(u64::MAX);
                        prop_assert_eq!((ctrl.phase(), ctrl.pending()), before);
                    }
                }

                let wants_wake = matches!(
                    ctrl.phase(),
                    TransitionPhase::EnterStart
                        | TransitionPhase::SlideEnterStart
                        | TransitionPhase::Exiting
                        | TransitionPhase::SlideExitStart
                        | TransitionPhase::SlideExiting
                );
                prop_assert_eq!(ctrl.pending().is_some(), wants_wake);

                // queued content only exists while a slide exit runs
                if ctrl.next_key().is_some() {
                    prop_assert!(matches!(
                        ctrl.phase(),
                        TransitionPhase::SlideExitStart | TransitionPhase::SlideExiting
                    ));
                }
            }
        }
    }
}
