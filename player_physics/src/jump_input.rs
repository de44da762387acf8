use character_motor_physics::ControllerState;

use crate::host::ControlState;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JumpInputState {
    /// The current press (if any) has not triggered a jump yet.
    #[default]
    Idle,
    /// The held press already started a jump; swallow it until released.
    Consumed,
}

/// Keeps a held jump button from re-triggering a jump on landing.
///
/// The input poll and the jump-state update run on the host's simulation
/// thread in a host-defined order; this type relies on that order and does
/// no synchronisation of its own.
#[derive(Clone, Copy, Debug, Default)]
pub struct JumpInputGate {
    state: JumpInputState,
}

impl JumpInputGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> JumpInputState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = JumpInputState::Idle;
    }

    /// Answer a jump-button poll. `poll` queries the host's original check
    /// for the given control state.
    pub fn check_button(&mut self, mut poll: impl FnMut(ControlState) -> bool) -> bool {
        if poll(ControlState::Pressed) {
            self.state = JumpInputState::Idle;
            return true;
        }
        if self.state == JumpInputState::Consumed {
            return false;
        }
        poll(ControlState::Held)
    }

    /// Mark the press as consumed when a gated jump is about to happen.
    /// Returns whether the state changed to `Consumed` on this call.
    pub fn on_jump_update(&mut self, applies: bool, wanted: ControllerState) -> bool {
        if !applies || !wanted.completes_jump() {
            return false;
        }
        let changed = self.state != JumpInputState::Consumed;
        self.state = JumpInputState::Consumed;
        changed
    }
}
