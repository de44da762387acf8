//! Interception seam: the plugin asks an installer to redirect a host call
//! site and receives the original behaviour back as a callable.

use std::fmt;

use crate::host::{
    AlignedVector4, CharacterMoveParams, ControlState, ControllerHandle, InputSource, KeyCode,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookSite {
    MoveCharacter,
    CheckJumpButton,
    JumpingUpdateVelocity,
}

impl HookSite {
    pub fn as_str(self) -> &'static str {
        match self {
            HookSite::MoveCharacter => "move_character",
            HookSite::CheckJumpButton => "check_jump_button",
            HookSite::JumpingUpdateVelocity => "jumping_update_velocity",
        }
    }
}

impl fmt::Display for HookSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub type OriginalMove = Box<dyn FnMut(&mut CharacterMoveParams, &mut AlignedVector4)>;
pub type OriginalInputPoll = Box<dyn FnMut(InputSource, KeyCode, ControlState) -> bool>;
pub type OriginalJumpUpdate = Box<dyn FnMut(ControllerHandle)>;

pub enum OriginalEntry {
    Move(OriginalMove),
    InputPoll(OriginalInputPoll),
    JumpUpdate(OriginalJumpUpdate),
}

impl OriginalEntry {
    pub fn site(&self) -> HookSite {
        match self {
            OriginalEntry::Move(_) => HookSite::MoveCharacter,
            OriginalEntry::InputPoll(_) => HookSite::CheckJumpButton,
            OriginalEntry::JumpUpdate(_) => HookSite::JumpingUpdateVelocity,
        }
    }

    pub fn into_move(self) -> Result<OriginalMove, HookError> {
        match self {
            OriginalEntry::Move(original) => Ok(original),
            other => Err(HookError::mismatch(HookSite::MoveCharacter, &other)),
        }
    }

    pub fn into_input_poll(self) -> Result<OriginalInputPoll, HookError> {
        match self {
            OriginalEntry::InputPoll(original) => Ok(original),
            other => Err(HookError::mismatch(HookSite::CheckJumpButton, &other)),
        }
    }

    pub fn into_jump_update(self) -> Result<OriginalJumpUpdate, HookError> {
        match self {
            OriginalEntry::JumpUpdate(original) => Ok(original),
            other => Err(HookError::mismatch(HookSite::JumpingUpdateVelocity, &other)),
        }
    }
}

impl fmt::Debug for OriginalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OriginalEntry({})", self.site())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    Rejected { site: HookSite, reason: String },
    OriginalMismatch { expected: HookSite, found: HookSite },
}

impl HookError {
    fn mismatch(expected: HookSite, found: &OriginalEntry) -> Self {
        HookError::OriginalMismatch {
            expected,
            found: found.site(),
        }
    }
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookError::Rejected { site, reason } => {
                write!(f, "hook install rejected at {}: {}", site, reason)
            }
            HookError::OriginalMismatch { expected, found } => write!(
                f,
                "installer returned the {} original for {}",
                found, expected
            ),
        }
    }
}

impl std::error::Error for HookError {}

/// Redirects a host call site to the plugin.
///
/// Each site is installed once; afterwards the host always calls the plugin,
/// and the returned original stays callable for pass-through.
pub trait HookInstaller {
    fn install(&mut self, site: HookSite) -> Result<OriginalEntry, HookError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_unwrap_only_for_their_site() {
        let entry = OriginalEntry::JumpUpdate(Box::new(|_: ControllerHandle| {}));
        assert_eq!(entry.site(), HookSite::JumpingUpdateVelocity);
        let err = entry.into_move().err().unwrap();
        assert_eq!(
            err,
            HookError::OriginalMismatch {
                expected: HookSite::MoveCharacter,
                found: HookSite::JumpingUpdateVelocity,
            }
        );
        assert_eq!(
            err.to_string(),
            "installer returned the jumping_update_velocity original for move_character"
        );

        let mut calls = 0;
        let entry = OriginalEntry::InputPoll(Box::new(
            |_: InputSource, _: KeyCode, state: ControlState| state == ControlState::Held,
        ));
        let mut poll = entry.into_input_poll().unwrap();
        if poll(InputSource(0), KeyCode(57), ControlState::Held) {
            calls += 1;
        }
        assert_eq!(calls, 1);
    }
}
