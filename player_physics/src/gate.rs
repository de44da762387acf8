use crate::host::{CameraMode, ControllerHandle, PhysicsHost};

/// Decides whether a host call is handled by the velocity model or passed
/// through to the original untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicsGate {
    camera_gate: bool,
}

impl PhysicsGate {
    pub fn new(camera_gate: bool) -> Self {
        Self { camera_gate }
    }

    pub fn camera_gate(&self) -> bool {
        self.camera_gate
    }

    pub fn should_apply<H: PhysicsHost + ?Sized>(
        &self,
        host: &H,
        controller: ControllerHandle,
    ) -> bool {
        if host.player_controller() != Some(controller) {
            return false;
        }
        !self.camera_gate || host.camera_mode() == CameraMode::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use character_motor_physics::ControllerState;
    use rapier3d::prelude::Real;

    struct StubHost {
        player: Option<ControllerHandle>,
        camera: CameraMode,
    }

    impl PhysicsHost for StubHost {
        fn player_controller(&self) -> Option<ControllerHandle> {
            self.player
        }

        fn camera_mode(&self) -> CameraMode {
            self.camera
        }

        fn controller_state(&self, _controller: ControllerHandle) -> ControllerState {
            ControllerState::OnGround
        }

        fn wanted_state(&self, _controller: ControllerHandle) -> ControllerState {
            ControllerState::OnGround
        }

        fn step_delta_time(&self, _controller: ControllerHandle) -> Real {
            1.0 / 60.0
        }
    }

    #[test]
    fn only_the_player_controller_passes() {
        let host = StubHost {
            player: Some(ControllerHandle(7)),
            camera: CameraMode::Default,
        };
        let gate = PhysicsGate::new(true);
        assert!(gate.should_apply(&host, ControllerHandle(7)));
        assert!(!gate.should_apply(&host, ControllerHandle(8)));

        let no_player = StubHost {
            player: None,
            camera: CameraMode::Default,
        };
        assert!(!gate.should_apply(&no_player, ControllerHandle(7)));
    }

    #[test]
    fn special_camera_blocks_only_when_gated() {
        let host = StubHost {
            player: Some(ControllerHandle(1)),
            camera: CameraMode::Special(2),
        };
        assert!(!PhysicsGate::new(true).should_apply(&host, ControllerHandle(1)));
        assert!(PhysicsGate::new(false).should_apply(&host, ControllerHandle(1)));
    }
}
