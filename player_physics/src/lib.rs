//! Player physics plugin: routes host movement calls through the velocity
//! model and keeps a held jump button from re-triggering.
#![forbid(unsafe_code)]

pub mod gate;
pub mod hooks;
pub mod host;
pub mod jump_input;
pub mod settings;

use std::fmt;

use character_motor_physics::{update_velocity, ModelVersion, MotorConfig};
use plugin_core::observability;

use gate::PhysicsGate;
use hooks::{
    HookError, HookInstaller, HookSite, OriginalInputPoll, OriginalJumpUpdate, OriginalMove,
};
use host::{
    AlignedVector4, CharacterMoveParams, ControlState, ControllerHandle, InputSource, KeyCode,
    PhysicsHost,
};
use jump_input::JumpInputGate;
use settings::SettingsError;

const LOG_TARGET: &str = "player_physics";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PluginConfig {
    pub motor: MotorConfig,
    /// Leave the host in charge while a special camera mode is active.
    pub camera_gate: bool,
    /// Install the jump hooks and swallow held jump input after a jump.
    pub jump_repression: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self::for_version(ModelVersion::default())
    }
}

impl PluginConfig {
    pub fn for_version(version: ModelVersion) -> Self {
        let refined = version == ModelVersion::Refined;
        Self {
            motor: MotorConfig::for_version(version),
            camera_gate: refined,
            jump_repression: refined,
        }
    }
}

#[derive(Debug)]
pub enum PluginError {
    Hook(HookError),
    Settings(SettingsError),
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginError::Hook(err) => write!(f, "player physics hook error: {}", err),
            PluginError::Settings(err) => write!(f, "player physics settings error: {}", err),
        }
    }
}

impl std::error::Error for PluginError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PluginError::Hook(err) => Some(err),
            PluginError::Settings(err) => Some(err),
        }
    }
}

impl From<HookError> for PluginError {
    fn from(err: HookError) -> Self {
        PluginError::Hook(err)
    }
}

impl From<SettingsError> for PluginError {
    fn from(err: SettingsError) -> Self {
        PluginError::Settings(err)
    }
}

/// Jump-button hooks, present only when jump repression is enabled.
pub struct JumpRepression {
    gate: PhysicsGate,
    input: JumpInputGate,
    original_poll: OriginalInputPoll,
    original_update: OriginalJumpUpdate,
}

impl JumpRepression {
    pub fn input_gate(&self) -> &JumpInputGate {
        &self.input
    }

    /// Replacement for the host's jump-button check. The requested control
    /// state is ignored: the press is always resolved as fresh-then-held.
    pub fn check_jump_button(
        &mut self,
        source: InputSource,
        key: KeyCode,
        _requested: ControlState,
    ) -> bool {
        let poll = &mut self.original_poll;
        self.input.check_button(|state| poll(source, key, state))
    }

    /// Replacement for the jumping state's velocity update.
    pub fn jumping_update_velocity<H: PhysicsHost + ?Sized>(
        &mut self,
        host: &H,
        controller: ControllerHandle,
    ) {
        let applies = self.gate.should_apply(host, controller);
        let wanted = host.wanted_state(controller);
        if self.input.on_jump_update(applies, wanted) {
            log::trace!(target: LOG_TARGET, "jump input consumed for {:?}", controller);
        }
        (self.original_update)(controller);
    }
}

pub struct PlayerPhysics {
    config: PluginConfig,
    gate: PhysicsGate,
    original_move: OriginalMove,
    jump: Option<JumpRepression>,
}

impl PlayerPhysics {
    /// Install every hook the config needs. A failed install is fatal and is
    /// also recorded as the plugin's last failure.
    pub fn load<I: HookInstaller + ?Sized>(
        installer: &mut I,
        config: PluginConfig,
    ) -> Result<Self, PluginError> {
        Self::install(installer, config).inspect_err(|err| {
            observability::report_failure(LOG_TARGET, err.to_string());
        })
    }

    fn install<I: HookInstaller + ?Sized>(
        installer: &mut I,
        config: PluginConfig,
    ) -> Result<Self, PluginError> {
        let gate = PhysicsGate::new(config.camera_gate);
        let original_move = installer.install(HookSite::MoveCharacter)?.into_move()?;
        let jump = if config.jump_repression {
            let original_poll = installer
                .install(HookSite::CheckJumpButton)?
                .into_input_poll()?;
            let original_update = installer
                .install(HookSite::JumpingUpdateVelocity)?
                .into_jump_update()?;
            Some(JumpRepression {
                gate,
                input: JumpInputGate::new(),
                original_poll,
                original_update,
            })
        } else {
            None
        };
        log::info!(
            target: LOG_TARGET,
            "player physics loaded (model={}, camera_gate={}, jump_repression={})",
            config.motor.version.as_str(),
            config.camera_gate,
            config.jump_repression
        );
        Ok(Self {
            config,
            gate,
            original_move,
            jump,
        })
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn gate(&self) -> PhysicsGate {
        self.gate
    }

    pub fn jump_repression(&self) -> Option<&JumpRepression> {
        self.jump.as_ref()
    }

    pub fn jump_repression_mut(&mut self) -> Option<&mut JumpRepression> {
        self.jump.as_mut()
    }

    /// Replacement for the host's character move call.
    pub fn move_character<H: PhysicsHost + ?Sized>(
        &mut self,
        host: &H,
        controller: ControllerHandle,
        params: &mut CharacterMoveParams,
        velocity: &mut AlignedVector4,
    ) {
        if !self.gate.should_apply(host, controller) {
            (self.original_move)(params, velocity);
            return;
        }
        let state = host.controller_state(controller);
        let dt = host.step_delta_time(controller);
        let update = update_velocity(
            &params.to_move_params(),
            velocity.to_vector(),
            state,
            dt,
            &self.config.motor,
        );
        host::write_back(&update, params, velocity);
    }
}

impl fmt::Debug for PlayerPhysics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerPhysics")
            .field("config", &self.config)
            .field("jump_repression", &self.jump.is_some())
            .finish()
    }
}
