//! Host-side data layouts and the queries the plugin makes against the host.

use character_motor_physics::{ControllerState, MoveParams, VelocityUpdate};
use rapier3d::math::Vector;
use rapier3d::prelude::Real;

#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AlignedVector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl AlignedVector4 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn to_vector(self) -> Vector<Real> {
        Vector::new(self.x, self.y, self.z)
    }

    /// Overwrite the xyz lanes, keeping the padding lane.
    pub fn set_xyz(&mut self, value: Vector<Real>) {
        self.x = value.x;
        self.y = value.y;
        self.z = value.z;
    }
}

impl From<Vector<Real>> for AlignedVector4 {
    fn from(value: Vector<Real>) -> Self {
        Self::new(value.x, value.y, value.z, 0.0)
    }
}

impl From<AlignedVector4> for Vector<Real> {
    fn from(value: AlignedVector4) -> Self {
        value.to_vector()
    }
}

/// Mirror of the host's move-parameter record, in host field order.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CharacterMoveParams {
    pub multiplier: f32,
    pub forward: AlignedVector4,
    pub up: AlignedVector4,
    pub ground_normal: AlignedVector4,
    pub velocity: AlignedVector4,
    pub input: AlignedVector4,
    pub max_speed: f32,
    pub surface_velocity: AlignedVector4,
}

impl CharacterMoveParams {
    pub fn to_move_params(&self) -> MoveParams {
        MoveParams {
            multiplier: self.multiplier,
            forward: self.forward.to_vector(),
            up: self.up.to_vector(),
            ground_normal: self.ground_normal.to_vector(),
            velocity: self.velocity.to_vector(),
            input: self.input.to_vector(),
            max_speed: self.max_speed,
            surface_velocity: self.surface_velocity.to_vector(),
        }
    }
}

impl From<&MoveParams> for CharacterMoveParams {
    fn from(params: &MoveParams) -> Self {
        Self {
            multiplier: params.multiplier,
            forward: params.forward.into(),
            up: params.up.into(),
            ground_normal: params.ground_normal.into(),
            velocity: params.velocity.into(),
            input: params.input.into(),
            max_speed: params.max_speed,
            surface_velocity: params.surface_velocity.into(),
        }
    }
}

/// Apply a tick result to the host's in/out velocity and movement record.
pub fn write_back(
    update: &VelocityUpdate,
    params: &mut CharacterMoveParams,
    velocity: &mut AlignedVector4,
) {
    velocity.set_xyz(update.velocity);
    if let Some(vertical) = update.host_vertical {
        params.velocity.z = vertical;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ControllerHandle(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InputSource(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u32);

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlState {
    Held = 0,
    Pressed = 1,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CameraMode {
    #[default]
    Default,
    /// Any scripted or targeting view that takes over the player camera.
    Special(u32),
}

impl CameraMode {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => CameraMode::Default,
            other => CameraMode::Special(other),
        }
    }
}

pub trait PhysicsHost {
    fn player_controller(&self) -> Option<ControllerHandle>;

    fn camera_mode(&self) -> CameraMode;

    fn controller_state(&self, controller: ControllerHandle) -> ControllerState;

    /// State the controller's jump state is about to hand over to.
    fn wanted_state(&self, controller: ControllerHandle) -> ControllerState;

    fn step_delta_time(&self, controller: ControllerHandle) -> Real;
}
