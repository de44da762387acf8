//! Player movement motor (per-tick velocity update, host Z-up frame).
#![forbid(unsafe_code)]

use std::fmt;

use rapier3d::math::Vector;
use rapier3d::prelude::Real;

/// Input shorter than this is treated as "no input" and skips acceleration.
pub const MIN_MOVE_LENGTH: Real = 1.0e-4;
const SLOPE_EPS: Real = 1.0e-4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControllerState {
    OnGround,
    Jumping,
    InAir,
    Climbing,
    Flying,
    Swimming,
    Other(u32),
}

impl ControllerState {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => ControllerState::OnGround,
            1 => ControllerState::Jumping,
            2 => ControllerState::InAir,
            3 => ControllerState::Climbing,
            4 => ControllerState::Flying,
            5 => ControllerState::Swimming,
            other => ControllerState::Other(other),
        }
    }

    pub fn as_raw(self) -> u32 {
        match self {
            ControllerState::OnGround => 0,
            ControllerState::Jumping => 1,
            ControllerState::InAir => 2,
            ControllerState::Climbing => 3,
            ControllerState::Flying => 4,
            ControllerState::Swimming => 5,
            ControllerState::Other(raw) => raw,
        }
    }

    pub fn is_airborne(self) -> bool {
        self == ControllerState::InAir
    }

    /// True when a jump state heading toward `self` leaves the ground for real.
    pub fn completes_jump(self) -> bool {
        !matches!(self, ControllerState::OnGround | ControllerState::Climbing)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "on-ground" | "on_ground" | "ground" => Some(ControllerState::OnGround),
            "jumping" => Some(ControllerState::Jumping),
            "in-air" | "in_air" | "air" => Some(ControllerState::InAir),
            "climbing" => Some(ControllerState::Climbing),
            "flying" => Some(ControllerState::Flying),
            "swimming" => Some(ControllerState::Swimming),
            _ => None,
        }
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerState::OnGround => write!(f, "on-ground"),
            ControllerState::Jumping => write!(f, "jumping"),
            ControllerState::InAir => write!(f, "in-air"),
            ControllerState::Climbing => write!(f, "climbing"),
            ControllerState::Flying => write!(f, "flying"),
            ControllerState::Swimming => write!(f, "swimming"),
            ControllerState::Other(raw) => write!(f, "state-{}", raw),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModelVersion {
    Initial,
    #[default]
    Refined,
}

impl ModelVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelVersion::Initial => "initial",
            ModelVersion::Refined => "refined",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "initial" | "v1" => Some(ModelVersion::Initial),
            "refined" | "v2" => Some(ModelVersion::Refined),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotorConstants {
    pub friction: Real,
    pub stop_speed: Real,
    pub ground_accel: Real,
    pub air_accel: Real,
    pub air_speed: Real,
}

impl MotorConstants {
    pub fn for_version(version: ModelVersion) -> Self {
        match version {
            ModelVersion::Initial => Self {
                friction: 5.0,
                stop_speed: 8.0,
                ground_accel: 6.0,
                air_accel: 10.0,
                air_speed: 0.1,
            },
            ModelVersion::Refined => Self {
                friction: 5.0,
                stop_speed: 8.0,
                ground_accel: 6.0,
                air_accel: 1.0,
                air_speed: 1.0,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotorFeatures {
    /// Scale friction and acceleration by the ground normal's vertical component.
    pub slope_scaling: bool,
    /// Project the move direction onto the ground plane on slopes.
    pub slope_projection: bool,
    /// Never let acceleration push speed past `max(target, pre-accel speed)`.
    pub speed_cap: bool,
    /// Report the on-ground vertical velocity so the host keeps it.
    pub ground_vertical_writeback: bool,
}

impl MotorFeatures {
    pub fn for_version(version: ModelVersion) -> Self {
        let refined = version == ModelVersion::Refined;
        Self {
            slope_scaling: refined,
            slope_projection: refined,
            speed_cap: refined,
            ground_vertical_writeback: refined,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotorConfig {
    pub version: ModelVersion,
    pub constants: MotorConstants,
    pub features: MotorFeatures,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self::for_version(ModelVersion::default())
    }
}

impl MotorConfig {
    pub fn for_version(version: ModelVersion) -> Self {
        Self {
            version,
            constants: MotorConstants::for_version(version),
            features: MotorFeatures::for_version(version),
        }
    }

    pub fn initial() -> Self {
        Self::for_version(ModelVersion::Initial)
    }

    pub fn refined() -> Self {
        Self::for_version(ModelVersion::Refined)
    }

    /// Friction/acceleration scale for the current ground contact, in `[0, 1]`.
    pub fn slope_factor(&self, ground_normal: Vector<Real>) -> Real {
        if self.features.slope_scaling {
            ground_normal.z.clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

/// Host-supplied movement record for one tick.
///
/// `multiplier` and `max_speed` are carried for the host's own use; the model
/// derives its target speed from the input length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveParams {
    pub multiplier: Real,
    pub forward: Vector<Real>,
    pub up: Vector<Real>,
    pub ground_normal: Vector<Real>,
    pub velocity: Vector<Real>,
    pub input: Vector<Real>,
    pub max_speed: Real,
    pub surface_velocity: Vector<Real>,
}

impl Default for MoveParams {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            forward: Vector::new(0.0, 1.0, 0.0),
            up: Vector::new(0.0, 0.0, 1.0),
            ground_normal: Vector::new(0.0, 0.0, 1.0),
            velocity: Vector::zeros(),
            input: Vector::zeros(),
            max_speed: 0.0,
            surface_velocity: Vector::zeros(),
        }
    }
}

impl MoveParams {
    pub fn move_length(&self) -> Real {
        self.input.norm()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveIntent {
    pub dir: Vector<Real>,
    pub mag: Real,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VelocityUpdate {
    pub velocity: Vector<Real>,
    /// Vertical velocity the host must store in its own movement record.
    pub host_vertical: Option<Real>,
}

/// Run one tick: friction (when supported), then acceleration along the
/// resolved move direction, all relative to the supporting surface.
pub fn update_velocity(
    params: &MoveParams,
    velocity: Vector<Real>,
    state: ControllerState,
    dt: Real,
    config: &MotorConfig,
) -> VelocityUpdate {
    let dt = dt.max(0.0);
    let slope_factor = config.slope_factor(params.ground_normal);
    let mut relative = velocity - params.surface_velocity;

    if !state.is_airborne() {
        relative = apply_friction(relative, &config.constants, slope_factor, dt);
    }

    if let Some(intent) = resolve_move_intent(params, config.features.slope_projection) {
        relative = apply_acceleration(relative, state, intent, slope_factor, dt, config);
    }

    let velocity = relative + params.surface_velocity;
    let host_vertical = (config.features.ground_vertical_writeback
        && state == ControllerState::OnGround)
        .then_some(velocity.z);
    VelocityUpdate {
        velocity,
        host_vertical,
    }
}

pub fn apply_friction(
    velocity: Vector<Real>,
    constants: &MotorConstants,
    slope_factor: Real,
    dt: Real,
) -> Vector<Real> {
    let speed = velocity.norm();
    if speed <= 0.0 {
        return Vector::zeros();
    }
    let control = speed.max(constants.stop_speed);
    let friction = constants.friction * control * slope_factor * dt.max(0.0);
    if friction >= speed {
        return Vector::zeros();
    }
    velocity * (1.0 - friction / speed)
}

/// Unit move direction from the raw input, or `None` when there is no usable input.
///
/// The host's forward axis is negated: `input.x` points backward.
pub fn resolve_move_intent(params: &MoveParams, slope_projection: bool) -> Option<MoveIntent> {
    let mag = params.move_length();
    if mag < MIN_MOVE_LENGTH {
        return None;
    }
    let input = params.input;
    let right = params.forward.cross(&params.up);
    let raw = params.forward * -input.x + right * input.y + params.up * input.z;
    let dir = raw.try_normalize(MIN_MOVE_LENGTH)?;
    if !slope_projection {
        return Some(MoveIntent { dir, mag });
    }

    let normal = params.ground_normal;
    if normal.z <= SLOPE_EPS || normal.z >= 1.0 - SLOPE_EPS {
        return Some(MoveIntent { dir, mag });
    }
    let z = -(dir.x * normal.x + dir.y * normal.y) / normal.z;
    let dir = Vector::new(dir.x, dir.y, z)
        .try_normalize(MIN_MOVE_LENGTH)
        .unwrap_or(dir);
    Some(MoveIntent { dir, mag })
}

pub fn apply_acceleration(
    velocity: Vector<Real>,
    state: ControllerState,
    intent: MoveIntent,
    slope_factor: Real,
    dt: Real,
    config: &MotorConfig,
) -> Vector<Real> {
    let constants = &config.constants;
    let in_air = state.is_airborne();
    let current_speed = velocity.dot(&intent.dir);
    let target_speed = if in_air {
        intent.mag * constants.air_speed
    } else {
        intent.mag
    };
    if current_speed >= target_speed {
        return velocity;
    }
    let speed_cap = target_speed.max(velocity.norm());

    let accel = if in_air {
        constants.air_accel
    } else {
        constants.ground_accel
    };
    let accel_speed =
        (accel * intent.mag * slope_factor * dt.max(0.0)).min(target_speed - current_speed);
    let next = velocity + intent.dir * accel_speed;
    if !config.features.speed_cap {
        return next;
    }

    let next_speed = next.norm();
    if next_speed > speed_cap {
        next * (speed_cap / next_speed)
    } else {
        next
    }
}
