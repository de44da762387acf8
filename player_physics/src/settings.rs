use std::fmt;
use std::fs;
use std::path::Path;

use character_motor_physics::{ModelVersion, MotorConfig};
use serde::Deserialize;

use crate::PluginConfig;

const SETTINGS_VERSION: u32 = 1;

/// Movement settings file (`movement.toml`).
///
/// ```toml
/// version = 1
/// model = "refined"
///
/// [constants]
/// friction = 5.0
/// air_acceleration = 1.0
///
/// [features]
/// speed_cap = true
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MovementSettings {
    pub version: u32,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub constants: ConstantOverrides,
    #[serde(default)]
    pub features: FeatureOverrides,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstantOverrides {
    #[serde(default)]
    pub friction: Option<f32>,
    #[serde(default)]
    pub acceleration: Option<f32>,
    #[serde(default)]
    pub air_acceleration: Option<f32>,
    #[serde(default)]
    pub stop_speed: Option<f32>,
    #[serde(default)]
    pub air_speed: Option<f32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureOverrides {
    #[serde(default)]
    pub slope_scaling: Option<bool>,
    #[serde(default)]
    pub slope_projection: Option<bool>,
    #[serde(default)]
    pub speed_cap: Option<bool>,
    #[serde(default)]
    pub ground_vertical_writeback: Option<bool>,
    #[serde(default)]
    pub camera_gate: Option<bool>,
    #[serde(default)]
    pub jump_repression: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct SettingsValidation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl SettingsValidation {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(String),
    Invalid(Vec<String>),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(err) => write!(f, "settings io error: {}", err),
            SettingsError::Parse(message) => write!(f, "settings parse error: {}", message),
            SettingsError::Invalid(errors) => {
                write!(f, "invalid settings: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(err: std::io::Error) -> Self {
        SettingsError::Io(err)
    }
}

impl MovementSettings {
    pub fn parse_toml(text: &str) -> Result<Self, SettingsError> {
        toml::from_str(text).map_err(|err| SettingsError::Parse(err.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path)?;
        Self::parse_toml(&text)
    }

    /// Model named by the file, defaulting to the refined model when absent.
    pub fn model_version(&self) -> Option<ModelVersion> {
        match &self.model {
            Some(name) => ModelVersion::parse(name),
            None => Some(ModelVersion::default()),
        }
    }

    pub fn validate(&self) -> SettingsValidation {
        let mut validation = SettingsValidation::default();
        if self.version != SETTINGS_VERSION {
            validation
                .errors
                .push(format!("unsupported settings version {}", self.version));
        }
        if self.model_version().is_none() {
            validation.errors.push(format!(
                "unknown model '{}'",
                self.model.as_deref().unwrap_or_default()
            ));
        }
        let constants = &self.constants;
        for (name, value) in [
            ("friction", constants.friction),
            ("acceleration", constants.acceleration),
            ("air_acceleration", constants.air_acceleration),
            ("stop_speed", constants.stop_speed),
            ("air_speed", constants.air_speed),
        ] {
            let Some(value) = value else {
                continue;
            };
            if !value.is_finite() || value < 0.0 {
                validation
                    .errors
                    .push(format!("{} must be finite and >= 0", name));
            }
        }
        if constants.friction == Some(0.0) {
            validation
                .warnings
                .push("friction is 0; ground movement will never slow down".to_string());
        }
        if constants.acceleration == Some(0.0) {
            validation
                .warnings
                .push("acceleration is 0; ground input has no effect".to_string());
        }
        validation
    }

    pub fn to_config(&self) -> Result<PluginConfig, SettingsError> {
        let validation = self.validate();
        if !validation.is_ok() {
            return Err(SettingsError::Invalid(validation.errors));
        }
        for warning in &validation.warnings {
            log::warn!(target: crate::LOG_TARGET, "movement settings: {}", warning);
        }

        let version = self.model_version().unwrap_or_default();
        let mut config = PluginConfig::for_version(version);
        apply_constants(&mut config.motor, &self.constants);
        let features = &self.features;
        let motor_features = &mut config.motor.features;
        override_flag(&mut motor_features.slope_scaling, features.slope_scaling);
        override_flag(&mut motor_features.slope_projection, features.slope_projection);
        override_flag(&mut motor_features.speed_cap, features.speed_cap);
        override_flag(
            &mut motor_features.ground_vertical_writeback,
            features.ground_vertical_writeback,
        );
        override_flag(&mut config.camera_gate, features.camera_gate);
        override_flag(&mut config.jump_repression, features.jump_repression);
        Ok(config)
    }
}

fn apply_constants(motor: &mut MotorConfig, overrides: &ConstantOverrides) {
    let constants = &mut motor.constants;
    if let Some(value) = overrides.friction {
        constants.friction = value;
    }
    if let Some(value) = overrides.acceleration {
        constants.ground_accel = value;
    }
    if let Some(value) = overrides.air_acceleration {
        constants.air_accel = value;
    }
    if let Some(value) = overrides.stop_speed {
        constants.stop_speed = value;
    }
    if let Some(value) = overrides.air_speed {
        constants.air_speed = value;
    }
}

fn override_flag(flag: &mut bool, value: Option<bool>) {
    if let Some(value) = value {
        *flag = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_file_is_refined_preset() {
        let settings = MovementSettings::parse_toml("version = 1\n").unwrap();
        let config = settings.to_config().unwrap();
        assert_eq!(config, PluginConfig::for_version(ModelVersion::Refined));
    }

    #[test]
    fn overrides_apply_on_top_of_preset() {
        let text = r#"
version = 1
model = "initial"

[constants]
air_acceleration = 2.5
stop_speed = 4.0

[features]
speed_cap = true
jump_repression = true
"#;
        let config = MovementSettings::parse_toml(text)
            .unwrap()
            .to_config()
            .unwrap();
        assert_eq!(config.motor.version, ModelVersion::Initial);
        assert_eq!(config.motor.constants.air_accel, 2.5);
        assert_eq!(config.motor.constants.stop_speed, 4.0);
        assert_eq!(config.motor.constants.air_speed, 0.1);
        assert!(config.motor.features.speed_cap);
        assert!(!config.motor.features.slope_projection);
        assert!(config.jump_repression);
        assert!(!config.camera_gate);
    }

    #[test]
    fn invalid_values_are_reported() {
        let text = r#"
version = 2
model = "turbo"

[constants]
friction = -1.0
"#;
        let settings = MovementSettings::parse_toml(text).unwrap();
        let validation = settings.validate();
        assert_eq!(validation.errors.len(), 3);
        match settings.to_config() {
            Err(SettingsError::Invalid(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected invalid settings, got {:?}", other),
        }
    }

    #[test]
    fn zero_friction_is_only_a_warning() {
        let text = "version = 1\n[constants]\nfriction = 0.0\n";
        let settings = MovementSettings::parse_toml(text).unwrap();
        let validation = settings.validate();
        assert!(validation.is_ok());
        assert_eq!(validation.warnings.len(), 1);
        assert_eq!(settings.to_config().unwrap().motor.constants.friction, 0.0);
    }

    #[test]
    fn unknown_keys_fail_to_parse() {
        let err = MovementSettings::parse_toml("version = 1\nfrction = 2.0\n").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = MovementSettings::load(Path::new("does/not/exist/movement.toml")).unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }
}
