use std::path::{Path, PathBuf};

use character_motor_physics::{update_velocity, ControllerState, ModelVersion, MoveParams};
use clap::{Parser, Subcommand, ValueEnum};
use player_physics::settings::MovementSettings;
use player_physics::PluginConfig;
use rapier3d::math::Vector;
use rapier3d::prelude::Real;

const EXIT_SUCCESS: i32 = 0;
const EXIT_USAGE: i32 = 2;
const EXIT_SETTINGS: i32 = 10;

#[derive(Parser)]
#[command(name = "tools", version, about = "Player physics tools CLI")]
struct Cli {
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Step the velocity model and print each tick.
    Simulate(SimulateArgs),
    /// Print the resolved movement config.
    Constants(ModelArgs),
}

#[derive(Parser)]
struct ModelArgs {
    #[arg(long, value_enum, conflicts_with = "settings")]
    model: Option<ModelArg>,

    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,
}

#[derive(Parser)]
struct SimulateArgs {
    #[command(flatten)]
    model: ModelArgs,

    #[arg(long, value_parser = parse_state, default_value = "on-ground")]
    state: ControllerState,

    #[arg(long, default_value_t = 10)]
    ticks: u32,

    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: Real,

    #[arg(long, value_parser = parse_vector, value_name = "X,Y,Z")]
    input: Vector<Real>,

    #[arg(long, value_parser = parse_vector, value_name = "X,Y,Z")]
    velocity: Option<Vector<Real>>,

    #[arg(long, value_parser = parse_vector, value_name = "X,Y,Z")]
    normal: Option<Vector<Real>>,
}

#[derive(ValueEnum, Clone, Copy)]
enum ModelArg {
    Initial,
    Refined,
}

impl From<ModelArg> for ModelVersion {
    fn from(model: ModelArg) -> Self {
        match model {
            ModelArg::Initial => ModelVersion::Initial,
            ModelArg::Refined => ModelVersion::Refined,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose {
        log::LevelFilter::Trace
    } else {
        log::LevelFilter::Warn
    };
    plugin_core::init(level);
    let exit_code = match cli.command {
        Commands::Simulate(args) => run_simulate(args),
        Commands::Constants(args) => run_constants(args),
    };
    std::process::exit(exit_code);
}

fn run_simulate(args: SimulateArgs) -> i32 {
    let config = match resolve_config(&args.model) {
        Ok(config) => config,
        Err(code) => return code,
    };
    if !args.dt.is_finite() || args.dt < 0.0 {
        eprintln!("--dt must be a finite value >= 0");
        return EXIT_USAGE;
    }

    let mut params = MoveParams {
        input: args.input,
        ..MoveParams::default()
    };
    if let Some(normal) = args.normal {
        params.ground_normal = normal;
    }
    let mut velocity = args.velocity.unwrap_or_else(Vector::zeros);
    params.velocity = velocity;

    println!(
        "simulate model={} state={} ticks={} dt={}",
        config.motor.version.as_str(),
        args.state,
        args.ticks,
        args.dt
    );
    for tick in 1..=args.ticks {
        let update = update_velocity(&params, velocity, args.state, args.dt, &config.motor);
        velocity = update.velocity;
        params.velocity = velocity;
        if let Some(vertical) = update.host_vertical {
            params.velocity.z = vertical;
        }
        println!(
            "{:>5} {:>10.4} {:>10.4} {:>10.4} speed={:.4}",
            tick,
            velocity.x,
            velocity.y,
            velocity.z,
            velocity.norm()
        );
    }
    EXIT_SUCCESS
}

fn run_constants(args: ModelArgs) -> i32 {
    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let constants = &config.motor.constants;
    let features = &config.motor.features;
    println!("model: {}", config.motor.version.as_str());
    println!("friction: {}", constants.friction);
    println!("stop_speed: {}", constants.stop_speed);
    println!("acceleration: {}", constants.ground_accel);
    println!("air_acceleration: {}", constants.air_accel);
    println!("air_speed: {}", constants.air_speed);
    println!("slope_scaling: {}", features.slope_scaling);
    println!("slope_projection: {}", features.slope_projection);
    println!("speed_cap: {}", features.speed_cap);
    println!(
        "ground_vertical_writeback: {}",
        features.ground_vertical_writeback
    );
    println!("camera_gate: {}", config.camera_gate);
    println!("jump_repression: {}", config.jump_repression);
    EXIT_SUCCESS
}

fn resolve_config(args: &ModelArgs) -> Result<PluginConfig, i32> {
    match (&args.settings, args.model) {
        (Some(path), _) => load_settings(path),
        (None, Some(model)) => Ok(PluginConfig::for_version(model.into())),
        (None, None) => Ok(PluginConfig::default()),
    }
}

fn load_settings(path: &Path) -> Result<PluginConfig, i32> {
    let settings = match MovementSettings::load(path) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("settings load failed ({}): {}", path.display(), err);
            return Err(EXIT_SETTINGS);
        }
    };
    settings.to_config().map_err(|err| {
        eprintln!("{}: {}", path.display(), err);
        EXIT_SETTINGS
    })
}

fn parse_state(value: &str) -> Result<ControllerState, String> {
    ControllerState::parse(value).ok_or_else(|| format!("unknown controller state '{}'", value))
}

fn parse_vector(value: &str) -> Result<Vector<Real>, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected x,y,z but got '{}'", value));
    }
    let mut out = [0.0; 3];
    for (slot, part) in out.iter_mut().zip(&parts) {
        *slot = part
            .parse::<Real>()
            .map_err(|err| format!("bad component '{}': {}", part, err))?;
        if !slot.is_finite() {
            return Err(format!("component '{}' is not finite", part));
        }
    }
    Ok(Vector::new(out[0], out[1], out[2]))
}
