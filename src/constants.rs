//! Physical constants, column naming, and scalar type aliases shared across
//! the feature pipeline.

/// Air density used to scale rotor features, kg/m³.
///
/// Matches the reference atmosphere of the simulator consuming the
/// identified coefficients.
pub const AIR_DENSITY: f64 = 1.18;

/// Standard gravity, m/s².
pub const GRAVITY: f64 = 9.81;

/// Minimum in-plane airspeed magnitude (m/s) below which rotor drag
/// features are zeroed instead of divided into a direction.
pub const MIN_AIRSPEED_THRESH: f64 = 0.1;

/// Semantic aliases for plain `f64` quantities, used in signatures to keep
/// units visible at the call site.
pub type Radian = f64;
pub type MeterPerSecond = f64;
pub type Meter = f64;

/// One coefficient label of the assembled design matrix.
pub type CoefName = String;

/// World-frame ground velocity columns, NED.
pub const GROUND_VELOCITY_COLS: [&str; 3] = ["vx", "vy", "vz"];

/// Body angular rate columns, FRD.
pub const ANGULAR_VELOCITY_COLS: [&str; 3] = ["ang_vel_x", "ang_vel_y", "ang_vel_z"];

/// Attitude quaternion columns, scalar first.
pub const QUATERNION_COLS: [&str; 4] = ["q0", "q1", "q2", "q3"];

/// Body-frame airspeed columns appended by the airspeed derivation stage.
pub const AIRSPEED_COLS: [&str; 3] = ["V_air_body_x", "V_air_body_y", "V_air_body_z"];

/// Flow-angle columns appended alongside the body airspeed.
pub const ANGLE_OF_ATTACK_COL: &str = "angle_of_attack";
pub const SIDESLIP_COL: &str = "angle_of_sideslip";

/// Measured target columns, 3 per sample each.
pub const MEASURED_FORCE_COLS: [&str; 3] =
    ["measured_force_x", "measured_force_y", "measured_force_z"];
pub const MEASURED_MOMENT_COLS: [&str; 3] = [
    "measured_moment_x",
    "measured_moment_y",
    "measured_moment_z",
];

/// Per-sample informativeness columns appended for data-selection front ends.
pub const FISHER_FORCE_COL: &str = "fisher_information_force";
pub const FISHER_MOMENT_COL: &str = "fisher_information_rot";
