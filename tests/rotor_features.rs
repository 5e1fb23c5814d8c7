//! Rotor feature models: per-kind column layouts, sign handling, and
//! group aggregation properties.

use approx::assert_relative_eq;
use dynafit::config::RotorGroupConfig;
use dynafit::constants::AIR_DENSITY;
use dynafit::dynafit_errors::DynafitError;
use dynafit::features::rotor_group::compute_rotor_features;
use dynafit::flight_data::FlightData;
use dynafit::rotor_models::{RotorConfig, RotorKind, RotorModel, VALID_ROTOR_TYPES};
use nalgebra::DMatrix;

/// Normalized single-sample table plus the matching airspeed matrix.
fn single_sample(u: f64, airspeed: [f64; 3]) -> (FlightData, DMatrix<f64>) {
    let data = FlightData::from_columns([
        ("u0", vec![u]),
        ("u_tilt", vec![1.0]),
    ])
    .unwrap();
    let v = DMatrix::from_row_slice(1, 3, &airspeed);
    (data, v)
}

#[test]
fn plain_rotor_block_widths() {
    let (data, v) = single_sample(0.5, [5.0, 0.0, 0.0]);
    let rotor = RotorModel::new(&RotorConfig::plain("u0"), &data, &v, None).unwrap();
    assert_eq!(rotor.kind(), RotorKind::Plain);

    let forces = rotor.compute_actuator_force_matrix().unwrap();
    let moments = rotor.compute_actuator_moment_matrix().unwrap();
    assert_eq!(forces.matrix().shape(), (3, 3));
    assert_eq!(moments.matrix().shape(), (3, 5));
    assert_eq!(
        forces.names(),
        &["rot_drag_lin", "rot_thrust_quad", "rot_thrust_lin"]
    );
    assert_eq!(
        moments.names(),
        &[
            "c_m_leaver_quad",
            "c_m_leaver_lin",
            "c_m_drag_z_quad",
            "c_m_drag_z_lin",
            "c_m_rolling"
        ]
    );
}

#[test]
fn plain_rotor_axial_flow_populates_thrust_only() {
    // Pure climb: airflow along the rotor axis, no in-plane component.
    let (data, v) = single_sample(0.8, [0.0, 0.0, -3.0]);
    let rotor = RotorModel::new(&RotorConfig::plain("u0"), &data, &v, None).unwrap();
    let forces = rotor.compute_actuator_force_matrix().unwrap();
    let x = forces.matrix();

    let d4 = 0.25_f64.powi(4);
    // drag column zero, thrust columns along -z
    for row in 0..3 {
        assert_relative_eq!(x[(row, 0)], 0.0);
    }
    assert_relative_eq!(x[(2, 1)], -AIR_DENSITY * d4 * 0.8 * 0.8, epsilon = 1e-12);
    assert_relative_eq!(x[(2, 2)], -AIR_DENSITY * d4 * 0.8 * 3.0, epsilon = 1e-12);
    assert_relative_eq!(x[(0, 1)], 0.0);
    assert_relative_eq!(x[(1, 1)], 0.0);
}

#[test]
fn bidirectional_rotor_flips_thrust_with_command_sign() {
    let (data_pos, v) = single_sample(0.6, [0.0, 0.0, 0.0]);
    let (data_neg, _) = single_sample(-0.6, [0.0, 0.0, 0.0]);
    let config = RotorConfig::with_type("u0", "BiDirectionalRotorModel");

    let forward = RotorModel::new(&config, &data_pos, &v, None).unwrap();
    let reverse = RotorModel::new(&config, &data_neg, &v, None).unwrap();
    let x_fwd = forward.compute_actuator_force_matrix().unwrap();
    let x_rev = reverse.compute_actuator_force_matrix().unwrap();

    // same magnitude, opposite sign on the thrust-quad column
    assert_relative_eq!(
        x_fwd.matrix()[(2, 1)],
        -x_rev.matrix()[(2, 1)],
        epsilon = 1e-12
    );
    assert!(x_fwd.matrix()[(2, 1)] < 0.0); // thrust along -z for positive command
}

#[test]
fn tilting_rotor_rotates_axis_and_adds_columns() {
    let mut config = RotorConfig::with_type("u0", "TiltingRotorModel");
    config.tilt_actuator_dataframe_name = Some("u_tilt".to_string());

    let (data, v) = single_sample(1.0, [0.0, 0.0, 0.0]);
    let rotor = RotorModel::new(&config, &data, &v, None).unwrap();
    let forces = rotor.compute_actuator_force_matrix().unwrap();
    let moments = rotor.compute_actuator_moment_matrix().unwrap();
    assert_eq!(forces.matrix().shape(), (3, 4));
    assert_eq!(moments.matrix().shape(), (3, 6));

    // u_tilt = 1 with the default 90° range swings the -z axis into the
    // horizontal plane: thrust-quad now acts on x, not z.
    let d4 = 0.25_f64.powi(4);
    assert_relative_eq!(forces.matrix()[(2, 1)], 0.0, epsilon = 1e-9);
    assert_relative_eq!(
        forces.matrix()[(0, 1)].abs(),
        AIR_DENSITY * d4,
        epsilon = 1e-9
    );
}

#[test]
fn tilting_rotor_without_tilt_channel_is_fatal() {
    let config = RotorConfig::with_type("u0", "TiltingRotorModel");
    let (data, v) = single_sample(1.0, [0.0, 0.0, 0.0]);
    let err = RotorModel::new(&config, &data, &v, None).unwrap_err();
    assert_eq!(
        err,
        DynafitError::MissingTiltActuator {
            rotor: "u0".to_string()
        }
    );
}

#[test]
fn changing_axis_rotor_adds_gyro_columns() {
    let (data, v) = single_sample(0.5, [2.0, 0.0, 0.0]);
    let config = RotorConfig::with_type("u0", "ChangingAxisRotorModel");
    let rates = DMatrix::from_row_slice(1, 3, &[0.0, 1.0, 0.0]);

    let rotor = RotorModel::new(&config, &data, &v, Some(&rates)).unwrap();
    let forces = rotor.compute_actuator_force_matrix().unwrap();
    let moments = rotor.compute_actuator_moment_matrix().unwrap();
    assert_eq!(forces.matrix().shape(), (3, 4));
    assert_eq!(moments.matrix().shape(), (3, 7));

    // ω × a = (0,1,0) × (0,0,-1) = (-1,0,0): the gyro column acts on x.
    assert!(forces.matrix()[(0, 3)] != 0.0);
    assert_relative_eq!(forces.matrix()[(2, 3)], 0.0);

    // without rates the gyro columns are zero
    let still = RotorModel::new(&config, &data, &v, None).unwrap();
    let x = still.compute_actuator_force_matrix().unwrap();
    for row in 0..3 {
        assert_relative_eq!(x.matrix()[(row, 3)], 0.0);
    }
}

#[test]
fn unknown_rotor_type_names_offender_and_valid_set() {
    let (data, v) = single_sample(0.5, [0.0, 0.0, 0.0]);
    let config = RotorConfig::with_type("u0", "BogusRotor");
    let err = RotorModel::new(&config, &data, &v, None).unwrap_err();
    assert_eq!(err, DynafitError::InvalidRotorType("BogusRotor".to_string()));
    let message = err.to_string();
    assert!(message.contains("BogusRotor"));
    for valid in VALID_ROTOR_TYPES {
        assert!(message.contains(valid), "missing {valid} in: {message}");
    }
}

#[test]
fn two_identical_rotors_in_one_group_double_the_block() {
    let data = FlightData::from_columns([("u0", vec![0.4, 0.9])]).unwrap();
    let v = DMatrix::from_row_slice(2, 3, &[4.0, 0.5, -1.0, 3.0, -0.2, 0.8]);

    let single = vec![RotorGroupConfig {
        name: "main".to_string(),
        rotors: vec![RotorConfig::plain("u0")],
    }];
    let double = vec![RotorGroupConfig {
        name: "main".to_string(),
        rotors: vec![RotorConfig::plain("u0"), RotorConfig::plain("u0")],
    }];

    let one = compute_rotor_features(&data, &single, &v, None, true, true).unwrap();
    let two = compute_rotor_features(&data, &double, &v, None, true, true).unwrap();

    let x1 = one.forces.unwrap();
    let x2 = two.forces.unwrap();
    assert_eq!(x1.names(), x2.names());
    assert_relative_eq!(
        (x1.matrix() * 2.0 - x2.matrix()).norm(),
        0.0,
        epsilon = 1e-12
    );

    let m1 = one.moments.unwrap();
    let m2 = two.moments.unwrap();
    assert_relative_eq!(
        (m1.matrix() * 2.0 - m2.matrix()).norm(),
        0.0,
        epsilon = 1e-12
    );
}

#[test]
fn no_rotor_groups_yields_no_blocks() {
    let data = FlightData::from_columns([("u0", vec![0.4])]).unwrap();
    let v = DMatrix::from_row_slice(1, 3, &[2.0, 0.0, 0.0]);
    let features = compute_rotor_features(&data, &[], &v, None, true, true).unwrap();
    assert!(features.forces.is_none());
    assert!(features.moments.is_none());
}

#[test]
fn groups_concatenate_in_declaration_order_with_prefixes() {
    let data = FlightData::from_columns([("u0", vec![0.4]), ("u1", vec![0.7])]).unwrap();
    let v = DMatrix::from_row_slice(1, 3, &[2.0, 0.0, 0.0]);

    let groups = vec![
        RotorGroupConfig {
            name: "front".to_string(),
            rotors: vec![RotorConfig::plain("u0")],
        },
        RotorGroupConfig {
            name: "rear".to_string(),
            rotors: vec![RotorConfig::plain("u1")],
        },
    ];

    let features = compute_rotor_features(&data, &groups, &v, None, true, false).unwrap();
    let forces = features.forces.unwrap();
    assert!(features.moments.is_none());
    assert_eq!(forces.ncols(), 6);
    assert_eq!(forces.names().len(), forces.ncols());
    assert_eq!(
        forces.names(),
        &[
            "front_rot_drag_lin",
            "front_rot_thrust_quad",
            "front_rot_thrust_lin",
            "rear_rot_drag_lin",
            "rear_rot_thrust_quad",
            "rear_rot_thrust_lin"
        ]
    );
}
