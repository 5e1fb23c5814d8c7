//! End-to-end regression assembly: the full pipeline from a raw flight log
//! to the `(X, y, names)` system handed to the optimizer.

mod common;

use approx::assert_relative_eq;
use common::{forward_flight_log, StubOptimizer};
use dynafit::actuators::ActuatorType;
use dynafit::config::ModelConfig;
use dynafit::dynafit_errors::DynafitError;
use dynafit::features::aero::BodyRotationModel;
use dynafit::flight_data::FlightData;
use dynafit::model::DynamicsModel;
use dynafit::rotor_models::RotorConfig;

fn forces_only_config() -> ModelConfig {
    ModelConfig::builder()
        .rotor_group("main", vec![RotorConfig::plain("u0")])
        .actuator("u0", ActuatorType::Motor)
        .estimate_forces(true)
        .build()
        .unwrap()
}

#[test]
fn forces_only_single_plain_rotor_end_to_end() {
    let n = 100;
    let mut model = DynamicsModel::new(forces_only_config()).unwrap();
    let (system, data) = model.prepare_regression_matrices(forward_flight_log(n)).unwrap();

    assert_eq!(system.x.shape(), (3 * n, 3));
    assert_eq!(system.y.len(), 3 * n);
    assert_eq!(
        system.coefficient_names,
        vec![
            "main_rot_drag_lin".to_string(),
            "main_rot_thrust_quad".to_string(),
            "main_rot_thrust_lin".to_string(),
        ]
    );

    // the airspeed stage ran and left its derived columns behind
    assert!(data.contains("V_air_body_x"));
    assert!(data.contains("angle_of_attack"));
    assert!(data.contains("angle_of_sideslip"));
}

#[test]
fn joint_assembly_is_block_diagonal() {
    let n = 40;
    let log = forward_flight_log(n);

    let mut forces_model = DynamicsModel::new(forces_only_config()).unwrap();
    let (forces_system, _) = forces_model
        .prepare_regression_matrices(log.clone())
        .unwrap();

    let moments_config = ModelConfig::builder()
        .rotor_group("main", vec![RotorConfig::plain("u0")])
        .actuator("u0", ActuatorType::Motor)
        .estimate_moments(true)
        .build()
        .unwrap();
    let mut moments_model = DynamicsModel::new(moments_config).unwrap();
    let (moments_system, _) = moments_model
        .prepare_regression_matrices(log.clone())
        .unwrap();

    let joint_config = ModelConfig::builder()
        .rotor_group("main", vec![RotorConfig::plain("u0")])
        .actuator("u0", ActuatorType::Motor)
        .estimate_forces(true)
        .estimate_moments(true)
        .build()
        .unwrap();
    let mut joint_model = DynamicsModel::new(joint_config).unwrap();
    let (joint, _) = joint_model.prepare_regression_matrices(log).unwrap();

    let (m_f, m_m) = (forces_system.x.ncols(), moments_system.x.ncols());
    assert_eq!(joint.x.shape(), (6 * n, m_f + m_m));
    assert_eq!(joint.y.len(), 6 * n);
    assert_eq!(joint.coefficient_names.len(), m_f + m_m);

    // top-left block is the force system, bottom-right the moment system
    assert_relative_eq!(
        (joint.x.view((0, 0), (3 * n, m_f)) - &forces_system.x).norm(),
        0.0
    );
    assert_relative_eq!(
        (joint.x.view((3 * n, m_f), (3 * n, m_m)) - &moments_system.x).norm(),
        0.0
    );

    // off-diagonal blocks are exactly zero
    assert_eq!(joint.x.view((0, m_f), (3 * n, m_m)).norm(), 0.0);
    assert_eq!(joint.x.view((3 * n, 0), (3 * n, m_f)).norm(), 0.0);

    // stacked targets: forces first
    assert_relative_eq!((joint.y.rows(0, 3 * n) - &forces_system.y).norm(), 0.0);
    assert_relative_eq!((joint.y.rows(3 * n, 3 * n) - &moments_system.y).norm(), 0.0);
}

#[test]
fn neither_forces_nor_moments_fails_before_any_matrix_work() {
    let err = ModelConfig::builder()
        .rotor_group("main", vec![RotorConfig::plain("u0")])
        .build()
        .unwrap_err();
    assert_eq!(err, DynafitError::NothingToEstimate);
}

#[test]
fn missing_required_column_is_fatal_and_named() {
    let data = FlightData::from_columns([("u0", vec![1500.0; 10])]).unwrap();
    let mut model = DynamicsModel::new(forces_only_config()).unwrap();
    let err = model.prepare_regression_matrices(data).unwrap_err();
    assert_eq!(err, DynafitError::MissingColumn("vx".to_string()));
}

#[test]
fn body_rotation_model_appends_inertia_columns() {
    let n = 25;
    let config = ModelConfig::builder()
        .rotor_group("main", vec![RotorConfig::plain("u0")])
        .actuator("u0", ActuatorType::Motor)
        .estimate_moments(true)
        .build()
        .unwrap();
    let mut model =
        DynamicsModel::new(config).unwrap().with_aero_model(Box::new(BodyRotationModel));
    let (system, _) = model.prepare_regression_matrices(forward_flight_log(n)).unwrap();

    assert_eq!(system.x.ncols(), 5 + 3);
    let tail: Vec<_> = system.coefficient_names[5..].to_vec();
    assert_eq!(tail, vec!["I_yy-I_zz", "I_zz-I_xx", "I_xx-I_yy"]);
}

#[test]
fn aero_only_moment_estimation_stands_alone() {
    // No rotor groups at all: the body-rotation model must anchor the
    // system by itself instead of colliding with an empty rotor block.
    let n = 10;
    let config = ModelConfig::builder()
        .estimate_moments(true)
        .build()
        .unwrap();
    let mut model =
        DynamicsModel::new(config).unwrap().with_aero_model(Box::new(BodyRotationModel));
    let (system, _) = model.prepare_regression_matrices(forward_flight_log(n)).unwrap();

    assert_eq!(system.x.shape(), (3 * n, 3));
    assert_eq!(system.y.len(), 3 * n);
    assert_eq!(
        system.coefficient_names,
        vec![
            "I_yy-I_zz".to_string(),
            "I_zz-I_xx".to_string(),
            "I_xx-I_yy".to_string(),
        ]
    );
}

#[test]
fn empty_group_list_without_features_has_nothing_to_estimate() {
    let config = ModelConfig::builder()
        .estimate_forces(true)
        .build()
        .unwrap();
    let mut model = DynamicsModel::new(config).unwrap();
    let err = model.prepare_regression_matrices(forward_flight_log(10)).unwrap_err();
    assert_eq!(err, DynafitError::NothingToEstimate);
}

#[test]
fn fisher_information_columns_are_appended_per_sample() {
    let n = 30;
    let mut model = DynamicsModel::new(forces_only_config()).unwrap();
    let (_, data) = model.prepare_regression_matrices(forward_flight_log(n)).unwrap();
    let data = model.compute_fisher_information(data).unwrap();

    let scores = data.column("fisher_information_force").unwrap();
    assert_eq!(scores.len(), n);
    // the command ramps up over the log, so late samples are more informative
    assert!(scores[n - 1] > scores[1]);
    assert!(!data.contains("fisher_information_rot"));
}

#[test]
fn estimation_packages_named_coefficients() {
    let n = 20;
    let mut model = DynamicsModel::new(forces_only_config()).unwrap();
    let (system, _) = model.prepare_regression_matrices(forward_flight_log(n)).unwrap();

    let mut optimizer = StubOptimizer { forced_len: None };
    let result = model.estimate(&system, &mut optimizer).unwrap();
    assert_eq!(result.coefficients.len(), 3);
    assert_eq!(result.coefficients[0].0, "main_rot_drag_lin");
    assert_eq!(result.coefficient("main_rot_thrust_lin"), Some(3.0));
    assert_eq!(result.metrics.get("rmse"), Some(&0.125));
    assert_eq!(result.n_samples, n);
}

#[test]
fn coefficient_count_mismatch_is_an_invariant_error() {
    let n = 20;
    let mut model = DynamicsModel::new(forces_only_config()).unwrap();
    let (system, _) = model.prepare_regression_matrices(forward_flight_log(n)).unwrap();

    let mut optimizer = StubOptimizer {
        forced_len: Some(7),
    };
    let err = model.estimate(&system, &mut optimizer).unwrap_err();
    assert_eq!(
        err,
        DynafitError::CoefficientNameMismatch {
            names: 3,
            values: 7
        }
    );
}
