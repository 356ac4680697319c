//! Service-layer smoke tests against the reference engine.

use gv_app::{
    AppError, RunOverrides, RunRequest, init_config, load_config, run, summarize,
};
use gv_project::EngineConfig;
use gv_sim::{Direction, LeadingVane, TelemetryRecord};

#[test]
fn summary_of_reference_engine() {
    let report = summarize(&EngineConfig::reference("galin-40deg")).unwrap();

    assert!((report.engine.compression_ratio - 9.0).abs() < 1e-9);
    assert!((report.engine.min_angular_width_deg - 10.0).abs() < 1e-9);
    assert!((report.engine.max_angular_width_deg - 90.0).abs() < 1e-9);
    assert!((report.stroke.duration_s - 0.021_525_7).abs() < 1e-4);
    // Both machines carry half the reaction moment.
    assert!((report.machine_moment_nm - report.engine.reaction_moment_nm / 2.0).abs() < 1e-9);
    assert!((report.initial_speed_rad_s - 72.97).abs() < 0.1);
    assert!(report.average_power_w > 0.0);
    // Shafts end the stroke at a common speed, mirrored about the bisector.
    assert!((report.shafts[0].speed_rad_s - report.shafts[1].speed_rad_s).abs() < 1e-3);
    assert!(report.shafts[0].location_deg > 0.0);
    assert!(report.shafts[1].location_deg < 0.0);

    let text = report.to_string();
    assert!(text.contains("U1 [degrees]: 10.000000"), "{text}");
    assert!(text.contains("U2 [degrees]: 90.000000"), "{text}");
    assert!(text.contains("Compression ratio: 9.000000"), "{text}");
    assert!(text.contains("speed w0 [RPM]"));
    assert!(!text.contains("iteration ceiling"));
}

#[test]
fn run_writes_telemetry_files() {
    let dir = tempfile::tempdir().unwrap();
    let telemetry = dir.path().join("data").join("tmp.csv");
    let positions = dir.path().join("data").join("first_stroke.csv");

    let config = EngineConfig::reference("run");
    let response = run(&RunRequest {
        config: &config,
        telemetry_path: Some(&telemetry),
        positions_path: Some(&positions),
        overrides: RunOverrides {
            strokes: Some(2),
            ..RunOverrides::default()
        },
    })
    .unwrap();

    assert_eq!(response.strokes.len(), 2);
    assert_eq!(response.converged_strokes(), 2);
    assert_eq!(response.strokes[0].direction, Direction::Forward);
    assert_eq!(response.strokes[1].direction, Direction::Reverse);
    assert_eq!(response.leading_vane, LeadingVane::Shaft1);
    let reference = response.reference.as_ref().unwrap();
    assert_eq!(response.initial_speed_rad_s, reference.initial_speed_rad_s);
    let total: f64 = response.strokes.iter().map(|s| s.duration_s).sum();
    assert!((response.total_time_s() - total).abs() < 1e-9);

    let text = std::fs::read_to_string(&telemetry).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), response.records_written);
    assert!(lines.len() > 20);
    for line in &lines {
        assert_eq!(line.split(',').count(), TelemetryRecord::FIELD_COUNT);
    }

    let text = std::fs::read_to_string(&positions).unwrap();
    assert_eq!(text.lines().count(), response.positions_written);
    assert_eq!(response.positions_written, response.records_written);
    assert!(text.lines().all(|l| l.split(" , ").count() == 3));
}

#[test]
fn explicit_initial_speed_skips_reference_stroke() {
    let mut config = EngineConfig::reference("explicit");
    config.run.strokes = 1;
    config.run.leading_vane = 2;
    let response = run(&RunRequest {
        config: &config,
        telemetry_path: None,
        positions_path: None,
        overrides: RunOverrides {
            initial_speed_rad_s: Some(70.0),
            ..RunOverrides::default()
        },
    })
    .unwrap();

    assert!(response.reference.is_none());
    assert_eq!(response.initial_speed_rad_s, 70.0);
    assert_eq!(response.leading_vane, LeadingVane::Shaft2);
    assert_eq!(response.strokes[0].direction, Direction::Reverse);
    assert_eq!(response.records_written, 0);
}

#[test]
fn bad_overrides_are_rejected() {
    let config = EngineConfig::reference("bad");
    for overrides in [
        RunOverrides {
            strokes: Some(0),
            ..RunOverrides::default()
        },
        RunOverrides {
            leading_vane: Some(3),
            ..RunOverrides::default()
        },
        RunOverrides {
            initial_speed_rad_s: Some(f64::NAN),
            ..RunOverrides::default()
        },
    ] {
        let err = run(&RunRequest {
            config: &config,
            telemetry_path: None,
            positions_path: None,
            overrides,
        })
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)), "{err}");
    }
}

#[test]
fn reference_stroke_must_converge() {
    let mut config = EngineConfig::reference("short");
    config.stroke.max_iterations = 1000;
    let err = summarize(&config).unwrap_err();
    match err {
        AppError::Simulation(msg) => assert!(msg.contains("1000"), "{msg}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn init_config_writes_loadable_reference() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("configs").join("engine.yaml");

    let written = init_config(&path, "fresh").unwrap();
    let loaded = load_config(&path).unwrap();
    assert_eq!(written, loaded);
    assert_eq!(loaded, EngineConfig::reference("fresh"));

    // A second init must not clobber the file.
    assert!(matches!(
        init_config(&path, "again"),
        Err(AppError::InvalidInput(_))
    ));
}

#[test]
fn load_config_reports_validation_issues() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    std::fs::write(&path, "version: 1\nname: bad\nrun: { strokes: 0 }\n").unwrap();
    assert!(matches!(load_config(&path), Err(AppError::Validation(_))));

    let missing = dir.path().join("missing.yaml");
    assert!(matches!(
        load_config(&missing),
        Err(AppError::ConfigLoad { .. })
    ));
}
