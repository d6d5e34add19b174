use std::f64::consts::LN_2;

use approx::assert_relative_eq;

use degradation_kinetics::app::pipeline::run_fit;
use degradation_kinetics::data::{SampleSpec, generate_sample};
use degradation_kinetics::domain::{C0Source, DataSource, FitConfig};
use degradation_kinetics::io::{read_fit_json, write_fit_json, write_results_csv, build_fit_file};
use degradation_kinetics::models::predict;
use degradation_kinetics::plot::write_fit_svg;
use degradation_kinetics::{FitError, Observation, fit};

fn obs(pairs: &[(f64, f64)]) -> Vec<Observation> {
    pairs.iter().map(|&(t, c)| Observation::new(t, c)).collect()
}

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("dk_it_{}_{name}", std::process::id()))
}

#[test]
fn noiseless_data_recovers_rate_for_several_constants() {
    for &k_true in &[0.01, 0.2, 1.5] {
        let data: Vec<Observation> = [0.0, 1.0, 2.5, 4.0]
            .iter()
            .map(|&t| Observation::new(t, predict(t, k_true, 7.5)))
            .collect();
        let result = fit(&data, 7.5).unwrap();
        assert_relative_eq!(result.k, k_true, max_relative = 1e-10);
        assert_relative_eq!(result.r_squared, 1.0, epsilon = 1e-10);
        assert!(result.rmse < 1e-10);
        assert_relative_eq!(result.half_life.unwrap(), LN_2 / k_true, max_relative = 1e-10);
    }
}

#[test]
fn worked_scenario() {
    let data = obs(&[(0.0, 10.0), (1.0, 6.07), (2.0, 3.68), (3.0, 2.23)]);
    let result = fit(&data, 10.0).unwrap();
    assert_relative_eq!(result.k, 0.5, epsilon = 1e-3);
    assert_relative_eq!(result.half_life.unwrap(), 1.386, epsilon = 1e-2);
    assert_relative_eq!(result.r_squared, 1.0, epsilon = 1e-2);
}

#[test]
fn error_kinds() {
    assert!(matches!(fit(&obs(&[(0.0, 1.0)]), 1.0), Err(FitError::InvalidInput { .. })));
    assert!(matches!(
        fit(&obs(&[(0.0, 1.0), (1.0, 0.0)]), 1.0),
        Err(FitError::InvalidInput { .. })
    ));
    assert!(matches!(
        fit(&obs(&[(0.0, 1.0), (1.0, 0.5)]), -1.0),
        Err(FitError::InvalidInput { .. })
    ));
    assert!(matches!(
        fit(&obs(&[(0.0, 3.0), (0.0, 2.0)]), 3.0),
        Err(FitError::DegenerateFit { .. })
    ));
    assert!(matches!(
        fit(&obs(&[(5.0, 4.0), (5.0, 3.0), (5.0, 2.0)]), 10.0),
        Err(FitError::DegenerateFit { .. })
    ));
    assert!(matches!(
        fit(&obs(&[(1.0, 2.0), (2.0, 2.0), (3.0, 2.0)]), 3.0),
        Err(FitError::DegenerateFit { .. })
    ));
}

#[test]
fn noisy_sample_fits_close_to_truth() {
    let spec = SampleSpec::default();
    let data = generate_sample(&spec).unwrap();
    let result = fit(&data, spec.c0).unwrap();
    assert!((result.k - spec.k).abs() < 0.1);
    assert!(result.r_squared > 0.9);
    assert!(result.rmse < 0.3);
}

#[test]
fn pipeline_from_csv_to_exports() {
    let csv_path = temp_path("input.csv");
    std::fs::write(&csv_path, "time,concentration\n0,10\n1,6.07\n2,3.68\n3,2.23\n").unwrap();

    let config = FitConfig {
        source: DataSource::Csv(csv_path.clone()),
        c0: C0Source::FirstObservation,
        plot: false,
        plot_width: 40,
        plot_height: 10,
        grid_points: 21,
        export_data: None,
        export_fit: None,
        export_report: None,
        export_plot: None,
    };
    let run = run_fit(&config).unwrap();
    assert_eq!(run.fit.c0, 10.0);
    assert_eq!(run.residuals.len(), 4);
    assert_relative_eq!(run.fit.k, 0.5, epsilon = 1e-3);

    let data_path = temp_path("out.csv");
    write_results_csv(&data_path, &run.residuals).unwrap();
    let exported = std::fs::read_to_string(&data_path).unwrap();
    assert_eq!(exported.lines().count(), 5);

    let fit_path = temp_path("fit.json");
    let fit_file = build_fit_file(&run.fit, &run.ingest.observations, config.grid_points);
    write_fit_json(&fit_path, &fit_file).unwrap();
    let back = read_fit_json(&fit_path).unwrap();
    assert_eq!(back.fit, run.fit);
    assert_eq!(back.grid.time.len(), 21);

    let plot_path = temp_path("fit.svg");
    write_fit_svg(&plot_path, &run.residuals, &run.fit).unwrap();
    assert!(std::fs::metadata(&plot_path).unwrap().len() > 0);

    for p in [csv_path, data_path, fit_path, plot_path] {
        let _ = std::fs::remove_file(p);
    }
}

#[test]
fn pipeline_maps_fit_errors_to_exit_codes() {
    let config = FitConfig {
        source: DataSource::Pairs("0,5;0,4".to_string()),
        c0: C0Source::Explicit(5.0),
        plot: false,
        plot_width: 40,
        plot_height: 10,
        grid_points: 11,
        export_data: None,
        export_fit: None,
        export_report: None,
        export_plot: None,
    };
    assert_eq!(run_fit(&config).unwrap_err().exit_code(), 4);

    let config = FitConfig {
        source: DataSource::Pairs("0,5".to_string()),
        ..config
    };
    assert_eq!(run_fit(&config).unwrap_err().exit_code(), 3);
}
