//! Configuration validator tests: rule order and domains.

use pachinko_core::{
    config::{ContinuationMode, RawInput},
    error::{SimError, ValidationError},
    validate::{load_and_validate, validate},
};

fn out_of_range(field: &str, raw: &RawInput) {
    match validate(raw) {
        Err(ValidationError::OutOfRange { field: f, .. }) => assert_eq!(f, field),
        other => panic!("expected OutOfRange on {field}, got {other:?}"),
    }
}

#[test]
fn scenario_input_builds_canonical_config() {
    let config = validate(&RawInput::default_test()).expect("valid input");

    assert_eq!(config.bet_unit_yen, 4);
    assert_eq!(config.daily_budget_yen, 1_000);
    assert_eq!(config.days, 1);
    assert!((config.base_hit_probability - 1.0 / 319.0).abs() < 1e-12);
    assert!((config.bonus_entry_probability - 0.60).abs() < 1e-12);
    assert!((config.bonus_hit_probability - 1.0 / 60.0).abs() < 1e-12);
    assert_eq!(config.continuation, ContinuationMode::St(0.80));
    assert_eq!(config.time_limited_spins, 100);
    assert!(config.is_valid());
}

#[test]
fn loop_rate_alone_selects_loop_mode() {
    let raw = RawInput {
        st_continuation_percent: None,
        loop_continuation_percent: Some(50.0),
        ..RawInput::default_test()
    };
    let config = validate(&raw).expect("valid input");
    assert_eq!(config.continuation, ContinuationMode::Loop(0.50));
}

#[test]
fn missing_required_field_is_reported_by_name() {
    let raw = RawInput { days: None, ..RawInput::default_test() };
    assert_eq!(
        validate(&raw),
        Err(ValidationError::MissingField { field: "days" })
    );
}

#[test]
fn non_finite_value_counts_as_missing() {
    let raw = RawInput { daily_budget_yen: Some(f64::NAN), ..RawInput::default_test() };
    assert_eq!(
        validate(&raw),
        Err(ValidationError::MissingField { field: "daily_budget_yen" })
    );
}

#[test]
fn missing_field_wins_over_continuation_conflict() {
    let raw = RawInput {
        time_limited_spins: None,
        loop_continuation_percent: Some(70.0),
        ..RawInput::default_test()
    };
    assert_eq!(
        validate(&raw),
        Err(ValidationError::MissingField { field: "time_limited_spins" })
    );
}

#[test]
fn both_continuation_rates_rejected() {
    let raw = RawInput { loop_continuation_percent: Some(70.0), ..RawInput::default_test() };
    assert_eq!(validate(&raw), Err(ValidationError::BothContinuationModesSet));
}

#[test]
fn neither_continuation_rate_rejected() {
    let raw = RawInput { st_continuation_percent: None, ..RawInput::default_test() };
    assert_eq!(validate(&raw), Err(ValidationError::NoContinuationModeSet));
}

#[test]
fn zero_continuation_rate_counts_as_unset() {
    let raw = RawInput {
        st_continuation_percent: Some(0.0),
        loop_continuation_percent: Some(65.0),
        ..RawInput::default_test()
    };
    let config = validate(&raw).expect("zero ST rate is blank");
    assert_eq!(config.continuation, ContinuationMode::Loop(0.65));
}

#[test]
fn continuation_conflict_wins_over_range_error() {
    let raw = RawInput {
        days: Some(5_000.0),
        loop_continuation_percent: Some(70.0),
        ..RawInput::default_test()
    };
    assert_eq!(validate(&raw), Err(ValidationError::BothContinuationModesSet));
}

#[test]
fn budget_bounds_are_inclusive() {
    for ok in [100.0, 1_000_000.0] {
        let raw = RawInput { daily_budget_yen: Some(ok), ..RawInput::default_test() };
        assert!(validate(&raw).is_ok(), "budget {ok} should be accepted");
    }
    for bad in [99.0, 1_000_001.0] {
        let raw = RawInput { daily_budget_yen: Some(bad), ..RawInput::default_test() };
        out_of_range("daily_budget_yen", &raw);
    }
}

#[test]
fn days_bounds_are_inclusive() {
    for ok in [1.0, 1_000.0] {
        let raw = RawInput { days: Some(ok), ..RawInput::default_test() };
        assert!(validate(&raw).is_ok(), "days {ok} should be accepted");
    }
    for bad in [0.0, 1_001.0, 1.5, -3.0] {
        let raw = RawInput { days: Some(bad), ..RawInput::default_test() };
        out_of_range("days", &raw);
    }
}

#[test]
fn enumerated_domains_reject_values_outside_the_table() {
    out_of_range(
        "base_hit_denominator",
        &RawInput { base_hit_denominator: Some(200.0), ..RawInput::default_test() },
    );
    out_of_range(
        "bonus_entry_percent",
        &RawInput { bonus_entry_percent: Some(55.0), ..RawInput::default_test() },
    );
    out_of_range(
        "bonus_hit_denominator",
        &RawInput { bonus_hit_denominator: Some(35.0), ..RawInput::default_test() },
    );
    out_of_range(
        "bet_unit_yen",
        &RawInput { bet_unit_yen: Some(2.0), ..RawInput::default_test() },
    );
}

#[test]
fn every_enumerated_value_is_accepted() {
    for hit in [319.0, 199.0, 99.0] {
        for entry in [50.0, 60.0, 70.0, 80.0] {
            for bonus_hit in [30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0] {
                let raw = RawInput {
                    base_hit_denominator: Some(hit),
                    bonus_entry_percent: Some(entry),
                    bonus_hit_denominator: Some(bonus_hit),
                    ..RawInput::default_test()
                };
                assert!(validate(&raw).is_ok(), "1/{hit} {entry}% 1/{bonus_hit}");
            }
        }
    }
}

#[test]
fn time_limited_spins_zero_disables_otherwise_ten_to_thousand() {
    let raw = RawInput { time_limited_spins: Some(0.0), ..RawInput::default_test() };
    let config = validate(&raw).expect("0 disables time-limited play");
    assert!(!config.time_limited_enabled());

    for ok in [10.0, 1_000.0] {
        let raw = RawInput { time_limited_spins: Some(ok), ..RawInput::default_test() };
        assert!(validate(&raw).is_ok());
    }
    for bad in [5.0, 9.0, 1_001.0] {
        let raw = RawInput { time_limited_spins: Some(bad), ..RawInput::default_test() };
        out_of_range("time_limited_spins", &raw);
    }
}

#[test]
fn continuation_percent_above_hundred_rejected() {
    let raw = RawInput { st_continuation_percent: Some(120.0), ..RawInput::default_test() };
    out_of_range("st_continuation_percent", &raw);
}

#[test]
fn string_pairs_validate_like_typed_input() {
    let raw = RawInput::from_pairs([
        ("bet_unit_yen", "1"),
        ("daily_budget_yen", "5000"),
        ("days", "10"),
        ("base_hit_denominator", "199"),
        ("bonus_entry_percent", "50"),
        ("bonus_hit_denominator", "90"),
        ("st_continuation_percent", ""),
        ("loop_continuation_percent", "75"),
        ("time_limited_spins", "50"),
    ]);
    let config = validate(&raw).expect("valid form input");
    assert_eq!(config.continuation, ContinuationMode::Loop(0.75));
    assert_eq!(config.balls_per_day(), 5_000);
}

#[test]
fn unparsable_string_reported_as_missing() {
    let mut raw = RawInput::default_test();
    raw.set("bonus_hit_denominator", "sixty");
    assert_eq!(
        validate(&raw),
        Err(ValidationError::MissingField { field: "bonus_hit_denominator" })
    );
}

#[test]
fn error_kinds_are_stable() {
    assert_eq!(ValidationError::MissingField { field: "days" }.kind(), "missing_field");
    assert_eq!(ValidationError::BothContinuationModesSet.kind(), "both_continuation_modes_set");
    assert_eq!(ValidationError::NoContinuationModeSet.kind(), "no_continuation_mode_set");
    assert_eq!(
        ValidationError::OutOfRange { field: "days", value: 0.0 }.kind(),
        "out_of_range"
    );
}

#[test]
fn sample_input_file_loads_and_validates() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/sample_input.json");
    let config = load_and_validate(path).expect("sample input is valid");
    assert_eq!(config.days, 30);
    assert_eq!(config.continuation, ContinuationMode::St(0.80));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_and_validate("/nonexistent/pachinko.json").unwrap_err();
    assert!(matches!(err, SimError::Io(_)), "{err:?}");
}

#[test]
fn invalid_file_content_surfaces_the_classification() {
    let dir = std::env::temp_dir().join(format!("pachinko-validate-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("both_modes.json");
    std::fs::write(
        &path,
        r#"{"bet_unit_yen":4,"daily_budget_yen":1000,"days":1,"base_hit_denominator":319,
            "bonus_entry_percent":60,"bonus_hit_denominator":60,"st_continuation_percent":80,
            "loop_continuation_percent":70,"time_limited_spins":100}"#,
    )
    .expect("write temp input");

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(
        err,
        SimError::Validation(ValidationError::BothContinuationModesSet)
    ));
    let _ = std::fs::remove_dir_all(&dir);
}

fn raw_from_json(json: &str) -> RawInput {
    serde_json::from_str(json).expect("raw input parses")
}

#[test]
fn blank_json_field_is_reported_missing() {
    let raw = raw_from_json(
        r#"{"bet_unit_yen":4,"daily_budget_yen":1000,"days":"","base_hit_denominator":319,
            "bonus_entry_percent":60,"bonus_hit_denominator":60,"st_continuation_percent":80,
            "time_limited_spins":100}"#,
    );
    assert_eq!(
        validate(&raw),
        Err(ValidationError::MissingField { field: "days" })
    );
}

#[test]
fn blank_json_continuation_counts_as_unset() {
    let raw = raw_from_json(
        r#"{"bet_unit_yen":"4","daily_budget_yen":1000,"days":1,"base_hit_denominator":319,
            "bonus_entry_percent":60,"bonus_hit_denominator":60,"st_continuation_percent":"80",
            "loop_continuation_percent":"","time_limited_spins":100}"#,
    );
    let config = validate(&raw).expect("blank LOOP rate leaves ST alone");
    assert_eq!(config.continuation, ContinuationMode::St(0.80));
    assert_eq!(config.bet_unit_yen, 4);
}

#[test]
fn blank_field_in_file_is_a_validation_error() {
    let dir = std::env::temp_dir().join(format!("pachinko-blank-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("blank_days.json");
    std::fs::write(
        &path,
        r#"{"bet_unit_yen":4,"daily_budget_yen":1000,"days":"","base_hit_denominator":319,
            "bonus_entry_percent":60,"bonus_hit_denominator":60,"st_continuation_percent":80,
            "loop_continuation_percent":"","time_limited_spins":100}"#,
    )
    .expect("write temp input");

    let err = load_and_validate(&path).unwrap_err();
    assert!(
        matches!(err, SimError::Validation(ValidationError::MissingField { field: "days" })),
        "{err:?}"
    );
    let _ = std::fs::remove_dir_all(&dir);
}
