//! Property tests: clamp invariants, enum strictness, fallback soundness.

use interpreter::{
    Command, CommandError, FallbackInterpreter, RawCommand, Registry, ScreenBounds, Validator,
};
use proptest::prelude::*;
use serde_json::json;

fn validate(value: serde_json::Value) -> Result<Command, CommandError> {
    let registry = Registry::new();
    let validator = Validator::new(&registry, ScreenBounds::default());
    let raw = RawCommand::from_value(value).expect("test input must be an object");
    validator.validate(&raw)
}

proptest! {
    /// For any input level, the validated brightness equals
    /// max(lo, min(hi, input)).
    #[test]
    fn brightness_clamps_to_declared_range(level in i64::MIN..i64::MAX) {
        let cmd = validate(json!({"action": "brightness", "level": level})).unwrap();
        prop_assert_eq!(cmd, Command::Brightness { level: level.clamp(0, 255) });
    }

    #[test]
    fn tap_coordinates_clamp_to_screen(x in -10_000i64..10_000, y in -10_000i64..10_000) {
        let cmd = validate(json!({"action": "tap", "x": x, "y": y})).unwrap();
        prop_assert_eq!(
            cmd,
            Command::Tap { x: x.clamp(0, 1080), y: y.clamp(0, 1920) }
        );
    }

    #[test]
    fn long_press_duration_clamps(duration in -100_000i64..100_000) {
        let cmd = validate(json!({
            "action": "long_press", "x": 10, "y": 10, "duration": duration
        }))
        .unwrap();
        prop_assert_eq!(
            cmd,
            Command::LongPress { x: 10, y: 10, duration: duration.clamp(500, 10_000) }
        );
    }

    #[test]
    fn wait_seconds_clamp(seconds in -1000.0f64..1000.0) {
        let cmd = validate(json!({"action": "wait", "seconds": seconds})).unwrap();
        match cmd {
            Command::Wait { seconds: got } => {
                prop_assert!((got - seconds.clamp(0.1, 60.0)).abs() < 1e-9);
            }
            other => panic!("expected wait command, got {other:?}"),
        }
    }

    /// Enum fields reject every non-member value; nothing is clamped or
    /// fuzzy-matched.
    #[test]
    fn scroll_direction_is_strict(direction in "[a-z]{1,12}") {
        let outcome = validate(json!({"action": "scroll", "direction": direction}));
        let is_member = ["up", "down", "left", "right"].contains(&direction.as_str());
        match outcome {
            Ok(_) => prop_assert!(is_member),
            Err(err) => {
                prop_assert!(!is_member);
                prop_assert!(matches!(err, CommandError::InvalidEnumValue { .. }), "expected InvalidEnumValue");
            }
        }
    }

    /// The fallback interpreter never panics, and anything it produces
    /// passes validation (cross-component soundness).
    #[test]
    fn fallback_output_always_validates(text in ".{0,200}") {
        let registry = Registry::new();
        let validator = Validator::new(&registry, ScreenBounds::default());
        if let Ok(raw) = FallbackInterpreter::new().interpret(&text) {
            let outcome = validator.validate(&raw);
            prop_assert!(
                outcome.is_ok(),
                "rule output failed validation for input {:?}: {:?}",
                text,
                outcome.err()
            );
        }
    }

    /// Soundness holds for every rule even when its canonical trigger is
    /// wrapped in arbitrary noise (whatever rule ends up matching).
    #[test]
    fn padded_rule_triggers_stay_sound(
        index in 0usize..FallbackInterpreter::rules().len(),
        prefix in "[ a-z]{0,20}",
        suffix in "[ a-z]{0,20}",
    ) {
        let rule = &FallbackInterpreter::rules()[index];
        let text = format!("{prefix} {} {suffix}", rule.example);

        let registry = Registry::new();
        let validator = Validator::new(&registry, ScreenBounds::default());
        if let Ok(raw) = FallbackInterpreter::new().interpret(&text) {
            prop_assert!(validator.validate(&raw).is_ok());
        }
    }

    /// Re-validating a validated command yields the identical command.
    #[test]
    fn validation_is_idempotent_for_swipes(
        start_x in -5000i64..5000,
        start_y in -5000i64..5000,
        end_x in -5000i64..5000,
        end_y in -5000i64..5000,
        duration in -10_000i64..20_000,
    ) {
        let registry = Registry::new();
        let validator = Validator::new(&registry, ScreenBounds::default());

        let raw = RawCommand::from_value(json!({
            "action": "swipe",
            "start_x": start_x, "start_y": start_y,
            "end_x": end_x, "end_y": end_y,
            "duration": duration
        }))
        .unwrap();
        let first = validator.validate(&raw).unwrap();

        let reserialized =
            RawCommand::from_value(serde_json::to_value(&first).unwrap()).unwrap();
        let second = validator.validate(&reserialized).unwrap();
        prop_assert_eq!(first, second);
    }
}

/// Every rule's canonical trigger phrase must map to a command that
/// passes validation end to end.
#[test]
fn every_fallback_rule_is_sound() {
    let registry = Registry::new();
    let validator = Validator::new(&registry, ScreenBounds::default());
    let interpreter = FallbackInterpreter::new();

    for rule in FallbackInterpreter::rules() {
        let raw = interpreter
            .interpret(rule.example)
            .unwrap_or_else(|_| panic!("no rule matched example {:?}", rule.example));
        let outcome = validator.validate(&raw);
        assert!(
            outcome.is_ok(),
            "rule `{}` produced an invalid command for {:?}: {:?}",
            rule.name,
            rule.example,
            outcome.err()
        );
    }
}
