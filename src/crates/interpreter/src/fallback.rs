//! Deterministic rule-based fallback interpreter.
//!
//! Used when the model backend is unavailable or returned unusable
//! output. Rules are kept in one ordered table and evaluated
//! top-to-bottom over the lower-cased, trimmed instruction; the first
//! match wins. Ordering is a correctness property: more specific phrases
//! must precede more general ones (screen recording before screenshot,
//! unlock before lock), or they would be shadowed forever.

use crate::command::RawCommand;
use crate::error::{CommandError, Result};
use serde_json::{json, Value};
use tracing::debug;

/// One fallback rule: a recognizer over normalized text and the command
/// it builds. `example` is a canonical phrase the rule must match; the
/// soundness tests drive every rule through validation with it.
pub struct FallbackRule {
    pub name: &'static str,
    pub example: &'static str,
    matcher: fn(&str) -> Option<Value>,
}

impl FallbackRule {
    /// Run this rule against normalized text.
    pub fn build(&self, text: &str) -> Option<Value> {
        (self.matcher)(text)
    }
}

/// Keyword → package table for "open <app>" phrases.
static APP_PACKAGES: &[(&[&str], &str)] = &[
    (&["camera"], "com.android.camera"),
    (&["settings"], "com.android.settings"),
    (&["browser", "chrome"], "com.android.chrome"),
    (&["gallery", "photos"], "com.google.android.apps.photos"),
    (&["calculator"], "com.android.calculator2"),
    (&["contacts"], "com.android.contacts"),
    (&["phone", "dialer"], "com.android.dialer"),
    (&["messages", "sms"], "com.android.mms"),
    (&["clock", "alarm"], "com.android.deskclock"),
    (&["calendar"], "com.android.calendar"),
    (&["maps"], "com.google.android.apps.maps"),
    (&["youtube"], "com.google.android.youtube"),
    (&["play store"], "com.android.vending"),
];

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

/// The ordered rule table. Do not reorder casually: see module docs.
static RULES: &[FallbackRule] = &[
    FallbackRule {
        name: "screen_record",
        example: "record the screen",
        matcher: |t| {
            (t.contains("record") && contains_any(t, &["screen", "capture"]))
                .then(|| json!({"action": "screen_record", "duration": 30}))
        },
    },
    FallbackRule {
        name: "screenshot",
        example: "take a screenshot",
        matcher: |t| {
            contains_any(t, &["screenshot", "screen shot", "capture"])
                .then(|| json!({"action": "screenshot"}))
        },
    },
    FallbackRule {
        name: "key_back",
        example: "go back",
        matcher: |t| {
            contains_any(t, &["back", "return"])
                .then(|| json!({"action": "key", "keycode": "BACK"}))
        },
    },
    FallbackRule {
        name: "key_home",
        example: "go home",
        matcher: |t| {
            contains_any(t, &["home", "launcher"])
                .then(|| json!({"action": "key", "keycode": "HOME"}))
        },
    },
    FallbackRule {
        name: "recent_apps",
        example: "show recent apps",
        matcher: |t| {
            contains_any(t, &["recent apps", "task switcher"])
                .then(|| json!({"action": "recent_apps"}))
        },
    },
    // Swipe phrases invert: swiping up scrolls the content down.
    FallbackRule {
        name: "scroll_down",
        example: "scroll down",
        matcher: |t| {
            contains_any(t, &["scroll down", "swipe up"])
                .then(|| json!({"action": "scroll", "direction": "down"}))
        },
    },
    FallbackRule {
        name: "scroll_up",
        example: "scroll up",
        matcher: |t| {
            contains_any(t, &["scroll up", "swipe down"])
                .then(|| json!({"action": "scroll", "direction": "up"}))
        },
    },
    FallbackRule {
        name: "scroll_left",
        example: "scroll left",
        matcher: |t| {
            t.contains("scroll left")
                .then(|| json!({"action": "scroll", "direction": "left"}))
        },
    },
    FallbackRule {
        name: "scroll_right",
        example: "scroll right",
        matcher: |t| {
            t.contains("scroll right")
                .then(|| json!({"action": "scroll", "direction": "right"}))
        },
    },
    FallbackRule {
        name: "long_press",
        example: "long press the middle",
        matcher: |t| {
            contains_any(t, &["long press", "hold"])
                .then(|| json!({"action": "long_press", "x": 540, "y": 960, "duration": 1000}))
        },
    },
    FallbackRule {
        name: "double_tap",
        example: "double tap here",
        matcher: |t| {
            contains_any(t, &["double tap", "double click"])
                .then(|| json!({"action": "double_tap", "x": 540, "y": 960}))
        },
    },
    FallbackRule {
        name: "pinch",
        example: "pinch to zoom out",
        matcher: |t| {
            t.contains("pinch")
                .then(|| json!({"action": "pinch", "x": 540, "y": 960, "scale": 0.5}))
        },
    },
    FallbackRule {
        name: "zoom",
        example: "zoom in",
        matcher: |t| {
            t.contains("zoom")
                .then(|| json!({"action": "zoom", "x": 540, "y": 960, "scale": 2.0}))
        },
    },
    FallbackRule {
        name: "type_text",
        example: "type hello world",
        matcher: |t| {
            t.strip_prefix("type ")
                .map(|rest| json!({"action": "type", "text": rest.trim()}))
        },
    },
    FallbackRule {
        name: "paste",
        example: "paste it",
        matcher: |t| t.contains("paste").then(|| json!({"action": "paste"})),
    },
    FallbackRule {
        name: "copy",
        example: "copy the selection",
        matcher: |t| t.contains("copy").then(|| json!({"action": "copy"})),
    },
    FallbackRule {
        name: "clear_text",
        example: "clear text",
        matcher: |t| t.contains("clear text").then(|| json!({"action": "clear_text"})),
    },
    FallbackRule {
        name: "cut",
        example: "cut the selection",
        matcher: |t| {
            t.split_whitespace()
                .any(|w| w == "cut")
                .then(|| json!({"action": "cut"}))
        },
    },
    FallbackRule {
        name: "wifi_on",
        example: "turn wifi on",
        matcher: |t| {
            contains_any(t, &["wifi on", "enable wifi"])
                .then(|| json!({"action": "wifi", "enabled": true}))
        },
    },
    FallbackRule {
        name: "wifi_off",
        example: "turn wifi off",
        matcher: |t| {
            contains_any(t, &["wifi off", "disable wifi"])
                .then(|| json!({"action": "wifi", "enabled": false}))
        },
    },
    FallbackRule {
        name: "bluetooth_on",
        example: "turn bluetooth on",
        matcher: |t| {
            contains_any(t, &["bluetooth on", "enable bluetooth"])
                .then(|| json!({"action": "bluetooth", "enabled": true}))
        },
    },
    FallbackRule {
        name: "bluetooth_off",
        example: "turn bluetooth off",
        matcher: |t| {
            contains_any(t, &["bluetooth off", "disable bluetooth"])
                .then(|| json!({"action": "bluetooth", "enabled": false}))
        },
    },
    FallbackRule {
        name: "airplane_mode_on",
        example: "airplane mode on",
        matcher: |t| {
            t.contains("airplane mode on")
                .then(|| json!({"action": "airplane_mode", "enabled": true}))
        },
    },
    FallbackRule {
        name: "airplane_mode_off",
        example: "airplane mode off",
        matcher: |t| {
            t.contains("airplane mode off")
                .then(|| json!({"action": "airplane_mode", "enabled": false}))
        },
    },
    FallbackRule {
        name: "flashlight_on",
        example: "turn on flashlight",
        matcher: |t| {
            contains_any(t, &["flashlight on", "turn on flashlight"])
                .then(|| json!({"action": "flashlight", "enabled": true}))
        },
    },
    FallbackRule {
        name: "flashlight_off",
        example: "turn off flashlight",
        matcher: |t| {
            contains_any(t, &["flashlight off", "turn off flashlight"])
                .then(|| json!({"action": "flashlight", "enabled": false}))
        },
    },
    FallbackRule {
        name: "dark_mode_on",
        example: "enable dark mode",
        matcher: |t| {
            contains_any(t, &["dark mode on", "enable dark mode"])
                .then(|| json!({"action": "dark_mode", "enabled": true}))
        },
    },
    FallbackRule {
        name: "dark_mode_off",
        example: "disable dark mode",
        matcher: |t| {
            contains_any(t, &["dark mode off", "disable dark mode"])
                .then(|| json!({"action": "dark_mode", "enabled": false}))
        },
    },
    FallbackRule {
        name: "volume_up",
        example: "volume up",
        matcher: |t| {
            t.contains("volume up")
                .then(|| json!({"action": "key", "keycode": "VOLUME_UP"}))
        },
    },
    FallbackRule {
        name: "volume_down",
        example: "volume down",
        matcher: |t| {
            t.contains("volume down")
                .then(|| json!({"action": "key", "keycode": "VOLUME_DOWN"}))
        },
    },
    FallbackRule {
        name: "brightness",
        example: "set brightness to max",
        matcher: |t| {
            t.contains("brightness").then(|| {
                let level = if contains_any(t, &["max", "full"]) {
                    255
                } else if t.contains("min") {
                    0
                } else {
                    128
                };
                json!({"action": "brightness", "level": level})
            })
        },
    },
    FallbackRule {
        name: "rotate",
        example: "rotate to landscape",
        matcher: |t| {
            if !t.contains("rotate") {
                return None;
            }
            if t.contains("landscape") {
                Some(json!({"action": "rotate", "orientation": "landscape"}))
            } else if t.contains("portrait") {
                Some(json!({"action": "rotate", "orientation": "portrait"}))
            } else {
                None
            }
        },
    },
    FallbackRule {
        name: "notification_panel",
        example: "open notifications",
        matcher: |t| {
            if !t.contains("notification") {
                return None;
            }
            if contains_any(t, &["expand", "open"]) {
                Some(json!({"action": "notification_panel", "expand": true}))
            } else if contains_any(t, &["close", "collapse"]) {
                Some(json!({"action": "notification_panel", "expand": false}))
            } else {
                None
            }
        },
    },
    FallbackRule {
        name: "quick_settings",
        example: "open quick settings",
        matcher: |t| {
            t.contains("quick settings")
                .then(|| json!({"action": "quick_settings"}))
        },
    },
    // "unlock" contains "lock", so unlock must come first.
    FallbackRule {
        name: "unlock_screen",
        example: "unlock the screen",
        matcher: |t| {
            t.contains("unlock")
                .then(|| json!({"action": "unlock_screen", "method": "swipe"}))
        },
    },
    FallbackRule {
        name: "lock_screen",
        example: "lock the screen",
        matcher: |t| {
            (t.contains("lock") && t.contains("screen"))
                .then(|| json!({"action": "lock_screen"}))
        },
    },
    FallbackRule {
        name: "wake_up",
        example: "wake up the device",
        matcher: |t| t.contains("wake").then(|| json!({"action": "wake_up"})),
    },
    FallbackRule {
        name: "reboot",
        example: "reboot the device",
        matcher: |t| {
            contains_any(t, &["reboot", "restart"])
                .then(|| json!({"action": "reboot", "mode": "normal"}))
        },
    },
    FallbackRule {
        name: "shutdown",
        example: "power off the phone",
        matcher: |t| {
            contains_any(t, &["shutdown", "shut down", "power off"])
                .then(|| json!({"action": "shutdown"}))
        },
    },
    FallbackRule {
        name: "open_app",
        example: "open camera",
        matcher: |t| {
            if !t.contains("open") {
                return None;
            }
            APP_PACKAGES
                .iter()
                .find(|(keywords, _)| contains_any(t, keywords))
                .map(|(_, package)| json!({"action": "app", "package": package}))
        },
    },
    FallbackRule {
        name: "device_info",
        example: "show device info",
        matcher: |t| {
            contains_any(t, &["device info", "phone info"])
                .then(|| json!({"action": "get_device_info"}))
        },
    },
    FallbackRule {
        name: "battery_info",
        example: "battery info",
        matcher: |t| {
            (t.contains("battery") && t.contains("info"))
                .then(|| json!({"action": "get_battery_info"}))
        },
    },
    FallbackRule {
        name: "storage_info",
        example: "storage info",
        matcher: |t| {
            (t.contains("storage") && t.contains("info"))
                .then(|| json!({"action": "get_storage_info"}))
        },
    },
    FallbackRule {
        name: "network_info",
        example: "network info",
        matcher: |t| {
            (t.contains("network") && t.contains("info"))
                .then(|| json!({"action": "get_network_info"}))
        },
    },
    FallbackRule {
        name: "running_apps",
        example: "list running apps",
        matcher: |t| {
            t.contains("running apps")
                .then(|| json!({"action": "get_running_apps"}))
        },
    },
    FallbackRule {
        name: "installed_apps",
        example: "list installed apps",
        matcher: |t| {
            t.contains("installed apps")
                .then(|| json!({"action": "get_installed_apps"}))
        },
    },
    FallbackRule {
        name: "ui_hierarchy",
        example: "dump ui hierarchy",
        matcher: |t| {
            contains_any(t, &["ui hierarchy", "dump ui"])
                .then(|| json!({"action": "ui_hierarchy", "format": "xml"}))
        },
    },
    FallbackRule {
        name: "monkey_test",
        example: "run a monkey test",
        matcher: |t| {
            t.contains("monkey test").then(|| {
                json!({"action": "monkey_test", "package": "com.android.launcher", "events": 100})
            })
        },
    },
    FallbackRule {
        name: "wait",
        example: "wait 3",
        matcher: |t| {
            t.strip_prefix("wait ").map(|rest| {
                // Non-numeric (or non-finite) suffixes fall back to a
                // one-second wait.
                let seconds = rest
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|s| s.is_finite())
                    .unwrap_or(1.0);
                json!({"action": "wait", "seconds": seconds})
            })
        },
    },
    // Terminal catch-all: any tap-ish phrase becomes a centered tap.
    FallbackRule {
        name: "default_tap",
        example: "tap the middle of the display",
        matcher: |t| {
            contains_any(t, &["tap", "click", "touch"])
                .then(|| json!({"action": "tap", "x": 540, "y": 960}))
        },
    },
];

/// Ordered-rule interpreter over normalized instruction text.
#[derive(Default)]
pub struct FallbackInterpreter;

impl FallbackInterpreter {
    pub fn new() -> Self {
        Self
    }

    /// The full rule table, in evaluation order.
    pub fn rules() -> &'static [FallbackRule] {
        RULES
    }

    /// Map an instruction to a raw command via the first matching rule.
    pub fn interpret(&self, text: &str) -> Result<RawCommand> {
        let normalized = text.trim().to_lowercase();

        for rule in RULES {
            if let Some(value) = rule.build(&normalized) {
                debug!(rule = rule.name, "fallback rule matched");
                if let Some(raw) = RawCommand::from_value(value) {
                    return Ok(raw);
                }
            }
        }

        Err(CommandError::Unparsable)
    }
}
