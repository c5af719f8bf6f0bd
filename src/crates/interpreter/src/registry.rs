//! Action schema registry.
//!
//! One immutable table mapping every supported action name to its field
//! schema. Built once at startup; lookups are read-only and need no
//! synchronization. The model-facing catalog text is rendered from the
//! same table, so the prompt and the validator cannot drift apart.

use crate::schema::{ActionSchema, FieldDefault, FieldKind};
use std::collections::HashMap;

// Closed value sets shared between the registry and the typed command model.
pub const KEYCODES: &[&str] = &[
    "BACK", "HOME", "MENU", "POWER", "VOLUME_UP", "VOLUME_DOWN", "ENTER", "DELETE", "TAB",
    "SPACE", "SEARCH", "CAMERA", "CALL", "ENDCALL",
];
pub const DIRECTIONS: &[&str] = &["up", "down", "left", "right"];
pub const ORIENTATIONS: &[&str] = &["portrait", "landscape", "reverse_portrait", "reverse_landscape"];
pub const UNLOCK_METHODS: &[&str] = &["swipe", "pin", "pattern", "fingerprint"];
pub const FLASH_MODES: &[&str] = &["on", "off", "auto", "torch"];
pub const VOLUME_STREAMS: &[&str] = &["music", "ring", "alarm", "notification"];
pub const LOCALES: &[&str] = &["en_US", "es_ES", "fr_FR", "de_DE", "ja_JP", "ko_KR", "zh_CN"];
pub const TTS_LANGUAGES: &[&str] = &["en", "es", "fr", "de", "ja", "ko", "zh"];
pub const TIMEZONES: &[&str] = &["America/New_York", "Europe/London", "Asia/Tokyo"];
pub const ELEMENT_METHODS: &[&str] = &["text", "id", "class", "xpath"];
pub const FILE_OPERATIONS: &[&str] = &["copy", "move", "delete", "create", "read"];
pub const ACCESSIBILITY_SERVICES: &[&str] = &["talkback", "magnification"];
pub const DEVELOPER_OPTIONS: &[&str] = &["usb_debugging", "show_touches", "pointer_location"];
pub const UI_COMPONENTS: &[&str] = &["status_bar", "navigation_bar"];
pub const SETTING_NAMESPACES: &[&str] = &["system", "secure", "global"];
pub const REBOOT_MODES: &[&str] = &["normal", "recovery", "bootloader"];
pub const BACKUP_TYPES: &[&str] = &["full", "app_data"];
pub const SERVICE_OPERATIONS: &[&str] = &["start", "stop"];
pub const ACTIVITY_OPERATIONS: &[&str] = &["start", "finish"];
pub const STRESS_TYPES: &[&str] = &["cpu", "memory", "storage", "network"];
pub const LOG_LEVELS: &[&str] = &["verbose", "debug", "info", "warn", "error"];
pub const UI_FORMATS: &[&str] = &["xml", "json"];

/// Maximum length of free text typed into the device.
const TEXT_MAX: usize = 1000;
/// Maximum length of filesystem paths.
const PATH_MAX: usize = 4096;
/// Maximum length of package names, component names and similar identifiers.
const NAME_MAX: usize = 256;

/// Immutable action-name → schema table.
pub struct Registry {
    order: Vec<ActionSchema>,
    index: HashMap<&'static str, usize>,
}

impl Registry {
    /// Build the full catalog. Call once at startup and share by reference.
    pub fn new() -> Self {
        let mut registry = Self {
            order: Vec::new(),
            index: HashMap::new(),
        };

        registry.register_gesture_actions();
        registry.register_text_actions();
        registry.register_app_actions();
        registry.register_capture_actions();
        registry.register_motion_actions();
        registry.register_toggle_actions();
        registry.register_setting_actions();
        registry.register_power_actions();
        registry.register_media_actions();
        registry.register_query_actions();
        registry.register_system_actions();
        registry.register_diagnostic_actions();
        registry.register_composite_actions();

        registry
    }

    /// Look up the schema for an action name. Absence is not an error
    /// here; the validator turns it into `UnknownAction`.
    pub fn lookup(&self, name: &str) -> Option<&ActionSchema> {
        self.index.get(name).map(|&i| &self.order[i])
    }

    /// Schemas in registration order (stable across runs, so the rendered
    /// catalog text is deterministic).
    pub fn schemas(&self) -> impl Iterator<Item = &ActionSchema> {
        self.order.iter()
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn register(&mut self, schema: ActionSchema) {
        debug_assert!(
            !self.index.contains_key(schema.name),
            "duplicate schema: {}",
            schema.name
        );
        self.index.insert(schema.name, self.order.len());
        self.order.push(schema);
    }

    /// Register an action that takes no fields.
    fn register_bare(&mut self, name: &'static str) {
        self.register(ActionSchema::new(name));
    }

    /// Register a single-boolean toggle (`enabled` required).
    fn register_toggle(&mut self, name: &'static str) {
        self.register(ActionSchema::new(name).required("enabled", FieldKind::Bool));
    }

    fn register_gesture_actions(&mut self) {
        self.register(
            ActionSchema::new("tap")
                .required("x", FieldKind::CoordX)
                .required("y", FieldKind::CoordY),
        );
        self.register(
            ActionSchema::new("long_press")
                .required("x", FieldKind::CoordX)
                .required("y", FieldKind::CoordY)
                .with_default(
                    "duration",
                    FieldKind::Int { min: 500, max: 10_000 },
                    FieldDefault::Int(1000),
                ),
        );
        self.register(
            ActionSchema::new("double_tap")
                .required("x", FieldKind::CoordX)
                .required("y", FieldKind::CoordY),
        );
        self.register(
            ActionSchema::new("swipe")
                .required("start_x", FieldKind::CoordX)
                .required("start_y", FieldKind::CoordY)
                .required("end_x", FieldKind::CoordX)
                .required("end_y", FieldKind::CoordY)
                .with_default(
                    "duration",
                    FieldKind::Int { min: 100, max: 5000 },
                    FieldDefault::Int(300),
                ),
        );
        self.register(
            ActionSchema::new("drag")
                .required("start_x", FieldKind::CoordX)
                .required("start_y", FieldKind::CoordY)
                .required("end_x", FieldKind::CoordX)
                .required("end_y", FieldKind::CoordY)
                .with_default(
                    "duration",
                    FieldKind::Int { min: 100, max: 5000 },
                    FieldDefault::Int(1000),
                ),
        );
        self.register(
            ActionSchema::new("pinch")
                .required("x", FieldKind::CoordX)
                .required("y", FieldKind::CoordY)
                .required("scale", FieldKind::Float { min: 0.1, max: 10.0 }),
        );
        self.register(
            ActionSchema::new("zoom")
                .required("x", FieldKind::CoordX)
                .required("y", FieldKind::CoordY)
                .required("scale", FieldKind::Float { min: 0.1, max: 10.0 }),
        );
    }

    fn register_text_actions(&mut self) {
        self.register(
            ActionSchema::new("type").required("text", FieldKind::Text { max_len: TEXT_MAX }),
        );
        self.register_bare("clear_text");
        self.register_bare("paste");
        self.register_bare("copy");
        self.register_bare("cut");
        self.register(ActionSchema::new("key").required("keycode", FieldKind::Enum(KEYCODES)));
        self.register(
            ActionSchema::new("tts")
                .required("text", FieldKind::Text { max_len: TEXT_MAX })
                .with_default(
                    "language",
                    FieldKind::Enum(TTS_LANGUAGES),
                    FieldDefault::Str("en"),
                ),
        );
        self.register(
            ActionSchema::new("shell_command")
                .required("command", FieldKind::Text { max_len: TEXT_MAX }),
        );
        self.register(
            ActionSchema::new("file_operation")
                .required("operation", FieldKind::Enum(FILE_OPERATIONS))
                .required("source", FieldKind::Text { max_len: PATH_MAX })
                .required_when(
                    "destination",
                    FieldKind::Text { max_len: PATH_MAX },
                    "operation",
                    &["copy", "move"],
                ),
        );
    }

    fn register_app_actions(&mut self) {
        for name in ["app", "app_info", "force_stop", "uninstall"] {
            self.register(
                ActionSchema::new(name).required("package", FieldKind::Text { max_len: NAME_MAX }),
            );
        }
        self.register(
            ActionSchema::new("install")
                .required("apk_path", FieldKind::Text { max_len: PATH_MAX }),
        );
        self.register(
            ActionSchema::new("split_screen")
                .required("app1", FieldKind::Text { max_len: NAME_MAX })
                .required("app2", FieldKind::Text { max_len: NAME_MAX }),
        );
        self.register_bare("picture_in_picture");
    }

    fn register_capture_actions(&mut self) {
        self.register_bare("screenshot");
        self.register(ActionSchema::new("screen_record").with_default(
            "duration",
            FieldKind::Int { min: 1, max: 300 },
            FieldDefault::Int(30),
        ));
        self.register(
            ActionSchema::new("element_screenshot")
                .required("method", FieldKind::Enum(ELEMENT_METHODS))
                .required("value", FieldKind::Text { max_len: TEXT_MAX }),
        );
        self.register(
            ActionSchema::new("compare_screenshots")
                .required("image1", FieldKind::Text { max_len: PATH_MAX })
                .required("image2", FieldKind::Text { max_len: PATH_MAX })
                .with_default(
                    "threshold",
                    FieldKind::Float { min: 0.0, max: 1.0 },
                    FieldDefault::Float(0.9),
                ),
        );
        self.register(
            ActionSchema::new("visual_test")
                .required("baseline", FieldKind::Text { max_len: PATH_MAX })
                .with_default(
                    "threshold",
                    FieldKind::Float { min: 0.0, max: 1.0 },
                    FieldDefault::Float(0.9),
                ),
        );
    }

    fn register_motion_actions(&mut self) {
        self.register(
            ActionSchema::new("scroll")
                .required("direction", FieldKind::Enum(DIRECTIONS))
                .with_default(
                    "distance",
                    FieldKind::Int { min: 100, max: 2000 },
                    FieldDefault::Int(500),
                ),
        );
        self.register(
            ActionSchema::new("fling")
                .required("direction", FieldKind::Enum(DIRECTIONS))
                .with_default(
                    "velocity",
                    FieldKind::Int { min: 100, max: 5000 },
                    FieldDefault::Int(1000),
                ),
        );
        self.register(
            ActionSchema::new("rotate").required("orientation", FieldKind::Enum(ORIENTATIONS)),
        );
        self.register_bare("recent_apps");
        self.register_bare("quick_settings");
        self.register(
            ActionSchema::new("notification_panel").required("expand", FieldKind::Bool),
        );
    }

    fn register_toggle_actions(&mut self) {
        for name in [
            "wifi",
            "bluetooth",
            "airplane_mode",
            "location",
            "auto_rotate",
            "dark_mode",
            "do_not_disturb",
            "battery_saver",
            "data_saver",
            "hotspot",
            "nfc",
            "flashlight",
        ] {
            self.register_toggle(name);
        }
    }

    fn register_setting_actions(&mut self) {
        self.register(
            ActionSchema::new("brightness").required("level", FieldKind::Int { min: 0, max: 255 }),
        );
        self.register(
            ActionSchema::new("volume")
                .required("level", FieldKind::Int { min: 0, max: 100 })
                .with_default(
                    "stream",
                    FieldKind::Enum(VOLUME_STREAMS),
                    FieldDefault::Str("music"),
                ),
        );
        self.register(
            ActionSchema::new("sleep_timeout")
                .required("seconds", FieldKind::Int { min: 15, max: 1800 }),
        );
        self.register(
            ActionSchema::new("font_size")
                .required("scale", FieldKind::Float { min: 0.5, max: 2.0 }),
        );
        self.register(
            ActionSchema::new("display_size")
                .required("scale", FieldKind::Float { min: 0.5, max: 2.0 }),
        );
        self.register(ActionSchema::new("language").required("locale", FieldKind::Enum(LOCALES)));
        self.register(ActionSchema::new("timezone").required("zone", FieldKind::Enum(TIMEZONES)));
        self.register(
            ActionSchema::new("camera_flash").required("mode", FieldKind::Enum(FLASH_MODES)),
        );
        self.register(
            ActionSchema::new("input_method")
                .required("ime", FieldKind::Text { max_len: NAME_MAX }),
        );
        self.register(
            ActionSchema::new("accessibility")
                .required("service", FieldKind::Enum(ACCESSIBILITY_SERVICES))
                .required("enabled", FieldKind::Bool),
        );
        self.register(
            ActionSchema::new("developer_options")
                .required("option", FieldKind::Enum(DEVELOPER_OPTIONS))
                .required("enabled", FieldKind::Bool),
        );
        self.register(
            ActionSchema::new("system_ui")
                .required("component", FieldKind::Enum(UI_COMPONENTS))
                .required("visible", FieldKind::Bool),
        );
        self.register(
            ActionSchema::new("get_system_settings")
                .required("namespace", FieldKind::Enum(SETTING_NAMESPACES)),
        );
        self.register(
            ActionSchema::new("set_system_setting")
                .required("namespace", FieldKind::Enum(SETTING_NAMESPACES))
                .required("key", FieldKind::Text { max_len: NAME_MAX })
                .required("value", FieldKind::Text { max_len: TEXT_MAX }),
        );
    }

    fn register_power_actions(&mut self) {
        self.register(ActionSchema::new("reboot").with_default(
            "mode",
            FieldKind::Enum(REBOOT_MODES),
            FieldDefault::Str("normal"),
        ));
        self.register_bare("shutdown");
        self.register_bare("wake_up");
        self.register_bare("lock_screen");
        self.register(
            ActionSchema::new("unlock_screen")
                .required("method", FieldKind::Enum(UNLOCK_METHODS))
                .required_when(
                    "credential",
                    FieldKind::Text { max_len: NAME_MAX },
                    "method",
                    &["pin", "pattern"],
                ),
        );
        self.register_bare("emergency_call");
        self.register(
            ActionSchema::new("factory_reset").required("confirm", FieldKind::Bool),
        );
    }

    fn register_media_actions(&mut self) {
        self.register(
            ActionSchema::new("vibrate")
                .optional("pattern", FieldKind::IntList)
                .with_default(
                    "amplitude",
                    FieldKind::Int { min: 1, max: 255 },
                    FieldDefault::Int(128),
                ),
        );
        self.register(
            ActionSchema::new("play_sound")
                .required("file", FieldKind::Text { max_len: PATH_MAX })
                .with_default(
                    "volume",
                    FieldKind::Float { min: 0.0, max: 1.0 },
                    FieldDefault::Float(1.0),
                ),
        );
        self.register(
            ActionSchema::new("cast_screen")
                .required("device", FieldKind::Text { max_len: NAME_MAX }),
        );
    }

    fn register_query_actions(&mut self) {
        for name in ["find_element", "get_element_bounds"] {
            self.register(
                ActionSchema::new(name)
                    .required("method", FieldKind::Enum(ELEMENT_METHODS))
                    .required("value", FieldKind::Text { max_len: TEXT_MAX }),
            );
        }
        self.register(
            ActionSchema::new("wait_for_element")
                .required("method", FieldKind::Enum(ELEMENT_METHODS))
                .required("value", FieldKind::Text { max_len: TEXT_MAX })
                .with_default(
                    "timeout",
                    FieldKind::Int { min: 1, max: 60 },
                    FieldDefault::Int(10),
                ),
        );
        self.register(
            ActionSchema::new("assert_element")
                .required("method", FieldKind::Enum(ELEMENT_METHODS))
                .required("value", FieldKind::Text { max_len: TEXT_MAX })
                .required("exists", FieldKind::Bool),
        );
        self.register(ActionSchema::new("ocr").optional("region", FieldKind::Region));
        self.register(ActionSchema::new("ui_hierarchy").with_default(
            "format",
            FieldKind::Enum(UI_FORMATS),
            FieldDefault::Str("xml"),
        ));
        self.register_bare("accessibility_scan");
        for name in [
            "get_screen_info",
            "get_device_info",
            "get_battery_info",
            "get_network_info",
            "get_storage_info",
            "get_running_apps",
            "get_installed_apps",
        ] {
            self.register_bare(name);
        }
    }

    fn register_system_actions(&mut self) {
        self.register(
            ActionSchema::new("permission")
                .required("package", FieldKind::Text { max_len: NAME_MAX })
                .required("permission", FieldKind::Text { max_len: NAME_MAX })
                .required("grant", FieldKind::Bool),
        );
        self.register(
            ActionSchema::new("intent")
                .required("intent_action", FieldKind::Text { max_len: NAME_MAX })
                .optional("data", FieldKind::Text { max_len: TEXT_MAX })
                .optional("extras", FieldKind::Json),
        );
        self.register(
            ActionSchema::new("broadcast")
                .required("broadcast_action", FieldKind::Text { max_len: NAME_MAX })
                .optional("extras", FieldKind::Json),
        );
        self.register(
            ActionSchema::new("service")
                .required("operation", FieldKind::Enum(SERVICE_OPERATIONS))
                .required("component", FieldKind::Text { max_len: NAME_MAX }),
        );
        self.register(
            ActionSchema::new("activity")
                .required("operation", FieldKind::Enum(ACTIVITY_OPERATIONS))
                .required("component", FieldKind::Text { max_len: NAME_MAX }),
        );
        self.register(
            ActionSchema::new("backup").required("type", FieldKind::Enum(BACKUP_TYPES)),
        );
    }

    fn register_diagnostic_actions(&mut self) {
        self.register(
            ActionSchema::new("monkey_test")
                .required("package", FieldKind::Text { max_len: NAME_MAX })
                .with_default(
                    "events",
                    FieldKind::Int { min: 1, max: 10_000 },
                    FieldDefault::Int(100),
                )
                .with_default(
                    "seed",
                    FieldKind::Int { min: 0, max: i64::MAX },
                    FieldDefault::Int(1),
                ),
        );
        self.register(
            ActionSchema::new("stress_test")
                .required("type", FieldKind::Enum(STRESS_TYPES))
                .with_default(
                    "duration",
                    FieldKind::Int { min: 1, max: 300 },
                    FieldDefault::Int(60),
                ),
        );
        for name in ["performance_test", "cpu_profile", "network_monitor"] {
            self.register(
                ActionSchema::new(name)
                    .required("package", FieldKind::Text { max_len: NAME_MAX })
                    .with_default(
                        "duration",
                        FieldKind::Int { min: 1, max: 300 },
                        FieldDefault::Int(60),
                    ),
            );
        }
        self.register(
            ActionSchema::new("memory_dump")
                .required("package", FieldKind::Text { max_len: NAME_MAX })
                .required("output", FieldKind::Text { max_len: PATH_MAX }),
        );
        self.register(
            ActionSchema::new("log_capture")
                .with_default("level", FieldKind::Enum(LOG_LEVELS), FieldDefault::Str("info"))
                .optional("tag", FieldKind::Text { max_len: NAME_MAX })
                .with_default(
                    "duration",
                    FieldKind::Int { min: 1, max: 300 },
                    FieldDefault::Int(60),
                ),
        );
        for name in ["crash_report", "anr_report", "security_scan"] {
            self.register(
                ActionSchema::new(name).required("package", FieldKind::Text { max_len: NAME_MAX }),
            );
        }
        self.register(
            ActionSchema::new("gesture_record")
                .required("name", FieldKind::Text { max_len: NAME_MAX })
                .with_default(
                    "duration",
                    FieldKind::Int { min: 1, max: 60 },
                    FieldDefault::Int(10),
                ),
        );
        for name in ["gesture_play", "macro_record", "macro_play"] {
            self.register(
                ActionSchema::new(name).required("name", FieldKind::Text { max_len: NAME_MAX }),
            );
        }
    }

    fn register_composite_actions(&mut self) {
        self.register(
            ActionSchema::new("conditional")
                .required("condition", FieldKind::Condition)
                .required("then", FieldKind::Command)
                .optional("else", FieldKind::Command),
        );
        self.register(
            ActionSchema::new("loop")
                .required("count", FieldKind::Int { min: 1, max: 100 })
                .required("actions", FieldKind::CommandList),
        );
        self.register(
            ActionSchema::new("random_action")
                .required("actions", FieldKind::CommandList)
                .with_default(
                    "count",
                    FieldKind::Int { min: 1, max: 50 },
                    FieldDefault::Int(5),
                ),
        );
        self.register(
            ActionSchema::new("wait")
                .required("seconds", FieldKind::Float { min: 0.1, max: 60.0 }),
        );
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldRequirement;

    #[test]
    fn test_lookup_known_and_unknown() {
        let registry = Registry::new();
        assert!(registry.lookup("tap").is_some());
        assert!(registry.lookup("screenshot").is_some());
        assert!(registry.lookup("loop").is_some());
        assert!(registry.lookup("fly_to_the_moon").is_none());
    }

    #[test]
    fn test_catalog_is_complete() {
        let registry = Registry::new();
        // Full catalog: 7 gestures, 9 text, 7 app, 5 capture, 6 motion,
        // 12 toggles, 14 settings, 7 power, 3 media, 14 queries,
        // 6 system, 14 diagnostics, 4 composite.
        assert_eq!(registry.len(), 108);
    }

    #[test]
    fn test_schemas_iterate_in_registration_order() {
        let registry = Registry::new();
        let first: Vec<&str> = registry.schemas().take(3).map(|s| s.name).collect();
        assert_eq!(first, vec!["tap", "long_press", "double_tap"]);
    }

    #[test]
    fn test_toggles_share_the_boolean_shape() {
        let registry = Registry::new();
        for name in ["wifi", "bluetooth", "dark_mode", "flashlight"] {
            let schema = registry.lookup(name).unwrap();
            assert_eq!(schema.fields.len(), 1);
            assert_eq!(schema.fields[0].name, "enabled");
        }
    }

    #[test]
    fn test_conditional_requirements_follow_their_gate() {
        let registry = Registry::new();
        let schema = registry.lookup("file_operation").unwrap();
        let gate_pos = schema.fields.iter().position(|f| f.name == "operation").unwrap();
        let dep_pos = schema.fields.iter().position(|f| f.name == "destination").unwrap();
        assert!(gate_pos < dep_pos);
        assert!(matches!(
            schema.fields[dep_pos].requirement,
            FieldRequirement::RequiredWhen { field: "operation", .. }
        ));
    }
}
