//! Command data model.
//!
//! `RawCommand` is the untrusted candidate produced by either interpreter:
//! an action name plus arbitrary key/value fields. The validator turns it
//! into `Command`, the typed sum over the action catalog; composite
//! variants nest further `Command`s recursively. A `Command` serializes to
//! the flat wire shape the device executor consumes, e.g.
//! `{"action": "tap", "x": 540, "y": 960}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Untrusted action candidate prior to validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCommand(Map<String, Value>);

impl RawCommand {
    /// Wrap a JSON value; returns `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// The candidate action name, if one is present.
    pub fn action(&self) -> Option<&str> {
        self.0.get("action").and_then(Value::as_str)
    }

    /// Candidate fields, action name included.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for RawCommand {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Hardware key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyCode {
    Back,
    Home,
    Menu,
    Power,
    VolumeUp,
    VolumeDown,
    Enter,
    Delete,
    Tab,
    Space,
    Search,
    Camera,
    Call,
    Endcall,
}

/// Scroll/fling directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Screen orientations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Portrait,
    Landscape,
    ReversePortrait,
    ReverseLandscape,
}

/// Lock-screen unlock methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnlockMethod {
    Swipe,
    Pin,
    Pattern,
    Fingerprint,
}

/// Camera flash modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFlashMode {
    On,
    Off,
    Auto,
    Torch,
}

/// File operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOp {
    Copy,
    Move,
    Delete,
    Create,
    Read,
}

/// UI element query methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementMethod {
    Text,
    Id,
    Class,
    Xpath,
}

/// Audio streams a volume change can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeStream {
    Music,
    Ring,
    Alarm,
    Notification,
}

/// UI probe evaluated by `conditional`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub method: ElementMethod,
    pub value: String,
    pub exists: bool,
}

/// Screen-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// A validated, bounds-checked device command, ready for execution.
///
/// Every numeric field lies within its schema's declared range and every
/// enum field is an exact member of its closed set; the validator upholds
/// these invariants before a value of this type can exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    // Gestures
    Tap { x: i64, y: i64 },
    LongPress { x: i64, y: i64, duration: i64 },
    DoubleTap { x: i64, y: i64 },
    Swipe {
        start_x: i64,
        start_y: i64,
        end_x: i64,
        end_y: i64,
        duration: i64,
    },
    Drag {
        start_x: i64,
        start_y: i64,
        end_x: i64,
        end_y: i64,
        duration: i64,
    },
    Pinch { x: i64, y: i64, scale: f64 },
    Zoom { x: i64, y: i64, scale: f64 },

    // Text and clipboard
    Type { text: String },
    ClearText,
    Paste,
    Copy,
    Cut,
    Key { keycode: KeyCode },
    Tts { text: String, language: String },
    ShellCommand { command: String },
    FileOperation {
        operation: FileOp,
        source: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        destination: Option<String>,
    },

    // App management
    App { package: String },
    AppInfo { package: String },
    ForceStop { package: String },
    Uninstall { package: String },
    Install { apk_path: String },
    SplitScreen { app1: String, app2: String },
    PictureInPicture,

    // Capture
    Screenshot,
    ScreenRecord { duration: i64 },
    ElementScreenshot { method: ElementMethod, value: String },
    CompareScreenshots {
        image1: String,
        image2: String,
        threshold: f64,
    },
    VisualTest { baseline: String, threshold: f64 },

    // Motion and navigation
    Scroll { direction: Direction, distance: i64 },
    Fling { direction: Direction, velocity: i64 },
    Rotate { orientation: Orientation },
    RecentApps,
    QuickSettings,
    NotificationPanel { expand: bool },

    // Toggles
    Wifi { enabled: bool },
    Bluetooth { enabled: bool },
    AirplaneMode { enabled: bool },
    Location { enabled: bool },
    AutoRotate { enabled: bool },
    DarkMode { enabled: bool },
    DoNotDisturb { enabled: bool },
    BatterySaver { enabled: bool },
    DataSaver { enabled: bool },
    Hotspot { enabled: bool },
    Nfc { enabled: bool },
    Flashlight { enabled: bool },

    // Settings
    Brightness { level: i64 },
    Volume { level: i64, stream: VolumeStream },
    SleepTimeout { seconds: i64 },
    FontSize { scale: f64 },
    DisplaySize { scale: f64 },
    Language { locale: String },
    Timezone { zone: String },
    CameraFlash { mode: CameraFlashMode },
    InputMethod { ime: String },
    Accessibility { service: String, enabled: bool },
    DeveloperOptions { option: String, enabled: bool },
    SystemUi { component: String, visible: bool },
    GetSystemSettings { namespace: String },
    SetSystemSetting {
        namespace: String,
        key: String,
        value: String,
    },

    // Power and lock
    Reboot { mode: String },
    Shutdown,
    WakeUp,
    LockScreen,
    UnlockScreen {
        method: UnlockMethod,
        #[serde(skip_serializing_if = "Option::is_none")]
        credential: Option<String>,
    },
    EmergencyCall,
    FactoryReset { confirm: bool },

    // Media and feedback
    Vibrate {
        #[serde(skip_serializing_if = "Option::is_none")]
        pattern: Option<Vec<i64>>,
        amplitude: i64,
    },
    PlaySound { file: String, volume: f64 },
    CastScreen { device: String },

    // UI queries
    FindElement { method: ElementMethod, value: String },
    WaitForElement {
        method: ElementMethod,
        value: String,
        timeout: i64,
    },
    AssertElement {
        method: ElementMethod,
        value: String,
        exists: bool,
    },
    GetElementBounds { method: ElementMethod, value: String },
    Ocr {
        #[serde(skip_serializing_if = "Option::is_none")]
        region: Option<Region>,
    },
    UiHierarchy { format: String },
    AccessibilityScan,

    // Info queries
    GetScreenInfo,
    GetDeviceInfo,
    GetBatteryInfo,
    GetNetworkInfo,
    GetStorageInfo,
    GetRunningApps,
    GetInstalledApps,

    // System plumbing
    Permission {
        package: String,
        permission: String,
        grant: bool,
    },
    Intent {
        intent_action: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        extras: Option<Value>,
    },
    Broadcast {
        broadcast_action: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        extras: Option<Value>,
    },
    Service { operation: String, component: String },
    Activity { operation: String, component: String },
    Backup {
        #[serde(rename = "type")]
        backup_type: String,
    },

    // Diagnostics
    MonkeyTest {
        package: String,
        events: i64,
        seed: i64,
    },
    StressTest {
        #[serde(rename = "type")]
        stress_type: String,
        duration: i64,
    },
    PerformanceTest { package: String, duration: i64 },
    CpuProfile { package: String, duration: i64 },
    NetworkMonitor { package: String, duration: i64 },
    MemoryDump { package: String, output: String },
    LogCapture {
        level: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        tag: Option<String>,
        duration: i64,
    },
    CrashReport { package: String },
    AnrReport { package: String },
    SecurityScan { package: String },
    GestureRecord { name: String, duration: i64 },
    GesturePlay { name: String },
    MacroRecord { name: String },
    MacroPlay { name: String },

    // Composite control flow
    Conditional {
        condition: Condition,
        then: Box<Command>,
        #[serde(rename = "else", skip_serializing_if = "Option::is_none")]
        else_branch: Option<Box<Command>>,
    },
    Loop { count: i64, actions: Vec<Command> },
    RandomAction { actions: Vec<Command>, count: i64 },
    Wait { seconds: f64 },
}
