use crate::env::RootKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Position of a call site inside a classified source tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileLocation {
    /// Root the file belongs to
    pub root: RootKind,

    /// File path, relative to the root
    pub file: String,

    /// Line number (1-indexed)
    pub line: usize,
}

impl FileLocation {
    pub fn new(root: RootKind, file: impl Into<String>, line: usize) -> Self {
        Self {
            root,
            file: file.into(),
            line,
        }
    }
}

/// Call-specific part of a frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallInfo {
    /// Package import path, e.g. `net/http`
    pub package: String,

    /// Function or method name, e.g. `(*Server).Serve`
    pub method: String,

    /// Raw argument text between the call parentheses
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub args: String,

    /// Trailing annotation of the location line, e.g. `+0x1a5`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extra: String,

    /// Set only on the `created by` frame that ends a stack
    #[serde(default, skip_serializing_if = "is_false")]
    pub origin: bool,
}

/// Rendered HTML around a call site
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    /// Marked call line plus the lines preceding it
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prefix: String,

    /// Lines following the call line
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub suffix: String,
}

impl Highlight {
    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty() && self.suffix.is_empty()
    }
}

/// One entry of a goroutine's call stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallFrame {
    #[serde(flatten)]
    pub location: FileLocation,

    #[serde(flatten)]
    pub call: CallInfo,

    #[serde(flatten)]
    pub highlight: Highlight,
}

impl CallFrame {
    pub fn new(location: FileLocation, call: CallInfo) -> Self {
        Self {
            location,
            call,
            highlight: Highlight::default(),
        }
    }

    pub fn is_origin(&self) -> bool {
        self.call.origin
    }
}

/// A goroutine and its call stack, as printed by the runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goroutine {
    /// Goroutine ID as printed; never 0 for a parsed goroutine
    pub id: u64,

    /// Blocking state, e.g. `chan receive`
    pub op: String,

    /// How long the goroutine has been blocked
    #[serde(
        default,
        with = "duration_nanos",
        skip_serializing_if = "Duration::is_zero"
    )]
    pub duration: Duration,

    /// Wired to its OS thread (`LockOSThread`)
    #[serde(default, rename = "lockedToThread", skip_serializing_if = "is_false")]
    pub locked_to_thread: bool,

    /// ID of the goroutine that spawned this one, when the dump reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,

    /// Frames, innermost call first and origin frame last
    #[serde(default, rename = "callStack", skip_serializing_if = "Vec::is_empty")]
    pub call_stack: Vec<CallFrame>,
}

impl Goroutine {
    /// The program's entry goroutine: its outermost frame was never spawned
    pub fn is_entry(&self) -> bool {
        self.call_stack.last().is_some_and(|frame| !frame.is_origin())
    }

    /// Location stack used for grouping
    pub fn locations(&self) -> impl Iterator<Item = &FileLocation> {
        self.call_stack.iter().map(|frame| &frame.location)
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

/// Durations travel as integer nanoseconds on the wire.
mod duration_nanos {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let nanos = u64::try_from(value.as_nanos()).unwrap_or(u64::MAX);
        serializer.serialize_u64(nanos)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_nanos)
    }
}
