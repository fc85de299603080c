//! # Stackscope Dump
//!
//! Structured model of a Go goroutine dump (`/debug/pprof/goroutine?debug=2`).
//!
//! ## Pipeline
//!
//! ```text
//! Raw dump text
//!     │
//!     ├──> Record split (blank-line separated)
//!     │
//!     ├──> Header + call/location pairs
//!     │      └─> Root classification (project / GOROOT / GOPATH / cgo)
//!     │
//!     └──> Vec<Goroutine>
//!            ├─> sort  (entry goroutine, duration, ID)
//!            ├─> group (identical location stacks)
//!            └─> DurationFilter
//! ```
//!
//! ## Example
//!
//! ```rust
//! use stackscope_dump::{parse, sort, Environment};
//!
//! let env = Environment::project("/proj");
//! let dump = "goroutine 1 [running]:\nmain.main()\n\t/proj/main.go:10 +0x20\n";
//!
//! let mut goroutines = parse(dump, &env).unwrap();
//! sort(&mut goroutines);
//! assert_eq!(goroutines[0].call_stack[0].location.file, "main.go");
//! ```

mod env;
mod error;
mod filter;
mod order;
mod parser;
mod types;

pub use env::{normalize_path, Environment, RootKind, GENERATED_MARKER};
pub use error::{DumpError, Result};
pub use filter::DurationFilter;
pub use order::{compare_location, compare_stack, group, sort, Group};
pub use parser::{parse, parse_goroutine, parse_reader, split_qualified_name};
pub use types::{CallFrame, CallInfo, FileLocation, Goroutine, Highlight};
