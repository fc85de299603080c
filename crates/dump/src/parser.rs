use crate::env::Environment;
use crate::error::{DumpError, Result};
use crate::types::{CallFrame, CallInfo, FileLocation, Goroutine};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Read;
use std::time::Duration;

// goroutine 11847977 [chan receive, 5 minutes]:
static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^goroutine (\d+) \[([^,\]]+)(?:, (\d+) minutes)?(, locked to thread)?\]:$")
        .expect("valid header regex")
});

// github.com/streadway/amqp.(*consumers).buffer(0xc01f9c6120, 0xc04b4369c0)
static CALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*)\((.*?)\)$").expect("valid call regex"));

// net/http.(*Server).Serve in goroutine 1
static CREATED_IN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*) in goroutine (\d+)$").expect("valid created-by regex"));

// \t/home/ubuntu/.gopath/pkg/mod/github.com/streadway/amqp@v1.0.0/consumers.go:61 +0x108
static LOCATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\t(.*):(\d+)(?: (.*?))?$").expect("valid location regex"));

// ...additional frames elided...
// ...12 frames elided...
static ELIDED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\.\.\.(?:additional|\d+) frames elided\.\.\.$").expect("valid elision regex")
});

const CREATED_BY_PREFIX: &str = "created by ";

/// Parse the text of a `/debug/pprof/goroutine?debug=2` page.
///
/// Records are separated by blank lines. The first malformed record aborts the
/// whole parse; no partial list is returned.
pub fn parse(text: &str, env: &Environment) -> Result<Vec<Goroutine>> {
    let goroutines = split_records(text)
        .into_iter()
        .map(|record| parse_goroutine(&record, env))
        .collect::<Result<Vec<_>>>()?;
    log::debug!("parsed {} goroutines", goroutines.len());
    Ok(goroutines)
}

/// Same as [`parse`], reading the dump from `reader`
pub fn parse_reader(mut reader: impl Read, env: &Environment) -> Result<Vec<Goroutine>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse(&text, env)
}

/// Parse a single record: a header line followed by call/location line pairs.
pub fn parse_goroutine(record: &[&str], env: &Environment) -> Result<Goroutine> {
    let Some((header, body)) = record.split_first() else {
        return Err(DumpError::EmptyRecord(String::new()));
    };
    let mut goroutine = parse_header(header)?;

    let mut lines = body.iter().copied();
    while let Some(call_line) = lines.next() {
        if ELIDED_RE.is_match(call_line) {
            continue;
        }
        let (call, parent) = parse_call(call_line)?;
        let location_line = lines
            .next()
            .ok_or_else(|| DumpError::MissingLocation(call_line.to_string()))?;
        let (location, extra) = parse_location(location_line, env)?;
        if parent.is_some() {
            goroutine.parent = parent;
        }
        goroutine.call_stack.push(CallFrame::new(
            location,
            CallInfo { extra, ..call },
        ));
    }

    if goroutine.id == 0 || goroutine.call_stack.is_empty() {
        return Err(DumpError::EmptyRecord(record.join("\n")));
    }
    Ok(goroutine)
}

fn parse_header(line: &str) -> Result<Goroutine> {
    let caps = HEADER_RE
        .captures(line)
        .ok_or_else(|| DumpError::MalformedHeader(line.to_string()))?;
    let id = caps[1]
        .parse::<u64>()
        .map_err(|_| DumpError::invalid_number("goroutine ID", &caps[1], line))?;
    let duration = match caps.get(3) {
        Some(minutes) => {
            let minutes = minutes
                .as_str()
                .parse::<u64>()
                .map_err(|_| DumpError::invalid_number("block duration", minutes.as_str(), line))?;
            Duration::from_secs(minutes.saturating_mul(60))
        }
        None => Duration::ZERO,
    };
    Ok(Goroutine {
        id,
        op: caps[2].to_string(),
        duration,
        locked_to_thread: caps.get(4).is_some(),
        parent: None,
        call_stack: Vec::new(),
    })
}

fn parse_call(line: &str) -> Result<(CallInfo, Option<u64>)> {
    if let Some(created_by) = line.strip_prefix(CREATED_BY_PREFIX) {
        let (expr, parent) = match CREATED_IN_RE.captures(created_by) {
            Some(caps) => {
                let parent = caps[2]
                    .parse::<u64>()
                    .map_err(|_| DumpError::invalid_number("parent goroutine ID", &caps[2], line))?;
                (caps.get(1).map_or("", |m| m.as_str()), Some(parent))
            }
            None => (created_by, None),
        };
        let (package, method) = split_qualified_name(expr);
        let call = CallInfo {
            package,
            method,
            origin: true,
            ..CallInfo::default()
        };
        return Ok((call, parent));
    }

    let caps = CALL_RE
        .captures(line)
        .ok_or_else(|| DumpError::MalformedCall(line.to_string()))?;
    let (package, method) = split_qualified_name(&caps[1]);
    let call = CallInfo {
        package,
        method,
        args: caps[2].to_string(),
        ..CallInfo::default()
    };
    Ok((call, None))
}

fn parse_location(line: &str, env: &Environment) -> Result<(FileLocation, String)> {
    let caps = LOCATION_RE
        .captures(line)
        .ok_or_else(|| DumpError::MalformedLocation(line.to_string()))?;
    let (root, file) = env.classify(&caps[1])?;
    let line_number = caps[2]
        .parse::<usize>()
        .map_err(|_| DumpError::invalid_number("goroutine line", &caps[2], line))?;
    let extra = caps.get(3).map_or_else(String::new, |m| m.as_str().to_string());
    Ok((FileLocation::new(root, file, line_number), extra))
}

/// Split a qualified Go identifier into package and method.
///
/// The package runs up to the last `/`, extended to the first `.` after it:
/// `github.com/a/b.(*T).M` becomes (`github.com/a/b`, `(*T).M`).
pub fn split_qualified_name(expr: &str) -> (String, String) {
    let (dir, tail) = match expr.rfind('/') {
        Some(cut) => expr.split_at(cut),
        None => ("", expr),
    };
    match tail.find('.') {
        Some(cut) => (format!("{dir}{}", &tail[..cut]), tail[cut + 1..].to_string()),
        None => (dir.to_string(), tail.to_string()),
    }
}

/// Group lines into records separated by blank lines.
fn split_records(text: &str) -> Vec<Vec<&str>> {
    let mut records = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push(line);
    }
    if !current.is_empty() {
        records.push(current);
    }
    records
}
