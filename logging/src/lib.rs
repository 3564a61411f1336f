extern crate chrono;
extern crate env_logger;
#[macro_use]
extern crate log;
extern crate serde;
#[macro_use]
extern crate serde_derive;
#[cfg_attr(test, macro_use)]
extern crate serde_json;

use chrono::{DateTime, Utc};
use env_logger::{Builder, Env};
use std::io::Write;

const TIMESTAMP_FORMAT: &'static str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// A single line of structured log output. Everything the api writes to
/// stdout is one of these, serialized as JSON so the log shipper can ingest
/// it without a parse step.
#[derive(Serialize, Debug)]
struct LogLine {
    level: String,
    #[serde(serialize_with = "timestamp_serializer")]
    time: DateTime<Utc>,
    target: String,
    message: String,
    #[serde(flatten)]
    fields: Option<serde_json::Value>,
}

fn timestamp_serializer<S>(x: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_str(format!("{}", x.format(TIMESTAMP_FORMAT)).as_str())
}

/// Structured logging macro used throughout the workspace.
///
/// `jlog!(Info, "Registration confirmed")` produces
/// `{"level": "INFO", "target": "none", "message": "Registration confirmed"}`.
/// Extra fields can be attached as a JSON literal:
/// `jlog!(Debug, "stride::payments", "Order created", {"order_id": id})`.
#[macro_export]
macro_rules! jlog {
    ($level:path, $msg:expr) => {{
        use $crate::write_structured;
        write_structured($level, None, $msg, None)
    }};
    ($level:path, $msg:expr, $fields:tt) => {{
        use $crate::write_structured;
        let fields = json!($fields);
        write_structured($level, None, $msg, Some(fields))
    }};
    ($level:path, $target:expr, $msg:expr, $fields:tt) => {{
        use $crate::write_structured;
        let fields = json!($fields);
        write_structured($level, Some($target), $msg, Some(fields))
    }};
}

pub fn write_structured(
    level: log::Level,
    target: Option<&str>,
    msg: &str,
    fields: Option<serde_json::Value>,
) {
    let line = LogLine {
        level: format!("{}", level),
        time: chrono::Utc::now(),
        target: target.unwrap_or("none").to_string(),
        message: msg.trim().to_string(),
        fields,
    };
    match target {
        Some(t) => log!(target: t, level, "{}", serde_json::to_string(&line).unwrap()),
        None => log!(level, "{}", serde_json::to_string(&line).unwrap()),
    }
}

fn already_json(msg: &str) -> bool {
    msg.starts_with("{") && msg.ends_with("}")
}

/// Installs the process-wide logger. Messages that are not already JSON
/// (for example those from third party crates logging plain text) are
/// wrapped in a `LogLine` so output stays one JSON object per line.
pub fn setup_logger() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let msg = format!("{}", record.args());
            if already_json(&msg) {
                writeln!(buf, "{}", msg)
            } else {
                let line = LogLine {
                    level: record.level().to_string(),
                    time: chrono::Utc::now(),
                    target: record.target().to_string(),
                    message: msg.trim().to_string(),
                    fields: None,
                };
                match serde_json::to_string(&line) {
                    Ok(s) => writeln!(buf, "{}", s),
                    Err(err) => writeln!(
                        buf,
                        "Could not serialize log line: Error: {:?}, Line: {:?}",
                        err, line
                    ),
                }
            }
        })
        .init();
}

#[cfg(test)]
mod tests {
    use log::Level::*;

    #[test]
    fn jlog_accepts_all_forms() {
        jlog!(Warn, "message");
        jlog!(Warn, "message", {"registration_id": 1});
        jlog!(Error, "message", {"a": 1, "b": "two", "c": [3, 2, 1]});
        jlog!(Debug, "stride::workflow", "No pending effects", {});
    }
}
