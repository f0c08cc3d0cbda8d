//! Per-run CSV history of every deduplicated channel

use chrono::{DateTime, TimeZone};
use std::collections::HashSet;

use crate::models::Channel;
use crate::utils::format_response_time;

pub const HISTORY_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
pub const TIMESTAMP_PLACEHOLDER: &str = "{timestamp}";

const HISTORY_COLUMNS: [&str; 5] = ["频道名称", "分类", "状态", "响应时间", "URL"];
const CSV_LINE_END: &str = "\r\n";

/// File name for a run started at `started_at`
pub fn history_filename<Tz>(format: &str, started_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let timestamp = started_at.format(HISTORY_TIMESTAMP_FORMAT).to_string();
    format.replace(TIMESTAMP_PLACEHOLDER, &timestamp)
}

/// Header row plus one row per unique URL, whatever its status
pub fn render_history(channels: &[Channel]) -> String {
    let mut out = String::new();
    push_row(&mut out, HISTORY_COLUMNS);

    let mut seen = HashSet::new();
    for channel in channels {
        if !seen.insert(channel.url.as_str()) {
            continue;
        }
        let response_time = format_response_time(channel.response_time);
        push_row(
            &mut out,
            [
                channel.name.as_str(),
                channel.category.as_str(),
                channel.status.as_str(),
                response_time.as_str(),
                channel.url.as_str(),
            ],
        );
    }
    out
}

fn push_row<const N: usize>(out: &mut String, fields: [&str; N]) {
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
    out.push_str(CSV_LINE_END);
}

/// Quote fields containing separators, quotes or line breaks; double inner quotes
fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}
