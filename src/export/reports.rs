//! Auxiliary text reports

pub const UNCLASSIFIED_HEADER: &str = "未分类的频道列表:";

/// Header line followed by one name per line
pub fn render_unclassified(names: &[String]) -> String {
    let mut out = String::with_capacity(UNCLASSIFIED_HEADER.len() + 1 + names.len() * 16);
    out.push_str(UNCLASSIFIED_HEADER);
    out.push('\n');
    for name in names {
        out.push_str(name);
        out.push('\n');
    }
    out
}

/// One URL per line, in the order given
pub fn render_failed_urls(urls: &[String]) -> String {
    let mut out = urls.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}
