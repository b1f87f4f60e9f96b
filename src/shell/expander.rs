// src/shell/expander.rs

const PID_MARKER: &str = "$$";

/// Splits a raw line into whitespace-delimited tokens with `$$` expanded to
/// `pid`. Empty lines and comment lines (first character `#`) yield nothing.
pub fn tokenize(line: &str, pid: u32) -> Vec<String> {
    if line.is_empty() || line.starts_with('#') {
        return Vec::new();
    }

    let pid = pid.to_string();
    line.split_whitespace()
        .map(|token| expand_pid(token, &pid))
        .collect()
}

/// Replaces every `$$` in `token`, scanning left to right and never
/// overlapping, so `$$$$` becomes two copies of `pid` and `$$$` keeps its
/// trailing `$`.
pub fn expand_pid(token: &str, pid: &str) -> String {
    let mut expanded = String::with_capacity(token.len());
    let mut rest = token;

    while let Some(pos) = rest.find(PID_MARKER) {
        expanded.push_str(&rest[..pos]);
        expanded.push_str(pid);
        rest = &rest[pos + PID_MARKER.len()..];
    }
    expanded.push_str(rest);
    expanded
}
