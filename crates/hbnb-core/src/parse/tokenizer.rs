//! Argument splitting for console lines
//!
//! Tokens are separated by whitespace. A double-quoted span, a single-quoted
//! span opened at the start of a token, or a balanced `{...}` span never
//! splits. Tokens keep their raw text (quotes included); callers decide
//! whether to unquote.

/// Split an argument string into raw tokens
pub fn split_args(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth: usize = 0;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            current.push(c);
            if c == '\\' {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' => {
                quote = Some('"');
                current.push(c);
            }
            '\'' if current.is_empty() || depth > 0 => {
                quote = Some('\'');
                current.push(c);
            }
            '{' => {
                depth += 1;
                current.push(c);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Split a dotted-call argument list on top-level commas
///
/// `"id", {"a": 1, "b": 2}` yields two tokens. Empty segments are dropped.
pub fn split_call_args(input: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth: usize = 0;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            current.push(c);
            if c == '\\' {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => {
                quote = Some(c);
                current.push(c);
            }
            '{' => {
                depth += 1;
                current.push(c);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => segments.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    segments.push(current);

    segments
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Strip matching surrounding quotes and resolve backslash escapes
///
/// Returns `None` if the token is not quoted.
pub fn unquote(token: &str) -> Option<String> {
    let mut chars = token.chars();
    let first = chars.next()?;
    let last = chars.next_back()?;
    if !(first == '"' || first == '\'') || first != last {
        return None;
    }
    let inner = &token[1..token.len() - 1];
    Some(unescape(inner))
}

/// Resolve `\"`, `\'` and `\\`; other backslashes are kept
pub fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some(&next) if next == '"' || next == '\'' || next == '\\' => {
                    out.push(next);
                    chars.next();
                }
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Unquote if quoted, otherwise return the raw token
pub fn plain(token: &str) -> String {
    unquote(token).unwrap_or_else(|| token.to_string())
}
