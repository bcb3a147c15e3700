//! Splitting `;`-delimited SQL scripts into single statements.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    Quoted(char),
    LineComment,
    BlockComment,
}

/// Split a script on top-level `;`.
///
/// Semicolons inside `'...'`, `"..."` and `` `...` `` are kept. Comments (`--`, `#`,
/// `/* */`) outside quotes are dropped. Empty statements are skipped and each
/// statement is trimmed.
///
/// # Example
/// ```
/// use dbal_check::split_script;
///
/// let parts = split_script("INSERT INTO t VALUES ('a;b'); -- seed\nSELECT 1;");
/// assert_eq!(parts, vec!["INSERT INTO t VALUES ('a;b')", "SELECT 1"]);
/// ```
pub fn split_script(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut state = State::Code;
    let mut chars = script.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                ';' => flush(&mut current, &mut statements),
                '\'' | '"' | '`' => {
                    current.push(c);
                    state = State::Quoted(c);
                }
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    state = State::LineComment;
                }
                '#' => state = State::LineComment,
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                }
                _ => current.push(c),
            },
            State::Quoted(quote) => {
                current.push(c);
                if c == '\\' && quote != '`' {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                } else if c == quote {
                    // A doubled quote stays inside the literal.
                    if chars.peek() == Some(&quote) {
                        current.push(quote);
                        chars.next();
                    } else {
                        state = State::Code;
                    }
                }
            }
            State::LineComment => {
                if c == '\n' {
                    current.push('\n');
                    state = State::Code;
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    current.push(' ');
                    state = State::Code;
                }
            }
        }
    }
    flush(&mut current, &mut statements);
    statements
}

fn flush(current: &mut String, statements: &mut Vec<String>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
    current.clear();
}
