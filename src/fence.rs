//! Removal of markdown code fences wrapped around a model answer.
//!
//! Only a delimiter line at the very start and one at the very end of the
//! text are removed. Fences inside the text are left alone.

use regex::Regex;
use std::sync::OnceLock;

static OPENING_FENCE: OnceLock<Regex> = OnceLock::new();
static CLOSING_FENCE: OnceLock<Regex> = OnceLock::new();

fn opening_fence() -> &'static Regex {
    // Tags such as `c++`, `c#` or `objective-c` appear in practice.
    OPENING_FENCE.get_or_init(|| Regex::new(r"\A```[\w+#-]*[ \t]*\r?\n").expect("valid regex"))
}

fn closing_fence() -> &'static Regex {
    CLOSING_FENCE.get_or_init(|| Regex::new(r"\r?\n```\z").expect("valid regex"))
}

/// Strip one leading and one trailing fence delimiter line, then trim.
///
/// ```
/// use codeverter::fence::strip_code_fences;
///
/// assert_eq!(strip_code_fences("```python\nprint(1)\n```"), "print(1)");
/// assert_eq!(strip_code_fences("  print(1)  "), "print(1)");
/// ```
pub fn strip_code_fences(raw: &str) -> String {
    let text = raw.trim();
    let text = match opening_fence().find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    };
    let text = match closing_fence().find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    };
    text.trim().to_string()
}
