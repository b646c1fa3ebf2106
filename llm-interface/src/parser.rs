//! Best-effort extraction of reasoning and categories from a model reply.
//!
//! The system prompt asks for
//!
//! ```text
//! =-=-=-=
//!
//! REASONING : {reasoning text}
//! CATEGORIES: [list of category strings]
//! ```
//!
//! but nothing enforces it, so every step below falls through to an empty
//! value instead of failing. Models emit line breaks either as real newlines
//! or as the two characters `\n`; both are accepted everywhere.

use insight_core::CategoryResult;
use regex::Regex;
use std::iter::Peekable;
use std::str::Chars;
use std::sync::LazyLock;

static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"=-=-=-=\s*(?:\\n|\n)").unwrap());

static REASONING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bREASONING\s*:").unwrap());

static SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)REASONING\s*:(?:\s|\\n)*(.*?)(?:\s|\\n)*CATEGORIES\s*:").unwrap()
});

static CATEGORIES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)CATEGORIES\s*:(?:\s|\\n)*(\[[^\]]*\])").unwrap());

/// Parse a raw model reply. Never fails; missing pieces come back empty.
pub fn parse_llm_output(text: &str) -> CategoryResult {
    let (raw_reasoning, structured) = split_reasoning(text);

    let summary_reasoning = SUMMARY
        .captures(structured)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    let categories = CATEGORIES
        .captures(structured)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_string_list(m.as_str()))
        .unwrap_or_default();

    CategoryResult {
        raw_reasoning: raw_reasoning.to_string(),
        summary_reasoning,
        categories,
    }
}

/// Split into free-form reasoning and the structured block. The separator
/// wins; without it the first `REASONING:` marker starts the block.
fn split_reasoning(text: &str) -> (&str, &str) {
    if let Some(m) = SEPARATOR.find(text) {
        return (text[..m.start()].trim(), text[m.end()..].trim());
    }
    if let Some(m) = REASONING_MARKER.find(text) {
        return (text[..m.start()].trim(), &text[m.start()..]);
    }
    (text.trim(), "")
}

/// Parse a Python-style list literal of strings such as `['a', "b"]`.
/// Returns `None` for anything that is not a flat list of quoted strings.
pub fn parse_string_list(literal: &str) -> Option<Vec<String>> {
    let inner = literal.trim().strip_prefix('[')?.strip_suffix(']')?;
    let mut chars = inner.chars().peekable();
    let mut items = Vec::new();

    loop {
        skip_blank(&mut chars);
        let quote = match chars.next() {
            None => break,
            Some(c @ ('\'' | '"')) => c,
            Some(_) => return None,
        };
        let mut item = read_quoted(&mut chars, quote)?;

        // Adjacent literals concatenate: ['a' "b"] is ['ab'].
        skip_blank(&mut chars);
        while let Some(quote) = chars.next_if(|c| matches!(c, '\'' | '"')) {
            item.push_str(&read_quoted(&mut chars, quote)?);
            skip_blank(&mut chars);
        }
        items.push(item);

        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(_) => return None,
        }
    }

    Some(items)
}

/// Whitespace, including escaped `\n` sequences between items.
fn skip_blank(chars: &mut Peekable<Chars<'_>>) {
    loop {
        match chars.peek() {
            Some(c) if c.is_whitespace() => {
                chars.next();
            }
            Some('\\') => {
                let mut ahead = chars.clone();
                ahead.next();
                if matches!(ahead.next(), Some('n' | 'r' | 't')) {
                    chars.next();
                    chars.next();
                } else {
                    return;
                }
            }
            _ => return,
        }
    }
}

fn read_quoted(chars: &mut Peekable<Chars<'_>>, quote: char) -> Option<String> {
    let mut value = String::new();
    loop {
        match chars.next()? {
            c if c == quote => return Some(value),
            '\\' => match chars.next()? {
                'n' => value.push('\n'),
                't' => value.push('\t'),
                'r' => value.push('\r'),
                'a' => value.push('\u{07}'),
                'b' => value.push('\u{08}'),
                'f' => value.push('\u{0c}'),
                'v' => value.push('\u{0b}'),
                '\n' => {}
                first @ '0'..='7' => value.push(read_octal(chars, first)?),
                '\\' => value.push('\\'),
                '\'' => value.push('\''),
                '"' => value.push('"'),
                'x' => value.push(read_hex(chars, 2)?),
                'u' => value.push(read_hex(chars, 4)?),
                'U' => value.push(read_hex(chars, 8)?),
                // Unknown escapes are kept verbatim.
                other => {
                    value.push('\\');
                    value.push(other);
                }
            },
            c => value.push(c),
        }
    }
}

/// Up to three octal digits, the first already consumed.
fn read_octal(chars: &mut Peekable<Chars<'_>>, first: char) -> Option<char> {
    let mut code = first.to_digit(8)?;
    for _ in 0..2 {
        match chars.peek().and_then(|c| c.to_digit(8)) {
            Some(digit) => {
                code = code * 8 + digit;
                chars.next();
            }
            None => break,
        }
    }
    char::from_u32(code)
}

fn read_hex(chars: &mut Peekable<Chars<'_>>, digits: usize) -> Option<char> {
    let mut code = 0u32;
    for _ in 0..digits {
        code = code * 16 + chars.next()?.to_digit(16)?;
    }
    char::from_u32(code)
}
