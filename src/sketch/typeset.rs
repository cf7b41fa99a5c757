use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Engine that turns annotation LaTeX into display text.
pub trait Typesetter: Send + Sync {
    fn typeset(&self, latex: &str) -> String;
}

/// One-shot readiness handle for a typesetting engine that loads in the
/// background. Requests made before the engine is published are dropped.
#[derive(Clone, Default)]
pub struct TypesetHandle {
    engine: Arc<OnceCell<Box<dyn Typesetter>>>,
}

impl TypesetHandle {
    /// Handle that never becomes ready.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn ready(engine: impl Typesetter + 'static) -> Self {
        let handle = Self::default();
        handle.publish(Box::new(engine));
        handle
    }

    /// Build the engine on a background thread and publish it when done.
    pub fn load_async<F, T>(factory: F) -> Self
    where
        F: FnOnce() -> Option<T> + Send + 'static,
        T: Typesetter + 'static,
    {
        let handle = Self::default();
        let publisher = handle.clone();
        let spawned = std::thread::Builder::new()
            .name("typeset-loader".into())
            .spawn(move || match factory() {
                Some(engine) => {
                    publisher.publish(Box::new(engine));
                    tracing::info!("typesetting engine loaded");
                }
                None => tracing::warn!("typesetting engine failed to load; labels stay raw"),
            });
        if let Err(err) = spawned {
            tracing::warn!(?err, "could not spawn typesetting loader");
        }
        handle
    }

    fn publish(&self, engine: Box<dyn Typesetter>) {
        if self.engine.set(engine).is_err() {
            tracing::debug!("typesetting engine already published");
        }
    }

    pub fn is_ready(&self) -> bool {
        self.engine.get().is_some()
    }

    pub fn typeset(&self, latex: &str) -> Option<String> {
        self.engine.get().map(|engine| engine.typeset(latex))
    }
}

impl std::fmt::Debug for TypesetHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypesetHandle")
            .field("ready", &self.is_ready())
            .finish()
    }
}

/// Renders the small LaTeX subset produced by the recognizer as plain
/// unicode text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextTypesetter;

const SYMBOLS: [(&str, &str); 11] = [
    ("\\cdot", "·"),
    ("\\times", "×"),
    ("\\div", "÷"),
    ("\\pi", "π"),
    ("\\pm", "±"),
    ("\\leq", "≤"),
    ("\\geq", "≥"),
    ("\\neq", "≠"),
    ("\\infty", "∞"),
    ("\\left", ""),
    ("\\right", ""),
];

impl Typesetter for TextTypesetter {
    fn typeset(&self, latex: &str) -> String {
        let mut text = latex.trim().to_string();
        if let Some(inner) = text
            .strip_prefix("\\(")
            .and_then(|rest| rest.strip_suffix("\\)"))
        {
            text = inner.to_string();
        }
        text = unwrap_command(&text, "\\LARGE");
        text = rewrite_frac(&text);
        text = rewrite_sqrt(&text);
        for (command, symbol) in SYMBOLS {
            text = text.replace(command, symbol);
        }
        text = rewrite_powers(&text);
        text.retain(|c| c != '{' && c != '}');
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Byte index just past the group that opens at `open`, or `None` when the
/// braces are unbalanced.
fn group_end(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, c) in text[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split `\cmd{arg}rest` into `(arg, rest)` when `text` starts with a group.
fn take_group(text: &str) -> Option<(&str, &str)> {
    if !text.starts_with('{') {
        return None;
    }
    let end = group_end(text, 0)?;
    Some((&text[1..end - 1], &text[end..]))
}

fn unwrap_command(text: &str, command: &str) -> String {
    let Some(start) = text.find(command) else {
        return text.to_string();
    };
    let after = &text[start + command.len()..];
    match take_group(after.trim_start()) {
        Some((inner, rest)) => format!("{}{}{}", &text[..start], inner, rest),
        None => format!("{}{}", &text[..start], after),
    }
}

fn rewrite_frac(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("\\frac") {
        out.push_str(&rest[..start]);
        let after = &rest[start + "\\frac".len()..];
        let parsed = take_group(after).and_then(|(num, tail)| {
            take_group(tail).map(|(den, tail)| (num, den, tail))
        });
        match parsed {
            Some((num, den, tail)) => {
                out.push_str(&format!("({})/({})", rewrite_frac(num), rewrite_frac(den)));
                rest = tail;
            }
            None => {
                out.push_str("\\frac");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn rewrite_sqrt(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("\\sqrt") {
        out.push_str(&rest[..start]);
        let after = &rest[start + "\\sqrt".len()..];
        match take_group(after) {
            Some((inner, tail)) => {
                out.push_str(&format!("√({})", rewrite_sqrt(inner)));
                rest = tail;
            }
            None => {
                out.push('√');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn superscript(digit: char) -> Option<char> {
    Some(match digit {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        _ => return None,
    })
}

/// Superscript a whole exponent, `^23` or `^{23}`. Exponents that are not
/// all digits are left as written.
fn rewrite_powers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('^') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let (exponent, tail) = match take_group(after) {
            Some((inner, tail)) => (inner, tail),
            None => {
                let end = after
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(after.len());
                (&after[..end], &after[end..])
            }
        };
        let raised: Option<String> = if exponent.is_empty() {
            None
        } else {
            exponent.chars().map(superscript).collect()
        };
        match raised {
            Some(raised) => {
                out.push_str(&raised);
                rest = tail;
            }
            None => {
                out.push('^');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
