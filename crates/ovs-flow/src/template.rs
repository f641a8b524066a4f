//! printf-style flow templates.
//!
//! Callers build flows from a template plus positional arguments, e.g.
//! `render("table=%d, priority=%d, actions=output:%s", &[21.into(), 100.into(), "2".into()])`.
//! Rendering is kept separate from parsing: the parser only ever sees the
//! expanded string.

use std::fmt;

use crate::error::{FlowError, FlowResult};

/// Largest field width accepted in a verb such as `%08x`.
const MAX_WIDTH: usize = 64;

/// A positional template argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowArg {
    /// A string, substituted verbatim by `%s` / `%v`.
    Str(String),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    Uint(u64),
}

impl fmt::Display for FlowArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{}", s),
            Self::Int(v) => write!(f, "{}", v),
            Self::Uint(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for FlowArg {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for FlowArg {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&String> for FlowArg {
    fn from(s: &String) -> Self {
        Self::Str(s.clone())
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $target:ty, $($t:ty),*) => {
        $(
            impl From<$t> for FlowArg {
                fn from(v: $t) -> Self {
                    Self::$variant(<$target>::from(v))
                }
            }
        )*
    };
}

impl_from_int!(Int, i64, i8, i16, i32, i64);
impl_from_int!(Uint, u64, u8, u16, u32, u64);

impl From<usize> for FlowArg {
    fn from(v: usize) -> Self {
        Self::Uint(v as u64)
    }
}

impl FlowArg {
    fn decimal(&self) -> Option<String> {
        match self {
            Self::Str(_) => None,
            Self::Int(v) => Some(v.to_string()),
            Self::Uint(v) => Some(v.to_string()),
        }
    }

    fn hex(&self, upper: bool) -> Option<String> {
        let (negative, magnitude) = match self {
            Self::Str(_) => return None,
            Self::Int(v) => (*v < 0, v.unsigned_abs()),
            Self::Uint(v) => (false, *v),
        };
        let digits = if upper {
            format!("{:X}", magnitude)
        } else {
            format!("{:x}", magnitude)
        };
        Some(if negative {
            format!("-{}", digits)
        } else {
            digits
        })
    }
}

fn pad(s: String, width: usize, zero: bool) -> String {
    let len = s.chars().count();
    if len >= width {
        return s;
    }
    let fill = width - len;
    if !zero {
        return format!("{}{}", " ".repeat(fill), s);
    }
    match s.strip_prefix('-') {
        Some(rest) => format!("-{}{}", "0".repeat(fill), rest),
        None => format!("{}{}", "0".repeat(fill), s),
    }
}

/// Expands `template` with `args`.
///
/// Supported verbs are `%s`, `%v`, `%d`, `%x`, `%X` and `%%`, each with an
/// optional `0` flag and width (`%02x`). With no arguments the template is
/// returned unchanged, so literal flow strings never need escaping.
pub fn render(template: &str, args: &[FlowArg]) -> FlowResult<String> {
    if args.is_empty() {
        return Ok(template.to_string());
    }

    let mut out = String::with_capacity(template.len());
    let mut next = args.iter();
    let mut used = 0usize;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let zero = chars.next_if_eq(&'0').is_some();
        let mut width = 0usize;
        while let Some(d) = chars.peek().and_then(|d| d.to_digit(10)) {
            width = width
                .checked_mul(10)
                .and_then(|w| w.checked_add(d as usize))
                .filter(|w| *w <= MAX_WIDTH)
                .ok_or_else(|| FlowError::template(template, "width too large"))?;
            chars.next();
        }

        let verb = chars
            .next()
            .ok_or_else(|| FlowError::template(template, "incomplete verb at end of template"))?;
        if verb == '%' {
            out.push('%');
            continue;
        }

        let arg = next.next().ok_or_else(|| {
            FlowError::template(template, format!("missing argument for %{}", verb))
        })?;
        used += 1;

        let text = match verb {
            's' | 'v' => Some(arg.to_string()),
            'd' => arg.decimal(),
            'x' => arg.hex(false),
            'X' => arg.hex(true),
            other => {
                return Err(FlowError::template(
                    template,
                    format!("unknown verb %{}", other),
                ))
            }
        }
        .ok_or_else(|| {
            FlowError::template(
                template,
                format!("argument {} ({:?}) is not a number for %{}", used, arg, verb),
            )
        })?;

        out.push_str(&pad(text, width, zero));
    }

    if used < args.len() {
        return Err(FlowError::template(
            template,
            format!("{} unused argument(s)", args.len() - used),
        ));
    }
    Ok(out)
}
