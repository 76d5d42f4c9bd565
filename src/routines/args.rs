//! Routine argument lists

use crate::maths::{parse_number, Base};
use crate::script::ScriptErrorKind;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl Value {
    fn parse(text: &str) -> Option<Self> {
        if let Some(inner) = text.strip_prefix('"') {
            let inner = inner.strip_suffix('"')?;
            let mut unescaped = String::with_capacity(inner.len());
            let mut chars = inner.chars();

            while let Some(c) = chars.next() {
                if c == '\\' {
                    unescaped.push(chars.next()?);
                } else {
                    unescaped.push(c);
                }
            }

            return Some(Value::Str(unescaped));
        }

        match text.to_ascii_lowercase().as_ref() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => parse_number(text).map(Value::Int),
        }
    }
}

/// Split on commas outside double quotes.
fn split(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quoted = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ',' if !quoted => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    parts.push(&text[start..]);
    parts
}

/// Arguments to one routine call, positional or `key=value`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Args {
    routine: String,
    positional: Vec<Value>,
    named: Vec<(String, Value)>,
}

impl Args {
    pub fn parse(routine: &str, text: &str) -> Result<Self, ScriptErrorKind> {
        let mut args = Args {
            routine: routine.to_string(),
            positional: Vec::new(),
            named: Vec::new(),
        };

        if text.trim().is_empty() {
            return Ok(args);
        }

        for part in split(text) {
            let part = part.trim();
            let key_end = part
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .filter(|i| *i > 0 && part[*i..].trim_start().starts_with('='));

            match key_end {
                Some(i) => {
                    let key = part[..i].to_ascii_lowercase();
                    let raw = part[i..].trim_start()[1..].trim();
                    let value = Value::parse(raw)
                        .ok_or_else(|| args.error(&format!("bad value for {}", key)))?;
                    args.named.push((key, value));
                }
                None => {
                    let value = Value::parse(part)
                        .ok_or_else(|| args.error(&format!("bad argument {:?}", part)))?;
                    args.positional.push(value);
                }
            }
        }

        Ok(args)
    }

    pub fn error(&self, reason: &str) -> ScriptErrorKind {
        ScriptErrorKind::bad_argument(&self.routine, reason)
    }

    /// The argument named `name`, or else the positional argument at `index`.
    pub fn get(&self, name: &str, index: usize) -> Option<&Value> {
        self.named
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
            .or_else(|| self.positional.get(index))
    }

    pub fn string(&self, name: &str, index: usize, default: &str) -> Result<String, ScriptErrorKind> {
        match self.get(name, index) {
            None => Ok(default.to_string()),
            Some(Value::Str(s)) => Ok(s.clone()),
            Some(_) => Err(self.error(&format!("{} must be a string", name))),
        }
    }

    pub fn optional_string(&self, name: &str, index: usize) -> Result<Option<String>, ScriptErrorKind> {
        match self.get(name, index) {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.error(&format!("{} must be a string", name))),
        }
    }

    pub fn int(&self, name: &str, index: usize, default: i64) -> Result<i64, ScriptErrorKind> {
        match self.get(name, index) {
            None => Ok(default),
            Some(Value::Int(i)) => Ok(*i),
            Some(_) => Err(self.error(&format!("{} must be an integer", name))),
        }
    }

    /// An integer that must lie in `0..=max`.
    pub fn count(&self, name: &str, index: usize, default: i64, max: i64) -> Result<usize, ScriptErrorKind> {
        let value = self.int(name, index, default)?;
        if value < 0 || value > max {
            return Err(self.error(&format!("{} must be between 0 and {}", name, max)));
        }

        Ok(value as usize)
    }

    pub fn boolean(&self, name: &str, index: usize, default: bool) -> Result<bool, ScriptErrorKind> {
        match self.get(name, index) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::Int(i)) => Ok(*i != 0),
            Some(_) => Err(self.error(&format!("{} must be true or false", name))),
        }
    }

    /// A numeric base, given as `"hex"`, `"dec"`, `"oct"`, `"bin"` or 0-3.
    pub fn base(&self, name: &str, index: usize, default: Base) -> Result<Base, ScriptErrorKind> {
        match self.get(name, index) {
            None => Ok(default),
            Some(Value::Int(i)) if (0..=3).contains(i) => Ok(Base::from_bits(*i as u32)),
            Some(Value::Str(s)) => s
                .parse()
                .map_err(|_| self.error(&format!("unknown base {:?}", s))),
            Some(_) => Err(self.error(&format!("{} must be a base", name))),
        }
    }
}
