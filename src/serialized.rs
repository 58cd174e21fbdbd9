//! # Serialized Fields
//!
//! Class definition files carry per-language text in elements named
//! `serialized-*`. Older exports store them in the CMS's native
//! serialization format, newer ones as JSON:
//!
//! ```text
//! a:2:{s:6:"eng-GB";s:7:"Article";s:16:"always-available";s:6:"eng-GB";}
//! {"eng-GB":"Article","always-available":"eng-GB"}
//! ```
//!
//! Both are accepted on read. The write path always emits JSON.
//!
//! Escaping of `<`, `>` and `&` is left to the XML serializer, which never
//! touches quotes, so the text stored in a node is the plain JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::clock::LocaleProvider;

/// Key that records which locale acts as the always-available fallback.
pub const ALWAYS_AVAILABLE_KEY: &str = "always-available";

/// Decode text in the legacy native serialization format.
///
/// Returns `None` when the text is not a complete, supported legacy value.
/// A decoded `false` is indistinguishable from a failed decode in the
/// format's own tooling and is reported as `None` as well.
pub fn decode_legacy(text: &str) -> Option<Value> {
    let mut parser = LegacyParser::new(text.trim().as_bytes());
    let value = parser.value()?;
    if !parser.at_end() {
        return None;
    }
    match value {
        Value::Bool(false) => None,
        other => Some(other),
    }
}

/// Decode a serialized field: JSON first, then the legacy format.
pub fn decode_value(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Some(value);
    }
    decode_legacy(text)
}

/// Re-encode a serialized field as JSON.
///
/// Legacy text becomes JSON. Anything the legacy decoder rejects (JSON
/// included) is returned unchanged, so applying this twice is the same as
/// applying it once.
pub fn reencode(text: &str) -> String {
    match decode_legacy(text) {
        Some(value) => value.to_string(),
        None => text.to_string(),
    }
}

/// Fill every installed locale missing from a serialized per-locale map.
///
/// Missing or empty entries receive the value of the current locale (or an
/// empty string) and the always-available marker is set to the current
/// locale. Returns `None` when the text does not decode to a map.
pub fn backfill_locales(text: &str, locales: &dyn LocaleProvider) -> Option<String> {
    let mut map = match decode_value(text)? {
        Value::Object(map) => map,
        _ => return None,
    };
    let current = locales.current_locale();
    let fallback = map
        .get(current)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    for locale in locales.locales() {
        if is_empty_entry(map.get(locale.as_str())) {
            map.insert(locale.clone(), Value::String(fallback.clone()));
        }
    }
    map.insert(
        ALWAYS_AVAILABLE_KEY.to_string(),
        Value::String(current.to_string()),
    );
    Some(Value::Object(map).to_string())
}

fn is_empty_entry(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// A per-language label map, such as a class name or attribute description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameList {
    pub names: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_available: Option<String>,
}

impl NameList {
    /// Read a name list from a serialized field. Undecodable or non-map
    /// content yields an empty list.
    pub fn from_serialized(text: &str) -> Self {
        let mut list = NameList::default();
        let map = match decode_value(text) {
            Some(Value::Object(map)) => map,
            _ => return list,
        };
        for (key, value) in map {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                _ => continue,
            };
            if key == ALWAYS_AVAILABLE_KEY {
                list.always_available = Some(value);
            } else {
                list.names.insert(key, value);
            }
        }
        list
    }

    /// A single-language list, used for the pre-3.8 plain `name` element.
    pub fn from_name(name: impl Into<String>, locale: &str) -> Self {
        let mut names = BTreeMap::new();
        names.insert(locale.to_string(), name.into());
        Self {
            names,
            always_available: Some(locale.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.values().all(|n| n.is_empty())
    }

    pub fn get(&self, locale: &str) -> Option<&str> {
        self.names.get(locale).map(String::as_str)
    }

    /// The name shown when no locale is requested: the always-available
    /// entry, else the first non-empty one.
    pub fn name(&self) -> Option<&str> {
        self.always_available
            .as_deref()
            .and_then(|locale| self.get(locale))
            .filter(|n| !n.is_empty())
            .or_else(|| {
                self.names
                    .values()
                    .map(String::as_str)
                    .find(|n| !n.is_empty())
            })
    }

    /// Append `suffix` to the name in every language.
    pub fn append_suffix(&mut self, suffix: &str) {
        for name in self.names.values_mut() {
            name.push_str(suffix);
        }
    }

    /// Encode as the JSON form used in class definition files.
    pub fn to_json(&self) -> String {
        let mut map = Map::new();
        for (locale, name) in &self.names {
            map.insert(locale.clone(), Value::String(name.clone()));
        }
        if let Some(locale) = &self.always_available {
            map.insert(
                ALWAYS_AVAILABLE_KEY.to_string(),
                Value::String(locale.clone()),
            );
        }
        Value::Object(map).to_string()
    }
}

/// Deepest array nesting the legacy decoder accepts.
const MAX_LEGACY_DEPTH: usize = 512;

struct LegacyParser<'a> {
    input: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> LegacyParser<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos == self.input.len()
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8) -> Option<()> {
        if self.peek()? == byte {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }

    /// Read up to (not including) `terminator` and consume the terminator.
    fn until(&mut self, terminator: u8) -> Option<&'a str> {
        let input = self.input;
        let start = self.pos;
        let offset = input[start..].iter().position(|&b| b == terminator)?;
        self.pos = start + offset + 1;
        std::str::from_utf8(&input[start..start + offset]).ok()
    }

    fn integer(&mut self, terminator: u8) -> Option<i64> {
        self.until(terminator)?.parse().ok()
    }

    fn length(&mut self) -> Option<usize> {
        self.until(b':')?.parse().ok()
    }

    fn quoted(&mut self, len: usize) -> Option<String> {
        self.expect(b'"')?;
        let end = self.pos.checked_add(len)?;
        let bytes = self.input.get(self.pos..end)?;
        let text = String::from_utf8(bytes.to_vec()).ok()?;
        self.pos = end;
        self.expect(b'"')?;
        Some(text)
    }

    fn value(&mut self) -> Option<Value> {
        let tag = self.peek()?;
        self.pos += 1;
        if tag == b'N' {
            self.expect(b';')?;
            return Some(Value::Null);
        }
        self.expect(b':')?;
        match tag {
            b'b' => match self.until(b';')? {
                "0" => Some(Value::Bool(false)),
                "1" => Some(Value::Bool(true)),
                _ => None,
            },
            b'i' => self.integer(b';').map(Value::from),
            b'd' => {
                let number: f64 = self.until(b';')?.parse().ok()?;
                Number::from_f64(number).map(Value::Number)
            }
            b's' => {
                let len = self.length()?;
                let text = self.quoted(len)?;
                self.expect(b';')?;
                Some(Value::String(text))
            }
            b'a' => {
                let len = self.length()?;
                self.entries(len)
            }
            b'O' => {
                let name_len = self.length()?;
                self.quoted(name_len)?;
                self.expect(b':')?;
                let len = self.length()?;
                match self.entries(len)? {
                    Value::Array(items) => Some(Value::Object(
                        items
                            .into_iter()
                            .enumerate()
                            .map(|(i, v)| (i.to_string(), v))
                            .collect(),
                    )),
                    other => Some(other),
                }
            }
            _ => None,
        }
    }

    fn key(&mut self) -> Option<String> {
        let tag = self.peek()?;
        self.pos += 1;
        self.expect(b':')?;
        match tag {
            b'i' => self.integer(b';').map(|i| i.to_string()),
            b's' => {
                let len = self.length()?;
                let key = self.quoted(len)?;
                self.expect(b';')?;
                Some(key)
            }
            _ => None,
        }
    }

    /// Parse `{key;value;...}`. Sequential integer keys become a JSON list.
    fn entries(&mut self, len: usize) -> Option<Value> {
        self.expect(b'{')?;
        if self.depth == MAX_LEGACY_DEPTH {
            return None;
        }
        self.depth += 1;
        let mut pairs = Vec::with_capacity(len.min(64));
        for _ in 0..len {
            let key = self.key()?;
            let value = self.value()?;
            pairs.push((key, value));
        }
        self.depth -= 1;
        self.expect(b'}')?;

        let sequential = pairs
            .iter()
            .enumerate()
            .all(|(i, (key, _))| *key == i.to_string());
        if sequential {
            Some(Value::Array(pairs.into_iter().map(|(_, v)| v).collect()))
        } else {
            Some(Value::Object(pairs.into_iter().collect()))
        }
    }
}
