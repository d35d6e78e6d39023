use std::collections::BTreeMap;

/// One row of a source extract, column name to cell.
pub type RawRecord = BTreeMap<String, Value>;

/// A single cell as handed over by the tabular reader.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Absent,
    Number(f64),
    Text(String),
}

impl Value {
    /// Interpret a field of a text-based extract. Empty fields are absent, everything else is kept verbatim.
    pub fn from_field(field: &str) -> Self {
        if field.is_empty() {
            Value::Absent
        } else {
            Value::Text(field.to_owned())
        }
    }

    pub fn is_present(&self) -> bool {
        match self {
            Value::Absent => false,
            Value::Number(n) => !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a purchase quantity from the leading integer of the value, ignoring anything after it.
    pub fn to_quantity(&self) -> Option<i64> {
        match self {
            Value::Absent => None,
            Value::Number(n) => {
                let n = n.trunc();
                (n.is_finite() && n >= i64::MIN as f64 && n <= i64::MAX as f64).then_some(n as i64)
            }
            Value::Text(s) => integer_prefix(s),
        }
    }

    /// Parse a unit price from the leading decimal number of the value, ignoring anything after it.
    pub fn to_price(&self) -> Option<f64> {
        match self {
            Value::Absent => None,
            Value::Number(n) => n.is_finite().then_some(*n),
            Value::Text(s) => float_prefix(s),
        }
    }

    /// The stock on hand, with anything unparseable counting as nothing.
    pub fn to_stock(&self) -> i64 {
        self.to_quantity().unwrap_or(0)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Absent => Ok(()),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::from_field(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        if value.is_empty() {
            Value::Absent
        } else {
            Value::Text(value)
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

/// Returns the length of an optional sign followed by the ascii digits at the start of `s`, and the amount of digits.
fn signed_digits(s: &[u8]) -> (usize, usize) {
    let sign = usize::from(matches!(s.first(), Some(b'+' | b'-')));
    let digits = s[sign..].iter().take_while(|b| b.is_ascii_digit()).count();
    (sign + digits, digits)
}

fn integer_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (end, digits) = signed_digits(s.as_bytes());
    if digits == 0 {
        return None;
    }
    s[..end].parse().ok()
}

fn float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let (mut end, mut digits) = signed_digits(bytes);
    if bytes.get(end) == Some(&b'.') {
        let fraction = bytes[end + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits + fraction > 0 {
            end += 1 + fraction;
            digits += fraction;
        }
    }
    if digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let (exponent_end, exponent_digits) = signed_digits(&bytes[end + 1..]);
        if exponent_digits > 0 {
            end += 1 + exponent_end;
        }
    }
    s[..end].parse().ok()
}
