use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";

/// Field-keyed validation messages, rendered as `{ "field": ["msg", ..] }`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Nest another set of errors under `prefix`, e.g. `items[0].quantity`.
    pub fn extend_prefixed(&mut self, prefix: &str, other: FieldErrors) {
        for (field, messages) in other.0 {
            let key = format!("{prefix}.{field}");
            self.0.entry(key).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

pub const INVALID_INTEGER: &str = "A valid integer is required.";
pub const INVALID_BOOLEAN: &str = "Must be a valid boolean.";
pub const INVALID_STRING: &str = "Not a valid string.";
pub const INVALID_UUID: &str = "Must be a valid UUID.";
pub const INVALID_LIST: &str = "Expected a list of items.";
pub const BLANK_ENTRY: &str = "This list may not contain blank entries.";
pub const OUT_OF_RANGE: &str = "Ensure this value is within the supported range.";

// Request fields arrive as raw JSON so that a wrong type is reported under
// the field's own key instead of failing the whole body.

/// `None` for an absent field or an explicit `null`.
fn present(value: Option<Value>) -> Option<Value> {
    value.filter(|v| !v.is_null())
}

/// Integer from a JSON number or a numeric string. Floats with no
/// fractional part count.
pub fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Strings as-is, numbers in their decimal form. Booleans are not text.
fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn bool_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_integer<T: TryFrom<i64>>(errors: &mut FieldErrors, field: &str, value: &Value) -> Option<T> {
    let Some(n) = integer_value(value) else {
        errors.add(field, INVALID_INTEGER);
        return None;
    };
    match T::try_from(n) {
        Ok(n) => Some(n),
        Err(_) => {
            errors.add(field, OUT_OF_RANGE);
            None
        }
    }
}

/// Required, non-blank string field. Returns the trimmed value.
pub fn required_text(errors: &mut FieldErrors, field: &str, value: Option<Value>) -> Option<String> {
    let Some(value) = present(value) else {
        errors.add(field, REQUIRED);
        return None;
    };
    match text_value(&value).map(|v| v.trim().to_string()) {
        None => {
            errors.add(field, INVALID_STRING);
            None
        }
        Some(v) if v.is_empty() => {
            errors.add(field, BLANK);
            None
        }
        Some(v) => Some(v),
    }
}

/// Optional string field, trimmed unless `raw`. Blank is allowed.
pub fn optional_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<Value>,
    raw: bool,
) -> Option<String> {
    let value = present(value)?;
    match text_value(&value) {
        Some(v) if raw => Some(v),
        Some(v) => Some(v.trim().to_string()),
        None => {
            errors.add(field, INVALID_STRING);
            None
        }
    }
}

pub fn required_integer<T: TryFrom<i64>>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<Value>,
) -> Option<T> {
    match present(value) {
        None => {
            errors.add(field, REQUIRED);
            None
        }
        Some(value) => coerce_integer(errors, field, &value),
    }
}

pub fn optional_integer<T: TryFrom<i64>>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<Value>,
) -> Option<T> {
    let value = present(value)?;
    coerce_integer(errors, field, &value)
}

pub fn optional_bool(errors: &mut FieldErrors, field: &str, value: Option<Value>) -> Option<bool> {
    let value = present(value)?;
    let parsed = bool_value(&value);
    if parsed.is_none() {
        errors.add(field, INVALID_BOOLEAN);
    }
    parsed
}

pub fn optional_uuid(errors: &mut FieldErrors, field: &str, value: Option<Value>) -> Option<Uuid> {
    let value = present(value)?;
    let parsed = value.as_str().and_then(|s| Uuid::parse_str(s.trim()).ok());
    if parsed.is_none() {
        errors.add(field, INVALID_UUID);
    }
    parsed
}

pub fn required_uuid(errors: &mut FieldErrors, field: &str, value: Option<Value>) -> Option<Uuid> {
    if present(value.clone()).is_none() {
        errors.add(field, REQUIRED);
        return None;
    }
    optional_uuid(errors, field, value)
}

/// List of trimmed strings; absent means empty. Blank entries are an error.
pub fn string_list(errors: &mut FieldErrors, field: &str, value: Option<Value>) -> Vec<String> {
    let items = match present(value) {
        None => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            errors.add(field, INVALID_LIST);
            return Vec::new();
        }
    };

    let mut out = Vec::with_capacity(items.len());
    for item in &items {
        match text_value(item).map(|v| v.trim().to_string()) {
            None => errors.add(field, INVALID_STRING),
            Some(v) if v.is_empty() => errors.add(field, BLANK_ENTRY),
            Some(v) => out.push(v),
        }
    }
    out
}

pub fn non_negative(errors: &mut FieldErrors, field: &str, value: i64) {
    if value < 0 {
        errors.add(field, "Ensure this value is greater than or equal to 0.");
    }
}
