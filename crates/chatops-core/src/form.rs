use crate::error::{RelayError, Result};
use std::collections::HashMap;

/// Decoded `application/x-www-form-urlencoded` body. When a key repeats, the
/// first value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields(HashMap<String, String>);

impl FormFields {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Missing fields read as the empty string, like an HTML form would.
    pub fn value(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }
}

/// Strictly parse a form body. Invalid UTF-8 or a broken percent escape is a
/// malformed request rather than something to paper over.
pub fn parse_form(body: &[u8]) -> Result<FormFields> {
    let text = std::str::from_utf8(body)
        .map_err(|e| RelayError::malformed(format!("form body is not UTF-8: {e}")))?;

    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Err(RelayError::malformed(format!(
                    "invalid percent escape at byte {i}"
                )));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    let mut fields = HashMap::new();
    for (k, v) in url::form_urlencoded::parse(bytes) {
        fields.entry(k.into_owned()).or_insert_with(|| v.into_owned());
    }
    Ok(FormFields(fields))
}
