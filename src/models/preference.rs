//! Preference model: typed product preferences and feature toggles.

use serde::{Deserialize, Serialize};

/// Value of a preference, tagged by its `type` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PreferenceValue {
    Boolean { value: bool },
    Number { value: i64 },
    String { value: String },
    Select { value: String, options: Vec<String> },
}

impl PreferenceValue {
    /// Coerce raw text input into a value of the same variant.
    ///
    /// Input never fails to apply: booleans accept `true`, `1`, `yes`, `on`
    /// (anything else is `false`), numbers take an optional sign and the leading
    /// digits (otherwise `0`), and a select falls back to its first option when
    /// the text is not one of the options.
    pub fn coerce(&self, raw: &str) -> PreferenceValue {
        match self {
            PreferenceValue::Boolean { .. } => PreferenceValue::Boolean {
                value: parse_flag(raw),
            },
            PreferenceValue::Number { .. } => PreferenceValue::Number {
                value: parse_leading_int(raw),
            },
            PreferenceValue::String { .. } => PreferenceValue::String {
                value: raw.to_string(),
            },
            PreferenceValue::Select { value, options } => {
                let value = if options.iter().any(|o| o == raw) {
                    raw.to_string()
                } else {
                    options.first().cloned().unwrap_or_else(|| value.clone())
                };
                PreferenceValue::Select {
                    value,
                    options: options.clone(),
                }
            }
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            PreferenceValue::Boolean { .. } => "boolean",
            PreferenceValue::Number { .. } => "number",
            PreferenceValue::String { .. } => "string",
            PreferenceValue::Select { .. } => "select",
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

fn parse_leading_int(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let sign_len = match trimmed.as_bytes().first() {
        Some(b'-') | Some(b'+') => 1,
        _ => 0,
    };
    let digits = &trimmed[sign_len..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    trimmed[..sign_len + end].parse::<i64>().unwrap_or(0)
}

/// A single preference or feature toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPreference {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub value: PreferenceValue,
}

/// Feature toggles and typed preferences of one product configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductPreferences {
    #[serde(default)]
    pub features: Vec<ProductPreference>,
    #[serde(default)]
    pub preferences: Vec<ProductPreference>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape_uses_type_tag() {
        let pref: ProductPreference = serde_json::from_value(json!({
            "id": "ap1",
            "name": "Default Dashboard",
            "value": "overview",
            "type": "select",
            "options": ["overview", "detailed", "custom"]
        }))
        .unwrap();

        assert_eq!(
            pref.value,
            PreferenceValue::Select {
                value: "overview".to_string(),
                options: vec![
                    "overview".to_string(),
                    "detailed".to_string(),
                    "custom".to_string()
                ],
            }
        );
    }

    #[test]
    fn test_mismatched_payload_is_rejected() {
        let result = serde_json::from_value::<ProductPreference>(json!({
            "id": "ap2",
            "name": "Auto-refresh Data",
            "value": "soon",
            "type": "number"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_number_coercion() {
        let current = PreferenceValue::Number { value: 300 };
        assert_eq!(current.coerce("120"), PreferenceValue::Number { value: 120 });
        assert_eq!(current.coerce("  42abc"), PreferenceValue::Number { value: 42 });
        assert_eq!(current.coerce("-7"), PreferenceValue::Number { value: -7 });
        assert_eq!(current.coerce("abc"), PreferenceValue::Number { value: 0 });
        assert_eq!(current.coerce(""), PreferenceValue::Number { value: 0 });
        assert_eq!(current.coerce("+15 min"), PreferenceValue::Number { value: 15 });
        assert_eq!(current.coerce("-"), PreferenceValue::Number { value: 0 });
    }

    #[test]
    fn test_number_coercion_at_bounds() {
        let current = PreferenceValue::Number { value: 0 };
        assert_eq!(
            current.coerce("-9223372036854775808"),
            PreferenceValue::Number { value: i64::MIN }
        );
        assert_eq!(
            current.coerce("9223372036854775807"),
            PreferenceValue::Number { value: i64::MAX }
        );
        assert_eq!(
            current.coerce("9223372036854775808"),
            PreferenceValue::Number { value: 0 }
        );
    }

    #[test]
    fn test_type_name_matches_wire_tag() {
        let values = [
            PreferenceValue::Boolean { value: true },
            PreferenceValue::Number { value: 1 },
            PreferenceValue::String { value: String::new() },
            PreferenceValue::Select {
                value: "a".to_string(),
                options: vec!["a".to_string()],
            },
        ];
        for value in values {
            let wire = serde_json::to_value(&value).unwrap();
            assert_eq!(wire["type"], value.type_name());
            assert_eq!(value.coerce("1").type_name(), value.type_name());
        }
    }

    #[test]
    fn test_boolean_coercion() {
        let current = PreferenceValue::Boolean { value: false };
        assert_eq!(current.coerce("ON"), PreferenceValue::Boolean { value: true });
        assert_eq!(current.coerce("nope"), PreferenceValue::Boolean { value: false });
    }

    #[test]
    fn test_select_coercion_falls_back_to_first_option() {
        let current = PreferenceValue::Select {
            value: "detailed".to_string(),
            options: vec!["overview".to_string(), "detailed".to_string()],
        };
        match current.coerce("custom") {
            PreferenceValue::Select { value, .. } => assert_eq!(value, "overview"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
