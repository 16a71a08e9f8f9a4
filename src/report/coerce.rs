//! Total coercions from loosely shaped LLM/storage JSON into typed values.
//! None of these functions fail; absent or unusable input yields `None` or an
//! empty collection and the caller picks the default.

use serde_json::Value;

/// JavaScript-style falsiness: `null`, `false`, `0`, `NaN` and `""`.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_none_or(|f| f == 0.0 || f.is_nan()),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Renders a number without a trailing `.0` for integral values.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Free text: strings as-is, numbers rendered. Empty strings count as absent.
pub fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).map(format_number),
        _ => None,
    }
}

/// A finite number from a JSON number or a numeric string such as `"25"` or
/// `"25%"`.
pub fn number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

/// Parses the leading integer of a string the way `parseInt(s, 10)` does:
/// leading whitespace and an optional sign, then as many digits as present.
pub fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok().map(|n| sign * n)
}

/// Market size or growth rate. Besides plain text and numbers these arrive as
/// `{value, unit}`, `{valueBillionUSD}` or `{cagr}` objects.
pub fn market_figure(value: Option<&Value>) -> Option<String> {
    let value = value?;
    if let Some(s) = text(Some(value)) {
        return Some(s);
    }
    let obj = value.as_object()?;

    if let Some(v) = text(obj.get("value")) {
        return Some(match text(obj.get("unit")) {
            Some(unit) => format!("{v} {unit}"),
            None => v,
        });
    }
    if let Some(v) = number(obj.get("valueBillionUSD")) {
        return Some(format!("${} billion", format_number(v)));
    }
    if let Some(v) = number(obj.get("cagr")) {
        return Some(format!("{}% CAGR", format_number(v)));
    }
    if obj.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// A single list entry as text: objects prefer their `name`, otherwise they
/// are rendered as JSON. Falsy entries yield `None`.
pub fn list_entry(value: &Value) -> Option<String> {
    if is_falsy(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => match obj.get("name") {
            Some(Value::String(name)) if !name.is_empty() => Some(name.clone()),
            _ => Some(value.to_string()),
        },
        Value::Number(_) => text(Some(value)),
        other => Some(other.to_string()),
    }
}

/// A plain string list. Anything other than an array yields an empty list.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(list_entry).collect())
        .unwrap_or_default()
}

/// The elements of `value` when it is an array, otherwise an empty slice.
pub fn array<'a>(value: Option<&'a Value>) -> &'a [Value] {
    value
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_falsy() {
        for v in [json!(null), json!(false), json!(0), json!(""), json!(0.0)] {
            assert!(is_falsy(&v), "{v} should be falsy");
        }
        for v in [json!(true), json!(1), json!("x"), json!([]), json!({})] {
            assert!(!is_falsy(&v), "{v} should be truthy");
        }
    }

    #[test]
    fn test_number_accepts_numeric_strings() {
        assert_eq!(number(Some(&json!(40))), Some(40.0));
        assert_eq!(number(Some(&json!("100"))), Some(100.0));
        assert_eq!(number(Some(&json!(" 25% "))), Some(25.0));
        assert_eq!(number(Some(&json!("n/a"))), None);
        assert_eq!(number(Some(&json!(null))), None);
        assert_eq!(number(None), None);
    }

    #[test]
    fn test_leading_integer() {
        assert_eq!(leading_integer("42%"), Some(42));
        assert_eq!(leading_integer("  17.9% of revenue"), Some(17));
        assert_eq!(leading_integer("-5"), Some(-5));
        assert_eq!(leading_integer("n/a"), None);
        assert_eq!(leading_integer(""), None);
        assert_eq!(leading_integer("%"), None);
    }

    #[test]
    fn test_market_figure_shapes() {
        assert_eq!(
            market_figure(Some(&json!("$12.4 billion"))).as_deref(),
            Some("$12.4 billion")
        );
        assert_eq!(market_figure(Some(&json!(12.5))).as_deref(), Some("12.5"));
        assert_eq!(
            market_figure(Some(&json!({"value": 4.2, "unit": "billion USD"}))).as_deref(),
            Some("4.2 billion USD")
        );
        assert_eq!(
            market_figure(Some(&json!({"valueBillionUSD": 3}))).as_deref(),
            Some("$3 billion")
        );
        assert_eq!(
            market_figure(Some(&json!({"cagr": "8.5"}))).as_deref(),
            Some("8.5% CAGR")
        );
        assert_eq!(
            market_figure(Some(&json!({"low": 1}))).as_deref(),
            Some(r#"{"low":1}"#)
        );
        assert_eq!(market_figure(Some(&json!({}))), None);
        assert_eq!(market_figure(Some(&json!([1, 2]))), None);
    }

    #[test]
    fn test_string_list_normalizes_entries() {
        let value = json!([
            {"name": "Rising AI adoption"},
            "Shift to mobile",
            null,
            "",
            {"label": "no name"},
            7
        ]);
        assert_eq!(
            string_list(Some(&value)),
            vec![
                "Rising AI adoption".to_string(),
                "Shift to mobile".to_string(),
                r#"{"label":"no name"}"#.to_string(),
                "7".to_string(),
            ]
        );
        assert!(string_list(Some(&json!("not a list"))).is_empty());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(2.5), "2.5");
    }
}
