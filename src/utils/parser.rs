use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use std::sync::OnceLock;

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?[0-9]+(?:\.[0-9]+)?$").expect("static regex"))
}

/// Parses a French-formatted euro amount.
/// Examples: "4 350,00 €", "4350", "-12,5", "1.234,56", "1.234.567", "85.125"
pub fn parse_euro_amount(text: &str) -> Result<Decimal, String> {
    let cleaned: String = text
        .replace('€', "")
        .replace("EUR", "")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '\u{202f}')
        .collect();

    if cleaned.is_empty() {
        return Err("Empty amount".to_string());
    }

    // 1.234,56 -> 1234.56 (dot thousands, comma decimals)
    let normalized = if cleaned.contains('.') && cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else if cleaned.contains(',') {
        cleaned.replace(',', ".")
    } else if cleaned.matches('.').count() > 1 {
        // 1.234.567: dots only group thousands
        cleaned.replace('.', "")
    } else {
        cleaned
    };

    if !number_regex().is_match(&normalized) {
        return Err(format!("Unparseable amount: '{}'", text));
    }

    Decimal::from_str(&normalized).map_err(|e| format!("Amount parse error: {}", e))
}

/// Numeric view of a loosely typed JSON value. Strings go through
/// [`parse_euro_amount`]; anything else is `None`.
pub fn json_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let repr = n.to_string();
            Decimal::from_str(&repr)
                .or_else(|_| Decimal::from_scientific(&repr))
                .ok()
        }
        Value::String(s) => parse_euro_amount(s).ok(),
        _ => None,
    }
}

/// Numeric view used by chart series, which tolerate floats only.
pub fn json_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_euro_amount(s)
            .ok()
            .and_then(|d| d.to_string().parse::<f64>().ok()),
        _ => None,
    }
}

/// Blank means absent, `null`, an empty/whitespace string or an empty container.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(_)) => false,
    }
}

/// Text rendering of a scalar JSON value, `None` when blank.
pub fn json_text(value: Option<&Value>) -> Option<String> {
    if is_blank(value) {
        return None;
    }
    match value? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}
