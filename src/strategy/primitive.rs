//! Scalars and the generic fallbacks.
use serde_json::Value;

use crate::element::{Element, Tone};
use crate::repr::{TypeCategory, TypeRepr};

const FLOAT_DIGITS: usize = 4;

/// Default type view: `name`, `name[{params}]`, or `import_path.name` for
/// class references.
pub fn plain_type(repr: &TypeRepr) -> Element {
    if repr.category == TypeCategory::ClassRef {
        return Element::code_text(repr.strategy_key());
    }
    if repr.has_params() {
        Element::code_text(format!("{}[{}]", repr.name, repr.params))
    } else {
        Element::code_text(repr.name.clone())
    }
}

pub fn float_value(summary: &Value) -> Element {
    Element::text(format_float(summary))
}

pub fn int_value(summary: &Value) -> Element {
    Element::text(display_scalar(summary))
}

pub fn bool_value(summary: &Value) -> Element {
    if truthy(summary) {
        Element::chip("TRUE", Tone::Success)
    } else {
        Element::chip("FALSE", Tone::Error)
    }
}

pub fn literal_value(summary: &Value) -> Element {
    Element::code_text(summary.to_string())
}

/// `repr` text when the summary has one, the JSON literal otherwise.
pub fn fallback_value(summary: &Value) -> Element {
    match summary.get("repr") {
        Some(repr) => repr_value(repr),
        None => literal_value(summary),
    }
}

pub fn repr_value(repr: &Value) -> Element {
    match repr.as_str() {
        Some(text) => Element::preformatted(text),
        None => Element::preformatted(&repr.to_string()),
    }
}

// ------------------------------- Helpers --------------------------------- //

/// Fixed 4-digit rendering with `toFixed` rounding. Strings are read like
/// `parseFloat`, anything unparseable is `NaN`.
pub fn format_float(summary: &Value) -> String {
    let x = match summary {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_float(s),
        _ => f64::NAN,
    };
    if x.is_nan() {
        return "NaN".to_owned();
    }
    // -0 has no sign here
    let sign = if x < 0.0 { "-" } else { "" };
    let magnitude = x.abs();
    if magnitude.is_infinite() {
        return format!("{sign}Infinity");
    }
    if magnitude >= 1e21 {
        return format!("{sign}{}", exponent_form(magnitude));
    }
    // an exact tie needs at most FLOAT_DIGITS + 1 binary-exact decimals
    let extended = format!("{:.*}", FLOAT_DIGITS + 1, magnitude);
    let exact = (magnitude * 2f64.powi(FLOAT_DIGITS as i32 + 1)).fract() == 0.0;
    let fixed = if exact && extended.ends_with('5') {
        round_up_last_digit(&extended[..extended.len() - 1])
    } else {
        format!("{:.*}", FLOAT_DIGITS, magnitude)
    };
    format!("{sign}{fixed}")
}

/// JavaScript number text: `0`, `1.5`, `1e+21`.
pub fn display_number(value: &Value) -> String {
    let Some(x) = value.as_f64() else {
        return display_scalar(value);
    };
    let magnitude = x.abs();
    if x == 0.0 {
        "0".to_owned()
    } else if magnitude >= 1e21 || magnitude < 1e-6 {
        let sign = if x < 0.0 { "-" } else { "" };
        format!("{sign}{}", exponent_form(magnitude))
    } else {
        x.to_string()
    }
}

/// `parseFloat`: leading whitespace, optional sign, then `Infinity` or the
/// longest decimal prefix.
fn parse_float(s: &str) -> f64 {
    let s = s.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1.0, &s[1..]),
        Some(b'+') => (1.0, &s[1..]),
        _ => (1.0, s),
    };
    if rest.starts_with("Infinity") {
        return sign * f64::INFINITY;
    }
    match numeric_prefix_len(rest) {
        0 => f64::NAN,
        len => rest[..len].parse::<f64>().map_or(f64::NAN, |x| sign * x),
    }
}

/// Length of the longest `digits[.digits][e[sign]digits]` prefix; 0 if there
/// is no mantissa digit.
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let mut end = digits_from(0);
    let mut mantissa_digits = end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return 0;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut i = end + 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_end = digits_from(i);
        if exp_end > i {
            end = exp_end;
        }
    }
    end
}

/// Adds one unit in the last place of a plain decimal string.
fn round_up_last_digit(fixed: &str) -> String {
    let mut chars: Vec<char> = fixed.chars().collect();
    for c in chars.iter_mut().rev() {
        match *c {
            '.' => {}
            '9' => *c = '0',
            d => {
                *c = (d as u8 + 1) as char;
                return chars.into_iter().collect();
            }
        }
    }
    std::iter::once('1').chain(chars).collect()
}

/// `1e+21`, `1.5e-7`.
fn exponent_form(magnitude: f64) -> String {
    let text = format!("{magnitude:e}");
    match text.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => text,
    }
}

/// Text for a scalar cell: strings unquoted, null empty, composites as JSON.
pub fn display_scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// JavaScript-style truthiness.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0 && !x.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn float_has_four_decimals() {
        assert_eq!(format_float(&json!(3.14159)), "3.1416");
        assert_eq!(format_float(&json!(2)), "2.0000");
        assert_eq!(format_float(&json!("0.5")), "0.5000");
        assert_eq!(format_float(&json!(-0.0)), "0.0000");
    }

    #[test]
    fn float_non_numbers() {
        assert_eq!(format_float(&json!("abc")), "NaN");
        assert_eq!(format_float(&json!(null)), "NaN");
        assert_eq!(format_float(&json!("-Infinity")), "-Infinity");
    }

    #[test]
    fn float_exact_ties_round_away_from_zero() {
        assert_eq!(format_float(&json!(0.03125)), "0.0313");
        assert_eq!(format_float(&json!(1.03125)), "1.0313");
        assert_eq!(format_float(&json!(-1.03125)), "-1.0313");
        assert_eq!(format_float(&json!(0.09375)), "0.0938");
        assert_eq!(format_float(&json!(1234.21875)), "1234.2188");
        assert_eq!(format_float(&json!("0.03125")), "0.0313");
        assert_eq!(format_float(&json!(0.5)), "0.5000");
    }

    #[test]
    fn float_strings_read_numeric_prefix() {
        assert_eq!(format_float(&json!("12abc")), "12.0000");
        assert_eq!(format_float(&json!("  -1.5e2x")), "-150.0000");
        assert_eq!(format_float(&json!(".5")), "0.5000");
        assert_eq!(format_float(&json!("3e")), "3.0000");
        assert_eq!(format_float(&json!("Infinityx")), "Infinity");
        assert_eq!(format_float(&json!("- 1")), "NaN");
        assert_eq!(format_float(&json!(".")), "NaN");
    }

    #[test]
    fn float_rejects_rust_only_spellings() {
        assert_eq!(format_float(&json!("inf")), "NaN");
        assert_eq!(format_float(&json!("nan")), "NaN");
        assert_eq!(format_float(&json!("infinity")), "NaN");
    }

    #[test]
    fn float_huge_magnitudes_use_exponent_form() {
        assert_eq!(format_float(&json!(1e21)), "1e+21");
        assert_eq!(format_float(&json!(-1.5e22)), "-1.5e+22");
        assert_eq!(format_float(&json!(1e20)), "100000000000000000000.0000");
    }

    #[test]
    fn numbers_display_like_javascript() {
        assert_eq!(display_number(&json!(0.0)), "0");
        assert_eq!(display_number(&json!(1.5)), "1.5");
        assert_eq!(display_number(&json!(-3)), "-3");
        assert_eq!(display_number(&json!(1e21)), "1e+21");
        assert_eq!(display_number(&json!(1e-7)), "1e-7");
        assert_eq!(display_number(&json!("x")), "x");
    }

    #[test]
    fn carry_runs_through_nines() {
        assert_eq!(round_up_last_digit("0.0999"), "0.1000");
        assert_eq!(round_up_last_digit("99.9999"), "100.0000");
    }

    #[test]
    fn int_is_verbatim() {
        assert_eq!(int_value(&json!(42)), Element::text("42"));
        assert_eq!(int_value(&json!(-7)), Element::text("-7"));
        assert_eq!(int_value(&json!("12")), Element::text("12"));
    }

    #[test]
    fn bool_chip_tone_follows_state() {
        assert_eq!(bool_value(&json!(true)), Element::chip("TRUE", Tone::Success));
        assert_eq!(bool_value(&json!(false)), Element::chip("FALSE", Tone::Error));
        assert_eq!(bool_value(&json!(0)), Element::chip("FALSE", Tone::Error));
    }

    #[test]
    fn plain_type_forms() {
        assert_eq!(plain_type(&TypeRepr::builtin("int")), Element::code_text("int"));
        assert_eq!(
            plain_type(&TypeRepr::class("Figure", "plotly.graph_objs._figure")),
            Element::code_text("plotly.graph_objs._figure.Figure")
        );
        let dict = TypeRepr::new(TypeCategory::Alias, "dict", json!({"args": []}));
        assert_eq!(plain_type(&dict), Element::code_text(r#"dict[{"args":[]}]"#));
    }

    #[test]
    fn non_string_repr_is_shown_as_json() {
        assert_eq!(
            fallback_value(&json!({"repr": 5})),
            Element::Preformatted { lines: vec!["5".into()] }
        );
    }
}
