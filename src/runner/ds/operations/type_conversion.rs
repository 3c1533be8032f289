use std::collections::HashMap;

use crate::runner::ds::value::{NumberType, Value};

pub const TYPE_STR_UNDEFINED: &str = "undefined";
pub const TYPE_STR_NULL: &str = "null";
pub const TYPE_STR_BOOLEAN: &str = "boolean";
pub const TYPE_STR_STRING: &str = "string";
pub const TYPE_STR_NUMBER: &str = "number";
pub const TYPE_STR_OBJECT: &str = "object";
pub const TYPE_STR_FUNCTION: &str = "function";
pub const TYPE_STR_ARRAY: &str = "array";
pub const TYPE_STR_MAP: &str = "map";
pub const TYPE_STR_SET: &str = "set";
pub const TYPE_STR_DATE: &str = "date";
pub const TYPE_STR_REGEXP: &str = "regexp";
pub const TYPE_STR_BLOB: &str = "blob";

/// Semantic category of a value, independent of how it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Function,
    Sequence,
    Mapping,
    Set,
    Record,
    Temporal,
    Pattern,
    Blob,
}
impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Undefined => TYPE_STR_UNDEFINED,
            Variant::Null => TYPE_STR_NULL,
            Variant::Boolean => TYPE_STR_BOOLEAN,
            Variant::Number => TYPE_STR_NUMBER,
            Variant::String => TYPE_STR_STRING,
            Variant::Function => TYPE_STR_FUNCTION,
            Variant::Sequence => TYPE_STR_ARRAY,
            Variant::Mapping => TYPE_STR_MAP,
            Variant::Set => TYPE_STR_SET,
            Variant::Record => TYPE_STR_OBJECT,
            Variant::Temporal => TYPE_STR_DATE,
            Variant::Pattern => TYPE_STR_REGEXP,
            Variant::Blob => TYPE_STR_BLOB,
        }
    }

    pub fn is_container(&self) -> bool {
        match self {
            Variant::Sequence | Variant::Mapping | Variant::Set | Variant::Record => true,
            _ => false,
        }
    }
}

lazy_static! {
    /// Runtime class tag to variant. Built once, never mutated.
    pub static ref CLASS_TO_TYPE_MAPPING: HashMap<&'static str, Variant> = {
        let mut m = HashMap::new();
        m.insert("[object Array]", Variant::Sequence);
        m.insert("[object Blob]", Variant::Blob);
        m.insert("[object Boolean]", Variant::Boolean);
        m.insert("[object Date]", Variant::Temporal);
        m.insert("[object Function]", Variant::Function);
        m.insert("[object Map]", Variant::Mapping);
        m.insert("[object Number]", Variant::Number);
        m.insert("[object Object]", Variant::Record);
        m.insert("[object RegExp]", Variant::Pattern);
        m.insert("[object Set]", Variant::Set);
        m.insert("[object String]", Variant::String);
        m
    };
}

/// The runtime class tag of a value, in `Object.prototype.toString` form.
pub fn get_class_tag(v: &Value) -> &'static str {
    match v {
        Value::Undefined => "[object Undefined]",
        Value::Null => "[object Null]",
        Value::Boolean(_) => "[object Boolean]",
        Value::Number(_) => "[object Number]",
        Value::String(_) => "[object String]",
        Value::Function(_) => "[object Function]",
        Value::Sequence(_) => "[object Array]",
        Value::Mapping(_) => "[object Map]",
        Value::Set(_) => "[object Set]",
        Value::Record(_) | Value::Lazy(_) => "[object Object]",
        Value::Temporal(_) => "[object Date]",
        Value::Pattern(_) => "[object RegExp]",
        Value::Blob(_) => "[object Blob]",
    }
}

/// Coarse primitive type name (the `typeof` operator).
pub fn type_of(v: &Value) -> &'static str {
    match v {
        Value::Undefined => TYPE_STR_UNDEFINED,
        Value::Boolean(_) => TYPE_STR_BOOLEAN,
        Value::Number(_) => TYPE_STR_NUMBER,
        Value::String(_) => TYPE_STR_STRING,
        Value::Function(_) => TYPE_STR_FUNCTION,
        _ => TYPE_STR_OBJECT,
    }
}

pub fn classify(v: &Value) -> Variant {
    match v {
        Value::Undefined => Variant::Undefined,
        Value::Null => Variant::Null,
        _ => match CLASS_TO_TYPE_MAPPING.get(get_class_tag(v)) {
            Some(variant) => *variant,
            None => match type_of(v) {
                TYPE_STR_BOOLEAN => Variant::Boolean,
                TYPE_STR_NUMBER => Variant::Number,
                TYPE_STR_STRING => Variant::String,
                TYPE_STR_FUNCTION => Variant::Function,
                _ => Variant::Record,
            },
        },
    }
}

/// Name of the semantic type of given value, e.g. `"array"` or `"map"`.
pub fn determine_type(v: &Value) -> &'static str {
    classify(v).as_str()
}

pub fn number_is_not_a_number(v: &Value) -> bool {
    match v {
        Value::Number(n) => n.is_nan(),
        _ => false,
    }
}

pub fn to_boolean(v: &Value) -> bool {
    match v {
        Value::Undefined | Value::Null => false,
        Value::Boolean(b) => *b,
        Value::Number(n) => {
            let f = n.as_f64();
            !(f == 0.0 || f.is_nan())
        }
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

pub fn to_number(v: &Value) -> f64 {
    match v {
        Value::Undefined => f64::NAN,
        Value::Null => 0.0,
        Value::Boolean(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => n.as_f64(),
        Value::String(s) => string_to_number(s),
        Value::Sequence(_) => string_to_number(&to_display_string(v)),
        Value::Temporal(t) => t.borrow().get_time().map(|ms| ms as f64).unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    match trimmed {
        "" => 0.0,
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ => {
            if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
                i64::from_str_radix(&trimmed[2..], 16)
                    .map(|i| i as f64)
                    .unwrap_or(f64::NAN)
            } else if trimmed.chars().all(|c| "+-.eE0123456789".contains(c)) {
                trimmed.parse::<f64>().unwrap_or(f64::NAN)
            } else {
                f64::NAN
            }
        }
    }
}

pub fn to_display_string(v: &Value) -> String {
    let mut seen = vec![];
    display_string(v, &mut seen)
}

fn display_string(v: &Value, seen: &mut Vec<usize>) -> String {
    match v {
        Value::Undefined => TYPE_STR_UNDEFINED.to_string(),
        Value::Null => TYPE_STR_NULL.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Function(f) => format!("function {}() {{ [native code] }}", f.name),
        Value::Sequence(s) => {
            let address = v.reference_address().unwrap_or(0);
            if seen.contains(&address) {
                return String::new();
            }
            seen.push(address);
            let items = s.borrow().clone();
            let parts: Vec<String> = items
                .iter()
                .map(|item| match item {
                    Value::Undefined | Value::Null => String::new(),
                    _ => display_string(item, seen),
                })
                .collect();
            seen.pop();
            parts.join(",")
        }
        Value::Temporal(t) => t.borrow().to_string(),
        Value::Pattern(p) => p.borrow().to_string(),
        _ => get_class_tag(v).to_string(),
    }
}

/// Converts a float back into a graph number.
pub fn number_value(f: f64) -> Value {
    Value::Number(NumberType::from_f64(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::pattern::Pattern;
    use crate::runner::ds::temporal::Temporal;

    #[test]
    fn test_classify_all_variants() {
        assert_eq!(determine_type(&Value::Undefined), "undefined");
        assert_eq!(determine_type(&Value::Null), "null");
        assert_eq!(determine_type(&Value::Boolean(true)), "boolean");
        assert_eq!(determine_type(&Value::integer(1)), "number");
        assert_eq!(determine_type(&Value::string("a")), "string");
        assert_eq!(determine_type(&Value::new_sequence(vec![])), "array");
        assert_eq!(determine_type(&Value::new_mapping(vec![])), "map");
        assert_eq!(determine_type(&Value::new_set(vec![])), "set");
        assert_eq!(determine_type(&Value::new_record(vec![])), "object");
        assert_eq!(determine_type(&Value::new_temporal(Temporal::from_millis(0))), "date");
        assert_eq!(
            determine_type(&Value::new_pattern(Pattern::new("a", "g").unwrap())),
            "regexp"
        );
        assert_eq!(
            determine_type(&Value::new_function(
                crate::runner::ds::function_object::FunctionObject::new("f", |_| {
                    Ok(Value::Undefined)
                })
            )),
            "function"
        );
    }

    #[test]
    fn test_type_of_is_coarse() {
        assert_eq!(type_of(&Value::Null), "object");
        assert_eq!(type_of(&Value::new_sequence(vec![])), "object");
        assert_eq!(type_of(&Value::new_mapping(vec![])), "object");
    }

    #[test]
    fn test_conversions() {
        assert!(!to_boolean(&Value::string("")));
        assert!(to_boolean(&Value::new_record(vec![])));
        assert_eq!(to_number(&Value::string(" 42 ")), 42.0);
        assert!(to_number(&Value::string("4x")).is_nan());
        assert_eq!(
            to_display_string(&Value::new_sequence(vec![
                Value::integer(1),
                Value::Null,
                Value::string("a")
            ])),
            "1,,a"
        );
    }

    #[test]
    fn test_display_of_cyclic_sequence_terminates() {
        let s = Value::new_sequence(vec![Value::integer(1)]);
        if let Value::Sequence(inner) = &s {
            inner.borrow_mut().push(s.clone());
        }
        assert_eq!(to_display_string(&s), "1,");
    }
}
