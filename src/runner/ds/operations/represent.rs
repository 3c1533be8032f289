use crate::runner::config::ToolsConfig;
use crate::runner::ds::value::{NumberType, Value};

#[derive(Debug, Clone)]
pub struct RepresentOptions {
    pub indention: String,
    pub initial_indention: String,
    /// Levels to render. Reaching zero emits the cutoff marker; cycles are
    /// only bounded by this.
    pub number_of_levels: i64,
    pub maximum_number_of_levels_reached_identifier: String,
}

impl Default for RepresentOptions {
    fn default() -> Self {
        RepresentOptions {
            indention: "    ".to_string(),
            initial_indention: String::new(),
            number_of_levels: 8,
            maximum_number_of_levels_reached_identifier: "__maximum_number_of_levels_reached__"
                .to_string(),
        }
    }
}

impl RepresentOptions {
    pub fn from_config(config: &ToolsConfig) -> Self {
        let representation = &config.representation;
        RepresentOptions {
            indention: representation.indention.clone(),
            initial_indention: String::new(),
            number_of_levels: representation.number_of_levels,
            maximum_number_of_levels_reached_identifier: representation
                .maximum_number_of_levels_reached_identifier
                .clone(),
        }
    }
}

/// Renders a value graph as indented, deterministic text.
pub fn represent_object(value: &Value) -> String {
    represent_object_with(value, &RepresentOptions::default())
}

pub fn represent_object_with(value: &Value, options: &RepresentOptions) -> String {
    represent(
        value,
        options,
        &options.initial_indention,
        options.number_of_levels,
    )
}

fn represent_number(n: &NumberType) -> String {
    match n {
        NumberType::Float(f) if f.is_nan() => "NaN".to_string(),
        _ => n.to_string(),
    }
}

fn represent(value: &Value, options: &RepresentOptions, indention: &str, levels: i64) -> String {
    if levels == 0 {
        return options.maximum_number_of_levels_reached_identifier.clone();
    }
    let nested = format!("{}{}", indention, options.indention);
    let child = |item: &Value| represent(item, options, &nested, levels - 1);
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::String(s) => format!("\"{}\"", s.replace('\n', &format!("\n{}", indention))),
        Value::Number(n) => represent_number(n),
        Value::Boolean(b) => b.to_string(),
        Value::Function(f) => format!("function {}", f.name),
        Value::Temporal(t) => t.borrow().to_string(),
        Value::Pattern(p) => p.borrow().to_string(),
        Value::Blob(b) => b.to_string(),
        Value::Sequence(items) => {
            let items = items.borrow().clone();
            if items.is_empty() {
                return "[]".to_string();
            }
            let rendered: Vec<String> = items
                .iter()
                .map(|item| format!("\n{}{}", nested, child(item)))
                .collect();
            format!("[{}\n{}]", rendered.join(","), indention)
        }
        Value::Mapping(m) => {
            let entries = m.borrow().entries();
            if entries.is_empty() {
                return "EmptyMap".to_string();
            }
            entries
                .iter()
                .map(|(key, item)| format!("{} -> {}", child(key), child(item)))
                .collect::<Vec<String>>()
                .join(&format!(",\n{}", nested))
        }
        Value::Set(s) => {
            let items = s.borrow().values();
            if items.is_empty() {
                return "EmptySet".to_string();
            }
            let rendered: Vec<String> = items
                .iter()
                .map(|item| format!("\n{}{}", nested, child(item)))
                .collect();
            format!("{{{}\n{}}}", rendered.join(","), indention)
        }
        Value::Record(r) => {
            let mut entries = r.borrow().entries();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            represent_record(&entries, &nested, indention, &child)
        }
        Value::Lazy(l) => {
            let mut entries = l.target().borrow().entries();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            represent_record(&entries, &nested, indention, &child)
        }
    }
}

fn represent_record(
    entries: &[(String, Value)],
    nested: &str,
    indention: &str,
    child: &dyn Fn(&Value) -> String,
) -> String {
    if entries.is_empty() {
        return "{}".to_string();
    }
    let rendered: Vec<String> = entries
        .iter()
        .map(|(key, item)| format!("\n{}{}: {}", nested, key, child(item)))
        .collect();
    format!("{{{}\n{}}}", rendered.join(","), indention)
}
