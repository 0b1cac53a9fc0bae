use crate::snapshot::PropertyValue;

/// Renders property values for human-readable change descriptions.
pub trait ValuePrinter: Send + Sync {
    fn format(&self, value: &PropertyValue) -> String;
}

/// Default printer: texts are quoted, references print their global id.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrettyValuePrinter;

impl ValuePrinter for PrettyValuePrinter {
    fn format(&self, value: &PropertyValue) -> String {
        match value {
            PropertyValue::Null => "null".to_string(),
            PropertyValue::Bool(b) => b.to_string(),
            PropertyValue::Integer(i) => i.to_string(),
            PropertyValue::Decimal(d) => d.clone(),
            PropertyValue::Text(t) => format!("'{t}'"),
            PropertyValue::Reference(id) => id.value(),
            PropertyValue::List(items) => format!(
                "[{}]",
                items.iter().map(|i| self.format(i)).collect::<Vec<_>>().join(", ")
            ),
        }
    }
}
