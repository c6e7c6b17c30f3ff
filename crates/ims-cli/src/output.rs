//! Output formatting for ims-cli (table, json)

use clap::ValueEnum;
use colored::Colorize;
use ims_core::{Category, Image, Product, Scalar, Supplier};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// ASCII table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Context for output rendering
pub struct OutputContext {
    pub format: OutputFormat,
    pub quiet: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat, no_color: bool, quiet: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format, quiet }
    }

    /// Print a success message (unless in quiet mode)
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg.green());
        }
    }

    /// Print an info message (unless in quiet mode)
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg);
        }
    }

    /// Print an error message
    pub fn error(&self, msg: &str) {
        eprintln!("{}", msg.red());
    }

    /// Print data in the configured format
    pub fn print<T: Tabled + Serialize>(&self, data: &[T]) {
        if let Some(out) = self.render(data) {
            println!("{}", out);
        }
    }

    /// Print a single item in the configured format
    pub fn print_one<T: Tabled + Serialize>(&self, data: &T) {
        println!("{}", self.render_one(data));
    }

    /// Render a list; `None` when there is nothing to show in quiet mode
    pub fn render<T: Tabled + Serialize>(&self, data: &[T]) -> Option<String> {
        match self.format {
            OutputFormat::Table if data.is_empty() => {
                (!self.quiet).then(|| "No data".to_string())
            }
            OutputFormat::Table => Some(Table::new(data).to_string()),
            OutputFormat::Json => {
                Some(serde_json::to_string_pretty(data).unwrap_or_else(|_| "[]".to_string()))
            }
        }
    }

    pub fn render_one<T: Tabled + Serialize>(&self, data: &T) -> String {
        match self.format {
            OutputFormat::Table => Table::new([data]).to_string(),
            OutputFormat::Json => {
                serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
            }
        }
    }

    /// Print an opaque value returned by the gateway
    pub fn print_value(&self, label: &str, value: &Value) {
        match self.format {
            OutputFormat::Table => {
                if !self.quiet {
                    println!("{}: {}", label.bold(), display_value(value));
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({ label: value }))
                        .unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// Display types for records
// =============================================================================

/// A record type with a table rendering
pub trait AsRow {
    type Row: Tabled + Serialize;

    fn as_row(&self) -> Self::Row;
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

#[derive(Debug, Tabled, Serialize)]
pub struct ProductRow {
    #[tabled(rename = "ID")]
    pub p_id: Scalar,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Description")]
    pub description: String,
    #[tabled(rename = "Quantity")]
    pub quantity: Scalar,
    #[tabled(rename = "Price")]
    pub price: Scalar,
}

impl AsRow for Product {
    type Row = ProductRow;

    fn as_row(&self) -> ProductRow {
        ProductRow {
            p_id: self.p_id.clone(),
            name: self.name.clone(),
            description: text(&self.description),
            quantity: self.quantity.clone(),
            price: self.price.clone(),
        }
    }
}

#[derive(Debug, Tabled, Serialize)]
pub struct SupplierRow {
    #[tabled(rename = "ID")]
    pub s_id: Scalar,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Contact")]
    pub contact: String,
}

impl AsRow for Supplier {
    type Row = SupplierRow;

    fn as_row(&self) -> SupplierRow {
        SupplierRow {
            s_id: self.s_id.clone(),
            name: self.name.clone(),
            contact: text(&self.contact),
        }
    }
}

#[derive(Debug, Tabled, Serialize)]
pub struct CategoryRow {
    #[tabled(rename = "ID")]
    pub c_id: Scalar,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Description")]
    pub description: String,
}

impl AsRow for Category {
    type Row = CategoryRow;

    fn as_row(&self) -> CategoryRow {
        CategoryRow {
            c_id: self.c_id.clone(),
            name: self.name.clone(),
            description: text(&self.description),
        }
    }
}

#[derive(Debug, Tabled, Serialize)]
pub struct ImageRow {
    #[tabled(rename = "ID")]
    pub i_id: Scalar,
    #[tabled(rename = "Product")]
    pub p_id: Scalar,
    #[tabled(rename = "URL")]
    pub url: String,
}

impl AsRow for Image {
    type Row = ImageRow;

    fn as_row(&self) -> ImageRow {
        ImageRow {
            i_id: self.i_id.clone(),
            p_id: self.p_id.clone(),
            url: self.url.clone(),
        }
    }
}

/// One entry of a list read, which only carries ids
#[derive(Debug, Tabled, Serialize)]
#[serde(transparent)]
pub struct IdRow {
    #[tabled(rename = "ID")]
    pub id: Scalar,
}

impl From<Scalar> for IdRow {
    fn from(id: Scalar) -> Self {
        Self { id }
    }
}

/// Row of unknown width, as returned by association reads
#[derive(Debug, Tabled, Serialize)]
#[serde(transparent)]
pub struct RawRow {
    #[tabled(rename = "Row")]
    #[tabled(display_with = "display_columns")]
    pub columns: Value,
}

fn display_columns(value: &Value) -> String {
    match value {
        Value::Array(columns) => columns
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(" | "),
        other => display_value(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table() -> OutputContext {
        OutputContext {
            format: OutputFormat::Table,
            quiet: false,
        }
    }

    fn json() -> OutputContext {
        OutputContext {
            format: OutputFormat::Json,
            quiet: false,
        }
    }

    fn id_rows(ids: &[&str]) -> Vec<IdRow> {
        ids.iter().map(|id| IdRow::from(Scalar::from(*id))).collect()
    }

    #[test]
    fn id_list_renders_one_column() {
        let out = table()
            .render(&id_rows(&["3f2a", "9b1c"]))
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines.iter().any(|l| l.contains("ID")));
        assert!(lines.iter().any(|l| l.contains("3f2a")));
        assert!(lines.iter().any(|l| l.contains("9b1c")));
        assert!(!out.contains("Name"));
    }

    #[test]
    fn id_list_as_json_is_a_plain_array() {
        let out = json().render(&id_rows(&["3f2a"])).unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, serde_json::json!(["3f2a"]));

        let ints = vec![IdRow::from(Scalar::Int(7))];
        let parsed: Value = serde_json::from_str(&json().render(&ints).unwrap()).unwrap();
        assert_eq!(parsed, serde_json::json!([7]));
    }

    #[test]
    fn empty_list_in_quiet_mode_prints_nothing() {
        let quiet = OutputContext {
            format: OutputFormat::Table,
            quiet: true,
        };
        assert_eq!(quiet.render::<IdRow>(&[]), None);
        assert_eq!(table().render::<IdRow>(&[]).as_deref(), Some("No data"));
        assert_eq!(json().render::<IdRow>(&[]).as_deref(), Some("[]"));
    }

    #[test]
    fn product_row_fills_missing_description() {
        let product = Product {
            p_id: Scalar::from("3f2a"),
            name: "phone".to_string(),
            description: None,
            quantity: Scalar::Int(3),
            price: Scalar::Float(34.5),
        };

        let out = table().render_one(&product.as_row());
        assert!(out.contains("Description"));
        assert!(out.contains("phone"));
        assert!(out.contains("34.5"));

        let parsed: Value = serde_json::from_str(&json().render_one(&product.as_row())).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!({
                "p_id": "3f2a",
                "name": "phone",
                "description": "-",
                "quantity": 3,
                "price": 34.5
            })
        );
    }

    #[test]
    fn association_rows_join_columns() {
        let rows = vec![RawRow {
            columns: serde_json::json!(["3f2a", "phone", 34.5]),
        }];
        let out = table().render(&rows).unwrap();
        assert!(out.contains("3f2a | phone | 34.5"));
    }
}
