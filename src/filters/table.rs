// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Tabular extraction
//!
//! A [`Table`] reads the header row once, maps column names to indexes and
//! hands out one [`TableRow`] per data row. [`TableCell`] then picks a cell
//! of the current row by column name.

use std::collections::HashMap;
use std::sync::Arc;

use super::text::clean_text;
use super::{filter_common, Context, Env, Filter, Selector, Value};
use crate::dom::{Element, Node};
use crate::error::{Error, Result};

/// Column name → index map of one table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns {
    keyed: HashMap<String, usize>,
    headers: Vec<(String, usize)>,
}

impl Columns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an explicit key
    pub fn insert_key(&mut self, key: impl Into<String>, index: usize) {
        self.keyed.entry(key.into()).or_insert(index);
    }

    /// Register a header text
    pub fn insert_header(&mut self, text: impl Into<String>, index: usize) {
        self.headers.push((text.into(), index));
    }

    /// Build the map from header cells, honouring `colspan`
    ///
    /// `keys` maps a key to the header texts it may appear under.
    pub fn from_header(cells: &[Element], keys: &[(String, Vec<String>)]) -> Self {
        let mut columns = Self::new();
        let mut index = 0;

        for cell in cells {
            let text = clean_text(&cell.text_content());
            for (key, candidates) in keys {
                if candidates
                    .iter()
                    .any(|c| c == &text || c.to_lowercase() == text.to_lowercase())
                {
                    columns.insert_key(key.clone(), index);
                }
            }
            columns.insert_header(text, index);
            index += span(cell);
        }

        columns
    }

    /// Index for a name: explicit key, then exact header, then case-insensitive header
    pub fn index_of(&self, name: &str) -> Option<usize> {
        if let Some(index) = self.keyed.get(name) {
            return Some(*index);
        }
        if let Some((_, index)) = self.headers.iter().find(|(text, _)| text == name) {
            return Some(*index);
        }
        let lower = name.to_lowercase();
        self.headers
            .iter()
            .find(|(text, _)| text.to_lowercase() == lower)
            .map(|(_, index)| *index)
    }

    pub fn is_empty(&self) -> bool {
        self.keyed.is_empty() && self.headers.is_empty()
    }
}

fn span(cell: &Element) -> usize {
    cell.attr("colspan")
        .and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
}

/// Cell of `row` covering column `index`
fn cell_at(row: &Element, index: usize) -> Option<Element> {
    let mut position = 0;
    for cell in row
        .children()
        .into_iter()
        .filter(|c| matches!(c.tag_name(), "td" | "th"))
    {
        let width = span(&cell);
        if index < position + width {
            return Some(cell);
        }
        position += width;
    }
    None
}

/// Table declaration: header cells, data rows and keyed columns
#[derive(Debug, Clone)]
pub struct Table {
    head: String,
    rows: String,
    keys: Vec<(String, Vec<String>)>,
}

impl Table {
    /// `head` selects the header cells, `rows` the data rows
    pub fn new(head: impl Into<String>, rows: impl Into<String>) -> Self {
        Self {
            head: head.into(),
            rows: rows.into(),
            keys: Vec::new(),
        }
    }

    /// Declare a key reachable under any of the given header texts
    pub fn column<I, S>(mut self, key: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys
            .push((key.into(), headers.into_iter().map(Into::into).collect()));
        self
    }

    /// Column map of the table under `scope`
    pub fn columns(&self, scope: &Element) -> Result<Columns> {
        let cells = scope.query(&self.head)?;
        Ok(Columns::from_header(&cells, &self.keys))
    }

    /// One row handle per data row under `scope`
    pub fn rows(&self, scope: &Element) -> Result<Vec<TableRow>> {
        let columns = Arc::new(self.columns(scope)?);
        Ok(scope
            .query(&self.rows)?
            .into_iter()
            .map(|row| TableRow {
                node: Node::Element(row),
                columns: columns.clone(),
            })
            .collect())
    }
}

/// A data row together with its table's column map
#[derive(Debug, Clone)]
pub struct TableRow {
    node: Node,
    columns: Arc<Columns>,
}

impl TableRow {
    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// Extraction context for this row
    pub fn context(&self) -> Context<'_> {
        Context::new(&self.node).with_columns(&self.columns)
    }

    /// Extraction context for this row with an environment
    pub fn context_with<'a>(&'a self, env: &'a Env) -> Context<'a> {
        self.context().with_env(env)
    }
}

/// Cell of the current row, looked up by column name
#[derive(Debug)]
pub struct TableCell {
    selector: Selector,
    default: Option<Value>,
}

impl TableCell {
    /// Candidate names are tried in order
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        Self {
            selector: Selector::func(move |ctx| find_cell(&names, ctx)),
            default: None,
        }
    }
}

fn find_cell(names: &[String], ctx: &Context<'_>) -> Result<Value> {
    let index = ctx
        .columns
        .and_then(|columns| names.iter().find_map(|n| columns.index_of(n)))
        .ok_or_else(|| Error::MissingColumn(names.join(" or ")))?;

    let Node::Element(row) = ctx.node else {
        return Err(Error::not_found(format!("cell {}", index), ctx.node.describe()));
    };

    cell_at(row, index)
        .map(|cell| Value::Nodes(vec![cell]))
        .ok_or_else(|| Error::not_found(format!("cell {}", index), row.describe()))
}

impl Filter for TableCell {
    fn selector(&self) -> &Selector {
        &self.selector
    }

    fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    fn filter(&self, value: Value, _ctx: &Context<'_>) -> Result<Value> {
        Ok(value)
    }
}

filter_common!(TableCell);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;
    use crate::filters::{CleanDecimal, CleanText, Date, FilterExt};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    const HTML: &str = r#"
        <table>
          <thead><tr><th>Date</th><th colspan="2">Libellé</th><th>MONTANT</th></tr></thead>
          <tbody>
            <tr><td>01/02/2024</td><td>CB</td><td>Bakery</td><td>-4,20</td></tr>
            <tr><td>03/02/2024</td><td>VIR</td><td>Salary</td><td>2.500,00</td></tr>
          </tbody>
        </table>"#;

    fn table() -> Table {
        Table::new("thead th", "tbody tr")
            .column("date", ["Date"])
            .column("amount", ["Montant", "Amount"])
    }

    #[test]
    fn test_column_resolution_order() {
        let doc = parse_html(HTML).unwrap();
        let columns = table().columns(&doc.root()).unwrap();

        assert_eq!(columns.index_of("date"), Some(0));
        assert_eq!(columns.index_of("Libellé"), Some(1));
        assert_eq!(columns.index_of("amount"), Some(3));
        assert_eq!(columns.index_of("montant"), Some(3));
        assert_eq!(columns.index_of("Balance"), None);
    }

    #[test]
    fn test_rows_and_cells() {
        let doc = parse_html(HTML).unwrap();
        let rows = table().rows(&doc.root()).unwrap();
        assert_eq!(rows.len(), 2);

        let date = Date::new(CleanText::new(TableCell::new(["date"]))).dayfirst();
        let amount = CleanDecimal::new(TableCell::new(["amount"]));
        let kind = CleanText::new(TableCell::new(["Libellé"]));

        let ctx = rows[1].context();
        let d: NaiveDate = date.extract(&ctx).unwrap();
        let a: Decimal = amount.extract(&ctx).unwrap();
        let k: String = kind.extract(&ctx).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 2, 3).unwrap());
        assert_eq!(a, "2500.00".parse::<Decimal>().unwrap());
        assert_eq!(k, "VIR");
    }

    #[test]
    fn test_missing_column() {
        let doc = parse_html(HTML).unwrap();
        let rows = table().rows(&doc.root()).unwrap();
        let ctx = rows[0].context();

        let err = TableCell::new(["balance", "Solde"]).apply(&ctx).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(ref n) if n == "balance or Solde"));

        let v = TableCell::new(["balance"])
            .default(Value::NotAvailable)
            .apply(&ctx)
            .unwrap();
        assert!(v.is_not_available());

        let node = rows[0].node().clone();
        let err = TableCell::new(["date"]).apply(&Context::new(&node)).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(_)));
    }
}
