//! Generic searchable, paginated table model shared by every entity list.
//!
//! The list receives records already narrowed by the page's business
//! filters and applies only free-text search and paging on top. It never
//! mutates storage: add, edit and delete come back to the caller as
//! [`ListAction`] values, and delete needs an explicit confirmation first.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;

use crate::models::Entity;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Emphasis hint attached to a rendered cell; front ends map it to colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Plain,
    Strong,
    Muted,
    Good,
    Info,
    Warn,
    Bad,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub tone: Tone,
}

impl Rendered {
    pub fn new(text: impl Into<String>, tone: Tone) -> Rendered {
        Rendered { text: text.into(), tone }
    }

    pub fn plain(text: impl Into<String>) -> Rendered {
        Rendered::new(text, Tone::Plain)
    }

    /// Empty values show as `-`.
    pub fn or_dash(text: &str, tone: Tone) -> Rendered {
        if text.trim().is_empty() {
            Rendered::new("-", tone)
        } else {
            Rendered::new(text, tone)
        }
    }
}

pub type Renderer<E> = fn(&E) -> Rendered;

/// A table column: header label, JSON field name, optional custom renderer.
pub struct Column<E> {
    pub header: &'static str,
    pub accessor: &'static str,
    pub render: Option<Renderer<E>>,
}

impl<E> Column<E> {
    pub fn new(header: &'static str, accessor: &'static str) -> Column<E> {
        Column { header, accessor, render: None }
    }

    pub fn rendered(header: &'static str, accessor: &'static str, render: Renderer<E>) -> Column<E> {
        Column { header, accessor, render: Some(render) }
    }
}

/// Requests the list hands back to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    Add,
    Edit(u64),
    Delete(u64),
    ResetFilters,
}

/// String form of a JSON value as a browser would print it.
fn search_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(search_text).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

fn display_text(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => "-".into(),
        Some(Value::Array(items)) => items.iter().map(search_text).collect::<Vec<_>>().join(", "),
        Some(v) => search_text(v),
    }
}

/// Case-insensitive contains-match of `needle` against every field of `record`.
pub fn record_matches<E: Serialize>(record: &E, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    if needle.is_empty() {
        return true;
    }
    match serde_json::to_value(record) {
        Ok(Value::Object(fields)) => fields
            .values()
            .any(|v| search_text(v).to_lowercase().contains(&needle)),
        Ok(other) => search_text(&other).to_lowercase().contains(&needle),
        Err(_) => false,
    }
}

pub struct ListView<E: Entity> {
    pub title: String,
    pub subtitle: Option<String>,
    columns: Vec<Column<E>>,
    records: Vec<E>,
    search: String,
    page: usize,
    page_size: usize,
    pending_delete: Option<u64>,
}

impl<E: Entity> ListView<E> {
    pub fn new(title: impl Into<String>, columns: Vec<Column<E>>, records: Vec<E>) -> ListView<E> {
        ListView {
            title: title.into(),
            subtitle: None,
            columns,
            records,
            search: String::new(),
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            pending_delete: None,
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> ListView<E> {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> ListView<E> {
        self.page_size = page_size.max(1);
        self
    }

    /// Replaces the upstream-filtered records, keeping search and a valid page.
    pub fn set_records(&mut self, records: Vec<E>) {
        self.records = records;
        if let Some(id) = self.pending_delete {
            if !self.records.iter().any(|r| r.id() == id) {
                self.pending_delete = None;
            }
        }
        self.page = self.page.min(self.page_count() - 1);
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Changing the search text returns to the first page.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
        self.page = 0;
    }

    /// Records passing the search, in collection order.
    pub fn filtered(&self) -> Vec<&E> {
        self.records
            .iter()
            .filter(|r| record_matches(*r, &self.search))
            .collect()
    }

    pub fn total(&self) -> usize {
        self.filtered().len()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self) -> usize {
        self.total().div_ceil(self.page_size).max(1)
    }

    /// Current page, 1-based.
    pub fn page(&self) -> usize {
        self.page + 1
    }

    /// Jumps to a 1-based page, clamped to the available range.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.saturating_sub(1).min(self.page_count() - 1);
    }

    pub fn next_page(&mut self) -> bool {
        if self.page + 1 < self.page_count() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page > 0 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// The records on the current page.
    pub fn visible(&self) -> Vec<&E> {
        self.filtered()
            .into_iter()
            .skip(self.page * self.page_size)
            .take(self.page_size)
            .collect()
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.header).collect()
    }

    /// A column's cell for `record`; the custom renderer wins over the raw field.
    pub fn cell(&self, record: &E, column: &Column<E>) -> Rendered {
        if let Some(render) = column.render {
            return render(record);
        }
        let value = serde_json::to_value(record).ok();
        let field = value.as_ref().and_then(|v| v.get(column.accessor));
        Rendered::plain(display_text(field))
    }

    /// Id and cells of each visible row.
    pub fn rows(&self) -> Vec<(u64, Vec<Rendered>)> {
        self.visible()
            .into_iter()
            .map(|r| (r.id(), self.columns.iter().map(|c| self.cell(r, c)).collect()))
            .collect()
    }

    pub fn request_add(&self) -> ListAction {
        ListAction::Add
    }

    pub fn request_edit(&self, id: u64) -> Option<ListAction> {
        self.records.iter().any(|r| r.id() == id).then_some(ListAction::Edit(id))
    }

    /// First step of a delete: arms the confirmation for `id`. Deletes nothing.
    pub fn request_delete(&mut self, id: u64) -> bool {
        if self.records.iter().any(|r| r.id() == id) {
            self.pending_delete = Some(id);
            true
        } else {
            false
        }
    }

    pub fn pending_delete(&self) -> Option<u64> {
        self.pending_delete
    }

    /// Second step: yields the delete only when confirmed. Either answer disarms.
    pub fn confirm_delete(&mut self, confirmed: bool) -> Option<ListAction> {
        let id = self.pending_delete.take()?;
        confirmed.then_some(ListAction::Delete(id))
    }

    /// Clears the search; the owner clears its own filters on `ResetFilters`.
    pub fn reset(&mut self) -> ListAction {
        self.search.clear();
        self.page = 0;
        ListAction::ResetFilters
    }

    pub fn footer(&self) -> String {
        format!(
            "Showing {} entries | Page {} of {}",
            self.total(),
            self.page(),
            self.page_count()
        )
    }

    /// Renders the current page as a terminal table.
    pub fn to_table(&self) -> Table {
        let mut header = vec![Cell::new("ID").add_attribute(Attribute::Bold)];
        header.extend(self.headers().into_iter().map(|h| Cell::new(h).add_attribute(Attribute::Bold)));

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(header);

        for (id, cells) in self.rows() {
            let mut row = vec![Cell::new(id)];
            row.extend(cells.into_iter().map(table_cell));
            table.add_row(row);
        }
        table
    }
}

fn table_cell(r: Rendered) -> Cell {
    let cell = Cell::new(r.text);
    match r.tone {
        Tone::Plain => cell,
        Tone::Strong => cell.add_attribute(Attribute::Bold),
        Tone::Muted => cell.fg(Color::Grey),
        Tone::Good => cell.fg(Color::Green),
        Tone::Info => cell.fg(Color::Blue),
        Tone::Warn => cell.fg(Color::Yellow),
        Tone::Bad => cell.fg(Color::Red),
    }
}
