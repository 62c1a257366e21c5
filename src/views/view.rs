//! Tabular view model.
//!
//! A [`View`] is a titled table: ordered columns, rows aligned with those
//! columns, an optional sort key and a separation flag. Cells may carry a
//! presentation hint that renderers are free to drop.

/// Presentation hint attached to a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    /// Render in bold on terminals.
    Bold,
}

/// One table cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    /// Cell text.
    pub text: String,
    /// Optional presentation hint.
    pub style: Option<CellStyle>,
}

/// A titled table ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    /// Title printed above the table.
    pub title: String,
    /// Column names, in display order.
    pub columns: Vec<String>,
    /// Rows; each row has one cell per column.
    pub rows: Vec<Vec<Cell>>,
    /// Column to sort rows by, ascending.
    pub sort_key: Option<String>,
    /// Whether the view is set apart from the next one.
    pub separate: bool,
}

impl Cell {
    /// Creates an unstyled cell.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }

    /// Creates a cell from an optional value; absent renders empty.
    #[must_use]
    pub fn optional(text: Option<&str>) -> Self {
        Self::new(text.unwrap_or_default())
    }

    /// Attaches the bold hint.
    #[must_use]
    pub const fn bold(mut self) -> Self {
        self.style = Some(CellStyle::Bold);
        self
    }

    /// True when the cell carries the bold hint.
    #[must_use]
    pub fn is_bold(&self) -> bool {
        self.style == Some(CellStyle::Bold)
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl View {
    /// Creates an empty view.
    #[must_use]
    pub fn new(title: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            title: title.into(),
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            rows: Vec::new(),
            sort_key: None,
            separate: false,
        }
    }

    /// Sets the sort key.
    #[must_use]
    pub fn sorted_by(mut self, column: impl Into<String>) -> Self {
        self.sort_key = Some(column.into());
        self
    }

    /// Marks the view as set apart from the next one.
    #[must_use]
    pub const fn separated(mut self) -> Self {
        self.separate = true;
        self
    }

    /// Appends a row, padding or trimming it to the column count.
    pub fn push_row(&mut self, cells: impl IntoIterator<Item = Cell>) {
        let mut row: Vec<Cell> = cells.into_iter().collect();
        debug_assert_eq!(row.len(), self.columns.len(), "row width for {}", self.title);
        row.resize_with(self.columns.len(), Cell::default);
        self.rows.push(row);
    }

    /// Position of a column by name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` in the named column, in insertion order.
    #[must_use]
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(index))
    }

    /// Rows in display order.
    ///
    /// With a sort key naming one of the columns, rows are stably sorted by
    /// that column's text; otherwise insertion order is kept.
    #[must_use]
    pub fn sorted_rows(&self) -> Vec<&[Cell]> {
        let mut rows: Vec<&[Cell]> = self.rows.iter().map(Vec::as_slice).collect();
        if let Some(index) = self.sort_key.as_deref().and_then(|key| self.column_index(key)) {
            rows.sort_by(|a, b| a[index].text.cmp(&b[index].text));
        }
        rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the view has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(view: &View) -> Vec<&str> {
        view.sorted_rows()
            .into_iter()
            .map(|row| row[0].text.as_str())
            .collect()
    }

    #[test]
    fn test_stable_sort_on_key() {
        let mut view = View::new("Resources", &["Name", "Type"]).sorted_by("Type");
        view.push_row([Cell::new("b"), Cell::new("Z::A")]);
        view.push_row([Cell::new("a"), Cell::new("Y::B")]);
        view.push_row([Cell::new("c"), Cell::new("Y::B")]);

        assert_eq!(names(&view), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_unknown_sort_key_keeps_order() {
        let mut view = View::new("Outputs", &["Name", "Value"]).sorted_by("Type");
        view.push_row([Cell::new("z"), Cell::new("1")]);
        view.push_row([Cell::new("a"), Cell::new("2")]);

        assert_eq!(names(&view), vec!["z", "a"]);
    }

    #[test]
    fn test_cell_lookup_by_column() {
        let mut view = View::new("Parameters", &["Name", "Actual value"]);
        view.push_row([Cell::new("k"), Cell::new("v")]);

        assert_eq!(view.cell(0, "Actual value").map(|c| c.text.as_str()), Some("v"));
        assert!(view.cell(0, "Resolved value").is_none());
        assert!(view.cell(1, "Name").is_none());
    }

    #[test]
    fn test_optional_cell_is_empty_not_null() {
        assert_eq!(Cell::optional(None).text, "");
        assert_eq!(Cell::optional(Some("x")).text, "x");
    }
}
