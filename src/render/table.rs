//! Terminal table renderer built on `tabled`.

use colored::Colorize;
use std::io::Write;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::Table;
use tracing::debug;

use crate::config::{TableSettings, TableStyle};
use crate::error::{RenderError, Result};
use crate::views::{Cell, View};

use super::{truncate, ViewRenderer};

/// How tables are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOptions {
    /// Border style.
    pub style: TableStyle,
    /// Maximum characters per cell; `0` disables truncation.
    pub max_column_width: usize,
    /// Whether cell style hints are turned into terminal escapes.
    pub decorate: bool,
}

impl TableOptions {
    /// Options from settings, decorating only when asked to.
    #[must_use]
    pub const fn from_settings(settings: &TableSettings, decorate: bool) -> Self {
        Self {
            style: settings.style,
            max_column_width: settings.max_column_width,
            decorate,
        }
    }
}

impl Default for TableOptions {
    fn default() -> Self {
        Self::from_settings(&TableSettings::default(), false)
    }
}

/// Writes views as titled tables.
#[derive(Debug)]
pub struct TableRenderer<W: Write> {
    writer: W,
    options: TableOptions,
    views: Vec<View>,
}

impl<W: Write> TableRenderer<W> {
    /// Creates a renderer writing to `writer`.
    pub const fn new(writer: W, options: TableOptions) -> Self {
        Self {
            writer,
            options,
            views: Vec::new(),
        }
    }

    fn cell_text(&self, cell: &Cell) -> String {
        let text = truncate(&cell.text, self.options.max_column_width);
        if self.options.decorate && cell.is_bold() {
            text.bold().to_string()
        } else {
            text
        }
    }

    fn build_table(&self, view: &View) -> Table {
        let mut builder = Builder::default();
        builder.push_record(view.columns.iter().cloned());
        for row in view.sorted_rows() {
            builder.push_record(row.iter().map(|cell| self.cell_text(cell)));
        }

        let mut table = builder.build();
        apply_style(&mut table, self.options.style);
        table
    }

    fn write_view(&mut self, view: &View) -> std::io::Result<()> {
        let table = self.build_table(view);
        writeln!(self.writer, "{}", view.title)?;
        writeln!(self.writer, "{table}")?;
        if view.separate {
            writeln!(self.writer)?;
        }
        Ok(())
    }
}

impl<W: Write> ViewRenderer for TableRenderer<W> {
    type Output = W;

    fn append(&mut self, view: View) {
        self.views.push(view);
    }

    fn flush(mut self) -> Result<W> {
        let views = std::mem::take(&mut self.views);
        debug!("Rendering {} table(s)", views.len());
        for view in &views {
            self.write_view(view).map_err(RenderError::Write)?;
        }
        self.writer.flush().map_err(RenderError::Write)?;
        Ok(self.writer)
    }
}

fn apply_style(table: &mut Table, style: TableStyle) {
    match style {
        TableStyle::Ascii => table.with(Style::ascii()),
        TableStyle::AsciiRounded => table.with(Style::ascii_rounded()),
        TableStyle::Blank => table.with(Style::blank()),
        TableStyle::Dots => table.with(Style::dots()),
        TableStyle::Empty => table.with(Style::empty()),
        TableStyle::Extended => table.with(Style::extended()),
        TableStyle::Markdown => table.with(Style::markdown()),
        TableStyle::Modern => table.with(Style::modern()),
        TableStyle::Psql => table.with(Style::psql()),
        TableStyle::ReStructuredText => table.with(Style::re_structured_text()),
        TableStyle::Rounded => table.with(Style::rounded()),
        TableStyle::Sharp => table.with(Style::sharp()),
    };
}
