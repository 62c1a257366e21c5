//! JSON renderer for scripting.
//!
//! Views are written as one array; style hints are dropped.

use serde::Serialize;
use std::io::Write;

use crate::error::{RenderError, Result};
use crate::views::View;

use super::ViewRenderer;

#[derive(Serialize)]
struct JsonView<'a> {
    title: &'a str,
    columns: &'a [String],
    rows: Vec<Vec<&'a str>>,
}

impl<'a> From<&'a View> for JsonView<'a> {
    fn from(view: &'a View) -> Self {
        Self {
            title: &view.title,
            columns: &view.columns,
            rows: view
                .sorted_rows()
                .into_iter()
                .map(|row| row.iter().map(|cell| cell.text.as_str()).collect())
                .collect(),
        }
    }
}

/// Writes views as a JSON array of `{title, columns, rows}` objects.
#[derive(Debug)]
pub struct JsonRenderer<W: Write> {
    writer: W,
    views: Vec<View>,
}

impl<W: Write> JsonRenderer<W> {
    /// Creates a renderer writing to `writer`.
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            views: Vec::new(),
        }
    }
}

impl<W: Write> ViewRenderer for JsonRenderer<W> {
    type Output = W;

    fn append(&mut self, view: View) {
        self.views.push(view);
    }

    fn flush(mut self) -> Result<W> {
        let views: Vec<JsonView<'_>> = self.views.iter().map(JsonView::from).collect();
        serde_json::to_writer_pretty(&mut self.writer, &views).map_err(|e| {
            if e.is_io() {
                RenderError::Write(e.into())
            } else {
                RenderError::Serialize {
                    message: e.to_string(),
                }
            }
        })?;
        writeln!(self.writer).map_err(RenderError::Write)?;
        self.writer.flush().map_err(RenderError::Write)?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StacklensError;
    use crate::views::Cell;
    use serde_json::{json, Value};
    use std::io;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_views_as_sorted_json_rows() {
        let mut view = View::new("Conditions", &["Name", "Active"]).sorted_by("Name");
        view.push_row([Cell::new("beta"), Cell::new("false")]);
        view.push_row([Cell::new("Alpha").bold(), Cell::new("true")]);

        let mut renderer = JsonRenderer::new(Vec::new());
        renderer.append(view);
        let bytes = renderer.flush().expect("render to memory");
        let value: Value = serde_json::from_slice(&bytes).expect("valid json");

        assert_eq!(
            value,
            json!([{
                "title": "Conditions",
                "columns": ["Name", "Active"],
                "rows": [["Alpha", "true"], ["beta", "false"]]
            }])
        );
    }

    #[test]
    fn test_no_views_is_empty_array() {
        let bytes = JsonRenderer::new(Vec::new()).flush().expect("render to memory");
        assert_eq!(String::from_utf8(bytes).expect("utf-8"), "[]\n");
    }

    #[test]
    fn test_closed_writer_is_write_error_not_serialize() {
        let mut renderer = JsonRenderer::new(ClosedPipe);
        renderer.append(View::new("Outputs", &["Name", "Value"]));

        assert!(matches!(
            renderer.flush(),
            Err(StacklensError::Render(RenderError::Write(_)))
        ));
    }
}
