//! Box-drawn tables.

use console::measure_text_width;

/// Column alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Right,
}

/// A table with a header row, sized to its widest cells.
#[derive(Debug)]
pub struct Table {
    headers: Vec<String>,
    align: Vec<Align>,
    rows: Vec<Vec<String>>,
    column_widths: Vec<usize>,
}

impl Table {
    pub fn new(headers: Vec<&str>) -> Self {
        let headers: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
        let column_widths = headers.iter().map(|h| measure_text_width(h)).collect();

        Self {
            align: vec![Align::Left; headers.len()],
            headers,
            rows: Vec::new(),
            column_widths,
        }
    }

    /// Right-align column `index` (numbers, sizes).
    pub fn align_right(mut self, index: usize) -> Self {
        if let Some(align) = self.align.get_mut(index) {
            *align = Align::Right;
        }
        self
    }

    /// Add a row. Cells may carry ANSI styling; width ignores escape codes.
    pub fn add_row<S: AsRef<str>>(&mut self, row: &[S]) {
        let row: Vec<String> = row.iter().map(|s| s.as_ref().to_string()).collect();

        for (width, cell) in self.column_widths.iter_mut().zip(&row) {
            *width = (*width).max(measure_text_width(cell));
        }

        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 4);
        lines.push(self.render_border('┌', '┬', '┐'));
        lines.push(self.render_row(&self.headers));
        lines.push(self.render_border('├', '┼', '┤'));
        lines.extend(self.rows.iter().map(|row| self.render_row(row)));
        lines.push(self.render_border('└', '┴', '┘'));
        lines.join("\n")
    }

    fn render_border(&self, left: char, mid: char, right: char) -> String {
        let segments: Vec<String> = self
            .column_widths
            .iter()
            .map(|width| "─".repeat(width + 2))
            .collect();
        format!("{}{}{}", left, segments.join(&mid.to_string()), right)
    }

    fn render_row(&self, row: &[String]) -> String {
        let mut s = String::from("│");

        for (i, width) in self.column_widths.iter().enumerate() {
            let cell = row.get(i).map(|s| s.as_str()).unwrap_or("");
            let pad = " ".repeat(width.saturating_sub(measure_text_width(cell)));
            match self.align[i] {
                Align::Left => s.push_str(&format!(" {}{} │", cell, pad)),
                Align::Right => s.push_str(&format!(" {}{} │", pad, cell)),
            }
        }

        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_renders_headers() {
        let table = Table::new(vec!["Id", "Category"]);
        assert!(table.is_empty());
        let output = table.render();
        assert!(output.contains("Id"));
        assert!(output.contains("Category"));
    }

    #[test]
    fn renders_exact_layout() {
        let mut table = Table::new(vec!["Component", "Size"]).align_right(1);
        table.add_row(&["git", "45 MB"]);
        table.add_row(&["nodejs-18", "90 MB"]);

        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.render(),
            "┌───────────┬───────┐\n\
             │ Component │  Size │\n\
             ├───────────┼───────┤\n\
             │ git       │ 45 MB │\n\
             │ nodejs-18 │ 90 MB │\n\
             └───────────┴───────┘"
        );
    }

    #[test]
    fn missing_cells_render_blank() {
        let mut table = Table::new(vec!["A", "B", "C"]);
        table.add_row(&["only", "two"]);
        let output = table.render();
        assert!(output.contains("│ only │ two │   │"));
    }

    #[test]
    fn styled_cells_do_not_skew_widths() {
        let styled = console::Style::new().red().force_styling(true).apply_to("ok").to_string();
        let mut table = Table::new(vec!["Status"]);
        table.add_row(&[styled.as_str()]);

        let output = table.render();
        let border = output.lines().next().unwrap();
        assert_eq!(border, "┌────────┐");
    }
}
