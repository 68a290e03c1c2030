use super::html::escape;

/// A simple HTML table builder for the raw data panels
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a new table with the given headers
    pub fn new(headers: Vec<&str>) -> Self {
        let headers = headers.iter().map(|h| h.to_string()).collect();
        Table {
            headers,
            rows: Vec::new(),
        }
    }

    /// Add a row to the table. Cells beyond the header count are dropped,
    /// missing cells render empty.
    pub fn add_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Render the table as an HTML fragment, all cells escaped
    pub fn render(&self) -> String {
        let mut output = String::from("<table>\n<thead>");
        output.push_str(&Self::render_row(&self.headers, "th"));
        output.push_str("</thead>\n<tbody>\n");

        for row in &self.rows {
            output.push_str(&Self::render_row(row, "td"));
            output.push('\n');
        }

        output.push_str("</tbody>\n</table>");
        output
    }

    /// Render a single row
    fn render_row(row: &[String], cell: &str) -> String {
        let mut line = String::from("<tr>");
        for col in row {
            line.push_str(&format!("<{cell}>{}</{cell}>", escape(col), cell = cell));
        }
        line.push_str("</tr>");
        line
    }
}
