//! Minimal HTML table output

use crate::RenderConfig;
use std::fmt::Write;

/// Escape text for use as element content
pub fn escape_html(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

fn replace_line_breaks(text: String, config: &RenderConfig) -> String {
    match &config.line_break {
        Some(br) => text.replace('\n', br),
        None => text,
    }
}

/// Cell text after the configured escaping and line-break replacement
pub fn format_cell(text: &str, config: &RenderConfig) -> String {
    let text = if config.escape {
        escape_html(text)
    } else {
        text.to_string()
    };
    replace_line_breaks(text, config)
}

/// Plain text such as names and codes: always escaped, whatever the config
/// says about artifact cells
pub fn format_text(text: &str, config: &RenderConfig) -> String {
    replace_line_breaks(escape_html(text), config)
}

/// Value for a double-quoted attribute such as `href`
pub fn escape_attribute(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

/// Number rounded to the configured decimals; undefined values print as `NaN`
pub fn format_number(value: f64, config: &RenderConfig) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.prec$}", value, prec = config.decimals)
    }
}

/// Header and body cells of a table, already formatted
#[derive(Debug, Clone, Default)]
pub struct HtmlTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl HtmlTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn render(&self) -> String {
        let mut html = String::from("<table border=\"1\" class=\"dataframe\">\n  <thead>\n    <tr style=\"text-align: right;\">\n");
        for header in &self.headers {
            let _ = writeln!(html, "      <th>{}</th>", escape_html(header));
        }
        html.push_str("    </tr>\n  </thead>\n  <tbody>\n");
        for row in &self.rows {
            html.push_str("    <tr>\n");
            for cell in row {
                let _ = writeln!(html, "      <td>{cell}</td>");
            }
            html.push_str("    </tr>\n");
        }
        html.push_str("  </tbody>\n</table>");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_and_line_breaks() {
        let config = RenderConfig::default();
        assert_eq!(format_cell("a\nb", &config), "a<br/>b");
        assert_eq!(format_cell("<img/>", &config), "<img/>");

        let escaped = RenderConfig::default().with_escape(true);
        assert_eq!(format_cell("<b>&\n", &escaped), "&lt;b&gt;&amp;<br/>");
    }

    #[test]
    fn test_text_is_escaped_regardless_of_config() {
        let config = RenderConfig::default();
        assert_eq!(
            format_text("Smith & Jones <Ltd>\nBranch", &config),
            "Smith &amp; Jones &lt;Ltd&gt;<br/>Branch"
        );
        assert_eq!(escape_attribute("a\"b&c"), "a&quot;b&amp;c");
    }

    #[test]
    fn test_format_number() {
        let config = RenderConfig::default();
        assert_eq!(format_number(0.456, &config), "0.46");
        assert_eq!(format_number(f64::NAN, &config), "NaN");
        assert_eq!(format_number(3.0, &config.clone().with_decimals(0)), "3");
    }

    #[test]
    fn test_table_layout() {
        let mut table = HtmlTable::new(vec!["Name".to_string(), "Plot".to_string()]);
        table.push_row(vec!["A".to_string(), "<svg/>".to_string()]);
        let html = table.render();
        assert!(html.starts_with("<table"));
        assert!(html.contains("<th>Name</th>"));
        assert!(html.contains("<td><svg/></td>"));
        assert!(html.ends_with("</table>"));
    }
}
