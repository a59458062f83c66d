//! Per-call rendering configuration
//!
//! Every report call takes a [`RenderConfig`]; nothing about how tables are
//! rendered is stored globally, so two reports rendered at the same time
//! cannot affect each other.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Entity pages on OpenPrescribing, one per measure and organisation type
pub const OPENPRESCRIBING_MEASURE_LINK: &str =
    "https://openprescribing.net/measure/{measure}/{entity_type}/{code}/";

const PLACEHOLDERS: [&str; 4] = ["measure", "entity_type", "code", "name"];

/// Values substituted into a [`LinkTemplate`]
#[derive(Debug, Clone, Copy)]
pub struct LinkFields<'a> {
    pub measure: &'a str,
    pub entity_type: &'a str,
    pub code: &'a str,
    pub name: &'a str,
}

/// URL template with `{measure}`, `{entity_type}`, `{code}` and `{name}` placeholders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkTemplate(String);

impl LinkTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = Self(template.into());
        template.validate()?;
        Ok(template)
    }

    /// Link to an entity's measure page on OpenPrescribing
    pub fn openprescribing() -> Self {
        Self(OPENPRESCRIBING_MEASURE_LINK.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn validate(&self) -> Result<()> {
        let mut rest = self.0.as_str();
        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| Error::InvalidTemplate(format!("unclosed '{{' in {}", self.0)))?;
            let name = &after[..close];
            if !PLACEHOLDERS.contains(&name) {
                return Err(Error::InvalidTemplate(format!(
                    "unknown placeholder {{{name}}} in {}",
                    self.0
                )));
            }
            rest = &after[close + 1..];
        }
        Ok(())
    }

    /// Substitute the fields, each percent-encoded
    pub fn render(&self, fields: &LinkFields<'_>) -> String {
        self.0
            .replace("{measure}", &urlencoding::encode(fields.measure))
            .replace("{entity_type}", &urlencoding::encode(fields.entity_type))
            .replace("{code}", &urlencoding::encode(fields.code))
            .replace("{name}", &urlencoding::encode(fields.name))
    }
}

/// Column headings of the rendered tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnTitles {
    pub entity: String,
    pub change_month: String,
    pub proportional_change: String,
    pub artifact: String,
}

impl Default for ColumnTitles {
    fn default() -> Self {
        Self {
            entity: "Name".to_string(),
            change_month: "Month when change detected".to_string(),
            proportional_change: "Measured proportional change".to_string(),
            artifact: "Plot".to_string(),
        }
    }
}

/// How report tables are rendered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Decimal places for numeric cells
    pub decimals: usize,
    /// Escape HTML in cell text. Off by default so rendered artifacts embed.
    pub escape: bool,
    /// Replacement for newlines inside cells; `None` leaves them as is
    pub line_break: Option<String>,
    pub titles: ColumnTitles,
    /// Hyperlink for each entity's label
    pub link: Option<LinkTemplate>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            decimals: 2,
            escape: false,
            line_break: Some("<br/>".to_string()),
            titles: ColumnTitles::default(),
            link: None,
        }
    }
}

impl RenderConfig {
    pub fn with_link(mut self, link: LinkTemplate) -> Self {
        self.link = Some(link);
        self
    }

    pub fn with_decimals(mut self, decimals: usize) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_escape(mut self, escape: bool) -> Self {
        self.escape = escape;
        self
    }

    pub fn validate(&self) -> Result<()> {
        match &self.link {
            Some(link) => link.validate(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openprescribing_link() {
        let link = LinkTemplate::openprescribing().render(&LinkFields {
            measure: "doacs",
            entity_type: "ccg",
            code: "00C",
            name: "NHS DARLINGTON CCG",
        });
        assert_eq!(link, "https://openprescribing.net/measure/doacs/ccg/00C/");
    }

    #[test]
    fn test_link_fields_are_percent_encoded() {
        let link = LinkTemplate::new("https://example.org/{code}?n={name}")
            .unwrap()
            .render(&LinkFields {
                measure: "doacs",
                entity_type: "ccg",
                code: "A/1",
                name: "Smith & Jones",
            });
        assert_eq!(link, "https://example.org/A%2F1?n=Smith%20%26%20Jones");
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: RenderConfig = serde_json::from_str(
            r#"{"decimals": 3, "link": "https://openprescribing.net/measure/{measure}/{entity_type}/{code}/"}"#,
        )
        .unwrap();
        assert_eq!(config.decimals, 3);
        assert_eq!(config.link, Some(LinkTemplate::openprescribing()));
        assert_eq!(config.titles, ColumnTitles::default());
        assert!(config.validate().is_ok());

        let bad: RenderConfig = serde_json::from_str(r#"{"link": "https://example.org/{org}"}"#).unwrap();
        assert!(matches!(bad.validate(), Err(Error::InvalidTemplate(_))));
    }

    #[test]
    fn test_template_validation() {
        assert!(LinkTemplate::new("https://example.org/{code}?n={name}").is_ok());
        assert!(matches!(
            LinkTemplate::new("https://example.org/{org}"),
            Err(Error::InvalidTemplate(_))
        ));
        assert!(LinkTemplate::new("https://example.org/{code").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.decimals, 2);
        assert!(!config.escape);
        assert_eq!(config.line_break.as_deref(), Some("<br/>"));
        assert_eq!(config.titles.change_month, "Month when change detected");
        assert!(config.validate().is_ok());
    }
}
