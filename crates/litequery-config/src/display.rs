use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};

/// Display settings for query results printed by the CLI
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct DisplaySettings {
    /// Text shown for NULL cells in table output
    /// Default: "NULL"
    pub null_text: Option<String>,

    /// Truncate cell text longer than this many characters (0 disables)
    /// Default: 0
    pub max_cell_width: Option<usize>,

    /// Table border style: "rounded", "ascii" or "blank"
    /// Default: "rounded"
    pub table_style: Option<TableStyle>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TableStyle {
    /// Unicode box drawing with rounded corners
    #[default]
    Rounded,
    /// Plain ASCII borders
    Ascii,
    /// Columns separated by whitespace only
    Blank,
}

impl DisplaySettings {
    pub fn null_text(&self) -> &str {
        self.null_text.as_deref().unwrap_or("NULL")
    }

    pub fn max_cell_width(&self) -> Option<usize> {
        self.max_cell_width.filter(|w| *w > 0)
    }

    pub fn table_style(&self) -> TableStyle {
        self.table_style.unwrap_or_default()
    }
}
