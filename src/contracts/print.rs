//! Printing

use serde::{Deserialize, Serialize};

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// Taller than wide
    #[default]
    Portrait,
    /// Wider than tall
    Landscape,
}

/// Page layout for a print job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintFormat {
    /// Page orientation
    pub orientation: Orientation,
    /// Number of copies
    pub copies: u32,
    /// Margins in millimetres
    pub margin_mm: f32,
}

impl Default for PrintFormat {
    fn default() -> Self {
        Self {
            orientation: Orientation::Portrait,
            copies: 1,
            margin_mm: 10.0,
        }
    }
}

/// Sends formatted text to a printer
///
/// `printer: None` selects the first available printer and
/// `format: None` keeps the printer's own page setup.
pub trait PrintHandler: Send + Sync {
    /// Print `text`; `true` when the job was accepted
    fn print(&self, text: &str, printer: Option<&str>, format: Option<&PrintFormat>) -> bool;

    /// Open a viewer showing how `text` would print
    fn show_print_preview(&self, text: &str) -> bool;

    /// Print on the default printer with its own page setup
    fn print_default(&self, text: &str) -> bool {
        self.print(text, None, None)
    }

    /// Print on a named printer
    fn print_to(&self, text: &str, printer: &str) -> bool {
        self.print(text, Some(printer), None)
    }

    /// Print on the default printer with a custom page format
    fn print_formatted(&self, text: &str, format: &PrintFormat) -> bool {
        self.print(text, None, Some(format))
    }
}
