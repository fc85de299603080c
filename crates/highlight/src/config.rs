use serde::{Deserialize, Serialize};

/// HTML rendering options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Width of a tab character, in columns
    pub tab_width: usize,

    /// Emit the line-number column
    pub line_numbers: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            tab_width: 3,
            line_numbers: true,
        }
    }
}

impl RenderOptions {
    pub fn validate(&self) -> Result<(), String> {
        if self.tab_width == 0 || self.tab_width > 16 {
            return Err(format!(
                "tab_width must be within 1..=16, got {}",
                self.tab_width
            ));
        }
        Ok(())
    }
}

/// Options of a markup pass over many goroutines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupOptions {
    /// Maximum number of goroutines to highlight (0 = all)
    pub limit: usize,

    /// Context lines around each call line; negative disables highlighting
    pub wrap_size: i32,
}

impl MarkupOptions {
    pub fn new(limit: usize, wrap_size: i32) -> Self {
        Self { limit, wrap_size }
    }

    pub fn is_disabled(&self) -> bool {
        self.wrap_size < 0
    }
}
