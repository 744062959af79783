//! Target domain model.
//!
//! A target is one source artifact under assessment. Targets are created once
//! when the catalog is built and shared read-only with every analyzer.

/// A source artifact whose content has been loaded into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Stable identifier (usually the path the source listed it under)
    pub id: String,
    /// Human-readable name used in reports
    pub display_name: String,
    /// Raw text content
    pub raw_content: String,
    /// Content size in bytes
    pub size_bytes: usize,
}

impl Target {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        raw_content: impl Into<String>,
    ) -> Self {
        let raw_content = raw_content.into();
        Self {
            id: id.into(),
            display_name: display_name.into(),
            size_bytes: raw_content.len(),
            raw_content,
        }
    }

    /// Number of lines in the content.
    pub fn line_count(&self) -> usize {
        self.raw_content.lines().count()
    }

    /// Lowercase file extension derived from the id, if any.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.id)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
    }
}
