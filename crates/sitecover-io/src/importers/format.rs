//! Format detection for point layers.

use std::path::Path;

/// Supported point-layer formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Delimited text with `x`/`y` columns
    Csv,
    /// GeoJSON FeatureCollection of Point features
    GeoJson,
}

impl Format {
    /// All supported formats.
    pub const ALL: &'static [Format] = &[Format::Csv, Format::GeoJson];

    /// Expected file extensions for this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Format::Csv => &["csv"],
            Format::GeoJson => &["geojson", "json"],
        }
    }

    /// Human-readable format name.
    pub fn friendly_name(&self) -> &'static str {
        match self {
            Format::Csv => "CSV point table",
            Format::GeoJson => "GeoJSON FeatureCollection",
        }
    }

    /// Detect format from the file extension.
    pub fn detect(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.extensions().contains(&ext.as_str()))
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.friendly_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(Format::detect(Path::new("d/demand.csv")), Some(Format::Csv));
        assert_eq!(
            Format::detect(Path::new("supply.GeoJSON")),
            Some(Format::GeoJson)
        );
        assert_eq!(Format::detect(Path::new("x.json")), Some(Format::GeoJson));
        assert_eq!(Format::detect(Path::new("x.parquet")), None);
        assert_eq!(Format::detect(Path::new("noext")), None);
    }
}
