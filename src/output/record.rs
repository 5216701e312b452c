//! The structured result of parsing one item's detail page

/// Column labels, in row order
pub const FIELD_LABELS: [&str; 9] = [
    "Title", "Province", "City", "Industry", "Overview", "Progress", "Team", "Patent", "URL",
];

/// Fields extracted from one detail page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    pub title: String,
    pub province: String,
    pub city: String,
    pub industry: String,
    pub overview: String,
    pub progress: String,
    pub team: String,
    pub patent: String,
    pub source_url: String,
}

impl Record {
    /// Returns a copy with every field stripped of surrounding whitespace
    pub fn trimmed(self) -> Self {
        let trim = |value: String| value.trim().to_string();
        Self {
            title: trim(self.title),
            province: trim(self.province),
            city: trim(self.city),
            industry: trim(self.industry),
            overview: trim(self.overview),
            progress: trim(self.progress),
            team: trim(self.team),
            patent: trim(self.patent),
            source_url: trim(self.source_url),
        }
    }

    /// Field values in the same order as [`FIELD_LABELS`]
    pub fn values(&self) -> [&str; 9] {
        [
            &self.title,
            &self.province,
            &self.city,
            &self.industry,
            &self.overview,
            &self.progress,
            &self.team,
            &self.patent,
            &self.source_url,
        ]
    }

    /// Human-readable rendering used for mirror files
    ///
    /// Labels and values alternate, all separated by a blank line.
    pub fn to_mirror_text(&self) -> String {
        FIELD_LABELS
            .iter()
            .zip(self.values())
            .flat_map(|(label, value)| [*label, value])
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
