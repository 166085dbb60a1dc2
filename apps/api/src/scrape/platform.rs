use std::fmt;

use serde::{Deserialize, Serialize};

/// Job board a posting URL belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linkedin,
    Glints,
    Jobstreet,
    Kalibrr,
    #[default]
    Other,
}

/// Ordered markers; the first substring found in the URL decides the platform.
const MARKERS: &[(&str, Platform)] = &[
    ("linkedin", Platform::Linkedin),
    ("glints", Platform::Glints),
    ("jobstreet", Platform::Jobstreet),
    ("kalibrr", Platform::Kalibrr),
];

impl Platform {
    /// Classifies a URL by case-sensitive substring containment. Never fails.
    pub fn detect(url: &str) -> Self {
        MARKERS
            .iter()
            .find(|(marker, _)| url.contains(marker))
            .map(|(_, platform)| *platform)
            .unwrap_or(Platform::Other)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Linkedin => "linkedin",
            Platform::Glints => "glints",
            Platform::Jobstreet => "jobstreet",
            Platform::Kalibrr => "kalibrr",
            Platform::Other => "other",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
