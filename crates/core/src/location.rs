//! Location resolution types.
//!
//! The extractor's free-text reply is converted into a [`LocationResolution`]
//! at the boundary; nothing downstream ever sees the raw marker strings.

use serde::{Deserialize, Serialize};

/// Marker the extraction prompt asks the model to return for "my location".
pub const CURRENT_LOCATION_MARKER: &str = "current_location";

/// Marker the extraction prompt asks the model to return when nothing matches.
pub const NO_LOCATION_MARKER: &str = "None";

/// Label used in the context line when the weather came from caller coordinates.
pub const CALLER_LOCATION_LABEL: &str = "your location";

/// Caller-supplied position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both halves must be present; a lone latitude or longitude is ignored.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Some(Self::new(lat, lon)),
            _ => None,
        }
    }

    /// `"lat,lon"` with no spaces. Integral values keep a trailing `.0`
    /// (`-74.0`, never `-74`).
    pub fn query_string(&self) -> String {
        format!("{:?},{:?}", self.latitude, self.longitude)
    }
}

/// What the extractor found in the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationResolution {
    /// A place name stated in the query.
    Explicit(String),
    /// The query refers to where the caller is.
    UseCallerCoordinates,
    /// No location mentioned (or extraction failed).
    None,
}

impl LocationResolution {
    /// Normalize a model reply into a resolution.
    ///
    /// Trims whitespace, drops double quotes, strips surrounding single quotes
    /// and backticks. `none` (any case) and empty replies map to `None`;
    /// `current_location` / `current location` (any case) map to
    /// `UseCallerCoordinates`.
    pub fn from_model_reply(reply: &str) -> Self {
        let without_quotes = reply.replace('"', "");
        let cleaned = without_quotes
            .trim()
            .trim_matches(|c| c == '\'' || c == '`')
            .trim();

        if cleaned.is_empty() || cleaned.eq_ignore_ascii_case(NO_LOCATION_MARKER) {
            return Self::None;
        }

        if is_current_location_marker(cleaned) {
            return Self::UseCallerCoordinates;
        }

        Self::Explicit(cleaned.to_string())
    }
}

fn is_current_location_marker(s: &str) -> bool {
    s.eq_ignore_ascii_case(CURRENT_LOCATION_MARKER) || s.eq_ignore_ascii_case("current location")
}

/// The location actually used to query weather and to label the context line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveLocation {
    /// Passed verbatim to the weather source.
    pub query: String,
    /// Shown to the model in the context line.
    pub display_name: String,
}

impl EffectiveLocation {
    /// Decide which location drives the weather lookup.
    ///
    /// An explicit mention always wins; caller coordinates are the fallback;
    /// otherwise there is no effective location and weather is skipped.
    pub fn resolve(resolution: &LocationResolution, coordinates: Option<Coordinates>) -> Option<Self> {
        match resolution {
            LocationResolution::Explicit(name)
                if !name.trim().is_empty() && !is_current_location_marker(name.trim()) =>
            {
                Some(Self {
                    query: name.clone(),
                    display_name: name.clone(),
                })
            }
            _ => coordinates.map(|c| Self {
                query: c.query_string(),
                display_name: CALLER_LOCATION_LABEL.to_string(),
            }),
        }
    }
}
