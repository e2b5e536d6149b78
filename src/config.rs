//! Per-call redaction configuration.
//!
//! A [`RedactionConfig`] describes one job: which regions to cover, which
//! text to find, whether to sweep images near the bottom of the page, and
//! how to obscure what was found. It can be built in code or read from a
//! JSON job file:
//!
//! ```json
//! {
//!   "regions": [
//!     { "rect": { "x": 0, "y": 0, "width": 1229, "height": 250 },
//!       "frame": { "width": 1229, "height": 2008 } }
//!   ],
//!   "text_patterns": [ { "text": "ORDER-1" } ],
//!   "bottom_image_threshold": 0.8,
//!   "mode": "destructive",
//!   "fill": { "r": 1, "g": 1, "b": 1 }
//! }
//! ```

use crate::error::{RedactorError, RedactorResult};
use crate::geometry::{flip_to_bottom_left, scale_rect, Origin, PageGeometry, Rect, ReferenceFrame};
use crate::locate::validate_threshold;
use crate::redaction::{Color, Mode};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// A rectangle authored against a reference page size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplicitRegion {
    pub rect: Rect,
    pub frame: ReferenceFrame,
    /// Origin the rectangle was measured from, inside `frame`.
    #[serde(default)]
    pub origin: Origin,
}

impl ExplicitRegion {
    pub fn new(rect: Rect, frame: ReferenceFrame) -> Self {
        Self {
            rect,
            frame,
            origin: Origin::BottomLeft,
        }
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn validate(&self) -> RedactorResult<()> {
        self.rect.validate()?;
        self.frame.validate()
    }

    /// The region in `page`'s bottom-left coordinates.
    pub fn resolve(&self, page: &PageGeometry) -> RedactorResult<Rect> {
        let native = flip_to_bottom_left(self.rect, self.frame.height, self.origin);
        scale_rect(&native, &self.frame, page)
    }
}

/// `x,y,w,h@W,H`; whitespace around the values is allowed.
static REGION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([^,@]+),([^,@]+),([^,@]+),([^,@]+)@([^,@]+),([^,@]+)\s*$")
        .expect("Valid region regex pattern")
});

impl FromStr for ExplicitRegion {
    type Err = RedactorError;

    /// Parses `x,y,w,h@W,H` (bottom-left origin).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = REGION_PATTERN.captures(s).ok_or_else(|| {
            RedactorError::config(
                "region",
                format!("'{}' must look like x,y,w,h@W,H", s),
            )
        })?;

        let mut values = [0.0; 6];
        for (value, group) in values.iter_mut().zip(captures.iter().skip(1)) {
            let text = group.map_or("", |m| m.as_str()).trim();
            *value = text
                .parse::<f64>()
                .map_err(|e| RedactorError::config("region", format!("'{}': {}", text, e)))?;
        }
        let [x, y, w, h, fw, fh] = values;
        Ok(Self::new(Rect::new(x, y, w, h)?, ReferenceFrame::new(fw, fh)?))
    }
}

/// Literal text to find.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPattern {
    pub text: String,
    #[serde(default = "default_case_sensitive")]
    pub case_sensitive: bool,
}

fn default_case_sensitive() -> bool {
    true
}

impl SearchPattern {
    /// A case-sensitive pattern.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            case_sensitive: true,
        }
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    pub fn validate(&self) -> RedactorResult<()> {
        if self.text.is_empty() {
            return Err(RedactorError::config(
                "text_patterns",
                "search pattern must not be empty",
            ));
        }
        Ok(())
    }
}

/// Everything one redaction call needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RedactionConfig {
    pub regions: Vec<ExplicitRegion>,
    pub text_patterns: Vec<SearchPattern>,
    /// Sweep images lying below this fraction of the page height,
    /// measured from the top.
    pub bottom_image_threshold: Option<f64>,
    pub mode: Mode,
    pub fill: Color,
}

impl RedactionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: ExplicitRegion) -> Self {
        self.regions.push(region);
        self
    }

    pub fn with_text(mut self, pattern: SearchPattern) -> Self {
        self.text_patterns.push(pattern);
        self
    }

    pub fn with_bottom_image_threshold(mut self, threshold: f64) -> Self {
        self.bottom_image_threshold = Some(threshold);
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }

    /// True when the configuration cannot produce any target.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
            && self.text_patterns.is_empty()
            && self.bottom_image_threshold.is_none()
    }

    /// Runs every configuration check. Called before a document is parsed.
    pub fn validate(&self) -> RedactorResult<()> {
        for region in &self.regions {
            region.validate()?;
        }
        for pattern in &self.text_patterns {
            pattern.validate()?;
        }
        if let Some(threshold) = self.bottom_image_threshold {
            validate_threshold(threshold)?;
        }
        self.fill.validate()
    }

    /// Parses a JSON job description.
    pub fn from_json(json: &str) -> RedactorResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| RedactorError::config("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON job file.
    pub fn from_path(path: &Path) -> RedactorResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| RedactorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RedactionConfig::default();
        assert!(config.is_empty());
        assert_eq!(config.mode, Mode::Destructive);
        assert_eq!(config.fill, Color::WHITE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json() {
        let config = RedactionConfig::from_json(
            r#"{
                "regions": [{
                    "rect": {"x": 0, "y": 0, "width": 1229, "height": 250},
                    "frame": {"width": 1229, "height": 2008},
                    "origin": "top-left"
                }],
                "text_patterns": [{"text": "ORDER-1"}, {"text": "torod", "case_sensitive": false}],
                "bottom_image_threshold": 0.8,
                "mode": "overlay",
                "fill": {"r": 0, "g": 0, "b": 0}
            }"#,
        )
        .unwrap();

        assert_eq!(config.regions.len(), 1);
        assert_eq!(config.regions[0].origin, Origin::TopLeft);
        assert!(config.text_patterns[0].case_sensitive);
        assert!(!config.text_patterns[1].case_sensitive);
        assert_eq!(config.bottom_image_threshold, Some(0.8));
        assert_eq!(config.mode, Mode::Overlay);
        assert_eq!(config.fill, Color::BLACK);
    }

    #[test]
    fn test_from_json_rejects_invalid_values() {
        let err = RedactionConfig::from_json(r#"{"bottom_image_threshold": 1.5}"#).unwrap_err();
        assert!(err.is_configuration());

        let err = RedactionConfig::from_json(r#"{"text_patterns": [{"text": ""}]}"#).unwrap_err();
        assert!(err.is_configuration());

        let err = RedactionConfig::from_json(r#"{"unknown": true}"#).unwrap_err();
        assert!(err.is_configuration());

        let err = RedactionConfig::from_json(
            r#"{"regions": [{"rect": {"x": 0, "y": 0, "width": -5, "height": 1},
                             "frame": {"width": 10, "height": 10}}]}"#,
        )
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_parse_region() {
        let region: ExplicitRegion = "0,0,1229,250@1229,2008".parse().unwrap();
        assert_eq!(region.rect, Rect::new(0.0, 0.0, 1229.0, 250.0).unwrap());
        assert_eq!(region.frame, ReferenceFrame::new(1229.0, 2008.0).unwrap());

        assert!("0,0,10,10".parse::<ExplicitRegion>().is_err());
        assert!("0,0,10@10,10".parse::<ExplicitRegion>().is_err());
        assert!("0,0,10,10@0,10".parse::<ExplicitRegion>().is_err());
        assert!("0,0,x,10@10,10".parse::<ExplicitRegion>().is_err());
        assert!("0,0,10,10@10,10,10".parse::<ExplicitRegion>().is_err());

        let spaced: ExplicitRegion = " 1.5, 2 ,3,4 @ 10, 20 ".parse().unwrap();
        assert_eq!(spaced.rect, Rect::new(1.5, 2.0, 3.0, 4.0).unwrap());
        assert_eq!(spaced.frame, ReferenceFrame::new(10.0, 20.0).unwrap());
    }

    #[test]
    fn test_resolve_top_left_region() {
        let page = PageGeometry::new(614.5, 1004.0).unwrap();
        let region = ExplicitRegion::new(
            Rect::new(0.0, 0.0, 1229.0, 250.0).unwrap(),
            ReferenceFrame::new(1229.0, 2008.0).unwrap(),
        );

        let bottom = region.resolve(&page).unwrap();
        assert_eq!(bottom, Rect::new(0.0, 0.0, 614.5, 125.0).unwrap());

        let top = region.with_origin(Origin::TopLeft).resolve(&page).unwrap();
        assert!((top.y - 879.0).abs() < 1e-9);
        assert!((top.top() - 1004.0).abs() < 1e-9);
    }
}
