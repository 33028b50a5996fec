use crate::canvas::model::CanvasConfiguration;
use crate::foundation::error::{CanvasError, CanvasResult};

/// Outcome of [`CanvasConfiguration::validate`]: every violated rule, in check order.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Collapse the report into a single [`CanvasError::Validation`].
    pub fn into_result(self) -> CanvasResult<()> {
        if self.is_valid {
            Ok(())
        } else {
            Err(CanvasError::validation(self.errors.join("; ")))
        }
    }
}

fn unit_interval(v: f64) -> bool {
    (0.0..=1.0).contains(&v)
}

impl CanvasConfiguration {
    /// Check the configuration invariants without mutating anything.
    pub fn validate(&self) -> ValidationReport {
        let mut errors = Vec::new();
        let qr = &self.qr;
        let (w, h) = (f64::from(self.export.width), f64::from(self.export.height));

        if qr.content.trim().is_empty() {
            errors.push("qr content must not be empty".to_string());
        }
        if self.export.width == 0 || self.export.height == 0 {
            errors.push(format!(
                "canvas width/height must be > 0 (got {}x{})",
                self.export.width, self.export.height
            ));
        }
        if qr.position.x < 0.0 || qr.position.y < 0.0 {
            errors.push(format!(
                "qr position must not be negative (got {}, {})",
                qr.position.x, qr.position.y
            ));
        } else if qr.position.x > w || qr.position.y > h {
            errors.push(format!(
                "qr position ({}, {}) lies outside the {}x{} canvas",
                qr.position.x, qr.position.y, w, h
            ));
        }
        if !(qr.size.is_finite() && qr.size > 0.0) {
            errors.push(format!("qr size must be > 0 (got {})", qr.size));
        } else if qr.position.x + qr.size > w || qr.position.y + qr.size > h {
            errors.push(format!(
                "qr code is out of bounds: ({}, {}) + {} exceeds the {}x{} canvas",
                qr.position.x, qr.position.y, qr.size, w, h
            ));
        }
        if !unit_interval(self.export.quality) {
            errors.push(format!(
                "export quality must be between 0 and 1 (got {})",
                self.export.quality
            ));
        }

        for bg in &self.backgrounds {
            if bg.src.trim().is_empty() {
                errors.push(format!("background '{}' has an empty source", bg.id));
            }
            if !(bg.size.width > 0.0 && bg.size.height > 0.0) {
                errors.push(format!(
                    "background '{}' must have a positive size (got {}x{})",
                    bg.id, bg.size.width, bg.size.height
                ));
            }
            if !unit_interval(bg.opacity) {
                errors.push(format!(
                    "background '{}' opacity must be between 0 and 1 (got {})",
                    bg.id, bg.opacity
                ));
            }
        }

        ValidationReport::from_errors(errors)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/validate.rs"]
mod tests;
