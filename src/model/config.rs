use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimelineError};

/// Horizontal layout direction of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

impl TextDirection {
    pub fn is_rtl(self) -> bool {
        self == TextDirection::Rtl
    }

    /// Apply the direction's sign to a left-to-right pixel value.
    pub fn mirror(self, x: f32) -> f32 {
        if self.is_rtl() {
            -x
        } else {
            x
        }
    }
}

/// Which days get weekend shading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekendRule {
    #[default]
    SaturdayOnly,
    SaturdayAndSunday,
}

impl WeekendRule {
    pub fn is_weekend(self, date: NaiveDate) -> bool {
        match (self, date.weekday()) {
            (_, Weekday::Sat) => true,
            (WeekendRule::SaturdayAndSunday, Weekday::Sun) => true,
            _ => false,
        }
    }
}

/// Cell sizes and direction shared by every geometry derivation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Width of one day column in pixels.
    pub column_width: f32,
    /// Width of the sticky resource label column.
    pub resource_label_width: f32,
    /// Height of one lane of a resource row.
    pub row_height: f32,
    pub header_height: f32,
    pub text_direction: TextDirection,
    pub weekend_rule: WeekendRule,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            column_width: 120.0,
            resource_label_width: 200.0,
            row_height: 50.0,
            header_height: 80.0,
            text_direction: TextDirection::Ltr,
            weekend_rule: WeekendRule::SaturdayOnly,
        }
    }
}

impl TimelineConfig {
    pub fn is_rtl(&self) -> bool {
        self.text_direction.is_rtl()
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.column_width > 0.0) {
            return Err(TimelineError::InvalidConfig(format!(
                "column width must be positive, got {}",
                self.column_width
            )));
        }
        if !(self.row_height > 0.0) {
            return Err(TimelineError::InvalidConfig(format!(
                "row height must be positive, got {}",
                self.row_height
            )));
        }
        if !(self.resource_label_width >= 0.0) || !(self.header_height >= 0.0) {
            return Err(TimelineError::InvalidConfig(
                "label width and header height must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
