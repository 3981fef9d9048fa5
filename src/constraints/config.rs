//! TOML constraint settings.
//!
//! ```toml
//! max_weekly_hours = 32.0
//! max_consecutive_slots = 4
//! break_desk_name = "lounge"
//! enable_day_off_after_night = false
//! ```
//!
//! Missing keys take the defaults below.

use serde::{Deserialize, Serialize};

use super::{default_constraints, Constraint};
use crate::error::ConfigError;
use crate::models::{DEFAULT_BREAK_DESK, DEFAULT_MIN_REST_HOURS};

/// Numeric parameters and on/off switches for every rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintConfig {
    pub min_rest_hours: f64,
    pub max_consecutive_days: u32,
    pub max_weekly_hours: f64,
    pub max_night_shifts_per_week: u32,
    pub long_shift_threshold_hours: f64,
    pub required_break_hours: f64,
    pub max_consecutive_slots: u32,
    pub break_desk_name: String,

    pub enable_min_rest: bool,
    pub enable_consecutive_days: bool,
    pub enable_weekly_hours: bool,
    pub enable_night_shifts: bool,
    pub enable_day_off_after_night: bool,
    pub enable_break_after_long_shift: bool,
    pub enable_break_after_consecutive_slots: bool,
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            min_rest_hours: DEFAULT_MIN_REST_HOURS,
            max_consecutive_days: 6,
            max_weekly_hours: 40.0,
            max_night_shifts_per_week: 2,
            long_shift_threshold_hours: 5.0,
            required_break_hours: 1.0,
            max_consecutive_slots: 5,
            break_desk_name: DEFAULT_BREAK_DESK.to_string(),
            enable_min_rest: true,
            enable_consecutive_days: true,
            enable_weekly_hours: true,
            enable_night_shifts: true,
            enable_day_off_after_night: true,
            enable_break_after_long_shift: true,
            enable_break_after_consecutive_slots: true,
        }
    }
}

impl ConstraintConfig {
    /// Parses TOML settings and checks the values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    /// Rejects negative or non-finite hours and an empty break desk name.
    pub fn check(&self) -> Result<(), ConfigError> {
        let hours = [
            ("min_rest_hours", self.min_rest_hours),
            ("max_weekly_hours", self.max_weekly_hours),
            ("long_shift_threshold_hours", self.long_shift_threshold_hours),
            ("required_break_hours", self.required_break_hours),
        ];
        for (key, value) in hours {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("expected non-negative hours, got {value}"),
                });
            }
        }
        if self.break_desk_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "break_desk_name".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// The enabled rules, or [`default_constraints`] if none is enabled.
    pub fn build(&self) -> Vec<Constraint> {
        let mut out = Vec::new();
        if self.enable_min_rest {
            out.push(Constraint::min_rest_hours(self.min_rest_hours));
        }
        if self.enable_consecutive_days {
            out.push(Constraint::max_consecutive_days(self.max_consecutive_days));
        }
        if self.enable_weekly_hours {
            out.push(Constraint::max_weekly_hours(self.max_weekly_hours));
        }
        if self.enable_night_shifts {
            out.push(Constraint::max_night_shifts_per_week(
                self.max_night_shifts_per_week,
            ));
        }
        if self.enable_day_off_after_night {
            out.push(Constraint::required_day_off_after_night());
        }
        if self.enable_break_after_long_shift {
            out.push(Constraint::required_break_after_long_shift(
                self.long_shift_threshold_hours,
                self.required_break_hours,
            ));
        }
        if self.enable_break_after_consecutive_slots {
            out.push(Constraint::required_break_after_consecutive_slots(
                self.max_consecutive_slots,
                self.break_desk_name.clone(),
            ));
        }
        if out.is_empty() {
            return default_constraints();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::Rule;

    #[test]
    fn test_defaults_enable_everything() {
        let c = ConstraintConfig::default().build();
        assert_eq!(c.len(), 7);
        assert_eq!(c[0].rule, Rule::MinRestHours { min_hours: 11.0 });
    }

    #[test]
    fn test_from_toml_partial() {
        let config = ConstraintConfig::from_toml_str(
            r#"
max_weekly_hours = 32.0
max_consecutive_slots = 4
break_desk_name = "lounge"
enable_day_off_after_night = false
enable_min_rest = false
"#,
        )
        .unwrap();
        assert_eq!(config.max_consecutive_days, 6);
        let c = config.build();
        assert_eq!(c.len(), 5);
        assert!(c
            .iter()
            .any(|c| c.rule == Rule::MaxWeeklyHours { max_hours: 32.0 }));
        assert!(c.iter().any(|c| c.consecutive_break() == Some((4, "lounge"))));
    }

    #[test]
    fn test_all_disabled_falls_back() {
        let config = ConstraintConfig {
            enable_min_rest: false,
            enable_consecutive_days: false,
            enable_weekly_hours: false,
            enable_night_shifts: false,
            enable_day_off_after_night: false,
            enable_break_after_long_shift: false,
            enable_break_after_consecutive_slots: false,
            ..Default::default()
        };
        assert_eq!(config.build(), default_constraints());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            ConstraintConfig::from_toml_str("max_weekly_hours = -5.0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            ConstraintConfig::from_toml_str("break_desk_name = \"\""),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            ConstraintConfig::from_toml_str("max_weekly_hours = "),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ConstraintConfig::default();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(ConstraintConfig::from_toml_str(&text).unwrap(), config);
    }
}
