//! Text format for constraint lists.
//!
//! One rule per line, `key = value` or `key: value`. `#` starts a
//! comment; blank lines are ignored; keys are case-insensitive.
//!
//! ```text
//! # labor rules
//! max_consecutive_days = 6
//! max_weekly_hours: 40.0
//! required_break_after_long_shift = 5.0, 1.0
//! required_break_after_consecutive_slots = 5, break
//! required_day_off_after_night = yes
//! ```

use tracing::warn;

use super::Constraint;
use crate::error::ConfigError;
use crate::models::DEFAULT_BREAK_DESK;

/// How malformed lines are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Log and skip malformed or unknown lines.
    #[default]
    Lenient,
    /// Fail on the first malformed or unknown line.
    Strict,
}

/// Parses constraint text.
#[derive(Debug, Clone, Default)]
pub struct ConstraintParser {
    mode: ParseMode,
}

impl ConstraintParser {
    /// Creates a lenient parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a strict parser.
    pub fn strict() -> Self {
        Self {
            mode: ParseMode::Strict,
        }
    }

    /// Sets the parse mode.
    pub fn with_mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    /// Parses every line of `text` into constraints, in line order.
    ///
    /// In lenient mode this never fails. A `false` day-off flag yields
    /// no constraint.
    pub fn parse(&self, text: &str) -> Result<Vec<Constraint>, ConfigError> {
        let mut constraints = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            match parse_line(line) {
                Ok(Some(c)) => constraints.push(c),
                Ok(None) => {}
                Err(reason) => match self.mode {
                    ParseMode::Lenient => {
                        warn!(line = idx + 1, text = line, %reason, "skipping constraint line");
                    }
                    ParseMode::Strict => {
                        return Err(ConfigError::InvalidLine {
                            line: idx + 1,
                            text: line.to_string(),
                            reason,
                        });
                    }
                },
            }
        }
        Ok(constraints)
    }
}

/// Splits at the first `=` or `:`.
fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let pos = line.find(['=', ':'])?;
    Some((line[..pos].trim(), line[pos + 1..].trim()))
}

fn parse_line(line: &str) -> Result<Option<Constraint>, String> {
    let (key, value) =
        split_key_value(line).ok_or_else(|| "expected 'key = value' or 'key: value'".to_string())?;
    let key = key.to_ascii_lowercase();
    let c = match key.as_str() {
        "min_rest_hours" => Constraint::min_rest_hours(hours(value)?),
        "max_consecutive_days" => Constraint::max_consecutive_days(count(value)?),
        "max_weekly_hours" => Constraint::max_weekly_hours(hours(value)?),
        "max_night_shifts_per_week" => Constraint::max_night_shifts_per_week(count(value)?),
        "required_day_off_after_night" => {
            if !flag(value)? {
                return Ok(None);
            }
            Constraint::required_day_off_after_night()
        }
        "required_break_after_long_shift" => {
            let parts = list(value);
            let [threshold, break_hours] = parts.as_slice() else {
                return Err(format!("expected 'threshold, break_hours', got '{value}'"));
            };
            Constraint::required_break_after_long_shift(hours(threshold)?, hours(break_hours)?)
        }
        "required_break_after_consecutive_slots" => {
            let parts = list(value);
            match parts.as_slice() {
                [max] => {
                    Constraint::required_break_after_consecutive_slots(count(max)?, DEFAULT_BREAK_DESK)
                }
                [max, desk] if !desk.is_empty() => {
                    Constraint::required_break_after_consecutive_slots(count(max)?, *desk)
                }
                _ => return Err(format!("expected 'max_slots[, break_desk]', got '{value}'")),
            }
        }
        other => return Err(format!("unknown constraint '{other}'")),
    };
    Ok(Some(c))
}

fn list(value: &str) -> Vec<&str> {
    value.split(',').map(str::trim).collect()
}

fn hours(value: &str) -> Result<f64, String> {
    match value.parse::<f64>() {
        Ok(h) if h.is_finite() && h >= 0.0 => Ok(h),
        _ => Err(format!("'{value}' is not a non-negative number of hours")),
    }
}

fn count(value: &str) -> Result<u32, String> {
    value
        .parse::<u32>()
        .map_err(|_| format!("'{value}' is not a non-negative integer"))
}

fn flag(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(format!("'{value}' is not a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::Rule;

    const SAMPLE: &str = "
# labor rules
max_consecutive_days = 6
MAX_WEEKLY_HOURS: 40.0   # trailing comment
max_night_shifts_per_week = 2
min_rest_hours = 11
required_break_after_long_shift = 5.0, 1.0
required_break_after_consecutive_slots = 4, lounge
required_day_off_after_night = yes
";

    #[test]
    fn test_parse_all_keys() {
        let c = ConstraintParser::new().parse(SAMPLE).unwrap();
        assert_eq!(c.len(), 7);
        assert_eq!(c[0].rule, Rule::MaxConsecutiveDays { max_days: 6 });
        assert_eq!(c[1].rule, Rule::MaxWeeklyHours { max_hours: 40.0 });
        assert_eq!(c[3].rule, Rule::MinRestHours { min_hours: 11.0 });
        assert_eq!(
            c[4].rule,
            Rule::RequiredBreakAfterLongShift {
                threshold_hours: 5.0,
                break_hours: 1.0
            }
        );
        assert_eq!(c[5].consecutive_break(), Some((4, "lounge")));
        assert_eq!(c[6].rule, Rule::RequiredDayOffAfterNight);
    }

    #[test]
    fn test_default_break_desk() {
        let c = ConstraintParser::new()
            .parse("required_break_after_consecutive_slots = 5")
            .unwrap();
        assert_eq!(c[0].consecutive_break(), Some((5, "break")));
    }

    #[test]
    fn test_disabled_flag_yields_nothing() {
        let c = ConstraintParser::new()
            .parse("required_day_off_after_night = false")
            .unwrap();
        assert!(c.is_empty());
    }

    #[test]
    fn test_lenient_skips_bad_lines() {
        let text = "max_consecutive_days = six\nunknown_rule = 3\nmax_weekly_hours 40\nmax_weekly_hours = 38";
        let c = ConstraintParser::new().parse(text).unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].rule, Rule::MaxWeeklyHours { max_hours: 38.0 });
    }

    #[test]
    fn test_strict_reports_line() {
        let text = "max_consecutive_days = 6\n\nrequired_break_after_long_shift = 5.0";
        let err = ConstraintParser::strict().parse(text).unwrap_err();
        match err {
            ConfigError::InvalidLine { line, text, .. } => {
                assert_eq!(line, 3);
                assert_eq!(text, "required_break_after_long_shift = 5.0");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_hours_rejected() {
        let parser = ConstraintParser::new().with_mode(ParseMode::Strict);
        assert!(parser.parse("min_rest_hours = -1").is_err());
    }
}
