use chrono::{DateTime, Utc};

/// Group digits in threes: `1234567` -> `1,234,567`
pub fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn percent(rate: f64) -> String {
    format!("{:.2}%", rate)
}

/// Fixed two-decimal rendering without the percent sign, for export cells
pub fn fixed2(value: f64) -> String {
    format!("{:.2}", value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthBand {
    Success,
    Info,
    Warning,
    Danger,
}

impl GrowthBand {
    pub fn label(&self) -> &'static str {
        match self {
            GrowthBand::Success => "success",
            GrowthBand::Info => "info",
            GrowthBand::Warning => "warning",
            GrowthBand::Danger => "danger",
        }
    }
}

/// Band a growth rate falls into: >=75, >=50, >=25, else
pub fn growth_band(rate: f64) -> GrowthBand {
    if rate >= 75.0 {
        GrowthBand::Success
    } else if rate >= 50.0 {
        GrowthBand::Info
    } else if rate >= 25.0 {
        GrowthBand::Warning
    } else {
        GrowthBand::Danger
    }
}

/// Ten-cell text bar for a growth rate, capped at 100
pub fn growth_bar(rate: f64) -> String {
    let filled = (rate.abs().min(100.0) / 10.0).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(10 - filled))
}

pub fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Cut to `max` characters, marking the cut
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
        assert_eq!(thousands(-45210), "-45,210");
        assert_eq!(thousands(i64::MIN), "-9,223,372,036,854,775,808");
    }

    #[test]
    fn bands_match_thresholds() {
        assert_eq!(growth_band(75.0), GrowthBand::Success);
        assert_eq!(growth_band(50.0), GrowthBand::Info);
        assert_eq!(growth_band(25.0), GrowthBand::Warning);
        assert_eq!(growth_band(-3.0), GrowthBand::Danger);
        assert_eq!(growth_band(80.0).label(), "success");
        assert_eq!(growth_band(10.0).label(), "danger");
    }

    #[test]
    fn bar_is_capped() {
        assert_eq!(growth_bar(250.0), "##########");
        assert_eq!(growth_bar(-30.0), "###.......");
    }

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate("short", 20), "short");
        assert_eq!(truncate("ñandú bailando en la playa", 5), "ñandú…");
    }

    #[test]
    fn percent_has_two_decimals() {
        assert_eq!(percent(12.346), "12.35%");
        assert_eq!(fixed2(3.0), "3.00");
    }
}
