//! Alert taxonomy: display colors and legend grouping.
//!
//! Classification is two-tier. A priority-ordered table of event keywords is
//! tried first so recognisable hazards keep their own colors; when no keyword
//! matches, the CAP severity picks a generic color.

use crate::types::{Alert, Severity};

/// Legend rows, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegendCategory {
    Tornado,
    SevereThunderstorm,
    Flood,
    WinterStorm,
    Marine,
    Hurricane,
    TropicalStorm,
    Other,
}

impl LegendCategory {
    pub const ALL: [LegendCategory; 8] = [
        LegendCategory::Tornado,
        LegendCategory::SevereThunderstorm,
        LegendCategory::Flood,
        LegendCategory::WinterStorm,
        LegendCategory::Marine,
        LegendCategory::Hurricane,
        LegendCategory::TropicalStorm,
        LegendCategory::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Tornado => "Tornado",
            Self::SevereThunderstorm => "Severe Thunderstorm",
            Self::Flood => "Flash Flood/Flood",
            Self::WinterStorm => "Winter Storm/Blizzard",
            Self::Marine => "Marine",
            Self::Hurricane => "Hurricane/Typhoon",
            Self::TropicalStorm => "Tropical Storm",
            Self::Other => "Other",
        }
    }
}

/// Display classification of one alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hazard {
    pub color: &'static str,
    pub category: LegendCategory,
}

struct EventRule {
    keywords: &'static [&'static str],
    color: &'static str,
    category: LegendCategory,
}

// Order matters: "flash flood" must be tried before "flood".
const EVENT_RULES: &[EventRule] = &[
    EventRule {
        keywords: &["tornado"],
        color: "#FF0000",
        category: LegendCategory::Tornado,
    },
    EventRule {
        keywords: &["flash flood"],
        color: "#8B0000",
        category: LegendCategory::Flood,
    },
    EventRule {
        keywords: &["flood"],
        color: "#00FF00",
        category: LegendCategory::Flood,
    },
    EventRule {
        keywords: &["severe thunderstorm"],
        color: "#FFA500",
        category: LegendCategory::SevereThunderstorm,
    },
    EventRule {
        keywords: &["winter storm", "blizzard", "ice storm"],
        color: "#FF69B4",
        category: LegendCategory::WinterStorm,
    },
    EventRule {
        keywords: &["winter weather"],
        color: "#7B68EE",
        category: LegendCategory::WinterStorm,
    },
    EventRule {
        keywords: &["frost", "freeze"],
        color: "#6495ED",
        category: LegendCategory::Other,
    },
    EventRule {
        keywords: &["heat"],
        color: "#C71585",
        category: LegendCategory::Other,
    },
    EventRule {
        keywords: &["dense fog"],
        color: "#708090",
        category: LegendCategory::Other,
    },
    EventRule {
        keywords: &["special marine"],
        color: "#00CED1",
        category: LegendCategory::Marine,
    },
    EventRule {
        keywords: &["hurricane", "typhoon"],
        color: "#DC143C",
        category: LegendCategory::Hurricane,
    },
    EventRule {
        keywords: &["tropical storm"],
        color: "#B22222",
        category: LegendCategory::TropicalStorm,
    },
    EventRule {
        keywords: &["extreme wind"],
        color: "#FF8C00",
        category: LegendCategory::Other,
    },
    EventRule {
        keywords: &["dust"],
        color: "#FFE4C4",
        category: LegendCategory::Other,
    },
];

/// Color used when nothing but the severity is known.
pub fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Extreme => "#800080",
        Severity::Severe => "#FF4500",
        Severity::Moderate => "#FFB347",
        Severity::Minor => "#FFFF00",
        Severity::Unknown => "#3388FF",
    }
}

/// Classify an event/severity pair. Total: every input yields a hazard.
pub fn classify(event: &str, severity: Severity) -> Hazard {
    let event = event.to_lowercase();

    EVENT_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| event.contains(k)))
        .map(|rule| Hazard {
            color: rule.color,
            category: rule.category,
        })
        .unwrap_or(Hazard {
            color: severity_color(severity),
            category: LegendCategory::Other,
        })
}

/// Classify a whole alert by its event and severity.
pub fn classify_alert(alert: &Alert) -> Hazard {
    classify(&alert.event, alert.severity)
}

/// Warning-tier test: "warning" present and "watch" absent, ignoring case.
///
/// Deliberately a substring rule, not a CAP category lookup.
pub fn is_warning(event: &str) -> bool {
    let event = event.to_lowercase();
    event.contains("warning") && !event.contains("watch")
}

/// Colors that belong to a legend row.
pub fn category_colors(category: LegendCategory) -> Vec<&'static str> {
    let mut colors: Vec<&'static str> = EVENT_RULES
        .iter()
        .filter(|rule| rule.category == category)
        .map(|rule| rule.color)
        .collect();

    if category == LegendCategory::Other {
        for severity in [
            Severity::Extreme,
            Severity::Severe,
            Severity::Moderate,
            Severity::Minor,
            Severity::Unknown,
        ] {
            colors.push(severity_color(severity));
        }
    }

    colors.dedup();
    colors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_beats_severity() {
        let hazard = classify("Tornado Warning", Severity::Minor);
        assert_eq!(hazard.color, "#FF0000");
        assert_eq!(hazard.category, LegendCategory::Tornado);
        assert_ne!(hazard.color, severity_color(Severity::Minor));
    }

    #[test]
    fn test_flash_flood_before_flood() {
        assert_eq!(classify("Flash Flood Warning", Severity::Severe).color, "#8B0000");
        assert_eq!(classify("Flood Warning", Severity::Severe).color, "#00FF00");
        assert_eq!(
            classify("Flood Warning", Severity::Severe).category,
            LegendCategory::Flood
        );
    }

    #[test]
    fn test_case_insensitive_matching() {
        assert_eq!(
            classify("SEVERE THUNDERSTORM WARNING", Severity::Unknown).category,
            LegendCategory::SevereThunderstorm
        );
        assert_eq!(
            classify("blizzard warning", Severity::Unknown).category,
            LegendCategory::WinterStorm
        );
        assert_eq!(
            classify("Typhoon Warning", Severity::Unknown).category,
            LegendCategory::Hurricane
        );
    }

    #[test]
    fn test_severity_fallback() {
        let hazard = classify("Small Craft Advisory", Severity::Minor);
        assert_eq!(hazard.color, "#FFFF00");
        assert_eq!(hazard.category, LegendCategory::Other);

        assert_eq!(classify("", Severity::Extreme).color, "#800080");
        assert_eq!(classify("Something New", Severity::Unknown).color, "#3388FF");
    }

    #[test]
    fn test_classify_is_deterministic() {
        for event in ["Tornado Warning", "Heat Advisory", "Dust Storm Warning", "Unheard Of"] {
            for severity in [
                Severity::Unknown,
                Severity::Minor,
                Severity::Moderate,
                Severity::Severe,
                Severity::Extreme,
            ] {
                assert_eq!(classify(event, severity), classify(event, severity));
            }
        }
    }

    #[test]
    fn test_warning_rule() {
        assert!(is_warning("Tornado Warning"));
        assert!(is_warning("flash flood WARNING"));
        assert!(!is_warning("Tornado Watch"));
        assert!(!is_warning("Heat Advisory"));
        // Any mention of a watch disqualifies.
        assert!(!is_warning("Winter Watch Upgraded to Warning"));
    }

    #[test]
    fn test_every_category_has_a_label_and_color() {
        for category in LegendCategory::ALL {
            assert!(!category.label().is_empty());
            assert!(!category_colors(category).is_empty(), "{:?}", category);
        }
        assert_eq!(category_colors(LegendCategory::Flood), vec!["#8B0000", "#00FF00"]);
    }
}
