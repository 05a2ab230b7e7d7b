// Severity classification of mean concentrations
use serde::Serialize;

/// Mean concentration above which a station is `Medium`, mg/m³
pub const MEDIUM_THRESHOLD: f64 = 0.03;
/// Mean concentration above which a station is `High`, mg/m³
pub const HIGH_THRESHOLD: f64 = 0.06;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    Low,
    Medium,
    High,
}

/// Marker and zone styling for one tier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierStyle {
    pub label: &'static str,
    pub marker_color: &'static str,
    pub marker_symbol: &'static str,
    pub marker_size: u32,
    pub zone_fill: String,
    pub zone_inner_fill: String,
    pub zone_border: String,
}

impl SeverityTier {
    /// Boundary values fall into the lower tier.
    pub fn classify(concentration: f64) -> Self {
        if concentration > HIGH_THRESHOLD {
            SeverityTier::High
        } else if concentration > MEDIUM_THRESHOLD {
            SeverityTier::Medium
        } else {
            SeverityTier::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SeverityTier::Low => "Low",
            SeverityTier::Medium => "Medium",
            SeverityTier::High => "High",
        }
    }

    fn rgb(self) -> (u8, u8, u8) {
        match self {
            SeverityTier::Low => (46, 204, 113),
            SeverityTier::Medium => (241, 196, 15),
            SeverityTier::High => (231, 76, 60),
        }
    }

    pub fn style(self) -> TierStyle {
        let (r, g, b) = self.rgb();
        let rgba = |alpha: f64| format!("rgba({}, {}, {}, {})", r, g, b, alpha);

        let (marker_color, marker_symbol, marker_size) = match self {
            SeverityTier::Low => ("#2ecc71", "triangle-up", 10),
            SeverityTier::Medium => ("#f1c40f", "square", 12),
            SeverityTier::High => ("#e74c3c", "circle", 14),
        };

        TierStyle {
            label: self.label(),
            marker_color,
            marker_symbol,
            marker_size,
            zone_fill: rgba(0.15),
            zone_inner_fill: rgba(0.25),
            zone_border: rgba(0.7),
        }
    }

    /// Legend entries, lowest tier first
    pub fn legend() -> Vec<TierStyle> {
        [SeverityTier::Low, SeverityTier::Medium, SeverityTier::High]
            .into_iter()
            .map(SeverityTier::style)
            .collect()
    }
}
