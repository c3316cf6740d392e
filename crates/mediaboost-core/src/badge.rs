//! Presentation of the applied volume on the extension icon.

/// The background colour tier of the badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeColor {
    /// Below unity gain
    Blue,
    /// Up to 200%
    Green,
    /// Up to 400%
    Amber,
    /// Above 400%
    Red,
}

impl BadgeColor {
    pub fn for_volume(volume_percent: u32) -> Self {
        match volume_percent {
            0..=99 => Self::Blue,
            100..=200 => Self::Green,
            201..=400 => Self::Amber,
            _ => Self::Red,
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            Self::Blue => "#4285f4",
            Self::Green => "#34a853",
            Self::Amber => "#fbbc04",
            Self::Red => "#ea4335",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub text: String,
    /// `None` when the badge is hidden.
    pub color: Option<BadgeColor>,
}

impl Badge {
    /// The badge to show for an applied volume. Unity gain hides the badge.
    pub fn for_volume(volume_percent: u32) -> Self {
        if volume_percent == 100 {
            return Self {
                text: String::new(),
                color: None,
            };
        }

        Self {
            text: format!("{}%", volume_percent),
            color: Some(BadgeColor::for_volume(volume_percent)),
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.text.is_empty()
    }
}
