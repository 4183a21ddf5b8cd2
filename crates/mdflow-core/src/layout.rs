//! Box model for flow containers.
//!
//! Values are terminal cells (columns for `left`/`right`, rows for `top`/`bottom`).

/// Space around (margin) or inside (padding) a container, per side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MarginPadding {
    pub top: u16,
    pub left: u16,
    pub bottom: u16,
    pub right: u16,
}

impl MarginPadding {
    pub const ZERO: Self = Self {
        top: 0,
        left: 0,
        bottom: 0,
        right: 0,
    };

    pub const fn all(v: u16) -> Self {
        Self {
            top: v,
            left: v,
            bottom: v,
            right: v,
        }
    }

    pub const fn horizontal(left: u16, right: u16) -> Self {
        Self {
            top: 0,
            left,
            bottom: 0,
            right,
        }
    }

    pub const fn total_horizontal(&self) -> u16 {
        self.left.saturating_add(self.right)
    }

    pub const fn total_vertical(&self) -> u16 {
        self.top.saturating_add(self.bottom)
    }

    /// Width left for content after removing both horizontal sides.
    pub fn inner_width(&self, width: u16) -> u16 {
        width.saturating_sub(self.total_horizontal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_width_saturates() {
        let m = MarginPadding::horizontal(1, 3);
        assert_eq!(m.inner_width(10), 6);
        assert_eq!(m.inner_width(3), 0);
        assert_eq!(MarginPadding::all(2).total_vertical(), 4);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_partial_sides() {
        let m: MarginPadding = serde_json::from_str(r#"{"left": 2}"#).unwrap();
        assert_eq!(m, MarginPadding::horizontal(2, 0));
    }
}
