#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// Viewport widths up to `max_viewport_width` get a screen-centered panel,
/// `viewport - side_margin` wide but never wider than `max_width`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenteredBand {
    pub max_viewport_width: f32,
    pub side_margin: f32,
    pub max_width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementProfile {
    pub estimated_height: f32,
    pub header_height: f32,
    pub gap: f32,
    pub width: f32,
    /// Checked in order; the first band covering the viewport wins.
    pub centered_bands: &'static [CenteredBand],
    pub center_when_anchor_hidden: bool,
}

const HEADER_HEIGHT: f32 = 64.0;
const GAP: f32 = 4.0;
const REM: f32 = 16.0;

pub const DATE_PICKER: PlacementProfile = PlacementProfile {
    estimated_height: 350.0,
    header_height: HEADER_HEIGHT,
    gap: GAP,
    width: 20.0 * REM,
    centered_bands: &[CenteredBand {
        max_viewport_width: 768.0,
        side_margin: 2.0 * REM,
        max_width: 20.0 * REM,
    }],
    center_when_anchor_hidden: false,
};

pub const TIME_PICKER: PlacementProfile = PlacementProfile {
    estimated_height: 350.0,
    header_height: HEADER_HEIGHT,
    gap: GAP,
    width: 20.0 * REM,
    centered_bands: &[
        CenteredBand {
            max_viewport_width: 640.0,
            side_margin: REM,
            max_width: 22.0 * REM,
        },
        CenteredBand {
            max_viewport_width: 1024.0,
            side_margin: 3.0 * REM,
            max_width: 24.0 * REM,
        },
    ],
    center_when_anchor_hidden: true,
};

pub const CLOCK_PICKER: PlacementProfile = PlacementProfile {
    estimated_height: 220.0,
    header_height: HEADER_HEIGHT,
    gap: GAP,
    width: 280.0,
    centered_bands: &[],
    center_when_anchor_hidden: false,
};

/// The range picker is a modal: centered at every width.
pub const RANGE_MODAL: PlacementProfile = PlacementProfile {
    estimated_height: 520.0,
    header_height: HEADER_HEIGHT,
    gap: GAP,
    width: 28.0 * REM,
    centered_bands: &[CenteredBand {
        max_viewport_width: f32::INFINITY,
        side_margin: 2.0 * REM,
        max_width: 28.0 * REM,
    }],
    center_when_anchor_hidden: true,
};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Side {
    Below,
    Above,
    Centered,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Offset {
    Px(f32),
    Percent(f32),
}

impl Offset {
    fn resolve(self, extent: f32) -> f32 {
        match self {
            Offset::Px(px) => px,
            Offset::Percent(pct) => extent * pct / 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Transform {
    None,
    /// translate(-50%, -50%)
    CenterOnPoint,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropdownPlacement {
    pub top: Offset,
    pub left: Offset,
    pub transform: Transform,
    pub width: f32,
    pub side: Side,
}

impl DropdownPlacement {
    fn centered(width: f32) -> Self {
        Self {
            top: Offset::Percent(50.0),
            left: Offset::Percent(50.0),
            transform: Transform::CenterOnPoint,
            width: width.max(0.0),
            side: Side::Centered,
        }
    }

    pub fn css_transform(&self) -> &'static str {
        match self.transform {
            Transform::None => "none",
            Transform::CenterOnPoint => "translate(-50%, -50%)",
        }
    }

    /// Top-left corner in viewport pixels for a panel of `height`.
    pub fn origin(&self, viewport: Viewport, height: f32) -> (f32, f32) {
        let left = self.left.resolve(viewport.width);
        let top = self.top.resolve(viewport.height);
        match self.transform {
            Transform::None => (left, top),
            Transform::CenterOnPoint => (left - self.width / 2.0, top - height / 2.0),
        }
    }
}

pub fn place(anchor: Rect, viewport: Viewport, profile: &PlacementProfile) -> DropdownPlacement {
    if let Some(band) = profile
        .centered_bands
        .iter()
        .find(|band| viewport.width <= band.max_viewport_width)
    {
        let width = (viewport.width - band.side_margin).min(band.max_width);
        return DropdownPlacement::centered(width);
    }

    if profile.center_when_anchor_hidden && anchor.is_empty() {
        return DropdownPlacement::centered(profile.width);
    }

    let space_below = viewport.height - anchor.bottom();
    let space_above = anchor.top;
    let (top, side) = if space_below >= profile.estimated_height {
        (anchor.bottom() + profile.gap, Side::Below)
    } else if space_above >= profile.estimated_height + profile.header_height {
        (
            anchor.top - profile.estimated_height - profile.gap,
            Side::Above,
        )
    } else {
        (anchor.bottom() + profile.gap, Side::Below)
    };

    DropdownPlacement {
        top: Offset::Px(top),
        left: Offset::Px(anchor.left),
        transform: Transform::None,
        width: profile.width,
        side,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESKTOP: Viewport = Viewport {
        width: 1280.0,
        height: 800.0,
    };

    #[test]
    fn opens_below_when_there_is_room() {
        let anchor = Rect::new(100.0, 120.0, 240.0, 40.0);
        let placement = place(anchor, DESKTOP, &DATE_PICKER);
        assert_eq!(placement.side, Side::Below);
        assert_eq!(placement.top, Offset::Px(164.0));
        assert_eq!(placement.left, Offset::Px(100.0));
        assert_eq!(placement.css_transform(), "none");
    }

    #[test]
    fn flips_above_near_the_bottom_of_the_viewport() {
        let anchor = Rect::new(100.0, 700.0, 240.0, 40.0);
        let placement = place(anchor, DESKTOP, &DATE_PICKER);
        assert_eq!(placement.side, Side::Above);
        assert_eq!(placement.top, Offset::Px(346.0));
    }

    #[test]
    fn stays_below_when_neither_side_fits() {
        let short = Viewport {
            width: 1280.0,
            height: 500.0,
        };
        // 260 px below is not enough; 200 px above does not clear the header.
        let anchor = Rect::new(10.0, 200.0, 240.0, 40.0);
        let placement = place(anchor, short, &DATE_PICKER);
        assert_eq!(placement.side, Side::Below);
        assert_eq!(placement.top, Offset::Px(244.0));
    }

    #[test]
    fn above_requires_clearing_the_header() {
        // 380 px above fits the panel but not panel plus header.
        let anchor = Rect::new(10.0, 380.0, 240.0, 40.0);
        let viewport = Viewport {
            width: 1280.0,
            height: 600.0,
        };
        assert_eq!(place(anchor, viewport, &DATE_PICKER).side, Side::Below);
    }

    #[test]
    fn narrow_viewports_center_and_ignore_the_anchor() {
        let phone = Viewport {
            width: 360.0,
            height: 640.0,
        };
        let anchor = Rect::new(5.0, 600.0, 200.0, 30.0);
        let placement = place(anchor, phone, &DATE_PICKER);
        assert_eq!(placement.side, Side::Centered);
        assert_eq!(placement.width, 320.0);
        assert_eq!(placement.css_transform(), "translate(-50%, -50%)");
        assert_eq!(placement.origin(phone, 300.0), (20.0, 170.0));

        let tiny = Viewport {
            width: 300.0,
            height: 640.0,
        };
        assert_eq!(place(anchor, tiny, &DATE_PICKER).width, 268.0);
    }

    #[test]
    fn time_picker_has_phone_and_tablet_bands() {
        let anchor = Rect::new(5.0, 100.0, 200.0, 30.0);
        let phone = Viewport {
            width: 600.0,
            height: 800.0,
        };
        let tablet = Viewport {
            width: 900.0,
            height: 800.0,
        };
        assert_eq!(place(anchor, phone, &TIME_PICKER).width, 352.0);
        assert_eq!(place(anchor, tablet, &TIME_PICKER).width, 384.0);
        assert_eq!(place(anchor, DESKTOP, &TIME_PICKER).side, Side::Below);
        // The date picker is already anchored at tablet widths.
        assert_eq!(place(anchor, tablet, &DATE_PICKER).side, Side::Below);
    }

    #[test]
    fn hidden_anchor_centers_the_time_picker_only() {
        let hidden = Rect::default();
        assert_eq!(place(hidden, DESKTOP, &TIME_PICKER).side, Side::Centered);
        assert_eq!(place(hidden, DESKTOP, &CLOCK_PICKER).side, Side::Below);
    }

    #[test]
    fn clock_picker_uses_its_smaller_panel() {
        let anchor = Rect::new(100.0, 540.0, 200.0, 30.0);
        // 230 px below fits the 220 px dial.
        let placement = place(anchor, DESKTOP, &CLOCK_PICKER);
        assert_eq!(placement.side, Side::Below);
        assert_eq!(placement.width, 280.0);
        let phone = Viewport {
            width: 360.0,
            height: 640.0,
        };
        assert_eq!(place(anchor, phone, &CLOCK_PICKER).side, Side::Above);
    }
}
