/// Viewports narrower than this (in logical pixels) show one pane at a time.
pub const MOBILE_BREAKPOINT_PX: u32 = 768;

/// Logical pixels per terminal column.
pub const DEFAULT_CELL_WIDTH_PX: u16 = 8;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LayoutMode {
    SinglePane,
    TwoPane,
}

impl LayoutMode {
    pub fn is_mobile(self) -> bool {
        matches!(self, Self::SinglePane)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PaneSet {
    ListOnly,
    DetailOnly,
    ListAndDetail,
}

impl PaneSet {
    pub fn has_list(self) -> bool {
        !matches!(self, Self::DetailOnly)
    }
}

pub fn columns_to_px(columns: u16, cell_width_px: u16) -> u32 {
    u32::from(columns) * u32::from(cell_width_px.max(1))
}

pub fn layout_for_width(width_px: u32) -> LayoutMode {
    if width_px < MOBILE_BREAKPOINT_PX {
        LayoutMode::SinglePane
    } else {
        LayoutMode::TwoPane
    }
}

pub fn visible_panes(mode: LayoutMode, has_selection: bool) -> PaneSet {
    match (mode, has_selection) {
        (LayoutMode::SinglePane, false) => PaneSet::ListOnly,
        (LayoutMode::SinglePane, true) => PaneSet::DetailOnly,
        (LayoutMode::TwoPane, _) => PaneSet::ListAndDetail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoint_is_exclusive() {
        assert_eq!(layout_for_width(767), LayoutMode::SinglePane);
        assert_eq!(layout_for_width(768), LayoutMode::TwoPane);
        assert_eq!(layout_for_width(0), LayoutMode::SinglePane);
    }

    #[test]
    fn columns_scale_by_cell_width() {
        assert_eq!(columns_to_px(96, DEFAULT_CELL_WIDTH_PX), 768);
        assert_eq!(columns_to_px(10, 0), 10);
    }

    #[test]
    fn panes_follow_mode_and_selection() {
        assert_eq!(visible_panes(LayoutMode::SinglePane, false), PaneSet::ListOnly);
        assert_eq!(visible_panes(LayoutMode::SinglePane, true), PaneSet::DetailOnly);
        assert_eq!(visible_panes(LayoutMode::TwoPane, false), PaneSet::ListAndDetail);
        assert_eq!(visible_panes(LayoutMode::TwoPane, true), PaneSet::ListAndDetail);
        assert!(!PaneSet::DetailOnly.has_list());
        assert!(PaneSet::ListAndDetail.has_list());
    }
}
