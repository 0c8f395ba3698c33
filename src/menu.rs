use std::{fmt, str::FromStr, time::Duration};

use crate::{
    app_state::AppState,
    data_types::menu_data_types::{Category, Dish},
};

/// the two lists of the menu screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuKind {
    #[default]
    Menu,
    Bar,
}

impl MenuKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuKind::Menu => "menu",
            MenuKind::Bar => "bar",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            MenuKind::Menu => "Меню",
            MenuKind::Bar => "Барная карта",
        }
    }

    fn includes(&self, category: &Category) -> bool {
        match self {
            MenuKind::Menu => !category.has_type("bar"),
            MenuKind::Bar => category.has_type("bar"),
        }
    }
}

impl fmt::Display for MenuKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MenuKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "menu" => Ok(MenuKind::Menu),
            "bar" => Ok(MenuKind::Bar),
            other => Err(format!("unknown menu kind '{}'", other)),
        }
    }
}

/// Menu screen: menu/bar switch and the active category.
#[derive(Debug, Clone, Default)]
pub struct MenuScreen {
    kind: MenuKind,
    active_category: Option<u64>,
}

impl MenuScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> MenuKind {
        self.kind
    }

    /// switching lists starts at the first category again
    pub fn set_kind(&mut self, kind: MenuKind) {
        if self.kind != kind {
            self.kind = kind;
            self.active_category = None;
        }
    }

    pub fn categories<'a>(&self, state: &'a AppState) -> Vec<&'a Category> {
        state
            .visible_categories()
            .filter(|c| self.kind.includes(c))
            .collect()
    }

    /// The selected category, or the first one of the list when nothing (or
    /// something no longer listed) is selected.
    pub fn active_category<'a>(&self, state: &'a AppState) -> Option<&'a Category> {
        let categories = self.categories(state);
        self.active_category
            .and_then(|id| categories.iter().copied().find(|c| c.id == id))
            .or_else(|| categories.first().copied())
    }

    /// ignored for ids that are not in the current list
    pub fn select_category(&mut self, state: &AppState, id: u64) -> bool {
        if self.categories(state).iter().any(|c| c.id == id) {
            self.active_category = Some(id);
            true
        } else {
            log::debug!("Category {} is not part of the {} list", id, self.kind);
            false
        }
    }

    pub fn dishes<'a>(&self, state: &'a AppState) -> Vec<&'a Dish> {
        match self.active_category(state) {
            Some(category) => state.dishes_in_category(category.id),
            None => Vec::new(),
        }
    }
}

/// Maps a scroll offset to the category whose section is under it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollSpy {
    // (category id, section top), sorted by top
    sections: Vec<(u64, f32)>,
    header_offset: f32,
}

impl ScrollSpy {
    /// `header_offset` is the height of the sticky header covering the list
    pub fn new(sections: impl IntoIterator<Item = (u64, f32)>, header_offset: f32) -> Self {
        let mut sections: Vec<(u64, f32)> = sections.into_iter().collect();
        sections.sort_by(|a, b| a.1.total_cmp(&b.1));
        ScrollSpy {
            sections,
            header_offset,
        }
    }

    /// Last section whose top has passed under the header. Above the first
    /// section the first one stays active.
    pub fn active_at(&self, scroll_y: f32) -> Option<u64> {
        let line = scroll_y + self.header_offset;
        self.sections
            .iter()
            .take_while(|(_, top)| *top <= line)
            .last()
            .or_else(|| self.sections.first())
            .map(|(id, _)| *id)
    }

    /// where to scroll so the section starts right below the header
    pub fn target_of(&self, category_id: u64) -> Option<f32> {
        self.sections
            .iter()
            .find(|(id, _)| *id == category_id)
            .map(|(_, top)| (top - self.header_offset).max(0.0))
    }
}

/// Time based scroll animation from `from` to `to` with ease-in-out cubic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothScroll {
    from: f32,
    to: f32,
    duration: Duration,
}

impl SmoothScroll {
    pub fn new(from: f32, to: f32, duration: Duration) -> Self {
        SmoothScroll { from, to, duration }
    }

    pub fn position_at(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() || elapsed >= self.duration {
            return self.to;
        }
        let t = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.from + (self.to - self.from) * ease_in_out_cubic(t)
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_spy_follows_offset() {
        let spy = ScrollSpy::new([(2, 400.0), (1, 0.0), (3, 900.0)], 60.0);
        assert_eq!(spy.active_at(0.0), Some(1));
        assert_eq!(spy.active_at(339.0), Some(1));
        assert_eq!(spy.active_at(340.0), Some(2));
        assert_eq!(spy.active_at(5000.0), Some(3));
        assert_eq!(spy.target_of(2), Some(340.0));
        assert_eq!(spy.target_of(1), Some(0.0));
        assert_eq!(spy.target_of(9), None);
    }

    #[test]
    fn empty_spy_has_no_active_section() {
        assert_eq!(ScrollSpy::default().active_at(100.0), None);
    }

    #[test]
    fn easing_is_symmetric() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(0.5), 0.5);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert!((ease_in_out_cubic(0.25) + ease_in_out_cubic(0.75) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn smooth_scroll_lands_on_target() {
        let scroll = SmoothScroll::new(100.0, 500.0, Duration::from_millis(400));
        assert_eq!(scroll.position_at(Duration::ZERO), 100.0);
        assert!((scroll.position_at(Duration::from_millis(200)) - 300.0).abs() < 1e-3);
        assert_eq!(scroll.position_at(Duration::from_secs(1)), 500.0);
        assert!(scroll.is_finished(Duration::from_millis(400)));
    }

    #[test]
    fn menu_kind_parses() {
        assert_eq!("bar".parse::<MenuKind>(), Ok(MenuKind::Bar));
        assert!("drinks".parse::<MenuKind>().is_err());
    }
}
