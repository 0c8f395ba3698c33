use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Home,
    Menu,
    Booking,
    Profile,
    Cart,
    Order,
}

impl Tab {
    /// tabs of the bottom navigation bar, in display order
    pub const NAVIGATION: [Tab; 4] = [Tab::Home, Tab::Menu, Tab::Booking, Tab::Profile];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Home => "home",
            Tab::Menu => "menu",
            Tab::Booking => "booking",
            Tab::Profile => "profile",
            Tab::Cart => "cart",
            Tab::Order => "order",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Home => "Главная",
            Tab::Menu => "Меню",
            Tab::Booking => "Бронирование",
            Tab::Profile => "Профиль",
            Tab::Cart => "Моя Корзина",
            Tab::Order => "Оформление заказа",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnknownTab(pub String);

impl FromStr for Tab {
    type Err = UnknownTab;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(Tab::Home),
            "menu" => Ok(Tab::Menu),
            "booking" => Ok(Tab::Booking),
            "profile" => Ok(Tab::Profile),
            "cart" => Ok(Tab::Cart),
            "order" => Ok(Tab::Order),
            other => Err(UnknownTab(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabChange {
    pub from: Tab,
    pub to: Tab,
    /// the already active tab was selected again
    pub reselected: bool,
}

/// Flat tab switch, every tab is reachable from every tab.
#[derive(Debug, Clone, Default)]
pub struct Router {
    current: Tab,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Tab {
        self.current
    }

    pub fn set_tab(&mut self, tab: Tab) -> TabChange {
        let change = TabChange {
            from: self.current,
            to: tab,
            reselected: self.current == tab,
        };
        self.current = tab;
        change
    }

    /// Order goes back to the cart, the cart to the menu, everything else home.
    pub fn back(&mut self) -> TabChange {
        let target = match self.current {
            Tab::Order => Tab::Cart,
            Tab::Cart => Tab::Menu,
            _ => Tab::Home,
        };
        self.set_tab(target)
    }

    pub fn back_button_visible(&self) -> bool {
        matches!(self.current, Tab::Cart | Tab::Order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_tab_from_any_tab() {
        let mut router = Router::new();
        assert_eq!(router.current(), Tab::Home);

        let change = router.set_tab(Tab::Order);
        assert_eq!(change.from, Tab::Home);
        assert_eq!(change.to, Tab::Order);
        assert!(!change.reselected);

        assert!(router.set_tab(Tab::Order).reselected);
    }

    #[test]
    fn back_walks_order_cart_menu_home() {
        let mut router = Router::new();
        router.set_tab(Tab::Order);
        assert!(router.back_button_visible());

        assert_eq!(router.back().to, Tab::Cart);
        assert_eq!(router.back().to, Tab::Menu);
        assert!(!router.back_button_visible());
        assert_eq!(router.back().to, Tab::Home);
    }

    #[test]
    fn tab_names_parse() {
        for tab in Tab::NAVIGATION {
            assert_eq!(tab.as_str().parse::<Tab>(), Ok(tab));
        }
        assert!("settings".parse::<Tab>().is_err());
    }
}
