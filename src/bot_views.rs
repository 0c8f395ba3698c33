use chrono::NaiveDate;
use teloxide::{
    types::{InlineKeyboardButton, InlineKeyboardMarkup},
    utils::markdown::{bold, escape, italic},
};

use crate::{
    booking::{BookingScreen, TableStatus},
    calendar::{CalendarView, WEEKDAYS_RU},
    constants::{LOAD_FAILED_MSG, NO_INIT_DATA_MSG},
    data_types::{
        booking_data_types::BookingField, menu_data_types::Dish, order_data_types::OrderType,
        profile_data_types::ProfileField, CallbackAction,
    },
    menu::MenuKind,
    orders::OrderPhase,
    profile::{ProfileScreen, ProfileSection, SaveState},
    router::Tab,
    session::MiniApp,
};

type Row = Vec<InlineKeyboardButton>;

fn button(text: impl Into<String>, action: CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, action.to_string())
}

fn bold_text(text: &str) -> String {
    bold(&escape(text))
}

fn italic_text(text: &str) -> String {
    italic(&escape(text))
}

fn marked(text: &str, active: bool) -> String {
    if active {
        format!("• {} •", text)
    } else {
        text.to_string()
    }
}

fn price(value: f64) -> String {
    format!("{} ₽", value.floor())
}

fn date_label(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// The current screen of the app as MarkdownV2 text and inline keyboard.
pub fn render(app: &MiniApp) -> (String, InlineKeyboardMarkup) {
    let (text, mut rows) = if !app.is_authenticated() && app.current_tab() == Tab::Home {
        (escape(NO_INIT_DATA_MSG), Vec::new())
    } else {
        match app.current_tab() {
            Tab::Home => render_home(app),
            Tab::Menu => render_menu(app),
            Tab::Booking => render_booking(app.booking()),
            Tab::Profile => render_profile(app.profile()),
            Tab::Cart => render_cart(app),
            Tab::Order => render_order(app),
        }
    };

    rows.push(navigation_row(app));
    (text, InlineKeyboardMarkup::new(rows))
}

fn navigation_row(app: &MiniApp) -> Row {
    let mut row = Vec::new();
    if app.host().back_button_visible() {
        row.push(button("←", CallbackAction::Back));
    }
    row.extend(Tab::NAVIGATION.iter().map(|tab| {
        button(
            marked(tab.title(), *tab == app.current_tab()),
            CallbackAction::Tab(*tab),
        )
    }));
    row.push(button("⟳", CallbackAction::Refresh));
    row
}

fn dish_line(dish: &Dish) -> String {
    let mut line = format!(
        "{} {}",
        bold_text(&dish.name),
        escape(&format!("· {}", price(dish.price)))
    );
    if let Some(portion) = dish.portion_label() {
        line.push_str(&format!(" {}", italic_text(portion)));
    }
    line
}

fn dish_buttons(app: &MiniApp, dish: &Dish) -> Row {
    let count = app.state().cart().count_of(dish.id);
    if count == 0 {
        vec![button(
            format!("+ {}", dish.name),
            CallbackAction::AddToCart(dish.id),
        )]
    } else {
        vec![
            button(
                "−",
                CallbackAction::ChangeCount {
                    id: dish.id,
                    delta: -1,
                },
            ),
            button(format!("{} × {}", dish.name, count), CallbackAction::Tab(Tab::Cart)),
            button(
                "+",
                CallbackAction::ChangeCount {
                    id: dish.id,
                    delta: 1,
                },
            ),
        ]
    }
}

fn cart_button(app: &MiniApp) -> Option<Row> {
    let count = app.state().cart().total_count();
    (count > 0).then(|| {
        vec![button(
            format!("🛒 Корзина ({})", count),
            CallbackAction::Tab(Tab::Cart),
        )]
    })
}

fn render_home(app: &MiniApp) -> (String, Vec<Row>) {
    let state = app.state();
    let mut text = vec![bold_text(Tab::Home.title()), String::new()];
    let mut rows = Vec::new();

    let achievement = state.achievement_state();
    if achievement.is_loading() {
        text.push(italic_text("Загрузка…"));
    } else if achievement.has_error() {
        text.push(escape(LOAD_FAILED_MSG));
    } else if let Some(achievement) = state.achievement() {
        text.push(format!("🏆 {}", bold_text(&achievement.name)));
        if let Some(description) = &achievement.description {
            text.push(escape(description));
        }
        if let Some(points) = achievement.required_points {
            text.push(italic_text(&format!("{} перепелок", points)));
        }
    }

    text.push(String::new());
    text.push(bold_text("Новинки"));
    let novelty = state.novelty();
    if novelty.has_error() {
        text.push(escape(LOAD_FAILED_MSG));
    } else {
        for dish in novelty.items().iter().filter(|d| !d.is_archived) {
            text.push(dish_line(dish));
            rows.push(dish_buttons(app, dish));
        }
    }

    rows.push(vec![
        button("Меню", CallbackAction::Tab(Tab::Menu)),
        button("Забронировать столик", CallbackAction::Tab(Tab::Booking)),
    ]);
    rows.extend(cart_button(app));
    rows.push(vec![button("Закрыть", CallbackAction::Close)]);
    (text.join("\n"), rows)
}

fn render_menu(app: &MiniApp) -> (String, Vec<Row>) {
    let state = app.state();
    let menu = app.menu();
    let mut rows = vec![[MenuKind::Menu, MenuKind::Bar]
        .into_iter()
        .map(|kind| {
            button(
                marked(kind.title(), kind == menu.kind()),
                CallbackAction::MenuKind(kind),
            )
        })
        .collect::<Row>()];

    let mut text = vec![bold_text(menu.kind().title())];

    if state.categories().has_error() {
        text.push(escape(LOAD_FAILED_MSG));
        return (text.join("\n"), rows);
    }

    let active = menu.active_category(state);
    let categories = menu.categories(state);
    for chunk in categories.chunks(3) {
        rows.push(
            chunk
                .iter()
                .map(|c| {
                    button(
                        marked(&c.name, active.is_some_and(|a| a.id == c.id)),
                        CallbackAction::Category(c.id),
                    )
                })
                .collect(),
        );
    }

    match active {
        Some(category) => {
            text.push(String::new());
            text.push(bold_text(&category.name));
            let dishes = menu.dishes(state);
            if state.dishes().has_error() {
                text.push(escape(LOAD_FAILED_MSG));
            } else if dishes.is_empty() {
                text.push(italic_text("Здесь пока пусто"));
            }
            for dish in dishes {
                text.push(dish_line(dish));
                rows.push(dish_buttons(app, dish));
            }
        }
        None if state.categories().is_loading() => text.push(italic_text("Загрузка…")),
        None => text.push(italic_text("Категорий нет")),
    }

    rows.extend(cart_button(app));
    (text.join("\n"), rows)
}

fn render_cart(app: &MiniApp) -> (String, Vec<Row>) {
    let cart = app.state().cart();
    let mut text = vec![bold_text(Tab::Cart.title()), String::new()];
    let mut rows = Vec::new();

    if cart.is_empty() {
        text.push(escape("Корзина пуста"));
        rows.push(vec![button("Меню", CallbackAction::Tab(Tab::Menu))]);
        return (text.join("\n"), rows);
    }

    for item in cart.items() {
        text.push(format!(
            "{} {}",
            dish_line(&item.dish),
            escape(&format!("× {} = {}", item.count, price(item.subtotal())))
        ));
        rows.push(vec![
            button(
                "−",
                CallbackAction::ChangeCount {
                    id: item.id(),
                    delta: -1,
                },
            ),
            button(format!("{} × {}", item.dish.name, item.count), CallbackAction::RemoveFromCart(item.id())),
            button(
                "+",
                CallbackAction::ChangeCount {
                    id: item.id(),
                    delta: 1,
                },
            ),
        ]);
    }
    text.push(String::new());
    text.push(format!("Итого: {}", bold_text(&price(cart.total_price()))));

    rows.push(vec![
        button("Очистить", CallbackAction::ClearCart),
        button("Оформить заказ", CallbackAction::Tab(Tab::Order)),
    ]);
    (text.join("\n"), rows)
}

fn render_order(app: &MiniApp) -> (String, Vec<Row>) {
    let order = app.order();
    let cart = app.state().cart();
    let mut text = vec![bold_text(Tab::Order.title()), String::new()];
    let mut rows = Vec::new();

    match order.phase() {
        OrderPhase::Confirmed(placed) => {
            text.push(escape("Заказ оформлен! Спасибо."));
            if let Some(placed) = placed {
                text.push(escape(&format!(
                    "№{} · {}",
                    placed.id,
                    placed.status.label()
                )));
            }
            rows.push(vec![button("Вернуться в меню", CallbackAction::FinishOrder)]);
            return (text.join("\n"), rows);
        }
        OrderPhase::Submitting => text.push(italic_text("Отправка…")),
        OrderPhase::Failed(message) => text.push(italic_text(message)),
        OrderPhase::Editing => {}
    }

    for item in cart.items() {
        text.push(escape(&format!("{} × {}", item.dish.name, item.count)));
    }
    text.push(format!("Итого: {}", bold_text(&price(cart.total_price()))));
    text.push(String::new());

    rows.push(
        [(OrderType::DineIn, "В зале"), (OrderType::Takeaway, "С собой")]
            .into_iter()
            .map(|(mode, label)| {
                button(marked(label, order.mode() == mode), CallbackAction::Fulfillment(mode))
            })
            .collect(),
    );
    if order.mode() == OrderType::DineIn {
        let number = if order.table_number().is_empty() {
            "не указан"
        } else {
            order.table_number()
        };
        text.push(escape(&format!("Столик: {}", number)));
        rows.push(vec![button("Номер столика", CallbackAction::EditTableNumber)]);
    }
    rows.push(vec![button("Отправить заказ", CallbackAction::SubmitOrder)]);
    (text.join("\n"), rows)
}

fn render_booking(booking: &BookingScreen) -> (String, Vec<Row>) {
    if booking.details_sheet().is_visible() {
        return render_booking_details(booking);
    }
    if booking.table_sheet().is_visible() {
        return render_table_sheet(booking);
    }

    let mut text = vec![
        bold_text(Tab::Booking.title()),
        escape(&format!("Дата: {}", date_label(booking.date()))),
    ];
    let mut rows = Vec::new();

    if let Some(calendar) = booking.calendar() {
        rows.extend(calendar_rows(calendar));
        return (text.join("\n"), rows);
    }
    rows.push(vec![button("📅 Выбрать дату", CallbackAction::OpenCalendar)]);

    let slot_buttons: Vec<InlineKeyboardButton> = booking
        .slots()
        .iter()
        .enumerate()
        .map(|(idx, slot)| {
            button(
                marked(&slot.start_str(), idx == booking.active_slot()),
                CallbackAction::ActiveSlot(idx),
            )
        })
        .collect();
    rows.extend(slot_buttons.chunks(4).map(<[_]>::to_vec));

    text.push(escape(&format!("Время: {}", booking.active_time_slot())));
    if booking.availability_failed() {
        text.push(escape(LOAD_FAILED_MSG));
    }
    text.push(italic_text("✅ свободен  ❌ занят"));

    let table_buttons: Vec<InlineKeyboardButton> = booking
        .seating_chart()
        .into_iter()
        .map(|(number, status)| {
            let table = booking.availability().iter().find(|t| t.number == number);
            match (status, table) {
                (TableStatus::Available, Some(table)) => {
                    button(format!("{} ✅", number), CallbackAction::OpenTable(table.id))
                }
                (TableStatus::Booked, Some(table)) => {
                    button(format!("{} ❌", number), CallbackAction::OpenTable(table.id))
                }
                _ => button(format!("{} ·", number), CallbackAction::Refresh),
            }
        })
        .collect();
    rows.extend(table_buttons.chunks(4).map(<[_]>::to_vec));

    (text.join("\n"), rows)
}

fn calendar_rows(calendar: &CalendarView) -> Vec<Row> {
    let mut rows = vec![
        vec![
            button(
                if calendar.can_go_back() { "‹" } else { " " },
                CallbackAction::CalendarPrev,
            ),
            button(calendar.title(), CallbackAction::CloseCalendar),
            button("›", CallbackAction::CalendarNext),
        ],
        WEEKDAYS_RU
            .iter()
            .map(|day| button(*day, CallbackAction::CloseCalendar))
            .collect(),
    ];

    for week in calendar.weeks() {
        rows.push(
            week.iter()
                .map(|cell| match cell {
                    Some(date) if calendar.is_selectable(*date) => {
                        let label = date.format("%-d").to_string();
                        let label = if CalendarView::is_weekend(*date) {
                            format!("{}*", label)
                        } else {
                            label
                        };
                        button(label, CallbackAction::PickDate(*date))
                    }
                    Some(date) => button(
                        format!("({})", date.format("%-d")),
                        CallbackAction::CloseCalendar,
                    ),
                    None => button(" ", CallbackAction::CloseCalendar),
                })
                .collect(),
        );
    }
    rows.push(vec![button("Закрыть", CallbackAction::CloseCalendar)]);
    rows
}

fn render_table_sheet(booking: &BookingScreen) -> (String, Vec<Row>) {
    let mut text = Vec::new();
    if let Some(table) = booking.table() {
        text.push(bold_text(&format!("Столик №{}", table.number)));
        if let Some(capacity) = table.capacity {
            text.push(escape(&format!("Мест: {}", capacity)));
        }
    }
    text.push(escape(&date_label(booking.date())));
    text.push(String::new());

    if booking.table_slots_failed() {
        text.push(escape(LOAD_FAILED_MSG));
    }
    for slot in booking.table_slots() {
        let mark = if slot.is_available { "✅" } else { "❌" };
        text.push(escape(&format!("{} {}", mark, slot.label())));
    }

    let rows = vec![vec![
        button("Закрыть", CallbackAction::CloseTable),
        button("Выбрать время", CallbackAction::ChooseTime),
    ]];
    (text.join("\n"), rows)
}

fn render_booking_details(booking: &BookingScreen) -> (String, Vec<Row>) {
    let form = booking.form();
    let mut text = vec![
        bold_text("Детали бронирования"),
        escape(&date_label(booking.date())),
        String::new(),
    ];
    let mut rows = Vec::new();

    for field in [
        BookingField::Name,
        BookingField::Guests,
        BookingField::Phone,
        BookingField::Wishes,
    ] {
        let value = form.get(field);
        text.push(format!(
            "{}: {}",
            bold_text(field.label()),
            if value.is_empty() {
                italic_text("—")
            } else {
                escape(value)
            }
        ));
        rows.push(vec![button(
            format!("✎ {}", field.label()),
            CallbackAction::EditBooking(field),
        )]);
    }

    let selected = booking.selected_slot();
    let slot_buttons: Vec<InlineKeyboardButton> = booking
        .table_slots()
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.is_available)
        .map(|(idx, slot)| {
            button(
                marked(&slot.start, selected == Some(slot)),
                CallbackAction::ToggleBookingSlot(idx),
            )
        })
        .collect();
    rows.extend(slot_buttons.chunks(4).map(<[_]>::to_vec));

    if let Some(slot) = selected {
        text.push(format!(
            "{}: {}",
            bold_text(BookingField::Slot.label()),
            escape(&slot.label())
        ));
    }

    if !booking.errors().is_empty() {
        text.push(String::new());
        text.extend(booking.errors().values().map(|msg| italic_text(msg)));
    }

    rows.push(vec![
        button("Закрыть", CallbackAction::CloseBooking),
        button(
            if booking.is_submitting() {
                "Отправка…"
            } else {
                "Забронировать"
            },
            CallbackAction::SubmitBooking,
        ),
    ]);
    (text.join("\n"), rows)
}

fn render_profile(profile: &ProfileScreen) -> (String, Vec<Row>) {
    if profile.edit_sheet().is_visible() {
        return render_profile_edit(profile);
    }

    let section = profile.section();
    let mut text = vec![bold_text(section.title()), String::new()];
    let mut rows = Vec::new();

    match section {
        ProfileSection::Main => {
            text.push(bold_text(&profile.display_name()));
            text.push(escape(&profile.username()));
            rows.extend(ProfileSection::LINKS.iter().map(|link| {
                vec![button(link.title(), CallbackAction::ProfileSection(*link))]
            }));
            rows.push(vec![button("Редактировать профиль", CallbackAction::EditProfile)]);
            return (text.join("\n"), rows);
        }
        ProfileSection::Qr => match profile.user() {
            Some(user) => text.push(escape(&format!("ID гостя: {}", user.id))),
            None => text.push(escape(NO_INIT_DATA_MSG)),
        },
        ProfileSection::Achievements => {
            if profile.achievements_failed() {
                text.push(escape(LOAD_FAILED_MSG));
            }
            for achievement in profile.achievements() {
                let mark = if achievement.is_earned { "🏆" } else { "▫️" };
                text.push(format!("{} {}", mark, bold_text(&achievement.name)));
                if let Some(description) = &achievement.description {
                    text.push(escape(description));
                }
            }
        }
        ProfileSection::About => {
            if profile.profile_failed() {
                text.push(escape(LOAD_FAILED_MSG));
            }
            if let Some(user) = profile.profile() {
                let values = [
                    (ProfileField::FirstName, &user.first_name),
                    (ProfileField::LastName, &user.last_name),
                    (ProfileField::PhoneNumber, &user.phone_number),
                    (ProfileField::Birthdate, &user.birthdate),
                    (ProfileField::FavoriteDish, &user.favorite_dish),
                ];
                for (field, value) in values {
                    text.push(format!(
                        "{}: {}",
                        bold_text(field.label()),
                        escape(value.as_deref().unwrap_or("—"))
                    ));
                }
            }
        }
        ProfileSection::Orders => {
            if profile.orders_failed() {
                text.push(escape(LOAD_FAILED_MSG));
            } else if profile.orders().is_empty() {
                text.push(italic_text("Заказов пока нет"));
            }
            for order in profile.orders() {
                text.push(escape(&format!(
                    "№{} · {} · {}{}",
                    order.id,
                    order.status.label(),
                    price(order.total_amount),
                    order
                        .created_at
                        .as_deref()
                        .map(|at| format!(" · {}", at))
                        .unwrap_or_default()
                )));
            }
        }
    }

    rows.push(vec![button(
        "✕ Закрыть",
        CallbackAction::ProfileSection(ProfileSection::Main),
    )]);
    (text.join("\n"), rows)
}

fn render_profile_edit(profile: &ProfileScreen) -> (String, Vec<Row>) {
    let form = profile.form();
    let mut text = vec![bold_text("Редактирование профиля"), String::new()];
    let mut rows = Vec::new();

    for field in ProfileField::ALL {
        let value = form.get(field);
        text.push(format!(
            "{}: {}",
            bold_text(field.label()),
            if value.is_empty() {
                italic_text("—")
            } else {
                escape(value)
            }
        ));
        rows.push(vec![button(
            format!("✎ {}", field.label()),
            CallbackAction::EditProfileField(field),
        )]);
    }

    match profile.save_state() {
        SaveState::Saving => text.push(italic_text("Сохранение…")),
        SaveState::Saved => text.push(italic_text("Сохранено")),
        SaveState::Failed(message) => text.push(italic_text(message)),
        SaveState::Idle => {}
    }

    rows.push(vec![
        button("Закрыть", CallbackAction::CloseProfileEdit),
        button("Сохранить", CallbackAction::SaveProfile),
    ]);
    (text.join("\n"), rows)
}
