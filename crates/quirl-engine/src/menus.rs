// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inline menu builders.
//!
//! Callback data is namespaced: `style:`, `size:`, `admin:`, `broadcast:`
//! and `gate:`. The routers match on these prefixes.

use strum::IntoEnumIterator;

use quirl_core::types::{Menu, MenuButton, Style};

/// 3x3 grid of QR color choices, callback data `style:<name>`.
pub fn style_menu() -> Menu {
    let buttons: Vec<MenuButton> = Style::iter()
        .map(|style| {
            let name = style.to_string();
            MenuButton::callback(capitalize(&name), format!("style:{name}"))
        })
        .collect();
    Menu::new(buttons.chunks(3).map(|row| row.to_vec()).collect())
}

/// Size presets plus a custom-entry button, callback data `size:<px>` or
/// `size:custom`. `max_size` is the configured ceiling.
pub fn size_menu(max_size: u32) -> Menu {
    let preset = |px: u32| MenuButton::callback(format!("{px}px"), format!("size:{px}"));
    Menu::new(vec![
        vec![preset(100), preset(150), preset(200)],
        vec![preset(250), preset(300), preset(350)],
        vec![preset(400), preset(450), preset(500)],
        vec![preset(1000), preset(2000), preset(4000)],
        vec![
            MenuButton::callback("Custom (type px)", "size:custom"),
            MenuButton::callback(format!("Max ({max_size}px)"), format!("size:{max_size}")),
        ],
    ])
}

/// Administrator panel menu.
pub fn admin_menu() -> Menu {
    Menu::new(vec![
        vec![MenuButton::callback("Users count", "admin:users")],
        vec![MenuButton::callback("Recent logs", "admin:logs")],
        vec![
            MenuButton::callback("Set gate channel", "admin:set_channel"),
            MenuButton::callback("Unset gate channel", "admin:unset_channel"),
        ],
        vec![MenuButton::callback("Broadcast", "admin:broadcast")],
    ])
}

/// Broadcast confirmation menu.
pub fn confirm_menu() -> Menu {
    Menu::new(vec![
        vec![MenuButton::callback("Yes, send", "broadcast:send")],
        vec![MenuButton::callback("Cancel", "broadcast:cancel")],
    ])
}

/// Gate prompt: a join link when the channel is a public `@username`,
/// an informational button otherwise (no URL can be built for a plain
/// chat id), plus a re-check button.
pub fn gate_menu(channel: &str) -> Menu {
    let mut rows = Vec::new();
    if let Some(name) = channel.strip_prefix('@') {
        rows.push(vec![MenuButton::url(
            "Open channel",
            format!("https://t.me/{name}"),
        )]);
    } else {
        rows.push(vec![MenuButton::callback(
            "Open channel in Telegram",
            "gate:info",
        )]);
    }
    rows.push(vec![MenuButton::callback("I joined, verify", "gate:verify")]);
    Menu::new(rows)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
