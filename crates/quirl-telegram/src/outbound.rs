// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound conversion: channel-agnostic menus and media sources to
//! Telegram types.

use teloxide::types::{FileId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile};
use tracing::warn;

use quirl_core::types::{MediaSource, Menu, MenuAction};

/// Converts a [`Menu`] into an inline keyboard.
///
/// Buttons with malformed URLs are dropped with a warning instead of
/// failing the whole send.
pub fn to_markup(menu: &Menu) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = menu
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .filter_map(|button| match &button.action {
                    MenuAction::Callback(data) => Some(InlineKeyboardButton::callback(
                        button.label.clone(),
                        data.clone(),
                    )),
                    MenuAction::Url(url) => match url.parse() {
                        Ok(url) => Some(InlineKeyboardButton::url(button.label.clone(), url)),
                        Err(e) => {
                            warn!(%url, error = %e, "dropping menu button with bad url");
                            None
                        }
                    },
                })
                .collect()
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}

/// Converts a [`MediaSource`] into a Telegram input file.
///
/// Local artifact paths are uploaded; file references re-send content
/// already stored on Telegram servers.
pub fn to_input_file(source: &MediaSource) -> InputFile {
    match source {
        MediaSource::Path(path) => InputFile::file(path.clone()),
        MediaSource::FileRef(file_ref) => InputFile::file_id(FileId(file_ref.0.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quirl_core::types::MenuButton;

    #[test]
    fn markup_preserves_grid_shape() {
        let menu = Menu::new(vec![
            vec![
                MenuButton::callback("A", "a"),
                MenuButton::callback("B", "b"),
            ],
            vec![MenuButton::url("Open", "https://t.me/example")],
        ]);
        let markup = to_markup(&menu);
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0].len(), 2);
        assert_eq!(markup.inline_keyboard[1].len(), 1);
    }

    #[test]
    fn bad_url_buttons_are_dropped() {
        let menu = Menu::new(vec![vec![
            MenuButton::url("Broken", "not a url"),
            MenuButton::callback("Fine", "ok"),
        ]]);
        let markup = to_markup(&menu);
        assert_eq!(markup.inline_keyboard[0].len(), 1);
    }
}
