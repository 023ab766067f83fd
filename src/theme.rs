use std::sync::Arc;

use ratatui::style::Color;
use tokio::sync::watch;

use crate::storage::KeyValueStorage;

pub const THEME_KEY: &str = "themePreference";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark(is_dark: bool) -> Self {
        if is_dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn toggled(self) -> Self {
        Theme::from_dark(!self.is_dark())
    }

    fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                background: Color::Rgb(249, 250, 251),
                surface: Color::White,
                border: Color::Rgb(229, 231, 235),
                text: Color::Rgb(31, 41, 55),
                muted: Color::Rgb(107, 114, 128),
                accent: Color::Rgb(34, 197, 94),
                title: Color::Cyan,
                hint: Color::Rgb(180, 83, 9),
                error: Color::Red,
            },
            Theme::Dark => Palette {
                background: Color::Rgb(17, 24, 39),
                surface: Color::Rgb(31, 41, 55),
                border: Color::Rgb(55, 65, 81),
                text: Color::Rgb(229, 231, 235),
                muted: Color::Rgb(156, 163, 175),
                accent: Color::Rgb(34, 197, 94),
                title: Color::Cyan,
                hint: Color::Yellow,
                error: Color::LightRed,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub surface: Color,
    pub border: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub title: Color,
    pub hint: Color,
    pub error: Color,
}

/// The dark/light flag shared by everything that renders.
#[derive(Debug)]
pub struct ThemeContext {
    tx: watch::Sender<Theme>,
}

impl ThemeContext {
    pub fn new(initial: Theme) -> Self {
        ThemeContext {
            tx: watch::Sender::new(initial),
        }
    }

    pub fn get(&self) -> Theme {
        *self.tx.borrow()
    }

    pub fn is_dark_mode(&self) -> bool {
        self.get().is_dark()
    }

    pub fn set(&self, theme: Theme) {
        self.tx.send_if_modified(|current| {
            let changed = *current != theme;
            *current = theme;
            changed
        });
    }

    pub fn toggle(&self) -> Theme {
        let next = self.get().toggled();
        self.set(next);
        next
    }

    /// Receivers see every change made after they subscribe.
    pub fn subscribe(&self) -> watch::Receiver<Theme> {
        self.tx.subscribe()
    }
}

impl Default for ThemeContext {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

/// Persists the theme flag next to the journal entries.
#[derive(Clone)]
pub struct ThemeStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl ThemeStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        ThemeStore { storage }
    }

    /// `None` when nothing usable is stored; a failed read is logged.
    pub async fn load(&self) -> Option<Theme> {
        match self.storage.get_item(THEME_KEY).await {
            Ok(Some(value)) => {
                let theme = Theme::parse(&value);
                if theme.is_none() {
                    tracing::warn!(value = %value, "ignoring unrecognised theme preference");
                }
                theme
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "could not read theme preference");
                None
            }
        }
    }

    pub async fn save(&self, theme: Theme) -> std::io::Result<()> {
        self.storage
            .set_item(THEME_KEY, theme.as_str().to_owned())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn defaults_to_light() {
        let ctx = ThemeContext::default();
        assert!(!ctx.is_dark_mode());
    }

    #[test]
    fn toggle_flips_and_notifies() {
        let ctx = ThemeContext::new(Theme::Light);
        let mut rx = ctx.subscribe();
        assert!(!rx.has_changed().unwrap());

        assert_eq!(ctx.toggle(), Theme::Dark);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Theme::Dark);

        ctx.toggle();
        assert_eq!(ctx.get(), Theme::Light);
    }

    #[test]
    fn setting_the_same_theme_is_silent() {
        let ctx = ThemeContext::new(Theme::Dark);
        let rx = ctx.subscribe();
        ctx.set(Theme::Dark);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn palettes_differ() {
        assert_ne!(Theme::Light.palette().background, Theme::Dark.palette().background);
    }

    #[tokio::test]
    async fn preference_round_trips_through_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let themes = ThemeStore::new(storage.clone());
        assert_eq!(themes.load().await, None);

        themes.save(Theme::Dark).await.unwrap();
        assert_eq!(themes.load().await, Some(Theme::Dark));

        storage
            .set_item(THEME_KEY, "purple".into())
            .await
            .unwrap();
        assert_eq!(themes.load().await, None);
    }
}
