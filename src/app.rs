use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::watch;

use crate::entry_editor::{EntryEditor, MoodPolicy};
use crate::entry_list::{self, EntryListView};
use crate::entry_store::EntryStore;
use crate::error::StoreError;
use crate::journal_entry::{Entry, EntryId, IdGenerator};
use crate::text_input::TextInput;
use crate::theme::{Theme, ThemeContext, ThemeStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Journal,
    Explore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A blocking message; any key dismisses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: &'static str,
    pub message: String,
}

impl Notice {
    fn success(title: &'static str, message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Success,
            title,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Error,
            title: "Error",
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub enum Modal {
    /// Full text of one entry.
    View(Entry),
    Edit(EntryEditor),
    ConfirmDelete(EntryId),
}

/// What the user asked for, independent of which key produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Save,
    Edit(EntryId),
    Delete(EntryId),
    ConfirmDelete,
    Search(String),
    ToggleTheme,
    SwitchScreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct App {
    store: EntryStore,
    ids: IdGenerator,
    theme: ThemeContext,
    theme_rx: watch::Receiver<Theme>,
    theme_store: Option<ThemeStore>,
    recent_limit: usize,

    pub(crate) screen: Screen,
    pub(crate) composer: EntryEditor,
    pub(crate) recent: Vec<Entry>,
    pub(crate) list: EntryListView,
    pub(crate) search: TextInput,
    pub(crate) modal: Option<Modal>,
    pub(crate) notice: Option<Notice>,
}

impl App {
    pub fn new(
        store: EntryStore,
        theme: ThemeContext,
        theme_store: Option<ThemeStore>,
        policy: MoodPolicy,
        recent_limit: usize,
    ) -> Self {
        let theme_rx = theme.subscribe();
        let mut composer = EntryEditor::new(policy);
        composer.begin_new();
        App {
            store,
            ids: IdGenerator::new(),
            theme,
            theme_rx,
            theme_store,
            recent_limit,
            screen: Screen::Journal,
            composer,
            recent: Vec::new(),
            list: EntryListView::new(),
            search: TextInput::single_line(),
            modal: None,
            notice: None,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme.get()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn entries(&self) -> &[Entry] {
        self.list.entries()
    }

    pub fn visible_entries(&self) -> &[Entry] {
        self.list.visible()
    }

    pub fn recent_entries(&self) -> &[Entry] {
        &self.recent
    }

    pub fn composer(&self) -> &EntryEditor {
        &self.composer
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    /// Loads the stored list. A read failure leaves an empty journal and
    /// tells the user.
    pub async fn start(&mut self) {
        self.refresh().await;
    }

    pub async fn dispatch(&mut self, intent: Intent) {
        tracing::debug!(?intent, "dispatch");
        match intent {
            Intent::Save => self.save().await,
            Intent::Edit(id) => match self.list.get(id) {
                Some(entry) => {
                    let mut editor = EntryEditor::new(self.composer.policy());
                    editor.begin_edit(entry);
                    self.modal = Some(Modal::Edit(editor));
                }
                None => self.notice = Some(Notice::error("That entry no longer exists.")),
            },
            Intent::Delete(id) => self.modal = Some(Modal::ConfirmDelete(id)),
            Intent::ConfirmDelete => {
                if let Some(Modal::ConfirmDelete(id)) = self.modal.take() {
                    self.delete(id).await;
                }
            }
            Intent::Search(query) => self.list.set_query(&query),
            Intent::ToggleTheme => {
                let theme = self.theme.toggle();
                tracing::info!(dark = theme.is_dark(), "theme toggled");
            }
            Intent::SwitchScreen => {
                self.screen = match self.screen {
                    Screen::Journal => Screen::Explore,
                    Screen::Explore => Screen::Journal,
                };
                self.refresh().await;
            }
        }
        self.persist_theme().await;
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Control {
        if key.kind == KeyEventKind::Release {
            return Control::Continue;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c')) {
            return Control::Quit;
        }
        if self.notice.take().is_some() {
            return Control::Continue;
        }
        if ctrl && key.code == KeyCode::Char('t') {
            self.dispatch(Intent::ToggleTheme).await;
            return Control::Continue;
        }

        match self.modal.take() {
            Some(modal) => self.handle_modal_key(modal, key, ctrl).await,
            None => match self.screen {
                Screen::Journal => self.handle_journal_key(key, ctrl).await,
                Screen::Explore => self.handle_explore_key(key, ctrl).await,
            },
        }
        Control::Continue
    }

    async fn handle_journal_key(&mut self, key: KeyEvent, ctrl: bool) {
        match key.code {
            KeyCode::Tab => self.dispatch(Intent::SwitchScreen).await,
            KeyCode::Char('s') if ctrl => self.dispatch(Intent::Save).await,
            KeyCode::Char('n') if ctrl => self.composer.cycle_mood(true),
            KeyCode::Char('p') if ctrl => self.composer.cycle_mood(false),
            _ => edit_text(self.composer.input_mut(), key, ctrl),
        }
    }

    async fn handle_explore_key(&mut self, key: KeyEvent, ctrl: bool) {
        let selected = self.list.selected().map(|e| e.id);
        match key.code {
            KeyCode::Tab => self.dispatch(Intent::SwitchScreen).await,
            KeyCode::Up => self.list.select_previous(),
            KeyCode::Down => self.list.select_next(),
            KeyCode::Enter => {
                if let Some(entry) = self.list.selected() {
                    self.modal = Some(Modal::View(entry.clone()));
                }
            }
            KeyCode::Char('e') if ctrl => {
                if let Some(id) = selected {
                    self.dispatch(Intent::Edit(id)).await;
                }
            }
            KeyCode::Char('d') if ctrl => {
                if let Some(id) = selected {
                    self.dispatch(Intent::Delete(id)).await;
                }
            }
            KeyCode::Esc => {
                self.search.clear();
                self.dispatch(Intent::Search(String::new())).await;
            }
            _ => {
                edit_text(&mut self.search, key, ctrl);
                let query = self.search.text().to_owned();
                self.dispatch(Intent::Search(query)).await;
            }
        }
    }

    async fn handle_modal_key(&mut self, modal: Modal, key: KeyEvent, ctrl: bool) {
        match modal {
            Modal::View(_) => {}
            Modal::ConfirmDelete(id) => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.modal = Some(Modal::ConfirmDelete(id));
                    self.dispatch(Intent::ConfirmDelete).await;
                }
                _ => tracing::debug!(%id, "delete cancelled"),
            },
            Modal::Edit(mut editor) => match key.code {
                KeyCode::Esc => editor.cancel(),
                KeyCode::Char('s') if ctrl => {
                    self.modal = Some(Modal::Edit(editor));
                    self.dispatch(Intent::Save).await;
                }
                KeyCode::Char('n') if ctrl => {
                    editor.cycle_mood(true);
                    self.modal = Some(Modal::Edit(editor));
                }
                KeyCode::Char('p') if ctrl => {
                    editor.cycle_mood(false);
                    self.modal = Some(Modal::Edit(editor));
                }
                _ => {
                    edit_text(editor.input_mut(), key, ctrl);
                    self.modal = Some(Modal::Edit(editor));
                }
            },
        }
    }

    /// Saves the open edit modal if there is one, the composer otherwise.
    async fn save(&mut self) {
        match self.modal.take() {
            Some(Modal::Edit(mut editor)) => {
                match editor.save(&self.store, &mut self.ids).await {
                    Ok(entries) => {
                        self.apply(entries);
                        self.notice =
                            Some(Notice::success("Success", "Entry updated successfully"));
                    }
                    Err(e) => {
                        self.notice = Some(failure(&e, "Could not update the entry"));
                        self.modal = Some(Modal::Edit(editor));
                    }
                }
                return;
            }
            other => self.modal = other,
        }

        match self.composer.save(&self.store, &mut self.ids).await {
            Ok(entries) => {
                self.apply(entries);
                self.composer.begin_new();
                self.notice = Some(Notice::success(
                    "Saved!",
                    "Your entry was saved successfully.",
                ));
            }
            Err(e) => self.notice = Some(failure(&e, "Could not save your entry.")),
        }
    }

    async fn delete(&mut self, id: EntryId) {
        match self.store.delete(id).await {
            Ok(Some(entries)) => {
                self.apply(entries);
                self.notice = Some(Notice::success("Success", "Entry deleted successfully"));
            }
            Ok(None) => self.refresh().await,
            Err(e) => {
                tracing::error!(error = %e, %id, "error deleting entry");
                self.notice = Some(failure(&e, "Could not delete the entry"));
            }
        }
    }

    async fn refresh(&mut self) {
        match self.store.load().await {
            Ok(entries) => self.apply(entries),
            Err(e) => {
                tracing::error!(error = %e, "error loading entries");
                self.apply(Vec::new());
                self.notice = Some(Notice::error(e.user_message()));
            }
        }
    }

    fn apply(&mut self, entries: Vec<Entry>) {
        self.ids.observe(&entries);
        self.recent = entry_list::recent(&entries, self.recent_limit);
        self.list.set_entries(entries);
    }

    async fn persist_theme(&mut self) {
        if !self.theme_rx.has_changed().unwrap_or(false) {
            return;
        }
        let theme = *self.theme_rx.borrow_and_update();
        if let Some(themes) = &self.theme_store {
            if let Err(e) = themes.save(theme).await {
                tracing::warn!(error = %e, "could not persist theme preference");
            }
        }
    }
}

fn failure(err: &StoreError, fallback: &str) -> Notice {
    match err {
        StoreError::Validation(_) => Notice::error(err.user_message()),
        _ => Notice::error(fallback),
    }
}

fn edit_text(input: &mut TextInput, key: KeyEvent, ctrl: bool) {
    match key.code {
        KeyCode::Char(c) if !ctrl => input.insert(c),
        KeyCode::Enter => input.insert('\n'),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Up => input.move_up(),
        KeyCode::Down => input.move_down(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        _ => {}
    }
}
