use crate::entry_store::EntryStore;
use crate::error::{StoreError, ValidationError};
use crate::journal_entry::{Clock, Entry, IdGenerator, Mood};
use crate::text_input::TextInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoodPolicy {
    #[default]
    Required,
    Optional,
}

pub fn validate(text: &str, mood: Option<Mood>, policy: MoodPolicy) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyText);
    }
    if policy == MoodPolicy::Required && mood.is_none() {
        return Err(ValidationError::MissingMood);
    }
    Ok(())
}

pub fn create_entry<C: Clock>(ids: &mut IdGenerator<C>, text: &str, mood: Option<Mood>) -> Entry {
    let (id, date) = ids.stamp();
    Entry::new(id, date, text.to_owned(), mood)
}

/// Same id and date as `existing`, new text and mood.
pub fn apply_edit(existing: &Entry, text: &str, mood: Option<Mood>) -> Entry {
    Entry {
        id: existing.id,
        date: existing.date,
        text: text.to_owned(),
        mood,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum EditorMode {
    New,
    Edit(Entry),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Idle,
    Composing,
    Saving,
    /// The last save failed; input is kept and the next edit resumes
    /// composing.
    Error,
}

/// Form state for writing a new entry or editing an existing one.
#[derive(Debug)]
pub struct EntryEditor {
    text: TextInput,
    mood: Option<Mood>,
    mode: EditorMode,
    state: EditorState,
    policy: MoodPolicy,
}

impl EntryEditor {
    pub fn new(policy: MoodPolicy) -> Self {
        EntryEditor {
            text: TextInput::multi_line(),
            mood: None,
            mode: EditorMode::New,
            state: EditorState::Idle,
            policy,
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn policy(&self) -> MoodPolicy {
        self.policy
    }

    pub fn text(&self) -> &str {
        self.text.text()
    }

    pub fn input(&self) -> &TextInput {
        &self.text
    }

    pub fn mood(&self) -> Option<Mood> {
        self.mood
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, EditorMode::Edit(_))
    }

    pub fn begin_new(&mut self) {
        self.mode = EditorMode::New;
        self.text.clear();
        self.mood = None;
        self.state = EditorState::Composing;
    }

    pub fn begin_edit(&mut self, entry: &Entry) {
        self.text.set_text(&entry.text);
        self.mood = entry.mood;
        self.mode = EditorMode::Edit(entry.clone());
        self.state = EditorState::Composing;
    }

    pub fn cancel(&mut self) {
        self.clear();
    }

    /// Mutable access to the text, which also leaves the error state.
    pub fn input_mut(&mut self) -> &mut TextInput {
        self.resume();
        &mut self.text
    }

    pub fn select_mood(&mut self, mood: Mood) {
        self.resume();
        self.mood = Some(mood);
    }

    pub fn cycle_mood(&mut self, forward: bool) {
        self.select_mood(Mood::cycle(self.mood, forward));
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(self.text.text(), self.mood, self.policy)
    }

    /// Validates, writes the full updated list and clears the form.
    ///
    /// Returns the list as now stored. On failure the form keeps its input:
    /// a validation error leaves it composing, a storage error moves it to
    /// [`EditorState::Error`].
    pub async fn save<C: Clock>(
        &mut self,
        store: &EntryStore,
        ids: &mut IdGenerator<C>,
    ) -> Result<Vec<Entry>, StoreError> {
        self.resume();
        self.validate()?;

        self.state = EditorState::Saving;
        let result = match &self.mode {
            EditorMode::New => {
                let entry = create_entry(ids, self.text.text(), self.mood);
                store.add(entry).await
            }
            EditorMode::Edit(existing) => {
                let entry = apply_edit(existing, self.text.text(), self.mood);
                match store.update(entry).await {
                    Ok(Some(entries)) => Ok(entries),
                    Ok(None) => store.load().await,
                    Err(e) => Err(e),
                }
            }
        };

        match result {
            Ok(entries) => {
                self.clear();
                Ok(entries)
            }
            Err(e) => {
                tracing::error!(error = %e, "error saving entry");
                self.state = EditorState::Error;
                Err(e)
            }
        }
    }

    fn resume(&mut self) {
        if matches!(self.state, EditorState::Error | EditorState::Idle) {
            self.state = EditorState::Composing;
        }
    }

    fn clear(&mut self) {
        self.text.clear();
        self.mood = None;
        self.mode = EditorMode::New;
        self.state = EditorState::Idle;
    }
}
