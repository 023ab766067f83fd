use crate::journal_entry::{Entry, EntryId};

/// Case-insensitive substring match on entry text. A blank query keeps
/// every entry.
pub fn filter(entries: &[Entry], query: &str) -> Vec<Entry> {
    if query.trim().is_empty() {
        return entries.to_vec();
    }
    let query = query.to_lowercase();
    entries
        .iter()
        .filter(|e| e.text.to_lowercase().contains(&query))
        .cloned()
        .collect()
}

/// The first `n` entries. The list is already newest first.
pub fn recent(entries: &[Entry], n: usize) -> Vec<Entry> {
    entries.iter().take(n).cloned().collect()
}

/// Browse state for the explore screen: the loaded list, the search box,
/// the visible projection and the highlighted row.
#[derive(Debug, Default)]
pub struct EntryListView {
    entries: Vec<Entry>,
    query: String,
    visible: Vec<Entry>,
    selected: usize,
}

impl EntryListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_entries(&mut self, entries: Vec<Entry>) {
        self.entries = entries;
        self.refresh();
    }

    pub fn set_query(&mut self, query: &str) {
        if self.query != query {
            self.query = query.to_owned();
            self.refresh();
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn visible(&self) -> &[Entry] {
        &self.visible
    }

    pub fn selected_index(&self) -> Option<usize> {
        if self.visible.is_empty() {
            None
        } else {
            Some(self.selected)
        }
    }

    pub fn selected(&self) -> Option<&Entry> {
        self.visible.get(self.selected)
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.visible.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn refresh(&mut self) {
        let keep = self.selected().map(|e| e.id);
        self.visible = filter(&self.entries, &self.query);
        self.selected = keep
            .and_then(|id| self.visible.iter().position(|e| e.id == id))
            .unwrap_or(0)
            .min(self.visible.len().saturating_sub(1));
    }
}
