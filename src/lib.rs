pub mod app;
pub mod config;
pub mod entry_editor;
pub mod entry_list;
pub mod entry_store;
pub mod error;
pub mod journal_entry;
pub mod logging;
pub mod storage;
pub mod text_input;
pub mod theme;
pub mod ui;
