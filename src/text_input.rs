use unicode_width::UnicodeWidthChar;

/// Editable text with a cursor. The cursor is a byte offset that always
/// sits on a char boundary.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TextInput {
    content: String,
    cursor: usize,
    multiline: bool,
}

impl TextInput {
    pub fn single_line() -> Self {
        Self::default()
    }

    pub fn multi_line() -> Self {
        TextInput {
            multiline: true,
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.content
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the content and park the cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.content = if self.multiline {
            text.to_owned()
        } else {
            text.replace('\n', " ")
        };
        self.cursor = self.content.len();
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        if c == '\n' && !self.multiline {
            return;
        }
        self.content.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(c) = self.content[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
            self.content.remove(self.cursor);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.content.len() {
            self.content.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if let Some(c) = self.content[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.content[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = self.line_start(self.cursor);
    }

    pub fn move_end(&mut self) {
        self.cursor = self.line_end(self.cursor);
    }

    pub fn move_up(&mut self) {
        let start = self.line_start(self.cursor);
        if start == 0 {
            return;
        }
        let column = self.content[start..self.cursor].chars().count();
        let prev_start = self.line_start(start - 1);
        self.cursor = self.offset_in_line(prev_start, start - 1, column);
    }

    pub fn move_down(&mut self) {
        let end = self.line_end(self.cursor);
        if end == self.content.len() {
            return;
        }
        let start = self.line_start(self.cursor);
        let column = self.content[start..self.cursor].chars().count();
        let next_start = end + 1;
        let next_end = self.line_end(next_start);
        self.cursor = self.offset_in_line(next_start, next_end, column);
    }

    /// Breaks the text into rows of at most `width` display columns and
    /// returns them with the cursor's (row, column) in that layout.
    ///
    /// When the cursor sits after a row that is already full, an empty row
    /// is added for it.
    pub fn wrap(&self, width: u16) -> (Vec<String>, (u16, u16)) {
        let width = usize::from(width.max(1));
        let mut rows = Vec::new();
        let mut cursor = (0, 0);
        let mut start = 0;
        for line in self.content.split('\n') {
            let mut row = String::new();
            let mut used = 0;
            for (i, c) in line.char_indices() {
                let w = c.width().unwrap_or(0);
                if used > 0 && used + w > width {
                    rows.push(std::mem::take(&mut row));
                    used = 0;
                }
                if start + i == self.cursor {
                    cursor = (rows.len(), used);
                }
                row.push(c);
                used += w;
            }
            let cursor_at_end = start + line.len() == self.cursor;
            if cursor_at_end && used >= width {
                rows.push(std::mem::take(&mut row));
                used = 0;
            }
            if cursor_at_end {
                cursor = (rows.len(), used);
            }
            rows.push(row);
            start += line.len() + 1;
        }
        let clamp = |n: usize| u16::try_from(n).unwrap_or(u16::MAX);
        (rows, (clamp(cursor.0), clamp(cursor.1)))
    }

    fn line_start(&self, at: usize) -> usize {
        self.content[..at].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    fn line_end(&self, at: usize) -> usize {
        self.content[at..]
            .find('\n')
            .map(|i| at + i)
            .unwrap_or(self.content.len())
    }

    fn offset_in_line(&self, start: usize, end: usize, column: usize) -> usize {
        self.content[start..end]
            .char_indices()
            .nth(column)
            .map(|(i, _)| start + i)
            .unwrap_or(end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> TextInput {
        let mut input = TextInput::multi_line();
        s.chars().for_each(|c| input.insert(c));
        input
    }

    fn at(input: &TextInput) -> (u16, u16) {
        input.wrap(80).1
    }

    #[test]
    fn edits_around_multibyte_chars() {
        let mut input = typed("héllo");
        input.move_left();
        input.move_left();
        input.move_left();
        input.backspace();
        assert_eq!(input.text(), "hllo");

        input.insert('é');
        input.delete();
        assert_eq!(input.text(), "hélo");
    }

    #[test]
    fn vertical_moves_keep_column_where_possible() {
        let mut input = typed("first line\nab\nthird line");
        input.move_up();
        assert_eq!(at(&input), (1, 2));

        input.move_up();
        assert_eq!(at(&input), (0, 2));

        input.move_end();
        input.move_down();
        assert_eq!(at(&input), (1, 2));

        input.move_down();
        assert_eq!(at(&input), (2, 2));
        input.move_down();
        assert_eq!(at(&input), (2, 2));
    }

    #[test]
    fn single_line_ignores_newlines() {
        let mut input = TextInput::single_line();
        input.insert('a');
        input.insert('\n');
        input.insert('b');
        assert_eq!(input.text(), "ab");

        input.set_text("x\ny");
        assert_eq!(input.text(), "x y");
    }

    #[test]
    fn home_and_end_stay_on_the_current_line() {
        let mut input = typed("one\ntwo");
        input.move_home();
        assert_eq!(input.cursor(), 4);
        input.move_end();
        assert_eq!(input.cursor(), 7);
    }

    #[test]
    fn column_counts_display_width() {
        let input = typed("日本");
        assert_eq!(at(&input), (0, 4));
    }

    #[test]
    fn long_lines_wrap_and_carry_the_cursor() {
        let mut input = typed("abcdefgh\nxy");
        assert_eq!(
            input.wrap(3),
            (vec!["abc".into(), "def".into(), "gh".into(), "xy".into()], (3, 2))
        );

        input.move_up();
        input.move_end();
        assert_eq!(input.wrap(3).1, (2, 2));

        input.set_text("abcdef");
        input.move_end();
        assert_eq!(
            input.wrap(3),
            (vec!["abc".into(), "def".into(), String::new()], (2, 0))
        );

        input.move_home();
        input.move_right();
        input.move_right();
        input.move_right();
        assert_eq!(input.wrap(3).1, (1, 0));
    }

    #[test]
    fn wide_chars_never_straddle_a_row() {
        let input = typed("a日本");
        assert_eq!(input.wrap(4).0, vec!["a日".to_string(), "本".to_string()]);
        assert_eq!(input.wrap(4).1, (1, 2));
    }
}
