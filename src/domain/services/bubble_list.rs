#[cfg(test)]
#[path = "bubble_list_test.rs"]
mod tests;

use std::collections::HashMap;

use ratatui::prelude::Backend;
use ratatui::prelude::Rect;
use ratatui::text::Line;
use ratatui::widgets::Block;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::Bubble;
use super::BubbleAlignment;
use crate::domain::models::Author;
use crate::domain::models::Message;

struct BubbleCacheEntry {
    text_len: usize,
    lines: Vec<Line<'static>>,
}

fn alignment(message: &Message) -> BubbleAlignment {
    if message.author == Author::User {
        return BubbleAlignment::Right;
    }

    return BubbleAlignment::Left;
}

/// Rendered transcript. Messages are append-only, so bubbles are cached by index and only
/// re-rendered when the window width changes. The typing indicator is never cached.
pub struct BubbleList {
    cache: HashMap<usize, BubbleCacheEntry>,
    line_width: usize,
    lines_len: usize,
    typing_lines: Vec<Line<'static>>,
}

impl Default for BubbleList {
    fn default() -> BubbleList {
        return BubbleList {
            cache: HashMap::new(),
            line_width: 0,
            lines_len: 0,
            typing_lines: vec![],
        };
    }
}

impl BubbleList {
    pub fn set_messages(&mut self, messages: &[Message], typing: Option<&Message>, line_width: usize) {
        if self.line_width != line_width {
            self.cache.clear();
            self.line_width = line_width;
        }

        // The transcript may have been reset to a shorter one.
        self.cache.retain(|idx, _| return *idx < messages.len());

        let messages_len: usize = messages
            .iter()
            .enumerate()
            .map(|(idx, message)| {
                if let Some(cache_entry) = self.cache.get(&idx) {
                    if message.text.len() == cache_entry.text_len {
                        return cache_entry.lines.len();
                    }
                }

                let bubble_lines = Bubble::new(message, alignment(message), line_width).as_lines();
                let bubble_line_len = bubble_lines.len();

                self.cache.insert(
                    idx,
                    BubbleCacheEntry {
                        text_len: message.text.len(),
                        lines: bubble_lines,
                    },
                );

                return bubble_line_len;
            })
            .sum();

        self.typing_lines = match typing {
            Some(message) => Bubble::new(message, alignment(message), line_width).as_lines(),
            None => vec![],
        };

        self.lines_len = messages_len + self.typing_lines.len();
    }

    pub fn clear(&mut self) {
        self.cache.clear();
        self.typing_lines = vec![];
        self.lines_len = 0;
    }

    pub fn len(&self) -> usize {
        return self.lines_len;
    }

    pub fn render<B: Backend>(&self, frame: &mut Frame<B>, rect: Rect, scroll: u16) {
        let mut indexes: Vec<usize> = self.cache.keys().cloned().collect();
        indexes.sort();
        let mut lines: Vec<Line<'static>> = indexes
            .iter()
            .filter_map(|idx| return self.cache.get(idx))
            .flat_map(|entry| return entry.lines.to_owned())
            .collect();
        lines.extend(self.typing_lines.to_owned());

        frame.render_widget(
            Paragraph::new(lines)
                .block(Block::default())
                .scroll((scroll, 0)),
            rect,
        );
    }
}
