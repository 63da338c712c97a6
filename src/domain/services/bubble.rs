#[cfg(test)]
#[path = "bubble_test.rs"]
mod tests;

use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;

use super::markup::fragments;
use super::markup::Fragment;
use super::markup::InlineStyle;
use crate::domain::models::Message;
use crate::domain::models::MessageType;

#[derive(PartialEq, Eq)]
pub enum BubbleAlignment {
    Left,
    Right,
}

pub struct Bubble<'a> {
    alignment: BubbleAlignment,
    message: &'a Message,
    window_max_width: usize,
}

pub struct BubbleConfig {
    pub bubble_padding: usize,
    pub border_elements_length: usize,
    pub outer_padding_percentage: f32,
}

fn width(text: &str) -> usize {
    return text.chars().count();
}

fn repeat_from_subtractions(text: &str, subtractions: Vec<usize>) -> String {
    let mut iter = subtractions.into_iter();
    let first = iter.next().unwrap_or(0) as i64;
    let count = iter.fold(first, |acc, e| return acc - e as i64);

    if count <= 0 {
        return "".to_string();
    }

    return text.repeat(count as usize);
}

pub enum StyledLine {
    Rule,
    Spans(Vec<Span<'static>>),
}

fn fragment_style(style: InlineStyle) -> Style {
    let mut res = Style::default();
    if style.strong {
        res = res.add_modifier(Modifier::BOLD);
    }
    if style.emphasis {
        res = res.add_modifier(Modifier::ITALIC);
    }
    if style.code {
        res = res.fg(Color::Rgb(0, 255, 170));
    }

    return res;
}

fn spans_width(spans: &[Span<'static>]) -> usize {
    return spans.iter().map(|e| return width(&e.content)).sum();
}

/// Terminal rendering of the chat formatting. Links, strong, emphasis and inline code become
/// styles with their markers removed, one entry per line of the message.
pub fn styled_lines(text: &str) -> Vec<StyledLine> {
    let mut lines = vec![];
    let mut current = vec![];
    let mut is_rule = false;

    for fragment in fragments(text) {
        match fragment {
            Fragment::Text(content, style) => {
                current.push(Span::styled(content, fragment_style(style)));
            }
            Fragment::Link(url, style) => {
                current.push(Span::styled(
                    url,
                    fragment_style(style)
                        .fg(Color::Rgb(0, 174, 255))
                        .add_modifier(Modifier::UNDERLINED),
                ));
            }
            Fragment::Rule => is_rule = true,
            Fragment::Break => {
                if is_rule {
                    lines.push(StyledLine::Rule);
                } else {
                    lines.push(StyledLine::Spans(std::mem::take(&mut current)));
                }
                is_rule = false;
            }
        }
    }

    if is_rule {
        lines.push(StyledLine::Rule);
    } else {
        lines.push(StyledLine::Spans(current));
    }

    return lines;
}

fn trim_end(mut spans: Vec<Span<'static>>) -> Vec<Span<'static>> {
    while let Some(last) = spans.pop() {
        let trimmed = last.content.trim_end().to_string();
        if !trimmed.is_empty() {
            spans.push(Span::styled(trimmed, last.style));
            break;
        }
    }

    return spans;
}

/// Word wraps already styled spans, so a style carries over to every line it spans. Widths
/// count only what is displayed.
pub fn wrap_spans(spans: &[Span<'static>], line_max_width: usize) -> Vec<Vec<Span<'static>>> {
    let mut words: Vec<Vec<Span<'static>>> = vec![vec![]];
    for span in spans {
        for (idx, part) in span.content.split(' ').enumerate() {
            if idx > 0 {
                words.push(vec![]);
            }
            if !part.is_empty() {
                if let Some(word) = words.last_mut() {
                    word.push(Span::styled(part.to_string(), span.style));
                }
            }
        }
    }

    let mut lines = vec![];
    let mut char_count = 0;
    let mut current_line: Vec<Span<'static>> = vec![];
    let mut word_count = 0;

    for word in words {
        let word_width = spans_width(&word);
        if word_count > 0 && char_count + word_width > line_max_width {
            lines.push(trim_end(std::mem::take(&mut current_line)));
            char_count = 0;
            word_count = 0;
        }
        if word_count > 0 {
            current_line.push(Span::raw(" "));
        }

        current_line.extend(word);
        char_count += word_width + 1;
        word_count += 1;
    }
    if word_count > 0 {
        lines.push(trim_end(current_line));
    }

    return lines;
}

impl<'a> Bubble<'a> {
    pub fn new(
        message: &'a Message,
        alignment: BubbleAlignment,
        window_max_width: usize,
    ) -> Bubble<'a> {
        return Bubble {
            alignment,
            message,
            window_max_width,
        };
    }

    pub fn style_config() -> BubbleConfig {
        return BubbleConfig {
            // Unicode character border + padding.
            bubble_padding: 8,
            // left border + left padding + (text, not counted) + right padding + right border +
            // scrollbar.
            border_elements_length: 5,
            outer_padding_percentage: 0.04,
        };
    }

    pub fn as_lines(&self) -> Vec<Line<'static>> {
        let max_line_length = self.get_max_line_length();

        let mut lines = vec![];
        for styled_line in styled_lines(&self.message.text) {
            match styled_line {
                StyledLine::Rule => {
                    let rule = Span::styled(
                        "─".repeat(max_line_length),
                        Style::default().fg(Color::DarkGray),
                    );
                    lines.push(self.spans_to_line(vec![rule], max_line_length));
                }
                StyledLine::Spans(spans) => {
                    if spans.iter().all(|e| return e.content.trim().is_empty()) {
                        lines.push(self.spans_to_line(vec![Span::raw(" ")], max_line_length));
                        continue;
                    }

                    for wrapped in wrap_spans(&spans, max_line_length) {
                        lines.push(self.spans_to_line(wrapped, max_line_length));
                    }
                }
            }
        }

        return self.wrap_lines_in_bubble(lines, max_line_length);
    }

    fn spans_to_line(&self, mut spans: Vec<Span<'static>>, max_line_length: usize) -> Line<'static> {
        let line_str_len: usize = spans.iter().map(|e| return width(&e.content)).sum();
        let fill = repeat_from_subtractions(" ", vec![max_line_length, line_str_len]);
        let formatted_line_length =
            line_str_len + width(&fill) + Bubble::style_config().bubble_padding;

        let mut wrapped_spans = vec![self.highlight_span("│ ".to_string())];
        wrapped_spans.append(&mut spans);
        wrapped_spans.push(self.highlight_span(format!("{fill} │")));

        let outer_bubble_padding =
            repeat_from_subtractions(" ", vec![self.window_max_width, formatted_line_length]);

        if self.alignment == BubbleAlignment::Left {
            wrapped_spans.push(Span::from(outer_bubble_padding));
            return Line::from(wrapped_spans);
        }

        let mut line_spans = vec![Span::from(outer_bubble_padding)];
        line_spans.extend(wrapped_spans);

        return Line::from(line_spans);
    }

    fn get_max_line_length(&self) -> usize {
        let style_config = Bubble::style_config();
        // Add a minimum 4% of padding on the side.
        let min_bubble_padding_length = ((self.window_max_width as f32
            * style_config.outer_padding_percentage)
            .ceil()) as usize;

        // Border elements + minimum bubble padding.
        let line_border_width = style_config.border_elements_length + min_bubble_padding_length;

        let mut max_line_length = styled_lines(&self.message.text)
            .iter()
            .map(|line| {
                match line {
                    StyledLine::Rule => return 0,
                    StyledLine::Spans(spans) => return spans_width(spans),
                }
            })
            .max()
            .unwrap_or(0);

        let available = self.window_max_width.saturating_sub(line_border_width);
        if max_line_length > available {
            max_line_length = available;
        }

        let username = self.message.author.to_string();
        if max_line_length < width(&username) {
            max_line_length = width(&username);
        }

        return max_line_length.max(1);
    }

    fn wrap_lines_in_bubble(
        &self,
        lines: Vec<Line<'static>>,
        max_line_length: usize,
    ) -> Vec<Line<'static>> {
        let username = self.message.author.to_string();
        // Add 2 for the vertical bars.
        let top_fill = repeat_from_subtractions("─", vec![max_line_length + 2, width(&username)]);
        let top_bar = format!("╭{username}{top_fill}╮");
        let bottom_bar = format!("╰{}╯", "─".repeat(max_line_length + 2));
        let bar_bubble_padding = repeat_from_subtractions(
            " ",
            vec![
                self.window_max_width,
                max_line_length,
                Bubble::style_config().bubble_padding,
            ],
        );

        let mut res = vec![];
        if self.alignment == BubbleAlignment::Left {
            res.push(self.highlight_line(format!("{top_bar}{bar_bubble_padding}")));
            res.extend(lines);
            res.push(self.highlight_line(format!("{bottom_bar}{bar_bubble_padding}")));
        } else {
            res.push(self.highlight_line(format!("{bar_bubble_padding}{top_bar}")));
            res.extend(lines);
            res.push(self.highlight_line(format!("{bar_bubble_padding}{bottom_bar}")));
        }

        return res;
    }

    fn highlight_span(&self, text: String) -> Span<'static> {
        match self.message.message_type() {
            MessageType::Error => {
                return Span::styled(text, Style::default().fg(Color::Rgb(255, 51, 102)));
            }
            MessageType::Info => {
                return Span::styled(text, Style::default().fg(Color::Rgb(255, 170, 0)));
            }
            MessageType::Normal => return Span::from(text),
        }
    }

    fn highlight_line(&self, text: String) -> Line<'static> {
        return Line::from(self.highlight_span(text));
    }
}
