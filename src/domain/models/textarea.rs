use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Padding;

pub const URL_INPUT_TITLE: &str = "Website URL (Enter to scrape)";
pub const MESSAGE_INPUT_TITLE: &str = "Ask a question about the website...";

pub struct TextArea {}

impl<'a> TextArea {
    pub fn url() -> tui_textarea::TextArea<'a> {
        let mut textarea = tui_textarea::TextArea::default();
        TextArea::set_focus(&mut textarea, URL_INPUT_TITLE, true);

        return textarea;
    }

    pub fn message() -> tui_textarea::TextArea<'a> {
        let mut textarea = tui_textarea::TextArea::default();
        TextArea::set_focus(&mut textarea, MESSAGE_INPUT_TITLE, false);

        return textarea;
    }

    /// Dims the border of whichever input does not hold focus.
    pub fn set_focus(textarea: &mut tui_textarea::TextArea<'a>, title: &str, focused: bool) {
        let mut style = Style::default().fg(Color::DarkGray);
        if focused {
            style = Style::default();
        }

        textarea.set_cursor_line_style(Style::default());
        textarea.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(style)
                .title(title.to_string())
                .padding(Padding::new(1, 1, 0, 0)),
        );
    }
}
