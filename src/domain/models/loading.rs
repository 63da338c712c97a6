use ratatui::prelude::Alignment;
use ratatui::prelude::Backend;
use ratatui::prelude::Rect;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Padding;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Wrap;
use ratatui::Frame;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub struct Loading {
    pub text: String,
}

impl Default for Loading {
    fn default() -> Loading {
        return Loading {
            text: "Loading...".to_string(),
        };
    }
}

impl Loading {
    pub fn new(text: &str) -> Loading {
        return Loading {
            text: text.to_string(),
        };
    }

    pub fn render<B: Backend>(&self, frame: &mut Frame<B>, rect: Rect, tick: usize) {
        let spinner = SPINNER[tick % SPINNER.len()];
        frame.render_widget(
            Paragraph::new(format!("{spinner} {}", self.text))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Double)
                        .padding(Padding::new(1, 1, 0, 0)),
                )
                .wrap(Wrap { trim: true })
                .alignment(Alignment::Center),
            rect,
        );
    }
}
