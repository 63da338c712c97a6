#[cfg(test)]
#[path = "markup_test.rs"]
mod tests;

use once_cell::sync::Lazy;
use regex::Captures;
use regex::Regex;

static LINK: Lazy<Regex> = Lazy::new(|| return Regex::new(r"(https?://[^\s]+)").unwrap());
static STRONG: Lazy<Regex> = Lazy::new(|| return Regex::new(r"\*\*(.*?)\*\*").unwrap());
static EMPHASIS: Lazy<Regex> = Lazy::new(|| return Regex::new(r"\*(.*?)\*").unwrap());
static CODE: Lazy<Regex> = Lazy::new(|| return Regex::new(r"`(.*?)`").unwrap());
static RULE: Lazy<Regex> = Lazy::new(|| return Regex::new(r"(?m)^---$").unwrap());

// Private use code points mark each pass's output. Links become indexed placeholders.
const LINK_MARK: char = '\u{E000}';
const STRONG_OPEN: char = '\u{E001}';
const STRONG_CLOSE: char = '\u{E002}';
const EMPHASIS_OPEN: char = '\u{E003}';
const EMPHASIS_CLOSE: char = '\u{E004}';
const CODE_OPEN: char = '\u{E005}';
const CODE_CLOSE: char = '\u{E006}';
const RULE_MARK: char = '\u{E007}';

const TAGS: [&str; 3] = ["strong", "em", "code"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub strong: bool,
    pub emphasis: bool,
    pub code: bool,
}

impl InlineStyle {
    fn levels(&self) -> [bool; 3] {
        return [self.strong, self.emphasis, self.code];
    }
}

/// One piece of formatted message text, rendered by both the HTML serializer and the terminal
/// bubbles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fragment {
    Text(String, InlineStyle),
    Link(String, InlineStyle),
    Rule,
    Break,
}

fn is_marker(char: char) -> bool {
    return ('\u{E000}'..='\u{E007}').contains(&char);
}

fn flush_text(fragments: &mut Vec<Fragment>, buffer: &mut String, style: InlineStyle) {
    if buffer.is_empty() {
        return;
    }

    fragments.push(Fragment::Text(std::mem::take(buffer), style));
}

/// Splits message text into fragments. Links, strong, emphasis, inline code, rules and line
/// breaks are recognised in that order. Links must come before emphasis, and code before line
/// breaks.
pub fn fragments(text: &str) -> Vec<Fragment> {
    let normalized = text
        .replace("\r\n", "\n")
        .chars()
        .filter(|char| return !is_marker(*char))
        .collect::<String>();

    let mut links: Vec<String> = vec![];
    let mut marked = LINK
        .replace_all(&normalized, |caps: &Captures| {
            links.push(caps[1].to_string());
            return format!("{LINK_MARK}{}{LINK_MARK}", links.len() - 1);
        })
        .to_string();
    marked = STRONG
        .replace_all(&marked, format!("{STRONG_OPEN}${{1}}{STRONG_CLOSE}").as_str())
        .to_string();
    marked = EMPHASIS
        .replace_all(&marked, format!("{EMPHASIS_OPEN}${{1}}{EMPHASIS_CLOSE}").as_str())
        .to_string();
    marked = CODE
        .replace_all(&marked, format!("{CODE_OPEN}${{1}}{CODE_CLOSE}").as_str())
        .to_string();
    marked = RULE
        .replace_all(&marked, RULE_MARK.to_string().as_str())
        .to_string();

    let mut res = vec![];
    let mut buffer = String::new();
    let mut style = InlineStyle::default();
    let mut chars = marked.chars();

    while let Some(char) = chars.next() {
        match char {
            STRONG_OPEN | STRONG_CLOSE => {
                flush_text(&mut res, &mut buffer, style);
                style.strong = char == STRONG_OPEN;
            }
            EMPHASIS_OPEN | EMPHASIS_CLOSE => {
                flush_text(&mut res, &mut buffer, style);
                style.emphasis = char == EMPHASIS_OPEN;
            }
            CODE_OPEN | CODE_CLOSE => {
                flush_text(&mut res, &mut buffer, style);
                style.code = char == CODE_OPEN;
            }
            LINK_MARK => {
                flush_text(&mut res, &mut buffer, style);
                let index = chars
                    .by_ref()
                    .take_while(|e| return *e != LINK_MARK)
                    .collect::<String>();
                if let Some(url) = index.parse::<usize>().ok().and_then(|e| return links.get(e)) {
                    res.push(Fragment::Link(url.to_string(), style));
                }
            }
            RULE_MARK => {
                flush_text(&mut res, &mut buffer, style);
                res.push(Fragment::Rule);
            }
            '\n' => {
                flush_text(&mut res, &mut buffer, style);
                res.push(Fragment::Break);
            }
            _ => buffer.push(char),
        }
    }
    flush_text(&mut res, &mut buffer, style);

    return res;
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for char in text.chars() {
        match char {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(char),
        }
    }

    return escaped;
}

/// Closes and reopens tags so the markup stays nested when the style changes.
fn switch_style(html: &mut String, open: &mut InlineStyle, next: InlineStyle) {
    let current = open.levels();
    let wanted = next.levels();
    let first = match (0..TAGS.len()).find(|idx| return current[*idx] != wanted[*idx]) {
        Some(first) => first,
        None => return,
    };

    for idx in (first..TAGS.len()).rev() {
        if current[idx] {
            html.push_str(&format!("</{}>", TAGS[idx]));
        }
    }
    for idx in first..TAGS.len() {
        if wanted[idx] {
            html.push_str(&format!("<{}>", TAGS[idx]));
        }
    }

    *open = next;
}

/// Turns untrusted message text into markup. All text, link targets included, is escaped.
pub fn format_message_text(text: &str) -> String {
    let mut html = String::new();
    let mut open = InlineStyle::default();

    for fragment in fragments(text) {
        match fragment {
            Fragment::Text(content, style) => {
                switch_style(&mut html, &mut open, style);
                html.push_str(&escape_html(&content));
            }
            Fragment::Link(url, style) => {
                switch_style(&mut html, &mut open, style);
                let url = escape_html(&url);
                html.push_str(&format!(
                    r#"<a href="{url}" target="_blank" rel="noopener noreferrer" class="chat-link">{url}</a>"#
                ));
            }
            Fragment::Rule => {
                switch_style(&mut html, &mut open, InlineStyle::default());
                html.push_str(r#"<hr class="chat-separator">"#);
            }
            Fragment::Break => {
                switch_style(&mut html, &mut open, InlineStyle::default());
                html.push_str("<br>");
            }
        }
    }
    switch_style(&mut html, &mut open, InlineStyle::default());

    return html;
}
