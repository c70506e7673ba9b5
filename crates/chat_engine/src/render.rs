use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::Html;

/// Turns one server-sent HTML fragment into display lines.
pub trait FragmentRenderer: Send + Sync {
    fn render(&self, fragment: &str) -> Vec<String>;
}

/// Terminal text: tags dropped, whitespace collapsed, `<br>` and block elements end a line.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextRenderer;

impl FragmentRenderer for PlainTextRenderer {
    fn render(&self, fragment: &str) -> Vec<String> {
        let html = Html::parse_fragment(fragment);
        let mut lines = LineBuffer::default();
        for child in html.root_element().children() {
            visit_node(child, &mut lines);
        }
        lines.finish()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownRenderer;

impl FragmentRenderer for MarkdownRenderer {
    fn render(&self, fragment: &str) -> Vec<String> {
        html2md::parse_html(fragment)
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }
}

fn visit_node(node: NodeRef<'_, Node>, lines: &mut LineBuffer) {
    match node.value() {
        Node::Text(text) => lines.push_text(text),
        Node::Element(element) => {
            let name = element.name();
            if name.eq_ignore_ascii_case("br") {
                lines.break_line();
                return;
            }
            let block = is_block(name);
            if block {
                lines.break_line();
            }
            for child in node.children() {
                visit_node(child, lines);
            }
            if block {
                lines.break_line();
            }
        }
        _ => {
            for child in node.children() {
                visit_node(child, lines);
            }
        }
    }
}

fn is_block(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "p" | "div" | "li" | "tr" | "hr" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
    )
}

#[derive(Debug, Default)]
struct LineBuffer {
    lines: Vec<String>,
    current: String,
    pending_space: bool,
}

impl LineBuffer {
    fn push_text(&mut self, text: &str) {
        let mut words = text.split_whitespace().peekable();
        if words.peek().is_none() {
            if !text.is_empty() {
                self.pending_space = true;
            }
            return;
        }
        if text.starts_with(char::is_whitespace) {
            self.pending_space = true;
        }
        for word in words {
            if self.pending_space && !self.current.is_empty() {
                self.current.push(' ');
            }
            self.current.push_str(word);
            self.pending_space = true;
        }
        self.pending_space = text.ends_with(char::is_whitespace);
    }

    fn break_line(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(std::mem::take(&mut self.current));
        }
        self.pending_space = false;
    }

    fn finish(mut self) -> Vec<String> {
        self.break_line();
        self.lines
    }
}
