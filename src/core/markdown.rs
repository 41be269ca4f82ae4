//! Markdown to HTML conversion for workshop bodies

use pulldown_cmark::{html, Event, Options, Parser};

/// Convert a markdown body into HTML markup.
///
/// Single newlines inside a paragraph become `<br />`, so worksheet text keeps
/// the line structure it was written with. Raw HTML blocks (including input
/// placeholders) are emitted verbatim.
pub fn to_markup(content: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(content, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut markup = String::with_capacity(content.len() * 3 / 2);
    html::push_html(&mut markup, parser);
    markup
}
