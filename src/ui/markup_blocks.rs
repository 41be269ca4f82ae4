//! Markup block parsing for static workshop content
//!
//! Static segments arrive as the HTML produced by markdown conversion. This
//! module reads that HTML back into a flat list of display blocks (headings,
//! paragraphs, lists, code, quotes, tables, rules) with inline spans, which
//! the block renderer turns into egui widgets. The HTML is parsed with
//! html5ever, so raw HTML passed through from the document is tokenized and
//! entity-decoded like a browser would. Only the tag vocabulary the converter
//! emits is understood; any other element is dropped and its text kept.

use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, Attribute, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Inline run of text with its styling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineSpan {
    Text(String),
    Strong(String),
    Emphasis(String),
    Strikethrough(String),
    Code(String),
    Link { text: String, url: String },
    LineBreak,
}

/// One list entry, flattened with its nesting depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// Bullet or number shown before the item
    pub marker: String,
    pub spans: Vec<InlineSpan>,
    /// Task list state, if the item has a checkbox
    pub checkbox: Option<bool>,
    /// 0 for top-level items
    pub depth: usize,
}

/// A display block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupBlock {
    Heading { level: u8, spans: Vec<InlineSpan> },
    Paragraph { spans: Vec<InlineSpan> },
    Quote { spans: Vec<InlineSpan> },
    CodeBlock { lang: Option<String>, code: String },
    List { items: Vec<ListItem> },
    Table { headers: Vec<String>, rows: Vec<Vec<String>> },
    HorizontalRule,
}

#[derive(Default)]
struct Style {
    strong: usize,
    emphasis: usize,
    strike: usize,
    code: usize,
    link: Option<(String, String)>,
}

#[derive(Default)]
struct ListBuilder {
    /// Next number per open list level; `None` for bullet lists
    levels: Vec<Option<u64>>,
    items: Vec<ListItem>,
    pending: Option<ListItem>,
}

#[derive(Default)]
struct TableBuilder {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    in_head: bool,
}

#[derive(Default)]
struct Parser {
    blocks: Vec<MarkupBlock>,
    spans: Vec<InlineSpan>,
    style: Style,
    heading: Option<u8>,
    quote_depth: usize,
    pre: Option<(Option<String>, String)>,
    list: Option<ListBuilder>,
    table: Option<TableBuilder>,
}

/// Parse an HTML fragment into display blocks
pub fn parse_markup(html: &str) -> Vec<MarkupBlock> {
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);
    let mut parser = Parser::default();
    parser.walk(&dom.document);
    parser.finish()
}

impl Parser {
    fn walk(&mut self, node: &Handle) {
        match &node.data {
            NodeData::Document => self.walk_children(node),
            NodeData::Element { name, attrs, .. } => {
                let tag: &str = &name.local;
                // Non-content elements
                if matches!(tag, "head" | "script" | "style" | "template") {
                    return;
                }
                let attrs = attrs.borrow();
                self.open(tag, &attrs);
                self.walk_children(node);
                self.close(tag);
            }
            NodeData::Text { contents } => self.text(&contents.borrow()),
            _ => {}
        }
    }

    fn walk_children(&mut self, node: &Handle) {
        for child in node.children.borrow().iter() {
            self.walk(child);
        }
    }

    fn open(&mut self, tag: &str, attrs: &[Attribute]) {
        if let Some((lang, _)) = self.pre.as_mut() {
            if tag == "code" {
                *lang = attr(attrs, "class")
                    .and_then(|c| c.strip_prefix("language-").map(str::to_string));
            }
            return;
        }

        match tag {
            "p" => self.flush_loose(),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.flush_loose();
                self.heading = tag[1..].parse().ok();
            }
            "blockquote" => {
                self.flush_loose();
                self.quote_depth += 1;
            }
            "pre" => {
                self.flush_loose();
                self.pre = Some((None, String::new()));
            }
            "hr" => {
                self.flush_loose();
                self.blocks.push(MarkupBlock::HorizontalRule);
            }
            "ul" | "ol" => {
                if self.list.is_none() {
                    self.flush_loose();
                }
                let list = self.list.get_or_insert_with(ListBuilder::default);
                list.flush_pending(&mut self.spans);
                let start = if tag == "ol" {
                    Some(attr(attrs, "start").and_then(|s| s.parse().ok()).unwrap_or(1))
                } else {
                    None
                };
                list.levels.push(start);
            }
            "li" => {
                if let Some(list) = self.list.as_mut() {
                    list.flush_pending(&mut self.spans);
                    let depth = list.levels.len().saturating_sub(1);
                    let marker = match list.levels.last_mut() {
                        Some(Some(next)) => {
                            let marker = format!("{next}.");
                            *next += 1;
                            marker
                        }
                        _ => "•".to_string(),
                    };
                    list.pending = Some(ListItem {
                        marker,
                        spans: Vec::new(),
                        checkbox: None,
                        depth,
                    });
                }
            }
            "input" => {
                if let Some(item) = self.list.as_mut().and_then(|l| l.pending.as_mut()) {
                    item.checkbox = Some(attr(attrs, "checked").is_some());
                }
            }
            "table" => {
                self.flush_loose();
                self.table = Some(TableBuilder::default());
            }
            "thead" => {
                if let Some(table) = self.table.as_mut() {
                    table.in_head = true;
                }
            }
            "th" | "td" => self.spans.clear(),
            "br" => self.spans.push(InlineSpan::LineBreak),
            "strong" | "b" => self.style.strong += 1,
            "em" | "i" => self.style.emphasis += 1,
            "del" | "s" => self.style.strike += 1,
            "code" => self.style.code += 1,
            "a" => {
                let url = attr(attrs, "href").unwrap_or_default();
                self.style.link = Some((url, String::new()));
            }
            _ => {}
        }
    }

    fn close(&mut self, tag: &str) {
        if self.pre.is_some() {
            if tag == "pre" {
                if let Some((lang, code)) = self.pre.take() {
                    self.blocks.push(MarkupBlock::CodeBlock {
                        lang,
                        code: code.trim_end_matches('\n').to_string(),
                    });
                }
            }
            return;
        }

        match tag {
            "p" => {
                // Paragraphs inside list items and cells stay with their container
                if self.list.is_none() && self.table.is_none() {
                    self.flush_paragraph();
                } else if !self.spans.is_empty() {
                    self.spans.push(InlineSpan::LineBreak);
                }
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let spans = self.take_spans();
                let level = self.heading.take().unwrap_or(1);
                if !spans.is_empty() {
                    self.blocks.push(MarkupBlock::Heading { level, spans });
                }
            }
            "blockquote" => {
                self.flush_loose();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            "li" => {
                if let Some(list) = self.list.as_mut() {
                    list.flush_pending(&mut self.spans);
                }
            }
            "ul" | "ol" => {
                if let Some(list) = self.list.as_mut() {
                    list.flush_pending(&mut self.spans);
                    list.levels.pop();
                    if list.levels.is_empty() {
                        if let Some(list) = self.list.take() {
                            self.blocks.push(MarkupBlock::List { items: list.items });
                        }
                    }
                }
            }
            "th" | "td" => {
                let cell = plain_text(&self.take_spans());
                if let Some(table) = self.table.as_mut() {
                    table.row.push(cell);
                }
            }
            "tr" => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    if table.in_head {
                        table.headers = row;
                    } else if !row.is_empty() {
                        table.rows.push(row);
                    }
                }
            }
            "thead" => {
                if let Some(table) = self.table.as_mut() {
                    table.in_head = false;
                }
            }
            "table" => {
                if let Some(table) = self.table.take() {
                    self.blocks.push(MarkupBlock::Table {
                        headers: table.headers,
                        rows: table.rows,
                    });
                }
            }
            "strong" | "b" => self.style.strong = self.style.strong.saturating_sub(1),
            "em" | "i" => self.style.emphasis = self.style.emphasis.saturating_sub(1),
            "del" | "s" => self.style.strike = self.style.strike.saturating_sub(1),
            "code" => self.style.code = self.style.code.saturating_sub(1),
            "a" => {
                if let Some((url, text)) = self.style.link.take() {
                    let text = if text.is_empty() { url.clone() } else { text };
                    self.spans.push(InlineSpan::Link { text, url });
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        if let Some((_, code)) = self.pre.as_mut() {
            code.push_str(text);
            return;
        }

        let mut text = text.replace('\n', " ");
        if matches!(self.spans.last(), None | Some(InlineSpan::LineBreak)) {
            text = text.trim_start().to_string();
        }
        if text.is_empty() {
            return;
        }

        if let Some((_, link_text)) = self.style.link.as_mut() {
            link_text.push_str(&text);
            return;
        }

        let span = if self.style.code > 0 {
            InlineSpan::Code(text)
        } else if self.style.strong > 0 {
            InlineSpan::Strong(text)
        } else if self.style.emphasis > 0 {
            InlineSpan::Emphasis(text)
        } else if self.style.strike > 0 {
            InlineSpan::Strikethrough(text)
        } else {
            InlineSpan::Text(text)
        };
        self.spans.push(span);
    }

    fn take_spans(&mut self) -> Vec<InlineSpan> {
        let mut spans = std::mem::take(&mut self.spans);
        trim_trailing(&mut spans);
        spans
    }

    fn flush_paragraph(&mut self) {
        let spans = self.take_spans();
        if spans.is_empty() {
            return;
        }
        if self.quote_depth > 0 {
            self.blocks.push(MarkupBlock::Quote { spans });
        } else {
            self.blocks.push(MarkupBlock::Paragraph { spans });
        }
    }

    /// Text that appeared outside any block element becomes a paragraph
    fn flush_loose(&mut self) {
        if self.list.is_none() && self.table.is_none() && self.heading.is_none() {
            self.flush_paragraph();
        }
    }

    fn finish(mut self) -> Vec<MarkupBlock> {
        if let Some((lang, code)) = self.pre.take() {
            self.blocks.push(MarkupBlock::CodeBlock { lang, code });
        }
        if let Some(mut list) = self.list.take() {
            list.flush_pending(&mut self.spans);
            self.blocks.push(MarkupBlock::List { items: list.items });
        }
        if let Some(table) = self.table.take() {
            self.blocks.push(MarkupBlock::Table {
                headers: table.headers,
                rows: table.rows,
            });
        }
        self.heading = None;
        self.flush_paragraph();
        self.blocks
    }
}

impl ListBuilder {
    fn flush_pending(&mut self, spans: &mut Vec<InlineSpan>) {
        if let Some(mut item) = self.pending.take() {
            item.spans = std::mem::take(spans);
            trim_trailing(&mut item.spans);
            self.items.push(item);
        }
    }
}

/// Drop trailing breaks and whitespace left over from source newlines
fn trim_trailing(spans: &mut Vec<InlineSpan>) {
    loop {
        match spans.last_mut() {
            Some(InlineSpan::LineBreak) => {
                spans.pop();
            }
            Some(InlineSpan::Text(text)) => {
                let len = text.trim_end().len();
                if len > 0 {
                    text.truncate(len);
                    return;
                }
                spans.pop();
            }
            _ => return,
        }
    }
}

/// Flatten spans to plain text
pub fn plain_text(spans: &[InlineSpan]) -> String {
    spans
        .iter()
        .map(|span| match span {
            InlineSpan::Text(t)
            | InlineSpan::Strong(t)
            | InlineSpan::Emphasis(t)
            | InlineSpan::Strikethrough(t)
            | InlineSpan::Code(t) => t.as_str(),
            InlineSpan::Link { text, .. } => text.as_str(),
            InlineSpan::LineBreak => "\n",
        })
        .collect()
}

fn attr(attrs: &[Attribute], name: &str) -> Option<String> {
    attrs
        .iter()
        .find(|a| &*a.name.local == name)
        .map(|a| a.value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::markdown::to_markup;

    fn parse_markdown(md: &str) -> Vec<MarkupBlock> {
        parse_markup(&to_markup(md))
    }

    #[test]
    fn test_heading_and_paragraph() {
        let blocks = parse_markdown("## Reflect\n\nWhat did you *learn* **today**?");
        assert_eq!(
            blocks,
            vec![
                MarkupBlock::Heading {
                    level: 2,
                    spans: vec![InlineSpan::Text("Reflect".into())],
                },
                MarkupBlock::Paragraph {
                    spans: vec![
                        InlineSpan::Text("What did you ".into()),
                        InlineSpan::Emphasis("learn".into()),
                        InlineSpan::Text(" ".into()),
                        InlineSpan::Strong("today".into()),
                        InlineSpan::Text("?".into()),
                    ],
                },
            ]
        );
    }

    #[test]
    fn test_line_breaks_and_entities() {
        let blocks = parse_markdown("Tom & Jerry\n<3 cheese");
        let MarkupBlock::Paragraph { spans } = &blocks[0] else {
            panic!("expected paragraph, got {blocks:?}");
        };
        assert_eq!(plain_text(spans), "Tom & Jerry\n<3 cheese");
    }

    #[test]
    fn test_nested_and_ordered_lists() {
        let blocks = parse_markdown("3. three\n4. four\n   - inner\n\n- [x] done\n");
        let MarkupBlock::List { items } = &blocks[0] else {
            panic!("expected list, got {blocks:?}");
        };
        let markers: Vec<&str> = items.iter().map(|i| i.marker.as_str()).collect();
        assert_eq!(markers, vec!["3.", "4.", "•"]);
        assert_eq!(items[2].depth, 1);
        assert_eq!(plain_text(&items[1].spans), "four");

        let MarkupBlock::List { items } = &blocks[1] else {
            panic!("expected task list, got {blocks:?}");
        };
        assert_eq!(items[0].checkbox, Some(true));
        assert_eq!(plain_text(&items[0].spans), "done");
    }

    #[test]
    fn test_code_block_keeps_text() {
        let blocks = parse_markdown("```rust\nlet a = 1 < 2;\n```\n");
        assert_eq!(
            blocks,
            vec![MarkupBlock::CodeBlock {
                lang: Some("rust".into()),
                code: "let a = 1 < 2;".into(),
            }]
        );
    }

    #[test]
    fn test_quote_rule_and_link() {
        let blocks = parse_markdown("> quoted\n\n---\n\nSee [docs](https://example.com).");
        assert_eq!(
            blocks[0],
            MarkupBlock::Quote {
                spans: vec![InlineSpan::Text("quoted".into())]
            }
        );
        assert_eq!(blocks[1], MarkupBlock::HorizontalRule);
        let MarkupBlock::Paragraph { spans } = &blocks[2] else {
            panic!("expected paragraph");
        };
        assert!(spans.contains(&InlineSpan::Link {
            text: "docs".into(),
            url: "https://example.com".into(),
        }));
    }

    #[test]
    fn test_table() {
        let blocks = parse_markdown("| Step | Time |\n|---|---|\n| One | 5m |\n| Two | 10m |\n");
        assert_eq!(
            blocks,
            vec![MarkupBlock::Table {
                headers: vec!["Step".into(), "Time".into()],
                rows: vec![
                    vec!["One".into(), "5m".into()],
                    vec!["Two".into(), "10m".into()],
                ],
            }]
        );
    }

    #[test]
    fn test_comments_and_unknown_tags_are_dropped() {
        let blocks = parse_markup("<!-- INPUT_PLACEHOLDER:text:Ghost -->\n<div class=\"x\">raw</div>\n");
        assert_eq!(
            blocks,
            vec![MarkupBlock::Paragraph {
                spans: vec![InlineSpan::Text("raw".into())]
            }]
        );
    }

    #[test]
    fn test_raw_html_attributes_stay_out_of_text() {
        let blocks = parse_markdown("Read <abbr title=\"a > b\">this</abbr> now.");
        let MarkupBlock::Paragraph { spans } = &blocks[0] else {
            panic!("expected paragraph, got {blocks:?}");
        };
        assert_eq!(plain_text(spans), "Read this now.");
    }

    #[test]
    fn test_named_and_numeric_entities_are_decoded() {
        let blocks = parse_markup("<div>Caf&eacute; &#8212; done</div>");
        assert_eq!(
            blocks,
            vec![MarkupBlock::Paragraph {
                spans: vec![InlineSpan::Text("Caf\u{e9} \u{2014} done".into())]
            }]
        );
    }

    #[test]
    fn test_script_content_is_skipped() {
        let blocks = parse_markup("<script>alert(1)</script><p>Visible</p>");
        assert_eq!(
            blocks,
            vec![MarkupBlock::Paragraph {
                spans: vec![InlineSpan::Text("Visible".into())]
            }]
        );
    }
}
