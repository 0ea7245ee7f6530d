//! Markdown to rich-text tree conversion
//!
//! Walks the pulldown-cmark event stream and builds an owned block tree.
//! Tight list items (which carry bare inline events) get an implicit
//! paragraph wrapper so the tree shape is independent of list tightness.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use super::{Block, Inline, RichTextTree};

/// Convert Markdown text to a rich-text tree. Total: never fails.
pub fn to_rich_text(markdown: &str) -> RichTextTree {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);

    let mut builder = TreeBuilder::new();
    for event in parser {
        builder.handle(event);
    }
    builder.finish()
}

/// An open inline container awaiting its end tag.
struct InlineFrame {
    kind: InlineKind,
    content: Vec<Inline>,
}

enum InlineKind {
    Paragraph,
    /// Paragraph opened implicitly for bare inline events in tight items.
    ImplicitParagraph,
    Heading(u8),
    Strong,
    Emphasis,
    Strikethrough,
    Link { url: String, title: String },
    Image { url: String },
}

/// An open block container awaiting its end tag.
struct BlockFrame {
    kind: BlockKind,
    blocks: Vec<Block>,
}

enum BlockKind {
    Root,
    Quote,
    Item,
}

struct TreeBuilder {
    blocks: Vec<BlockFrame>,
    inlines: Vec<InlineFrame>,
    lists: Vec<ListFrame>,
    code: Option<(Option<String>, String)>,
    html: Option<String>,
}

struct ListFrame {
    ordered: bool,
    start: u64,
    items: Vec<Vec<Block>>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            blocks: vec![BlockFrame {
                kind: BlockKind::Root,
                blocks: Vec::new(),
            }],
            inlines: Vec::new(),
            lists: Vec::new(),
            code: None,
            html: None,
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => {
                if let Some((_, code)) = self.code.as_mut() {
                    code.push_str(&text);
                } else {
                    self.push_inline(Inline::text(text.into_string()));
                }
            }
            Event::Code(code) => self.push_inline(Inline::Code {
                code: code.into_string(),
            }),
            Event::Html(html) => {
                if let Some(buffer) = self.html.as_mut() {
                    buffer.push_str(&html);
                } else {
                    self.push_block(Block::Html {
                        html: html.trim_end_matches('\n').to_string(),
                    });
                }
            }
            Event::InlineHtml(html) => self.push_inline(Inline::Html {
                html: html.into_string(),
            }),
            Event::SoftBreak => self.push_inline(Inline::SoftBreak),
            Event::HardBreak => self.push_inline(Inline::HardBreak),
            Event::Rule => {
                self.close_implicit_paragraph();
                self.push_block(Block::Rule);
            }
            // Footnotes, math, task markers and other extensions are not
            // enabled; anything unexpected is dropped rather than panicking.
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.inlines.push(InlineFrame {
                kind: InlineKind::Paragraph,
                content: Vec::new(),
            }),
            Tag::Heading { level, .. } => {
                self.close_implicit_paragraph();
                self.inlines.push(InlineFrame {
                    kind: InlineKind::Heading(heading_level(level)),
                    content: Vec::new(),
                });
            }
            Tag::BlockQuote(_) => {
                self.close_implicit_paragraph();
                self.blocks.push(BlockFrame {
                    kind: BlockKind::Quote,
                    blocks: Vec::new(),
                });
            }
            Tag::CodeBlock(kind) => {
                self.close_implicit_paragraph();
                let language = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                        Some(lang.into_string())
                    }
                    _ => None,
                };
                self.code = Some((language, String::new()));
            }
            Tag::HtmlBlock => {
                self.close_implicit_paragraph();
                self.html = Some(String::new());
            }
            Tag::List(start) => {
                self.close_implicit_paragraph();
                self.lists.push(ListFrame {
                    ordered: start.is_some(),
                    start: start.unwrap_or(1),
                    items: Vec::new(),
                });
            }
            Tag::Item => self.blocks.push(BlockFrame {
                kind: BlockKind::Item,
                blocks: Vec::new(),
            }),
            Tag::Strong => self.push_inline_frame(InlineKind::Strong),
            Tag::Emphasis => self.push_inline_frame(InlineKind::Emphasis),
            Tag::Strikethrough => self.push_inline_frame(InlineKind::Strikethrough),
            Tag::Link {
                dest_url, title, ..
            } => self.push_inline_frame(InlineKind::Link {
                url: dest_url.into_string(),
                title: title.into_string(),
            }),
            Tag::Image { dest_url, .. } => self.push_inline_frame(InlineKind::Image {
                url: dest_url.into_string(),
            }),
            // Tables, footnote definitions, metadata blocks: contents fall
            // through as plain paragraphs/text.
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if let Some(frame) = self.inlines.pop() {
                    self.push_block(Block::Paragraph {
                        content: frame.content,
                    });
                }
            }
            TagEnd::Heading(_) => {
                if let Some(frame) = self.inlines.pop() {
                    let level = match frame.kind {
                        InlineKind::Heading(level) => level,
                        _ => 1,
                    };
                    self.push_block(Block::Heading {
                        level,
                        content: frame.content,
                    });
                }
            }
            TagEnd::BlockQuote(_) => {
                self.close_implicit_paragraph();
                if let Some(frame) = self.blocks.pop() {
                    self.push_block(Block::BlockQuote {
                        content: frame.blocks,
                    });
                }
            }
            TagEnd::CodeBlock => {
                if let Some((language, code)) = self.code.take() {
                    self.push_block(Block::CodeBlock { language, code });
                }
            }
            TagEnd::HtmlBlock => {
                if let Some(html) = self.html.take() {
                    self.push_block(Block::Html {
                        html: html.trim_end_matches('\n').to_string(),
                    });
                }
            }
            TagEnd::List(_) => {
                if let Some(list) = self.lists.pop() {
                    self.push_block(Block::List {
                        ordered: list.ordered,
                        start: list.start,
                        items: list.items,
                    });
                }
            }
            TagEnd::Item => {
                self.close_implicit_paragraph();
                if let Some(frame) = self.blocks.pop() {
                    if let Some(list) = self.lists.last_mut() {
                        list.items.push(frame.blocks);
                    } else {
                        // Orphan item outside a list; keep its blocks.
                        self.current_blocks().extend(frame.blocks);
                    }
                }
            }
            TagEnd::Strong | TagEnd::Emphasis | TagEnd::Strikethrough => {
                if let Some(frame) = self.inlines.pop() {
                    let inline = match frame.kind {
                        InlineKind::Emphasis => Inline::Emphasis {
                            content: frame.content,
                        },
                        InlineKind::Strikethrough => Inline::Strikethrough {
                            content: frame.content,
                        },
                        _ => Inline::Strong {
                            content: frame.content,
                        },
                    };
                    self.push_inline(inline);
                }
            }
            TagEnd::Link => {
                if let Some(frame) = self.inlines.pop() {
                    if let InlineKind::Link { url, title } = frame.kind {
                        self.push_inline(Inline::Link {
                            url,
                            title,
                            content: frame.content,
                        });
                    }
                }
            }
            TagEnd::Image => {
                if let Some(frame) = self.inlines.pop() {
                    if let InlineKind::Image { url } = frame.kind {
                        let alt = plain_text(&frame.content);
                        self.push_inline(Inline::Image { url, alt });
                    }
                }
            }
            _ => {}
        }
    }

    /// Append an inline to the innermost open inline container, opening an
    /// implicit paragraph when bare inline events arrive in a tight item.
    fn push_inline(&mut self, inline: Inline) {
        if self.inlines.is_empty() {
            self.inlines.push(InlineFrame {
                kind: InlineKind::ImplicitParagraph,
                content: Vec::new(),
            });
        }
        let content = &mut self
            .inlines
            .last_mut()
            .unwrap_or_else(|| unreachable!("frame pushed above"))
            .content;
        // Merge adjacent text runs so escaping round trips cleanly.
        if let (Some(Inline::Text { text: last }), Inline::Text { text }) =
            (content.last_mut(), &inline)
        {
            last.push_str(text);
            return;
        }
        content.push(inline);
    }

    fn push_inline_frame(&mut self, kind: InlineKind) {
        if self.inlines.is_empty() {
            self.inlines.push(InlineFrame {
                kind: InlineKind::ImplicitParagraph,
                content: Vec::new(),
            });
        }
        self.inlines.push(InlineFrame {
            kind,
            content: Vec::new(),
        });
    }

    /// Flush an implicit paragraph before a sibling block-level node.
    fn close_implicit_paragraph(&mut self) {
        if matches!(
            self.inlines.last().map(|f| &f.kind),
            Some(InlineKind::ImplicitParagraph)
        ) {
            let frame = self
                .inlines
                .pop()
                .unwrap_or_else(|| unreachable!("checked above"));
            if !frame.content.is_empty() {
                self.push_block(Block::Paragraph {
                    content: frame.content,
                });
            }
        }
    }

    fn current_blocks(&mut self) -> &mut Vec<Block> {
        &mut self
            .blocks
            .last_mut()
            .unwrap_or_else(|| unreachable!("root frame always present"))
            .blocks
    }

    fn push_block(&mut self, block: Block) {
        self.current_blocks().push(block);
    }

    fn finish(mut self) -> RichTextTree {
        self.close_implicit_paragraph();
        let root = self
            .blocks
            .swap_remove(0);
        RichTextTree::new(root.blocks)
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Flatten inline content to plain text (used for image alt text).
fn plain_text(content: &[Inline]) -> String {
    let mut out = String::new();
    for inline in content {
        match inline {
            Inline::Text { text } | Inline::Code { code: text } => out.push_str(text),
            Inline::Strong { content }
            | Inline::Emphasis { content }
            | Inline::Strikethrough { content }
            | Inline::Link { content, .. } => out.push_str(&plain_text(content)),
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::SoftBreak | Inline::HardBreak => out.push(' '),
            Inline::Html { .. } => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tight_item_gets_implicit_paragraph() {
        let tree = to_rich_text("- one\n- two\n");
        let Block::List { items, ordered, .. } = &tree.blocks[0] else {
            panic!("expected list, got {:?}", tree.blocks);
        };
        assert!(!ordered);
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0],
            vec![Block::Paragraph {
                content: vec![Inline::text("one")]
            }]
        );
    }

    #[test]
    fn loose_and_tight_lists_build_the_same_tree() {
        let tight = to_rich_text("- one\n- two\n");
        let loose = to_rich_text("- one\n\n- two\n");
        assert_eq!(tight, loose);
    }

    #[test]
    fn nested_list_closes_implicit_paragraph() {
        let tree = to_rich_text("- outer\n  - inner\n");
        let Block::List { items, .. } = &tree.blocks[0] else {
            panic!("expected list");
        };
        assert_eq!(items[0].len(), 2);
        assert!(matches!(items[0][0], Block::Paragraph { .. }));
        assert!(matches!(items[0][1], Block::List { .. }));
    }

    #[test]
    fn adjacent_text_events_merge() {
        let tree = to_rich_text("a [bracketed] b");
        let Block::Paragraph { content } = &tree.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(content.len(), 1);
        assert_eq!(content[0], Inline::text("a [bracketed] b"));
    }

    #[test]
    fn image_alt_is_flattened() {
        let tree = to_rich_text("![some *alt* text](/x.png)");
        let Block::Paragraph { content } = &tree.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(
            content[0],
            Inline::Image {
                url: "/x.png".to_string(),
                alt: "some alt text".to_string(),
            }
        );
    }

    #[test]
    fn code_block_keeps_language() {
        let tree = to_rich_text("```rust\nfn x() {}\n```\n");
        assert_eq!(
            tree.blocks[0],
            Block::CodeBlock {
                language: Some("rust".to_string()),
                code: "fn x() {}\n".to_string(),
            }
        );
    }

    #[test]
    fn quote_containing_list() {
        let tree = to_rich_text("> - a\n> - b\n");
        let Block::BlockQuote { content } = &tree.blocks[0] else {
            panic!("expected quote");
        };
        assert!(matches!(content[0], Block::List { .. }));
    }
}
