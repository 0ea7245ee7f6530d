//! Rich-text tree to Markdown serialization
//!
//! Emits normalized Markdown: ATX headings, fenced code blocks, `-` bullets,
//! renumbered ordered items, `  ` hard breaks, one blank line between
//! blocks. The output re-parses to the same tree, which is what makes
//! repeated conversion a fixed point after the first pass.

use super::{Block, Inline, RichTextTree};

/// Serialize a rich-text tree to Markdown text.
pub fn to_markdown(tree: &RichTextTree) -> String {
    let rendered = render_blocks(&tree.blocks);
    if rendered.is_empty() {
        String::new()
    } else {
        format!("{rendered}\n")
    }
}

fn render_blocks(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(render_block)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_block(block: &Block) -> String {
    match block {
        Block::Heading { level, content } => {
            let level = (*level).clamp(1, 6) as usize;
            format!("{} {}", "#".repeat(level), render_inlines(content))
        }
        Block::Paragraph { content } => escape_block_starts(&render_inlines(content)),
        Block::CodeBlock { language, code } => {
            let fence = "`".repeat(fence_width(code));
            let lang = language.as_deref().unwrap_or("");
            let mut code = code.clone();
            if !code.is_empty() && !code.ends_with('\n') {
                code.push('\n');
            }
            format!("{fence}{lang}\n{code}{fence}")
        }
        Block::List {
            ordered,
            start,
            items,
        } => render_list(*ordered, *start, items),
        Block::BlockQuote { content } => {
            let inner = render_blocks(content);
            inner
                .lines()
                .map(|line| {
                    if line.is_empty() {
                        ">".to_string()
                    } else {
                        format!("> {line}")
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        Block::Rule => "---".to_string(),
        Block::Html { html } => html.clone(),
    }
}

fn render_list(ordered: bool, start: u64, items: &[Vec<Block>]) -> String {
    let mut lines = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let marker = if ordered {
            format!("{}. ", start + i as u64)
        } else {
            "- ".to_string()
        };
        lines.push(render_item(&marker, item));
    }
    lines.join("\n")
}

fn render_item(marker: &str, blocks: &[Block]) -> String {
    let indent = " ".repeat(marker.len());
    let mut out = String::new();
    let mut first = true;
    for block in blocks {
        let rendered = render_block(block);
        if rendered.is_empty() {
            continue;
        }
        if first {
            out.push_str(marker);
            out.push_str(&indent_continuation(&rendered, &indent));
            first = false;
        } else {
            // A second paragraph needs a separating blank line; nested
            // lists and other blocks attach directly.
            if matches!(block, Block::Paragraph { .. }) {
                out.push('\n');
            }
            out.push('\n');
            out.push_str(&indent_all(&rendered, &indent));
        }
    }
    if first {
        // Empty item
        return marker.trim_end().to_string();
    }
    out
}

/// Indent every line after the first (the first line sits after the marker).
fn indent_continuation(text: &str, indent: &str) -> String {
    let mut lines = text.lines();
    let mut out = lines.next().unwrap_or("").to_string();
    for line in lines {
        out.push('\n');
        if !line.is_empty() {
            out.push_str(indent);
        }
        out.push_str(line);
    }
    out
}

fn indent_all(text: &str, indent: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_inlines(content: &[Inline]) -> String {
    let mut out = String::new();
    for inline in content {
        match inline {
            Inline::Text { text } => out.push_str(&escape_text(text)),
            Inline::Code { code } => out.push_str(&render_inline_code(code)),
            Inline::Strong { content } => {
                out.push_str("**");
                out.push_str(&render_inlines(content));
                out.push_str("**");
            }
            Inline::Emphasis { content } => {
                out.push('*');
                out.push_str(&render_inlines(content));
                out.push('*');
            }
            Inline::Strikethrough { content } => {
                out.push_str("~~");
                out.push_str(&render_inlines(content));
                out.push_str("~~");
            }
            Inline::Link {
                url,
                title,
                content,
            } => {
                out.push('[');
                out.push_str(&render_inlines(content));
                out.push_str("](");
                out.push_str(&render_dest(url, title));
                out.push(')');
            }
            Inline::Image { url, alt } => {
                out.push_str("![");
                out.push_str(&escape_text(alt));
                out.push_str("](");
                out.push_str(&render_dest(url, ""));
                out.push(')');
            }
            Inline::SoftBreak => out.push('\n'),
            Inline::HardBreak => out.push_str("  \n"),
            Inline::Html { html } => out.push_str(html),
        }
    }
    out
}

fn render_dest(url: &str, title: &str) -> String {
    let needs_brackets = url.contains([' ', '(', ')']);
    let url = if needs_brackets {
        format!("<{url}>")
    } else {
        url.to_string()
    };
    if title.is_empty() {
        url
    } else {
        format!("{url} \"{}\"", title.replace('"', "\\\""))
    }
}

fn render_inline_code(code: &str) -> String {
    let max_run = code
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(max_run + 1);
    let needs_pad = code.starts_with('`')
        || code.ends_with('`')
        || code.starts_with(' ')
        || code.ends_with(' ');
    if needs_pad {
        format!("{fence} {code} {fence}")
    } else {
        format!("{fence}{code}{fence}")
    }
}

fn fence_width(code: &str) -> usize {
    let mut max_run = 0;
    let mut run = 0;
    for c in code.chars() {
        if c == '`' {
            run += 1;
            max_run = max_run.max(run);
        } else {
            run = 0;
        }
    }
    (max_run + 1).max(3)
}

/// Characters with inline meaning that must survive a re-parse as text.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '~') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape characters that would start a different block construct at the
/// beginning of a paragraph line.
fn escape_block_starts(paragraph: &str) -> String {
    paragraph
        .split('\n')
        .map(escape_line_start)
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_line_start(line: &str) -> String {
    let escape_first = line.starts_with('#')
        || line.starts_with('>')
        || line.starts_with("- ")
        || line.starts_with("+ ")
        || line == "-"
        || line == "+"
        || is_setext_or_break(line);
    if escape_first {
        return format!("\\{line}");
    }
    // Ordered-list openers: escape the delimiter, not the digit.
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(delim) = rest.chars().next() {
            if (delim == '.' || delim == ')')
                && rest[1..].chars().next().map_or(true, |c| c == ' ')
            {
                return format!("{}\\{}", &line[..digits], rest);
            }
        }
    }
    line.to_string()
}

/// A line of only `-` or `=` would become a setext underline or thematic
/// break when re-parsed below a paragraph line.
fn is_setext_or_break(line: &str) -> bool {
    !line.is_empty()
        && (line.chars().all(|c| c == '-') || line.chars().all(|c| c == '='))
}
