use super::Style;
use super::codec::Document;

/// Render a decoded document as an HTML fragment. Lines are joined with `<br>`.
pub fn render_html(doc: &Document) -> String {
    let mut out = String::new();

    for (index, line) in doc.lines.iter().enumerate() {
        if index > 0 {
            out.push_str("<br>");
        }
        for span in &line.spans {
            match span.style {
                Some(style) => {
                    let tag = html_tag(style);
                    out.push('<');
                    out.push_str(tag);
                    out.push('>');
                    escape_into(&mut out, &span.text);
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                }
                None => escape_into(&mut out, &span.text),
            }
        }
    }

    out
}

/// Render a decoded document as plain text: markers dropped, lines joined
/// with `\n`.
pub fn render_text(doc: &Document) -> String {
    doc.lines
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.text.as_str())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn html_tag(style: Style) -> &'static str {
    match style {
        Style::Bold => "strong",
        Style::Italic => "em",
        Style::Underline => "u",
        Style::Code => "code",
        Style::Highlight => "mark",
    }
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}
