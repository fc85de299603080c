use crate::config::RenderOptions;
use crate::token::TokenClass;
use std::fmt::Write;

/// Token fragments of one source line
pub(crate) type Line<'t> = Vec<(TokenClass, &'t str)>;

const MARK_CLASS: &str = " hl";

/// Render consecutive source lines, numbered from `first_line`, as a
/// chroma-compatible HTML table. `mark` selects the line to emphasize.
pub(crate) fn format_lines(
    lines: &[Line<'_>],
    first_line: usize,
    mark: Option<usize>,
    options: &RenderOptions,
) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let marked = |number: usize| if mark == Some(number) { MARK_CLASS } else { "" };

    let mut code = String::new();
    for (offset, line) in lines.iter().enumerate() {
        let number = first_line + offset;
        let _ = write!(code, r#"<span class="line{}"><span class="cl">"#, marked(number));
        for (class, text) in line {
            let text = text.trim_end_matches(['\n', '\r']);
            if text.is_empty() {
                continue;
            }
            match class.css_class() {
                "" => code.push_str(&html_escape(text)),
                css => {
                    let _ = write!(code, r#"<span class="{css}">{}</span>"#, html_escape(text));
                }
            }
        }
        code.push_str("\n</span></span>");
    }
    let code = format!(
        r#"<pre class="chroma" style="tab-size:{}"><code>{code}</code></pre>"#,
        options.tab_width
    );

    if !options.line_numbers {
        return format!(r#"<div class="chroma">{code}</div>"#);
    }

    let mut numbers = String::new();
    for offset in 0..lines.len() {
        let number = first_line + offset;
        let _ = write!(numbers, "<span class=\"lnt{}\">{number}\n</span>", marked(number));
    }
    format!(
        concat!(
            r#"<div class="chroma"><table class="lntable"><tr>"#,
            r#"<td class="lntd"><pre class="chroma"><code>{numbers}</code></pre></td>"#,
            r#"<td class="lntd">{code}</td>"#,
            r#"</tr></table></div>"#
        ),
        numbers = numbers,
        code = code
    )
}

/// Escape HTML special characters for safe embedding in HTML documents.
pub fn html_escape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}
