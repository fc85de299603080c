use crate::config::RenderOptions;
use crate::error::{HighlightError, Result};
use crate::html::{format_lines, Line};
use crate::token::Token;
use stackscope_dump::Highlight;

/// Render the window around `line` with default options.
///
/// `wrap_size < 0` yields an empty highlight without scanning tokens.
/// `wrap_size == 0` renders only the marked call line. Otherwise the prefix
/// holds up to `wrap_size` lines before the call line plus the marked call
/// line, and the suffix up to `wrap_size` lines after it.
pub fn render(tokens: &[Token], line: usize, wrap_size: i32) -> Result<Highlight> {
    render_with(tokens, line, wrap_size, &RenderOptions::default())
}

/// Same as [`render`] with explicit render options
pub fn render_with(
    tokens: &[Token],
    line: usize,
    wrap_size: i32,
    options: &RenderOptions,
) -> Result<Highlight> {
    let Ok(wrap) = usize::try_from(wrap_size) else {
        return Ok(Highlight::default());
    };
    if line == 0 {
        return Err(HighlightError::InvalidLine(line));
    }
    let first = line.saturating_sub(wrap).max(1);
    let last = line.saturating_add(wrap);
    let lines = collect_lines(tokens, first, last);

    // pass 1: lines up to and including the call line, marked
    let split = (line - first + 1).min(lines.len());
    let (before, after) = lines.split_at(split);
    let prefix = format_lines(before, first, Some(line), options);

    // pass 2: lines after the call line
    let suffix = if wrap > 0 {
        format_lines(after, line + 1, None, options)
    } else {
        String::new()
    };

    Ok(Highlight { prefix, suffix })
}

/// Newline-delimited token fragments for lines `first..=last`.
///
/// Tokens ending before `first` are skipped by counting their newlines;
/// tokens crossing a window edge contribute only their in-window segments.
/// Lines past the end of the file are absent, so the result may be shorter
/// than the requested window.
fn collect_lines(tokens: &[Token], first: usize, last: usize) -> Vec<Line<'_>> {
    let mut lines: Vec<Line<'_>> = Vec::new();
    let mut current = 1;
    for token in tokens {
        if current > last {
            break;
        }
        let newlines = token.newlines();
        if current + newlines < first {
            current += newlines;
            continue;
        }
        for segment in token.text.split_inclusive('\n') {
            if (first..=last).contains(&current) {
                let index = current - first;
                if lines.len() <= index {
                    lines.resize_with(index + 1, Vec::new);
                }
                lines[index].push((token.class, segment));
            }
            if segment.ends_with('\n') {
                current += 1;
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{tokenize, Language};

    const SOURCE: &str = "package main\n\nimport \"fmt\"\n\n/*\n  multi\n  line\n*/\nfunc main() {\n\tfmt.Println(\"hi\")\n}\n";

    fn tokens() -> Vec<Token> {
        tokenize(Language::Go, SOURCE).unwrap()
    }

    fn line_texts(tokens: &[Token], first: usize, last: usize) -> Vec<String> {
        collect_lines(tokens, first, last)
            .into_iter()
            .map(|line| line.into_iter().map(|(_, text)| text).collect())
            .collect()
    }

    fn numbers(html: &str) -> Vec<usize> {
        html.split("<span class=\"lnt")
            .skip(1)
            .filter_map(|chunk| {
                let digits: String = chunk
                    .trim_start_matches(" hl")
                    .trim_start_matches("\">")
                    .chars()
                    .take_while(char::is_ascii_digit)
                    .collect();
                digits.parse().ok()
            })
            .collect()
    }

    #[test]
    fn collects_exact_line_ranges() {
        let tokens = tokens();
        assert_eq!(line_texts(&tokens, 1, 1), vec!["package main\n"]);
        assert_eq!(line_texts(&tokens, 2, 3), vec!["\n", "import \"fmt\"\n"]);
        assert_eq!(line_texts(&tokens, 11, 40), vec!["}\n"]);
        assert!(line_texts(&tokens, 12, 20).is_empty());
    }

    #[test]
    fn multiline_token_is_trimmed_at_both_edges() {
        let tokens = tokens();
        // the block comment spans lines 5..=8
        assert_eq!(line_texts(&tokens, 6, 7), vec!["  multi\n", "  line\n"]);
        assert_eq!(line_texts(&tokens, 8, 9), vec!["*/\n", "func main() {\n"]);
    }

    #[test]
    fn negative_wrap_is_empty() {
        let hl = render(&tokens(), 3, -1).unwrap();
        assert!(hl.is_empty());
    }

    #[test]
    fn zero_wrap_renders_marked_call_line_only() {
        let hl = render(&tokens(), 10, 0).unwrap();
        assert_eq!(numbers(&hl.prefix), vec![10]);
        assert!(hl.prefix.contains("line hl"));
        assert!(hl.prefix.contains("Println"));
        assert!(hl.suffix.is_empty());
    }

    #[test]
    fn window_is_numbered_from_its_first_line() {
        let hl = render(&tokens(), 9, 2).unwrap();
        assert_eq!(numbers(&hl.prefix), vec![7, 8, 9]);
        assert_eq!(numbers(&hl.suffix), vec![10, 11]);
        assert!(!hl.suffix.contains(" hl"));
        assert!(!hl.prefix.contains("multi"));
    }

    #[test]
    fn window_start_is_clamped_to_first_line() {
        let hl = render(&tokens(), 1, 5).unwrap();
        assert_eq!(numbers(&hl.prefix), vec![1]);
        assert_eq!(numbers(&hl.suffix), vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn last_line_has_empty_suffix() {
        let hl = render(&tokens(), 11, 5).unwrap();
        assert_eq!(numbers(&hl.prefix), vec![6, 7, 8, 9, 10, 11]);
        assert!(hl.suffix.is_empty());
    }

    #[test]
    fn window_past_end_is_shorter() {
        let hl = render(&tokens(), 9, 5).unwrap();
        assert_eq!(numbers(&hl.suffix), vec![10, 11]);
    }

    #[test]
    fn line_past_end_renders_nothing() {
        let hl = render(&tokens(), 400, 2).unwrap();
        assert!(hl.is_empty());
    }

    #[test]
    fn line_zero_is_invalid() {
        assert!(matches!(
            render(&tokens(), 0, 1),
            Err(HighlightError::InvalidLine(0))
        ));
    }

    #[test]
    fn file_without_trailing_newline() {
        let tokens = tokenize(Language::Go, "a\nb").unwrap();
        let hl = render(&tokens, 2, 3).unwrap();
        assert_eq!(numbers(&hl.prefix), vec![1, 2]);
        assert!(hl.suffix.is_empty());
    }
}
