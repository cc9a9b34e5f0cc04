use crate::text_metrics::{FontSpec, TextMeasure};

/// Greedy word wrap bounded by `max_width`, with `\n` as a forced break.
///
/// Words are never split: a single word wider than `max_width` gets a line of
/// its own. Every `\n` ends the current line even when it is empty, so blank
/// lines survive. Empty or whitespace-only text yields no lines.
pub fn wrap_text(
    text: &str,
    font: &FontSpec,
    max_width: f32,
    measure: &dyn TextMeasure,
) -> Vec<String> {
    let text = normalize_breaks(text);
    let text = text.trim();

    let mut lines = Vec::new();
    let mut current = String::new();

    for token in split_tokens(text) {
        if token.contains('\n') {
            let parts: Vec<&str> = token.split('\n').collect();
            let last = parts.len() - 1;
            for (idx, part) in parts.into_iter().enumerate() {
                place_word(&mut lines, &mut current, part, font, max_width, measure);
                if idx < last {
                    lines.push(std::mem::take(&mut current));
                }
            }
        } else {
            place_word(&mut lines, &mut current, token, font, max_width, measure);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn place_word(
    lines: &mut Vec<String>,
    current: &mut String,
    word: &str,
    font: &FontSpec,
    max_width: f32,
    measure: &dyn TextMeasure,
) {
    let candidate = join_word(current, word);
    if measure.measure(&candidate, font) > max_width && !current.is_empty() {
        lines.push(std::mem::take(current));
        current.push_str(word);
    } else {
        *current = candidate;
    }
}

fn join_word(current: &str, word: &str) -> String {
    match (current.is_empty(), word.is_empty()) {
        (true, _) => word.to_string(),
        (false, true) => current.to_string(),
        (false, false) => format!("{current} {word}"),
    }
}

/// Whitespace runs other than `\n` separate tokens; `\n` stays inside them.
fn split_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|ch: char| ch.is_whitespace() && ch != '\n')
        .filter(|token| !token.is_empty())
}

fn normalize_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_metrics::FallbackMetrics;

    /// Every character is 10px wide at any size.
    struct Monospace;

    impl TextMeasure for Monospace {
        fn measure(&self, text: &str, _font: &FontSpec) -> f32 {
            text.chars().filter(|ch| *ch != '\n').count() as f32 * 10.0
        }
    }

    fn font() -> FontSpec {
        FontSpec::new("sans-serif", 40)
    }

    #[test]
    fn single_word_without_breaks_is_one_line() {
        let lines = wrap_text("supercalifragilistic", &font(), 50.0, &Monospace);
        assert_eq!(lines, vec!["supercalifragilistic"]);
    }

    #[test]
    fn forced_break_splits_fitting_parts() {
        let lines = wrap_text("a\nb", &font(), 1000.0, &Monospace);
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn empty_and_blank_text_yield_no_lines() {
        assert!(wrap_text("", &font(), 100.0, &Monospace).is_empty());
        assert!(wrap_text("  \t \n ", &font(), 100.0, &Monospace).is_empty());
    }

    #[test]
    fn greedy_packing_breaks_at_width() {
        // "aaa bbb" = 70px, "aaa bbb ccc" = 110px
        let lines = wrap_text("aaa bbb ccc ddd", &font(), 80.0, &Monospace);
        assert_eq!(lines, vec!["aaa bbb", "ccc ddd"]);
    }

    #[test]
    fn exact_width_still_fits() {
        let lines = wrap_text("aaa bbb", &font(), 70.0, &Monospace);
        assert_eq!(lines, vec!["aaa bbb"]);
    }

    #[test]
    fn collapses_whitespace_runs() {
        let lines = wrap_text("  one \t  two   ", &font(), 1000.0, &Monospace);
        assert_eq!(lines, vec!["one two"]);
    }

    #[test]
    fn oversized_word_gets_own_line() {
        let lines = wrap_text("hi enormousword yo", &font(), 60.0, &Monospace);
        assert_eq!(lines, vec!["hi", "enormousword", "yo"]);
    }

    #[test]
    fn forced_break_inside_token_flushes_regardless_of_width() {
        let lines = wrap_text(
            "A friendly greeting repo\nfor testing",
            &font(),
            10_000.0,
            &Monospace,
        );
        assert_eq!(lines, vec!["A friendly greeting repo", "for testing"]);
    }

    #[test]
    fn part_before_break_can_wrap_first() {
        // "aaa bbb" overflows at 50px, then the break ends "bbb".
        let lines = wrap_text("aaa bbb\nccc", &font(), 50.0, &Monospace);
        assert_eq!(lines, vec!["aaa", "bbb", "ccc"]);
    }

    #[test]
    fn consecutive_breaks_keep_blank_line() {
        let lines = wrap_text("a\n\nb", &font(), 1000.0, &Monospace);
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[test]
    fn standalone_break_between_spaces() {
        let lines = wrap_text("a \n b", &font(), 1000.0, &Monospace);
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn carriage_returns_are_breaks() {
        let lines = wrap_text("one\r\ntwo\rthree", &font(), 1000.0, &Monospace);
        assert_eq!(lines, vec!["one", "two", "three"]);
    }

    #[test]
    fn trailing_break_adds_no_empty_line() {
        let lines = wrap_text("done\n", &font(), 1000.0, &Monospace);
        assert_eq!(lines, vec!["done"]);
    }

    #[test]
    fn lines_fit_with_real_table() {
        let text = "this is a rather long line that should be wrapped into several pieces";
        let font = font();
        let lines = wrap_text(text, &font, 300.0, &FallbackMetrics);
        assert!(lines.len() > 1, "expected wrapping, got {lines:?}");
        for line in &lines {
            assert!(FallbackMetrics.measure(line, &font) <= 300.0, "{line:?} overflows");
        }
        assert_eq!(lines.join(" "), text);
    }
}
