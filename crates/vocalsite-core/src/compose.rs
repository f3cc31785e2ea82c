//! Document composition
//!
//! Merges the three source buffers into one renderable document by structural
//! marker injection. There is no DOM awareness and no validation: whatever
//! text goes in comes back out, faithfully wrapped.

/// Marker the style block is inserted ahead of
const HEAD_CLOSE: &str = "</head>";

/// Marker the script block is inserted ahead of
const BODY_CLOSE: &str = "</body>";

/// Preview-only overlay that outlines every element for layout debugging
pub const OUTLINE_OVERLAY_CSS: &str =
    "/* preview-only debug outlines */\n* { outline: 1px dashed rgba(255, 0, 80, 0.6); }";

/// Compose the three buffers into one renderable document.
///
/// Pure and deterministic: identical inputs yield byte-identical output. The
/// style block lands just before the first `</head>` when the markup has one,
/// otherwise ahead of the whole markup; the script block lands just before
/// the first `</body>`, otherwise at the very end. When `inject_outline_css`
/// is set, the debug overlay rule is appended inside the style block.
pub fn compose(markup: &str, style: &str, script: &str, inject_outline_css: bool) -> String {
    let style_block = if inject_outline_css {
        format!("<style>\n{style}\n{OUTLINE_OVERLAY_CSS}\n</style>")
    } else {
        format!("<style>\n{style}\n</style>")
    };
    let script_block = format!("<script>\n{script}\n</script>");

    let mut out = match markup.find(HEAD_CLOSE) {
        Some(pos) => format!("{}{}\n{}", &markup[..pos], style_block, &markup[pos..]),
        None => format!("{style_block}\n{markup}"),
    };

    match out.find(BODY_CLOSE) {
        Some(pos) => out.insert_str(pos, &format!("{script_block}\n")),
        None => out.push_str(&script_block),
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKUP: &str = "<html><head><title>t</title></head><body><p>hi</p></body></html>";
    const STYLE: &str = "p { color: blue; }";
    const SCRIPT: &str = "console.log('x')";

    #[test]
    fn test_compose_is_deterministic() {
        let a = compose(MARKUP, STYLE, SCRIPT, false);
        let b = compose(MARKUP, STYLE, SCRIPT, false);
        assert_eq!(a, b);
    }

    #[test]
    fn test_style_lands_before_head_close() {
        let out = compose(MARKUP, STYLE, SCRIPT, false);
        let style_pos = out.find("<style>").unwrap();
        let head_close = out.find("</head>").unwrap();
        assert!(style_pos < head_close);
        assert_eq!(
            out,
            "<html><head><title>t</title><style>\np { color: blue; }\n</style>\n</head>\
             <body><p>hi</p><script>\nconsole.log('x')\n</script>\n</body></html>"
        );
    }

    #[test]
    fn test_stripping_blocks_reproduces_inputs() {
        let out = compose(MARKUP, STYLE, SCRIPT, false);
        let stripped = out
            .replacen(&format!("<style>\n{STYLE}\n</style>\n"), "", 1)
            .replacen(&format!("<script>\n{SCRIPT}\n</script>\n"), "", 1);
        assert_eq!(stripped, MARKUP);
    }

    #[test]
    fn test_missing_head_prepends_style() {
        let out = compose("<p>bare</p></body>", STYLE, SCRIPT, false);
        assert!(out.starts_with("<style>\n"));
    }

    #[test]
    fn test_missing_body_appends_script() {
        let out = compose("<head></head><p>bare</p>", STYLE, SCRIPT, false);
        assert!(out.ends_with("</script>"));
    }

    #[test]
    fn test_outline_overlay_only_when_requested() {
        let plain = compose(MARKUP, STYLE, SCRIPT, false);
        let debug = compose(MARKUP, STYLE, SCRIPT, true);
        assert!(!plain.contains(OUTLINE_OVERLAY_CSS));
        assert!(debug.contains(OUTLINE_OVERLAY_CSS));
        // Overlay stays inside the style block
        let overlay_pos = debug.find(OUTLINE_OVERLAY_CSS).unwrap();
        let style_close = debug.find("</style>").unwrap();
        assert!(overlay_pos < style_close);
    }

    #[test]
    fn test_garbage_passes_through_untouched() {
        let out = compose("<<not html>>", "{{broken css", ")(bad js", false);
        assert!(out.contains("<<not html>>"));
        assert!(out.contains("{{broken css"));
        assert!(out.contains(")(bad js"));
    }
}
