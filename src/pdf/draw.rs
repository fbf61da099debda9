//! Content stream drawing for generated pages
//!
//! Pages are drawn by emitting PDF operators into a string, the same way header and
//! footer stamps are written. Text uses the standard 14 fonts registered by
//! [`PacketDocument`](super::document::PacketDocument) under fixed resource names.

use lopdf::ObjectId;

use crate::layout::{Rect, Rgb};

/// Standard fonts available on every generated page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    /// ZapfDingbats, used for check marks
    Symbol,
}

impl Font {
    /// Resource name in the page's /Font dictionary
    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Symbol => "F3",
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Symbol => "ZapfDingbats",
        }
    }
}

/// Horizontal anchor for a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Accumulates drawing operators for one page
#[derive(Debug, Default)]
pub struct Canvas {
    content: String,
    images: Vec<(String, ObjectId)>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.content.push_str(&format!(
            "q {} {} {} {} {} re f Q\n",
            fill_color(color),
            num(rect.x),
            num(rect.y),
            num(rect.width),
            num(rect.height),
        ));
    }

    pub fn stroke_rect(&mut self, rect: Rect, color: Rgb, line_width: f32) {
        self.content.push_str(&format!(
            "q {} {} w {} {} {} {} re S Q\n",
            stroke_color(color),
            num(line_width),
            num(rect.x),
            num(rect.y),
            num(rect.width),
            num(rect.height),
        ));
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgb, line_width: f32) {
        self.content.push_str(&format!(
            "q {} {} w {} {} m {} {} l S Q\n",
            stroke_color(color),
            num(line_width),
            num(from.0),
            num(from.1),
            num(to.0),
            num(to.1),
        ));
    }

    /// Draw a single line of text with its baseline at `y`
    ///
    /// `x` is the left edge, center or right edge depending on `align`.
    pub fn text(&mut self, x: f32, y: f32, font: Font, size: f32, color: Rgb, align: Align, text: &str) {
        if text.is_empty() {
            return;
        }
        let width = text_width(text, font, size);
        let left = match align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };
        self.content.push_str("BT\n");
        self.content.push_str(&format!("{}\n", fill_color(color)));
        self.content.push_str(&format!("/{} {} Tf\n", font.resource_name(), num(size)));
        self.content.push_str(&format!("1 0 0 1 {} {} Tm\n", num(left), num(y)));
        self.content.push_str(&format!("{} Tj\n", pdf_string(text)));
        self.content.push_str("ET\n");
    }

    /// Draw wrapped text downward from `top_baseline`; returns the number of lines
    pub fn paragraph(
        &mut self,
        x: f32,
        top_baseline: f32,
        max_width: f32,
        font: Font,
        size: f32,
        color: Rgb,
        align: Align,
        text: &str,
    ) -> usize {
        let lines = wrap_text(text, font, size, max_width);
        let leading = size * 1.2;
        for (i, line) in lines.iter().enumerate() {
            self.text(x, top_baseline - i as f32 * leading, font, size, color, align, line);
        }
        lines.len()
    }

    /// Square checkbox with an optional check mark
    pub fn checkbox(&mut self, x: f32, y: f32, size: f32, checked: bool, color: Rgb) {
        self.stroke_rect(Rect::new(x, y, size, size), color, 1.0);
        if checked {
            // ZapfDingbats "4" is a check mark
            let glyph_size = size * 0.9;
            self.content.push_str(&format!(
                "BT\n{}\n/{} {} Tf\n1 0 0 1 {} {} Tm\n(4) Tj\nET\n",
                fill_color(color),
                Font::Symbol.resource_name(),
                num(glyph_size),
                num(x + size * 0.1),
                num(y + size * 0.18),
            ));
        }
    }

    /// Paint an image XObject scaled into `rect`
    pub fn image(&mut self, image_id: ObjectId, rect: Rect) {
        let name = format!("Im{}", self.images.len() + 1);
        self.content.push_str(&format!(
            "q {} 0 0 {} {} {} cm /{} Do Q\n",
            num(rect.width),
            num(rect.height),
            num(rect.x),
            num(rect.y),
            name
        ));
        self.images.push((name, image_id));
    }

    /// Content bytes plus the image XObjects the content refers to
    pub fn finish(self) -> (Vec<u8>, Vec<(String, ObjectId)>) {
        (self.content.into_bytes(), self.images)
    }
}

fn fill_color(color: Rgb) -> String {
    format!("{} {} {} rg", num(color.0), num(color.1), num(color.2))
}

fn stroke_color(color: Rgb) -> String {
    format!("{} {} {} RG", num(color.0), num(color.1), num(color.2))
}

/// Format a number compactly for a content stream
pub fn num(value: f32) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

/// Encode text as a PDF literal string for a WinAnsi font
///
/// Latin-1 characters map to their single-byte codes (written as octal escapes);
/// anything outside that range becomes `?`.
pub fn pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\r' | '\n' | '\t' => out.push(' '),
            ' '..='~' => out.push(ch),
            '\u{a0}'..='\u{ff}' => out.push_str(&format!("\\{:03o}", ch as u32)),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201c}' | '\u{201d}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            _ => out.push('?'),
        }
    }
    out.push(')');
    out
}

/// Approximate rendered width of `text` in points
///
/// Helvetica digits and lowercase average a little over half an em; capitals are
/// wider. Close enough for centering and wrapping.
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let em: f32 = text
        .chars()
        .map(|ch| match ch {
            ' ' | 'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.278,
            'f' | 't' | 'r' | '(' | ')' | '-' | '/' => 0.333,
            'm' | 'w' | 'M' | 'W' | '@' => 0.833,
            'A'..='Z' => 0.667,
            _ => 0.556,
        })
        .sum();
    let weight = if font == Font::Bold { 1.06 } else { 1.0 };
    em * size * weight
}

/// Largest size from `max` down to `min`, in half points, at which `text` fits `width`
pub fn fit_font_size(text: &str, font: Font, max: f32, min: f32, width: f32) -> f32 {
    let mut size = max;
    while size > min && text_width(text, font, size) > width {
        size -= 0.5;
    }
    size.max(min)
}

/// `text`, cut short with a trailing "..." when it is wider than `width` at `size`
pub fn truncate_to_width(text: &str, font: Font, size: f32, width: f32) -> String {
    if text_width(text, font, size) <= width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while chars.pop().is_some() {
        let kept: String = chars.iter().collect();
        let candidate = format!("{}...", kept.trim_end());
        if text_width(&candidate, font, size) <= width {
            return candidate;
        }
    }
    String::new()
}

/// Greedy word wrap to `max_width`; long words are left intact on their own line
pub fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if text_width(&candidate, font, size) <= max_width || current.is_empty() {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::palette;

    #[test]
    fn test_pdf_string_escapes() {
        assert_eq!(pdf_string("a(b)c\\"), "(a\\(b\\)c\\\\)");
        assert_eq!(pdf_string("line\nbreak"), "(line break)");
    }

    #[test]
    fn test_pdf_string_latin1_and_fallback() {
        assert_eq!(pdf_string("© é"), "(\\251 \\351)");
        assert_eq!(pdf_string("日本"), "(??)");
        assert_eq!(pdf_string("it’s"), "(it's)");
    }

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(12.0), "12");
        assert_eq!(num(0.5), "0.5");
        assert_eq!(num(1.23456), "1.235");
        assert_eq!(num(-3.0), "-3");
    }

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("one two three four five six", Font::Regular, 10.0, 60.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), "one two three four five six");
        for line in &lines {
            assert!(text_width(line, Font::Regular, 10.0) <= 60.0 || !line.contains(' '));
        }
    }

    #[test]
    fn test_wrap_text_long_word() {
        let lines = wrap_text("Supercalifragilistic", Font::Bold, 20.0, 30.0);
        assert_eq!(lines, vec!["Supercalifragilistic".to_string()]);
    }

    #[test]
    fn test_fit_font_size() {
        assert_eq!(fit_font_size("Short", Font::Regular, 11.0, 6.0, 300.0), 11.0);

        let long = "Northside Regional Medical Center Expansion";
        let size = fit_font_size(long, Font::Regular, 11.0, 6.0, 200.0);
        assert!(size < 11.0 && size >= 6.0);
        assert!(text_width(long, Font::Regular, size) <= 200.0);

        assert_eq!(fit_font_size(long, Font::Regular, 11.0, 6.0, 20.0), 6.0);
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("Fits", Font::Regular, 10.0, 100.0), "Fits");

        let cut = truncate_to_width("A very long company name indeed", Font::Regular, 10.0, 80.0);
        assert!(cut.ends_with("..."));
        assert!(text_width(&cut, Font::Regular, 10.0) <= 80.0);
        assert_eq!(truncate_to_width("Anything", Font::Regular, 10.0, 1.0), "");
    }

    #[test]
    fn test_canvas_text_and_images() {
        let mut canvas = Canvas::new();
        canvas.text(10.0, 20.0, Font::Bold, 12.0, palette::BLACK, Align::Left, "Hello");
        canvas.image((7, 0), Rect::new(0.0, 0.0, 100.0, 50.0));
        canvas.checkbox(0.0, 0.0, 10.0, true, palette::BLACK);
        let (content, images) = canvas.finish();
        let content = String::from_utf8(content).unwrap();

        assert!(content.contains("/F2 12 Tf"));
        assert!(content.contains("1 0 0 1 10 20 Tm"));
        assert!(content.contains("(Hello) Tj"));
        assert!(content.contains("100 0 0 50 0 0 cm /Im1 Do"));
        assert!(content.contains("/F3 9 Tf"));
        assert_eq!(images, vec![("Im1".to_string(), (7, 0))]);
    }

    #[test]
    fn test_empty_text_draws_nothing() {
        let mut canvas = Canvas::new();
        canvas.text(0.0, 0.0, Font::Regular, 10.0, palette::BLACK, Align::Center, "");
        let (content, _) = canvas.finish();
        assert!(content.is_empty());
    }
}
