//! Helvetica advance widths and greedy word wrapping.

use super::FontStyle;

/// Points to millimetres.
pub(crate) const PT_TO_MM: f64 = 25.4 / 72.0;

/// Glyph widths (1/1000 em) for ASCII 32..=126, Helvetica.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // 'A'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333,
    500, 278, 556, 500, 722, 500, 500, 500, // 'a'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Glyph widths (1/1000 em) for ASCII 32..=126, Helvetica-Bold.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // 'A'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389,
    556, 333, 611, 556, 778, 556, 556, 500, // 'a'..'z'
    389, 280, 389, 584, // '{'..'~'
];

/// Fallback for glyphs outside the table.
const DEFAULT_WIDTH: u16 = 556;

/// Accented Latin letters share the advance of their base letter.
fn base_letter(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        other => other,
    }
}

fn glyph_width(c: char, style: FontStyle) -> u16 {
    let table = match style {
        FontStyle::Normal => &HELVETICA,
        FontStyle::Bold => &HELVETICA_BOLD,
    };
    let code = base_letter(c) as u32;
    if (32..=126).contains(&code) {
        table[(code - 32) as usize]
    } else {
        DEFAULT_WIDTH
    }
}

/// Width of `text` in millimetres at `font_size` points.
pub fn text_width(text: &str, style: FontStyle, font_size: f64) -> f64 {
    let units: u32 = text.chars().map(|c| u32::from(glyph_width(c, style))).sum();
    f64::from(units) / 1000.0 * font_size * PT_TO_MM
}

/// Greedy word wrap. Explicit newlines start a new line; a word wider than
/// `max_width` is broken between characters.
pub fn wrap_text(text: &str, style: FontStyle, font_size: f64, max_width: f64) -> Vec<String> {
    let fits = |s: &str| text_width(s, style, font_size) <= max_width;
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current = word.to_string();
            } else {
                let candidate = format!("{} {}", current, word);
                if fits(&candidate) {
                    current = candidate;
                    continue;
                }
                lines.push(std::mem::take(&mut current));
                current = word.to_string();
            }

            while !fits(&current) {
                let (head, tail) = split_to_width(&current, &fits);
                lines.push(head);
                current = tail;
            }
        }

        lines.push(current);
    }

    lines
}

/// Longest prefix that fits, keeping at least one character per line.
fn split_to_width(word: &str, fits: &dyn Fn(&str) -> bool) -> (String, String) {
    let mut cut = word.len();
    for (idx, _) in word.char_indices().rev() {
        if idx == 0 {
            break;
        }
        if fits(&word[..idx]) {
            cut = idx;
            break;
        }
        cut = idx;
    }
    if cut == word.len() {
        // Single character wider than the line.
        let first = word.chars().next().map(char::len_utf8).unwrap_or(word.len());
        cut = first;
    }
    (word[..cut].to_string(), word[cut..].to_string())
}
