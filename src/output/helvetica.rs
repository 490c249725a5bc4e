//! WinAnsi encoding and Helvetica advance widths (standard AFM, 1/1000 em).

/// Indexed by WinAnsi byte. Control bytes render as spaces; unassigned
/// slots are never emitted and carry the width of `?`.
#[rustfmt::skip]
const WIDTHS: [u16; 256] = [
    278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278,
    278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278, 278,
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 556,
    556, 556, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 556, 611, 556,
    556, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 556, 500, 667,
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

/// WinAnsi byte for `c`; anything the encoding lacks becomes `?`.
pub fn win_ansi_byte(c: char) -> u8 {
    match c {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        c if (c as u32) < 0x20 => b' ',
        c if (0x20..0x7F).contains(&(c as u32)) || (0xA0..=0xFF).contains(&(c as u32)) => {
            c as u32 as u8
        }
        _ => b'?',
    }
}

pub fn encode(s: &str) -> Vec<u8> {
    s.chars().map(win_ansi_byte).collect()
}

pub fn char_width(c: char) -> u32 {
    u32::from(WIDTHS[usize::from(win_ansi_byte(c))])
}

/// Width of `s` as rendered, in thousandths of the font size.
pub fn text_width(s: &str) -> u32 {
    s.chars().map(char_width).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typographic_punctuation_has_win_ansi_slots() {
        assert_eq!(
            encode("\u{201C}a\u{201D} \u{2013} \u{2014} \u{20AC}5 \u{2019}"),
            b"\x93a\x94 \x96 \x97 \x805 \x92".to_vec()
        );
    }

    #[test]
    fn latin1_passes_through_and_the_rest_is_replaced() {
        assert_eq!(encode("caf\u{e9}\t\u{3b1}"), b"caf\xe9 ?".to_vec());
    }

    #[test]
    fn widths_follow_the_metrics() {
        assert_eq!(text_width("W"), 944);
        assert_eq!(text_width("il"), 444);
        assert_eq!(text_width("\u{2014}"), 1000);
        assert_eq!(text_width("\u{3b1}"), text_width("?"));
    }
}
