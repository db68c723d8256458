//! LaTeX markup to plain text, for titles and person names.

/// Render BibTeX/LaTeX markup as plain text.
///
/// Braces and math shifts are dropped, escaped specials are unescaped,
/// accent and letter commands become the corresponding characters, and any
/// other command is removed while its argument is kept.
pub fn to_plain_text(src: &str) -> String {
    let chars: Vec<char> = src.chars().collect();
    let mut out = String::with_capacity(src.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '{' | '}' | '$' => i += 1,
            '~' => {
                out.push(' ');
                i += 1;
            }
            '\\' => i = command(&chars, i + 1, &mut out),
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// Handle the command starting right after a backslash; returns the next index
fn command(chars: &[char], i: usize, out: &mut String) -> usize {
    let Some(&c) = chars.get(i) else {
        return i;
    };

    if "&%$#_{}".contains(c) {
        out.push(c);
        return i + 1;
    }
    if c == '\\' {
        out.push(' ');
        return i + 1;
    }
    if "'`^\"~=.".contains(c) {
        let (letter, next) = accent_argument(chars, i + 1);
        if let Some(letter) = letter {
            out.push(compose(c, letter));
        }
        return next;
    }
    if !c.is_ascii_alphabetic() {
        out.push(c);
        return i + 1;
    }

    let mut end = i;
    while chars.get(end).is_some_and(|c| c.is_ascii_alphabetic()) {
        end += 1;
    }
    let name: String = chars[i..end].iter().collect();
    let mut next = end;
    while chars.get(next).is_some_and(|c| *c == ' ') {
        next += 1;
    }

    if let Some(symbol) = letter_symbol(&name) {
        out.push_str(symbol);
        return next;
    }
    if name.len() == 1 && "cvuHkrdb".contains(name.as_str()) {
        let accent = name.chars().next().unwrap_or('c');
        let (letter, after) = accent_argument(chars, next);
        if let Some(letter) = letter {
            out.push(compose(accent, letter));
        }
        return after;
    }

    // Formatting or unknown command: drop it and keep its argument.
    next
}

/// Read the letter an accent applies to: `e`, `{e}`, `\i` or `{\i}`
fn accent_argument(chars: &[char], mut i: usize) -> (Option<char>, usize) {
    let braced = chars.get(i) == Some(&'{');
    if braced {
        i += 1;
    }

    let letter = match (chars.get(i), chars.get(i + 1)) {
        (Some('\\'), Some(&dotless)) if dotless == 'i' || dotless == 'j' => {
            i += 2;
            Some(dotless)
        }
        (Some(&c), _) if c != '}' => {
            i += 1;
            Some(c)
        }
        _ => None,
    };

    if braced && chars.get(i) == Some(&'}') {
        i += 1;
    }
    (letter, i)
}

fn letter_symbol(name: &str) -> Option<&'static str> {
    let symbol = match name {
        "ss" => "ß",
        "o" => "ø",
        "O" => "Ø",
        "ae" => "æ",
        "AE" => "Æ",
        "oe" => "œ",
        "OE" => "Œ",
        "aa" => "å",
        "AA" => "Å",
        "l" => "ł",
        "L" => "Ł",
        "i" => "ı",
        "j" => "ȷ",
        _ => return None,
    };
    Some(symbol)
}

fn compose(accent: char, letter: char) -> char {
    match (accent, letter) {
        ('\'', 'a') => 'á',
        ('\'', 'e') => 'é',
        ('\'', 'i') => 'í',
        ('\'', 'o') => 'ó',
        ('\'', 'u') => 'ú',
        ('\'', 'y') => 'ý',
        ('\'', 'c') => 'ć',
        ('\'', 'n') => 'ń',
        ('\'', 's') => 'ś',
        ('\'', 'z') => 'ź',
        ('\'', 'A') => 'Á',
        ('\'', 'E') => 'É',
        ('\'', 'I') => 'Í',
        ('\'', 'O') => 'Ó',
        ('\'', 'U') => 'Ú',
        ('`', 'a') => 'à',
        ('`', 'e') => 'è',
        ('`', 'i') => 'ì',
        ('`', 'o') => 'ò',
        ('`', 'u') => 'ù',
        ('`', 'A') => 'À',
        ('`', 'E') => 'È',
        ('`', 'O') => 'Ò',
        ('`', 'U') => 'Ù',
        ('^', 'a') => 'â',
        ('^', 'e') => 'ê',
        ('^', 'i') => 'î',
        ('^', 'o') => 'ô',
        ('^', 'u') => 'û',
        ('^', 'A') => 'Â',
        ('^', 'E') => 'Ê',
        ('^', 'I') => 'Î',
        ('^', 'O') => 'Ô',
        ('^', 'U') => 'Û',
        ('"', 'a') => 'ä',
        ('"', 'e') => 'ë',
        ('"', 'i') => 'ï',
        ('"', 'o') => 'ö',
        ('"', 'u') => 'ü',
        ('"', 'y') => 'ÿ',
        ('"', 'A') => 'Ä',
        ('"', 'E') => 'Ë',
        ('"', 'I') => 'Ï',
        ('"', 'O') => 'Ö',
        ('"', 'U') => 'Ü',
        ('~', 'a') => 'ã',
        ('~', 'n') => 'ñ',
        ('~', 'o') => 'õ',
        ('~', 'A') => 'Ã',
        ('~', 'N') => 'Ñ',
        ('~', 'O') => 'Õ',
        ('c', 'c') => 'ç',
        ('c', 'C') => 'Ç',
        ('c', 's') => 'ş',
        ('v', 'c') => 'č',
        ('v', 'e') => 'ě',
        ('v', 'r') => 'ř',
        ('v', 's') => 'š',
        ('v', 'z') => 'ž',
        ('v', 'C') => 'Č',
        ('v', 'R') => 'Ř',
        ('v', 'S') => 'Š',
        ('v', 'Z') => 'Ž',
        ('u', 'g') => 'ğ',
        ('H', 'o') => 'ő',
        ('H', 'u') => 'ű',
        ('k', 'a') => 'ą',
        ('k', 'e') => 'ę',
        ('r', 'a') => 'å',
        ('r', 'u') => 'ů',
        _ => letter,
    }
}
