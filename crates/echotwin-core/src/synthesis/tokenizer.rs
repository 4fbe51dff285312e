//! Character tokenizer.

/// Token value in `0..=31`.
pub type Token = u8;

/// Characters outside the alphabet.
pub const UNKNOWN_TOKEN: Token = 0;
pub const SPACE_TOKEN: Token = 27;
pub const PERIOD_TOKEN: Token = 28;
pub const COMMA_TOKEN: Token = 29;
pub const EXCLAMATION_TOKEN: Token = 30;
pub const QUESTION_TOKEN: Token = 31;

/// Token for one character: letters are `1..=26` regardless of case.
pub fn token_for(c: char) -> Token {
    match c {
        'a'..='z' => c as u8 - b'a' + 1,
        'A'..='Z' => c as u8 - b'A' + 1,
        ' ' => SPACE_TOKEN,
        '.' => PERIOD_TOKEN,
        ',' => COMMA_TOKEN,
        '!' => EXCLAMATION_TOKEN,
        '?' => QUESTION_TOKEN,
        _ => UNKNOWN_TOKEN,
    }
}

/// One token per character, in order.
pub fn tokenize(text: &str) -> Vec<Token> {
    text.chars().map(token_for).collect()
}
