//! Glob Pattern Matching
//!
//! Key matching in the dialect of the Redis `KEYS` command, so both backends
//! select the same keys for a given pattern.
//!
//! Supported syntax:
//! - `*` any sequence of characters, including none
//! - `?` exactly one character
//! - `[abc]`, `[a-z]`, `[^a]` character classes
//! - `\x` the literal character `x`
//!
//! Plain `*`/`?` patterns go through `wildmatch`. Patterns using classes or
//! escapes are tokenized and matched with single-star backtracking, so every
//! match runs in `O(pattern * key)`.

use wildmatch::WildMatch;

// == Key Pattern ==
/// A glob compiled once and matched against many keys.
#[derive(Debug, Clone)]
pub enum KeyPattern {
    Wild(WildMatch),
    Tokens(Vec<Token>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Star,
    AnyChar,
    Literal(char),
    Class { negate: bool, ranges: Vec<(char, char)> },
}

impl Token {
    fn accepts(&self, ch: char) -> bool {
        match self {
            Token::Star => false,
            Token::AnyChar => true,
            Token::Literal(literal) => *literal == ch,
            Token::Class { negate, ranges } => {
                ranges.iter().any(|(low, high)| (*low..=*high).contains(&ch)) != *negate
            }
        }
    }
}

impl KeyPattern {
    pub fn new(pattern: &str) -> Self {
        if pattern.contains(&['[', '\\'][..]) {
            KeyPattern::Tokens(tokenize(pattern))
        } else {
            KeyPattern::Wild(WildMatch::new(pattern))
        }
    }

    /// Returns true when `key` matches the whole pattern.
    pub fn matches(&self, key: &str) -> bool {
        match self {
            KeyPattern::Wild(wild) => wild.matches(key),
            KeyPattern::Tokens(tokens) => {
                let key: Vec<char> = key.chars().collect();
                match_tokens(tokens, &key)
            }
        }
    }
}

/// Returns true when `key` matches the glob `pattern` in full.
pub fn glob_match(pattern: &str, key: &str) -> bool {
    KeyPattern::new(pattern).matches(key)
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => tokens.push(Token::Star),
            '?' => tokens.push(Token::AnyChar),
            '\\' if i + 1 < chars.len() => {
                i += 1;
                tokens.push(Token::Literal(chars[i]));
            }
            '[' => {
                let (class, next) = class_at(&chars, i + 1);
                tokens.push(class);
                i = next;
                continue;
            }
            literal => tokens.push(Token::Literal(literal)),
        }
        i += 1;
    }

    tokens
}

/// Parses the class body starting right after `[`. Returns the class and the
/// index after the closing `]`; an unterminated class runs to the end.
fn class_at(chars: &[char], mut i: usize) -> (Token, usize) {
    let negate = chars.get(i) == Some(&'^');
    if negate {
        i += 1;
    }

    let mut ranges = Vec::new();
    loop {
        match &chars[i..] {
            [] => break,
            [']', ..] => {
                i += 1;
                break;
            }
            ['\\', escaped, ..] => {
                ranges.push((*escaped, *escaped));
                i += 2;
            }
            [low, '-', high, ..] if *high != ']' => {
                ranges.push(if low <= high { (*low, *high) } else { (*high, *low) });
                i += 3;
            }
            [single, ..] => {
                ranges.push((*single, *single));
                i += 1;
            }
        }
    }

    (Token::Class { negate, ranges }, i)
}

fn match_tokens(tokens: &[Token], key: &[char]) -> bool {
    let (mut t, mut k) = (0, 0);
    // Last star seen and the key position it currently absorbs up to
    let mut star: Option<(usize, usize)> = None;

    while k < key.len() {
        match tokens.get(t) {
            Some(Token::Star) => {
                star = Some((t, k));
                t += 1;
            }
            Some(token) if token.accepts(key[k]) => {
                t += 1;
                k += 1;
            }
            _ => match star {
                Some((star_at, absorbed)) => {
                    star = Some((star_at, absorbed + 1));
                    t = star_at + 1;
                    k = absorbed + 1;
                }
                None => return false,
            },
        }
    }

    tokens[t..].iter().all(|token| *token == Token::Star)
}
