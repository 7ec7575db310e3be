/// Key-combination grammar: `"Ctrl+Shift+S"`, `"Win+PrintScreen"`, `"F11"`.
///
/// The lifecycle passes combinations to the input synthesizer untouched;
/// parsing exists for catalog validation and display.
use std::fmt;
use std::str::FromStr;

use crate::error::VoxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
    Win,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Modifier::Ctrl => "Ctrl",
            Modifier::Alt => "Alt",
            Modifier::Shift => "Shift",
            Modifier::Win => "Win",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Upper-cased letter or digit.
    Char(char),
    Function(u8),
    Enter,
    Escape,
    Space,
    Tab,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    Plus,
    Minus,
    PrintScreen,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Key::Char(c) => return write!(f, "{c}"),
            Key::Function(n) => return write!(f, "F{n}"),
            Key::Enter => "Enter",
            Key::Escape => "Esc",
            Key::Space => "Space",
            Key::Tab => "Tab",
            Key::Backspace => "Backspace",
            Key::Delete => "Delete",
            Key::Insert => "Insert",
            Key::Home => "Home",
            Key::End => "End",
            Key::PageUp => "PageUp",
            Key::PageDown => "PageDown",
            Key::Up => "Up",
            Key::Down => "Down",
            Key::Left => "Left",
            Key::Right => "Right",
            Key::Plus => "Plus",
            Key::Minus => "Minus",
            Key::PrintScreen => "PrintScreen",
        };
        f.write_str(name)
    }
}

/// A parsed key combination: modifiers plus at most one main key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChord {
    /// Sorted, without duplicates.
    pub modifiers: Vec<Modifier>,
    pub key: Option<Key>,
}

impl KeyChord {
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

enum Token {
    Modifier(Modifier),
    Key(Key),
}

fn parse_token(raw: &str) -> Option<Token> {
    let lower = raw.to_ascii_lowercase();
    let token = match lower.as_str() {
        "ctrl" | "control" => Token::Modifier(Modifier::Ctrl),
        "alt" => Token::Modifier(Modifier::Alt),
        "shift" => Token::Modifier(Modifier::Shift),
        "win" | "windows" | "super" | "meta" => Token::Modifier(Modifier::Win),
        "enter" | "return" => Token::Key(Key::Enter),
        "esc" | "escape" => Token::Key(Key::Escape),
        "space" => Token::Key(Key::Space),
        "tab" => Token::Key(Key::Tab),
        "backspace" => Token::Key(Key::Backspace),
        "delete" | "del" => Token::Key(Key::Delete),
        "insert" => Token::Key(Key::Insert),
        "home" => Token::Key(Key::Home),
        "end" => Token::Key(Key::End),
        "pageup" | "pgup" => Token::Key(Key::PageUp),
        "pagedown" | "pgdn" => Token::Key(Key::PageDown),
        "up" => Token::Key(Key::Up),
        "down" => Token::Key(Key::Down),
        "left" => Token::Key(Key::Left),
        "right" => Token::Key(Key::Right),
        "plus" => Token::Key(Key::Plus),
        "minus" => Token::Key(Key::Minus),
        "printscreen" | "prtsc" => Token::Key(Key::PrintScreen),
        _ => {
            let mut chars = lower.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphanumeric() => {
                    Token::Key(Key::Char(c.to_ascii_uppercase()))
                }
                (Some('f'), Some(_)) => {
                    let n: u8 = lower[1..].parse().ok()?;
                    if !(1..=24).contains(&n) {
                        return None;
                    }
                    Token::Key(Key::Function(n))
                }
                _ => return None,
            }
        }
    };
    Some(token)
}

impl FromStr for KeyChord {
    type Err = VoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| VoxError::InvalidKeyCombination {
            combo: s.to_string(),
            reason: reason.to_string(),
        };

        if s.trim().is_empty() {
            return Err(invalid("empty combination"));
        }

        let mut modifiers = Vec::new();
        let mut key = None;
        for raw in s.split('+') {
            let raw = raw.trim();
            if raw.is_empty() {
                return Err(invalid("empty token"));
            }
            match parse_token(raw) {
                Some(Token::Modifier(m)) => {
                    if !modifiers.contains(&m) {
                        modifiers.push(m);
                    }
                }
                Some(Token::Key(k)) => {
                    if key.is_some() {
                        return Err(invalid("more than one main key"));
                    }
                    key = Some(k);
                }
                None => return Err(invalid(&format!("unknown key '{raw}'"))),
            }
        }
        modifiers.sort();

        Ok(KeyChord { modifiers, key })
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.modifiers.iter().map(ToString::to_string).collect();
        if let Some(key) = self.key {
            parts.push(key.to_string());
        }
        f.write_str(&parts.join("+"))
    }
}
