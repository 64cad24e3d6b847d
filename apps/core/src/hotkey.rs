use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
    Win,
}

impl Modifier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ctrl => "Ctrl",
            Self::Alt => "Alt",
            Self::Shift => "Shift",
            Self::Win => "Win",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Space,
    Function(u8),
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{c}"),
            Self::Space => write!(f, "Space"),
            Self::Function(n) => write!(f, "F{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hotkey {
    pub modifiers: Vec<Modifier>,
    pub key: Key,
}

impl Hotkey {
    pub fn canonical(&self) -> String {
        let mut parts: Vec<String> = self
            .modifiers
            .iter()
            .map(|modifier| modifier.as_str().to_string())
            .collect();
        parts.push(self.key.to_string());
        parts.join("+")
    }
}

/// Parses `"Ctrl+Alt+O"`-style chords: at least one modifier, exactly one
/// key, any casing and spacing. Modifiers come back deduplicated in a fixed
/// Ctrl/Alt/Shift/Win order so equal chords compare equal.
pub fn parse_hotkey(input: &str) -> Result<Hotkey, String> {
    let parts: Vec<&str> = input
        .split('+')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    if parts.len() < 2 {
        return Err(format!(
            "hotkey '{input}' must name at least one modifier and a key"
        ));
    }

    let mut modifiers = Vec::new();
    for part in &parts[..parts.len() - 1] {
        let modifier = parse_modifier(part)?;
        if !modifiers.contains(&modifier) {
            modifiers.push(modifier);
        }
    }
    modifiers.sort();

    let key = parse_key(parts[parts.len() - 1])?;
    Ok(Hotkey { modifiers, key })
}

fn parse_modifier(input: &str) -> Result<Modifier, String> {
    match input.to_ascii_lowercase().as_str() {
        "ctrl" | "control" => Ok(Modifier::Ctrl),
        "alt" => Ok(Modifier::Alt),
        "shift" => Ok(Modifier::Shift),
        "win" | "meta" | "super" => Ok(Modifier::Win),
        _ => Err(format!("unsupported modifier '{input}'")),
    }
}

fn parse_key(input: &str) -> Result<Key, String> {
    let upper = input.to_ascii_uppercase();
    if upper == "SPACE" {
        return Ok(Key::Space);
    }

    if let Some(number) = upper.strip_prefix('F') {
        if let Ok(parsed) = number.parse::<u8>() {
            if (1..=24).contains(&parsed) {
                return Ok(Key::Function(parsed));
            }
            return Err(format!("function key F{parsed} is out of the F1-F24 range"));
        }
    }

    let mut chars = upper.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphanumeric() => Ok(Key::Char(c)),
        _ => Err(format!(
            "unsupported key '{input}': expected A-Z, 0-9, Space, or F1-F24"
        )),
    }
}
