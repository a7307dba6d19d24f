use std::io::{self, Read};

#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Ctrl(char),
}

fn next_byte() -> Option<u8> {
    let mut buf = [0u8; 1];
    match io::stdin().read(&mut buf) {
        Ok(1) => Some(buf[0]),
        _ => None,
    }
}

/// Read one keypress. Returns None when the read timed out.
pub fn read_key() -> Option<Key> {
    let first = next_byte()?;
    Some(match first {
        27 => parse_escape(),
        _ => decode(first, &mut next_byte),
    })
}

/// Decode a non-escape lead byte. UTF-8 continuation bytes come from `more`.
fn decode(b: u8, more: &mut dyn FnMut() -> Option<u8>) -> Key {
    match b {
        13 => Key::Enter,
        9 => Key::Tab,
        8 | 127 => Key::Backspace,
        1..=26 => Key::Ctrl((b'a' + b - 1) as char),
        32..=126 => Key::Char(b as char),
        0xC0..=0xF7 => {
            let extra = if b >= 0xF0 {
                3
            } else if b >= 0xE0 {
                2
            } else {
                1
            };
            let mut bytes = vec![b];
            for _ in 0..extra {
                match more() {
                    Some(c) => bytes.push(c),
                    None => return Key::Char('?'),
                }
            }
            std::str::from_utf8(&bytes)
                .ok()
                .and_then(|s| s.chars().next())
                .map(Key::Char)
                .unwrap_or(Key::Char('?'))
        }
        _ => Key::Char('?'),
    }
}

fn parse_escape() -> Key {
    match next_byte() {
        Some(b'[') => {}
        _ => return Key::Escape,
    }
    let mut seq = Vec::new();
    while let Some(b) = next_byte() {
        seq.push(b);
        // Final byte of a CSI sequence.
        if (0x40..=0x7E).contains(&b) {
            break;
        }
    }
    decode_csi(&seq)
}

fn decode_csi(seq: &[u8]) -> Key {
    match seq {
        b"A" => Key::Up,
        b"B" => Key::Down,
        b"H" | b"1~" | b"7~" => Key::Home,
        b"F" | b"4~" | b"8~" => Key::End,
        b"5~" => Key::PageUp,
        b"6~" => Key::PageDown,
        b"Z" => Key::Tab,
        _ => Key::Escape,
    }
}
