//! Minimal `.netrc` support: `machine`, `default`, `login` and `password`.
//!
//! `account` values are skipped and `macdef` bodies are ignored up to the next blank line.
//! Tokens may be double-quoted, with `\` escapes.

use std::io;
use std::path::{Path, PathBuf};

use ccauth_core::ClientCredentials;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Entry {
    login: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Netrc {
    machines: Vec<(String, Entry)>,
    default: Option<Entry>,
}

impl Netrc {
    pub fn parse(text: &str) -> Self {
        let mut result = Self::default();
        let mut current: Option<(Option<String>, Entry)> = None;
        let mut in_macdef = false;

        let mut tokens = Vec::new();
        for line in text.lines() {
            if in_macdef {
                in_macdef = !line.trim().is_empty();
                continue;
            }
            if line.trim_start().starts_with('#') {
                continue;
            }
            for word in tokenize(line) {
                if word == "macdef" {
                    // The macro name is on the same line, the body on the next lines
                    in_macdef = true;
                    break;
                }
                tokens.push(word);
            }
        }

        let mut iter = tokens.into_iter();
        while let Some(token) = iter.next() {
            match token.as_str() {
                "machine" | "default" => {
                    if let Some(done) = current.take() {
                        result.push(done);
                    }
                    let name = if token == "machine" { iter.next() } else { None };
                    current = Some((name, Entry::default()));
                }
                "login" | "password" | "account" => {
                    let value = iter.next();
                    if let Some((_, entry)) = current.as_mut() {
                        match token.as_str() {
                            "login" => entry.login = value,
                            "password" => entry.password = value,
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }
        if let Some(done) = current.take() {
            result.push(done);
        }

        result
    }

    fn push(&mut self, (name, entry): (Option<String>, Entry)) {
        match name {
            Some(name) => self.machines.push((name, entry)),
            None => {
                self.default.get_or_insert(entry);
            }
        }
    }

    /// Reads a netrc file that must exist.
    pub fn read(path: &Path) -> io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    /// Loads an optional netrc file, `Ok(None)` if it does not exist.
    pub fn load(path: &Path) -> io::Result<Option<Self>> {
        match Self::read(path) {
            Ok(netrc) => Ok(Some(netrc)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// `$NETRC`, then `$HOME/.netrc`.
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("NETRC")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".netrc")))
    }

    /// Credentials of the first `machine` matching the host, then of `default`.
    ///
    /// A matching `machine` without `login` does not count as a match.
    pub fn credentials_for(&self, host: &str) -> Option<ClientCredentials> {
        self.machines
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(host))
            .map(|(_, entry)| entry)
            .filter(|entry| entry.login.is_some())
            .or(self.default.as_ref())
            .and_then(|entry| {
                let login = entry.login.clone()?;
                let password = entry.password.clone().unwrap_or_default();
                Some(ClientCredentials::new(login, password))
            })
    }
}

/// Splits a line into words; `"..."` groups words and `\` escapes the next character.
fn tokenize(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&first) = chars.peek() {
        if first.is_whitespace() {
            chars.next();
            continue;
        }

        let mut word = String::new();
        if first == '"' {
            chars.next();
            while let Some(ch) = chars.next() {
                match ch {
                    '"' => break,
                    '\\' => word.extend(chars.next()),
                    _ => word.push(ch),
                }
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() {
                    break;
                }
                chars.next();
                if ch == '\\' {
                    word.extend(chars.next());
                } else {
                    word.push(ch);
                }
            }
        }
        words.push(word);
    }

    words
}
