use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};

/// Line acquisition for the interactive loop: prompt, then one bounded line.
pub struct Terminal {
    prompt: String,
    max_input: usize,
}

impl Terminal {
    pub fn new(prompt: &str, max_input: usize) -> Self {
        Terminal {
            prompt: prompt.to_string(),
            max_input,
        }
    }

    /// Returns `Ok(None)` once stdin is exhausted.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        let mut stdout = io::stdout();
        stdout
            .write_all(self.prompt.as_bytes())
            .and_then(|_| stdout.flush())
            .context("Failed to write prompt")?;

        let stdin = io::stdin();
        let mut reader = stdin.lock();
        read_bounded(&mut reader, self.max_input).context("Failed to read input")
    }
}

fn read_bounded<R: BufRead>(reader: &mut R, max_input: usize) -> io::Result<Option<String>> {
    let mut raw = Vec::new();
    if reader.read_until(b'\n', &mut raw)? == 0 {
        return Ok(None);
    }
    if raw.last() == Some(&b'\n') {
        raw.pop();
    }

    let mut line = String::from_utf8_lossy(&raw).into_owned();
    if line.len() > max_input {
        let mut cut = max_input;
        while !line.is_char_boundary(cut) {
            cut -= 1;
        }
        line.truncate(cut);
    }
    Ok(Some(line))
}
