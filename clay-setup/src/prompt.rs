//! Yes/no decisions. Every destructive step asks through a plain
//! `FnMut(&str) -> bool`, so force mode is just a function that always says yes.

use std::io::{self, BufRead, Write};

pub fn assume_yes() -> impl FnMut(&str) -> bool {
    |prompt: &str| {
        tracing::debug!("{} [assumed yes]", prompt);
        true
    }
}

/// Ask on stderr and read the answer from stdin. Blocks until a line
/// arrives; EOF or a read error counts as "no".
pub fn interactive() -> impl FnMut(&str) -> bool {
    |prompt: &str| {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stderr();
        ask(prompt, &mut input, &mut output).unwrap_or(false)
    }
}

/// Pick the decision function for a run
pub fn decider(force: bool) -> Box<dyn FnMut(&str) -> bool> {
    if force {
        Box::new(assume_yes())
    } else {
        Box::new(interactive())
    }
}

pub fn ask<R: BufRead, W: Write>(prompt: &str, input: &mut R, output: &mut W) -> io::Result<bool> {
    write!(output, "{prompt} [y/N] ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(false);
    }
    Ok(is_yes(&line))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
