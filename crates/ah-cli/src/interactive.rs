//! Interactive prompts for CLI commands
//!
//! Uses dialoguer on a terminal. When stdin is piped, answers are read as
//! plain lines so the binary stays scriptable.

use std::io::{BufRead, IsTerminal, Write};

use dialoguer::{Confirm, Input};

use crate::error::Result;

#[derive(Debug, Clone, Copy)]
pub struct Prompter {
    assume_yes: bool,
}

impl Prompter {
    /// With `assume_yes`, every confirmation returns its default.
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    /// Yes/no question. An empty answer takes `default`; any answer other
    /// than `y`/`yes` declines.
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.assume_yes {
            return Ok(default);
        }
        if std::io::stdin().is_terminal() {
            return Ok(Confirm::new()
                .with_prompt(prompt)
                .default(default)
                .interact()?);
        }

        let hint = if default { "[Y/n]" } else { "[y/N]" };
        let answer = read_piped_line(&format!("{prompt} {hint}: "))?;
        Ok(parse_yes_no(&answer, default))
    }

    /// Ask the operator to type `expected` exactly. `--yes` does not answer
    /// this prompt.
    pub fn typed_confirmation(&self, prompt: &str, expected: &str) -> Result<bool> {
        let answer = if std::io::stdin().is_terminal() {
            Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()?
        } else {
            read_piped_line(&format!("{prompt}: "))?
        };
        Ok(answer.trim() == expected)
    }
}

fn read_piped_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    println!();
    Ok(line)
}

/// Empty takes `default`, `y`/`yes` in any case accepts, anything else declines.
fn parse_yes_no(answer: &str, default: bool) -> bool {
    match answer.trim().to_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    }
}
