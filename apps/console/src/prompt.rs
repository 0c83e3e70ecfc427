use std::io::{self, BufRead, Write};

use client_core::ConfirmationPrompt;

/// Asks on the terminal; anything but an explicit yes declines.
pub struct StdinConfirmation;

impl ConfirmationPrompt for StdinConfirmation {
    fn confirm(&self, message: &str) -> bool {
        print!("{message} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes" | "s" | "sim"
    )
}
