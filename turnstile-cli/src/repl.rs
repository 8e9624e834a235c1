//! Interactive REPL over a session driver.
//!
//! Loops over turns until `exit` or `quit`. The bank demo offers a
//! numbered menu and prompts for name and PIN on every iteration, so a
//! mistyped PIN only affects that turn; the other demos collect
//! credentials once at startup. Either way, validation errors re-prompt.

use std::io::{self, BufRead, Write};

use turnstile::error::Error;
use turnstile::session::{Credentials, SessionDriver};

/// How the REPL collects each turn's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplStyle {
    /// Numbered menu with a free-question option.
    Menu,
    /// Free-form prompt.
    Prompt,
}

/// An interactive loop driving one persona.
pub struct Repl {
    driver: SessionDriver,
    style: ReplStyle,
    banner: String,
    collect_pin: bool,
    collect_member_id: bool,
    collect_issue_category: bool,
}

impl Repl {
    /// REPL for the bank persona: menu-driven, asks for name and PIN on
    /// every iteration.
    #[must_use]
    pub fn bank(driver: SessionDriver) -> Self {
        Self {
            driver,
            style: ReplStyle::Menu,
            banner: "SecureBank assistant".to_string(),
            collect_pin: true,
            collect_member_id: false,
            collect_issue_category: false,
        }
    }

    /// REPL for the library persona: free prompts, asks for an optional
    /// membership id.
    #[must_use]
    pub fn library(driver: SessionDriver) -> Self {
        Self {
            driver,
            style: ReplStyle::Prompt,
            banner: "Library assistant".to_string(),
            collect_pin: false,
            collect_member_id: true,
            collect_issue_category: false,
        }
    }

    /// REPL for the support persona: free prompts, name only.
    #[must_use]
    pub fn support(driver: SessionDriver) -> Self {
        Self {
            driver,
            style: ReplStyle::Prompt,
            banner: "Support agent".to_string(),
            collect_pin: false,
            collect_member_id: false,
            collect_issue_category: true,
        }
    }

    /// Run the loop until the user exits.
    ///
    /// # Errors
    ///
    /// Returns an error only on stdin/stdout failure; turn-level errors
    /// are printed and the loop continues.
    pub async fn run(&self) -> anyhow::Result<()> {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();

        tracing::debug!(persona = %self.banner, "starting repl");
        println!("{} (type 'exit' or 'quit' to leave)", self.banner);
        println!();

        // Menu demos re-authenticate on every iteration.
        let held = match self.style {
            ReplStyle::Menu => None,
            ReplStyle::Prompt => Some(self.collect_credentials(&mut lines)?),
        };

        loop {
            let Some(input) = self.next_input(&mut lines)? else {
                break;
            };

            let fresh;
            let credentials = match held.as_ref() {
                Some(credentials) => credentials,
                None => {
                    fresh = self.collect_credentials(&mut lines)?;
                    &fresh
                }
            };

            match self.driver.display_turn(credentials, &input).await {
                Ok(text) => {
                    println!("{text}");
                    println!();
                }
                Err(err) => {
                    eprintln!("error: {err}");
                    println!();
                }
            }
        }

        println!("Goodbye.");
        Ok(())
    }

    /// Prompt for credentials until they validate.
    fn collect_credentials(
        &self,
        lines: &mut impl Iterator<Item = io::Result<String>>,
    ) -> anyhow::Result<Credentials> {
        loop {
            let name = prompt_line("Your name: ", lines)?;
            let mut credentials = Credentials::named(name);

            if self.collect_pin {
                let pin = prompt_line("Your 4-digit PIN: ", lines)?;
                credentials = credentials.with_pin(pin);
            }
            if self.collect_member_id {
                let member_id =
                    prompt_line("Library member id (leave empty if none): ", lines)?;
                if !member_id.is_empty() {
                    credentials = credentials.with_member_id(member_id);
                }
            }
            if self.collect_issue_category {
                let category =
                    prompt_line("What is your issue about? (leave empty to skip): ", lines)?;
                if !category.is_empty() {
                    credentials = credentials.with_issue_category(category);
                }
            }

            match self.driver.build_context(&credentials) {
                Ok(_) => return Ok(credentials),
                Err(Error::Validation(reason)) => {
                    println!("Invalid input: {reason}. Let's try again.");
                    println!();
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Get the next turn's input, or `None` when the user exits.
    fn next_input(
        &self,
        lines: &mut impl Iterator<Item = io::Result<String>>,
    ) -> anyhow::Result<Option<String>> {
        loop {
            let raw = match self.style {
                ReplStyle::Menu => {
                    println!("1) Check my balance");
                    println!("2) Exit");
                    let choice = prompt_line("Choose an option (or type a question): ", lines)?;
                    match choice.as_str() {
                        "1" => return Ok(Some("What is my balance?".to_string())),
                        "2" | "exit" | "quit" => return Ok(None),
                        _ => choice,
                    }
                }
                ReplStyle::Prompt => prompt_line("> ", lines)?,
            };

            if raw.is_empty() {
                continue;
            }
            if matches!(raw.as_str(), "exit" | "quit") {
                return Ok(None);
            }
            return Ok(Some(raw));
        }
    }
}

impl std::fmt::Debug for Repl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repl")
            .field("style", &self.style)
            .field("banner", &self.banner)
            .finish_non_exhaustive()
    }
}

/// Print a prompt, read one line, and return it trimmed.
fn prompt_line(
    prompt: &str,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> anyhow::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => Ok(line?.trim().to_string()),
        None => anyhow::bail!("stdin closed"),
    }
}
