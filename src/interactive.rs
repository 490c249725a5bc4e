//! Terminal prompts: the input path and the y/n confirmation.

use crate::error::{Error, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::debug;

pub const PATH_PROMPT: &str = "Please specify the path to your PDF file (e.g., /pdfs/example.pdf): ";
pub const CONFIRM_PROMPT: &str = "Would you like me to implement these suggestions? (y/n): ";
pub const RETRY_PROMPT: &str = "Invalid input. Please enter \"y\" for yes or \"n\" for no: ";

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, msg: &str) -> Result<()> {
        writeln!(self.output, "{msg}")?;
        Ok(())
    }

    pub fn ask_path(&mut self) -> Result<PathBuf> {
        loop {
            let line = self.ask(PATH_PROMPT)?;
            let cleaned = line.trim().trim_matches(|c| c == '"' || c == '\'');
            if !cleaned.is_empty() {
                return Ok(PathBuf::from(cleaned));
            }
        }
    }

    /// Asks until the answer is `y` or `n`.
    pub fn confirm(&mut self) -> Result<bool> {
        let mut prompt = CONFIRM_PROMPT;
        loop {
            let line = self.ask(prompt)?;
            match parse_answer(&line) {
                Ok(answer) => return Ok(answer),
                Err(e) => {
                    debug!("{e}");
                    prompt = RETRY_PROMPT;
                }
            }
        }
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::InvalidInput("input closed before an answer was given".into()));
        }
        Ok(line)
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

pub fn parse_answer(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "y" => Ok(true),
        "n" => Ok(false),
        other => Err(Error::InvalidInput(format!("expected y or n, got {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn answers_are_case_insensitive() {
        assert!(parse_answer(" Y\n").unwrap());
        assert!(!parse_answer("n").unwrap());
        assert!(matches!(parse_answer("yes"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn reprompts_until_valid() {
        let mut p = Prompter::new(Cursor::new("maybe\n\nY\n"), Vec::new());
        assert!(p.confirm().unwrap());
        let shown = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(shown.matches(RETRY_PROMPT).count(), 2);
        assert_eq!(shown.matches(CONFIRM_PROMPT).count(), 1);
    }

    #[test]
    fn eof_is_invalid_input() {
        let mut p = Prompter::new(Cursor::new("maybe\n"), Vec::new());
        assert!(matches!(p.confirm(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn path_is_unquoted() {
        let mut p = Prompter::new(Cursor::new("\n  '/tmp/a b.pdf'  \n"), Vec::new());
        assert_eq!(p.ask_path().unwrap(), PathBuf::from("/tmp/a b.pdf"));
    }
}
