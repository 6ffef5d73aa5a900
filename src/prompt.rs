use std::io::{BufRead, Write};

use ghpulse_core::RepoId;
use miette::{IntoDiagnostic, Result};

/// The two analyses offered by the interactive menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analysis {
    Pairs,
    Weekly,
}

/// Line-oriented question/answer session over any reader and writer.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn banner(&mut self) -> Result<()> {
        self.say("GitHub Analyzer")
    }

    pub fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{line}").into_diagnostic()
    }

    /// Print `question` and read one trimmed line. End of input reads as empty.
    pub fn ask(&mut self, question: &str) -> Result<String> {
        writeln!(self.output, "{question}").into_diagnostic()?;
        self.output.flush().into_diagnostic()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer).into_diagnostic()?;
        Ok(answer.trim().to_string())
    }

    /// Ask for owner and repository name.
    pub fn repository(&mut self) -> Result<RepoId> {
        let owner = self.ask("Insert owner:")?;
        let name = self.ask("Insert repository:")?;
        Ok(RepoId::new(&owner, &name)?)
    }

    /// Show the analysis menu and read the choice.
    pub fn menu(&mut self) -> Result<Analysis> {
        self.say("What do you want to analyze?")?;
        self.say("1. Pair of contributors that worked on the same file")?;
        let choice = self.ask("2. Contributions of contributors in the last week")?;
        match choice.as_str() {
            "1" => Ok(Analysis::Pairs),
            "2" => Ok(Analysis::Weekly),
            other => Err(miette::miette!(
                help = "enter 1 or 2",
                "Invalid choice: '{other}'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn transcript(p: Prompter<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(p.output).unwrap()
    }

    #[test]
    fn reads_owner_and_repository() {
        let mut p = prompter("octocat\n  hello-world  \n");
        let repo = p.repository().unwrap();
        assert_eq!(repo.to_string(), "octocat/hello-world");
        assert_eq!(transcript(p), "Insert owner:\nInsert repository:\n");
    }

    #[test]
    fn empty_owner_is_rejected() {
        let mut p = prompter("\nhello-world\n");
        assert!(p.repository().is_err());
    }

    #[test]
    fn menu_maps_choices() {
        assert_eq!(prompter("1\n").menu().unwrap(), Analysis::Pairs);
        assert_eq!(prompter("2\n").menu().unwrap(), Analysis::Weekly);
    }

    #[test]
    fn menu_lists_both_analyses() {
        let mut p = prompter("1\n");
        p.menu().unwrap();
        let out = transcript(p);
        assert!(out.starts_with("What do you want to analyze?\n"));
        assert!(out.contains("1. Pair of contributors that worked on the same file"));
        assert!(out.contains("2. Contributions of contributors in the last week"));
    }

    #[test]
    fn unknown_choice_is_an_error() {
        let err = prompter("3\n").menu().unwrap_err();
        assert!(err.to_string().starts_with("Invalid choice"));
        assert!(prompter("").menu().is_err());
    }

    #[test]
    fn banner_comes_first() {
        let mut p = prompter("");
        p.banner().unwrap();
        assert_eq!(transcript(p), "GitHub Analyzer\n");
    }
}
