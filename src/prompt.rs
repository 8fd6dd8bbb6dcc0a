use std::io::{self, BufRead, IsTerminal, Write};

use crate::form::Interaction;

/// Answers confirmation and reason questions for the command line. Flags take
/// precedence; otherwise the user is asked, but only when stdin is a terminal.
pub struct TerminalPrompt<R, W> {
    input: Option<R>,
    output: W,
    assume_yes: bool,
    reason: Option<String>,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stderr> {
    pub fn from_stdio(assume_yes: bool, reason: Option<String>) -> Self {
        let stdin = io::stdin();
        let input = stdin.is_terminal().then(|| stdin.lock());
        Self::new(input, io::stderr(), assume_yes, reason)
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: Option<R>, output: W, assume_yes: bool, reason: Option<String>) -> Self {
        Self {
            input,
            output,
            assume_yes,
            reason,
        }
    }

    fn ask(&mut self, question: &str) -> Option<String> {
        let input = self.input.as_mut()?;
        write!(self.output, "{question}").ok()?;
        self.output.flush().ok()?;
        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

impl<R: BufRead, W: Write> Interaction for TerminalPrompt<R, W> {
    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        self.ask(&format!("{prompt} [y/N] "))
            .is_some_and(|answer| matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    fn prompt_text(&mut self, prompt: &str) -> Option<String> {
        if let Some(reason) = self.reason.clone() {
            return Some(reason);
        }
        self.ask(&format!("{prompt}: "))
    }
}

#[cfg(test)]
mod tests {
    use super::TerminalPrompt;
    use crate::form::Interaction;
    use std::io::Cursor;

    fn prompt(input: Option<&str>) -> TerminalPrompt<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalPrompt::new(
            input.map(|text| Cursor::new(text.as_bytes().to_vec())),
            Vec::new(),
            false,
            None,
        )
    }

    #[test]
    fn confirm_reads_yes_and_defaults_to_no() {
        assert!(prompt(Some("y\n")).confirm("Delete?"));
        assert!(prompt(Some("YES\n")).confirm("Delete?"));
        assert!(!prompt(Some("\n")).confirm("Delete?"));
        assert!(!prompt(Some("")).confirm("Delete?"));
    }

    #[test]
    fn non_interactive_declines_unless_flags_answer() {
        let mut quiet = prompt(None);
        assert!(!quiet.confirm("Delete?"));
        assert_eq!(quiet.prompt_text("Reason"), None);
        assert!(quiet.output.is_empty());

        let mut flagged: TerminalPrompt<Cursor<Vec<u8>>, Vec<u8>> =
            TerminalPrompt::new(None, Vec::new(), true, Some("rain".to_string()));
        assert!(flagged.confirm("Delete?"));
        assert_eq!(flagged.prompt_text("Reason").as_deref(), Some("rain"));
    }

    #[test]
    fn prompt_text_writes_question_and_trims_answer() {
        let mut ui = prompt(Some("  bus broke down \n"));
        assert_eq!(
            ui.prompt_text("Reason for cancelling 'Trip'").as_deref(),
            Some("bus broke down")
        );
        let asked = String::from_utf8(ui.output).expect("utf8 output");
        assert_eq!(asked, "Reason for cancelling 'Trip': ");
    }
}
