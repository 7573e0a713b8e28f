//! Interactive calculator prompt.
//!
//! Typed expressions are evaluated and become the current value. Function
//! names (`sin`, `sqrt`, `!`, `pi`, ...) apply to the current value, and a
//! line starting with an operator continues from it (`* 2`).

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use calc_core::expression::{self, apply_function, UnaryFunction};
use calc_core::precision::format_number;
use calc_core::{HistoryEntryDraft, HistoryStore, KeyValueStore};

const HELP: &str = "\
Enter an expression (e.g. 2 + 3 * 4, (1 + 2) ** 3) to evaluate it.
  sin cos tan ln log sqrt sq cube ! pi e   apply to the current value
  + - * / ** ...                           continue from the current value
  %                                        divide the current value by 100
  save                                     record the last result in history
  history                                  show saved calculations
  clear                                    reset the current value to 0
  clear history                            delete all saved calculations
  quit                                     leave";

enum Step {
    Continue(String),
    Quit,
}

pub struct Repl<S: KeyValueStore> {
    history: HistoryStore<S>,
    current: f64,
    last: Option<HistoryEntryDraft>,
}

impl<S: KeyValueStore> Repl<S> {
    pub fn new(history: HistoryStore<S>) -> Self {
        Repl {
            history,
            current: 0.0,
            last: None,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        writeln!(output, "CalcuMaster - type 'help' for commands, 'quit' to exit")?;
        prompt(&mut output)?;
        for line in input.lines() {
            let line = line.context("failed to read input")?;
            match self.handle(&line) {
                Step::Quit => break,
                Step::Continue(text) if text.is_empty() => {}
                Step::Continue(text) => writeln!(output, "{}", text)?,
            }
            prompt(&mut output)?;
        }
        Ok(())
    }

    fn handle(&mut self, line: &str) -> Step {
        let line = line.trim();
        let text = match line {
            "" => String::new(),
            "quit" | "exit" | "q" => return Step::Quit,
            "help" | "?" => HELP.to_string(),
            "save" => self.save(),
            "history" => self.list_history(),
            "clear" | "c" | "ac" => {
                self.current = 0.0;
                self.last = None;
                "0".to_string()
            }
            "clear history" => match self.history.clear() {
                Ok(()) => "History cleared".to_string(),
                Err(e) => format!("Error: {}", e),
            },
            "%" => {
                let expression = format!("{}%", format_number(self.current));
                self.current = calc_core::precision::ARITHMETIC.apply(self.current / 100.0);
                self.last = Some(expression::history_entry(&expression, self.current));
                format_number(self.current)
            }
            _ => match line.parse::<UnaryFunction>() {
                Ok(func) => self.apply(func),
                Err(_) => self.evaluate(line),
            },
        };
        Step::Continue(text)
    }

    fn apply(&mut self, func: UnaryFunction) -> String {
        match apply_function(func, self.current) {
            Ok(result) => {
                self.current = result.value;
                let text = format!("{} = {}", result.label, format_number(result.value));
                self.last = Some(result.history_entry());
                text
            }
            Err(e) => format!("Error: {}", e),
        }
    }

    fn evaluate(&mut self, line: &str) -> String {
        let expression = if starts_with_operator(line) {
            // `**` binds tighter than a leading minus
            if self.current < 0.0 {
                format!("({}) {}", format_number(self.current), line)
            } else {
                format!("{} {}", format_number(self.current), line)
            }
        } else {
            line.to_string()
        };
        match expression::evaluate(&expression) {
            Ok(value) => {
                self.current = value;
                self.last = Some(expression::history_entry(&expression, value));
                format!("= {}", format_number(value))
            }
            Err(e) => format!("Error: {}", e),
        }
    }

    fn save(&mut self) -> String {
        match self.last.take() {
            Some(draft) => {
                let summary = format!("Saved: {} = {}", draft.expression, draft.result);
                match self.history.append(draft) {
                    Ok(_) => summary,
                    Err(e) => format!("{} (not persisted: {})", summary, e),
                }
            }
            None => "Nothing to save".to_string(),
        }
    }

    fn list_history(&self) -> String {
        if self.history.is_empty() {
            return "No history yet".to_string();
        }
        self.history
            .list()
            .iter()
            .map(|entry| format!("{}  {} = {}", entry.timestamp.format("%Y-%m-%d %H:%M"), entry.expression, entry.result))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// `-` is left out: a leading minus starts a new negative number.
fn starts_with_operator(line: &str) -> bool {
    line.starts_with(['+', '*', '/', '×', '÷'])
}

fn prompt<W: Write>(output: &mut W) -> Result<()> {
    write!(output, "> ")?;
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_core::MemoryStore;

    fn repl() -> Repl<MemoryStore> {
        Repl::new(HistoryStore::open(MemoryStore::new(), 50))
    }

    fn run_lines(repl: &mut Repl<MemoryStore>, lines: &str) -> String {
        let mut out = Vec::new();
        repl.run(lines.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_evaluate_and_chain() {
        let mut repl = repl();
        let out = run_lines(&mut repl, "2 + 3\n* 4\n");
        assert!(out.contains("= 5"));
        assert!(out.contains("= 20"));
        assert_eq!(repl.current(), 20.0);
    }

    #[test]
    fn test_chain_from_negative_value() {
        let mut repl = repl();
        let out = run_lines(&mut repl, "-5\n** 2\n");
        assert!(out.contains("= 25"));
        assert_eq!(repl.current(), 25.0);

        run_lines(&mut repl, "-3\n* 2\n");
        assert_eq!(repl.current(), -6.0);
    }

    #[test]
    fn test_function_applies_to_current() {
        let mut repl = repl();
        run_lines(&mut repl, "5\n!\n");
        assert_eq!(repl.current(), 120.0);

        let out = run_lines(&mut repl, "-4\nsqrt\n");
        assert!(out.contains("Error"));
        assert_eq!(repl.current(), -4.0);
    }

    #[test]
    fn test_save_and_history() {
        let mut repl = repl();
        let out = run_lines(&mut repl, "save\n10 / 4\nsave\nhistory\n");
        assert!(out.contains("Nothing to save"));
        assert!(out.contains("Saved: 10 / 4 = 2.5"));
        assert!(out.contains("10 / 4 = 2.5"));
        assert_eq!(repl.history.len(), 1);

        run_lines(&mut repl, "clear history\n");
        assert!(repl.history.is_empty());
    }

    #[test]
    fn test_clear_and_percent() {
        let mut repl = repl();
        run_lines(&mut repl, "50\n%\n");
        assert_eq!(repl.current(), 0.5);
        run_lines(&mut repl, "clear\n");
        assert_eq!(repl.current(), 0.0);
    }

    #[test]
    fn test_errors_keep_session_alive() {
        let mut repl = repl();
        let out = run_lines(&mut repl, "1 / 0\n2 * 3\nquit\n4 + 4\n");
        assert!(out.contains("Error"));
        assert!(out.contains("= 6"));
        assert!(!out.contains("= 8"));
    }
}
