//! Terminal prompting primitives
//!
//! Line input goes through the [`LineReader`] trait so the selection
//! logic can be driven by a scripted reader in tests and by stdin in the
//! real CLI. Selections are presented as 1-based numbered lists; an empty
//! answer accepts the default and anything unparseable re-prompts.

use std::io::{self, BufRead, Write};

use crate::errors::{ConfigError, Result};

/// One line of user input at a time
pub trait LineReader {
    fn read_line(&mut self) -> Result<String>;
}

/// Reads lines from stdin
pub struct ConsoleReader;

impl LineReader for ConsoleReader {
    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(crate::errors::AuthError::Prompt)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Replays a fixed sequence of answers, for tests
#[cfg(test)]
pub struct ScriptedReader {
    answers: std::vec::IntoIter<String>,
}

#[cfg(test)]
impl ScriptedReader {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .into_iter(),
        }
    }
}

#[cfg(test)]
impl LineReader for ScriptedReader {
    fn read_line(&mut self) -> Result<String> {
        self.answers
            .next()
            .ok_or_else(|| ConfigError::PromptUnavailable.into())
    }
}

/// Prompt for a 1-based index into a list of `count` options.
///
/// An empty answer accepts `default` (also 1-based); out-of-range or
/// non-numeric answers re-prompt indefinitely. Returns a 0-based index.
pub fn select_index(
    reader: &mut dyn LineReader,
    label: &str,
    count: usize,
    default: usize,
) -> Result<usize> {
    debug_assert!(default >= 1 && default <= count);
    loop {
        print!("{} [1-{}] [{}]: ", label, count, default);
        io::stdout().flush().map_err(crate::errors::AuthError::Prompt)?;

        let answer = reader.read_line()?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(default - 1);
        }
        match answer.parse::<usize>() {
            Ok(n) if n >= 1 && n <= count => return Ok(n - 1),
            _ => println!("Please enter a number between 1 and {}.", count),
        }
    }
}

/// The 1-based default position: the first option whose key matches,
/// else 1. Never 0, even for an empty list of keys.
pub fn default_index<T, F>(options: &[T], is_default: F) -> usize
where
    F: Fn(&T) -> bool,
{
    options
        .iter()
        .position(is_default)
        .map(|i| i + 1)
        .unwrap_or(1)
}

/// Render a numbered option list and prompt for a choice.
///
/// `render` produces the display line for one option (without the index
/// prefix). Returns a reference to the chosen option.
pub fn select_option<'a, T, F>(
    reader: &mut dyn LineReader,
    label: &str,
    options: &'a [T],
    default: usize,
    render: F,
) -> Result<&'a T>
where
    F: Fn(&T) -> String,
{
    for (i, option) in options.iter().enumerate() {
        println!("  [{}] {}", i + 1, render(option));
    }
    let index = select_index(reader, label, options.len(), default)?;
    Ok(&options[index])
}

/// The prompt line always carries the bracketed current value, even when
/// it is empty
fn text_prompt_line(label: &str, current: &str) -> String {
    format!("{} [{}]: ", label, current)
}

/// Prompt for free text with the current value shown in brackets.
///
/// An empty answer keeps `current`. When both are empty the result is an
/// error unless `allow_empty` is set.
pub fn prompt_text(
    reader: &mut dyn LineReader,
    label: &str,
    current: &str,
    allow_empty: bool,
) -> Result<String> {
    print!("{}", text_prompt_line(label, current));
    io::stdout().flush().map_err(crate::errors::AuthError::Prompt)?;

    let answer = reader.read_line()?;
    let answer = answer.trim();
    let value = if answer.is_empty() { current } else { answer };

    if value.is_empty() && !allow_empty {
        return Err(ConfigError::RequiredValue {
            label: label.to_string(),
        }
        .into());
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_answer_accepts_default() {
        let mut reader = ScriptedReader::new(&[""]);
        let index = select_index(&mut reader, "Choose", 5, 3).unwrap();
        assert_eq!(index, 2);
    }

    #[test]
    fn valid_answer_is_one_based() {
        let mut reader = ScriptedReader::new(&["1"]);
        assert_eq!(select_index(&mut reader, "Choose", 5, 1).unwrap(), 0);

        let mut reader = ScriptedReader::new(&["5"]);
        assert_eq!(select_index(&mut reader, "Choose", 5, 1).unwrap(), 4);
    }

    #[test]
    fn invalid_answers_reprompt_until_valid() {
        let mut reader = ScriptedReader::new(&["0", "6", "abc", "2"]);
        assert_eq!(select_index(&mut reader, "Choose", 5, 1).unwrap(), 1);
    }

    #[test]
    fn default_index_is_first_match_or_one() {
        let options = ["alpha", "beta", "gamma"];
        assert_eq!(default_index(&options, |o| *o == "beta"), 2);
        assert_eq!(default_index(&options, |o| *o == "missing"), 1);
        assert_eq!(default_index::<&str, _>(&[], |_| true), 1);
    }

    #[test]
    fn select_option_returns_reference() {
        let options = vec!["north".to_string(), "south".to_string()];
        let mut reader = ScriptedReader::new(&["2"]);
        let chosen =
            select_option(&mut reader, "Direction", &options, 1, |o| o.clone()).unwrap();
        assert_eq!(chosen, "south");
    }

    #[test]
    fn prompt_line_brackets_are_always_rendered() {
        assert_eq!(text_prompt_line("Email", "a@b.no"), "Email [a@b.no]: ");
        assert_eq!(text_prompt_line("Email", ""), "Email []: ");
    }

    #[test]
    fn prompt_text_keeps_current_on_empty() {
        let mut reader = ScriptedReader::new(&[""]);
        let value = prompt_text(&mut reader, "Email", "a@b.no", false).unwrap();
        assert_eq!(value, "a@b.no");
    }

    #[test]
    fn prompt_text_rejects_empty_required_value() {
        let mut reader = ScriptedReader::new(&[" "]);
        let result = prompt_text(&mut reader, "Client", "", false);
        assert!(result.is_err());
    }

    #[test]
    fn prompt_text_allows_empty_when_optional() {
        let mut reader = ScriptedReader::new(&[""]);
        let value = prompt_text(&mut reader, "Email", "", true).unwrap();
        assert_eq!(value, "");
    }
}
