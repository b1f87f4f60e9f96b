// src/shell/command_parser.rs
use anyhow::{bail, Result};

const INPUT_OPERATOR: &str = "<";
const OUTPUT_OPERATOR: &str = ">";
const BACKGROUND_MARKER: &str = "&";

/// One parsed input line, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub program: String,
    /// argv for the new process; `args[0] == program`.
    pub args: Vec<String>,
    pub input_redirect: Option<String>,
    pub output_redirect: Option<String>,
    pub background: bool,
}

pub struct CommandParser;

impl CommandParser {
    /// Builds a directive from expanded tokens. `Ok(None)` means the line was
    /// empty. A trailing `&` is dropped either way but only requests
    /// background execution when `foreground_only` is off.
    pub fn parse(tokens: &[String], foreground_only: bool, max_args: usize) -> Result<Option<Directive>> {
        let (program, rest) = match tokens.split_first() {
            Some(split) => split,
            None => return Ok(None),
        };

        let (rest, background_requested) = match rest.split_last() {
            Some((last, init)) if last == BACKGROUND_MARKER => (init, true),
            _ => (rest, false),
        };

        let mut args = vec![program.clone()];
        let mut input_redirect = None;
        let mut output_redirect = None;

        let mut iter = rest.iter();
        while let Some(token) = iter.next() {
            match token.as_str() {
                INPUT_OPERATOR => {
                    input_redirect = Some(Self::redirect_target(token, iter.next())?);
                }
                OUTPUT_OPERATOR => {
                    output_redirect = Some(Self::redirect_target(token, iter.next())?);
                }
                _ => args.push(token.clone()),
            }
        }

        if args.len() > max_args {
            bail!("too many arguments (limit {})", max_args);
        }

        Ok(Some(Directive {
            program: program.clone(),
            args,
            input_redirect,
            output_redirect,
            background: background_requested && !foreground_only,
        }))
    }

    fn redirect_target(operator: &str, target: Option<&String>) -> Result<String> {
        match target {
            Some(path) => Ok(path.clone()),
            None => bail!("missing redirection target after '{}'", operator),
        }
    }
}
