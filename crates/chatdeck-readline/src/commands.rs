//! `:`-commands understood by the REPL.

use anyhow::{Result, anyhow, bail};
use chatdeck_core::artifact::MimeChoice;
use std::path::PathBuf;

/// Names offered by tab completion.
pub const COMMAND_NAMES: &[&str] = &[
    ":attach", ":paste", ":save", ":discard", ":files", ":rm", ":unlink", ":session",
    ":followup", ":context", ":say", ":cancel", ":help", ":quit",
];

pub const HELP: &str = "\
  <text>                 type and send a message
  /<prompt>              insert a configured prompt (Tab completes)
  :attach <path>...      attach files
  :paste <path>          paste a file's text as if from the clipboard
  :save <title> [mime]   save the pending large paste as an artifact
  :discard               drop the pending large paste
  :files                 list attached files and saved artifacts
  :rm <n>                remove attached file n
  :unlink <n>            remove saved artifact n
  :session [id]          switch to another session
  :followup <sel> [-- <question>]
                         ask about a selection (auto-sends with a question)
  :context [text]        set or clear the context sent with the message
  :say <text>            append transcribed speech to the draft
  :cancel                stop the response in progress
  :quit                  exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Attach(Vec<PathBuf>),
    Paste(PathBuf),
    Save { title: String, mime: MimeChoice },
    Discard,
    Files,
    Remove(usize),
    Unlink(usize),
    Session(Option<String>),
    FollowUp { selection: String, question: Option<String> },
    Context(Option<String>),
    Say(String),
    Cancel,
    Help,
    Quit,
}

impl Command {
    /// Parses a line starting with `:`.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let body = line
            .strip_prefix(':')
            .ok_or_else(|| anyhow!("commands start with ':'"))?;
        let (name, rest) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (body, ""),
        };

        let command = match name {
            "attach" | "a" => {
                let paths: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
                if paths.is_empty() {
                    bail!("usage: :attach <path>...");
                }
                Self::Attach(paths)
            }
            "paste" | "p" => Self::Paste(PathBuf::from(required(rest, ":paste <path>")?)),
            "save" => parse_save(rest)?,
            "discard" => Self::Discard,
            "files" | "ls" => Self::Files,
            "rm" => Self::Remove(parse_index(rest, ":rm <n>")?),
            "unlink" => Self::Unlink(parse_index(rest, ":unlink <n>")?),
            "session" => Self::Session(optional(rest)),
            "followup" | "f" => parse_follow_up(rest)?,
            "context" => Self::Context(optional(rest)),
            "say" => Self::Say(required(rest, ":say <text>")?.to_string()),
            "cancel" => Self::Cancel,
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => bail!("unknown command ':{}' (try :help)", other),
        };
        Ok(command)
    }
}

fn required<'a>(rest: &'a str, usage: &str) -> Result<&'a str> {
    if rest.is_empty() {
        bail!("usage: {}", usage);
    }
    Ok(rest)
}

fn optional(rest: &str) -> Option<String> {
    (!rest.is_empty()).then(|| rest.to_string())
}

/// One-based index as shown by `:files`.
fn parse_index(rest: &str, usage: &str) -> Result<usize> {
    let n: usize = required(rest, usage)?
        .parse()
        .map_err(|_| anyhow!("usage: {}", usage))?;
    if n == 0 {
        bail!("indexes start at 1");
    }
    Ok(n - 1)
}

/// `:save <title words> [mime]`; a trailing `auto` or `type/subtype` is the MIME type.
fn parse_save(rest: &str) -> Result<Command> {
    let mut words: Vec<&str> = rest.split_whitespace().collect();
    let mime = match words.last() {
        Some(last) if words.len() > 1 && (*last == "auto" || last.contains('/')) => {
            let mime = MimeChoice::parse(last);
            words.pop();
            mime
        }
        _ => MimeChoice::Auto,
    };
    Ok(Command::Save {
        title: words.join(" "),
        mime,
    })
}

fn parse_follow_up(rest: &str) -> Result<Command> {
    let (selection, question) = match rest.split_once(" -- ") {
        Some((selection, question)) => (selection.trim(), optional(question.trim())),
        None => (rest, None),
    };
    Ok(Command::FollowUp {
        selection: required(selection, ":followup <selection> [-- <question>]")?.to_string(),
        question,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attach_multiple_paths() {
        assert_eq!(
            Command::parse(":attach a.txt b.png").unwrap(),
            Command::Attach(vec![PathBuf::from("a.txt"), PathBuf::from("b.png")])
        );
        assert!(Command::parse(":attach").is_err());
    }

    #[test]
    fn test_parse_save_with_and_without_mime() {
        assert_eq!(
            Command::parse(":save build log text/plain").unwrap(),
            Command::Save {
                title: "build log".to_string(),
                mime: MimeChoice::Explicit("text/plain".to_string()),
            }
        );
        assert_eq!(
            Command::parse(":save notes").unwrap(),
            Command::Save {
                title: "notes".to_string(),
                mime: MimeChoice::Auto,
            }
        );
        // A blank title is allowed; the upload falls back to a default name
        assert_eq!(
            Command::parse(":save").unwrap(),
            Command::Save {
                title: String::new(),
                mime: MimeChoice::Auto,
            }
        );
    }

    #[test]
    fn test_parse_index_is_one_based() {
        assert_eq!(Command::parse(":rm 1").unwrap(), Command::Remove(0));
        assert_eq!(Command::parse(":unlink 3").unwrap(), Command::Unlink(2));
        assert!(Command::parse(":rm 0").is_err());
        assert!(Command::parse(":rm x").is_err());
    }

    #[test]
    fn test_parse_follow_up_question() {
        assert_eq!(
            Command::parse(":followup fn main() -- What does this do?").unwrap(),
            Command::FollowUp {
                selection: "fn main()".to_string(),
                question: Some("What does this do?".to_string()),
            }
        );
        assert_eq!(
            Command::parse(":f some text").unwrap(),
            Command::FollowUp {
                selection: "some text".to_string(),
                question: None,
            }
        );
    }

    #[test]
    fn test_parse_optional_arguments() {
        assert_eq!(Command::parse(":session").unwrap(), Command::Session(None));
        assert_eq!(
            Command::parse(":session  s2 ").unwrap(),
            Command::Session(Some("s2".to_string()))
        );
        assert_eq!(Command::parse(":context").unwrap(), Command::Context(None));
    }

    #[test]
    fn test_unknown_command() {
        let err = Command::parse(":frobnicate").unwrap_err();
        assert!(err.to_string().contains("unknown command"));
    }

    #[test]
    fn test_completion_names_parse() {
        for name in COMMAND_NAMES {
            let parsed = Command::parse(name);
            // Commands with required arguments reject the bare name with a usage hint
            if let Err(e) = parsed {
                assert!(e.to_string().starts_with("usage"), "{name}: {e}");
            }
        }
    }
}
