//! Command grammar: classify an inbound message and plan what to do with it.
//!
//! The backend implements every command; the bot only recognises the names,
//! validates arguments and forwards a tagged instruction (`!web cats`).

use shapebot_core::config::HelpMode;

/// Prefix the backend expects on forwarded commands, independent of the
/// prefix users type.
const BACKEND_PREFIX: char = '!';

pub const WEB_USAGE: &str = "Please provide a search query. Example: `!web cats`";
pub const IMAGINE_USAGE: &str =
    "Please provide an image description. Example: `!imagine beautiful sunset`";

/// A recognised (or unrecognised) command. Arguments of `Web` and `Imagine`
/// are the words after the name joined by single spaces; empty when omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Reset,
    Sleep,
    Dashboard,
    Info,
    Wack,
    Web(String),
    Imagine(String),
    Unknown(String),
}

impl Command {
    /// Parse the text following the prefix, e.g. `"web  cute cats"`.
    pub fn parse(body: &str) -> Self {
        let mut words = body.trim().split(' ').filter(|w| !w.is_empty());
        let name = words.next().unwrap_or_default().to_lowercase();
        let args = words.collect::<Vec<_>>().join(" ");

        match name.as_str() {
            "help" => Self::Help,
            "reset" => Self::Reset,
            "sleep" => Self::Sleep,
            "dashboard" => Self::Dashboard,
            "info" => Self::Info,
            "wack" => Self::Wack,
            "web" => Self::Web(args),
            "imagine" => Self::Imagine(args),
            _ => Self::Unknown(name),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Help => "help",
            Self::Reset => "reset",
            Self::Sleep => "sleep",
            Self::Dashboard => "dashboard",
            Self::Info => "info",
            Self::Wack => "wack",
            Self::Web(_) => "web",
            Self::Imagine(_) => "imagine",
            Self::Unknown(name) => name,
        }
    }
}

/// What an inbound message turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Command(Command),
    /// Free-form chat, already stripped of bot mentions.
    Chat(String),
    /// Unaddressed group chatter, or nothing left to say.
    Ignore,
}

/// The single thing to do for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send this payload to the backend and relay its reply.
    Forward(String),
    /// Reply locally without calling the backend.
    Reply(String),
    /// Show the built-in command catalog.
    ShowHelp,
}

/// Classifies messages and maps them to at most one backend call.
#[derive(Debug, Clone)]
pub struct CommandRouter {
    prefix: String,
    help_mode: HelpMode,
}

impl CommandRouter {
    pub fn new(prefix: impl Into<String>, help_mode: HelpMode) -> Self {
        Self {
            prefix: prefix.into(),
            help_mode,
        }
    }

    pub fn from_config(config: &shapebot_core::config::DiscordConfig) -> Self {
        Self::new(config.prefix.clone(), config.help_mode)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Classify `content`. `addressed` is true for DMs and for guild messages
    /// that mention the bot; only addressed messages become chat.
    pub fn classify(&self, content: &str, addressed: bool) -> Inbound {
        let trimmed = content.trim();
        if let Some(body) = trimmed.strip_prefix(self.prefix.as_str()) {
            return Inbound::Command(Command::parse(body));
        }
        if !addressed || trimmed.is_empty() {
            return Inbound::Ignore;
        }
        Inbound::Chat(trimmed.to_string())
    }

    /// Dispatch table. Exhaustive over [`Command`].
    pub fn plan(&self, inbound: &Inbound) -> Option<Action> {
        let command = match inbound {
            Inbound::Ignore => return None,
            Inbound::Chat(text) => return Some(Action::Forward(text.clone())),
            Inbound::Command(command) => command,
        };

        let action = match command {
            Command::Help => match self.help_mode {
                HelpMode::Backend => forward_bare(command),
                HelpMode::Local => Action::ShowHelp,
            },
            Command::Reset
            | Command::Sleep
            | Command::Dashboard
            | Command::Info
            | Command::Wack => forward_bare(command),
            Command::Web(query) if query.is_empty() => Action::Reply(WEB_USAGE.to_string()),
            Command::Imagine(prompt) if prompt.is_empty() => {
                Action::Reply(IMAGINE_USAGE.to_string())
            }
            Command::Web(args) | Command::Imagine(args) => Action::Forward(format!(
                "{}{} {}",
                BACKEND_PREFIX,
                command.name(),
                args
            )),
            Command::Unknown(name) => Action::Reply(format!(
                "Unknown command: `{}`. Use `{}help` to see available commands.",
                name, self.prefix
            )),
        };
        Some(action)
    }
}

fn forward_bare(command: &Command) -> Action {
    Action::Forward(format!("{}{}", BACKEND_PREFIX, command.name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> CommandRouter {
        CommandRouter::new("!", HelpMode::Backend)
    }

    #[test]
    fn parse_lowercases_name_and_joins_args() {
        assert_eq!(
            Command::parse("WEB   cute   cats "),
            Command::Web("cute cats".into())
        );
        assert_eq!(Command::parse("Reset"), Command::Reset);
        assert_eq!(Command::parse("imagine"), Command::Imagine(String::new()));
        assert_eq!(Command::parse("dance now"), Command::Unknown("dance".into()));
        assert_eq!(Command::parse(""), Command::Unknown(String::new()));
    }

    #[test]
    fn prefixed_message_is_a_command_even_unaddressed() {
        assert_eq!(
            router().classify("!sleep", false),
            Inbound::Command(Command::Sleep)
        );
    }

    #[test]
    fn unaddressed_chat_is_ignored() {
        assert_eq!(router().classify("hello everyone", false), Inbound::Ignore);
    }

    #[test]
    fn addressed_chat_is_trimmed() {
        assert_eq!(
            router().classify("  how are you?  ", true),
            Inbound::Chat("how are you?".into())
        );
        assert_eq!(router().classify("   ", true), Inbound::Ignore);
    }

    #[test]
    fn bare_commands_forward_with_bang() {
        let r = router();
        for (text, payload) in [
            ("!reset", "!reset"),
            ("!sleep", "!sleep"),
            ("!dashboard", "!dashboard"),
            ("!info extra words", "!info"),
            ("!WACK", "!wack"),
            ("!help", "!help"),
        ] {
            let inbound = r.classify(text, false);
            assert_eq!(r.plan(&inbound), Some(Action::Forward(payload.into())));
        }
    }

    #[test]
    fn web_and_imagine_forward_arguments() {
        let r = router();
        assert_eq!(
            r.plan(&r.classify("!web rust  async", false)),
            Some(Action::Forward("!web rust async".into()))
        );
        assert_eq!(
            r.plan(&r.classify("!imagine a red fox", false)),
            Some(Action::Forward("!imagine a red fox".into()))
        );
    }

    #[test]
    fn missing_arguments_reply_with_usage() {
        let r = router();
        assert_eq!(
            r.plan(&r.classify("!web", false)),
            Some(Action::Reply(WEB_USAGE.into()))
        );
        assert_eq!(
            r.plan(&r.classify("!imagine   ", false)),
            Some(Action::Reply(IMAGINE_USAGE.into()))
        );
    }

    #[test]
    fn unknown_command_reply_uses_configured_prefix() {
        let r = CommandRouter::new("?", HelpMode::Backend);
        assert_eq!(
            r.plan(&r.classify("?dance", false)),
            Some(Action::Reply(
                "Unknown command: `dance`. Use `?help` to see available commands.".into()
            ))
        );
        // Forwarded payloads always use the backend's own prefix.
        assert_eq!(
            r.plan(&r.classify("?reset", false)),
            Some(Action::Forward("!reset".into()))
        );
    }

    #[test]
    fn local_help_mode_shows_catalog() {
        let r = CommandRouter::new("!", HelpMode::Local);
        assert_eq!(r.plan(&r.classify("!help", false)), Some(Action::ShowHelp));
    }

    #[test]
    fn ignore_plans_nothing() {
        assert_eq!(router().plan(&Inbound::Ignore), None);
    }
}
