use base64::{Engine as _, engine::general_purpose::STANDARD};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    SetHtml,
    LoadPage,
    RefreshPage,
}

impl Opcode {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "sethtml" => Some(Opcode::SetHtml),
            "loadpage" => Some(Opcode::LoadPage),
            "refreshpage" => Some(Opcode::RefreshPage),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Opcode::SetHtml => "sethtml",
            Opcode::LoadPage => "loadpage",
            Opcode::RefreshPage => "refreshpage",
        }
    }

    /// Number of base64 arguments following the opcode token.
    pub fn arity(self) -> usize {
        match self {
            Opcode::SetHtml => 2,
            Opcode::LoadPage => 1,
            Opcode::RefreshPage => 0,
        }
    }
}

/// A decoded UI command. Arguments are already base64-decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    SetHtml { selector: String, content: String },
    LoadPage { url: String },
    RefreshPage,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    UnknownOpcode(String),
    Arity {
        opcode: Opcode,
        expected: usize,
        found: usize,
    },
    Base64 {
        opcode: Opcode,
        position: usize,
    },
    Utf8 {
        opcode: Opcode,
        position: usize,
    },
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Empty => write!(f, "empty command"),
            CommandError::UnknownOpcode(token) => write!(f, "unknown opcode '{token}'"),
            CommandError::Arity {
                opcode,
                expected,
                found,
            } => write!(
                f,
                "{} expects {expected} argument(s), found {found}",
                opcode.as_str()
            ),
            CommandError::Base64 { opcode, position } => {
                write!(f, "{} argument {position} is not valid base64", opcode.as_str())
            }
            CommandError::Utf8 { opcode, position } => {
                write!(f, "{} argument {position} is not valid utf-8", opcode.as_str())
            }
        }
    }
}

impl std::error::Error for CommandError {}

impl Command {
    /// Decodes one raw command string such as `sethtml:<b64>:<b64>`.
    pub fn parse(raw: &str) -> Result<Self, CommandError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CommandError::Empty);
        }
        let mut parts = raw.split(':');
        let token = parts.next().unwrap_or_default();
        let opcode = Opcode::from_token(token)
            .ok_or_else(|| CommandError::UnknownOpcode(token.to_string()))?;
        let args: Vec<&str> = parts.collect();
        if args.len() != opcode.arity() {
            return Err(CommandError::Arity {
                opcode,
                expected: opcode.arity(),
                found: args.len(),
            });
        }

        match opcode {
            Opcode::SetHtml => Ok(Command::SetHtml {
                selector: decode_arg(opcode, 0, args[0])?,
                content: decode_arg(opcode, 1, args[1])?,
            }),
            Opcode::LoadPage => Ok(Command::LoadPage {
                url: decode_arg(opcode, 0, args[0])?,
            }),
            Opcode::RefreshPage => Ok(Command::RefreshPage),
        }
    }

    pub fn opcode(&self) -> Opcode {
        match self {
            Command::SetHtml { .. } => Opcode::SetHtml,
            Command::LoadPage { .. } => Opcode::LoadPage,
            Command::RefreshPage => Opcode::RefreshPage,
        }
    }

    /// Server-side encoding, used by fixtures and tooling.
    pub fn encode(&self) -> String {
        match self {
            Command::SetHtml { selector, content } => format!(
                "sethtml:{}:{}",
                STANDARD.encode(selector.as_bytes()),
                STANDARD.encode(content.as_bytes())
            ),
            Command::LoadPage { url } => format!("loadpage:{}", STANDARD.encode(url.as_bytes())),
            Command::RefreshPage => "refreshpage".to_string(),
        }
    }
}

fn decode_arg(opcode: Opcode, position: usize, value: &str) -> Result<String, CommandError> {
    let bytes = STANDARD
        .decode(value.as_bytes())
        .map_err(|_| CommandError::Base64 { opcode, position })?;
    String::from_utf8(bytes).map_err(|_| CommandError::Utf8 { opcode, position })
}
