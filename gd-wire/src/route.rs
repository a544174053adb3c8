/// Prefix the server puts in front of a panel id to form its action id.
pub const ACTION_ID_PREFIX: &str = "b-";
/// Prefix of the element id wrapping a rendered panel.
pub const PANEL_CONTAINER_PREFIX: &str = "pc-";

/// Action suffixes understood by the server, besides `tts/<value>`.
pub const KNOWN_SUFFIXES: [&str; 8] = [
    "up",
    "down",
    "stop",
    "update",
    "movupdate",
    "switch",
    "toggle",
    "updateclock",
];

const SETPOINT_SUFFIX_PREFIX: &str = "tts/";

pub fn action_id(panel_id: &str) -> String {
    format!("{ACTION_ID_PREFIX}{panel_id}")
}

/// CSS selector of the container the server targets with `sethtml`.
pub fn panel_selector(panel_id: &str) -> String {
    format!("#{PANEL_CONTAINER_PREFIX}{panel_id}")
}

/// Single-flight slot of a request: one live request per (id, kind).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequestKind {
    Primary,
    Up,
    Down,
    Update,
}

impl RequestKind {
    pub const ALL: [RequestKind; 4] = [
        RequestKind::Primary,
        RequestKind::Up,
        RequestKind::Down,
        RequestKind::Update,
    ];

    pub fn from_suffix(suffix: Option<&str>) -> Self {
        match suffix {
            Some("up") => RequestKind::Up,
            Some("down") => RequestKind::Down,
            Some("update") | Some("movupdate") => RequestKind::Update,
            _ => RequestKind::Primary,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Primary => "primary",
            RequestKind::Up => "up",
            RequestKind::Down => "down",
            RequestKind::Update => "update",
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `GET /action/<target>[-<suffix>]` call, minus the session parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionRoute {
    pub target: String,
    pub suffix: Option<String>,
    pub extra_query: Option<String>,
}

impl ActionRoute {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            suffix: None,
            extra_query: None,
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        self.suffix = if suffix.is_empty() { None } else { Some(suffix) };
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.extra_query = if query.is_empty() { None } else { Some(query) };
        self
    }

    pub fn update(panel_id: &str) -> Self {
        Self::new(action_id(panel_id)).with_suffix("update")
    }

    pub fn moving_update(panel_id: &str) -> Self {
        Self::new(action_id(panel_id)).with_suffix("movupdate")
    }

    pub fn setpoint(panel_id: &str, label: &str) -> Self {
        Self::new(action_id(panel_id)).with_suffix(format!("{SETPOINT_SUFFIX_PREFIX}{label}"))
    }

    pub fn clock(panel_id: &str, hour: u8, minute: u8) -> Self {
        Self::new(action_id(panel_id))
            .with_suffix("updateclock")
            .with_query(format!("toclock=h{hour}m{minute}"))
    }

    /// Splits a button id such as `b-7-up` into target and suffix.
    ///
    /// Panel ids may contain dashes, so only suffixes the server knows are
    /// split off, and only when a non-empty panel id remains.
    pub fn parse(button_id: &str) -> Self {
        if let Some(index) = button_id.find(&format!("-{SETPOINT_SUFFIX_PREFIX}")) {
            let target = &button_id[..index];
            if is_action_target(target) {
                return Self::new(target).with_suffix(&button_id[index + 1..]);
            }
        }
        for suffix in KNOWN_SUFFIXES {
            if let Some(target) = button_id
                .strip_suffix(suffix)
                .and_then(|rest| rest.strip_suffix('-'))
                && is_action_target(target)
            {
                return Self::new(target).with_suffix(suffix);
            }
        }
        Self::new(button_id)
    }

    /// Panel id behind the target, when it follows the `b-<id>` convention.
    pub fn panel_id(&self) -> Option<&str> {
        self.target
            .strip_prefix(ACTION_ID_PREFIX)
            .filter(|id| !id.is_empty())
    }

    pub fn kind(&self) -> RequestKind {
        RequestKind::from_suffix(self.suffix.as_deref())
    }

    pub fn path(&self) -> String {
        match &self.suffix {
            Some(suffix) => format!("/action/{}-{suffix}", self.target),
            None => format!("/action/{}", self.target),
        }
    }

    pub fn path_and_query(&self, channel_id: &str) -> String {
        let mut out = format!("{}?otsseid={channel_id}", self.path());
        if let Some(query) = &self.extra_query {
            out.push('&');
            out.push_str(query);
        }
        out
    }
}

fn is_action_target(target: &str) -> bool {
    target
        .strip_prefix(ACTION_ID_PREFIX)
        .is_some_and(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_maps_to_request_kind() {
        assert_eq!(RequestKind::from_suffix(None), RequestKind::Primary);
        assert_eq!(RequestKind::from_suffix(Some("up")), RequestKind::Up);
        assert_eq!(RequestKind::from_suffix(Some("down")), RequestKind::Down);
        assert_eq!(RequestKind::from_suffix(Some("update")), RequestKind::Update);
        assert_eq!(
            RequestKind::from_suffix(Some("movupdate")),
            RequestKind::Update
        );
        assert_eq!(RequestKind::from_suffix(Some("stop")), RequestKind::Primary);
        assert_eq!(
            RequestKind::from_suffix(Some("tts/21.5")),
            RequestKind::Primary
        );
    }

    #[test]
    fn builds_paths_with_session_and_extra_query() {
        let plain = ActionRoute::new("b-4");
        assert_eq!(plain.path_and_query("abc"), "/action/b-4?otsseid=abc");

        let clock = ActionRoute::clock("12", 7, 5);
        assert_eq!(
            clock.path_and_query("abc"),
            "/action/b-12-updateclock?otsseid=abc&toclock=h7m5"
        );

        let setpoint = ActionRoute::setpoint("3", "21.5");
        assert_eq!(setpoint.path(), "/action/b-3-tts/21.5");
        assert_eq!(setpoint.kind(), RequestKind::Primary);
    }

    #[test]
    fn parses_button_ids() {
        assert_eq!(
            ActionRoute::parse("b-7-up"),
            ActionRoute::new("b-7").with_suffix("up")
        );
        assert_eq!(
            ActionRoute::parse("b-7-movupdate"),
            ActionRoute::new("b-7").with_suffix("movupdate")
        );
        assert_eq!(
            ActionRoute::parse("b-living-room-switch"),
            ActionRoute::new("b-living-room").with_suffix("switch")
        );
        assert_eq!(
            ActionRoute::parse("b-3-tts/22.0"),
            ActionRoute::new("b-3").with_suffix("tts/22.0")
        );
        assert_eq!(ActionRoute::parse("b-7"), ActionRoute::new("b-7"));
        assert_eq!(ActionRoute::parse("b-up"), ActionRoute::new("b-up"));
        assert_eq!(
            ActionRoute::parse("sdl-add-new"),
            ActionRoute::new("sdl-add-new")
        );
    }

    #[test]
    fn panel_id_strips_action_prefix() {
        assert_eq!(ActionRoute::update("9").panel_id(), Some("9"));
        assert_eq!(ActionRoute::new("b-").panel_id(), None);
        assert_eq!(ActionRoute::new("other").panel_id(), None);
        assert_eq!(panel_selector("9"), "#pc-9");
    }
}
