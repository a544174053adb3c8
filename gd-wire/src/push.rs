pub const DEFAULT_TOPICS: [&str; 3] = ["thermostat", "sensors", "panelupd"];

const REFRESH_IDS_OPEN: &str = "refreshId(";
const REFRESH_IDS_CLOSE: &str = ")";

/// One `data` payload received on the push channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PushMessage {
    Hello,
    SensorDataChanged,
    ThermostatDataChanged,
    RefreshIds(Vec<String>),
    Other(String),
}

impl PushMessage {
    pub fn parse(payload: &str) -> Self {
        let payload = payload.trim();
        match payload {
            "Hello" => return PushMessage::Hello,
            "SensorDataChanged" => return PushMessage::SensorDataChanged,
            "ThermostatDataChanged" => return PushMessage::ThermostatDataChanged,
            _ => {}
        }
        if let Some(list) = payload
            .strip_prefix(REFRESH_IDS_OPEN)
            .and_then(|rest| rest.strip_suffix(REFRESH_IDS_CLOSE))
            && !list.is_empty()
        {
            let ids = list
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect();
            return PushMessage::RefreshIds(ids);
        }
        PushMessage::Other(payload.to_string())
    }
}

/// Push subscription of one client session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subscription {
    pub channel_id: String,
    topics: Vec<String>,
}

impl Subscription {
    pub fn new<I, S>(channel_id: impl Into<String>, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for topic in topics {
            let topic = topic.into();
            let topic = topic.trim();
            if !topic.is_empty() && !unique.iter().any(|known| known == topic) {
                unique.push(topic.to_string());
            }
        }
        Self {
            channel_id: channel_id.into(),
            topics: unique,
        }
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Value of the `subscribe` query parameter.
    pub fn subscribe_param(&self) -> String {
        self.topics.join("-")
    }
}
