use wire::ActionRoute;

use crate::gauge::SetpointStep;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShadingDirection {
    Up,
    Down,
}

impl ShadingDirection {
    pub fn suffix(self) -> &'static str {
        match self {
            ShadingDirection::Up => "up",
            ShadingDirection::Down => "down",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpinDirection {
    Forward,
    Backward,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockField {
    Hour,
    Minute,
}

impl ClockField {
    fn modulus(self) -> u8 {
        match self {
            ClockField::Hour => 24,
            ClockField::Minute => 60,
        }
    }
}

/// Time of day edited with spin buttons; both fields wrap around.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClockValue {
    hour: u8,
    minute: u8,
}

impl ClockValue {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    /// Parses `HH:MM`.
    pub fn parse(value: &str) -> Option<Self> {
        let (hour, minute) = value.trim().split_once(':')?;
        Self::new(hour.parse().ok()?, minute.parse().ok()?)
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    pub fn spin(self, field: ClockField, direction: SpinDirection) -> Self {
        let modulus = field.modulus();
        let current = match field {
            ClockField::Hour => self.hour,
            ClockField::Minute => self.minute,
        };
        let next = match direction {
            SpinDirection::Forward => (current + 1) % modulus,
            SpinDirection::Backward => (current + modulus - 1) % modulus,
        };
        match field {
            ClockField::Hour => Self { hour: next, ..self },
            ClockField::Minute => Self {
                minute: next,
                ..self
            },
        }
    }
}

impl std::fmt::Display for ClockValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// A user gesture on a panel control.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Control {
    Action(ActionRoute),
    /// `group` is the action id shared by a shade's buttons, e.g. `b-12`.
    ShadingMove {
        group: String,
        direction: ShadingDirection,
    },
    ShadingStop {
        group: String,
    },
    ThermostatStep {
        panel_id: String,
        step: SetpointStep,
    },
    Clock {
        panel_id: String,
        value: ClockValue,
    },
}

impl Control {
    /// A plain button press, routed by its element id.
    pub fn press(button_id: &str) -> Self {
        Control::Action(ActionRoute::parse(button_id))
    }
}
