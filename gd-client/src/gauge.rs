use std::f64::consts::PI;

pub const MIN_CELSIUS: f64 = 5.0;
pub const MAX_CELSIUS: f64 = 30.0;
pub const CELSIUS_PER_STEP: f64 = 0.5;
pub const MAX_FRAGVAL: i32 = 50;

const GAUGE_RADIUS: f64 = 40.0;
const FALLBACK_COLOR: &str = "white";

/// Lower bound of each colour band; a band ends where the next one starts.
const TEMPERATURE_COLORS: [(f64, &str); 7] = [
    (5.0, "#4040ff"),
    (16.0, "#a080ff"),
    (18.0, "#ffff00"),
    (20.0, "#00ff00"),
    (23.0, "#e6b207"),
    (25.0, "#ff0000"),
    (99.0, "#ff0000"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetpointStep {
    Up,
    Down,
}

impl SetpointStep {
    fn delta(self) -> i32 {
        match self {
            SetpointStep::Up => 1,
            SetpointStep::Down => -1,
        }
    }
}

/// Thermostat target as a half-degree index above [`MIN_CELSIUS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Setpoint {
    fragval: i32,
}

impl Setpoint {
    pub fn from_fragval(fragval: i32) -> Self {
        Self {
            fragval: fragval.clamp(0, MAX_FRAGVAL),
        }
    }

    pub fn from_celsius(celsius: f64) -> Self {
        if !celsius.is_finite() {
            return Self::from_fragval(0);
        }
        let celsius = celsius.clamp(MIN_CELSIUS, MAX_CELSIUS);
        Self::from_fragval(((celsius - MIN_CELSIUS) / CELSIUS_PER_STEP).floor() as i32)
    }

    pub fn fragval(self) -> i32 {
        self.fragval
    }

    pub fn celsius(self) -> f64 {
        MIN_CELSIUS + f64::from(self.fragval) * CELSIUS_PER_STEP
    }

    pub fn step(self, step: SetpointStep) -> Self {
        Self::from_fragval(self.fragval + step.delta())
    }

    /// One decimal, dot separated; this is also the value sent to the server.
    pub fn label(self) -> String {
        format!("{:.1}", self.celsius())
    }
}

/// Everything the UI needs to redraw a thermostat gauge.
#[derive(Clone, Debug, PartialEq)]
pub struct GaugeView {
    pub setpoint: Setpoint,
    pub label: String,
    pub color: &'static str,
    pub arc_path: String,
}

impl GaugeView {
    pub fn new(setpoint: Setpoint) -> Self {
        let celsius = setpoint.celsius();
        Self {
            setpoint,
            label: setpoint.label(),
            color: band_color(celsius),
            arc_path: arc_path(celsius),
        }
    }
}

pub fn band_color(celsius: f64) -> &'static str {
    TEMPERATURE_COLORS
        .windows(2)
        .find(|band| celsius >= band[0].0 && celsius < band[1].0)
        .map(|band| band[0].1)
        .unwrap_or(FALLBACK_COLOR)
}

/// SVG path of the half-circle arc filled up to `celsius`.
pub fn arc_path(celsius: f64) -> String {
    let celsius = celsius.clamp(MIN_CELSIUS, MAX_CELSIUS);
    let percentage = (celsius - MIN_CELSIUS) / (MAX_CELSIUS - MIN_CELSIUS);
    let angle = PI * (1.0 - percentage);
    let x = 10.0 + GAUGE_RADIUS + GAUGE_RADIUS * angle.cos();
    let y = 50.0 - GAUGE_RADIUS * angle.sin();
    format!("M 10 50 A 40 40 0 0 1 {x:.2} {y:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_half_degrees_and_clamped() {
        let top = Setpoint::from_celsius(30.0);
        assert_eq!(top.fragval(), MAX_FRAGVAL);
        assert_eq!(top.step(SetpointStep::Up).celsius(), 30.0);

        let bottom = Setpoint::from_celsius(5.0);
        assert_eq!(bottom.fragval(), 0);
        assert_eq!(bottom.step(SetpointStep::Down).celsius(), 5.0);

        let mid = Setpoint::from_celsius(21.0);
        assert_eq!(mid.step(SetpointStep::Up).label(), "21.5");
        assert_eq!(mid.step(SetpointStep::Down).label(), "20.5");
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        assert_eq!(Setpoint::from_celsius(42.0).celsius(), 30.0);
        assert_eq!(Setpoint::from_celsius(-3.0).celsius(), 5.0);
        assert_eq!(Setpoint::from_celsius(f64::NAN).celsius(), 5.0);
        assert_eq!(Setpoint::from_celsius(21.7).label(), "21.5");
        assert_eq!(Setpoint::from_fragval(99).fragval(), MAX_FRAGVAL);
    }

    #[test]
    fn colors_follow_temperature_bands() {
        assert_eq!(band_color(5.0), "#4040ff");
        assert_eq!(band_color(15.5), "#4040ff");
        assert_eq!(band_color(16.0), "#a080ff");
        assert_eq!(band_color(19.5), "#ffff00");
        assert_eq!(band_color(21.0), "#00ff00");
        assert_eq!(band_color(24.0), "#e6b207");
        assert_eq!(band_color(30.0), "#ff0000");
        assert_eq!(band_color(4.0), "white");
    }

    #[test]
    fn arc_spans_half_circle() {
        assert_eq!(arc_path(5.0), "M 10 50 A 40 40 0 0 1 10.00 50.00");
        assert_eq!(arc_path(17.5), "M 10 50 A 40 40 0 0 1 50.00 10.00");
        assert_eq!(arc_path(30.0), "M 10 50 A 40 40 0 0 1 90.00 50.00");
    }

    #[test]
    fn gauge_view_combines_label_color_and_arc() {
        let view = GaugeView::new(Setpoint::from_celsius(22.5));
        assert_eq!(view.label, "22.5");
        assert_eq!(view.color, "#00ff00");
        assert!(view.arc_path.starts_with("M 10 50 A 40 40 0 0 1 "));
    }
}
