/// HUD element owned by the host that shows the remaining lives.
pub trait LivesDisplay {
    fn set_text(&mut self, text: &str);
    fn set_enabled(&mut self, enabled: bool);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayCall {
    Text(String),
    Enabled(bool),
}

/// Display that remembers what it was told; used by the harness and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    text: String,
    enabled: bool,
    calls: Vec<DisplayCall>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn calls(&self) -> &[DisplayCall] {
        &self.calls
    }

    pub fn drain_calls(&mut self) -> Vec<DisplayCall> {
        std::mem::take(&mut self.calls)
    }
}

impl LivesDisplay for RecordingDisplay {
    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.calls.push(DisplayCall::Text(text.to_string()));
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.calls.push(DisplayCall::Enabled(enabled));
    }
}
