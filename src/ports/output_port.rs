//! Output sink port for script narration.

/// Receives whole lines of narration text, in call order.
pub trait OutputSink {
    fn append_text(&mut self, text: &str);
}

impl OutputSink for String {
    fn append_text(&mut self, text: &str) {
        self.push_str(text);
    }
}

impl OutputSink for Vec<String> {
    fn append_text(&mut self, text: &str) {
        self.push(text.to_string());
    }
}

/// Adapts a host callback into a sink.
pub struct CallbackSink<F>(pub F);

impl<F: FnMut(&str)> OutputSink for CallbackSink<F> {
    fn append_text(&mut self, text: &str) {
        (self.0)(text)
    }
}
