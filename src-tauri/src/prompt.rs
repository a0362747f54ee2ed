use parking_lot::Mutex;

/// Blocking user dialogs: `window.alert` and `window.confirm`.
pub trait UserPrompt: Send + Sync {
    fn alert(&self, message: &str);
    fn confirm(&self, message: &str) -> bool;
}

/// Prompt that records what was shown and answers confirmations with a
/// preset value. The desktop shell uses it to hand alerts back to the
/// webview and to carry the answer of a confirmation the webview already
/// asked.
#[derive(Debug, Default)]
pub struct QueuedPrompt {
    answer: Mutex<bool>,
    alerts: Mutex<Vec<String>>,
    confirms: Mutex<Vec<String>>,
}

impl QueuedPrompt {
    pub fn answering(answer: bool) -> Self {
        Self { answer: Mutex::new(answer), ..Self::default() }
    }

    pub fn set_answer(&self, answer: bool) {
        *self.answer.lock() = answer;
    }

    pub fn take_alerts(&self) -> Vec<String> {
        std::mem::take(&mut *self.alerts.lock())
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().clone()
    }

    pub fn confirms(&self) -> Vec<String> {
        self.confirms.lock().clone()
    }
}

impl UserPrompt for QueuedPrompt {
    fn alert(&self, message: &str) {
        self.alerts.lock().push(message.to_string());
    }

    fn confirm(&self, message: &str) -> bool {
        self.confirms.lock().push(message.to_string());
        *self.answer.lock()
    }
}
