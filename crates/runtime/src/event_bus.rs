/// How prominently a notice should be shown.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A user-facing message, e.g. "Location access denied or unavailable".
///
/// Notices are what the UI surfaces (an alert, a toast); tracing output is
/// for operators and never replaces them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Emission order, 0-based.
    pub seq: u64,
    pub level: NoticeLevel,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct NoticeBus {
    next_seq: u64,
    notices: Vec<Notice>,
}

impl NoticeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, kind: &'static str, message: impl Into<String>) {
        self.emit(NoticeLevel::Info, kind, message);
    }

    pub fn error(&mut self, kind: &'static str, message: impl Into<String>) {
        self.emit(NoticeLevel::Error, kind, message);
    }

    pub fn emit(&mut self, level: NoticeLevel, kind: &'static str, message: impl Into<String>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.notices.push(Notice {
            seq,
            level,
            kind,
            message: message.into(),
        });
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
