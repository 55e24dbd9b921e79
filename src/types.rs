use std::fmt;

/// Kind of filesystem operation carried by a raw change notification.
///
/// Only [`ChangeKind::Write`] can ever become an accepted change event;
/// everything else is dropped by the change filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// File content was modified.
    Write,
    Create,
    Remove,
    Rename,
    /// Metadata-only changes, access notifications and anything unclassified.
    Other,
}

impl From<&notify::EventKind> for ChangeKind {
    fn from(kind: &notify::EventKind) -> Self {
        use notify::EventKind;
        use notify::event::ModifyKind;

        match kind {
            EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any) => {
                ChangeKind::Write
            }
            EventKind::Modify(ModifyKind::Name(_)) => ChangeKind::Rename,
            EventKind::Create(_) => ChangeKind::Create,
            EventKind::Remove(_) => ChangeKind::Remove,
            _ => ChangeKind::Other,
        }
    }
}

/// Pipeline stage a failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Watch,
    Build,
    Kill,
    /// Installing the interrupt handler.
    Signal,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Watch => "watch",
            Stage::Build => "build",
            Stage::Kill => "kill",
            Stage::Signal => "signal",
        };
        f.write_str(s)
    }
}
