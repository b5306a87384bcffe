/// Key of an attribute buffer passed to [`Command::locate`](super::Command::locate).
///
/// Names are resolved against the linked program. Locations pass through
/// unchanged, for generic slots set up independently of name lookup.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum AttributeKey {
    Name(String),
    Location(u32),
}

impl From<&str> for AttributeKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for AttributeKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<u32> for AttributeKey {
    fn from(location: u32) -> Self {
        Self::Location(location)
    }
}
