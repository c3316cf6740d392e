/// The kinds of element that produce audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// The media kind of an element with the given tag name, if any.
    ///
    /// Tag names are matched case-insensitively.
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag.eq_ignore_ascii_case("audio") {
            Some(Self::Audio)
        } else if tag.eq_ignore_ascii_case("video") {
            Some(Self::Video)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags() {
        assert_eq!(MediaKind::from_tag("VIDEO"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_tag("audio"), Some(MediaKind::Audio));
        assert_eq!(MediaKind::from_tag("div"), None);
        assert_eq!(MediaKind::from_tag("audiox"), None);
    }
}
