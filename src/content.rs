//! Slide content passed to the display on every update.
//!
//! Content arrives as a bundle of role-tagged strings (main text, body,
//! reference, person) plus a kind that selects which layout profile
//! applies. The display never mutates content; it derives a compact
//! identity key from it to detect slide changes.

use serde::{Deserialize, Serialize};

/// Per-field prefix length used when deriving a content key.
const KEY_FIELD_CHARS: usize = 32;

/// The kind of slide being shown, selecting a layout profile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[default]
    Song,
    Scripture,
    Announcement,
}

impl ContentKind {
    /// Stable lowercase tag, also used as the content key prefix.
    #[inline]
    pub fn tag(&self) -> &'static str {
        match self {
            ContentKind::Song => "song",
            ContentKind::Scripture => "scripture",
            ContentKind::Announcement => "announcement",
        }
    }
}

/// One slide's worth of display text.
///
/// Only `main` is required; the other roles render when both their text
/// and a layout slot for them exist.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlideContent {
    pub kind: ContentKind,
    /// Primary text: lyric stanza, verse text or announcement body.
    pub main: String,
    /// Secondary body text, e.g. a translation line.
    pub content: Option<String>,
    /// Attribution such as "John 3:16" or a song title.
    pub reference: Option<String>,
    /// Speaker or author name.
    pub person: Option<String>,
}

impl SlideContent {
    /// A song slide carrying only stanza text.
    pub fn song(main: impl Into<String>) -> Self {
        SlideContent { kind: ContentKind::Song, main: main.into(), ..Default::default() }
    }

    /// A scripture slide with verse text and a reference line.
    pub fn scripture(main: impl Into<String>, reference: impl Into<String>) -> Self {
        SlideContent {
            kind: ContentKind::Scripture,
            main: main.into(),
            reference: Some(reference.into()),
            ..Default::default()
        }
    }

    /// An announcement slide.
    pub fn announcement(main: impl Into<String>) -> Self {
        SlideContent { kind: ContentKind::Announcement, main: main.into(), ..Default::default() }
    }

    /// Derive the slide's identity key.
    ///
    /// The key concatenates the kind tag with a short prefix of every
    /// populated text field. Two slides with equal keys are treated as
    /// the same slide by the transition synchronizer; a changed key
    /// triggers a slide transition. Truncation keeps key comparison
    /// cheap for slides carrying long bodies.
    pub fn content_key(&self) -> String {
        let mut key = String::from(self.tag());
        push_field(&mut key, &self.main);
        if let Some(content) = &self.content {
            push_field(&mut key, content);
        }
        if let Some(reference) = &self.reference {
            push_field(&mut key, reference);
        }
        if let Some(person) = &self.person {
            push_field(&mut key, person);
        }
        key
    }

    #[inline]
    fn tag(&self) -> &'static str {
        self.kind.tag()
    }
}

fn push_field(key: &mut String, field: &str) {
    key.push('|');
    key.extend(field.chars().take(KEY_FIELD_CHARS));
}

/// An operator-driven highlight over the main text, expressed as a
/// character-offset range into the plain (markup-free) text.
///
/// End offsets are exclusive. Ranges are validated at application time;
/// out-of-range or inverted ranges are skipped, never an error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveHighlight {
    pub start_offset: usize,
    pub end_offset: usize,
    /// CSS color for the highlight background.
    pub color: String,
}

impl LiveHighlight {
    pub fn new(start_offset: usize, end_offset: usize, color: impl Into<String>) -> Self {
        LiveHighlight { start_offset, end_offset, color: color.into() }
    }
}
