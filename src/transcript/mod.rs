//! Conversation transcript: ordered entries, typing placeholders and
//! thought disclosures.
//!
//! The transcript is the only record of the conversation. Every mutation
//! is forwarded to a [`TranscriptSink`], which is how the terminal (or a
//! test) observes what would be drawn on screen.

mod message;
mod thoughts;

pub use message::{Message, Role, TYPING_SENTINEL};
pub use thoughts::{HIDE_THOUGHTS_LABEL, SHOW_THOUGHTS_LABEL, Thoughts};

use std::fmt;

/// Handle to a transcript entry, returned when the entry is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a transcript slot shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryBody {
    Message(Message),
    /// Placeholder for an assistant reply that has not arrived yet.
    Typing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    id: EntryId,
    body: EntryBody,
    thoughts: Option<Thoughts>,
}

impl Entry {
    pub const fn id(&self) -> EntryId {
        self.id
    }

    pub const fn body(&self) -> &EntryBody {
        &self.body
    }

    pub const fn message(&self) -> Option<&Message> {
        match &self.body {
            EntryBody::Message(message) => Some(message),
            EntryBody::Typing => None,
        }
    }

    pub const fn is_typing(&self) -> bool {
        matches!(self.body, EntryBody::Typing)
    }

    pub const fn thoughts(&self) -> Option<&Thoughts> {
        self.thoughts.as_ref()
    }
}

/// Receives transcript changes as they happen.
pub trait TranscriptSink {
    fn appended(&mut self, entry: &Entry);
    fn removed(&mut self, entry: &Entry);
    fn thoughts_attached(&mut self, entry: &Entry);
    fn thoughts_toggled(&mut self, entry: &Entry);
}

/// A sink that draws nothing (one-shot commands, headless use).
impl TranscriptSink for () {
    fn appended(&mut self, _entry: &Entry) {}
    fn removed(&mut self, _entry: &Entry) {}
    fn thoughts_attached(&mut self, _entry: &Entry) {}
    fn thoughts_toggled(&mut self, _entry: &Entry) {}
}

pub struct Transcript<S> {
    entries: Vec<Entry>,
    next_id: u64,
    sink: S,
}

impl<S: TranscriptSink> Transcript<S> {
    pub const fn new(sink: S) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            sink,
        }
    }

    /// Appends a message at the end of the transcript.
    ///
    /// An assistant message whose content is [`TYPING_SENTINEL`] becomes a
    /// typing placeholder. Every call creates a new entry.
    pub fn append_message(&mut self, role: Role, content: &str) -> EntryId {
        let body = if role == Role::Assistant && content == TYPING_SENTINEL {
            EntryBody::Typing
        } else {
            EntryBody::Message(Message::new(role, content))
        };
        self.push(body)
    }

    pub fn append_typing(&mut self) -> EntryId {
        self.push(EntryBody::Typing)
    }

    fn push(&mut self, body: EntryBody) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            body,
            thoughts: None,
        });
        if let Some(entry) = self.entries.last() {
            self.sink.appended(entry);
        }
        id
    }

    /// Removes a live entry. Returns `false` if the id is unknown or already removed.
    pub fn remove(&mut self, id: EntryId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let entry = self.entries.remove(index);
        self.sink.removed(&entry);
        true
    }

    /// Adds a thoughts disclosure to a live message entry.
    ///
    /// No-op (returns `false`) for empty thoughts, placeholders, unknown ids,
    /// and entries that already carry a disclosure.
    pub fn attach_thoughts(&mut self, id: EntryId, steps: Vec<String>) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let entry = &mut self.entries[index];
        if entry.is_typing() || entry.thoughts.is_some() {
            return false;
        }
        let Some(thoughts) = Thoughts::new(steps) else {
            return false;
        };
        entry.thoughts = Some(thoughts);
        self.sink.thoughts_attached(entry);
        true
    }

    /// Flips a disclosure and returns the new expanded state.
    pub fn toggle_thoughts(&mut self, id: EntryId) -> Option<bool> {
        let index = self.position(id)?;
        let entry = &mut self.entries[index];
        let expanded = entry.thoughts.as_mut()?.toggle();
        self.sink.thoughts_toggled(entry);
        Some(expanded)
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.position(id).map(|index| &self.entries[index])
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest_with_thoughts(&self) -> Option<EntryId> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.thoughts.is_some())
            .map(Entry::id)
    }

    /// The `n`-th entry (1-based, oldest first) carrying a disclosure.
    pub fn nth_with_thoughts(&self, n: usize) -> Option<EntryId> {
        self.entries
            .iter()
            .filter(|e| e.thoughts.is_some())
            .nth(n.checked_sub(1)?)
            .map(Entry::id)
    }

    pub const fn sink(&self) -> &S {
        &self.sink
    }

    fn position(&self, id: EntryId) -> Option<usize> {
        // Ids are handed out in increasing order and entries keep that order.
        self.entries.binary_search_by_key(&id, Entry::id).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl TranscriptSink for Recorder {
        fn appended(&mut self, entry: &Entry) {
            let what = entry
                .message()
                .map_or_else(|| "typing".to_string(), |m| m.content().to_string());
            self.events.push(format!("append {} {what}", entry.id()));
        }
        fn removed(&mut self, entry: &Entry) {
            self.events.push(format!("remove {}", entry.id()));
        }
        fn thoughts_attached(&mut self, entry: &Entry) {
            self.events.push(format!("thoughts {}", entry.id()));
        }
        fn thoughts_toggled(&mut self, entry: &Entry) {
            let label = entry.thoughts().map_or("", Thoughts::label);
            self.events.push(format!("toggle {} {label}", entry.id()));
        }
    }

    fn transcript() -> Transcript<Recorder> {
        Transcript::new(Recorder::default())
    }

    fn contents<S: TranscriptSink>(t: &Transcript<S>) -> Vec<String> {
        t.entries()
            .iter()
            .map(|e| {
                e.message()
                    .map_or_else(|| TYPING_SENTINEL.to_string(), |m| m.content().to_string())
            })
            .collect()
    }

    #[test]
    fn test_entries_preserve_call_order() {
        let mut t = transcript();
        t.append_message(Role::User, "one");
        t.append_message(Role::Assistant, "two");
        t.append_message(Role::User, "one");

        assert_eq!(contents(&t), vec!["one", "two", "one"]);
        assert_eq!(t.sink().events.len(), 3);
    }

    #[test]
    fn test_sentinel_content_becomes_placeholder() {
        let mut t = transcript();
        let id = t.append_message(Role::Assistant, TYPING_SENTINEL);
        assert!(t.get(id).is_some_and(Entry::is_typing));

        let user = t.append_message(Role::User, TYPING_SENTINEL);
        assert!(t.get(user).is_some_and(|e| !e.is_typing()));
    }

    #[test]
    fn test_remove_placeholder_once() {
        let mut t = transcript();
        let typing = t.append_typing();
        assert!(t.remove(typing));
        assert!(!t.remove(typing));
        assert!(t.is_empty());
        assert_eq!(t.sink().events, vec!["append #1 typing", "remove #1"]);
    }

    #[test]
    fn test_attach_empty_thoughts_is_noop() {
        let mut t = transcript();
        let id = t.append_message(Role::Assistant, "Done.");
        assert!(!t.attach_thoughts(id, Vec::new()));
        assert!(t.get(id).and_then(Entry::thoughts).is_none());
        assert_eq!(t.latest_with_thoughts(), None);
    }

    #[test]
    fn test_attach_to_removed_entry_is_noop() {
        let mut t = transcript();
        let id = t.append_message(Role::Assistant, "Done.");
        t.remove(id);
        assert!(!t.attach_thoughts(id, vec!["step".to_string()]));
    }

    #[test]
    fn test_attach_to_placeholder_is_noop() {
        let mut t = transcript();
        let id = t.append_typing();
        assert!(!t.attach_thoughts(id, vec!["step".to_string()]));
    }

    #[test]
    fn test_single_disclosure_toggles() {
        let mut t = transcript();
        let id = t.append_message(Role::Assistant, "Done.");
        assert!(t.attach_thoughts(id, vec!["check calendar".to_string()]));
        assert!(!t.attach_thoughts(id, vec!["again".to_string()]));

        assert_eq!(t.toggle_thoughts(id), Some(true));
        assert_eq!(t.toggle_thoughts(id), Some(false));
        assert_eq!(
            t.sink().events[2..],
            [
                format!("toggle #1 {HIDE_THOUGHTS_LABEL}"),
                format!("toggle #1 {SHOW_THOUGHTS_LABEL}"),
            ]
        );
    }

    #[test]
    fn test_toggle_without_thoughts_is_none() {
        let mut t = transcript();
        let id = t.append_message(Role::User, "hi");
        assert_eq!(t.toggle_thoughts(id), None);
    }

    #[test]
    fn test_nth_with_thoughts_is_one_based() {
        let mut t = transcript();
        let first = t.append_message(Role::Assistant, "a");
        t.append_message(Role::User, "b");
        let second = t.append_message(Role::Assistant, "c");
        t.attach_thoughts(first, vec!["x".to_string()]);
        t.attach_thoughts(second, vec!["y".to_string()]);

        assert_eq!(t.nth_with_thoughts(0), None);
        assert_eq!(t.nth_with_thoughts(1), Some(first));
        assert_eq!(t.nth_with_thoughts(2), Some(second));
        assert_eq!(t.nth_with_thoughts(3), None);
        assert_eq!(t.latest_with_thoughts(), Some(second));
    }
}
