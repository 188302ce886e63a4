//! Turn handling for one conversation.
//!
//! [`ChatClient`] owns the session state and the transcript. Typed input
//! goes through [`ChatClient::submit`], which talks to the turn endpoint.
//! Voice mode turns arrive as [`ChannelEvent`]s and are fed one at a time
//! to [`ChatClient::dispatch`].

use tracing::{debug, warn};

use crate::speech::Speaker;
use crate::transcript::{EntryId, Role, Transcript, TranscriptSink};
use crate::transport::{ChannelEvent, ClientSignal, TurnEndpoint, TurnRequest, VoiceStatus};
use crate::turn::{TurnId, TurnTracker};

pub const GREETING: &str = "Hello! I am your smart scheduling assistant. How can I help you?";
pub const APOLOGY: &str = "Sorry, I am having trouble connecting to my brain right now.";

/// Which transport drives turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceMode {
    /// Typed turns over the turn endpoint.
    #[default]
    Idle,
    /// Turns pushed by the backend over the event channel.
    Listening,
}

impl VoiceMode {
    pub const fn is_listening(self) -> bool {
        matches!(self, Self::Listening)
    }
}

/// Everything one conversation remembers between turns.
#[derive(Debug, Default)]
pub struct SessionState {
    session_id: Option<String>,
    voice: VoiceMode,
    in_flight: bool,
    turns: TurnTracker,
}

impl SessionState {
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub const fn voice_mode(&self) -> VoiceMode {
        self.voice
    }

    pub const fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub const fn turns(&self) -> &TurnTracker {
        &self.turns
    }
}

/// Result of submitting typed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Empty or whitespace-only input; nothing happened.
    Ignored,
    /// Another turn is in flight, or voice mode owns the conversation.
    Rejected,
    /// The backend answered; `entry` is the assistant message.
    Replied { entry: EntryId },
    /// The call failed; `entry` is the apology message.
    Failed { entry: EntryId },
}

/// What a channel event did to the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// A recognized utterance was rendered and a turn opened.
    TurnOpened(TurnId),
    /// Thoughts were queued, on a turn or for the next reply.
    ThoughtsQueued(Option<TurnId>),
    /// A reply was rendered as `entry`, closing `turn` if one was open.
    Replied { entry: EntryId, turn: Option<TurnId> },
    VoiceStatus(VoiceMode),
}

pub struct ChatClient<E, S> {
    endpoint: E,
    transcript: Transcript<S>,
    state: SessionState,
    speaker: Option<Box<dyn Speaker>>,
}

impl<E: TurnEndpoint, S: TranscriptSink> ChatClient<E, S> {
    pub fn new(endpoint: E, sink: S) -> Self {
        Self {
            endpoint,
            transcript: Transcript::new(sink),
            state: SessionState::default(),
            speaker: None,
        }
    }

    /// Continues an existing backend session instead of starting a new one.
    #[must_use]
    pub fn with_session(mut self, session_id: Option<String>) -> Self {
        self.state.session_id = session_id;
        self
    }

    /// Speaks every assistant message through `speaker`.
    #[must_use]
    pub fn with_speaker(mut self, speaker: Box<dyn Speaker>) -> Self {
        self.speaker = Some(speaker);
        self
    }

    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session_id(&self) -> Option<&str> {
        self.state.session_id()
    }

    pub const fn voice_mode(&self) -> VoiceMode {
        self.state.voice
    }

    pub const fn transcript(&self) -> &Transcript<S> {
        &self.transcript
    }

    /// Renders (and speaks) the opening assistant message.
    pub fn greet(&mut self) -> EntryId {
        self.say(GREETING)
    }

    /// Drives one typed turn over the turn endpoint.
    ///
    /// At most one turn is in flight; the session id is replaced by whatever
    /// the backend returns, and left alone on failure.
    pub async fn submit(&mut self, text: &str) -> TurnOutcome {
        if text.trim().is_empty() {
            return TurnOutcome::Ignored;
        }
        if self.state.in_flight || self.state.voice.is_listening() {
            debug!(
                in_flight = self.state.in_flight,
                voice = ?self.state.voice,
                "submission refused"
            );
            return TurnOutcome::Rejected;
        }

        self.state.in_flight = true;
        self.transcript.append_message(Role::User, text);
        let turn = self.open_turn();

        let request = TurnRequest {
            user_input: text.to_string(),
            session_id: self.state.session_id.clone(),
        };
        let result = self.endpoint.send_turn(&request).await;

        self.close_turn(turn);
        let outcome = match result {
            Ok(reply) => {
                self.state.session_id = Some(reply.session_id);
                let entry = self.say(&reply.final_response);
                if let Some(thoughts) = reply.thoughts {
                    self.transcript.attach_thoughts(entry, thoughts);
                }
                TurnOutcome::Replied { entry }
            }
            Err(e) => {
                warn!(error = %e, "turn failed");
                TurnOutcome::Failed {
                    entry: self.say(APOLOGY),
                }
            }
        };
        self.state.in_flight = false;
        outcome
    }

    /// Hands turn-taking to the event channel and returns the signal to send.
    ///
    /// The mode flips optimistically; `voice_status` events stay
    /// authoritative for the indicator.
    pub fn enter_voice(&mut self) -> ClientSignal {
        self.state.voice = VoiceMode::Listening;
        ClientSignal::StartVoice
    }

    /// Returns to typed turns and returns the signal to send.
    ///
    /// Voice turns still waiting for a reply are abandoned.
    pub fn leave_voice(&mut self) -> ClientSignal {
        self.reset_voice();
        ClientSignal::StopVoice
    }

    /// Leaves voice mode without telling the backend (the channel is gone).
    pub fn reset_voice(&mut self) {
        self.state.voice = VoiceMode::Idle;
        self.abandon_pending_turns();
    }

    /// Closes every open turn, removing its placeholder, and drops held
    /// thoughts. Returns how many turns were abandoned.
    pub fn abandon_pending_turns(&mut self) -> usize {
        let abandoned = self.state.turns.drain();
        for turn in &abandoned {
            debug!(id = %turn.id, "abandoning turn");
            self.transcript.remove(turn.placeholder);
        }
        abandoned.len()
    }

    /// Applies one event from the voice channel.
    pub fn dispatch(&mut self, event: ChannelEvent) -> Dispatched {
        match event {
            ChannelEvent::TranscriptReady { transcript } => {
                self.transcript.append_message(Role::User, &transcript);
                Dispatched::TurnOpened(self.open_turn())
            }
            ChannelEvent::ThoughtsReady { thoughts } => {
                Dispatched::ThoughtsQueued(self.state.turns.queue_thoughts(thoughts))
            }
            ChannelEvent::ResponseReady { response } => {
                let turn = self.state.turns.oldest();
                let thoughts = turn
                    .and_then(|id| self.close_turn(id))
                    .or_else(|| self.state.turns.take_unclaimed_thoughts());

                // The backend speaks voice replies itself.
                let entry = self.transcript.append_message(Role::Assistant, &response);
                if let Some(thoughts) = thoughts {
                    self.transcript.attach_thoughts(entry, thoughts);
                }
                Dispatched::Replied { entry, turn }
            }
            ChannelEvent::StatusChanged { status } => {
                self.state.voice = match status {
                    VoiceStatus::Started => VoiceMode::Listening,
                    VoiceStatus::Stopped => VoiceMode::Idle,
                };
                Dispatched::VoiceStatus(self.state.voice)
            }
        }
    }

    /// Toggles the most recent thoughts disclosure, or the `n`-th (1-based).
    pub fn toggle_thoughts(&mut self, n: Option<usize>) -> Option<bool> {
        let id = match n {
            Some(n) => self.transcript.nth_with_thoughts(n),
            None => self.transcript.latest_with_thoughts(),
        }?;
        self.transcript.toggle_thoughts(id)
    }

    fn open_turn(&mut self) -> TurnId {
        let placeholder = self.transcript.append_typing();
        self.state.turns.open(placeholder)
    }

    /// Removes the turn's placeholder and hands back any queued thoughts.
    fn close_turn(&mut self, id: TurnId) -> Option<Vec<String>> {
        let Some(turn) = self.state.turns.resolve(id) else {
            warn!(%id, "ignoring reply for unknown or resolved turn");
            return None;
        };
        self.transcript.remove(turn.placeholder);
        turn.thoughts
    }

    fn say(&mut self, text: &str) -> EntryId {
        let entry = self.transcript.append_message(Role::Assistant, text);
        if let Some(speaker) = self.speaker.as_mut() {
            speaker.speak(text);
        }
        entry
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::transcript::Entry;
    use crate::transport::TurnReply;
    use anyhow::Result;
    use std::sync::{Arc, Mutex};

    /// Scripted turn endpoint that records every request.
    #[derive(Default)]
    struct FakeEndpoint {
        replies: Mutex<Vec<Result<TurnReply>>>,
        requests: Mutex<Vec<TurnRequest>>,
    }

    impl FakeEndpoint {
        fn replying(replies: Vec<Result<TurnReply>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().rev().collect()),
                requests: Mutex::default(),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl TurnEndpoint for FakeEndpoint {
        async fn send_turn(&self, request: &TurnRequest) -> Result<TurnReply> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(anyhow::anyhow!("no scripted reply")))
        }
    }

    #[derive(Clone, Default)]
    struct SpokenLog(Arc<Mutex<Vec<String>>>);

    impl Speaker for SpokenLog {
        fn speak(&mut self, text: &str) {
            self.0.lock().unwrap().push(text.to_string());
        }
        fn cancel(&mut self) {}
    }

    fn reply(session: &str, text: &str, thoughts: Option<Vec<&str>>) -> Result<TurnReply> {
        Ok(TurnReply {
            session_id: session.to_string(),
            final_response: text.to_string(),
            thoughts: thoughts.map(|t| t.into_iter().map(String::from).collect()),
        })
    }

    fn rendered<E: TurnEndpoint>(client: &ChatClient<E, ()>) -> Vec<(Role, String)> {
        client
            .transcript()
            .entries()
            .iter()
            .filter_map(Entry::message)
            .map(|m| (m.role(), m.content().to_string()))
            .collect()
    }

    fn has_typing<E: TurnEndpoint>(client: &ChatClient<E, ()>) -> bool {
        client.transcript().entries().iter().any(Entry::is_typing)
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let mut client = ChatClient::new(FakeEndpoint::default(), ());

        assert_eq!(client.submit("").await, TurnOutcome::Ignored);
        assert_eq!(client.submit(" \t\n").await, TurnOutcome::Ignored);

        assert!(client.transcript().is_empty());
        assert_eq!(client.endpoint.request_count(), 0);
    }

    #[tokio::test]
    async fn test_successful_turn_renders_reply_with_thoughts() {
        let endpoint = FakeEndpoint::replying(vec![reply(
            "abc123",
            "Done, booked for 3pm.",
            Some(vec!["check calendar", "find free slot"]),
        )]);
        let mut client = ChatClient::new(endpoint, ());
        assert_eq!(client.session_id(), None);

        let outcome = client.submit("Book a meeting tomorrow at 3pm").await;

        let TurnOutcome::Replied { entry } = outcome else {
            panic!("expected a reply, got {outcome:?}");
        };
        assert_eq!(
            rendered(&client),
            vec![
                (Role::User, "Book a meeting tomorrow at 3pm".to_string()),
                (Role::Assistant, "Done, booked for 3pm.".to_string()),
            ]
        );
        assert!(!has_typing(&client));
        assert_eq!(client.session_id(), Some("abc123"));
        let thoughts = client.transcript().get(entry).and_then(Entry::thoughts).unwrap();
        assert_eq!(thoughts.steps(), ["check calendar", "find free slot"]);
        assert!(!client.state().is_in_flight());
    }

    #[tokio::test]
    async fn test_session_id_is_sent_and_replaced() {
        let endpoint = FakeEndpoint::replying(vec![
            reply("first", "one", None),
            reply("second", "two", Some(Vec::new())),
        ]);
        let mut client = ChatClient::new(endpoint, ());

        client.submit("a").await;
        client.submit("b").await;

        let requests = client.endpoint.requests.lock().unwrap().clone();
        assert_eq!(requests[0].session_id, None);
        assert_eq!(requests[1].session_id.as_deref(), Some("first"));
        assert_eq!(client.session_id(), Some("second"));
        assert_eq!(client.transcript().latest_with_thoughts(), None);
    }

    #[tokio::test]
    async fn test_failed_turn_renders_apology_and_keeps_session() {
        let endpoint = FakeEndpoint::replying(vec![
            reply("abc123", "ok", None),
            Err(anyhow::anyhow!("connection reset")),
        ]);
        let spoken = SpokenLog::default();
        let mut client = ChatClient::new(endpoint, ()).with_speaker(Box::new(spoken.clone()));

        client.submit("first").await;
        let outcome = client.submit("second").await;

        assert!(matches!(outcome, TurnOutcome::Failed { .. }));
        assert_eq!(rendered(&client).last().unwrap().1, APOLOGY);
        assert!(!has_typing(&client));
        assert_eq!(client.session_id(), Some("abc123"));
        assert!(!client.state().is_in_flight());
        assert_eq!(*spoken.0.lock().unwrap(), vec!["ok", APOLOGY]);
    }

    #[tokio::test]
    async fn test_submit_refused_while_listening() {
        let mut client = ChatClient::new(FakeEndpoint::default(), ());
        assert_eq!(client.enter_voice(), ClientSignal::StartVoice);

        assert_eq!(client.submit("hello").await, TurnOutcome::Rejected);
        assert!(client.transcript().is_empty());
        assert_eq!(client.endpoint.request_count(), 0);
    }

    #[tokio::test]
    async fn test_submit_refused_while_in_flight() {
        let mut client = ChatClient::new(FakeEndpoint::default(), ());
        client.state.in_flight = true;

        assert_eq!(client.submit("hello").await, TurnOutcome::Rejected);
        assert!(client.transcript().is_empty());
    }

    #[test]
    fn test_greeting_is_spoken() {
        let spoken = SpokenLog::default();
        let mut client =
            ChatClient::new(FakeEndpoint::default(), ()).with_speaker(Box::new(spoken.clone()));

        client.greet();

        assert_eq!(rendered(&client), vec![(Role::Assistant, GREETING.to_string())]);
        assert_eq!(*spoken.0.lock().unwrap(), vec![GREETING]);
    }

    #[test]
    fn test_enter_and_leave_voice() {
        let mut client = ChatClient::new(FakeEndpoint::default(), ());
        assert_eq!(client.enter_voice(), ClientSignal::StartVoice);
        assert!(client.voice_mode().is_listening());
        assert_eq!(client.leave_voice(), ClientSignal::StopVoice);
        assert_eq!(client.voice_mode(), VoiceMode::Idle);
    }

    #[test]
    fn test_enter_voice_after_backend_started_still_starts() {
        let mut client = ChatClient::new(FakeEndpoint::default(), ());
        client.dispatch(ChannelEvent::StatusChanged {
            status: VoiceStatus::Started,
        });

        assert_eq!(client.enter_voice(), ClientSignal::StartVoice);
        assert!(client.voice_mode().is_listening());
    }

    #[test]
    fn test_leaving_voice_abandons_open_turns() {
        let mut client = ChatClient::new(FakeEndpoint::default(), ());
        client.enter_voice();
        client.dispatch(ChannelEvent::TranscriptReady {
            transcript: "first".to_string(),
        });
        client.dispatch(ChannelEvent::ThoughtsReady {
            thoughts: vec!["stale".to_string()],
        });
        client.dispatch(ChannelEvent::ThoughtsReady {
            thoughts: vec!["held".to_string()],
        });

        client.leave_voice();

        assert!(client.state().turns().is_empty());
        assert_eq!(client.state().turns().unclaimed_len(), 0);
        assert!(!has_typing(&client));
        assert_eq!(rendered(&client), vec![(Role::User, "first".to_string())]);
    }

    #[test]
    fn test_next_voice_turn_is_not_confused_by_dropped_channel() {
        let mut client = ChatClient::new(FakeEndpoint::default(), ());
        client.enter_voice();
        client.dispatch(ChannelEvent::TranscriptReady {
            transcript: "first".to_string(),
        });
        client.reset_voice();
        assert!(!has_typing(&client));

        client.enter_voice();
        let Dispatched::TurnOpened(second) = client.dispatch(ChannelEvent::TranscriptReady {
            transcript: "second".to_string(),
        }) else {
            panic!("expected a turn");
        };
        client.dispatch(ChannelEvent::ThoughtsReady {
            thoughts: vec!["fresh".to_string()],
        });
        let Dispatched::Replied { entry, turn } = client.dispatch(ChannelEvent::ResponseReady {
            response: "Done.".to_string(),
        }) else {
            panic!("expected a reply");
        };

        assert_eq!(turn, Some(second));
        assert!(!has_typing(&client));
        assert!(client.state().turns().is_empty());
        let thoughts = client.transcript().get(entry).and_then(Entry::thoughts).unwrap();
        assert_eq!(thoughts.steps(), ["fresh"]);
    }

    #[test]
    fn test_voice_replies_are_not_spoken() {
        let spoken = SpokenLog::default();
        let mut client =
            ChatClient::new(FakeEndpoint::default(), ()).with_speaker(Box::new(spoken.clone()));

        client.dispatch(ChannelEvent::TranscriptReady {
            transcript: "schedule a call".to_string(),
        });
        client.dispatch(ChannelEvent::ResponseReady {
            response: "Call scheduled.".to_string(),
        });

        assert_eq!(rendered(&client).last().unwrap().1, "Call scheduled.");
        assert!(spoken.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_status_event_is_authoritative() {
        let mut client = ChatClient::new(FakeEndpoint::default(), ());
        client.enter_voice();

        let result = client.dispatch(ChannelEvent::StatusChanged {
            status: VoiceStatus::Stopped,
        });
        assert_eq!(result, Dispatched::VoiceStatus(VoiceMode::Idle));
        assert_eq!(client.voice_mode(), VoiceMode::Idle);

        client.dispatch(ChannelEvent::StatusChanged {
            status: VoiceStatus::Started,
        });
        assert!(client.voice_mode().is_listening());
    }

    #[test]
    fn test_voice_turn_replaces_placeholder_and_attaches_thoughts() {
        let mut client = ChatClient::new(FakeEndpoint::default(), ());

        let opened = client.dispatch(ChannelEvent::TranscriptReady {
            transcript: "schedule a call".to_string(),
        });
        let Dispatched::TurnOpened(turn) = opened else {
            panic!("expected a turn");
        };
        assert!(has_typing(&client));

        assert_eq!(
            client.dispatch(ChannelEvent::ThoughtsReady {
                thoughts: vec!["look up contacts".to_string()],
            }),
            Dispatched::ThoughtsQueued(Some(turn))
        );

        let replied = client.dispatch(ChannelEvent::ResponseReady {
            response: "Call scheduled.".to_string(),
        });
        let Dispatched::Replied { entry, turn: closed } = replied else {
            panic!("expected a reply");
        };
        assert_eq!(closed, Some(turn));
        assert!(!has_typing(&client));
        assert_eq!(
            rendered(&client),
            vec![
                (Role::User, "schedule a call".to_string()),
                (Role::Assistant, "Call scheduled.".to_string()),
            ]
        );
        assert!(client.transcript().get(entry).and_then(Entry::thoughts).is_some());
        assert!(client.state().turns().is_empty());
    }

    #[test]
    fn test_overlapping_voice_turns_keep_their_own_thoughts() {
        let mut client = ChatClient::new(FakeEndpoint::default(), ());

        client.dispatch(ChannelEvent::TranscriptReady {
            transcript: "first".to_string(),
        });
        client.dispatch(ChannelEvent::TranscriptReady {
            transcript: "second".to_string(),
        });
        client.dispatch(ChannelEvent::ThoughtsReady {
            thoughts: vec!["t1".to_string()],
        });
        client.dispatch(ChannelEvent::ThoughtsReady {
            thoughts: vec!["t2".to_string()],
        });

        let Dispatched::Replied { entry: r1, .. } = client.dispatch(ChannelEvent::ResponseReady {
            response: "one".to_string(),
        }) else {
            panic!("expected a reply");
        };
        let Dispatched::Replied { entry: r2, .. } = client.dispatch(ChannelEvent::ResponseReady {
            response: "two".to_string(),
        }) else {
            panic!("expected a reply");
        };

        let steps = |id| {
            client
                .transcript()
                .get(id)
                .and_then(Entry::thoughts)
                .map(|t| t.steps().to_vec())
        };
        assert_eq!(steps(r1), Some(vec!["t1".to_string()]));
        assert_eq!(steps(r2), Some(vec!["t2".to_string()]));
        assert!(!has_typing(&client));
    }

    #[test]
    fn test_unsolicited_response_uses_held_thoughts() {
        let mut client = ChatClient::new(FakeEndpoint::default(), ());

        assert_eq!(
            client.dispatch(ChannelEvent::ThoughtsReady {
                thoughts: vec!["early".to_string()],
            }),
            Dispatched::ThoughtsQueued(None)
        );
        let replied = client.dispatch(ChannelEvent::ResponseReady {
            response: "Hi there.".to_string(),
        });

        let Dispatched::Replied { entry, turn } = replied else {
            panic!("expected a reply");
        };
        assert_eq!(turn, None);
        assert!(client.transcript().get(entry).and_then(Entry::thoughts).is_some());
    }

    #[test]
    fn test_toggle_thoughts_latest_and_nth() {
        let mut client = ChatClient::new(FakeEndpoint::default(), ());
        assert_eq!(client.toggle_thoughts(None), None);

        client.dispatch(ChannelEvent::ThoughtsReady {
            thoughts: vec!["x".to_string()],
        });
        client.dispatch(ChannelEvent::ResponseReady {
            response: "a".to_string(),
        });

        assert_eq!(client.toggle_thoughts(None), Some(true));
        assert_eq!(client.toggle_thoughts(Some(1)), Some(false));
        assert_eq!(client.toggle_thoughts(Some(2)), None);
    }
}
