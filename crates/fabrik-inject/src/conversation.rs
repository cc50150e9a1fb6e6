//! In-memory conversation scope
//!
//! One [`Conversation`] is registered per process and shared by every tested
//! object that asks for one.

use parking_lot::Mutex;

#[derive(Debug, Default)]
struct ConversationState {
	long_running: bool,
	counter: u64,
	id: Option<String>,
	timeout_millis: u64,
}

/// Conversation that is either transient (initial) or long-running.
///
/// # Examples
///
/// ```
/// use fabrik_inject::Conversation;
///
/// let conversation = Conversation::new();
/// assert!(conversation.is_transient());
///
/// conversation.begin_with_id("checkout");
/// assert_eq!(conversation.id().as_deref(), Some("checkout"));
///
/// conversation.end();
/// assert!(conversation.is_transient());
/// assert!(conversation.id().is_none());
/// ```
#[derive(Debug, Default)]
pub struct Conversation {
	state: Mutex<ConversationState>,
}

impl Conversation {
	pub fn new() -> Self {
		Self::default()
	}

	/// Makes the conversation long-running under the next generated id.
	pub fn begin(&self) {
		let mut state = self.state.lock();
		state.counter += 1;
		state.id = Some(state.counter.to_string());
		state.long_running = true;
	}

	/// Makes the conversation long-running under `id`.
	pub fn begin_with_id(&self, id: impl Into<String>) {
		let mut state = self.state.lock();
		state.counter += 1;
		state.id = Some(id.into());
		state.long_running = true;
	}

	/// Returns the conversation to the transient state.
	pub fn end(&self) {
		let mut state = self.state.lock();
		state.long_running = false;
		state.id = None;
	}

	pub fn id(&self) -> Option<String> {
		self.state.lock().id.clone()
	}

	pub fn timeout(&self) -> u64 {
		self.state.lock().timeout_millis
	}

	pub fn set_timeout(&self, milliseconds: u64) {
		self.state.lock().timeout_millis = milliseconds;
	}

	pub fn is_transient(&self) -> bool {
		!self.state.lock().long_running
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_fresh_conversation_is_transient_without_id() {
		// Act
		let conversation = Conversation::new();

		// Assert
		assert!(conversation.is_transient());
		assert!(conversation.id().is_none());
		assert_eq!(conversation.timeout(), 0);
	}

	#[rstest]
	fn test_begin_generates_incrementing_ids() {
		// Arrange
		let conversation = Conversation::new();

		// Act & Assert
		conversation.begin();
		assert!(!conversation.is_transient());
		assert_eq!(conversation.id().as_deref(), Some("1"));

		conversation.end();
		assert!(conversation.is_transient());
		assert!(conversation.id().is_none());

		conversation.begin();
		assert_eq!(conversation.id().as_deref(), Some("2"));
	}

	#[rstest]
	fn test_begin_while_active_replaces_id() {
		// Arrange
		let conversation = Conversation::new();
		conversation.begin();

		// Act
		conversation.begin_with_id("custom");

		// Assert
		assert!(!conversation.is_transient());
		assert_eq!(conversation.id().as_deref(), Some("custom"));
	}

	#[rstest]
	fn test_timeout_is_stored_verbatim() {
		// Arrange
		let conversation = Conversation::new();

		// Act
		conversation.set_timeout(1_500);

		// Assert
		assert_eq!(conversation.timeout(), 1_500);
		assert!(conversation.is_transient());
	}
}
