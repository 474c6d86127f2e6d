//! Provenance of command invocations.
//!
//! # Role
//!
//! Every dispatch runs inside a [`CauseFrame`] pushed on the current thread's
//! [`CauseStack`]. Frames record who triggered the command and context entries
//! (the command string, the subject it runs as, the audience failures go to).
//! [`CauseStack::current_cause`] folds the frames into the [`CommandCause`]
//! that parsing and execution carry as their source.
//!
//! # Invariants
//!
//! - A frame is popped exactly once, when its guard drops, on every exit path
//!   including unwinding.
//! - Dropping a guard truncates the thread's stack to the depth it was pushed
//!   at, so frames leaked by nested scopes cannot outlive their parent.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use herald_invocation::CommandSource;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Receiver of user-visible command output.
pub trait Audience: Send + Sync {
	fn send_message(&self, message: &str);
}

/// Shared audience handle.
pub type AudienceRef = Arc<dyn Audience>;

#[derive(Default)]
struct FrameData {
	causes: Vec<Arc<str>>,
	command: Option<Arc<str>>,
	subject: Option<Arc<str>>,
	audience: Option<AudienceRef>,
}

/// Per-thread stacks of cause frames.
#[derive(Default)]
pub struct CauseStack {
	frames: Mutex<FxHashMap<ThreadId, Vec<FrameData>>>,
}

impl CauseStack {
	pub fn new() -> Self {
		Self::default()
	}

	/// Pushes a frame for the current thread, popped when the guard drops.
	pub fn push_frame(&self) -> CauseFrame<'_> {
		let thread = thread::current().id();
		let mut frames = self.frames.lock();
		let stack = frames.entry(thread).or_default();
		let depth = stack.len();
		stack.push(FrameData::default());
		CauseFrame {
			stack: self,
			thread,
			depth,
			_not_send: PhantomData,
		}
	}

	/// Number of frames currently pushed on this thread.
	pub fn depth(&self) -> usize {
		let thread = thread::current().id();
		self.frames.lock().get(&thread).map_or(0, Vec::len)
	}

	/// Folds this thread's frames into a cause.
	///
	/// Causes are ordered innermost first; for each context entry the
	/// innermost frame that set it wins.
	pub fn current_cause(&self) -> CommandCause {
		let thread = thread::current().id();
		let frames = self.frames.lock();
		let mut cause = CommandCause::default();
		let Some(stack) = frames.get(&thread) else {
			return cause;
		};

		for frame in stack.iter().rev() {
			cause.causes.extend(frame.causes.iter().rev().cloned());
			if cause.command.is_none() {
				cause.command = frame.command.clone();
			}
			if cause.subject.is_none() {
				cause.subject = frame.subject.clone();
			}
			if cause.audience.is_none() {
				cause.audience = frame.audience.clone();
			}
		}
		cause
	}

	fn with_frame(&self, thread: ThreadId, depth: usize, f: impl FnOnce(&mut FrameData)) {
		let mut frames = self.frames.lock();
		match frames.get_mut(&thread).and_then(|stack| stack.get_mut(depth)) {
			Some(frame) => f(frame),
			None => tracing::error!(depth, "cause frame was already popped"),
		}
	}

	fn pop_to(&self, thread: ThreadId, depth: usize) {
		let mut frames = self.frames.lock();
		let Some(stack) = frames.get_mut(&thread) else {
			tracing::error!(depth, "cause frame popped on a thread with no frames");
			return;
		};
		if stack.len() <= depth {
			tracing::error!(depth, len = stack.len(), "cause frame popped out of order");
		} else if stack.len() > depth + 1 {
			tracing::warn!(depth, leaked = stack.len() - depth - 1, "discarding cause frames leaked by a nested scope");
		}
		stack.truncate(depth);
		if stack.is_empty() {
			frames.remove(&thread);
		}
	}
}

/// Guard for one pushed frame. Not `Send`: frames belong to the pushing thread.
#[must_use = "the frame is popped as soon as the guard drops"]
pub struct CauseFrame<'a> {
	stack: &'a CauseStack,
	thread: ThreadId,
	depth: usize,
	_not_send: PhantomData<*const ()>,
}

impl CauseFrame<'_> {
	/// Records who triggered the work done in this frame.
	pub fn push_cause(&self, cause: impl Into<Arc<str>>) {
		let cause = cause.into();
		self.stack.with_frame(self.thread, self.depth, |frame| frame.causes.push(cause));
	}

	pub fn add_command(&self, command: impl Into<Arc<str>>) {
		let command = command.into();
		self.stack.with_frame(self.thread, self.depth, |frame| frame.command = Some(command));
	}

	pub fn add_subject(&self, subject: impl Into<Arc<str>>) {
		let subject = subject.into();
		self.stack.with_frame(self.thread, self.depth, |frame| frame.subject = Some(subject));
	}

	pub fn add_audience(&self, audience: AudienceRef) {
		self.stack.with_frame(self.thread, self.depth, |frame| frame.audience = Some(audience));
	}

	/// Depth of this frame on its thread's stack.
	pub fn depth(&self) -> usize {
		self.depth
	}
}

impl Drop for CauseFrame<'_> {
	fn drop(&mut self) {
		self.stack.pop_to(self.thread, self.depth);
	}
}

/// Snapshot of the cause stack threaded through parsing and execution.
#[derive(Clone, Default)]
pub struct CommandCause {
	causes: Vec<Arc<str>>,
	command: Option<Arc<str>>,
	subject: Option<Arc<str>>,
	audience: Option<AudienceRef>,
}

impl CommandCause {
	/// Causes, innermost first.
	pub fn causes(&self) -> &[Arc<str>] {
		&self.causes
	}

	/// Innermost cause, if any.
	pub fn root(&self) -> Option<&str> {
		self.causes.first().map(|c| &**c)
	}

	/// Raw command string being processed.
	pub fn command(&self) -> Option<&str> {
		self.command.as_deref()
	}

	pub fn subject(&self) -> Option<&str> {
		self.subject.as_deref()
	}

	pub fn audience(&self) -> Option<&AudienceRef> {
		self.audience.as_ref()
	}

	/// Copy of this cause running as `subject`.
	pub fn with_subject(&self, subject: impl Into<Arc<str>>) -> Self {
		Self {
			subject: Some(subject.into()),
			..self.clone()
		}
	}

	pub fn send_message(&self, message: &str) {
		match &self.audience {
			Some(audience) => audience.send_message(message),
			None => tracing::info!(subject = ?self.subject, text = message, "command output with no audience"),
		}
	}
}

impl CommandSource for CommandCause {
	fn send_error(&self, message: &str) {
		match &self.audience {
			Some(audience) => audience.send_message(message),
			None => tracing::warn!(subject = ?self.subject, command = ?self.command, text = message, "command error with no audience"),
		}
	}
}

impl fmt::Debug for CommandCause {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CommandCause")
			.field("causes", &self.causes)
			.field("command", &self.command)
			.field("subject", &self.subject)
			.field("audience", &self.audience.is_some())
			.finish()
	}
}
