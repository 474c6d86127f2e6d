use std::sync::Arc;

use parking_lot::Mutex;

use super::*;
use crate::builder::{ContextBuilder, NodeInfo};
use crate::command::{CommandExecutor, CommandRef, CommandSource, CommandStatus, ERROR_PREFIX, ExecutorAdapter, RedirectModifier};
use crate::error::ExecutionError;
use crate::key::ParameterKey;
use crate::range::{ParsedArgument, StringRange};

#[derive(Clone, Debug)]
struct Source {
	name: &'static str,
	log: Arc<Mutex<Vec<String>>>,
}

impl Source {
	fn new(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Self {
		Self {
			name,
			log: Arc::clone(log),
		}
	}
}

impl CommandSource for Source {
	fn send_error(&self, message: &str) {
		self.log.lock().push(format!("{} <- {message}", self.name));
	}
}

fn adapter(executor: impl CommandExecutor<Source> + 'static) -> CommandRef<Source> {
	ExecutorAdapter::new(executor).into_command()
}

/// `execute as <targets> run say`: root forks into one branch per target.
fn forked_say(root_source: Source, targets: Vec<Source>, say: CommandRef<Source>) -> Context<Source> {
	let fan_out: RedirectModifier<Source> = Arc::new(move |_: &Context<Source>| -> Result<Vec<Source>, ExecutionError> { Ok(targets.clone()) });

	let mut leaf = ContextBuilder::new(root_source.clone(), "say", 18);
	leaf.with_node(&NodeInfo::new("say"), StringRange::between(18, 21));
	leaf.with_command(say);

	let mut root = ContextBuilder::new(root_source, "execute", 0);
	root.with_node(&NodeInfo::new("execute"), StringRange::between(0, 7));
	root.with_node(&NodeInfo::new("as").fork(fan_out), StringRange::between(8, 10));
	root.with_child(leaf);
	root.build("execute as @a run say")
}

#[test]
fn fork_isolates_failing_branch() {
	let log = Arc::new(Mutex::new(Vec::new()));
	let ran = Arc::new(Mutex::new(Vec::new()));
	let ran_in = Arc::clone(&ran);

	let say = adapter(move |ctx: &Context<Source>| -> Result<CommandResult, ExecutionError> {
		ran_in.lock().push(ctx.source().name);
		if ctx.source().name == "bob" {
			return Err(ExecutionError::new("bob cannot speak"));
		}
		Ok(CommandResult::with_result(10))
	});

	let targets = vec![Source::new("alex", &log), Source::new("bob", &log), Source::new("cara", &log)];
	let ctx = forked_say(Source::new("console", &log), targets, say);

	let summary = execute(&ctx).expect("fork never propagates branch failures");
	assert_eq!(*ran.lock(), ["alex", "bob", "cara"]);
	assert_eq!(summary.successes, 2);
	assert_eq!(summary.failures, 1);
	assert_eq!(summary.attempted(), 3);
	assert_eq!(summary.result, 20);
	assert!(summary.forked);
	assert_eq!(*log.lock(), [format!("bob <- {ERROR_PREFIX}bob cannot speak")]);
}

#[test]
fn fork_with_no_targets_runs_nothing() {
	let log = Arc::new(Mutex::new(Vec::new()));
	let say = adapter(|_: &Context<Source>| -> Result<CommandResult, ExecutionError> { Ok(CommandResult::success()) });
	let ctx = forked_say(Source::new("console", &log), Vec::new(), say);

	let summary = execute(&ctx).unwrap();
	assert_eq!(summary.attempted(), 0);
	assert_eq!(summary.to_result(), CommandResult::with_result(0));
}

#[test]
fn panicking_bare_command_fails_only_its_branch() {
	let log = Arc::new(Mutex::new(Vec::new()));
	let ran = Arc::new(Mutex::new(Vec::new()));
	let ran_in = Arc::clone(&ran);

	let say: CommandRef<Source> = Arc::new(move |ctx: &Context<Source>| -> CommandStatus {
		ran_in.lock().push(ctx.source().name);
		if ctx.source().name == "bob" {
			panic!("bob has no voice");
		}
		CommandStatus::Success(1)
	});

	let targets = vec![Source::new("alex", &log), Source::new("bob", &log), Source::new("cara", &log)];
	let ctx = forked_say(Source::new("console", &log), targets, say);

	let summary = execute(&ctx).expect("panicking branch stays inside the fork");
	assert_eq!(*ran.lock(), ["alex", "bob", "cara"]);
	assert_eq!(summary.successes, 2);
	assert_eq!(summary.failures, 1);
	assert_eq!(summary.result, 2);
}

#[test]
fn panicking_plain_redirect_becomes_redirect_error() {
	let log = Arc::new(Mutex::new(Vec::new()));
	let modifier: RedirectModifier<Source> =
		Arc::new(|_: &Context<Source>| -> Result<Vec<Source>, ExecutionError> { panic!("selector exploded") });

	let mut leaf = ContextBuilder::new(Source::new("console", &log), "say", 4);
	leaf.with_node(&NodeInfo::new("say"), StringRange::between(4, 7));

	let mut root = ContextBuilder::new(Source::new("console", &log), "as", 0);
	root.with_node(&NodeInfo::new("as").redirect(modifier), StringRange::between(0, 2));
	root.with_child(leaf);

	let err = execute(&root.build("as x say")).unwrap_err();
	assert!(matches!(err, DispatchError::Redirect(_)));
	assert!(err.to_string().contains("selector exploded"));
}

#[test]
fn plain_redirect_must_produce_one_source() {
	let log = Arc::new(Mutex::new(Vec::new()));
	let two = vec![Source::new("a", &log), Source::new("b", &log)];
	let modifier: RedirectModifier<Source> = Arc::new(move |_: &Context<Source>| -> Result<Vec<Source>, ExecutionError> { Ok(two.clone()) });

	let mut leaf = ContextBuilder::new(Source::new("console", &log), "say", 4);
	leaf.with_node(&NodeInfo::new("say"), StringRange::between(4, 7));
	leaf.with_command(adapter(|_: &Context<Source>| -> Result<CommandResult, ExecutionError> { Ok(CommandResult::success()) }));

	let mut root = ContextBuilder::new(Source::new("console", &log), "as", 0);
	root.with_node(&NodeInfo::new("as").redirect(modifier), StringRange::between(0, 2));
	root.with_child(leaf);

	let err = execute(&root.build("as x say")).unwrap_err();
	assert!(matches!(err, DispatchError::RedirectArity { count: 2 }));
}

#[test]
fn plain_redirect_failure_propagates() {
	let log = Arc::new(Mutex::new(Vec::new()));
	let modifier: RedirectModifier<Source> =
		Arc::new(|_: &Context<Source>| -> Result<Vec<Source>, ExecutionError> { Err(ExecutionError::new("no such entity")) });

	let mut leaf = ContextBuilder::new(Source::new("console", &log), "say", 4);
	leaf.with_node(&NodeInfo::new("say"), StringRange::between(4, 7));

	let mut root = ContextBuilder::new(Source::new("console", &log), "as", 0);
	root.with_node(&NodeInfo::new("as").redirect(modifier), StringRange::between(0, 2));
	root.with_child(leaf);

	let err = execute(&root.build("as x say")).unwrap_err();
	assert!(matches!(err, DispatchError::Redirect(_)));
}

#[test]
fn redirect_runs_child_as_derived_source() {
	let log = Arc::new(Mutex::new(Vec::new()));
	let derived = Source::new("alex", &log);
	let modifier: RedirectModifier<Source> =
		Arc::new(move |_: &Context<Source>| -> Result<Vec<Source>, ExecutionError> { Ok(vec![derived.clone()]) });

	let seen = Arc::new(Mutex::new(None));
	let seen_in = Arc::clone(&seen);
	let mut leaf = ContextBuilder::new(Source::new("console", &log), "say", 4);
	leaf.with_node(&NodeInfo::new("say"), StringRange::between(4, 7));
	leaf.with_command(adapter(move |ctx: &Context<Source>| -> Result<CommandResult, ExecutionError> {
		*seen_in.lock() = Some(ctx.source().name);
		Ok(CommandResult::success())
	}));

	let mut root = ContextBuilder::new(Source::new("console", &log), "as", 0);
	root.with_node(&NodeInfo::new("as").redirect(modifier), StringRange::between(0, 2));
	root.with_child(leaf);

	let summary = execute(&root.build("as alex say")).unwrap();
	assert_eq!(summary.successes, 1);
	assert!(!summary.forked);
	assert_eq!(*seen.lock(), Some("alex"));
}

#[test]
fn nested_redirect_failure_inside_fork_is_isolated() {
	let log = Arc::new(Mutex::new(Vec::new()));
	let targets = vec![Source::new("alex", &log), Source::new("bob", &log)];
	let fan_out: RedirectModifier<Source> = Arc::new(move |_: &Context<Source>| -> Result<Vec<Source>, ExecutionError> { Ok(targets.clone()) });
	let at: RedirectModifier<Source> = Arc::new(|ctx: &Context<Source>| -> Result<Vec<Source>, ExecutionError> {
		if ctx.source().name == "bob" {
			Err(ExecutionError::new("bob is nowhere"))
		} else {
			Ok(vec![ctx.source().clone()])
		}
	});

	let mut leaf = ContextBuilder::new(Source::new("console", &log), "say", 14);
	leaf.with_node(&NodeInfo::new("say"), StringRange::between(14, 17));
	leaf.with_command(adapter(|_: &Context<Source>| -> Result<CommandResult, ExecutionError> { Ok(CommandResult::success()) }));

	let mut middle = ContextBuilder::new(Source::new("console", &log), "at", 8);
	middle.with_node(&NodeInfo::new("at").redirect(at), StringRange::between(8, 10));
	middle.with_child(leaf);

	let mut root = ContextBuilder::new(Source::new("console", &log), "as", 0);
	root.with_node(&NodeInfo::new("as").fork(fan_out), StringRange::between(0, 2));
	root.with_child(middle);

	let summary = execute(&root.build("as @a at @s say")).unwrap();
	assert_eq!(summary.successes, 1);
	assert_eq!(summary.failures, 1);
}

#[test]
fn chain_without_command_is_unknown() {
	let log = Arc::new(Mutex::new(Vec::new()));
	let mut root = ContextBuilder::new(Source::new("console", &log), "help", 0);
	root.with_node(&NodeInfo::new("help"), StringRange::between(0, 4));

	assert!(matches!(execute(&root.build("help")), Err(DispatchError::NoCommand)));
}

#[test]
fn adapter_reports_error_results_and_panics() {
	let log = Arc::new(Mutex::new(Vec::new()));
	let source = Source::new("console", &log);

	let refusing = adapter(|_: &Context<Source>| -> Result<CommandResult, ExecutionError> { Ok(CommandResult::error("not today")) });
	let panicking = adapter(|_: &Context<Source>| -> Result<CommandResult, ExecutionError> { panic!("boom") });

	let ctx = ContextBuilder::new(source, "x", 0).build("x");
	assert_eq!(refusing.run(&ctx), CommandStatus::Failed);
	assert_eq!(panicking.run(&ctx), CommandStatus::Failed);
	assert_eq!(
		*log.lock(),
		[format!("console <- {ERROR_PREFIX}not today"), format!("console <- {ERROR_PREFIX}boom")]
	);
}

#[test]
fn executor_can_propagate_argument_errors() {
	let log = Arc::new(Mutex::new(Vec::new()));
	let amount = ParameterKey::<i32>::new("amount");

	let give = adapter(move |ctx: &Context<Source>| -> Result<CommandResult, ExecutionError> {
		let n = ctx.require_one(&amount)?;
		Ok(CommandResult::with_result(*n))
	});

	let mut missing = ContextBuilder::new(Source::new("console", &log), "give", 0);
	missing.with_node(&NodeInfo::new("give"), StringRange::between(0, 4));
	missing.with_command(Arc::clone(&give));
	let summary = execute(&missing.build("give")).unwrap();
	assert_eq!(summary.failures, 1);
	assert!(log.lock()[0].contains("no entry was found for amount"));

	let mut present = ContextBuilder::new(Source::new("console", &log), "give", 0);
	present.with_node(&NodeInfo::new("give"), StringRange::between(0, 4));
	present.with_argument("amount", ParsedArgument::of(StringRange::between(5, 7), 64_i32));
	present.with_command(give);
	let summary = execute(&present.build("give 64")).unwrap();
	assert_eq!(summary.result, 64);
	assert_eq!(summary.to_result(), CommandResult::with_result(64));
}
