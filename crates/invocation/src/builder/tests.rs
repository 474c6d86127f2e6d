use std::sync::Arc;

use super::*;
use crate::command::CommandStatus;
use crate::error::ExecutionError;

fn builder() -> ContextBuilder<&'static str> {
	ContextBuilder::new("console", "root", 0)
}

#[test]
fn with_argument_feeds_both_views() {
	let mut b = builder();
	b.with_argument("radius", ParsedArgument::of(StringRange::between(5, 7), 12_u32));

	assert!(b.arguments().contains_key("radius"));
	assert_eq!(b.require_one(&ParameterKey::<u32>::new("radius")), Ok(&12));
	assert!(!b.has_any(&ParameterKey::<i64>::new("radius")));
}

#[test]
fn same_node_name_stores_each_runtime_type_separately() {
	let mut b = builder();
	b.with_argument("target", ParsedArgument::of(StringRange::between(0, 3), 7_i32));
	b.with_argument("target", ParsedArgument::of(StringRange::between(4, 7), "bob".to_string()));

	assert_eq!(b.get_all(&ParameterKey::<i32>::new("target")), vec![&7]);
	assert_eq!(b.get_all(&ParameterKey::<String>::new("target")), vec!["bob"]);
	assert_eq!(b.store().keys().count(), 2);
}

#[test]
fn repeated_argument_accumulates_but_node_map_keeps_latest() {
	let mut b = builder();
	b.with_argument("flag", ParsedArgument::of(StringRange::between(0, 2), "a".to_string()));
	b.with_argument("flag", ParsedArgument::of(StringRange::between(3, 5), "b".to_string()));

	let key = ParameterKey::<String>::new("flag");
	assert_eq!(b.get_all(&key), vec!["a", "b"]);
	assert_eq!(b.arguments().len(), 1);
	assert_eq!(b.arguments()["flag"].range(), StringRange::between(3, 5));
}

#[test]
fn copy_does_not_alias_storage() {
	let key = ParameterKey::<i32>::new("n");
	let mut original = builder();
	original.put_entry(&key, 1);
	original.with_child(builder());

	let mut copy = original.copy();
	assert!(copy.child().is_none());
	copy.put_entry(&key, 2);
	copy.with_argument("extra", ParsedArgument::of(StringRange::at(0), true));

	assert_eq!(original.get_all(&key), vec![&1]);
	assert!(original.arguments().is_empty());
	assert_eq!(copy.get_all(&key), vec![&1, &2]);
}

#[test]
fn with_node_widens_range_and_adopts_redirect() {
	let modifier: RedirectModifier<&'static str> =
		Arc::new(|ctx: &Context<&'static str>| -> Result<Vec<&'static str>, ExecutionError> { Ok(vec![*ctx.source()]) });
	let mut b = builder();
	b.with_node(&NodeInfo::new("execute"), StringRange::between(0, 7));
	assert!(b.redirect_modifier().is_none());

	b.with_node(&NodeInfo::new("as").fork(modifier), StringRange::between(8, 10));
	assert_eq!(b.range(), StringRange::between(0, 10));
	assert!(b.is_forked());
	assert!(b.redirect_modifier().is_some());
	assert_eq!(b.nodes().iter().map(|n| n.node()).collect::<Vec<_>>(), ["execute", "as"]);
}

#[test]
fn build_wires_the_child_chain() {
	let command: CommandRef<&'static str> = Arc::new(|_: &Context<&'static str>| CommandStatus::Success(1));

	let mut leaf = ContextBuilder::new("console", "say", 12);
	leaf.with_node(&NodeInfo::new("say"), StringRange::between(12, 15));
	leaf.with_command(command);

	let mut middle = ContextBuilder::new("console", "run", 8);
	middle.with_node(&NodeInfo::new("run"), StringRange::between(8, 11));
	middle.with_child(leaf);

	let mut root = builder();
	root.with_node(&NodeInfo::new("execute"), StringRange::between(0, 7));
	root.with_child(middle);

	let ctx = root.build("execute run say");
	assert_eq!(ctx.input(), "execute run say");
	assert!(ctx.command().is_none());

	let middle = ctx.child().expect("middle context");
	assert_eq!(middle.nodes()[0].node(), "run");
	assert_eq!(middle.input(), "execute run say");

	let last = ctx.last_child();
	assert_eq!(last.nodes()[0].node(), "say");
	assert!(last.command().is_some());
	assert!(last.child().is_none());
}

#[test]
fn deep_chain_builds_and_drops_without_recursion() {
	let mut root = builder();
	{
		let mut current = &mut root;
		for i in 0..100_000 {
			current.with_child(ContextBuilder::new("console", "loop", i));
			current = current.child_mut().expect("child just linked");
		}
	}
	assert_eq!(root.last_child().range().start(), 99_999);

	let ctx = root.build("loop");
	assert_eq!(ctx.last_child().range().start(), 99_999);
	assert!(format!("{ctx:?}").contains("children: 100000"));
	drop(ctx);
}

#[test]
fn deep_unbuilt_chain_drops_and_formats_without_recursion() {
	let mut root = builder();
	{
		let mut current = &mut root;
		for i in 0..100_000 {
			current.with_child(ContextBuilder::new("console", "loop", i));
			current = current.child_mut().expect("child just linked");
		}
	}

	assert!(format!("{root:?}").contains("children: 100000"));
	drop(root);
}

#[test]
fn suggestion_context_tracks_parent_node() {
	let mut b = builder();
	b.with_node(&NodeInfo::new("give"), StringRange::between(0, 4));
	b.with_node(&NodeInfo::new("target"), StringRange::between(5, 9));

	assert_eq!(
		b.find_suggestion_context(6),
		Some(SuggestionContext {
			parent: "give".into(),
			start: 5
		})
	);
	assert_eq!(
		b.find_suggestion_context(10),
		Some(SuggestionContext {
			parent: "target".into(),
			start: 10
		})
	);

	let late = ContextBuilder::<&'static str>::new("console", "root", 3);
	assert_eq!(late.find_suggestion_context(1), None);
}
