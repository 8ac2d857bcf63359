use std::rc::Rc;

use jzt_script::processor::direction::Direction;
use jzt_script::processor::headless::HeadlessOwner;
use jzt_script::processor::runtime::Runtime;
use jzt_script::processor::script::{Script, ScriptLibrary};
use jzt_script::processor::vm::{ContextState, ScriptContext};

fn context(text: &str, seed: u64) -> ScriptContext {
    let script = Script::parse("test", text);
    assert!(script.is_executable(), "{:?}", script.diagnostic());
    ScriptContext::with_seed(Rc::new(script), seed)
}

#[test]
fn label_jumps_follow_zaps() {
    let script = Rc::new(Script::parse("steps", ":a\nMOVE N\n:a\nMOVE S"));
    assert_eq!(script.label_positions("a"), Some(&[-1, 0][..]));

    let mut ctx = ScriptContext::with_seed(Rc::clone(&script), 0);
    let mut owner = HeadlessOwner::default();
    ctx.send("a");
    ctx.execute_tick(&mut owner);
    assert_eq!(owner.moves(), [Direction::North]);

    ctx.zap_label("a");
    ctx.send("a");
    ctx.execute_tick(&mut owner);
    assert_eq!(owner.moves(), [Direction::North, Direction::South]);
}

#[test]
fn control_commands_chain_in_one_tick() {
    let mut ctx = context("SET x 5\nGIVE score 10\nEND", 0);
    let mut owner = HeadlessOwner::default();
    ctx.execute_tick(&mut owner);

    assert_eq!(ctx.state(), ContextState::Stopped);
    assert_eq!(owner.counters["x"], 5);
    assert_eq!(owner.counters["score"], 10);
}

#[test]
fn wait_holds_the_cursor_for_its_ticks() {
    let mut ctx = context("WAIT 3\nSAY \"go\"", 0);
    let mut owner = HeadlessOwner::default();

    for _ in 0..2 {
        ctx.execute_tick(&mut owner);
        assert_eq!(ctx.command_index(), Some(0));
        assert_eq!(ctx.stored_command(), Some(0));
    }
    ctx.execute_tick(&mut owner);
    assert_eq!(ctx.command_index(), Some(1));
    assert_eq!(ctx.stored_command(), None);
}

#[test]
fn canceling_modifiers_leave_the_direction_alone() {
    let mut ctx = context("MOVE CW CCW N", 0);
    let mut owner = HeadlessOwner::default();
    owner.facing = Some(Direction::East);
    ctx.execute_tick(&mut owner);
    assert_eq!(owner.moves(), [Direction::North]);
}

#[test]
fn shared_script_contexts_stay_independent() {
    let script = Rc::new(Script::parse(
        "twin",
        ":hit\nzap hit\nsay \"first\"\nend\n:hit\nsay \"second\"\nwait 4",
    ));
    let mut a = ScriptContext::with_seed(Rc::clone(&script), 1);
    let mut b = ScriptContext::with_seed(script, 2);
    let mut owner_a = HeadlessOwner::default();
    let mut owner_b = HeadlessOwner::default();

    a.execute_tick(&mut owner_a);
    a.send("hit");
    a.execute_tick(&mut owner_a);
    a.execute_tick(&mut owner_a);

    assert_eq!(owner_a.said(), ["first", "second"]);
    assert_eq!(a.label_cursor("hit"), Some(1));
    assert_eq!(a.heap().count(4), Some(3));

    assert_eq!(b.label_cursor("hit"), Some(0));
    assert_eq!(b.command_index(), Some(0));
    assert!(b.heap().is_empty());

    b.send("hit");
    b.execute_tick(&mut owner_b);
    assert_eq!(owner_b.said(), ["first"]);
}

#[test]
fn broken_script_does_not_stop_others() {
    let mut library = ScriptLibrary::new();
    let good = library.insert("good", "move e 3");
    let bad = library.insert("bad", "say \"hi\"\nmove sideways");
    assert!(!bad.is_executable());

    let mut runtime = Runtime::seeded(11);
    runtime.spawn("good", good, HeadlessOwner::default(), 1);
    runtime.spawn("bad", bad, HeadlessOwner::default(), 1);
    runtime.run(3);

    assert_eq!(runtime.actor("good").unwrap().owner.moves().len(), 3);
    let bad = runtime.actor("bad").unwrap();
    assert!(bad.owner.actions.is_empty());
    assert_eq!(bad.context.state(), ContextState::Stopped);
}

#[test]
fn seeded_random_walks_repeat() {
    let walk = |seed| {
        let mut ctx = context("move rand 20", seed);
        let mut owner = HeadlessOwner::default();
        for _ in 0..20 {
            ctx.execute_tick(&mut owner);
        }
        owner.moves()
    };
    assert_eq!(walk(4), walk(4));
    assert_eq!(walk(4).len(), 20);
}

#[test]
fn guard_answers_the_bell() {
    let mut library = ScriptLibrary::new();
    let guard = library.insert(
        "guard",
        ":patrol\nmove e 2\nmove w 2\nsend patrol\n:alarm\nlock\nsay \"Halt!\"\nend",
    );
    let bell = library.insert("bell", "wait 2\nsend guard alarm");

    let mut runtime = Runtime::seeded(0);
    runtime.spawn("guard", guard, HeadlessOwner::default(), 1);
    runtime.spawn("bell", bell, HeadlessOwner::default(), 1);
    runtime.run(5);

    let guard = runtime.actor("guard").unwrap();
    assert_eq!(
        guard.owner.moves(),
        [Direction::East, Direction::East, Direction::West]
    );
    assert_eq!(guard.owner.said(), ["Halt!"]);
    assert_eq!(guard.context.state(), ContextState::Stopped);
}
