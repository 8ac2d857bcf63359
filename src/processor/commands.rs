//! What each command does when the tick loop reaches it.

use log::debug;

use super::ast::{Command, Move};
use super::owner::Owner;
use super::vm::{CommandResult, ScriptContext};

impl Command {
    /// Runs the command stored at index `key` of the context's script.
    pub fn execute(
        &self,
        key: usize,
        ctx: &mut ScriptContext,
        owner: &mut dyn Owner,
    ) -> CommandResult {
        use CommandResult::*;

        match self {
            Command::Move(m) => m.execute(key, ctx, owner),
            Command::Try {
                direction,
                otherwise,
            } => {
                let moved = direction
                    .evaluate(&*owner, ctx.rng())
                    .is_some_and(|d| owner.move_to(d));
                if moved {
                    return Normal;
                }
                match otherwise {
                    Some(label) if ctx.jump_to_label(label) => ContinueAfterJump,
                    _ => Normal,
                }
            }
            Command::Wait { ticks } => {
                let remaining = ctx.heap().count(key).unwrap_or(*ticks) - 1;
                if remaining > 0 {
                    ctx.heap_mut().set_count(key, remaining);
                    Repeat
                } else {
                    Normal
                }
            }
            Command::Say { text } => {
                owner.say(text);
                Normal
            }
            Command::Scroll { lines } => {
                owner.scroll(lines);
                Normal
            }
            Command::End => {
                ctx.stop();
                Continue
            }
            Command::Die => {
                owner.remove();
                ctx.stop();
                Continue
            }
            Command::If { condition, label } => {
                if condition.evaluate(&*owner, ctx.rng()) && ctx.jump_to_label(label) {
                    ContinueAfterJump
                } else {
                    Continue
                }
            }
            Command::Put {
                direction,
                template,
            } => {
                match direction.evaluate(&*owner, ctx.rng()) {
                    Some(d) if owner.put(d, template) => {}
                    _ => debug!("could not put {template}"),
                }
                Continue
            }
            Command::Send { recipient, message } => match recipient.as_deref() {
                None | Some("self") => {
                    if ctx.jump_to_label(message) {
                        ContinueAfterJump
                    } else {
                        Continue
                    }
                }
                Some(to) => {
                    ctx.post(to, message);
                    Continue
                }
            },
            Command::Set { counter, value } => {
                owner.set_counter_value(counter, *value);
                Continue
            }
            Command::Give { counter, amount } => {
                owner.adjust_counter(counter, *amount);
                Continue
            }
            Command::Take {
                counter,
                amount,
                otherwise,
            } => {
                if owner.counter_value(counter) >= *amount {
                    owner.adjust_counter(counter, -*amount);
                    return Continue;
                }
                match otherwise {
                    Some(label) if ctx.jump_to_label(label) => ContinueAfterJump,
                    _ => Continue,
                }
            }
            Command::Become { template } => {
                owner.replace(template);
                ctx.stop();
                Continue
            }
            Command::Change { from, to } => {
                owner.change(from, to);
                Continue
            }
            Command::Char { code } => {
                owner.set_char(*code);
                Continue
            }
            Command::Torch { radius } => {
                owner.set_torch_radius(*radius);
                Continue
            }
            Command::Shoot { direction } => {
                if let Some(d) = direction.evaluate(&*owner, ctx.rng()) {
                    owner.shoot(d);
                }
                Normal
            }
            Command::ThrowStar { direction } => {
                if let Some(d) = direction.evaluate(&*owner, ctx.rng()) {
                    owner.throw_star(d);
                }
                Normal
            }
            Command::Walk { direction } => {
                let d = direction.evaluate(&*owner, ctx.rng());
                owner.set_walk_direction(d);
                Continue
            }
            Command::Stand => {
                owner.set_walk_direction(None);
                Continue
            }
            Command::Lock => {
                ctx.set_locked(true);
                Continue
            }
            Command::Unlock => {
                ctx.set_locked(false);
                Continue
            }
            Command::Restore { label } => {
                ctx.restore_label(label);
                Continue
            }
            Command::Zap { label } => {
                ctx.zap_label(label);
                Continue
            }
            Command::Play {
                notation,
                exclusive,
            } => {
                owner.play(notation, *exclusive);
                Continue
            }
        }
    }
}

impl Move {
    /// One step per tick until `count` steps are taken. A blocked step is
    /// used up, unless the move is forceful, which retries the same
    /// direction until it gets through.
    fn execute(&self, key: usize, ctx: &mut ScriptContext, owner: &mut dyn Owner) -> CommandResult {
        let remaining = ctx.heap().count(key).unwrap_or(self.count);
        if remaining <= 0 {
            return CommandResult::Normal;
        }

        let direction = match ctx.heap().stuck(key) {
            Some(d) => Some(d),
            None => self.direction.evaluate(&*owner, ctx.rng()),
        };
        let moved = direction.is_some_and(|d| owner.move_to(d));

        if !moved && self.forceful {
            if let Some(d) = direction {
                ctx.heap_mut().set_stuck(key, d);
            }
            ctx.heap_mut().set_count(key, remaining);
            return CommandResult::Repeat;
        }

        ctx.heap_mut().clear_stuck(key);
        let remaining = remaining - 1;
        if remaining > 0 {
            ctx.heap_mut().set_count(key, remaining);
            CommandResult::Repeat
        } else {
            CommandResult::Normal
        }
    }
}
