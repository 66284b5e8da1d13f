// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transition basics.
//!
//! Swap the content of one slot in each mode and print the class lists as
//! frames and time advance.
//!
//! Run:
//! - `cargo run -p understory_transition_examples --example transition_basics`
//! - `RUST_LOG=understory_transition=debug cargo run -p understory_transition_examples --example transition_basics`

use tracing_subscriber::EnvFilter;
use understory_transition::{
    Cx, ElementId, FrameClock, Hooks, KeyedChild, MemoryHost, Mode, Phase, Phases, Transition,
    TransitionOptions,
};

/// Hooks that log every lifecycle call.
#[derive(Debug, Default)]
struct Printer;

impl Hooks<ElementId> for Printer {
    fn before(&mut self, phase: Phase, el: ElementId) {
        tracing::info!(%phase, ?el, "before");
    }

    fn after(&mut self, phase: Phase, el: ElementId) {
        tracing::info!(%phase, ?el, "after");
    }

    fn cancel(&mut self, phase: Phase, el: ElementId) {
        tracing::info!(%phase, ?el, "cancel");
    }
}

type Slot = Transition<KeyedChild<&'static str, ElementId>, ElementId, Printer>;

fn resolve(child: &KeyedChild<&'static str, ElementId>) -> Vec<ElementId> {
    vec![child.content]
}

/// Drain due tasks, committing whenever the slot asks for it.
fn pump(t: &mut Slot, dom: &mut MemoryHost, clock: &mut FrameClock) -> Phases {
    let mut done = Phases::empty();
    loop {
        if t.needs_commit() {
            done |= t.committed(&mut Cx::new(dom, clock), resolve);
        }
        let Some(task) = clock.pop_due() else {
            return done;
        };
        done |= t.run(task, &mut Cx::new(dom, clock));
    }
}

fn show(label: &str, dom: &MemoryHost, t: &Slot, a: ElementId, b: ElementId) {
    println!(
        "{label:>14}: state={:?} a={:?} b={:?}",
        t.state(),
        dom.classes(a),
        dom.classes(b)
    );
}

fn swap(mode: Option<Mode>) {
    println!("\nmode: {}", mode.map_or("default".to_string(), |m| m.to_string()));
    let mut dom = MemoryHost::new();
    let mut clock = FrameClock::new();
    let a = KeyedChild::new("a", dom.create_element("div"));
    let b = KeyedChild::new("b", dom.create_element("div"));
    let (ea, eb) = (a.content, b.content);

    let mut options = TransitionOptions::named("fade").with_duration(100);
    options.mode = mode;
    let mut t = Slot::new(options, Printer, Some(a));
    t.mount(&mut Cx::new(&mut dom, &mut clock), resolve);

    t.update(Some(b), &mut Cx::new(&mut dom, &mut clock));
    pump(&mut t, &mut dom, &mut clock);
    show("committed", &dom, &t, ea, eb);

    for step in 0..2 {
        for frame in 1..=2 {
            clock.tick_frame();
            pump(&mut t, &mut dom, &mut clock);
            show(&format!("frame {}", step * 2 + frame), &dom, &t, ea, eb);
        }
        clock.advance(100);
        let done = pump(&mut t, &mut dom, &mut clock);
        show(&format!("t={}ms", clock.now()), &dom, &t, ea, eb);
        if !done.is_empty() {
            println!("{:>14}  completed {done:?}", "");
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    swap(None);
    swap(Some(Mode::OutIn));
    swap(Some(Mode::InOut));
}
