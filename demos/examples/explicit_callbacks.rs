// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sniffed timing and explicit completion.
//!
//! Print what the duration sniffer infers from a few computed styles, then
//! run a leave phase whose completion is driven by the caller instead of by
//! timing.
//!
//! Run:
//! - `cargo run -p understory_transition_examples --example explicit_callbacks`

use tracing_subscriber::EnvFilter;
use understory_transition::sniff::parse_time;
use understory_transition::{
    ComputedTiming, Cx, Done, ElementId, EndEvent, FrameClock, Hooks, KeyedChild, Mechanism,
    MemoryHost, Phase, Phases, Transition, TransitionOptions, sniff,
};

/// Hooks that keep completion tokens for later.
#[derive(Debug, Default)]
struct Deferred {
    tokens: Vec<Done>,
}

impl Hooks<ElementId> for Deferred {
    fn during(&mut self, phase: Phase, el: ElementId, done: Option<Done>) {
        println!("  {phase} running on {el:?}, explicit: {}", done.is_some());
        self.tokens.extend(done);
    }

    fn after(&mut self, phase: Phase, el: ElementId) {
        println!("  {phase} finished on {el:?}");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("sniffing:");
    let styles = [
        ComputedTiming::transition("1s, .3s", "0s"),
        ComputedTiming::animation("250ms", "100ms"),
        ComputedTiming {
            transition_duration: "0.5s".into(),
            animation_duration: "0.5s".into(),
            ..ComputedTiming::default()
        },
    ];
    for timing in &styles {
        let sniffed = sniff(timing, None);
        println!(
            "  {:?} -> {} for {}ms, {} end event(s)",
            timing, sniffed.mechanism, sniffed.total_ms, sniffed.entry_count
        );
    }
    for input in ["1.5s", "20ms", "fast"] {
        match parse_time(input) {
            Ok(ms) => println!("  parse {input:?} = {ms}ms"),
            Err(err) => println!("  parse {input:?} failed: {err}"),
        }
    }

    println!("explicit leave:");
    let mut dom = MemoryHost::new();
    let mut clock = FrameClock::new();
    let a = KeyedChild::new("a", dom.create_element("div"));
    let b = KeyedChild::new("b", dom.create_element("div"));
    dom.set_timing(b.content, ComputedTiming::transition("0.2s", "0s"));
    let resolve = |c: &KeyedChild<&'static str, ElementId>| vec![c.content];

    let options = TransitionOptions::named("slide").with_explicit_callbacks(Phases::LEAVE);
    let mut t = Transition::new(options, Deferred::default(), Some(a.clone()));
    t.mount(&mut Cx::new(&mut dom, &mut clock), resolve);
    t.update(Some(b.clone()), &mut Cx::new(&mut dom, &mut clock));
    t.committed(&mut Cx::new(&mut dom, &mut clock), resolve);

    clock.tick_frame();
    clock.tick_frame();
    while let Some(task) = clock.pop_due() {
        t.run(task, &mut Cx::new(&mut dom, &mut clock));
    }
    println!("  a: {:?}", dom.classes(a.content));

    // The enter phase listens for `transitionend` on b.
    let event = EndEvent {
        mechanism: Mechanism::Transition,
        target: b.content,
    };
    let done = t.handle_end_event(&event, &mut Cx::new(&mut dom, &mut clock));
    println!("  end event completed {done:?}");

    let tokens = std::mem::take(&mut t.hooks_mut().tokens);
    for token in tokens {
        let done = t.complete(token, &mut Cx::new(&mut dom, &mut clock));
        println!("  token completed {done:?}");
    }
    println!("  state {:?}, rendered {}", t.state(), t.rendered().len());
}
