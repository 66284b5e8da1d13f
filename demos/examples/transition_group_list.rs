// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyed list transitions.
//!
//! Remove, insert and reorder rows of a list, laying rows out top to bottom
//! after every render, and print which rows enter, leave and move.
//!
//! Run:
//! - `cargo run -p understory_transition_examples --example transition_group_list`

use kurbo::Rect;
use tracing_subscriber::EnvFilter;
use understory_transition::{Cx, ElementId, FrameClock, KeyedChild, MemoryHost, NoHooks, TransitionOptions};
use understory_transition_group::{TransitionGroup, reconcile};

const ROW_HEIGHT: f64 = 24.0;

type Row = KeyedChild<&'static str, ElementId>;
type List = TransitionGroup<&'static str, ElementId, ElementId>;

struct Screen {
    dom: MemoryHost,
    clock: FrameClock,
}

impl Screen {
    /// Render `list` and stack its rows vertically.
    fn render(&mut self, list: &mut List) -> Vec<&'static str> {
        let mut y = 0.0;
        for (_, rendered) in list.rendered() {
            for row in rendered.iter() {
                self.dom.set_rect(row.content, Rect::new(0.0, y, 200.0, y + ROW_HEIGHT));
                y += ROW_HEIGHT;
            }
        }
        list.committed(&mut Cx::new(&mut self.dom, &mut self.clock), |_, el| vec![*el])
    }

    fn settle(&mut self, list: &mut List) {
        for _ in 0..3 {
            self.clock.tick_frame();
            self.drain(list);
        }
        self.clock.advance(200);
        self.drain(list);
    }

    fn drain(&mut self, list: &mut List) {
        loop {
            if list.needs_commit() {
                self.render(list);
            }
            let Some(task) = self.clock.pop_due() else {
                return;
            };
            for key in list.run(task, &mut Cx::new(&mut self.dom, &mut self.clock)) {
                println!("  removed {key}");
            }
        }
    }

    fn show(&self, list: &List) {
        for key in list.keys() {
            let el = list.transition(key).and_then(|t| t.element().or(t.previous_element()));
            let classes = el.map(|el| self.dom.classes(el).join(" ")).unwrap_or_default();
            println!("  {key:<6} [{classes}]");
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut screen = Screen {
        dom: MemoryHost::new(),
        clock: FrameClock::new(),
    };
    let rows: Vec<Row> = ["alpha", "beta", "gamma", "delta"]
        .into_iter()
        .map(|key| KeyedChild::new(key, screen.dom.create_element("li")))
        .collect();
    let epsilon = KeyedChild::new("eps", screen.dom.create_element("li"));

    let options = TransitionOptions::named("row").with_duration(200);
    let mut list = List::new(options, NoHooks, rows.clone());
    screen.render(&mut list);
    println!("appearing:");
    screen.show(&list);
    screen.settle(&mut list);

    let steps: [(&str, Vec<Row>); 3] = [
        ("remove gamma", vec![rows[0].clone(), rows[1].clone(), rows[3].clone()]),
        (
            "insert eps",
            vec![rows[0].clone(), epsilon.clone(), rows[1].clone(), rows[3].clone()],
        ),
        (
            "reverse",
            vec![rows[3].clone(), rows[1].clone(), epsilon.clone(), rows[0].clone()],
        ),
    ];
    for (label, next) in steps {
        let old: Vec<&str> = list.keys().copied().collect();
        let new: Vec<&str> = next.iter().map(|r| r.key).collect();
        println!("\n{label}:");
        for d in reconcile(&old, &new) {
            println!("  diff {:<6} {:?}", d.key, d.change);
        }
        list.update(next, &mut Cx::new(&mut screen.dom, &mut screen.clock));
        screen.render(&mut list);
        screen.show(&list);
        screen.clock.tick_frame();
        screen.drain(&mut list);
        println!("  after one frame:");
        screen.show(&list);
        screen.settle(&mut list);
        println!("  settled:");
        screen.show(&list);
    }
}
