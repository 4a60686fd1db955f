//! Shared test helpers for `scpi_toolkit_core` integration tests.

#![allow(unreachable_pub)]

use std::cell::RefCell;
use std::rc::Rc;

use scpi_toolkit_core::{Command, Context, Interface, ScpiError};

/// A context wired to capture its output and error notifications.
pub struct Fixture {
    pub ctx: Context,
    output: Rc<RefCell<Vec<u8>>>,
    notified: Rc<RefCell<Vec<ScpiError>>>,
    flushes: Rc<RefCell<usize>>,
}

/// Build a capturing context with the given command table and line-buffer
/// capacity.
#[allow(dead_code)]
pub fn fixture(commands: Vec<Command>, capacity: usize) -> Fixture {
    let output = Rc::new(RefCell::new(Vec::new()));
    let notified = Rc::new(RefCell::new(Vec::new()));
    let flushes = Rc::new(RefCell::new(0usize));

    let sink = Rc::clone(&output);
    let errs = Rc::clone(&notified);
    let fl = Rc::clone(&flushes);
    let iface = Interface::new()
        .with_write(move |data| sink.borrow_mut().extend_from_slice(data))
        .with_on_error(move |e| errs.borrow_mut().push(e.clone()))
        .with_flush(move || *fl.borrow_mut() += 1);

    Fixture {
        ctx: Context::new(commands, iface, capacity),
        output,
        notified,
        flushes,
    }
}

impl Fixture {
    /// Everything written to the output sink so far, as UTF-8.
    #[allow(dead_code)]
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.output.borrow()).into_owned()
    }

    /// Everything written to the output sink so far, as raw bytes.
    #[allow(dead_code)]
    pub fn output_bytes(&self) -> Vec<u8> {
        self.output.borrow().clone()
    }

    /// Errors delivered through the `on_error` callback, in order.
    #[allow(dead_code)]
    pub fn notified(&self) -> Vec<ScpiError> {
        self.notified.borrow().clone()
    }

    /// Number of flush callbacks seen.
    #[allow(dead_code)]
    pub fn flush_count(&self) -> usize {
        *self.flushes.borrow()
    }
}

/// Drain the context's error queue into a list of codes.
#[allow(dead_code)]
pub fn drain_error_codes(ctx: &mut Context) -> Vec<i16> {
    std::iter::from_fn(|| ctx.error_pop())
        .map(|e| e.code)
        .collect()
}

/// A command whose handler does nothing, for dispatch-only tests.
#[allow(dead_code)]
pub fn noop_command(pattern: &str) -> Command {
    Command::new(pattern, |_ctx| Ok(()))
}

/// A command that counts its invocations.
#[allow(dead_code)]
pub fn counting_command(pattern: &str, counter: Rc<RefCell<usize>>) -> Command {
    Command::new(pattern, move |_ctx| {
        *counter.borrow_mut() += 1;
        Ok(())
    })
}
