//! Handler and context types for pin interrupt slots
//!
//! A slot stores the handler together with its context; the two are one
//! value, so a stale context can never be paired with a fresh handler.
//! Context ownership is explicit in the type: a borrowed context word is
//! the caller's problem, a managed one belongs to the table and is released
//! through its cleanup hook when displaced.

/// Cleanup hook for a managed context word
///
/// Contract: release every resource owned by the context. Runs in task
/// context with the slot lock not held, so re-attaching from inside the
/// hook cannot deadlock (behavior beyond that is unspecified).
pub type ReleaseHook = fn(token: usize);

/// Context word owned by the dispatch table
///
/// The release hook runs exactly once, when the slot holding this context
/// is displaced by a new attach, cleared by a detach, or dropped with the
/// table. Double release cannot happen; forgetting to release cannot
/// happen.
#[derive(Debug)]
pub struct ManagedCtx {
    token: usize,
    release: ReleaseHook,
}

impl ManagedCtx {
    /// Take ownership of a context word with its cleanup hook
    pub const fn new(token: usize, release: ReleaseHook) -> Self {
        Self { token, release }
    }

    /// The context word handed to the handler
    pub const fn token(&self) -> usize {
        self.token
    }
}

impl Drop for ManagedCtx {
    fn drop(&mut self) {
        (self.release)(self.token);
    }
}

/// Context stored alongside a bound handler
#[derive(Debug)]
pub enum IsrContext {
    /// Caller keeps ownership of whatever the word refers to
    Borrowed(usize),
    /// The table owns it and releases it on displacement
    Managed(ManagedCtx),
}

impl IsrContext {
    /// The context word passed to the handler on dispatch
    pub fn token(&self) -> usize {
        match self {
            IsrContext::Borrowed(token) => *token,
            IsrContext::Managed(ctx) => ctx.token(),
        }
    }
}

/// Handler occupying a pin's dispatch slot
#[derive(Debug)]
pub enum IsrHandler {
    /// Invoked with no argument
    Plain(fn()),
    /// Invoked with the context word stored next to it
    Bound { hook: fn(usize), ctx: IsrContext },
}

/// Copyable invocation extracted from a slot
///
/// Dispatch copies this out under the critical section and runs it after
/// releasing the lock; the `Drop` side of a managed context never travels
/// with it.
#[derive(Clone, Copy)]
pub(crate) enum Invoke {
    Plain(fn()),
    Bound { hook: fn(usize), token: usize },
}

impl IsrHandler {
    pub(crate) fn invoke(&self) -> Invoke {
        match self {
            IsrHandler::Plain(hook) => Invoke::Plain(*hook),
            IsrHandler::Bound { hook, ctx } => Invoke::Bound {
                hook: *hook,
                token: ctx.token(),
            },
        }
    }
}
