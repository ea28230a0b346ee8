// SPDX-License-Identifier: Apache-2.0

//! Routing object fields to handlers.
//!
//! Two layers: [`dispatch`] builds a one-off chain inside a [`parse_object`] callback,
//! while [`Dispatcher`] is declared once per object shape and run over many documents.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::context::NestedStatus;
use crate::parse_error::{ErrorReason, ParseError};
use crate::parser::{parse_array, parse_object};
use crate::value::Value;
use crate::Context;

/// Skips the value a callback was just handed.
///
/// Scalars are already consumed, so this only has work to do for an object or array,
/// which it parses and discards recursively.
pub fn ignore<C: Context + ?Sized>(ctx: &C) -> Result<(), ParseError> {
    match ctx.nesting().status() {
        NestedStatus::None => Ok(()),
        NestedStatus::Object => parse_object(ctx, |_, _| ignore(ctx)),
        NestedStatus::Array => parse_array(ctx, |_| ignore(ctx)),
    }
}

#[derive(Debug)]
enum Outcome {
    Unmatched,
    Handled,
    Failed(ParseError),
}

/// A chain of field-name rules evaluated once, see [`dispatch`].
#[must_use = "call `finish` to learn whether a handler failed"]
#[derive(Debug)]
pub struct Dispatch<'n> {
    field_name: &'n str,
    outcome: Outcome,
}

/// Starts a dispatch chain for `field_name`.
///
/// Rules are tried left to right and the first matching one runs; later rules are
/// skipped. `any` matches every name.
///
/// # Example
///
/// ```rust
/// use lazyjson::{dispatch, ignore, parse_object, ConstBufferContext};
///
/// let ctx = ConstBufferContext::new(br#"{"x": 1, "skip": {"deep": []}, "y": 2}"#);
/// let (mut x, mut y) = (0, 0);
/// parse_object(&ctx, |name, value| {
///     dispatch(name)
///         .on("x", || value.store_into(&mut x))
///         .on("y", || value.store_into(&mut y))
///         .any(|| ignore(&ctx))
///         .finish()?;
///     Ok(())
/// })
/// .unwrap();
/// assert_eq!((x, y), (1, 2));
/// ```
pub fn dispatch(field_name: &str) -> Dispatch<'_> {
    Dispatch {
        field_name,
        outcome: Outcome::Unmatched,
    }
}

impl Dispatch<'_> {
    /// Runs `handler` if no earlier rule matched and the field is called `name`.
    pub fn on<F>(self, name: &str, handler: F) -> Self
    where
        F: FnOnce() -> Result<(), ParseError>,
    {
        if self.field_name == name {
            self.fire(handler)
        } else {
            self
        }
    }

    /// Runs `handler` if no earlier rule matched.
    pub fn any<F>(self, handler: F) -> Self
    where
        F: FnOnce() -> Result<(), ParseError>,
    {
        self.fire(handler)
    }

    fn fire<F>(mut self, handler: F) -> Self
    where
        F: FnOnce() -> Result<(), ParseError>,
    {
        if let Outcome::Unmatched = self.outcome {
            self.outcome = match handler() {
                Ok(()) => Outcome::Handled,
                Err(err) => Outcome::Failed(err),
            };
        }
        self
    }

    /// Whether a handler ran, or the error it returned.
    pub fn finish(self) -> Result<bool, ParseError> {
        match self.outcome {
            Outcome::Unmatched => Ok(false),
            Outcome::Handled => Ok(true),
            Outcome::Failed(err) => Err(err),
        }
    }
}

/// The kind of a handler registered on a [`Dispatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Required,
    Optional,
    Ignored,
    Any,
    IgnoreAny,
}

/// A handler as reported by [`DispatcherRun::inspect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerInfo<'h> {
    pub kind: HandlerKind,
    /// `None` for wildcard handlers.
    pub field_name: Option<&'h str>,
}

type FieldFn<'h, 'c, T> =
    Box<dyn Fn(&mut T, Value<'c>, &'c dyn Context) -> Result<(), ParseError> + 'h>;

type AnyFn<'h, 'c, T> = Box<
    dyn Fn(&mut T, &'c str, Value<'c>, &'c dyn Context) -> Result<bool, ParseError> + 'h,
>;

enum Action<'h, 'c, T> {
    Field(FieldFn<'h, 'c, T>),
    Ignore,
    Any(AnyFn<'h, 'c, T>),
    IgnoreAny,
}

struct Handler<'h, 'c, T> {
    info: HandlerInfo<'h>,
    action: Action<'h, 'c, T>,
}

/// A reusable set of field handlers for one object shape.
///
/// Handlers receive the target (`&mut T`), the field's value and the context, so they
/// can convert scalars or recurse into nested containers themselves. To fill several
/// variables, make `T` a tuple of them.
///
/// `'h` bounds the field names and handlers, `'c` the borrow of the context being parsed.
/// Values live for `'c`, so a target may keep `&'c str` slices of the document; the
/// contexts a dispatcher runs on must therefore outlive it.
///
/// Each field goes to the first named handler with that name, otherwise to the `any`
/// handlers in order until one accepts it, otherwise to `ignore_any` if present; if
/// nothing takes it the run fails with [`ErrorReason::UnhandledField`]. When the object
/// ends, a required handler that never ran fails the run with
/// [`ErrorReason::MissingField`].
///
/// # Example
///
/// ```rust
/// use lazyjson::{parse_array, ConstBufferContext, Dispatcher};
///
/// #[derive(Default)]
/// struct Order {
///     ticker: String,
///     price: f64,
///     tags: Vec<String>,
/// }
///
/// let ctx = ConstBufferContext::new(br#"{"ticker": "ACME", "price": 9.5, "comment": {}}"#);
/// let dispatcher = Dispatcher::new()
///     .required("ticker", |order: &mut Order, value, _| value.store_into(&mut order.ticker))
///     .required("price", |order: &mut Order, value, _| value.store_into(&mut order.price))
///     .optional("tags", |order: &mut Order, _, ctx| {
///         parse_array(ctx, |tag| {
///             order.tags.push(tag.to()?);
///             Ok(())
///         })
///     })
///     .ignored("comment");
///
/// let mut order = Order::default();
/// dispatcher.run(&ctx, &mut order).unwrap();
/// assert_eq!(order.ticker, "ACME");
/// assert_eq!(order.price, 9.5);
/// ```
pub struct Dispatcher<'h, 'c, T> {
    handlers: Vec<Handler<'h, 'c, T>>,
}

impl<T> Default for Dispatcher<'_, '_, T> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<'h, 'c, T> Dispatcher<'h, 'c, T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn with(
        mut self,
        kind: HandlerKind,
        field_name: Option<&'h str>,
        action: Action<'h, 'c, T>,
    ) -> Self {
        self.handlers.push(Handler {
            info: HandlerInfo { kind, field_name },
            action,
        });
        self
    }

    /// Handles `name`, which must appear at least once.
    pub fn required<F>(self, name: &'h str, handler: F) -> Self
    where
        F: Fn(&mut T, Value<'c>, &'c dyn Context) -> Result<(), ParseError> + 'h,
    {
        self.with(
            HandlerKind::Required,
            Some(name),
            Action::Field(Box::new(handler)),
        )
    }

    /// Handles `name` if it appears.
    pub fn optional<F>(self, name: &'h str, handler: F) -> Self
    where
        F: Fn(&mut T, Value<'c>, &'c dyn Context) -> Result<(), ParseError> + 'h,
    {
        self.with(
            HandlerKind::Optional,
            Some(name),
            Action::Field(Box::new(handler)),
        )
    }

    /// Accepts and skips `name`.
    pub fn ignored(self, name: &'h str) -> Self {
        self.with(HandlerKind::Ignored, Some(name), Action::Ignore)
    }

    /// Offers every field no named handler took; return `Ok(false)` to pass it on.
    pub fn any<F>(self, handler: F) -> Self
    where
        F: Fn(&mut T, &'c str, Value<'c>, &'c dyn Context) -> Result<bool, ParseError> + 'h,
    {
        self.with(HandlerKind::Any, None, Action::Any(Box::new(handler)))
    }

    /// Skips every field nothing else took, instead of failing.
    pub fn ignore_any(self) -> Self {
        self.with(HandlerKind::IgnoreAny, None, Action::IgnoreAny)
    }

    /// Starts a run for feeding fields by hand.
    pub fn start(&self) -> DispatcherRun<'_, 'h, 'c, T> {
        DispatcherRun {
            dispatcher: self,
            counts: alloc::vec![0; self.handlers.len()],
        }
    }

    /// Parses one object from `ctx`, dispatching every field into `target`.
    pub fn run(&self, ctx: &'c dyn Context, target: &mut T) -> Result<(), ParseError> {
        let mut run = self.start();
        parse_object(ctx, |name, value| run.handle(name, value, ctx, &mut *target))?;
        run.finish(ctx)
    }
}

/// The state of one [`Dispatcher`] pass over an object: how often each handler ran.
pub struct DispatcherRun<'d, 'h, 'c, T> {
    dispatcher: &'d Dispatcher<'h, 'c, T>,
    counts: Vec<usize>,
}

impl<'h, 'c, T> DispatcherRun<'_, 'h, 'c, T> {
    /// Dispatches one field.
    pub fn handle(
        &mut self,
        name: &'c str,
        value: Value<'c>,
        ctx: &'c dyn Context,
        target: &mut T,
    ) -> Result<(), ParseError> {
        let dispatcher = self.dispatcher;
        let handlers = &dispatcher.handlers;

        let named = handlers
            .iter()
            .enumerate()
            .find(|(_, handler)| handler.info.field_name == Some(name));
        if let Some((index, handler)) = named {
            match &handler.action {
                Action::Field(handle) => handle(&mut *target, value, ctx)?,
                _ => ignore(ctx)?,
            }
            self.count(index);
            return Ok(());
        }

        for (index, handler) in handlers.iter().enumerate() {
            if let Action::Any(handle) = &handler.action {
                if handle(&mut *target, name, value, ctx)? {
                    self.count(index);
                    return Ok(());
                }
            }
        }

        let catch_all = handlers
            .iter()
            .position(|handler| matches!(handler.action, Action::IgnoreAny));
        match catch_all {
            Some(index) => {
                ignore(ctx)?;
                self.count(index);
                Ok(())
            }
            None => {
                log::debug!("no handler for field {name:?}");
                Err(ParseError::at(ctx, ErrorReason::UnhandledField(name.into())))
            }
        }
    }

    fn count(&mut self, index: usize) {
        if let Some(count) = self.counts.get_mut(index) {
            *count += 1;
        }
    }

    /// Checks that every required handler ran at least once.
    pub fn finish(&self, ctx: &dyn Context) -> Result<(), ParseError> {
        let missing = self
            .dispatcher
            .handlers
            .iter()
            .zip(&self.counts)
            .find(|(handler, count)| handler.info.kind == HandlerKind::Required && **count == 0);
        match missing {
            Some((handler, _)) => {
                let name = handler.info.field_name.unwrap_or_default();
                log::debug!("required field {name:?} missing");
                Err(ParseError::at(ctx, ErrorReason::MissingField(name.into())))
            }
            None => Ok(()),
        }
    }

    /// Calls `visit` with every handler, in declaration order, and how often it ran.
    pub fn inspect<F>(&self, mut visit: F)
    where
        F: FnMut(HandlerInfo<'h>, usize),
    {
        for (handler, &count) in self.dispatcher.handlers.iter().zip(&self.counts) {
            visit(handler.info, count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConstBufferContext, ValueType};
    use alloc::string::String;
    use test_log::test;

    #[test]
    fn test_first_matching_rule_wins() {
        let mut fired = Vec::new();
        let handled = dispatch("b")
            .on("a", || {
                fired.push("a");
                Ok(())
            })
            .on("b", || {
                fired.push("b");
                Ok(())
            })
            .on("b", || {
                fired.push("b again");
                Ok(())
            })
            .any(|| {
                fired.push("any");
                Ok(())
            })
            .finish()
            .unwrap();
        assert!(handled);
        assert_eq!(fired, ["b"]);
    }

    #[test]
    fn test_any_fires_when_nothing_else_matches() {
        let mut fired = None;
        dispatch("zzz")
            .on("a", || Ok(()))
            .any(|| {
                fired = Some("any");
                Ok(())
            })
            .finish()
            .unwrap();
        assert_eq!(fired, Some("any"));
    }

    #[test]
    fn test_unmatched_chain_reports_false() {
        assert!(!dispatch("c").on("a", || Ok(())).finish().unwrap());
    }

    #[test]
    fn test_handler_error_is_returned() {
        let err = dispatch("a")
            .on("a", || Err(ParseError::new(3, ErrorReason::OutOfRange)))
            .any(|| panic!("must not run after a match"))
            .finish()
            .unwrap_err();
        assert_eq!(err.reason(), &ErrorReason::OutOfRange);
    }

    #[test]
    fn test_ignore_skips_nested_values() {
        let ctx = ConstBufferContext::new(br#"{"a":[{"b":[1,{}]},"s"],"c":{"d":null},"e":5}"#);
        let mut kept = Vec::new();
        parse_object(&ctx, |name, value| {
            if value.value_type() == ValueType::Number {
                kept.push(name);
            }
            ignore(&ctx)
        })
        .unwrap();
        assert_eq!(kept, ["e"]);
    }

    #[test]
    fn test_ignore_on_scalar_is_noop() {
        let ctx = ConstBufferContext::new(b"[1]");
        parse_array(&ctx, |_| ignore(&ctx)).unwrap();
    }

    #[test]
    fn test_dispatcher_counts_handlers() {
        let ctx = ConstBufferContext::new(br#"{"a":1,"a":2,"c":[],"x":{}}"#);
        let dispatcher = Dispatcher::new()
            .required("a", |t: &mut (i32, String), v, _| v.store_into(&mut t.0))
            .optional("b", |t: &mut (i32, String), v, _| v.store_into(&mut t.1))
            .ignored("c")
            .ignore_any();
        let mut run = dispatcher.start();
        let mut target = (0, String::new());
        parse_object(&ctx, |name, value| run.handle(name, value, &ctx, &mut target)).unwrap();
        run.finish(&ctx).unwrap();
        assert_eq!(target.0, 2);

        let mut seen = Vec::new();
        run.inspect(|info, count| seen.push((info.kind, info.field_name, count)));
        assert_eq!(
            seen,
            [
                (HandlerKind::Required, Some("a"), 2),
                (HandlerKind::Optional, Some("b"), 0),
                (HandlerKind::Ignored, Some("c"), 1),
                (HandlerKind::IgnoreAny, None, 1),
            ]
        );
    }
}
