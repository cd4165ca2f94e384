//! Action-keyed handler chain
//!
//! ```rust
//! use wrap::prelude::*;
//!
//! fn widgets<R: Responder>(ctx: &mut Ctx<R>) -> HandlerResult {
//!     ActionRoutes::new()
//!         .read(|ctx| ctx.json(&["gear", "sprocket"]))
//!         .delete(|ctx| ctx.no_content())
//!         .otherwise(|ctx| Err(ctx.method_not_allowed().into()))
//!         .run(ctx)
//! }
//! ```

use crate::{action::Action, context::Ctx, handler::HandlerResult, responder::Responder};

type Route<'a, R> = Box<dyn FnOnce(&mut Ctx<R>) -> HandlerResult + 'a>;

/// Routes registered per [`Action`], plus an optional fallback
///
/// [`ActionRoutes::run`] invokes the first route registered for the request's
/// action. Without a match it runs the `otherwise` branch, or returns a
/// method-not-allowed error if there is none.
pub struct ActionRoutes<'a, R> {
    routes: Vec<(Action, Route<'a, R>)>,
    otherwise: Option<Route<'a, R>>,
}

impl<'a, R: Responder> ActionRoutes<'a, R> {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            otherwise: None,
        }
    }

    /// Register `route` for `action`
    #[must_use]
    pub fn on<F>(mut self, action: Action, route: F) -> Self
    where
        F: FnOnce(&mut Ctx<R>) -> HandlerResult + 'a,
    {
        self.routes.push((action, Box::new(route)));
        self
    }

    #[must_use]
    pub fn create<F>(self, route: F) -> Self
    where
        F: FnOnce(&mut Ctx<R>) -> HandlerResult + 'a,
    {
        self.on(Action::Create, route)
    }

    #[must_use]
    pub fn read<F>(self, route: F) -> Self
    where
        F: FnOnce(&mut Ctx<R>) -> HandlerResult + 'a,
    {
        self.on(Action::Read, route)
    }

    #[must_use]
    pub fn update<F>(self, route: F) -> Self
    where
        F: FnOnce(&mut Ctx<R>) -> HandlerResult + 'a,
    {
        self.on(Action::Update, route)
    }

    #[must_use]
    pub fn delete<F>(self, route: F) -> Self
    where
        F: FnOnce(&mut Ctx<R>) -> HandlerResult + 'a,
    {
        self.on(Action::Delete, route)
    }

    #[must_use]
    pub fn options<F>(self, route: F) -> Self
    where
        F: FnOnce(&mut Ctx<R>) -> HandlerResult + 'a,
    {
        self.on(Action::Options, route)
    }

    /// Fallback for actions without a route, including [`Action::Invalid`]
    #[must_use]
    pub fn otherwise<F>(mut self, route: F) -> Self
    where
        F: FnOnce(&mut Ctx<R>) -> HandlerResult + 'a,
    {
        self.otherwise = Some(Box::new(route));
        self
    }

    /// Run the route matching the request's action
    pub fn run(self, ctx: &mut Ctx<R>) -> HandlerResult {
        let action = ctx.action();
        let matched = self
            .routes
            .into_iter()
            .find_map(|(candidate, route)| (candidate == action).then_some(route));

        match matched.or(self.otherwise) {
            Some(route) => route(ctx),
            None => Err(ctx.method_not_allowed().into()),
        }
    }
}

impl<R: Responder> Default for ActionRoutes<'_, R> {
    fn default() -> Self {
        Self::new()
    }
}
