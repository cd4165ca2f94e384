//! Sample application served by both transports
//!
//! ```text
//! /widgets        READ lists, CREATE adds, OPTIONS answers 204
//! /widgets/{id}   READ, UPDATE, DELETE, OPTIONS
//! ```
//!
//! `READ /widgets` accepts a `limit` flag.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wrap::prelude::*;

const MAX_NAME_LEN: usize = 64;

/// Root handler: routes the first segment
#[derive(Debug, Default)]
pub struct Api {
    widgets: Widgets,
}

impl Api {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Handler for Api {
    fn handle<R: Responder>(&self, ctx: &mut Ctx<R>) -> HandlerResult {
        match ctx.path().next() {
            "widgets" => {
                ctx.path_mut().increment();
                self.widgets.handle(ctx)
            }
            _ => Err(ctx.not_found().into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct WidgetInput {
    #[serde(default)]
    name: String,
}

impl WidgetInput {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let name = self.name.trim();
        if name.is_empty() {
            errors.add(["name"], "required");
        } else if name.chars().count() > MAX_NAME_LEN {
            errors.add(["name"], format!("must be at most {MAX_NAME_LEN} characters"));
        }
        errors
    }
}

/// In-memory widget store
#[derive(Debug, Default)]
pub struct Widgets {
    store: DashMap<Uuid, Widget>,
}

impl Handler for Widgets {
    fn handle<R: Responder>(&self, ctx: &mut Ctx<R>) -> HandlerResult {
        let segment = ctx.path().next().to_owned();
        if segment.is_empty() {
            // `/widgets//x`: the empty segment is not the end of the path
            if ctx.path().segments().len() > ctx.path().index() + 2 {
                return Err(ctx.not_found().into());
            }
            return ActionRoutes::new()
                .read(|ctx| self.list(ctx))
                .create(|ctx| self.create(ctx))
                .options(|ctx| ctx.no_content())
                .otherwise(|ctx| Err(ctx.method_not_allowed().into()))
                .run(ctx);
        }

        ctx.path_mut().increment();
        if !ctx.path().next().is_empty() {
            return Err(ctx.not_found().into());
        }
        let Ok(id) = Uuid::parse_str(&segment) else {
            return Err(ctx.not_found().into());
        };

        ActionRoutes::new()
            .read(|ctx| self.read(ctx, id))
            .update(|ctx| self.update(ctx, id))
            .delete(|ctx| self.delete(ctx, id))
            .options(|ctx| ctx.no_content())
            .run(ctx)
    }
}

impl Widgets {
    fn list<R: Responder>(&self, ctx: &mut Ctx<R>) -> HandlerResult {
        let limit = match ctx.request().flag("limit") {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| ctx.bad_request(format!("limit must be a number, got {raw:?}")))?,
            None => usize::MAX,
        };

        let mut widgets: Vec<Widget> = self.store.iter().map(|entry| entry.value().clone()).collect();
        widgets.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        widgets.truncate(limit);

        ctx.json(&widgets)
    }

    fn read<R: Responder>(&self, ctx: &mut Ctx<R>, id: Uuid) -> HandlerResult {
        let widget = self
            .store
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ctx.not_found())?;
        ctx.json(&widget)
    }

    fn create<R: Responder>(&self, ctx: &mut Ctx<R>) -> HandlerResult {
        let input = decode(ctx)?;

        let now = Utc::now();
        let widget = Widget {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            created_at: now,
            updated_at: now,
        };
        self.store.insert(widget.id, widget.clone());
        tracing::debug!(id = %widget.id, "widget created");

        ctx.response_mut().set_status(StatusCode::CREATED);
        ctx.json(&widget)
    }

    fn update<R: Responder>(&self, ctx: &mut Ctx<R>, id: Uuid) -> HandlerResult {
        let input = decode(ctx)?;

        let widget = {
            let mut entry = self.store.get_mut(&id).ok_or_else(|| ctx.not_found())?;
            entry.name = input.name.trim().to_string();
            entry.updated_at = Utc::now();
            entry.clone()
        };

        ctx.json(&widget)
    }

    fn delete<R: Responder>(&self, ctx: &mut Ctx<R>, id: Uuid) -> HandlerResult {
        if self.store.remove(&id).is_none() {
            return Err(ctx.not_found().into());
        }
        ctx.no_content()
    }
}

/// Decode and validate a widget body
fn decode<R: Responder>(ctx: &Ctx<R>) -> anyhow::Result<WidgetInput> {
    let input: WidgetInput = ctx
        .request()
        .bind()
        .map_err(|e| ctx.bad_request(format!("invalid widget: {e}")))?;

    let errors = input.validate();
    if !errors.is_empty() {
        return Err(ctx.unprocessable_entity(errors).into());
    }
    Ok(input)
}
