use tracing::info;

use dolist_db::namespaces;
use dolist_types::api::{NamespacePatch, NewNamespace};
use dolist_types::models::Namespace;
use dolist_types::pagination::{Page, PaginatedResult};

use crate::context::Ctx;
use crate::error::{Result, non_empty};
use crate::hierarchy::{Resource, load_namespace};
use crate::permissions::{Action, check};

/// Creates a namespace owned by the doer.
pub fn create(ctx: &Ctx, input: NewNamespace) -> Result<Namespace> {
    non_empty("title", &input.title)?;

    let id = namespaces::insert(ctx.conn, &input.title, &input.description, ctx.doer.id)?;
    info!("Namespace {} created by user {}", id, ctx.doer.id);
    load_namespace(ctx.conn, id)
}

pub fn read_one(ctx: &Ctx, id: i64) -> Result<Namespace> {
    let namespace = load_namespace(ctx.conn, id)?;
    check(ctx.conn, ctx.doer, Resource::Namespace(id), Action::Read)?;
    Ok(namespace)
}

/// Namespaces the doer owns or was given access to, directly or via a team.
pub fn read_all(ctx: &Ctx, search: &str, page: Page) -> Result<PaginatedResult<Namespace>> {
    let (items, total) = namespaces::list_accessible(ctx.conn, ctx.doer.id, search, page)?;
    Ok(PaginatedResult { items, total, page })
}

pub fn update(ctx: &Ctx, id: i64, patch: NamespacePatch) -> Result<Namespace> {
    let mut namespace = load_namespace(ctx.conn, id)?;
    check(ctx.conn, ctx.doer, Resource::Namespace(id), Action::Update)?;

    patch.apply_to(&mut namespace);
    non_empty("title", &namespace.title)?;

    namespaces::update(ctx.conn, &namespace)?;
    info!("Namespace {} updated by user {}", id, ctx.doer.id);
    load_namespace(ctx.conn, id)
}

/// Deletes the namespace together with its lists, tasks and grants.
pub fn delete(ctx: &Ctx, id: i64) -> Result<()> {
    load_namespace(ctx.conn, id)?;
    check(ctx.conn, ctx.doer, Resource::Namespace(id), Action::Delete)?;

    namespaces::delete(ctx.conn, id)?;
    Ok(())
}
