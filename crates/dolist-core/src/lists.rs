use tracing::info;

use dolist_db::lists;
use dolist_types::api::{ListPatch, NewList};
use dolist_types::models::List;
use dolist_types::pagination::{Page, PaginatedResult};

use crate::context::Ctx;
use crate::error::{Result, non_empty};
use crate::hierarchy::{Resource, load_list, load_namespace};
use crate::permissions::{Action, check};

/// Creates a list inside `namespace_id`. Needs write access to the namespace.
pub fn create(ctx: &Ctx, namespace_id: i64, input: NewList) -> Result<List> {
    non_empty("title", &input.title)?;
    load_namespace(ctx.conn, namespace_id)?;
    check(ctx.conn, ctx.doer, Resource::Namespace(namespace_id), Action::Create)?;

    let id = lists::insert(
        ctx.conn,
        &input.title,
        &input.description,
        namespace_id,
        ctx.doer.id,
    )?;
    info!(
        "List {} created in namespace {} by user {}",
        id, namespace_id, ctx.doer.id
    );
    load_list(ctx.conn, id)
}

pub fn read_one(ctx: &Ctx, id: i64) -> Result<List> {
    let list = load_list(ctx.conn, id)?;
    check(ctx.conn, ctx.doer, Resource::List(id), Action::Read)?;
    Ok(list)
}

pub fn read_all(ctx: &Ctx, search: &str, page: Page) -> Result<PaginatedResult<List>> {
    let (items, total) = lists::list_accessible(ctx.conn, ctx.doer.id, search, page)?;
    Ok(PaginatedResult { items, total, page })
}

pub fn update(ctx: &Ctx, id: i64, patch: ListPatch) -> Result<List> {
    let mut list = load_list(ctx.conn, id)?;
    check(ctx.conn, ctx.doer, Resource::List(id), Action::Update)?;

    patch.apply_to(&mut list);
    non_empty("title", &list.title)?;

    lists::update(ctx.conn, &list)?;
    info!("List {} updated by user {}", id, ctx.doer.id);
    load_list(ctx.conn, id)
}

pub fn delete(ctx: &Ctx, id: i64) -> Result<()> {
    load_list(ctx.conn, id)?;
    check(ctx.conn, ctx.doer, Resource::List(id), Action::Delete)?;

    lists::delete(ctx.conn, id)?;
    Ok(())
}
