use chrono::Utc;
use tracing::{info, warn};

use dolist_db::{tasks, users};
use dolist_types::api::{NewTask, TaskPatch};
use dolist_types::events::Notification;
use dolist_types::models::Task;
use dolist_types::pagination::{Page, PaginatedResult};

use crate::context::Ctx;
use crate::error::{Error, Result, non_empty};
use crate::hierarchy::{Resource, load_list};
use crate::permissions::{Action, check};

/// Creates an open task in `list_id`. Needs write access to the list.
pub fn create(ctx: &Ctx, list_id: i64, input: NewTask) -> Result<Task> {
    non_empty("text", &input.text)?;
    load_list(ctx.conn, list_id)?;
    check(ctx.conn, ctx.doer, Resource::List(list_id), Action::Create)?;

    let now = Utc::now();
    let task = Task {
        id: 0,
        text: input.text,
        description: input.description,
        done: false,
        due_date: input.due_date,
        reminder: input.reminder,
        list_id,
        created_by_id: ctx.doer.id,
        created: now,
        updated: now,
    };

    let id = tasks::insert(ctx.conn, &task)?;
    info!("Task {} created in list {} by user {}", id, list_id, ctx.doer.id);
    load(ctx, id)
}

pub fn read_one(ctx: &Ctx, id: i64) -> Result<Task> {
    let task = load(ctx, id)?;
    check(ctx.conn, ctx.doer, Resource::Task(id), Action::Read)?;
    Ok(task)
}

/// Tasks of one list, filtered by text.
pub fn read_all(ctx: &Ctx, list_id: i64, search: &str, page: Page) -> Result<PaginatedResult<Task>> {
    load_list(ctx.conn, list_id)?;
    check(ctx.conn, ctx.doer, Resource::List(list_id), Action::Read)?;

    let (items, total) = tasks::list_for_list(ctx.conn, list_id, search, page)?;
    Ok(PaginatedResult { items, total, page })
}

/// Applies a partial update.
///
/// Fields absent from the patch keep their stored value; `done: false` is an
/// explicit reopen. When someone other than the creator marks the task done,
/// the creator gets a feed entry.
pub fn update(ctx: &Ctx, id: i64, patch: TaskPatch) -> Result<Task> {
    let mut task = load(ctx, id)?;
    check(ctx.conn, ctx.doer, Resource::Task(id), Action::Update)?;

    let was_done = task.done;
    patch.apply_to(&mut task);
    non_empty("text", &task.text)?;

    tasks::update(ctx.conn, &task)?;
    info!("Task {} updated by user {}", id, ctx.doer.id);

    if !was_done && task.done && task.created_by_id != ctx.doer.id {
        notify_creator(ctx, &task);
    }

    load(ctx, id)
}

pub fn delete(ctx: &Ctx, id: i64) -> Result<()> {
    load(ctx, id)?;
    check(ctx.conn, ctx.doer, Resource::Task(id), Action::Delete)?;

    tasks::delete(ctx.conn, id)?;
    info!("Task {} deleted by user {}", id, ctx.doer.id);
    Ok(())
}

fn notify_creator(ctx: &Ctx, task: &Task) {
    let creator = match users::get_by_id(ctx.conn, task.created_by_id) {
        Ok(Some(user)) => user,
        Ok(None) => return,
        Err(e) => {
            warn!("Could not load creator of task {}: {}", task.id, e);
            return;
        }
    };

    let notification = Notification::TaskDone {
        task_id: task.id,
        task_text: task.text.clone(),
        list_id: task.list_id,
        doer: ctx.doer.username.clone(),
    };
    if let Err(e) = ctx.notifier.notify(ctx.conn, &creator, &notification) {
        warn!("Could not notify user {} about task {}: {}", creator.id, task.id, e);
    }
}

fn load(ctx: &Ctx, id: i64) -> Result<Task> {
    tasks::get(ctx.conn, id)?.ok_or_else(|| Error::not_found("task", id))
}
