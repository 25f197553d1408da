//! Teams and their memberships.
//!
//! Any user can create a team and becomes its first admin member. Team members
//! can read the team; only team admins can change it or its membership.

use tracing::{info, warn};

use dolist_db::{rights, teams, users};
use dolist_types::api::{NewTeam, TeamPatch};
use dolist_types::events::Notification;
use dolist_types::models::Team;
use dolist_types::pagination::{Page, PaginatedResult};
use dolist_types::rights::Subject;

use crate::context::Ctx;
use crate::error::{Error, Result, non_empty};
use crate::hierarchy::Resource;
use crate::permissions::{Action, check};

pub fn create(ctx: &Ctx, input: NewTeam) -> Result<Team> {
    non_empty("name", &input.name)?;

    let id = dolist_db::savepoint(ctx.conn, "create_team", |conn| -> Result<i64> {
        let id = teams::insert(conn, &input.name, &input.description, ctx.doer.id)?;
        teams::insert_member(conn, id, ctx.doer.id, true)?;
        Ok(id)
    })?;

    info!("Team {} created by user {}", id, ctx.doer.id);
    load(ctx, id)
}

pub fn read_one(ctx: &Ctx, id: i64) -> Result<Team> {
    let team = load(ctx, id)?;
    check(ctx.conn, ctx.doer, Resource::Team(id), Action::Read)?;
    Ok(team)
}

/// Teams the doer is a member of.
pub fn read_all(ctx: &Ctx, search: &str, page: Page) -> Result<PaginatedResult<Team>> {
    let (items, total) = teams::list_for_user(ctx.conn, ctx.doer.id, search, page)?;
    Ok(PaginatedResult { items, total, page })
}

pub fn update(ctx: &Ctx, id: i64, patch: TeamPatch) -> Result<Team> {
    let mut team = load(ctx, id)?;
    check(ctx.conn, ctx.doer, Resource::Team(id), Action::Update)?;

    patch.apply_to(&mut team);
    non_empty("name", &team.name)?;

    teams::update(ctx.conn, &team)?;
    info!("Team {} updated by user {}", id, ctx.doer.id);
    load(ctx, id)
}

/// Deletes the team and its memberships.
///
/// A team that still holds grants on namespaces or lists is not deleted:
/// those shares have to be revoked first, so no member loses access as a side
/// effect.
pub fn delete(ctx: &Ctx, id: i64) -> Result<()> {
    load(ctx, id)?;
    check(ctx.conn, ctx.doer, Resource::Team(id), Action::Delete)?;

    let grants = rights::count_for_subject(ctx.conn, Subject::Team(id))?;
    if grants > 0 {
        warn!("Refusing to delete team {}: it still holds {} grants", id, grants);
        return Err(Error::Conflict(format!(
            "team {id} still holds {grants} shares; revoke them first"
        )));
    }

    dolist_db::savepoint(ctx.conn, "delete_team", |conn| -> Result<usize> {
        Ok(teams::delete(conn, id)?)
    })?;

    info!("Team {} deleted by user {}", id, ctx.doer.id);
    Ok(())
}

pub fn add_member(ctx: &Ctx, team_id: i64, user_id: i64, admin: bool) -> Result<Team> {
    let team = load(ctx, team_id)?;
    check(ctx.conn, ctx.doer, Resource::Team(team_id), Action::Share)?;

    let user = users::get_by_id(ctx.conn, user_id)?.ok_or_else(|| Error::not_found("user", user_id))?;
    if team.member(user_id).is_some() {
        return Err(Error::Conflict(format!(
            "user {user_id} is already a member of team {team_id}"
        )));
    }

    teams::insert_member(ctx.conn, team_id, user_id, admin)?;
    info!("User {} added to team {} by user {}", user_id, team_id, ctx.doer.id);

    if user.id != ctx.doer.id {
        let notification = Notification::TeamMemberAdded {
            team_id,
            team_name: team.name.clone(),
            doer: ctx.doer.username.clone(),
        };
        if let Err(e) = ctx.notifier.notify(ctx.conn, &user, &notification) {
            warn!("Could not notify user {} about team {}: {}", user.id, team_id, e);
        }
    }

    load(ctx, team_id)
}

/// Removes a member. The last member and the last admin cannot be removed.
pub fn remove_member(ctx: &Ctx, team_id: i64, user_id: i64) -> Result<Team> {
    let team = load(ctx, team_id)?;
    check(ctx.conn, ctx.doer, Resource::Team(team_id), Action::Share)?;

    let member = team
        .member(user_id)
        .ok_or_else(|| Error::not_found("team member", user_id))?;

    if team.members.len() == 1 {
        return Err(Error::Conflict(format!(
            "cannot remove the last member of team {team_id}"
        )));
    }
    if member.admin && admin_count(&team) == 1 {
        return Err(Error::Conflict(format!(
            "cannot remove the last admin of team {team_id}"
        )));
    }

    teams::delete_member(ctx.conn, team_id, user_id)?;
    info!("User {} removed from team {} by user {}", user_id, team_id, ctx.doer.id);
    load(ctx, team_id)
}

pub fn set_member_admin(ctx: &Ctx, team_id: i64, user_id: i64, admin: bool) -> Result<Team> {
    let team = load(ctx, team_id)?;
    check(ctx.conn, ctx.doer, Resource::Team(team_id), Action::Share)?;

    let member = team
        .member(user_id)
        .ok_or_else(|| Error::not_found("team member", user_id))?;

    if member.admin && !admin && admin_count(&team) == 1 {
        return Err(Error::Conflict(format!(
            "cannot demote the last admin of team {team_id}"
        )));
    }

    teams::set_member_admin(ctx.conn, team_id, user_id, admin)?;
    load(ctx, team_id)
}

fn admin_count(team: &Team) -> usize {
    team.members.iter().filter(|m| m.admin).count()
}

fn load(ctx: &Ctx, id: i64) -> Result<Team> {
    teams::get(ctx.conn, id)?.ok_or_else(|| Error::not_found("team", id))
}
