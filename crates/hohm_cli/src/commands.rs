//! Subcommand handlers.

use crate::{CalendarAction, Command, HouseholdAction, MemberAction, TaskAction};
use anyhow::{anyhow, bail, Context, Result};
use chrono::Local;
use hohm_core::{
    member_average_rating, member_points, parse_task_date, CalendarView, DayMarker,
    HouseholdDraft, HouseholdService, SqliteHouseholdRepository, SqliteSnapshotStore, Task,
    TaskId, POINTS_PER_COMPLETED_TASK,
};
use log::info;
use rusqlite::Connection;

const SHORT_ID_LEN: usize = 8;

pub fn run(conn: &Connection, session: &str, command: Command) -> Result<()> {
    let store = SqliteSnapshotStore::new(conn, session);
    match command {
        Command::Member { action } => member(store, action),
        Command::Task { action } => task(store, action),
        Command::Calendar { action } => calendar(store, action),
        Command::Household { action } => household(conn, store, action),
        Command::Reset => {
            let mut store = store;
            let removed = store.clear()?;
            info!("event=session_reset module=cli status=ok removed={removed}");
            println!("Cleared session `{session}`");
            Ok(())
        }
    }
}

fn load_draft(store: &mut SqliteSnapshotStore<'_>) -> Result<HouseholdDraft> {
    Ok(HouseholdDraft::load(store)?.unwrap_or_default())
}

fn member(mut store: SqliteSnapshotStore<'_>, action: MemberAction) -> Result<()> {
    match action {
        MemberAction::Add { name, email } => {
            let mut draft = load_draft(&mut store)?;
            let member = draft.add_member(&name, &email)?.clone();
            draft.save(&mut store)?;
            println!("Added {} <{}> {}", member.name, member.email, member.color);
        }
        MemberAction::List => {
            let draft = load_draft(&mut store)?;
            for member in &draft.members {
                let average = member_average_rating(&draft.tasks, &member.name)
                    .map(|avg| avg.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{} <{}> {} avg {} points {}",
                    member.name,
                    member.email,
                    member.color,
                    average,
                    member_points(&draft.tasks, &member.name)
                );
            }
        }
    }
    Ok(())
}

fn task(mut store: SqliteSnapshotStore<'_>, action: TaskAction) -> Result<()> {
    match action {
        TaskAction::Add {
            title,
            date,
            time,
            assigned_to,
        } => {
            let mut draft = load_draft(&mut store)?;
            draft.ensure_members()?;
            let task = draft.add_task(&title, &date, &time, &assigned_to)?.clone();
            draft.save(&mut store)?;
            println!("Added {}", task_line(&task));
        }
        TaskAction::List { date } => {
            let draft = load_draft(&mut store)?;
            let date = date.as_deref().map(parse_task_date).transpose()?;
            for task in draft
                .tasks
                .iter()
                .filter(|task| date.map_or(true, |date| task.date == date))
            {
                println!("{}", task_line(task));
            }
        }
        TaskAction::Complete { id } => {
            let mut view = CalendarView::open(store)?;
            let id = resolve_task_id(view.tasks(), &id)?;
            view.select_task(id)?;
            let outcome = view.toggle_completed()?;
            if outcome.just_completed {
                println!(
                    "🎉 Congratulations, your task is completed! We've added {POINTS_PER_COMPLETED_TASK}pts to your account!"
                );
            } else {
                println!("Marked as not completed");
            }
        }
        TaskAction::Rate { id, rating } => {
            let mut view = CalendarView::open(store)?;
            let id = resolve_task_id(view.tasks(), &id)?;
            view.select_task(id)?;
            let rating = view.set_rating(rating)?;
            println!("Rated {rating}");
        }
        TaskAction::Comment { id, text } => {
            let mut view = CalendarView::open(store)?;
            let id = resolve_task_id(view.tasks(), &id)?;
            view.select_task(id)?;
            match view.add_comment(&text)? {
                Some(comment) => {
                    let task = view
                        .selected_task()
                        .ok_or_else(|| anyhow!("task {id} disappeared"))?;
                    let recipient = view.assignee_email(task).unwrap_or("-");
                    println!(
                        "Comment added to \"{}\": {comment} (assignee {recipient})",
                        task.title
                    );
                }
                None => println!("Empty comment ignored"),
            }
        }
    }
    Ok(())
}

fn calendar(store: SqliteSnapshotStore<'_>, action: CalendarAction) -> Result<()> {
    let mut view =
        CalendarView::open(store).context("open calendar; add members and tasks first")?;
    match action {
        CalendarAction::Dates => {
            for date in view.task_dates() {
                println!("{date} {}", marker_text(view.day_marker(date)));
            }
        }
        CalendarAction::Day { date } => {
            let date = match date {
                Some(date) => parse_task_date(&date)?,
                None => Local::now().date_naive(),
            };
            let marker = view.day_marker(date);
            println!("{date} {}", marker_text(marker));
            for task in view.select_date(date) {
                println!("  {}", task_line(task));
            }
        }
        CalendarAction::Member { name } => {
            let color = view.member_color(&name).to_string();
            println!("{name} {color}");
            for task in view.select_member(&name) {
                println!("  {}", task_line(task));
            }
        }
        CalendarAction::Legend => {
            for entry in view.legend() {
                let average = entry
                    .average_rating
                    .map(|avg| format!("⭐ {avg}"))
                    .unwrap_or_default();
                println!("{} {} {} {}pts", entry.color, entry.name, average, entry.points);
            }
        }
    }
    Ok(())
}

fn household(
    conn: &Connection,
    mut store: SqliteSnapshotStore<'_>,
    action: HouseholdAction,
) -> Result<()> {
    let service = HouseholdService::new(SqliteHouseholdRepository::new(conn));
    match action {
        HouseholdAction::Create { name } => {
            let household = service.create_household(Some(&name))?;
            println!("Created household {} `{}`", household.id, household.name);
        }
        HouseholdAction::Show { id } => {
            let household = service.get_household(id)?;
            println!(
                "{} `{}` created {}",
                household.id,
                household.name,
                household.created_at.to_rfc3339()
            );
        }
        HouseholdAction::Commit { id } => {
            let draft = load_draft(&mut store)?;
            draft.ensure_tasks()?;
            let summary = service.commit_draft(id, &draft)?;
            println!(
                "Committed {} members and {} tasks to household {}",
                summary.members, summary.tasks, summary.household_id
            );
        }
        HouseholdAction::Checkout { id } => {
            let draft = service.load_draft(id)?;
            draft.save(&mut store)?;
            println!(
                "Loaded {} members and {} tasks into session `{}`",
                draft.members.len(),
                draft.tasks.len(),
                store.session_id()
            );
        }
    }
    Ok(())
}

fn marker_text(marker: DayMarker) -> &'static str {
    match marker {
        DayMarker::NoTasks => "no tasks",
        DayMarker::AllComplete => "✅ all done",
        DayMarker::SomeIncomplete => "📌 open tasks",
    }
}

fn short_id(id: TaskId) -> String {
    id.to_string().chars().take(SHORT_ID_LEN).collect()
}

fn task_line(task: &Task) -> String {
    let mut line = format!(
        "[{}] {} {} {} {} ({})",
        if task.completed { "x" } else { " " },
        short_id(task.id),
        task.date,
        task.time,
        task.title,
        task.assigned_to
    );
    if let Some(rating) = task.rating {
        line.push_str(&format!(" rated {rating}"));
    }
    if !task.comments.is_empty() {
        line.push_str(&format!(" comments {}", task.comments.len()));
    }
    line
}

/// Resolves a full task id or a unique prefix of one.
fn resolve_task_id(tasks: &[Task], id: &str) -> Result<TaskId> {
    let needle = id.trim().to_ascii_lowercase();
    if needle.is_empty() {
        bail!("task id is required");
    }
    let mut matches = tasks
        .iter()
        .filter(|task| task.id.to_string().starts_with(&needle));
    let first = matches
        .next()
        .ok_or_else(|| anyhow!("no task with id `{id}`"))?;
    if matches.next().is_some() {
        bail!("task id `{id}` is ambiguous");
    }
    Ok(first.id)
}
