use std::io::{BufRead, Write};
use std::path::Path;

use recovery_core::models::completion::CompletionRecord;
use recovery_core::models::form::FormDefinition;
use recovery_core::models::progress::ProgressStatus;
use recovery_core::models::task::Protocol;
use recovery_forms::error::FormError;
use recovery_forms::library;
use recovery_forms::{FormSession, TurnAction};
use recovery_schedule::{classify, frequency, ProtocolTimeline};
use recovery_storage::error::StorageError;
use recovery_storage::{CompletionRecordSource, FileStore, TaskFormStore};

use crate::conversation::{apply_turn, refusal_reply, Outcome};

/// How far past the current day `today` lists upcoming forms.
const FORM_LOOKAHEAD_DAYS: i32 = 6;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum DocumentKind {
    Protocol,
    Form,
}

pub fn import(store: &FileStore, kind: DocumentKind, path: &Path) -> eyre::Result<()> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read {}: {e}", path.display()))?;
    match kind {
        DocumentKind::Protocol => {
            let protocol: Protocol = serde_json::from_str(&contents)?;
            store.save_protocol(&protocol)?;
            println!("imported protocol '{}' ({} tasks)", protocol.id, protocol.tasks.len());
        }
        DocumentKind::Form => {
            let form: FormDefinition = serde_json::from_str(&contents)?;
            store.save_form_definition(&form)?;
            println!("imported form '{}' ({} questions)", form.id, form.question_count());
        }
    }
    Ok(())
}

pub fn list(store: &FileStore) -> eyre::Result<()> {
    println!("Protocols:");
    for id in store.list_protocol_ids()? {
        println!("  {id}");
    }
    println!("Forms:");
    for id in store.list_form_ids()? {
        println!("  {id}");
    }
    for form in library::all_forms() {
        println!("  {} (built-in: {})", form.id(), form.name());
    }
    Ok(())
}

/// Explicit `--day` wins; otherwise count days from the surgery date to today.
pub fn resolve_day(day: Option<i32>, surgery_date: Option<jiff::civil::Date>) -> eyre::Result<i32> {
    match (day, surgery_date) {
        (Some(day), _) => Ok(day),
        (None, Some(anchor)) => {
            let today = jiff::Zoned::now().date();
            Ok(ProtocolTimeline::day_for_date(anchor, today)?)
        }
        (None, None) => Err(eyre::eyre!("pass --day or --surgery-date")),
    }
}

pub fn today(
    store: &FileStore,
    patient_id: &str,
    protocol_id: &str,
    day: i32,
    json: bool,
) -> eyre::Result<()> {
    let timeline = ProtocolTimeline::from_protocol(&store.load_protocol(protocol_id)?)?;
    let records = store.get_completion_records(patient_id, protocol_id)?;
    let view = classify(&timeline, &records, day)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("{} (day {})", view.day_label, view.day);
    for (heading, tasks) in [
        ("Due today", &view.due_today),
        ("Upcoming", &view.upcoming),
        ("Completed", &view.completed),
    ] {
        println!("{heading}:");
        if tasks.is_empty() {
            println!("  (none)");
        }
        for task in tasks {
            let marker = if task.required { "*" } else { " " };
            println!("  {marker} {} [{}]", task.title, task.id);
        }
    }
    println!(
        "Required tasks complete: {}%",
        view.required_completion_percentage()
    );

    let week_end = day.saturating_add(FORM_LOOKAHEAD_DAYS).min(timeline.timeline_end());
    let forms = timeline.forms_in_window(day, week_end)?;
    if !forms.is_empty() {
        println!("Forms through {}:", ProtocolTimeline::day_label(week_end));
        for entry in forms {
            println!(
                "  {} [{}] from {}",
                entry.task.title,
                entry.task.form_ref.as_deref().unwrap_or_default(),
                ProtocolTimeline::day_label(entry.first_day)
            );
        }
    }
    Ok(())
}

pub fn days(
    store: &FileStore,
    protocol_id: &str,
    task_id: Option<&str>,
    surgery_date: Option<jiff::civil::Date>,
) -> eyre::Result<()> {
    let timeline = ProtocolTimeline::from_protocol(&store.load_protocol(protocol_id)?)?;

    if let Some(task_id) = task_id {
        let task = timeline
            .task(task_id)
            .ok_or_else(|| eyre::eyre!("protocol '{protocol_id}' has no task '{task_id}'"))?;
        let active = frequency::active_days(
            &task.schedule,
            timeline.timeline_start(),
            timeline.timeline_end(),
        );
        println!("{} ({} days)", task.title, active.len());
        for day in active {
            print_day(day, surgery_date, &task.title)?;
        }
        return Ok(());
    }

    for day in timeline.days_with_tasks() {
        let titles: Vec<&str> = timeline
            .tasks_for_day(day)?
            .into_iter()
            .map(|t| t.title.as_str())
            .collect();
        print_day(day, surgery_date, &titles.join(", "))?;
    }
    Ok(())
}

fn print_day(day: i32, surgery_date: Option<jiff::civil::Date>, text: &str) -> eyre::Result<()> {
    let label = ProtocolTimeline::day_label(day);
    match surgery_date {
        Some(anchor) => {
            let date = ProtocolTimeline::date_for_day(anchor, day)?;
            println!("{date}  {label:<12} {text}");
        }
        None => println!("{label:<12} {text}"),
    }
    Ok(())
}

pub fn complete(
    store: &FileStore,
    patient_id: &str,
    protocol_id: &str,
    task_id: &str,
) -> eyre::Result<()> {
    let protocol = store.load_protocol(protocol_id)?;
    if !protocol.tasks.iter().any(|t| t.id == task_id) {
        return Err(eyre::eyre!("protocol '{protocol_id}' has no task '{task_id}'"));
    }
    store.record_completion(
        patient_id,
        protocol_id,
        CompletionRecord {
            task_id: task_id.to_string(),
            status: ProgressStatus::Completed,
            completed_at: Some(jiff::Timestamp::now()),
        },
    )?;
    println!("marked '{task_id}' complete");
    Ok(())
}

/// Stored definition first, then the built-in library.
fn load_form(store: &FileStore, form_id: &str) -> eyre::Result<FormDefinition> {
    match store.load_form_definition(form_id) {
        Ok(form) => Ok(form),
        Err(StorageError::NotFound { .. }) => library::get_form(form_id)
            .map(|f| f.definition().clone())
            .ok_or_else(|| eyre::eyre!("no form named '{form_id}'")),
        Err(e) => Err(e.into()),
    }
}

pub fn run_form(
    store: &FileStore,
    patient_id: &str,
    form_id: &str,
    instance: &str,
    patient_name: Option<&str>,
    link: Option<(String, String)>,
) -> eyre::Result<()> {
    let session = FormSession::from_definition(&load_form(store, form_id)?);
    let form = session.form();
    println!("{}", form.intro_message);

    let progress = match store.load_patient_form_progress(patient_id, instance)? {
        Some((progress, _)) => progress,
        None => session.new_progress(patient_id, instance),
    };
    if progress.is_completed() {
        println!("This form has already been completed.");
        return Ok(());
    }
    if let Some(prompt) = session.current_prompt(&progress, patient_name) {
        println!("\n{prompt}");
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line?;

        match apply_turn(store, &session, patient_id, instance, &line, patient_name)? {
            Outcome::Accepted(turn) => {
                println!("\n[{}%] {}", turn.completion_percentage, turn.reply);
                if turn.progress.is_completed() {
                    if let Some((protocol_id, task_id)) = &link {
                        complete(store, patient_id, protocol_id, task_id)?;
                    }
                    break;
                }
                if turn.action == TurnAction::Paused {
                    break;
                }
            }
            Outcome::Refused {
                error: error @ FormError::AlreadyCompleted { .. },
                ..
            } => {
                println!("{error}");
                break;
            }
            Outcome::Refused { error, progress } => {
                println!("\n{}", refusal_reply(&session, &error, &progress, patient_name));
            }
        }
    }

    println!("instance: {instance}");
    Ok(())
}
