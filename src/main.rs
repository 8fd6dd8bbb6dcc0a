mod app;
mod cli;
mod completions;
mod config;
mod db;
mod domain;
mod entity_id;
mod form;
mod gate;
mod prompt;
mod render;
mod storage;
mod store;
mod ui;

use std::io;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppError, Command};
use cli::{
    Commands, LogCommands, LogFields, PasswordCommands, PointFields, PointsCommands, TaskCommands,
    TaskFields,
};
use config::Config;
use domain::log_entry::{LogDraft, LogEntry};
use domain::point::{PointDraft, PointEntry};
use domain::task::Task;
use form::{Form, Interaction};
use gate::GateState;
use prompt::TerminalPrompt;
use render::{ViewKind, ViewUpdate};

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CLASSBOARD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(io::stderr))
        .init();
}

fn print_json(value: &impl serde::Serialize) -> Result<(), AppError> {
    let text = serde_json::to_string_pretty(value).map_err(io::Error::from)?;
    println!("{text}");
    Ok(())
}

fn run() -> Result<(), AppError> {
    use clap::Parser;

    let cli = cli::Cli::parse();
    if let Commands::Completions(args) = &cli.command {
        completions::generate_completions(args.shell, &mut io::stdout().lock());
        return Ok(());
    }

    let config = Config::load(&cli.config)?;
    let mut app = App::open(&cli.db)?;
    app.subscribe(Box::new(|update: &ViewUpdate| {
        tracing::debug!(view = %update.kind(), "view refreshed");
    }));
    if let Some(password) = cli.password {
        if app.gate_state() == GateState::Gated {
            app.dispatch(Command::Unlock { password }, &mut quiet_prompt())?;
        }
    }

    match cli.command {
        Commands::Task(args) => run_task(&mut app, &config, args.command),
        Commands::Log(args) => run_log(&mut app, &config, args.command),
        Commands::Points(args) => run_points(&mut app, &config, args.command),
        Commands::Password(args) => match args.command {
            PasswordCommands::Set(set) => {
                let outcome = app.dispatch(
                    Command::SetCredential {
                        password: set.new_password,
                        confirmation: set.confirm,
                    },
                    &mut quiet_prompt(),
                )?;
                ui::print_outcome(&outcome, config.color);
                Ok(())
            }
        },
        Commands::View(args) => show(&app, &config, args.view, args.json),
        Commands::Completions(_) => Ok(()),
    }
}

fn quiet_prompt() -> TerminalPrompt<io::StdinLock<'static>, io::Stderr> {
    TerminalPrompt::from_stdio(false, None)
}

fn show(app: &App, config: &Config, kind: ViewKind, json: bool) -> Result<(), AppError> {
    let update = app.view(kind)?;
    if json {
        return print_json(&update);
    }
    ui::print_view(&update, config.color);
    Ok(())
}

fn apply(
    app: &mut App,
    config: &Config,
    command: Command,
    prompt: &mut dyn Interaction,
) -> Result<(), AppError> {
    let outcome = app.dispatch(command, prompt)?;
    ui::print_outcome(&outcome, config.color);
    Ok(())
}

fn run_task(app: &mut App, config: &Config, command: TaskCommands) -> Result<(), AppError> {
    match command {
        TaskCommands::Add(args) => {
            let mut form = Form::<Task>::open_create(&config.form_defaults());
            form.draft.title = args.title;
            apply_task_fields(&mut form, args.fields)?;
            let command = Command::SubmitTask {
                editing: None,
                draft: form.draft,
            };
            apply(app, config, command, &mut quiet_prompt())
        }
        TaskCommands::Edit(args) => {
            if args.title.is_none() && !args.fields.has_changes() {
                return Err(AppError::InvalidArgument(
                    "task edit requires at least one field to change".to_string(),
                ));
            }
            let mut form = app.edit_task_form(&args.id)?;
            if let Some(title) = args.title {
                form.draft.title = title;
            }
            apply_task_fields(&mut form, args.fields)?;
            let command = Command::SubmitTask {
                editing: Some(args.id),
                draft: form.draft,
            };
            apply(app, config, command, &mut quiet_prompt())
        }
        TaskCommands::Rm(args) => {
            let mut prompt = TerminalPrompt::from_stdio(args.yes, None);
            apply(app, config, Command::DeleteTask { id: args.id }, &mut prompt)
        }
        TaskCommands::Move(args) => {
            let mut prompt = TerminalPrompt::from_stdio(false, args.reason);
            let command = Command::DropTask {
                id: args.id,
                status: args.status,
            };
            apply(app, config, command, &mut prompt).map_err(|err| match err {
                AppError::Validation(validation) if validation.has_field("cancel_reason") => {
                    AppError::InvalidArgument(format!(
                        "{validation}; pass --reason when not running interactively"
                    ))
                }
                other => other,
            })
        }
        TaskCommands::Ls(args) => show(app, config, ViewKind::Board, args.json),
    }
}

fn apply_task_fields(form: &mut Form<Task>, fields: TaskFields) -> Result<(), AppError> {
    if let Some(status) = fields.status {
        form.set_status(status);
    }
    let draft = &mut form.draft;
    if let Some(assignee) = fields.assignee {
        draft.assignee = assignee;
    }
    if let Some(due_date) = fields.due_date {
        draft.due_date = due_date;
    }
    if let Some(priority) = fields.priority {
        draft.priority = priority;
    }
    if let Some(description) = fields.description {
        draft.description = description;
    }
    if !fields.attachments.is_empty() {
        draft.attachments = fields.attachments;
    }
    if let Some(reason) = fields.reason {
        if !form.reason_visible() {
            return Err(AppError::InvalidArgument(
                "--reason only applies to cancelled tasks".to_string(),
            ));
        }
        form.draft.cancel_reason = reason;
    }
    Ok(())
}

fn run_log(app: &mut App, config: &Config, command: LogCommands) -> Result<(), AppError> {
    match command {
        LogCommands::Add(args) => {
            let mut form = Form::<LogEntry>::open_create(&config.form_defaults());
            form.draft.description = args.description;
            apply_log_fields(&mut form.draft, args.fields);
            let command = Command::SubmitLog {
                editing: None,
                draft: form.draft,
            };
            apply(app, config, command, &mut quiet_prompt())
        }
        LogCommands::Edit(args) => {
            if args.description.is_none() && !args.fields.has_changes() {
                return Err(AppError::InvalidArgument(
                    "log edit requires at least one field to change".to_string(),
                ));
            }
            let mut form = app.edit_log_form(&args.id)?;
            if let Some(description) = args.description {
                form.draft.description = description;
            }
            apply_log_fields(&mut form.draft, args.fields);
            let command = Command::SubmitLog {
                editing: Some(args.id),
                draft: form.draft,
            };
            apply(app, config, command, &mut quiet_prompt())
        }
        LogCommands::Rm(args) => {
            let mut prompt = TerminalPrompt::from_stdio(args.yes, None);
            apply(app, config, Command::DeleteLog { id: args.id }, &mut prompt)
        }
        LogCommands::Ls(args) => show(app, config, ViewKind::Log, args.json),
    }
}

fn apply_log_fields(draft: &mut LogDraft, fields: LogFields) {
    let LogFields {
        date,
        assignee,
        category,
        link,
        status,
        notes,
    } = fields;
    for (slot, value) in [
        (&mut draft.date, date),
        (&mut draft.assignee, assignee),
        (&mut draft.category, category),
        (&mut draft.link, link),
        (&mut draft.status, status),
        (&mut draft.notes, notes),
    ] {
        if let Some(value) = value {
            *slot = value;
        }
    }
}

fn run_points(app: &mut App, config: &Config, command: PointsCommands) -> Result<(), AppError> {
    match command {
        PointsCommands::Add(fields) => {
            let mut form = Form::<PointEntry>::open_create(&config.form_defaults());
            apply_point_fields(&mut form.draft, fields);
            let command = Command::SubmitPoint {
                editing: None,
                draft: form.draft,
            };
            apply(app, config, command, &mut quiet_prompt())
        }
        PointsCommands::Edit(args) => {
            if !args.fields.has_changes() {
                return Err(AppError::InvalidArgument(
                    "points edit requires at least one field to change".to_string(),
                ));
            }
            let mut form = app.edit_point_form(&args.id)?;
            apply_point_fields(&mut form.draft, args.fields);
            let command = Command::SubmitPoint {
                editing: Some(args.id),
                draft: form.draft,
            };
            apply(app, config, command, &mut quiet_prompt())
        }
        PointsCommands::Rm(args) => {
            let mut prompt = TerminalPrompt::from_stdio(args.yes, None);
            apply(app, config, Command::DeletePoint { id: args.id }, &mut prompt)
        }
        PointsCommands::Ls(args) => show(app, config, ViewKind::Settings, args.json),
    }
}

fn apply_point_fields(draft: &mut PointDraft, fields: PointFields) {
    let PointFields {
        date,
        name,
        event,
        change,
        reason,
        confirmed_by,
    } = fields;
    for (slot, value) in [
        (&mut draft.date, date),
        (&mut draft.name, name),
        (&mut draft.event, event),
        (&mut draft.change, change),
        (&mut draft.reason, reason),
        (&mut draft.confirmed_by, confirmed_by),
    ] {
        if let Some(value) = value {
            *slot = value;
        }
    }
}
