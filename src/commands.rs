//! Dispatch of parsed CLI commands onto a [`ReviewDesk`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::info;

use crate::cli::{Command, DecisionArg, EntityArg};
use crate::config::EditorialConfig;
use crate::desk::{ReviewDesk, WatchOptions};
use crate::error::{EditorialError, RequiredField, WorkflowError};
use crate::service::{InMemoryWorkflowService, StoreSnapshot, WorkflowService};
use crate::ui::{Spinner, Terminal};
use crate::workflow::{Actor, Decision, FileUpload, Role};

async fn with_spinner<T>(message: &str, work: impl Future<Output = T>) -> T {
    let spinner = Spinner::start(message);
    let out = work.await;
    spinner.finish();
    out
}

/// Runs one command as the desk's actor. `Seed` and `Demo` are handled by
/// the caller since they need a concrete store.
pub async fn execute<S: WorkflowService>(
    desk: &ReviewDesk<S>,
    command: Command,
    config: &EditorialConfig,
    term: &Terminal,
) -> Result<(), EditorialError> {
    match command {
        Command::Show { kind, id } => {
            let editors = desk.service().editors().await?;
            match kind {
                EntityArg::Manuscript => term.print_manuscript(&desk.manuscript(id).await?, &editors),
                EntityArg::Abstract => {
                    term.print_abstract(&desk.conference_abstract(id).await?, &editors)
                }
            }
        }
        Command::Timeline { kind, id } => {
            let events = match kind {
                EntityArg::Manuscript => desk.manuscript_timeline(id).await?.1,
                EntityArg::Abstract => desk.abstract_timeline(id).await?.1,
            };
            term.print_timeline(&events);
        }
        Command::Actions { kind, id } => {
            let actions: Vec<&str> = match kind {
                EntityArg::Manuscript => desk
                    .manuscript_actions(id)
                    .await?
                    .into_iter()
                    .map(|a| a.describe())
                    .collect(),
                EntityArg::Abstract => desk
                    .abstract_actions(id)
                    .await?
                    .into_iter()
                    .map(|a| a.describe())
                    .collect(),
            };
            term.print_actions(&actions);
        }
        Command::Assigned { editor_id } => {
            let editor_id = editor_id.unwrap_or(desk.actor().id);
            term.print_assignments(&desk.assignments_for(editor_id).await?);
        }
        Command::Watch {
            kind,
            id,
            interval_ms,
            max_polls,
        } => {
            let mut options =
                WatchOptions::every(Duration::from_millis(interval_ms.unwrap_or(config.poll_interval_ms)));
            if let Some(n) = max_polls {
                options = options.max_polls(n);
            }
            let editors = desk.service().editors().await?;
            match kind {
                EntityArg::Manuscript => {
                    desk.watch_manuscript(id, options, |m| term.print_manuscript(m, &editors))
                        .await?;
                }
                EntityArg::Abstract => {
                    desk.watch_abstract(id, options, |a| term.print_abstract(a, &editors))
                        .await?;
                }
            }
        }
        Command::AssignEditor {
            kind,
            id,
            editor_id,
        } => match kind {
            EntityArg::Manuscript => {
                let m = with_spinner("Assigning editor...", desk.assign_editor(id, editor_id)).await?;
                term.success(&format!("{} is now {}", m.manuscript_id, m.status));
            }
            EntityArg::Abstract => {
                let a = with_spinner("Assigning editor...", desk.assign_abstract_editor(id, editor_id))
                    .await?;
                term.success(&format!("abstract #{} is now {}", a.id, a.status));
            }
        },
        Command::AssignConferenceEditor { id, editor_id } => {
            let a = with_spinner(
                "Assigning conference editor...",
                desk.assign_conference_editor(id, editor_id),
            )
            .await?;
            term.success(&format!("abstract #{} is now {}", a.id, a.status));
        }
        Command::Review {
            kind,
            id,
            decision,
            comment,
        } => match kind {
            EntityArg::Manuscript => {
                let decision =
                    decision.ok_or(WorkflowError::MissingRequiredField(RequiredField::Decision))?;
                let m = with_spinner(
                    "Submitting review...",
                    desk.editor_review(id, decision.into(), &comment),
                )
                .await?;
                term.success(&format!("{} is now {}", m.manuscript_id, m.status));
            }
            EntityArg::Abstract => {
                let a = if decision == Some(DecisionArg::Reject) {
                    with_spinner("Rejecting abstract...", desk.reject_abstract(id, &comment)).await?
                } else if desk.actor().role == Role::ConferenceEditor {
                    with_spinner(
                        "Submitting review...",
                        desk.conference_editor_review(id, &comment),
                    )
                    .await?
                } else {
                    with_spinner("Submitting review...", desk.abstract_editor_review(id, &comment))
                        .await?
                };
                term.success(&format!("abstract #{} is now {}", a.id, a.status));
            }
        },
        Command::Reject { id, comment } => {
            let a = with_spinner("Rejecting abstract...", desk.reject_abstract(id, &comment)).await?;
            term.success(&format!("abstract #{} is now {}", a.id, a.status));
        }
        Command::Decide {
            kind,
            id,
            decision,
            comment,
        } => match kind {
            EntityArg::Manuscript => {
                let m = with_spinner(
                    "Recording final decision...",
                    desk.admin_final_decision(id, decision.into(), &comment),
                )
                .await?;
                term.success(&format!("{} is now {}", m.manuscript_id, m.status));
            }
            EntityArg::Abstract => {
                let a = with_spinner(
                    "Recording final decision...",
                    desk.abstract_final_decision(id, decision.into(), &comment),
                )
                .await?;
                term.success(&format!("abstract #{} is now {}", a.id, a.status));
            }
        },
        Command::RequestCopyright { id } => {
            let m = with_spinner("Requesting copyright form...", desk.request_copyright(id)).await?;
            term.success(&format!("{} is now {}", m.manuscript_id, m.status));
        }
        Command::ReceiveCopyright { id, file } => {
            let m = with_spinner("Recording copyright form...", desk.receive_copyright(id, &file))
                .await?;
            term.success(&format!("{} is now {}", m.manuscript_id, m.status));
        }
        Command::SubmitFullPaper { id, files } => {
            let uploads = files.into_iter().map(FileUpload::named).collect();
            let a = with_spinner("Uploading full paper...", desk.submit_full_paper(id, uploads))
                .await?;
            term.success(&format!(
                "abstract #{} has {} full paper file(s)",
                a.id,
                a.full_paper_files.len()
            ));
        }
        Command::Seed | Command::Demo => {
            return Err(EditorialError::Config(
                "seed and demo are not dispatched through a remote desk".into(),
            ));
        }
    }
    Ok(())
}

/// Walks both review processes end to end on the fixture store, printing
/// each step and the resulting timelines.
pub async fn run_demo(term: &Terminal) -> Result<(), EditorialError> {
    let store = Arc::new(InMemoryWorkflowService::new(StoreSnapshot::demo(Utc::now())));
    let admin = ReviewDesk::new(Arc::clone(&store), Actor::admin(1));
    let editor = ReviewDesk::new(Arc::clone(&store), Actor::editor(3));
    let conference_editor = ReviewDesk::new(Arc::clone(&store), Actor::conference_editor(9));
    let manuscript_author = ReviewDesk::new(Arc::clone(&store), Actor::author(40));
    let abstract_author = ReviewDesk::new(Arc::clone(&store), Actor::author(50));
    let editors = store.editors().await?;

    info!("running manuscript demo");
    println!("{}", console::style("Manuscript review").bold());
    // An author may not assign editors; the guard says why.
    if let Err(err) = manuscript_author.assign_editor(1, 3).await {
        term.error(&err);
    }
    admin.assign_editor(1, 3).await?;
    term.success("admin assigned Dr. Ana Lima");
    editor
        .editor_review(1, Decision::Accept, "Solid methodology.")
        .await?;
    term.success("editor accepted");
    if let Err(err) = admin.admin_final_decision(1, Decision::Accept, "   ").await {
        term.error(&err);
    }
    admin
        .admin_final_decision(1, Decision::Accept, "Welcome to the issue.")
        .await?;
    term.success("admin accepted");
    admin.request_copyright(1).await?;
    let m = manuscript_author
        .receive_copyright(1, "copyright-MS-2024-001.pdf")
        .await?;
    term.print_manuscript(&m, &editors);
    term.print_timeline(&admin.manuscript_timeline(1).await?.1);

    info!("running abstract demo");
    println!();
    println!("{}", console::style("Conference abstract review").bold());
    admin.assign_abstract_editor(20, 3).await?;
    editor
        .abstract_editor_review(20, "In scope for the summit.")
        .await?;
    admin.assign_conference_editor(20, 9).await?;
    conference_editor
        .conference_editor_review(20, "Strong modelling section.")
        .await?;
    admin.abstract_final_decision(20, Decision::Accept, "").await?;
    let a = abstract_author
        .submit_full_paper(20, vec![FileUpload::named("tidal-wake-full.pdf")])
        .await?;
    term.print_abstract(&a, &editors);
    term.print_timeline(&admin.abstract_timeline(20).await?.1);
    Ok(())
}
