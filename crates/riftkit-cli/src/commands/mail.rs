//! Disposable inbox commands.

use anyhow::{Context, Result};
use riftkit::storage::format_table;
use riftkit::{Mailbox, MessageSummary};
use tracing::info;

use crate::app::App;
use crate::cli::MailAction;

pub fn run(app: &App, action: MailAction) -> Result<()> {
    match action {
        MailAction::New => {
            let mailbox = Mailbox::create(&app.config.mail_api, app.config.request_timeout())
                .context("Failed to create mailbox")?;
            mailbox.save(&app.store())?;
            println!("{}", mailbox.address());
        }
        MailAction::Inbox => {
            let mut mailbox = open(app)?;
            let messages = mailbox.messages().context("Failed to list messages")?;
            println!("Inbox of {}", mailbox.address());
            if messages.is_empty() {
                println!("(empty)");
            } else {
                print!("{}", format_table(&messages));
            }
            mailbox.save(&app.store())?;
        }
        MailAction::Read { id } => {
            let mut mailbox = open(app)?;
            let message = mailbox
                .message(&id)
                .with_context(|| format!("Failed to read message {}", id))?;
            println!("From:    {}", message.summary.from.display());
            println!("Subject: {}", message.summary.subject);
            if let Some(at) = message.summary.created_at {
                println!("Date:    {}", at.format("%Y-%m-%d %H:%M"));
            }
            println!();
            println!("{}", message.text.trim_end());
            mailbox.save(&app.store())?;
        }
        MailAction::Watch => watch(app)?,
    }
    Ok(())
}

fn open(app: &App) -> Result<Mailbox> {
    Mailbox::load(&app.store(), &app.config.mail_api, app.config.request_timeout())?
        .context("No mailbox yet; create one with `riftkit mail new`")
}

fn watch(app: &App) -> Result<()> {
    let mut mailbox = open(app)?;
    let poller = app.poller();
    let (shutdown, keyboard) = app.shutdown()?;
    let mut seen = app.load_seen("mail");

    println!(
        "Watching {} every {}s (Press Esc or q to quit)",
        mailbox.address(),
        poller.interval().as_secs()
    );

    let stats = poller.run(
        &mut seen,
        &shutdown,
        || mailbox.messages(),
        |new: &[&MessageSummary]| {
            for message in new {
                println!(
                    "[{}] {}: {}",
                    message.id,
                    message.from.display(),
                    message.subject
                );
                if !message.intro.is_empty() {
                    println!("    {}", message.intro);
                }
            }
        },
    );

    app.finish(&shutdown, keyboard);
    app.save_seen("mail", &seen)?;
    mailbox.save(&app.store())?;

    let stats = stats.context("Mail watch stopped")?;
    info!("{} new messages", stats.emitted);
    Ok(())
}
