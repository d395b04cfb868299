use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use notebook_api::{NotebookId, Question, Visibility};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{debug, info};

use notebook_core::{
    backend::Backend,
    cli::{Cli, Command, MessageCommand, NotebookCommand, PageCommand, QnaCommand, ShareCommand},
    codec::LogicalType,
    config::Config,
    http::HttpBackend,
    model::{self, Message, Notebook},
    notebooks, output,
    pagination::PageBook,
    qna, save,
    services::{self, storage::WatermarkStore},
    sync::ChannelSync,
    unread::UnreadTracker,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = Config::load(&cli.global)?;
    services::log::init(cfg.logging_enabled);
    debug!(?cfg, "configuration resolved");
    let backend = Arc::new(HttpBackend::new(&cfg.api_url, cfg.token.clone())?);

    match cli.command {
        Command::Login { email, password } => {
            let auth = notebooks::login(backend.as_ref(), &email, &password).await?;
            info!(user = auth.user.user_id, "logged in");
            println!("{}", auth.token);
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            let auth = notebooks::register(backend.as_ref(), &name, &email, &password).await?;
            println!("{}", auth.token);
        }
        Command::Me => {
            let me = backend.me().await?;
            println!("{:<6} {:<20} {}", me.user_id, me.name, me.email);
        }
        Command::Notebooks { command } => run_notebooks(backend.as_ref(), command).await?,
        Command::Messages { command } => run_messages(backend, command).await?,
        Command::Watch { notebook } => watch(backend, notebook, &cfg).await?,
        Command::Unread { notebook, mark } => {
            let user = backend.me().await?.user_id;
            let store = Arc::new(WatermarkStore::open(cfg.data_dir.clone()).await?);
            let sync = ChannelSync::new(backend, notebook);
            sync.refresh().await?;
            let mut tracker = UnreadTracker::load(store, user, notebook).await;
            println!("{}", tracker.unread(&sync.view()));
            if mark {
                tracker.set_chat_visible(true).await?;
            }
        }
        Command::Pages { command } => run_pages(backend.as_ref(), command).await?,
        Command::Share { command } => run_share(backend.as_ref(), command).await?,
        Command::Qna { command } => {
            let backend = backend.as_ref();
            let thread = match command {
                QnaCommand::List { page } => qna::thread(backend, page).await?,
                QnaCommand::Ask { page, text } => qna::ask(backend, page, &text).await?,
                QnaCommand::Answer {
                    page,
                    question,
                    text,
                } => qna::answer(backend, page, question, &text).await?,
            };
            print_thread(&thread);
        }
    }
    Ok(())
}

async fn run_notebooks(backend: &dyn Backend, command: NotebookCommand) -> Result<()> {
    match command {
        NotebookCommand::List => print_notebooks(&notebooks::dashboard(backend).await?),
        NotebookCommand::Search { query } => {
            print_notebooks(&notebooks::search(backend, &query).await?)
        }
        NotebookCommand::Create {
            title,
            course,
            public,
        } => {
            let visibility = if public {
                Visibility::Public
            } else {
                Visibility::Private
            };
            let nb = notebooks::create(backend, &title, &course, visibility).await?;
            println!("{}", nb.id);
        }
        NotebookCommand::Delete { id } => notebooks::delete(backend, id).await?,
    }
    Ok(())
}

fn print_notebooks(list: &[Notebook]) {
    for nb in list {
        println!(
            "{:<6} {:<30} {:<15} {:<8} {}",
            nb.id,
            nb.title,
            nb.course_name.as_deref().unwrap_or("-"),
            format!("{:?}", nb.visibility),
            nb.role.map(|r| format!("{r:?}")).unwrap_or_default()
        );
    }
}

async fn run_messages(backend: Arc<HttpBackend>, command: MessageCommand) -> Result<()> {
    match command {
        MessageCommand::List { notebook, kind } => {
            let sync = ChannelSync::new(backend, notebook);
            sync.refresh().await?;
            let view = sync.view();
            if kind != Some(LogicalType::Chat) {
                print_messages(&view.sticky);
            }
            if kind != Some(LogicalType::Sticky) {
                print_messages(&view.chat);
            }
        }
        MessageCommand::Send {
            notebook,
            text,
            chat,
        } => {
            let kind = if chat {
                LogicalType::Chat
            } else {
                LogicalType::Sticky
            };
            ChannelSync::new(backend, notebook).send(kind, &text).await?;
        }
        MessageCommand::Delete { notebook, id } => {
            ChannelSync::new(backend, notebook).delete(id).await?;
        }
    }
    Ok(())
}

fn print_messages(messages: &[Message]) {
    for msg in messages {
        println!(
            "{:<6} {:<24} {:<6} {:<12} {}",
            msg.id,
            format_millis(msg.timestamp),
            msg.logical_type,
            msg.author_label(),
            msg.display_text
        );
    }
}

fn print_thread(thread: &[Question]) {
    for q in thread {
        let when = model::parse_timestamp(&q.timestamp).unwrap_or(0);
        println!(
            "Q{:<5} {:<24} {:<12} {}",
            q.question_id,
            format_millis(when),
            q.user_name.clone().unwrap_or_else(|| q.user_id.to_string()),
            q.question_text
        );
        for a in &q.answers {
            println!(
                "  A{:<4} {:<12} {}",
                a.answer_id,
                a.user_name.clone().unwrap_or_else(|| a.user_id.to_string()),
                a.answer_text
            );
        }
    }
}

fn format_millis(ms: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * 1_000_000)
        .ok()
        .and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_else(|| ms.to_string())
}

async fn watch(backend: Arc<HttpBackend>, notebook: NotebookId, cfg: &Config) -> Result<()> {
    let sync = Arc::new(ChannelSync::new(backend, notebook));
    let mut events = sync.subscribe();
    let handle = sync.open(cfg.poll_interval);
    info!(notebook, "watching - press Ctrl+C to exit");

    let mut stdout = tokio::io::stdout();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            res = &mut ctrl_c => {
                res?;
                break;
            }
            event = events.recv() => match event {
                Some(event) => output::write_json_line(&mut stdout, &event).await?,
                None => break,
            },
        }
    }
    handle.close();
    Ok(())
}

async fn run_pages(backend: &dyn Backend, command: PageCommand) -> Result<()> {
    match command {
        PageCommand::List { notebook } => {
            let (meta, mut book) = notebooks::open(backend, notebook).await?;
            println!("{}", meta.title);
            for i in 0..book.len() {
                book.go_to(i);
                let id = book
                    .current()
                    .and_then(|p| p.server_id())
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".into());
                let preview = book
                    .current()
                    .and_then(|p| p.content.lines().next())
                    .unwrap_or("");
                println!("{:<14} {:<6} {}", book.to_string(), id, preview);
            }
        }
        PageCommand::Append { notebook, text } => {
            let (_, mut book) = notebooks::open(backend, notebook).await?;
            book.go_to(book.len() - 1);
            let fresh = book.current().map(|p| p.is_ephemeral()).unwrap_or(false);
            if !fresh {
                book.add_page();
            }
            book.set_content(text);
            save_and_report(backend, notebook, &mut book).await?;
        }
        PageCommand::Edit {
            notebook,
            number,
            text,
        } => {
            let (_, mut book) = notebooks::open(backend, notebook).await?;
            select_page(&mut book, number)?;
            book.set_content(text);
            save_and_report(backend, notebook, &mut book).await?;
        }
        PageCommand::Delete { notebook, number } => {
            let (_, mut book) = notebooks::open(backend, notebook).await?;
            select_page(&mut book, number)?;
            save::delete_current(backend, &mut book).await?;
            println!("{} pages left", book.len());
        }
    }
    Ok(())
}

fn select_page(book: &mut PageBook, number: usize) -> Result<()> {
    if number == 0 || !book.go_to(number - 1) {
        bail!("no page {number}: the notebook has {} pages", book.len());
    }
    Ok(())
}

async fn save_and_report(backend: &dyn Backend, notebook: NotebookId, book: &mut PageBook) -> Result<()> {
    let report = save::save_book(backend, notebook, book).await?;
    println!(
        "saved: {} created, {} updated, {} skipped",
        report.created, report.updated, report.skipped
    );
    Ok(())
}

async fn run_share(backend: &dyn Backend, command: ShareCommand) -> Result<()> {
    let list = match command {
        ShareCommand::List { notebook } => notebooks::collaborators(backend, notebook).await?,
        ShareCommand::Add {
            notebook,
            email,
            role,
        } => notebooks::share(backend, notebook, &email, role.into()).await?,
        ShareCommand::Remove { notebook, user } => {
            notebooks::unshare(backend, notebook, user).await?
        }
    };
    for c in list {
        println!("{:<6} {:<20} {:<30} {:?}", c.user_id, c.name, c.email, c.role);
    }
    Ok(())
}
