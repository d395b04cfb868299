use clap::{Args, Parser, Subcommand, ValueEnum};
use notebook_api::{MessageId, NotebookId, PageId, QuestionId, Role, UserId};
use std::path::PathBuf;

use crate::codec::LogicalType;

/// Command line client for collaborative notebooks.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,
    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every command. Each overrides the environment and the
/// config file.
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalOpts {
    /// Backend base URL, e.g. http://127.0.0.1:8080/api.
    #[arg(long, global = true)]
    pub api_url: Option<String>,
    /// Bearer token from a previous login.
    #[arg(long, global = true)]
    pub token: Option<String>,
    /// Path to configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Enable or disable logging (true/false).
    #[arg(long, global = true)]
    pub logging: Option<bool>,
    /// Channel poll interval in milliseconds.
    #[arg(long, global = true)]
    pub poll_interval_ms: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and print the bearer token.
    Login { email: String, password: String },
    /// Create an account and print the bearer token.
    Register {
        name: String,
        email: String,
        password: String,
    },
    /// Show the logged-in user.
    Me,
    Notebooks {
        #[command(subcommand)]
        command: NotebookCommand,
    },
    Messages {
        #[command(subcommand)]
        command: MessageCommand,
    },
    /// Follow a notebook channel, one JSON event per line, until Ctrl+C.
    Watch { notebook: NotebookId },
    /// Count unread chat messages.
    Unread {
        notebook: NotebookId,
        /// Mark the chat as viewed now.
        #[arg(long)]
        mark: bool,
    },
    Pages {
        #[command(subcommand)]
        command: PageCommand,
    },
    Share {
        #[command(subcommand)]
        command: ShareCommand,
    },
    /// Questions and answers on a page.
    Qna {
        #[command(subcommand)]
        command: QnaCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum NotebookCommand {
    List,
    Search { query: String },
    Create {
        title: String,
        #[arg(long, default_value = "")]
        course: String,
        /// Make the notebook public instead of private.
        #[arg(long)]
        public: bool,
    },
    Delete { id: NotebookId },
}

#[derive(Subcommand, Debug)]
pub enum MessageCommand {
    List {
        notebook: NotebookId,
        /// Only show one sub-stream (sticky or chat).
        #[arg(long)]
        kind: Option<LogicalType>,
    },
    Send {
        notebook: NotebookId,
        text: String,
        /// Send as a chat line instead of a sticky note.
        #[arg(long)]
        chat: bool,
    },
    Delete { notebook: NotebookId, id: MessageId },
}

/// Pages are numbered from 1 on the command line.
#[derive(Subcommand, Debug)]
pub enum PageCommand {
    List { notebook: NotebookId },
    Append { notebook: NotebookId, text: String },
    Edit {
        notebook: NotebookId,
        number: usize,
        text: String,
    },
    Delete { notebook: NotebookId, number: usize },
}

#[derive(Subcommand, Debug)]
pub enum ShareCommand {
    List { notebook: NotebookId },
    Add {
        notebook: NotebookId,
        email: String,
        #[arg(long, value_enum, default_value_t = RoleArg::Viewer)]
        role: RoleArg,
    },
    Remove { notebook: NotebookId, user: UserId },
}

/// Pages are addressed by server id here.
#[derive(Subcommand, Debug)]
pub enum QnaCommand {
    List { page: PageId },
    Ask { page: PageId, text: String },
    Answer {
        page: PageId,
        question: QuestionId,
        text: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleArg {
    Viewer,
    Editor,
    Owner,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Viewer => Role::Viewer,
            RoleArg::Editor => Role::Editor,
            RoleArg::Owner => Role::Owner,
        }
    }
}
