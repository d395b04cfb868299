pub mod backend;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod model;
pub mod notebooks;
pub mod output;
pub mod pagination;
pub mod qna;
pub mod save;
pub mod services;
pub mod sync;
pub mod unread;

#[cfg(test)]
mod testing;

pub use error::{CoreError, CoreResult};
pub use sync::{ChannelSync, ChannelView, Draft};
