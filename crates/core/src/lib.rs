#![deny(warnings)]

pub mod audio;
pub mod chat;
pub mod config;
pub mod diary;
pub mod emotion;
pub mod history;
pub mod pipeline;
pub mod speech;
pub mod summary;
pub mod util;
pub mod validator;
