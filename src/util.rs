#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{any::Any, future::Future};

use anyhow::{Context, Result};
use tokio::{
    runtime::{Builder, Handle},
    task::block_in_place,
};

/// Drives `future` to completion from synchronous code.
///
/// Inside a multi-threaded Tokio runtime (or on its blocking pool) the
/// current handle is reused; otherwise a throwaway current-thread runtime is
/// built for the call.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    match Handle::try_current() {
        Ok(handle) => Ok(block_in_place(move || handle.block_on(future))),
        Err(_) => Ok(Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to create Tokio runtime for engine call")?
            .block_on(future)),
    }
}

/// Extracts a readable message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        String::from("unknown panic")
    }
}

/// Truncates `text` to at most `max_chars` characters, appending an ellipsis
/// when anything was cut. Used to keep log lines short.
pub fn snippet(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() { format!("{head}...") } else { head }
}
