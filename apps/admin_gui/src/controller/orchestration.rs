//! Turns location changes and UI actions into queued backend commands.

use client_core::{PageState, QueryChange};
use crossbeam_channel::{Sender, TrySendError};
use shared::search_params::SearchParams;

use crate::backend_bridge::commands::BackendCommand;

/// Queues `cmd` without blocking the frame. Returns false, with the reason
/// written to `status`, when the worker cannot take it.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let name = cmd.name();
    let refusal = match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::trace!(command = name, "command queued");
            return true;
        }
        Err(TrySendError::Full(_)) => format!("Too many requests pending; {name} was dropped"),
        Err(TrySendError::Disconnected(_)) => {
            format!("Backend worker stopped; {name} was not sent")
        }
    };
    tracing::warn!(command = name, "{refusal}");
    *status = refusal;
    false
}

/// Issues a fresh ticket for the listing described by `params`.
pub fn listing_command(page: &mut PageState, params: &SearchParams) -> BackendCommand {
    BackendCommand::FetchListing {
        ticket: page.begin_listing(params.listing_key()),
    }
}

/// `None` when no search term is active.
pub fn search_command(page: &mut PageState, params: &SearchParams) -> Option<BackendCommand> {
    let term = params.active_search()?;
    Some(BackendCommand::Search {
        ticket: page.begin_search(term),
    })
}

/// Commands needed to bring the page up to date after a location change.
/// A search-only change leaves the listing alone, and vice versa.
pub fn commands_for_change(page: &mut PageState, change: &QueryChange) -> Vec<BackendCommand> {
    let mut commands = Vec::new();
    if change.listing_changed() {
        commands.push(listing_command(page, &change.current));
    }
    if change.search_changed() {
        commands.extend(search_command(page, &change.current));
    }
    commands
}
