use std::sync::Arc;

use anyhow::Context;
use futures::future::join_all;
use shared::{domain::ItemId, protocol::PageEvent};
use shelf_core::{
    ActivationOutcome, BehaviorSettings, Catalog, Dispatched, ItemView, ManualDarkModeSignal,
    Page, PageContext, PreferenceStore, Probe, ToastNotifier,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use crate::views::{CardView, Output, PrintNavigator, SearchBox, ThemeMarker, ToastLine};

#[derive(Debug, Default)]
pub struct RunSummary {
    pub events: usize,
    pub rejected: usize,
    pub outcomes: Vec<(ItemId, ActivationOutcome)>,
}

/// Builds terminal views for every catalog entry and mounts the page.
pub async fn mount_page(
    catalog: &Catalog,
    output: &Output,
    store: Arc<dyn PreferenceStore>,
    probe: Arc<dyn Probe>,
    os_dark: bool,
    settings: BehaviorSettings,
) -> Page {
    let items = catalog
        .tools
        .iter()
        .cloned()
        .enumerate()
        .map(|(index, entry)| {
            Arc::new(CardView::new(ItemId(index), entry, output.clone())) as Arc<dyn ItemView>
        })
        .collect();
    let os = Arc::new(ManualDarkModeSignal::new(os_dark));
    let notifier = ToastNotifier::new(
        Arc::new(ToastLine::new(output.clone())),
        settings.notification_ttl,
    );

    Page::mount(PageContext {
        items,
        search: Arc::new(SearchBox::new(output.clone())),
        theme: Arc::new(ThemeMarker::new(output.clone())),
        store,
        dark_mode: os.clone(),
        os_feed: Some(os),
        notifier: Arc::new(notifier),
        probe,
        navigator: Arc::new(PrintNavigator::new(output.clone())),
        settings,
    })
    .await
}

/// Dispatches one JSON `PageEvent` per input line until EOF, then settles
/// the pending search pass and waits for every activation to resolve.
pub async fn drive<R>(page: &Page, input: R) -> anyhow::Result<RunSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = RunSummary::default();
    let mut tickets = Vec::new();
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await.context("failed to read event")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event: PageEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(error) => {
                warn!(%error, line, "rejected malformed event");
                summary.rejected += 1;
                continue;
            }
        };
        summary.events += 1;
        debug!(event = event.name(), item = ?event.item(), "dispatching");
        match page.dispatch(event).await {
            Dispatched::Activation(ticket) => tickets.push(ticket),
            Dispatched::ThemeToggled(None) => warn!("theme toggle had no effect"),
            _ => {}
        }
    }

    if page.filter().is_pending() {
        page.filter().flush();
    }

    let items: Vec<ItemId> = tickets.iter().map(|ticket| ticket.item).collect();
    let outcomes = join_all(tickets.into_iter().map(|ticket| ticket.outcome())).await;
    summary.outcomes = items.into_iter().zip(outcomes).collect();

    info!(
        events = summary.events,
        rejected = summary.rejected,
        activations = summary.outcomes.len(),
        "input drained"
    );
    Ok(summary)
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
