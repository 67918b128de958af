use super::*;
use std::time::Duration;

use crate::test_support::{
    views, FakeItem, FakeSearchSurface, FakeThemeSurface, RecordingNavigator, RecordingNotifier,
    ScriptedProbe, ScriptedResponse,
};
use shared::domain::ActivationPhase;

struct Mounted {
    page: Page,
    items: Vec<Arc<FakeItem>>,
    theme: Arc<FakeThemeSurface>,
    store: Arc<MemoryPreferenceStore>,
    notifier: Arc<RecordingNotifier>,
    probe: Arc<ScriptedProbe>,
}

async fn mount(os_dark: bool, response: ScriptedResponse) -> Mounted {
    let items = vec![
        Arc::new(
            FakeItem::new(0, "Image Compressor")
                .describe("Shrink images")
                .target("tools/compressor.html"),
        ),
        Arc::new(FakeItem::new(1, "Color Picker").target("#")),
        Arc::new(FakeItem::new(2, "JSON Formatter").target("json.html")),
    ];
    let theme = Arc::new(FakeThemeSurface::default());
    let store = Arc::new(MemoryPreferenceStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let probe = Arc::new(ScriptedProbe::new(response));
    let os = Arc::new(ManualDarkModeSignal::new(os_dark));

    let page = Page::mount(PageContext {
        items: views(&items),
        search: Arc::new(FakeSearchSurface::default()),
        theme: theme.clone(),
        store: store.clone(),
        dark_mode: os.clone(),
        os_feed: Some(os),
        notifier: notifier.clone(),
        probe: probe.clone(),
        navigator: Arc::new(RecordingNavigator::default()),
        settings: BehaviorSettings {
            base_url: Some(url::Url::parse("https://shelf.test/").expect("base")),
            ..BehaviorSettings::default()
        },
    })
    .await;

    Mounted {
        page,
        items,
        theme,
        store,
        notifier,
        probe,
    }
}

#[tokio::test]
async fn mount_applies_os_dark_when_unset() {
    let m = mount(true, ScriptedResponse::Status(200)).await;
    assert_eq!(m.theme.current(), Some(Theme::Dark));
    assert!(m.page.is_mounted());
}

#[tokio::test(start_paused = true)]
async fn query_then_escape_round_trip() {
    let m = mount(false, ScriptedResponse::Status(200)).await;

    m.page
        .dispatch(PageEvent::QueryChanged {
            value: "JSON".into(),
        })
        .await;
    tokio::time::sleep(Duration::from_millis(250)).await;
    let visible: Vec<bool> = m.items.iter().map(|item| item.is_visible()).collect();
    assert_eq!(visible, vec![false, false, true]);

    m.page
        .dispatch(PageEvent::SearchKey { key: Key::Escape })
        .await;
    assert!(m.items.iter().all(|item| item.is_visible()));
    assert_eq!(m.page.filter().query(), "");
}

#[tokio::test]
async fn click_on_placeholder_card_notifies() {
    let m = mount(false, ScriptedResponse::Status(200)).await;

    let Dispatched::Activation(ticket) = m.page.dispatch(PageEvent::Click { item: ItemId(1) }).await
    else {
        panic!("click should start an activation");
    };
    assert_eq!(ticket.outcome().await, ActivationOutcome::NotConfigured);
    assert_eq!(
        m.notifier.messages(),
        vec!["Tool \"Color Picker\" is not yet implemented.".to_string()]
    );
    assert_eq!(m.probe.calls(), 0);
}

#[tokio::test]
async fn space_on_card_suppresses_default_and_activates() {
    let m = mount(false, ScriptedResponse::Status(503)).await;

    let dispatched = m
        .page
        .dispatch(PageEvent::ItemKey {
            item: ItemId(2),
            key: Key::Space,
        })
        .await;
    let Dispatched::Activation(ticket) = dispatched else {
        panic!("space should activate, got {dispatched:?}");
    };
    assert_eq!(
        ticket.outcome().await,
        ActivationOutcome::Unavailable { status: 503 }
    );
    assert_eq!(
        m.notifier.messages(),
        vec!["Tool \"JSON Formatter\" is currently unavailable.".to_string()]
    );
}

#[tokio::test]
async fn toggle_event_persists_and_stops_os_follow() {
    let m = mount(false, ScriptedResponse::Status(200)).await;

    let toggled = m.page.dispatch(PageEvent::ToggleTheme).await;
    assert!(matches!(toggled, Dispatched::ThemeToggled(Some(Theme::Dark))));
    assert_eq!(m.store.value("theme").as_deref(), Some("dark"));

    m.page
        .dispatch(PageEvent::OsDarkModeChanged { dark: false })
        .await;
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
    assert_eq!(m.theme.current(), Some(Theme::Dark));
}

#[tokio::test]
async fn presentational_events_on_unknown_items_are_ignored() {
    let m = mount(false, ScriptedResponse::Status(200)).await;

    assert!(matches!(
        m.page.dispatch(PageEvent::Focus { item: ItemId(9) }).await,
        Dispatched::Ignored
    ));
    assert!(matches!(
        m.page.dispatch(PageEvent::Focus { item: ItemId(0) }).await,
        Dispatched::Handled
    ));
    assert!(m.items[0].focused.load(std::sync::atomic::Ordering::SeqCst));
}

#[tokio::test]
async fn unmount_releases_probing_cards_and_ignores_later_events() {
    let m = mount(false, ScriptedResponse::Hang).await;

    let Dispatched::Activation(ticket) = m.page.dispatch(PageEvent::Click { item: ItemId(0) }).await
    else {
        panic!("click should start an activation");
    };
    tokio::task::yield_now().await;
    assert_eq!(
        m.page.activation().phase(ItemId(0)),
        Some(ActivationPhase::Probing)
    );

    m.page.unmount();
    assert_eq!(ticket.outcome().await, ActivationOutcome::Cancelled);
    assert!(!m.items[0].is_loading());
    assert!(m.items[0].is_pointer_enabled());

    assert!(matches!(
        m.page.dispatch(PageEvent::ToggleTheme).await,
        Dispatched::Ignored
    ));
}
