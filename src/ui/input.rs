//! Key dispatch.
//!
//! Keys are resolved through the keybinding registry for the focused pane
//! and forwarded to the session. Full-screen viewers are not run here: the
//! launch is handed back to the loop, which owns the terminal.

use crate::app::{App, Focus, Progress, PromptStep};
use crate::keybindings::Action as KbAction;
use crate::preview::{ExternalLaunch, LaunchKind};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What the loop does after a key.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum Step {
    Continue,
    Quit,
    /// Suspend the UI and run this viewer.
    Launch(ExternalLaunch),
}

pub(super) async fn handle_key(app: &mut App, key: KeyEvent, progress: &mut dyn Progress) -> Step {
    if app.prompt.is_some() {
        handle_prompt_key(app, key, progress).await;
        return Step::Continue;
    }

    let Some(action) = app
        .keybindings
        .action_for_key(key.code, key.modifiers, app.focus.context())
    else {
        return Step::Continue;
    };
    tracing::trace!(action = action.describe(), focus = ?app.focus, "Key dispatched");

    match action {
        KbAction::Quit => return Step::Quit,
        KbAction::NavDown => app.move_cursor(true, progress).await,
        KbAction::NavUp => app.move_cursor(false, progress).await,
        KbAction::ToggleFocus => app.toggle_focus(),
        KbAction::Select => match app.focus {
            Focus::Categories => app.select_category(progress).await,
            Focus::Posts => return launch(app, LaunchKind::Preview).await,
        },
        KbAction::ToggleSort => app.toggle_sort(progress).await,
        KbAction::Refresh => app.refresh(progress).await,
        KbAction::MarkUnread => app.mark_unread(progress).await,
        KbAction::MarkRead => app.mark_read(progress).await,
        KbAction::MarkSaved => app.mark_saved(progress).await,
        KbAction::MarkUnsaved => app.mark_unsaved(progress).await,
        KbAction::OpenPlainText => return launch(app, LaunchKind::Browser).await,
        KbAction::OpenInBrowser => app.open_in_browser(progress).await,
        KbAction::AddSubscription => app.start_prompt(),
        KbAction::MarkCategoryRead => app.mark_category_read(progress).await,
    }
    Step::Continue
}

async fn launch(app: &mut App, kind: LaunchKind) -> Step {
    match app.prepare_external(kind).await {
        Some(launch) => Step::Launch(launch),
        None => Step::Continue,
    }
}

/// Line editing for the add-subscription prompt. Esc (or Ctrl+C) abandons
/// it without a backend call.
async fn handle_prompt_key(app: &mut App, key: KeyEvent, progress: &mut dyn Progress) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let Some(prompt) = app.prompt.as_mut() else {
        return;
    };
    app.needs_redraw = true;

    match key.code {
        KeyCode::Esc => app.cancel_prompt(),
        KeyCode::Char('c') if ctrl => app.cancel_prompt(),
        KeyCode::Enter => {
            if let PromptStep::Done(subscription) = prompt.advance() {
                app.submit_subscription(subscription, progress).await;
            }
        }
        KeyCode::Backspace => prompt.backspace(),
        KeyCode::Char(c) if !ctrl => prompt.push(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::feed::mock::{Call, MockBackend};
    use crate::feed::NewSubscription;
    use crate::preview::PreviewPipeline;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    async fn started(name: &str) -> (App, Arc<MockBackend>) {
        let dir = std::env::temp_dir().join(name);
        std::fs::remove_dir_all(&dir).ok();
        let config = Config {
            seconds_to_mark_as_read: -1,
            preview_renderer: "cat".to_string(),
            ..Config::default()
        };
        let backend = Arc::new(
            MockBackend::new()
                .with_categories(&[("All", "c/all"), ("News", "c/news")])
                .with_stream("c/all", &["A", "B"]),
        );
        let pipeline = PreviewPipeline::new(&dir, &config, "lynx").unwrap();
        let mut app = App::new(backend.clone(), pipeline, &config);
        app.init(&mut |_: &App| {}).await;
        backend.clear_calls();
        (app, backend)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn press(app: &mut App, code: KeyCode) -> Step {
        handle_key(app, key(code), &mut |_: &App| {}).await
    }

    async fn type_line(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c)).await;
        }
        press(app, KeyCode::Enter).await;
    }

    #[tokio::test]
    async fn test_quit_keys() {
        let (mut app, _backend) = started("feedpane_input_test_quit").await;
        assert_eq!(press(&mut app, KeyCode::F(1)).await, Step::Quit);
        assert_eq!(press(&mut app, KeyCode::Char('q')).await, Step::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key(&mut app, ctrl_c, &mut |_: &App| {}).await, Step::Quit);
    }

    #[tokio::test]
    async fn test_enter_on_post_launches_viewer() {
        let (mut app, _backend) = started("feedpane_input_test_enter").await;
        match press(&mut app, KeyCode::Enter).await {
            Step::Launch(launch) => {
                assert_eq!(launch.kind, LaunchKind::Preview);
                assert_eq!(launch.post_id, "c/all:A");
            }
            other => panic!("expected launch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_o_launches_text_browser_on_url() {
        let (mut app, _backend) = started("feedpane_input_test_o").await;
        match press(&mut app, KeyCode::Char('o')).await {
            Step::Launch(launch) => {
                assert_eq!(launch.kind, LaunchKind::Browser);
                assert_eq!(launch.program, "lynx");
                assert_eq!(launch.args, vec!["https://example.com/A"]);
            }
            other => panic!("expected launch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_post_keys_ignored_in_categories() {
        let (mut app, backend) = started("feedpane_input_test_ctx").await;
        press(&mut app, KeyCode::Tab).await;
        assert_eq!(app.focus, Focus::Categories);
        press(&mut app, KeyCode::Char('r')).await;
        press(&mut app, KeyCode::Char('s')).await;
        assert_eq!(press(&mut app, KeyCode::Char('o')).await, Step::Continue);
        assert!(backend.calls().is_empty());

        press(&mut app, KeyCode::Char('j')).await;
        assert_eq!(app.categories.cursor(), Some(1));
    }

    #[tokio::test]
    async fn test_shifted_letters_dispatch() {
        let (mut app, backend) = started("feedpane_input_test_shift").await;
        let shifted = KeyEvent::new(KeyCode::Char('S'), KeyModifiers::SHIFT);
        handle_key(&mut app, shifted, &mut |_: &App| {}).await;
        assert_eq!(backend.calls(), vec![Call::MarkUnsaved(vec!["c/all:A".into()])]);
    }

    #[tokio::test]
    async fn test_subscription_prompt_flow() {
        let (mut app, backend) = started("feedpane_input_test_prompt").await;
        press(&mut app, KeyCode::Char('a')).await;
        assert!(app.prompt.is_some());

        // Keys bound elsewhere are plain text while the prompt is open.
        type_line(&mut app, "https://q.example/rss").await;
        type_line(&mut app, "Quux").await;
        assert!(backend.calls().is_empty());
        type_line(&mut app, "news tech").await;

        assert!(app.prompt.is_none());
        assert_eq!(
            backend.calls(),
            vec![Call::AddSubscription(NewSubscription {
                is_feed: false,
                url: "https://q.example/rss".into(),
                categories: vec!["news".into(), "tech".into()],
                title: "Quux".into(),
            })]
        );
    }

    #[tokio::test]
    async fn test_escape_abandons_prompt() {
        let (mut app, backend) = started("feedpane_input_test_escape").await;
        press(&mut app, KeyCode::Char('a')).await;
        type_line(&mut app, "https://q.example/rss").await;
        press(&mut app, KeyCode::Esc).await;

        assert!(app.prompt.is_none());
        assert!(backend.calls().is_empty());
        assert_eq!(press(&mut app, KeyCode::Char('q')).await, Step::Quit);
    }
}
