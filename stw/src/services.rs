use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{InquireError, Select, Text};
use log::debug;
use owo_colors::OwoColorize;
use std::{fmt, future::Future, time::Duration};

use crate::api::stw::{StwApi, StwClient};
use crate::cli::{Args, Command};
use crate::controller::{ActionOutcome, Controller, RefreshOutcome};
use crate::models::PLACEHOLDER_TEXT;
use crate::render::{render_feed, ControlKind};
use crate::resolver::View;
use crate::settings;

pub async fn run(args: Args) -> Result<()> {
    let settings = settings::load_settings().context("Failed to load settings")?;
    let config = settings::merge_settings_with_args(&args, settings)?;

    let client = StwClient::new(&config.server, config.timeout)
        .with_context(|| format!("Failed to create client for {}", config.server))?;
    debug!("using server {}", client.base_url());

    let controller = Controller::new(client, &config.user, config.view).with_policy(config.policy);

    match args.command.unwrap_or(Command::Shell) {
        Command::Feed => {
            let refresh = with_spinner(controller.refresh()).await;
            report_refresh(refresh);
        }
        Command::Post { contents } => {
            report("post", with_spinner(controller.post(&contents)).await);
        }
        Command::Delete { post_key } => {
            report("delete", with_spinner(controller.delete(&post_key)).await);
        }
        Command::Subscribe { target } => {
            report("subscribe", with_spinner(controller.subscribe_user(&target)).await);
        }
        Command::Unsubscribe { target } => {
            report(
                "unsubscribe",
                with_spinner(controller.unsubscribe_user(&target)).await,
            );
        }
        Command::Register => {
            report("register", with_spinner(controller.register()).await);
        }
        Command::Shell => return shell(&controller).await,
    }

    print_feed(&controller);

    Ok(())
}

async fn with_spinner<F: Future>(future: F) -> F::Output {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(PLACEHOLDER_TEXT);
    spinner.enable_steady_tick(Duration::from_millis(100));

    let output = future.await;

    spinner.finish_and_clear();
    output
}

fn print_feed<A: StwApi>(controller: &Controller<A>) {
    let state = controller.snapshot();
    println!("\n{}\n", render_feed(&state.nav, &state.feed));
}

fn report(action: &str, outcome: ActionOutcome) {
    if outcome.accepted {
        println!("{} {}", "✓".bright_green(), action);
    } else {
        println!("{} {} was not accepted", "✗".bright_red(), action);
    }

    if let Some(refresh) = outcome.refresh {
        report_refresh(refresh);
    }
}

fn report_refresh(refresh: RefreshOutcome) {
    match refresh {
        RefreshOutcome::Failed => println!("{} feed could not be loaded", "⚠".yellow()),
        RefreshOutcome::NoEndpoint => println!("{} no feed for this view", "ℹ".blue()),
        RefreshOutcome::Applied(_) | RefreshOutcome::Stale => {}
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShellAction {
    Post,
    Delete,
    Subscribe,
    Unsubscribe,
    Open(View),
    SwitchUser,
    Refresh,
    Quit,
}

impl ShellAction {
    fn all() -> Vec<ShellAction> {
        let mut actions = vec![
            ShellAction::Post,
            ShellAction::Delete,
            ShellAction::Subscribe,
            ShellAction::Unsubscribe,
        ];
        actions.extend(View::ALL.map(ShellAction::Open));
        actions.extend([
            ShellAction::SwitchUser,
            ShellAction::Refresh,
            ShellAction::Quit,
        ]);
        actions
    }
}

impl fmt::Display for ShellAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellAction::Post => write!(f, "Post"),
            ShellAction::Delete => write!(f, "Delete a post"),
            ShellAction::Subscribe => write!(f, "Subscribe to an author"),
            ShellAction::Unsubscribe => write!(f, "Unsubscribe from an author"),
            ShellAction::Open(view) => write!(f, "Show {view}"),
            ShellAction::SwitchUser => write!(f, "Switch user"),
            ShellAction::Refresh => write!(f, "Refresh"),
            ShellAction::Quit => write!(f, "Quit"),
        }
    }
}

fn is_cancel(e: &InquireError) -> bool {
    matches!(
        e,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

/// `None` when the prompt was cancelled.
fn prompt_text(message: &str, initial: &str) -> Result<Option<String>> {
    match Text::new(message).with_initial_value(initial).prompt() {
        Ok(value) => Ok(Some(value)),
        Err(e) if is_cancel(&e) => Ok(None),
        Err(e) => Err(e).context("Failed to read input"),
    }
}

fn pick_control<A: StwApi>(controller: &Controller<A>, kind: ControlKind) -> Result<Option<String>> {
    let state = controller.snapshot();
    let options: Vec<String> = state
        .feed
        .views()
        .iter()
        .filter(|view| view.post.author_id != PLACEHOLDER_TEXT)
        .map(|view| view.control(kind).id.clone())
        .collect();

    if options.is_empty() {
        println!("{} No posts to {}.", "ℹ".blue(), kind.label());
        return Ok(None);
    }

    match Select::new(&format!("Which post to {}?", kind.label()), options).prompt() {
        Ok(id) => Ok(Some(id)),
        Err(e) if is_cancel(&e) => Ok(None),
        Err(e) => Err(e).context("Failed to get post selection"),
    }
}

async fn shell<A: StwApi>(controller: &Controller<A>) -> Result<()> {
    with_spinner(controller.refresh()).await;
    print_feed(controller);

    loop {
        let session = controller.session();
        let prompt = format!(
            "{} on {}",
            format!("@{}", session.user_id).bright_cyan(),
            session.view_label.bright_green()
        );

        let action = match Select::new(&prompt, ShellAction::all())
            .with_page_size(11)
            .prompt()
        {
            Ok(action) => action,
            Err(e) if is_cancel(&e) => break,
            Err(e) => return Err(e).context("Failed to get action"),
        };

        match action {
            ShellAction::Post => {
                let Some(contents) = prompt_text("Contents:", "")? else {
                    continue;
                };
                with_spinner(controller.post(&contents)).await;
            }
            ShellAction::Delete | ShellAction::Subscribe | ShellAction::Unsubscribe => {
                let kind = match action {
                    ShellAction::Delete => ControlKind::Delete,
                    ShellAction::Subscribe => ControlKind::Subscribe,
                    _ => ControlKind::Unsubscribe,
                };
                let Some(tag) = pick_control(controller, kind)? else {
                    continue;
                };
                match kind {
                    ControlKind::Delete => with_spinner(controller.delete(&tag)).await,
                    ControlKind::Subscribe => with_spinner(controller.subscribe(&tag)).await,
                    ControlKind::Unsubscribe => with_spinner(controller.unsubscribe(&tag)).await,
                };
            }
            ShellAction::Open(view) => {
                with_spinner(controller.switch_view(view.label())).await;
            }
            ShellAction::SwitchUser => {
                let Some(user_id) = prompt_text("User ID:", &session.user_id)? else {
                    continue;
                };
                with_spinner(controller.switch_user(&user_id)).await;
            }
            ShellAction::Refresh => {
                with_spinner(controller.refresh()).await;
            }
            ShellAction::Quit => break,
        }

        print_feed(controller);
    }

    Ok(())
}
