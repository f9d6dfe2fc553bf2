//! Skedit - schedule and publish Reddit posts from the terminal
#![allow(clippy::uninlined_format_args)]

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use skedit::storage::EncryptedFileStorage;
use skedit::views::{self, compose::PostForm, compose::SubmitMode};
use skedit::{ApiClient, Config, CredentialStore, PostBucket, Session, SessionState, Theme};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (RUST_LOG=debug for verbose output)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let command = parse_args()?;
    match command {
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            print_version();
            Ok(())
        }
        Command::Theme { choice } => theme_cli(choice.as_deref()),
        Command::Create {
            form,
            preview: true,
            ..
        } => {
            print!("{}", form.preview());
            Ok(())
        }
        other => {
            let mut session = open_session()?;
            run(&mut session, other).await
        }
    }
}

/// CLI commands
enum Command {
    Status,
    Login { identifier: String },
    Signup { username: String, email: String },
    Logout,
    Google,
    VerifyEmail { token: Option<String> },
    ResendVerification { email: String },
    PasswordReset { email: String },
    PasswordResetConfirm { token: String },
    Accounts,
    Connect,
    Disconnect { id: String, yes: bool },
    Posts { bucket: PostBucket },
    Create { form: PostForm, schedule: bool, preview: bool },
    Update { id: String, form: PostForm },
    Publish { id: String },
    Schedule { id: String, when: String },
    Delete { id: String },
    Theme { choice: Option<String> },
    Help,
    Version,
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() == 1 {
        return Ok(Command::Status);
    }

    let arg = |i: usize, what: &str| -> Result<String> {
        args.get(i)
            .filter(|a| !a.starts_with("--"))
            .cloned()
            .ok_or_else(|| anyhow!("Missing {}\nRun 'skedit --help' for usage", what))
    };

    match args[1].as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help),
        "-v" | "--version" | "version" => Ok(Command::Version),
        "status" | "whoami" => Ok(Command::Status),

        "login" => Ok(Command::Login {
            identifier: arg(2, "username or email")?,
        }),
        "signup" => Ok(Command::Signup {
            username: arg(2, "username")?,
            email: arg(3, "email")?,
        }),
        "logout" => Ok(Command::Logout),
        "google" => Ok(Command::Google),
        "verify-email" => Ok(Command::VerifyEmail {
            token: args.get(2).cloned(),
        }),
        "resend-verification" => Ok(Command::ResendVerification {
            email: arg(2, "email")?,
        }),
        "password-reset" => Ok(Command::PasswordReset {
            email: arg(2, "email")?,
        }),
        "password-reset-confirm" => Ok(Command::PasswordResetConfirm {
            token: arg(2, "reset token")?,
        }),

        "accounts" => Ok(Command::Accounts),
        "connect" => Ok(Command::Connect),
        "disconnect" => Ok(Command::Disconnect {
            id: arg(2, "account id")?,
            yes: has_flag(&args, &["--yes", "-y"]),
        }),

        "posts" => {
            let bucket = match args.get(2) {
                Some(name) => PostBucket::from_str(name).ok_or_else(|| {
                    anyhow!("Unknown bucket: {}\nUse scheduled, published or all", name)
                })?,
                None => PostBucket::default(),
            };
            Ok(Command::Posts { bucket })
        }

        "create" => {
            let at = flag_value(&args, &["--at"]);
            let form = PostForm {
                reddit_account: flag_value(&args, &["--account", "-a"]).unwrap_or_default(),
                subreddit: flag_value(&args, &["--subreddit", "-s"]).unwrap_or_default(),
                title: flag_value(&args, &["--title", "-t"]).unwrap_or_default(),
                content: flag_value(&args, &["--content", "-c"]).unwrap_or_default(),
                scheduled_at: at.clone().unwrap_or_default(),
            };
            Ok(Command::Create {
                form,
                schedule: at.is_some(),
                preview: has_flag(&args, &["--preview", "-p"]),
            })
        }

        "update" => {
            let id = arg(2, "post id")?;
            let form = PostForm {
                reddit_account: flag_value(&args, &["--account", "-a"]).unwrap_or_default(),
                subreddit: flag_value(&args, &["--subreddit", "-s"]).unwrap_or_default(),
                title: flag_value(&args, &["--title", "-t"]).unwrap_or_default(),
                content: flag_value(&args, &["--content", "-c"]).unwrap_or_default(),
                scheduled_at: String::new(),
            };
            Ok(Command::Update { id, form })
        }

        "publish" => Ok(Command::Publish {
            id: arg(2, "post id")?,
        }),
        "schedule" => Ok(Command::Schedule {
            id: arg(2, "post id")?,
            when: args.get(3..).map(|rest| rest.join(" ")).unwrap_or_default(),
        }),
        "delete" => Ok(Command::Delete {
            id: arg(2, "post id")?,
        }),

        "theme" => Ok(Command::Theme {
            choice: args.get(2).cloned(),
        }),

        other => Err(anyhow!(
            "Unknown command: {other}\nRun 'skedit --help' for usage"
        )),
    }
}

fn has_flag(args: &[String], names: &[&str]) -> bool {
    args.iter().any(|a| names.contains(&a.as_str()))
}

fn flag_value(args: &[String], names: &[&str]) -> Option<String> {
    args.iter()
        .position(|a| names.contains(&a.as_str()))
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn print_help() {
    let config_path = Config::default_path()
        .map_or_else(|_| "Unknown".to_string(), |p| p.display().to_string());

    println!(
        r#"📅 Skedit - schedule Reddit posts from your terminal

USAGE:
    skedit                                 Show who is signed in
    skedit [COMMAND]

ACCOUNT:
    login <username-or-email>              Sign in (prompts for password)
    signup <username> <email>              Create an account and sign in
    logout                                 Sign out
    google                                 Sign in with Google in the browser
    verify-email <token>                   Confirm your email address
    resend-verification <email>            Send the verification email again
    password-reset <email>                 Email a password reset link
    password-reset-confirm <token>         Set a new password

REDDIT ACCOUNTS:
    accounts                               List connected Reddit accounts
    connect                                Connect a Reddit account (browser)
    disconnect <id> [--yes]                Disconnect a Reddit account

POSTS:
    posts [scheduled|published|all]        List posts (default: scheduled)
    create [OPTIONS]                       Create a post
      Options:
        -a, --account <id>                 Reddit account id
        -s, --subreddit <name>             Subreddit (r/ is optional)
        -t, --title <title>                Post title
        -c, --content <markdown>           Post body
            --at <when>                    Schedule instead of publishing now
        -p, --preview                      Show the post without submitting it
      Examples:
        skedit create -a 3 -s rust -t "Hello" -c "First post"
        skedit create -a 3 -s rust -t "Hello" -c "Later" --at "in 2h"
    update <id> [OPTIONS]                  Edit a post (same options as create)
    publish <id>                           Publish a post now
    schedule <id> <when>                   Reschedule a post
      Examples: 'in 30m', '15:00', '3pm', '2030-01-15 14:30'
    delete <id>                            Delete a post

OTHER:
    theme [light|dark|toggle]              Show or change the theme
    -h, --help                             Show this help message
    -v, --version                          Show version information

ENVIRONMENT:
    SKEDIT_API_URL                         Override the backend URL
    RUST_LOG                               Log filter (default: warn)

CONFIG:
    {}
"#,
        config_path
    );
}

fn print_version() {
    println!("skedit {}", skedit::VERSION);
}

fn open_session() -> Result<Session> {
    let config = Config::load()?;
    let storage = EncryptedFileStorage::open()?;
    let store = Arc::new(CredentialStore::new(storage));
    let client = ApiClient::from_config(&config, store)?;

    client.set_session_expired_hook(|| {
        eprintln!("⚠ Your session has ended. Run: skedit login <username-or-email>");
    });

    Ok(Session::new(client))
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn open_in_browser(url: &str) {
    println!("\n📋 Open this URL in your browser:\n\n  {}\n", url);
    let _ = open::that(url);
}

async fn run(session: &mut Session, command: Command) -> Result<()> {
    match command {
        Command::Status => {
            match session.start().await {
                SessionState::Authenticated(user) => {
                    println!("✓ Signed in as {} <{}>", user.username, user.email);
                }
                _ => println!("{}", views::NOT_LOGGED_IN),
            }
            Ok(())
        }

        Command::Login { identifier } => {
            let password = prompt("Password: ")?;
            let user = views::auth::log_in(session, &identifier, &password)
                .await
                .map_err(anyhow::Error::msg)?;
            println!("✓ Logged in as {}", user.username);
            Ok(())
        }

        Command::Signup { username, email } => {
            let password = prompt("Choose a password: ")?;
            let user = views::auth::sign_up(session, &username, &email, &password)
                .await
                .map_err(anyhow::Error::msg)?;
            println!("✓ Account created. Logged in as {}", user.username);
            Ok(())
        }

        Command::Logout => {
            if let Some(notice) = session.logout() {
                // Give the backend notice a chance to go out before exit
                let _ = notice.await;
            }
            println!("✓ Logged out");
            Ok(())
        }

        Command::Google => {
            open_in_browser(&session.client().google_login_url());
            Ok(())
        }

        Command::VerifyEmail { token } => {
            match views::auth::verify_email(session, token.as_deref()).await {
                views::auth::Verification::Verified(message) => {
                    println!("✓ {}", message);
                    Ok(())
                }
                views::auth::Verification::Failed(message) => bail!(message),
            }
        }

        Command::ResendVerification { email } => {
            let message = views::auth::resend_verification(session, &email)
                .await
                .map_err(anyhow::Error::msg)?;
            println!("✓ {}", message);
            Ok(())
        }

        Command::PasswordReset { email } => {
            let message = views::auth::request_password_reset(session, &email)
                .await
                .map_err(anyhow::Error::msg)?;
            println!("✓ {}", message);
            Ok(())
        }

        Command::PasswordResetConfirm { token } => {
            let password = prompt("New password: ")?;
            let message = views::auth::confirm_password_reset(session, &token, &password)
                .await
                .map_err(anyhow::Error::msg)?;
            println!("✓ {}", message);
            Ok(())
        }

        Command::Accounts => {
            views::require_login(session).await?;
            let text = views::accounts::show(session.client())
                .await
                .map_err(anyhow::Error::msg)?;
            print!("{}", text);
            Ok(())
        }

        Command::Connect => {
            views::require_login(session).await?;
            open_in_browser(&session.client().reddit_connect_url());
            Ok(())
        }

        Command::Disconnect { id, yes } => {
            views::require_login(session).await?;
            if !yes {
                let answer = prompt(&format!("Disconnect account {}? [y/N] ", id))?;
                if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
                    println!("Cancelled");
                    return Ok(());
                }
            }
            let text = views::accounts::disconnect(session.client(), &id)
                .await
                .map_err(anyhow::Error::msg)?;
            println!("✓ Account disconnected\n");
            print!("{}", text);
            Ok(())
        }

        Command::Posts { bucket } => {
            views::require_login(session).await?;
            let text = views::posts::show(session.client(), bucket)
                .await
                .map_err(anyhow::Error::msg)?;
            print!("{}", text);
            Ok(())
        }

        Command::Create { form, schedule, .. } => {
            views::require_login(session).await?;
            let mode = if schedule {
                SubmitMode::Schedule
            } else {
                SubmitMode::PublishNow
            };
            let line = views::compose::submit(session.client(), &form, mode)
                .await
                .map_err(anyhow::Error::msg)?;
            println!("✓ {}", line);
            Ok(())
        }

        Command::Update { id, form } => {
            views::require_login(session).await?;
            let text = views::posts::update(session.client(), &id, &form.to_update())
                .await
                .map_err(anyhow::Error::msg)?;
            print!("{}", text);
            Ok(())
        }

        Command::Publish { id } => {
            views::require_login(session).await?;
            let line = views::posts::publish(session.client(), &id)
                .await
                .map_err(anyhow::Error::msg)?;
            println!("✓ {}", line);
            Ok(())
        }

        Command::Schedule { id, when } => {
            let at = skedit::schedule::parse_schedule_time(&when)?;
            views::require_login(session).await?;
            let line = views::posts::reschedule(session.client(), &id, at)
                .await
                .map_err(anyhow::Error::msg)?;
            println!("✓ {}", line);
            Ok(())
        }

        Command::Delete { id } => {
            views::require_login(session).await?;
            let line = views::posts::delete(session.client(), &id)
                .await
                .map_err(anyhow::Error::msg)?;
            println!("✓ {}", line);
            Ok(())
        }

        Command::Theme { .. } | Command::Help | Command::Version => Ok(()),
    }
}

fn theme_cli(choice: Option<&str>) -> Result<()> {
    let storage = EncryptedFileStorage::open()?;

    let theme = match choice {
        None => Theme::load(&storage),
        Some("toggle") => Theme::toggle(&storage)?,
        Some(name) => {
            let theme = Theme::from_str(name)
                .ok_or_else(|| anyhow!("Unknown theme: {}\nUse light, dark or toggle", name))?;
            theme.save(&storage)?;
            theme
        }
    };

    println!("{} Theme: {}", theme.emoji(), theme);
    Ok(())
}
