//! Headless front end for the Focus launcher policy engine.
//!
//! Every invocation opens the JSON prefs file, loads the policy store, runs
//! one command through it and prints the resulting view.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use focus_policy::{
    AppCatalog, Clock, ExpirySweeper, NoopNavigation, PolicyConfig, PolicyStore, PolicyView,
    StaticCatalog, UnsupportedCatalog,
};
use focus_storage::{is_onboarding_completed, mark_onboarding_completed, JsonFilePrefsStore};
use focus_types::{AppId, EpochMillis, InstalledApp};
use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const MS_PER_MINUTE: u64 = 60_000;

#[derive(Parser, Debug)]
#[command(name = "focusctl")]
#[command(about = "Inspect and edit Focus launcher app policy")]
pub struct Cli {
    /// Preferences file holding the persisted policy
    #[arg(short, long, global = true, default_value = "focus-prefs.json")]
    pub store: PathBuf,

    /// JSON array of installed apps (`appName`, `packageName`)
    #[arg(short, long, global = true)]
    pub catalog: Option<PathBuf>,

    /// TOML policy configuration
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show limits, restrictions, overrides and the home screen
    Status,
    /// List available apps, optionally filtered by name
    Apps {
        /// Case-insensitive name filter
        #[arg(long)]
        search: Option<String>,
    },
    /// Put an app on the home screen
    Select {
        id: String,
        /// Remove it instead
        #[arg(long)]
        off: bool,
    },
    /// Hide an app from the launcher
    Restrict {
        id: String,
        /// Lift the restriction permanently instead
        #[arg(long)]
        off: bool,
    },
    /// Set the maximum number of home screen apps
    Limit {
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },
    /// Set the background color (#RRGGBB)
    Color { hex: String },
    /// Temporarily lift a restriction
    Unlock {
        id: String,
        #[arg(short, long, default_value = "15")]
        minutes: u64,
    },
    /// End a temporary unlock early
    Relock { id: String },
    /// Re-restrict every lapsed unlock
    Sweep,
    /// Mark first-run onboarding as done
    Onboard,
}

/// Reads a TOML policy config, or returns the defaults when no path is given.
pub async fn load_config(path: Option<&Path>) -> Result<PolicyConfig> {
    let Some(path) = path else {
        return Ok(PolicyConfig::default());
    };
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading config {}", path.display()))?;
    PolicyConfig::from_toml_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

/// Reads a JSON app list into a catalog. Without a path the catalog is
/// unsupported and the installed list stays empty.
pub async fn load_catalog(path: Option<&Path>) -> Result<Arc<dyn AppCatalog>> {
    let Some(path) = path else {
        debug!("No catalog file given, running without installed apps");
        return Ok(Arc::new(UnsupportedCatalog));
    };
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading catalog {}", path.display()))?;
    let apps: Vec<InstalledApp> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing catalog {}", path.display()))?;
    Ok(Arc::new(StaticCatalog::new(apps)))
}

/// A loaded policy store plus the collaborators commands need.
pub struct Session {
    pub store: Arc<PolicyStore>,
    pub prefs: Arc<JsonFilePrefsStore>,
    pub clock: Arc<dyn Clock>,
}

impl Session {
    /// Opens the prefs file named by `cli` and loads every policy key.
    pub async fn open(cli: &Cli, clock: Arc<dyn Clock>) -> Result<Self> {
        let config = load_config(cli.config.as_deref()).await?;
        let catalog = load_catalog(cli.catalog.as_deref()).await?;
        let prefs = Arc::new(
            JsonFilePrefsStore::open(&cli.store)
                .await
                .with_context(|| format!("opening prefs {}", cli.store.display()))?,
        );
        let store = Arc::new(PolicyStore::new(prefs.clone(), catalog, config));
        store.load_all().await;
        Ok(Self { store, prefs, clock })
    }

    /// Runs one command and prints the outcome to `out`.
    pub async fn execute<W: Write>(&self, command: &Command, out: &mut W) -> Result<()> {
        info!("Running {:?}", command);
        match command {
            Command::Status => {}
            Command::Apps { search } => return self.list_apps(search.as_deref(), out),
            Command::Select { id, off } => {
                let id = parse_id(id)?;
                if !self.store.toggle_selection(&id, !off).await {
                    let view = self.store.snapshot();
                    if view.is_restricted(&id) {
                        bail!("{id} is restricted");
                    }
                    bail!("home screen limit of {} apps reached", view.selection_limit());
                }
            }
            Command::Restrict { id, off } => {
                self.store.toggle_restriction(&parse_id(id)?, !off).await;
            }
            Command::Limit { value } => {
                let outcome = self.store.set_selection_limit(*value).await;
                if outcome.trimmed {
                    writeln!(out, "Home screen trimmed to {} apps", outcome.limit)?;
                }
            }
            Command::Color { hex } => {
                if !self.store.set_background_color(hex).await {
                    bail!("invalid color {hex:?}, expected #RRGGBB");
                }
            }
            Command::Unlock { id, minutes } => {
                let id = parse_id(id)?;
                let expiry = self
                    .clock
                    .now_ms()
                    .saturating_add(minutes.saturating_mul(MS_PER_MINUTE));
                if !self.store.set_temporary_override(&id, expiry).await {
                    bail!("{id} is not restricted");
                }
            }
            Command::Relock { id } => {
                let id = parse_id(id)?;
                if self.store.override_expiry(&id).is_none() {
                    bail!("{id} is not temporarily unlocked");
                }
                self.store.toggle_restriction(&id, true).await;
            }
            Command::Sweep => {
                let sweeper = ExpirySweeper::new(
                    self.store.clone(),
                    self.clock.clone(),
                    Arc::new(NoopNavigation),
                );
                let expired = sweeper.sweep().await;
                writeln!(out, "Expired {} unlock(s)", expired.len())?;
            }
            Command::Onboard => {
                mark_onboarding_completed(self.prefs.as_ref())
                    .await
                    .context("saving onboarding flag")?;
            }
        }
        self.print_status(out).await
    }

    async fn print_status<W: Write>(&self, out: &mut W) -> Result<()> {
        let onboarded = is_onboarding_completed(self.prefs.as_ref()).await;
        let view = self.store.snapshot();
        out.write_all(render_status(&view, onboarded, self.clock.now_ms()).as_bytes())?;
        Ok(())
    }

    fn list_apps<W: Write>(&self, search: Option<&str>, out: &mut W) -> Result<()> {
        let view = self.store.snapshot();
        let apps = view.search_available(search.unwrap_or_default());
        if apps.is_empty() {
            writeln!(out, "No apps")?;
        }
        for app in apps {
            let mark = if view.is_selected(&app.id) { '*' } else { ' ' };
            writeln!(out, "{mark} {}  {}", app.name, app.id)?;
        }
        Ok(())
    }
}

/// Opens a session and runs the command `cli` names.
pub async fn run<W: Write>(cli: Cli, clock: Arc<dyn Clock>, out: &mut W) -> Result<()> {
    let session = Session::open(&cli, clock).await?;
    session.execute(&cli.command, out).await
}

/// Human-readable summary of a policy view.
pub fn render_status(view: &PolicyView, onboarded: bool, now: EpochMillis) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "Onboarding: {}", if onboarded { "done" } else { "pending" });
    let _ = writeln!(
        s,
        "Home apps: {}/{}",
        view.selected_apps().len(),
        view.selection_limit()
    );
    let _ = writeln!(
        s,
        "Background: {} (text {})",
        view.background_color(),
        view.text_color()
    );

    let _ = writeln!(s, "Visible:");
    for app in view.visible_apps() {
        let _ = writeln!(s, "  {}  {}", app.name, app.id);
    }
    if !view.restricted_apps().is_empty() {
        let _ = writeln!(s, "Restricted:");
        for id in view.restricted_apps() {
            let _ = writeln!(s, "  {}", label(view, id));
        }
    }
    if !view.overrides().is_empty() {
        let _ = writeln!(s, "Unlocked:");
        for (id, expiry) in view.overrides() {
            let _ = writeln!(s, "  {}  {}", label(view, id), remaining(*expiry, now));
        }
    }
    s
}

fn label(view: &PolicyView, id: &AppId) -> String {
    match view.installed_app(id) {
        Some(app) => format!("{} ({})", app.name, id),
        None => id.to_string(),
    }
}

fn remaining(expiry: EpochMillis, now: EpochMillis) -> String {
    if expiry <= now {
        return "lapsed".to_string();
    }
    let secs = (expiry - now).div_ceil(1_000);
    format!("{}m {:02}s left", secs / 60, secs % 60)
}

fn parse_id(raw: &str) -> Result<AppId> {
    AppId::parse(raw).with_context(|| format!("invalid app id {raw:?}"))
}
