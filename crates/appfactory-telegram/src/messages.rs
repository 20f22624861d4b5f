//! Reply texts sent by the bot.

use chrono::{DateTime, Utc};

use appfactory_core::generator::TemplateKind;
use appfactory_core::{CleanupSummary, CreatedApp, GenerationSource};
use appfactory_models::BotStatus;

pub const WORKING: &str = "🔄 Creating your app... This might take a minute!";

pub const MISSING_APP_NAME: &str =
    "❌ Please specify what app you want!\n\nExample: \"make me the app todo list\"";

pub const CHAT_FAILED: &str = "❌ Sorry, I couldn't process that message. Try again!";

pub const NOT_AUTHORIZED: &str = "⛔ This command is limited to bot administrators.";

pub const CLEANUP_STARTED: &str = "🧹 Deleting app repositories...";

pub fn start(username: &str) -> String {
    format!(
        "👋 Hello {}! I'm your AI App Creator!\n\n\
        What I can do:\n\
        • Create apps: \"make me the app todo list\"\n\
        • Chat with AI: Just send any message\n\
        • Get help: /help\n\n\
        Try it: \"make me the app blog\" 🚀",
        username
    )
}

/// App requests shown by `/help`.
pub const HELP_EXAMPLES: [&str; 3] = [
    "make me the app todo list",
    "create app blog with dark mode",
    "make me the app weather dashboard",
];

pub fn help() -> String {
    let examples: String = HELP_EXAMPLES
        .iter()
        .map(|e| format!("• \"{}\"\n", e))
        .collect();

    format!(
        "🆘 How to use me:\n\n\
        📱 Create Apps:\n\
        {}\n\
        💬 Chat with AI:\n\
        Just send any message and I'll respond!\n\n\
        🔧 Commands:\n\
        /start - Welcome message\n\
        /help - This help\n\
        /status - Check bot status\n\
        /cleanup - Delete created app repositories (admins only)",
        examples
    )
}

/// What `/status` reports.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub bot: BotStatus,
    pub providers: Vec<String>,
    pub chat_live: bool,
    pub deploy_live: bool,
    pub apps: usize,
    pub time: DateTime<Utc>,
}

pub fn status(snapshot: &StatusSnapshot) -> String {
    let bot = match snapshot.bot {
        BotStatus::Polling => "✅ Telegram Bot: Running".to_string(),
        BotStatus::BackingOff { attempt } => {
            format!("⚠️ Telegram Bot: Reconnecting (attempt {})", attempt)
        }
        BotStatus::NotConfigured | BotStatus::Stopped => "❌ Telegram Bot: Stopped".to_string(),
    };
    let generator = if snapshot.providers.is_empty() {
        "Templates only".to_string()
    } else {
        snapshot.providers.join(", ")
    };

    format!(
        "📊 Bot Status:\n\n\
        {}\n\
        ✅ App Creator: Ready ({})\n\
        ✅ AI Chat: {}\n\
        ✅ Deployment: {}\n\
        📦 Apps created: {}\n\n\
        ⏰ Time: {}",
        bot,
        generator,
        if snapshot.chat_live { "Connected" } else { "Mock Mode" },
        if snapshot.deploy_live { "Render" } else { "Mock" },
        snapshot.apps,
        snapshot.time.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

pub fn app_ready(created: &CreatedApp) -> String {
    let mut text = format!(
        "✅ Done! Your {} app is ready!\n\n\
        🔗 Live URL: {}\n\
        📁 GitHub: {}\n\n\
        You can test it now! 🎉",
        created.record.name, created.record.deployed_url, created.record.repo_url
    );

    if let GenerationSource::Template { template, .. } = &created.source {
        let name = match template {
            TemplateKind::TodoList => "todo list",
            TemplateKind::Counter => "counter",
        };
        text.push_str(&format!("\n\n🧩 Built from the {} template.", name));
    }
    if created.deployment.mock {
        text.push_str("\n\nℹ️ Hosting is not configured, the live URL is a placeholder.");
    }
    if !created.failed_files.is_empty() {
        let paths: Vec<&str> = created
            .failed_files
            .iter()
            .map(|f| f.path.as_str())
            .collect();
        text.push_str(&format!(
            "\n\n⚠️ {} file(s) could not be uploaded: {}",
            paths.len(),
            paths.join(", ")
        ));
    }
    text
}

pub fn app_failed(error: &str) -> String {
    format!("❌ Failed to create app: {}", error)
}

pub fn cleanup_done(summary: &CleanupSummary) -> String {
    if summary.total() == 0 {
        return "🧹 Nothing to clean up.".to_string();
    }

    let mut text = format!(
        "🧹 Cleanup finished:\n\n\
        🗑 Deleted: {}\n\
        🔍 Already gone: {}\n\
        ❌ Failed: {}",
        summary.deleted.len(),
        summary.not_found.len(),
        summary.failed.len()
    );
    for failure in &summary.failed {
        text.push_str(&format!("\n• {}: {}", failure.repo, failure.error));
    }
    text
}

pub fn cleanup_failed(error: &str) -> String {
    format!("❌ Cleanup failed: {}", error)
}
