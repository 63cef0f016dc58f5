//! Seed the database with demo snippets.
//!
//! Snippets are created through the snippet service, so tag names go through
//! the same validation and find-or-create path as API requests.

use reusify_core::Email;
use reusify_server::db::UserStore;
use reusify_server::models::SnippetInput;
use reusify_server::services::SnippetService;
use tracing::info;

use super::store;

/// `(title, language, content, tags)` for each demo snippet.
const DEMO_SNIPPETS: &[(&str, &str, &str, &[&str])] = &[
    (
        "Read a file to a string",
        "rust",
        "let text = std::fs::read_to_string(\"notes.txt\")?;",
        &["rust", "io"],
    ),
    (
        "Debounce a callback",
        "typescript",
        "function debounce(fn: () => void, ms: number) {\n  let t: number | undefined;\n  return () => {\n    clearTimeout(t);\n    t = setTimeout(fn, ms);\n  };\n}",
        &["typescript", "events"],
    ),
    (
        "Newest rows first",
        "sql",
        "SELECT * FROM snippet ORDER BY updated_at DESC LIMIT 20;",
        &["sql", "postgres"],
    ),
    (
        "Find large files",
        "bash",
        "find . -type f -size +100M -exec ls -lh {} \\;",
        &["bash", "io"],
    ),
];

/// Insert the demo snippets for the user with `email`.
///
/// # Errors
///
/// Returns an error if the email is malformed, no such user exists, or the
/// database is unreachable.
pub async fn demo_snippets(email: &str) -> Result<(), Box<dyn std::error::Error>> {
    let email = Email::parse(email)?;
    let store = store().await?;

    let user = store
        .get_user_by_email(&email)
        .await?
        .ok_or_else(|| format!("No user with email: {email}"))?;

    let service = SnippetService::new(&store);
    for (title, language, content, tags) in DEMO_SNIPPETS {
        let input = SnippetInput {
            title: Some((*title).to_owned()),
            language: Some((*language).to_owned()),
            content: Some((*content).to_owned()),
            tags: Some(tags.iter().map(|t| (*t).to_owned()).collect()),
        };
        let snippet = service.create(user.id, input).await?;
        info!(id = %snippet.id, title = %snippet.title, "Seeded snippet");
    }

    info!("Seeding complete!");
    info!("  Snippets inserted: {}", DEMO_SNIPPETS.len());
    Ok(())
}
