// src/templates.rs
//
// Server-rendered pages. Small enough that format! beats a template engine;
// everything user-sourced goes through escape_html.

use crate::models::generation::Generation;

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn layout(title: &str, nav: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en" class="bg-slate-900 text-slate-100">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} - StudyDeck</title>
<script src="https://cdn.tailwindcss.com"></script>
<link rel="stylesheet" href="/static/style.css">
</head>
<body class="min-h-screen">
<header class="border-b border-slate-700 bg-slate-800">
  <div class="max-w-3xl mx-auto px-4 py-3 flex items-center justify-between">
    <a href="/" class="text-lg font-bold text-indigo-400">StudyDeck</a>
    <nav class="flex items-center gap-4 text-sm">{nav}</nav>
  </div>
</header>
<main class="max-w-3xl mx-auto px-4 py-8">
{body}
</main>
<script src="/static/script.js"></script>
</body>
</html>"#
    )
}

fn user_nav(email: &str) -> String {
    format!(
        r#"<span class="text-slate-400">{}</span>
    <a href="/history" class="hover:text-indigo-400">History</a>
    <a href="/logout" class="hover:text-indigo-400">Log out</a>"#,
        escape_html(email)
    )
}

/// Login and register share one page; `error` renders above the form.
pub fn render_auth_page(is_login: bool, error: Option<&str>) -> String {
    let (title, action, button, alt) = if is_login {
        (
            "Log in",
            "/login",
            "Log in",
            r#"No account? <a href="/register" class="text-indigo-400">Register</a>"#,
        )
    } else {
        (
            "Register",
            "/register",
            "Create account",
            r#"Already registered? <a href="/login" class="text-indigo-400">Log in</a>"#,
        )
    };

    let error_html = match error {
        Some(msg) => format!(
            r#"<div class="mb-4 p-3 rounded bg-rose-600 text-sm">{}</div>"#,
            escape_html(msg)
        ),
        None => String::new(),
    };

    let body = format!(
        r#"<div class="max-w-sm mx-auto mt-12 p-6 bg-slate-800 rounded-xl shadow-lg">
  <h1 class="text-xl font-bold mb-4">{title}</h1>
  {error_html}
  <form method="post" action="{action}" class="space-y-4">
    <input type="email" name="email" placeholder="Email" required
           class="w-full p-2 rounded bg-slate-700 border border-slate-600">
    <input type="password" name="password" placeholder="Password" required
           class="w-full p-2 rounded bg-slate-700 border border-slate-600">
    <button type="submit" class="w-full py-2 bg-indigo-600 rounded font-semibold hover:bg-indigo-500">{button}</button>
  </form>
  <p class="mt-4 text-sm text-slate-400">{alt}</p>
</div>"#
    );

    layout(title, "", &body)
}

/// The generator page. Element ids here are contract with static/script.js.
pub fn render_home(email: &str) -> String {
    let body = r#"<div class="space-y-6">
  <div class="p-5 bg-slate-800 rounded-xl shadow-lg space-y-4">
    <div class="flex gap-2">
      <button class="mode-tab px-4 py-2 rounded bg-indigo-600 text-white" data-mode="flashcard">Flashcards</button>
      <button class="mode-tab px-4 py-2 rounded bg-slate-700" data-mode="mcq">MCQ</button>
    </div>
    <input id="topic-input" type="text" placeholder="Topic, e.g. Rust ownership"
           class="w-full p-2 rounded bg-slate-700 border border-slate-600">
    <div class="flex gap-3">
      <input id="num-cards-input" type="number" value="5" min="1" max="20"
             class="w-24 p-2 rounded bg-slate-700 border border-slate-600">
      <select id="difficulty" class="flex-1 p-2 rounded bg-slate-700 border border-slate-600">
        <option>Beginner</option>
        <option selected>Intermediate</option>
        <option>Advanced</option>
      </select>
    </div>
    <button id="generate-button" class="w-full py-3 bg-indigo-600 rounded font-semibold hover:bg-indigo-500"></button>
  </div>
  <div id="message-area"></div>
  <div id="flashcard-container" class="space-y-4"></div>
  <div id="quiz-container" class="hidden space-y-4"></div>
</div>"#;

    layout("Generate", &user_nav(email), body)
}

/// History table with per-row download and delete actions. `rows` pairs each
/// generation with its item count.
pub fn render_history(email: &str, rows: &[(Generation, usize)]) -> String {
    let table_body: String = rows
        .iter()
        .map(|(generation, item_count)| {
            let created = generation
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            format!(
                r#"<tr id="generation-row-{id}" class="border-b border-slate-700">
  <td class="py-2 pr-3">{topic}</td>
  <td class="py-2 pr-3 text-slate-400">{label}</td>
  <td class="py-2 pr-3 text-slate-400">{item_count}</td>
  <td class="py-2 pr-3 text-slate-400">{created}</td>
  <td class="py-2 space-x-2 whitespace-nowrap">
    <button class="download-btn px-2 py-1 text-sm bg-slate-700 rounded" data-id="{id}" data-format="csv">CSV</button>
    <button class="download-btn px-2 py-1 text-sm bg-slate-700 rounded" data-id="{id}" data-format="pdf">PDF</button>
    <button class="delete-btn px-2 py-1 text-sm bg-rose-700 rounded" data-id="{id}">Delete</button>
  </td>
</tr>"#,
                id = generation.id,
                topic = escape_html(&generation.topic),
                label = generation.mode.label(),
            )
        })
        .collect();

    let body = if rows.is_empty() {
        r#"<div class="p-5 bg-slate-800 rounded-xl text-slate-400">Nothing generated yet.
  <a href="/" class="text-indigo-400">Create your first set.</a></div>"#
            .to_string()
    } else {
        format!(
            r#"<div class="p-5 bg-slate-800 rounded-xl shadow-lg">
<h1 class="text-xl font-bold mb-4">Your generations</h1>
<table class="w-full text-left text-sm">
<thead><tr class="text-slate-400 border-b border-slate-600">
  <th class="py-2 pr-3">Topic</th><th class="py-2 pr-3">Mode</th>
  <th class="py-2 pr-3">Items</th><th class="py-2 pr-3">Created</th><th></th>
</tr></thead>
<tbody>{table_body}</tbody>
</table>
</div>"#
        )
    };

    layout("History", &user_nav(email), &body)
}
