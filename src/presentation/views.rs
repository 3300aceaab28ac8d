//! Server-rendered HTML pages.

use crate::domain::matcher::ingredient_tokens;
use crate::domain::models::{Recipe, RecipeMatch};
use crate::presentation::session::SessionContext;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(session: &SessionContext, notice: Option<&str>, title: &str, body: &str) -> String {
    let nav = match &session.user {
        Some(user) => format!(
            r#"<a href="/">Home</a> | <a href="/add-recipe">Add recipe</a> | <a href="/inventory">Inventory</a> | <a href="/my-recipes">My recipes</a> | Logged in as {} (<a href="/logout">logout</a>)"#,
            escape(&user.username)
        ),
        None => r#"<a href="/">Home</a> | <a href="/add-recipe">Add recipe</a> | <a href="/login">Login</a> | <a href="/register">Register</a>"#
            .to_string(),
    };
    let mut messages: Vec<&str> = Vec::new();
    if let Some(flash) = session.flash {
        messages.push(flash.message());
    }
    messages.extend(notice);
    let notices: String = messages
        .iter()
        .map(|msg| format!(r#"<p class="flash">{}</p>"#, escape(msg)))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{title}</title></head>
<body>
<nav>{nav}</nav>
{notices}
<h1>{title}</h1>
{body}
</body>
</html>"#,
        title = escape(title),
    )
}

const LOGIN_FORM: &str = r#"
<form action="/login" method="post">
    <input type="text" name="username" placeholder="Username" required>
    <input type="password" name="password" placeholder="Password" required>
    <button type="submit">Login</button>
</form>
"#;

pub fn home(session: &SessionContext, recipes: &[Recipe]) -> String {
    let mut body = String::new();
    if !session.is_authenticated() {
        body.push_str(LOGIN_FORM);
    }
    if recipes.is_empty() {
        body.push_str("<p>No recipes yet.</p>");
    } else {
        body.push_str("<ul>");
        for recipe in recipes {
            body.push_str(&format!(
                r#"<li><a href="/recipe/{}">{}</a></li>"#,
                recipe.id,
                escape(&recipe.name)
            ));
        }
        body.push_str("</ul>");
    }
    layout(session, None, "Recipes", &body)
}

pub fn login(session: &SessionContext) -> String {
    layout(session, None, "Login", LOGIN_FORM)
}

pub fn register(session: &SessionContext) -> String {
    let body = r#"
<form action="/register" method="post">
    <input type="text" name="username" placeholder="Username" required>
    <input type="password" name="password" placeholder="Password" required>
    <button type="submit">Register</button>
</form>
"#;
    layout(session, None, "Register", body)
}

pub fn add_recipe(session: &SessionContext) -> String {
    let body = r#"
<form action="/add-recipe" method="post">
    <input type="text" name="name" placeholder="Name" required><br>
    <input type="text" name="ingredients" placeholder="Ingredients, comma separated" required><br>
    <textarea name="instructions" placeholder="Instructions" required></textarea><br>
    <button type="submit">Add recipe</button>
</form>
"#;
    layout(session, None, "Add recipe", body)
}

pub fn recipe_detail(session: &SessionContext, recipe: &Recipe) -> String {
    let items: String = ingredient_tokens(&recipe.ingredients)
        .map(|name| format!("<li>{}</li>", escape(name)))
        .collect();
    let body = format!(
        "<h2>Ingredients</h2><ul>{}</ul><h2>Instructions</h2><p>{}</p>",
        items,
        escape(&recipe.instructions)
    );
    layout(session, None, &recipe.name, &body)
}

pub fn inventory(session: &SessionContext, notice: Option<&str>, names: &[String]) -> String {
    let mut body = String::from(
        r#"
<form action="/inventory" method="post">
    <input type="text" name="name" placeholder="Ingredient" required>
    <button type="submit" name="action" value="add">Add</button>
    <button type="submit" name="action" value="remove">Remove</button>
</form>
"#,
    );
    if names.is_empty() {
        body.push_str("<p>Your inventory is empty.</p>");
    } else {
        body.push_str("<ul>");
        for name in names {
            body.push_str(&format!("<li>{}</li>", escape(name)));
        }
        body.push_str("</ul>");
    }
    layout(session, notice, "My inventory", &body)
}

pub fn my_recipes(session: &SessionContext, matches: &[RecipeMatch]) -> String {
    let mut body = String::from("<ul>");
    for entry in matches {
        let status = if entry.can_make() {
            "You can make this!".to_string()
        } else {
            format!("Missing: {}", escape(&entry.missing.join(", ")))
        };
        body.push_str(&format!(
            r#"<li><a href="/recipe/{}">{}</a> - {}</li>"#,
            entry.recipe.id,
            escape(&entry.recipe.name),
            status
        ));
    }
    body.push_str("</ul>");
    layout(session, None, "My recipes", &body)
}

pub fn error_page(title: &str, message: &str) -> String {
    layout(
        &SessionContext::default(),
        None,
        title,
        &format!(r#"<p>{}</p><a href="/">Back</a>"#, escape(message)),
    )
}
