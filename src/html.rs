//! HTML assembly for the resource templates under `res/pages`.
//!
//! Templates use `{name}` placeholders. [`fill`] substitutes them in a single
//! pass, so substituted values are never scanned for placeholders themselves.
//! Anything user-supplied goes through [`escape`] or [`markdown`] first.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag};
use time::{OffsetDateTime, macros::format_description};

use crate::{db::{CommentCard, PostCard, User}, include_res, pager::PageWindow};

pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let hit = tail.find('}').and_then(|end| {
            let name = &tail[..end];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (end, *value))
        });
        match hit {
            Some((end, value)) => {
                out.push_str(value);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

/// Percent-encodes each segment of a path, keeping the `/` separators.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

pub fn profile_path(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}

fn is_safe_url(url: &str) -> bool {
    let url = url.trim_start().to_ascii_lowercase();
    !["javascript:", "vbscript:", "data:"]
        .iter()
        .any(|scheme| url.starts_with(scheme))
}

/// Renders Markdown with raw HTML shown as text and script-ish links defused.
pub fn markdown(text: &str) -> String {
    let parser = Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH)
        .map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            Event::Start(Tag::Link { link_type, dest_url, title, id }) if !is_safe_url(&dest_url) => {
                Event::Start(Tag::Link { link_type, dest_url: CowStr::Borrowed("#"), title, id })
            }
            Event::Start(Tag::Image { link_type, dest_url, title, id }) if !is_safe_url(&dest_url) => {
                Event::Start(Tag::Image { link_type, dest_url: CowStr::Borrowed("#"), title, id })
            }
            _ => event,
        });

    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, parser);
    html_output
}

pub fn date(unix_seconds: i64) -> String {
    OffsetDateTime::from_unix_timestamp(unix_seconds)
        .ok()
        .and_then(|at| at.format(format_description!("[day].[month].[year] [hour]:[minute]")).ok())
        .unwrap_or_else(|| unix_seconds.to_string())
}

/// Wraps page content in the site chrome.
pub fn layout(title: &str, viewer: Option<&User>, content: &str) -> String {
    let nav = match viewer {
        Some(user) => {
            fill(
                include_res!(str, "/pages/nav_user.html"),
                &[
                    ("username", &escape(&user.username)),
                    ("profile_path", &escape(&profile_path(&user.username))),
                ],
            )
        }
        None => include_res!(str, "/pages/nav_guest.html").to_owned(),
    };

    fill(
        include_res!(str, "/pages/base.html"),
        &[("title", &escape(title)), ("nav", &nav), ("content", content)],
    )
}

pub fn post_card(post: &PostCard) -> String {
    let image = match &post.image {
        Some(image) => format!(r#"<img class="post-image" src="/media/{}" alt="">"#, escape(image)),
        None => String::new(),
    };
    let group = match (&post.group_slug, &post.group_title) {
        (Some(slug), Some(title)) => {
            format!(
                r#"<a class="post-group" href="/group/{}/">#{}</a>"#,
                escape(&urlencoding::encode(slug)),
                escape(title)
            )
        }
        _ => String::new(),
    };

    fill(
        include_res!(str, "/pages/post_card.html"),
        &[
            ("id", &post.id.to_string()),
            ("author", &escape(&post.author)),
            ("profile_path", &escape(&profile_path(&post.author))),
            ("date", &date(post.created_at)),
            ("image", &image),
            ("text", &markdown(&post.text)),
            ("group", &group),
        ],
    )
}

pub fn comment(comment: &CommentCard) -> String {
    fill(
        include_res!(str, "/pages/comment.html"),
        &[
            ("author", &escape(&comment.author)),
            ("profile_path", &escape(&profile_path(&comment.author))),
            ("date", &date(comment.created_at)),
            ("text", &markdown(&comment.text)),
        ],
    )
}

pub fn pager_nav(window: &PageWindow) -> String {
    if window.num_pages <= 1 {
        return String::new();
    }

    let mut nav = String::from(r#"<nav class="pager">"#);
    if window.has_previous() {
        nav += &format!(
            r#"<a href="?page=1">&laquo; first</a> <a href="?page={}">previous</a> "#,
            window.number - 1
        );
    }
    nav += &format!(r#"<span class="current">Page {} of {}</span>"#, window.number, window.num_pages);
    if window.has_next() {
        nav += &format!(
            r#" <a href="?page={}">next</a> <a href="?page={}">last &raquo;</a>"#,
            window.number + 1,
            window.num_pages
        );
    }
    nav += "</nav>";
    nav
}

/// A heading, the cards of one page, and the page links.
pub fn feed(heading: &str, posts: &[PostCard], window: &PageWindow) -> String {
    let cards = if posts.is_empty() {
        r#"<p class="empty">No posts yet.</p>"#.to_owned()
    } else {
        posts.iter().map(post_card).collect::<Vec<_>>().join("\n")
    };

    fill(
        include_res!(str, "/pages/feed.html"),
        &[("heading", heading), ("posts", &cards), ("pager", &pager_nav(window))],
    )
}
