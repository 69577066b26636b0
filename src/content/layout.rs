//! Layout dispatch.
//!
//! Each content type names a layout key. The dispatcher looks the key up in an
//! explicit renderer registry and falls back to a raw view of the payload when
//! the key is unknown or the payload does not have the layout's shape.

use std::collections::HashMap;

use serde::Serialize;

use super::model::ResolvedItem;
use super::payload::{
    AboutData, ContentPayload, MindsetData, SkillLevel, SkillsData, SportsData, WorkData,
    ABOUT_LAYOUT, MINDSET_LAYOUT, SKILLS_LAYOUT, SPORTS_LAYOUT, WORK_LAYOUT,
};

pub const FALLBACK_LAYOUT: &str = "raw";
const FALLBACK_ICON: &str = "📄";

/// Renders one layout. Returns `None` when the payload is not the variant
/// this renderer handles.
pub trait LayoutRenderer: Send + Sync {
    fn render(&self, payload: &ContentPayload) -> Option<String>;
}

impl<F> LayoutRenderer for F
where
    F: Fn(&ContentPayload) -> Option<String> + Send + Sync,
{
    fn render(&self, payload: &ContentPayload) -> Option<String> {
        self(payload)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResult {
    /// Renderer that produced `html`; `"raw"` for the fallback.
    pub layout: String,
    pub fallback: bool,
    pub title: String,
    pub description: Option<String>,
    pub html: String,
}

pub struct LayoutDispatcher {
    renderers: HashMap<String, Box<dyn LayoutRenderer>>,
}

impl Default for LayoutDispatcher {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl LayoutDispatcher {
    pub fn empty() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }

    pub fn with_builtin() -> Self {
        let mut dispatcher = Self::empty();
        dispatcher.register(ABOUT_LAYOUT, |p: &ContentPayload| match p {
            ContentPayload::About(d) => Some(render_about(d)),
            _ => None,
        });
        dispatcher.register(WORK_LAYOUT, |p: &ContentPayload| match p {
            ContentPayload::Work(d) => Some(render_work(d)),
            _ => None,
        });
        dispatcher.register(SKILLS_LAYOUT, |p: &ContentPayload| match p {
            ContentPayload::Skills(d) => Some(render_skills(d)),
            _ => None,
        });
        dispatcher.register(MINDSET_LAYOUT, |p: &ContentPayload| match p {
            ContentPayload::Mindset(d) => Some(render_mindset(d)),
            _ => None,
        });
        dispatcher.register(SPORTS_LAYOUT, |p: &ContentPayload| match p {
            ContentPayload::Sports(d) => Some(render_sports(d)),
            _ => None,
        });
        dispatcher
    }

    pub fn register(&mut self, key: &str, renderer: impl LayoutRenderer + 'static) {
        self.renderers.insert(key.to_string(), Box::new(renderer));
    }

    pub fn available_layouts(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.renderers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn has_layout(&self, key: &str) -> bool {
        self.renderers.contains_key(key)
    }

    /// Render an item. Never fails.
    pub fn dispatch(&self, resolved: &ResolvedItem) -> RenderResult {
        let item = &resolved.item;
        let content_type = &resolved.content_type;
        let key = content_type.layout_component.as_str();

        let title = item.meta_title.clone().unwrap_or_else(|| item.title.clone());
        let description = item.meta_description.clone();

        let rendered = self.renderers.get(key).map(|renderer| {
            let payload = ContentPayload::parse(key, &item.data);
            renderer.render(&payload)
        });

        match rendered {
            Some(Some(html)) => RenderResult {
                layout: key.to_string(),
                fallback: false,
                title,
                description,
                html,
            },
            other => {
                let notice = if other.is_some() {
                    format!("Content does not match layout \"{}\"", key)
                } else {
                    format!("Layout component \"{}\" not found", key)
                };
                tracing::debug!(slug = %item.slug, layout = %key, "rendering raw fallback");
                RenderResult {
                    layout: FALLBACK_LAYOUT.to_string(),
                    fallback: true,
                    html: render_raw(resolved, &notice),
                    title,
                    description,
                }
            }
        }
    }
}

fn esc(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Sanitized rich text.
fn rich(s: &str) -> String {
    ammonia::clean(s)
}

/// Only http(s), mailto and relative URLs make it into attributes.
fn safe_url(url: &str) -> Option<String> {
    let trimmed = url.trim();
    let lower = trimmed.to_ascii_lowercase();
    let allowed = lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("mailto:")
        || (trimmed.starts_with('/') && !trimmed.starts_with("//"));
    allowed.then(|| esc(trimmed))
}

fn image(class: &str, src: Option<&str>, alt: &str) -> String {
    src.and_then(safe_url)
        .map(|src| format!(r#"<img class="{}" src="{}" alt="{}">"#, class, src, esc(alt)))
        .unwrap_or_default()
}

fn link(href: Option<&str>, text: &str) -> String {
    href.and_then(safe_url)
        .map(|href| {
            format!(
                r#"<a href="{}" rel="noopener noreferrer" target="_blank">{}</a>"#,
                href,
                esc(text)
            )
        })
        .unwrap_or_default()
}

fn paragraph(class: &str, text: Option<&str>) -> String {
    match text.filter(|t| !t.trim().is_empty()) {
        Some(t) => format!(r#"<p class="{}">{}</p>"#, class, esc(t)),
        None => String::new(),
    }
}

fn tag_list(class: &str, tags: &[String]) -> String {
    if tags.is_empty() {
        return String::new();
    }
    let items: String = tags
        .iter()
        .map(|t| format!("<li>{}</li>", esc(t)))
        .collect();
    format!(r#"<ul class="{}">{}</ul>"#, class, items)
}

fn render_about(d: &AboutData) -> String {
    let mut html = String::from(r#"<section class="layout-about">"#);
    html.push_str(&image("profile-image", d.profile_image.as_deref(), &d.title));
    html.push_str(&format!("<h1>{}</h1>", esc(&d.title)));
    html.push_str(&paragraph("location", d.location.as_deref()));
    html.push_str(&format!(r#"<div class="rich-text">{}</div>"#, rich(&d.content)));
    html.push_str(&tag_list("skills", &d.skills));
    html.push_str("</section>");
    html
}

fn render_work(d: &WorkData) -> String {
    let mut html = String::from(r#"<section class="layout-work">"#);
    html.push_str(&format!("<h1>{}</h1>", esc(&d.title)));
    html.push_str(&paragraph("description", d.description.as_deref()));
    for project in &d.projects {
        html.push_str(r#"<article class="project">"#);
        html.push_str(&image("project-image", project.image.as_deref(), &project.title));
        html.push_str(&format!("<h2>{}</h2>", esc(&project.title)));
        html.push_str(&paragraph("description", project.description.as_deref()));
        html.push_str(&tag_list("technologies", &project.technologies));
        html.push_str(&link(project.url.as_deref(), "Visit"));
        html.push_str(&link(project.github.as_deref(), "Source"));
        html.push_str("</article>");
    }
    html.push_str("</section>");
    html
}

fn render_skills(d: &SkillsData) -> String {
    let mut html = String::from(r#"<section class="layout-skills">"#);
    html.push_str(&format!("<h1>{}</h1>", esc(&d.title)));
    html.push_str(&paragraph("description", d.description.as_deref()));
    for category in &d.categories {
        html.push_str(&format!(
            r#"<div class="skill-category"><h2>{}</h2><ul>"#,
            esc(&category.name)
        ));
        for skill in &category.skills {
            let level = match &skill.level {
                Some(SkillLevel::Percent(p)) => {
                    format!(r#" <span class="level">{}%</span>"#, p.min(&100))
                }
                Some(SkillLevel::Label(l)) => format!(r#" <span class="level">{}</span>"#, esc(l)),
                None => String::new(),
            };
            html.push_str(&format!("<li>{}{}</li>", esc(&skill.name), level));
        }
        html.push_str("</ul></div>");
    }
    html.push_str("</section>");
    html
}

fn render_mindset(d: &MindsetData) -> String {
    let mut html = String::from(r#"<section class="layout-mindset">"#);
    html.push_str(&image("featured-image", d.featured_image.as_deref(), &d.title));
    html.push_str(&format!("<h1>{}</h1>", esc(&d.title)));
    html.push_str(&tag_list("categories", &d.categories));
    html.push_str(&format!(r#"<div class="rich-text">{}</div>"#, rich(&d.content)));
    for quote in &d.quotes {
        html.push_str(&format!("<blockquote><p>{}</p>", esc(&quote.text)));
        if let Some(author) = &quote.author {
            html.push_str(&format!("<cite>{}</cite>", esc(author)));
        }
        html.push_str("</blockquote>");
    }
    html.push_str(&paragraph("philosophy", d.philosophy.as_deref()));
    html.push_str("</section>");
    html
}

fn render_sports(d: &SportsData) -> String {
    let mut html = String::from(r#"<section class="layout-sports">"#);
    html.push_str(&format!("<h1>{}</h1>", esc(&d.title)));
    html.push_str(&paragraph("description", d.description.as_deref()));
    html.push_str(&tag_list("current-sports", &d.current_sports));
    for event in &d.events {
        html.push_str(r#"<article class="event">"#);
        html.push_str(&format!("<h2>{}</h2>", esc(&event.title)));
        let meta: Vec<String> = [&event.event_type, &event.date, &event.location]
            .into_iter()
            .flatten()
            .map(|s| esc(s))
            .collect();
        if !meta.is_empty() {
            html.push_str(&format!(r#"<p class="meta">{}</p>"#, meta.join(" · ")));
        }
        html.push_str(&paragraph("description", Some(&event.description)));
        html.push_str(&paragraph("results", event.results.as_deref()));
        for photo in &event.photos {
            html.push_str(&image("event-photo", Some(photo), &event.title));
        }
        html.push_str("</article>");
    }
    if !d.achievements.is_empty() {
        html.push_str(r#"<ul class="achievements">"#);
        for a in &d.achievements {
            html.push_str(&format!(
                "<li><strong>{}</strong> {}</li>",
                esc(&a.title),
                esc(&a.description)
            ));
        }
        html.push_str("</ul>");
    }
    html.push_str("</section>");
    html
}

fn render_raw(resolved: &ResolvedItem, notice: &str) -> String {
    let icon = Some(resolved.content_type.icon.as_str())
        .filter(|i| !i.is_empty())
        .unwrap_or(FALLBACK_ICON);
    let pretty = serde_json::to_string_pretty(&resolved.item.data).unwrap_or_default();

    format!(
        concat!(
            r#"<section class="layout-fallback">"#,
            r#"<div class="icon">{}</div>"#,
            "<h1>{}</h1>",
            r#"<p class="notice">{}</p>"#,
            r#"<pre class="raw-data">{}</pre>"#,
            "</section>"
        ),
        esc(icon),
        esc(&resolved.item.title),
        esc(notice),
        esc(&pretty)
    )
}
